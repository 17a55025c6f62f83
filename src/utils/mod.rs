//! Utility functions for the segmentation pipeline.

pub mod paths;

pub use paths::{classify_input, validate_input_path, InputFormat, H5_EXTENSIONS, H5_KEYS,
    TIFF_EXTENSIONS};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
