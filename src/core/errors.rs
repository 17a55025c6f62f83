//! Error types for the segmentation pipeline.
//!
//! This module defines the errors that can occur while loading a pipeline
//! configuration or while applying the volume processing stages it drives,
//! together with utility constructors that attach stage context.

use thiserror::Error;

/// Enum representing different stages of volume processing.
///
/// This enum is used to identify which processing step an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred while rescaling a volume.
    Rescale,
    /// Error occurred while cropping a volume.
    Crop,
    /// Error occurred during intensity or shape normalization.
    Normalization,
    /// Error occurred while filtering (gaussian/median smoothing).
    Filtering,
    /// Error occurred during label post-processing.
    Labeling,
    /// Error occurred while building or applying patch slices.
    Slicing,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Rescale => write!(f, "rescale"),
            ProcessingStage::Crop => write!(f, "crop"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::Filtering => write!(f, "filtering"),
            ProcessingStage::Labeling => write!(f, "labeling"),
            ProcessingStage::Slicing => write!(f, "slicing"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the segmentation pipeline.
///
/// Covers configuration problems, invalid input volumes, and failures inside
/// the individual processing stages.
#[derive(Error, Debug)]
pub enum SegError {
    /// Error occurred during volume processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from array shape operations.
    #[error("shape operation")]
    Shape(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl SegError {
    /// Creates a SegError for a specific processing stage.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SegError::Processing {
            kind,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a SegError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SegError::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a SegError for a configuration problem.
    pub fn config(message: impl Into<String>) -> Self {
        SegError::Config {
            message: message.into(),
        }
    }
}

/// Convenient result alias used throughout the crate.
pub type SegResult<T> = Result<T, SegError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_stage_display() {
        assert_eq!(ProcessingStage::Rescale.to_string(), "rescale");
        assert_eq!(ProcessingStage::Crop.to_string(), "crop");
        assert_eq!(ProcessingStage::Generic.to_string(), "processing");
    }

    #[test]
    fn test_error_constructors() {
        let err = SegError::invalid_input("volume is empty");
        assert_eq!(err.to_string(), "invalid input: volume is empty");

        let err = SegError::config("missing stage");
        assert_eq!(err.to_string(), "configuration: missing stage");

        let io = std::io::Error::other("boom");
        let err = SegError::processing(ProcessingStage::Crop, "bad bounds", io);
        assert_eq!(err.to_string(), "crop failed: bad bounds");
    }
}
