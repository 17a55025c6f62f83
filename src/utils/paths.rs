//! Input file classification and path validation.

use crate::core::config::errors::ConfigError;
use std::path::Path;

/// Recognized TIFF extensions.
pub const TIFF_EXTENSIONS: [&str; 2] = ["tiff", "tif"];

/// Recognized HDF5 extensions.
pub const H5_EXTENSIONS: [&str; 4] = ["hdf", "h5", "hd5", "hdf5"];

/// Dataset keys an input HDF5 file may carry.
pub const H5_KEYS: [&str; 3] = ["raw", "predictions", "segmentation"];

/// Format of an input volume, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// TIFF stack.
    Tiff,
    /// HDF5 dataset.
    Hdf5,
}

/// Classifies an input path by extension.
pub fn classify_input(path: &Path) -> Option<InputFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if TIFF_EXTENSIONS.contains(&ext.as_str()) {
        Some(InputFormat::Tiff)
    } else if H5_EXTENSIONS.contains(&ext.as_str()) {
        Some(InputFormat::Hdf5)
    } else {
        None
    }
}

/// Validates the configured input path.
///
/// The path must exist; when it points at a file (rather than a directory
/// of inputs) its extension must be a recognized volume format.
pub fn validate_input_path(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::InputPathNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_file() && classify_input(path).is_none() {
        return Err(ConfigError::InvalidConfig {
            message: format!(
                "unsupported input format for {}; expected one of {:?} or {:?}",
                path.display(),
                TIFF_EXTENSIONS,
                H5_EXTENSIONS
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_classify_input() {
        assert_eq!(
            classify_input(Path::new("stack.tiff")),
            Some(InputFormat::Tiff)
        );
        assert_eq!(
            classify_input(Path::new("stack.TIF")),
            Some(InputFormat::Tiff)
        );
        assert_eq!(
            classify_input(Path::new("sample.h5")),
            Some(InputFormat::Hdf5)
        );
        assert_eq!(
            classify_input(Path::new("sample.hdf5")),
            Some(InputFormat::Hdf5)
        );
        assert_eq!(classify_input(Path::new("notes.txt")), None);
        assert_eq!(classify_input(Path::new("no_extension")), None);
    }

    #[test]
    fn test_validate_input_path_missing() {
        let err = validate_input_path(Path::new("/definitely/not/here.h5")).unwrap_err();
        assert!(matches!(err, ConfigError::InputPathNotFound { .. }));
    }

    #[test]
    fn test_validate_input_path_directory_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_input_path(dir.path()).is_ok());
    }

    #[test]
    fn test_validate_input_path_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let file: PathBuf = dir.path().join("volume.txt");
        std::fs::write(&file, b"not a volume").unwrap();
        assert!(validate_input_path(&file).is_err());

        let file = dir.path().join("volume.h5");
        std::fs::write(&file, b"stub").unwrap();
        assert!(validate_input_path(&file).is_ok());
    }
}
