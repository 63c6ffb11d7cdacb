//! Error types for filedrop.

use thiserror::Error;

/// Common error type for filedrop.
#[derive(Error, Debug)]
pub enum FiledropError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input (missing file, bad extension, oversize, bad selection).
    #[error("validation error: {0}")]
    Validation(String),

    /// The original filename cannot be encoded.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// A logical name escapes the store root.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A stored name is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Operation is not supported by this store.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// ZIP writer error.
    #[error("archive error: {0}")]
    Archive(#[from] async_zip::error::ZipError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for filedrop operations.
pub type Result<T> = std::result::Result<T, FiledropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = FiledropError::Validation("file too large".to_string());
        assert_eq!(err.to_string(), "validation error: file too large");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = FiledropError::NotFound("File: a.txt".to_string());
        assert_eq!(err.to_string(), "File: a.txt not found");
    }

    #[test]
    fn test_invalid_path_error_display() {
        let err = FiledropError::InvalidPath("../etc/passwd".to_string());
        assert_eq!(err.to_string(), "invalid path: ../etc/passwd");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FiledropError = io_err.into();
        assert!(matches!(err, FiledropError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(FiledropError::Conflict("name".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
