//! Error types for costlens runtime setup.
//!
//! Analytics failures live in `costlens-analytics`; this module only covers
//! what can go wrong before any cost data is touched: locating the data
//! directory and bringing up logging.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`CostlensError`].
pub type Result<T> = std::result::Result<T, CostlensError>;

/// Errors raised while preparing the costlens runtime.
#[derive(Debug, Error)]
pub enum CostlensError {
    /// HOME is not set, so no default data directory can be derived
    #[error("HOME environment variable not set")]
    HomeNotSet,

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Global tracing subscriber could not be installed
    #[error("Failed to initialize logging: {message}")]
    LoggingInit { message: String },
}

impl CostlensError {
    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::HomeNotSet => Some("Set HOME or pass --log-dir explicitly"),
            Self::DirectoryCreation { .. } => {
                Some("Check permissions on the parent directory or pass --log-dir")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_for_home_not_set() {
        assert!(CostlensError::HomeNotSet.guidance().is_some());
    }

    #[test]
    fn test_logging_init_has_no_guidance() {
        let err = CostlensError::LoggingInit {
            message: "subscriber already set".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to initialize logging: subscriber already set"
        );
        assert!(err.guidance().is_none());
    }

    #[test]
    fn test_directory_creation_keeps_source() {
        use std::error::Error as _;

        let err = CostlensError::DirectoryCreation {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/nope"));
    }
}
