//! Error types for the cost analytics module.

use thiserror::Error;

/// Cost analytics errors.
#[derive(Error, Debug)]
pub enum CostError {
    /// Not enough samples for a statistical operation
    #[error("insufficient data for {operation}: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Operation that was refused
        operation: &'static str,
        /// Minimum number of samples required
        required: usize,
        /// Number of samples supplied
        actual: usize,
    },

    /// Caller-supplied parameter out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (file reading)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CostError {
    /// Check if this error means the input history was too short.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, CostError::InsufficientData { .. })
    }

    /// Create a user-friendly message for this error.
    pub fn friendly_message(&self) -> String {
        match self {
            CostError::InsufficientData {
                operation,
                required,
                actual,
            } => {
                format!(
                    "Not enough history to {} ({} of {} days). Request a longer range.",
                    operation, actual, required
                )
            }
            CostError::Io(e) => {
                let msg = e.to_string().to_lowercase();
                if msg.contains("permission") {
                    "Permission denied. Check file permissions.".to_string()
                } else if msg.contains("not found") {
                    "File or directory not found.".to_string()
                } else {
                    format!("File system error: {}", e)
                }
            }
            _ => format!("Error: {}", self),
        }
    }
}

/// Result type for cost analytics operations.
pub type Result<T> = std::result::Result<T, CostError>;
