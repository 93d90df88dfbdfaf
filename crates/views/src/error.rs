//! View errors

use thiserror::Error;

/// Errors that can occur when building a view
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Invalid time window: start {start} must be positive and <= end {end}")]
    InvalidWindow { start: i64, end: i64 },
}

impl ViewError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ViewError::InvalidWindow { .. } => "INVALID_WINDOW",
        }
    }
}
