//! Audit errors

use greyledger_core::ChecksumError;
use thiserror::Error;

/// Errors that can occur when running an audit
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit timestamp must be a positive integer: {timestamp}")]
    InvalidTimestamp { timestamp: i64 },

    #[error("Checksum computation failed: {0}")]
    Checksum(#[from] ChecksumError),
}

impl AuditError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AuditError::InvalidTimestamp { .. } => "INVALID_TIMESTAMP",
            AuditError::Checksum(..) => "CHECKSUM_FAILED",
        }
    }
}
