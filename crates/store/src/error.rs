//! Store errors

use greyledger_core::ChecksumError;
use thiserror::Error;

/// Errors raised while writing or reading session logs
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checksum computation failed: {0}")]
    Checksum(#[from] ChecksumError),
}

impl StoreError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io(..) => "IO_ERROR",
            StoreError::Serialization(..) => "SERIALIZATION_ERROR",
            StoreError::Checksum(..) => "CHECKSUM_FAILED",
        }
    }
}
