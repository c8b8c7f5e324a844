//! Error types for Strata

use thiserror::Error;

/// Result type alias for Strata operations
pub type Result<T> = std::result::Result<T, StrataError>;

/// Strata error types
#[derive(Error, Debug)]
pub enum StrataError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Checksum mismatch
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Filter parameters cannot be resolved
    #[error("Insufficient filter parameters: {0}")]
    InsufficientParameters(String),

    /// Filter parameter outside its valid range
    #[error("Invalid filter parameter: {0}")]
    InvalidParameter(String),

    /// Hash strategy id not recognized
    #[error("Unknown hash strategy: {0}")]
    UnknownHashStrategy(u8),
}

impl StrataError {
    /// Check if error indicates a corrupted file
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StrataError::InvalidFormat(_) | StrataError::ChecksumMismatch { .. }
        )
    }

    /// Check if error indicates a caller-side contract violation
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            StrataError::InsufficientParameters(_) | StrataError::InvalidParameter(_)
        )
    }
}
