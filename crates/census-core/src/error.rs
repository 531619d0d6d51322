use thiserror::Error;

use crate::dataset::IntegrityViolation;

/// Core error type shared across census crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument violates a documented precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A record carries a value outside its semantic range.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// A generated graph does not satisfy its relationship invariants.
    #[error("integrity violation: {0}")]
    Integrity(#[from] IntegrityViolation),
}

/// Convenience alias for results returned by census crates.
pub type Result<T> = std::result::Result<T, Error>;
