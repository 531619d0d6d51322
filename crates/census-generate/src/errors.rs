use thiserror::Error;

use crate::text::TextField;

/// Errors emitted by the generator.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no new distinct {field} after {attempts} attempts")]
    NameSpaceExhausted { field: TextField, attempts: u32 },
    #[error("unsupported locale '{0}'")]
    UnsupportedLocale(String),
    #[error(transparent)]
    Core(#[from] census_core::Error),
}
