use quotefall_core::ResolveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    /// Stable process exit code per failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Resolve(ResolveError::Validation(_)) => 2,
            Self::Serialization(_) => 3,
            Self::Resolve(ResolveError::PriceUnavailable) => 4,
            Self::Resolve(ResolveError::Internal(_)) => 5,
        }
    }
}
