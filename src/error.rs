use thiserror::Error;

use crate::species::SpeciesCode;

/// Fatal configuration problems. Raised while validating a configuration,
/// building a world or preparing a tick, never once a tick commits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown species code {0}")]
    UnknownSpecies(SpeciesCode),
    #[error("no seed budget configured for height level {0}")]
    MissingSeedBudget(u8),
    #[error("malformed bounding region: {0}")]
    MalformedRegion(String),
    #[error("tree ids exhausted: {requested} more requested after {next_id}")]
    IdsExhausted { next_id: u64, requested: usize },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
