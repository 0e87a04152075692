//! Errors raised while loading doxa settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer failed to parse, or a key holds the wrong type.
    #[error("cannot load doxa settings: {0}")]
    Load(#[from] figment::Error),

    /// A key parsed but its value is unusable.
    #[error("setting '{key}' rejected: {reason}")]
    Rejected { key: String, reason: &'static str },
}

impl ConfigError {
    pub(crate) fn rejected(key: impl Into<String>, reason: &'static str) -> Self {
        Self::Rejected {
            key: key.into(),
            reason,
        }
    }
}
