//! Pass driver configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_parallel() -> bool {
    true
}

/// Declarations in a pass before classification goes parallel.
const fn default_parallel_threshold() -> usize {
    64
}

const fn default_resolve_friends() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuilderConfig {
    /// Classify declarations and parse comments on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Minimum number of declarations in a pass before the parallel path is used.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Link friend edges to entities after every pass.
    #[serde(default = "default_resolve_friends")]
    pub resolve_friends: bool,
}

impl BuilderConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel && self.parallel_threshold == 0 {
            return Err(ConfigError::rejected(
                "builder.parallel_threshold",
                "must be at least 1 when parallel is enabled",
            ));
        }
        Ok(())
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            parallel_threshold: default_parallel_threshold(),
            resolve_friends: default_resolve_friends(),
        }
    }
}
