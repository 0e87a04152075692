//! # doxa-config
//!
//! Settings for the doxa model builder, read through figment.
//!
//! Layers, later ones overriding earlier ones:
//! 1. Compiled-in defaults
//! 2. `~/.config/doxa/config.toml`
//! 3. `.doxa/config.toml` in the working directory
//! 4. `DOXA_*` environment variables
//!
//! Nested keys use a double underscore in the environment, so
//! `DOXA_BUILDER__PARALLEL_THRESHOLD=16` sets `builder.parallel_threshold`
//! and `DOXA_COMMENTS__AUTO_BRIEF=true` sets `comments.auto_brief`.
//!
//! ```no_run
//! use doxa_config::DoxaConfig;
//!
//! let settings = DoxaConfig::load().expect("settings");
//! if !settings.builder.parallel {
//!     println!("passes run on the calling thread");
//! }
//! ```

mod builder;
mod comments;
mod error;

pub use builder::BuilderConfig;
pub use comments::CommentConfig;
pub use error::ConfigError;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PROJECT_FILE: &str = ".doxa/config.toml";
const ENV_PREFIX: &str = "DOXA_";

/// Every setting the builder reads, grouped by the component it drives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DoxaConfig {
    #[serde(default)]
    pub comments: CommentConfig,
    #[serde(default)]
    pub builder: BuilderConfig,
}

impl DoxaConfig {
    /// Read every layer and validate the result.
    ///
    /// A `.env` file is not consulted; see [`Self::load_with_dotenv`].
    ///
    /// # Errors
    /// Fails when a layer cannot be parsed or a value is rejected.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// [`Self::load`], after exporting a `.env` file from the working
    /// directory (if one exists) into the process environment.
    ///
    /// # Errors
    /// Fails when a layer cannot be parsed or a value is rejected.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        if let Err(error) = dotenvy::dotenv() {
            tracing::trace!(%error, "no .env file loaded");
        }
        Self::load()
    }

    /// Extract settings from a caller-assembled figment and validate them.
    ///
    /// # Errors
    /// Fails when extraction fails or a value is rejected.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let settings: Self = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The layered figment [`Self::load`] extracts from.
    #[must_use]
    pub fn figment() -> Figment {
        let defaults = Figment::from(Serialized::defaults(Self::default()));
        let with_user = match Self::user_file() {
            Some(path) if path.exists() => defaults.merge(Toml::file(path)),
            _ => defaults,
        };
        let project = Path::new(PROJECT_FILE);
        let with_project = if project.exists() {
            with_user.merge(Toml::file(project))
        } else {
            with_user
        };
        with_project.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check the constraints serde cannot express.
    ///
    /// # Errors
    /// Returns [`ConfigError::Rejected`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.comments.validate()?;
        self.builder.validate()
    }

    fn user_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("doxa").join("config.toml"))
    }
}
