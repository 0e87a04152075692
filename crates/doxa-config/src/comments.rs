//! Comment tag parsing configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ConfigError;

/// Aliases every project gets. User aliases may add to these but not replace them.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("cpp", r"\code{.cpp}"),
    ("ecpp", r"\endcode"),
    ("endcpp", r"\endcode"),
    ("out", r"\code{.shell-session}"),
    ("eout", r"\endcode"),
    ("endout", r"\endcode"),
    ("python", r"\code{.py}"),
    ("epython", r"\endcode"),
    ("endpython", r"\endcode"),
    ("cmake", r"\code{.cmake}"),
    ("ecmake", r"\endcode"),
    ("endcmake", r"\endcode"),
    ("javascript", r"\code{.js}"),
    ("ejavascript", r"\endcode"),
    ("endjavascript", r"\endcode"),
    ("json", r"\code{.js}"),
    ("ejson", r"\endcode"),
    ("endjson", r"\endcode"),
    ("shell", r"\code{.shell-session}"),
    ("eshell", r"\endcode"),
    ("endshell", r"\endcode"),
    ("bash", r"\code{.sh}"),
    ("ebash", r"\endcode"),
    ("endbash", r"\endcode"),
    ("detail", r"\details"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommentConfig {
    /// Project-specific command aliases, e.g. `rust = "\code{.rs}"`.
    ///
    /// Keys are command names without the leading `\` or `@`; values are
    /// the text substituted for the command at the start of a line.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    /// Treat an untagged first paragraph as the brief description.
    #[serde(default)]
    pub auto_brief: bool,

    /// Keep text following `\internal` in the extracted documentation.
    #[serde(default)]
    pub internal_docs: bool,
}

impl CommentConfig {
    /// Built-in aliases merged with the project's own.
    #[must_use]
    pub fn alias_table(&self) -> BTreeMap<String, String> {
        let mut table: BTreeMap<String, String> = BUILTIN_ALIASES
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        for (k, v) in &self.aliases {
            table.entry(k.clone()).or_insert_with(|| v.clone());
        }
        table
    }

    /// Whether `name` is one of the built-in aliases.
    #[must_use]
    pub fn is_builtin_alias(name: &str) -> bool {
        BUILTIN_ALIASES.iter().any(|(k, _)| *k == name)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (name, replacement) in &self.aliases {
            if Self::is_builtin_alias(name) {
                return Err(ConfigError::rejected(
                    format!("comments.aliases.{name}"),
                    "cannot override a built-in alias",
                ));
            }
            let valid_name = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid_name {
                return Err(ConfigError::rejected(
                    format!("comments.aliases.{name}"),
                    "alias names must be non-empty and alphanumeric",
                ));
            }
            if replacement.trim().is_empty() {
                return Err(ConfigError::rejected(
                    format!("comments.aliases.{name}"),
                    "replacement text is empty",
                ));
            }
        }
        Ok(())
    }
}
