//! Qualified names: the ordered name segments from the global scope.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

/// Scope separator used when rendering and parsing names.
pub const SEPARATOR: &str = "::";

/// A fully qualified name, e.g. `["test", "nested", "concept_2"]`.
///
/// The empty name denotes the global namespace.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct QualifiedName(Vec<String>);

impl QualifiedName {
    /// The global namespace.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a name from segments, rejecting empty ones.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidName` if any segment is empty or blank.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if let Some(pos) = segments.iter().position(|s| s.trim().is_empty()) {
            return Err(CoreError::InvalidName {
                name: segments.join(SEPARATOR),
                reason: format!("segment {pos} is empty"),
            });
        }
        Ok(Self(segments))
    }

    /// Parse `a::b::c`. A leading `::` (explicit global qualification) is accepted.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidName` on empty input or an empty segment.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let trimmed = text.trim();
        let body = trimmed.strip_prefix(SEPARATOR).unwrap_or(trimmed);
        if body.is_empty() {
            return Err(CoreError::InvalidName {
                name: text.to_string(),
                reason: "name is empty".to_string(),
            });
        }
        Self::from_segments(body.split(SEPARATOR).map(str::trim))
    }

    /// A new name with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// The enclosing name, or `None` for the global namespace.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// The unqualified (last) segment; empty for the global namespace.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Join `other` onto this name (`self::other`).
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// Every prefix of this name from the global namespace down to itself.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (0..=self.0.len()).map(move |n| Self(self.0[..n].to_vec()))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_splits_segments() {
        let name = QualifiedName::parse("test::nested::concept_2").unwrap();
        assert_eq!(name.segments(), ["test", "nested", "concept_2"]);
        assert_eq!(name.local_name(), "concept_2");
        assert_eq!(name.to_string(), "test::nested::concept_2");
    }

    #[test]
    fn parse_accepts_global_qualification() {
        let name = QualifiedName::parse("::std::size_t").unwrap();
        assert_eq!(name.segments(), ["std", "size_t"]);
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(QualifiedName::parse("a::::b").is_err());
        assert!(QualifiedName::parse("").is_err());
        assert!(QualifiedName::from_segments(["a", " "]).is_err());
    }

    #[test]
    fn parent_and_child_are_inverse() {
        let ns = QualifiedName::parse("n").unwrap();
        let s = ns.child("s");
        assert_eq!(s.parent(), Some(ns));
        assert_eq!(QualifiedName::root().parent(), None);
    }

    #[test]
    fn ancestors_run_outermost_first() {
        let name = QualifiedName::parse("a::b").unwrap();
        let rendered: Vec<String> = name.ancestors().map(|n| n.to_string()).collect();
        assert_eq!(rendered, vec!["", "a", "a::b"]);
    }
}
