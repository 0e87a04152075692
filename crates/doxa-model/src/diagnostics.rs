//! Non-fatal findings of a pass.
//!
//! Nothing here stops a pass: orphaned comments, odd tags and metadata
//! conflicts are reported so a caller can warn about them, while the tree
//! is still built.

use serde::Serialize;

use crate::comment::ParseNote;
use crate::merge::MetadataConflict;
use crate::tree::Origin;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "diagnostic", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A leading comment with no eligible declaration after it.
    OrphanComment { origin: Origin, headline: String },
    /// A trailing comment with no declaration before it.
    OrphanTrailingComment { origin: Origin, headline: String },
    /// An unrecognised command; its text was kept as an `other` entry.
    UnknownTag {
        origin: Origin,
        marker: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        entity: Option<String>,
    },
    /// `\param`/`\tparam` without a subject, or a stray code-block closer.
    MalformedEntry {
        origin: Origin,
        marker: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        entity: Option<String>,
    },
    /// A code block left open at the end of its comment.
    UnterminatedCode {
        origin: Origin,
        #[serde(skip_serializing_if = "Option::is_none")]
        entity: Option<String>,
    },
    MergeConflict(MetadataConflict),
}

impl Diagnostic {
    /// Translate a parser note on a block that starts at `start_line`.
    pub(crate) fn from_note(
        note: &ParseNote,
        unit: &str,
        start_line: Option<u32>,
        entity: Option<String>,
    ) -> Self {
        let at = |line: usize| {
            let line = start_line.and_then(|start| {
                u32::try_from(line.saturating_sub(1))
                    .ok()
                    .and_then(|offset| start.checked_add(offset))
            });
            Origin::new(unit, line)
        };
        match note {
            ParseNote::UnknownTag { marker, line } => Self::UnknownTag {
                origin: at(*line),
                marker: marker.clone(),
                entity,
            },
            ParseNote::MalformedEntry { marker, line } => Self::MalformedEntry {
                origin: at(*line),
                marker: marker.clone(),
                entity,
            },
            ParseNote::UnterminatedCode { line } => Self::UnterminatedCode {
                origin: at(*line),
                entity,
            },
        }
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::MergeConflict(_))
    }

    #[must_use]
    pub const fn is_orphan(&self) -> bool {
        matches!(
            self,
            Self::OrphanComment { .. } | Self::OrphanTrailingComment { .. }
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let on = |entity: &Option<String>| {
            entity
                .as_deref()
                .map_or_else(String::new, |name| format!(" on '{name}'"))
        };
        match self {
            Self::OrphanComment { origin, headline } => {
                write!(f, "{origin}: comment is not attached to any declaration: {headline}")
            }
            Self::OrphanTrailingComment { origin, headline } => {
                write!(f, "{origin}: trailing comment follows no declaration: {headline}")
            }
            Self::UnknownTag {
                origin,
                marker,
                entity,
            } => write!(f, "{origin}: unknown command '{marker}'{}", on(entity)),
            Self::MalformedEntry {
                origin,
                marker,
                entity,
            } => write!(f, "{origin}: malformed '{marker}' entry{}", on(entity)),
            Self::UnterminatedCode { origin, entity } => {
                write!(f, "{origin}: unterminated code block{}", on(entity))
            }
            Self::MergeConflict(conflict) => write!(f, "{conflict}"),
        }
    }
}
