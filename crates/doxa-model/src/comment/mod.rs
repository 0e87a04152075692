//! Comment tag parsing: one raw comment block into a structured [`DocComment`].
//!
//! The parser is an explicit two-state machine (outside / inside a verbatim
//! code block), so that code-block content is never read as tags.
//!
//! Recognised markers (written with `\` or `@`):
//!
//! | Marker | Effect |
//! |--------|--------|
//! | `brief`, `short` | opens the brief |
//! | `details` | opens the details |
//! | `param[dir]`, `tparam` | opens a tagged entry; first word is the subject |
//! | `return`, `returns`, `result` | opens the returns entry |
//! | `code{.lang}` … `endcode`, fences | verbatim code segment in the details |
//! | `file` | marks the block as describing the whole unit |
//! | `internal` … `endinternal` | flags the comment; text dropped unless configured |
//!
//! Every other command becomes an `other` entry keyed by its raw marker.

mod markers;
mod parser;

#[cfg(test)]
mod tests;

pub use parser::CommentParser;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// DocComment
// ---------------------------------------------------------------------------

/// One segment of the details section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "segment", rename_all = "snake_case")]
pub enum DetailSegment {
    Paragraph {
        text: String,
    },
    /// Verbatim code; `text` is the block's lines joined with `\n`.
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        text: String,
    },
}

/// Category of a tagged entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Param,
    Tparam,
    Returns,
    Other,
}

impl TagKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Param => "param",
            Self::Tparam => "tparam",
            Self::Returns => "returns",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(subject?, text)`; the subject is absent for `returns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaggedEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// `in`, `out` or `in,out` for `\param[...]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub text: String,
}

/// The structured parse of one comment block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DocComment {
    #[serde(default)]
    pub brief: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<DetailSegment>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entries: BTreeMap<TagKind, Vec<TaggedEntry>>,
    /// Trailing member annotation (`///<`), never promoted to brief/details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_note: Option<String>,
    #[serde(default)]
    pub file_level: bool,
    #[serde(default)]
    pub internal: bool,
}

impl DocComment {
    /// A comment consisting only of a trailing note.
    #[must_use]
    pub fn inline(note: impl Into<String>) -> Self {
        Self {
            inline_note: Some(note.into()),
            ..Self::default()
        }
    }

    /// No text of any kind was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brief.is_empty()
            && self.details.is_empty()
            && self.entries.is_empty()
            && self.inline_note.is_none()
    }

    #[must_use]
    pub fn entries_of(&self, kind: TagKind) -> &[TaggedEntry] {
        self.entries.get(&kind).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn params(&self) -> &[TaggedEntry] {
        self.entries_of(TagKind::Param)
    }

    #[must_use]
    pub fn tparams(&self) -> &[TaggedEntry] {
        self.entries_of(TagKind::Tparam)
    }

    /// Text of the first `\returns` entry.
    #[must_use]
    pub fn returns(&self) -> Option<&str> {
        self.entries_of(TagKind::Returns)
            .first()
            .map(|e| e.text.as_str())
    }

    /// Paragraph text of the details, paragraphs separated by a blank line.
    /// Code segments are skipped.
    #[must_use]
    pub fn details_text(&self) -> String {
        self.details
            .iter()
            .filter_map(|segment| match segment {
                DetailSegment::Paragraph { text } => Some(text.as_str()),
                DetailSegment::Code { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Code segments of the details, in order.
    pub fn code_blocks(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.details.iter().filter_map(|segment| match segment {
            DetailSegment::Code { language, text } => Some((language.as_deref(), text.as_str())),
            DetailSegment::Paragraph { .. } => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Parse notes
// ---------------------------------------------------------------------------

/// Non-fatal observations made while parsing one block.
///
/// `line` is 1-based within the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "note", rename_all = "snake_case")]
pub enum ParseNote {
    /// A command with no dedicated slot; its text went to `other`.
    UnknownTag { marker: String, line: usize },
    /// `\param` / `\tparam` with no subject token, or a stray `\endcode`.
    MalformedEntry { marker: String, line: usize },
    /// A code block still open at the end of the comment.
    UnterminatedCode { line: usize },
}

/// Result of parsing one block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedComment {
    pub doc: DocComment,
    pub notes: Vec<ParseNote>,
}
