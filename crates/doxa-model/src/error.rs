//! Build error types.
//!
//! A `BuildError` means the front end broke the input contract badly enough
//! that the pass cannot be applied consistently. The pass is rejected as a
//! whole; documentation-level problems are diagnostics, never errors.

use doxa_core::{CoreError, EntityKind};
use thiserror::Error;

use crate::event::KindHint;

#[derive(Debug, Error)]
pub enum BuildError {
    /// A declaration or one of its scope segments has no name.
    #[error("{unit}:{}: {what} has an empty name", line_label(.line))]
    EmptyName {
        unit: String,
        line: Option<u32>,
        what: String,
    },

    /// A name could not be turned into a qualified name.
    #[error("{unit}:{}: {source}", line_label(.line))]
    InvalidName {
        unit: String,
        line: Option<u32>,
        #[source]
        source: CoreError,
    },

    /// A kind appears somewhere it cannot be owned.
    #[error(
        "{unit}:{}: a {child} cannot be nested in {parent_kind} '{parent}'",
        line_label(.line)
    )]
    IllegalNesting {
        unit: String,
        line: Option<u32>,
        parent: String,
        parent_kind: EntityKind,
        child: EntityKind,
    },

    /// A declaration needs an enclosing scope it does not have.
    #[error("{unit}:{}: {kind} '{name}' {reason}", line_label(.line))]
    MisplacedDeclaration {
        unit: String,
        line: Option<u32>,
        kind: KindHint,
        name: String,
        reason: &'static str,
    },
}

impl BuildError {
    /// Unit name of the rejected pass.
    #[must_use]
    pub fn unit(&self) -> &str {
        match self {
            Self::EmptyName { unit, .. }
            | Self::InvalidName { unit, .. }
            | Self::IllegalNesting { unit, .. }
            | Self::MisplacedDeclaration { unit, .. } => unit,
        }
    }
}

#[allow(clippy::ref_option)]
fn line_label(line: &Option<u32>) -> String {
    line.map_or_else(|| "?".to_string(), |l| l.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_unit_and_line() {
        let err = BuildError::IllegalNesting {
            unit: "code.h".to_string(),
            line: Some(12),
            parent: "test::struct_1".to_string(),
            parent_kind: EntityKind::Struct,
            child: EntityKind::Namespace,
        };
        assert_eq!(
            err.to_string(),
            "code.h:12: a namespace cannot be nested in struct 'test::struct_1'"
        );
        assert_eq!(err.unit(), "code.h");
    }

    #[test]
    fn missing_line_renders_placeholder() {
        let err = BuildError::EmptyName {
            unit: "a.h".to_string(),
            line: None,
            what: "struct".to_string(),
        };
        assert_eq!(err.to_string(), "a.h:?: struct has an empty name");
    }
}
