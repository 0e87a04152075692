//! Merge engine: reconciles a declaration with the entity it re-describes.
//!
//! Policy per attribute:
//!
//! - access, record key, template parameters, enum base, return type and
//!   value are *fill-if-unset*. An explicit older value is never replaced by
//!   a different explicit newer one; that case is flagged as a
//!   [`MetadataConflict`] and the older value is kept.
//! - qualifiers are unioned, `defined` and `trailing_return` are OR-ed.
//! - documentation is *latest wins*: a newer attached comment replaces the
//!   older one, no attached comment leaves it alone.
//! - origins are appended once each.
//!
//! Children need no merging here: they are keyed by qualified name and
//! kind, so a redeclared child resolves to the existing node.

use doxa_core::{Access, EntityKind, Provenance, QualifiedName, TemplateParam, same_template_shape};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::classify::DeclShape;
use crate::comment::DocComment;
use crate::tree::{Entity, Origin};

/// Documentation bound to one declaration by the attachment resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attachment {
    /// No eligible comment.
    #[default]
    None,
    /// An eligible comment with no content.
    Blank,
    Doc(DocComment),
}

/// Attribute on which two declarations of one entity disagreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAttribute {
    Access,
    ClassKey,
    TemplateParams,
    EnumBase,
    ReturnType,
    Value,
}

impl ConflictAttribute {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::ClassKey => "class_key",
            Self::TemplateParams => "template_params",
            Self::EnumBase => "enum_base",
            Self::ReturnType => "return_type",
            Self::Value => "value",
        }
    }
}

impl std::fmt::Display for ConflictAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two explicit, different values for one attribute of one entity.
/// The entity keeps `existing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MetadataConflict {
    pub entity: QualifiedName,
    pub kind: EntityKind,
    pub attribute: ConflictAttribute,
    pub existing: String,
    pub incoming: String,
    /// First declaration of the entity.
    pub existing_origin: Option<Origin>,
    pub incoming_origin: Origin,
}

impl std::fmt::Display for MetadataConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}': {} is '{}'",
            self.kind, self.entity, self.attribute, self.existing
        )?;
        if let Some(origin) = &self.existing_origin {
            write!(f, " (from {origin})")?;
        }
        write!(
            f,
            " but {} declares '{}'; keeping the earlier value",
            self.incoming_origin, self.incoming
        )
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Collects conflicts while one declaration is folded into an entity.
struct Reconciler<'a> {
    entity: QualifiedName,
    kind: EntityKind,
    existing_origin: Option<Origin>,
    incoming_origin: &'a Origin,
    found: Vec<MetadataConflict>,
}

impl Reconciler<'_> {
    fn flag(&mut self, attribute: ConflictAttribute, existing: String, incoming: String) {
        self.found.push(MetadataConflict {
            entity: self.entity.clone(),
            kind: self.kind,
            attribute,
            existing,
            incoming,
            existing_origin: self.existing_origin.clone(),
            incoming_origin: self.incoming_origin.clone(),
        });
    }

    /// Fill `slot` if unset; flag a conflict if both are set and differ.
    fn fill<T: PartialEq + Clone>(
        &mut self,
        attribute: ConflictAttribute,
        slot: &mut Option<T>,
        incoming: Option<&T>,
        render: impl Fn(&T) -> String,
    ) {
        let Some(incoming) = incoming else {
            return;
        };
        match slot {
            None => *slot = Some(incoming.clone()),
            Some(existing) if existing != incoming => {
                let existing = render(existing);
                self.flag(attribute, existing, render(incoming));
            }
            Some(_) => {}
        }
    }
}

/// Fold one classified declaration into `entity`.
///
/// Returns the conflicts this declaration raised. New conflicts are also
/// recorded on the entity (each distinct conflict once).
pub(crate) fn merge_declaration(
    entity: &mut Entity,
    shape: &DeclShape,
    attachment: Attachment,
    origin: &Origin,
) -> Vec<MetadataConflict> {
    let mut rec = Reconciler {
        entity: entity.name.clone(),
        kind: entity.kind,
        existing_origin: entity.origins.first().cloned(),
        incoming_origin: origin,
        found: Vec::new(),
    };

    // Access: `None` means unset.
    if shape.access != Access::None {
        if entity.access == Access::None {
            entity.access = shape.access;
        } else if entity.access != shape.access {
            rec.flag(
                ConflictAttribute::Access,
                entity.access.to_string(),
                shape.access.to_string(),
            );
        }
    }

    rec.fill(
        ConflictAttribute::ClassKey,
        &mut entity.class_key,
        shape.class_key.as_ref(),
        ToString::to_string,
    );

    if !shape.template_params.is_empty() {
        if entity.template_params.is_empty() {
            entity.template_params.clone_from(&shape.template_params);
        } else if !same_template_shape(&entity.template_params, &shape.template_params) {
            rec.flag(
                ConflictAttribute::TemplateParams,
                render_params(&entity.template_params),
                render_params(&shape.template_params),
            );
        }
    }

    if let Some(incoming) = &shape.enum_info {
        match &mut entity.enum_info {
            None => entity.enum_info = Some(incoming.clone()),
            Some(existing) if existing.base.is_default() => {
                existing.base = incoming.base.clone();
            }
            Some(existing) if !incoming.base.is_default() && existing.base != incoming.base => {
                let existing = existing.base.to_string();
                rec.flag(ConflictAttribute::EnumBase, existing, incoming.base.to_string());
            }
            Some(_) => {}
        }
    }

    rec.fill(
        ConflictAttribute::ReturnType,
        &mut entity.return_type,
        shape.return_type.as_ref(),
        Clone::clone,
    );
    rec.fill(
        ConflictAttribute::Value,
        &mut entity.value,
        shape.value.as_ref(),
        Clone::clone,
    );

    entity.trailing_return |= shape.trailing_return;
    entity.qualifiers.absorb(shape.qualifiers);
    entity.defined |= shape.defined;

    apply_doc(entity, attachment);
    note_origin(entity, origin);

    for conflict in &rec.found {
        if !entity.conflicts.contains(conflict) {
            entity.conflicts.push(conflict.clone());
        }
    }
    rec.found
}

/// Latest-wins documentation replacement.
pub(crate) fn apply_doc(entity: &mut Entity, attachment: Attachment) {
    match attachment {
        Attachment::Doc(doc) => {
            entity.doc = Some(doc);
            entity.provenance = Provenance::Documented;
        }
        Attachment::Blank if entity.doc.is_none() => {
            entity.provenance = Provenance::Blank;
        }
        Attachment::Blank | Attachment::None => {}
    }
}

pub(crate) fn note_origin(entity: &mut Entity, origin: &Origin) {
    if !entity.origins.contains(origin) {
        entity.origins.push(origin.clone());
    }
}

fn render_params(params: &[TemplateParam]) -> String {
    let rendered: Vec<String> = params
        .iter()
        .map(|p| match p.kind {
            Some(kind) => format!("{kind} {}", p.name),
            None => p.name.clone(),
        })
        .collect();
    format!("<{}>", rendered.join(", "))
}
