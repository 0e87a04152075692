//! Owned, serializable view of a [`Tree`].
//!
//! Snapshots are what renderers and golden tests consume: children are
//! nested in order, ids are replaced by qualified names, and empty
//! attributes are omitted from the JSON form.

use doxa_core::{Access, ClassKey, EntityKind, EnumInfo, Provenance, TemplateParam};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Entity, FriendEdge, Origin, Tree};
use crate::comment::DocComment;
use crate::event::FriendTargetKind;
use crate::merge::MetadataConflict;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FriendSnapshot {
    pub reference: String,
    pub target: FriendTargetKind,
    /// Qualified name of the resolved entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntitySnapshot {
    pub name: String,
    pub qualified_name: String,
    pub kind: EntityKind,
    #[serde(default = "no_access", skip_serializing_if = "is_no_access")]
    pub access: Access,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_key: Option<ClassKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_params: Vec<TemplateParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_info: Option<EnumInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub trailing_return: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub defined: bool,
    #[serde(default)]
    pub provenance: Provenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<DocComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub friends: Vec<FriendSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<MetadataConflict>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub origins: Vec<Origin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntitySnapshot>,
}

const fn no_access() -> Access {
    Access::None
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_no_access(access: &Access) -> bool {
    *access == Access::None
}

impl EntitySnapshot {
    /// Child snapshot by local name; the first kind in order wins.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Descendant snapshot by `a::b` path relative to this one.
    #[must_use]
    pub fn descendant(&self, path: &str) -> Option<&Self> {
        path.split("::")
            .map(str::trim)
            .try_fold(self, |node, segment| node.child(segment))
    }
}

/// The whole model: the global namespace plus file-level entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TreeSnapshot {
    pub root: EntitySnapshot,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<EntitySnapshot>,
}

impl TreeSnapshot {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// JSON Schema of the snapshot format.
    #[must_use]
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Self)).unwrap_or_default()
    }
}

impl Tree {
    /// Capture the current model.
    #[must_use]
    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            root: self.snapshot_entity(self.root()),
            files: self.files().map(|file| self.snapshot_entity(file)).collect(),
        }
    }

    fn snapshot_entity(&self, entity: &Entity) -> EntitySnapshot {
        EntitySnapshot {
            name: entity.local_name().to_string(),
            qualified_name: entity.name.to_string(),
            kind: entity.kind,
            access: entity.access,
            class_key: entity.class_key,
            template_params: entity.template_params.clone(),
            enum_info: entity.enum_info.clone(),
            qualifiers: entity
                .qualifiers
                .keywords()
                .into_iter()
                .map(str::to_string)
                .collect(),
            return_type: entity.return_type.clone(),
            trailing_return: entity.trailing_return,
            value: entity.value.clone(),
            defined: entity.defined,
            provenance: entity.provenance,
            doc: entity.doc.clone(),
            friends: entity
                .friends
                .iter()
                .map(|edge| self.snapshot_friend(edge))
                .collect(),
            conflicts: entity.conflicts.clone(),
            origins: entity.origins.clone(),
            children: self
                .children(entity.id)
                .map(|child| self.snapshot_entity(child))
                .collect(),
        }
    }

    fn snapshot_friend(&self, edge: &FriendEdge) -> FriendSnapshot {
        FriendSnapshot {
            reference: edge.reference.clone(),
            target: edge.target,
            resolved: self.friend_target(edge).map(|e| e.name.to_string()),
        }
    }
}

impl From<&Tree> for TreeSnapshot {
    fn from(tree: &Tree) -> Self {
        tree.snapshot()
    }
}
