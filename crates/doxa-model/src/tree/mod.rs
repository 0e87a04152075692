//! The entity tree.
//!
//! An arena of [`Entity`] nodes addressed by [`NodeId`], keyed by
//! `(qualified name, kind)`. The tree is handed to renderers by shared
//! reference only; all mutation goes through the pass driver.
//!
//! Ownership edges (`parent` / `children`) form the tree proper. Friend
//! edges are separate, non-owning references stored on the befriending
//! class.

mod friends;
mod insert;
mod snapshot;

pub use snapshot::{EntitySnapshot, FriendSnapshot, TreeSnapshot};

pub(crate) use insert::Placement;

use std::collections::HashMap;

use doxa_core::{
    Access, ClassKey, EntityKind, EnumInfo, Provenance, QualifiedName, Qualifiers, TemplateParam,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::comment::DocComment;
use crate::event::FriendTargetKind;
use crate::merge::MetadataConflict;

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

/// Index of an entity in its tree. Stable for the tree's lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Where a declaration was seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Origin {
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Origin {
    #[must_use]
    pub fn new(unit: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            unit: unit.into(),
            line,
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}", self.unit),
            None => f.write_str(&self.unit),
        }
    }
}

/// A non-owning reference from a class to a befriended function or type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FriendEdge {
    /// Referenced name as written.
    pub reference: String,
    pub target: FriendTargetKind,
    /// Set once the reference names an entity of this tree.
    pub resolved: Option<NodeId>,
}

/// One documented program construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: NodeId,
    pub name: QualifiedName,
    pub kind: EntityKind,
    pub parent: Option<NodeId>,
    /// Owned children, in first-seen order.
    pub children: Vec<NodeId>,
    /// `Access::None` at namespace scope.
    pub access: Access,
    pub class_key: Option<ClassKey>,
    pub template_params: Vec<TemplateParam>,
    pub enum_info: Option<EnumInfo>,
    pub qualifiers: Qualifiers,
    pub return_type: Option<String>,
    pub trailing_return: bool,
    pub value: Option<String>,
    /// Seen with a body or member list at least once.
    pub defined: bool,
    pub doc: Option<DocComment>,
    pub provenance: Provenance,
    pub friends: Vec<FriendEdge>,
    pub conflicts: Vec<MetadataConflict>,
    pub origins: Vec<Origin>,
}

impl Entity {
    /// An entity with every attribute unset.
    pub(crate) fn blank(id: NodeId, name: QualifiedName, kind: EntityKind) -> Self {
        Self {
            id,
            name,
            kind,
            parent: None,
            children: Vec::new(),
            access: Access::None,
            class_key: None,
            template_params: Vec::new(),
            enum_info: None,
            qualifiers: Qualifiers::default(),
            return_type: None,
            trailing_return: false,
            value: None,
            defined: false,
            doc: None,
            provenance: Provenance::Undocumented,
            friends: Vec::new(),
            conflicts: Vec::new(),
            origins: Vec::new(),
        }
    }

    /// Unqualified name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.local_name()
    }

    #[must_use]
    pub fn is_documented(&self) -> bool {
        self.provenance == Provenance::Documented
    }

    #[must_use]
    pub fn is_conflicted(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

const ROOT: NodeId = NodeId(0);

/// The documentation model: one global namespace plus per-unit file entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Entity>,
    index: HashMap<(QualifiedName, EntityKind), NodeId>,
    files: Vec<NodeId>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding only the global namespace.
    #[must_use]
    pub fn new() -> Self {
        let root = Entity::blank(ROOT, QualifiedName::root(), EntityKind::Namespace);
        let mut index = HashMap::new();
        index.insert((QualifiedName::root(), EntityKind::Namespace), ROOT);
        Self {
            nodes: vec![root],
            index,
            files: Vec::new(),
        }
    }

    /// The global namespace.
    #[must_use]
    pub fn root(&self) -> &Entity {
        &self.nodes[ROOT.0]
    }

    #[must_use]
    pub const fn root_id(&self) -> NodeId {
        ROOT
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Entity> {
        self.nodes.get(id.0)
    }

    /// Number of entities, including the global namespace and file entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Nothing but the global namespace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Look up an entity by qualified name and kind.
    #[must_use]
    pub fn lookup(&self, name: &QualifiedName, kind: EntityKind) -> Option<&Entity> {
        self.index.get(&(name.clone(), kind)).and_then(|id| self.get(*id))
    }

    /// Every entity with this qualified name, ordered by kind.
    #[must_use]
    pub fn lookup_all(&self, name: &QualifiedName) -> Vec<&Entity> {
        let mut found: Vec<&Entity> = self
            .index
            .iter()
            .filter(|((n, _), _)| n == name)
            .filter_map(|(_, id)| self.get(*id))
            .collect();
        found.sort_by_key(|e| e.kind);
        found
    }

    /// Convenience lookup by `a::b::c` text; the first kind wins.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Entity> {
        let name = QualifiedName::parse(path).ok()?;
        self.lookup_all(&name)
            .into_iter()
            .find(|e| e.kind != EntityKind::File)
    }

    /// Owned children of `id`, in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Entity> {
        self.get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.get(*c))
    }

    /// Depth-first, children-in-order traversal starting at (and including) `id`.
    #[must_use]
    pub fn walk(&self, id: NodeId) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![(0, id)],
        }
    }

    /// Every entity in creation order, file entities included.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.nodes.iter()
    }

    /// File-level pseudo-entities, in first-seen order.
    pub fn files(&self) -> impl Iterator<Item = &Entity> {
        self.files.iter().filter_map(|id| self.get(*id))
    }

    #[must_use]
    pub fn file(&self, unit: &str) -> Option<&Entity> {
        self.index
            .get(&(file_name(unit), EntityKind::File))
            .and_then(|id| self.get(*id))
    }

    /// The entity a friend edge resolved to, if any.
    #[must_use]
    pub fn friend_target(&self, edge: &FriendEdge) -> Option<&Entity> {
        edge.resolved.and_then(|id| self.get(id))
    }

    /// Entities flagged with metadata conflicts.
    pub fn conflicted(&self) -> impl Iterator<Item = &Entity> {
        self.nodes.iter().filter(|e| e.is_conflicted())
    }

    // ── Crate-internal mutation ────────────────────────────────────

    pub(crate) fn entity_mut(&mut self, id: NodeId) -> &mut Entity {
        &mut self.nodes[id.0]
    }

    pub(crate) fn id_of(&self, name: &QualifiedName, kind: EntityKind) -> Option<NodeId> {
        self.index.get(&(name.clone(), kind)).copied()
    }

    /// The container at `name` a scope step of `kind` refers to. A record
    /// step also matches the other record spelling (plain or templated);
    /// namespaces and enums only match their own kind.
    pub(crate) fn find_scope(&self, name: &QualifiedName, kind: EntityKind) -> Option<NodeId> {
        if name.is_root() {
            return Some(ROOT);
        }
        self.id_of(name, kind).or_else(|| {
            let other_record = match kind {
                EntityKind::Struct => EntityKind::ClassTemplate,
                EntityKind::ClassTemplate => EntityKind::Struct,
                _ => return None,
            };
            self.id_of(name, other_record)
        })
    }

    /// Append a new entity under `parent`.
    pub(crate) fn push_child(
        &mut self,
        parent: NodeId,
        name: QualifiedName,
        kind: EntityKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut entity = Entity::blank(id, name.clone(), kind);
        entity.parent = Some(parent);
        self.nodes.push(entity);
        self.index.insert((name, kind), id);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// The file entity for `unit`, created on first use.
    pub(crate) fn file_entity(&mut self, unit: &str) -> NodeId {
        let name = file_name(unit);
        if let Some(id) = self.id_of(&name, EntityKind::File) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(Entity::blank(id, name.clone(), EntityKind::File));
        self.index.insert((name, EntityKind::File), id);
        self.files.push(id);
        id
    }
}

fn file_name(unit: &str) -> QualifiedName {
    QualifiedName::root().child(unit)
}

/// Depth-first iterator returned by [`Tree::walk`]; yields `(depth, entity)`.
pub struct Walk<'t> {
    tree: &'t Tree,
    stack: Vec<(usize, NodeId)>,
}

impl<'t> Iterator for Walk<'t> {
    type Item = (usize, &'t Entity);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        let entity = self.tree.get(id)?;
        self.stack
            .extend(entity.children.iter().rev().map(|c| (depth + 1, *c)));
        Some((depth, entity))
    }
}
