//! Entity tree builder: locate or create the node for a classified
//! declaration, creating enclosing scopes on demand.

use doxa_core::{Access, EntityKind};

use super::{FriendEdge, NodeId, Origin, Tree};
use crate::classify::{DeclShape, FriendLink, ScopeStep};
use crate::comment::DocComment;
use crate::error::BuildError;
use crate::merge::{self, Attachment, MetadataConflict};

/// Outcome of placing one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Placement {
    Created(NodeId),
    Merged {
        id: NodeId,
        conflicts: Vec<MetadataConflict>,
    },
}

impl Tree {
    /// Find or create each scope step in turn; returns the innermost one.
    pub(crate) fn ensure_scopes(
        &mut self,
        unit: &str,
        line: Option<u32>,
        steps: &[ScopeStep],
    ) -> Result<NodeId, BuildError> {
        let mut parent = self.root_id();
        for step in steps {
            parent = match self.find_scope(&step.name, step.kind) {
                Some(id) => id,
                None => {
                    self.check_nesting(unit, line, parent, step.kind)?;
                    let inherited = self.member_access(parent);
                    let id = self.push_child(parent, step.name.clone(), step.kind);
                    let scope = self.entity_mut(id);
                    scope.class_key = step.class_key;
                    scope.enum_info.clone_from(&step.enum_info);
                    scope.access = inherited;
                    tracing::trace!(name = %step.name, kind = %step.kind, "created enclosing scope");
                    id
                }
            };
        }
        Ok(parent)
    }

    /// Place one declaration: create it under its parent, or merge it into
    /// the entity already keyed by its name and kind.
    pub(crate) fn place(
        &mut self,
        unit: &str,
        line: Option<u32>,
        shape: &DeclShape,
        attachment: Attachment,
        origin: &Origin,
    ) -> Result<Placement, BuildError> {
        if let Some(id) = self.id_of(&shape.name, shape.kind) {
            let conflicts = merge::merge_declaration(self.entity_mut(id), shape, attachment, origin);
            return Ok(Placement::Merged { id, conflicts });
        }

        let parent = self.ensure_scopes(unit, line, &shape.scopes)?;
        self.check_nesting(unit, line, parent, shape.kind)?;
        let id = self.push_child(parent, shape.name.clone(), shape.kind);
        // A fresh entity has every attribute unset, so merging cannot conflict.
        merge::merge_declaration(self.entity_mut(id), shape, attachment, origin);
        Ok(Placement::Created(id))
    }

    /// Record a friend edge on the befriending class, once per reference.
    pub(crate) fn record_friend(
        &mut self,
        unit: &str,
        line: Option<u32>,
        link: &FriendLink,
    ) -> Result<NodeId, BuildError> {
        let class = self.ensure_scopes(unit, line, &link.class_scopes)?;
        let entity = self.entity_mut(class);
        if !entity.friends.iter().any(|f| f.reference == link.reference) {
            entity.friends.push(FriendEdge {
                reference: link.reference.clone(),
                target: link.target,
                resolved: None,
            });
        }
        Ok(class)
    }

    /// Attach a unit-level comment to the unit's file entity.
    pub(crate) fn document_file(&mut self, unit: &str, doc: DocComment, origin: &Origin) -> NodeId {
        let id = self.file_entity(unit);
        let file = self.entity_mut(id);
        merge::apply_doc(file, Attachment::Doc(doc));
        merge::note_origin(file, origin);
        id
    }

    /// Access a newly created member of `parent` starts with.
    fn member_access(&self, parent: NodeId) -> Access {
        self.get(parent)
            .filter(|p| p.kind.is_record())
            .and_then(|p| p.class_key)
            .map_or(Access::None, doxa_core::ClassKey::default_access)
    }

    fn check_nesting(
        &self,
        unit: &str,
        line: Option<u32>,
        parent: NodeId,
        child: EntityKind,
    ) -> Result<(), BuildError> {
        let Some(owner) = self.get(parent) else {
            return Ok(());
        };
        let allowed = owner.kind.can_contain(child)
            || (parent == self.root_id() && child == EntityKind::Macro);
        if allowed {
            return Ok(());
        }
        Err(BuildError::IllegalNesting {
            unit: unit.to_string(),
            line,
            parent: if owner.name.is_root() {
                "<global>".to_string()
            } else {
                owner.name.to_string()
            },
            parent_kind: owner.kind,
            child,
        })
    }
}
