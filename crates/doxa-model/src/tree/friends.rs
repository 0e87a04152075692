//! Friend reference resolution.
//!
//! A friend reference is written relative to the befriending class. It is
//! looked up the way unqualified names are: in each enclosing scope from
//! the innermost outwards, the global namespace last. References that name
//! nothing in the tree stay unresolved.

use doxa_core::{EntityKind, QualifiedName};

use super::{NodeId, Tree};
use crate::event::FriendTargetKind;

const TYPE_KINDS: &[EntityKind] = &[
    EntityKind::Struct,
    EntityKind::ClassTemplate,
    EntityKind::Alias,
    EntityKind::AliasTemplate,
    EntityKind::ScopedEnum,
    EntityKind::UnscopedEnum,
];

const FUNCTION_KINDS: &[EntityKind] = &[EntityKind::Function, EntityKind::FunctionTemplate];

const fn candidate_kinds(target: FriendTargetKind) -> &'static [EntityKind] {
    match target {
        FriendTargetKind::Type => TYPE_KINDS,
        FriendTargetKind::Function => FUNCTION_KINDS,
    }
}

/// `a::B<int>` names `a::B`; operator names keep their angle brackets.
fn strip_template_args(reference: &str) -> &str {
    let local = reference.rsplit("::").next().unwrap_or(reference);
    if local.trim_start().starts_with("operator") {
        return reference;
    }
    reference.find('<').map_or(reference, |at| &reference[..at]).trim()
}

impl Tree {
    /// Resolve every unresolved friend edge that now names an entity.
    /// Returns how many edges were resolved by this call.
    pub(crate) fn resolve_friends(&mut self) -> usize {
        let mut updates: Vec<(NodeId, usize, NodeId)> = Vec::new();
        for class in &self.nodes {
            for (slot, edge) in class.friends.iter().enumerate() {
                if edge.resolved.is_some() {
                    continue;
                }
                if let Some(target) = self.resolve_reference(&class.name, &edge.reference, edge.target) {
                    updates.push((class.id, slot, target));
                }
            }
        }

        for (class, slot, target) in &updates {
            self.entity_mut(*class).friends[*slot].resolved = Some(*target);
        }
        if !updates.is_empty() {
            tracing::debug!(resolved = updates.len(), "resolved friend references");
        }
        updates.len()
    }

    fn resolve_reference(
        &self,
        class: &QualifiedName,
        reference: &str,
        target: FriendTargetKind,
    ) -> Option<NodeId> {
        let relative = QualifiedName::parse(strip_template_args(reference)).ok()?;
        let kinds = candidate_kinds(target);
        // Enclosing scopes of the class, innermost first.
        let scopes: Vec<QualifiedName> = class.ancestors().collect();
        scopes
            .iter()
            .rev()
            .skip(1)
            .map(|prefix| prefix.join(&relative))
            .find_map(|name| kinds.iter().find_map(|kind| self.id_of(&name, *kind)))
    }
}
