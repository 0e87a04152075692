use super::*;
pub(super) use crate::event::{DeclarationEvent, FriendTargetKind, KindHint, ScopeKind};
pub(super) use doxa_core::{Access, ClassKey, EntityKind, EnumBase, TemplateParam};

mod access_tests;
mod friend_tests;

const UNIT: &str = "test.h";

fn classify_ok(event: &DeclarationEvent) -> Classification {
    classify(UNIT, event).unwrap_or_else(|e| panic!("classification failed: {e}"))
}

fn shape(event: &DeclarationEvent) -> DeclShape {
    classify_ok(event)
        .entity
        .unwrap_or_else(|| panic!("{} {:?} owns no entity", event.kind, event.name))
}

fn qn(text: &str) -> QualifiedName {
    QualifiedName::parse(text).unwrap()
}
