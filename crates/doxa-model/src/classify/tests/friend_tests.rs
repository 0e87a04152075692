use super::*;
use pretty_assertions::assert_eq;

// ════════════════════════════════════════════════════════════════
// 5. Friend declaration tests
// ════════════════════════════════════════════════════════════════

#[test]
fn friend_class_is_only_an_edge() {
    let event = DeclarationEvent::new(KindHint::Friend, "B")
        .in_namespaces("n")
        .within(ScopeKind::Class, "c")
        .befriending(FriendTargetKind::Type);
    let c = classify_ok(&event);
    assert_eq!(c.kind, EntityKind::FriendDeclaration);
    assert!(c.entity.is_none());
    assert!(!c.is_definition);
    let link = c.friend.unwrap();
    assert_eq!(link.class, qn("n::c"));
    assert_eq!(link.reference, "B");
    assert_eq!(link.target, FriendTargetKind::Type);
}

#[test]
fn inline_friend_function_lands_in_enclosing_namespace() {
    let event = DeclarationEvent::new(KindHint::Friend, "swap")
        .in_namespaces("n::inner")
        .within(ScopeKind::Class, "c")
        .befriending(FriendTargetKind::Function)
        .returning("void")
        .with_body();
    let c = classify_ok(&event);
    assert!(c.is_definition);
    let decl = c.entity.unwrap();
    assert_eq!(decl.kind, EntityKind::Function);
    assert_eq!(decl.name, qn("n::inner::swap"));
    assert_eq!(decl.access, Access::None);
    assert!(decl.scopes.iter().all(|s| s.kind == EntityKind::Namespace));
    assert_eq!(c.friend.unwrap().class, qn("n::inner::c"));
}

#[test]
fn friend_in_nested_class_uses_outer_namespace() {
    let event = DeclarationEvent::new(KindHint::Friend, "operator==")
        .in_namespaces("lib")
        .within(ScopeKind::Struct, "outer")
        .within(ScopeKind::Class, "inner")
        .befriending(FriendTargetKind::Function)
        .with_body();
    let c = classify_ok(&event);
    assert_eq!(c.entity.unwrap().name, qn("lib::operator=="));
    assert_eq!(c.friend.unwrap().class, qn("lib::outer::inner"));
}

#[test]
fn friend_target_kind_is_inferred_when_missing() {
    let event = DeclarationEvent::new(KindHint::Friend, "helper")
        .within(ScopeKind::Class, "c")
        .returning("int");
    let c = classify_ok(&event);
    assert_eq!(c.friend.unwrap().target, FriendTargetKind::Function);
    assert!(c.entity.is_none());
}

#[test]
fn friend_outside_class_is_rejected() {
    let event = DeclarationEvent::new(KindHint::Friend, "x").in_namespaces("n");
    assert!(matches!(
        classify(UNIT, &event),
        Err(BuildError::MisplacedDeclaration { .. })
    ));
}
