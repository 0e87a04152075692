use super::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

// ════════════════════════════════════════════════════════════════
// 2. Access region tests
// ════════════════════════════════════════════════════════════════

#[test]
fn namespace_scope_has_no_access() {
    let decl = shape(&DeclarationEvent::new(KindHint::Function, "f").in_namespaces("a::b"));
    assert_eq!(decl.access, Access::None);
}

#[test]
fn namespace_scope_ignores_stray_access() {
    let event = DeclarationEvent::new(KindHint::Variable, "v").with_access(Access::Private);
    assert_eq!(shape(&event).access, Access::None);
}

#[rstest]
#[case::class(ScopeKind::Class, Access::Private)]
#[case::structure(ScopeKind::Struct, Access::Public)]
#[case::union(ScopeKind::Union, Access::Public)]
fn default_access_follows_record_key(#[case] scope: ScopeKind, #[case] expected: Access) {
    let event = DeclarationEvent::new(KindHint::Variable, "member").within(scope, "owner");
    assert_eq!(shape(&event).access, expected);
}

#[test]
fn explicit_access_region_wins() {
    let event = DeclarationEvent::new(KindHint::Function, "helper")
        .within(ScopeKind::Class, "c")
        .with_access(Access::Protected);
    assert_eq!(classify_ok(&event).access(), Access::Protected);
}

#[test]
fn enumerators_have_no_access() {
    let event = DeclarationEvent::new(KindHint::Enumerator, "a")
        .within(ScopeKind::Class, "c")
        .within(ScopeKind::ScopedEnum, "e");
    assert_eq!(shape(&event).access, Access::None);
}
