//! Several passes over one tree: reopening, redeclaring, conflicts and
//! rejection.

use doxa_core::{Access, EntityKind, Provenance, QualifiedName};
use doxa_model::{
    BuildError, ConflictAttribute, DeclarationEvent, Diagnostic, DocModelBuilder, KindHint, Pass,
    ScopeKind, Tree,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn ns(name: &str) -> DeclarationEvent {
    DeclarationEvent::new(KindHint::Namespace, name).with_body()
}

fn qn(text: &str) -> QualifiedName {
    QualifiedName::parse(text).unwrap()
}

fn apply_all(passes: &[Pass]) -> Tree {
    let (tree, _) = DocModelBuilder::default()
        .build(passes)
        .expect("passes apply");
    tree
}

fn child_names(tree: &Tree, path: &str) -> Vec<String> {
    let id = tree.find(path).expect("entity exists").id;
    tree.children(id).map(|e| e.local_name().to_string()).collect()
}

// ════ 1. Reopening tests ════

#[test]
fn redeclared_struct_merges_into_one_entity() {
    let first = Pass::new("a.h").declare(ns("n")).declare(
        DeclarationEvent::new(KindHint::Struct, "s")
            .in_namespaces("n")
            .with_body(),
    );
    let second = Pass::new("b.h")
        .declare(ns("n"))
        .declare(
            DeclarationEvent::new(KindHint::Struct, "s")
                .in_namespaces("n")
                .with_body(),
        )
        .declare(
            DeclarationEvent::new(KindHint::Variable, "x")
                .in_namespaces("n")
                .within(ScopeKind::Struct, "s"),
        );

    let tree = apply_all(&[first, second]);
    assert_eq!(child_names(&tree, "n"), vec!["s"]);
    assert_eq!(child_names(&tree, "n::s"), vec!["x"]);
    assert_eq!(tree.lookup_all(&qn("n::s")).len(), 1);
}

#[test]
fn later_pass_appends_after_existing_children() {
    let first = Pass::new("a.h")
        .declare(ns("n"))
        .declare(DeclarationEvent::new(KindHint::Function, "f").in_namespaces("n"))
        .declare(DeclarationEvent::new(KindHint::Function, "g").in_namespaces("n"));
    let second = Pass::new("b.h")
        .declare(ns("n"))
        .declare(DeclarationEvent::new(KindHint::Variable, "v").in_namespaces("n"))
        .declare(DeclarationEvent::new(KindHint::Function, "f").in_namespaces("n"))
        .declare(DeclarationEvent::new(KindHint::Variable, "w").in_namespaces("n"));

    let builder = DocModelBuilder::default();
    let mut tree = Tree::new();
    builder.apply(&mut tree, &first).unwrap();
    let f_before = tree.find("n::f").unwrap().id;
    builder.apply(&mut tree, &second).unwrap();

    assert_eq!(child_names(&tree, "n"), vec!["f", "g", "v", "w"]);
    assert_eq!(tree.find("n::f").unwrap().id, f_before);
    assert_eq!(tree.find("n::f").unwrap().origins.len(), 2);
}

#[test]
fn reapplying_a_pass_is_idempotent() {
    let pass = Pass::new("a.h")
        .comment(["\\brief N."])
        .declare(ns("n"))
        .comment(["\\brief E."])
        .declare(
            DeclarationEvent::new(KindHint::Enum, "e")
                .in_namespaces("n")
                .with_enum(true, Some("unsigned"))
                .with_body(),
        )
        .declare(
            DeclarationEvent::new(KindHint::Enumerator, "a")
                .in_namespaces("n")
                .within(ScopeKind::ScopedEnum, "e"),
        )
        .trailing("< first");

    let builder = DocModelBuilder::default();
    let mut tree = Tree::new();
    builder.apply(&mut tree, &pass).unwrap();
    let once = tree.snapshot().to_json().unwrap();
    let report = builder.apply(&mut tree, &pass).unwrap();
    let twice = tree.snapshot().to_json().unwrap();

    assert_eq!(once, twice);
    assert_eq!(report.created, 0);
    assert!(report.conflicts().next().is_none());
}

// ════ 2. Documentation merge tests ════

#[test]
fn newer_comment_replaces_older_and_children_stay() {
    let first = Pass::new("a.h")
        .comment(["\\brief Old."])
        .declare(ns("n"))
        .declare(DeclarationEvent::new(KindHint::Variable, "v").in_namespaces("n"));
    let second = Pass::new("b.h").comment(["\\brief New."]).declare(ns("n"));
    let third = Pass::new("c.h").declare(ns("n"));

    let tree = apply_all(&[first, second, third]);
    let n = tree.find("n").unwrap();
    assert_eq!(n.doc.as_ref().unwrap().brief, "New.");
    assert_eq!(n.provenance, Provenance::Documented);
    assert_eq!(child_names(&tree, "n"), vec!["v"]);
}

#[test]
fn undocumented_declarations_have_no_doc() {
    let tree = apply_all(&[Pass::new("a.h").declare(ns("n"))]);
    let n = tree.find("n").unwrap();
    assert_eq!(n.provenance, Provenance::Undocumented);
    assert!(n.doc.is_none());
}

// ════ 3. Conflict tests ════

#[test]
fn conflicting_enum_bases_are_reported_and_the_first_kept() {
    let enum_with = |base: &str| {
        DeclarationEvent::new(KindHint::Enum, "e")
            .with_enum(true, Some(base))
            .with_body()
    };
    let builder = DocModelBuilder::default();
    let mut tree = Tree::new();
    builder
        .apply(&mut tree, &Pass::new("a.h").declare(enum_with("unsigned").at_line(3)))
        .unwrap();
    let report = builder
        .apply(&mut tree, &Pass::new("b.h").declare(enum_with("int").at_line(7)))
        .unwrap();

    let conflicts: Vec<_> = report.conflicts().collect();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].attribute, ConflictAttribute::EnumBase);
    assert_eq!(
        conflicts[0].to_string(),
        "scoped_enum 'e': enum_base is 'unsigned' (from a.h:3) but b.h:7 declares 'int'; keeping the earlier value"
    );

    let e = tree.find("e").unwrap();
    assert_eq!(e.enum_info.as_ref().unwrap().base.as_str(), "unsigned");
    assert!(e.is_conflicted());
    assert_eq!(tree.conflicted().count(), 1);
}

#[test]
fn conflicting_access_is_reported() {
    let member = |access: Access| {
        DeclarationEvent::new(KindHint::Function, "f")
            .within(ScopeKind::Class, "c")
            .with_access(access)
    };
    let (tree, reports) = DocModelBuilder::default()
        .build(&[
            Pass::new("a.h").declare(member(Access::Protected)),
            Pass::new("b.h").declare(member(Access::Public)),
        ])
        .unwrap();
    assert!(matches!(
        &reports[1].diagnostics[..],
        [Diagnostic::MergeConflict(c)] if c.attribute == ConflictAttribute::Access
    ));
    assert_eq!(tree.find("c::f").unwrap().access, Access::Protected);
}

#[rstest]
#[case(true, false)]
#[case(false, true)]
fn enums_differing_in_scopedness_stay_apart(#[case] first: bool, #[case] second: bool) {
    let tree = apply_all(&[
        Pass::new("a.h").declare(DeclarationEvent::new(KindHint::Enum, "e").with_enum(first, None)),
        Pass::new("b.h").declare(DeclarationEvent::new(KindHint::Enum, "e").with_enum(second, None)),
    ]);
    let kinds: Vec<EntityKind> = tree
        .lookup_all(&qn("e"))
        .iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(kinds, vec![EntityKind::ScopedEnum, EntityKind::UnscopedEnum]);
}

#[test]
fn enumerators_go_to_the_enum_of_matching_scopedness() {
    let enumerator = |scope: ScopeKind, name: &str| {
        DeclarationEvent::new(KindHint::Enumerator, name).within(scope, "e")
    };
    let tree = apply_all(&[
        Pass::new("a.h")
            .declare(
                DeclarationEvent::new(KindHint::Enum, "e")
                    .with_enum(true, None)
                    .with_body(),
            )
            .declare(enumerator(ScopeKind::ScopedEnum, "a")),
        Pass::new("b.h")
            .declare(
                DeclarationEvent::new(KindHint::Enum, "e")
                    .with_enum(false, None)
                    .with_body(),
            )
            .declare(enumerator(ScopeKind::UnscopedEnum, "b")),
    ]);

    let children_of = |kind: EntityKind| -> Vec<String> {
        let e = tree.lookup(&qn("e"), kind).expect("enum exists");
        tree.children(e.id).map(|c| c.local_name().to_string()).collect()
    };
    assert_eq!(children_of(EntityKind::ScopedEnum), vec!["a"]);
    assert_eq!(children_of(EntityKind::UnscopedEnum), vec!["b"]);
}

// ════ 4. Rejection tests ════

#[test]
fn rejected_pass_changes_nothing_and_later_passes_still_apply() {
    let builder = DocModelBuilder::default();
    let mut tree = Tree::new();
    builder
        .apply(&mut tree, &Pass::new("a.h").declare(ns("n")))
        .unwrap();
    let before = tree.snapshot();

    let bad = Pass::new("bad.h")
        .comment(["\\brief Would be lost."])
        .declare(ns("n"))
        .declare(DeclarationEvent::new(KindHint::Function, "ok").in_namespaces("n"))
        .declare(DeclarationEvent::new(KindHint::Enumerator, "stray").in_namespaces("n"));
    let err = builder.apply(&mut tree, &bad).unwrap_err();
    assert!(matches!(err, BuildError::MisplacedDeclaration { .. }));
    assert_eq!(tree.snapshot(), before);

    builder
        .apply(
            &mut tree,
            &Pass::new("c.h")
                .declare(DeclarationEvent::new(KindHint::Function, "f").in_namespaces("n")),
        )
        .unwrap();
    assert_eq!(child_names(&tree, "n"), vec!["f"]);
}

#[test]
fn empty_name_is_rejected() {
    let err = DocModelBuilder::default()
        .build(&[Pass::new("a.h").declare(DeclarationEvent::new(KindHint::Struct, " "))])
        .unwrap_err();
    assert_eq!(err.to_string(), "a.h:?: struct has an empty name");
}
