use super::*;
use pretty_assertions::assert_eq;

// ════════════════════════════════════════════════════════════════
// 4. Configuration-driven parsing tests
// ════════════════════════════════════════════════════════════════

#[test]
fn builtin_cpp_alias_opens_and_closes_code() {
    let parsed = parse(&[r"\brief B.", r"\cpp", "int main() {}", r"\ecpp"]);
    let blocks: Vec<_> = parsed.doc.code_blocks().collect();
    assert_eq!(blocks, vec![(Some("cpp"), "int main() {}")]);
}

#[test]
fn detail_alias_maps_to_details() {
    let parsed = parse(&[r"\brief B.", r"\detail D."]);
    assert_eq!(parsed.doc.details_text(), "D.");
    assert!(parsed.notes.is_empty());
}

#[test]
fn user_alias_is_expanded() {
    let mut config = CommentConfig::default();
    config
        .aliases
        .insert("rust".to_string(), r"\code{.rs}".to_string());
    let parsed = parse_with(&config, &[r"\rust", "let x = 1;", r"\endcode"]);
    let blocks: Vec<_> = parsed.doc.code_blocks().collect();
    assert_eq!(blocks, vec![(Some("rs"), "let x = 1;")]);
}

#[test]
fn auto_brief_takes_first_paragraph() {
    let config = CommentConfig {
        auto_brief: true,
        ..CommentConfig::default()
    };
    let parsed = parse_with(&config, &["Short summary.", "", "Longer text."]);
    assert_eq!(parsed.doc.brief, "Short summary.");
    assert_eq!(parsed.doc.details_text(), "Longer text.");
}

#[test]
fn internal_docs_keeps_internal_text() {
    let config = CommentConfig {
        internal_docs: true,
        ..CommentConfig::default()
    };
    let parsed = parse_with(&config, &[r"\brief B.", r"\internal Hidden detail."]);
    assert!(parsed.doc.internal);
    assert_eq!(parsed.doc.details_text(), "Hidden detail.");
}
