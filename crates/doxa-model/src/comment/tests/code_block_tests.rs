use super::*;
use pretty_assertions::assert_eq;

// ════════════════════════════════════════════════════════════════
// 3. Code block tests
// ════════════════════════════════════════════════════════════════

#[test]
fn code_block_content_is_verbatim() {
    let parsed = parse(&[
        r"\brief Example.",
        r"\details Usage:",
        r"\code{.cpp}",
        r"    // \param not_a_tag",
        r"@brief still code",
        "",
        "auto x = f();",
        r"\endcode",
        "After.",
    ]);
    assert_eq!(
        parsed.doc.details,
        vec![
            paragraph("Usage:"),
            DetailSegment::Code {
                language: Some("cpp".to_string()),
                text: "    // \\param not_a_tag\n@brief still code\n\nauto x = f();".to_string(),
            },
            paragraph("After."),
        ]
    );
    assert!(parsed.doc.entries.is_empty());
    assert_eq!(parsed.doc.brief, "Example.");
}

#[test]
fn markdown_fence_opens_code_block() {
    let parsed = parse(&["```python", "print('\\brief')", "```"]);
    let blocks: Vec<_> = parsed.doc.code_blocks().collect();
    assert_eq!(blocks, vec![(Some("python"), "print('\\brief')")]);
}

#[test]
fn tilde_fence_needs_matching_run() {
    let parsed = parse(&["~~~~", "~~~ inner", "~~~~"]);
    let blocks: Vec<_> = parsed.doc.code_blocks().collect();
    assert_eq!(blocks, vec![(None, "~~~ inner")]);
}

#[test]
fn fence_with_info_string_does_not_close() {
    let parsed = parse(&["```", "```cpp", "int x;", "`````", "After."]);
    let blocks: Vec<_> = parsed.doc.code_blocks().collect();
    assert_eq!(blocks, vec![(None, "```cpp\nint x;")]);
    assert_eq!(parsed.doc.details_text(), "After.");
}

#[test]
fn code_inside_entry_goes_to_details() {
    let parsed = parse(&[r"\param x The input.", r"\code", "f(x);", r"\endcode"]);
    assert_eq!(parsed.doc.params()[0].text, "The input.");
    let blocks: Vec<_> = parsed.doc.code_blocks().collect();
    assert_eq!(blocks, vec![(None, "f(x);")]);
}

#[test]
fn unterminated_code_keeps_content() {
    let parsed = parse(&[r"\brief B.", r"\code", "int x;"]);
    let blocks: Vec<_> = parsed.doc.code_blocks().collect();
    assert_eq!(blocks, vec![(None, "int x;")]);
    assert_eq!(parsed.notes, vec![ParseNote::UnterminatedCode { line: 2 }]);
}

#[test]
fn stray_endcode_is_noted() {
    let parsed = parse(&[r"\brief B.", r"\endcode"]);
    assert_eq!(parsed.doc.brief, "B.");
    assert!(matches!(parsed.notes.as_slice(), [ParseNote::MalformedEntry { .. }]));
}
