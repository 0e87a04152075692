//! Attachment resolver.
//!
//! Pairs comment blocks with the declarations they document, in two steps
//! so that parsing can run apart from the stream walk:
//!
//! 1. [`plan`] walks a pass in order and decides, for every comment, which
//!    declaration (if any) it belongs to.
//! 2. [`bind`] takes the parsed comments and produces one [`Attachment`]
//!    per declaration plus the file-level docs and orphan diagnostics.
//!
//! Eligibility: a leading comment belongs to the first declaration after
//! it, provided nothing but blank lines (which the stream does not carry)
//! or further comments lie between them. Adjacent comment blocks on
//! consecutive lines form one group. A [`SourceItem::Token`] orphans any
//! pending comment. A trailing comment belongs to the declaration right
//! before it and only ever becomes that declaration's inline note.

use crate::comment::{CommentParser, DocComment, ParsedComment};
use crate::diagnostics::Diagnostic;
use crate::event::{CommentBlock, DeclarationEvent, Pass, SourceItem};
use crate::merge::Attachment;
use crate::tree::Origin;

/// Where a comment ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    /// Leading comment of the declaration with this index.
    Declaration(usize),
    /// Trailing note of the declaration with this index.
    Trailing(usize),
    Orphan,
}

/// One comment (or group of adjacent comments) and its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate<'p> {
    pub blocks: Vec<&'p CommentBlock>,
    pub target: Target,
    pub trailing: bool,
}

impl<'p> Candidate<'p> {
    fn leading(block: &'p CommentBlock, target: Target) -> Self {
        Self {
            blocks: vec![block],
            target,
            trailing: false,
        }
    }

    fn trailing(block: &'p CommentBlock, target: Target) -> Self {
        Self {
            trailing: true,
            ..Self::leading(block, target)
        }
    }

    /// Whether `block` continues this group on the very next line.
    fn touches(&self, block: &CommentBlock) -> bool {
        self.blocks
            .last()
            .is_some_and(|last| last.is_contiguous_with(block))
    }

    fn start_line(&self) -> Option<u32> {
        self.blocks.first().and_then(|b| b.start_line)
    }

    fn lines(&self) -> impl Iterator<Item = &'p str> + '_ {
        self.blocks
            .iter()
            .copied()
            .flat_map(|b| b.lines.iter().map(String::as_str))
    }

    fn headline(&self) -> &'p str {
        self.blocks
            .iter()
            .copied()
            .map(CommentBlock::headline)
            .find(|h| !h.is_empty())
            .unwrap_or("")
    }

    fn orphaned(&self, unit: &str) -> Diagnostic {
        let origin = Origin::new(unit, self.start_line());
        let headline = self.headline().to_string();
        if self.trailing {
            Diagnostic::OrphanTrailingComment { origin, headline }
        } else {
            Diagnostic::OrphanComment { origin, headline }
        }
    }

    /// Parse this candidate. Trailing comments are never tag-parsed: their
    /// text becomes an inline note verbatim.
    pub fn parse(&self, parser: &CommentParser) -> ParsedComment {
        if !self.trailing {
            let lines: Vec<&str> = self.lines().collect();
            return parser.parse(&lines);
        }
        let note = self
            .lines()
            .map(|l| {
                let l = l.trim();
                l.strip_prefix('<').unwrap_or(l).trim()
            })
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        ParsedComment {
            doc: if note.is_empty() {
                DocComment::default()
            } else {
                DocComment::inline(note)
            },
            notes: Vec::new(),
        }
    }
}

/// Declarations of a pass in order, and every comment with its target.
#[derive(Debug, Default)]
pub(crate) struct Plan<'p> {
    pub declarations: Vec<&'p DeclarationEvent>,
    pub candidates: Vec<Candidate<'p>>,
}

impl<'p> Plan<'p> {
    fn orphan_pending(&mut self, pending: &mut Option<Candidate<'p>>) {
        if let Some(group) = pending.take() {
            self.candidates.push(group);
        }
    }
}

/// Walk `pass` and decide every comment's target.
pub(crate) fn plan(pass: &Pass) -> Plan<'_> {
    let mut out = Plan::default();
    let mut pending: Option<Candidate<'_>> = None;
    // Index of the declaration a trailing comment would belong to.
    let mut last_decl: Option<usize> = None;

    for item in &pass.items {
        match item {
            SourceItem::Comment(block) => {
                match pending.as_mut() {
                    Some(group) if group.touches(block) => group.blocks.push(block),
                    _ => {
                        out.orphan_pending(&mut pending);
                        pending = Some(Candidate::leading(block, Target::Orphan));
                    }
                }
                last_decl = None;
            }
            SourceItem::TrailingComment(block) => {
                let target = match (last_decl, &pending) {
                    (Some(idx), None) => Target::Trailing(idx),
                    _ => Target::Orphan,
                };
                out.candidates.push(Candidate::trailing(block, target));
            }
            SourceItem::Declaration(event) => {
                let idx = out.declarations.len();
                out.declarations.push(event);
                match &event.comment {
                    Some(own) => {
                        // The front end may also have emitted the same block
                        // as a stream item; count it once.
                        if pending.as_ref().is_some_and(|g| same_text(g, own)) {
                            pending = None;
                        }
                        out.orphan_pending(&mut pending);
                        out.candidates
                            .push(Candidate::leading(own, Target::Declaration(idx)));
                    }
                    None => {
                        if let Some(mut group) = pending.take() {
                            group.target = Target::Declaration(idx);
                            out.candidates.push(group);
                        }
                    }
                }
                last_decl = Some(idx);
            }
            SourceItem::Token { .. } => {
                out.orphan_pending(&mut pending);
                last_decl = None;
            }
        }
    }
    out.orphan_pending(&mut pending);
    out
}

fn same_text(group: &Candidate<'_>, block: &CommentBlock) -> bool {
    group.lines().eq(block.lines.iter().map(String::as_str))
}

/// Result of binding parsed comments to declarations.
#[derive(Debug, Default)]
pub(crate) struct Bound {
    /// One entry per declaration, same order as [`Plan::declarations`].
    pub attachments: Vec<Attachment>,
    /// Comments that describe the unit itself.
    pub file_docs: Vec<(DocComment, Origin)>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Combine a plan with its parsed comments (`parsed[i]` belongs to
/// `plan.candidates[i]`). `owns_entity[i]` is false for a declaration that
/// creates no entity (a friend without an inline body); its comments have
/// nothing to document and are reported as orphans.
pub(crate) fn bind(
    plan: &Plan<'_>,
    parsed: Vec<ParsedComment>,
    unit: &str,
    owns_entity: &[bool],
) -> Bound {
    let mut bound = Bound {
        attachments: vec![Attachment::None; plan.declarations.len()],
        ..Bound::default()
    };

    for (candidate, ParsedComment { doc, notes }) in plan.candidates.iter().zip(parsed) {
        let origin = Origin::new(unit, candidate.start_line());
        let owner = match candidate.target {
            Target::Declaration(idx) | Target::Trailing(idx) => {
                plan.declarations.get(idx).map(|d| d.name.clone())
            }
            Target::Orphan => None,
        };
        bound.diagnostics.extend(
            notes
                .iter()
                .map(|note| Diagnostic::from_note(note, unit, candidate.start_line(), owner.clone())),
        );

        if doc.file_level {
            bound.file_docs.push((doc, origin));
            continue;
        }

        let target = match candidate.target {
            Target::Declaration(idx) | Target::Trailing(idx)
                if !owns_entity.get(idx).copied().unwrap_or(true) =>
            {
                Target::Orphan
            }
            target => target,
        };

        match target {
            Target::Declaration(idx) => {
                if let Some(slot) = bound.attachments.get_mut(idx) {
                    *slot = if doc.is_empty() {
                        Attachment::Blank
                    } else {
                        Attachment::Doc(doc)
                    };
                }
            }
            Target::Trailing(idx) => {
                let Some(note) = doc.inline_note else {
                    continue;
                };
                if let Some(slot) = bound.attachments.get_mut(idx) {
                    add_inline_note(slot, note);
                }
            }
            Target::Orphan => {
                if !doc.is_empty() {
                    bound.diagnostics.push(candidate.orphaned(unit));
                }
            }
        }
    }
    bound
}

fn add_inline_note(slot: &mut Attachment, note: String) {
    match slot {
        Attachment::Doc(doc) => {
            doc.inline_note = Some(match doc.inline_note.take() {
                Some(existing) => format!("{existing} {note}"),
                None => note,
            });
        }
        Attachment::None | Attachment::Blank => *slot = Attachment::Doc(DocComment::inline(note)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KindHint;
    use pretty_assertions::assert_eq;

    fn resolve(pass: &Pass) -> Bound {
        let parser = CommentParser::default();
        let plan = plan(pass);
        let parsed = plan.candidates.iter().map(|c| c.parse(&parser)).collect();
        let owns_entity: Vec<bool> = plan
            .declarations
            .iter()
            .map(|d| d.kind != KindHint::Friend || d.has_body)
            .collect();
        bind(&plan, parsed, &pass.unit, &owns_entity)
    }

    fn brief(attachment: &Attachment) -> &str {
        match attachment {
            Attachment::Doc(doc) => &doc.brief,
            other => panic!("expected a doc, got {other:?}"),
        }
    }

    fn var(name: &str) -> DeclarationEvent {
        DeclarationEvent::new(KindHint::Variable, name)
    }

    #[test]
    fn only_the_first_declaration_is_eligible() {
        let pass = Pass::new("a.h")
            .comment(["\\brief First."])
            .declare(var("a"))
            .declare(var("b"));
        let bound = resolve(&pass);
        assert_eq!(brief(&bound.attachments[0]), "First.");
        assert_eq!(bound.attachments[1], Attachment::None);
        assert!(bound.diagnostics.is_empty());
    }

    #[test]
    fn token_between_comment_and_declaration_orphans_it() {
        let pass = Pass::new("a.h")
            .comment(["\\brief Lost."])
            .token("#include <x>")
            .declare(var("a"));
        let bound = resolve(&pass);
        assert_eq!(bound.attachments[0], Attachment::None);
        assert!(matches!(
            &bound.diagnostics[..],
            [Diagnostic::OrphanComment { headline, .. }] if headline == "\\brief Lost."
        ));
    }

    #[test]
    fn adjacent_blocks_group_and_separated_ones_do_not() {
        let pass = Pass::new("a.h")
            .push(SourceItem::Comment(CommentBlock::new(["\\brief Old."]).spanning(1, 1)))
            .push(SourceItem::Comment(CommentBlock::new(["\\brief A."]).spanning(3, 3)))
            .push(SourceItem::Comment(CommentBlock::new(["\\details B."]).spanning(4, 4)))
            .declare(var("a"));
        let bound = resolve(&pass);
        match &bound.attachments[0] {
            Attachment::Doc(doc) => {
                assert_eq!(doc.brief, "A.");
                assert_eq!(doc.details_text(), "B.");
            }
            other => panic!("expected a doc, got {other:?}"),
        }
        assert_eq!(bound.diagnostics.len(), 1);
        assert!(bound.diagnostics[0].is_orphan());
    }

    #[test]
    fn empty_comment_is_blank_not_absent() {
        let pass = Pass::new("a.h").comment([""]).declare(var("a"));
        assert_eq!(resolve(&pass).attachments[0], Attachment::Blank);
    }

    #[test]
    fn trailing_comments_become_inline_notes() {
        let pass = Pass::new("a.h")
            .declare(DeclarationEvent::new(KindHint::Enumerator, "a"))
            .trailing("< \\brief first value")
            .declare(DeclarationEvent::new(KindHint::Enumerator, "b"));
        let bound = resolve(&pass);
        match &bound.attachments[0] {
            Attachment::Doc(doc) => {
                assert_eq!(doc.inline_note.as_deref(), Some("\\brief first value"));
                assert!(doc.brief.is_empty());
            }
            other => panic!("expected a doc, got {other:?}"),
        }
        assert_eq!(bound.attachments[1], Attachment::None);
    }

    #[test]
    fn trailing_comment_with_nothing_before_it_is_reported() {
        let pass = Pass::new("a.h").token("{").trailing("< stray");
        let bound = resolve(&pass);
        assert!(matches!(
            &bound.diagnostics[..],
            [Diagnostic::OrphanTrailingComment { headline, .. }] if headline == "< stray"
        ));
    }

    #[test]
    fn file_comment_goes_to_the_unit_not_the_declaration() {
        let pass = Pass::new("code.h")
            .comment(["\\file", "\\brief The unit."])
            .declare(DeclarationEvent::new(KindHint::Namespace, "n"));
        let bound = resolve(&pass);
        assert_eq!(bound.attachments[0], Attachment::None);
        assert_eq!(bound.file_docs.len(), 1);
        assert_eq!(bound.file_docs[0].0.brief, "The unit.");
        assert_eq!(bound.file_docs[0].1, Origin::new("code.h", None));
    }

    #[test]
    fn carried_comment_wins_over_duplicate_stream_comment() {
        let own = CommentBlock::new(["\\brief Own."]);
        let pass = Pass::new("a.h")
            .push(SourceItem::Comment(own.clone()))
            .declare(var("a").with_comment(own));
        let bound = resolve(&pass);
        assert_eq!(brief(&bound.attachments[0]), "Own.");
        assert!(bound.diagnostics.is_empty());
    }

    #[test]
    fn comment_on_a_bodiless_friend_is_reported() {
        let pass = Pass::new("a.h")
            .comment(["\\brief Grants B access."])
            .declare(
                DeclarationEvent::new(KindHint::Friend, "B")
                    .within(crate::event::ScopeKind::Class, "c")
                    .befriending(crate::event::FriendTargetKind::Type),
            )
            .trailing("< also lost");
        let bound = resolve(&pass);
        assert_eq!(bound.attachments[0], Attachment::None);
        let headlines: Vec<String> = bound.diagnostics.iter().map(ToString::to_string).collect();
        assert_eq!(
            headlines,
            vec![
                "a.h: comment is not attached to any declaration: \\brief Grants B access."
                    .to_string(),
                "a.h: trailing comment follows no declaration: < also lost".to_string(),
            ]
        );
    }

    #[test]
    fn group_headline_skips_blank_blocks() {
        let blank = CommentBlock::new([""]).spanning(1, 1);
        let text = CommentBlock::new(["  \\brief Later."]).spanning(2, 2);
        let mut group = Candidate::leading(&blank, Target::Orphan);
        assert!(group.touches(&text));
        group.blocks.push(&text);
        assert_eq!(group.headline(), "\\brief Later.");
        assert_eq!(group.start_line(), Some(1));
    }

    #[test]
    fn parse_notes_name_the_declaration() {
        let pass = Pass::new("a.h")
            .comment(["\\brief F.", "\\frobnicate now"])
            .declare(DeclarationEvent::new(KindHint::Function, "f"));
        let bound = resolve(&pass);
        assert!(matches!(
            &bound.diagnostics[..],
            [Diagnostic::UnknownTag { entity: Some(name), .. }] if name == "f"
        ));
    }
}
