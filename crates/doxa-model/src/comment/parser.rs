//! The comment state machine.

use std::collections::BTreeMap;

use doxa_config::CommentConfig;

use super::markers::{self, Command, Marker};
use super::{DetailSegment, DocComment, ParseNote, ParsedComment, TagKind, TaggedEntry};

/// Parses raw comment blocks under one comment configuration.
///
/// Cheap to share across threads; parsing takes `&self`.
#[derive(Debug, Clone)]
pub struct CommentParser {
    aliases: BTreeMap<String, String>,
    auto_brief: bool,
    internal_docs: bool,
}

impl Default for CommentParser {
    fn default() -> Self {
        Self::new(&CommentConfig::default())
    }
}

impl CommentParser {
    #[must_use]
    pub fn new(config: &CommentConfig) -> Self {
        Self {
            aliases: config.alias_table(),
            auto_brief: config.auto_brief,
            internal_docs: config.internal_docs,
        }
    }

    /// Parse one block given as undecorated lines.
    #[must_use]
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> ParsedComment {
        let mut machine = Machine::new(self);
        for (idx, line) in lines.iter().enumerate() {
            machine.feed(idx + 1, line.as_ref());
        }
        machine.finish()
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Where untagged text currently flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Start,
    Brief,
    Details,
    Entry,
    /// Inside `\internal` with internal docs disabled.
    Skipped,
}

#[derive(Debug)]
enum Closer {
    EndCode,
    Fence(String),
}

/// Inside-verbatim state.
#[derive(Debug)]
struct Verbatim {
    closer: Closer,
    language: Option<String>,
    lines: Vec<String>,
    opened_at: usize,
}

struct Machine<'p> {
    parser: &'p CommentParser,
    section: Section,
    verbatim: Option<Verbatim>,
    brief: Vec<String>,
    paragraph: Vec<String>,
    details: Vec<DetailSegment>,
    entries: Vec<(TagKind, TaggedEntry)>,
    /// A blank line was seen inside the current entry.
    entry_break: bool,
    file_level: bool,
    internal: bool,
    notes: Vec<ParseNote>,
}

impl<'p> Machine<'p> {
    const fn new(parser: &'p CommentParser) -> Self {
        Self {
            parser,
            section: Section::Start,
            verbatim: None,
            brief: Vec::new(),
            paragraph: Vec::new(),
            details: Vec::new(),
            entries: Vec::new(),
            entry_break: false,
            file_level: false,
            internal: false,
            notes: Vec::new(),
        }
    }

    fn feed(&mut self, line_no: usize, raw: &str) {
        if self.verbatim.is_some() {
            self.feed_verbatim(raw);
            return;
        }

        let parser = self.parser;
        let expanded = markers::expand_alias(raw, &parser.aliases);
        let line = expanded.as_ref();

        if line.trim().is_empty() {
            self.blank_line();
            return;
        }

        if self.section == Section::Skipped {
            if let Some(Marker {
                command: Command::EndInternal,
                ..
            }) = markers::recognize(line)
            {
                self.section = Section::Details;
            }
            return;
        }

        if let Some(fence) = markers::fence(line) {
            self.open_verbatim(Closer::Fence(fence.run.to_string()), fence.language, line_no);
            return;
        }

        for piece in markers::split_sections(line) {
            match markers::recognize(piece) {
                Some(marker) => self.marker(line_no, marker),
                None => self.text(piece.trim()),
            }
            if self.verbatim.is_some() || self.section == Section::Skipped {
                break;
            }
        }
    }

    fn feed_verbatim(&mut self, raw: &str) {
        let parser = self.parser;
        let Some(verbatim) = self.verbatim.as_mut() else {
            return;
        };
        let closes = match &verbatim.closer {
            Closer::EndCode => {
                let expanded = markers::expand_alias(raw, &parser.aliases);
                matches!(
                    markers::recognize(&expanded),
                    Some(Marker {
                        command: Command::CodeClose,
                        ..
                    })
                )
            }
            Closer::Fence(run) => closes_fence(raw, run),
        };
        if !closes {
            verbatim.lines.push(raw.to_string());
            return;
        }
        if let Some(done) = self.verbatim.take() {
            self.details.push(DetailSegment::Code {
                language: done.language,
                text: done.lines.join("\n"),
            });
        }
        self.section = Section::Details;
    }

    fn open_verbatim(&mut self, closer: Closer, language: Option<String>, line_no: usize) {
        self.flush_paragraph();
        self.verbatim = Some(Verbatim {
            closer,
            language,
            lines: Vec::new(),
            opened_at: line_no,
        });
    }

    fn blank_line(&mut self) {
        match self.section {
            Section::Brief => {
                self.section = Section::Details;
            }
            Section::Details => self.flush_paragraph(),
            Section::Entry => {
                self.entry_break = true;
            }
            Section::Start | Section::Skipped => {}
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.section {
            Section::Start if self.parser.auto_brief => {
                self.section = Section::Brief;
                self.brief.push(text.to_string());
            }
            Section::Start => {
                self.section = Section::Details;
                self.paragraph.push(text.to_string());
            }
            Section::Brief => self.brief.push(text.to_string()),
            Section::Details => self.paragraph.push(text.to_string()),
            Section::Entry => self.append_entry(text),
            Section::Skipped => {}
        }
    }

    fn marker(&mut self, line_no: usize, marker: Marker<'_>) {
        let Marker { command, rest } = marker;
        match command {
            Command::Brief => {
                self.flush_paragraph();
                self.section = Section::Brief;
                self.text(rest);
            }
            Command::Details => {
                self.flush_paragraph();
                self.section = Section::Details;
                self.text(rest);
            }
            Command::Param { direction } => {
                self.open_subject_entry(TagKind::Param, direction, rest, line_no, "param");
            }
            Command::Tparam => {
                self.open_subject_entry(TagKind::Tparam, None, rest, line_no, "tparam");
            }
            Command::Returns => self.open_entry(TagKind::Returns, None, None, rest),
            Command::CodeOpen { language } => {
                self.open_verbatim(Closer::EndCode, language, line_no);
            }
            Command::CodeClose => self.notes.push(ParseNote::MalformedEntry {
                marker: "endcode".to_string(),
                line: line_no,
            }),
            Command::File => self.file_level = true,
            Command::Internal => {
                self.internal = true;
                self.flush_paragraph();
                if self.parser.internal_docs {
                    self.section = Section::Details;
                    self.text(rest);
                } else {
                    self.section = Section::Skipped;
                }
            }
            Command::EndInternal => {}
            Command::Known(raw) => {
                self.open_entry(TagKind::Other, Some(raw.to_string()), None, rest);
            }
            Command::Unknown(raw) => {
                self.notes.push(ParseNote::UnknownTag {
                    marker: raw.to_string(),
                    line: line_no,
                });
                self.open_entry(TagKind::Other, Some(raw.to_string()), None, rest);
            }
        }
    }

    /// `\param` / `\tparam`: the first word of `rest` is the subject.
    fn open_subject_entry(
        &mut self,
        kind: TagKind,
        direction: Option<String>,
        rest: &str,
        line_no: usize,
        marker: &str,
    ) {
        let (subject, text) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(s, t)| (s, t.trim()));
        if subject.is_empty() {
            self.notes.push(ParseNote::MalformedEntry {
                marker: marker.to_string(),
                line: line_no,
            });
        }
        self.open_entry(kind, Some(subject.to_string()), direction, text);
    }

    fn open_entry(
        &mut self,
        kind: TagKind,
        subject: Option<String>,
        direction: Option<String>,
        text: &str,
    ) {
        self.flush_paragraph();
        self.entries.push((
            kind,
            TaggedEntry {
                subject,
                direction,
                text: text.to_string(),
            },
        ));
        self.entry_break = false;
        self.section = Section::Entry;
    }

    fn append_entry(&mut self, text: &str) {
        let Some((_, entry)) = self.entries.last_mut() else {
            return;
        };
        if !entry.text.is_empty() {
            entry.text.push_str(if self.entry_break { "\n\n" } else { " " });
        }
        entry.text.push_str(text);
        self.entry_break = false;
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = self.paragraph.join(" ");
        self.paragraph.clear();
        self.details.push(DetailSegment::Paragraph { text });
    }

    fn finish(mut self) -> ParsedComment {
        if let Some(open) = self.verbatim.take() {
            self.notes.push(ParseNote::UnterminatedCode {
                line: open.opened_at,
            });
            self.details.push(DetailSegment::Code {
                language: open.language,
                text: open.lines.join("\n"),
            });
        }
        self.flush_paragraph();

        let mut entries: BTreeMap<TagKind, Vec<TaggedEntry>> = BTreeMap::new();
        for (kind, entry) in self.entries {
            entries.entry(kind).or_default().push(entry);
        }

        ParsedComment {
            doc: DocComment {
                brief: self.brief.join(" "),
                details: self.details,
                entries,
                inline_note: None,
                file_level: self.file_level,
                internal: self.internal,
            },
            notes: self.notes,
        }
    }
}

/// A closing fence is a run of the opening character at least as long as
/// the opener, with no info string.
fn closes_fence(raw: &str, run: &str) -> bool {
    let Some(fence) = run.chars().next() else {
        return false;
    };
    let line = raw.trim();
    line.len() >= run.len() && line.chars().all(|c| c == fence)
}
