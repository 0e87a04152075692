//! Marker recognition on a single comment line.

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Commands that render inline and never start a section.
const INLINE_COMMANDS: &[&str] = &[
    "a", "b", "c", "e", "em", "p", "ref", "link", "endlink", "n", "f",
];

/// Commands that may also start a section in the middle of a line.
const SECTION_COMMANDS: &[&str] = &[
    "brief", "short", "details", "param", "tparam", "return", "returns", "result",
];

/// Commands with no dedicated slot that are still well-known; they go to
/// `other` without an unknown-tag note.
const KNOWN_COMMANDS: &[&str] = &[
    "note",
    "warning",
    "see",
    "sa",
    "throws",
    "throw",
    "exception",
    "pre",
    "post",
    "deprecated",
    "since",
    "remark",
    "remarks",
    "attention",
    "todo",
    "bug",
    "author",
    "authors",
    "version",
    "date",
    "copyright",
    "invariant",
    "par",
    "retval",
    "example",
    "ingroup",
    "addtogroup",
    "defgroup",
    "availability",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Command<'a> {
    Brief,
    Details,
    Param { direction: Option<String> },
    Tparam,
    Returns,
    CodeOpen { language: Option<String> },
    CodeClose,
    File,
    Internal,
    EndInternal,
    /// Well-known command without a dedicated slot (`\note`, `\see`).
    Known(&'a str),
    /// Anything else; the payload is the raw marker, e.g. `@frobnicate`.
    Unknown(&'a str),
}

/// A line that starts with a structural marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Marker<'a> {
    pub command: Command<'a>,
    /// Text after the marker and its argument, trimmed.
    pub rest: &'a str,
}

const fn is_marker_char(c: char) -> bool {
    c == '\\' || c == '@'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split `\name...` into `(name, after_name)`; `None` if `text` does not
/// start with a marker character followed by a command name.
fn command_name(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with(is_marker_char) {
        return None;
    }
    let body = &text[1..];
    let end = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
    if end == 0 {
        return None;
    }
    Some((&body[..end], &body[end..]))
}

/// Read a `{...}` or `[...]` argument directly after the command name.
fn bracketed(after: &str, open: char, close: char) -> (Option<&str>, &str) {
    let Some(inner) = after.strip_prefix(open) else {
        return (None, after);
    };
    match inner.find(close) {
        Some(end) => (Some(inner[..end].trim()), &inner[end + close.len_utf8()..]),
        None => (None, after),
    }
}

/// Recognise a marker at the start of `line`.
///
/// Returns `None` for plain text, including inline commands (`\ref x`) and
/// cross-reference tokens written without a separating space (`\c::x`,
/// `@foo.bar`).
pub(super) fn recognize(line: &str) -> Option<Marker<'_>> {
    let trimmed = line.trim_start();
    let (name, after) = command_name(trimmed)?;
    if INLINE_COMMANDS.contains(&name) {
        return None;
    }
    let raw = &trimmed[..=name.len()];

    let (command, after) = match name {
        "brief" | "short" => (Command::Brief, after),
        "details" => (Command::Details, after),
        "param" => {
            let (direction, after) = bracketed(after, '[', ']');
            let direction = direction.map(|d| d.replace(' ', ""));
            (Command::Param { direction }, after)
        }
        "tparam" => (Command::Tparam, after),
        "return" | "returns" | "result" => (Command::Returns, after),
        "code" => {
            let (lang, after) = bracketed(after, '{', '}');
            let language = lang
                .map(|l| l.trim_start_matches('.'))
                .filter(|l| !l.is_empty())
                .map(str::to_string);
            (Command::CodeOpen { language }, after)
        }
        "endcode" => (Command::CodeClose, after),
        "file" => (Command::File, after),
        "internal" => (Command::Internal, after),
        "endinternal" => (Command::EndInternal, after),
        other if KNOWN_COMMANDS.contains(&other) => (Command::Known(raw), after),
        _ => (Command::Unknown(raw), after),
    };

    // A marker glued to more text (`\brief::x`) is a reference, not a tag.
    if !after.is_empty() && !after.starts_with(char::is_whitespace) {
        return None;
    }

    Some(Marker {
        command,
        rest: after.trim(),
    })
}

/// A Markdown fence opening or closing a code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Fence<'a> {
    /// The fence run itself, e.g. "```" or "~~~~".
    pub run: &'a str,
    pub language: Option<String>,
}

pub(super) fn fence(line: &str) -> Option<Fence<'_>> {
    let trimmed = line.trim();
    let fence_char = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed
        .find(|c: char| c != fence_char)
        .unwrap_or(trimmed.len());
    if len < 3 {
        return None;
    }
    let language = trimmed[len..]
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim_start_matches('.');
    Some(Fence {
        run: &trimmed[..len],
        language: (!language.is_empty()).then(|| language.to_string()),
    })
}

/// Substitute a configured alias for the command at the start of `line`.
pub(super) fn expand_alias<'a>(line: &'a str, aliases: &BTreeMap<String, String>) -> Cow<'a, str> {
    let trimmed = line.trim_start();
    let Some((name, after)) = command_name(trimmed) else {
        return Cow::Borrowed(line);
    };
    match aliases.get(name) {
        Some(replacement) => Cow::Owned(format!("{replacement}{after}")),
        None => Cow::Borrowed(line),
    }
}

/// Split a line before every section command that follows whitespace, so
/// `\brief A. \details B.` yields two marker lines.
pub(super) fn split_sections(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let bytes = line.as_bytes();
    for (idx, c) in line.char_indices().skip(1) {
        if !is_marker_char(c) || !bytes[idx - 1].is_ascii_whitespace() {
            continue;
        }
        let Some((name, after)) = command_name(&line[idx..]) else {
            continue;
        };
        let ends_cleanly = after.is_empty()
            || after.starts_with(char::is_whitespace)
            || after.starts_with('[');
        if SECTION_COMMANDS.contains(&name) && ends_cleanly {
            pieces.push(&line[start..idx]);
            start = idx;
        }
    }
    pieces.push(&line[start..]);
    pieces
}
