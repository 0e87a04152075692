//! Input contract: the ordered stream a front end emits for one pass.
//!
//! A [`Pass`] is a sequence of [`SourceItem`]s in source order. Comment
//! blocks arrive already stripped of their delimiter decoration
//! (`///`, `/** */`, leading `*`). Blank lines are not represented; they
//! never break attachment. Anything else that is neither a comment nor a
//! declaration (preprocessor lines, `static_assert`, stray tokens) is a
//! [`SourceItem::Token`] and does break attachment.

use doxa_core::{Access, Qualifiers, TemplateParam};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Comment blocks ─────────────────────────────────────────────────

/// One raw comment block, one entry per source line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentBlock {
    pub lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

impl CommentBlock {
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            start_line: None,
            end_line: None,
        }
    }

    /// Split already-undecorated comment text on newlines.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Record the source lines the block spans (1-based, inclusive).
    #[must_use]
    pub const fn spanning(mut self, start_line: u32, end_line: u32) -> Self {
        self.start_line = Some(start_line);
        self.end_line = Some(end_line);
        self
    }

    /// Whether `next` starts on the line right after this block ends.
    #[must_use]
    pub fn is_contiguous_with(&self, next: &Self) -> bool {
        matches!((self.end_line, next.start_line), (Some(end), Some(start)) if start == end + 1)
    }

    /// First non-blank line, trimmed; used to identify the block in diagnostics.
    #[must_use]
    pub fn headline(&self) -> &str {
        self.lines
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .unwrap_or("")
    }
}

// ── Declaration events ─────────────────────────────────────────────

/// The declaration shape as the front end saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindHint {
    Namespace,
    Class,
    Struct,
    Union,
    Concept,
    Enum,
    Enumerator,
    Function,
    Variable,
    /// `using name = type;`
    TypeAlias,
    /// `typedef type name;`
    Typedef,
    Friend,
    Macro,
}

impl KindHint {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Concept => "concept",
            Self::Enum => "enum",
            Self::Enumerator => "enumerator",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::TypeAlias => "type_alias",
            Self::Typedef => "typedef",
            Self::Friend => "friend",
            Self::Macro => "macro",
        }
    }
}

impl std::fmt::Display for KindHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of one enclosing lexical scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Namespace,
    Class,
    Struct,
    Union,
    ScopedEnum,
    UnscopedEnum,
}

impl ScopeKind {
    #[must_use]
    pub const fn is_record(self) -> bool {
        matches!(self, Self::Class | Self::Struct | Self::Union)
    }

    #[must_use]
    pub const fn is_enum(self) -> bool {
        matches!(self, Self::ScopedEnum | Self::UnscopedEnum)
    }
}

/// One segment of the enclosing scope chain, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeSegment {
    pub name: String,
    pub kind: ScopeKind,
    /// The scope is a class template (`template <...> struct name { ... }`).
    #[serde(default)]
    pub templated: bool,
}

impl ScopeSegment {
    #[must_use]
    pub fn new(kind: ScopeKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            templated: false,
        }
    }

    #[must_use]
    pub fn namespace(name: impl Into<String>) -> Self {
        Self::new(ScopeKind::Namespace, name)
    }
}

/// Enum-specific shape. Scopedness and the base type are independent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumSpec {
    #[serde(default)]
    pub scoped: bool,
    /// Explicit underlying type token, e.g. `unsigned`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FriendTargetKind {
    Type,
    Function,
}

/// What a `friend` declaration grants access to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendSpec {
    /// Referenced name as written, e.g. `B`, `ns::helper`, `operator==`.
    pub target: String,
    pub target_kind: FriendTargetKind,
}

/// One declaration as emitted by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationEvent {
    pub kind: KindHint,
    /// Unqualified declared name. For friends, the befriended name.
    pub name: String,
    /// Enclosing lexical scopes, outermost first.
    #[serde(default)]
    pub scope: Vec<ScopeSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Access region in effect, when inside a class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(default)]
    pub qualifiers: Qualifiers,
    /// `None` when the declaration is not a template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_params: Option<Vec<TemplateParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_spec: Option<EnumSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friend: Option<FriendSpec>,
    /// A body or member list follows (`{ ... }`).
    #[serde(default)]
    pub has_body: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// The return type was written after the parameter list (`auto f() -> T`).
    #[serde(default)]
    pub trailing_return: bool,
    /// Enumerator value, variable initialiser or aliased type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Comment block the front end already paired with this declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentBlock>,
}

impl DeclarationEvent {
    #[must_use]
    pub fn new(kind: KindHint, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            scope: Vec::new(),
            line: None,
            access: None,
            qualifiers: Qualifiers::default(),
            template_params: None,
            enum_spec: None,
            friend: None,
            has_body: false,
            return_type: None,
            trailing_return: false,
            value: None,
            comment: None,
        }
    }

    /// Push an enclosing scope (call outermost first).
    #[must_use]
    pub fn within(mut self, kind: ScopeKind, name: impl Into<String>) -> Self {
        self.scope.push(ScopeSegment::new(kind, name));
        self
    }

    /// Push an enclosing class-template scope.
    #[must_use]
    pub fn within_template(mut self, kind: ScopeKind, name: impl Into<String>) -> Self {
        let mut segment = ScopeSegment::new(kind, name);
        segment.templated = true;
        self.scope.push(segment);
        self
    }

    /// Enclose in `a::b::c` namespaces.
    #[must_use]
    pub fn in_namespaces(mut self, path: &str) -> Self {
        self.scope.extend(
            path.split("::")
                .filter(|s| !s.is_empty())
                .map(ScopeSegment::namespace),
        );
        self
    }

    #[must_use]
    pub const fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub const fn with_access(mut self, access: Access) -> Self {
        self.access = Some(access);
        self
    }

    #[must_use]
    pub const fn with_qualifiers(mut self, qualifiers: Qualifiers) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    #[must_use]
    pub fn with_template(mut self, params: Vec<TemplateParam>) -> Self {
        self.template_params = Some(params);
        self
    }

    #[must_use]
    pub fn with_enum(mut self, scoped: bool, base: Option<&str>) -> Self {
        self.enum_spec = Some(EnumSpec {
            scoped,
            base: base.map(str::to_string),
        });
        self
    }

    #[must_use]
    pub fn befriending(mut self, target_kind: FriendTargetKind) -> Self {
        self.friend = Some(FriendSpec {
            target: self.name.clone(),
            target_kind,
        });
        self
    }

    #[must_use]
    pub const fn with_body(mut self) -> Self {
        self.has_body = true;
        self
    }

    #[must_use]
    pub fn returning(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// `auto name(...) -> ty`
    #[must_use]
    pub fn returning_trailing(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self.trailing_return = true;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: CommentBlock) -> Self {
        self.comment = Some(comment);
        self
    }
}

// ── Pass ───────────────────────────────────────────────────────────

/// One element of a pass's ordered stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum SourceItem {
    /// A leading comment block (`///`, `/** */`).
    Comment(CommentBlock),
    /// A trailing member comment (`///<`) following the previous declaration.
    TrailingComment(CommentBlock),
    Declaration(DeclarationEvent),
    /// Any other non-blank source construct.
    Token {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
    },
}

/// One ordered batch of source items (typically one header).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pass {
    /// Name of the unit this pass describes, e.g. `include/lib/code.h`.
    pub unit: String,
    #[serde(default)]
    pub items: Vec<SourceItem>,
}

impl Pass {
    #[must_use]
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn push(mut self, item: SourceItem) -> Self {
        self.items.push(item);
        self
    }

    /// Append a leading comment block from undecorated lines.
    #[must_use]
    pub fn comment<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(SourceItem::Comment(CommentBlock::new(lines)))
    }

    /// Append a trailing member comment.
    #[must_use]
    pub fn trailing(self, text: &str) -> Self {
        self.push(SourceItem::TrailingComment(CommentBlock::from_text(text)))
    }

    #[must_use]
    pub fn declare(self, event: DeclarationEvent) -> Self {
        self.push(SourceItem::Declaration(event))
    }

    #[must_use]
    pub fn token(self, text: impl Into<String>) -> Self {
        self.push(SourceItem::Token {
            text: text.into(),
            line: None,
        })
    }

    /// Declarations in stream order.
    pub fn declarations(&self) -> impl Iterator<Item = &DeclarationEvent> {
        self.items.iter().filter_map(|item| match item {
            SourceItem::Declaration(event) => Some(event),
            _ => None,
        })
    }
}
