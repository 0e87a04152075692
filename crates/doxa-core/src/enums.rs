//! Entity kinds, access regions, and per-declaration attributes.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `EntityKind` provides `allowed_children()` to enforce the containment
//! rules of the entity tree at the builder layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The shape of a documented program construct.
///
/// Scoped and unscoped enums are distinct kinds (two declarations of the
/// same name with different scopedness never merge), but share one
/// representation on the entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Namespace,
    /// `struct`, `class` or `union`; the record key is an entity attribute.
    Struct,
    /// A class/struct/union template declaration.
    ClassTemplate,
    Concept,
    ScopedEnum,
    UnscopedEnum,
    Enumerator,
    Function,
    FunctionTemplate,
    Variable,
    Alias,
    AliasTemplate,
    /// Classification-only kind; friends become edges, never tree children.
    FriendDeclaration,
    Macro,
    /// Synthetic file-level pseudo-entity.
    File,
}

const NAMESPACE_MEMBERS: &[EntityKind] = &[
    EntityKind::Namespace,
    EntityKind::Struct,
    EntityKind::ClassTemplate,
    EntityKind::Concept,
    EntityKind::ScopedEnum,
    EntityKind::UnscopedEnum,
    EntityKind::Function,
    EntityKind::FunctionTemplate,
    EntityKind::Variable,
    EntityKind::Alias,
    EntityKind::AliasTemplate,
];

const RECORD_MEMBERS: &[EntityKind] = &[
    EntityKind::Struct,
    EntityKind::ClassTemplate,
    EntityKind::Concept,
    EntityKind::ScopedEnum,
    EntityKind::UnscopedEnum,
    EntityKind::Function,
    EntityKind::FunctionTemplate,
    EntityKind::Variable,
    EntityKind::Alias,
    EntityKind::AliasTemplate,
];

impl EntityKind {
    /// Return the string representation used in snapshots and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Struct => "struct",
            Self::ClassTemplate => "class_template",
            Self::Concept => "concept",
            Self::ScopedEnum => "scoped_enum",
            Self::UnscopedEnum => "unscoped_enum",
            Self::Enumerator => "enumerator",
            Self::Function => "function",
            Self::FunctionTemplate => "function_template",
            Self::Variable => "variable",
            Self::Alias => "alias",
            Self::AliasTemplate => "alias_template",
            Self::FriendDeclaration => "friend_declaration",
            Self::Macro => "macro",
            Self::File => "file",
        }
    }

    /// Kinds that may appear as owned children of this kind.
    ///
    /// The global namespace additionally owns macros; that exception is
    /// applied by the tree, which knows which node is the root.
    #[must_use]
    pub const fn allowed_children(self) -> &'static [Self] {
        match self {
            Self::Namespace => NAMESPACE_MEMBERS,
            Self::Struct | Self::ClassTemplate => RECORD_MEMBERS,
            Self::ScopedEnum | Self::UnscopedEnum => &[Self::Enumerator],
            Self::Concept
            | Self::Enumerator
            | Self::Function
            | Self::FunctionTemplate
            | Self::Variable
            | Self::Alias
            | Self::AliasTemplate
            | Self::FriendDeclaration
            | Self::Macro
            | Self::File => &[],
        }
    }

    /// Whether `child` may be owned by an entity of this kind.
    #[must_use]
    pub fn can_contain(self, child: Self) -> bool {
        self.allowed_children().contains(&child)
    }

    #[must_use]
    pub const fn is_enum(self) -> bool {
        matches!(self, Self::ScopedEnum | Self::UnscopedEnum)
    }

    /// Struct-like kinds whose members carry an access region.
    #[must_use]
    pub const fn is_record(self) -> bool {
        matches!(self, Self::Struct | Self::ClassTemplate)
    }

    /// Kinds that open a lexical scope other declarations can live in.
    #[must_use]
    pub const fn is_scope(self) -> bool {
        matches!(
            self,
            Self::Namespace | Self::Struct | Self::ClassTemplate | Self::ScopedEnum | Self::UnscopedEnum
        )
    }

    /// Kinds that carry a template parameter list.
    #[must_use]
    pub const fn is_templated(self) -> bool {
        matches!(
            self,
            Self::ClassTemplate | Self::Concept | Self::FunctionTemplate | Self::AliasTemplate
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

/// Enclosing class access region. `None` for namespace-scope entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Protected,
    Private,
    None,
}

impl Access {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ClassKey
// ---------------------------------------------------------------------------

/// The keyword a record was introduced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClassKey {
    Struct,
    Class,
    Union,
}

impl ClassKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Class => "class",
            Self::Union => "union",
        }
    }

    /// Access of members declared before any access specifier.
    #[must_use]
    pub const fn default_access(self) -> Access {
        match self {
            Self::Class => Access::Private,
            Self::Struct | Self::Union => Access::Public,
        }
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Template parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TemplateParamKind {
    /// `typename T` / `class T` / constrained `C T`.
    Type,
    /// `int N`, `auto V`.
    NonType,
    /// `template <typename> class TT`.
    Template,
}

impl TemplateParamKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::NonType => "non_type",
            Self::Template => "template",
        }
    }
}

impl fmt::Display for TemplateParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a template parameter list.
///
/// Concepts, class templates, alias templates and function templates all
/// use this representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TemplateParam {
    pub name: String,
    pub kind: Option<TemplateParamKind>,
}

impl TemplateParam {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: Option<TemplateParamKind>) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    #[must_use]
    pub fn type_param(name: impl Into<String>) -> Self {
        Self::new(name, Some(TemplateParamKind::Type))
    }

    #[must_use]
    pub fn non_type(name: impl Into<String>) -> Self {
        Self::new(name, Some(TemplateParamKind::NonType))
    }
}

/// Two parameter lists describe the same template when arity and kinds
/// agree; redeclarations are free to rename parameters.
#[must_use]
pub fn same_template_shape(a: &[TemplateParam], b: &[TemplateParam]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.kind == y.kind)
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Underlying type annotation of an enum. Absence is `Default`, never inferred.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnumBase {
    #[default]
    Default,
    Explicit(String),
}

impl EnumBase {
    /// `"default"` or the explicit base type token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Explicit(ty) => ty,
        }
    }

    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for EnumBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scopedness and base type, recorded independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct EnumInfo {
    pub scoped: bool,
    pub base: EnumBase,
}

// ---------------------------------------------------------------------------
// Qualifiers
// ---------------------------------------------------------------------------

/// Declaration specifiers and qualifiers seen on a declaration.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct Qualifiers {
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_inline: bool,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_constexpr: bool,
    #[serde(default)]
    pub is_consteval: bool,
    #[serde(default)]
    pub is_constinit: bool,
    #[serde(default)]
    pub is_noexcept: bool,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub is_explicit: bool,
    #[serde(default)]
    pub is_final: bool,
}

impl Qualifiers {
    /// Set every flag present in `other`.
    pub const fn absorb(&mut self, other: Self) {
        self.is_static |= other.is_static;
        self.is_inline |= other.is_inline;
        self.is_const |= other.is_const;
        self.is_constexpr |= other.is_constexpr;
        self.is_consteval |= other.is_consteval;
        self.is_constinit |= other.is_constinit;
        self.is_noexcept |= other.is_noexcept;
        self.is_virtual |= other.is_virtual;
        self.is_explicit |= other.is_explicit;
        self.is_final |= other.is_final;
    }

    /// Names of the set flags, in declaration-specifier order.
    #[must_use]
    pub fn keywords(&self) -> Vec<&'static str> {
        [
            (self.is_static, "static"),
            (self.is_inline, "inline"),
            (self.is_virtual, "virtual"),
            (self.is_explicit, "explicit"),
            (self.is_constexpr, "constexpr"),
            (self.is_consteval, "consteval"),
            (self.is_constinit, "constinit"),
            (self.is_const, "const"),
            (self.is_noexcept, "noexcept"),
            (self.is_final, "final"),
        ]
        .into_iter()
        .filter_map(|(set, kw)| set.then_some(kw))
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Whether an entity's documentation came from an attached comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Documented,
    #[default]
    Undocumented,
    /// An eligible comment block was attached but contained nothing.
    Blank,
}

impl Provenance {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Documented => "documented",
            Self::Undocumented => "undocumented",
            Self::Blank => "blank",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
