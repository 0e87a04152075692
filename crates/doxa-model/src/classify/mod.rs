//! Declaration classification.
//!
//! Turns one [`DeclarationEvent`] into the entity kind and structural
//! attributes the tree needs: the qualified name and enclosing scope steps,
//! access region, template parameters, enum scopedness and base, and
//! whether the declaration is a definition or a forward mention.
//!
//! Friends are special: a friend never becomes a member of the class that
//! declares it. It yields a [`FriendLink`] for the class, and, when the
//! befriended function's body is written inline, an additional function
//! entity in the nearest enclosing namespace.

#[cfg(test)]
mod tests;

use doxa_core::{
    Access, ClassKey, EntityKind, EnumBase, EnumInfo, QualifiedName, Qualifiers, TemplateParam,
};

use crate::error::BuildError;
use crate::event::{DeclarationEvent, FriendSpec, FriendTargetKind, KindHint, ScopeKind};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One enclosing scope, resolved to the entity that represents it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeStep {
    pub name: QualifiedName,
    pub kind: EntityKind,
    pub class_key: Option<ClassKey>,
    pub enum_info: Option<EnumInfo>,
}

/// An owned entity a declaration creates or re-describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclShape {
    pub kind: EntityKind,
    pub name: QualifiedName,
    /// Enclosing scopes, outermost first; the last one is the parent.
    pub scopes: Vec<ScopeStep>,
    pub access: Access,
    pub class_key: Option<ClassKey>,
    pub template_params: Vec<TemplateParam>,
    pub enum_info: Option<EnumInfo>,
    pub qualifiers: Qualifiers,
    pub return_type: Option<String>,
    pub trailing_return: bool,
    pub value: Option<String>,
    pub defined: bool,
}

/// A non-owning friend relation from a class to a referenced name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendLink {
    /// The befriending class.
    pub class: QualifiedName,
    /// Scope steps down to and including the befriending class.
    pub class_scopes: Vec<ScopeStep>,
    /// Referenced name as written.
    pub reference: String,
    pub target: FriendTargetKind,
}

/// Result of classifying one declaration event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Kind of the declaration itself; `FriendDeclaration` for friends.
    pub kind: EntityKind,
    /// Has a body or member list.
    pub is_definition: bool,
    /// The entity this declaration owns, if any.
    pub entity: Option<DeclShape>,
    pub friend: Option<FriendLink>,
}

impl Classification {
    #[must_use]
    pub fn access(&self) -> Access {
        self.entity.as_ref().map_or(Access::None, |e| e.access)
    }

    #[must_use]
    pub fn template_params(&self) -> &[TemplateParam] {
        self.entity
            .as_ref()
            .map_or(&[], |e| e.template_params.as_slice())
    }

    #[must_use]
    pub fn enum_info(&self) -> Option<&EnumInfo> {
        self.entity.as_ref().and_then(|e| e.enum_info.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify one declaration event from pass `unit`.
///
/// # Errors
/// Returns `BuildError` when the event breaks the input contract: an empty
/// name or scope segment, an enumerator outside an enum, or a friend
/// outside a class.
pub fn classify(unit: &str, event: &DeclarationEvent) -> Result<Classification, BuildError> {
    if event.name.trim().is_empty() {
        return Err(BuildError::EmptyName {
            unit: unit.to_string(),
            line: event.line,
            what: event.kind.to_string(),
        });
    }

    if event.kind == KindHint::Macro {
        return Ok(classify_macro(event));
    }

    let scopes = scope_steps(unit, event)?;
    match event.kind {
        KindHint::Friend => classify_friend(unit, event, scopes),
        KindHint::Enumerator => {
            let inside_enum = event.scope.last().is_some_and(|s| s.kind.is_enum());
            if !inside_enum {
                return Err(misplaced(unit, event, "must be declared inside an enum"));
            }
            owned(unit, event, scopes, EntityKind::Enumerator)
        }
        hint => owned(unit, event, scopes, kind_for(hint, event)),
    }
}

fn kind_for(hint: KindHint, event: &DeclarationEvent) -> EntityKind {
    let templated = event.template_params.is_some();
    match hint {
        KindHint::Namespace => EntityKind::Namespace,
        KindHint::Class | KindHint::Struct | KindHint::Union if templated => {
            EntityKind::ClassTemplate
        }
        KindHint::Class | KindHint::Struct | KindHint::Union => EntityKind::Struct,
        KindHint::Concept => EntityKind::Concept,
        KindHint::Enum if event.enum_spec.as_ref().is_some_and(|e| e.scoped) => {
            EntityKind::ScopedEnum
        }
        KindHint::Enum => EntityKind::UnscopedEnum,
        KindHint::Enumerator => EntityKind::Enumerator,
        KindHint::Function if templated => EntityKind::FunctionTemplate,
        KindHint::Function => EntityKind::Function,
        KindHint::Variable => EntityKind::Variable,
        KindHint::TypeAlias if templated => EntityKind::AliasTemplate,
        KindHint::TypeAlias | KindHint::Typedef => EntityKind::Alias,
        KindHint::Friend => EntityKind::FriendDeclaration,
        KindHint::Macro => EntityKind::Macro,
    }
}

const fn class_key_for(hint: KindHint) -> Option<ClassKey> {
    match hint {
        KindHint::Class => Some(ClassKey::Class),
        KindHint::Struct => Some(ClassKey::Struct),
        KindHint::Union => Some(ClassKey::Union),
        _ => None,
    }
}

/// Enum scopedness and base; an absent base is `Default`, never inferred.
fn enum_info_for(event: &DeclarationEvent) -> EnumInfo {
    let spec = event.enum_spec.clone().unwrap_or_default();
    let base = spec
        .base
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .map_or(EnumBase::Default, EnumBase::Explicit);
    EnumInfo {
        scoped: spec.scoped,
        base,
    }
}

/// Whether the declaration carries its body rather than mentioning it.
const fn is_definition(kind: EntityKind, has_body: bool) -> bool {
    match kind {
        EntityKind::Struct
        | EntityKind::ClassTemplate
        | EntityKind::ScopedEnum
        | EntityKind::UnscopedEnum
        | EntityKind::Function
        | EntityKind::FunctionTemplate
        | EntityKind::FriendDeclaration => has_body,
        EntityKind::Namespace
        | EntityKind::Concept
        | EntityKind::Enumerator
        | EntityKind::Variable
        | EntityKind::Alias
        | EntityKind::AliasTemplate
        | EntityKind::Macro
        | EntityKind::File => true,
    }
}

/// Access region of a member: explicit, else the record key's default.
/// Anything not directly inside a record has no access region.
fn access_for(event: &DeclarationEvent) -> Access {
    match event.scope.last() {
        Some(segment) if segment.kind.is_record() => event
            .access
            .unwrap_or_else(|| record_key(segment.kind).default_access()),
        _ => Access::None,
    }
}

const fn record_key(kind: ScopeKind) -> ClassKey {
    match kind {
        ScopeKind::Class => ClassKey::Class,
        ScopeKind::Union => ClassKey::Union,
        _ => ClassKey::Struct,
    }
}

fn scope_steps(unit: &str, event: &DeclarationEvent) -> Result<Vec<ScopeStep>, BuildError> {
    let mut name = QualifiedName::root();
    let mut steps = Vec::with_capacity(event.scope.len());
    for segment in &event.scope {
        if segment.name.trim().is_empty() {
            return Err(BuildError::EmptyName {
                unit: unit.to_string(),
                line: event.line,
                what: "scope segment".to_string(),
            });
        }
        name = name.child(segment.name.trim());
        let step = match segment.kind {
            ScopeKind::Namespace => ScopeStep {
                name: name.clone(),
                kind: EntityKind::Namespace,
                class_key: None,
                enum_info: None,
            },
            ScopeKind::Class | ScopeKind::Struct | ScopeKind::Union => ScopeStep {
                name: name.clone(),
                kind: if segment.templated {
                    EntityKind::ClassTemplate
                } else {
                    EntityKind::Struct
                },
                class_key: Some(record_key(segment.kind)),
                enum_info: None,
            },
            ScopeKind::ScopedEnum | ScopeKind::UnscopedEnum => ScopeStep {
                name: name.clone(),
                kind: if segment.kind == ScopeKind::ScopedEnum {
                    EntityKind::ScopedEnum
                } else {
                    EntityKind::UnscopedEnum
                },
                class_key: None,
                enum_info: Some(EnumInfo {
                    scoped: segment.kind == ScopeKind::ScopedEnum,
                    base: EnumBase::Default,
                }),
            },
        };
        steps.push(step);
    }
    Ok(steps)
}

/// Resolve `written` (possibly `a::b`) below `base`, adding a namespace step
/// for every extra qualifier segment.
fn qualify(
    unit: &str,
    event: &DeclarationEvent,
    base: &QualifiedName,
    written: &str,
    steps: &mut Vec<ScopeStep>,
) -> Result<QualifiedName, BuildError> {
    let relative = QualifiedName::parse(written).map_err(|source| BuildError::InvalidName {
        unit: unit.to_string(),
        line: event.line,
        source,
    })?;
    let mut name = base.clone();
    let (last, qualifiers) = relative
        .segments()
        .split_last()
        .ok_or_else(|| BuildError::EmptyName {
            unit: unit.to_string(),
            line: event.line,
            what: event.kind.to_string(),
        })?;
    for segment in qualifiers {
        name = name.child(segment.as_str());
        steps.push(ScopeStep {
            name: name.clone(),
            kind: EntityKind::Namespace,
            class_key: None,
            enum_info: None,
        });
    }
    Ok(name.child(last.as_str()))
}

fn owned(
    unit: &str,
    event: &DeclarationEvent,
    mut scopes: Vec<ScopeStep>,
    kind: EntityKind,
) -> Result<Classification, BuildError> {
    let base = scopes
        .last()
        .map_or_else(QualifiedName::root, |s| s.name.clone());
    let name = qualify(unit, event, &base, &event.name, &mut scopes)?;
    let defined = is_definition(kind, event.has_body);
    let is_function = matches!(kind, EntityKind::Function | EntityKind::FunctionTemplate);

    Ok(Classification {
        kind,
        is_definition: defined,
        entity: Some(DeclShape {
            kind,
            name,
            scopes,
            access: access_for(event),
            class_key: class_key_for(event.kind),
            template_params: event.template_params.clone().unwrap_or_default(),
            enum_info: kind.is_enum().then(|| enum_info_for(event)),
            qualifiers: event.qualifiers,
            return_type: if is_function {
                event.return_type.clone()
            } else {
                None
            },
            trailing_return: is_function && event.trailing_return,
            value: event.value.clone(),
            defined,
        }),
        friend: None,
    })
}

fn classify_macro(event: &DeclarationEvent) -> Classification {
    Classification {
        kind: EntityKind::Macro,
        is_definition: true,
        entity: Some(DeclShape {
            kind: EntityKind::Macro,
            name: QualifiedName::root().child(event.name.trim()),
            scopes: Vec::new(),
            access: Access::None,
            class_key: None,
            template_params: Vec::new(),
            enum_info: None,
            qualifiers: Qualifiers::default(),
            return_type: None,
            trailing_return: false,
            value: event.value.clone(),
            defined: true,
        }),
        friend: None,
    }
}

fn classify_friend(
    unit: &str,
    event: &DeclarationEvent,
    scopes: Vec<ScopeStep>,
) -> Result<Classification, BuildError> {
    let Some(class) = scopes.last().filter(|s| s.kind.is_record()) else {
        return Err(misplaced(unit, event, "must be declared inside a class"));
    };
    let class = class.name.clone();

    let spec = event.friend.clone().unwrap_or_else(|| FriendSpec {
        target: event.name.trim().to_string(),
        target_kind: if event.has_body || event.return_type.is_some() {
            FriendTargetKind::Function
        } else {
            FriendTargetKind::Type
        },
    });

    // An inline friend body defines a function of the enclosing namespace.
    let entity = if spec.target_kind == FriendTargetKind::Function && event.has_body {
        let mut namespace_scopes: Vec<ScopeStep> = scopes
            .iter()
            .take_while(|s| s.kind == EntityKind::Namespace)
            .cloned()
            .collect();
        let base = namespace_scopes
            .last()
            .map_or_else(QualifiedName::root, |s| s.name.clone());
        let name = qualify(unit, event, &base, &spec.target, &mut namespace_scopes)?;
        let kind = if event.template_params.is_some() {
            EntityKind::FunctionTemplate
        } else {
            EntityKind::Function
        };
        Some(DeclShape {
            kind,
            name,
            scopes: namespace_scopes,
            access: Access::None,
            class_key: None,
            template_params: event.template_params.clone().unwrap_or_default(),
            enum_info: None,
            qualifiers: event.qualifiers,
            return_type: event.return_type.clone(),
            trailing_return: event.trailing_return,
            value: None,
            defined: true,
        })
    } else {
        None
    };

    Ok(Classification {
        kind: EntityKind::FriendDeclaration,
        is_definition: event.has_body,
        entity,
        friend: Some(FriendLink {
            class,
            class_scopes: scopes,
            reference: spec.target.trim().to_string(),
            target: spec.target_kind,
        }),
    })
}

fn misplaced(unit: &str, event: &DeclarationEvent, reason: &'static str) -> BuildError {
    BuildError::MisplacedDeclaration {
        unit: unit.to_string(),
        line: event.line,
        kind: event.kind,
        name: event.name.clone(),
        reason,
    }
}
