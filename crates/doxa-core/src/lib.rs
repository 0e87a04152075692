//! # doxa-core
//!
//! Core vocabulary and error types for doxa.
//!
//! This crate provides the foundational types shared across all doxa crates:
//! - Entity kinds with their containment rules
//! - Access regions, record keys, enum and template attributes
//! - Declaration qualifiers and documentation provenance
//! - Qualified names
//! - Cross-cutting error types

pub mod enums;
pub mod errors;
pub mod name;

pub use enums::{
    Access, ClassKey, EntityKind, EnumBase, EnumInfo, Provenance, Qualifiers, TemplateParam,
    TemplateParamKind, same_template_shape,
};
pub use errors::CoreError;
pub use name::QualifiedName;
