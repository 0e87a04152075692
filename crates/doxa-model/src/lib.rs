//! # doxa-model
//!
//! Declaration and documentation model builder.
//!
//! A front end hands over one [`Pass`] per source unit: comment blocks,
//! declaration events and other tokens in source order. The builder turns
//! passes into one [`Tree`] of documented entities:
//!
//! - [`comment`] parses raw comment blocks into [`DocComment`]s,
//! - [`classify`] derives entity kind and structural attributes from a
//!   [`DeclarationEvent`],
//! - the attachment resolver pairs comments with declarations,
//! - [`tree`] places entities by qualified name and kind, creating
//!   enclosing scopes on demand,
//! - [`merge`] reconciles redeclarations with what earlier passes built.
//!
//! ```
//! use doxa_model::{DeclarationEvent, DocModelBuilder, KindHint, Pass, Tree};
//!
//! let pass = Pass::new("code.h")
//!     .comment(["\\brief A.", "\\details B."])
//!     .declare(DeclarationEvent::new(KindHint::Struct, "foo").with_body());
//!
//! let mut tree = Tree::new();
//! let report = DocModelBuilder::default().apply(&mut tree, &pass).unwrap();
//! assert_eq!(report.created, 1);
//!
//! let foo = tree.find("foo").unwrap();
//! assert_eq!(foo.doc.as_ref().unwrap().brief, "A.");
//! ```

mod attach;
pub mod builder;
pub mod classify;
pub mod comment;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod merge;
pub mod tree;

pub use builder::{DocModelBuilder, PassReport};
pub use classify::{Classification, classify};
pub use comment::{CommentParser, DocComment, TagKind, TaggedEntry};
pub use diagnostics::Diagnostic;
pub use error::BuildError;
pub use event::{
    CommentBlock, DeclarationEvent, FriendTargetKind, KindHint, Pass, ScopeKind, ScopeSegment,
    SourceItem,
};
pub use merge::{ConflictAttribute, MetadataConflict};
pub use tree::{Entity, EntitySnapshot, NodeId, Origin, Tree, TreeSnapshot};
