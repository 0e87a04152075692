//! Pass driver.
//!
//! [`DocModelBuilder::apply`] runs one pass against a tree:
//!
//! 1. plan comment attachment over the ordered stream,
//! 2. classify declarations and parse comments (in parallel for large passes),
//! 3. bind comments to declarations,
//! 4. place every declaration in the tree, merging into existing entities,
//! 5. resolve friend edges.
//!
//! Steps 3 to 5 mutate the tree and run on one thread. The pass works on a
//! copy of the caller's tree which replaces the original only once every
//! declaration has been placed, so a rejected pass leaves no trace.

use doxa_config::{BuilderConfig, DoxaConfig};
use rayon::prelude::*;
use serde::Serialize;

use crate::attach::{self, Plan};
use crate::classify::{Classification, classify};
use crate::comment::{CommentParser, ParsedComment};
use crate::diagnostics::Diagnostic;
use crate::error::BuildError;
use crate::event::Pass;
use crate::merge::MetadataConflict;
use crate::tree::{Origin, Placement, Tree};

/// What one successful pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub unit: String,
    /// Entities created by this pass (enclosing scopes created on demand
    /// are not counted).
    pub created: usize,
    /// Declarations folded into an existing entity.
    pub merged: usize,
    pub friends_resolved: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl PassReport {
    fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            created: 0,
            merged: 0,
            friends_resolved: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &MetadataConflict> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::MergeConflict(conflict) => Some(conflict),
            _ => None,
        })
    }

    pub fn orphans(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_orphan())
    }

    /// No diagnostics of any kind.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Builds and grows a [`Tree`] one pass at a time.
#[derive(Debug, Clone)]
pub struct DocModelBuilder {
    parser: CommentParser,
    options: BuilderConfig,
}

impl Default for DocModelBuilder {
    fn default() -> Self {
        Self::new(&DoxaConfig::default())
    }
}

impl DocModelBuilder {
    #[must_use]
    pub fn new(config: &DoxaConfig) -> Self {
        Self {
            parser: CommentParser::new(&config.comments),
            options: config.builder.clone(),
        }
    }

    #[must_use]
    pub const fn parser(&self) -> &CommentParser {
        &self.parser
    }

    #[must_use]
    pub const fn options(&self) -> &BuilderConfig {
        &self.options
    }

    /// Apply one pass to `tree`.
    ///
    /// # Errors
    /// Returns `BuildError` if the pass breaks the input contract. `tree`
    /// is then exactly as it was before the call.
    pub fn apply(&self, tree: &mut Tree, pass: &Pass) -> Result<PassReport, BuildError> {
        tracing::debug!(unit = %pass.unit, items = pass.items.len(), "applying pass");
        let mut staged = tree.clone();
        match self.run(&mut staged, pass) {
            Ok(report) => {
                *tree = staged;
                tracing::debug!(
                    unit = %report.unit,
                    created = report.created,
                    merged = report.merged,
                    diagnostics = report.diagnostics.len(),
                    "pass applied"
                );
                Ok(report)
            }
            Err(error) => {
                tracing::warn!(%error, unit = %pass.unit, "pass rejected; tree left unchanged");
                Err(error)
            }
        }
    }

    /// Apply passes in order, stopping at the first rejected one. Passes
    /// before it stay applied.
    ///
    /// # Errors
    /// Returns the first pass's `BuildError`.
    pub fn apply_all<'a, I>(&self, tree: &mut Tree, passes: I) -> Result<Vec<PassReport>, BuildError>
    where
        I: IntoIterator<Item = &'a Pass>,
    {
        passes
            .into_iter()
            .map(|pass| self.apply(tree, pass))
            .collect()
    }

    /// Build a fresh tree from `passes`.
    ///
    /// # Errors
    /// Returns the first pass's `BuildError`.
    pub fn build<'a, I>(&self, passes: I) -> Result<(Tree, Vec<PassReport>), BuildError>
    where
        I: IntoIterator<Item = &'a Pass>,
    {
        let mut tree = Tree::new();
        let reports = self.apply_all(&mut tree, passes)?;
        Ok((tree, reports))
    }

    fn run(&self, tree: &mut Tree, pass: &Pass) -> Result<PassReport, BuildError> {
        let unit = pass.unit.as_str();
        let plan = attach::plan(pass);
        let (classified, parsed) = self.classify_and_parse(unit, &plan);
        let classified = classified?;
        let owns_entity: Vec<bool> = classified.iter().map(|c| c.entity.is_some()).collect();
        let bound = attach::bind(&plan, parsed, unit, &owns_entity);

        let mut report = PassReport::new(unit);
        report.diagnostics = bound.diagnostics;

        for (doc, origin) in bound.file_docs {
            tree.document_file(unit, doc, &origin);
        }

        let steps = plan
            .declarations
            .iter()
            .zip(classified)
            .zip(bound.attachments);
        for ((event, classification), attachment) in steps {
            if let Some(link) = &classification.friend {
                tree.record_friend(unit, event.line, link)?;
            }
            let Some(shape) = classification.entity else {
                continue;
            };
            let origin = Origin::new(unit, event.line);
            match tree.place(unit, event.line, &shape, attachment, &origin)? {
                Placement::Created(_) => {
                    report.created += 1;
                    tracing::trace!(name = %shape.name, kind = %shape.kind, "created entity");
                }
                Placement::Merged { conflicts, .. } => {
                    report.merged += 1;
                    tracing::trace!(name = %shape.name, kind = %shape.kind, "merged entity");
                    for conflict in conflicts {
                        tracing::warn!(%conflict, "conflicting redeclaration");
                        report.diagnostics.push(Diagnostic::MergeConflict(conflict));
                    }
                }
            }
        }

        if self.options.resolve_friends {
            report.friends_resolved = tree.resolve_friends();
        }
        Ok(report)
    }

    /// Classification and comment parsing share no state; large passes run
    /// both on the rayon pool.
    fn classify_and_parse(
        &self,
        unit: &str,
        plan: &Plan<'_>,
    ) -> (Result<Vec<Classification>, BuildError>, Vec<ParsedComment>) {
        let parallel =
            self.options.parallel && plan.declarations.len() >= self.options.parallel_threshold;
        if parallel {
            rayon::join(
                || {
                    plan.declarations
                        .par_iter()
                        .map(|event| classify(unit, event))
                        .collect()
                },
                || {
                    plan.candidates
                        .par_iter()
                        .map(|candidate| candidate.parse(&self.parser))
                        .collect()
                },
            )
        } else {
            (
                plan.declarations
                    .iter()
                    .map(|event| classify(unit, event))
                    .collect(),
                plan.candidates
                    .iter()
                    .map(|candidate| candidate.parse(&self.parser))
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DeclarationEvent, KindHint, ScopeKind};
    use pretty_assertions::assert_eq;

    fn builder(parallel_threshold: usize) -> DocModelBuilder {
        let mut config = DoxaConfig::default();
        config.builder.parallel_threshold = parallel_threshold;
        DocModelBuilder::new(&config)
    }

    fn members(count: usize) -> Pass {
        (0..count).fold(
            Pass::new("wide.h").declare(DeclarationEvent::new(KindHint::Struct, "s").with_body()),
            |pass, i| {
                pass.comment([format!("\\brief Member {i}.")])
                    .declare(DeclarationEvent::new(KindHint::Variable, format!("m{i}")).within(ScopeKind::Struct, "s"))
            },
        )
    }

    #[test]
    fn parallel_and_sequential_paths_agree() {
        let pass = members(40);
        let (sequential, _) = builder(usize::MAX).build([&pass]).unwrap();
        let (parallel, _) = builder(1).build([&pass]).unwrap();
        assert_eq!(sequential.snapshot(), parallel.snapshot());
        assert_eq!(parallel.find("s").unwrap().children.len(), 40);
    }

    #[test]
    fn rejected_pass_leaves_tree_untouched() {
        let builder = DocModelBuilder::default();
        let mut tree = Tree::new();
        builder.apply(&mut tree, &members(2)).unwrap();
        let before = tree.clone();

        let bad = Pass::new("bad.h")
            .declare(DeclarationEvent::new(KindHint::Variable, "late").within(ScopeKind::Struct, "s"))
            .declare(DeclarationEvent::new(KindHint::Namespace, "n").within(ScopeKind::Struct, "s"));
        let err = builder.apply(&mut tree, &bad).unwrap_err();
        assert_eq!(err.unit(), "bad.h");
        assert_eq!(tree, before);
    }

    #[test]
    fn report_counts_created_and_merged() {
        let builder = DocModelBuilder::default();
        let mut tree = Tree::new();
        let first = builder.apply(&mut tree, &members(3)).unwrap();
        assert_eq!((first.created, first.merged), (4, 0));
        let second = builder.apply(&mut tree, &members(3)).unwrap();
        assert_eq!((second.created, second.merged), (0, 4));
        assert!(second.is_clean());
    }
}
