//! One resolution pass over the reference at the caret.

use crate::candidate::{CompletionCandidate, TailPolicy};
use crate::file::CompletionFile;
use crate::host::{PrefixMatcher, ResolutionEngine};
use crate::predicate::CandidatePredicate;
use caret_semantics::{ReferenceSite, SymbolReference};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Candidates for `reference` under `predicate`, each tagged with `tail`.
///
/// No reference means no candidates. Candidates reached along several
/// resolution paths appear once.
pub fn resolve(
    engine: &dyn ResolutionEngine,
    file: &CompletionFile<'_>,
    reference: Option<SymbolReference>,
    tail: TailPolicy,
    predicate: &CandidatePredicate,
    matcher: &PrefixMatcher,
) -> FxHashSet<CompletionCandidate> {
    let Some(reference) = reference else {
        return FxHashSet::default();
    };
    let site = ReferenceSite {
        tree: file.tree(),
        reference,
    };
    let candidates = engine.complete_reference(site, file, predicate, matcher, tail);
    debug!(%predicate, count = candidates.len(), "resolved reference");
    candidates
}
