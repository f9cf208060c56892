//! Completion entry point.

use crate::candidate::CompletionCandidate;
use crate::classifier::classify;
use crate::config::CompletionConfig;
use crate::document::{DocumentResult, SharedDocument, Snapshot};
use crate::engine::SemanticEngine;
use crate::expansion::QualifierExpansion;
use crate::file::CompletionFile;
use crate::host::{
    CandidateSink, CompletionParameters, PrefixMatcher, ProbeParser, ResolutionEngine,
    StandardParser,
};
use crate::predicate::CandidatePredicate;
use crate::resolver::resolve;
use rustc_hash::FxHashSet;
use tracing::{debug, instrument, warn};

/// Candidates collected for one request, first pass first.
#[derive(Debug, Clone, Default)]
pub struct CompletionResult {
    candidates: Vec<CompletionCandidate>,
    seen: FxHashSet<CompletionCandidate>,
    limit: Option<usize>,
    /// Set when candidates were dropped because of the limit
    pub is_incomplete: bool,
}

impl CompletionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn candidates(&self) -> &[CompletionCandidate] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<CompletionCandidate> {
        self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Lookup strings in emission order
    pub fn lookup_strings(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.lookup_string()).collect()
    }

    pub fn contains(&self, lookup: &str) -> bool {
        self.candidates.iter().any(|c| c.lookup_string() == lookup)
    }

    pub fn find(&self, lookup: &str) -> Option<&CompletionCandidate> {
        self.candidates.iter().find(|c| c.lookup_string() == lookup)
    }
}

impl CandidateSink for CompletionResult {
    fn add_candidate(&mut self, candidate: CompletionCandidate) {
        if self.seen.contains(&candidate) {
            return;
        }
        if self.limit.is_some_and(|limit| self.candidates.len() >= limit) {
            self.is_incomplete = true;
            return;
        }
        self.seen.insert(candidate.clone());
        self.candidates.push(candidate);
    }
}

/// Produces smart reference completions for a caret position.
pub struct CompletionContributor<P = StandardParser, E = SemanticEngine> {
    config: CompletionConfig,
    parser: P,
    engine: E,
}

impl CompletionContributor {
    pub fn new(config: CompletionConfig) -> Self {
        Self::with_collaborators(config, StandardParser, SemanticEngine)
    }
}

impl Default for CompletionContributor {
    fn default() -> Self {
        Self::new(CompletionConfig::default())
    }
}

impl<P: ProbeParser, E: ResolutionEngine> CompletionContributor<P, E> {
    pub fn with_collaborators(config: CompletionConfig, parser: P, engine: E) -> Self {
        Self {
            config,
            parser,
            engine,
        }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Run both passes against a snapshot, emitting into `sink`.
    #[instrument(skip(self, snapshot, sink), fields(offset = params.offset, invocation = params.invocation_count))]
    pub fn fill_completion_variants(
        &self,
        params: &CompletionParameters,
        snapshot: &Snapshot<'_>,
        sink: &mut dyn CandidateSink,
    ) {
        let file = match CompletionFile::prepare(snapshot.model(), params.offset, &self.config.placeholder) {
            Ok(file) => file,
            Err(err) => {
                warn!("Cannot complete at {}: {}", params.position, err);
                return;
            }
        };

        let Some((predicate, tail)) = classify(file.tree(), file.caret()) else {
            debug!("completion suppressed at {}", params.position);
            return;
        };
        let reference = self.engine.find_reference_at(&file, params.offset);
        if reference.is_none() {
            debug!("no reference at {}", params.position);
            return;
        }
        let matcher = file.prefix_matcher();

        let first = resolve(&self.engine, &file, reference, tail, &predicate, &matcher);
        for candidate in first {
            sink.add_candidate(candidate);
        }

        if !self.config.expands_at(params.invocation_count) {
            return;
        }
        let qualifiers = resolve(
            &self.engine,
            &file,
            reference,
            tail,
            &CandidatePredicate::AcceptAll,
            &matcher,
        );
        let expansion = QualifierExpansion::new(&self.parser, &self.engine, &self.config);
        for candidate in expansion.expand(&file, &qualifiers, &predicate, tail) {
            sink.add_candidate(candidate);
        }
    }

    /// Complete at a byte offset of a shared document.
    pub fn complete(
        &self,
        document: &SharedDocument,
        offset: usize,
        invocation_count: u32,
    ) -> DocumentResult<CompletionResult> {
        let snapshot = document.snapshot();
        let position = snapshot.document().offset_to_position(offset)?;
        let params = CompletionParameters::new(position, offset, invocation_count);
        let mut result = CompletionResult::with_limit(self.config.max_candidates);
        self.fill_completion_variants(&params, &snapshot, &mut result);
        debug!(count = result.len(), "completion finished");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::TailPolicy;
    use caret_semantics::SymbolId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_result_drops_duplicates() {
        let mut result = CompletionResult::new();
        result.add_candidate(CompletionCandidate::symbol(SymbolId(1), "a", TailPolicy::None));
        result.add_candidate(CompletionCandidate::symbol(SymbolId(1), "a", TailPolicy::Semicolon));
        result.add_candidate(CompletionCandidate::expression("a.b()", TailPolicy::None));
        assert_eq!(result.lookup_strings(), vec!["a", "a.b()"]);
        assert!(!result.is_incomplete);
    }

    #[test]
    fn test_result_limit() {
        let mut result = CompletionResult::with_limit(Some(1));
        result.add_candidate(CompletionCandidate::symbol(SymbolId(1), "a", TailPolicy::None));
        result.add_candidate(CompletionCandidate::symbol(SymbolId(2), "b", TailPolicy::None));
        assert_eq!(result.len(), 1);
        assert!(result.is_incomplete);
    }

    #[test]
    fn test_complete_rejects_bad_offset() {
        let document = SharedDocument::new("class A {}");
        let contributor = CompletionContributor::default();
        assert!(contributor.complete(&document, 999, 1).is_err());
    }

    #[test]
    fn test_prefix_filters_first_pass() {
        let source = "class A { int count; int total; void m() { co } }";
        let document = SharedDocument::new(source);
        let offset = source.find("co }").unwrap() + 2;
        let result = CompletionContributor::default().complete(&document, offset, 1).unwrap();
        assert_eq!(result.lookup_strings(), vec!["count"]);
    }

    #[test]
    fn test_vec_sink() {
        let source = "class A { int count; void m() { throw  } }";
        let document = SharedDocument::new(source);
        let offset = source.find("throw ").unwrap() + 6;
        let snapshot = document.snapshot();
        let params = CompletionParameters::new(
            snapshot.document().offset_to_position(offset).unwrap(),
            offset,
            1,
        );
        let mut sink: Vec<CompletionCandidate> = Vec::new();
        CompletionContributor::default().fill_completion_variants(&params, &snapshot, &mut sink);
        assert!(sink.iter().any(|c| c.lookup_string() == "count"));
        assert!(sink.iter().all(|c| c.tail == TailPolicy::Semicolon));
    }
}
