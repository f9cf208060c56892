//! Collaborators the completion core is driven by.
//!
//! The core never parses or resolves by itself. It asks a [`ProbeParser`]
//! for speculative expressions, a [`ResolutionEngine`] for candidates, and
//! hands its results to a [`CandidateSink`].

use crate::candidate::{CompletionCandidate, TailPolicy};
use crate::document::Position;
use crate::file::CompletionFile;
use crate::predicate::CandidatePredicate;
use caret_semantics::{ReferenceSite, SemanticModel, SymbolReference};
use caret_syntax::{NodeId, SyntaxTree};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Why a probe snippet could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("`{text}` is not an expression: {reason}")]
    Invalid { text: String, reason: String },
}

/// A snippet parsed as an expression written at an anchor node.
#[derive(Debug, Clone)]
pub struct ProbeExpression {
    pub tree: SyntaxTree,
}

impl ProbeExpression {
    pub fn new(tree: SyntaxTree) -> Self {
        Self { tree }
    }

    pub fn text(&self) -> &str {
        self.tree.source()
    }

    /// The member access the snippet consists of, if any
    pub fn member_reference(&self) -> Option<SymbolReference> {
        SemanticModel::reference_of(&self.tree, self.tree.root())
            .filter(|reference| reference.qualifier.is_some())
    }

    pub fn site(&self, reference: SymbolReference) -> ReferenceSite<'_> {
        ReferenceSite {
            tree: &self.tree,
            reference,
        }
    }
}

/// Parses snippets as if they were written at a node of the completion copy.
pub trait ProbeParser {
    fn parse_expression(&self, text: &str, anchor: NodeId) -> Result<ProbeExpression, ParseFailure>;
}

/// [`ProbeParser`] backed by the recursive descent parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardParser;

impl ProbeParser for StandardParser {
    fn parse_expression(&self, text: &str, anchor: NodeId) -> Result<ProbeExpression, ParseFailure> {
        caret_parser::parse_expression(text, anchor)
            .map(ProbeExpression::new)
            .map_err(|err| ParseFailure::Invalid {
                text: text.to_string(),
                reason: err.to_string(),
            })
    }
}

/// Finds references and enumerates what they could complete to.
pub trait ResolutionEngine {
    /// The reference under the caret of the completion copy
    fn find_reference_at(&self, file: &CompletionFile<'_>, offset: usize) -> Option<SymbolReference>;

    /// Every candidate for `site` accepted by `predicate` and `matcher`, named
    /// by symbols of the original file and tagged with `tail`.
    fn complete_reference(
        &self,
        site: ReferenceSite<'_>,
        file: &CompletionFile<'_>,
        predicate: &CandidatePredicate,
        matcher: &PrefixMatcher,
        tail: TailPolicy,
    ) -> FxHashSet<CompletionCandidate>;
}

/// Receives completion candidates. Must tolerate equal candidates.
pub trait CandidateSink {
    fn add_candidate(&mut self, candidate: CompletionCandidate);
}

impl CandidateSink for Vec<CompletionCandidate> {
    fn add_candidate(&mut self, candidate: CompletionCandidate) {
        self.push(candidate);
    }
}

/// Case-sensitive match of candidate names against the text typed so far.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrefixMatcher {
    prefix: String,
}

impl PrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }
}

/// One completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionParameters {
    pub position: Position,
    /// Byte offset of the caret in the original file
    pub offset: usize,
    /// 1 for a plain request, 2 and more for repeated "show more" requests
    pub invocation_count: u32,
}

impl CompletionParameters {
    pub fn new(position: Position, offset: usize, invocation_count: u32) -> Self {
        Self {
            position,
            offset,
            invocation_count,
        }
    }
}
