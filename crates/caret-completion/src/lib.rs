//! Caret Completion
//!
//! Smart reference completion: decides what kind of symbol may appear at the
//! caret, which symbols in scope qualify, and on repeated requests offers
//! qualified member accesses such as `list.size()` built from them.
//!
//! # Architecture
//!
//! ```text
//! SharedDocument::snapshot()
//!        |
//!        v
//! CompletionContributor::fill_completion_variants
//!        |
//!        v
//! CompletionFile::prepare          copy with a placeholder at the caret
//!        |
//!        v
//! classify(caret) ──── suppressed ───► nothing
//!        |
//!        | (predicate, tail)
//!        v
//! resolve(reference, predicate) ─────► first pass ──► CandidateSink
//!        |
//!        | invocation_count >= threshold
//!        v
//! resolve(reference, accept-all)
//!        |
//!        v
//! QualifierExpansion::expand ────────► second pass ─► CandidateSink
//! ```
//!
//! Parsing of probe snippets and reference resolution go through the
//! [`ProbeParser`] and [`ResolutionEngine`] traits; [`StandardParser`] and
//! [`SemanticEngine`] implement them over `caret-parser` and
//! `caret-semantics`.
//!
//! # Example
//!
//! ```rust
//! use caret_completion::{CompletionContributor, SharedDocument};
//!
//! let source = "class A { int count; void m() { throw  } }";
//! let document = SharedDocument::new(source);
//! let offset = source.find("throw ").unwrap() + "throw ".len();
//!
//! let result = CompletionContributor::default().complete(&document, offset, 1).unwrap();
//! let count = result.find("count").unwrap();
//! assert_eq!(count.insertion_text(), "count;");
//! ```

pub mod candidate;
pub mod classifier;
pub mod config;
pub mod contributor;
pub mod document;
pub mod engine;
pub mod expansion;
pub mod file;
pub mod host;
pub mod predicate;
pub mod resolver;
pub mod text_policy;

pub use candidate::{CandidateIcon, CandidateObject, CompletionCandidate, TailPolicy};
pub use classifier::{classify, Classification};
pub use config::CompletionConfig;
pub use contributor::{CompletionContributor, CompletionResult};
pub use document::{
    DocumentError, DocumentResult, Position, SharedDocument, Snapshot, SourceDocument, TextChange,
};
pub use engine::SemanticEngine;
pub use expansion::QualifierExpansion;
pub use file::CompletionFile;
pub use host::{
    CandidateSink, CompletionParameters, ParseFailure, PrefixMatcher, ProbeExpression,
    ProbeParser, ResolutionEngine, StandardParser,
};
pub use predicate::{CandidatePredicate, PredicateContext};
pub use resolver::resolve;
pub use text_policy::{icon_for, text_for};
