//! Qualified member access synthesis.
//!
//! On a repeated request every unfiltered first-pass candidate is tried as a
//! qualifier. `list` is turned into the probe `list.xxx`, which is parsed as
//! if written at the caret; resolving the probe's reference yields the
//! members reachable through `list`. Each member that passes the context's
//! predicate becomes a candidate such as `list.size()`, provided the
//! synthesized text parses as well.
//!
//! ```text
//! list ──► "list.xxx" ──parse──► members of List ──predicate──► "list.size()" ──parse──► candidate
//!               │                                                       │
//!               └── parse failure: qualifier skipped                     └── failure: member skipped
//! ```

use crate::candidate::{CompletionCandidate, TailPolicy};
use crate::config::CompletionConfig;
use crate::file::CompletionFile;
use crate::host::{PrefixMatcher, ProbeParser, ResolutionEngine};
use crate::predicate::CandidatePredicate;
use crate::text_policy::{icon_for, text_for};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

/// Synthesizes `qualifier.member` candidates.
pub struct QualifierExpansion<'a> {
    parser: &'a dyn ProbeParser,
    engine: &'a dyn ResolutionEngine,
    config: &'a CompletionConfig,
}

impl<'a> QualifierExpansion<'a> {
    pub fn new(
        parser: &'a dyn ProbeParser,
        engine: &'a dyn ResolutionEngine,
        config: &'a CompletionConfig,
    ) -> Self {
        Self {
            parser,
            engine,
            config,
        }
    }

    /// Expand every qualifier; failures only drop the affected candidate.
    pub fn expand(
        &self,
        file: &CompletionFile<'_>,
        qualifiers: &FxHashSet<CompletionCandidate>,
        predicate: &CandidatePredicate,
        tail: TailPolicy,
    ) -> FxHashSet<CompletionCandidate> {
        let expanded: FxHashSet<CompletionCandidate> = qualifiers
            .iter()
            .flat_map(|qualifier| self.expand_one(file, qualifier, predicate, tail))
            .collect();
        debug!(
            qualifiers = qualifiers.len(),
            count = expanded.len(),
            "qualifier expansion finished"
        );
        expanded
    }

    fn expand_one(
        &self,
        file: &CompletionFile<'_>,
        qualifier: &CompletionCandidate,
        predicate: &CandidatePredicate,
        tail: TailPolicy,
    ) -> Vec<CompletionCandidate> {
        let Some(id) = qualifier.symbol_id() else {
            return Vec::new();
        };
        let Some(qualifier_text) = text_for(file.original_symbol(id)) else {
            return Vec::new();
        };

        let probe_text = format!("{}.{}", qualifier_text, self.config.probe_suffix);
        let probe = match self.parser.parse_expression(&probe_text, file.caret()) {
            Ok(probe) => probe,
            Err(err) => {
                trace!(%err, "probe skipped");
                return Vec::new();
            }
        };
        let Some(reference) = probe.member_reference() else {
            trace!(probe = %probe_text, "probe holds no member access");
            return Vec::new();
        };

        // the typed prefix matched the qualifier, not its members
        let members = self.engine.complete_reference(
            probe.site(reference),
            file,
            predicate,
            &PrefixMatcher::accept_all(),
            tail,
        );

        members
            .iter()
            .filter_map(|member| {
                let symbol = file.original_symbol(member.symbol_id()?);
                let member_text = text_for(symbol)?;
                let text = format!("{}.{}", qualifier_text, member_text);
                match self.parser.parse_expression(&text, file.caret()) {
                    Ok(_) => Some(CompletionCandidate::expression(text, tail).with_icon(icon_for(symbol))),
                    Err(err) => {
                        trace!(%err, "synthesized member skipped");
                        None
                    }
                }
            })
            .collect()
    }
}
