//! [`ResolutionEngine`] over the semantic model.

use crate::candidate::{CompletionCandidate, TailPolicy};
use crate::file::CompletionFile;
use crate::host::{PrefixMatcher, ResolutionEngine};
use crate::predicate::{CandidatePredicate, PredicateContext};
use crate::text_policy::icon_for;
use caret_semantics::{ReferenceSite, SemanticModel, SymbolReference};
use rustc_hash::FxHashSet;

/// Resolves references with [`SemanticModel::variants`].
///
/// Predicates are evaluated in the completion copy, at its caret leaf; the
/// accepted symbols are then mapped back to the original file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticEngine;

impl ResolutionEngine for SemanticEngine {
    fn find_reference_at(&self, file: &CompletionFile<'_>, offset: usize) -> Option<SymbolReference> {
        SemanticModel::find_reference_at(file.tree(), offset)
    }

    fn complete_reference(
        &self,
        site: ReferenceSite<'_>,
        file: &CompletionFile<'_>,
        predicate: &CandidatePredicate,
        matcher: &PrefixMatcher,
        tail: TailPolicy,
    ) -> FxHashSet<CompletionCandidate> {
        let model = file.model();
        let context = PredicateContext::new(model, file.caret());
        model
            .variants(site)
            .into_iter()
            .filter(|element| matcher.matches(&model.symbol(element.symbol()).name))
            .filter(|element| predicate.accepts(element, &context))
            .filter_map(|element| {
                let symbol = model.symbol(element.symbol());
                let original = file.to_original_symbol(element.symbol())?;
                Some(
                    CompletionCandidate::symbol(original, symbol.name.clone(), tail)
                        .with_icon(icon_for(symbol)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caret_parser::parse_file;

    const SOURCE: &str = "class A { int alpha; int beta; void m(int alpine) {  } }";

    fn names(candidates: &FxHashSet<CompletionCandidate>) -> Vec<String> {
        let mut names: Vec<_> = candidates.iter().map(|c| c.lookup_string().to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_prefix_and_mapping() {
        let original = SemanticModel::build(parse_file(SOURCE).tree);
        let offset = SOURCE.find("{  }").unwrap() + 2;
        let file = CompletionFile::prepare(&original, offset, "al").unwrap();
        let reference = SemanticEngine.find_reference_at(&file, offset).unwrap();
        let site = ReferenceSite {
            tree: file.tree(),
            reference,
        };
        // the placeholder `al` is itself the typed prefix here
        let found = SemanticEngine.complete_reference(
            site,
            &file,
            &CandidatePredicate::AcceptAll,
            &PrefixMatcher::new("al"),
            TailPolicy::None,
        );
        assert_eq!(names(&found), vec!["alpha", "alpine"]);
        for candidate in &found {
            let id = candidate.symbol_id().unwrap();
            assert_eq!(original.symbol(id).name, candidate.name);
        }
    }

    #[test]
    fn test_predicate_filters_before_mapping() {
        let original = SemanticModel::build(parse_file(SOURCE).tree);
        let offset = SOURCE.find("{  }").unwrap() + 2;
        let file = CompletionFile::prepare(&original, offset, "Placeholder").unwrap();
        let reference = SemanticEngine.find_reference_at(&file, offset).unwrap();
        let site = ReferenceSite {
            tree: file.tree(),
            reference,
        };
        let fields_only = CandidatePredicate::extract(CandidatePredicate::ClassKind(
            caret_semantics::SymbolClass::Field,
        ));
        let found = SemanticEngine.complete_reference(
            site,
            &file,
            &fields_only,
            &PrefixMatcher::accept_all(),
            TailPolicy::Semicolon,
        );
        assert_eq!(names(&found), vec!["alpha", "beta"]);
        assert!(found.iter().all(|c| c.tail == TailPolicy::Semicolon));
    }
}
