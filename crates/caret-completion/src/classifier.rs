//! Context classification of the caret position.
//!
//! The syntax around the caret picks the predicate that filters candidates
//! and the tail appended after insertion. Rules are tried in order and the
//! first one that answers wins:
//!
//! | # | shape                                   | outcome                                                    |
//! |---|-----------------------------------------|------------------------------------------------------------|
//! | 1 | `throw █`                               | accept all, tail `;`                                        |
//! | 2 | `(T) █`                                 | suppressed                                                 |
//! | 3 | `return █`                              | not the method being written, tail unknown                 |
//! | 4 | `@A(█)`                                 | static final fields                                        |
//! | 5 | inside a variable declaration           | not the declared variable, no self-assignment              |
//! | 6 | anywhere else                           | no self-assignment                                         |

use crate::candidate::TailPolicy;
use crate::predicate::CandidatePredicate;
use caret_semantics::{Modifiers, SymbolClass};
use caret_syntax::{NodeId, SyntaxKind, SyntaxTree, TokenKind};

/// Answer of a single classification rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Matched {
        predicate: CandidatePredicate,
        tail: TailPolicy,
    },
    /// No completion at this position
    Suppressed,
    /// The rule does not apply; try the next one
    NoMatch,
}

impl Classification {
    fn matched(predicate: CandidatePredicate, tail: TailPolicy) -> Self {
        Classification::Matched { predicate, tail }
    }
}

type Rule = fn(&SyntaxTree, NodeId) -> Classification;

const RULES: &[(&str, Rule)] = &[
    ("throw-operand", throw_operand),
    ("after-cast", after_cast),
    ("return-value", return_value),
    ("annotation-argument", annotation_argument),
    ("variable-declaration", variable_declaration),
    ("default", default_rule),
];

/// Classify the caret leaf, `None` when completion is suppressed.
pub fn classify(tree: &SyntaxTree, caret: NodeId) -> Option<(CandidatePredicate, TailPolicy)> {
    match classify_outcome(tree, caret) {
        Classification::Matched { predicate, tail } => Some((predicate, tail)),
        Classification::Suppressed | Classification::NoMatch => None,
    }
}

/// The first rule answer that is not `NoMatch`.
pub fn classify_outcome(tree: &SyntaxTree, caret: NodeId) -> Classification {
    for (name, rule) in RULES {
        let outcome = rule(tree, caret);
        if outcome != Classification::NoMatch {
            tracing::trace!(rule = *name, "caret context classified");
            return outcome;
        }
    }
    Classification::NoMatch
}

fn throw_operand(tree: &SyntaxTree, caret: NodeId) -> Classification {
    let in_throw = tree
        .parent(caret)
        .filter(|&p| tree.kind(p) == SyntaxKind::RefExpr)
        .and_then(|p| tree.parent(p))
        .is_some_and(|gp| tree.kind(gp) == SyntaxKind::ThrowStmt);
    if in_throw {
        Classification::matched(CandidatePredicate::AcceptAll, TailPolicy::Semicolon)
    } else {
        Classification::NoMatch
    }
}

fn after_cast(tree: &SyntaxTree, caret: NodeId) -> Classification {
    let after_cast_paren = tree.prev_leaf(caret).is_some_and(|leaf| {
        tree.token(leaf) == Some(&TokenKind::RParen)
            && tree.parent(leaf).is_some_and(|p| tree.kind(p) == SyntaxKind::CastExpr)
    });
    if after_cast_paren {
        Classification::Suppressed
    } else {
        Classification::NoMatch
    }
}

fn return_value(tree: &SyntaxTree, caret: NodeId) -> Classification {
    let after_return = tree
        .prev_leaf(caret)
        .is_some_and(|leaf| tree.token(leaf) == Some(&TokenKind::Return));
    if after_return && tree.is_inside(caret, SyntaxKind::ReturnStmt) {
        Classification::matched(
            CandidatePredicate::extract(CandidatePredicate::ExcludeDeclared(SymbolClass::Method)),
            TailPolicy::Unknown,
        )
    } else {
        Classification::NoMatch
    }
}

fn annotation_argument(tree: &SyntaxTree, caret: NodeId) -> Classification {
    if tree.is_inside(caret, SyntaxKind::AnnotationArgs) {
        Classification::matched(
            CandidatePredicate::extract(
                CandidatePredicate::ClassKind(SymbolClass::Field)
                    .and(CandidatePredicate::Modifiers(Modifiers::STATIC | Modifiers::FINAL)),
            ),
            TailPolicy::None,
        )
    } else {
        Classification::NoMatch
    }
}

fn variable_declaration(tree: &SyntaxTree, caret: NodeId) -> Classification {
    if tree.find_ancestor_by(caret, SyntaxKind::is_variable).is_some() {
        Classification::matched(
            CandidatePredicate::extract(CandidatePredicate::ExcludeDeclared(SymbolClass::Variable))
                .and(CandidatePredicate::extract(CandidatePredicate::ExcludeSelfAssignment)),
            TailPolicy::None,
        )
    } else {
        Classification::NoMatch
    }
}

fn default_rule(_tree: &SyntaxTree, _caret: NodeId) -> Classification {
    Classification::matched(
        CandidatePredicate::extract(CandidatePredicate::ExcludeSelfAssignment),
        TailPolicy::None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use caret_parser::parse_file;
    use pretty_assertions::assert_eq;

    const CARET: &str = "Caret";

    /// Classify the `Caret` identifier in a method body
    fn classify_in(body: &str) -> Classification {
        let source = format!("class A {{ @Limit int value; void m() {{ {} }} }}", body);
        classify_source(&source)
    }

    fn classify_source(source: &str) -> Classification {
        let parsed = parse_file(source);
        let offset = source.find(CARET).unwrap();
        let caret = parsed.tree.leaf_at_offset(offset).unwrap();
        classify_outcome(&parsed.tree, caret)
    }

    fn tail_of(outcome: &Classification) -> Option<TailPolicy> {
        match outcome {
            Classification::Matched { tail, .. } => Some(*tail),
            _ => None,
        }
    }

    #[test]
    fn test_throw_operand() {
        let outcome = classify_in("throw Caret;");
        assert_eq!(
            outcome,
            Classification::matched(CandidatePredicate::AcceptAll, TailPolicy::Semicolon)
        );
    }

    #[test]
    fn test_qualified_throw_operand_is_not_rule_one() {
        // the caret's parent is `e.Caret`, whose parent is another reference
        let outcome = classify_in("throw e.Caret.x;");
        assert_eq!(tail_of(&outcome), Some(TailPolicy::None));
    }

    #[test]
    fn test_after_cast_is_suppressed() {
        assert_eq!(classify_in("int x = (int) Caret;"), Classification::Suppressed);
        assert_eq!(classify_in("return (String) Caret;"), Classification::Suppressed);
    }

    #[test]
    fn test_parenthesized_value_is_not_a_cast() {
        let outcome = classify_in("foo((Caret));");
        assert_eq!(tail_of(&outcome), Some(TailPolicy::None));
    }

    #[test]
    fn test_return_value() {
        let outcome = classify_in("return Caret;");
        assert_eq!(
            outcome,
            Classification::matched(
                CandidatePredicate::extract(CandidatePredicate::ExcludeDeclared(SymbolClass::Method)),
                TailPolicy::Unknown,
            )
        );
        // deeper in the returned expression the default applies
        assert_eq!(
            classify_in("return 1 + Caret;"),
            Classification::matched(
                CandidatePredicate::extract(CandidatePredicate::ExcludeSelfAssignment),
                TailPolicy::None,
            )
        );
    }

    #[test]
    fn test_annotation_argument_wins_over_field() {
        let outcome = classify_source("class A { @Limit(Caret) int value; }");
        match outcome {
            Classification::Matched { predicate, tail } => {
                assert_eq!(tail, TailPolicy::None);
                insta::assert_snapshot!(
                    predicate.to_string(),
                    @"extract(and(class(Field), modifiers(static final)))"
                );
            }
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_variable_declarations() {
        let expected = Classification::matched(
            CandidatePredicate::extract(CandidatePredicate::ExcludeDeclared(SymbolClass::Variable))
                .and(CandidatePredicate::extract(CandidatePredicate::ExcludeSelfAssignment)),
            TailPolicy::None,
        );
        assert_eq!(classify_in("int total = Caret;"), expected);
        assert_eq!(classify_source("class A { int total = Caret; }"), expected);
    }

    #[test]
    fn test_default() {
        for body in ["foo(Caret);", "x = Caret;", "Caret;", "if (Caret) {}"] {
            assert_eq!(
                classify_in(body),
                Classification::matched(
                    CandidatePredicate::extract(CandidatePredicate::ExcludeSelfAssignment),
                    TailPolicy::None,
                ),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn test_public_api_collapses_suppression() {
        let source = "class A { void m() { int x = (int) Caret; } }";
        let parsed = parse_file(source);
        let caret = parsed.tree.leaf_at_offset(source.find(CARET).unwrap()).unwrap();
        assert_eq!(classify(&parsed.tree, caret), None);
    }
}
