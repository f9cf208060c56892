//! Candidate predicate algebra.
//!
//! A [`CandidatePredicate`] decides whether a resolved element may be offered
//! at the caret. Resolution hands out elements wrapped as
//! [`ResolvedElement::Candidate`]; every predicate that inspects a declaration
//! rejects a wrapped element, so such predicates are composed under
//! [`CandidatePredicate::Extract`], which looks through the wrapper first.
//!
//! ```text
//! And(Extract(ExcludeDeclared(Variable)), Extract(ExcludeSelfAssignment))
//!  │       │         │
//!  │       │         └── reject the variable whose declaration holds the caret
//!  │       └──────────── test the declaration, not the wrapper
//!  └──────────────────── both must accept
//! ```

use caret_semantics::{
    Modifiers, ReferenceSite, ResolvedElement, SemanticModel, SymbolClass, SymbolId,
};
use caret_syntax::{NodeId, SyntaxKind};
use std::fmt;

/// Where a predicate is evaluated: the analysed file and the caret leaf in it.
#[derive(Debug, Clone, Copy)]
pub struct PredicateContext<'a> {
    pub model: &'a SemanticModel,
    pub caret: NodeId,
}

impl<'a> PredicateContext<'a> {
    pub fn new(model: &'a SemanticModel, caret: NodeId) -> Self {
        Self { model, caret }
    }

    /// Symbol declared by the nearest enclosing declaration of `class`
    fn enclosing_declaration(&self, class: SymbolClass) -> Option<SymbolId> {
        let tree = self.model.tree();
        tree.find_ancestor_by(self.caret, |kind| declares(kind, class))
            .and_then(|decl| self.model.declaration_at(decl))
    }

    /// Symbol assigned to when the caret's reference is the whole right
    /// operand of `x = ...`, possibly parenthesized
    fn assignment_target(&self) -> Option<SymbolId> {
        let tree = self.model.tree();
        let mut operand = tree
            .ancestors(self.caret)
            .take_while(|&node| node == self.caret || tree.kind(node) == SyntaxKind::RefExpr)
            .filter(|&node| tree.kind(node) == SyntaxKind::RefExpr)
            .last()?;
        while let Some(parent) = tree.parent(operand) {
            match tree.kind(parent) {
                SyntaxKind::ParenExpr => operand = parent,
                SyntaxKind::AssignExpr => break,
                _ => return None,
            }
        }
        let assignment = tree.parent(operand)?;
        let lhs = match tree.operands(assignment) {
            (Some(lhs), Some(rhs)) if rhs == operand => lhs,
            _ => return None,
        };
        let reference = SemanticModel::reference_of(tree, lhs)?;
        self.model.resolve(ReferenceSite { tree, reference })
    }
}

fn declares(kind: SyntaxKind, class: SymbolClass) -> bool {
    match class {
        SymbolClass::Method => kind == SyntaxKind::Method,
        SymbolClass::Variable => kind.is_variable(),
        SymbolClass::Field => kind == SyntaxKind::Field,
        SymbolClass::Class => kind == SyntaxKind::Class,
    }
}

/// A filter over resolved elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidatePredicate {
    AcceptAll,
    And(Vec<CandidatePredicate>),
    /// Rejects the symbol declared by the enclosing declaration of this class
    ExcludeDeclared(SymbolClass),
    /// Rejects the target of `x = x` when the caret's reference is the right operand
    ExcludeSelfAssignment,
    /// Evaluates the inner predicate on the declaration behind a wrapper
    Extract(Box<CandidatePredicate>),
    ClassKind(SymbolClass),
    /// Accepts symbols carrying all of these modifiers
    Modifiers(Modifiers),
}

impl CandidatePredicate {
    pub fn extract(inner: CandidatePredicate) -> Self {
        CandidatePredicate::Extract(Box::new(inner))
    }

    /// Conjunction, flattening nested `And`s.
    pub fn and(self, other: CandidatePredicate) -> Self {
        let mut parts = match self {
            CandidatePredicate::And(parts) => parts,
            single => vec![single],
        };
        match other {
            CandidatePredicate::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        CandidatePredicate::And(parts)
    }

    pub fn is_accept_all(&self) -> bool {
        matches!(self, CandidatePredicate::AcceptAll)
    }

    pub fn accepts(&self, element: &ResolvedElement, context: &PredicateContext<'_>) -> bool {
        match self {
            CandidatePredicate::AcceptAll => true,
            CandidatePredicate::And(parts) => parts.iter().all(|p| p.accepts(element, context)),
            CandidatePredicate::Extract(inner) => {
                inner.accepts(&element.unwrap_declaration(), context)
            }
            _ if element.is_wrapped() => false,
            CandidatePredicate::ExcludeDeclared(class) => {
                context.enclosing_declaration(*class) != Some(element.symbol())
            }
            CandidatePredicate::ExcludeSelfAssignment => {
                context.assignment_target() != Some(element.symbol())
            }
            CandidatePredicate::ClassKind(class) => {
                class.matches(context.model.symbol(element.symbol()).kind)
            }
            CandidatePredicate::Modifiers(required) => context
                .model
                .symbol(element.symbol())
                .modifiers
                .contains(*required),
        }
    }
}

impl fmt::Display for CandidatePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidatePredicate::AcceptAll => write!(f, "accept-all"),
            CandidatePredicate::And(parts) => {
                write!(f, "and(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, ")")
            }
            CandidatePredicate::ExcludeDeclared(class) => write!(f, "exclude-declared({:?})", class),
            CandidatePredicate::ExcludeSelfAssignment => write!(f, "exclude-self-assignment"),
            CandidatePredicate::Extract(inner) => write!(f, "extract({})", inner),
            CandidatePredicate::ClassKind(class) => write!(f, "class({:?})", class),
            CandidatePredicate::Modifiers(modifiers) => write!(f, "modifiers({})", modifiers),
        }
    }
}
