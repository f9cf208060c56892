//! Type checker inspection.
//!
//! Flags call arguments whose type does not fit the parameter they are
//! passed to, and right-hand operands that do not fit the operator chosen by
//! the left operand's type. Unknown types never produce a problem.

use crate::{Inspection, ProblemsHolder};
use caret_semantics::{SemanticModel, Type};
use caret_syntax::{NodeId, SyntaxKind, SyntaxTree, TokenKind};

/// Expected type of the right operand of `op` when the left operand has type `left`.
pub fn operator_signature(op: &TokenKind, left: &Type) -> Option<Type> {
    match op {
        TokenKind::Plus if left.is_string() => Some(Type::class("Object")),
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Star
        | TokenKind::Slash
        | TokenKind::Percent
        | TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::LtEq
        | TokenKind::GtEq
            if left.is_numeric() =>
        {
            Some(Type::Double)
        }
        TokenKind::AmpAmp | TokenKind::PipePipe if *left == Type::Boolean => Some(Type::Boolean),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCheckerInspection;

impl TypeCheckerInspection {
    pub fn new() -> Self {
        Self
    }

    fn visit(&self, model: &SemanticModel, node: NodeId, holder: &mut ProblemsHolder) {
        match model.tree().kind(node) {
            SyntaxKind::CallExpr => self.visit_call(model, node, holder),
            SyntaxKind::BinaryExpr => self.visit_binary(model, node, holder),
            _ => {}
        }
        for child in model.tree().child_nodes(node) {
            self.visit(model, child, holder);
        }
    }

    fn visit_call(&self, model: &SemanticModel, call: NodeId, holder: &mut ProblemsHolder) {
        let tree = model.tree();
        let Some(method) = model.resolve_call(tree, call) else {
            return;
        };
        // arity is not checked here; unmatched arguments are skipped
        let declared = model.parameters_of(method);
        let params = &model.symbol(method).params;
        for (i, (arg, param)) in tree.call_args(call).into_iter().zip(params).enumerate() {
            let Some(message) = mismatch(model, tree, param, arg) else {
                continue;
            };
            let mut problem = holder.problem(tree.span(arg), message);
            if let Some(decl) = declared.get(i).and_then(|&p| model.symbol(p).decl) {
                let related = holder.source_span(decl.name_span);
                problem = problem.with_secondary_span(related, "parameter declared here");
            }
            holder.register(problem);
        }
    }

    fn visit_binary(&self, model: &SemanticModel, expr: NodeId, holder: &mut ProblemsHolder) {
        let tree = model.tree();
        let (Some(lhs), Some(rhs)) = tree.operands(expr) else {
            return;
        };
        let Some(op) = tree.operator(expr) else {
            return;
        };
        let Some(expected) = operator_signature(op, &model.type_of(tree, lhs)) else {
            return;
        };
        if let Some(message) = mismatch(model, tree, &expected, rhs) {
            holder.register_problem(tree.span(rhs), message);
        }
    }
}

/// Problem message when `expr` does not fit `expected`; unknown types always fit
fn mismatch(model: &SemanticModel, tree: &SyntaxTree, expected: &Type, expr: NodeId) -> Option<String> {
    let actual = model.type_of(tree, expr);
    if expected.is_unknown() || actual.is_unknown() || expected.is_assignable_from(&actual) {
        return None;
    }
    Some(format!("Expected type '{}', got '{}' instead", expected, actual))
}

impl Inspection for TypeCheckerInspection {
    fn code(&self) -> &'static str {
        "W0001"
    }

    fn display_name(&self) -> &'static str {
        "Type checker"
    }

    fn check(&self, model: &SemanticModel, holder: &mut ProblemsHolder) {
        self.visit(model, model.tree().root(), holder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect_source;
    use caret_diagnostics::span::LabelStyle;
    use pretty_assertions::assert_eq;

    fn messages(source: &str) -> Vec<String> {
        inspect_source(&TypeCheckerInspection, "A.java", source)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn test_argument_mismatch() {
        let source = r#"class A {
    void take(int n) {}
    void run() { take("five"); }
}"#;
        assert_eq!(messages(source), vec!["Expected type 'int', got 'String' instead"]);
    }

    #[test]
    fn test_argument_widening_is_accepted() {
        let source = r#"class A {
    void take(double d, Object o, String s) {}
    void run() { take(1, "x", null); }
}"#;
        assert!(messages(source).is_empty());
    }

    #[test]
    fn test_builtin_method_parameters() {
        let source = r#"class A {
    String name;
    void run() { name.charAt(true); name.concat(name); }
}"#;
        assert_eq!(messages(source), vec!["Expected type 'int', got 'boolean' instead"]);
    }

    #[test]
    fn test_extra_and_unknown_arguments_are_ignored() {
        let source = r#"class A {
    void take(int n) {}
    void run() { take(1, "extra"); take(missing); undefined("x"); }
}"#;
        assert!(messages(source).is_empty());
    }

    #[test]
    fn test_binary_operands() {
        let source = r#"class A {
    boolean flag;
    String s;
    void run() {
        int a = 1 + true;
        String b = s + 1;
        boolean c = flag && 2;
        boolean d = 1 < 2.5;
        boolean e = s == null;
    }
}"#;
        assert_eq!(
            messages(source),
            vec![
                "Expected type 'double', got 'boolean' instead",
                "Expected type 'boolean', got 'int' instead",
            ]
        );
    }

    #[test]
    fn test_problem_span_covers_argument() {
        let source = "class A { void take(int n) {} void run() { take(\"five\"); } }";
        let problems = inspect_source(&TypeCheckerInspection, "A.java", source);
        let span = problems[0].primary_span().unwrap();
        assert_eq!(&source[span.start..span.end], "\"five\"");
    }

    #[test]
    fn test_argument_problem_points_at_parameter() {
        let source = "class A { void take(int n) {} void run() { take(\"five\"); } }";
        let problems = inspect_source(&TypeCheckerInspection, "A.java", source);
        let labels = problems[0].spans.labels();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].style, LabelStyle::Secondary);
        assert_eq!(labels[1].message, "parameter declared here");
        assert_eq!(&source[labels[1].span.start..labels[1].span.end], "n");
    }

    #[test]
    fn test_builtin_and_operator_problems_have_no_related_location() {
        let source = "class A { String s; void run() { s.charAt(true); int a = 1 + true; } }";
        let problems = inspect_source(&TypeCheckerInspection, "A.java", source);
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().all(|p| p.spans.labels().len() == 1));
    }

    #[test]
    fn test_operator_signatures() {
        assert_eq!(operator_signature(&TokenKind::Plus, &Type::Int), Some(Type::Double));
        assert_eq!(
            operator_signature(&TokenKind::Plus, &Type::class("String")),
            Some(Type::class("Object"))
        );
        assert_eq!(operator_signature(&TokenKind::Minus, &Type::class("String")), None);
        assert_eq!(operator_signature(&TokenKind::EqEq, &Type::Int), None);
        assert_eq!(operator_signature(&TokenKind::AmpAmp, &Type::Int), None);
    }
}
