//! Caret Syntax Tree
//!
//! Defines the arena-allocated syntax tree shared by the parser, the semantic
//! model and the completion core.
//!
//! Every token of the source becomes a leaf node, so the tree can be walked
//! leaf by leaf ("what is the token right before the caret?") as well as
//! structurally ("is the caret inside a return statement?"). Nodes are
//! addressed by [`NodeId`] and never mutated once the tree is finished.

// Re-export common types for use by other crates
pub use caret_lexer::{Span, Token, TokenKind};
pub use smol_str::SmolStr;

use std::fmt::Write as _;
use std::sync::Arc;

mod builder;

pub use builder::{Checkpoint, TreeBuilder};

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// Node Kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// A whole compilation unit
    File,
    Class,
    /// Annotations and modifier keywords in front of a declaration
    Modifiers,
    Annotation,
    /// The parenthesized argument list of an annotation
    AnnotationArgs,
    Field,
    Method,
    ParamList,
    Param,
    TypeRef,
    Block,
    LocalVar,
    ExprStmt,
    ReturnStmt,
    ThrowStmt,
    IfStmt,
    WhileStmt,
    /// A (possibly qualified) name: `a`, `a.b`, `foo().bar`
    RefExpr,
    CallExpr,
    ArgList,
    CastExpr,
    ParenExpr,
    AssignExpr,
    BinaryExpr,
    UnaryExpr,
    NewExpr,
    Literal,
    ThisExpr,
    /// Recovery node wrapping tokens the parser could not place
    Error,
    /// A leaf holding a single token
    Token,
}

impl SyntaxKind {
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::RefExpr
                | SyntaxKind::CallExpr
                | SyntaxKind::CastExpr
                | SyntaxKind::ParenExpr
                | SyntaxKind::AssignExpr
                | SyntaxKind::BinaryExpr
                | SyntaxKind::UnaryExpr
                | SyntaxKind::NewExpr
                | SyntaxKind::Literal
                | SyntaxKind::ThisExpr
        )
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::Block
                | SyntaxKind::LocalVar
                | SyntaxKind::ExprStmt
                | SyntaxKind::ReturnStmt
                | SyntaxKind::ThrowStmt
                | SyntaxKind::IfStmt
                | SyntaxKind::WhileStmt
        )
    }

    /// Variable declarations: fields, parameters and locals
    pub fn is_variable(self) -> bool {
        matches!(self, SyntaxKind::Field | SyntaxKind::Param | SyntaxKind::LocalVar)
    }

    /// Nodes that introduce a named symbol
    pub fn is_declaration(self) -> bool {
        self.is_variable() || matches!(self, SyntaxKind::Class | SyntaxKind::Method)
    }
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Set for `SyntaxKind::Token` leaves only
    pub token: Option<TokenKind>,
}

impl SyntaxNode {
    pub fn is_leaf(&self) -> bool {
        self.kind == SyntaxKind::Token
    }
}

// ============================================================================
// Tree
// ============================================================================

/// An immutable syntax tree over a source text.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: NodeId,
    source: Arc<str>,
    anchor: Option<NodeId>,
}

impl SyntaxTree {
    pub(crate) fn from_parts(nodes: Vec<SyntaxNode>, root: NodeId, source: Arc<str>) -> Self {
        Self {
            nodes,
            root,
            source,
            anchor: None,
        }
    }

    /// Marks this tree as a probe written "at" a node of another tree.
    ///
    /// The anchor is a node id of the *host* tree, not of this one.
    pub fn with_anchor(mut self, anchor: NodeId) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn token(&self, id: NodeId) -> Option<&TokenKind> {
        self.node(id).token.as_ref()
    }

    /// Source text covered by a node
    pub fn text(&self, id: NodeId) -> &str {
        let span = self.span(id);
        self.source.get(span.start..span.end).unwrap_or("")
    }

    /// The node itself followed by all of its ancestors up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Nearest strict ancestor of the given kind
    pub fn find_ancestor(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.ancestors(id).skip(1).find(|&a| self.kind(a) == kind)
    }

    /// Nearest strict ancestor matching a predicate
    pub fn find_ancestor_by(
        &self,
        id: NodeId,
        pred: impl Fn(SyntaxKind) -> bool,
    ) -> Option<NodeId> {
        self.ancestors(id).skip(1).find(|&a| pred(self.kind(a)))
    }

    pub fn is_inside(&self, id: NodeId, kind: SyntaxKind) -> bool {
        self.find_ancestor(id, kind).is_some()
    }

    /// Children that are composite nodes (tokens skipped)
    pub fn child_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| !self.node(c).is_leaf())
    }

    pub fn child_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.children(id).iter().copied().find(|&c| self.kind(c) == kind)
    }

    /// Child token leaf matching a predicate
    pub fn child_token(&self, id: NodeId, pred: impl Fn(&TokenKind) -> bool) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.token(c).is_some_and(|t| pred(t)))
    }

    /// All leaves below a node, in document order
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(id, &mut out);
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if self.node(id).is_leaf() {
            out.push(id);
            return;
        }
        for &child in self.children(id) {
            self.collect_leaves(child, out);
        }
    }

    pub fn first_leaf(&self, id: NodeId) -> Option<NodeId> {
        if self.node(id).is_leaf() {
            return Some(id);
        }
        self.children(id).iter().find_map(|&c| self.first_leaf(c))
    }

    pub fn last_leaf(&self, id: NodeId) -> Option<NodeId> {
        if self.node(id).is_leaf() {
            return Some(id);
        }
        self.children(id).iter().rev().find_map(|&c| self.last_leaf(c))
    }

    /// The leaf immediately before `id` in document order.
    pub fn prev_leaf(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let siblings = self.children(parent);
            let index = siblings.iter().position(|&c| c == current)?;
            if let Some(leaf) = siblings[..index].iter().rev().find_map(|&s| self.last_leaf(s)) {
                return Some(leaf);
            }
            current = parent;
        }
        None
    }

    /// The leaf immediately after `id` in document order.
    pub fn next_leaf(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let siblings = self.children(parent);
            let index = siblings.iter().position(|&c| c == current)?;
            if let Some(leaf) = siblings[index + 1..].iter().find_map(|&s| self.first_leaf(s)) {
                return Some(leaf);
            }
            current = parent;
        }
        None
    }

    /// The leaf containing `offset`, or failing that the leaf ending exactly at it.
    pub fn leaf_at_offset(&self, offset: usize) -> Option<NodeId> {
        let leaves = self.leaves(self.root);
        leaves
            .iter()
            .copied()
            .find(|&l| self.span(l).contains(offset))
            .or_else(|| leaves.iter().copied().rev().find(|&l| self.span(l).end == offset))
    }

    /// Deepest node whose span covers `span`
    pub fn covering_node(&self, span: Span) -> NodeId {
        let mut current = self.root;
        'descend: loop {
            for &child in self.children(current) {
                let child_span = self.span(child);
                if child_span.start <= span.start && span.end <= child_span.end {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    // ========================================================================
    // Structural accessors
    // ========================================================================

    /// Name token of a declaration (class, method, field, parameter, local)
    pub fn decl_name(&self, decl: NodeId) -> Option<NodeId> {
        self.child_token(decl, |t| matches!(t, TokenKind::Ident(_)))
    }

    pub fn decl_name_text(&self, decl: NodeId) -> Option<&str> {
        self.decl_name(decl).map(|n| self.text(n))
    }

    /// Name token of a reference expression (the last identifier)
    pub fn ref_name(&self, reference: NodeId) -> Option<NodeId> {
        self.children(reference)
            .iter()
            .rev()
            .copied()
            .find(|&c| matches!(self.token(c), Some(TokenKind::Ident(_))))
    }

    /// Qualifier of a reference expression: `a` in `a.b`
    pub fn ref_qualifier(&self, reference: NodeId) -> Option<NodeId> {
        if self.kind(reference) != SyntaxKind::RefExpr {
            return None;
        }
        let first = *self.children(reference).first()?;
        self.kind(first).is_expression().then_some(first)
    }

    pub fn call_callee(&self, call: NodeId) -> Option<NodeId> {
        self.child_nodes(call).find(|&c| self.kind(c).is_expression())
    }

    pub fn call_args(&self, call: NodeId) -> Vec<NodeId> {
        self.child_of_kind(call, SyntaxKind::ArgList)
            .map(|args| self.child_nodes(args).collect())
            .unwrap_or_default()
    }

    /// Left and right operands of a binary or assignment expression
    pub fn operands(&self, expr: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let mut exprs = self.child_nodes(expr).filter(|&c| self.kind(c).is_expression());
        (exprs.next(), exprs.next())
    }

    /// Operator token of a binary, unary or assignment expression
    pub fn operator(&self, expr: NodeId) -> Option<&TokenKind> {
        self.children(expr)
            .iter()
            .find_map(|&c| self.token(c).filter(|t| t.fixed_text().is_some()))
    }

    /// Debug dump of the tree structure, one node per line
    pub fn dump(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.dump_into(id, 0, &mut out);
        out
    }

    fn dump_into(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        let indent = "  ".repeat(depth);
        match &node.token {
            Some(token) => {
                let _ = writeln!(out, "{}{} {:?}", indent, token_label(token), self.text(id));
            }
            None => {
                let _ = writeln!(out, "{}{:?}@{}..{}", indent, node.kind, node.span.start, node.span.end);
            }
        }
        for &child in &node.children {
            self.dump_into(child, depth + 1, out);
        }
    }
}

fn token_label(token: &TokenKind) -> &'static str {
    match token {
        TokenKind::Ident(_) => "Ident",
        TokenKind::IntLit(_) | TokenKind::FloatLit(_) => "Number",
        TokenKind::StringLit(_) => "String",
        TokenKind::CharLit(_) => "Char",
        TokenKind::Error => "Error",
        other if other.is_keyword() => "Keyword",
        _ => "Punct",
    }
}

/// Iterator over a node and its ancestors
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tok(kind: TokenKind, start: usize, end: usize) -> Token {
        Token::new(kind, Span::new(start, end))
    }

    /// Hand-built tree for `return (int) x;`
    fn return_cast() -> SyntaxTree {
        let mut b = TreeBuilder::new("return (int) x;");
        b.start_node(SyntaxKind::ReturnStmt);
        b.token(tok(TokenKind::Return, 0, 6));
        b.start_node(SyntaxKind::CastExpr);
        b.token(tok(TokenKind::LParen, 7, 8));
        b.start_node(SyntaxKind::TypeRef);
        b.token(tok(TokenKind::Int, 8, 11));
        b.finish_node();
        b.token(tok(TokenKind::RParen, 11, 12));
        b.start_node(SyntaxKind::RefExpr);
        b.token(tok(TokenKind::Ident("x".into()), 13, 14));
        b.finish_node();
        b.finish_node();
        b.token(tok(TokenKind::Semi, 14, 15));
        b.finish_node();
        b.finish()
    }

    #[test]
    fn test_parents_and_spans() {
        let tree = return_cast();
        let root = tree.root();
        assert_eq!(tree.kind(root), SyntaxKind::ReturnStmt);
        assert_eq!(tree.span(root), Span::new(0, 15));
        let cast = tree.child_of_kind(root, SyntaxKind::CastExpr).unwrap();
        assert_eq!(tree.parent(cast), Some(root));
        assert_eq!(tree.text(cast), "(int) x");
    }

    #[test]
    fn test_prev_and_next_leaf() {
        let tree = return_cast();
        let x = tree.leaf_at_offset(13).unwrap();
        assert_eq!(tree.text(x), "x");
        let before = tree.prev_leaf(x).unwrap();
        assert_eq!(tree.text(before), ")");
        assert_eq!(tree.kind(tree.parent(before).unwrap()), SyntaxKind::CastExpr);
        let after = tree.next_leaf(x).unwrap();
        assert_eq!(tree.text(after), ";");
        let first = tree.first_leaf(tree.root()).unwrap();
        assert_eq!(tree.prev_leaf(first), None);
    }

    #[test]
    fn test_leaf_at_offset_prefers_containing_leaf() {
        let tree = return_cast();
        // offset 14 is the start of `;` but also the end of `x`
        assert_eq!(tree.text(tree.leaf_at_offset(14).unwrap()), ";");
        // offset 15 is past every leaf start; the leaf ending there wins
        assert_eq!(tree.text(tree.leaf_at_offset(15).unwrap()), ";");
    }

    #[test]
    fn test_ancestors_and_find_ancestor() {
        let tree = return_cast();
        let x = tree.leaf_at_offset(13).unwrap();
        let kinds: Vec<_> = tree.ancestors(x).map(|a| tree.kind(a)).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Token,
                SyntaxKind::RefExpr,
                SyntaxKind::CastExpr,
                SyntaxKind::ReturnStmt
            ]
        );
        assert!(tree.is_inside(x, SyntaxKind::ReturnStmt));
        assert!(!tree.is_inside(x, SyntaxKind::ThrowStmt));
    }

    #[test]
    fn test_checkpoint_wraps_already_parsed_children() {
        let mut b = TreeBuilder::new("a + b");
        b.start_node(SyntaxKind::ExprStmt);
        let cp = b.checkpoint();
        b.start_node(SyntaxKind::RefExpr);
        b.token(tok(TokenKind::Ident("a".into()), 0, 1));
        b.finish_node();
        b.start_node_at(cp, SyntaxKind::BinaryExpr);
        b.token(tok(TokenKind::Plus, 2, 3));
        b.start_node(SyntaxKind::RefExpr);
        b.token(tok(TokenKind::Ident("b".into()), 4, 5));
        b.finish_node();
        b.finish_node();
        b.finish_node();
        let tree = b.finish();

        insta::assert_snapshot!(tree.dump(tree.root()).trim_end().replace('\n', " | "), @r#"ExprStmt@0..5 |   BinaryExpr@0..5 |     RefExpr@0..1 |       Ident "a" |     Punct "+" |     RefExpr@4..5 |       Ident "b""#);

        let binary = tree.child_of_kind(tree.root(), SyntaxKind::BinaryExpr).unwrap();
        let (lhs, rhs) = tree.operands(binary);
        assert_eq!(tree.text(lhs.unwrap()), "a");
        assert_eq!(tree.text(rhs.unwrap()), "b");
        assert_eq!(tree.operator(binary), Some(&TokenKind::Plus));
    }

    #[test]
    fn test_covering_node() {
        let tree = return_cast();
        let node = tree.covering_node(Span::new(8, 11));
        assert_eq!(tree.kind(node), SyntaxKind::Token);
        let node = tree.covering_node(Span::new(7, 14));
        assert_eq!(tree.kind(node), SyntaxKind::CastExpr);
    }
}
