//! Scope analysis, name resolution and expression typing over a syntax tree.

use crate::symbols::{Declaration, Symbol, SymbolId, SymbolKind, SymbolTable};
use crate::types::{Modifiers, Type};
use caret_syntax::{NodeId, SyntaxKind, SyntaxTree, TokenKind};
use rustc_hash::{FxHashMap, FxHashSet};

/// A reference expression and its parts, all in the same tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolReference {
    /// The `RefExpr` node
    pub element: NodeId,
    pub qualifier: Option<NodeId>,
    /// The identifier leaf being referenced
    pub name: NodeId,
}

/// A reference together with the tree that holds it.
///
/// The tree is either the model's own tree or a probe parsed "at" one of its
/// nodes (see [`SyntaxTree::anchor`]); in the latter case unqualified names
/// are looked up in the anchor's scope.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceSite<'t> {
    pub tree: &'t SyntaxTree,
    pub reference: SymbolReference,
}

/// How a candidate was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateOrigin {
    /// Visible by scope at the reference
    Scope,
    /// Member of the qualifier's type
    Member,
}

/// An element produced by resolution.
///
/// Completion variants come back wrapped as `Candidate`; filters that test the
/// declaration itself need to look through the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedElement {
    Declaration(SymbolId),
    Candidate {
        symbol: SymbolId,
        origin: CandidateOrigin,
    },
}

impl ResolvedElement {
    pub fn symbol(&self) -> SymbolId {
        match *self {
            ResolvedElement::Declaration(symbol) | ResolvedElement::Candidate { symbol, .. } => {
                symbol
            }
        }
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, ResolvedElement::Candidate { .. })
    }

    /// The underlying declaration with any wrapper removed
    pub fn unwrap_declaration(&self) -> ResolvedElement {
        ResolvedElement::Declaration(self.symbol())
    }
}

/// Semantic information for one parsed file.
#[derive(Debug, Clone)]
pub struct SemanticModel {
    tree: SyntaxTree,
    table: SymbolTable,
    /// Declaration node -> declared symbol
    declarations: FxHashMap<NodeId, SymbolId>,
    /// Name offset -> declared symbol
    by_offset: FxHashMap<usize, SymbolId>,
    locals: FxHashMap<NodeId, Vec<SymbolId>>,
    params: FxHashMap<NodeId, Vec<SymbolId>>,
    top_level: Vec<SymbolId>,
}

impl SemanticModel {
    /// Collect every declaration of the tree.
    pub fn build(tree: SyntaxTree) -> Self {
        let mut collector = DeclarationCollector::new(&tree);
        collector.collect(tree.root(), None, None);
        let DeclarationCollector {
            table,
            declarations,
            by_offset,
            locals,
            params,
            top_level,
            ..
        } = collector;
        Self {
            tree,
            table,
            declarations,
            by_offset,
            locals,
            params,
            top_level,
        }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.table.get(id)
    }

    /// Symbol declared by a declaration node
    pub fn declaration_at(&self, node: NodeId) -> Option<SymbolId> {
        self.declarations.get(&node).copied()
    }

    /// Parameter symbols of a method declared in this file, in order
    pub fn parameters_of(&self, method: SymbolId) -> &[SymbolId] {
        self.symbol(method)
            .decl
            .and_then(|decl| self.params.get(&decl.node))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Symbol whose name starts at `offset`
    pub fn symbol_declared_at(&self, offset: usize) -> Option<SymbolId> {
        self.by_offset.get(&offset).copied()
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    /// Symbols visible by scope at a node of the model's tree, innermost first.
    ///
    /// A name hides outer declarations of the same name and namespace
    /// (methods and variables/classes are looked up separately).
    pub fn visible_symbols(&self, node: NodeId) -> Vec<SymbolId> {
        let tree = &self.tree;
        let offset = tree.span(node).start;
        let mut seen: FxHashSet<(smol_str::SmolStr, bool)> = FxHashSet::default();
        let mut out = Vec::new();
        let mut push = |id: SymbolId, out: &mut Vec<SymbolId>| {
            let symbol = self.table.get(id);
            if seen.insert((symbol.name.clone(), symbol.kind == SymbolKind::Method)) {
                out.push(id);
            }
        };

        for ancestor in tree.ancestors(node) {
            match tree.kind(ancestor) {
                SyntaxKind::Block => {
                    if let Some(locals) = self.locals.get(&ancestor) {
                        for &id in locals.iter().rev() {
                            let declared = self
                                .table
                                .get(id)
                                .decl
                                .map(|d| tree.span(d.node).start)
                                .unwrap_or(0);
                            if declared <= offset {
                                push(id, &mut out);
                            }
                        }
                    }
                }
                SyntaxKind::Method => {
                    if let Some(params) = self.params.get(&ancestor) {
                        for &id in params {
                            push(id, &mut out);
                        }
                    }
                }
                SyntaxKind::Class => {
                    if let Some(class) = self.declaration_at(ancestor) {
                        for id in self.table.members_of_class(class) {
                            push(id, &mut out);
                        }
                    }
                }
                _ => {}
            }
        }
        for &id in &self.top_level {
            if self.table.get(id).kind != SymbolKind::Class {
                push(id, &mut out);
            }
        }
        for id in self.table.classes() {
            push(id, &mut out);
        }
        out
    }

    /// Class declaration enclosing a node, if any
    pub fn enclosing_class(&self, node: NodeId) -> Option<SymbolId> {
        self.tree
            .ancestors(node)
            .find(|&a| self.tree.kind(a) == SyntaxKind::Class)
            .and_then(|class| self.declaration_at(class))
    }

    // ========================================================================
    // References
    // ========================================================================

    /// The reference whose name covers `offset` in the given tree.
    pub fn find_reference_at(tree: &SyntaxTree, offset: usize) -> Option<SymbolReference> {
        let leaf = tree.leaf_at_offset(offset)?;
        Self::reference_of_leaf(tree, leaf)
    }

    /// The reference named by an identifier leaf
    pub fn reference_of_leaf(tree: &SyntaxTree, leaf: NodeId) -> Option<SymbolReference> {
        if !matches!(tree.token(leaf), Some(TokenKind::Ident(_))) {
            return None;
        }
        let element = tree.parent(leaf)?;
        if tree.kind(element) != SyntaxKind::RefExpr || tree.ref_name(element) != Some(leaf) {
            return None;
        }
        Some(SymbolReference {
            element,
            qualifier: tree.ref_qualifier(element),
            name: leaf,
        })
    }

    /// The reference held by a `RefExpr` node
    pub fn reference_of(tree: &SyntaxTree, element: NodeId) -> Option<SymbolReference> {
        if tree.kind(element) != SyntaxKind::RefExpr {
            return None;
        }
        let name = tree.ref_name(element)?;
        Some(SymbolReference {
            element,
            qualifier: tree.ref_qualifier(element),
            name,
        })
    }

    /// Node of the model's tree whose scope governs `node` of `tree`
    fn scope_node(&self, tree: &SyntaxTree, node: NodeId) -> NodeId {
        tree.anchor().unwrap_or(node)
    }

    /// Every symbol the reference could name, ignoring the name typed so far.
    pub fn variants(&self, site: ReferenceSite<'_>) -> Vec<ResolvedElement> {
        let ReferenceSite { tree, reference } = site;
        match reference.qualifier {
            Some(qualifier) => self
                .qualifier_members(tree, qualifier)
                .into_iter()
                .map(|symbol| ResolvedElement::Candidate {
                    symbol,
                    origin: CandidateOrigin::Member,
                })
                .collect(),
            None => self
                .visible_symbols(self.scope_node(tree, reference.element))
                .into_iter()
                .map(|symbol| ResolvedElement::Candidate {
                    symbol,
                    origin: CandidateOrigin::Scope,
                })
                .collect(),
        }
    }

    fn qualifier_members(&self, tree: &SyntaxTree, qualifier: NodeId) -> Vec<SymbolId> {
        // `Integer.MAX_VALUE`: a class name qualifies its own members
        if tree.kind(qualifier) == SyntaxKind::RefExpr {
            if let Some(reference) = Self::reference_of(tree, qualifier) {
                if let Some(id) = self.resolve(ReferenceSite { tree, reference }) {
                    if self.table.get(id).kind == SymbolKind::Class {
                        return self.table.members_of_class(id);
                    }
                }
            }
        }
        self.table.members_of(&self.type_of(tree, qualifier))
    }

    /// Resolve a reference to the symbol it names.
    pub fn resolve(&self, site: ReferenceSite<'_>) -> Option<SymbolId> {
        let ReferenceSite { tree, reference } = site;
        let name = tree.text(reference.name);
        let wants_method = tree
            .parent(reference.element)
            .filter(|&p| tree.kind(p) == SyntaxKind::CallExpr)
            .and_then(|call| tree.call_callee(call))
            == Some(reference.element);

        let candidates = match reference.qualifier {
            Some(qualifier) => self.qualifier_members(tree, qualifier),
            None => self.visible_symbols(self.scope_node(tree, reference.element)),
        };
        // methods and values live in separate namespaces
        candidates.into_iter().find(|&id| {
            let symbol = self.table.get(id);
            symbol.name == name && (symbol.kind == SymbolKind::Method) == wants_method
        })
    }

    /// Method a call expression invokes
    pub fn resolve_call(&self, tree: &SyntaxTree, call: NodeId) -> Option<SymbolId> {
        let callee = tree.call_callee(call)?;
        let reference = Self::reference_of(tree, callee)?;
        self.resolve(ReferenceSite { tree, reference })
            .filter(|&id| self.table.get(id).kind == SymbolKind::Method)
    }

    // ========================================================================
    // Expression typing
    // ========================================================================

    /// Static type of an expression in `tree` (the model's tree or a probe)
    pub fn type_of(&self, tree: &SyntaxTree, expr: NodeId) -> Type {
        match tree.kind(expr) {
            SyntaxKind::Literal => match tree.children(expr).first().and_then(|&t| tree.token(t)) {
                Some(TokenKind::IntLit(text)) if text.ends_with(['l', 'L']) => Type::Long,
                Some(TokenKind::IntLit(_)) => Type::Int,
                Some(TokenKind::FloatLit(_)) => Type::Double,
                Some(TokenKind::StringLit(_)) => Type::class("String"),
                Some(TokenKind::CharLit(_)) => Type::Char,
                Some(TokenKind::True | TokenKind::False) => Type::Boolean,
                Some(TokenKind::Null) => Type::Null,
                _ => Type::Unknown,
            },
            SyntaxKind::RefExpr => Self::reference_of(tree, expr)
                .and_then(|reference| self.resolve(ReferenceSite { tree, reference }))
                .map(|id| self.table.get(id).ty.clone())
                .unwrap_or(Type::Unknown),
            SyntaxKind::CallExpr => self
                .resolve_call(tree, expr)
                .map(|id| self.table.get(id).ty.clone())
                .unwrap_or(Type::Unknown),
            SyntaxKind::ThisExpr => self
                .enclosing_class(self.scope_node(tree, expr))
                .map(|id| self.table.get(id).ty.clone())
                .unwrap_or(Type::Unknown),
            SyntaxKind::NewExpr | SyntaxKind::CastExpr => tree
                .child_of_kind(expr, SyntaxKind::TypeRef)
                .map(|ty| type_from_ref(tree, ty))
                .unwrap_or(Type::Unknown),
            SyntaxKind::ParenExpr => tree
                .child_nodes(expr)
                .next()
                .map(|inner| self.type_of(tree, inner))
                .unwrap_or(Type::Unknown),
            SyntaxKind::AssignExpr => match tree.operands(expr) {
                (Some(lhs), _) => self.type_of(tree, lhs),
                _ => Type::Unknown,
            },
            SyntaxKind::UnaryExpr => match (tree.operator(expr), tree.operands(expr).0) {
                (Some(TokenKind::Bang), _) => Type::Boolean,
                (_, Some(operand)) => self.type_of(tree, operand),
                _ => Type::Unknown,
            },
            SyntaxKind::BinaryExpr => self.binary_type(tree, expr),
            _ => Type::Unknown,
        }
    }

    fn binary_type(&self, tree: &SyntaxTree, expr: NodeId) -> Type {
        let (Some(lhs), Some(rhs)) = tree.operands(expr) else {
            return Type::Unknown;
        };
        match tree.operator(expr) {
            Some(
                TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::LtEq
                | TokenKind::GtEq
                | TokenKind::AmpAmp
                | TokenKind::PipePipe,
            ) => Type::Boolean,
            Some(op) => {
                let (left, right) = (self.type_of(tree, lhs), self.type_of(tree, rhs));
                if *op == TokenKind::Plus && (left.is_string() || right.is_string()) {
                    Type::class("String")
                } else {
                    left.widen(&right).unwrap_or(Type::Unknown)
                }
            }
            None => Type::Unknown,
        }
    }
}

fn modifiers(tree: &SyntaxTree, decl: NodeId) -> Modifiers {
    let mut result = Modifiers::NONE;
    if let Some(node) = tree.child_of_kind(decl, SyntaxKind::Modifiers) {
        for &child in tree.children(node) {
            if let Some(modifier) = tree.token(child).and_then(Modifiers::from_keyword) {
                result.insert(modifier);
            }
        }
    }
    result
}

fn declared_type(tree: &SyntaxTree, decl: NodeId) -> Type {
    tree.child_of_kind(decl, SyntaxKind::TypeRef)
        .map(|ty| type_from_ref(tree, ty))
        .unwrap_or(Type::Unknown)
}

// ============================================================================
// Declaration collection
// ============================================================================

/// Gathers the declarations of a tree before the model takes ownership of it.
struct DeclarationCollector<'t> {
    tree: &'t SyntaxTree,
    table: SymbolTable,
    declarations: FxHashMap<NodeId, SymbolId>,
    by_offset: FxHashMap<usize, SymbolId>,
    locals: FxHashMap<NodeId, Vec<SymbolId>>,
    params: FxHashMap<NodeId, Vec<SymbolId>>,
    top_level: Vec<SymbolId>,
}

impl<'t> DeclarationCollector<'t> {
    fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            tree,
            table: SymbolTable::with_builtins(),
            declarations: FxHashMap::default(),
            by_offset: FxHashMap::default(),
            locals: FxHashMap::default(),
            params: FxHashMap::default(),
            top_level: Vec::new(),
        }
    }

    fn collect(&mut self, node: NodeId, class: Option<SymbolId>, method: Option<SymbolId>) {
        let tree = self.tree;
        match tree.kind(node) {
            SyntaxKind::Class => {
                let Some(name) = tree.decl_name_text(node) else {
                    return;
                };
                let mut symbol = Symbol::new(name, SymbolKind::Class, Type::class(name))
                    .with_modifiers(modifiers(tree, node));
                if let Some(outer) = class {
                    symbol = symbol.with_owner(outer);
                }
                let id = self.declare(node, symbol);
                if class.is_none() {
                    self.top_level.push(id);
                }
                for child in tree.child_nodes(node) {
                    self.collect(child, Some(id), None);
                }
            }
            SyntaxKind::Method => {
                let Some(name) = tree.decl_name_text(node) else {
                    return;
                };
                let param_nodes: Vec<NodeId> = tree
                    .child_of_kind(node, SyntaxKind::ParamList)
                    .map(|list| tree.child_nodes(list).collect())
                    .unwrap_or_default();
                let param_types = param_nodes.iter().map(|&p| declared_type(tree, p)).collect();
                let mut symbol = Symbol::new(name, SymbolKind::Method, declared_type(tree, node))
                    .with_modifiers(modifiers(tree, node))
                    .with_params(param_types);
                if let Some(owner) = class {
                    symbol = symbol.with_owner(owner);
                }
                let id = self.declare(node, symbol);
                if class.is_none() {
                    self.top_level.push(id);
                }
                let mut params = Vec::new();
                for param in param_nodes {
                    if let Some(name) = tree.decl_name_text(param) {
                        let symbol =
                            Symbol::new(name, SymbolKind::Parameter, declared_type(tree, param))
                                .with_modifiers(modifiers(tree, param))
                                .with_owner(id);
                        params.push(self.declare(param, symbol));
                    }
                }
                self.params.insert(node, params);
                if let Some(body) = tree.child_of_kind(node, SyntaxKind::Block) {
                    self.collect(body, class, Some(id));
                }
            }
            SyntaxKind::Field => {
                let Some(name) = tree.decl_name_text(node) else {
                    return;
                };
                let mut symbol = Symbol::new(name, SymbolKind::Field, declared_type(tree, node))
                    .with_modifiers(modifiers(tree, node));
                if let Some(owner) = class {
                    symbol = symbol.with_owner(owner);
                }
                let id = self.declare(node, symbol);
                if class.is_none() {
                    self.top_level.push(id);
                }
            }
            SyntaxKind::LocalVar => {
                if let Some(name) = tree.decl_name_text(node) {
                    let mut symbol = Symbol::new(name, SymbolKind::Local, declared_type(tree, node))
                        .with_modifiers(modifiers(tree, node));
                    if let Some(owner) = method {
                        symbol = symbol.with_owner(owner);
                    }
                    let id = self.declare(node, symbol);
                    if let Some(block) = tree.parent(node) {
                        self.locals.entry(block).or_default().push(id);
                    }
                }
            }
            _ => {
                for child in tree.child_nodes(node) {
                    self.collect(child, class, method);
                }
            }
        }
    }

    fn declare(&mut self, node: NodeId, symbol: Symbol) -> SymbolId {
        let tree = self.tree;
        let name_span = tree
            .decl_name(node)
            .map(|n| tree.span(n))
            .unwrap_or_else(|| tree.span(node));
        let id = self.table.add(symbol.with_decl(Declaration { node, name_span }));
        self.declarations.insert(node, id);
        self.by_offset.insert(name_span.start, id);
        id
    }
}

/// Type named by a `TypeRef` node; qualified names use their last segment
pub fn type_from_ref(tree: &SyntaxTree, type_ref: NodeId) -> Type {
    let tokens: Vec<&TokenKind> = tree
        .children(type_ref)
        .iter()
        .filter_map(|&c| tree.token(c))
        .collect();
    match tokens.first() {
        Some(first) => match Type::from_keyword(first) {
            Some(ty) => ty,
            None => tokens
                .iter()
                .rev()
                .find_map(|t| t.ident())
                .map(|name| Type::Class(name.clone()))
                .unwrap_or(Type::Unknown),
        },
        None => Type::Unknown,
    }
}
