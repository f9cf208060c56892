//! Symbols, the symbol table and the built-in library classes.

use crate::types::{Modifiers, Type};
use caret_syntax::{NodeId, Span};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Index of a symbol in its [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Field,
    Method,
    Parameter,
    Local,
}

impl SymbolKind {
    pub fn is_variable(self) -> bool {
        matches!(self, SymbolKind::Field | SymbolKind::Parameter | SymbolKind::Local)
    }
}

/// A category of symbols that filters and inspections test against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolClass {
    Method,
    /// Fields, parameters and locals
    Variable,
    Field,
    Class,
}

impl SymbolClass {
    pub fn matches(self, kind: SymbolKind) -> bool {
        match self {
            SymbolClass::Method => kind == SymbolKind::Method,
            SymbolClass::Variable => kind.is_variable(),
            SymbolClass::Field => kind == SymbolKind::Field,
            SymbolClass::Class => kind == SymbolKind::Class,
        }
    }
}

/// Where a symbol is declared in source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    pub node: NodeId,
    pub name_span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub modifiers: Modifiers,
    /// Value type for variables, return type for methods, the class itself for classes
    pub ty: Type,
    /// Parameter types, methods only
    pub params: Vec<Type>,
    /// Enclosing class for members, enclosing method for parameters and locals
    pub owner: Option<SymbolId>,
    /// `None` for built-in library symbols
    pub decl: Option<Declaration>,
}

impl Symbol {
    pub fn new(name: impl Into<SmolStr>, kind: SymbolKind, ty: Type) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: Modifiers::NONE,
            ty,
            params: Vec::new(),
            owner: None,
            decl: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_params(mut self, params: Vec<Type>) -> Self {
        self.params = params;
        self
    }

    pub fn with_owner(mut self, owner: SymbolId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_decl(mut self, decl: Declaration) -> Self {
        self.decl = Some(decl);
        self
    }

    pub fn is_builtin(&self) -> bool {
        self.decl.is_none()
    }
}

/// All symbols of one analysed file, built-ins first.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    classes: IndexMap<SmolStr, SymbolId>,
    members: FxHashMap<SymbolId, Vec<SymbolId>>,
    builtin_count: usize,
}

impl SymbolTable {
    /// A table holding only the built-in library classes.
    ///
    /// Built-ins are always created in the same order, so their ids agree
    /// between any two tables.
    pub fn with_builtins() -> Self {
        let mut table = Self {
            symbols: Vec::new(),
            classes: IndexMap::new(),
            members: FxHashMap::default(),
            builtin_count: 0,
        };
        table.add_builtins();
        table.builtin_count = table.symbols.len();
        table
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        match symbol.kind {
            SymbolKind::Class => {
                self.classes.insert(symbol.name.clone(), id);
            }
            SymbolKind::Field | SymbolKind::Method => {
                if let Some(owner) = symbol.owner {
                    self.members.entry(owner).or_default().push(id);
                }
            }
            SymbolKind::Parameter | SymbolKind::Local => {}
        }
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_builtin(&self, id: SymbolId) -> bool {
        id.index() < self.builtin_count
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    pub fn class_named(&self, name: &str) -> Option<SymbolId> {
        self.classes.get(name).copied()
    }

    pub fn classes(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.classes.values().copied()
    }

    /// Members declared directly by a class
    pub fn declared_members(&self, class: SymbolId) -> &[SymbolId] {
        self.members.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Members of a class including those inherited from `Object`
    pub fn members_of_class(&self, class: SymbolId) -> Vec<SymbolId> {
        let mut members = self.declared_members(class).to_vec();
        if let Some(object) = self.class_named("Object") {
            if object != class {
                for &inherited in self.declared_members(object) {
                    let name = &self.get(inherited).name;
                    let overridden = members.iter().any(|&m| {
                        let m = self.get(m);
                        m.name == *name && m.kind == self.get(inherited).kind
                    });
                    if !overridden {
                        members.push(inherited);
                    }
                }
            }
        }
        members
    }

    /// Members reachable through a value of the given type
    pub fn members_of(&self, ty: &Type) -> Vec<SymbolId> {
        match ty {
            Type::Class(name) => self
                .class_named(name)
                .map(|class| self.members_of_class(class))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    // ========================================================================
    // Built-in library
    // ========================================================================

    fn add_builtins(&mut self) {
        let object = self.builtin_class("Object");
        self.builtin_method(object, "toString", Type::class("String"), vec![]);
        self.builtin_method(object, "hashCode", Type::Int, vec![]);
        self.builtin_method(object, "equals", Type::Boolean, vec![Type::class("Object")]);

        let string = self.builtin_class("String");
        self.builtin_method(string, "length", Type::Int, vec![]);
        self.builtin_method(string, "isEmpty", Type::Boolean, vec![]);
        self.builtin_method(string, "trim", Type::class("String"), vec![]);
        self.builtin_method(string, "charAt", Type::Char, vec![Type::Int]);
        self.builtin_method(string, "concat", Type::class("String"), vec![Type::class("String")]);

        let list = self.builtin_class("List");
        self.builtin_method(list, "size", Type::Int, vec![]);
        self.builtin_method(list, "isEmpty", Type::Boolean, vec![]);
        self.builtin_method(list, "get", Type::class("Object"), vec![Type::Int]);
        self.builtin_method(list, "add", Type::Boolean, vec![Type::class("Object")]);
        self.builtin_method(list, "clear", Type::Void, vec![]);

        let exception = self.builtin_class("Exception");
        self.builtin_method(exception, "getMessage", Type::class("String"), vec![]);
        self.builtin_method(exception, "printStackTrace", Type::Void, vec![]);

        let integer = self.builtin_class("Integer");
        self.builtin_method(integer, "intValue", Type::Int, vec![]);
        let constant = Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL;
        for name in ["MAX_VALUE", "MIN_VALUE"] {
            self.add(
                Symbol::new(name, SymbolKind::Field, Type::Int)
                    .with_modifiers(constant)
                    .with_owner(integer),
            );
        }
    }

    fn builtin_class(&mut self, name: &str) -> SymbolId {
        self.add(
            Symbol::new(name, SymbolKind::Class, Type::class(name)).with_modifiers(Modifiers::PUBLIC),
        )
    }

    fn builtin_method(&mut self, class: SymbolId, name: &str, ret: Type, params: Vec<Type>) {
        self.add(
            Symbol::new(name, SymbolKind::Method, ret)
                .with_modifiers(Modifiers::PUBLIC)
                .with_params(params)
                .with_owner(class),
        );
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}
