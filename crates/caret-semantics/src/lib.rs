//! Caret Semantic Analysis
//!
//! Declarations, scopes, name resolution and expression typing for the
//! Java-style source subset.
//!
//! ## Architecture
//!
//! ```text
//! SyntaxTree ──► SemanticModel::build ──► SymbolTable (built-ins first)
//!                      │
//!                      ├── visible_symbols(node)      scope walk, innermost first
//!                      ├── variants(site)             every name a reference could take
//!                      ├── resolve(site)              the one symbol a reference names
//!                      └── type_of(tree, expr)        static expression types
//! ```
//!
//! A [`ReferenceSite`] may point into a *probe* tree, a small expression parsed
//! as if written at an anchor node of the model's tree. Names in a probe are
//! looked up in the anchor's scope, which is how speculative completions such
//! as `items.xxx` are resolved without touching the real tree.

mod model;
mod symbols;
mod types;

pub use model::{
    type_from_ref, CandidateOrigin, ReferenceSite, ResolvedElement, SemanticModel,
    SymbolReference,
};
pub use symbols::{Declaration, Symbol, SymbolClass, SymbolId, SymbolKind, SymbolTable};
pub use types::{Modifiers, Type};
