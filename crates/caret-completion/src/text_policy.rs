//! How a symbol is written when it appears in a qualified access.

use crate::candidate::CandidateIcon;
use caret_semantics::{Symbol, SymbolKind};

/// Text standing for `symbol` in `qualifier.<text>` or `<text>.member`.
///
/// Methods qualify only when they take no arguments and return a value.
pub fn text_for(symbol: &Symbol) -> Option<String> {
    match symbol.kind {
        SymbolKind::Method => {
            if symbol.ty.is_void_or_null() || !symbol.params.is_empty() {
                None
            } else {
                Some(format!("{}()", symbol.name))
            }
        }
        kind if kind.is_variable() => Some(symbol.name.to_string()),
        _ => None,
    }
}

pub fn icon_for(symbol: &Symbol) -> CandidateIcon {
    if symbol.kind.is_variable() {
        CandidateIcon::Variable
    } else {
        CandidateIcon::Method
    }
}
