//! The completion-time copy of a file.
//!
//! Completion runs on code that is being typed, where the caret often sits
//! on nothing at all (`throw █`). The copy inserts a placeholder identifier
//! at the caret so the position always holds a reference expression, then
//! re-parses and analyses the copy. Candidates found in the copy are mapped
//! back to the original file's symbols before they leave this crate.

use crate::document::DocumentError;
use crate::host::PrefixMatcher;
use caret_parser::parse_file;
use caret_semantics::{SemanticModel, Symbol, SymbolId};
use caret_syntax::{NodeId, SyntaxTree, TokenKind};
use tracing::trace;

/// A copy of the original file with the placeholder inserted at the caret.
#[derive(Debug)]
pub struct CompletionFile<'a> {
    original: &'a SemanticModel,
    copy: SemanticModel,
    offset: usize,
    placeholder_len: usize,
    caret: NodeId,
}

impl<'a> CompletionFile<'a> {
    /// Build the copy for a caret at `offset` of the original file.
    pub fn prepare(
        original: &'a SemanticModel,
        offset: usize,
        placeholder: &str,
    ) -> Result<Self, DocumentError> {
        let text = original.tree().source();
        if offset > text.len() || !text.is_char_boundary(offset) {
            return Err(DocumentError::OffsetOutOfRange {
                offset,
                len: text.len(),
            });
        }
        let mut copy_text = String::with_capacity(text.len() + placeholder.len());
        copy_text.push_str(&text[..offset]);
        copy_text.push_str(placeholder);
        copy_text.push_str(&text[offset..]);

        let parsed = parse_file(&copy_text);
        trace!(errors = parsed.errors.len(), "parsed completion copy");
        let copy = SemanticModel::build(parsed.tree);
        let caret = copy
            .tree()
            .leaf_at_offset(offset)
            .unwrap_or_else(|| copy.tree().root());
        Ok(Self {
            original,
            copy,
            offset,
            placeholder_len: placeholder.len(),
            caret,
        })
    }

    pub fn original(&self) -> &'a SemanticModel {
        self.original
    }

    /// Analysis of the copy
    pub fn model(&self) -> &SemanticModel {
        &self.copy
    }

    pub fn tree(&self) -> &SyntaxTree {
        self.copy.tree()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The leaf of the copy holding the caret
    pub fn caret(&self) -> NodeId {
        self.caret
    }

    /// Identifier text typed before the caret
    pub fn prefix(&self) -> &str {
        let tree = self.copy.tree();
        if !matches!(tree.token(self.caret), Some(TokenKind::Ident(_))) {
            return "";
        }
        let start = tree.span(self.caret).start;
        tree.source().get(start..self.offset).unwrap_or("")
    }

    pub fn prefix_matcher(&self) -> PrefixMatcher {
        PrefixMatcher::new(self.prefix())
    }

    /// Symbol of the original file that a symbol of the copy stands for.
    ///
    /// Built-in symbols share ids between the two tables. File declarations
    /// are matched by the position of their name; a declaration whose name
    /// contains the placeholder exists only in the copy and maps to `None`.
    pub fn to_original_symbol(&self, id: SymbolId) -> Option<SymbolId> {
        let symbol = self.copy.symbol(id);
        let Some(decl) = symbol.decl else {
            return Some(id);
        };
        let name = decl.name_span;
        let original_start = if name.end <= self.offset {
            name.start
        } else if name.start >= self.offset + self.placeholder_len {
            name.start - self.placeholder_len
        } else {
            return None;
        };
        let original = self.original.symbol_declared_at(original_start)?;
        let found = self.original.symbol(original);
        (found.name == symbol.name && found.kind == symbol.kind).then_some(original)
    }

    /// Declaration data of an original-file symbol
    pub fn original_symbol(&self, id: SymbolId) -> &'a Symbol {
        self.original.symbol(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caret_semantics::SymbolKind;

    const PLACEHOLDER: &str = "Placeholder";

    fn original(source: &str) -> SemanticModel {
        SemanticModel::build(parse_file(source).tree)
    }

    #[test]
    fn test_placeholder_becomes_caret_leaf() {
        let source = "class A { void m() { throw  } }";
        let model = original(source);
        let offset = source.find("throw ").unwrap() + "throw ".len();
        let file = CompletionFile::prepare(&model, offset, PLACEHOLDER).unwrap();
        assert_eq!(file.tree().text(file.caret()), PLACEHOLDER);
        assert_eq!(file.prefix(), "");
        assert!(file.tree().source().contains("throw Placeholder"));
    }

    #[test]
    fn test_prefix_is_text_before_caret() {
        let source = "class A { int count; void m() { co } }";
        let model = original(source);
        let offset = source.find("co }").unwrap() + 2;
        let file = CompletionFile::prepare(&model, offset, PLACEHOLDER).unwrap();
        assert_eq!(file.tree().text(file.caret()), "coPlaceholder");
        assert_eq!(file.prefix(), "co");
        assert!(file.prefix_matcher().matches("count"));
        assert!(!file.prefix_matcher().matches("m"));
    }

    #[test]
    fn test_symbols_map_back_to_original() {
        let source = "class A { int before; void m() {  } int after; }";
        let model = original(source);
        let offset = source.find("{  }").unwrap() + 2;
        let file = CompletionFile::prepare(&model, offset, PLACEHOLDER).unwrap();

        for name in ["before", "after", "m", "A"] {
            let (copy_id, _) = file
                .model()
                .table()
                .iter()
                .find(|(_, s)| s.name == name && !s.is_builtin())
                .unwrap();
            let mapped = file.to_original_symbol(copy_id).unwrap();
            assert_eq!(model.symbol(mapped).name, name);
        }

        let list = file.model().table().class_named("List").unwrap();
        assert_eq!(file.to_original_symbol(list), model.table().class_named("List"));
    }

    #[test]
    fn test_placeholder_declaration_is_dropped() {
        // typing the name of a new local: `int █`
        let source = "class A { void m() { int  } }";
        let model = original(source);
        let offset = source.find("int ").unwrap() + 4;
        let file = CompletionFile::prepare(&model, offset, PLACEHOLDER).unwrap();
        let (local, symbol) = file
            .model()
            .table()
            .iter()
            .find(|(_, s)| s.kind == SymbolKind::Local)
            .unwrap();
        assert_eq!(symbol.name, PLACEHOLDER);
        assert_eq!(file.to_original_symbol(local), None);
    }

    #[test]
    fn test_offset_out_of_range() {
        let model = original("class A {}");
        let err = CompletionFile::prepare(&model, 99, PLACEHOLDER).unwrap_err();
        assert!(matches!(err, DocumentError::OffsetOutOfRange { offset: 99, .. }));
    }
}
