//! Document storage and read snapshots.
//!
//! # Architecture
//!
//! ```text
//! SharedDocument ── Arc<RwLock<DocumentState>>
//!        │                 ├── SourceDocument   rope text + version
//!        │                 └── SemanticModel    analysis of the current text
//!        │
//!        ├── snapshot() ──► Snapshot   read guard, one per completion request
//!        └── edit()     ──► write guard, text changed and re-analysed
//! ```
//!
//! A completion request holds a [`Snapshot`] from start to finish, so an
//! edit can never interleave with it. The snapshot is released when dropped.

use caret_parser::parse_file;
use caret_semantics::SemanticModel;
use parking_lot::{RwLock, RwLockReadGuard};
use ropey::Rope;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised by document operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("position {position} is outside the document ({lines} lines)")]
    PositionOutOfRange { position: Position, lines: usize },

    #[error("offset {offset} is outside the document or not on a character boundary (length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("range start {start} is after its end {end}")]
    InvertedRange { start: Position, end: Position },
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// A zero-based line and character position.
///
/// `character` counts Unicode scalar values within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// A replacement of a range of text, or of the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub range: Option<(Position, Position)>,
    pub text: String,
}

impl TextChange {
    pub fn replace(start: Position, end: Position, text: impl Into<String>) -> Self {
        Self {
            range: Some((start, end)),
            text: text.into(),
        }
    }

    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }

    pub fn full(text: impl Into<String>) -> Self {
        Self {
            range: None,
            text: text.into(),
        }
    }
}

/// Document text with its version.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    content: Rope,
    version: i32,
}

impl SourceDocument {
    pub fn new(text: &str, version: i32) -> Self {
        Self {
            content: Rope::from_str(text),
            version,
        }
    }

    pub fn text(&self) -> String {
        self.content.to_string()
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn line_count(&self) -> usize {
        self.content.len_lines()
    }

    /// Byte offset of a position; characters past the line end clamp to it.
    pub fn position_to_offset(&self, position: Position) -> DocumentResult<usize> {
        let line_idx = position.line as usize;
        if line_idx >= self.content.len_lines() {
            return Err(DocumentError::PositionOutOfRange {
                position,
                lines: self.content.len_lines(),
            });
        }
        let line_start = self.content.line_to_char(line_idx);
        let line = self.content.line(line_idx);
        // the line terminator is not addressable
        let line_len = line.len_chars() - trailing_newline(&line);
        let char_offset = (position.character as usize).min(line_len);
        Ok(self.content.char_to_byte(line_start + char_offset))
    }

    pub fn offset_to_position(&self, offset: usize) -> DocumentResult<Position> {
        if offset > self.content.len_bytes() {
            return Err(DocumentError::OffsetOutOfRange {
                offset,
                len: self.content.len_bytes(),
            });
        }
        let char_idx = self.content.byte_to_char(offset);
        if self.content.char_to_byte(char_idx) != offset {
            return Err(DocumentError::OffsetOutOfRange {
                offset,
                len: self.content.len_bytes(),
            });
        }
        let line_idx = self.content.char_to_line(char_idx);
        let character = char_idx - self.content.line_to_char(line_idx);
        Ok(Position::new(line_idx as u32, character as u32))
    }

    pub fn apply_change(&mut self, change: &TextChange) -> DocumentResult<()> {
        match change.range {
            Some((start, end)) => {
                if start > end {
                    return Err(DocumentError::InvertedRange { start, end });
                }
                let start_char = self.content.byte_to_char(self.position_to_offset(start)?);
                let end_char = self.content.byte_to_char(self.position_to_offset(end)?);
                self.content.remove(start_char..end_char);
                self.content.insert(start_char, &change.text);
            }
            None => self.content = Rope::from_str(&change.text),
        }
        Ok(())
    }
}

fn trailing_newline(line: &ropey::RopeSlice<'_>) -> usize {
    let len = line.len_chars();
    match (len.checked_sub(2).map(|i| line.char(i)), len.checked_sub(1).map(|i| line.char(i))) {
        (Some('\r'), Some('\n')) => 2,
        (_, Some('\n')) => 1,
        _ => 0,
    }
}

/// A document together with the analysis of its current text.
#[derive(Debug)]
pub struct DocumentState {
    document: SourceDocument,
    model: SemanticModel,
    parse_errors: usize,
}

impl DocumentState {
    fn analyse(document: SourceDocument) -> Self {
        let parsed = parse_file(&document.text());
        let parse_errors = parsed.errors.len();
        debug!(version = document.version(), parse_errors, "document analysed");
        Self {
            document,
            model: SemanticModel::build(parsed.tree),
            parse_errors,
        }
    }
}

/// A document shared between completion requests and editors.
#[derive(Debug, Clone)]
pub struct SharedDocument {
    state: Arc<RwLock<DocumentState>>,
}

impl SharedDocument {
    pub fn new(text: &str) -> Self {
        Self::with_version(text, 0)
    }

    pub fn with_version(text: &str, version: i32) -> Self {
        Self {
            state: Arc::new(RwLock::new(DocumentState::analyse(SourceDocument::new(text, version)))),
        }
    }

    /// Read access for the duration of one request.
    pub fn snapshot(&self) -> Snapshot<'_> {
        let guard = self.state.read();
        trace!(version = guard.document.version(), "snapshot acquired");
        Snapshot { guard }
    }

    /// Apply changes and re-analyse. Waits for open snapshots to be released.
    pub fn edit(&self, changes: &[TextChange], version: i32) -> DocumentResult<()> {
        let mut state = self.state.write();
        let mut document = state.document.clone();
        for change in changes {
            document.apply_change(change)?;
        }
        document.version = version;
        *state = DocumentState::analyse(document);
        Ok(())
    }
}

/// A read-consistent view of a [`SharedDocument`].
pub struct Snapshot<'a> {
    guard: RwLockReadGuard<'a, DocumentState>,
}

impl<'a> Snapshot<'a> {
    pub fn document(&self) -> &SourceDocument {
        &self.guard.document
    }

    pub fn model(&self) -> &SemanticModel {
        &self.guard.model
    }

    pub fn text(&self) -> &str {
        self.guard.model.tree().source()
    }

    pub fn version(&self) -> i32 {
        self.guard.document.version()
    }

    pub fn parse_errors(&self) -> usize {
        self.guard.parse_errors
    }
}

impl Drop for Snapshot<'_> {
    fn drop(&mut self) {
        trace!(version = self.guard.document.version(), "snapshot released");
    }
}
