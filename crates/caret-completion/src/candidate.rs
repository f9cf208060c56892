//! Completion candidates and their insertion metadata.

use caret_semantics::SymbolId;
use smol_str::SmolStr;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Text appended after an accepted completion is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TailPolicy {
    #[default]
    None,
    /// Statement terminator
    Semicolon,
    /// Decided by the host from the surrounding code
    Unknown,
}

impl TailPolicy {
    pub fn suffix(self) -> &'static str {
        match self {
            TailPolicy::Semicolon => ";",
            TailPolicy::None | TailPolicy::Unknown => "",
        }
    }
}

/// Icon shown next to a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateIcon {
    Variable,
    Method,
}

/// What a candidate stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CandidateObject {
    /// A declaration of the original file or the built-in library
    Symbol(SymbolId),
    /// A synthesized qualified access such as `list.size()`
    Expression(String),
}

/// One completion offered to the user.
///
/// Two candidates are equal when they stand for the same object; the tail
/// policy, icon and display name never split a candidate.
#[derive(Debug, Clone)]
pub struct CompletionCandidate {
    pub object: CandidateObject,
    /// Name shown for symbol candidates
    pub name: SmolStr,
    pub tail: TailPolicy,
    pub icon: Option<CandidateIcon>,
    /// Literal text for synthesized candidates
    pub insert_text: Option<String>,
}

impl CompletionCandidate {
    /// A candidate naming a declaration.
    pub fn symbol(id: SymbolId, name: impl Into<SmolStr>, tail: TailPolicy) -> Self {
        Self {
            object: CandidateObject::Symbol(id),
            name: name.into(),
            tail,
            icon: None,
            insert_text: None,
        }
    }

    /// A candidate built from synthesized source text.
    pub fn expression(text: impl Into<String>, tail: TailPolicy) -> Self {
        let text = text.into();
        Self {
            object: CandidateObject::Expression(text.clone()),
            name: SmolStr::new(&text),
            tail,
            icon: None,
            insert_text: Some(text),
        }
    }

    pub fn with_icon(mut self, icon: CandidateIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    /// The string the typed prefix is matched against
    pub fn lookup_string(&self) -> &str {
        self.insert_text.as_deref().unwrap_or(&self.name)
    }

    /// Text inserted into the document, tail included
    pub fn insertion_text(&self) -> String {
        format!("{}{}", self.lookup_string(), self.tail.suffix())
    }

    pub fn symbol_id(&self) -> Option<SymbolId> {
        match self.object {
            CandidateObject::Symbol(id) => Some(id),
            CandidateObject::Expression(_) => None,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self.object, CandidateObject::Expression(_))
    }
}

impl PartialEq for CompletionCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

impl Eq for CompletionCandidate {}

impl Hash for CompletionCandidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.object.hash(state);
    }
}

impl fmt::Display for CompletionCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lookup_string())
    }
}
