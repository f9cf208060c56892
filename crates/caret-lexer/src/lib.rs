//! Caret Lexer
//!
//! Tokenizes the Java-style source subset understood by the completion
//! toolchain. Uses the `logos` crate for efficient lexing.
//!
//! Whitespace and comments are skipped entirely: the syntax tree only keeps
//! significant tokens, so "the leaf before the caret" is always a real token.

use logos::Logos;
use smol_str::SmolStr;
use std::fmt;
use std::ops::Range;

/// Source span representing a byte range in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Half-open containment: `start <= offset < end`.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Inclusive containment, used for caret positions sitting right after a token.
    pub fn touches(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    /// Moves the span by `delta` bytes.
    pub fn shifted(self, delta: usize) -> Span {
        Span::new(self.start + delta, self.end + delta)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// A token with its kind and source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Consumes a block comment up to and including `*/`, or to the end of input
/// when it is never closed. Yields whether the comment was terminated.
fn block_comment_callback(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(remainder.len());
            false
        }
    }
}

/// All token types of the source subset
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // ========== Keywords ==========
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("static")]
    Static,
    #[token("final")]
    Final,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("void")]
    Void,
    #[token("return")]
    Return,
    #[token("throw")]
    Throw,
    #[token("new")]
    New,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("this")]
    This,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,

    // Primitive type keywords
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("double")]
    Double,
    #[token("boolean")]
    Boolean,
    #[token("char")]
    Char,

    // ========== Operators ==========
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,

    // ========== Delimiters ==========
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token("@")]
    At,

    // ========== Literals ==========
    /// Integer literal with optional `L` suffix
    #[regex(r"[0-9][0-9_]*[lL]?", |lex| SmolStr::new(lex.slice()))]
    IntLit(SmolStr),

    /// Floating point literal
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*(?:[eE][+-]?[0-9]+)?[dDfF]?", |lex| SmolStr::new(lex.slice()))]
    FloatLit(SmolStr),

    /// String literal
    #[regex(r#""(?:[^"\\\n]|\\.)*""#, |lex| SmolStr::new(lex.slice()))]
    StringLit(SmolStr),

    /// Character literal
    #[regex(r"'(?:[^'\\\n]|\\.)'", |lex| SmolStr::new(lex.slice()))]
    CharLit(SmolStr),

    // ========== Identifiers ==========
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| SmolStr::new(lex.slice()))]
    Ident(SmolStr),

    // ========== Comments ==========
    /// `/* ... */`; never handed to the parser
    #[token("/*", block_comment_callback)]
    BlockComment(bool),

    // ========== Error ==========
    /// Lexer error - unrecognized character
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLit(s)
            | TokenKind::FloatLit(s)
            | TokenKind::StringLit(s)
            | TokenKind::CharLit(s)
            | TokenKind::Ident(s) => write!(f, "{}", s),
            TokenKind::BlockComment(_) => write!(f, "block comment"),
            TokenKind::Error => write!(f, "<error>"),
            other => match other.fixed_text() {
                Some(text) => write!(f, "{}", text),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

impl TokenKind {
    /// The literal source text of tokens that always spell the same way.
    pub fn fixed_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Class => "class",
            TokenKind::Interface => "interface",
            TokenKind::Static => "static",
            TokenKind::Final => "final",
            TokenKind::Public => "public",
            TokenKind::Private => "private",
            TokenKind::Protected => "protected",
            TokenKind::Void => "void",
            TokenKind::Return => "return",
            TokenKind::Throw => "throw",
            TokenKind::New => "new",
            TokenKind::Null => "null",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::This => "this",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Int => "int",
            TokenKind::Long => "long",
            TokenKind::Double => "double",
            TokenKind::Boolean => "boolean",
            TokenKind::Char => "char",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Bang => "!",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Dot => ".",
            TokenKind::At => "@",
            _ => return None,
        };
        Some(text)
    }

    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Static
                | TokenKind::Final
                | TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Void
                | TokenKind::Return
                | TokenKind::Throw
                | TokenKind::New
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::This
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
        ) || self.is_primitive_type()
    }

    /// Check if this token names a primitive type (`void` excluded)
    pub fn is_primitive_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Long | TokenKind::Double | TokenKind::Boolean | TokenKind::Char
        )
    }

    /// Check if this token is a declaration modifier
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Static
                | TokenKind::Final
                | TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::IntLit(_)
                | TokenKind::FloatLit(_)
                | TokenKind::StringLit(_)
                | TokenKind::CharLit(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Identifier text, if this is an identifier token
    pub fn ident(&self) -> Option<&SmolStr> {
        match self {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Unexpected character '{1}' at position {0}")]
    UnexpectedCharacter(usize, char),

    #[error("Unterminated block comment starting at position {0}")]
    UnterminatedBlockComment(usize),
}

impl LexerError {
    pub fn position(&self) -> usize {
        match self {
            LexerError::UnexpectedCharacter(pos, _) | LexerError::UnterminatedBlockComment(pos) => {
                *pos
            }
        }
    }
}

/// Lexer for caret source code
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
        }
    }

    /// Get the source code being lexed
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Tokenize the entire source into a vector of tokens.
    ///
    /// Unrecognized characters become `TokenKind::Error` tokens so that the
    /// parser can still build a tree around them. Comments are dropped; an
    /// unterminated one is reported but leaves no token behind.
    pub fn tokenize(self) -> (Vec<Token>, Vec<LexerError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for result in self {
            match result {
                Ok(token) => tokens.push(token),
                Err(error @ LexerError::UnterminatedBlockComment(_)) => errors.push(error),
                Err(LexerError::UnexpectedCharacter(start, bad_char)) => {
                    let span = Span::new(start, start + bad_char.len_utf8());
                    errors.push(LexerError::UnexpectedCharacter(start, bad_char));
                    tokens.push(Token::new(TokenKind::Error, span));
                }
            }
        }

        (tokens, errors)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = std::result::Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let result = self.inner.next()?;
            let span = self.inner.span();
            return Some(match result {
                Ok(TokenKind::BlockComment(true)) => continue,
                Ok(TokenKind::BlockComment(false)) => {
                    Err(LexerError::UnterminatedBlockComment(span.start))
                }
                Ok(kind) => Ok(Token::new(kind, Span::from(span))),
                Err(_) => {
                    let bad_char = self.source[span.clone()].chars().next().unwrap_or('?');
                    Err(LexerError::UnexpectedCharacter(span.start, bad_char))
                }
            });
        }
    }
}
