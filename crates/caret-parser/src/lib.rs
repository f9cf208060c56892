//! Caret Parser
//!
//! Recursive descent parser that turns a token stream into a [`SyntaxTree`].
//!
//! Two entry points exist:
//!
//! - [`parse_file`] parses a whole compilation unit. It never fails: problems
//!   are collected in [`ParsedFile::errors`] and the tree contains `Error`
//!   nodes where the input could not be placed. Completion runs on code that
//!   is being typed, so a missing `;` must not lose the surrounding structure.
//! - [`parse_expression`] parses a snippet that must form exactly one
//!   expression. It is used for speculative probes such as `list.xxx` and
//!   reports any problem as an error.

use caret_lexer::{Lexer, LexerError, Span, Token, TokenKind};
use caret_syntax::{NodeId, SyntaxKind, SyntaxTree, TreeBuilder};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of input - expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Unexpected input after expression at position {span:?}")]
    TrailingInput { span: Span },

    #[error(transparent)]
    Lexer(#[from] LexerError),
}

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Result of parsing a whole file
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub tree: SyntaxTree,
    pub errors: Vec<ParseError>,
}

impl ParsedFile {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse a complete source file, recovering from errors.
pub fn parse_file(source: &str) -> ParsedFile {
    Parser::new(source).parse_file()
}

/// Parse `text` as a single expression written at `anchor` in some host tree.
pub fn parse_expression(text: &str, anchor: NodeId) -> ParseResult<SyntaxTree> {
    Parser::new(text)
        .parse_standalone_expression()
        .map(|tree| tree.with_anchor(anchor))
}

/// Parser state
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    lex_errors: Vec<LexerError>,
    builder: TreeBuilder,
}

impl<'src> Parser<'src> {
    /// Create a new parser from source code
    pub fn new(source: &'src str) -> Self {
        let (tokens, lex_errors) = Lexer::new(source).tokenize();
        Self {
            source,
            tokens,
            pos: 0,
            errors: Vec::new(),
            lex_errors,
            builder: TreeBuilder::new(source),
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Parse the entire input as a file
    pub fn parse_file(mut self) -> ParsedFile {
        self.builder.start_node(SyntaxKind::File);
        while !self.is_eof() {
            let before = self.pos;
            self.member();
            if self.pos == before {
                self.error_and_bump("declaration");
            }
        }
        self.builder.finish_node();

        let mut errors: Vec<ParseError> =
            self.lex_errors.into_iter().map(ParseError::from).collect();
        errors.extend(self.errors);
        ParsedFile {
            tree: self.builder.finish(),
            errors,
        }
    }

    /// Parse the entire input as exactly one expression
    pub fn parse_standalone_expression(mut self) -> ParseResult<SyntaxTree> {
        if let Some(error) = self.lex_errors.first() {
            return Err(error.clone().into());
        }
        if self.is_eof() {
            return Err(ParseError::UnexpectedEof {
                expected: "expression".to_string(),
            });
        }
        self.expression();
        if !self.is_eof() {
            return Err(ParseError::TrailingInput {
                span: self.current_span(),
            });
        }
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }
        Ok(self.builder.finish())
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    fn current_kind(&self) -> Option<&TokenKind> {
        self.nth_kind(0)
    }

    fn nth_kind(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(token) => token.span,
            None => Span::new(self.source.len(), self.source.len()),
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn at_ident(&self) -> bool {
        matches!(self.current_kind(), Some(TokenKind::Ident(_)))
    }

    /// Move the current token into the tree
    fn bump(&mut self) {
        if let Some(token) = self.tokens.get(self.pos).cloned() {
            self.builder.token(token);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or record an error without consuming anything
    fn expect(&mut self, kind: TokenKind) {
        if !self.eat(&kind) {
            self.error_expected(&kind.to_string());
        }
    }

    fn expect_ident(&mut self) {
        if self.at_ident() {
            self.bump();
        } else {
            self.error_expected("identifier");
        }
    }

    fn error_expected(&mut self, expected: &str) {
        let error = match self.current_kind() {
            Some(found) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
                span: self.current_span(),
            },
            None => ParseError::UnexpectedEof {
                expected: expected.to_string(),
            },
        };
        self.errors.push(error);
    }

    /// Record an error and wrap the current token in an `Error` node
    fn error_and_bump(&mut self, expected: &str) {
        self.error_expected(expected);
        self.builder.start_node(SyntaxKind::Error);
        self.bump();
        self.builder.finish_node();
    }

    fn at_type_start(&self) -> bool {
        matches!(self.current_kind(), Some(kind) if kind.is_primitive_type())
            || self.at(&TokenKind::Void)
            || self.at_ident()
    }

    fn at_expression_start(&self) -> bool {
        match self.current_kind() {
            Some(kind) => {
                kind.is_literal()
                    || matches!(
                        kind,
                        TokenKind::Ident(_)
                            | TokenKind::This
                            | TokenKind::New
                            | TokenKind::LParen
                            | TokenKind::Bang
                            | TokenKind::Minus
                    )
            }
            None => false,
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// A class, method or field, with its leading modifiers
    fn member(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.modifiers();

        if self.at(&TokenKind::Class) || self.at(&TokenKind::Interface) {
            self.builder.start_node_at(checkpoint, SyntaxKind::Class);
            self.bump();
            self.expect_ident();
            self.class_body();
            self.builder.finish_node();
            return;
        }

        if !self.at_type_start() {
            self.builder.start_node_at(checkpoint, SyntaxKind::Error);
            self.error_expected("declaration");
            if !self.at(&TokenKind::RBrace) {
                self.bump();
            }
            self.builder.finish_node();
            return;
        }

        self.type_ref();
        let is_method = matches!(self.nth_kind(1), Some(TokenKind::LParen));
        if is_method {
            self.builder.start_node_at(checkpoint, SyntaxKind::Method);
            self.expect_ident();
            self.param_list();
            if self.at(&TokenKind::LBrace) {
                self.block();
            } else {
                self.expect(TokenKind::Semi);
            }
        } else {
            self.builder.start_node_at(checkpoint, SyntaxKind::Field);
            self.expect_ident();
            if self.eat(&TokenKind::Eq) {
                self.expression();
            }
            self.expect(TokenKind::Semi);
        }
        self.builder.finish_node();
    }

    fn class_body(&mut self) {
        self.expect(TokenKind::LBrace);
        while !self.is_eof() && !self.at(&TokenKind::RBrace) {
            let before = self.pos;
            self.member();
            if self.pos == before {
                self.error_and_bump("member declaration");
            }
        }
        self.expect(TokenKind::RBrace);
    }

    /// Annotations and modifier keywords; always emits a (possibly empty) node
    fn modifiers(&mut self) {
        self.builder.start_node(SyntaxKind::Modifiers);
        loop {
            match self.current_kind() {
                Some(TokenKind::At) => self.annotation(),
                Some(kind) if kind.is_modifier() => self.bump(),
                _ => break,
            }
        }
        self.builder.finish_node();
    }

    fn annotation(&mut self) {
        self.builder.start_node(SyntaxKind::Annotation);
        self.bump();
        self.expect_ident();
        if self.at(&TokenKind::LParen) {
            self.builder.start_node(SyntaxKind::AnnotationArgs);
            self.bump();
            if !self.at(&TokenKind::RParen) {
                self.expression();
                while self.eat(&TokenKind::Comma) {
                    self.expression();
                }
            }
            self.expect(TokenKind::RParen);
            self.builder.finish_node();
        }
        self.builder.finish_node();
    }

    fn type_ref(&mut self) {
        self.builder.start_node(SyntaxKind::TypeRef);
        if self.at_type_start() {
            let is_name = self.at_ident();
            self.bump();
            while is_name
                && self.at(&TokenKind::Dot)
                && matches!(self.nth_kind(1), Some(TokenKind::Ident(_)))
            {
                self.bump();
                self.bump();
            }
        } else {
            self.error_expected("type");
        }
        self.builder.finish_node();
    }

    fn param_list(&mut self) {
        self.builder.start_node(SyntaxKind::ParamList);
        self.expect(TokenKind::LParen);
        if !self.at(&TokenKind::RParen) && !self.is_eof() {
            self.param();
            while self.eat(&TokenKind::Comma) {
                self.param();
            }
        }
        self.expect(TokenKind::RParen);
        self.builder.finish_node();
    }

    fn param(&mut self) {
        self.builder.start_node(SyntaxKind::Param);
        self.modifiers();
        self.type_ref();
        self.expect_ident();
        self.builder.finish_node();
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn block(&mut self) {
        self.builder.start_node(SyntaxKind::Block);
        self.expect(TokenKind::LBrace);
        while !self.is_eof() && !self.at(&TokenKind::RBrace) {
            let before = self.pos;
            self.statement();
            if self.pos == before {
                self.error_and_bump("statement");
            }
        }
        self.expect(TokenKind::RBrace);
        self.builder.finish_node();
    }

    fn statement(&mut self) {
        match self.current_kind() {
            Some(TokenKind::LBrace) => self.block(),
            Some(TokenKind::Semi) => self.bump(),
            Some(TokenKind::Return) => {
                self.builder.start_node(SyntaxKind::ReturnStmt);
                self.bump();
                if self.at_expression_start() {
                    self.expression();
                }
                self.expect(TokenKind::Semi);
                self.builder.finish_node();
            }
            Some(TokenKind::Throw) => {
                self.builder.start_node(SyntaxKind::ThrowStmt);
                self.bump();
                self.expression();
                self.expect(TokenKind::Semi);
                self.builder.finish_node();
            }
            Some(TokenKind::If) => {
                self.builder.start_node(SyntaxKind::IfStmt);
                self.bump();
                self.condition();
                self.statement();
                if self.eat(&TokenKind::Else) {
                    self.statement();
                }
                self.builder.finish_node();
            }
            Some(TokenKind::While) => {
                self.builder.start_node(SyntaxKind::WhileStmt);
                self.bump();
                self.condition();
                self.statement();
                self.builder.finish_node();
            }
            _ if self.at_local_var_start() => self.local_var(),
            _ if self.at_expression_start() => {
                self.builder.start_node(SyntaxKind::ExprStmt);
                self.expression();
                self.expect(TokenKind::Semi);
                self.builder.finish_node();
            }
            _ => self.error_and_bump("statement"),
        }
    }

    fn condition(&mut self) {
        self.expect(TokenKind::LParen);
        self.expression();
        self.expect(TokenKind::RParen);
    }

    /// `final int x`, `int x`, `String s`, `@Ann T t`
    fn at_local_var_start(&self) -> bool {
        match self.current_kind() {
            Some(TokenKind::At) => true,
            Some(kind) if kind.is_modifier() || kind.is_primitive_type() => true,
            Some(TokenKind::Ident(_)) => {
                let mut n = 1;
                while matches!(self.nth_kind(n), Some(TokenKind::Dot))
                    && matches!(self.nth_kind(n + 1), Some(TokenKind::Ident(_)))
                {
                    n += 2;
                }
                matches!(self.nth_kind(n), Some(TokenKind::Ident(_)))
            }
            _ => false,
        }
    }

    fn local_var(&mut self) {
        self.builder.start_node(SyntaxKind::LocalVar);
        self.modifiers();
        self.type_ref();
        self.expect_ident();
        if self.eat(&TokenKind::Eq) {
            self.expression();
        }
        self.expect(TokenKind::Semi);
        self.builder.finish_node();
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) {
        self.assignment();
    }

    fn assignment(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.binary(0);
        if self.at(&TokenKind::Eq) {
            self.builder.start_node_at(checkpoint, SyntaxKind::AssignExpr);
            self.bump();
            self.assignment();
            self.builder.finish_node();
        }
    }

    /// Precedence climbing over the binary operators
    fn binary(&mut self, min_precedence: u8) {
        let checkpoint = self.builder.checkpoint();
        self.unary();
        while let Some(precedence) = self.current_kind().and_then(binary_precedence) {
            if precedence < min_precedence {
                break;
            }
            self.builder.start_node_at(checkpoint, SyntaxKind::BinaryExpr);
            self.bump();
            self.binary(precedence + 1);
            self.builder.finish_node();
        }
    }

    fn unary(&mut self) {
        if self.at(&TokenKind::Bang) || self.at(&TokenKind::Minus) {
            self.builder.start_node(SyntaxKind::UnaryExpr);
            self.bump();
            self.unary();
            self.builder.finish_node();
        } else if self.at_cast() {
            self.builder.start_node(SyntaxKind::CastExpr);
            self.bump();
            self.type_ref();
            self.expect(TokenKind::RParen);
            self.unary();
            self.builder.finish_node();
        } else {
            self.postfix();
        }
    }

    /// `(int) x` always casts; `(Name) x` casts when an operand follows.
    fn at_cast(&self) -> bool {
        if !self.at(&TokenKind::LParen) || !matches!(self.nth_kind(2), Some(TokenKind::RParen)) {
            return false;
        }
        match self.nth_kind(1) {
            Some(kind) if kind.is_primitive_type() => true,
            Some(TokenKind::Ident(_)) => match self.nth_kind(3) {
                Some(next) => {
                    next.is_literal()
                        || matches!(
                            next,
                            TokenKind::Ident(_)
                                | TokenKind::LParen
                                | TokenKind::This
                                | TokenKind::New
                                | TokenKind::Bang
                        )
                }
                None => false,
            },
            _ => false,
        }
    }

    fn postfix(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.primary();
        loop {
            match self.current_kind() {
                Some(TokenKind::Dot) => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::RefExpr);
                    self.bump();
                    self.expect_ident();
                    self.builder.finish_node();
                }
                Some(TokenKind::LParen) => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::CallExpr);
                    self.arg_list();
                    self.builder.finish_node();
                }
                _ => break,
            }
        }
    }

    fn arg_list(&mut self) {
        self.builder.start_node(SyntaxKind::ArgList);
        self.expect(TokenKind::LParen);
        if !self.at(&TokenKind::RParen) && !self.is_eof() {
            self.expression();
            while self.eat(&TokenKind::Comma) {
                self.expression();
            }
        }
        self.expect(TokenKind::RParen);
        self.builder.finish_node();
    }

    fn primary(&mut self) {
        match self.current_kind() {
            Some(TokenKind::Ident(_)) => {
                self.builder.start_node(SyntaxKind::RefExpr);
                self.bump();
                self.builder.finish_node();
            }
            Some(TokenKind::This) => {
                self.builder.start_node(SyntaxKind::ThisExpr);
                self.bump();
                self.builder.finish_node();
            }
            Some(TokenKind::New) => {
                self.builder.start_node(SyntaxKind::NewExpr);
                self.bump();
                self.type_ref();
                if self.at(&TokenKind::LParen) {
                    self.arg_list();
                } else {
                    self.error_expected("(");
                }
                self.builder.finish_node();
            }
            Some(TokenKind::LParen) => {
                self.builder.start_node(SyntaxKind::ParenExpr);
                self.bump();
                self.expression();
                self.expect(TokenKind::RParen);
                self.builder.finish_node();
            }
            Some(kind) if kind.is_literal() => {
                self.builder.start_node(SyntaxKind::Literal);
                self.bump();
                self.builder.finish_node();
            }
            _ => {
                // Missing operand: leave an empty placeholder node
                self.error_expected("expression");
                self.builder.start_node(SyntaxKind::Error);
                self.builder.finish_node();
            }
        }
    }
}

fn binary_precedence(kind: &TokenKind) -> Option<u8> {
    let precedence = match kind {
        TokenKind::PipePipe => 1,
        TokenKind::AmpAmp => 2,
        TokenKind::EqEq | TokenKind::NotEq => 3,
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => 4,
        TokenKind::Plus | TokenKind::Minus => 5,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 6,
        _ => return None,
    };
    Some(precedence)
}
