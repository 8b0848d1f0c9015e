use crate::{
    ast::Stmt,
    error::ParseError,
    interpreter::lexer::{Token, TokenKind},
};

/// Result type used by the parser.
pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over a token vector.
///
/// The parser walks the tokens by index, which keeps arbitrary lookahead and
/// panic-mode resynchronisation cheap. On a parse error it discards tokens
/// up to the next `;` or the start of a declaration keyword and resumes, so
/// one pass reports one error per synchronisation point.
///
/// # Example
/// ```
/// use zelo::interpreter::{lexer::tokenize, parser::core::Parser};
///
/// let tokens = tokenize("loc x = 1 + 2;");
/// let statements = Parser::new(&tokens).parse().unwrap();
/// assert_eq!(statements.len(), 1);
/// ```
pub struct Parser<'a> {
    tokens:  &'a [Token],
    current: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser over a token vector produced by the lexer (and
    /// macro expander).
    #[must_use]
    pub const fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parses the whole token stream into a statement list.
    ///
    /// # Errors
    /// Returns every error encountered, one per synchronisation point, when
    /// any part of the input failed to parse.
    pub fn parse(&mut self) -> Result<Vec<Stmt>, Vec<ParseError>> {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            match self.declaration() {
                Ok(Some(statement)) => statements.push(statement),
                Ok(None) => {},
                Err(error) => {
                    errors.push(error);
                    self.synchronize();
                },
            }
        }

        if errors.is_empty() {
            Ok(statements)
        } else {
            Err(errors)
        }
    }

    /// Parses one declaration or statement.
    ///
    /// Returns `Ok(None)` for constructs that produce no statement (a
    /// `macro` definition that survived to the parser is skipped here; the
    /// expander normally removes them upstream).
    pub(crate) fn declaration(&mut self) -> ParseResult<Option<Stmt>> {
        match self.peek().kind.clone() {
            TokenKind::Loc | TokenKind::Const => {
                self.advance();
                self.var_declaration().map(Some)
            },
            TokenKind::Func => {
                self.advance();
                self.function_declaration().map(Some)
            },
            TokenKind::Class => {
                self.advance();
                self.class_declaration().map(Some)
            },
            TokenKind::Import => {
                self.advance();
                self.import_statement().map(Some)
            },
            TokenKind::Export => {
                self.advance();
                self.export_statement().map(Some)
            },
            TokenKind::Namespace => {
                self.advance();
                self.namespace_declaration().map(Some)
            },
            TokenKind::Macro => {
                self.skip_macro_definition();
                Ok(None)
            },
            _ => self.statement().map(Some),
        }
    }

    /// Discards tokens until a statement boundary: just past a `;`, or just
    /// before a declaration keyword.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Func
                | TokenKind::Loc
                | TokenKind::Const
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return => return,
                _ => {},
            }

            self.advance();
        }
    }

    /// Consumes a `macro` definition through its terminating `;` without
    /// producing a statement.
    fn skip_macro_definition(&mut self) {
        while !self.is_at_end() && self.peek().kind != TokenKind::Semicolon {
            self.advance();
        }
        if !self.is_at_end() {
            self.advance();
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfFile
    }

    /// Line of the token about to be consumed.
    pub(crate) fn line(&self) -> usize {
        self.peek().line
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == *kind
    }

    /// Consumes the next token when it matches `kind`.
    pub(crate) fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// Requires the next token to be `kind`, producing the matching
    /// punctuation error otherwise.
    pub(crate) fn consume(&mut self, kind: &TokenKind) -> ParseResult<()> {
        if self.check(kind) {
            self.advance();
            return Ok(());
        }
        Err(self.expected(kind))
    }

    /// Builds the error reported when `kind` was required but absent.
    pub(crate) fn expected(&self, kind: &TokenKind) -> ParseError {
        let line = self.line();
        match kind {
            TokenKind::Semicolon => ParseError::MissingSemicolon { line },
            TokenKind::LParen | TokenKind::RParen => ParseError::MissingParen { line },
            TokenKind::LBrace | TokenKind::RBrace => ParseError::MissingBrace { line },
            TokenKind::LBracket | TokenKind::RBracket => ParseError::MissingBracket { line },
            _ => ParseError::UnexpectedToken { token: format!("expected '{kind}', found '{}'",
                                                              self.peek().kind),
                                               line },
        }
    }

    /// Requires and returns an identifier token's text.
    pub(crate) fn consume_identifier(&mut self, what: &str) -> ParseResult<String> {
        if let TokenKind::Identifier(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            return Ok(name);
        }
        Err(ParseError::UnexpectedToken { token: format!("expected {what}, found '{}'",
                                                         self.peek().kind),
                                          line:  self.line(), })
    }

    /// Requires and returns a string token's decoded text.
    pub(crate) fn consume_string(&mut self, what: &str) -> ParseResult<String> {
        if let TokenKind::Str(text) = &self.peek().kind {
            let text = text.clone();
            self.advance();
            return Ok(text);
        }
        Err(ParseError::UnexpectedToken { token: format!("expected {what}, found '{}'",
                                                         self.peek().kind),
                                          line:  self.line(), })
    }
}
