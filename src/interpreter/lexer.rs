use logos::Logos;

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number and the byte offset of the start of that
/// line, so that token columns can be computed from spans.
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line:       usize,
    /// Byte offset at which the current line begins.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line:       1,
               line_start: 0, }
    }
}

/// Represents the kind of a lexical token.
///
/// This enum defines all recognized tokens in the language: literals,
/// operators, delimiters, keywords and type keywords. Multi-character
/// operators are matched maximally, so `<<=` lexes as one token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(extras = LexerExtras)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    /// Integer literal tokens such as `42`, `0xff`, `0b1010` or `0o755`.
    #[regex(r"[0-9]+", lex_int)]
    #[regex(r"0[xX][0-9a-fA-F]+", lex_hex)]
    #[regex(r"0[bB][01]+", lex_binary)]
    #[regex(r"0[oO][0-7]+", lex_octal)]
    Int(i64),
    /// Float literal tokens such as `3.14`, `1.` or `2e10`; a `.` or an
    /// exponent makes a number a float.
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", lex_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", lex_float)]
    Float(f64),
    /// String literal tokens, delimited by `"` or `'` with escapes decoded.
    /// An unterminated string consumes to end of input and still lexes as a
    /// string.
    #[regex(r#""([^"\\]|\\[\s\S])*""#, lex_string)]
    #[regex(r#"'([^'\\]|\\[\s\S])*'"#, lex_string)]
    #[regex(r#""([^"\\]|\\[\s\S])*"#, lex_unterminated_string)]
    #[regex(r#"'([^'\\]|\\[\s\S])*"#, lex_unterminated_string)]
    Str(String),
    /// Identifier tokens; variable, function and class names.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `=`
    #[token("=")]
    Assign,
    /// `+=`
    #[token("+=")]
    PlusAssign,
    /// `-=`
    #[token("-=")]
    MinusAssign,
    /// `*=`
    #[token("*=")]
    StarAssign,
    /// `/=`
    #[token("/=")]
    SlashAssign,
    /// `%=`
    #[token("%=")]
    PercentAssign,
    /// `&`
    #[token("&")]
    BitAnd,
    /// `|`
    #[token("|")]
    BitOr,
    /// `^`
    #[token("^")]
    BitXor,
    /// `~`
    #[token("~")]
    BitNot,
    /// `&=`
    #[token("&=")]
    BitAndAssign,
    /// `|=`
    #[token("|=")]
    BitOrAssign,
    /// `^=`
    #[token("^=")]
    BitXorAssign,
    /// `<<`
    #[token("<<")]
    Shl,
    /// `>>`
    #[token(">>")]
    Shr,
    /// `<<=`
    #[token("<<=")]
    ShlAssign,
    /// `>>=`
    #[token(">>=")]
    ShrAssign,
    /// `==`
    #[token("==")]
    Equal,
    /// `!=`
    #[token("!=")]
    NotEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>`
    #[token(">")]
    Greater,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `&&`
    #[token("&&")]
    And,
    /// `||`
    #[token("||")]
    Or,
    /// `!`
    #[token("!")]
    Not,
    /// `++`
    #[token("++")]
    Increment,
    /// `--`
    #[token("--")]
    Decrement,
    /// `?`
    #[token("?")]
    Question,

    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `,`
    #[token(",")]
    Comma,
    /// `:`
    #[token(":")]
    Colon,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `.`
    #[token(".")]
    Dot,
    /// `->`
    #[token("->")]
    Arrow,
    /// `...`
    #[token("...")]
    Ellipsis,

    /// `loc`
    #[token("loc")]
    Loc,
    /// `func`
    #[token("func")]
    Func,
    /// `class`
    #[token("class")]
    Class,
    /// `if`
    #[token("if")]
    If,
    /// `elif`
    #[token("elif")]
    Elif,
    /// `else`
    #[token("else")]
    Else,
    /// `then`
    #[token("then")]
    Then,
    /// `while`
    #[token("while")]
    While,
    /// `do`
    #[token("do")]
    Do,
    /// `for`
    #[token("for")]
    For,
    /// `in`
    #[token("in")]
    In,
    /// `return`
    #[token("return")]
    Return,
    /// `break`
    #[token("break")]
    Break,
    /// `continue`
    #[token("continue")]
    Continue,
    /// `const`
    #[token("const")]
    Const,
    /// `new`
    #[token("new")]
    New,
    /// `super`
    #[token("super")]
    Super,
    /// `this`
    #[token("this")]
    This,
    /// `try`
    #[token("try")]
    Try,
    /// `catch`
    #[token("catch")]
    Catch,
    /// `throw`
    #[token("throw")]
    Throw,
    /// `public`
    #[token("public")]
    Public,
    /// `protected`
    #[token("protected")]
    Protected,
    /// `private`
    #[token("private")]
    Private,
    /// `import`
    #[token("import")]
    Import,
    /// `export`
    #[token("export")]
    Export,
    /// `from`
    #[token("from")]
    From,
    /// `as`
    #[token("as")]
    As,
    /// `namespace`
    #[token("namespace")]
    Namespace,
    /// `macro`
    #[token("macro")]
    Macro,
    /// `async`; reserved but unimplemented.
    #[token("async")]
    Async,
    /// `await`; reserved but unimplemented.
    #[token("await")]
    Await,
    /// `true`
    #[token("true")]
    True,
    /// `false`
    #[token("false")]
    False,
    /// `null`
    #[token("null")]
    Null,

    /// `int` type keyword.
    #[token("int")]
    TypeInt,
    /// `float` type keyword.
    #[token("float")]
    TypeFloat,
    /// `bool` type keyword.
    #[token("bool")]
    TypeBool,
    /// `string` type keyword.
    #[token("string")]
    TypeString,
    /// `array` type keyword.
    #[token("array")]
    TypeArray,
    /// `dict` type keyword.
    #[token("dict")]
    TypeDict,

    /// Unrecognized input; carries the offending lexeme. A lone `..` is an
    /// error token.
    #[token("..", |lex| lex.slice().to_string())]
    Error(String),
    /// Marks the end of the token stream.
    EndOfFile,

    /// Newlines advance the line counter and are otherwise skipped.
    #[token("\n", |lex| {
        lex.extras.line      += 1;
        lex.extras.line_start = lex.span().end;
        logos::Skip
    })]
    Newline,
    /// Block comments terminate at the first `*/`; they do not nest.
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/", |lex| {
        track_newlines(lex);
        logos::Skip
    })]
    BlockComment,
}

/// Represents a lexical token: a kind plus the source position it was read
/// at. Positions are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was lexed.
    pub kind:   TokenKind,
    /// Line the token ends on.
    pub line:   usize,
    /// Column of the token's first character within its line.
    pub column: usize,
}

/// Turns a source buffer into a token vector, terminated by an
/// [`TokenKind::EndOfFile`] token.
///
/// Unrecognized characters become [`TokenKind::Error`] tokens instead of
/// aborting the scan, so the caller decides how to surface them.
///
/// # Example
/// ```
/// use zelo::interpreter::lexer::{TokenKind, tokenize};
///
/// let tokens = tokenize("loc x = 1;");
/// assert_eq!(tokens[0].kind, TokenKind::Loc);
/// assert_eq!(tokens.last().unwrap().kind, TokenKind::EndOfFile);
/// ```
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer_with_extras(source, LexerExtras::default());

    while let Some(result) = lexer.next() {
        let kind = match result {
            Ok(kind) => kind,
            Err(()) => TokenKind::Error(lexer.slice().to_string()),
        };
        let column = lexer.span().start.saturating_sub(lexer.extras.line_start) + 1;
        tokens.push(Token { kind,
                            line: lexer.extras.line,
                            column });
    }

    let column = source.len().saturating_sub(lexer.extras.line_start) + 1;
    tokens.push(Token { kind: TokenKind::EndOfFile,
                        line: lexer.extras.line,
                        column });
    tokens
}

/// Advances the line bookkeeping past any newlines inside a multi-line
/// token (block comments, strings).
fn track_newlines(lex: &mut logos::Lexer<TokenKind>) {
    let slice = lex.slice();
    let newlines = slice.bytes().filter(|&b| b == b'\n').count();
    if newlines > 0 {
        lex.extras.line += newlines;
        if let Some(pos) = slice.rfind('\n') {
            lex.extras.line_start = lex.span().start + pos + 1;
        }
    }
}

/// Parses a decimal integer literal from the current token slice.
fn lex_int(lex: &logos::Lexer<TokenKind>) -> Option<i64> {
    lex.slice().parse().ok()
}

/// Parses a hexadecimal literal (`0x...`) from the current token slice.
fn lex_hex(lex: &logos::Lexer<TokenKind>) -> Option<i64> {
    i64::from_str_radix(&lex.slice()[2..], 16).ok()
}

/// Parses a binary literal (`0b...`) from the current token slice.
fn lex_binary(lex: &logos::Lexer<TokenKind>) -> Option<i64> {
    i64::from_str_radix(&lex.slice()[2..], 2).ok()
}

/// Parses an octal literal (`0o...`) from the current token slice.
fn lex_octal(lex: &logos::Lexer<TokenKind>) -> Option<i64> {
    i64::from_str_radix(&lex.slice()[2..], 8).ok()
}

/// Parses a floating-point literal from the current token slice.
fn lex_float(lex: &logos::Lexer<TokenKind>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Decodes a terminated string literal, dropping the delimiters.
fn lex_string(lex: &mut logos::Lexer<TokenKind>) -> String {
    track_newlines(lex);
    let slice = lex.slice();
    decode_escapes(&slice[1..slice.len() - 1])
}

/// Decodes a string literal that ran to end of input without a closing
/// delimiter. Documented behaviour: the token is still a string.
fn lex_unterminated_string(lex: &mut logos::Lexer<TokenKind>) -> String {
    track_newlines(lex);
    decode_escapes(&lex.slice()[1..])
}

/// Processes the escape sequences `\n \t \r \\ \" \'`; any other escaped
/// character passes through literally.
fn decode_escapes(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('\\') => value.push('\\'),
            Some('"') => value.push('"'),
            Some('\'') => value.push('\''),
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }

    value
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Error(lexeme) => write!(f, "{lexeme}"),
            Self::EndOfFile => write!(f, "end of file"),
            other => {
                let text = match other {
                    Self::Plus => "+",
                    Self::Minus => "-",
                    Self::Star => "*",
                    Self::Slash => "/",
                    Self::Percent => "%",
                    Self::Assign => "=",
                    Self::PlusAssign => "+=",
                    Self::MinusAssign => "-=",
                    Self::StarAssign => "*=",
                    Self::SlashAssign => "/=",
                    Self::PercentAssign => "%=",
                    Self::BitAnd => "&",
                    Self::BitOr => "|",
                    Self::BitXor => "^",
                    Self::BitNot => "~",
                    Self::BitAndAssign => "&=",
                    Self::BitOrAssign => "|=",
                    Self::BitXorAssign => "^=",
                    Self::Shl => "<<",
                    Self::Shr => ">>",
                    Self::ShlAssign => "<<=",
                    Self::ShrAssign => ">>=",
                    Self::Equal => "==",
                    Self::NotEqual => "!=",
                    Self::Less => "<",
                    Self::LessEqual => "<=",
                    Self::Greater => ">",
                    Self::GreaterEqual => ">=",
                    Self::And => "&&",
                    Self::Or => "||",
                    Self::Not => "!",
                    Self::Increment => "++",
                    Self::Decrement => "--",
                    Self::Question => "?",
                    Self::LParen => "(",
                    Self::RParen => ")",
                    Self::LBrace => "{",
                    Self::RBrace => "}",
                    Self::LBracket => "[",
                    Self::RBracket => "]",
                    Self::Comma => ",",
                    Self::Colon => ":",
                    Self::Semicolon => ";",
                    Self::Dot => ".",
                    Self::Arrow => "->",
                    Self::Ellipsis => "...",
                    Self::Loc => "loc",
                    Self::Func => "func",
                    Self::Class => "class",
                    Self::If => "if",
                    Self::Elif => "elif",
                    Self::Else => "else",
                    Self::Then => "then",
                    Self::While => "while",
                    Self::Do => "do",
                    Self::For => "for",
                    Self::In => "in",
                    Self::Return => "return",
                    Self::Break => "break",
                    Self::Continue => "continue",
                    Self::Const => "const",
                    Self::New => "new",
                    Self::Super => "super",
                    Self::This => "this",
                    Self::Try => "try",
                    Self::Catch => "catch",
                    Self::Throw => "throw",
                    Self::Public => "public",
                    Self::Protected => "protected",
                    Self::Private => "private",
                    Self::Import => "import",
                    Self::Export => "export",
                    Self::From => "from",
                    Self::As => "as",
                    Self::Namespace => "namespace",
                    Self::Macro => "macro",
                    Self::Async => "async",
                    Self::Await => "await",
                    Self::True => "true",
                    Self::False => "false",
                    Self::Null => "null",
                    Self::TypeInt => "int",
                    Self::TypeFloat => "float",
                    Self::TypeBool => "bool",
                    Self::TypeString => "string",
                    Self::TypeArray => "array",
                    Self::TypeDict => "dict",
                    Self::Newline => "\\n",
                    Self::BlockComment => "/* */",
                    _ => unreachable!(),
                };
                write!(f, "{text}")
            },
        }
    }
}
