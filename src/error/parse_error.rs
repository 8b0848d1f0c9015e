#[derive(Debug, Clone)]
/// Represents all errors that can occur before evaluation: lexing, macro
/// expansion and parsing.
pub enum ParseError {
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// The token encountered, or a short description of what was
        /// expected.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Reached the end of input unexpectedly.
    UnexpectedEndOfInput {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `;` was expected but not found.
    MissingSemicolon {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `(` or `)` was expected but not found.
    MissingParen {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `{` or `}` was expected but not found.
    MissingBrace {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `[` or `]` was expected but not found.
    MissingBracket {
        /// The source line where the error occurred.
        line: usize,
    },
    /// The assignment left-hand side is not an identifier, member or index
    /// expression.
    InvalidAssignmentTarget {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Some other malformed construct, with details.
    InvalidSyntax {
        /// Details about the malformed construct.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A function-like macro was invoked with the wrong number of arguments.
    MacroArgumentMismatch {
        /// The macro name.
        name:     String,
        /// The number of declared parameters.
        expected: usize,
        /// The number of supplied arguments.
        found:    usize,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A macro definition or invocation could not be expanded.
    MacroExpansionError {
        /// Details about the failure.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl ParseError {
    /// Returns the numeric error code for this error.
    ///
    /// Codes follow the language taxonomy: 100-199 for syntax errors and
    /// 500-599 for macro errors.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::UnexpectedToken { .. } => 101,
            Self::MissingSemicolon { .. } => 102,
            Self::MissingParen { .. } => 103,
            Self::MissingBrace { .. } => 104,
            Self::MissingBracket { .. } => 105,
            Self::UnexpectedEndOfInput { .. }
            | Self::InvalidAssignmentTarget { .. }
            | Self::InvalidSyntax { .. } => 106,
            Self::MacroArgumentMismatch { .. } => 502,
            Self::MacroExpansionError { .. } => 504,
        }
    }

    /// Returns the symbolic name of the numeric error code.
    #[must_use]
    pub const fn code_name(&self) -> &'static str {
        match self {
            Self::UnexpectedToken { .. } => "UNEXPECTED_TOKEN",
            Self::MissingSemicolon { .. } => "MISSING_SEMICOLON",
            Self::MissingParen { .. } => "MISSING_PAREN",
            Self::MissingBrace { .. } => "MISSING_BRACE",
            Self::MissingBracket { .. } => "MISSING_BRACKET",
            Self::UnexpectedEndOfInput { .. }
            | Self::InvalidAssignmentTarget { .. }
            | Self::InvalidSyntax { .. } => "INVALID_SYNTAX",
            Self::MacroArgumentMismatch { .. } => "MACRO_ARGUMENT_MISMATCH",
            Self::MacroExpansionError { .. } => "MACRO_EXPANSION_ERROR",
        }
    }

    /// Returns the source line the error was reported on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::UnexpectedToken { line, .. }
            | Self::UnexpectedEndOfInput { line }
            | Self::MissingSemicolon { line }
            | Self::MissingParen { line }
            | Self::MissingBrace { line }
            | Self::MissingBracket { line }
            | Self::InvalidAssignmentTarget { line }
            | Self::InvalidSyntax { line, .. }
            | Self::MacroArgumentMismatch { line, .. }
            | Self::MacroExpansionError { line, .. } => *line,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { token, line } => {
                write!(f, "Error on line {line}: Unexpected token: {token}.")
            },
            Self::UnexpectedEndOfInput { line } => {
                write!(f, "Error on line {line}: Unexpected end of input.")
            },
            Self::MissingSemicolon { line } => {
                write!(f, "Error on line {line}: Missing ';'.")
            },
            Self::MissingParen { line } => {
                write!(f, "Error on line {line}: Missing parenthesis.")
            },
            Self::MissingBrace { line } => {
                write!(f, "Error on line {line}: Missing brace.")
            },
            Self::MissingBracket { line } => {
                write!(f, "Error on line {line}: Missing bracket.")
            },
            Self::InvalidAssignmentTarget { line } => write!(f,
                                                             "Error on line {line}: Invalid assignment target; expected identifier, member or index."),
            Self::InvalidSyntax { details, line } => {
                write!(f, "Error on line {line}: Invalid syntax: {details}.")
            },
            Self::MacroArgumentMismatch { name,
                                          expected,
                                          found,
                                          line, } => write!(f,
                                                            "Error on line {line}: Macro '{name}' expects {expected} arguments but got {found}."),
            Self::MacroExpansionError { details, line } => {
                write!(f, "Error on line {line}: Macro expansion failed: {details}.")
            },
        }
    }
}

impl std::error::Error for ParseError {}
