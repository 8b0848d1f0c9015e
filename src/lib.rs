//! # zelo
//!
//! zelo is a small dynamically-typed scripting language with a tree-walking
//! interpreter. The pipeline is lexing, macro expansion, parsing and
//! evaluation; heap cycles created through closures, instances and classes
//! are reclaimed by a generational mark-and-sweep collector rooted at the
//! interpreter's global environment.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    ast::Stmt,
    error::ParseError,
    interpreter::{evaluator::core::Interpreter,
                  lexer::{TokenKind, tokenize},
                  macro_expander::MacroTable,
                  parser::core::Parser},
};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` and `Stmt` enums and related types that
/// represent the syntactic structure of source code as a tree, together
/// with operator enums and type annotations. The AST is built by the parser
/// and traversed by the evaluator.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised while lexing,
/// expanding macros, parsing or evaluating code. Every variant carries a
/// source line and maps to a numeric code in the language's error
/// taxonomy.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together the lexer, macro expander, parser, evaluator,
/// value representation, garbage collector and module system to provide a
/// complete runtime for source code evaluation.
pub mod interpreter;
/// General utilities for safe numeric conversion.
pub mod util;

/// Lexes, macro-expands and parses source text into a program.
///
/// # Errors
/// Returns every parse error encountered, one per synchronisation point.
///
/// # Examples
/// ```
/// let program = zelo::compile("loc x = 1 + 2;").unwrap();
/// assert_eq!(program.len(), 1);
///
/// assert!(zelo::compile("loc = ;").is_err());
/// ```
pub fn compile(source: &str) -> Result<Vec<Stmt>, Vec<ParseError>> {
    let tokens = tokenize(source);

    if let Some(token) = tokens.iter()
                               .find(|token| matches!(token.kind, TokenKind::Error(_)))
    {
        return Err(vec![ParseError::UnexpectedToken { token: token.kind.to_string(),
                                                      line:  token.line, }]);
    }

    let expanded = MacroTable::new().process(tokens).map_err(|error| vec![error])?;
    Parser::new(&expanded).parse()
}

/// Checks that source text lexes, expands and parses; nothing is
/// evaluated.
///
/// # Errors
/// The parse errors, when any stage fails.
pub fn check_source(source: &str) -> Result<(), Vec<ParseError>> {
    compile(source).map(|_| ())
}

/// Evaluates source text in a fresh interpreter.
///
/// # Errors
/// Returns the first parse error or the uncaught runtime error.
///
/// # Examples
/// ```
/// use zelo::run_source;
///
/// assert!(run_source("loc x = 2 + 2; assert(x == 4);").is_ok());
///
/// // 'y' is not defined.
/// assert!(run_source("loc x = y + 1;").is_err());
/// ```
pub fn run_source(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut interpreter = Interpreter::new();
    run_with(&mut interpreter, source)
}

/// Evaluates source text against existing interpreter state.
///
/// This is the REPL entry point: globals, loaded modules and tracked heap
/// cells persist across calls.
///
/// # Errors
/// Returns the first parse error or the uncaught runtime error.
///
/// # Examples
/// ```
/// use zelo::{interpreter::evaluator::core::Interpreter, run_with};
///
/// let mut interpreter = Interpreter::new();
/// run_with(&mut interpreter, "loc counter = 10;").unwrap();
/// run_with(&mut interpreter, "assert(counter == 10);").unwrap();
/// ```
pub fn run_with(interpreter: &mut Interpreter,
                source: &str)
                -> Result<(), Box<dyn std::error::Error>> {
    let statements = match compile(source) {
        Ok(statements) => statements,
        Err(mut errors) => return Err(Box::new(errors.remove(0))),
    };

    interpreter.interpret(&statements)?;
    Ok(())
}
