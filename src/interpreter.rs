/// Turns source text into tokens.
///
/// Single-pass scanner with line and column tracking, built on a `logos`
/// token definition. Comments and whitespace are skipped; unrecognized
/// characters become error tokens.
pub mod lexer;
/// Expands macros over the token stream.
///
/// Consumes `macro` definitions and splices invocation bodies in place,
/// before the parser ever sees the tokens.
pub mod macro_expander;
/// Builds the syntax tree.
///
/// Recursive descent over the expanded token stream, with precedence
/// climbing for expressions and panic-mode error recovery.
pub mod parser;
/// Walks the syntax tree.
///
/// The evaluator threads a current-environment pointer through statement
/// execution, producing values and side effects, and drives the collector
/// on a statement cadence.
pub mod evaluator;
/// Runtime values and the environments that hold them.
pub mod value;
/// Runtime type checking and conversion for optional annotations.
pub mod types;
/// Generational mark-and-sweep garbage collection.
///
/// Reclaims reference cycles through closures, instances and classes that
/// the value layer's reference counting cannot.
pub mod gc;
/// Module path resolution and the require cache.
pub mod modules;
/// The builtin function registry installed into every interpreter.
pub mod builtins;
