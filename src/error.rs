/// Parsing errors.
///
/// Defines all error types that can occur during lexing, macro expansion and
/// parsing of source code, before any evaluation starts. Each variant maps to
/// a numeric code in the syntax (100-199) or macro (500-599) range.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation: type
/// errors, arithmetic failures, bad indexing, module loading problems and
/// values thrown by user code. Each variant maps to a numeric code in the
/// 200-799 range.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
