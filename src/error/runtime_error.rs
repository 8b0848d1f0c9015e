use crate::interpreter::value::core::Value;

#[derive(Debug, Clone)]
/// Represents all errors that can occur during evaluation and runtime.
pub enum RuntimeError {
    /// A value had an unexpected or incompatible type for the attempted
    /// operation.
    TypeError {
        /// Details about the type problem.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A declared annotation did not match the value assigned to it.
    TypeMismatch {
        /// Details about the mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Tried to use an undefined variable.
    UndefinedVariable {
        /// The name of the variable.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to access a property an object does not have.
    UndefinedProperty {
        /// The name of the property.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// An operation is not supported for the given operands.
    InvalidOperation {
        /// Details about the operation.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Tried to re-assign a `const` binding.
    ConstAssignment {
        /// The name of the constant.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Attempted division (or modulo) by zero.
    DivisionByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to access an array element outside the allowed bounds.
    IndexOutOfBounds {
        /// The index that was requested.
        index: i64,
        /// The length of the array.
        len:   usize,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A dictionary lookup key was not present.
    KeyNotFound {
        /// The missing key.
        key:  String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// An argument to a builtin was invalid or out of range.
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// User-function call nesting exceeded the interpreter limit.
    RecursionDepthExceeded {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An `assert(...)` call failed.
    AssertionFailed {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `panic(...)` call aborted evaluation.
    Panic {
        /// The panic message.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A value thrown by user code via `throw`.
    Thrown {
        /// The thrown value.
        value: Value,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A module path did not resolve to a file.
    ModuleNotFound {
        /// The unresolved module path.
        path: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A named import was not among a module's exports.
    ImportError {
        /// Details about the failed import.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// An `export` named a symbol that is not defined.
    ExportError {
        /// The undefined symbol.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Two modules require each other.
    CircularImport {
        /// The module path that closed the cycle.
        path: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A module file could not be read or executed.
    ModuleLoadError {
        /// Details about the failure.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A reserved construct that is not implemented (`await`).
    NotImplemented {
        /// The unimplemented construct.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl RuntimeError {
    /// Returns the numeric error code for this error.
    ///
    /// Codes follow the language taxonomy: 200-299 type errors, 300-399
    /// runtime errors, 400-499 module errors, 600-699 internal errors.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::TypeError { .. } => 200,
            Self::TypeMismatch { .. } => 201,
            Self::UndefinedVariable { .. } => 202,
            Self::UndefinedProperty { .. } => 203,
            Self::InvalidOperation { .. } | Self::ConstAssignment { .. } => 205,
            Self::AssertionFailed { .. } | Self::Panic { .. } | Self::Thrown { .. } => 300,
            Self::DivisionByZero { .. } => 301,
            Self::IndexOutOfBounds { .. } => 302,
            Self::KeyNotFound { .. } => 303,
            Self::InvalidArgument { .. } => 306,
            Self::RecursionDepthExceeded { .. } => 308,
            Self::ModuleNotFound { .. } => 401,
            Self::ImportError { .. } => 402,
            Self::ExportError { .. } => 403,
            Self::CircularImport { .. } => 404,
            Self::ModuleLoadError { .. } => 405,
            Self::NotImplemented { .. } => 601,
        }
    }

    /// Returns the symbolic name of the numeric error code.
    #[must_use]
    pub const fn code_name(&self) -> &'static str {
        match self {
            Self::TypeError { .. } => "TYPE_ERROR",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::UndefinedVariable { .. } => "UNDEFINED_VARIABLE",
            Self::UndefinedProperty { .. } => "UNDEFINED_PROPERTY",
            Self::InvalidOperation { .. } | Self::ConstAssignment { .. } => "INVALID_OPERATION",
            Self::AssertionFailed { .. } | Self::Panic { .. } | Self::Thrown { .. } => {
                "RUNTIME_ERROR"
            },
            Self::DivisionByZero { .. } => "DIVISION_BY_ZERO",
            Self::IndexOutOfBounds { .. } => "INDEX_OUT_OF_BOUNDS",
            Self::KeyNotFound { .. } => "KEY_NOT_FOUND",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::RecursionDepthExceeded { .. } => "RECURSION_DEPTH_EXCEEDED",
            Self::ModuleNotFound { .. } => "MODULE_NOT_FOUND",
            Self::ImportError { .. } => "IMPORT_ERROR",
            Self::ExportError { .. } => "EXPORT_ERROR",
            Self::CircularImport { .. } => "CIRCULAR_IMPORT",
            Self::ModuleLoadError { .. } => "MODULE_LOAD_ERROR",
            Self::NotImplemented { .. } => "NOT_IMPLEMENTED",
        }
    }

    /// Returns the source line the error was reported on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::TypeError { line, .. }
            | Self::TypeMismatch { line, .. }
            | Self::UndefinedVariable { line, .. }
            | Self::UndefinedProperty { line, .. }
            | Self::InvalidOperation { line, .. }
            | Self::ConstAssignment { line, .. }
            | Self::DivisionByZero { line }
            | Self::IndexOutOfBounds { line, .. }
            | Self::KeyNotFound { line, .. }
            | Self::InvalidArgument { line, .. }
            | Self::RecursionDepthExceeded { line }
            | Self::AssertionFailed { line }
            | Self::Panic { line, .. }
            | Self::Thrown { line, .. }
            | Self::ModuleNotFound { line, .. }
            | Self::ImportError { line, .. }
            | Self::ExportError { line, .. }
            | Self::CircularImport { line, .. }
            | Self::ModuleLoadError { line, .. }
            | Self::NotImplemented { line, .. } => *line,
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeError { details, line } => {
                write!(f, "Error on line {line}: Type error: {details}.")
            },
            Self::TypeMismatch { details, line } => {
                write!(f, "Error on line {line}: Type mismatch: {details}.")
            },
            Self::UndefinedVariable { name, line } => {
                write!(f, "Error on line {line}: Undefined variable '{name}'.")
            },
            Self::UndefinedProperty { name, line } => {
                write!(f, "Error on line {line}: Undefined property '{name}'.")
            },
            Self::InvalidOperation { details, line } => {
                write!(f, "Error on line {line}: Invalid operation: {details}.")
            },
            Self::ConstAssignment { name, line } => write!(f,
                                                           "Error on line {line}: Cannot assign to constant '{name}'."),
            Self::DivisionByZero { line } => write!(f, "Error on line {line}: Division by zero."),
            Self::IndexOutOfBounds { index, len, line } => write!(f,
                                                                  "Error on line {line}: Index {index} out of bounds for array of length {len}."),
            Self::KeyNotFound { key, line } => {
                write!(f, "Error on line {line}: Key '{key}' not found in dictionary.")
            },
            Self::InvalidArgument { details, line } => {
                write!(f, "Error on line {line}: Invalid argument: {details}.")
            },
            Self::RecursionDepthExceeded { line } => {
                write!(f, "Error on line {line}: Recursion depth exceeded.")
            },
            Self::AssertionFailed { line } => write!(f, "Error on line {line}: Assertion failed."),
            Self::Panic { message, line } => write!(f, "Error on line {line}: Panic: {message}"),
            Self::Thrown { value, line } => write!(f, "Error on line {line}: {value}"),
            Self::ModuleNotFound { path, line } => {
                write!(f, "Error on line {line}: Module not found: {path}.")
            },
            Self::ImportError { details, line } => {
                write!(f, "Error on line {line}: Import error: {details}.")
            },
            Self::ExportError { name, line } => write!(f,
                                                       "Error on line {line}: Cannot export undefined symbol '{name}'."),
            Self::CircularImport { path, line } => {
                write!(f, "Error on line {line}: Circular import detected: {path}.")
            },
            Self::ModuleLoadError { details, line } => {
                write!(f, "Error on line {line}: Module load error: {details}.")
            },
            Self::NotImplemented { details, line } => {
                write!(f, "Error on line {line}: Not implemented: {details}.")
            },
        }
    }
}

impl std::error::Error for RuntimeError {}
