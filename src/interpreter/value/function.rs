use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::FunctionDecl,
    error::RuntimeError,
    interpreter::{evaluator::core::Interpreter, value::{core::Value, environment::Environment}},
};

/// Signature of a native builtin implementation.
///
/// Builtins receive the interpreter (so `require`/`include` can drive the
/// module loader), the evaluated arguments, and the call-site line.
pub type BuiltinFn = fn(&mut Interpreter, &[Value], usize) -> Result<Value, RuntimeError>;

/// A callable function value.
///
/// User-defined functions pair their declaration with the environment they
/// were created in; that captured environment is what makes closures work.
/// The closure link sits behind a `RefCell` so the collector can sever it
/// when the function becomes unreachable, unwinding reference cycles.
#[derive(Debug)]
pub enum Function {
    /// A function or method defined in source code.
    User {
        /// The shared declaration (name, parameters, body).
        declaration:    Rc<FunctionDecl>,
        /// The captured defining environment.
        closure:        RefCell<Rc<RefCell<Environment>>>,
        /// Whether this function is an `__init__` constructor; constructors
        /// always evaluate to `this`.
        is_constructor: bool,
    },
    /// A native builtin.
    Builtin {
        /// The builtin's registered name.
        name:  &'static str,
        /// Fixed arity, or `-1` for variadic.
        arity: i32,
        /// The native implementation.
        func:  BuiltinFn,
    },
}

impl Function {
    /// Creates a user function closing over `closure`.
    #[must_use]
    pub fn user(declaration: Rc<FunctionDecl>,
                closure: Rc<RefCell<Environment>>,
                is_constructor: bool)
                -> Self {
        Self::User { declaration,
                     closure: RefCell::new(closure),
                     is_constructor }
    }

    /// The number of arguments a call site must supply; `-1` means
    /// variadic.
    #[must_use]
    pub fn arity(&self) -> i32 {
        match self {
            Self::User { declaration, .. } => declaration.params.len() as i32,
            Self::Builtin { arity, .. } => *arity,
        }
    }

    /// The captured environment of a user function.
    ///
    /// # Panics
    /// Panics when called on a builtin; callers dispatch on the variant
    /// first.
    #[must_use]
    pub fn closure(&self) -> Rc<RefCell<Environment>> {
        match self {
            Self::User { closure, .. } => closure.borrow().clone(),
            Self::Builtin { .. } => unreachable!("builtins have no closure"),
        }
    }

    /// Replaces the captured environment. Used by the collector to sever
    /// the closure edge of an unreachable function.
    pub fn sever_closure(&self) {
        if let Self::User { closure, .. } = self {
            *closure.borrow_mut() = Rc::new(RefCell::new(Environment::new()));
        }
    }
}
