use std::{cell::RefCell,
          collections::{HashMap, HashSet},
          rc::Rc};

use crate::{error::RuntimeError, interpreter::value::core::Value};

/// A lexical scope: a name-to-value mapping with a link to its enclosing
/// scope.
///
/// Environments form a singly-linked parent chain. They are shared through
/// `Rc<RefCell<_>>`: the evaluator holds the current one, closures capture
/// theirs, and module exports hand them around as first-class values. The
/// chain rooted at the globals is also the collector's root set.
#[derive(Debug, Default)]
pub struct Environment {
    values:    HashMap<String, Value>,
    constants: HashSet<String>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Creates an environment with no enclosing scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment enclosed by `enclosing`.
    #[must_use]
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Self { values:    HashMap::new(),
               constants: HashSet::new(),
               enclosing: Some(enclosing), }
    }

    /// Wraps a child of `enclosing` in the shared cell form the evaluator
    /// works with.
    #[must_use]
    pub fn child_of(enclosing: &Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Self::with_enclosing(Rc::clone(enclosing))))
    }

    /// Defines `name` in this scope, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.constants.remove(name);
        self.values.insert(name.to_string(), value);
    }

    /// Defines `name` as a constant in this scope; later assignments fail.
    pub fn define_const(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
        self.constants.insert(name.to_string());
    }

    /// Assigns to an existing binding, walking the enclosing chain.
    ///
    /// # Errors
    /// - `ConstAssignment` when the nearest binding was declared `const`.
    /// - `UndefinedVariable` when no scope in the chain defines `name`.
    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> Result<(), RuntimeError> {
        if self.values.contains_key(name) {
            if self.constants.contains(name) {
                return Err(RuntimeError::ConstAssignment { name: name.to_string(),
                                                           line });
            }
            self.values.insert(name.to_string(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value, line);
        }

        Err(RuntimeError::UndefinedVariable { name: name.to_string(),
                                              line })
    }

    /// Looks `name` up, walking the enclosing chain.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }
        self.enclosing
            .as_ref()
            .and_then(|enclosing| enclosing.borrow().get(name))
    }

    /// Returns `true` when `name` is bound somewhere in the chain.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.values.contains_key(name)
        || self.enclosing
               .as_ref()
               .is_some_and(|enclosing| enclosing.borrow().is_defined(name))
    }

    /// The bindings of this scope only, without the enclosing chain.
    #[must_use]
    pub const fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    /// The enclosing scope, if any.
    #[must_use]
    pub fn enclosing(&self) -> Option<Rc<RefCell<Environment>>> {
        self.enclosing.clone()
    }
}
