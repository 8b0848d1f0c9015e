use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::interpreter::value::{core::Value, function::Function};

/// A class: a name, an optional superclass and a method table.
///
/// The method table sits behind a `RefCell` so the collector can clear it
/// when the class becomes unreachable, unwinding cycles through method
/// closures.
#[derive(Debug)]
pub struct Class {
    /// The class name as declared.
    pub name:       String,
    /// The superclass, if one was declared.
    pub superclass: Option<Rc<Class>>,
    /// Methods by name.
    pub methods:    RefCell<HashMap<String, Rc<Function>>>,
}

impl Class {
    /// Creates a class from its parts.
    #[must_use]
    pub fn new(name: String,
               superclass: Option<Rc<Class>>,
               methods: HashMap<String, Rc<Function>>)
               -> Self {
        Self { name,
               superclass,
               methods: RefCell::new(methods) }
    }

    /// Looks a method up in this class, then recursively in the
    /// superclass chain.
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(method) = self.methods.borrow().get(name) {
            return Some(Rc::clone(method));
        }
        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// The arity a call site must match: the arity of `__init__` if the
    /// class defines one, otherwise 0.
    #[must_use]
    pub fn arity(&self) -> i32 {
        self.find_method("__init__")
            .map_or(0, |initializer| initializer.arity())
    }
}

/// An instance: a class plus a per-instance field map.
///
/// Field access policy (own fields, then bound methods, then `__getattr__`)
/// lives in the evaluator, which needs to allocate bound functions; this
/// type only stores the data.
#[derive(Debug)]
pub struct Instance {
    /// The instantiated class.
    pub class:  Rc<Class>,
    /// Per-instance fields.
    pub fields: RefCell<HashMap<String, Value>>,
}

impl Instance {
    /// Creates an empty instance of `class`.
    #[must_use]
    pub fn new(class: Rc<Class>) -> Self {
        Self { class,
               fields: RefCell::new(HashMap::new()) }
    }

    /// Reads an own field, ignoring methods.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    /// Writes a field directly, bypassing `__setattr__`.
    pub fn set_field(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }
}
