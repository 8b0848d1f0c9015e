use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::LiteralValue,
    interpreter::value::{class::{Class, Instance},
                         environment::Environment,
                         function::Function},
};

/// Shared mutable array cell.
pub type ValueArray = Rc<RefCell<Vec<Value>>>;
/// Shared mutable dictionary cell. Keys are always strings; insertion order
/// is not preserved.
pub type ValueDict = Rc<RefCell<HashMap<String, Value>>>;

/// Represents a runtime value in the interpreter.
///
/// Scalars are stored inline; arrays, dictionaries, instances, functions,
/// classes and environments are shared mutable cells, so every reference
/// observes in-place mutation.
#[derive(Debug, Clone)]
pub enum Value {
    /// The `null` value.
    Null,
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// An owned string.
    Str(String),
    /// A shared mutable ordered sequence of values.
    Array(ValueArray),
    /// A shared mutable string-keyed mapping.
    Dict(ValueDict),
    /// A shared reference to a class instance.
    Object(Rc<Instance>),
    /// A shared reference to a function, user-defined or builtin.
    Function(Rc<Function>),
    /// A shared reference to a class.
    Class(Rc<Class>),
    /// A shared reference to an environment; used to pass module exports and
    /// namespaces around as first-class values.
    Environment(Rc<RefCell<Environment>>),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(v)))
    }
}

impl From<&LiteralValue> for Value {
    fn from(lit: &LiteralValue) -> Self {
        match lit {
            LiteralValue::Null => Self::Null,
            LiteralValue::Int(v) => (*v).into(),
            LiteralValue::Float(v) => (*v).into(),
            LiteralValue::Bool(v) => (*v).into(),
            LiteralValue::Str(v) => v.clone().into(),
        }
    }
}

impl Value {
    /// Returns the dynamic type name reported by `typeof`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Class(_) => "class",
            Self::Environment(_) => "environment",
        }
    }

    /// Returns `true` if the value is numeric.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Int(..) | Self::Float(..))
    }

    /// Converts a numeric value to `f64`; callers must have checked the
    /// variant.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
            _ => f64::NAN,
        }
    }
}

/// The truthiness predicate used by conditional forms.
///
/// `null` and `false` are false; every other value is true.
///
/// # Example
/// ```
/// use zelo::interpreter::value::core::{Value, is_truthy};
///
/// assert!(!is_truthy(&Value::Null));
/// assert!(!is_truthy(&Value::Bool(false)));
/// assert!(is_truthy(&Value::Int(0)));
/// assert!(is_truthy(&Value::Str(String::new())));
/// ```
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        _ => true,
    }
}

/// The equality relation behind `==` and `!=`.
///
/// Numbers compare across the int/float divide; strings, booleans and null
/// compare by value; arrays and dictionaries compare element-wise;
/// instances, functions, classes and environments compare by identity.
#[must_use]
pub fn is_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| is_equal(a, b))
        },
        (Value::Dict(x), Value::Dict(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
            && x.iter()
                .all(|(key, value)| y.get(key).is_some_and(|other| is_equal(value, other)))
        },
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Class(x), Value::Class(y)) => Rc::ptr_eq(x, y),
        (Value::Environment(x), Value::Environment(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
            Self::Array(array) => {
                write!(f, "[")?;
                for (index, value) in array.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            },
            Self::Dict(dict) => {
                write!(f, "{{")?;
                for (index, (key, value)) in dict.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            },
            Self::Object(instance) => write!(f, "<object {}>", instance.class.name),
            Self::Function(_) => write!(f, "<function>"),
            Self::Class(class) => write!(f, "<class {}>", class.name),
            Self::Environment(_) => write!(f, "<environment>"),
        }
    }
}
