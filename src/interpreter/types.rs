use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::{TypeAnnotation, TypeKind},
    error::RuntimeError,
    interpreter::value::core::Value,
};

/// Result type shared with the evaluator.
pub type TypeResult<T> = Result<T, RuntimeError>;

/// Checks a value against an annotation.
///
/// The `...` sentinel always passes. A union passes when the value's
/// dynamic kind matches any listed kind, with `int` accepted by
/// `float`-annotated slots. Array annotations check every element;
/// dictionary annotations require string keys and check every value.
///
/// # Example
/// ```
/// use zelo::{ast::{TypeAnnotation, TypeKind},
///            interpreter::{types::check_type, value::core::Value}};
///
/// let annotation = TypeAnnotation { kinds: vec![TypeKind::Int, TypeKind::Float],
///                                   ..TypeAnnotation::default() };
///
/// assert!(check_type(&Value::Int(3), &annotation));
/// assert!(check_type(&Value::Float(3.5), &annotation));
/// assert!(!check_type(&Value::Str("3".to_string()), &annotation));
/// ```
#[must_use]
pub fn check_type(value: &Value, annotation: &TypeAnnotation) -> bool {
    if annotation.kinds.contains(&TypeKind::Any) {
        return true;
    }

    if !annotation.kinds.is_empty() {
        return annotation.kinds.iter().any(|kind| check_basic(value, *kind));
    }

    if annotation.is_array
       && let Some(element) = &annotation.element
    {
        return check_array(value, element);
    }

    if annotation.is_dict
       && let (Some(key), Some(element)) = (&annotation.key, &annotation.element)
    {
        return check_dict(value, key, element);
    }

    // No kinds and no container flags: "any".
    annotation.is_any()
}

/// Checks a value's dynamic kind against one basic kind.
#[must_use]
pub fn check_basic(value: &Value, kind: TypeKind) -> bool {
    match kind {
        TypeKind::Int => matches!(value, Value::Int(_)),
        TypeKind::Float => matches!(value, Value::Int(_) | Value::Float(_)),
        TypeKind::Bool => matches!(value, Value::Bool(_)),
        TypeKind::Str => matches!(value, Value::Str(_)),
        TypeKind::Any => true,
    }
}

fn check_array(value: &Value, element: &TypeAnnotation) -> bool {
    match value {
        Value::Array(array) => array.borrow().iter().all(|item| check_type(item, element)),
        _ => false,
    }
}

fn check_dict(value: &Value, key: &TypeAnnotation, element: &TypeAnnotation) -> bool {
    match value {
        Value::Dict(dict) => {
            // Keys are strings at the value layer; the annotation must
            // admit them.
            if !key.kinds.is_empty() && !key.kinds.contains(&TypeKind::Str) {
                return false;
            }
            dict.borrow().values().all(|item| check_type(item, element))
        },
        _ => false,
    }
}

/// Converts a value to an annotated type.
///
/// Union targets are tried in order, returning the first successful
/// conversion. Array and dictionary casts recurse element-wise; a
/// non-array value cast to an array becomes a one-element array.
///
/// # Errors
/// `TypeError` when no listed target accepts the value.
pub fn cast_value(value: &Value, annotation: &TypeAnnotation, line: usize) -> TypeResult<Value> {
    if annotation.kinds.contains(&TypeKind::Any) {
        return Ok(value.clone());
    }

    if !annotation.kinds.is_empty() {
        for kind in &annotation.kinds {
            if let Ok(converted) = cast_basic(value, *kind, line) {
                return Ok(converted);
            }
        }
        return Err(RuntimeError::TypeError { details: format!("cannot cast {} to {}",
                                                              value.type_name(),
                                                              annotation),
                                             line });
    }

    if annotation.is_array
       && let Some(element) = &annotation.element
    {
        return cast_array(value, element, line);
    }

    if annotation.is_dict
       && let (Some(key), Some(element)) = (&annotation.key, &annotation.element)
    {
        return cast_dict(value, key, element, line);
    }

    if annotation.is_any() {
        return Ok(value.clone());
    }

    Err(RuntimeError::TypeError { details: format!("cannot cast {} to {}",
                                                   value.type_name(),
                                                   annotation),
                                  line })
}

/// Converts a value to one basic kind.
///
/// `bool` converts to numbers as 0/1; `null` converts to the string
/// `"null"`; strings convert to numbers by parsing and fail on invalid
/// text.
///
/// # Errors
/// `TypeError` when the conversion is not defined.
pub fn cast_basic(value: &Value, kind: TypeKind, line: usize) -> TypeResult<Value> {
    let unsupported = || RuntimeError::TypeError { details: format!("cannot cast {} to {}",
                                                                    value.type_name(),
                                                                    kind_name(kind)),
                                                   line };

    match kind {
        TypeKind::Int => match value {
            Value::Int(v) => Ok(Value::Int(*v)),
            Value::Float(v) => Ok(Value::Int(*v as i64)),
            Value::Bool(v) => Ok(Value::Int(i64::from(*v))),
            Value::Str(text) => text.trim()
                                    .parse::<i64>()
                                    .map(Value::Int)
                                    .map_err(|_| RuntimeError::TypeError {
                                        details: format!("cannot convert '{text}' to int"),
                                        line,
                                    }),
            _ => Err(unsupported()),
        },
        TypeKind::Float => match value {
            Value::Float(v) => Ok(Value::Float(*v)),
            Value::Int(v) => Ok(Value::Float(*v as f64)),
            Value::Bool(v) => Ok(Value::Float(f64::from(u8::from(*v)))),
            Value::Str(text) => text.trim()
                                    .parse::<f64>()
                                    .map(Value::Float)
                                    .map_err(|_| RuntimeError::TypeError {
                                        details: format!("cannot convert '{text}' to float"),
                                        line,
                                    }),
            _ => Err(unsupported()),
        },
        TypeKind::Bool => match value {
            Value::Bool(v) => Ok(Value::Bool(*v)),
            Value::Int(v) => Ok(Value::Bool(*v != 0)),
            Value::Float(v) => Ok(Value::Bool(*v != 0.0)),
            Value::Str(text) => Ok(Value::Bool(!text.is_empty() && text != "false" && text != "0")),
            _ => Err(unsupported()),
        },
        TypeKind::Str => Ok(Value::Str(value.to_string())),
        TypeKind::Any => Ok(value.clone()),
    }
}

fn cast_array(value: &Value, element: &TypeAnnotation, line: usize) -> TypeResult<Value> {
    match value {
        Value::Array(array) => {
            let mut result = Vec::with_capacity(array.borrow().len());
            for item in array.borrow().iter() {
                result.push(cast_value(item, element, line)?);
            }
            Ok(result.into())
        },
        // A scalar cast to an array type becomes a one-element array.
        other => Ok(vec![cast_value(other, element, line)?].into()),
    }
}

fn cast_dict(value: &Value,
             key: &TypeAnnotation,
             element: &TypeAnnotation,
             line: usize)
             -> TypeResult<Value> {
    match value {
        Value::Dict(dict) => {
            let mut result = HashMap::new();
            for (k, v) in dict.borrow().iter() {
                let converted_key = cast_value(&Value::Str(k.clone()), key, line)?;
                let Value::Str(new_key) = converted_key else {
                    return Err(RuntimeError::TypeError { details: "dictionary key must remain \
                                                                   a string after conversion"
                                                                            .to_string(),
                                                         line });
                };
                result.insert(new_key, cast_value(v, element, line)?);
            }
            Ok(Value::Dict(Rc::new(RefCell::new(result))))
        },
        _ => Err(RuntimeError::TypeError { details: format!("cannot cast {} to a dictionary \
                                                             type",
                                                            value.type_name()),
                                           line }),
    }
}

/// The compatibility relation `source <: target` between annotations.
///
/// An `...` target accepts anything. Identical basic kinds match;
/// `int <: float`; `bool <: int|float`; every kind converts to `string`
/// (uniform stringification). Containers recurse on their element (and for
/// dictionaries, key) annotations.
#[must_use]
pub fn is_compatible(source: &TypeAnnotation, target: &TypeAnnotation) -> bool {
    if target.kinds.contains(&TypeKind::Any) || target.is_any() {
        return true;
    }

    if !source.kinds.is_empty() && !target.kinds.is_empty() {
        return source.kinds.iter().any(|source_kind| {
                                     target.kinds
                                           .iter()
                                           .any(|target_kind| {
                                               basic_compatible(*source_kind, *target_kind)
                                           })
                                 });
    }

    if source.is_array && target.is_array {
        return match (&source.element, &target.element) {
            (Some(source_element), Some(target_element)) => {
                is_compatible(source_element, target_element)
            },
            _ => false,
        };
    }

    if source.is_dict && target.is_dict {
        let keys_ok = match (&source.key, &target.key) {
            (Some(source_key), Some(target_key)) => is_compatible(source_key, target_key),
            _ => true,
        };
        let values_ok = match (&source.element, &target.element) {
            (Some(source_element), Some(target_element)) => {
                is_compatible(source_element, target_element)
            },
            _ => true,
        };
        return keys_ok && values_ok;
    }

    false
}

/// The surface name of a basic kind, as written in annotations.
const fn kind_name(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Int => "int",
        TypeKind::Float => "float",
        TypeKind::Bool => "bool",
        TypeKind::Str => "string",
        TypeKind::Any => "...",
    }
}

fn basic_compatible(source: TypeKind, target: TypeKind) -> bool {
    if target == TypeKind::Any || source == target {
        return true;
    }
    match (source, target) {
        (TypeKind::Int, TypeKind::Float) => true,
        (TypeKind::Bool, TypeKind::Int | TypeKind::Float) => true,
        // Uniform stringification makes every kind convertible to string.
        (_, TypeKind::Str) => true,
        _ => false,
    }
}

impl std::fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_array {
            write!(f, "array[")?;
            match &self.element {
                Some(element) => write!(f, "{element}")?,
                None => write!(f, "...")?,
            }
            return write!(f, "]");
        }

        if self.is_dict {
            write!(f, "dict{{")?;
            match &self.key {
                Some(key) => write!(f, "{key}")?,
                None => write!(f, "...")?,
            }
            write!(f, ": ")?;
            match &self.element {
                Some(element) => write!(f, "{element}")?,
                None => write!(f, "...")?,
            }
            return write!(f, "}}");
        }

        if self.kinds.is_empty() {
            return write!(f, "any");
        }

        for (index, kind) in self.kinds.iter().enumerate() {
            if index > 0 {
                write!(f, "|")?;
            }
            write!(f, "{}", kind_name(*kind))?;
        }
        Ok(())
    }
}
