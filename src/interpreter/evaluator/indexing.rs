use crate::{
    ast::{AssignOp, Expr},
    error::RuntimeError,
    interpreter::{evaluator::core::{EvalResult, Interpreter},
                  value::core::Value},
    util::num::normalize_index,
};

impl Interpreter {
    /// Evaluates an index expression.
    ///
    /// Arrays take integer indices, negative values counting from the end;
    /// dictionaries take string keys. Instances may overload `__getitem__`.
    pub(crate) fn eval_index(&mut self,
                             object: &Expr,
                             index: &Expr,
                             line: usize)
                             -> EvalResult<Value> {
        let object_value = self.evaluate(object)?;
        let index_value = self.evaluate(index)?;
        self.index_value(&object_value, &index_value, line)
    }

    /// Reads one element out of an indexable value.
    pub(crate) fn index_value(&mut self,
                              object: &Value,
                              index: &Value,
                              line: usize)
                              -> EvalResult<Value> {
        match object {
            Value::Array(array) => {
                let Value::Int(raw) = index else {
                    return Err(RuntimeError::TypeError { details: "array index must be an \
                                                                   integer".to_string(),
                                                         line });
                };
                let items = array.borrow();
                let position = normalize_index(*raw, items.len()).ok_or({
                                   RuntimeError::IndexOutOfBounds { index: *raw,
                                                                    len: items.len(),
                                                                    line }
                               })?;
                Ok(items[position].clone())
            },
            Value::Dict(dict) => {
                let Value::Str(key) = index else {
                    return Err(RuntimeError::TypeError { details: "dictionary key must be a \
                                                                   string".to_string(),
                                                         line });
                };
                dict.borrow()
                    .get(key)
                    .cloned()
                    .ok_or_else(|| RuntimeError::KeyNotFound { key: key.clone(),
                                                               line })
            },
            Value::Object(instance) => {
                if let Some(method) = instance.class.find_method("__getitem__") {
                    let instance = std::rc::Rc::clone(instance);
                    let bound = self.bind_method(&method, &instance);
                    return self.call_function(&bound, vec![index.clone()], line);
                }
                Err(RuntimeError::TypeError { details: format!("<object {}> does not support \
                                                                indexing",
                                                               instance.class.name),
                                              line })
            },
            other => Err(RuntimeError::TypeError { details: format!("{} cannot be indexed",
                                                                    other.type_name()),
                                                   line }),
        }
    }

    /// Evaluates a slice expression; defined on arrays only.
    ///
    /// Provided negative bounds are normalised modulo the length. Open
    /// bounds default to the whole array in step direction: `0..len` for a
    /// positive step, `len-1..before-first` for a negative one, so `[::-1]`
    /// reverses. A zero step fails.
    pub(crate) fn eval_slice(&mut self,
                             object: &Expr,
                             start: Option<&Expr>,
                             stop: Option<&Expr>,
                             step: Option<&Expr>,
                             line: usize)
                             -> EvalResult<Value> {
        let object_value = self.evaluate(object)?;
        let Value::Array(array) = object_value else {
            return Err(RuntimeError::TypeError { details: "slice operation is only supported \
                                                            for arrays".to_string(),
                                                 line });
        };

        let start = self.eval_slice_bound(start, "start", line)?;
        let stop = self.eval_slice_bound(stop, "stop", line)?;
        let step = self.eval_slice_bound(step, "step", line)?.unwrap_or(1);

        if step == 0 {
            return Err(RuntimeError::InvalidOperation { details: "slice step cannot be zero"
                                                                           .to_string(),
                                                        line });
        }

        let len = array.borrow().len() as i64;
        let (start, stop) = if step > 0 {
            (start.map_or(0, |bound| adjust_bound(bound, len).clamp(0, len)),
             stop.map_or(len, |bound| adjust_bound(bound, len).clamp(0, len)))
        } else {
            (start.map_or(len - 1, |bound| adjust_bound(bound, len).clamp(-1, len - 1)),
             stop.map_or(-1, |bound| adjust_bound(bound, len).clamp(-1, len - 1)))
        };

        let mut result = Vec::new();
        let items = array.borrow();
        let mut position = start;
        while (step > 0 && position < stop) || (step < 0 && position > stop) {
            if position >= 0 && position < len {
                result.push(items[position as usize].clone());
            }
            position += step;
        }

        Ok(result.into())
    }

    /// Evaluates one optional slice bound to an integer.
    fn eval_slice_bound(&mut self,
                        bound: Option<&Expr>,
                        what: &str,
                        line: usize)
                        -> EvalResult<Option<i64>> {
        match bound {
            None => Ok(None),
            Some(expr) => match self.evaluate(expr)? {
                Value::Int(value) => Ok(Some(value)),
                other => Err(RuntimeError::TypeError { details: format!("slice {what} must be \
                                                                         an integer, got {}",
                                                                        other.type_name()),
                                                       line }),
            },
        }
    }

    /// Evaluates an assignment expression, plain or compound.
    ///
    /// Compound forms desugar to `target = target op value`. The assigned
    /// value is the expression's result.
    pub(crate) fn eval_assign(&mut self,
                              target: &Expr,
                              op: AssignOp,
                              value: &Expr,
                              line: usize)
                              -> EvalResult<Value> {
        let rhs = self.evaluate(value)?;

        match target {
            Expr::Identifier { name, .. } => {
                let new_value = match op.binary_op() {
                    Some(binary) => {
                        let current = self.environment().borrow().get(name).ok_or_else(|| {
                                          RuntimeError::UndefinedVariable { name: name.clone(),
                                                                            line }
                                      })?;
                        self.apply_binary(binary, current, rhs, line)?
                    },
                    None => rhs,
                };
                self.environment()
                    .borrow_mut()
                    .assign(name, new_value.clone(), line)?;
                Ok(new_value)
            },
            Expr::Member { object, property, .. } => {
                let object_value = self.evaluate(object)?;
                let Value::Object(instance) = object_value else {
                    return Err(RuntimeError::TypeError { details: format!("{} has no \
                                                                           properties",
                                                                          object_value.type_name()),
                                                         line });
                };

                let new_value = match op.binary_op() {
                    Some(binary) => {
                        let current = self.instance_get(&instance, property, line)?;
                        self.apply_binary(binary, current, rhs, line)?
                    },
                    None => rhs,
                };
                self.instance_set(&instance, property, new_value.clone(), line)?;
                Ok(new_value)
            },
            Expr::Index { object, index, .. } => {
                let object_value = self.evaluate(object)?;
                let index_value = self.evaluate(index)?;

                let new_value = match op.binary_op() {
                    Some(binary) => {
                        let current = self.index_value(&object_value, &index_value, line)?;
                        self.apply_binary(binary, current, rhs, line)?
                    },
                    None => rhs,
                };

                self.store_index(&object_value, &index_value, new_value.clone(), line)?;
                Ok(new_value)
            },
            _ => Err(RuntimeError::InvalidOperation { details: "invalid assignment target"
                                                                        .to_string(),
                                                      line }),
        }
    }

    /// Writes one element into an indexable value.
    fn store_index(&mut self,
                   object: &Value,
                   index: &Value,
                   value: Value,
                   line: usize)
                   -> EvalResult<()> {
        match object {
            Value::Array(array) => {
                let Value::Int(raw) = index else {
                    return Err(RuntimeError::TypeError { details: "array index must be an \
                                                                   integer".to_string(),
                                                         line });
                };
                let mut items = array.borrow_mut();
                let len = items.len();
                let position = normalize_index(*raw, len).ok_or({
                                   RuntimeError::IndexOutOfBounds { index: *raw,
                                                                    len,
                                                                    line }
                               })?;
                items[position] = value;
                Ok(())
            },
            Value::Dict(dict) => {
                let Value::Str(key) = index else {
                    return Err(RuntimeError::TypeError { details: "dictionary key must be a \
                                                                   string".to_string(),
                                                         line });
                };
                dict.borrow_mut().insert(key.clone(), value);
                Ok(())
            },
            other => Err(RuntimeError::TypeError { details: format!("{} cannot be indexed",
                                                                    other.type_name()),
                                                   line }),
        }
    }
}

/// Normalises a possibly negative slice bound against the array length,
/// without clamping.
const fn adjust_bound(bound: i64, len: i64) -> i64 {
    if bound < 0 { bound + len } else { bound }
}
