use crate::{
    ast::{Expr, UnaryOp},
    error::RuntimeError,
    interpreter::{evaluator::core::{EvalResult, Interpreter},
                  value::core::{Value, is_truthy}},
};

/// Maps a unary operator to the method a class may overload for it.
#[must_use]
pub const fn operator_method(op: UnaryOp) -> Option<&'static str> {
    match op {
        UnaryOp::Not => Some("__not__"),
        UnaryOp::BitNot => Some("__invert__"),
        UnaryOp::Increment => Some("__inc__"),
        UnaryOp::Decrement => Some("__dec__"),
        UnaryOp::Negate | UnaryOp::Await => None,
    }
}

impl Interpreter {
    /// Evaluates a unary expression.
    ///
    /// `++`/`--` are value-level: they yield the operand plus or minus one
    /// and do not mutate the operand.
    pub(crate) fn eval_unary(&mut self,
                             op: UnaryOp,
                             operand: &Expr,
                             line: usize)
                             -> EvalResult<Value> {
        let value = self.evaluate(operand)?;

        if let Value::Object(object) = &value
           && let Some(method_name) = operator_method(op)
           && let Some(method) = object.class.find_method(method_name)
        {
            let object = std::rc::Rc::clone(object);
            let bound = self.bind_method(&method, &object);
            return self.call_function(&bound, Vec::new(), line);
        }

        match op {
            UnaryOp::Negate => match value {
                Value::Int(v) => Ok(Value::Int(v.wrapping_neg())),
                Value::Float(v) => Ok(Value::Float(-v)),
                _ => Err(RuntimeError::TypeMismatch { details: "operand must be a number"
                                                                        .to_string(),
                                                      line }),
            },
            UnaryOp::Not => Ok(Value::Bool(!is_truthy(&value))),
            UnaryOp::BitNot => match value {
                Value::Int(v) => Ok(Value::Int(!v)),
                _ => Err(RuntimeError::TypeError { details: "operand must be an integer"
                                                                     .to_string(),
                                                   line }),
            },
            UnaryOp::Increment => match value {
                Value::Int(v) => Ok(Value::Int(v.wrapping_add(1))),
                Value::Float(v) => Ok(Value::Float(v + 1.0)),
                _ => Err(RuntimeError::TypeError { details: "operand must be a number"
                                                                     .to_string(),
                                                   line }),
            },
            UnaryOp::Decrement => match value {
                Value::Int(v) => Ok(Value::Int(v.wrapping_sub(1))),
                Value::Float(v) => Ok(Value::Float(v - 1.0)),
                _ => Err(RuntimeError::TypeError { details: "operand must be a number"
                                                                     .to_string(),
                                                   line }),
            },
            UnaryOp::Await => Err(RuntimeError::NotImplemented { details: "'await' is reserved \
                                                                           but not implemented"
                                                                                    .to_string(),
                                                                 line }),
        }
    }
}
