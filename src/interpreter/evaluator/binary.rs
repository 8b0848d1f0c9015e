use crate::{
    ast::{BinaryOp, Expr},
    error::RuntimeError,
    interpreter::{evaluator::core::{EvalResult, Interpreter},
                  value::core::{Value, is_equal, is_truthy}},
};

/// Maps a binary operator to the method a class may overload for it.
///
/// Dispatch consults the left operand only; `1 + obj` never reaches
/// `obj.__add__`.
#[must_use]
pub const fn operator_method(op: BinaryOp) -> Option<&'static str> {
    match op {
        BinaryOp::Add => Some("__add__"),
        BinaryOp::Sub => Some("__sub__"),
        BinaryOp::Mul => Some("__mul__"),
        BinaryOp::Div => Some("__div__"),
        BinaryOp::Mod => Some("__mod__"),
        BinaryOp::BitAnd => Some("__and__"),
        BinaryOp::BitOr => Some("__or__"),
        BinaryOp::BitXor => Some("__xor__"),
        BinaryOp::Shl => Some("__lshift__"),
        BinaryOp::Shr => Some("__rshift__"),
        BinaryOp::Equal => Some("__eq__"),
        BinaryOp::NotEqual => Some("__ne__"),
        BinaryOp::Less => Some("__lt__"),
        BinaryOp::LessEqual => Some("__le__"),
        BinaryOp::Greater => Some("__gt__"),
        BinaryOp::GreaterEqual => Some("__ge__"),
        BinaryOp::And | BinaryOp::Or => None,
    }
}

impl Interpreter {
    /// Evaluates a binary expression: left operand, then right operand,
    /// then the operator.
    pub(crate) fn eval_binary(&mut self,
                              left: &Expr,
                              op: BinaryOp,
                              right: &Expr,
                              line: usize)
                              -> EvalResult<Value> {
        let lhs = self.evaluate(left)?;
        let rhs = self.evaluate(right)?;
        self.apply_binary(op, lhs, rhs, line)
    }

    /// Applies a binary operator to evaluated operands.
    ///
    /// If the left operand is an instance whose class overloads the
    /// operator, the overload is called bound with the right operand.
    /// Otherwise numeric promotion applies: `+ - *` stay integral on two
    /// ints, `/` and `%` always compute in float, mixed operands promote
    /// to float, and `+` with a string operand concatenates.
    pub(crate) fn apply_binary(&mut self,
                               op: BinaryOp,
                               left: Value,
                               right: Value,
                               line: usize)
                               -> EvalResult<Value> {
        if let Value::Object(object) = &left
           && let Some(method_name) = operator_method(op)
           && let Some(method) = object.class.find_method(method_name)
        {
            let object = std::rc::Rc::clone(object);
            let bound = self.bind_method(&method, &object);
            return self.call_function(&bound, vec![right], line);
        }

        match op {
            BinaryOp::Add => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
                (Value::Str(_), _) | (_, Value::Str(_)) => {
                    Ok(Value::Str(format!("{left}{right}")))
                },
                _ if left.is_number() && right.is_number() => {
                    Ok(Value::Float(left.as_f64() + right.as_f64()))
                },
                _ => Err(RuntimeError::TypeError { details: "operands of '+' must be two \
                                                             numbers or at least one string"
                                                                      .to_string(),
                                                   line }),
            },
            BinaryOp::Sub => {
                check_number_operands(&left, &right, line)?;
                match (&left, &right) {
                    (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(*b))),
                    _ => Ok(Value::Float(left.as_f64() - right.as_f64())),
                }
            },
            BinaryOp::Mul => {
                check_number_operands(&left, &right, line)?;
                match (&left, &right) {
                    (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(*b))),
                    _ => Ok(Value::Float(left.as_f64() * right.as_f64())),
                }
            },
            BinaryOp::Div => {
                check_number_operands(&left, &right, line)?;
                if right.as_f64() == 0.0 {
                    return Err(RuntimeError::DivisionByZero { line });
                }
                Ok(Value::Float(left.as_f64() / right.as_f64()))
            },
            BinaryOp::Mod => {
                check_number_operands(&left, &right, line)?;
                if right.as_f64() == 0.0 {
                    return Err(RuntimeError::DivisionByZero { line });
                }
                // fmod semantics: the result keeps the dividend's sign.
                Ok(Value::Float(left.as_f64() % right.as_f64()))
            },
            BinaryOp::Equal => Ok(Value::Bool(is_equal(&left, &right))),
            BinaryOp::NotEqual => Ok(Value::Bool(!is_equal(&left, &right))),
            BinaryOp::Less => {
                check_number_operands(&left, &right, line)?;
                Ok(Value::Bool(left.as_f64() < right.as_f64()))
            },
            BinaryOp::LessEqual => {
                check_number_operands(&left, &right, line)?;
                Ok(Value::Bool(left.as_f64() <= right.as_f64()))
            },
            BinaryOp::Greater => {
                check_number_operands(&left, &right, line)?;
                Ok(Value::Bool(left.as_f64() > right.as_f64()))
            },
            BinaryOp::GreaterEqual => {
                check_number_operands(&left, &right, line)?;
                Ok(Value::Bool(left.as_f64() >= right.as_f64()))
            },
            BinaryOp::BitAnd => {
                let (a, b) = check_int_operands(&left, &right, line)?;
                Ok(Value::Int(a & b))
            },
            BinaryOp::BitOr => {
                let (a, b) = check_int_operands(&left, &right, line)?;
                Ok(Value::Int(a | b))
            },
            BinaryOp::BitXor => {
                let (a, b) = check_int_operands(&left, &right, line)?;
                Ok(Value::Int(a ^ b))
            },
            BinaryOp::Shl => {
                let (a, b) = check_int_operands(&left, &right, line)?;
                let shift = check_shift_amount(b, line)?;
                Ok(Value::Int(a.wrapping_shl(shift)))
            },
            BinaryOp::Shr => {
                let (a, b) = check_int_operands(&left, &right, line)?;
                let shift = check_shift_amount(b, line)?;
                Ok(Value::Int(a.wrapping_shr(shift)))
            },
            BinaryOp::And => Ok(Value::Bool(is_truthy(&left) && is_truthy(&right))),
            BinaryOp::Or => Ok(Value::Bool(is_truthy(&left) || is_truthy(&right))),
        }
    }
}

/// Requires both operands to be numbers.
fn check_number_operands(left: &Value, right: &Value, line: usize) -> EvalResult<()> {
    if left.is_number() && right.is_number() {
        return Ok(());
    }
    Err(RuntimeError::TypeMismatch { details: "operands must be numbers".to_string(),
                                     line })
}

/// Requires both operands to be integers, returning them unwrapped.
fn check_int_operands(left: &Value, right: &Value, line: usize) -> EvalResult<(i64, i64)> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::TypeError { details: "operands must be integers".to_string(),
                                           line }),
    }
}

/// Requires a shift amount to be within the 64-bit word.
fn check_shift_amount(amount: i64, line: usize) -> EvalResult<u32> {
    if (0..64).contains(&amount) {
        Ok(amount as u32)
    } else {
        Err(RuntimeError::InvalidOperation { details: format!("shift amount {amount} out of \
                                                               range"),
                                             line })
    }
}
