use std::{cell::RefCell, io::Write, rc::Rc};

use crate::{
    ast::TypeKind,
    error::RuntimeError,
    interpreter::{evaluator::core::{EvalResult, Interpreter},
                  types,
                  value::{class::Instance,
                          core::{Value, ValueArray, ValueDict, is_truthy},
                          function::{BuiltinFn, Function}}},
};

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides a name, an arity (`-1` means variadic) and the
/// native implementation. The macro produces `BUILTIN_TABLE` for
/// installation and `BUILTIN_FUNCTIONS`, the public list of builtin names.
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:  &'static str,
            arity: i32,
            func:  BuiltinFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
        /// Names of every installed builtin.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "print"   => { arity: -1, func: print },
    "typeof"  => { arity: 1,  func: typeof_value },
    "len"     => { arity: 1,  func: len },
    "int"     => { arity: 1,  func: |_, args, line| types::cast_basic(&args[0], TypeKind::Int, line) },
    "float"   => { arity: 1,  func: |_, args, line| types::cast_basic(&args[0], TypeKind::Float, line) },
    "str"     => { arity: 1,  func: |_, args, line| types::cast_basic(&args[0], TypeKind::Str, line) },
    "bool"    => { arity: 1,  func: |_, args, line| types::cast_basic(&args[0], TypeKind::Bool, line) },
    "assert"  => { arity: 1,  func: assert_value },
    "panic"   => { arity: 1,  func: panic_value },
    "range"   => { arity: -1, func: range },
    "abs"     => { arity: 1,  func: abs },
    "min"     => { arity: 2,  func: |_, args, line| min_max("min", args, line) },
    "max"     => { arity: 2,  func: |_, args, line| min_max("max", args, line) },
    "chr"     => { arity: 1,  func: chr },
    "ord"     => { arity: 1,  func: ord },
    "repr"    => { arity: 1,  func: repr },
    "isinstance" => { arity: 2, func: isinstance },
    "push"    => { arity: 2,  func: push },
    "pop"     => { arity: 1,  func: pop },
    "keys"    => { arity: 1,  func: keys },
    "values"  => { arity: 1,  func: dict_values },
    "has_key" => { arity: 2,  func: has_key },
    "clone"   => { arity: 1,  func: clone_value },
    "object_fields"  => { arity: 1, func: object_fields },
    "object_methods" => { arity: 1, func: object_methods },
    "is_int"      => { arity: 1, func: |_, args, _| Ok(Value::Bool(matches!(args[0], Value::Int(_)))) },
    "is_float"    => { arity: 1, func: |_, args, _| Ok(Value::Bool(matches!(args[0], Value::Float(_)))) },
    "is_bool"     => { arity: 1, func: |_, args, _| Ok(Value::Bool(matches!(args[0], Value::Bool(_)))) },
    "is_string"   => { arity: 1, func: |_, args, _| Ok(Value::Bool(matches!(args[0], Value::Str(_)))) },
    "is_array"    => { arity: 1, func: |_, args, _| Ok(Value::Bool(matches!(args[0], Value::Array(_)))) },
    "is_dict"     => { arity: 1, func: |_, args, _| Ok(Value::Bool(matches!(args[0], Value::Dict(_)))) },
    "is_object"   => { arity: 1, func: |_, args, _| Ok(Value::Bool(matches!(args[0], Value::Object(_)))) },
    "is_function" => { arity: 1, func: |_, args, _| Ok(Value::Bool(matches!(args[0], Value::Function(_)))) },
    "is_null"     => { arity: 1, func: |_, args, _| Ok(Value::Bool(matches!(args[0], Value::Null))) },
    "input"   => { arity: -1, func: input },
    "exit"    => { arity: -1, func: exit },
    "require" => { arity: 1,  func: require },
    "include" => { arity: 1,  func: include },
}

/// Installs every builtin into the interpreter's global environment and
/// registers the function cells with the collector.
pub fn install(interpreter: &mut Interpreter) {
    let globals = interpreter.globals();

    for def in BUILTIN_TABLE {
        let function = Rc::new(Function::Builtin { name:  def.name,
                                                   arity: def.arity,
                                                   func:  def.func, });
        interpreter.gc.register_function(&function);
        globals.borrow_mut()
               .define(def.name, Value::Function(function));
    }
}

fn print(_: &mut Interpreter, args: &[Value], _: usize) -> EvalResult<Value> {
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::Null)
}

fn typeof_value(_: &mut Interpreter, args: &[Value], _: usize) -> EvalResult<Value> {
    Ok(Value::Str(args[0].type_name().to_string()))
}

fn len(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Str(text) => Ok(Value::Int(text.len() as i64)),
        Value::Array(array) => Ok(Value::Int(array.borrow().len() as i64)),
        Value::Dict(dict) => Ok(Value::Int(dict.borrow().len() as i64)),
        other => Err(RuntimeError::InvalidArgument { details: format!("len() does not accept \
                                                                       {}",
                                                                      other.type_name()),
                                                     line }),
    }
}

fn assert_value(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    if is_truthy(&args[0]) {
        Ok(Value::Null)
    } else {
        Err(RuntimeError::AssertionFailed { line })
    }
}

fn panic_value(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    Err(RuntimeError::Panic { message: args[0].to_string(),
                              line })
}

fn range(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let bounds: Vec<i64> = args.iter()
                               .map(|arg| match arg {
                                   Value::Int(v) => Ok(*v),
                                   other => Err(RuntimeError::InvalidArgument {
                                       details: format!("range() expects integers, got {}",
                                                        other.type_name()),
                                       line,
                                   }),
                               })
                               .collect::<EvalResult<_>>()?;

    let (start, stop, step) = match bounds.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => {
            return Err(RuntimeError::InvalidArgument { details: "range() takes 1 to 3 \
                                                                 arguments".to_string(),
                                                       line });
        },
    };

    if step == 0 {
        return Err(RuntimeError::InvalidArgument { details: "range() step cannot be zero"
                                                                     .to_string(),
                                                   line });
    }

    let mut values = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        values.push(Value::Int(current));
        current += step;
    }
    Ok(values.into())
}

fn abs(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Int(v) => Ok(Value::Int(v.wrapping_abs())),
        Value::Float(v) => Ok(Value::Float(v.abs())),
        other => Err(RuntimeError::InvalidArgument { details: format!("abs() expects a \
                                                                       number, got {}",
                                                                      other.type_name()),
                                                     line }),
    }
}

fn min_max(which: &str, args: &[Value], line: usize) -> EvalResult<Value> {
    let (a, b) = (&args[0], &args[1]);
    if !a.is_number() || !b.is_number() {
        return Err(RuntimeError::InvalidArgument { details: format!("{which}() expects \
                                                                     numbers"),
                                                   line });
    }

    let first_wins = if which == "min" {
        a.as_f64() <= b.as_f64()
    } else {
        a.as_f64() >= b.as_f64()
    };
    Ok(if first_wins { a.clone() } else { b.clone() })
}

fn chr(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Int(v) => crate::util::num::i64_to_char(*v)
            .map(|c| Value::Str(c.to_string()))
            .ok_or_else(|| RuntimeError::InvalidArgument {
                details: format!("chr() argument {v} is not a valid character"),
                line,
            }),
        other => Err(RuntimeError::InvalidArgument { details: format!("chr() expects an \
                                                                       integer, got {}",
                                                                      other.type_name()),
                                                     line }),
    }
}

fn ord(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Str(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
                _ => Err(RuntimeError::InvalidArgument { details: "ord() expects a single \
                                                                   character".to_string(),
                                                         line }),
            }
        },
        other => Err(RuntimeError::InvalidArgument { details: format!("ord() expects a \
                                                                       string, got {}",
                                                                      other.type_name()),
                                                     line }),
    }
}

/// Developer-facing rendering: strings come back quoted, everything else
/// stringifies the way `print` does.
fn repr(_: &mut Interpreter, args: &[Value], _: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Str(text) => Ok(Value::Str(format!("\"{text}\""))),
        other => Ok(Value::Str(other.to_string())),
    }
}

/// Checks a value's dynamic kind against a type-name string; `|` separates
/// union alternatives, so `isinstance(x, "int|float")` accepts either.
fn isinstance(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let Value::Str(type_str) = &args[1] else {
        return Err(RuntimeError::InvalidArgument { details: "isinstance() second argument \
                                                             must be a string".to_string(),
                                                   line });
    };

    for part in type_str.split('|') {
        let matched = match part {
            "null" => matches!(args[0], Value::Null),
            "int" => matches!(args[0], Value::Int(_)),
            "float" => matches!(args[0], Value::Float(_)),
            "bool" => matches!(args[0], Value::Bool(_)),
            "string" => matches!(args[0], Value::Str(_)),
            "array" => matches!(args[0], Value::Array(_)),
            "dict" => matches!(args[0], Value::Dict(_)),
            "object" => matches!(args[0], Value::Object(_)),
            "function" => matches!(args[0], Value::Function(_)),
            "class" => matches!(args[0], Value::Class(_)),
            other => {
                return Err(RuntimeError::InvalidArgument { details: format!("unknown type: \
                                                                             {other}"),
                                                           line });
            },
        };
        if matched {
            return Ok(Value::Bool(true));
        }
    }

    Ok(Value::Bool(false))
}

fn object_fields(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let instance = expect_object(&args[0], "object_fields()", line)?;
    let names: Vec<Value> = instance.fields
                                    .borrow()
                                    .keys()
                                    .map(|name| Value::Str(name.clone()))
                                    .collect();
    Ok(names.into())
}

/// Lists the method names of the value's own class; inherited methods are
/// not included.
fn object_methods(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let instance = expect_object(&args[0], "object_methods()", line)?;
    let names: Vec<Value> = instance.class
                                    .methods
                                    .borrow()
                                    .keys()
                                    .map(|name| Value::Str(name.clone()))
                                    .collect();
    Ok(names.into())
}

fn push(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let array = expect_array(&args[0], "push()", line)?;
    array.borrow_mut().push(args[1].clone());
    Ok(args[0].clone())
}

fn pop(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let array = expect_array(&args[0], "pop()", line)?;
    let popped = array.borrow_mut().pop();
    popped.ok_or(RuntimeError::InvalidArgument { details: "pop() from an empty array"
                                                                   .to_string(),
                                                 line })
}

fn keys(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let dict = expect_dict(&args[0], "keys()", line)?;
    let keys: Vec<Value> = dict.borrow()
                               .keys()
                               .map(|key| Value::Str(key.clone()))
                               .collect();
    Ok(keys.into())
}

fn dict_values(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let dict = expect_dict(&args[0], "values()", line)?;
    let values: Vec<Value> = dict.borrow().values().cloned().collect();
    Ok(values.into())
}

fn has_key(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let dict = expect_dict(&args[0], "has_key()", line)?;
    match &args[1] {
        Value::Str(key) => Ok(Value::Bool(dict.borrow().contains_key(key))),
        other => Err(RuntimeError::InvalidArgument { details: format!("has_key() expects a \
                                                                       string key, got {}",
                                                                      other.type_name()),
                                                     line }),
    }
}

/// Shallow clone: arrays and dictionaries get fresh cells with the same
/// elements; instances get a fresh field map on the same class.
fn clone_value(interpreter: &mut Interpreter, args: &[Value], _: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Array(array) => Ok(Value::Array(Rc::new(RefCell::new(array.borrow().clone())))),
        Value::Dict(dict) => Ok(Value::Dict(Rc::new(RefCell::new(dict.borrow().clone())))),
        Value::Object(instance) => {
            let copy = Rc::new(Instance::new(Rc::clone(&instance.class)));
            *copy.fields.borrow_mut() = instance.fields.borrow().clone();
            interpreter.gc.register_object(&copy);
            Ok(Value::Object(copy))
        },
        other => Ok(other.clone()),
    }
}

fn input(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    if let Some(prompt) = args.first() {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|error| RuntimeError::InvalidArgument { details: format!("input() failed: \
                                                                           {error}"),
                                                         line })?;
    while buffer.ends_with('\n') || buffer.ends_with('\r') {
        buffer.pop();
    }
    Ok(Value::Str(buffer))
}

fn exit(_: &mut Interpreter, args: &[Value], _: usize) -> EvalResult<Value> {
    let code = match args.first() {
        Some(Value::Int(code)) => *code as i32,
        _ => 0,
    };
    std::process::exit(code);
}

fn require(interpreter: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let path = expect_str(&args[0], "require()", line)?;
    let resolved = interpreter.modules.resolve(&path, line)?;
    let environment = interpreter.require_module(&resolved, line)?;
    Ok(Value::Environment(environment))
}

fn include(interpreter: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let path = expect_str(&args[0], "include()", line)?;
    let resolved = interpreter.modules.resolve(&path, line)?;
    let environment = interpreter.load_module(&resolved, line)?;
    Ok(Value::Environment(environment))
}

fn expect_array(value: &Value, what: &str, line: usize) -> EvalResult<ValueArray> {
    match value {
        Value::Array(array) => Ok(Rc::clone(array)),
        other => Err(RuntimeError::InvalidArgument { details: format!("{what} expects an \
                                                                       array, got {}",
                                                                      other.type_name()),
                                                     line }),
    }
}

fn expect_dict(value: &Value, what: &str, line: usize) -> EvalResult<ValueDict> {
    match value {
        Value::Dict(dict) => Ok(Rc::clone(dict)),
        other => Err(RuntimeError::InvalidArgument { details: format!("{what} expects a \
                                                                       dict, got {}",
                                                                      other.type_name()),
                                                     line }),
    }
}

fn expect_object(value: &Value, what: &str, line: usize) -> EvalResult<Rc<Instance>> {
    match value {
        Value::Object(instance) => Ok(Rc::clone(instance)),
        other => Err(RuntimeError::InvalidArgument { details: format!("{what} expects an \
                                                                       object, got {}",
                                                                      other.type_name()),
                                                     line }),
    }
}

fn expect_str(value: &Value, what: &str, line: usize) -> EvalResult<String> {
    match value {
        Value::Str(text) => Ok(text.clone()),
        other => Err(RuntimeError::InvalidArgument { details: format!("{what} expects a \
                                                                       string, got {}",
                                                                      other.type_name()),
                                                     line }),
    }
}
