use std::rc::Rc;

use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{evaluator::core::{EvalResult, Flow, Interpreter, MAX_CALL_DEPTH},
                  types,
                  value::{class::{Class, Instance},
                          core::Value,
                          environment::Environment,
                          function::Function}},
};

impl Interpreter {
    /// Evaluates a call expression.
    ///
    /// The callee must evaluate to a function or a class; the argument
    /// count must equal the callee's arity (builtins may declare `-1` for
    /// variadic).
    pub(crate) fn eval_call(&mut self,
                            callee: &Expr,
                            arguments: &[Expr],
                            line: usize)
                            -> EvalResult<Value> {
        let callee_value = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.evaluate(argument)?);
        }

        match callee_value {
            Value::Function(function) => {
                check_arity(function.arity(), args.len(), line)?;
                self.call_function(&function, args, line)
            },
            Value::Class(class) => {
                check_arity(class.arity(), args.len(), line)?;
                self.instantiate(&class, args, line)
            },
            _ => Err(RuntimeError::TypeError { details: "can only call functions and classes"
                                                                 .to_string(),
                                               line }),
        }
    }

    /// Calls a function value with evaluated arguments.
    ///
    /// For a user function: a child environment of the closure is created,
    /// parameters bind positionally (missing trailing parameters bind
    /// `null`), and the body executes in it. A `return` signal yields the
    /// return value, fall-through yields `null`, and constructors always
    /// yield `this`.
    pub(crate) fn call_function(&mut self,
                                function: &Rc<Function>,
                                args: Vec<Value>,
                                line: usize)
                                -> EvalResult<Value> {
        match function.as_ref() {
            Function::Builtin { func, .. } => func(self, &args, line),
            Function::User { declaration,
                             is_constructor,
                             .. } => {
                if self.call_depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::RecursionDepthExceeded { line });
                }

                let closure = function.closure();
                let environment = Environment::child_of(&closure);

                for (index, param) in declaration.params.iter().enumerate() {
                    let value = args.get(index).cloned().unwrap_or(Value::Null);
                    if let Some(annotation) = &param.annotation
                       && !types::check_type(&value, annotation)
                    {
                        return Err(RuntimeError::TypeMismatch { details: format!("argument \
                                                                                  '{}' does \
                                                                                  not match \
                                                                                  {annotation}",
                                                                                 param.name),
                                                                line });
                    }
                    environment.borrow_mut().define(&param.name, value);
                }

                self.call_depth += 1;
                let flow = self.execute_block(&declaration.body, environment);
                self.call_depth -= 1;

                let result = match flow? {
                    Flow::Return(value) => value,
                    _ => Value::Null,
                };

                if *is_constructor {
                    return closure.borrow().get("this").ok_or_else(|| {
                        RuntimeError::TypeError { details: "constructor lost its instance"
                                                                    .to_string(),
                                                  line }
                    });
                }

                if let Some(annotation) = &declaration.return_type
                   && !types::check_type(&result, annotation)
                {
                    return Err(RuntimeError::TypeMismatch { details: format!("return value of \
                                                                              type {} does not \
                                                                              match {annotation}",
                                                                             result.type_name()),
                                                            line });
                }

                Ok(result)
            },
        }
    }

    /// Instantiates a class: allocates the instance, registers it with the
    /// collector, and runs a bound `__init__` when the class has one.
    pub(crate) fn instantiate(&mut self,
                              class: &Rc<Class>,
                              args: Vec<Value>,
                              line: usize)
                              -> EvalResult<Value> {
        let instance = Rc::new(Instance::new(Rc::clone(class)));
        self.gc.register_object(&instance);

        if let Some(initializer) = class.find_method("__init__") {
            let bound = self.bind_method(&initializer, &instance);
            self.call_function(&bound, args, line)?;
        }

        Ok(Value::Object(instance))
    }

    /// Produces a bound method: a fresh function whose closure is a new
    /// child environment of the method's closure with `this` defined.
    ///
    /// The fresh environment is what keeps a method's closure from ever
    /// aliasing the class's method table. The bound function registers with
    /// the collector like any other allocation.
    pub(crate) fn bind_method(&mut self,
                              method: &Rc<Function>,
                              instance: &Rc<Instance>)
                              -> Rc<Function> {
        match method.as_ref() {
            Function::User { declaration,
                             is_constructor,
                             .. } => {
                let environment = Environment::child_of(&method.closure());
                environment.borrow_mut()
                           .define("this", Value::Object(Rc::clone(instance)));

                let bound = Rc::new(Function::user(Rc::clone(declaration),
                                                   environment,
                                                   *is_constructor));
                self.gc.register_function(&bound);
                bound
            },
            Function::Builtin { .. } => Rc::clone(method),
        }
    }

    /// Evaluates member access.
    ///
    /// Instances follow the field policy below; environments (module
    /// exports, namespaces) resolve the name directly.
    pub(crate) fn eval_member(&mut self,
                              object: &Expr,
                              property: &str,
                              line: usize)
                              -> EvalResult<Value> {
        match self.evaluate(object)? {
            Value::Object(instance) => self.instance_get(&instance, property, line),
            Value::Environment(env) => {
                let value = env.borrow().get(property);
                value.ok_or_else(|| RuntimeError::UndefinedProperty { name: property.to_string(),
                                                                      line })
            },
            other => Err(RuntimeError::TypeError { details: format!("{} has no properties",
                                                                    other.type_name()),
                                                   line }),
        }
    }

    /// Field access policy: own fields first; then a method, returned
    /// bound; then the class's `__getattr__` invoked with the name.
    pub(crate) fn instance_get(&mut self,
                               instance: &Rc<Instance>,
                               name: &str,
                               line: usize)
                               -> EvalResult<Value> {
        if let Some(value) = instance.field(name) {
            return Ok(value);
        }

        if let Some(method) = instance.class.find_method(name) {
            let bound = self.bind_method(&method, instance);
            return Ok(Value::Function(bound));
        }

        if let Some(getattr) = instance.class.find_method("__getattr__") {
            let bound = self.bind_method(&getattr, instance);
            return self.call_function(&bound, vec![Value::Str(name.to_string())], line);
        }

        Err(RuntimeError::UndefinedProperty { name: name.to_string(),
                                              line })
    }

    /// Field assignment policy: `__setattr__` when the class defines it,
    /// otherwise a direct field write.
    pub(crate) fn instance_set(&mut self,
                               instance: &Rc<Instance>,
                               name: &str,
                               value: Value,
                               line: usize)
                               -> EvalResult<()> {
        if let Some(setattr) = instance.class.find_method("__setattr__") {
            let bound = self.bind_method(&setattr, instance);
            self.call_function(&bound, vec![Value::Str(name.to_string()), value], line)?;
            return Ok(());
        }

        instance.set_field(name, value);
        Ok(())
    }
}

/// Checks a call-site argument count against an arity; `-1` is variadic.
fn check_arity(arity: i32, supplied: usize, line: usize) -> EvalResult<()> {
    if arity >= 0 && supplied != arity as usize {
        return Err(RuntimeError::TypeError { details: format!("expected {arity} arguments but \
                                                               got {supplied}"),
                                             line });
    }
    Ok(())
}
