use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::{Expr, LiteralValue, Stmt},
    error::RuntimeError,
    interpreter::{builtins,
                  gc::GarbageCollector,
                  modules::ModuleSystem,
                  types,
                  value::{core::{Value, is_truthy},
                          environment::Environment}},
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Executed-statement count between generational collections.
pub const GC_STATEMENT_INTERVAL: usize = 1024;
/// Maximum nesting of user-function calls before
/// `RECURSION_DEPTH_EXCEEDED`.
pub const MAX_CALL_DEPTH: usize = 256;

/// Non-local control-flow signal produced by statement execution.
///
/// `break`, `continue` and `return` unwind through the statement visitors as
/// values of this enum rather than as errors, so environment restoration and
/// error propagation stay independent.
#[derive(Debug)]
pub enum Flow {
    /// The statement completed; execution continues with the next one.
    Normal,
    /// Unwinding to the nearest enclosing loop, which stops.
    Break,
    /// Unwinding to the nearest enclosing loop, which starts its next
    /// iteration.
    Continue,
    /// Unwinding to the nearest enclosing user-function call with the
    /// returned value.
    Return(Value),
}

/// The tree-walking evaluator.
///
/// Holds the global scope, the current-environment pointer, the garbage
/// collector tracking the heap cells this evaluator allocates, and the
/// module system. A single `Interpreter` is the persistent state behind a
/// REPL session.
///
/// # Example
/// ```
/// use zelo::interpreter::evaluator::core::Interpreter;
///
/// let mut interpreter = Interpreter::new();
/// let statements = zelo::compile("loc x = 2 + 3;").unwrap();
/// interpreter.interpret(&statements).unwrap();
/// ```
pub struct Interpreter {
    globals:             Rc<RefCell<Environment>>,
    environment:         Rc<RefCell<Environment>>,
    /// The collector tracking instances, user functions and classes.
    pub gc:              GarbageCollector,
    pub(crate) modules:  ModuleSystem,
    statements_executed: usize,
    pub(crate) call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter with the builtin functions installed in a
    /// fresh global environment.
    #[must_use]
    pub fn new() -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        let mut interpreter = Self { globals:             Rc::clone(&globals),
                                     environment:         globals,
                                     gc:                  GarbageCollector::new(),
                                     modules:             ModuleSystem::new(),
                                     statements_executed: 0,
                                     call_depth:          0, };
        builtins::install(&mut interpreter);
        interpreter
    }

    /// The global environment; the collector's root set.
    #[must_use]
    pub fn globals(&self) -> Rc<RefCell<Environment>> {
        Rc::clone(&self.globals)
    }

    /// The environment statements currently execute in.
    #[must_use]
    pub fn environment(&self) -> Rc<RefCell<Environment>> {
        Rc::clone(&self.environment)
    }

    /// Executes a parsed program.
    ///
    /// The collector runs on its statement cadence between top-level
    /// statements, where the environment chain in use is exactly the root
    /// set. A stray `break`/`continue`/`return` reaching the top level is
    /// ignored, ending execution of the remaining statements.
    ///
    /// # Errors
    /// The first uncaught runtime error aborts execution.
    pub fn interpret(&mut self, statements: &[Stmt]) -> EvalResult<()> {
        for statement in statements {
            let flow = self.execute(statement)?;

            if self.statements_executed >= GC_STATEMENT_INTERVAL {
                self.statements_executed = 0;
                let roots = self.globals();
                self.gc.collect_garbage(&roots);
            }

            if !matches!(flow, Flow::Normal) {
                break;
            }
        }
        Ok(())
    }

    /// Executes one statement.
    pub(crate) fn execute(&mut self, statement: &Stmt) -> EvalResult<Flow> {
        self.statements_executed += 1;

        match statement {
            Stmt::Expression { expr, .. } => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            },
            Stmt::Block { statements, .. } => {
                let environment = Environment::child_of(&self.environment());
                self.execute_block(statements, environment)
            },
            Stmt::VarDecl { name,
                            annotation,
                            initializer,
                            is_const,
                            line, } => {
                self.execute_var_decl(name, annotation.as_ref(), initializer.as_ref(), *is_const,
                                      *line)
            },
            Stmt::FunctionDecl(declaration) => self.execute_function_decl(declaration),
            Stmt::ClassDecl { name,
                              superclass,
                              methods,
                              line, } => {
                self.execute_class_decl(name, superclass.as_deref(), methods, *line)
            },
            Stmt::If { condition,
                       then_branch,
                       else_branch,
                       .. } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            },
            Stmt::While { condition, body, .. } => self.execute_while(condition, body),
            Stmt::For { variable,
                        iterable,
                        body,
                        line, } => self.execute_for(variable, iterable, body, *line),
            Stmt::Return { value, .. } => {
                let result = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(result))
            },
            Stmt::Break { .. } => Ok(Flow::Break),
            Stmt::Continue { .. } => Ok(Flow::Continue),
            Stmt::Import { module,
                           imports,
                           alias,
                           line, } => {
                self.execute_import(module, imports, alias.as_deref(), *line)
            },
            Stmt::Export { names, line } => self.execute_export(names, *line),
            Stmt::Namespace { name, body, .. } => self.execute_namespace(name, body),
            Stmt::TryCatch { try_block,
                             catch_var,
                             catch_block,
                             .. } => self.execute_try_catch(try_block, catch_var, catch_block),
            Stmt::Throw { expr, line } => {
                let value = self.evaluate(expr)?;
                Err(RuntimeError::Thrown { value, line: *line })
            },
        }
    }

    /// Executes statements with `environment` installed as current,
    /// restoring the previous environment on every exit path: normal
    /// completion, a non-local signal, or an error.
    pub(crate) fn execute_block(&mut self,
                                statements: &[Stmt],
                                environment: Rc<RefCell<Environment>>)
                                -> EvalResult<Flow> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(Flow::Normal);
        for statement in statements {
            match self.execute(statement) {
                Ok(Flow::Normal) => {},
                other => {
                    result = other;
                    break;
                },
            }
        }

        self.environment = previous;
        result
    }

    /// Evaluates an expression to a value.
    ///
    /// Sub-expressions evaluate left to right: for a binary operation the
    /// left operand first, then the right operand, then the operator.
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(Self::eval_literal(value)),
            Expr::Identifier { name, line } => {
                self.environment
                    .borrow()
                    .get(name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone(),
                                                                     line: *line, })
            },
            Expr::Unary { op, operand, line } => self.eval_unary(*op, operand, *line),
            Expr::Binary { left,
                           op,
                           right,
                           line, } => self.eval_binary(left, *op, right, *line),
            Expr::Array { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(values.into())
            },
            Expr::Dict { entries, line } => self.eval_dict(entries, *line),
            Expr::Call { callee,
                         arguments,
                         line, } => self.eval_call(callee, arguments, *line),
            Expr::Member { object,
                           property,
                           line, } => self.eval_member(object, property, *line),
            Expr::Index { object, index, line } => self.eval_index(object, index, *line),
            Expr::Slice { object,
                          start,
                          stop,
                          step,
                          line, } => {
                self.eval_slice(object, start.as_deref(), stop.as_deref(), step.as_deref(), *line)
            },
            Expr::Conditional { condition,
                                then_expr,
                                else_expr,
                                .. } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.evaluate(then_expr)
                } else {
                    self.evaluate(else_expr)
                }
            },
            Expr::Assign { target, op, value, line } => self.eval_assign(target, *op, value, *line),
            Expr::Cast { expr, annotation, line } => {
                let value = self.evaluate(expr)?;
                types::cast_value(&value, annotation, *line)
            },
        }
    }

    /// Converts a literal node into a value; literals never fail.
    fn eval_literal(value: &LiteralValue) -> Value {
        Value::from(value)
    }

    /// Evaluates a dictionary literal; keys must evaluate to strings.
    fn eval_dict(&mut self, entries: &[(Expr, Expr)], line: usize) -> EvalResult<Value> {
        let mut dict = std::collections::HashMap::with_capacity(entries.len());

        for (key_expr, value_expr) in entries {
            let key = match self.evaluate(key_expr)? {
                Value::Str(key) => key,
                other => {
                    return Err(RuntimeError::TypeError { details: format!("dictionary key must \
                                                                           be a string, got {}",
                                                                          other.type_name()),
                                                         line });
                },
            };
            dict.insert(key, self.evaluate(value_expr)?);
        }

        Ok(Value::Dict(Rc::new(RefCell::new(dict))))
    }
}
