use std::{cell::RefCell, collections::HashMap, path::Path, rc::Rc};

use crate::{
    ast::{Expr, FunctionDecl, Stmt, TypeAnnotation},
    error::RuntimeError,
    interpreter::{evaluator::core::{EvalResult, Flow, Interpreter},
                  lexer::tokenize,
                  macro_expander::MacroTable,
                  parser::core::Parser,
                  types,
                  value::{class::Class,
                          core::{Value, is_truthy},
                          environment::Environment,
                          function::Function}},
};

impl Interpreter {
    /// Executes a `loc`/`const` declaration.
    ///
    /// The annotation, when present, is checked against the initialised
    /// value; a mismatch fails with `TYPE_MISMATCH`.
    pub(crate) fn execute_var_decl(&mut self,
                                   name: &str,
                                   annotation: Option<&TypeAnnotation>,
                                   initializer: Option<&Expr>,
                                   is_const: bool,
                                   line: usize)
                                   -> EvalResult<Flow> {
        let value = match initializer {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Null,
        };

        if let Some(annotation) = annotation
           && !types::check_type(&value, annotation)
        {
            return Err(RuntimeError::TypeMismatch { details: format!("value of type {} does \
                                                                      not match {annotation}",
                                                                     value.type_name()),
                                                    line });
        }

        let environment = self.environment();
        if is_const {
            environment.borrow_mut().define_const(name, value);
        } else {
            environment.borrow_mut().define(name, value);
        }
        Ok(Flow::Normal)
    }

    /// Executes a function declaration: the created function closes over
    /// the environment it was declared in.
    pub(crate) fn execute_function_decl(&mut self,
                                        declaration: &Rc<FunctionDecl>)
                                        -> EvalResult<Flow> {
        let function = Rc::new(Function::user(Rc::clone(declaration), self.environment(), false));
        self.gc.register_function(&function);
        self.environment()
            .borrow_mut()
            .define(&declaration.name, Value::Function(function));
        Ok(Flow::Normal)
    }

    /// Executes a class declaration in two phases so methods can reference
    /// the class being defined: bind the name to `null`, build the method
    /// table, then rebind the name to the class.
    pub(crate) fn execute_class_decl(&mut self,
                                     name: &str,
                                     superclass: Option<&str>,
                                     methods: &[Rc<FunctionDecl>],
                                     line: usize)
                                     -> EvalResult<Flow> {
        let superclass = match superclass {
            Some(super_name) => {
                let value = self.environment().borrow().get(super_name).ok_or_else(|| {
                                RuntimeError::UndefinedVariable { name: super_name.to_string(),
                                                                  line }
                            })?;
                match value {
                    Value::Class(class) => Some(class),
                    other => {
                        return Err(RuntimeError::TypeError { details: format!("superclass must \
                                                                               be a class, got \
                                                                               {}",
                                                                              other.type_name()),
                                                             line });
                    },
                }
            },
            None => None,
        };

        self.environment().borrow_mut().define(name, Value::Null);

        let mut table = HashMap::with_capacity(methods.len());
        for declaration in methods {
            let is_constructor = declaration.name == "__init__";
            let method = Rc::new(Function::user(Rc::clone(declaration),
                                                self.environment(),
                                                is_constructor));
            self.gc.register_function(&method);
            table.insert(declaration.name.clone(), method);
        }

        let class = Rc::new(Class::new(name.to_string(), superclass, table));
        self.gc.register_class(&class);
        self.environment()
            .borrow_mut()
            .assign(name, Value::Class(class), line)?;
        Ok(Flow::Normal)
    }

    /// Executes a `while` loop; `break` and `continue` signals terminate
    /// here, `return` keeps unwinding.
    pub(crate) fn execute_while(&mut self, condition: &Expr, body: &Stmt) -> EvalResult<Flow> {
        while is_truthy(&self.evaluate(condition)?) {
            match self.execute(body)? {
                Flow::Normal | Flow::Continue => {},
                Flow::Break => break,
                returning @ Flow::Return(_) => return Ok(returning),
            }
        }
        Ok(Flow::Normal)
    }

    /// Executes an iterator-style `for` loop over an array.
    ///
    /// The loop variable is defined, not assigned, in a fresh scope each
    /// iteration, so closures created in the body capture that iteration's
    /// element.
    pub(crate) fn execute_for(&mut self,
                              variable: &str,
                              iterable: &Expr,
                              body: &Stmt,
                              line: usize)
                              -> EvalResult<Flow> {
        let iterable_value = self.evaluate(iterable)?;
        let Value::Array(array) = iterable_value else {
            return Err(RuntimeError::TypeError { details: format!("for loop requires an \
                                                                   array, got {}",
                                                                  iterable_value.type_name()),
                                                 line });
        };

        let mut index = 0;
        loop {
            let element = {
                let items = array.borrow();
                match items.get(index) {
                    Some(element) => element.clone(),
                    None => break,
                }
            };
            index += 1;

            let environment = Environment::child_of(&self.environment());
            environment.borrow_mut().define(variable, element);

            match self.execute_block(std::slice::from_ref(body), environment)? {
                Flow::Normal | Flow::Continue => {},
                Flow::Break => break,
                returning @ Flow::Return(_) => return Ok(returning),
            }
        }
        Ok(Flow::Normal)
    }

    /// Executes an `import` statement.
    ///
    /// The module's exports bind into the current environment, into the
    /// named subset when an import list was given, or under an alias as a
    /// first-class environment value.
    pub(crate) fn execute_import(&mut self,
                                 module: &str,
                                 imports: &[String],
                                 alias: Option<&str>,
                                 line: usize)
                                 -> EvalResult<Flow> {
        let resolved = self.modules.resolve(module, line)?;
        let module_env = self.require_module(&resolved, line)?;
        let exports = module_exports(&module_env);

        if imports.is_empty() {
            match alias {
                Some(alias) => {
                    self.environment()
                        .borrow_mut()
                        .define(alias, Value::Environment(exports));
                },
                None => {
                    let bindings: Vec<(String, Value)> =
                        exports.borrow()
                               .values()
                               .iter()
                               .map(|(name, value)| (name.clone(), value.clone()))
                               .collect();
                    let environment = self.environment();
                    for (name, value) in bindings {
                        environment.borrow_mut().define(&name, value);
                    }
                },
            }
            return Ok(Flow::Normal);
        }

        let mut named = Vec::with_capacity(imports.len());
        for name in imports {
            let value = exports.borrow().get(name).ok_or_else(|| {
                            RuntimeError::ImportError { details: format!("'{name}' is not \
                                                                          exported by \
                                                                          \"{module}\""),
                                                        line }
                        })?;
            named.push((name.clone(), value));
        }

        match alias {
            Some(alias) => {
                let bundle = Rc::new(RefCell::new(Environment::new()));
                for (name, value) in named {
                    bundle.borrow_mut().define(&name, value);
                }
                self.environment()
                    .borrow_mut()
                    .define(alias, Value::Environment(bundle));
            },
            None => {
                let environment = self.environment();
                for (name, value) in named {
                    environment.borrow_mut().define(&name, value);
                }
            },
        }

        Ok(Flow::Normal)
    }

    /// Executes an `export` statement: named values append to the
    /// `__exports__` environment in the current scope, created on first
    /// use.
    pub(crate) fn execute_export(&mut self, names: &[String], line: usize) -> EvalResult<Flow> {
        let existing = self.environment().borrow().get("__exports__");
        let exports = match existing {
            Some(Value::Environment(env)) => env,
            _ => {
                let env = Rc::new(RefCell::new(Environment::new()));
                self.environment()
                    .borrow_mut()
                    .define("__exports__", Value::Environment(Rc::clone(&env)));
                env
            },
        };

        for name in names {
            let value =
                self.environment()
                    .borrow()
                    .get(name)
                    .ok_or_else(|| RuntimeError::ExportError { name: name.clone(),
                                                               line })?;
            exports.borrow_mut().define(name, value);
        }

        Ok(Flow::Normal)
    }

    /// Executes a `namespace` block in a child environment and binds that
    /// environment to the namespace name.
    pub(crate) fn execute_namespace(&mut self, name: &str, body: &[Stmt]) -> EvalResult<Flow> {
        let environment = Environment::child_of(&self.environment());
        self.execute_block(body, Rc::clone(&environment))?;
        self.environment()
            .borrow_mut()
            .define(name, Value::Environment(environment));
        Ok(Flow::Normal)
    }

    /// Executes `try`/`catch`.
    ///
    /// A value thrown by user code binds as-is to the catch variable;
    /// internally raised errors bind their message string.
    pub(crate) fn execute_try_catch(&mut self,
                                    try_block: &Stmt,
                                    catch_var: &str,
                                    catch_block: &Stmt)
                                    -> EvalResult<Flow> {
        match self.execute(try_block) {
            Ok(flow) => Ok(flow),
            Err(error) => {
                let caught = match error {
                    RuntimeError::Thrown { value, .. } => value,
                    other => Value::Str(other.to_string()),
                };

                let environment = Environment::child_of(&self.environment());
                environment.borrow_mut().define(catch_var, caught);
                self.execute_block(std::slice::from_ref(catch_block), environment)
            },
        }
    }

    /// Loads a module through the cache: repeated requires of the same
    /// resolved path return the same environment.
    pub(crate) fn require_module(&mut self,
                                 resolved: &Path,
                                 line: usize)
                                 -> EvalResult<Rc<RefCell<Environment>>> {
        if let Some(cached) = self.modules.cached(resolved) {
            return Ok(cached);
        }

        let environment = self.load_module(resolved, line)?;
        self.modules
            .insert_cache(resolved.to_path_buf(), Rc::clone(&environment));
        // Cached modules are handed back on later requires; their state
        // must survive collections even when nothing else references them.
        self.gc.add_root(&environment);
        Ok(environment)
    }

    /// Loads and executes a module file in a fresh environment enclosing
    /// the globals, bypassing the cache. `include` re-executes through
    /// this on every invocation.
    pub(crate) fn load_module(&mut self,
                              resolved: &Path,
                              line: usize)
                              -> EvalResult<Rc<RefCell<Environment>>> {
        if self.modules.is_loading(resolved) {
            return Err(RuntimeError::CircularImport { path: resolved.display().to_string(),
                                                      line });
        }

        let source = std::fs::read_to_string(resolved).map_err(|error| {
                         RuntimeError::ModuleLoadError { details: format!("could not read {}: \
                                                                           {error}",
                                                                          resolved.display()),
                                                         line }
                     })?;

        let tokens = tokenize(&source);
        let tokens = MacroTable::new().process(tokens).map_err(|error| {
                         RuntimeError::ModuleLoadError { details: error.to_string(),
                                                         line }
                     })?;
        let statements = Parser::new(&tokens).parse().map_err(|errors| {
                             RuntimeError::ModuleLoadError { details:
                                                                 errors.first()
                                                                       .map(ToString::to_string)
                                                                       .unwrap_or_default(),
                                                             line }
                         })?;

        let module_env = Environment::child_of(&self.globals());
        self.modules.begin_loading(resolved.to_path_buf());
        let result = self.execute_block(&statements, Rc::clone(&module_env));
        self.modules.end_loading();
        result?;

        Ok(module_env)
    }
}

/// A module's export view: its `__exports__` environment when it defined
/// one, otherwise the whole module environment.
fn module_exports(module_env: &Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
    match module_env.borrow().get("__exports__") {
        Some(Value::Environment(exports)) => exports,
        _ => Rc::clone(module_env),
    }
}
