use std::{cell::RefCell,
          collections::{HashMap, HashSet},
          rc::Rc};

use crate::interpreter::value::{class::{Class, Instance},
                                core::Value,
                                environment::Environment,
                                function::Function};

/// Young-generation size below which a minor collection counts as having
/// relieved memory pressure.
pub const NEW_GENERATION_THRESHOLD: usize = 1024;
/// Number of phases in one incremental collection cycle.
pub const STEPS_PER_CYCLE: usize = 10;

/// Generational mark-and-sweep collector over the shared heap cells the
/// evaluator allocates: instances, user functions and classes.
///
/// The value layer shares these cells by reference counting, which cannot
/// reclaim cycles (a closure capturing the environment that holds the
/// closure is the canonical one). The collector tracks every cell from
/// creation, marks what is reachable from the evaluator's environment chain,
/// and drops the rest. Sweeping also severs a dead cell's outgoing edges
/// (instance fields, function closure, class method table) so that the
/// cycle's reference counts unwind and the memory is actually freed.
///
/// Cells start in the young generation; survivors of a minor collection are
/// promoted to the old generation and only reconsidered by major
/// collections.
#[derive(Debug, Default)]
pub struct GarbageCollector {
    young_objects:   HashMap<usize, Rc<Instance>>,
    old_objects:     HashMap<usize, Rc<Instance>>,
    young_functions: HashMap<usize, Rc<Function>>,
    old_functions:   HashMap<usize, Rc<Function>>,
    young_classes:   HashMap<usize, Rc<Class>>,
    old_classes:     HashMap<usize, Rc<Class>>,

    marked_objects:   HashSet<usize>,
    marked_functions: HashSet<usize>,
    marked_classes:   HashSet<usize>,

    extra_roots:      Vec<Rc<RefCell<Environment>>>,
    incremental_step: usize,
}

impl GarbageCollector {
    /// Creates a collector tracking nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly created instance in the young generation.
    pub fn register_object(&mut self, object: &Rc<Instance>) {
        self.young_objects
            .insert(Rc::as_ptr(object) as usize, Rc::clone(object));
    }

    /// Registers a freshly created function in the young generation.
    pub fn register_function(&mut self, function: &Rc<Function>) {
        self.young_functions
            .insert(Rc::as_ptr(function) as usize, Rc::clone(function));
    }

    /// Registers a freshly created class in the young generation.
    pub fn register_class(&mut self, class: &Rc<Class>) {
        self.young_classes
            .insert(Rc::as_ptr(class) as usize, Rc::clone(class));
    }

    /// Adds a persistent root descriptor: an environment marked on every
    /// collection in addition to the evaluator's chain. The module cache
    /// registers loaded modules here so cached state survives collections.
    pub fn add_root(&mut self, root: &Rc<RefCell<Environment>>) {
        self.extra_roots.push(Rc::clone(root));
    }

    /// Number of tracked instances across both generations.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.young_objects.len() + self.old_objects.len()
    }

    /// Number of tracked functions across both generations.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.young_functions.len() + self.old_functions.len()
    }

    /// Number of tracked classes across both generations.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.young_classes.len() + self.old_classes.len()
    }

    /// Number of instances currently in the young generation.
    #[must_use]
    pub fn young_object_count(&self) -> usize {
        self.young_objects.len()
    }

    /// Number of instances currently in the old generation.
    #[must_use]
    pub fn old_object_count(&self) -> usize {
        self.old_objects.len()
    }

    /// Returns `true` when the instance behind `value` is still tracked.
    /// Test support for the reachability invariant.
    #[must_use]
    pub fn is_tracked(&self, value: &Value) -> bool {
        match value {
            Value::Object(object) => {
                let id = Rc::as_ptr(object) as usize;
                self.young_objects.contains_key(&id) || self.old_objects.contains_key(&id)
            },
            Value::Function(function) => {
                let id = Rc::as_ptr(function) as usize;
                self.young_functions.contains_key(&id) || self.old_functions.contains_key(&id)
            },
            Value::Class(class) => {
                let id = Rc::as_ptr(class) as usize;
                self.young_classes.contains_key(&id) || self.old_classes.contains_key(&id)
            },
            _ => false,
        }
    }

    /// Runs a generational collection: a minor pass first, escalating to a
    /// major pass when the minor pass reports memory pressure.
    ///
    /// The mark sets are empty between calls; a collection that returns
    /// leaves only reachable cells tracked.
    pub fn collect_garbage(&mut self, roots: &Rc<RefCell<Environment>>) {
        if !self.collect_new_generation(roots) {
            self.collect_old_generation(roots);
        }
    }

    /// Runs a full (major) collection over both generations
    /// unconditionally.
    ///
    /// The generational entry point only escalates to this under young-set
    /// pressure; long-lived garbage that was promoted before becoming
    /// unreachable is reclaimed here or by the incremental collector.
    pub fn collect_garbage_full(&mut self, roots: &Rc<RefCell<Environment>>) {
        self.collect_old_generation(roots);
    }

    /// Advances the incremental collector by exactly one phase.
    ///
    /// Phase 0 clears the mark sets and marks the roots. Phases
    /// 1..`STEPS_PER_CYCLE`-1 each mark one index-range slice of the tracked
    /// instance heap. The final phase sweeps unmarked cells and resets the
    /// phase counter, bounding the pause contributed by any single call.
    pub fn collect_garbage_incremental(&mut self, roots: &Rc<RefCell<Environment>>) {
        if self.incremental_step == 0 {
            self.marked_objects.clear();
            self.marked_functions.clear();
            self.marked_classes.clear();
            self.mark_roots(roots);
            self.incremental_step += 1;
        } else if self.incremental_step < STEPS_PER_CYCLE {
            self.mark_incremental(self.incremental_step, STEPS_PER_CYCLE);
            self.incremental_step += 1;
        } else {
            self.sweep();
            self.incremental_step = 0;
        }
    }

    /// Minor collection: marks from the roots, deletes unmarked young
    /// cells, promotes marked ones to the old generation.
    ///
    /// Returns `true` iff the post-collection young set is below
    /// [`NEW_GENERATION_THRESHOLD`]; `false` signals pressure and triggers a
    /// major collection.
    fn collect_new_generation(&mut self, roots: &Rc<RefCell<Environment>>) -> bool {
        self.marked_objects.clear();
        self.marked_functions.clear();
        self.marked_classes.clear();
        self.mark_roots(roots);

        for (id, object) in std::mem::take(&mut self.young_objects) {
            if self.marked_objects.contains(&id) {
                self.old_objects.insert(id, object);
            } else {
                object.fields.borrow_mut().clear();
            }
        }

        for (id, function) in std::mem::take(&mut self.young_functions) {
            if self.marked_functions.contains(&id) {
                self.old_functions.insert(id, function);
            } else {
                function.sever_closure();
            }
        }

        for (id, class) in std::mem::take(&mut self.young_classes) {
            if self.marked_classes.contains(&id) {
                self.old_classes.insert(id, class);
            } else {
                class.methods.borrow_mut().clear();
            }
        }

        self.marked_objects.clear();
        self.marked_functions.clear();
        self.marked_classes.clear();

        self.young_objects.len() < NEW_GENERATION_THRESHOLD
    }

    /// Major collection: marks from the roots over both generations, then
    /// sweeps everything unmarked.
    fn collect_old_generation(&mut self, roots: &Rc<RefCell<Environment>>) {
        self.marked_objects.clear();
        self.marked_functions.clear();
        self.marked_classes.clear();
        self.mark_roots(roots);
        self.sweep();
    }

    /// Marks the evaluator's chain and every persistent root, sharing one
    /// visited set across the pass.
    fn mark_roots(&mut self, roots: &Rc<RefCell<Environment>>) {
        let mut visited_envs = HashSet::new();
        self.mark_environment(roots, &mut visited_envs);

        let extra: Vec<Rc<RefCell<Environment>>> = self.extra_roots.clone();
        for root in &extra {
            self.mark_environment(root, &mut visited_envs);
        }
    }

    /// Marks one value and everything reachable from it.
    fn mark(&mut self, value: &Value, visited_envs: &mut HashSet<usize>) {
        match value {
            Value::Object(object) => self.mark_object(object, visited_envs),
            Value::Function(function) => {
                let id = Rc::as_ptr(function) as usize;
                if self.marked_functions.insert(id)
                   && let Function::User { .. } = function.as_ref()
                {
                    self.mark_environment(&function.closure(), visited_envs);
                }
            },
            Value::Class(class) => self.mark_class(class, visited_envs),
            Value::Array(array) => {
                for element in array.borrow().iter() {
                    self.mark(element, visited_envs);
                }
            },
            Value::Dict(dict) => {
                for element in dict.borrow().values() {
                    self.mark(element, visited_envs);
                }
            },
            Value::Environment(env) => self.mark_environment(env, visited_envs),
            _ => {},
        }
    }

    /// Marks an instance and its field values.
    fn mark_object(&mut self, object: &Rc<Instance>, visited_envs: &mut HashSet<usize>) {
        if !self.marked_objects.insert(Rc::as_ptr(object) as usize) {
            return;
        }
        self.mark_class(&object.class, visited_envs);
        for field in object.fields.borrow().values() {
            self.mark(field, visited_envs);
        }
    }

    /// Marks a class, its method table and its superclass chain.
    fn mark_class(&mut self, class: &Rc<Class>, visited_envs: &mut HashSet<usize>) {
        if !self.marked_classes.insert(Rc::as_ptr(class) as usize) {
            return;
        }
        for method in class.methods.borrow().values() {
            let id = Rc::as_ptr(method) as usize;
            if self.marked_functions.insert(id)
               && let Function::User { .. } = method.as_ref()
            {
                self.mark_environment(&method.closure(), visited_envs);
            }
        }
        if let Some(superclass) = &class.superclass {
            self.mark_class(superclass, visited_envs);
        }
    }

    /// Marks every value in an environment chain. `visited_envs` keeps the
    /// traversal from revisiting environments reachable through several
    /// closures.
    fn mark_environment(&mut self,
                        env: &Rc<RefCell<Environment>>,
                        visited_envs: &mut HashSet<usize>) {
        if !visited_envs.insert(Rc::as_ptr(env) as usize) {
            return;
        }

        let values: Vec<Value> = env.borrow().values().values().cloned().collect();
        for value in &values {
            self.mark(value, visited_envs);
        }

        let enclosing = env.borrow().enclosing();
        if let Some(enclosing) = enclosing {
            self.mark_environment(&enclosing, visited_envs);
        }
    }

    /// Marks one index-range slice of the tracked instance heap.
    fn mark_incremental(&mut self, current_step: usize, total_steps: usize) {
        let total = self.object_count();
        let per_step = total / total_steps;
        let start = current_step * per_step;
        let end = (start + per_step).min(total);

        let slice: Vec<Rc<Instance>> = self.young_objects
                                           .values()
                                           .chain(self.old_objects.values())
                                           .skip(start)
                                           .take(end.saturating_sub(start))
                                           .cloned()
                                           .collect();
        for object in &slice {
            self.mark_object(object, &mut HashSet::new());
        }
    }

    /// Deletes every tracked cell not in the mark set, severing its
    /// outgoing edges, then clears the mark sets.
    fn sweep(&mut self) {
        let marked = &self.marked_objects;
        for generation in [&mut self.young_objects, &mut self.old_objects] {
            generation.retain(|id, object| {
                          let keep = marked.contains(id);
                          if !keep {
                              object.fields.borrow_mut().clear();
                          }
                          keep
                      });
        }

        let marked = &self.marked_functions;
        for generation in [&mut self.young_functions, &mut self.old_functions] {
            generation.retain(|id, function| {
                          let keep = marked.contains(id);
                          if !keep {
                              function.sever_closure();
                          }
                          keep
                      });
        }

        let marked = &self.marked_classes;
        for generation in [&mut self.young_classes, &mut self.old_classes] {
            generation.retain(|id, class| {
                          let keep = marked.contains(id);
                          if !keep {
                              class.methods.borrow_mut().clear();
                          }
                          keep
                      });
        }

        self.marked_objects.clear();
        self.marked_functions.clear();
        self.marked_classes.clear();
    }
}
