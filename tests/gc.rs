use std::rc::Rc;

use zelo::{
    interpreter::{evaluator::core::Interpreter,
                  gc::STEPS_PER_CYCLE,
                  value::core::Value},
    run_with,
};

/// Pulls the instance behind a global binding out of the interpreter, as a
/// weak handle so the test does not keep it alive.
fn weak_object(interpreter: &Interpreter, name: &str) -> std::rc::Weak<zelo::interpreter::value::class::Instance> {
    let value = interpreter.globals().borrow().get(name).expect("binding exists");
    match value {
        Value::Object(instance) => Rc::downgrade(&instance),
        other => panic!("expected an object, got {other}"),
    }
}

#[test]
fn collection_keeps_only_reachable_cells() {
    let mut interpreter = Interpreter::new();
    run_with(&mut interpreter,
             "class A { } loc kept = A(); loc dropped = A(); dropped = null;").unwrap();
    assert_eq!(interpreter.gc.object_count(), 2);

    let roots = interpreter.globals();
    interpreter.gc.collect_garbage(&roots);

    assert_eq!(interpreter.gc.object_count(), 1);
    let kept = interpreter.globals().borrow().get("kept").unwrap();
    assert!(interpreter.gc.is_tracked(&kept));
}

#[test]
fn minor_collection_promotes_survivors_and_empties_the_young_set() {
    let mut interpreter = Interpreter::new();
    run_with(&mut interpreter, "class A { } loc a = A(); loc b = A();").unwrap();
    assert_eq!(interpreter.gc.young_object_count(), 2);
    assert_eq!(interpreter.gc.old_object_count(), 0);

    let before = weak_object(&interpreter, "a");

    let roots = interpreter.globals();
    interpreter.gc.collect_garbage(&roots);

    assert_eq!(interpreter.gc.young_object_count(), 0);
    assert_eq!(interpreter.gc.old_object_count(), 2);

    // Promotion preserves cell identity.
    let after = weak_object(&interpreter, "a");
    assert!(before.ptr_eq(&after));

    // Promoted cells survive later collections while still reachable.
    let roots = interpreter.globals();
    interpreter.gc.collect_garbage(&roots);
    assert_eq!(interpreter.gc.old_object_count(), 2);
}

#[test]
fn self_referential_cycle_is_reclaimed() {
    let mut interpreter = Interpreter::new();
    run_with(&mut interpreter, "class A { } loc a = A(); a.me = a;").unwrap();

    let weak = weak_object(&interpreter, "a");
    run_with(&mut interpreter, "a = null;").unwrap();
    assert!(weak.upgrade().is_some(), "cycle keeps the cell alive before collection");

    let roots = interpreter.globals();
    interpreter.gc.collect_garbage(&roots);

    assert!(weak.upgrade().is_none(), "collection reclaims the unreachable cycle");
    assert_eq!(interpreter.gc.object_count(), 0);
}

#[test]
fn closure_environment_cycle_is_reclaimed() {
    let mut interpreter = Interpreter::new();
    run_with(&mut interpreter,
             "func make() { loc n = 0; func inc() { n = n + 1; return n; } return inc; } \
              loc f = make(); assert(f() == 1);").unwrap();

    let weak = {
        let value = interpreter.globals().borrow().get("f").unwrap();
        match value {
            Value::Function(function) => Rc::downgrade(&function),
            other => panic!("expected a function, got {other}"),
        }
    };

    run_with(&mut interpreter, "f = null;").unwrap();
    let roots = interpreter.globals();
    interpreter.gc.collect_garbage(&roots);

    assert!(weak.upgrade().is_none(),
            "the closure-environment cycle unwinds once the function is swept");
}

#[test]
fn instances_reached_through_containers_and_fields_survive() {
    let mut interpreter = Interpreter::new();
    run_with(&mut interpreter,
             "class A { } \
              loc in_array = [A()]; \
              loc in_dict = {\"k\": A()}; \
              loc outer = A(); outer.inner = A();").unwrap();
    assert_eq!(interpreter.gc.object_count(), 4);

    let roots = interpreter.globals();
    interpreter.gc.collect_garbage(&roots);
    assert_eq!(interpreter.gc.object_count(), 4);
}

#[test]
fn classes_and_methods_stay_tracked_while_bound() {
    let mut interpreter = Interpreter::new();
    run_with(&mut interpreter,
             "class C { func get() { return 1; } } loc c = C(); loc m = c.get;").unwrap();

    let class_count = interpreter.gc.class_count();
    let function_count = interpreter.gc.function_count();

    let roots = interpreter.globals();
    interpreter.gc.collect_garbage(&roots);

    assert_eq!(interpreter.gc.class_count(), class_count);
    assert_eq!(interpreter.gc.function_count(), function_count);

    // The bound method still calls after a collection.
    run_with(&mut interpreter, "assert(m() == 1);").unwrap();
}

#[test]
fn incremental_collection_completes_a_cycle() {
    let mut interpreter = Interpreter::new();
    run_with(&mut interpreter, "class A { } loc a = A(); a.me = a; a = null;").unwrap();
    assert_eq!(interpreter.gc.object_count(), 1);

    let roots = interpreter.globals();
    // Phase 0 marks roots, the middle phases mark heap slices, the final
    // phase sweeps.
    for _ in 0..=STEPS_PER_CYCLE {
        interpreter.gc.collect_garbage_incremental(&roots);
    }

    assert_eq!(interpreter.gc.object_count(), 0);
}

#[test]
fn unreachable_class_hierarchies_are_swept() {
    let mut interpreter = Interpreter::new();
    run_with(&mut interpreter,
             "loc holder = null; \
              { \
                  class Base { func ping() { return 1; } } \
                  class Sub : Base { } \
                  holder = Sub(); \
              } \
              assert(holder.ping() == 1);").unwrap();

    // Block-scoped classes are unreachable once the block exits, but the
    // instance keeps its class (and superclass) alive through its own
    // reference.
    let roots = interpreter.globals();
    interpreter.gc.collect_garbage(&roots);
    assert_eq!(interpreter.gc.object_count(), 1);
    assert!(interpreter.gc.class_count() >= 2);

    // The survivors were promoted, so reclaiming them takes a full
    // collection over both generations.
    run_with(&mut interpreter, "holder = null;").unwrap();
    let roots = interpreter.globals();
    interpreter.gc.collect_garbage_full(&roots);
    assert_eq!(interpreter.gc.object_count(), 0);
    assert_eq!(interpreter.gc.class_count(), 0);
}
