//! Exception handling tests: throw, catch matching, rethrow, try_table.

use rosmar::{Engine, Error, Instance, Module, Store, TrapCode, Value};

fn setup(wat: &str) -> (Store, Instance) {
    let engine = Engine::default();
    let wasm = wat::parse_str(wat).unwrap();
    let module = Module::new(&engine, &wasm).unwrap();
    let mut store = Store::new(&engine);
    let instance = store.instantiate(&module, &[]).unwrap();
    (store, instance)
}

#[test]
fn throw_caught_by_matching_tag() {
    let (mut store, instance) = setup(
        r#"
        (module
            (tag $t (param i32))
            (func (export "run") (result i32)
                try (result i32)
                    i32.const 42
                    throw $t
                catch $t
                end
            )
        )
        "#,
    );
    let results = instance.invoke(&mut store, "run", &[]).unwrap();
    assert_eq!(results, [Value::I32(42)]);
}

#[test]
fn mismatched_tag_escapes_as_trap() {
    let (mut store, instance) = setup(
        r#"
        (module
            (tag $t (param i32))
            (tag $u (param i32))
            (func (export "run") (result i32)
                try (result i32)
                    i32.const 42
                    throw $u
                catch $t
                end
            )
        )
        "#,
    );
    match instance.invoke(&mut store, "run", &[]) {
        Err(Error::Trap(trap)) => {
            assert!(trap.uncaught_exception_tag().is_some());
        }
        other => panic!("expected an uncaught exception, got: {other:?}"),
    }
}

#[test]
fn catch_all_recovers_any_tag() {
    let (mut store, instance) = setup(
        r#"
        (module
            (tag $t (param i32))
            (func (export "run") (result i32)
                try (result i32)
                    i32.const 1
                    throw $t
                catch_all
                    i32.const 7
                end
            )
        )
        "#,
    );
    let results = instance.invoke(&mut store, "run", &[]).unwrap();
    assert_eq!(results, [Value::I32(7)]);
}

#[test]
fn exception_crosses_call_boundary() {
    let (mut store, instance) = setup(
        r#"
        (module
            (tag $t (param i32))
            (func $thrower
                i32.const 23
                throw $t
            )
            (func (export "run") (result i32)
                try (result i32)
                    call $thrower
                    i32.const 0
                catch $t
                end
            )
        )
        "#,
    );
    let results = instance.invoke(&mut store, "run", &[]).unwrap();
    assert_eq!(results, [Value::I32(23)]);
}

#[test]
fn nested_try_matches_innermost_first() {
    let (mut store, instance) = setup(
        r#"
        (module
            (tag $t (param i32))
            (func (export "run") (result i32)
                (try (result i32)
                    (do
                        (try (result i32)
                            (do
                                i32.const 1
                                throw $t
                            )
                            (catch $t
                                i32.const 10
                                i32.add
                            )
                        )
                    )
                    (catch $t
                        i32.const 100
                        i32.add
                    )
                )
            )
        )
        "#,
    );
    let results = instance.invoke(&mut store, "run", &[]).unwrap();
    assert_eq!(results, [Value::I32(11)]);
}

#[test]
fn rethrow_reraises_the_captured_exception() {
    let (mut store, instance) = setup(
        r#"
        (module
            (tag $t (param i32))
            (func (export "run") (result i32)
                (try (result i32)
                    (do
                        (try (result i32)
                            (do
                                i32.const 5
                                throw $t
                            )
                            (catch $t
                                drop
                                rethrow 0
                            )
                        )
                    )
                    (catch $t)
                )
            )
        )
        "#,
    );
    let results = instance.invoke(&mut store, "run", &[]).unwrap();
    assert_eq!(results, [Value::I32(5)]);
}

#[test]
fn try_table_branches_to_handler_label() {
    let (mut store, instance) = setup(
        r#"
        (module
            (tag $t (param i32))
            (func (export "run") (result i32)
                (block $handler (result i32)
                    (try_table (result i32) (catch $t $handler)
                        i32.const 9
                        throw $t
                    )
                )
            )
        )
        "#,
    );
    let results = instance.invoke(&mut store, "run", &[]).unwrap();
    assert_eq!(results, [Value::I32(9)]);
}

#[test]
fn catch_all_with_ref_recovers_a_trap() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "run") (result i32)
                (try (result i32)
                    (do
                        i32.const 1
                        i32.const 0
                        i32.div_u
                    )
                    (catch_all
                        i32.const -1
                    )
                )
            )
        )
        "#,
    );
    // legacy catch_all arms capture the exception reference and may
    // therefore recover traps
    let results = instance.invoke(&mut store, "run", &[]).unwrap();
    assert_eq!(results, [Value::I32(-1)]);
}

#[test]
fn uncaught_trap_keeps_its_code() {
    let (mut store, instance) = setup(
        r#"
        (module
            (tag $t (param i32))
            (func (export "run") (result i32)
                (try (result i32)
                    (do
                        i32.const 1
                        i32.const 0
                        i32.div_u
                    )
                    (catch $t)
                )
            )
        )
        "#,
    );
    match instance.invoke(&mut store, "run", &[]) {
        Err(Error::Trap(trap)) => {
            assert_eq!(trap.trap_code(), Some(TrapCode::IntegerDivideByZero));
        }
        other => panic!("expected the division trap, got: {other:?}"),
    }
}
