//! Atomics tests: read-modify-writes, cmpxchg, wait/notify semantics.

use rosmar::{Engine, Error, Instance, Module, Store, TrapCode, Value, WaitResult};

fn setup(wat: &str) -> (Store, Instance) {
    let engine = Engine::default();
    let wasm = wat::parse_str(wat).unwrap();
    let module = Module::new(&engine, &wasm).unwrap();
    let mut store = Store::new(&engine);
    let instance = store.instantiate(&module, &[]).unwrap();
    (store, instance)
}

#[test]
fn rmw_add_returns_old_value() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1 1 shared)
            (func (export "add") (param i32) (result i32)
                i32.const 0
                local.get 0
                i32.atomic.rmw.add
            )
            (func (export "load") (result i32)
                i32.const 0
                i32.atomic.load
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "add", &[Value::I32(5)]).unwrap(),
        [Value::I32(0)]
    );
    assert_eq!(
        instance.invoke(&mut store, "add", &[Value::I32(3)]).unwrap(),
        [Value::I32(5)]
    );
    assert_eq!(
        instance.invoke(&mut store, "load", &[]).unwrap(),
        [Value::I32(8)]
    );
}

#[test]
fn cmpxchg_swaps_only_on_match() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1 1 shared)
            (func (export "cmpxchg") (param i32 i32) (result i32)
                i32.const 8
                local.get 0
                local.get 1
                i32.atomic.rmw.cmpxchg
            )
            (func (export "load") (result i32)
                i32.const 8
                i32.atomic.load
            )
        )
        "#,
    );
    // expected 0 matches the fresh memory: swap happens
    assert_eq!(
        instance
            .invoke(&mut store, "cmpxchg", &[Value::I32(0), Value::I32(11)])
            .unwrap(),
        [Value::I32(0)]
    );
    // expected 0 no longer matches: value unchanged
    assert_eq!(
        instance
            .invoke(&mut store, "cmpxchg", &[Value::I32(0), Value::I32(22)])
            .unwrap(),
        [Value::I32(11)]
    );
    assert_eq!(
        instance.invoke(&mut store, "load", &[]).unwrap(),
        [Value::I32(11)]
    );
}

#[test]
fn narrow_rmw_zero_extends() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1 1 shared)
            (func (export "xchg8") (param i32) (result i32)
                i32.const 0
                local.get 0
                i32.atomic.rmw8.xchg_u
            )
        )
        "#,
    );
    assert_eq!(
        instance
            .invoke(&mut store, "xchg8", &[Value::I32(0xFF)])
            .unwrap(),
        [Value::I32(0)]
    );
    // only the low byte was stored; the old value widens unsigned
    assert_eq!(
        instance
            .invoke(&mut store, "xchg8", &[Value::I32(0)])
            .unwrap(),
        [Value::I32(0xFF)]
    );
}

#[test]
fn wait_on_unshared_memory_traps() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1)
            (func (export "wait") (result i32)
                i32.const 0
                i32.const 0
                i64.const 0
                memory.atomic.wait32
            )
        )
        "#,
    );
    match instance.invoke(&mut store, "wait", &[]) {
        Err(Error::Trap(trap)) => {
            assert_eq!(trap.trap_code(), Some(TrapCode::ExpectedSharedMemory));
        }
        other => panic!("expected the shared-memory trap, got: {other:?}"),
    }
}

#[test]
fn wait_returns_not_equal_on_mismatch() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1 1 shared)
            (func (export "wait_expect") (param i32 i64) (result i32)
                i32.const 0
                local.get 0
                local.get 1
                memory.atomic.wait32
            )
        )
        "#,
    );
    // memory holds 0, the expectation of 1 mismatches immediately
    assert_eq!(
        instance
            .invoke(
                &mut store,
                "wait_expect",
                &[Value::I32(1), Value::I64(1_000_000)]
            )
            .unwrap(),
        [Value::I32(WaitResult::NotEqual as i32)]
    );
    // matching expectation with a tiny timeout parks and times out
    assert_eq!(
        instance
            .invoke(
                &mut store,
                "wait_expect",
                &[Value::I32(0), Value::I64(100_000)]
            )
            .unwrap(),
        [Value::I32(WaitResult::TimedOut as i32)]
    );
}

#[test]
fn notify_without_waiters_wakes_none() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1 1 shared)
            (func (export "notify") (result i32)
                i32.const 0
                i32.const 8
                memory.atomic.notify
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "notify", &[]).unwrap(),
        [Value::I32(0)]
    );
}

#[test]
fn unaligned_atomic_access_traps() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1 1 shared)
            (func (export "load_unaligned") (result i32)
                i32.const 1
                i32.atomic.load
            )
        )
        "#,
    );
    match instance.invoke(&mut store, "load_unaligned", &[]) {
        Err(Error::Trap(trap)) => {
            assert_eq!(trap.trap_code(), Some(TrapCode::OutOfBoundsMemAccess));
        }
        other => panic!("expected a trap, got: {other:?}"),
    }
}

#[test]
fn fence_is_a_no_op_single_threaded() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1 1 shared)
            (func (export "fenced_store") (result i32)
                i32.const 0
                i32.const 9
                i32.atomic.store
                atomic.fence
                i32.const 0
                i32.atomic.load
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "fenced_store", &[]).unwrap(),
        [Value::I32(9)]
    );
}
