//! Bulk memory, table operation, multi-memory and memory64 tests.

use rosmar::{Engine, Error, Instance, Module, Store, TrapCode, Value};

fn setup(wat: &str) -> (Store, Instance) {
    let engine = Engine::default();
    let wasm = wat::parse_str(wat).unwrap();
    let module = Module::new(&engine, &wasm).unwrap();
    let mut store = Store::new(&engine);
    let instance = store.instantiate(&module, &[]).unwrap();
    (store, instance)
}

fn trap_code(result: Result<Vec<Value>, Error>) -> TrapCode {
    match result {
        Err(Error::Trap(trap)) => trap.trap_code().expect("expected an instruction trap"),
        other => panic!("expected a trap, got: {other:?}"),
    }
}

#[test]
fn active_data_segment_is_applied() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1)
            (data (i32.const 16) "\2A\00\00\00")
            (func (export "load") (param i32) (result i32)
                local.get 0
                i32.load
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "load", &[Value::I32(16)]).unwrap(),
        [Value::I32(42)]
    );
}

#[test]
fn memory_init_and_data_drop() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1)
            (data $seg "\01\02\03\04")
            (func (export "init") (param i32 i32 i32)
                local.get 0
                local.get 1
                local.get 2
                memory.init $seg
            )
            (func (export "drop")
                data.drop $seg
            )
            (func (export "load8") (param i32) (result i32)
                local.get 0
                i32.load8_u
            )
        )
        "#,
    );
    instance
        .invoke(
            &mut store,
            "init",
            &[Value::I32(8), Value::I32(1), Value::I32(2)],
        )
        .unwrap();
    assert_eq!(
        instance.invoke(&mut store, "load8", &[Value::I32(8)]).unwrap(),
        [Value::I32(2)]
    );
    assert_eq!(
        instance.invoke(&mut store, "load8", &[Value::I32(9)]).unwrap(),
        [Value::I32(3)]
    );
    instance.invoke(&mut store, "drop", &[]).unwrap();
    // after the drop bit is set the segment reads as empty
    assert_eq!(
        trap_code(instance.invoke(
            &mut store,
            "init",
            &[Value::I32(8), Value::I32(0), Value::I32(1)],
        )),
        TrapCode::OutOfBoundsMemAccess
    );
}

#[test]
fn memory_copy_and_fill() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1)
            (func (export "fill") (param i32 i32 i32)
                local.get 0
                local.get 1
                local.get 2
                memory.fill
            )
            (func (export "copy") (param i32 i32 i32)
                local.get 0
                local.get 1
                local.get 2
                memory.copy
            )
            (func (export "load8") (param i32) (result i32)
                local.get 0
                i32.load8_u
            )
        )
        "#,
    );
    instance
        .invoke(
            &mut store,
            "fill",
            &[Value::I32(0), Value::I32(0x5A), Value::I32(4)],
        )
        .unwrap();
    instance
        .invoke(
            &mut store,
            "copy",
            &[Value::I32(100), Value::I32(0), Value::I32(4)],
        )
        .unwrap();
    assert_eq!(
        instance
            .invoke(&mut store, "load8", &[Value::I32(103)])
            .unwrap(),
        [Value::I32(0x5A)]
    );
    // out of bounds fills trap and leave memory unmodified
    assert_eq!(
        trap_code(instance.invoke(
            &mut store,
            "fill",
            &[Value::I32(65535), Value::I32(1), Value::I32(2)],
        )),
        TrapCode::OutOfBoundsMemAccess
    );
}

#[test]
fn multi_memory_addressing() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory $a 1)
            (memory $b 1)
            (func (export "cross") (result i32)
                i32.const 0
                i32.const 111
                i32.store $a
                i32.const 0
                i32.const 222
                i32.store $b
                i32.const 0
                i32.load $a
                i32.const 0
                i32.load $b
                i32.add
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "cross", &[]).unwrap(),
        [Value::I32(333)]
    );
}

#[test]
fn memory64_uses_wide_addresses() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory i64 1)
            (func (export "roundtrip") (param i64 i64) (result i64)
                local.get 0
                local.get 1
                i64.store
                local.get 0
                i64.load
            )
            (func (export "size") (result i64)
                memory.size
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "size", &[]).unwrap(),
        [Value::I64(1)]
    );
    assert_eq!(
        instance
            .invoke(
                &mut store,
                "roundtrip",
                &[Value::I64(24), Value::I64(-12345)]
            )
            .unwrap(),
        [Value::I64(-12345)]
    );
    assert_eq!(
        trap_code(instance.invoke(
            &mut store,
            "roundtrip",
            &[Value::I64(1 << 40), Value::I64(1)],
        )),
        TrapCode::OutOfBoundsMemAccess
    );
}

#[test]
fn table_fill_copy_and_grow() {
    let (mut store, instance) = setup(
        r#"
        (module
            (table $t 4 8 funcref)
            (func $f)
            (elem declare func $f)
            (func (export "fill") (param i32 i32)
                local.get 0
                ref.func $f
                local.get 1
                table.fill $t
            )
            (func (export "is_set") (param i32) (result i32)
                local.get 0
                table.get $t
                ref.is_null
                i32.eqz
            )
            (func (export "grow") (param i32) (result i32)
                ref.null func
                local.get 0
                table.grow $t
            )
            (func (export "size") (result i32)
                table.size $t
            )
        )
        "#,
    );
    instance
        .invoke(&mut store, "fill", &[Value::I32(1), Value::I32(2)])
        .unwrap();
    assert_eq!(
        instance.invoke(&mut store, "is_set", &[Value::I32(0)]).unwrap(),
        [Value::I32(0)]
    );
    assert_eq!(
        instance.invoke(&mut store, "is_set", &[Value::I32(2)]).unwrap(),
        [Value::I32(1)]
    );
    assert_eq!(
        instance.invoke(&mut store, "grow", &[Value::I32(2)]).unwrap(),
        [Value::I32(4)]
    );
    assert_eq!(
        instance.invoke(&mut store, "grow", &[Value::I32(100)]).unwrap(),
        [Value::I32(-1)]
    );
    assert_eq!(
        instance.invoke(&mut store, "size", &[]).unwrap(),
        [Value::I32(6)]
    );
}

#[test]
fn table_init_and_elem_drop() {
    let (mut store, instance) = setup(
        r#"
        (module
            (table $t 4 funcref)
            (func $f (result i32) i32.const 1)
            (elem $seg func $f)
            (func (export "init")
                i32.const 0
                i32.const 0
                i32.const 1
                table.init $t $seg
            )
            (func (export "drop")
                elem.drop $seg
            )
            (func (export "call0") (result i32)
                i32.const 0
                call_indirect $t (result i32)
            )
        )
        "#,
    );
    instance.invoke(&mut store, "init", &[]).unwrap();
    assert_eq!(
        instance.invoke(&mut store, "call0", &[]).unwrap(),
        [Value::I32(1)]
    );
    instance.invoke(&mut store, "drop", &[]).unwrap();
    assert_eq!(
        trap_code(instance.invoke(&mut store, "init", &[])),
        TrapCode::OutOfBoundsTableAccess
    );
}
