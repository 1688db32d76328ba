//! Reference type and GC execution tests.

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
fn struct_new_get_set() {
    let (mut store, instance) = setup(
        r#"
        (module
            (type $point (struct (field $x (mut i32)) (field $y (mut i32))))
            (func (export "run") (result i32)
                (local $p (ref null $point))
                i32.const 3
                i32.const 4
                struct.new $point
                local.set $p
                local.get $p
                i32.const 40
                struct.set $point $y
                local.get $p
                struct.get $point $x
                local.get $p
                struct.get $point $y
                i32.add
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "run", &[]).unwrap(),
        [Value::I32(43)]
    );
}

#[test]
fn packed_struct_fields_widen_with_signedness() {
    let (mut store, instance) = setup(
        r#"
        (module
            (type $packed (struct (field i8) (field i16)))
            (func (export "signed") (result i32)
                i32.const 0xFF
                i32.const 0xFFFF
                struct.new $packed
                struct.get_s $packed 0
            )
            (func (export "unsigned") (result i32)
                i32.const 0xFF
                i32.const 0xFFFF
                struct.new $packed
                struct.get_u $packed 1
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "signed", &[]).unwrap(),
        [Value::I32(-1)]
    );
    assert_eq!(
        instance.invoke(&mut store, "unsigned", &[]).unwrap(),
        [Value::I32(0xFFFF)]
    );
}

#[test]
fn struct_get_on_null_traps() {
    let (mut store, instance) = setup(
        r#"
        (module
            (type $cell (struct (field i32)))
            (func (export "run") (result i32)
                ref.null $cell
                struct.get $cell 0
            )
        )
        "#,
    );
    assert_eq!(
        trap_code(instance.invoke(&mut store, "run", &[])),
        TrapCode::NullAccess
    );
}

#[test]
fn array_new_get_len_and_bounds() {
    let (mut store, instance) = setup(
        r#"
        (module
            (type $ints (array (mut i32)))
            (func (export "sum_fixed") (result i32)
                (local $a (ref null $ints))
                i32.const 10
                i32.const 20
                i32.const 30
                array.new_fixed $ints 3
                local.set $a
                local.get $a
                i32.const 0
                array.get $ints
                local.get $a
                i32.const 2
                array.get $ints
                i32.add
            )
            (func (export "len") (result i32)
                i32.const 0
                i32.const 5
                array.new $ints
                array.len
            )
            (func (export "oob") (result i32)
                i32.const 0
                i32.const 2
                array.new $ints
                i32.const 2
                array.get $ints
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "sum_fixed", &[]).unwrap(),
        [Value::I32(40)]
    );
    assert_eq!(
        instance.invoke(&mut store, "len", &[]).unwrap(),
        [Value::I32(5)]
    );
    assert_eq!(
        trap_code(instance.invoke(&mut store, "oob", &[])),
        TrapCode::OutOfBoundsArrayAccess
    );
}

#[test]
fn i31_boxing_roundtrip() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "signed") (param i32) (result i32)
                local.get 0
                ref.i31
                i31.get_s
            )
            (func (export "unsigned") (param i32) (result i32)
                local.get 0
                ref.i31
                i31.get_u
            )
        )
        "#,
    );
    assert_eq!(
        instance
            .invoke(&mut store, "signed", &[Value::I32(-1)])
            .unwrap(),
        [Value::I32(-1)]
    );
    assert_eq!(
        instance
            .invoke(&mut store, "unsigned", &[Value::I32(-1)])
            .unwrap(),
        [Value::I32(0x7FFF_FFFF)]
    );
}

#[test]
fn ref_test_and_cast() {
    let (mut store, instance) = setup(
        r#"
        (module
            (type $cell (struct (field i32)))
            (func (export "test_struct") (result i32)
                i32.const 1
                struct.new $cell
                ref.test (ref struct)
            )
            (func (export "test_i31_as_struct") (result i32)
                i32.const 1
                ref.i31
                ref.test (ref struct)
            )
            (func (export "cast_fails") (result i32)
                i32.const 1
                ref.i31
                ref.cast (ref $cell)
                struct.get $cell 0
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "test_struct", &[]).unwrap(),
        [Value::I32(1)]
    );
    assert_eq!(
        instance
            .invoke(&mut store, "test_i31_as_struct", &[])
            .unwrap(),
        [Value::I32(0)]
    );
    assert_eq!(
        trap_code(instance.invoke(&mut store, "cast_fails", &[])),
        TrapCode::InvalidCast
    );
}

#[test]
fn ref_func_and_call_ref() {
    let (mut store, instance) = setup(
        r#"
        (module
            (type $unop (func (param i32) (result i32)))
            (func $double (type $unop)
                local.get 0
                i32.const 2
                i32.mul
            )
            (elem declare func $double)
            (func (export "run") (param i32) (result i32)
                local.get 0
                ref.func $double
                call_ref $unop
            )
            (func (export "null_callee") (param i32) (result i32)
                local.get 0
                ref.null $unop
                call_ref $unop
            )
        )
        "#,
    );
    assert_eq!(
        instance
            .invoke(&mut store, "run", &[Value::I32(21)])
            .unwrap(),
        [Value::I32(42)]
    );
    assert_eq!(
        trap_code(instance.invoke(&mut store, "null_callee", &[Value::I32(1)])),
        TrapCode::NullAccess
    );
}

#[test]
fn ref_eq_compares_identity() {
    let (mut store, instance) = setup(
        r#"
        (module
            (type $cell (struct (field i32)))
            (func (export "same") (result i32)
                (local $a (ref null $cell))
                i32.const 1
                struct.new $cell
                local.tee $a
                local.get $a
                ref.eq
            )
            (func (export "distinct") (result i32)
                i32.const 1
                struct.new $cell
                i32.const 1
                struct.new $cell
                ref.eq
            )
            (func (export "i31_eq") (result i32)
                i32.const 7
                ref.i31
                i32.const 7
                ref.i31
                ref.eq
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "same", &[]).unwrap(),
        [Value::I32(1)]
    );
    assert_eq!(
        instance.invoke(&mut store, "distinct", &[]).unwrap(),
        [Value::I32(0)]
    );
    assert_eq!(
        instance.invoke(&mut store, "i31_eq", &[]).unwrap(),
        [Value::I32(1)]
    );
}

#[test]
fn array_fill_and_copy() {
    let (mut store, instance) = setup(
        r#"
        (module
            (type $ints (array (mut i32)))
            (func (export "run") (result i32)
                (local $a (ref null $ints))
                (local $b (ref null $ints))
                i32.const 0
                i32.const 4
                array.new $ints
                local.set $a
                ;; a = [_, 9, 9, _]
                local.get $a
                i32.const 1
                i32.const 9
                i32.const 2
                array.fill $ints
                ;; b = copy of a's middle
                i32.const 0
                i32.const 4
                array.new $ints
                local.set $b
                local.get $b
                i32.const 0
                local.get $a
                i32.const 1
                i32.const 2
                array.copy $ints $ints
                local.get $b
                i32.const 0
                array.get $ints
                local.get $b
                i32.const 1
                array.get $ints
                i32.add
            )
        )
        "#,
    );
    assert_eq!(
        instance.invoke(&mut store, "run", &[]).unwrap(),
        [Value::I32(18)]
    );
}

#[test]
fn br_on_cast_dispatch() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "classify") (param i32) (result i32)
                (local $r (ref null any))
                (block $is_i31 (result (ref i31))
                    local.get 0
                    i32.eqz
                    (if (result (ref any))
                        (then
                            i32.const 5
                            ref.i31
                        )
                        (else
                            i32.const 0
                            ref.i31
                            ;; make it a non-i31 by boxing through any
                            drop
                            i32.const 1
                            ref.i31
                        )
                    )
                    br_on_cast $is_i31 (ref any) (ref i31)
                    drop
                    i32.const -1
                    return
                )
                i31.get_s
            )
        )
        "#,
    );
    assert_eq!(
        instance
            .invoke(&mut store, "classify", &[Value::I32(0)])
            .unwrap(),
        [Value::I32(5)]
    );
    assert_eq!(
        instance
            .invoke(&mut store, "classify", &[Value::I32(1)])
            .unwrap(),
        [Value::I32(1)]
    );
}
