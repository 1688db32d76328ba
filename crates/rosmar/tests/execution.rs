//! Execution tests of the scalar instruction set, calls and control flow.

use assert_matches::assert_matches;
use rosmar::{Engine, Error, Instance, Module, Store, TrapCode, Value};

fn setup(wat: &str) -> (Store, Instance) {
    let engine = Engine::default();
    let wasm = wat::parse_str(wat).unwrap();
    let module = Module::new(&engine, &wasm).unwrap();
    let mut store = Store::new(&engine);
    let instance = store.instantiate(&module, &[]).unwrap();
    (store, instance)
}

fn invoke(store: &mut Store, instance: &Instance, name: &str, args: &[Value]) -> Vec<Value> {
    instance.invoke(store, name, args).unwrap()
}

fn invoke_trap(store: &mut Store, instance: &Instance, name: &str, args: &[Value]) -> TrapCode {
    match instance.invoke(store, name, args) {
        Err(Error::Trap(trap)) => trap.trap_code().expect("expected an instruction trap"),
        other => panic!("expected a trap, got: {other:?}"),
    }
}

#[test]
fn add_two_numbers() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "add") (param i32 i32) (result i32)
                local.get 0
                local.get 1
                i32.add
            )
        )
        "#,
    );
    let results = invoke(&mut store, &instance, "add", &[Value::I32(2), Value::I32(3)]);
    assert_eq!(results, [Value::I32(5)]);
}

#[test]
fn store_then_load() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1)
            (func (export "store_then_load") (param i32 i32) (result i32)
                local.get 0
                local.get 1
                i32.store
                local.get 0
                i32.load
            )
        )
        "#,
    );
    let value = 0xDEAD_BEEF_u32 as i32;
    let results = invoke(
        &mut store,
        &instance,
        "store_then_load",
        &[Value::I32(0), Value::I32(value)],
    );
    assert_eq!(results, [Value::I32(value)]);
    // the access at the memory boundary traps and leaves memory unmodified
    let code = invoke_trap(
        &mut store,
        &instance,
        "store_then_load",
        &[Value::I32(65536), Value::I32(1)],
    );
    assert_eq!(code, TrapCode::OutOfBoundsMemAccess);
    let results = invoke(
        &mut store,
        &instance,
        "store_then_load",
        &[Value::I32(65532), Value::I32(7)],
    );
    assert_eq!(results, [Value::I32(7)]);
}

#[test]
fn division_traps() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "div_s") (param i32 i32) (result i32)
                local.get 0
                local.get 1
                i32.div_s
            )
        )
        "#,
    );
    assert_eq!(
        invoke(&mut store, &instance, "div_s", &[Value::I32(7), Value::I32(-2)]),
        [Value::I32(-3)]
    );
    assert_eq!(
        invoke_trap(&mut store, &instance, "div_s", &[Value::I32(7), Value::I32(0)]),
        TrapCode::IntegerDivideByZero
    );
    assert_eq!(
        invoke_trap(
            &mut store,
            &instance,
            "div_s",
            &[Value::I32(i32::MIN), Value::I32(-1)]
        ),
        TrapCode::IntegerOverflow
    );
}

#[test]
fn call_indirect_check_chain() {
    let (mut store, instance) = setup(
        r#"
        (module
            (type $binop (func (param i32 i32) (result i32)))
            (type $unop (func (param i32) (result i32)))
            (func $add (type $binop)
                local.get 0
                local.get 1
                i32.add
            )
            (func $neg (type $unop)
                i32.const 0
                local.get 0
                i32.sub
            )
            (table 4 funcref)
            (elem (i32.const 0) $add)
            (elem (i32.const 3) $neg)
            (func (export "call") (param i32) (result i32)
                i32.const 20
                i32.const 22
                local.get 0
                call_indirect (type $binop)
            )
        )
        "#,
    );
    assert_eq!(
        invoke(&mut store, &instance, "call", &[Value::I32(0)]),
        [Value::I32(42)]
    );
    assert_eq!(
        invoke_trap(&mut store, &instance, "call", &[Value::I32(5)]),
        TrapCode::UndefinedElement
    );
    assert_eq!(
        invoke_trap(&mut store, &instance, "call", &[Value::I32(2)]),
        TrapCode::UninitializedElement
    );
    assert_eq!(
        invoke_trap(&mut store, &instance, "call", &[Value::I32(3)]),
        TrapCode::IndirectCallTypeMismatch
    );
}

#[test]
fn unreachable_traps() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "boom")
                unreachable
            )
        )
        "#,
    );
    assert_eq!(
        invoke_trap(&mut store, &instance, "boom", &[]),
        TrapCode::UnreachableExecuted
    );
}

#[test]
fn memory_grow_returns_old_size() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1 3)
            (func (export "grow") (param i32) (result i32)
                local.get 0
                memory.grow
            )
            (func (export "size") (result i32)
                memory.size
            )
        )
        "#,
    );
    assert_eq!(invoke(&mut store, &instance, "size", &[]), [Value::I32(1)]);
    assert_eq!(
        invoke(&mut store, &instance, "grow", &[Value::I32(1)]),
        [Value::I32(1)]
    );
    assert_eq!(
        invoke(&mut store, &instance, "grow", &[Value::I32(5)]),
        [Value::I32(-1)]
    );
    assert_eq!(invoke(&mut store, &instance, "size", &[]), [Value::I32(2)]);
}

#[test]
fn reinterpret_roundtrip_law() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "roundtrip") (param i32) (result i32)
                local.get 0
                f32.reinterpret_i32
                i32.reinterpret_f32
            )
        )
        "#,
    );
    for bits in [0, 1, -1, 0x7FC0_0000_u32 as i32, i32::MIN] {
        assert_eq!(
            invoke(&mut store, &instance, "roundtrip", &[Value::I32(bits)]),
            [Value::I32(bits)]
        );
    }
}

#[test]
fn trunc_sat_boundaries() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "sat_u") (param f32) (result i32)
                local.get 0
                i32.trunc_sat_f32_u
            )
            (func (export "sat_s") (param f32) (result i32)
                local.get 0
                i32.trunc_sat_f32_s
            )
        )
        "#,
    );
    assert_eq!(
        invoke(&mut store, &instance, "sat_u", &[Value::from(f32::NAN)]),
        [Value::I32(0)]
    );
    assert_eq!(
        invoke(&mut store, &instance, "sat_u", &[Value::from(f32::INFINITY)]),
        [Value::I32(-1)]
    );
    assert_eq!(
        invoke(&mut store, &instance, "sat_s", &[Value::from(f32::NEG_INFINITY)]),
        [Value::I32(i32::MIN)]
    );
}

#[test]
fn loops_and_branches() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "sum_to") (param i32) (result i32)
                (local $acc i32)
                (local $i i32)
                (block $exit
                    (loop $continue
                        local.get $i
                        local.get 0
                        i32.ge_s
                        br_if $exit
                        local.get $acc
                        local.get $i
                        i32.add
                        local.set $acc
                        local.get $i
                        i32.const 1
                        i32.add
                        local.set $i
                        br $continue
                    )
                )
                local.get $acc
            )
        )
        "#,
    );
    assert_eq!(
        invoke(&mut store, &instance, "sum_to", &[Value::I32(10)]),
        [Value::I32(45)]
    );
    assert_eq!(
        invoke(&mut store, &instance, "sum_to", &[Value::I32(0)]),
        [Value::I32(0)]
    );
}

#[test]
fn br_table_dispatch() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "classify") (param i32) (result i32)
                (block $default
                    (block $two
                        (block $one
                            (block $zero
                                local.get 0
                                br_table $zero $one $two $default
                            )
                            i32.const 100
                            return
                        )
                        i32.const 200
                        return
                    )
                    i32.const 300
                    return
                )
                i32.const 400
            )
        )
        "#,
    );
    for (input, expected) in [(0, 100), (1, 200), (2, 300), (3, 400), (999, 400)] {
        assert_eq!(
            invoke(&mut store, &instance, "classify", &[Value::I32(input)]),
            [Value::I32(expected)]
        );
    }
}

#[test]
fn if_else_and_select() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "max") (param i32 i32) (result i32)
                local.get 0
                local.get 1
                local.get 0
                local.get 1
                i32.gt_s
                select
            )
            (func (export "abs") (param i32) (result i32)
                local.get 0
                i32.const 0
                i32.lt_s
                (if (result i32)
                    (then
                        i32.const 0
                        local.get 0
                        i32.sub
                    )
                    (else local.get 0)
                )
            )
        )
        "#,
    );
    assert_eq!(
        invoke(&mut store, &instance, "max", &[Value::I32(3), Value::I32(9)]),
        [Value::I32(9)]
    );
    assert_eq!(
        invoke(&mut store, &instance, "abs", &[Value::I32(-5)]),
        [Value::I32(5)]
    );
    assert_eq!(
        invoke(&mut store, &instance, "abs", &[Value::I32(5)]),
        [Value::I32(5)]
    );
}

#[test]
fn calls_pass_arguments_bit_for_bit() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func $mix (param i64 f64 i32) (result i64)
                local.get 0
                local.get 1
                i64.reinterpret_f64
                i64.xor
                local.get 2
                i64.extend_i32_u
                i64.add
            )
            (func (export "outer") (param i64 f64 i32) (result i64)
                local.get 0
                local.get 1
                local.get 2
                call $mix
            )
        )
        "#,
    );
    let bits = f64::from_bits(0x0123_4567_89AB_CDEF);
    let expected = (0x1122_3344_5566_7788_u64 ^ 0x0123_4567_89AB_CDEF) as i64 + 9;
    assert_eq!(
        invoke(
            &mut store,
            &instance,
            "outer",
            &[
                Value::I64(0x1122_3344_5566_7788_u64 as i64),
                Value::from(bits),
                Value::I32(9)
            ]
        ),
        [Value::I64(expected)]
    );
}

#[test]
fn tail_call_reuses_activation() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func $countdown (param i32) (result i32)
                local.get 0
                i32.eqz
                (if (result i32)
                    (then i32.const 42)
                    (else
                        local.get 0
                        i32.const 1
                        i32.sub
                        return_call $countdown
                    )
                )
            )
            (func (export "run") (param i32) (result i32)
                local.get 0
                call $countdown
            )
        )
        "#,
    );
    // deeper than the recursion limit, which tail calls must not consume
    assert_eq!(
        invoke(&mut store, &instance, "run", &[Value::I32(100_000)]),
        [Value::I32(42)]
    );
}

#[test]
fn deep_recursion_exhausts_the_stack() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func $down (export "down") (param i32) (result i32)
                local.get 0
                i32.eqz
                (if (result i32)
                    (then i32.const 0)
                    (else
                        local.get 0
                        i32.const 1
                        i32.sub
                        call $down
                    )
                )
            )
        )
        "#,
    );
    assert_eq!(
        invoke_trap(&mut store, &instance, "down", &[Value::I32(1_000_000)]),
        TrapCode::StackOverflow
    );
}

#[test]
fn globals_and_start_function() {
    let (mut store, instance) = setup(
        r#"
        (module
            (global $counter (mut i32) (i32.const 7))
            (func $bump
                global.get $counter
                i32.const 1
                i32.add
                global.set $counter
            )
            (start $bump)
            (func (export "get") (result i32)
                global.get $counter
            )
        )
        "#,
    );
    assert_eq!(invoke(&mut store, &instance, "get", &[]), [Value::I32(8)]);
}

#[test]
fn multi_value_results() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "divmod") (param i32 i32) (result i32 i32)
                local.get 0
                local.get 1
                i32.div_u
                local.get 0
                local.get 1
                i32.rem_u
            )
        )
        "#,
    );
    assert_eq!(
        invoke(
            &mut store,
            &instance,
            "divmod",
            &[Value::I32(17), Value::I32(5)]
        ),
        [Value::I32(3), Value::I32(2)]
    );
}

#[test]
fn argument_type_mismatch_is_rejected() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "id") (param i32) (result i32) local.get 0)
        )
        "#,
    );
    assert_matches!(
        instance.invoke(&mut store, "id", &[Value::I64(1)]),
        Err(Error::Func(_))
    );
    assert_matches!(
        instance.invoke(&mut store, "id", &[]),
        Err(Error::Func(_))
    );
    assert_matches!(
        instance.invoke(&mut store, "missing", &[]),
        Err(Error::ExportNotFound(_))
    );
}
