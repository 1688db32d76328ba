//! Host interface tests: imports, host functions, the entity APIs.

use assert_matches::assert_matches;
use rosmar::{
    Engine,
    Error,
    Extern,
    FuncType,
    GlobalType,
    MemoryType,
    Module,
    Ref,
    Store,
    TrapCode,
    ValType,
    Value,
};

fn compile(engine: &Engine, wat: &str) -> Module {
    let wasm = wat::parse_str(wat).unwrap();
    Module::new(engine, &wasm).unwrap()
}

#[test]
fn host_function_receives_packed_arguments() {
    let engine = Engine::default();
    let module = compile(
        &engine,
        r#"
        (module
            (import "env" "add3" (func $add3 (param i32 i32 i32) (result i32)))
            (func (export "run") (result i32)
                i32.const 1
                i32.const 2
                i32.const 3
                call $add3
            )
        )
        "#,
    );
    let mut store = Store::new(&engine);
    let ty = FuncType::new(
        [ValType::I32, ValType::I32, ValType::I32],
        [ValType::I32],
    );
    // the trampoline receives the packed argument bytes and writes the
    // packed result bytes back
    let add3 = store.create_host_func(ty, |params, results| {
        let mut lanes = [0_i32; 3];
        for (i, lane) in lanes.iter_mut().enumerate() {
            let mut le = [0x00_u8; 4];
            le.copy_from_slice(&params[i * 4..(i + 1) * 4]);
            *lane = i32::from_le_bytes(le);
        }
        let sum = lanes.iter().sum::<i32>();
        results[..4].copy_from_slice(&sum.to_le_bytes());
        Ok(())
    });
    let instance = store.instantiate(&module, &[Extern::Func(add3)]).unwrap();
    assert_eq!(
        instance.invoke(&mut store, "run", &[]).unwrap(),
        [Value::I32(6)]
    );
}

#[test]
fn host_error_propagates_as_trap() {
    #[derive(Debug)]
    struct Refused;

    impl core::fmt::Display for Refused {
        fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
            write!(f, "the host refused")
        }
    }

    impl rosmar::HostError for Refused {}

    let engine = Engine::default();
    let module = compile(
        &engine,
        r#"
        (module
            (import "env" "refuse" (func $refuse))
            (func (export "run")
                call $refuse
            )
        )
        "#,
    );
    let mut store = Store::new(&engine);
    let refuse = store.create_host_func(FuncType::new([], []), |_, _| Err(Refused.into()));
    let instance = store.instantiate(&module, &[Extern::Func(refuse)]).unwrap();
    match instance.invoke(&mut store, "run", &[]) {
        Err(Error::Trap(trap)) => {
            assert!(trap.downcast_ref::<Refused>().is_some());
        }
        other => panic!("expected the host error, got: {other:?}"),
    }
}

#[test]
fn memory_api_roundtrip() {
    let engine = Engine::default();
    let module = compile(
        &engine,
        r#"
        (module
            (memory (export "mem") 1 2)
            (func (export "peek") (param i32) (result i32)
                local.get 0
                i32.load8_u
            )
        )
        "#,
    );
    let mut store = Store::new(&engine);
    let instance = store.instantiate(&module, &[]).unwrap();
    let memory = instance
        .export(&store, "mem")
        .and_then(Extern::into_memory)
        .unwrap();
    assert_eq!(memory.size(&store), 1);
    memory.write(&mut store, 5, &[0xAB]).unwrap();
    let mut byte = [0x00_u8];
    memory.read(&store, 5, &mut byte).unwrap();
    assert_eq!(byte, [0xAB]);
    assert_eq!(
        instance.invoke(&mut store, "peek", &[Value::I32(5)]).unwrap(),
        [Value::I32(0xAB)]
    );
    assert_eq!(memory.grow(&mut store, 1).unwrap(), 1);
    assert_matches!(memory.grow(&mut store, 5), Err(Error::Memory(_)));
    assert_matches!(
        memory.read(&store, 2 * 65536, &mut byte),
        Err(Error::Memory(_))
    );
}

#[test]
fn imported_memory_is_shared_between_host_and_wasm() {
    let engine = Engine::default();
    let module = compile(
        &engine,
        r#"
        (module
            (import "env" "mem" (memory 1))
            (func (export "read") (param i32) (result i32)
                local.get 0
                i32.load
            )
        )
        "#,
    );
    let mut store = Store::new(&engine);
    let memory = store.create_memory(MemoryType::new(1, None)).unwrap();
    memory
        .write(&mut store, 8, &0x1234_5678_i32.to_le_bytes())
        .unwrap();
    let instance = store.instantiate(&module, &[Extern::Memory(memory)]).unwrap();
    assert_eq!(
        instance.invoke(&mut store, "read", &[Value::I32(8)]).unwrap(),
        [Value::I32(0x1234_5678)]
    );
}

#[test]
fn import_type_mismatch_is_rejected() {
    let engine = Engine::default();
    let module = compile(
        &engine,
        r#"
        (module
            (import "env" "mem" (memory 2))
        )
        "#,
    );
    let mut store = Store::new(&engine);
    let too_small = store.create_memory(MemoryType::new(1, None)).unwrap();
    assert_matches!(
        store.instantiate(&module, &[Extern::Memory(too_small)]),
        Err(Error::Instantiation(_))
    );
    assert_matches!(
        store.instantiate(&module, &[]),
        Err(Error::Instantiation(_))
    );
}

#[test]
fn global_api_and_imported_global() {
    let engine = Engine::default();
    let module = compile(
        &engine,
        r#"
        (module
            (import "env" "base" (global $base i32))
            (global (export "derived") i32 (global.get $base))
            (func (export "get_base") (result i32)
                global.get $base
            )
        )
        "#,
    );
    let mut store = Store::new(&engine);
    let base = store.create_global(GlobalType::new(ValType::I32, false), Value::I32(1000));
    let instance = store.instantiate(&module, &[Extern::Global(base)]).unwrap();
    assert_eq!(
        instance.invoke(&mut store, "get_base", &[]).unwrap(),
        [Value::I32(1000)]
    );
    let derived = instance
        .export(&store, "derived")
        .and_then(Extern::into_global)
        .unwrap();
    assert_eq!(derived.get(&store), Value::I32(1000));
    assert_matches!(
        derived.set(&mut store, Value::I32(1)),
        Err(Error::Global(_))
    );
}

#[test]
fn table_api_and_exported_function_call() {
    let engine = Engine::default();
    let module = compile(
        &engine,
        r#"
        (module
            (table (export "tab") 4 funcref)
            (func (export "answer") (result i32)
                i32.const 42
            )
        )
        "#,
    );
    let mut store = Store::new(&engine);
    let instance = store.instantiate(&module, &[]).unwrap();
    let table = instance
        .export(&store, "tab")
        .and_then(Extern::into_table)
        .unwrap();
    assert_eq!(table.size(&store), 4);
    assert!(table.get(&store, 0).unwrap().is_null());
    table.set(&mut store, 0, Ref::i31(5)).unwrap();
    assert!(!table.get(&store, 0).unwrap().is_null());
    assert_matches!(table.get(&store, 4), Err(Error::Table(_)));

    let answer = instance
        .export(&store, "answer")
        .and_then(Extern::into_func)
        .unwrap();
    assert_eq!(answer.ty(&store).results(), [ValType::I32]);
    assert_eq!(answer.call(&mut store, &[]).unwrap(), [Value::I32(42)]);
}

#[test]
fn termination_flag_stops_execution() {
    let engine = Engine::default();
    let module = compile(
        &engine,
        r#"
        (module
            (func (export "answer") (result i32)
                i32.const 42
            )
        )
        "#,
    );
    let mut store = Store::new(&engine);
    let instance = store.instantiate(&module, &[]).unwrap();
    let handle = store.termination_handle();
    handle.store(true, std::sync::atomic::Ordering::Release);
    match instance.invoke(&mut store, "answer", &[]) {
        Err(Error::Trap(trap)) => {
            assert_eq!(trap.trap_code(), Some(TrapCode::Terminated));
        }
        other => panic!("expected the termination trap, got: {other:?}"),
    }
}

#[test]
fn cross_instance_function_import() {
    let engine = Engine::default();
    let provider = compile(
        &engine,
        r#"
        (module
            (func (export "seven") (result i32)
                i32.const 7
            )
        )
        "#,
    );
    let consumer = compile(
        &engine,
        r#"
        (module
            (import "env" "seven" (func $seven (result i32)))
            (func (export "fourteen") (result i32)
                call $seven
                call $seven
                i32.add
            )
        )
        "#,
    );
    let mut store = Store::new(&engine);
    let provider = store.instantiate(&provider, &[]).unwrap();
    let seven = provider
        .export(&store, "seven")
        .and_then(Extern::into_func)
        .unwrap();
    let consumer = store.instantiate(&consumer, &[Extern::Func(seven)]).unwrap();
    assert_eq!(
        consumer.invoke(&mut store, "fourteen", &[]).unwrap(),
        [Value::I32(14)]
    );
}
