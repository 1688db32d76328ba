//! SIMD execution tests.

use rosmar::{Engine, Instance, Module, Store, Value, V128};

fn setup(wat: &str) -> (Store, Instance) {
    let engine = Engine::default();
    let wasm = wat::parse_str(wat).unwrap();
    let module = Module::new(&engine, &wasm).unwrap();
    let mut store = Store::new(&engine);
    let instance = store.instantiate(&module, &[]).unwrap();
    (store, instance)
}

fn v128(lanes: [i32; 4]) -> V128 {
    let mut bytes = [0x00_u8; 16];
    for (i, lane) in lanes.iter().enumerate() {
        bytes[i * 4..(i + 1) * 4].copy_from_slice(&lane.to_le_bytes());
    }
    V128::from_le_bytes(bytes)
}

fn f32x4(lanes: [f32; 4]) -> V128 {
    let mut bytes = [0x00_u8; 16];
    for (i, lane) in lanes.iter().enumerate() {
        bytes[i * 4..(i + 1) * 4].copy_from_slice(&lane.to_bits().to_le_bytes());
    }
    V128::from_le_bytes(bytes)
}

#[test]
fn i32x4_add_lanes() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "add") (param v128 v128) (result v128)
                local.get 0
                local.get 1
                i32x4.add
            )
        )
        "#,
    );
    let results = instance
        .invoke(
            &mut store,
            "add",
            &[
                Value::V128(v128([1, 2, 3, 4])),
                Value::V128(v128([10, 20, 30, 40])),
            ],
        )
        .unwrap();
    assert_eq!(results, [Value::V128(v128([11, 22, 33, 44]))]);
}

#[test]
fn f32x4_min_propagates_nan_and_signed_zero() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "min") (param v128 v128) (result v128)
                local.get 0
                local.get 1
                f32x4.min
            )
        )
        "#,
    );
    let lhs = f32x4([f32::NAN, 1.0, -0.0, 3.0]);
    let rhs = f32x4([0.0, 2.0, 0.0, f32::NAN]);
    let results = instance
        .invoke(&mut store, "min", &[Value::V128(lhs), Value::V128(rhs)])
        .unwrap();
    let Value::V128(out) = results[0] else {
        panic!("expected a v128 result");
    };
    let bytes = out.to_le_bytes();
    let lane = |i: usize| {
        let mut le = [0x00_u8; 4];
        le.copy_from_slice(&bytes[i * 4..(i + 1) * 4]);
        f32::from_bits(u32::from_le_bytes(le))
    };
    assert!(lane(0).is_nan());
    assert_eq!(lane(1), 1.0);
    assert!(lane(2) == 0.0 && lane(2).is_sign_negative());
    assert!(lane(3).is_nan());
}

#[test]
fn replace_then_extract_lane_law() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "replace_extract") (param v128 i32) (result i32)
                local.get 0
                local.get 1
                i32x4.replace_lane 2
                i32x4.extract_lane 2
            )
            (func (export "replace_other") (param v128 i32) (result i32)
                local.get 0
                local.get 1
                i32x4.replace_lane 2
                i32x4.extract_lane 1
            )
        )
        "#,
    );
    let vector = v128([5, 6, 7, 8]);
    assert_eq!(
        instance
            .invoke(
                &mut store,
                "replace_extract",
                &[Value::V128(vector), Value::I32(99)]
            )
            .unwrap(),
        [Value::I32(99)]
    );
    // other lanes are unaffected by the replacement
    assert_eq!(
        instance
            .invoke(
                &mut store,
                "replace_other",
                &[Value::V128(vector), Value::I32(99)]
            )
            .unwrap(),
        [Value::I32(6)]
    );
}

#[test]
fn splat_and_all_true() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "splat_all_true") (param i32) (result i32)
                local.get 0
                i32x4.splat
                i32x4.all_true
            )
            (func (export "bitmask") (param v128) (result i32)
                local.get 0
                i32x4.bitmask
            )
        )
        "#,
    );
    assert_eq!(
        instance
            .invoke(&mut store, "splat_all_true", &[Value::I32(3)])
            .unwrap(),
        [Value::I32(1)]
    );
    assert_eq!(
        instance
            .invoke(&mut store, "splat_all_true", &[Value::I32(0)])
            .unwrap(),
        [Value::I32(0)]
    );
    assert_eq!(
        instance
            .invoke(
                &mut store,
                "bitmask",
                &[Value::V128(v128([-1, 1, -5, 0]))]
            )
            .unwrap(),
        [Value::I32(0b0101)]
    );
}

#[test]
fn v128_memory_roundtrip() {
    let (mut store, instance) = setup(
        r#"
        (module
            (memory 1)
            (func (export "roundtrip") (param v128) (result v128)
                i32.const 16
                local.get 0
                v128.store
                i32.const 16
                v128.load
            )
        )
        "#,
    );
    let vector = v128([i32::MIN, -1, 0, i32::MAX]);
    assert_eq!(
        instance
            .invoke(&mut store, "roundtrip", &[Value::V128(vector)])
            .unwrap(),
        [Value::V128(vector)]
    );
}

#[test]
fn shuffle_interleaves_operands() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "low_halves") (param v128 v128) (result v128)
                local.get 0
                local.get 1
                i8x16.shuffle 0 1 2 3 4 5 6 7 16 17 18 19 20 21 22 23
            )
        )
        "#,
    );
    let lhs = v128([1, 2, 3, 4]);
    let rhs = v128([5, 6, 7, 8]);
    assert_eq!(
        instance
            .invoke(&mut store, "low_halves", &[Value::V128(lhs), Value::V128(rhs)])
            .unwrap(),
        [Value::V128(v128([1, 2, 5, 6]))]
    );
}

#[test]
fn v128_const_and_bitselect() {
    let (mut store, instance) = setup(
        r#"
        (module
            (func (export "mask_low") (param v128) (result v128)
                local.get 0
                v128.const i32x4 0 0 0 0
                v128.const i32x4 -1 -1 0 0
                v128.bitselect
            )
        )
        "#,
    );
    assert_eq!(
        instance
            .invoke(&mut store, "mask_low", &[Value::V128(v128([9, 8, 7, 6]))])
            .unwrap(),
        [Value::V128(v128([9, 8, 0, 0]))]
    );
}
