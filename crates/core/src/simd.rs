//! The Wasm `v128` vector type and software implementations of every
//! SIMD and relaxed-SIMD instruction.
//!
//! The interpreter's SIMD handlers are thin wrappers around the free
//! functions of this module; relaxed instructions use the deterministic
//! semantics documented on each function.

use crate::{Float, LittleEndianConvert, TruncateSaturateInto};

/// The Wasm `simd` proposal's `v128` type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct V128([u8; 16]);

impl V128 {
    /// Creates a [`V128`] from its little endian bytes.
    pub const fn from_le_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the little endian bytes of the [`V128`].
    pub const fn to_le_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Creates a [`V128`] from a `u128` value.
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_le_bytes())
    }

    /// Returns the [`V128`] as a `u128` value.
    pub const fn as_u128(self) -> u128 {
        u128::from_le_bytes(self.0)
    }
}

impl From<u128> for V128 {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl From<V128> for u128 {
    fn from(value: V128) -> Self {
        value.as_u128()
    }
}

impl LittleEndianConvert for V128 {
    type Bytes = [u8; 16];

    #[inline]
    fn into_le_bytes(self) -> Self::Bytes {
        self.to_le_bytes()
    }

    #[inline]
    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        Self::from_le_bytes(bytes)
    }
}

/// A lane item type of a [`V128`] interpretation.
///
/// Implemented for `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `i64`, `u64`,
/// `f32` and `f64`.
pub trait Lane: Copy + Default + LittleEndianConvert {}
macro_rules! impl_lane {
    ( $($ty:ty),* $(,)? ) => {
        $( impl Lane for $ty {} )*
    };
}
impl_lane!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Splits a [`V128`] into its `N` lane items of type `T`.
fn from_v128<T: Lane, const N: usize>(value: V128) -> [T; N] {
    let step = 16 / N;
    let mut lanes = [T::default(); N];
    for (i, lane) in lanes.iter_mut().enumerate() {
        let mut bytes = T::Bytes::default();
        bytes
            .as_mut()
            .copy_from_slice(&value.0[i * step..(i + 1) * step]);
        *lane = T::from_le_bytes(bytes);
    }
    lanes
}

/// Combines `N` lane items of type `T` back into a [`V128`].
fn into_v128<T: Lane, const N: usize>(lanes: [T; N]) -> V128 {
    let step = 16 / N;
    let mut bytes = [0x00_u8; 16];
    for (i, lane) in lanes.into_iter().enumerate() {
        bytes[i * step..(i + 1) * step].copy_from_slice(lane.into_le_bytes().as_ref());
    }
    V128(bytes)
}

/// Applies `f` to every lane item of `value`.
fn lanewise_unary<T: Lane, const N: usize>(value: V128, f: impl Fn(T) -> T) -> V128 {
    let mut lanes: [T; N] = from_v128(value);
    for lane in &mut lanes {
        *lane = f(*lane);
    }
    into_v128(lanes)
}

/// Applies `f` to every pair of lane items of `lhs` and `rhs`.
fn lanewise_binary<T: Lane, const N: usize>(lhs: V128, rhs: V128, f: impl Fn(T, T) -> T) -> V128 {
    let mut lhs: [T; N] = from_v128(lhs);
    let rhs: [T; N] = from_v128(rhs);
    for (l, r) in lhs.iter_mut().zip(rhs) {
        *l = f(*l, r);
    }
    into_v128(lhs)
}

/// Mask item written by lanewise comparisons: all ones or all zeros.
trait MaskItem: Lane {
    const ALL_ONES: Self;
    const ALL_ZEROS: Self;
}
macro_rules! impl_mask_item {
    ( $($ty:ty),* $(,)? ) => {
        $(
            impl MaskItem for $ty {
                const ALL_ONES: Self = -1;
                const ALL_ZEROS: Self = 0;
            }
        )*
    };
}
impl_mask_item!(i8, i16, i32, i64);

/// Applies the comparison `f` lanewise, writing an all-ones mask item of
/// type `M` on `true` and all-zeros on `false`.
fn lanewise_comparison<T: Lane, M: MaskItem, const N: usize>(
    lhs: V128,
    rhs: V128,
    f: impl Fn(T, T) -> bool,
) -> V128 {
    let lhs: [T; N] = from_v128(lhs);
    let rhs: [T; N] = from_v128(rhs);
    let mut mask = [M::ALL_ZEROS; N];
    for (i, (l, r)) in lhs.into_iter().zip(rhs).enumerate() {
        if f(l, r) {
            mask[i] = M::ALL_ONES;
        }
    }
    into_v128(mask)
}

macro_rules! impl_splat_extract_replace {
    ( $(
        ($prefix:ident, $ty:ty, $n:literal, splat: $splat:ident, extract: $extract:ident, replace: $replace:ident)
    ),* $(,)? ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($prefix), ".splat` Wasm instruction.")]
            pub fn $splat(value: $ty) -> V128 {
                into_v128::<$ty, $n>([value; $n])
            }

            #[doc = concat!("Execute the `", stringify!($prefix), ".extract_lane` Wasm instruction.")]
            pub fn $extract(value: V128, lane: u8) -> $ty {
                from_v128::<$ty, $n>(value)[(lane as usize) % $n]
            }

            #[doc = concat!("Execute the `", stringify!($prefix), ".replace_lane` Wasm instruction.")]
            pub fn $replace(value: V128, lane: u8, item: $ty) -> V128 {
                let mut lanes = from_v128::<$ty, $n>(value);
                lanes[(lane as usize) % $n] = item;
                into_v128(lanes)
            }
        )*
    };
}
impl_splat_extract_replace! {
    (i8x16, i8, 16, splat: i8x16_splat, extract: i8x16_extract_lane_s, replace: i8x16_replace_lane),
    (i16x8, i16, 8, splat: i16x8_splat, extract: i16x8_extract_lane_s, replace: i16x8_replace_lane),
    (i32x4, i32, 4, splat: i32x4_splat, extract: i32x4_extract_lane, replace: i32x4_replace_lane),
    (i64x2, i64, 2, splat: i64x2_splat, extract: i64x2_extract_lane, replace: i64x2_replace_lane),
    (f32x4, f32, 4, splat: f32x4_splat, extract: f32x4_extract_lane, replace: f32x4_replace_lane),
    (f64x2, f64, 2, splat: f64x2_splat, extract: f64x2_extract_lane, replace: f64x2_replace_lane),
}

/// Execute the `i8x16.extract_lane_u` Wasm instruction.
pub fn i8x16_extract_lane_u(value: V128, lane: u8) -> u8 {
    i8x16_extract_lane_s(value, lane) as u8
}

/// Execute the `i16x8.extract_lane_u` Wasm instruction.
pub fn i16x8_extract_lane_u(value: V128, lane: u8) -> u16 {
    i16x8_extract_lane_s(value, lane) as u16
}

macro_rules! impl_simd_unary {
    ( $(
        fn $name:ident($ty:ty; $n:literal) = $f:expr;
    )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm SIMD instruction.")]
            pub fn $name(value: V128) -> V128 {
                lanewise_unary::<$ty, $n>(value, $f)
            }
        )*
    };
}
impl_simd_unary! {
    fn i8x16_neg(i8; 16) = i8::wrapping_neg;
    fn i16x8_neg(i16; 8) = i16::wrapping_neg;
    fn i32x4_neg(i32; 4) = i32::wrapping_neg;
    fn i64x2_neg(i64; 2) = i64::wrapping_neg;
    fn i8x16_abs(i8; 16) = i8::wrapping_abs;
    fn i16x8_abs(i16; 8) = i16::wrapping_abs;
    fn i32x4_abs(i32; 4) = i32::wrapping_abs;
    fn i64x2_abs(i64; 2) = i64::wrapping_abs;
    fn i8x16_popcnt(u8; 16) = |v: u8| v.count_ones() as u8;
    fn f32x4_abs(f32; 4) = f32::abs;
    fn f64x2_abs(f64; 2) = f64::abs;
    fn f32x4_neg(f32; 4) = |v: f32| -v;
    fn f64x2_neg(f64; 2) = |v: f64| -v;
    fn f32x4_sqrt(f32; 4) = f32::sqrt;
    fn f64x2_sqrt(f64; 2) = f64::sqrt;
    fn f32x4_ceil(f32; 4) = f32::ceil;
    fn f64x2_ceil(f64; 2) = f64::ceil;
    fn f32x4_floor(f32; 4) = f32::floor;
    fn f64x2_floor(f64; 2) = f64::floor;
    fn f32x4_trunc(f32; 4) = f32::trunc;
    fn f64x2_trunc(f64; 2) = f64::trunc;
    fn f32x4_nearest(f32; 4) = Float::nearest;
    fn f64x2_nearest(f64; 2) = Float::nearest;
}

/// Execute the `v128.not` Wasm instruction.
pub fn v128_not(value: V128) -> V128 {
    V128::from_u128(!value.as_u128())
}

macro_rules! impl_simd_binary {
    ( $(
        fn $name:ident($ty:ty; $n:literal) = $f:expr;
    )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm SIMD instruction.")]
            pub fn $name(lhs: V128, rhs: V128) -> V128 {
                lanewise_binary::<$ty, $n>(lhs, rhs, $f)
            }
        )*
    };
}
impl_simd_binary! {
    fn i8x16_add(i8; 16) = i8::wrapping_add;
    fn i16x8_add(i16; 8) = i16::wrapping_add;
    fn i32x4_add(i32; 4) = i32::wrapping_add;
    fn i64x2_add(i64; 2) = i64::wrapping_add;
    fn i8x16_sub(i8; 16) = i8::wrapping_sub;
    fn i16x8_sub(i16; 8) = i16::wrapping_sub;
    fn i32x4_sub(i32; 4) = i32::wrapping_sub;
    fn i64x2_sub(i64; 2) = i64::wrapping_sub;
    fn i16x8_mul(i16; 8) = i16::wrapping_mul;
    fn i32x4_mul(i32; 4) = i32::wrapping_mul;
    fn i64x2_mul(i64; 2) = i64::wrapping_mul;
    fn i8x16_add_sat_s(i8; 16) = i8::saturating_add;
    fn i16x8_add_sat_s(i16; 8) = i16::saturating_add;
    fn i8x16_add_sat_u(u8; 16) = u8::saturating_add;
    fn i16x8_add_sat_u(u16; 8) = u16::saturating_add;
    fn i8x16_sub_sat_s(i8; 16) = i8::saturating_sub;
    fn i16x8_sub_sat_s(i16; 8) = i16::saturating_sub;
    fn i8x16_sub_sat_u(u8; 16) = u8::saturating_sub;
    fn i16x8_sub_sat_u(u16; 8) = u16::saturating_sub;
    fn i8x16_min_s(i8; 16) = i8::min;
    fn i16x8_min_s(i16; 8) = i16::min;
    fn i32x4_min_s(i32; 4) = i32::min;
    fn i8x16_min_u(u8; 16) = u8::min;
    fn i16x8_min_u(u16; 8) = u16::min;
    fn i32x4_min_u(u32; 4) = u32::min;
    fn i8x16_max_s(i8; 16) = i8::max;
    fn i16x8_max_s(i16; 8) = i16::max;
    fn i32x4_max_s(i32; 4) = i32::max;
    fn i8x16_max_u(u8; 16) = u8::max;
    fn i16x8_max_u(u16; 8) = u16::max;
    fn i32x4_max_u(u32; 4) = u32::max;
    fn i8x16_avgr_u(u8; 16) = |a: u8, b: u8| ((a as u16 + b as u16 + 1) / 2) as u8;
    fn i16x8_avgr_u(u16; 8) = |a: u16, b: u16| ((a as u32 + b as u32 + 1) / 2) as u16;
    fn i16x8_q15mulr_sat_s(i16; 8) = q15mulr_sat;
    fn f32x4_add(f32; 4) = |a, b| a + b;
    fn f64x2_add(f64; 2) = |a, b| a + b;
    fn f32x4_sub(f32; 4) = |a, b| a - b;
    fn f64x2_sub(f64; 2) = |a, b| a - b;
    fn f32x4_mul(f32; 4) = |a, b| a * b;
    fn f64x2_mul(f64; 2) = |a, b| a * b;
    fn f32x4_div(f32; 4) = |a, b| a / b;
    fn f64x2_div(f64; 2) = |a, b| a / b;
    fn f32x4_min(f32; 4) = Float::min;
    fn f64x2_min(f64; 2) = Float::min;
    fn f32x4_max(f32; 4) = Float::max;
    fn f64x2_max(f64; 2) = Float::max;
    fn f32x4_pmin(f32; 4) = |a: f32, b: f32| if b < a { b } else { a };
    fn f64x2_pmin(f64; 2) = |a: f64, b: f64| if b < a { b } else { a };
    fn f32x4_pmax(f32; 4) = |a: f32, b: f32| if a < b { b } else { a };
    fn f64x2_pmax(f64; 2) = |a: f64, b: f64| if a < b { b } else { a };
}

/// Rounding, saturating multiplication of Q15 fixed-point values.
fn q15mulr_sat(lhs: i16, rhs: i16) -> i16 {
    let product = i32::from(lhs) * i32::from(rhs);
    let rounded = (product + (1 << 14)) >> 15;
    rounded.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Execute the `v128.and` Wasm instruction.
pub fn v128_and(lhs: V128, rhs: V128) -> V128 {
    V128::from_u128(lhs.as_u128() & rhs.as_u128())
}

/// Execute the `v128.or` Wasm instruction.
pub fn v128_or(lhs: V128, rhs: V128) -> V128 {
    V128::from_u128(lhs.as_u128() | rhs.as_u128())
}

/// Execute the `v128.xor` Wasm instruction.
pub fn v128_xor(lhs: V128, rhs: V128) -> V128 {
    V128::from_u128(lhs.as_u128() ^ rhs.as_u128())
}

/// Execute the `v128.andnot` Wasm instruction.
pub fn v128_andnot(lhs: V128, rhs: V128) -> V128 {
    V128::from_u128(lhs.as_u128() & !rhs.as_u128())
}

/// Execute the `v128.bitselect` Wasm instruction.
pub fn v128_bitselect(if_ones: V128, if_zeros: V128, mask: V128) -> V128 {
    let mask = mask.as_u128();
    V128::from_u128((if_ones.as_u128() & mask) | (if_zeros.as_u128() & !mask))
}

macro_rules! impl_simd_comparison {
    ( $(
        fn $name:ident($ty:ty as $mask:ty; $n:literal) = $f:expr;
    )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm SIMD instruction.")]
            pub fn $name(lhs: V128, rhs: V128) -> V128 {
                lanewise_comparison::<$ty, $mask, $n>(lhs, rhs, $f)
            }
        )*
    };
}
macro_rules! cmp {
    ( $operator:tt ) => {{
        |lhs, rhs| lhs $operator rhs
    }};
}
impl_simd_comparison! {
    fn i8x16_eq(i8 as i8; 16) = cmp!(==);
    fn i8x16_ne(i8 as i8; 16) = cmp!(!=);
    fn i8x16_lt_s(i8 as i8; 16) = cmp!(<);
    fn i8x16_lt_u(u8 as i8; 16) = cmp!(<);
    fn i8x16_gt_s(i8 as i8; 16) = cmp!(>);
    fn i8x16_gt_u(u8 as i8; 16) = cmp!(>);
    fn i8x16_le_s(i8 as i8; 16) = cmp!(<=);
    fn i8x16_le_u(u8 as i8; 16) = cmp!(<=);
    fn i8x16_ge_s(i8 as i8; 16) = cmp!(>=);
    fn i8x16_ge_u(u8 as i8; 16) = cmp!(>=);
    fn i16x8_eq(i16 as i16; 8) = cmp!(==);
    fn i16x8_ne(i16 as i16; 8) = cmp!(!=);
    fn i16x8_lt_s(i16 as i16; 8) = cmp!(<);
    fn i16x8_lt_u(u16 as i16; 8) = cmp!(<);
    fn i16x8_gt_s(i16 as i16; 8) = cmp!(>);
    fn i16x8_gt_u(u16 as i16; 8) = cmp!(>);
    fn i16x8_le_s(i16 as i16; 8) = cmp!(<=);
    fn i16x8_le_u(u16 as i16; 8) = cmp!(<=);
    fn i16x8_ge_s(i16 as i16; 8) = cmp!(>=);
    fn i16x8_ge_u(u16 as i16; 8) = cmp!(>=);
    fn i32x4_eq(i32 as i32; 4) = cmp!(==);
    fn i32x4_ne(i32 as i32; 4) = cmp!(!=);
    fn i32x4_lt_s(i32 as i32; 4) = cmp!(<);
    fn i32x4_lt_u(u32 as i32; 4) = cmp!(<);
    fn i32x4_gt_s(i32 as i32; 4) = cmp!(>);
    fn i32x4_gt_u(u32 as i32; 4) = cmp!(>);
    fn i32x4_le_s(i32 as i32; 4) = cmp!(<=);
    fn i32x4_le_u(u32 as i32; 4) = cmp!(<=);
    fn i32x4_ge_s(i32 as i32; 4) = cmp!(>=);
    fn i32x4_ge_u(u32 as i32; 4) = cmp!(>=);
    fn i64x2_eq(i64 as i64; 2) = cmp!(==);
    fn i64x2_ne(i64 as i64; 2) = cmp!(!=);
    fn i64x2_lt_s(i64 as i64; 2) = cmp!(<);
    fn i64x2_gt_s(i64 as i64; 2) = cmp!(>);
    fn i64x2_le_s(i64 as i64; 2) = cmp!(<=);
    fn i64x2_ge_s(i64 as i64; 2) = cmp!(>=);
    fn f32x4_eq(f32 as i32; 4) = cmp!(==);
    fn f32x4_ne(f32 as i32; 4) = cmp!(!=);
    fn f32x4_lt(f32 as i32; 4) = cmp!(<);
    fn f32x4_gt(f32 as i32; 4) = cmp!(>);
    fn f32x4_le(f32 as i32; 4) = cmp!(<=);
    fn f32x4_ge(f32 as i32; 4) = cmp!(>=);
    fn f64x2_eq(f64 as i64; 2) = cmp!(==);
    fn f64x2_ne(f64 as i64; 2) = cmp!(!=);
    fn f64x2_lt(f64 as i64; 2) = cmp!(<);
    fn f64x2_gt(f64 as i64; 2) = cmp!(>);
    fn f64x2_le(f64 as i64; 2) = cmp!(<=);
    fn f64x2_ge(f64 as i64; 2) = cmp!(>=);
}

macro_rules! impl_simd_shift {
    ( $(
        fn $name:ident($ty:ty; $n:literal) = $f:expr;
    )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm SIMD instruction.")]
            ///
            /// The shift `amount` is taken modulo the lane width.
            pub fn $name(value: V128, amount: i32) -> V128 {
                let masked = (amount as u32) % (::core::mem::size_of::<$ty>() as u32 * 8);
                lanewise_unary::<$ty, $n>(value, |v| ($f)(v, masked))
            }
        )*
    };
}
impl_simd_shift! {
    fn i8x16_shl(i8; 16) = |v: i8, s: u32| v.wrapping_shl(s);
    fn i16x8_shl(i16; 8) = |v: i16, s: u32| v.wrapping_shl(s);
    fn i32x4_shl(i32; 4) = |v: i32, s: u32| v.wrapping_shl(s);
    fn i64x2_shl(i64; 2) = |v: i64, s: u32| v.wrapping_shl(s);
    fn i8x16_shr_s(i8; 16) = |v: i8, s: u32| v.wrapping_shr(s);
    fn i16x8_shr_s(i16; 8) = |v: i16, s: u32| v.wrapping_shr(s);
    fn i32x4_shr_s(i32; 4) = |v: i32, s: u32| v.wrapping_shr(s);
    fn i64x2_shr_s(i64; 2) = |v: i64, s: u32| v.wrapping_shr(s);
    fn i8x16_shr_u(u8; 16) = |v: u8, s: u32| v.wrapping_shr(s);
    fn i16x8_shr_u(u16; 8) = |v: u16, s: u32| v.wrapping_shr(s);
    fn i32x4_shr_u(u32; 4) = |v: u32, s: u32| v.wrapping_shr(s);
    fn i64x2_shr_u(u64; 2) = |v: u64, s: u32| v.wrapping_shr(s);
}

macro_rules! impl_simd_all_true {
    ( $( fn $name:ident($ty:ty; $n:literal); )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm SIMD instruction.")]
            pub fn $name(value: V128) -> i32 {
                let lanes: [$ty; $n] = from_v128(value);
                i32::from(lanes.iter().all(|lane| *lane != 0))
            }
        )*
    };
}
impl_simd_all_true! {
    fn i8x16_all_true(i8; 16);
    fn i16x8_all_true(i16; 8);
    fn i32x4_all_true(i32; 4);
    fn i64x2_all_true(i64; 2);
}

/// Execute the `v128.any_true` Wasm instruction.
pub fn v128_any_true(value: V128) -> i32 {
    i32::from(value.as_u128() != 0)
}

macro_rules! impl_simd_bitmask {
    ( $( fn $name:ident($ty:ty; $n:literal); )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm SIMD instruction.")]
            ///
            /// Collects the sign bit of every lane into the low bits of the result.
            pub fn $name(value: V128) -> i32 {
                let lanes: [$ty; $n] = from_v128(value);
                let mut mask = 0_i32;
                for (i, lane) in lanes.into_iter().enumerate() {
                    if lane < 0 {
                        mask |= 1 << i;
                    }
                }
                mask
            }
        )*
    };
}
impl_simd_bitmask! {
    fn i8x16_bitmask(i8; 16);
    fn i16x8_bitmask(i16; 8);
    fn i32x4_bitmask(i32; 4);
    fn i64x2_bitmask(i64; 2);
}

/// Execute the `i8x16.swizzle` Wasm instruction.
///
/// Selection indices out of bounds produce a zero lane.
pub fn i8x16_swizzle(value: V128, selector: V128) -> V128 {
    let value: [u8; 16] = from_v128(value);
    let selector: [u8; 16] = from_v128(selector);
    let mut result = [0x00_u8; 16];
    for (lane, select) in result.iter_mut().zip(selector) {
        if let Some(item) = value.get(select as usize) {
            *lane = *item;
        }
    }
    into_v128(result)
}

/// Execute the `i8x16.relaxed_swizzle` Wasm instruction.
///
/// Deterministic semantics: identical to [`i8x16_swizzle`].
pub fn i8x16_relaxed_swizzle(value: V128, selector: V128) -> V128 {
    i8x16_swizzle(value, selector)
}

/// Execute the `i8x16.shuffle` Wasm instruction.
pub fn i8x16_shuffle(lhs: V128, rhs: V128, selector: [u8; 16]) -> V128 {
    let lhs: [u8; 16] = from_v128(lhs);
    let rhs: [u8; 16] = from_v128(rhs);
    let mut result = [0x00_u8; 16];
    for (lane, select) in result.iter_mut().zip(selector) {
        let select = (select as usize) % 32;
        *lane = if select < 16 {
            lhs[select]
        } else {
            rhs[select - 16]
        };
    }
    into_v128(result)
}

macro_rules! impl_simd_narrow {
    ( $(
        fn $name:ident($wide:ty => $narrow:ty; $n_wide:literal => $n_narrow:literal);
    )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm SIMD instruction.")]
            ///
            /// Saturates each wide lane into the narrow lane type; the low
            /// half of the result comes from `lhs`, the high half from `rhs`.
            pub fn $name(lhs: V128, rhs: V128) -> V128 {
                let lhs: [$wide; $n_wide] = from_v128(lhs);
                let rhs: [$wide; $n_wide] = from_v128(rhs);
                let mut result = [0 as $narrow; $n_narrow];
                for i in 0..$n_wide {
                    result[i] = sat_narrow::<$wide, $narrow>(lhs[i]);
                    result[i + $n_wide] = sat_narrow::<$wide, $narrow>(rhs[i]);
                }
                into_v128(result)
            }
        )*
    };
}

/// Saturating conversion helper for the SIMD `narrow` family.
fn sat_narrow<W, N>(value: W) -> N
where
    W: Copy + PartialOrd + TryInto<N>,
    N: Bounded + Into<W>,
{
    if value >= N::MAX_VALUE.into() {
        return N::MAX_VALUE;
    }
    if value <= N::MIN_VALUE.into() {
        return N::MIN_VALUE;
    }
    match value.try_into() {
        Ok(narrow) => narrow,
        Err(_) => N::MIN_VALUE,
    }
}

/// Minimum and maximum constants for the saturating narrow helper.
trait Bounded: Copy {
    const MIN_VALUE: Self;
    const MAX_VALUE: Self;
}
macro_rules! impl_bounded {
    ( $($ty:ty),* $(,)? ) => {
        $(
            impl Bounded for $ty {
                const MIN_VALUE: Self = <$ty>::MIN;
                const MAX_VALUE: Self = <$ty>::MAX;
            }
        )*
    };
}
impl_bounded!(i8, u8, i16, u16);

impl_simd_narrow! {
    fn i8x16_narrow_i16x8_s(i16 => i8; 8 => 16);
    fn i8x16_narrow_i16x8_u(i16 => u8; 8 => 16);
    fn i16x8_narrow_i32x4_s(i32 => i16; 4 => 8);
    fn i16x8_narrow_i32x4_u(i32 => u16; 4 => 8);
}

macro_rules! impl_simd_extend {
    ( $(
        fn $name:ident($narrow:ty => $wide:ty; $n_wide:literal, $half:ident);
    )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm SIMD instruction.")]
            pub fn $name(value: V128) -> V128 {
                let narrow: [$narrow; $n_wide * 2] = from_v128(value);
                let base = half_base!($half, $n_wide);
                let mut wide = [0 as $wide; $n_wide];
                for i in 0..$n_wide {
                    wide[i] = narrow[base + i] as $wide;
                }
                into_v128(wide)
            }
        )*
    };
}
macro_rules! half_base {
    (low, $n:literal) => {
        0
    };
    (high, $n:literal) => {
        $n
    };
}
impl_simd_extend! {
    fn i16x8_extend_low_i8x16_s(i8 => i16; 8, low);
    fn i16x8_extend_high_i8x16_s(i8 => i16; 8, high);
    fn i16x8_extend_low_i8x16_u(u8 => i16; 8, low);
    fn i16x8_extend_high_i8x16_u(u8 => i16; 8, high);
    fn i32x4_extend_low_i16x8_s(i16 => i32; 4, low);
    fn i32x4_extend_high_i16x8_s(i16 => i32; 4, high);
    fn i32x4_extend_low_i16x8_u(u16 => i32; 4, low);
    fn i32x4_extend_high_i16x8_u(u16 => i32; 4, high);
    fn i64x2_extend_low_i32x4_s(i32 => i64; 2, low);
    fn i64x2_extend_high_i32x4_s(i32 => i64; 2, high);
    fn i64x2_extend_low_i32x4_u(u32 => i64; 2, low);
    fn i64x2_extend_high_i32x4_u(u32 => i64; 2, high);
}

macro_rules! impl_simd_extmul {
    ( $(
        fn $name:ident($narrow:ty => $wide:ty; $n_wide:literal, $half:ident);
    )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm SIMD instruction.")]
            pub fn $name(lhs: V128, rhs: V128) -> V128 {
                let lhs: [$narrow; $n_wide * 2] = from_v128(lhs);
                let rhs: [$narrow; $n_wide * 2] = from_v128(rhs);
                let base = half_base!($half, $n_wide);
                let mut wide = [0 as $wide; $n_wide];
                for i in 0..$n_wide {
                    wide[i] = (lhs[base + i] as $wide).wrapping_mul(rhs[base + i] as $wide);
                }
                into_v128(wide)
            }
        )*
    };
}
impl_simd_extmul! {
    fn i16x8_extmul_low_i8x16_s(i8 => i16; 8, low);
    fn i16x8_extmul_high_i8x16_s(i8 => i16; 8, high);
    fn i16x8_extmul_low_i8x16_u(u8 => i16; 8, low);
    fn i16x8_extmul_high_i8x16_u(u8 => i16; 8, high);
    fn i32x4_extmul_low_i16x8_s(i16 => i32; 4, low);
    fn i32x4_extmul_high_i16x8_s(i16 => i32; 4, high);
    fn i32x4_extmul_low_i16x8_u(u16 => i32; 4, low);
    fn i32x4_extmul_high_i16x8_u(u16 => i32; 4, high);
    fn i64x2_extmul_low_i32x4_s(i32 => i64; 2, low);
    fn i64x2_extmul_high_i32x4_s(i32 => i64; 2, high);
    fn i64x2_extmul_low_i32x4_u(u32 => i64; 2, low);
    fn i64x2_extmul_high_i32x4_u(u32 => i64; 2, high);
}

macro_rules! impl_simd_extadd_pairwise {
    ( $(
        fn $name:ident($narrow:ty => $wide:ty; $n_wide:literal);
    )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm SIMD instruction.")]
            pub fn $name(value: V128) -> V128 {
                let narrow: [$narrow; $n_wide * 2] = from_v128(value);
                let mut wide = [0 as $wide; $n_wide];
                for i in 0..$n_wide {
                    wide[i] = (narrow[2 * i] as $wide).wrapping_add(narrow[2 * i + 1] as $wide);
                }
                into_v128(wide)
            }
        )*
    };
}
impl_simd_extadd_pairwise! {
    fn i16x8_extadd_pairwise_i8x16_s(i8 => i16; 8);
    fn i16x8_extadd_pairwise_i8x16_u(u8 => i16; 8);
    fn i32x4_extadd_pairwise_i16x8_s(i16 => i32; 4);
    fn i32x4_extadd_pairwise_i16x8_u(u16 => i32; 4);
}

/// Execute the `i32x4.dot_i16x8_s` Wasm instruction.
pub fn i32x4_dot_i16x8_s(lhs: V128, rhs: V128) -> V128 {
    let lhs: [i16; 8] = from_v128(lhs);
    let rhs: [i16; 8] = from_v128(rhs);
    let mut result = [0_i32; 4];
    for i in 0..4 {
        let lo = i32::from(lhs[2 * i]) * i32::from(rhs[2 * i]);
        let hi = i32::from(lhs[2 * i + 1]) * i32::from(rhs[2 * i + 1]);
        result[i] = lo.wrapping_add(hi);
    }
    into_v128(result)
}

/// Execute the `i16x8.relaxed_dot_i8x16_i7x16_s` Wasm instruction.
///
/// Deterministic semantics: both operands are treated as signed.
pub fn i16x8_relaxed_dot_i8x16_i7x16_s(lhs: V128, rhs: V128) -> V128 {
    let lhs: [i8; 16] = from_v128(lhs);
    let rhs: [i8; 16] = from_v128(rhs);
    let mut result = [0_i16; 8];
    for i in 0..8 {
        let lo = i16::from(lhs[2 * i]) * i16::from(rhs[2 * i]);
        let hi = i16::from(lhs[2 * i + 1]) * i16::from(rhs[2 * i + 1]);
        result[i] = lo.saturating_add(hi);
    }
    into_v128(result)
}

/// Execute the `i32x4.relaxed_dot_i8x16_i7x16_add_s` Wasm instruction.
pub fn i32x4_relaxed_dot_i8x16_i7x16_add_s(lhs: V128, rhs: V128, acc: V128) -> V128 {
    let dot: [i16; 8] = from_v128(i16x8_relaxed_dot_i8x16_i7x16_s(lhs, rhs));
    let acc: [i32; 4] = from_v128(acc);
    let mut result = [0_i32; 4];
    for i in 0..4 {
        let pair = i32::from(dot[2 * i]).wrapping_add(i32::from(dot[2 * i + 1]));
        result[i] = pair.wrapping_add(acc[i]);
    }
    into_v128(result)
}

macro_rules! impl_simd_fma {
    ( $(
        fn $name:ident($ty:ty; $n:literal, $negate:literal);
    )* ) => {
        $(
            #[doc = concat!("Execute the `", stringify!($name), "` Wasm relaxed SIMD instruction.")]
            ///
            /// Deterministic semantics: fused multiply-add per lane.
            pub fn $name(a: V128, b: V128, c: V128) -> V128 {
                let a: [$ty; $n] = from_v128(a);
                let b: [$ty; $n] = from_v128(b);
                let c: [$ty; $n] = from_v128(c);
                let mut result = [0.0 as $ty; $n];
                for i in 0..$n {
                    let product = if $negate { -a[i] } else { a[i] };
                    result[i] = product.mul_add(b[i], c[i]);
                }
                into_v128(result)
            }
        )*
    };
}
impl_simd_fma! {
    fn f32x4_relaxed_madd(f32; 4, false);
    fn f32x4_relaxed_nmadd(f32; 4, true);
    fn f64x2_relaxed_madd(f64; 2, false);
    fn f64x2_relaxed_nmadd(f64; 2, true);
}

/// Execute the `relaxed_laneselect` family of Wasm instructions.
///
/// Deterministic semantics: identical to [`v128_bitselect`].
pub fn v128_relaxed_laneselect(if_ones: V128, if_zeros: V128, mask: V128) -> V128 {
    v128_bitselect(if_ones, if_zeros, mask)
}

/// Execute the `f32x4.relaxed_min` Wasm instruction (deterministic: Wasm `min`).
pub fn f32x4_relaxed_min(lhs: V128, rhs: V128) -> V128 {
    f32x4_min(lhs, rhs)
}

/// Execute the `f32x4.relaxed_max` Wasm instruction (deterministic: Wasm `max`).
pub fn f32x4_relaxed_max(lhs: V128, rhs: V128) -> V128 {
    f32x4_max(lhs, rhs)
}

/// Execute the `f64x2.relaxed_min` Wasm instruction (deterministic: Wasm `min`).
pub fn f64x2_relaxed_min(lhs: V128, rhs: V128) -> V128 {
    f64x2_min(lhs, rhs)
}

/// Execute the `f64x2.relaxed_max` Wasm instruction (deterministic: Wasm `max`).
pub fn f64x2_relaxed_max(lhs: V128, rhs: V128) -> V128 {
    f64x2_max(lhs, rhs)
}

/// Execute the `i16x8.relaxed_q15mulr_s` Wasm instruction (deterministic).
pub fn i16x8_relaxed_q15mulr_s(lhs: V128, rhs: V128) -> V128 {
    i16x8_q15mulr_sat_s(lhs, rhs)
}

// Conversions between lane interpretations.

/// Execute the `f32x4.convert_i32x4_s` Wasm instruction.
pub fn f32x4_convert_i32x4_s(value: V128) -> V128 {
    let lanes: [i32; 4] = from_v128(value);
    into_v128(lanes.map(|v| v as f32))
}

/// Execute the `f32x4.convert_i32x4_u` Wasm instruction.
pub fn f32x4_convert_i32x4_u(value: V128) -> V128 {
    let lanes: [u32; 4] = from_v128(value);
    into_v128(lanes.map(|v| v as f32))
}

/// Execute the `f64x2.convert_low_i32x4_s` Wasm instruction.
pub fn f64x2_convert_low_i32x4_s(value: V128) -> V128 {
    let lanes: [i32; 4] = from_v128(value);
    into_v128([f64::from(lanes[0]), f64::from(lanes[1])])
}

/// Execute the `f64x2.convert_low_i32x4_u` Wasm instruction.
pub fn f64x2_convert_low_i32x4_u(value: V128) -> V128 {
    let lanes: [u32; 4] = from_v128(value);
    into_v128([f64::from(lanes[0]), f64::from(lanes[1])])
}

/// Execute the `i32x4.trunc_sat_f32x4_s` Wasm instruction.
pub fn i32x4_trunc_sat_f32x4_s(value: V128) -> V128 {
    let lanes: [f32; 4] = from_v128(value);
    into_v128(lanes.map(TruncateSaturateInto::<i32>::truncate_saturate_into))
}

/// Execute the `i32x4.trunc_sat_f32x4_u` Wasm instruction.
pub fn i32x4_trunc_sat_f32x4_u(value: V128) -> V128 {
    let lanes: [f32; 4] = from_v128(value);
    into_v128(lanes.map(TruncateSaturateInto::<u32>::truncate_saturate_into))
}

/// Execute the `i32x4.trunc_sat_f64x2_s_zero` Wasm instruction.
pub fn i32x4_trunc_sat_f64x2_s_zero(value: V128) -> V128 {
    let lanes: [f64; 2] = from_v128(value);
    into_v128([
        TruncateSaturateInto::<i32>::truncate_saturate_into(lanes[0]),
        TruncateSaturateInto::<i32>::truncate_saturate_into(lanes[1]),
        0,
        0,
    ])
}

/// Execute the `i32x4.trunc_sat_f64x2_u_zero` Wasm instruction.
pub fn i32x4_trunc_sat_f64x2_u_zero(value: V128) -> V128 {
    let lanes: [f64; 2] = from_v128(value);
    into_v128([
        TruncateSaturateInto::<u32>::truncate_saturate_into(lanes[0]),
        TruncateSaturateInto::<u32>::truncate_saturate_into(lanes[1]),
        0,
        0,
    ])
}

/// Execute the `i32x4.relaxed_trunc_f32x4_s` Wasm instruction (deterministic).
pub fn i32x4_relaxed_trunc_f32x4_s(value: V128) -> V128 {
    i32x4_trunc_sat_f32x4_s(value)
}

/// Execute the `i32x4.relaxed_trunc_f32x4_u` Wasm instruction (deterministic).
pub fn i32x4_relaxed_trunc_f32x4_u(value: V128) -> V128 {
    i32x4_trunc_sat_f32x4_u(value)
}

/// Execute the `i32x4.relaxed_trunc_f64x2_s_zero` Wasm instruction (deterministic).
pub fn i32x4_relaxed_trunc_f64x2_s_zero(value: V128) -> V128 {
    i32x4_trunc_sat_f64x2_s_zero(value)
}

/// Execute the `i32x4.relaxed_trunc_f64x2_u_zero` Wasm instruction (deterministic).
pub fn i32x4_relaxed_trunc_f64x2_u_zero(value: V128) -> V128 {
    i32x4_trunc_sat_f64x2_u_zero(value)
}

/// Execute the `f32x4.demote_f64x2_zero` Wasm instruction.
pub fn f32x4_demote_f64x2_zero(value: V128) -> V128 {
    let lanes: [f64; 2] = from_v128(value);
    into_v128([lanes[0] as f32, lanes[1] as f32, 0.0, 0.0])
}

/// Execute the `f64x2.promote_low_f32x4` Wasm instruction.
pub fn f64x2_promote_low_f32x4(value: V128) -> V128 {
    let lanes: [f32; 4] = from_v128(value);
    into_v128([f64::from(lanes[0]), f64::from(lanes[1])])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v_i32x4(lanes: [i32; 4]) -> V128 {
        into_v128(lanes)
    }

    #[test]
    fn i32x4_add_lanes() {
        let lhs = v_i32x4([1, 2, 3, 4]);
        let rhs = v_i32x4([10, 20, 30, 40]);
        assert_eq!(i32x4_add(lhs, rhs), v_i32x4([11, 22, 33, 44]));
    }

    #[test]
    fn replace_then_extract_lane() {
        let v = i32x4_splat(7);
        let v = i32x4_replace_lane(v, 2, 42);
        assert_eq!(i32x4_extract_lane(v, 2), 42);
        assert_eq!(i32x4_extract_lane(v, 1), 7);
    }

    #[test]
    fn f32x4_min_nan_and_zero_signs() {
        let lhs = into_v128([f32::NAN, 1.0, -0.0, 3.0]);
        let rhs = into_v128([0.0_f32, 2.0, 0.0, f32::NAN]);
        let result: [f32; 4] = from_v128(f32x4_min(lhs, rhs));
        assert!(result[0].is_nan());
        assert_eq!(result[1], 1.0);
        assert!(result[2].is_sign_negative());
        assert!(result[3].is_nan());
    }

    #[test]
    fn nearest_tie_to_zero_keeps_the_sign_per_lane() {
        let input = into_v128([-0.5_f32, 0.5, -2.5, 1.5]);
        let result: [f32; 4] = from_v128(f32x4_nearest(input));
        assert_eq!(result[0], 0.0);
        assert!(result[0].is_sign_negative());
        assert_eq!(result[1], 0.0);
        assert!(result[1].is_sign_positive());
        assert_eq!(result[2], -2.0);
        assert_eq!(result[3], 2.0);

        let input = into_v128([-0.5_f64, 0.5]);
        let result: [f64; 2] = from_v128(f64x2_nearest(input));
        assert_eq!(result[0], 0.0);
        assert!(result[0].is_sign_negative());
    }

    #[test]
    fn narrow_saturates() {
        let wide = into_v128([300_i16, -300, 5, 0, 0, 0, 0, 0]);
        let narrowed: [i8; 16] = from_v128(i8x16_narrow_i16x8_s(wide, wide));
        assert_eq!(narrowed[0], i8::MAX);
        assert_eq!(narrowed[1], i8::MIN);
        assert_eq!(narrowed[2], 5);
    }

    #[test]
    fn bitmask_collects_sign_bits() {
        let v = into_v128([-1_i32, 1, -5, 0]);
        assert_eq!(i32x4_bitmask(v), 0b0101);
    }

    #[test]
    fn shuffle_selects_across_operands() {
        let lhs: V128 = into_v128(core::array::from_fn::<u8, 16, _>(|i| i as u8));
        let rhs: V128 = into_v128(core::array::from_fn::<u8, 16, _>(|i| 16 + i as u8));
        let idx: [u8; 16] = core::array::from_fn(|i| if i % 2 == 0 { i as u8 } else { 16 + i as u8 });
        let out: [u8; 16] = from_v128(i8x16_shuffle(lhs, rhs, idx));
        for (i, lane) in out.iter().enumerate() {
            let expect = if i % 2 == 0 { i as u8 } else { 16 + i as u8 };
            assert_eq!(*lane, expect);
        }
    }
}
