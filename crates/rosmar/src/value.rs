//! Runtime values at the public API boundary.

use crate::{gc::RawRef, types::ValType};
use rosmar_core::{F32, F64, V128};

/// An opaque reference value.
///
/// References are owning handles into the store that created them; the
/// null reference is shared by all stores.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Ref {
    pub(crate) raw: RawRef,
}

impl Ref {
    /// The null reference.
    pub fn null() -> Self {
        Self { raw: RawRef::NULL }
    }

    /// Returns `true` for the null reference.
    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    /// Creates an `i31` reference from the low 31 bits of `value`.
    pub fn i31(value: i32) -> Self {
        Self {
            raw: RawRef::i31(value),
        }
    }

    pub(crate) fn from_raw(raw: RawRef) -> Self {
        Self { raw }
    }
}

/// A runtime value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Value {
    /// A 32-bit integer.
    I32(i32),
    /// A 64-bit integer.
    I64(i64),
    /// A NaN preserving 32-bit float.
    F32(F32),
    /// A NaN preserving 64-bit float.
    F64(F64),
    /// A 128-bit vector.
    V128(V128),
    /// A reference.
    Ref(Ref),
}

impl Value {
    /// Creates the default (all zero) value of the given type.
    pub fn default_for(ty: ValType) -> Self {
        match ty {
            ValType::I32 => Self::I32(0),
            ValType::I64 => Self::I64(0),
            ValType::F32 => Self::F32(F32::from_bits(0)),
            ValType::F64 => Self::F64(F64::from_bits(0)),
            ValType::V128 => Self::V128(V128::from_u128(0)),
            ValType::Ref(_) => Self::Ref(Ref::null()),
        }
    }

    /// Returns `true` when the value inhabits `ty`.
    ///
    /// Reference values match every reference type here; precise heap
    /// subtype checks require the store and happen at the API boundary.
    pub fn matches_type(&self, ty: ValType) -> bool {
        matches!(
            (self, ty),
            (Self::I32(_), ValType::I32)
                | (Self::I64(_), ValType::I64)
                | (Self::F32(_), ValType::F32)
                | (Self::F64(_), ValType::F64)
                | (Self::V128(_), ValType::V128)
                | (Self::Ref(_), ValType::Ref(_))
        )
    }

    /// Returns the `i32` value, if any.
    pub fn i32(&self) -> Option<i32> {
        if let Self::I32(value) = self {
            return Some(*value);
        }
        None
    }

    /// Returns the `i64` value, if any.
    pub fn i64(&self) -> Option<i64> {
        if let Self::I64(value) = self {
            return Some(*value);
        }
        None
    }

    /// Writes the frame byte representation of the value to `cell`.
    ///
    /// # Panics
    ///
    /// Panics when `cell` is smaller than the value representation.
    pub(crate) fn write_to(&self, cell: &mut [u8]) {
        match self {
            Self::I32(value) => cell[..4].copy_from_slice(&value.to_le_bytes()),
            Self::I64(value) => cell[..8].copy_from_slice(&value.to_le_bytes()),
            Self::F32(value) => cell[..4].copy_from_slice(&value.to_bits().to_le_bytes()),
            Self::F64(value) => cell[..8].copy_from_slice(&value.to_bits().to_le_bytes()),
            Self::V128(value) => cell[..16].copy_from_slice(&value.to_le_bytes()),
            Self::Ref(value) => cell[..8].copy_from_slice(&value.raw.to_bits().to_le_bytes()),
        }
    }

    /// Reads a value of type `ty` from its frame byte representation.
    pub(crate) fn read_from(ty: ValType, cell: &[u8]) -> Self {
        let mut quad = [0x00_u8; 4];
        let mut octa = [0x00_u8; 8];
        match ty {
            ValType::I32 => {
                quad.copy_from_slice(&cell[..4]);
                Self::I32(i32::from_le_bytes(quad))
            }
            ValType::I64 => {
                octa.copy_from_slice(&cell[..8]);
                Self::I64(i64::from_le_bytes(octa))
            }
            ValType::F32 => {
                quad.copy_from_slice(&cell[..4]);
                Self::F32(F32::from_bits(u32::from_le_bytes(quad)))
            }
            ValType::F64 => {
                octa.copy_from_slice(&cell[..8]);
                Self::F64(F64::from_bits(u64::from_le_bytes(octa)))
            }
            ValType::V128 => {
                let mut bytes = [0x00_u8; 16];
                bytes.copy_from_slice(&cell[..16]);
                Self::V128(V128::from_le_bytes(bytes))
            }
            ValType::Ref(_) => {
                octa.copy_from_slice(&cell[..8]);
                Self::Ref(Ref::from_raw(RawRef::from_bits(u64::from_le_bytes(octa))))
            }
        }
    }
}

macro_rules! impl_from_value {
    ( $( impl From<$ty:ty> for Value::$variant:ident; )* ) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}
impl_from_value! {
    impl From<i32> for Value::I32;
    impl From<i64> for Value::I64;
    impl From<f32> for Value::F32;
    impl From<f64> for Value::F64;
    impl From<F32> for Value::F32;
    impl From<F64> for Value::F64;
    impl From<V128> for Value::V128;
    impl From<Ref> for Value::Ref;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_representation_roundtrip() {
        let mut cell = [0x00_u8; 16];
        Value::I32(-5).write_to(&mut cell);
        assert_eq!(Value::read_from(ValType::I32, &cell), Value::I32(-5));
        Value::from(2.5_f64).write_to(&mut cell);
        assert_eq!(
            Value::read_from(ValType::F64, &cell),
            Value::F64(F64::from_float(2.5))
        );
        Value::Ref(Ref::null()).write_to(&mut cell);
        assert_eq!(
            Value::read_from(ValType::FUNC_REF, &cell),
            Value::Ref(Ref::null())
        );
    }
}
