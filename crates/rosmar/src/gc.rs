//! The store-owned GC heap and the 8-byte reference encoding.
//!
//! A reference in a frame slot, table element or global cell is a tagged
//! 64-bit handle: the all-zero pattern is null (so zero-initialised locals
//! are null references), otherwise the low three bits carry the reference
//! kind and the upper bits an arena index or the `i31` payload.
//!
//! Heap objects live in the store's arena until the store is dropped;
//! object lifetime therefore always covers reachability.

use crate::{
    collections::{Arena, ArenaIndex},
    func::FuncIdx,
    tag::TagIdx,
    types::{CompTypeId, HeapType},
};
use core::any::Any;
use std::boxed::Box;

/// A raw index to a GC heap object.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GcIdx(u32);

impl ArenaIndex for GcIdx {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn from_usize(value: usize) -> Self {
        let value = value
            .try_into()
            .unwrap_or_else(|error| panic!("index {value} is out of bounds as gc index: {error}"));
        Self(value)
    }
}

/// The dynamic kind of a non-null reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum RefKind {
    /// A function reference; payload is a store function index.
    Func = 1,
    /// An extern host object; payload is a GC heap index.
    Extern = 2,
    /// A struct object; payload is a GC heap index.
    Struct = 3,
    /// An array object; payload is a GC heap index.
    Array = 4,
    /// An unboxed 31-bit integer; payload is the value.
    I31 = 5,
    /// An exception package; payload is a GC heap index.
    Exn = 6,
}

/// The 8-byte encoded reference value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct RawRef(u64);

impl RawRef {
    /// The null reference: the all-zero encoding.
    pub const NULL: RawRef = RawRef(0);

    const KIND_BITS: u64 = 3;
    const KIND_MASK: u64 = (1 << Self::KIND_BITS) - 1;

    /// Returns `true` for the null reference.
    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns the raw 64-bit encoding.
    #[inline]
    pub fn to_bits(self) -> u64 {
        self.0
    }

    /// Reinterprets a raw 64-bit encoding as a reference.
    #[inline]
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    fn pack(kind: RefKind, payload: u64) -> Self {
        Self((payload << Self::KIND_BITS) | kind as u64)
    }

    /// Creates a function reference.
    pub fn func(func: FuncIdx) -> Self {
        Self::pack(RefKind::Func, func.into_usize() as u64)
    }

    /// Creates a heap object reference of the given kind.
    pub fn heap(kind: RefKind, idx: GcIdx) -> Self {
        debug_assert!(!matches!(kind, RefKind::Func | RefKind::I31));
        Self::pack(kind, idx.into_usize() as u64)
    }

    /// Creates an `i31` reference boxing the low 31 bits of `value`.
    pub fn i31(value: i32) -> Self {
        Self::pack(RefKind::I31, u64::from((value as u32) & 0x7FFF_FFFF))
    }

    /// Returns the kind of the reference, or `None` when null.
    pub fn kind(self) -> Option<RefKind> {
        if self.is_null() {
            return None;
        }
        Some(match self.0 & Self::KIND_MASK {
            1 => RefKind::Func,
            2 => RefKind::Extern,
            3 => RefKind::Struct,
            4 => RefKind::Array,
            5 => RefKind::I31,
            6 => RefKind::Exn,
            kind => panic!("corrupt reference encoding with kind bits {kind}"),
        })
    }

    /// Returns the payload bits above the kind tag.
    fn payload(self) -> u64 {
        self.0 >> Self::KIND_BITS
    }

    /// Returns the function index of a function reference.
    pub fn as_func(self) -> Option<FuncIdx> {
        (self.kind() == Some(RefKind::Func))
            .then(|| FuncIdx::from_usize(self.payload() as usize))
    }

    /// Returns the GC heap index of a struct, array, extern or exception
    /// reference.
    pub fn as_heap(self) -> Option<GcIdx> {
        match self.kind() {
            Some(RefKind::Struct | RefKind::Array | RefKind::Extern | RefKind::Exn) => {
                Some(GcIdx::from_usize(self.payload() as usize))
            }
            _ => None,
        }
    }

    /// Returns the sign-extended value of an `i31` reference.
    pub fn i31_get_s(self) -> Option<i32> {
        (self.kind() == Some(RefKind::I31)).then(|| {
            let bits = (self.payload() as u32) << 1;
            (bits as i32) >> 1
        })
    }

    /// Returns the zero-extended value of an `i31` reference.
    pub fn i31_get_u(self) -> Option<i32> {
        (self.kind() == Some(RefKind::I31)).then(|| self.payload() as i32)
    }
}

/// A heap-allocated object owned by the store.
pub enum GcObject {
    /// A struct instance.
    Struct {
        /// The interned struct type defining the payload layout.
        ty: CompTypeId,
        /// The packed field payload.
        data: Box<[u8]>,
    },
    /// An array instance.
    Array {
        /// The interned array type.
        ty: CompTypeId,
        /// The byte size of one element.
        elem_size: u32,
        /// The number of elements.
        len: u32,
        /// The packed element payload.
        data: Box<[u8]>,
    },
    /// An exception package carrying a tag and its payload values.
    Exception {
        /// The store-level identity of the thrown tag.
        tag: TagIdx,
        /// The packed payload values per the tag's signature.
        payload: Box<[u8]>,
    },
    /// An opaque host object behind an `externref`.
    Extern {
        /// The host value.
        object: Box<dyn Any + Send + Sync>,
    },
}

impl core::fmt::Debug for GcObject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Struct { ty, data } => f
                .debug_struct("Struct")
                .field("ty", ty)
                .field("len", &data.len())
                .finish(),
            Self::Array { ty, len, .. } => f
                .debug_struct("Array")
                .field("ty", ty)
                .field("len", len)
                .finish(),
            Self::Exception { tag, payload } => f
                .debug_struct("Exception")
                .field("tag", tag)
                .field("len", &payload.len())
                .finish(),
            Self::Extern { .. } => f.debug_struct("Extern").finish_non_exhaustive(),
        }
    }
}

impl GcObject {
    /// Returns the heap type a reference to this object has.
    pub fn heap_type(&self) -> HeapType {
        match self {
            Self::Struct { ty, .. } | Self::Array { ty, .. } => HeapType::Concrete(*ty),
            Self::Exception { .. } => HeapType::Exn,
            Self::Extern { .. } => HeapType::Extern,
        }
    }
}

/// The store-owned GC heap.
pub type GcHeap = Arena<GcIdx, GcObject>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_all_zero() {
        assert_eq!(RawRef::NULL.to_bits(), 0);
        assert!(RawRef::from_bits(0).is_null());
        assert_eq!(RawRef::NULL.kind(), None);
    }

    #[test]
    fn i31_roundtrip() {
        for value in [0, 1, -1, 0x3FFF_FFFF, -0x4000_0000] {
            let boxed = RawRef::i31(value);
            assert_eq!(boxed.kind(), Some(RefKind::I31));
            assert_eq!(boxed.i31_get_s(), Some(value));
        }
        assert_eq!(RawRef::i31(-1).i31_get_u(), Some(0x7FFF_FFFF));
    }

    #[test]
    fn func_ref_roundtrip() {
        let func = FuncIdx::from_usize(42);
        let raw = RawRef::func(func);
        assert_eq!(raw.as_func(), Some(func));
        assert_eq!(raw.as_heap(), None);
    }
}
