//! The type model of the VM: scalar value types, the reference subtype
//! lattice, packed field types, and composite types held in interned
//! recursive type groups.

mod registry;

pub use self::registry::{CompTypeId, PreHeapType, PreSubType, RecGroupIdx, TypeRegistry};

use std::{boxed::Box, vec::Vec};

/// The type of a Wasm value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValType {
    /// 32-bit signed or unsigned integer.
    I32,
    /// 64-bit signed or unsigned integer.
    I64,
    /// 32-bit IEEE 754-2008 floating point number.
    F32,
    /// 64-bit IEEE 754-2008 floating point number.
    F64,
    /// A 128-bit vector.
    V128,
    /// A reference.
    Ref(RefType),
}

impl ValType {
    /// Shorthand for the nullable `funcref` type.
    pub const FUNC_REF: Self = Self::Ref(RefType::FUNC_REF);
    /// Shorthand for the nullable `externref` type.
    pub const EXTERN_REF: Self = Self::Ref(RefType::EXTERN_REF);

    /// Returns the number of bytes a value of this type occupies in a frame.
    ///
    /// References are 8-byte encoded handles; `v128` occupies 16 bytes.
    pub fn frame_size(&self) -> u16 {
        match self {
            Self::I32 | Self::F32 => 4,
            Self::I64 | Self::F64 | Self::Ref(_) => 8,
            Self::V128 => 16,
        }
    }

    /// Returns `true` if [`ValType`] is a Wasm numeric type.
    pub fn is_num(&self) -> bool {
        matches!(self, Self::I32 | Self::I64 | Self::F32 | Self::F64)
    }

    /// Returns `true` if [`ValType`] is a Wasm reference type.
    pub fn is_ref(&self) -> bool {
        matches!(self, Self::Ref(_))
    }
}

/// A reference type: a heap type plus nullability.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RefType {
    /// Whether the null reference inhabits the type.
    pub nullable: bool,
    /// The heap type of the referenced objects.
    pub heap: HeapType,
}

impl RefType {
    /// The nullable `funcref` type.
    pub const FUNC_REF: Self = Self {
        nullable: true,
        heap: HeapType::Func,
    };
    /// The nullable `externref` type.
    pub const EXTERN_REF: Self = Self {
        nullable: true,
        heap: HeapType::Extern,
    };
    /// The nullable `exnref` type.
    pub const EXN_REF: Self = Self {
        nullable: true,
        heap: HeapType::Exn,
    };
}

/// A heap type of the reference subtype lattice.
///
/// The lattice has the top elements `any`, `extern` and `func`, the bottom
/// elements `none`, `noextern` and `nofunc`, and concrete composite types
/// between `func` or `eq` and the respective bottom.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HeapType {
    /// Top of the internal reference hierarchy.
    Any,
    /// Supertype of all comparable internal references.
    Eq,
    /// Unboxed 31-bit integers.
    I31,
    /// Supertype of all struct types.
    Struct,
    /// Supertype of all array types.
    Array,
    /// Bottom of the internal reference hierarchy.
    None,
    /// Top of the function reference hierarchy.
    Func,
    /// Bottom of the function reference hierarchy.
    NoFunc,
    /// Top of the external reference hierarchy.
    Extern,
    /// Bottom of the external reference hierarchy.
    NoExtern,
    /// Exception references.
    Exn,
    /// Bottom of the exception reference hierarchy.
    NoExn,
    /// A concrete composite type interned in the registry.
    Concrete(CompTypeId),
}

/// The storage type of a struct field or array element.
///
/// The packed types `i8` and `i16` exist only here; reading them onto the
/// operand stack widens to `i32` with the signedness supplied by the read
/// instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// A packed 8-bit integer.
    I8,
    /// A packed 16-bit integer.
    I16,
    /// An unpacked value type.
    Val(ValType),
}

impl StorageType {
    /// Returns the number of bytes the storage type occupies inside a
    /// struct or array payload.
    pub fn byte_size(&self) -> u32 {
        match self {
            Self::I8 => 1,
            Self::I16 => 2,
            Self::Val(ty) => u32::from(ty.frame_size()),
        }
    }

    /// Returns the unpacked [`ValType`] the storage widens to on read.
    pub fn unpacked(&self) -> ValType {
        match self {
            Self::I8 | Self::I16 => ValType::I32,
            Self::Val(ty) => *ty,
        }
    }

    /// Returns `true` for the packed `i8`/`i16` storage types.
    pub fn is_packed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16)
    }
}

/// The type of a struct field or array element.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FieldType {
    /// The storage type of the field.
    pub storage: StorageType,
    /// Whether the field can be mutated after construction.
    pub mutable: bool,
}

/// A function type: parameter and result value types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncType {
    /// The combined parameter and result types, parameters first.
    params_results: Box<[ValType]>,
    /// The number of leading parameter types.
    len_params: usize,
}

impl FuncType {
    /// Creates a new [`FuncType`] from the given parameters and results.
    pub fn new<P, R>(params: P, results: R) -> Self
    where
        P: IntoIterator<Item = ValType>,
        R: IntoIterator<Item = ValType>,
    {
        let mut params_results: Vec<ValType> = params.into_iter().collect();
        let len_params = params_results.len();
        params_results.extend(results);
        Self {
            params_results: params_results.into_boxed_slice(),
            len_params,
        }
    }

    /// Returns the parameter types.
    pub fn params(&self) -> &[ValType] {
        &self.params_results[..self.len_params]
    }

    /// Returns the result types.
    pub fn results(&self) -> &[ValType] {
        &self.params_results[self.len_params..]
    }

    /// Returns the frame byte size of the packed parameter region.
    ///
    /// Parameters are laid out back to back at natural alignment starting
    /// at the frame base.
    pub fn param_frame_size(&self) -> u32 {
        packed_frame_size(self.params())
    }

    /// Returns the frame byte size of the packed result region.
    pub fn result_frame_size(&self) -> u32 {
        packed_frame_size(self.results())
    }

    /// Returns the byte offsets of the packed parameters.
    pub fn param_offsets(&self) -> Vec<u32> {
        packed_offsets(self.params())
    }

    /// Returns the byte offsets of the packed results.
    pub fn result_offsets(&self) -> Vec<u32> {
        packed_offsets(self.results())
    }
}

/// Computes the byte offsets of values packed back to back at natural
/// alignment starting at offset zero.
pub(crate) fn packed_offsets(types: &[ValType]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(types.len());
    let mut cursor = 0_u32;
    for ty in types {
        let size = u32::from(ty.frame_size());
        cursor = align_up(cursor, size);
        offsets.push(cursor);
        cursor += size;
    }
    offsets
}

/// Computes the total packed byte size of the given value types.
pub(crate) fn packed_frame_size(types: &[ValType]) -> u32 {
    let mut cursor = 0_u32;
    for ty in types {
        let size = u32::from(ty.frame_size());
        cursor = align_up(cursor, size) + size;
    }
    align_up(cursor, 8)
}

/// Rounds `value` up to the next multiple of `align`.
pub(crate) fn align_up(value: u32, align: u32) -> u32 {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// A struct type with its precomputed payload layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructType {
    /// The field types in declaration order.
    pub fields: Box<[FieldType]>,
    /// The byte offset of every field within the payload.
    pub field_offsets: Box<[u32]>,
    /// The total payload size in bytes.
    pub size: u32,
}

impl StructType {
    /// Creates a [`StructType`] computing the payload layout.
    pub fn new(fields: Box<[FieldType]>) -> Self {
        let mut offsets = Vec::with_capacity(fields.len());
        let mut cursor = 0_u32;
        for field in &fields[..] {
            let size = field.storage.byte_size();
            cursor = align_up(cursor, size);
            offsets.push(cursor);
            cursor += size;
        }
        Self {
            fields,
            field_offsets: offsets.into_boxed_slice(),
            size: cursor,
        }
    }
}

/// An array type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    /// The element type.
    pub elem: FieldType,
}

/// A composite type held inside a recursive type group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompositeType {
    /// A function type.
    Func(FuncType),
    /// A struct type.
    Struct(StructType),
    /// An array type.
    Array(ArrayType),
}

impl CompositeType {
    /// Returns the function type, or `None` for structs and arrays.
    pub fn as_func(&self) -> Option<&FuncType> {
        if let Self::Func(ty) = self {
            return Some(ty);
        }
        None
    }

    /// Returns the struct type, or `None` otherwise.
    pub fn as_struct(&self) -> Option<&StructType> {
        if let Self::Struct(ty) = self {
            return Some(ty);
        }
        None
    }

    /// Returns the array type, or `None` otherwise.
    pub fn as_array(&self) -> Option<&ArrayType> {
        if let Self::Array(ty) = self {
            return Some(ty);
        }
        None
    }
}

/// A single type definition within a recursive group: a composite type
/// plus its declared supertype and finality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubType {
    /// Whether further subtypes of this type are forbidden.
    pub is_final: bool,
    /// The declared supertype, already resolved to its interned identity.
    pub supertype: Option<CompTypeId>,
    /// The composite type itself.
    pub composite: CompositeType,
}
