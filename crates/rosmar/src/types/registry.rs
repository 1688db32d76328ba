//! Interning of recursive type groups.
//!
//! A recursive group is an ordered sequence of composite types that may
//! reference each other or themselves. Groups are canonicalised by
//! structural identity so that type equality reduces to identity of the
//! interned handles; a composite type's group never changes after
//! interning.

use super::{CompositeType, FieldType, FuncType, HeapType, RefType, StorageType, SubType, ValType};
use std::{boxed::Box, collections::HashMap, vec::Vec};

/// The identity of an interned recursive type group.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RecGroupIdx(pub u32);

impl RecGroupIdx {
    /// The sentinel group of not-yet-interned, group-local type references.
    ///
    /// Only ever observed inside [`TypeRegistry::intern`]; interned types
    /// never carry it.
    pub const PENDING: RecGroupIdx = RecGroupIdx(u32::MAX);
}

/// The canonical identity of a composite type: its interned group plus the
/// index within the group.
///
/// Two composite types are equal exactly when their [`CompTypeId`]s are.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CompTypeId {
    /// The interned recursive group.
    pub group: RecGroupIdx,
    /// The index of the type within its group.
    pub index: u32,
}

impl CompTypeId {
    /// Creates the sentinel id of the `index`-th type of the group that is
    /// currently being interned.
    pub fn local(index: u32) -> Self {
        Self {
            group: RecGroupIdx::PENDING,
            index,
        }
    }

    /// Returns `true` while the id refers into the group being interned.
    fn is_local(&self) -> bool {
        self.group == RecGroupIdx::PENDING
    }
}

/// A to-be-interned heap type: either already canonical or group-local.
///
/// Exists only as parser input vocabulary; [`TypeRegistry::intern`]
/// resolves group-local references during interning.
pub type PreHeapType = HeapType;

/// A to-be-interned type definition, possibly with group-local references
/// expressed through [`CompTypeId::local`].
pub type PreSubType = SubType;

/// The canonicalising registry of recursive type groups.
///
/// Owned by the engine; shared by every module and store attached to it.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    /// The interned groups. A group's types never change after interning.
    groups: Vec<Box<[SubType]>>,
    /// Canonical (group-local sentinel) forms mapped to interned groups.
    intern: HashMap<Box<[SubType]>, RecGroupIdx>,
}

impl TypeRegistry {
    /// Creates an empty [`TypeRegistry`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a recursive group given in canonical pre-form.
    ///
    /// Group-local references use [`CompTypeId::local`]; references to
    /// types of other groups must already be canonical. Returns the
    /// identities of the group members in order; structurally equal groups
    /// intern to the same identities.
    pub fn intern(&mut self, group: Vec<PreSubType>) -> Vec<CompTypeId> {
        let key: Box<[SubType]> = group.into_boxed_slice();
        let idx = match self.intern.get(&key).copied() {
            Some(idx) => idx,
            None => {
                let idx = RecGroupIdx(self.groups.len() as u32);
                let mut resolved = key.clone();
                for ty in resolved.iter_mut() {
                    resolve_sub_type(ty, idx);
                }
                self.groups.push(resolved);
                self.intern.insert(key, idx);
                idx
            }
        };
        (0..self.groups[idx.0 as usize].len() as u32)
            .map(|index| CompTypeId { group: idx, index })
            .collect()
    }

    /// Returns the type definition behind `id`.
    ///
    /// # Panics
    ///
    /// Panics on ids not produced by this registry.
    pub fn sub_type(&self, id: CompTypeId) -> &SubType {
        &self.groups[id.group.0 as usize][id.index as usize]
    }

    /// Returns the composite type behind `id`.
    pub fn composite(&self, id: CompTypeId) -> &CompositeType {
        &self.sub_type(id).composite
    }

    /// Returns the function type behind `id`.
    ///
    /// # Panics
    ///
    /// Panics when `id` does not refer to a function type.
    pub fn func_type(&self, id: CompTypeId) -> &FuncType {
        self.composite(id)
            .as_func()
            .unwrap_or_else(|| panic!("type {id:?} is not a function type"))
    }

    /// Returns `true` when `sub` is a declared subtype of `sup`, walking
    /// the supertype chain.
    pub fn is_concrete_subtype(&self, sub: CompTypeId, sup: CompTypeId) -> bool {
        let mut current = Some(sub);
        while let Some(id) = current {
            if id == sup {
                return true;
            }
            current = self.sub_type(id).supertype;
        }
        false
    }

    /// Returns `true` when heap type `sub` is a subtype of `sup`.
    pub fn is_heap_subtype(&self, sub: HeapType, sup: HeapType) -> bool {
        use HeapType as H;
        if sub == sup {
            return true;
        }
        match (sub, sup) {
            // bottom types
            (H::None, H::I31 | H::Struct | H::Array | H::Eq | H::Any) => true,
            (H::None, H::Concrete(id)) => !matches!(self.composite(id), CompositeType::Func(_)),
            (H::NoFunc, H::Func) => true,
            (H::NoFunc, H::Concrete(id)) => matches!(self.composite(id), CompositeType::Func(_)),
            (H::NoExtern, H::Extern) => true,
            (H::NoExn, H::Exn) => true,
            // abstract middles
            (H::I31 | H::Struct | H::Array | H::Eq, H::Any) => true,
            (H::I31 | H::Struct | H::Array, H::Eq) => true,
            // concrete types against the lattice
            (H::Concrete(sub), H::Concrete(sup)) => self.is_concrete_subtype(sub, sup),
            (H::Concrete(id), sup) => match self.composite(id) {
                CompositeType::Func(_) => sup == H::Func,
                CompositeType::Struct(_) => matches!(sup, H::Struct | H::Eq | H::Any),
                CompositeType::Array(_) => matches!(sup, H::Array | H::Eq | H::Any),
            },
            _ => false,
        }
    }

    /// Returns `true` when reference type `sub` matches `sup`.
    pub fn is_ref_subtype(&self, sub: RefType, sup: RefType) -> bool {
        if sub.nullable && !sup.nullable {
            return false;
        }
        self.is_heap_subtype(sub.heap, sup.heap)
    }
}

/// Rewrites the group-local sentinel references of `ty` to the freshly
/// assigned group index.
fn resolve_sub_type(ty: &mut SubType, group: RecGroupIdx) {
    if let Some(supertype) = &mut ty.supertype {
        resolve_id(supertype, group);
    }
    match &mut ty.composite {
        CompositeType::Func(func) => {
            let mut params: Vec<ValType> = func.params().to_vec();
            let mut results: Vec<ValType> = func.results().to_vec();
            for ty in params.iter_mut().chain(&mut results) {
                resolve_val_type(ty, group);
            }
            *func = FuncType::new(params, results);
        }
        CompositeType::Struct(strukt) => {
            let mut fields: Vec<FieldType> = strukt.fields.to_vec();
            for field in &mut fields {
                resolve_field_type(field, group);
            }
            *strukt = super::StructType::new(fields.into_boxed_slice());
        }
        CompositeType::Array(array) => {
            resolve_field_type(&mut array.elem, group);
        }
    }
}

fn resolve_field_type(field: &mut FieldType, group: RecGroupIdx) {
    if let StorageType::Val(ty) = &mut field.storage {
        resolve_val_type(ty, group);
    }
}

fn resolve_val_type(ty: &mut ValType, group: RecGroupIdx) {
    if let ValType::Ref(RefType { heap, .. }) = ty {
        if let HeapType::Concrete(id) = heap {
            resolve_id(id, group);
        }
    }
}

fn resolve_id(id: &mut CompTypeId, group: RecGroupIdx) {
    if id.is_local() {
        id.group = group;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArrayType, StructType};

    fn func(params: &[ValType], results: &[ValType]) -> PreSubType {
        SubType {
            is_final: true,
            supertype: None,
            composite: CompositeType::Func(FuncType::new(
                params.iter().copied(),
                results.iter().copied(),
            )),
        }
    }

    #[test]
    fn structurally_equal_groups_intern_once() {
        let mut registry = TypeRegistry::new();
        let a = registry.intern(vec![func(&[ValType::I32], &[ValType::I32])]);
        let b = registry.intern(vec![func(&[ValType::I32], &[ValType::I32])]);
        let c = registry.intern(vec![func(&[ValType::I64], &[ValType::I32])]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn self_referential_group_interns() {
        // an array of references to itself
        let self_ref = ValType::Ref(RefType {
            nullable: true,
            heap: HeapType::Concrete(CompTypeId::local(0)),
        });
        let group = vec![SubType {
            is_final: true,
            supertype: None,
            composite: CompositeType::Array(ArrayType {
                elem: FieldType {
                    storage: StorageType::Val(self_ref),
                    mutable: true,
                },
            }),
        }];
        let mut registry = TypeRegistry::new();
        let ids_a = registry.intern(group.clone());
        let ids_b = registry.intern(group);
        assert_eq!(ids_a, ids_b);
        // the stored type's element now references the interned group
        let elem = match registry.composite(ids_a[0]) {
            CompositeType::Array(array) => array.elem,
            ty => panic!("expected array type, found {ty:?}"),
        };
        match elem.storage {
            StorageType::Val(ValType::Ref(ref_ty)) => {
                assert_eq!(ref_ty.heap, HeapType::Concrete(ids_a[0]));
            }
            storage => panic!("unexpected storage: {storage:?}"),
        }
    }

    #[test]
    fn subtype_lattice() {
        let mut registry = TypeRegistry::new();
        let base = registry.intern(vec![SubType {
            is_final: false,
            supertype: None,
            composite: CompositeType::Struct(StructType::new(Box::new([]))),
        }]);
        let derived = registry.intern(vec![SubType {
            is_final: true,
            supertype: Some(base[0]),
            composite: CompositeType::Struct(StructType::new(Box::new([FieldType {
                storage: StorageType::I8,
                mutable: false,
            }]))),
        }]);
        assert!(registry.is_concrete_subtype(derived[0], base[0]));
        assert!(!registry.is_concrete_subtype(base[0], derived[0]));
        assert!(registry.is_heap_subtype(HeapType::Concrete(base[0]), HeapType::Struct));
        assert!(registry.is_heap_subtype(HeapType::Concrete(base[0]), HeapType::Any));
        assert!(!registry.is_heap_subtype(HeapType::Concrete(base[0]), HeapType::Func));
        assert!(registry.is_heap_subtype(HeapType::None, HeapType::Concrete(base[0])));
        assert!(registry.is_heap_subtype(HeapType::I31, HeapType::Eq));
        assert!(!registry.is_heap_subtype(HeapType::Extern, HeapType::Any));
    }
}
