//! Instance entities: the bound entity arrays of one instantiation.

use crate::{
    collections::ArenaIndex,
    external::ExternVal,
    func::FuncIdx,
    global::GlobalIdx,
    memory::MemoryIdx,
    segment::{DataSegmentIdx, ElemSegmentIdx},
    table::TableIdx,
    tag::TagIdx,
    types::CompTypeId,
};
use std::{boxed::Box, collections::BTreeMap, vec::Vec};

/// A raw index to an instance entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InstanceIdx(u32);

impl ArenaIndex for InstanceIdx {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn from_usize(value: usize) -> Self {
        let value = value.try_into().unwrap_or_else(|error| {
            panic!("index {value} is out of bounds as instance index: {error}")
        });
        Self(value)
    }
}

/// An instantiated module: the entity bindings one instantiation owns.
///
/// Bytecode operands index into these arrays; the canonical type list
/// resolves the type immediates of `call_indirect`, casts and GC
/// allocation instructions.
#[derive(Debug, Default)]
pub struct InstanceEntity {
    /// The canonical identities of the module's types in module order.
    pub types: Box<[CompTypeId]>,
    /// Imported and internal functions in module order.
    pub funcs: Vec<FuncIdx>,
    /// Imported and internal linear memories in module order.
    pub memories: Vec<MemoryIdx>,
    /// Imported and internal tables in module order.
    pub tables: Vec<TableIdx>,
    /// Imported and internal globals in module order.
    pub globals: Vec<GlobalIdx>,
    /// Imported and internal tags in module order.
    pub tags: Vec<TagIdx>,
    /// The instance's data segments in module order.
    pub data_segments: Vec<DataSegmentIdx>,
    /// The instance's element segments in module order.
    pub elem_segments: Vec<ElemSegmentIdx>,
    /// The exports by field name.
    pub exports: BTreeMap<Box<str>, ExternVal>,
}

impl InstanceEntity {
    /// Returns the export with the given name, if any.
    pub fn get_export(&self, name: &str) -> Option<ExternVal> {
        self.exports.get(name).copied()
    }
}
