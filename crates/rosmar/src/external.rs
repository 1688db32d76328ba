//! External values: the importable and exportable entity handles.

use crate::{
    func::FuncIdx,
    global::GlobalIdx,
    memory::MemoryIdx,
    store::Stored,
    table::TableIdx,
    tag::TagIdx,
};

/// A store-internal external value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExternVal {
    /// A function.
    Func(FuncIdx),
    /// A linear memory.
    Memory(MemoryIdx),
    /// A table.
    Table(TableIdx),
    /// A global variable.
    Global(GlobalIdx),
    /// An exception tag.
    Tag(TagIdx),
}

/// A Wasm or host function handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Func(pub(crate) Stored<FuncIdx>);

/// A linear memory handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Memory(pub(crate) Stored<MemoryIdx>);

/// A table handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Table(pub(crate) Stored<TableIdx>);

/// A global variable handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Global(pub(crate) Stored<GlobalIdx>);

/// An exception tag handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Tag(pub(crate) Stored<TagIdx>);

/// An external value: the typed handle surface of imports and exports.
#[derive(Debug, Copy, Clone)]
pub enum Extern {
    /// A function.
    Func(Func),
    /// A linear memory.
    Memory(Memory),
    /// A table.
    Table(Table),
    /// A global variable.
    Global(Global),
    /// An exception tag.
    Tag(Tag),
}

impl Extern {
    /// Returns the function handle, if any.
    pub fn into_func(self) -> Option<Func> {
        if let Self::Func(func) = self {
            return Some(func);
        }
        None
    }

    /// Returns the memory handle, if any.
    pub fn into_memory(self) -> Option<Memory> {
        if let Self::Memory(memory) = self {
            return Some(memory);
        }
        None
    }

    /// Returns the table handle, if any.
    pub fn into_table(self) -> Option<Table> {
        if let Self::Table(table) = self {
            return Some(table);
        }
        None
    }

    /// Returns the global handle, if any.
    pub fn into_global(self) -> Option<Global> {
        if let Self::Global(global) = self {
            return Some(global);
        }
        None
    }

    /// Returns the tag handle, if any.
    pub fn into_tag(self) -> Option<Tag> {
        if let Self::Tag(tag) = self {
            return Some(tag);
        }
        None
    }
}
