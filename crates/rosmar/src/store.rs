//! The store that owns all runtime entities and the GC heap.

use crate::{
    collections::{Arena, ArenaIndex, GuardedEntity},
    engine::Engine,
    error::Error,
    external::{Extern, ExternVal, Func, Global, Memory, Table, Tag},
    func::{FuncEntity, FuncIdx, HostFuncEntity, HostTrampoline},
    gc::{GcHeap, GcObject, RawRef, RefKind},
    global::{GlobalEntity, GlobalIdx, GlobalType},
    instance::{InstanceEntity, InstanceIdx},
    memory::{MemoryEntity, MemoryIdx, MemoryType},
    segment::{DataSegmentEntity, DataSegmentIdx, ElemSegmentEntity, ElemSegmentIdx},
    table::{TableEntity, TableIdx, TableType},
    tag::{TagEntity, TagIdx},
    types::{CompositeType, FuncType, SubType, ValType},
    value::{Ref, Value},
};
use core::{
    any::Any,
    sync::atomic::{AtomicBool, AtomicU32, Ordering},
};
use std::{boxed::Box, sync::Arc, vec::Vec};

/// A unique store index.
///
/// Used to protect against using entity handles with a foreign [`Store`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StoreIdx(u32);

impl StoreIdx {
    /// Returns a new unique [`StoreIdx`].
    fn new() -> Self {
        /// A static store index counter.
        static CURRENT_STORE_IDX: AtomicU32 = AtomicU32::new(0);
        let next_idx = CURRENT_STORE_IDX.fetch_add(1, Ordering::AcqRel);
        Self(next_idx)
    }
}

/// A stored entity.
pub type Stored<Idx> = GuardedEntity<StoreIdx, Idx>;

/// The store that owns all data associated to Wasm modules.
///
/// Exclusively owns every instance, runtime object and GC heap object
/// created through it; dropping the store drops them all.
#[derive(Debug)]
pub struct Store {
    /// All store-owned entities.
    pub(crate) inner: StoreInner,
}

/// The inner store, passed around within the crate during execution.
#[derive(Debug)]
pub struct StoreInner {
    /// The unique store index guarding entity handles.
    store_idx: StoreIdx,
    /// The engine this store is attached to.
    engine: Engine,
    /// Stored Wasm and host functions.
    pub(crate) funcs: Arena<FuncIdx, FuncEntity>,
    /// Stored linear memories.
    pub(crate) memories: Arena<MemoryIdx, MemoryEntity>,
    /// Stored tables.
    pub(crate) tables: Arena<TableIdx, TableEntity>,
    /// Stored global variables.
    pub(crate) globals: Arena<GlobalIdx, GlobalEntity>,
    /// Stored exception tags.
    pub(crate) tags: Arena<TagIdx, TagEntity>,
    /// Stored module instances.
    pub(crate) instances: Arena<InstanceIdx, InstanceEntity>,
    /// Stored data segments.
    pub(crate) datas: Arena<DataSegmentIdx, DataSegmentEntity>,
    /// Stored element segments.
    pub(crate) elems: Arena<ElemSegmentIdx, ElemSegmentEntity>,
    /// The GC heap: structs, arrays, extern objects and exception packages.
    pub(crate) gc: GcHeap,
    /// Set by the host to terminate execution at the next call boundary.
    terminate: Arc<AtomicBool>,
}

impl Store {
    /// Creates a new [`Store`] attached to the given [`Engine`].
    pub fn new(engine: &Engine) -> Self {
        Self {
            inner: StoreInner {
                store_idx: StoreIdx::new(),
                engine: engine.clone(),
                funcs: Arena::new(),
                memories: Arena::new(),
                tables: Arena::new(),
                globals: Arena::new(),
                tags: Arena::new(),
                instances: Arena::new(),
                datas: Arena::new(),
                elems: Arena::new(),
                gc: GcHeap::new(),
                terminate: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Returns the [`Engine`] the store is attached to.
    pub fn engine(&self) -> &Engine {
        &self.inner.engine
    }

    /// Returns a handle the host can set from another thread to terminate
    /// execution; the flag is polled between calls.
    pub fn termination_handle(&self) -> Arc<AtomicBool> {
        self.inner.terminate.clone()
    }

    /// Creates a new linear memory entity.
    ///
    /// # Errors
    ///
    /// If the initial memory size is too large.
    pub fn create_memory(&mut self, ty: MemoryType) -> Result<Memory, Error> {
        let entity = MemoryEntity::new(ty)?;
        let idx = self.inner.memories.alloc(entity);
        Ok(Memory(self.inner.stored(idx)))
    }

    /// Creates a new table entity filled with null references.
    pub fn create_table(&mut self, ty: TableType) -> Table {
        let idx = self.inner.tables.alloc(TableEntity::new(ty, RawRef::NULL));
        Table(self.inner.stored(idx))
    }

    /// Creates a new global variable entity.
    pub fn create_global(&mut self, ty: GlobalType, init: Value) -> Global {
        let idx = self.inner.globals.alloc(GlobalEntity::new(ty, init));
        Global(self.inner.stored(idx))
    }

    /// Creates a new exception tag with the given payload signature.
    pub fn create_tag(&mut self, params: &[ValType]) -> Tag {
        let ty = FuncType::new(params.iter().copied(), []);
        let id = self.inner.engine.intern_standalone(SubType {
            is_final: true,
            supertype: None,
            composite: CompositeType::Func(ty),
        });
        let idx = self.inner.tags.alloc(TagEntity::new(id));
        Tag(self.inner.stored(idx))
    }

    /// Registers a host function.
    ///
    /// The trampoline receives the packed argument bytes laid out like a
    /// callee parameter region and writes packed result bytes back.
    pub fn create_host_func<F>(&mut self, ty: FuncType, trampoline: F) -> Func
    where
        F: Fn(&[u8], &mut [u8]) -> Result<(), rosmar_core::Trap> + Send + Sync + 'static,
    {
        let id = self.inner.engine.intern_standalone(SubType {
            is_final: true,
            supertype: None,
            composite: CompositeType::Func(ty),
        });
        let idx = self.inner.funcs.alloc(FuncEntity::Host(HostFuncEntity {
            ty: id,
            trampoline: HostTrampoline::new(trampoline),
        }));
        Func(self.inner.stored(idx))
    }

    /// Wraps a host object into an `externref` owned by this store.
    pub fn create_extern_ref(&mut self, object: Box<dyn Any + Send + Sync>) -> Ref {
        let idx = self.inner.gc.alloc(GcObject::Extern { object });
        Ref::from_raw(RawRef::heap(RefKind::Extern, idx))
    }
}

impl StoreInner {
    /// Wraps an entity index into a store-guarded handle.
    pub(crate) fn stored<Idx: Copy>(&self, idx: Idx) -> Stored<Idx> {
        Stored::new(self.store_idx, idx)
    }

    /// Returns the [`Engine`] the store is attached to.
    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Returns `true` when the host requested termination.
    pub(crate) fn is_terminated(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    /// Unwraps a guarded entity index, panicking on foreign handles.
    pub(crate) fn unwrap_stored<Idx: Copy>(&self, stored: &Stored<Idx>) -> Idx {
        stored.entity_index(self.store_idx).unwrap_or_else(|| {
            panic!("entity handle does not originate from this store")
        })
    }
}

/// An instantiated module handle.
#[derive(Debug, Copy, Clone)]
pub struct Instance(pub(crate) Stored<InstanceIdx>);

impl Instance {
    /// Returns the export with the given field `name`, if any.
    pub fn export(&self, store: &Store, name: &str) -> Option<Extern> {
        let idx = store.inner.unwrap_stored(&self.0);
        let external = store.inner.instances[idx].get_export(name)?;
        Some(match external {
            ExternVal::Func(idx) => Extern::Func(Func(store.inner.stored(idx))),
            ExternVal::Memory(idx) => Extern::Memory(Memory(store.inner.stored(idx))),
            ExternVal::Table(idx) => Extern::Table(Table(store.inner.stored(idx))),
            ExternVal::Global(idx) => Extern::Global(Global(store.inner.stored(idx))),
            ExternVal::Tag(idx) => Extern::Tag(Tag(store.inner.stored(idx))),
        })
    }

    /// Looks up the exported function `name` and calls it with `args`.
    ///
    /// # Errors
    ///
    /// - If no function export with the given name exists.
    /// - If the arguments do not match the signature.
    /// - If execution traps.
    pub fn invoke(
        &self,
        store: &mut Store,
        name: &str,
        args: &[Value],
    ) -> Result<Vec<Value>, Error> {
        let func = self
            .export(store, name)
            .and_then(Extern::into_func)
            .ok_or_else(|| Error::ExportNotFound(name.into()))?;
        func.call(store, args)
    }
}

impl Func {
    /// Returns the function type.
    pub fn ty(&self, store: &Store) -> FuncType {
        let idx = store.inner.unwrap_stored(&self.0);
        let id = store.inner.funcs[idx].ty();
        store.inner.engine.resolve_func_type(id)
    }

    /// Calls the function with the given arguments.
    ///
    /// # Errors
    ///
    /// - If the arguments do not match the signature.
    /// - If execution traps or throws an uncaught exception.
    pub fn call(&self, store: &mut Store, args: &[Value]) -> Result<Vec<Value>, Error> {
        let idx = store.inner.unwrap_stored(&self.0);
        crate::executor::call_func(&mut store.inner, idx, args)
    }
}

impl Memory {
    /// Returns the memory type.
    pub fn ty(&self, store: &Store) -> MemoryType {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.memories[idx].ty()
    }

    /// Returns the current size in pages.
    pub fn size(&self, store: &Store) -> u64 {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.memories[idx].size_in_pages()
    }

    /// Grows the memory by `delta` pages, returning the previous size.
    ///
    /// # Errors
    ///
    /// If the memory cannot grow by `delta` pages.
    pub fn grow(&self, store: &mut Store, delta: u64) -> Result<u64, Error> {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.memories[idx]
            .grow(delta)
            .ok_or(Error::Memory(crate::memory::MemoryError::OutOfBoundsGrowth))
    }

    /// Reads memory bytes at `offset` into `buffer`.
    ///
    /// # Errors
    ///
    /// If the read is out of bounds.
    pub fn read(&self, store: &Store, offset: usize, buffer: &mut [u8]) -> Result<(), Error> {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.memories[idx]
            .read(offset, buffer)
            .map_err(Error::Memory)
    }

    /// Writes `buffer` into the memory at `offset`.
    ///
    /// # Errors
    ///
    /// If the write is out of bounds.
    pub fn write(&self, store: &mut Store, offset: usize, buffer: &[u8]) -> Result<(), Error> {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.memories[idx]
            .write(offset, buffer)
            .map_err(Error::Memory)
    }
}

impl Table {
    /// Returns the table type.
    pub fn ty(&self, store: &Store) -> TableType {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.tables[idx].ty()
    }

    /// Returns the current number of elements.
    pub fn size(&self, store: &Store) -> u64 {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.tables[idx].size()
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// If `index` is out of bounds.
    pub fn get(&self, store: &Store, index: u64) -> Result<Ref, Error> {
        let idx = store.inner.unwrap_stored(&self.0);
        let raw = store.inner.tables[idx].get(index).map_err(Error::Table)?;
        Ok(Ref::from_raw(raw))
    }

    /// Replaces the element at `index`.
    ///
    /// # Errors
    ///
    /// If `index` is out of bounds.
    pub fn set(&self, store: &mut Store, index: u64, value: Ref) -> Result<(), Error> {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.tables[idx]
            .set(index, value.raw)
            .map_err(Error::Table)
    }

    /// Grows the table by `delta` elements filled with `init`.
    ///
    /// # Errors
    ///
    /// If the table cannot grow by `delta` elements.
    pub fn grow(&self, store: &mut Store, delta: u64, init: Ref) -> Result<u64, Error> {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.tables[idx]
            .grow(delta, init.raw)
            .ok_or(Error::Table(crate::table::TableError::GrowOutOfBounds {
                maximum: 0,
                current: 0,
                delta,
            }))
    }

    /// Fills `len` elements starting at `dst` with `value`.
    ///
    /// # Errors
    ///
    /// If the filled range is out of bounds.
    pub fn fill(&self, store: &mut Store, dst: u64, value: Ref, len: u64) -> Result<(), Error> {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.tables[idx]
            .fill(dst, value.raw, len)
            .map_err(|trap| Error::Trap(trap.into()))
    }
}

impl Global {
    /// Returns the global type.
    pub fn ty(&self, store: &Store) -> GlobalType {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.globals[idx].ty()
    }

    /// Returns the current value.
    pub fn get(&self, store: &Store) -> Value {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.globals[idx].get()
    }

    /// Writes a new value.
    ///
    /// # Errors
    ///
    /// If the global is immutable or the value type differs.
    pub fn set(&self, store: &mut Store, value: Value) -> Result<(), Error> {
        let idx = store.inner.unwrap_stored(&self.0);
        store.inner.globals[idx].set(value).map_err(Error::Global)
    }
}

impl Tag {
    /// Returns the payload signature of the tag.
    pub fn ty(&self, store: &Store) -> FuncType {
        let idx = store.inner.unwrap_stored(&self.0);
        let id = store.inner.tags[idx].ty();
        store.inner.engine.resolve_func_type(id)
    }
}
