//! The engine: shared configuration, the canonical type registry and the
//! compiled code of all modules attached to it.

mod code_map;
mod config;
mod limits;
pub mod translator;

pub use self::{
    code_map::{CodeMap, CompiledFunc, CompiledFuncEntity},
    config::{Config, ExecutionBackend},
    limits::StackLimits,
};

use crate::{
    jit::JitBackend,
    types::{CompTypeId, FuncType, HeapType, PreSubType, RefType, TypeRegistry},
};
use std::sync::Arc;

/// The rosmar execution engine.
///
/// Cheap to clone; all clones share the same configuration, type registry
/// and compiled code.
#[derive(Debug, Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

/// The engine internals shared by all [`Engine`] clones.
struct EngineInner {
    /// The engine configuration.
    config: Config,
    /// The canonicalising registry of recursive type groups.
    registry: spin::RwLock<TypeRegistry>,
    /// The compiled function bodies of all attached modules.
    code: spin::RwLock<CodeMap>,
    /// The registered JIT backend, if any.
    jit: spin::RwLock<Option<Arc<dyn JitBackend>>>,
}

impl core::fmt::Debug for EngineInner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineInner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Engine {
    /// Creates a new [`Engine`] with the given [`Config`].
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                config: config.clone(),
                registry: spin::RwLock::new(TypeRegistry::new()),
                code: spin::RwLock::new(CodeMap::new()),
                jit: spin::RwLock::new(None),
            }),
        }
    }

    /// Returns the [`Config`] of the engine.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Interns a recursive type group, returning the canonical identities
    /// of its members.
    pub(crate) fn intern_rec_group(&self, group: Vec<PreSubType>) -> Vec<CompTypeId> {
        self.inner.registry.write().intern(group)
    }

    /// Interns a single type as its own recursive group.
    pub(crate) fn intern_standalone(&self, ty: PreSubType) -> CompTypeId {
        self.intern_rec_group(vec![ty])[0]
    }

    /// Runs `f` with shared access to the type registry.
    pub(crate) fn with_registry<R>(&self, f: impl FnOnce(&TypeRegistry) -> R) -> R {
        f(&self.inner.registry.read())
    }

    /// Returns a clone of the function type behind `id`.
    ///
    /// # Panics
    ///
    /// Panics when `id` does not refer to a function type of this engine.
    pub(crate) fn resolve_func_type(&self, id: CompTypeId) -> FuncType {
        self.with_registry(|registry| registry.func_type(id).clone())
    }

    /// Returns `true` when heap type `sub` is a subtype of `sup`.
    pub(crate) fn is_heap_subtype(&self, sub: HeapType, sup: HeapType) -> bool {
        self.with_registry(|registry| registry.is_heap_subtype(sub, sup))
    }

    /// Returns `true` when reference type `sub` matches `sup`.
    pub(crate) fn is_ref_subtype(&self, sub: RefType, sup: RefType) -> bool {
        self.with_registry(|registry| registry.is_ref_subtype(sub, sup))
    }

    /// Returns `true` when concrete type `sub` is a declared subtype of `sup`.
    pub(crate) fn is_concrete_subtype(&self, sub: CompTypeId, sup: CompTypeId) -> bool {
        self.with_registry(|registry| registry.is_concrete_subtype(sub, sup))
    }

    /// Allocates a compiled function body.
    pub(crate) fn alloc_compiled_func(&self, entity: CompiledFuncEntity) -> CompiledFunc {
        self.inner.code.write().alloc(entity)
    }

    /// Resolves a compiled function body.
    pub(crate) fn resolve_compiled_func(&self, func: CompiledFunc) -> Arc<CompiledFuncEntity> {
        self.inner.code.read().resolve(func)
    }

    /// Registers the JIT backend used when the [`ExecutionBackend::Jit`]
    /// backend is selected.
    ///
    /// Functions the backend rejects keep executing in the interpreter.
    pub fn register_jit_backend(&self, backend: Arc<dyn JitBackend>) {
        *self.inner.jit.write() = Some(backend);
    }

    /// Returns the registered JIT backend, if any.
    pub fn jit_backend(&self) -> Option<Arc<dyn JitBackend>> {
        self.inner.jit.read().clone()
    }
}
