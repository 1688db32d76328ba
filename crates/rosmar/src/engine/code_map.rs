//! The engine's map of compiled function bodies.

use crate::types::CompTypeId;
use rosmar_ir::{CodeBuf, TrapPointTable, TryTable};
use std::{sync::Arc, vec::Vec};

/// A reference to a compiled function body of the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CompiledFunc(u32);

impl CompiledFunc {
    /// Creates a [`CompiledFunc`] from its `u32` index.
    pub(crate) fn from_u32(index: u32) -> Self {
        Self(index)
    }

    /// Returns the `u32` index of the [`CompiledFunc`].
    pub(crate) fn into_u32(self) -> u32 {
        self.0
    }
}

/// A compiled function body: the bytecode plus the frame layout and the
/// try/catch side tables the translator produced for it.
#[derive(Debug)]
pub struct CompiledFuncEntity {
    /// The canonical function type.
    pub ty: CompTypeId,
    /// The encoded instruction stream.
    pub code: CodeBuf,
    /// The total frame byte size: parameters, locals and operand slots,
    /// aligned to 16 bytes. The callee frame of an outgoing call starts
    /// at this offset, which makes it the call scratch region.
    pub frame_size: u32,
    /// The byte size of the parameter region at the frame base.
    pub params_size: u32,
    /// End of the locals region; `params_size..locals_end` is
    /// zero-initialised on entry.
    pub locals_end: u32,
    /// The `try` regions of the function.
    pub try_table: TryTable,
    /// The sorted trap points for the JIT backend contract.
    pub trap_points: TrapPointTable,
}

/// The engine-owned collection of compiled function bodies.
#[derive(Debug, Default)]
pub struct CodeMap {
    funcs: Vec<Arc<CompiledFuncEntity>>,
}

impl CodeMap {
    /// Creates an empty [`CodeMap`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a compiled function, returning its reference.
    pub fn alloc(&mut self, entity: CompiledFuncEntity) -> CompiledFunc {
        let index = self.funcs.len() as u32;
        self.funcs.push(Arc::new(entity));
        CompiledFunc::from_u32(index)
    }

    /// Resolves the compiled function behind `func`.
    ///
    /// # Panics
    ///
    /// Panics on references not allocated by this [`CodeMap`].
    pub fn resolve(&self, func: CompiledFunc) -> Arc<CompiledFuncEntity> {
        self.funcs[func.into_u32() as usize].clone()
    }
}
