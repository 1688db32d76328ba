//! The JIT backend contract.
//!
//! A JIT backend consumes the same bytecode and try/catch side tables the
//! interpreter executes and produces native code following the same frame
//! ABI: spills land at the interpreter's frame offsets, so an uncaught
//! trap can hand control back to the interpreter at a well-defined
//! bytecode boundary.
//!
//! No per-architecture backend ships with the crate; the interpreter is
//! the always-available executor and the default. Implementers plug a
//! backend in through [`JitBackend`], one concrete implementation per
//! target.

use crate::engine::CompiledFuncEntity;
use core::fmt::{self, Display};
use rosmar_ir::{CatchBlock, OpPos};
use std::{boxed::Box, vec::Vec};

/// Errors a backend may report while lowering a function.
#[derive(Debug)]
#[non_exhaustive]
pub enum JitError {
    /// The backend does not support an opcode of the function.
    ///
    /// The engine falls back to the interpreter for such functions.
    UnsupportedOpcode(&'static str),
    /// The backend ran out of executable memory.
    OutOfCodeMemory,
}

impl Display for JitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedOpcode(name) => {
                write!(f, "backend does not support the {name} instruction")
            }
            Self::OutOfCodeMemory => write!(f, "out of executable code memory"),
        }
    }
}

/// One entry of the native trap-address table.
///
/// Entries are sorted by `end` so the signal handler can map a faulting
/// native instruction pointer to its recovery routine by binary search.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TrapAddress {
    /// One past the last native byte the entry covers.
    pub end: u32,
    /// The native offset of the recovery routine.
    pub handler: u32,
    /// The bytecode position the interpreter resumes at when the backend
    /// hands the trap back instead of recovering natively.
    pub bytecode: OpPos,
}

/// The sorted trap-address table of one compiled function.
#[derive(Debug, Default)]
pub struct TrapAddressTable {
    entries: Vec<TrapAddress>,
}

impl TrapAddressTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry; entries must arrive sorted by `end`.
    pub fn push(&mut self, entry: TrapAddress) {
        debug_assert!(self
            .entries
            .last()
            .map_or(true, |last| last.end <= entry.end));
        self.entries.push(entry);
    }

    /// Maps a faulting native offset to its table entry.
    pub fn lookup(&self, native_offset: u32) -> Option<&TrapAddress> {
        let idx = self
            .entries
            .partition_point(|entry| entry.end <= native_offset);
        self.entries.get(idx)
    }

    /// Returns all entries in sort order.
    pub fn entries(&self) -> &[TrapAddress] {
        &self.entries
    }
}

/// The native code of one function plus the side tables the runtime needs
/// to route traps and exceptions through it.
#[derive(Debug)]
pub struct JitCode {
    /// The native code bytes.
    pub code: Box<[u8]>,
    /// The entry offset within `code`.
    pub entry: u32,
    /// The sorted trap-address table.
    pub trap_addresses: TrapAddressTable,
    /// The catch blocks, mirroring the interpreter's descriptors with the
    /// handler positions expressed as native offsets.
    pub catches: Vec<(u32, CatchBlock)>,
}

/// A pluggable native-code backend over the shared bytecode.
///
/// # Register hints
///
/// Instruction operands carry `RegHint` preferences recorded by the
/// translator to keep hot operands pinned; backends are free to redefine
/// the hint bits. The interpreter ignores them entirely.
pub trait JitBackend: Send + Sync {
    /// A short name identifying the target, e.g. `"x86_64"`.
    fn target(&self) -> &'static str;

    /// Lowers a compiled function to native code.
    ///
    /// The backend walks the function's [`CodeBuf`], consumes its
    /// [`TryTable`] and [`TrapPointTable`], and emits code that keeps
    /// spilled operands at the interpreter's frame offsets.
    ///
    /// # Errors
    ///
    /// Backends may reject individual functions with
    /// [`JitError::UnsupportedOpcode`]; the engine then executes those
    /// functions in the interpreter.
    ///
    /// [`CodeBuf`]: rosmar_ir::CodeBuf
    /// [`TryTable`]: rosmar_ir::TryTable
    /// [`TrapPointTable`]: rosmar_ir::TrapPointTable
    fn compile(&self, func: &CompiledFuncEntity) -> Result<JitCode, JitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trap_address_lookup() {
        let mut table = TrapAddressTable::new();
        table.push(TrapAddress {
            end: 16,
            handler: 100,
            bytecode: OpPos(0),
        });
        table.push(TrapAddress {
            end: 48,
            handler: 200,
            bytecode: OpPos(24),
        });
        assert_eq!(table.lookup(0).map(|entry| entry.handler), Some(100));
        assert_eq!(table.lookup(15).map(|entry| entry.handler), Some(100));
        assert_eq!(table.lookup(16).map(|entry| entry.handler), Some(200));
        assert_eq!(table.lookup(47).map(|entry| entry.handler), Some(200));
        assert_eq!(table.lookup(48), None);
    }
}
