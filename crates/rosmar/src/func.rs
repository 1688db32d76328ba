//! Function entities: compiled Wasm functions and host trampolines.

use crate::{
    collections::ArenaIndex,
    engine::CompiledFunc,
    instance::InstanceIdx,
    types::CompTypeId,
};
use core::fmt::{self, Debug, Display};
use rosmar_core::Trap;
use std::sync::Arc;

/// A raw index to a function entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FuncIdx(u32);

impl ArenaIndex for FuncIdx {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn from_usize(value: usize) -> Self {
        let value = value.try_into().unwrap_or_else(|error| {
            panic!("index {value} is out of bounds as function index: {error}")
        });
        Self(value)
    }
}

/// Errors that may occur when calling functions through the public API.
#[derive(Debug)]
#[non_exhaustive]
pub enum FuncError {
    /// The number of arguments does not match the function signature.
    MismatchingParameterLen,
    /// An argument value does not match its parameter type.
    MismatchingParameterType,
    /// The results buffer length does not match the function signature.
    MismatchingResultLen,
}

impl Display for FuncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MismatchingParameterLen => {
                write!(f, "number of arguments does not match the function signature")
            }
            Self::MismatchingParameterType => {
                write!(f, "argument value does not match its parameter type")
            }
            Self::MismatchingResultLen => {
                write!(f, "results buffer does not match the function signature")
            }
        }
    }
}

/// The call trampoline of a host function.
///
/// Receives the packed argument bytes laid out like a callee parameter
/// region and writes the packed result bytes back. Host errors propagate
/// as captured exceptions carrying the host tag.
#[derive(Clone)]
pub struct HostTrampoline {
    closure: Arc<dyn Fn(&[u8], &mut [u8]) -> Result<(), Trap> + Send + Sync>,
}

impl HostTrampoline {
    /// Creates a new [`HostTrampoline`] from the given closure.
    pub fn new<F>(closure: F) -> Self
    where
        F: Fn(&[u8], &mut [u8]) -> Result<(), Trap> + Send + Sync + 'static,
    {
        Self {
            closure: Arc::new(closure),
        }
    }

    /// Calls the trampoline with packed parameter and result bytes.
    ///
    /// # Errors
    ///
    /// Any error the host closure returns.
    pub fn call(&self, params: &[u8], results: &mut [u8]) -> Result<(), Trap> {
        (self.closure)(params, results)
    }
}

impl Debug for HostTrampoline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTrampoline(...)")
    }
}

/// A compiled Wasm function entity.
#[derive(Debug)]
pub struct WasmFuncEntity {
    /// The canonical function type.
    pub ty: CompTypeId,
    /// The compiled bytecode in the engine's code map.
    pub func: CompiledFunc,
    /// The instance that defined the function.
    pub instance: InstanceIdx,
}

/// A host function entity.
#[derive(Debug)]
pub struct HostFuncEntity {
    /// The canonical function type.
    pub ty: CompTypeId,
    /// The host call trampoline.
    pub trampoline: HostTrampoline,
}

/// A function entity: either compiled Wasm or a host trampoline.
#[derive(Debug)]
pub enum FuncEntity {
    /// A compiled Wasm function.
    Wasm(WasmFuncEntity),
    /// A host function.
    Host(HostFuncEntity),
}

impl FuncEntity {
    /// Returns the canonical function type.
    pub fn ty(&self) -> CompTypeId {
        match self {
            Self::Wasm(func) => func.ty,
            Self::Host(func) => func.ty,
        }
    }
}
