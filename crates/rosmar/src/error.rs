//! The top-level error type of the public API.
//!
//! Inside the dispatch loop no host-language errors propagate; handlers
//! set the execution context's error field and branch to the unwinder.
//! [`Error`] values are only ever constructed at the public API boundary.

use crate::{
    func::FuncError,
    global::GlobalError,
    memory::MemoryError,
    module::ModuleError,
    table::TableError,
};
use core::fmt::{self, Display};
use rosmar_core::Trap;
use std::boxed::Box;

/// The error type of the public rosmar API.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A trap, uncaught exception or host error during execution.
    Trap(Trap),
    /// An error while parsing, validating or translating a module.
    Module(ModuleError),
    /// An error while instantiating a module.
    Instantiation(InstantiationError),
    /// An error while operating with a linear memory.
    Memory(MemoryError),
    /// An error while operating with a table.
    Table(TableError),
    /// An error while operating with a global variable.
    Global(GlobalError),
    /// An error while calling a function.
    Func(FuncError),
    /// A named export does not exist or has an unexpected kind.
    ExportNotFound(Box<str>),
}

/// Errors that may occur while instantiating a module.
#[derive(Debug)]
#[non_exhaustive]
pub enum InstantiationError {
    /// The number of provided imports does not match the module.
    ImportCountMismatch {
        /// The number of imports the module declares.
        required: usize,
        /// The number of provided external values.
        provided: usize,
    },
    /// A provided import does not satisfy the declared import type.
    ImportTypeMismatch {
        /// The index of the mismatching import.
        index: usize,
    },
    /// An active data or element segment lies outside its target.
    OutOfBoundsSegment,
    /// The start function trapped.
    StartTrapped(Trap),
}

impl Display for InstantiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImportCountMismatch { required, provided } => {
                write!(
                    f,
                    "module requires {required} imports but {provided} were provided",
                )
            }
            Self::ImportTypeMismatch { index } => {
                write!(f, "import {index} does not satisfy the declared import type")
            }
            Self::OutOfBoundsSegment => {
                write!(f, "active segment does not fit its target")
            }
            Self::StartTrapped(trap) => {
                write!(f, "start function trapped: {trap}")
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trap(error) => Display::fmt(error, f),
            Self::Module(error) => Display::fmt(error, f),
            Self::Instantiation(error) => Display::fmt(error, f),
            Self::Memory(error) => Display::fmt(error, f),
            Self::Table(error) => Display::fmt(error, f),
            Self::Global(error) => Display::fmt(error, f),
            Self::Func(error) => Display::fmt(error, f),
            Self::ExportNotFound(name) => {
                write!(f, "no exported function with name {name:?}")
            }
        }
    }
}

impl std::error::Error for Error {}

macro_rules! impl_from_error {
    ( $( $variant:ident($ty:ty) ),* $(,)? ) => {
        $(
            impl From<$ty> for Error {
                fn from(error: $ty) -> Self {
                    Self::$variant(error)
                }
            }
        )*
    };
}
impl_from_error! {
    Trap(Trap),
    Module(ModuleError),
    Instantiation(InstantiationError),
    Memory(MemoryError),
    Table(TableError),
    Global(GlobalError),
    Func(FuncError),
}

impl Error {
    /// Returns the underlying [`Trap`], if any.
    pub fn as_trap(&self) -> Option<&Trap> {
        if let Self::Trap(trap) = self {
            return Some(trap);
        }
        None
    }

    /// Returns the trap code if the error is an instruction trap.
    pub fn trap_code(&self) -> Option<rosmar_core::TrapCode> {
        self.as_trap().and_then(Trap::trap_code)
    }
}
