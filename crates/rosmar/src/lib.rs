#![warn(
    clippy::cast_lossless,
    clippy::missing_errors_doc,
    clippy::used_underscore_binding,
    clippy::redundant_closure_for_method_calls,
    clippy::type_repetition_in_bounds,
    clippy::inconsistent_struct_constructor,
    clippy::default_trait_access,
    clippy::map_unwrap_or
)]

//! The rosmar WebAssembly virtual machine.
//!
//! rosmar executes binary WebAssembly modules through a purpose-built
//! register-style bytecode whose operands are byte offsets into the
//! current stack frame. The translator lowers validated structured
//! control flow into linear bytecode with signed-delta jumps and
//! try/catch side tables; the interpreter executes the same stream a JIT
//! backend may alternatively lower to native code.
//!
//! # Example
//!
//! ```
//! use rosmar::{Engine, Module, Store, Value};
//!
//! # fn main() -> Result<(), rosmar::Error> {
//! let engine = Engine::default();
//! let wasm = wat::parse_str(
//!     r#"
//!     (module
//!         (func (export "add") (param i32 i32) (result i32)
//!             local.get 0
//!             local.get 1
//!             i32.add
//!         )
//!     )
//!     "#,
//! )
//! .unwrap();
//! let module = Module::new(&engine, &wasm)?;
//! let mut store = Store::new(&engine);
//! let instance = store.instantiate(&module, &[])?;
//! let results = instance.invoke(&mut store, "add", &[Value::I32(2), Value::I32(3)])?;
//! assert_eq!(results, [Value::I32(5)]);
//! # Ok(())
//! # }
//! ```

mod collections;
mod engine;
mod error;
mod executor;
mod external;
mod func;
mod gc;
mod global;
mod instance;
mod memory;
mod module;
mod segment;
mod store;
mod table;
mod tag;
mod types;
mod value;
mod waitqueue;

pub mod jit;

pub use self::{
    engine::{CompiledFunc, CompiledFuncEntity, Config, Engine, ExecutionBackend, StackLimits},
    error::{Error, InstantiationError},
    external::{Extern, Func, Global, Memory, Table, Tag},
    func::FuncError,
    global::{GlobalError, GlobalType},
    memory::{MemoryError, MemoryType},
    module::{Module, ModuleError},
    store::{Instance, Store},
    table::{TableError, TableType},
    types::{
        ArrayType,
        CompTypeId,
        CompositeType,
        FieldType,
        FuncType,
        HeapType,
        RecGroupIdx,
        RefType,
        StorageType,
        StructType,
        SubType,
        ValType,
    },
    value::{Ref, Value},
    waitqueue::WaitResult,
};
pub use rosmar_core::{HostError, Trap, TrapCode, F32, F64, V128};
