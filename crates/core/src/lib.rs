#![warn(
    clippy::cast_lossless,
    clippy::missing_errors_doc,
    clippy::used_underscore_binding,
    clippy::redundant_closure_for_method_calls,
    clippy::type_repetition_in_bounds,
    clippy::inconsistent_struct_constructor,
    clippy::default_trait_access,
    clippy::map_unwrap_or,
    clippy::items_after_statements
)]

mod host_error;
mod nan_preserving_float;
pub mod simd;
mod trap;
mod units;
mod value;
pub mod wasm;

pub use self::{
    host_error::HostError,
    nan_preserving_float::{F32, F64},
    simd::V128,
    trap::{InvalidTrapCode, Trap, TrapCode},
    units::{Bytes64, Pages64, PAGE_SIZE},
    value::{
        ArithmeticOps,
        Float,
        Integer,
        LittleEndianConvert,
        SignExtendFrom,
        TruncateSaturateInto,
        TryTruncateInto,
    },
};
