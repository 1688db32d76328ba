#![allow(clippy::len_without_is_empty)]

//! The register-style bytecode of the rosmar WebAssembly VM.
//!
//! Instructions address their operands by byte offset into the current
//! stack frame; the stream is a contiguous sequence of aligned records
//! produced by the translator and consumed by the interpreter and any
//! JIT backend.

mod buffer;
mod dispatch;
mod for_each_op;
mod op;
mod primitive;
mod trycatch;

#[cfg(test)]
mod tests;

pub use self::{
    buffer::{CodeBuf, OpIter, OpPos},
    dispatch::HandlerTable,
    op::{Op, Opcode},
    primitive::{
        op_aligned,
        Bytes16,
        Decode,
        DeltaList,
        Encode,
        JumpDelta,
        OffsetList,
        OpReader,
        RegHint,
        StackOffset,
        OP_ALIGN,
    },
    trycatch::{CatchBlock, CatchTag, TrapPointTable, TryBlock, TryBlockIdx, TryTable},
};
