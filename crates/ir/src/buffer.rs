//! The contiguous encoded instruction stream of a compiled function.

use crate::{
    primitive::{JumpDelta, OpReader, StackOffset, OP_ALIGN},
    Op,
};
use std::vec::Vec;

/// The byte position of an instruction head within a [`CodeBuf`].
///
/// Always a multiple of the record alignment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OpPos(pub u32);

impl OpPos {
    /// Returns the position as `usize`.
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
}

/// A contiguous buffer of encoded bytecode records.
///
/// The total buffer size always equals the sum of [`Op::size`] over the
/// instructions it holds.
#[derive(Debug, Default, Clone)]
pub struct CodeBuf {
    bytes: Vec<u8>,
}

impl CodeBuf {
    /// Creates an empty [`CodeBuf`].
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Returns the total size of the encoded stream in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if no instruction has been encoded yet.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the raw encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the position the next pushed instruction will occupy.
    pub fn next_pos(&self) -> OpPos {
        OpPos(self.bytes.len() as u32)
    }

    /// Encodes `op` at the end of the stream and returns its position.
    pub fn push(&mut self, op: &Op) -> OpPos {
        let pos = self.next_pos();
        op.encode_into(&mut self.bytes);
        pos
    }

    /// Decodes the instruction at `pos`, returning it together with the
    /// position of the next instruction.
    pub fn decode_at(&self, pos: usize) -> (Op, usize) {
        let mut reader = OpReader::new(&self.bytes, pos);
        let op = Op::decode(&mut reader);
        (op, reader.pos())
    }

    /// Re-encodes `op` over the record at `pos`.
    ///
    /// # Panics
    ///
    /// Panics when the new encoding differs in size from the old record;
    /// patching never changes operand counts, so a size change indicates a
    /// translation bug.
    pub fn replace(&mut self, pos: OpPos, op: &Op) {
        let (old, end) = self.decode_at(pos.to_usize());
        let old_size = end - pos.to_usize();
        assert_eq!(
            op.size(),
            old_size,
            "patch changed the record size at {pos:?}: {old:?} -> {op:?}",
        );
        let mut patch = Vec::with_capacity(old_size);
        op.encode_into(&mut patch);
        self.bytes[pos.to_usize()..end].copy_from_slice(&patch);
    }

    /// Patches the jump delta of the branching instruction at `from` to
    /// land on `target`.
    pub fn patch_jump(&mut self, from: OpPos, target: OpPos) {
        let (mut op, _) = self.decode_at(from.to_usize());
        let delta = JumpDelta(target.0 as i32 - from.0 as i32);
        if !op.set_jump_delta(delta) {
            panic!("patch target at {from:?} is not a branching instruction: {op:?}");
        }
        self.replace(from, &op);
    }

    /// Patches the `index`-th target of the `br_table` instruction at `from`.
    pub fn patch_br_table_target(&mut self, from: OpPos, index: usize, target: OpPos) {
        let (mut op, _) = self.decode_at(from.to_usize());
        let delta = JumpDelta(target.0 as i32 - from.0 as i32);
        if !op.set_br_table_target(index, delta) {
            panic!("patch target at {from:?} is not a `br_table`: {op:?}");
        }
        self.replace(from, &op);
    }

    /// Overwrites the `index`-th stack offset of the instruction at `pos`
    /// directly in the encoded stream.
    pub fn set_stack_offset(&mut self, pos: OpPos, index: usize, new: StackOffset) -> bool {
        let (mut op, _) = self.decode_at(pos.to_usize());
        if !op.set_stack_offset(index, new) {
            return false;
        }
        self.replace(pos, &op);
        true
    }

    /// Returns an iterator over `(position, instruction)` pairs.
    pub fn iter(&self) -> OpIter<'_> {
        OpIter { buf: self, pos: 0 }
    }
}

/// Iterator over the instructions of a [`CodeBuf`].
#[derive(Debug)]
pub struct OpIter<'a> {
    buf: &'a CodeBuf,
    pos: usize,
}

impl Iterator for OpIter<'_> {
    type Item = (OpPos, Op);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buf.len() {
            return None;
        }
        debug_assert_eq!(self.pos % OP_ALIGN, 0);
        let pos = OpPos(self.pos as u32);
        let (op, next) = self.buf.decode_at(self.pos);
        self.pos = next;
        Some((pos, op))
    }
}
