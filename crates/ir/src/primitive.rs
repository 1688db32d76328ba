//! Operand primitives of the rosmar bytecode and their wire codec.
//!
//! Every instruction is a contiguous record in a [`CodeBuf`]: a `u16`
//! opcode tag followed by its operand fields, padded to a multiple of
//! [`OP_ALIGN`] bytes. Operands are either stack-byte offsets, immediates,
//! or signed jump deltas relative to the instruction head.
//!
//! [`CodeBuf`]: crate::CodeBuf

use std::{boxed::Box, vec::Vec};

/// The alignment every encoded instruction record is padded to.
pub const OP_ALIGN: usize = 8;

/// Rounds `size` up to the next multiple of [`OP_ALIGN`].
pub const fn op_aligned(size: usize) -> usize {
    (size + OP_ALIGN - 1) & !(OP_ALIGN - 1)
}

/// A byte offset into the current stack frame where an operand lives.
///
/// The translator assigns every producer's result to a fixed offset,
/// so the interpreter never pushes or pops operand values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackOffset(pub u16);

impl StackOffset {
    /// Returns the offset as `usize` for frame indexing.
    #[inline]
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u16> for StackOffset {
    fn from(offset: u16) -> Self {
        Self(offset)
    }
}

/// A signed byte delta from the head of the jump instruction to the
/// head of the target instruction.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct JumpDelta(pub i32);

/// A per-instruction register preference hint.
///
/// Recorded by the translator for the JIT's register allocator; the
/// interpreter ignores it entirely and JIT backends are free to redefine
/// its bits.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RegHint(pub u8);

/// A length-prefixed list of stack offsets trailing an instruction.
///
/// Used by the variable-length instruction forms: calls, `end`, `throw`,
/// `struct.new` and `array.new_fixed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetList(pub Box<[StackOffset]>);

impl OffsetList {
    /// Returns the number of offsets in the list.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<StackOffset> for OffsetList {
    fn from_iter<I: IntoIterator<Item = StackOffset>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<StackOffset>> for OffsetList {
    fn from(offsets: Vec<StackOffset>) -> Self {
        Self(offsets.into_boxed_slice())
    }
}

/// A length-prefixed list of jump deltas trailing a `br_table`.
///
/// The last entry is the default target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaList(pub Box<[JumpDelta]>);

impl DeltaList {
    /// Returns the number of branch targets including the default.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<JumpDelta>> for DeltaList {
    fn from(deltas: Vec<JumpDelta>) -> Self {
        Self(deltas.into_boxed_slice())
    }
}

/// A 16-byte immediate: `v128.const` payloads and `i8x16.shuffle` selectors.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Bytes16(pub [u8; 16]);

/// Serializes operand fields into the byte representation of a record.
pub trait Encode {
    /// Appends the little endian encoding of `self` to `buf`.
    fn encode(&self, buf: &mut Vec<u8>);

    /// Returns the number of bytes [`Encode::encode`] appends.
    fn encoded_len(&self) -> usize;
}

/// Deserializes operand fields from the byte representation of a record.
pub trait Decode: Sized {
    /// Reads `Self` from the reader, advancing its cursor.
    fn decode(reader: &mut OpReader) -> Self;
}

macro_rules! impl_codec_for_uint {
    ( $($ty:ty),* $(,)? ) => {
        $(
            impl Encode for $ty {
                #[inline]
                fn encode(&self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(&self.to_le_bytes());
                }
                #[inline]
                fn encoded_len(&self) -> usize {
                    ::core::mem::size_of::<$ty>()
                }
            }

            impl Decode for $ty {
                #[inline]
                fn decode(reader: &mut OpReader) -> Self {
                    let mut bytes = [0x00_u8; ::core::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(reader.take(::core::mem::size_of::<$ty>()));
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}
impl_codec_for_uint!(u8, u16, u32, u64, i32);

impl Encode for StackOffset {
    #[inline]
    fn encode(&self, buf: &mut Vec<u8>) {
        self.0.encode(buf);
    }
    #[inline]
    fn encoded_len(&self) -> usize {
        2
    }
}

impl Decode for StackOffset {
    #[inline]
    fn decode(reader: &mut OpReader) -> Self {
        Self(u16::decode(reader))
    }
}

impl Encode for JumpDelta {
    #[inline]
    fn encode(&self, buf: &mut Vec<u8>) {
        self.0.encode(buf);
    }
    #[inline]
    fn encoded_len(&self) -> usize {
        4
    }
}

impl Decode for JumpDelta {
    #[inline]
    fn decode(reader: &mut OpReader) -> Self {
        Self(i32::decode(reader))
    }
}

impl Encode for RegHint {
    #[inline]
    fn encode(&self, buf: &mut Vec<u8>) {
        self.0.encode(buf);
    }
    #[inline]
    fn encoded_len(&self) -> usize {
        1
    }
}

impl Decode for RegHint {
    #[inline]
    fn decode(reader: &mut OpReader) -> Self {
        Self(u8::decode(reader))
    }
}

impl Encode for Bytes16 {
    #[inline]
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
    #[inline]
    fn encoded_len(&self) -> usize {
        16
    }
}

impl Decode for Bytes16 {
    #[inline]
    fn decode(reader: &mut OpReader) -> Self {
        let mut bytes = [0x00_u8; 16];
        bytes.copy_from_slice(reader.take(16));
        Self(bytes)
    }
}

impl Encode for OffsetList {
    fn encode(&self, buf: &mut Vec<u8>) {
        let len = u16::try_from(self.0.len()).unwrap_or_else(|_| {
            panic!("operand list with {} entries exceeds the encoding", self.0.len())
        });
        len.encode(buf);
        for offset in &self.0[..] {
            offset.encode(buf);
        }
    }

    fn encoded_len(&self) -> usize {
        2 + 2 * self.0.len()
    }
}

impl Decode for OffsetList {
    fn decode(reader: &mut OpReader) -> Self {
        let len = u16::decode(reader) as usize;
        let offsets = (0..len).map(|_| StackOffset::decode(reader)).collect();
        Self(offsets)
    }
}

impl Encode for DeltaList {
    fn encode(&self, buf: &mut Vec<u8>) {
        let len = u32::try_from(self.0.len()).unwrap_or_else(|_| {
            panic!("branch table with {} entries exceeds the encoding", self.0.len())
        });
        len.encode(buf);
        for delta in &self.0[..] {
            delta.encode(buf);
        }
    }

    fn encoded_len(&self) -> usize {
        4 + 4 * self.0.len()
    }
}

impl Decode for DeltaList {
    fn decode(reader: &mut OpReader) -> Self {
        let len = u32::decode(reader) as usize;
        let deltas = (0..len).map(|_| JumpDelta::decode(reader)).collect();
        Self(deltas)
    }
}

/// A cursor over an encoded instruction stream.
#[derive(Debug)]
pub struct OpReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> OpReader<'a> {
    /// Creates a reader positioned at `pos` within `buf`.
    pub fn new(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Returns the current cursor position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns `true` if the cursor reached the end of the buffer.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Takes the next `n` bytes, advancing the cursor.
    #[inline]
    pub(crate) fn take(&mut self, n: usize) -> &'a [u8] {
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        bytes
    }

    /// Advances the cursor to the next [`OP_ALIGN`] boundary.
    #[inline]
    pub(crate) fn align(&mut self) {
        self.pos = op_aligned(self.pos);
    }
}
