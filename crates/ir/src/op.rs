//! The [`Opcode`] and [`Op`] enums and their record codec, generated from
//! the master listing in `for_each_op.rs`.

use crate::{
    primitive::{op_aligned, Bytes16, Decode, DeltaList, Encode, JumpDelta, OffsetList, OpReader, RegHint, StackOffset},
    OP_ALIGN,
};
use std::vec::Vec;

/// Collects a field into the stack-offset list when its type is an
/// offset-carrying one.
macro_rules! collect_offset_field {
    ($acc:ident, $field:ident, StackOffset) => {
        $acc.push(*$field);
    };
    ($acc:ident, $field:ident, OffsetList) => {
        $acc.extend_from_slice(&$field.0);
    };
    ($acc:ident, $field:ident, $other:ident) => {};
}

/// Writes the `$k`-th stack offset of the instruction when it falls into
/// this field.
macro_rules! set_offset_field {
    ($k:ident, $new:ident, $field:ident, StackOffset) => {
        if $k == 0 {
            *$field = $new;
            return true;
        }
        $k -= 1;
    };
    ($k:ident, $new:ident, $field:ident, OffsetList) => {
        if $k < $field.0.len() {
            $field.0[$k] = $new;
            return true;
        }
        $k -= $field.0.len();
    };
    ($k:ident, $new:ident, $field:ident, $other:ident) => {};
}

macro_rules! define_ops {
    (
        $(
            $( #[$attr:meta] )*
            $name:ident { $( $field:ident : $ty:ident ),* $(,)? }
        ),* $(,)?
    ) => {
        /// The opcode tag stored in the first 16 bits of every instruction record.
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum Opcode {
            $( $name ),*
        }

        impl Opcode {
            /// Every [`Opcode`] in discriminant order.
            pub const ALL: &'static [Opcode] = &[ $( Opcode::$name ),* ];

            /// Returns the [`Opcode`] with the given `u16` representation.
            pub fn from_repr(repr: u16) -> Option<Opcode> {
                Self::ALL.get(repr as usize).copied()
            }

            /// Returns the name of the [`Opcode`].
            pub fn name(self) -> &'static str {
                match self {
                    $( Opcode::$name => stringify!($name) ),*
                }
            }
        }

        /// A decoded bytecode instruction.
        ///
        /// The in-memory enum is the introspection and construction surface;
        /// execution reads the encoded records directly from a [`CodeBuf`].
        ///
        /// [`CodeBuf`]: crate::CodeBuf
        #[derive(Debug, Clone, PartialEq)]
        pub enum Op {
            $(
                $( #[$attr] )*
                $name { $( $field: $ty ),* }
            ),*
        }

        impl Op {
            /// Returns the [`Opcode`] of this [`Op`].
            pub fn opcode(&self) -> Opcode {
                match self {
                    $( Op::$name { .. } => Opcode::$name ),*
                }
            }

            /// Appends the encoded record to `buf`, padded to [`OP_ALIGN`].
            pub(crate) fn encode_into(&self, buf: &mut Vec<u8>) {
                debug_assert_eq!(buf.len() % OP_ALIGN, 0);
                (self.opcode() as u16).encode(buf);
                match self {
                    $(
                        #[allow(unused_variables)]
                        Op::$name { $( $field ),* } => {
                            $( $field.encode(buf); )*
                        }
                    ),*
                }
                while buf.len() % OP_ALIGN != 0 {
                    buf.push(0x00);
                }
            }

            /// Returns the encoded size of the record in bytes, padding included.
            ///
            /// This is a total function of the opcode and the header-recorded
            /// operand counts: it always equals the number of bytes between
            /// this instruction's head and the next instruction's head.
            pub fn size(&self) -> usize {
                match self {
                    $(
                        #[allow(unused_variables)]
                        Op::$name { $( $field ),* } => {
                            let mut size = 2_usize;
                            $( size += $field.encoded_len(); )*
                            op_aligned(size)
                        }
                    ),*
                }
            }

            /// Decodes the record at the reader's cursor.
            ///
            /// # Panics
            ///
            /// Panics on an invalid opcode tag. The translator only ever
            /// produces valid streams, so this indicates memory corruption
            /// or an internal translation bug.
            pub fn decode(reader: &mut OpReader) -> Op {
                let repr = u16::decode(reader);
                let opcode = Opcode::from_repr(repr)
                    .unwrap_or_else(|| panic!("invalid opcode tag {repr} in instruction stream"));
                let op = match opcode {
                    $(
                        Opcode::$name => Op::$name {
                            $( $field: Decode::decode(reader) ),*
                        }
                    ),*
                };
                reader.align();
                op
            }

            /// Returns every stack offset operand of this instruction in
            /// field order, with trailing offset lists expanded.
            #[allow(unused_variables, unused_mut)]
            pub fn stack_offsets(&self) -> Vec<StackOffset> {
                let mut offsets = Vec::new();
                match self {
                    $(
                        Op::$name { $( $field ),* } => {
                            $( collect_offset_field!(offsets, $field, $ty); )*
                        }
                    ),*
                }
                offsets
            }

            /// Overwrites the `index`-th stack offset operand.
            ///
            /// Returns `false` when the instruction has fewer offsets.
            /// Writing an offset and reading it back through
            /// [`Op::stack_offsets`] yields the written value.
            #[allow(unused_variables, unused_mut, unused_assignments)]
            pub fn set_stack_offset(&mut self, index: usize, new: StackOffset) -> bool {
                let mut k = index;
                match self {
                    $(
                        Op::$name { $( $field ),* } => {
                            $( set_offset_field!(k, new, $field, $ty); )*
                        }
                    ),*
                }
                false
            }
        }
    };
}
crate::for_each_op!(define_ops);

impl Op {
    /// Overwrites the jump delta of a branching instruction.
    ///
    /// Returns `false` for instructions without a delta field; `br_table`
    /// targets are patched through [`Op::set_br_table_target`] instead.
    pub fn set_jump_delta(&mut self, new: JumpDelta) -> bool {
        match self {
            Op::Jump { delta }
            | Op::JumpIfTrue { delta, .. }
            | Op::JumpIfFalse { delta, .. }
            | Op::BrOnCast { delta, .. }
            | Op::BrOnCastFail { delta, .. }
            | Op::BrOnNull { delta, .. }
            | Op::BrOnNonNull { delta, .. } => {
                *delta = new;
                true
            }
            _ => false,
        }
    }

    /// Overwrites the `index`-th target of a `br_table` instruction.
    pub fn set_br_table_target(&mut self, index: usize, new: JumpDelta) -> bool {
        if let Op::BrTable { targets, .. } = self {
            if let Some(target) = targets.0.get_mut(index) {
                *target = new;
                return true;
            }
        }
        false
    }
}

impl core::fmt::Display for Op {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.opcode().name())?;
        for offset in self.stack_offsets() {
            write!(f, " @{}", offset.0)?;
        }
        Ok(())
    }
}
