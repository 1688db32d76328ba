//! Handler-table dispatch support.
//!
//! Stands in for the computed-goto build path of the instruction stream:
//! an opcode-indexed table of handler values plus the reverse mapping from
//! a handler back to its [`Opcode`] for introspection.

use crate::Opcode;
use std::{boxed::Box, vec::Vec};

/// An opcode-indexed table of per-instruction handlers.
///
/// `H` is typically a function pointer; the interpreter may dispatch
/// through this table instead of matching on the opcode tag.
#[derive(Debug)]
pub struct HandlerTable<H> {
    handlers: Box<[H]>,
}

impl<H> HandlerTable<H> {
    /// Builds the table by asking `f` for the handler of every opcode.
    pub fn build(f: impl Fn(Opcode) -> H) -> Self {
        let handlers: Vec<H> = Opcode::ALL.iter().map(|opcode| f(*opcode)).collect();
        Self {
            handlers: handlers.into_boxed_slice(),
        }
    }

    /// Returns the handler installed for `opcode`.
    #[inline]
    pub fn get(&self, opcode: Opcode) -> &H {
        &self.handlers[opcode as u16 as usize]
    }
}

impl<H: PartialEq> HandlerTable<H> {
    /// Maps a handler value back to its [`Opcode`].
    ///
    /// The reverse direction of the table; used to name instructions when
    /// only the installed handler is at hand.
    pub fn opcode_of(&self, handler: &H) -> Option<Opcode> {
        self.handlers
            .iter()
            .position(|h| h == handler)
            .and_then(|idx| Opcode::from_repr(idx as u16))
    }
}
