//! Global variable entities: typed mutable-or-immutable cells.

use crate::{collections::ArenaIndex, value::Value, types::ValType};
use core::fmt::{self, Display};

/// A raw index to a global variable entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GlobalIdx(u32);

impl ArenaIndex for GlobalIdx {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn from_usize(value: usize) -> Self {
        let value = value.try_into().unwrap_or_else(|error| {
            panic!("index {value} is out of bounds as global index: {error}")
        });
        Self(value)
    }
}

/// Errors that may occur upon operating with global entities.
#[derive(Debug)]
#[non_exhaustive]
pub enum GlobalError {
    /// Occurs when writing to an immutable global variable.
    ImmutableWrite,
    /// Occurs when writing a value of unmatching type.
    TypeMismatch,
}

impl Display for GlobalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImmutableWrite => write!(f, "tried to write to an immutable global"),
            Self::TypeMismatch => {
                write!(f, "tried to write a value of unmatching type to a global")
            }
        }
    }
}

/// A descriptor for a global variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GlobalType {
    /// The value type of the cell.
    content: ValType,
    /// Whether the cell can be written after initialisation.
    mutable: bool,
}

impl GlobalType {
    /// Creates a new [`GlobalType`].
    pub fn new(content: ValType, mutable: bool) -> Self {
        Self { content, mutable }
    }

    /// Returns the value type of the cell.
    pub fn content(&self) -> ValType {
        self.content
    }

    /// Returns `true` if the cell is mutable.
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }
}

/// A global variable entity.
///
/// The cell stores the raw 16-byte frame representation of its value so
/// that `global.get`/`global.set` bytecodes are plain byte copies.
#[derive(Debug)]
pub struct GlobalEntity {
    ty: GlobalType,
    cell: [u8; 16],
}

impl GlobalEntity {
    /// Creates a new global entity with the given initial value.
    pub fn new(ty: GlobalType, init: Value) -> Self {
        let mut entity = Self { ty, cell: [0; 16] };
        init.write_to(&mut entity.cell);
        entity
    }

    /// Returns the global type of the entity.
    pub fn ty(&self) -> GlobalType {
        self.ty
    }

    /// Returns the raw cell bytes.
    pub fn cell(&self) -> &[u8; 16] {
        &self.cell
    }

    /// Exclusive access to the raw cell bytes.
    pub fn cell_mut(&mut self) -> &mut [u8; 16] {
        &mut self.cell
    }

    /// Returns the current value of the cell.
    pub fn get(&self) -> Value {
        Value::read_from(self.ty.content, &self.cell)
    }

    /// Writes a new value to the cell.
    ///
    /// # Errors
    ///
    /// - [`GlobalError::ImmutableWrite`] when the cell is immutable.
    /// - [`GlobalError::TypeMismatch`] when the value type differs.
    pub fn set(&mut self, value: Value) -> Result<(), GlobalError> {
        if !self.ty.mutable {
            return Err(GlobalError::ImmutableWrite);
        }
        if !value.matches_type(self.ty.content) {
            return Err(GlobalError::TypeMismatch);
        }
        value.write_to(&mut self.cell);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn set_respects_mutability_and_type() {
        let mut global = GlobalEntity::new(GlobalType::new(ValType::I32, true), Value::I32(1));
        assert_eq!(global.get(), Value::I32(1));
        global.set(Value::I32(2)).unwrap();
        assert_eq!(global.get(), Value::I32(2));
        assert_matches!(global.set(Value::I64(3)), Err(GlobalError::TypeMismatch));

        let mut frozen = GlobalEntity::new(GlobalType::new(ValType::I32, false), Value::I32(1));
        assert_matches!(frozen.set(Value::I32(2)), Err(GlobalError::ImmutableWrite));
    }
}
