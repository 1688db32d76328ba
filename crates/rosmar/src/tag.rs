//! Exception tag entities.
//!
//! A tag identifies an exception class; its function type index describes
//! the payload shape. Tag identity is per store entity, so two instances
//! importing the same tag agree on it during catch matching.

use crate::{collections::ArenaIndex, types::CompTypeId};

/// A raw index to a tag entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TagIdx(u32);

impl ArenaIndex for TagIdx {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn from_usize(value: usize) -> Self {
        let value = value
            .try_into()
            .unwrap_or_else(|error| panic!("index {value} is out of bounds as tag index: {error}"));
        Self(value)
    }
}

/// An exception tag entity.
#[derive(Debug)]
pub struct TagEntity {
    /// The function type describing the payload shape.
    ///
    /// The result types are empty for every valid tag.
    ty: CompTypeId,
}

impl TagEntity {
    /// Creates a new tag entity.
    pub fn new(ty: CompTypeId) -> Self {
        Self { ty }
    }

    /// Returns the function type describing the payload shape.
    pub fn ty(&self) -> CompTypeId {
        self.ty
    }
}
