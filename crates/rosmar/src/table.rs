//! Table entities: resizable arrays of references of a fixed element type.

use crate::{collections::ArenaIndex, gc::RawRef, types::RefType};
use core::fmt::{self, Display};
use rosmar_core::TrapCode;
use std::{vec, vec::Vec};

/// A raw index to a table entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TableIdx(u32);

impl ArenaIndex for TableIdx {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn from_usize(value: usize) -> Self {
        let value = value.try_into().unwrap_or_else(|error| {
            panic!("index {value} is out of bounds as table index: {error}")
        });
        Self(value)
    }
}

/// Errors that may occur upon operating with table entities.
#[derive(Debug)]
#[non_exhaustive]
pub enum TableError {
    /// Occurs when growing a table out of its set bounds.
    GrowOutOfBounds {
        /// The maximum allowed table size.
        maximum: u64,
        /// The current table size before the growth operation.
        current: u64,
        /// The amount of requested growth.
        delta: u64,
    },
    /// Occurs when accessing the table out of bounds.
    AccessOutOfBounds {
        /// The current size of the table.
        current: u64,
        /// The accessed index that is out of bounds.
        offset: u64,
    },
    /// Occurs when a table type does not satisfy the constraints of another.
    UnsatisfyingTableType,
}

impl Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GrowOutOfBounds {
                maximum,
                current,
                delta,
            } => {
                write!(
                    f,
                    "tried to grow table with size of {current} and maximum of \
                    {maximum} by {delta} out of bounds",
                )
            }
            Self::AccessOutOfBounds { current, offset } => {
                write!(
                    f,
                    "out of bounds access of table element {offset} \
                    of table with size {current}",
                )
            }
            Self::UnsatisfyingTableType => {
                write!(f, "table type does not satisfy the required table type")
            }
        }
    }
}

/// A descriptor for a table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TableType {
    /// The element reference type.
    element: RefType,
    /// The minimum number of elements.
    min: u64,
    /// The optional maximum number of elements.
    max: Option<u64>,
}

impl TableType {
    /// Creates a new [`TableType`].
    ///
    /// # Panics
    ///
    /// If `min` is greater than `max`.
    pub fn new(element: RefType, min: u64, max: Option<u64>) -> Self {
        if let Some(max) = max {
            assert!(min <= max);
        }
        Self { element, min, max }
    }

    /// Returns the element reference type.
    pub fn element(&self) -> RefType {
        self.element
    }

    /// Returns the minimum number of elements.
    pub fn minimum(&self) -> u64 {
        self.min
    }

    /// Returns the optional maximum number of elements.
    pub fn maximum(&self) -> Option<u64> {
        self.max
    }

    /// Returns `true` if `self` satisfies the `required` type for import
    /// matching.
    pub fn satisfies(&self, required: &TableType) -> bool {
        if self.element != required.element {
            return false;
        }
        if self.min < required.min {
            return false;
        }
        match (self.max, required.max) {
            (_, None) => true,
            (Some(max), Some(required_max)) => max <= required_max,
            (None, Some(_)) => false,
        }
    }
}

/// A table entity.
#[derive(Debug)]
pub struct TableEntity {
    ty: TableType,
    elements: Vec<RawRef>,
}

impl TableEntity {
    /// Creates a new table entity filled with `init`.
    pub fn new(ty: TableType, init: RawRef) -> Self {
        let elements = vec![init; ty.min as usize];
        Self { ty, elements }
    }

    /// Returns the table type of the entity.
    pub fn ty(&self) -> TableType {
        self.ty
    }

    /// Returns the current number of elements.
    pub fn size(&self) -> u64 {
        self.elements.len() as u64
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// If `index` is out of bounds.
    pub fn get(&self, index: u64) -> Result<RawRef, TableError> {
        self.elements
            .get(usize::try_from(index).unwrap_or(usize::MAX))
            .copied()
            .ok_or_else(|| TableError::AccessOutOfBounds {
                current: self.size(),
                offset: index,
            })
    }

    /// Replaces the element at `index`.
    ///
    /// # Errors
    ///
    /// If `index` is out of bounds.
    pub fn set(&mut self, index: u64, value: RawRef) -> Result<(), TableError> {
        let current = self.size();
        let element = self
            .elements
            .get_mut(usize::try_from(index).unwrap_or(usize::MAX))
            .ok_or(TableError::AccessOutOfBounds {
                current,
                offset: index,
            })?;
        *element = value;
        Ok(())
    }

    /// Grows the table by `delta` elements filled with `init`.
    ///
    /// Returns the previous size on success, `None` on failure, which the
    /// instruction translates to `-1`.
    pub fn grow(&mut self, delta: u64, init: RawRef) -> Option<u64> {
        let maximum = self.ty.max.unwrap_or(u32::MAX as u64);
        let current = self.size();
        let new_size = current.checked_add(delta)?;
        if new_size > maximum {
            return None;
        }
        let new_size = usize::try_from(new_size).ok()?;
        self.elements.resize(new_size, init);
        Some(current)
    }

    /// Fills `len` elements starting at `dst` with `value`.
    ///
    /// # Errors
    ///
    /// [`TrapCode::OutOfBoundsTableAccess`] when the range is out of
    /// bounds; the table is unmodified in that case.
    pub fn fill(&mut self, dst: u64, value: RawRef, len: u64) -> Result<(), TrapCode> {
        let range = checked_range(dst, len, self.size())?;
        self.elements[range].fill(value);
        Ok(())
    }

    /// Copies `len` elements within this table.
    ///
    /// # Errors
    ///
    /// [`TrapCode::OutOfBoundsTableAccess`] when either range is out of
    /// bounds.
    pub fn copy_within(&mut self, dst: u64, src: u64, len: u64) -> Result<(), TrapCode> {
        let dst_range = checked_range(dst, len, self.size())?;
        let src_range = checked_range(src, len, self.size())?;
        self.elements.copy_within(src_range, dst_range.start);
        Ok(())
    }

    /// Copies `len` elements from `src` into this table at `dst`.
    ///
    /// # Errors
    ///
    /// [`TrapCode::OutOfBoundsTableAccess`] when either range is out of
    /// bounds.
    pub fn copy_from(
        &mut self,
        src_table: &TableEntity,
        dst: u64,
        src: u64,
        len: u64,
    ) -> Result<(), TrapCode> {
        let dst_range = checked_range(dst, len, self.size())?;
        let src_range = checked_range(src, len, src_table.size())?;
        self.elements[dst_range].copy_from_slice(&src_table.elements[src_range]);
        Ok(())
    }

    /// Copies `len` references from `items` at `src` into this table.
    ///
    /// # Errors
    ///
    /// [`TrapCode::OutOfBoundsTableAccess`] when either range is out of
    /// bounds.
    pub fn init(
        &mut self,
        items: &[RawRef],
        dst: u64,
        src: u64,
        len: u64,
    ) -> Result<(), TrapCode> {
        let dst_range = checked_range(dst, len, self.size())?;
        let src_range = checked_range(src, len, items.len() as u64)?;
        self.elements[dst_range].copy_from_slice(&items[src_range]);
        Ok(())
    }
}

/// Converts `(start, len)` into a `usize` range checked against `size`.
fn checked_range(
    start: u64,
    len: u64,
    size: u64,
) -> Result<core::ops::Range<usize>, TrapCode> {
    let end = start
        .checked_add(len)
        .ok_or(TrapCode::OutOfBoundsTableAccess)?;
    if end > size {
        return Err(TrapCode::OutOfBoundsTableAccess);
    }
    Ok(start as usize..end as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeapType;

    fn funcref_table(min: u64, max: Option<u64>) -> TableEntity {
        let ty = TableType::new(
            RefType {
                nullable: true,
                heap: HeapType::Func,
            },
            min,
            max,
        );
        TableEntity::new(ty, RawRef::NULL)
    }

    #[test]
    fn get_set_grow() {
        let mut table = funcref_table(2, Some(4));
        assert!(table.get(0).unwrap().is_null());
        assert!(table.get(2).is_err());
        table.set(1, RawRef::i31(7)).unwrap();
        assert_eq!(table.get(1).unwrap().i31_get_s(), Some(7));
        assert_eq!(table.grow(2, RawRef::NULL), Some(2));
        assert_eq!(table.grow(1, RawRef::NULL), None);
        assert_eq!(table.size(), 4);
    }

    #[test]
    fn fill_bounds_leave_table_unmodified() {
        let mut table = funcref_table(4, None);
        assert_eq!(
            table.fill(2, RawRef::i31(1), 3),
            Err(TrapCode::OutOfBoundsTableAccess)
        );
        assert!(table.get(2).unwrap().is_null());
        table.fill(1, RawRef::i31(1), 2).unwrap();
        assert!(!table.get(2).unwrap().is_null());
    }
}
