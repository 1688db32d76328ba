//! Linear memory entities: plain per-store buffers and shared buffers
//! protected by a grow mutex.

use crate::collections::ArenaIndex;
use core::fmt::{self, Display};
use rosmar_core::{Pages64, TrapCode, PAGE_SIZE};
use std::{sync::Arc, vec, vec::Vec};

/// A raw index to a linear memory entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryIdx(u32);

impl ArenaIndex for MemoryIdx {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn from_usize(value: usize) -> Self {
        let value = value.try_into().unwrap_or_else(|error| {
            panic!("index {value} is out of bounds as memory index: {error}")
        });
        Self(value)
    }
}

/// Errors that may occur upon operating with memory entities.
#[derive(Debug)]
#[non_exhaustive]
pub enum MemoryError {
    /// Tried to allocate more virtual memory than technically possible.
    OutOfBoundsAllocation,
    /// Tried to grow the memory past its maximum.
    OutOfBoundsGrowth,
    /// Tried to access the memory out of bounds.
    OutOfBoundsAccess,
    /// A memory type does not satisfy the constraints of another.
    UnsatisfyingMemoryType {
        /// The unsatisfying memory type.
        unsatisfying: MemoryType,
        /// The required memory type.
        required: MemoryType,
    },
}

impl Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBoundsAllocation => write!(f, "out of bounds memory allocation"),
            Self::OutOfBoundsGrowth => write!(f, "out of bounds memory growth"),
            Self::OutOfBoundsAccess => write!(f, "out of bounds memory access"),
            Self::UnsatisfyingMemoryType {
                unsatisfying,
                required,
            } => {
                write!(
                    f,
                    "memory type {unsatisfying:?} does not satisfy requirements of {required:?}",
                )
            }
        }
    }
}

/// A descriptor for a linear memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryType {
    /// The initial number of pages.
    initial: u64,
    /// The optional maximum number of pages.
    maximum: Option<u64>,
    /// Whether the memory uses 64-bit addresses and sizes.
    memory64: bool,
    /// Whether the memory may be shared between threads.
    shared: bool,
}

impl MemoryType {
    /// Creates a new 32-bit [`MemoryType`].
    pub fn new(initial: u64, maximum: Option<u64>) -> Self {
        Self {
            initial,
            maximum,
            memory64: false,
            shared: false,
        }
    }

    /// Creates a new 64-bit [`MemoryType`].
    pub fn new64(initial: u64, maximum: Option<u64>) -> Self {
        Self {
            initial,
            maximum,
            memory64: true,
            shared: false,
        }
    }

    /// Makes the memory type shared. Shared memories require a maximum.
    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    /// Returns the initial number of pages.
    pub fn initial_pages(&self) -> u64 {
        self.initial
    }

    /// Returns the optional maximum number of pages.
    pub fn maximum_pages(&self) -> Option<u64> {
        self.maximum
    }

    /// Returns `true` for 64-bit memories.
    pub fn is_64(&self) -> bool {
        self.memory64
    }

    /// Returns `true` for shared memories.
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// Returns the hard page limit of the index type.
    fn absolute_max(&self) -> u64 {
        if self.memory64 {
            Pages64::MAX_64.into_inner()
        } else {
            Pages64::MAX_32.into_inner()
        }
    }

    /// Returns `true` if `self` satisfies the `required` memory type for
    /// import matching.
    pub fn satisfies(&self, required: &MemoryType) -> bool {
        if self.memory64 != required.memory64 || self.shared != required.shared {
            return false;
        }
        if self.initial < required.initial {
            return false;
        }
        match (self.maximum, required.maximum) {
            (_, None) => true,
            (Some(max), Some(required_max)) => max <= required_max,
            (None, Some(_)) => false,
        }
    }
}

/// The backing bytes of a memory entity.
#[derive(Debug)]
enum MemoryBuffer {
    /// A buffer exclusively owned by one store.
    Owned(Vec<u8>),
    /// A buffer shared between threads behind a lock.
    ///
    /// Grow operations and accesses serialise on the mutex; the identity
    /// of the [`Arc`] keys the atomics wait queues.
    Shared(Arc<SharedBuffer>),
}

/// The shared backing of a shared linear memory.
#[derive(Debug)]
pub struct SharedBuffer {
    bytes: spin::Mutex<Vec<u8>>,
}

impl SharedBuffer {
    /// Returns a stable key identifying this buffer for wait queues.
    pub fn key(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as usize
    }
}

/// A linear memory entity.
#[derive(Debug)]
pub struct MemoryEntity {
    ty: MemoryType,
    buffer: MemoryBuffer,
}

impl MemoryEntity {
    /// Creates a new memory entity with its initial size.
    ///
    /// # Errors
    ///
    /// If the initial size overflows the address space.
    pub fn new(ty: MemoryType) -> Result<Self, MemoryError> {
        let initial_bytes = Pages64::new(ty.initial)
            .to_bytes()
            .map(|bytes| bytes.into_inner())
            .ok_or(MemoryError::OutOfBoundsAllocation)?;
        let initial_bytes =
            usize::try_from(initial_bytes).map_err(|_| MemoryError::OutOfBoundsAllocation)?;
        let bytes = vec![0x00_u8; initial_bytes];
        let buffer = if ty.shared {
            MemoryBuffer::Shared(Arc::new(SharedBuffer {
                bytes: spin::Mutex::new(bytes),
            }))
        } else {
            MemoryBuffer::Owned(bytes)
        };
        Ok(Self { ty, buffer })
    }

    /// Returns the memory type of the entity.
    pub fn ty(&self) -> MemoryType {
        self.ty
    }

    /// Returns the current size in bytes.
    pub fn size_in_bytes(&self) -> u64 {
        match &self.buffer {
            MemoryBuffer::Owned(bytes) => bytes.len() as u64,
            MemoryBuffer::Shared(shared) => shared.bytes.lock().len() as u64,
        }
    }

    /// Returns the current size in pages.
    pub fn size_in_pages(&self) -> u64 {
        self.size_in_bytes() / u64::from(PAGE_SIZE)
    }

    /// Returns the wait-queue key when the memory is shared.
    pub fn shared_key(&self) -> Option<usize> {
        match &self.buffer {
            MemoryBuffer::Owned(_) => None,
            MemoryBuffer::Shared(shared) => Some(shared.key()),
        }
    }

    /// Runs `f` with shared access to the memory bytes.
    #[inline]
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        match &self.buffer {
            MemoryBuffer::Owned(bytes) => f(bytes),
            MemoryBuffer::Shared(shared) => f(&shared.bytes.lock()),
        }
    }

    /// Runs `f` with exclusive access to the memory bytes.
    ///
    /// For shared memories this serialises with concurrent accessors,
    /// which also gives the read-modify-write atomics their atomicity.
    #[inline]
    pub fn with_bytes_mut<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        match &mut self.buffer {
            MemoryBuffer::Owned(bytes) => f(bytes),
            MemoryBuffer::Shared(shared) => f(&mut shared.bytes.lock()),
        }
    }

    /// Grows the memory by `delta` pages.
    ///
    /// Returns the previous size in pages on success; on failure the size
    /// is unchanged and `None` is returned, which the instruction
    /// translates to `-1`.
    pub fn grow(&mut self, delta: u64) -> Option<u64> {
        let maximum = self
            .ty
            .maximum
            .unwrap_or_else(|| self.ty.absolute_max())
            .min(self.ty.absolute_max());
        let grow_inner = |bytes: &mut Vec<u8>| -> Option<u64> {
            let current_pages = bytes.len() as u64 / u64::from(PAGE_SIZE);
            let new_pages = current_pages.checked_add(delta)?;
            if new_pages > maximum {
                return None;
            }
            let new_bytes = usize::try_from(new_pages.checked_mul(u64::from(PAGE_SIZE))?).ok()?;
            // new bytes are zero-initialised
            bytes.resize(new_bytes, 0x00);
            Some(current_pages)
        };
        match &mut self.buffer {
            MemoryBuffer::Owned(bytes) => grow_inner(bytes),
            MemoryBuffer::Shared(shared) => grow_inner(&mut shared.bytes.lock()),
        }
    }

    /// Reads bytes at `offset` into `buffer`.
    ///
    /// # Errors
    ///
    /// If the range is out of bounds.
    pub fn read(&self, offset: usize, buffer: &mut [u8]) -> Result<(), MemoryError> {
        self.with_bytes(|bytes| {
            let slice = bytes
                .get(offset..)
                .and_then(|slice| slice.get(..buffer.len()))
                .ok_or(MemoryError::OutOfBoundsAccess)?;
            buffer.copy_from_slice(slice);
            Ok(())
        })
    }

    /// Writes `buffer` to the memory at `offset`.
    ///
    /// # Errors
    ///
    /// If the range is out of bounds.
    pub fn write(&mut self, offset: usize, buffer: &[u8]) -> Result<(), MemoryError> {
        self.with_bytes_mut(|bytes| {
            let slice = bytes
                .get_mut(offset..)
                .and_then(|slice| slice.get_mut(..buffer.len()))
                .ok_or(MemoryError::OutOfBoundsAccess)?;
            slice.copy_from_slice(buffer);
            Ok(())
        })
    }

    /// Computes the effective address of an access and bounds-checks it.
    ///
    /// Adds the immediate `offset` to the dynamic `addr` and compares the
    /// access end against the current byte size.
    ///
    /// # Errors
    ///
    /// [`TrapCode::OutOfBoundsMemAccess`] when the access falls outside
    /// the memory; the memory is unmodified in that case.
    #[inline]
    pub fn effective_address(
        &self,
        addr: u64,
        offset: u64,
        width: u64,
    ) -> Result<usize, TrapCode> {
        let size = self.size_in_bytes();
        let end = addr
            .checked_add(offset)
            .and_then(|start| start.checked_add(width))
            .ok_or(TrapCode::OutOfBoundsMemAccess)?;
        if end > size {
            return Err(TrapCode::OutOfBoundsMemAccess);
        }
        Ok((addr + offset) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_returns_old_size_and_zeroes() {
        let mut memory = MemoryEntity::new(MemoryType::new(1, Some(3))).unwrap();
        assert_eq!(memory.size_in_pages(), 1);
        assert_eq!(memory.grow(1), Some(1));
        assert_eq!(memory.size_in_pages(), 2);
        memory.with_bytes(|bytes| assert!(bytes[65536..].iter().all(|b| *b == 0)));
        assert_eq!(memory.grow(2), None);
        assert_eq!(memory.size_in_pages(), 2);
    }

    #[test]
    fn effective_address_bounds() {
        let memory = MemoryEntity::new(MemoryType::new(1, None)).unwrap();
        assert_eq!(memory.effective_address(0, 0, 4), Ok(0));
        assert_eq!(memory.effective_address(65532, 0, 4), Ok(65532));
        assert_eq!(
            memory.effective_address(65533, 0, 4),
            Err(TrapCode::OutOfBoundsMemAccess)
        );
        assert_eq!(
            memory.effective_address(u64::MAX, 8, 4),
            Err(TrapCode::OutOfBoundsMemAccess)
        );
    }

    #[test]
    fn memory_type_import_matching() {
        let exported = MemoryType::new(2, Some(4));
        assert!(exported.satisfies(&MemoryType::new(1, None)));
        assert!(exported.satisfies(&MemoryType::new(2, Some(4))));
        assert!(!exported.satisfies(&MemoryType::new(3, Some(4))));
        assert!(!MemoryType::new(2, None).satisfies(&MemoryType::new(2, Some(4))));
    }
}
