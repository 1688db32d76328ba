//! Compile-time side tables routing traps and exceptions to handlers.
//!
//! The translator emits one [`TryBlock`] per `try` region and registers
//! every potentially trapping instruction inside it. The interpreter's
//! unwinder and the JIT's signal handler consult the same tables.

use crate::{OffsetList, OpPos};
use std::vec::Vec;

/// Index of a [`TryBlock`] within its function's [`TryTable`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TryBlockIdx(pub u32);

impl TryBlockIdx {
    /// The sentinel parent of the outermost try region: the host.
    pub const HOST: TryBlockIdx = TryBlockIdx(u32::MAX);

    /// Returns `true` for the host sentinel.
    pub fn is_host(self) -> bool {
        self == Self::HOST
    }
}

/// The tag index a [`CatchBlock`] matches.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CatchTag(pub u32);

impl CatchTag {
    /// The sentinel matching every tag, including traps for the `catch_all`
    /// recovery semantics.
    pub const ALL: CatchTag = CatchTag(u32::MAX);

    /// Returns `true` for the catch-all sentinel.
    pub fn is_catch_all(self) -> bool {
        self == Self::ALL
    }
}

/// A single catch handler of a try region.
#[derive(Debug, Clone)]
pub struct CatchBlock {
    /// The tag this handler matches, or [`CatchTag::ALL`].
    pub tag: CatchTag,
    /// The bytecode position execution resumes at.
    pub handler: OpPos,
    /// The operand slots the exception payload is copied to, in tag
    /// signature order. Empty for `catch_all`.
    pub payload: OffsetList,
    /// Whether the handler additionally receives the exception reference
    /// (the `catch_ref`/`catch_all_ref` forms) at the slot following the
    /// payload, and therefore may recover traps.
    pub captures_exnref: bool,
    /// The slot receiving the exception reference when captured.
    pub exnref_slot: u16,
}

/// A `try` region of a function.
#[derive(Debug, Clone)]
pub struct TryBlock {
    /// First covered bytecode position.
    pub begin: OpPos,
    /// One-past-last covered bytecode position.
    pub end: OpPos,
    /// The enclosing try region, or [`TryBlockIdx::HOST`].
    pub parent: TryBlockIdx,
    /// The catch handlers in declaration order.
    pub catches: Vec<CatchBlock>,
}

impl TryBlock {
    /// Returns `true` when `pc` lies within the covered range.
    pub fn contains(&self, pc: OpPos) -> bool {
        self.begin <= pc && pc < self.end
    }
}

/// All try regions of one function, in emission order.
///
/// Regions nest properly, so emission order sorts them by `begin` with
/// inner regions following their ancestors.
#[derive(Debug, Clone, Default)]
pub struct TryTable {
    blocks: Vec<TryBlock>,
}

impl TryTable {
    /// Creates an empty [`TryTable`].
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Returns `true` if the function has no try regions.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Appends a try region, returning its index.
    pub fn push(&mut self, block: TryBlock) -> TryBlockIdx {
        let idx = TryBlockIdx(self.blocks.len() as u32);
        self.blocks.push(block);
        idx
    }

    /// Returns the try region at `idx`.
    ///
    /// # Panics
    ///
    /// Panics on the host sentinel or an out-of-bounds index.
    pub fn block(&self, idx: TryBlockIdx) -> &TryBlock {
        &self.blocks[idx.0 as usize]
    }

    /// Exclusive access to the try region at `idx`.
    pub fn block_mut(&mut self, idx: TryBlockIdx) -> &mut TryBlock {
        &mut self.blocks[idx.0 as usize]
    }

    /// Finds the innermost try region whose range contains `pc`.
    ///
    /// Runs in `O(log n)` over the emission-ordered blocks: a backwards
    /// scan from the last block beginning at or before `pc` visits only
    /// ancestors of the innermost match.
    pub fn find_innermost(&self, pc: OpPos) -> Option<TryBlockIdx> {
        let upper = self
            .blocks
            .partition_point(|block| block.begin <= pc);
        self.blocks[..upper]
            .iter()
            .rposition(|block| block.contains(pc))
            .map(|idx| TryBlockIdx(idx as u32))
    }
}

/// The sorted positions of potentially trapping instructions of a function.
///
/// The JIT backend contract consumes this to build its native trap-address
/// table; the interpreter derives handlers from the [`TryTable`] directly.
#[derive(Debug, Clone, Default)]
pub struct TrapPointTable {
    points: Vec<OpPos>,
}

impl TrapPointTable {
    /// Creates an empty [`TrapPointTable`].
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Registers a trapping instruction position.
    ///
    /// Positions arrive in emission order, keeping the table sorted.
    pub fn register(&mut self, pos: OpPos) {
        debug_assert!(self.points.last().map_or(true, |last| *last <= pos));
        self.points.push(pos);
    }

    /// Returns `true` when `pos` is a registered trap point.
    pub fn contains(&self, pos: OpPos) -> bool {
        self.points.binary_search(&pos).is_ok()
    }

    /// Returns the registered positions.
    pub fn as_slice(&self) -> &[OpPos] {
        &self.points
    }
}
