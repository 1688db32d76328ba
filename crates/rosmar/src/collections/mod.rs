//! Data structures specialized for the needs of the VM.

pub mod arena;

pub use self::arena::{Arena, ArenaIndex, GuardedEntity};
