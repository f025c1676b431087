//! Shared primitive types used across the entire garden core.

/// Wall-clock instant in milliseconds. Always supplied by the caller;
/// the core never reads a clock of its own.
pub type Timestamp = u64;

/// Position of a slot in the garden grid. Stable for the life of a game.
pub type SlotIndex = usize;

/// Catalog identifier of a seed type (e.g. "rose").
pub type SeedId = String;

/// Stable identifier of a player's save profile.
pub type ProfileId = String;

/// Number of slots in the garden grid (4 × 4).
pub const GRID_SIZE: usize = 16;
