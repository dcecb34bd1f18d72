//! Identifiers for cards, pairs, and levels.
//!
//! ## Card handles
//!
//! Cards live in slots on a [`CardBoard`](crate::cards::CardBoard). A
//! `CardId` names a slot *and* the generation of the card occupying it, so a
//! handle kept past a recycle simply stops resolving instead of aliasing the
//! next card dealt into the slot.
//!
//! ```
//! use pairflip::core::CardId;
//!
//! let first = CardId::new(3, 0);
//! let reused = CardId::new(3, 1);
//! assert_eq!(first.slot(), reused.slot());
//! assert_ne!(first, reused);
//! ```

use serde::{Deserialize, Serialize};

/// Identity shared by exactly two cards; equal pair-ids form a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(pub u32);

impl PairId {
    /// Create a new pair ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for PairId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pair({})", self.0)
    }
}

/// Generational handle to a card on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId {
    slot: u32,
    generation: u32,
}

impl CardId {
    /// Create a handle for `slot` at `generation`.
    #[must_use]
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Slot index on the board.
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.slot
    }

    /// How many times the slot had been recycled when this card was dealt.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({}v{})", self.slot, self.generation)
    }
}

/// 1-based level number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(pub u32);

impl LevelId {
    /// The first level, always unlocked.
    pub const FIRST: LevelId = LevelId(1);

    /// Create a new level ID.
    #[must_use]
    pub const fn new(level: u32) -> Self {
        Self(level)
    }

    /// Get the raw level number.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The level after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for LevelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Level({})", self.0)
    }
}
