//! Card flip state machine.
//!
//! ```text
//!            reveal             (flip done)
//!   Hidden ─────────► Revealing ──────────► Revealed ──► Matched
//!     ▲                  ▲                     │ hide
//!     │   (flip done)    │ reveal              ▼
//!     └───────────────── Hiding ◄──────────────┘
//! ```
//!
//! `Matched` is absorbing; only a pool reset brings a card back to `Hidden`.

use serde::{Deserialize, Serialize};

use crate::core::PairId;

/// Where a card is in its flip cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardState {
    /// Face down.
    #[default]
    Hidden,
    /// Flip-to-front animation in flight.
    Revealing,
    /// Face up and waiting to be paired.
    Revealed,
    /// Flip-to-back animation in flight.
    Hiding,
    /// Retired as part of a matched pair.
    Matched,
}

impl CardState {
    /// `reveal` only starts from a face-down or hiding card.
    #[must_use]
    pub const fn can_reveal(self) -> bool {
        matches!(self, CardState::Hidden | CardState::Hiding)
    }

    /// `hide` only starts from a fully revealed card.
    #[must_use]
    pub const fn can_hide(self) -> bool {
        matches!(self, CardState::Revealed)
    }

    #[must_use]
    pub const fn is_matched(self) -> bool {
        matches!(self, CardState::Matched)
    }

    /// True while the card is animating.
    #[must_use]
    pub const fn is_flipping(self) -> bool {
        matches!(self, CardState::Revealing | CardState::Hiding)
    }
}

impl std::fmt::Display for CardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardState::Hidden => "hidden",
            CardState::Revealing => "revealing",
            CardState::Revealed => "revealed",
            CardState::Hiding => "hiding",
            CardState::Matched => "matched",
        };
        f.write_str(name)
    }
}

/// A card's identity and flip state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Shared with exactly one other card on a well-formed board.
    /// `None` while unassigned; unassigned cards never match anything.
    pub pair_id: Option<PairId>,

    /// Current flip state.
    pub state: CardState,
}

impl Card {
    /// A face-down card with the given identity.
    #[must_use]
    pub const fn new(pair_id: Option<PairId>) -> Self {
        Self { pair_id, state: CardState::Hidden }
    }

    /// Whether two cards form a match. Unassigned ids never match.
    #[must_use]
    pub fn matches(&self, other: &Card) -> bool {
        matches!((self.pair_id, other.pair_id), (Some(a), Some(b)) if a == b)
    }
}
