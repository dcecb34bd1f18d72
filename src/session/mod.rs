//! Session orchestration.
//!
//! The [`SessionController`] deals a grid, wires the board's `Revealed`
//! stream into the [`PairResolver`](crate::resolver::PairResolver), and
//! turns pair outcomes into counters, score, audio cues, and the
//! level-complete signal.
//!
//! ## Restarts
//!
//! Every `start_*` call drops the previous game's subscriptions before
//! attaching new ones, resets the resolver (cancelling its cycle and hide
//! timers), and returns every card to the pool. Handlers therefore never
//! accumulate across games and no timer fires against a stale board.

mod audio;
mod context;
mod controller;

pub use audio::{AudioCues, Silent};
pub use context::SessionContext;
pub use controller::SessionController;

use serde::{Deserialize, Serialize};

use crate::core::LevelId;

/// What the session is currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No game dealt yet.
    #[default]
    Idle,
    /// Cards are being shown before play; input is ignored.
    Preview,
    /// Accepting flips.
    Playing,
    /// Every pair matched.
    Complete,
}

/// Pair totals for the current game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub total_pairs: usize,
    pub matched_pairs: usize,
}

impl SessionCounters {
    /// Pairs still on the board.
    #[must_use]
    pub fn pairs_left(&self) -> usize {
        self.total_pairs.saturating_sub(self.matched_pairs)
    }
}

/// Signals exposed to score displays, menus, and other collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The score changed (including the reset to 0 at game start).
    ScoreChanged(u32),

    /// Pair counters changed.
    PairsChanged(SessionCounters),

    /// All pairs matched. Emitted once per game.
    LevelComplete {
        /// `None` for random games outside the level progression.
        level: Option<LevelId>,
        score: u32,
    },

    /// Completing a level unlocked the next one.
    LevelUnlocked(LevelId),
}
