//! Time-windowed combo scoring.

use serde::{Deserialize, Serialize};

/// Points for a match that does not continue a combo.
pub const BASE_POINTS: u32 = 2;

/// Points for a match landing inside the combo window of the previous one.
pub const COMBO_POINTS: u32 = 4;

/// Result of one [`ComboScorer::register_match`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    /// Points added by this match.
    pub gained: u32,
    /// Running total after this match.
    pub score: u32,
    /// Streak length including this match.
    pub combo: u32,
}

/// Score and combo tracker.
///
/// Timestamps are seconds on any monotonic clock; only differences matter.
/// The bonus is flat: the first match of a streak is worth
/// [`BASE_POINTS`], every later one [`COMBO_POINTS`], however long the
/// streak runs.
///
/// ```
/// use pairflip::scoring::ComboScorer;
///
/// let mut scorer = ComboScorer::new(2.0);
/// assert_eq!(scorer.register_match(0.0).score, 2);
/// assert_eq!(scorer.register_match(1.0).score, 6);
/// assert_eq!(scorer.register_match(4.0).score, 8);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComboScorer {
    combo_window: f64,
    score: u32,
    current_combo: u32,
    last_match: f64,
}

impl ComboScorer {
    /// Create a scorer with the given combo window in seconds.
    #[must_use]
    pub fn new(combo_window: f64) -> Self {
        Self {
            combo_window,
            score: 0,
            current_combo: 0,
            last_match: f64::NEG_INFINITY,
        }
    }

    /// Record a match at time `now`.
    pub fn register_match(&mut self, now: f64) -> ScoreChange {
        if now - self.last_match <= self.combo_window {
            self.current_combo += 1;
        } else {
            self.current_combo = 1;
        }
        self.last_match = now;

        let gained = if self.current_combo == 1 { BASE_POINTS } else { COMBO_POINTS };
        self.score = self.score.saturating_add(gained);

        ScoreChange {
            gained,
            score: self.score,
            combo: self.current_combo,
        }
    }

    /// Zero the score and forget the streak. The next match never counts
    /// as a combo.
    pub fn reset_score(&mut self) {
        self.score = 0;
        self.current_combo = 0;
        self.last_match = f64::NEG_INFINITY;
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn combo(&self) -> u32 {
        self.current_combo
    }

    #[must_use]
    pub fn combo_window(&self) -> f64 {
        self.combo_window
    }

    /// Time of the last match, or negative infinity if none since reset.
    #[must_use]
    pub fn last_match(&self) -> f64 {
        self.last_match
    }
}
