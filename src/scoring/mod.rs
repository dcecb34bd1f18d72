//! Match scoring.

mod combo;

pub use combo::{ComboScorer, ScoreChange, BASE_POINTS, COMBO_POINTS};
