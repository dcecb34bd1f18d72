//! Cards: the flip state machine and the board that hosts it.
//!
//! - [`CardState`] / [`Card`]: per-card state and pair identity
//! - [`CardBoard`]: slot storage doubling as the card pool, timed flips,
//!   and the [`CardEvent`] stream the resolver listens to

mod board;
mod state;

pub use board::{CardBoard, CardEvent, CardEventKind};
pub use state::{Card, CardState};
