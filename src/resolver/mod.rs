//! Pair resolution.
//!
//! The resolver consumes the `Revealed` card stream and turns it into pair
//! outcomes. Its pairing policy is temporal adjacency: the two oldest
//! waiting reveals are paired, whatever their identity. With five reveals in
//! a burst the pairs are (1st, 2nd), (3rd, 4th) and the 5th waits. The
//! resolver never caps how many reveals may be waiting; an input cap lives
//! in the session (`GameConfig::max_concurrent_reveals`).
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//! use pairflip::cards::{CardBoard, CardEventKind, CardState};
//! use pairflip::core::PairId;
//! use pairflip::resolver::PairResolver;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(
//! # tokio::task::LocalSet::new().run_until(async {
//! let board = CardBoard::new(Duration::from_millis(10));
//! let resolver = PairResolver::new(board.clone(), Duration::from_millis(50));
//!
//! let feed = resolver.clone();
//! let _wiring = board.subscribe(move |event| {
//!     if event.kind == CardEventKind::Revealed {
//!         feed.enqueue(event.card);
//!     }
//! });
//!
//! let a = board.spawn(Some(PairId::new(4)));
//! let b = board.spawn(Some(PairId::new(4)));
//! board.reveal(a);
//! board.reveal(b);
//! tokio::time::sleep(Duration::from_millis(20)).await;
//!
//! assert_eq!(board.state(a), Some(CardState::Matched));
//! assert_eq!(board.state(b), Some(CardState::Matched));
//! # }));
//! ```

mod pair;

pub use pair::PairResolver;

use serde::{Deserialize, Serialize};

use crate::core::CardId;

/// Result of resolving one pair, emitted once per dequeued pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairOutcome {
    /// The earlier of the two reveals.
    pub first: CardId,
    /// The later of the two reveals.
    pub second: CardId,
    /// Whether the two cards share a pair-id.
    pub is_match: bool,
}

impl PairOutcome {
    /// Both cards of the pair, in reveal order.
    #[must_use]
    pub fn cards(&self) -> [CardId; 2] {
        [self.first, self.second]
    }
}
