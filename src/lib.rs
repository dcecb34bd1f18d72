//! # pairflip
//!
//! A memory (concentration) card-matching engine built around a
//! non-blocking pair resolver.
//!
//! ## Design Principles
//!
//! 1. **Continuous flipping**: Input is never locked while pairs resolve.
//!    Reveals are queued in completion order and paired two at a time by a
//!    consumer that yields between pairs.
//!
//! 2. **No-op, not error**: Flips, hides, and enqueues on stale, matched, or
//!    already-queued cards are silently ignored. Errors only come from
//!    configuration and grid generation.
//!
//! 3. **Deterministic timing**: Everything runs on one thread inside a
//!    `tokio::task::LocalSet`; flips and mismatch hides are tokio timers, so
//!    tests drive them with a paused clock.
//!
//! ## Architecture
//!
//! ```text
//! flip ─► CardBoard::reveal ─(flip time)─► Revealed ─► PairResolver::enqueue
//!                                                        │
//!   SessionController ◄── PairOutcome { is_match } ◄─────┘
//!     ├─ ComboScorer::register_match ─► ScoreChanged
//!     ├─ counters ─► PairsChanged / LevelComplete (once)
//!     └─ AudioCues
//! ```
//!
//! ## Modules
//!
//! - `core`: Identifiers, configuration, RNG, errors
//! - `events`: Event bus with RAII subscriptions
//! - `cards`: Card state machine and the board/pool
//! - `resolver`: The pair resolver
//! - `scoring`: Combo scoring
//! - `grid`: Layouts, level table, dealing
//! - `session`: Orchestration, level progress, audio cues

pub mod core;
pub mod events;
pub mod cards;
pub mod resolver;
pub mod scoring;
pub mod grid;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    CardId, PairId, LevelId,
    GameConfig, LayoutBounds, GameRng,
    ConfigError, GridError, Error, Result,
};

pub use crate::events::{EventBus, Subscription, SubscriptionId};

pub use crate::cards::{Card, CardBoard, CardEvent, CardEventKind, CardState};

pub use crate::resolver::{PairOutcome, PairResolver};

pub use crate::scoring::{ComboScorer, ScoreChange};

pub use crate::grid::{deal_pair_ids, level_layout, pick_random_layout, GridLayout};

pub use crate::session::{
    AudioCues, Phase, SessionContext, SessionController, SessionCounters, SessionEvent, Silent,
};
