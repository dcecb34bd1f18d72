//! Core engine types: identifiers, configuration, RNG, errors.

pub mod entity;
pub mod config;
pub mod rng;
pub mod error;

pub use entity::{CardId, LevelId, PairId};
pub use config::{GameConfig, LayoutBounds};
pub use rng::GameRng;
pub use error::{ConfigError, Error, GridError, Result};
