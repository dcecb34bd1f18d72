//! Setup-time error types.
//!
//! Nothing on the play path returns an error: flips, hides, and enqueues on
//! stale or matched cards are no-ops. Errors only come out of configuration
//! loading and grid generation.

use thiserror::Error;

/// Invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A duration was negative or not finite.
    #[error("invalid duration for `{field}`: {value}")]
    InvalidDuration { field: &'static str, value: f64 },

    /// Layout bounds where the minimum exceeds the maximum, or a zero bound.
    #[error("invalid layout bounds: {0}")]
    InvalidBounds(String),

    /// `max_concurrent_reveals` below two would make pairs impossible.
    #[error("max_concurrent_reveals must be at least 2, got {0}")]
    RevealCapTooSmall(usize),

    /// At least one level must exist.
    #[error("level_count must be at least 1")]
    NoLevels,

    /// TOML could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
}

/// Grid generation failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// The cell count cannot be split into complete pairs.
    #[error("{rows}x{cols} grid has an odd number of cells")]
    OddCellCount { rows: usize, cols: usize },

    /// A grid with no rows or no columns.
    #[error("grid must have at least one row and one column")]
    Empty,

    /// Level numbers start at 1.
    #[error("level numbers start at 1")]
    LevelZero,

    /// Layout bounds that no grid satisfies.
    #[error("layout bounds describe no grid")]
    InvalidBounds,
}

/// Crate-wide error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, Error>;
