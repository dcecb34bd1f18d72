//! Grid generation: layout shapes, the level table, and shuffled deals.
//!
//! Grid generation is the one place a misconfiguration surfaces as an
//! error: a shape with an odd cell count cannot be dealt into complete
//! pairs and is rejected with [`GridError::OddCellCount`](crate::core::GridError).

mod layout;
mod levels;

pub use layout::{deal_pair_ids, pick_random_layout, GridLayout};
pub use levels::level_layout;
