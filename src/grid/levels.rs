//! The level progression table.

use crate::core::{GridError, LevelId};

use super::layout::GridLayout;

/// Grid shape for a level.
///
/// Levels 1–10 come from a fixed table; later levels grow with the level
/// number and top out at 5×6.
///
/// ```
/// use pairflip::core::LevelId;
/// use pairflip::grid::level_layout;
///
/// assert_eq!(level_layout(LevelId::new(1)).unwrap().cells(), 4);
/// assert_eq!(level_layout(LevelId::new(42)).unwrap().cells(), 30);
/// ```
pub fn level_layout(level: LevelId) -> Result<GridLayout, GridError> {
    let (rows, cols) = match level.raw() {
        0 => return Err(GridError::LevelZero),
        1 => (2, 2),
        2 => (2, 3),
        3 => (2, 4),
        4 | 5 => (3, 4),
        6 => (4, 4),
        7 | 8 => (4, 5),
        9 | 10 => (5, 6),
        n => {
            let n = n as usize;
            ((2 + n / 3).clamp(2, 5), (2 + n / 2).clamp(2, 6))
        }
    };
    GridLayout::new(rows, cols)
}
