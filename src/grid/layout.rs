//! Grid shapes and dealing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{GameRng, GridError, LayoutBounds, PairId};

/// A rows × cols grid with an even number of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridLayout {
    rows: usize,
    cols: usize,
}

impl GridLayout {
    /// Validate a grid shape.
    ///
    /// ```
    /// use pairflip::core::GridError;
    /// use pairflip::grid::GridLayout;
    ///
    /// assert_eq!(GridLayout::new(3, 4).unwrap().pairs(), 6);
    /// assert_eq!(GridLayout::new(3, 3), Err(GridError::OddCellCount { rows: 3, cols: 3 }));
    /// ```
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty);
        }
        if (rows * cols) % 2 != 0 {
            return Err(GridError::OddCellCount { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub const fn cells(&self) -> usize {
        self.rows * self.cols
    }

    #[must_use]
    pub const fn pairs(&self) -> usize {
        self.cells() / 2
    }
}

impl std::fmt::Display for GridLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Pair-ids for every cell in row-major order: each id appears exactly
/// twice, shuffled by `rng`.
pub fn deal_pair_ids(layout: GridLayout, rng: &mut GameRng) -> Vec<PairId> {
    let mut ids: Vec<PairId> = (0..layout.pairs() as u32)
        .flat_map(|id| [PairId::new(id), PairId::new(id)])
        .collect();
    rng.shuffle(&mut ids);
    ids
}

/// Pick a random grid inside `bounds`.
///
/// Rows and columns are drawn independently, then columns (and, failing
/// that, rows) are shrunk until the grid fits `max_cells`. An odd cell count
/// is fixed by dropping a column, else a row, else growing one.
///
/// Bounds that fail [`LayoutBounds::validate`] yield
/// [`GridError::InvalidBounds`].
pub fn pick_random_layout(bounds: &LayoutBounds, rng: &mut GameRng) -> Result<GridLayout, GridError> {
    if let Err(reason) = bounds.validate() {
        debug!(%reason, "layout bounds rejected");
        return Err(GridError::InvalidBounds);
    }

    let mut rows = rng.gen_inclusive(bounds.min_rows, bounds.max_rows);
    let mut cols = rng.gen_inclusive(bounds.min_cols, bounds.max_cols);

    while rows * cols > bounds.max_cells && cols > bounds.min_cols {
        cols -= 1;
    }
    while rows * cols > bounds.max_cells && rows > bounds.min_rows {
        rows -= 1;
    }

    if (rows * cols) % 2 != 0 {
        if cols > bounds.min_cols {
            cols -= 1;
        } else if rows > bounds.min_rows {
            rows -= 1;
        } else if cols < bounds.max_cols && rows * (cols + 1) <= bounds.max_cells {
            cols += 1;
        } else if rows < bounds.max_rows && (rows + 1) * cols <= bounds.max_cells {
            rows += 1;
        }
    }

    debug!(rows, cols, "picked random layout");
    GridLayout::new(rows, cols)
}
