use crate::game::grid::{Cell, Grid, GridError};
use fixedbitset::FixedBitSet;
use std::collections::VecDeque;
use std::fmt;
use std::ops::Index;

#[cfg(test)]
mod tests;

/// Reusable BFS buffers.
///
/// A driver that recomputes fields every tick keeps one of these around so
/// the queue and the visited bitset are allocated once per grid size.
#[derive(Default, Clone, Debug)]
pub struct FloodScratch {
    queue: VecDeque<Cell>,
    visited: FixedBitSet,
}

impl FloodScratch {
    pub fn with_capacity(cells: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(cells),
            visited: FixedBitSet::with_capacity(cells),
        }
    }

    fn reset(&mut self, cells: usize) {
        self.queue.clear();
        self.visited.clear();
        self.visited.grow(cells);
    }
}

/// Hop counts from every cell to the nearest source cell.
///
/// Produced by a multi-source breadth-first flood over the grid's empty
/// cells using 4-connected moves.
///
/// # Invariants
///
/// - Every source cell holds 0.
/// - Every empty cell reachable from a source holds the length of the
///   shortest 4-connected path through empty cells to the nearest source.
/// - Obstacles and cells cut off from all sources hold [`sentinel`], which
///   is `height * width` and therefore larger than any real path length.
///
/// # Performance
///
/// - **Generation:** O(height × width); each cell is enqueued at most once
///   no matter how many sources share it.
/// - **Query:** O(1) array lookup.
///
/// [`sentinel`]: DistanceField::sentinel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceField {
    height: usize,
    width: usize,
    sentinel: u32,
    values: Vec<u32>,
}

impl DistanceField {
    /// An all-sentinel field sized for `grid`.
    pub fn unreached(grid: &Grid) -> Self {
        // Grid caps its area at MAX_CELLS, so the sentinel fits.
        let sentinel = grid.area() as u32;
        Self {
            height: grid.height(),
            width: grid.width(),
            sentinel,
            values: vec![sentinel; grid.area()],
        }
    }

    /// Flood from `sources` over `grid`.
    ///
    /// Duplicates are allowed and the first occurrence wins. An empty source
    /// list yields an all-sentinel field. Any out-of-bounds source fails the
    /// whole computation with [`GridError::OutOfBounds`].
    pub fn compute(grid: &Grid, sources: &[Cell]) -> Result<Self, GridError> {
        let mut field = Self::unreached(grid);
        let mut scratch = FloodScratch::with_capacity(grid.area());
        field.recompute(grid, sources, &mut scratch)?;
        Ok(field)
    }

    /// Recompute in place, reusing this field's storage and `scratch`.
    ///
    /// Sources are validated before anything is written, so on error the
    /// field keeps its previous values.
    pub fn recompute(
        &mut self,
        grid: &Grid,
        sources: &[Cell],
        scratch: &mut FloodScratch,
    ) -> Result<(), GridError> {
        for source in sources {
            grid.check(source.row, source.col)?;
        }
        self.flood(grid, sources, scratch);
        Ok(())
    }

    /// [`recompute`](Self::recompute) for sources already known to be in
    /// bounds, such as an outbreak's populations.
    pub(crate) fn flood(&mut self, grid: &Grid, sources: &[Cell], scratch: &mut FloodScratch) {
        let cells = grid.area();
        self.height = grid.height();
        self.width = grid.width();
        self.sentinel = cells as u32;
        self.values.clear();
        self.values.resize(cells, self.sentinel);
        scratch.reset(cells);

        for &source in sources {
            let idx = grid.index(source);
            if scratch.visited.put(idx) {
                continue;
            }
            self.values[idx] = 0;
            scratch.queue.push_back(source);
        }

        while let Some(current) = scratch.queue.pop_front() {
            let next = self.values[grid.index(current)] + 1;
            for neighbor in grid.four_neighbors(current.row, current.col) {
                let n_idx = grid.index(neighbor);
                if scratch.visited.contains(n_idx) || !grid.is_passable(neighbor) {
                    continue;
                }
                scratch.visited.insert(n_idx);
                self.values[n_idx] = next;
                scratch.queue.push_back(neighbor);
            }
        }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Value marking "unreachable": `height * width`.
    #[inline]
    pub fn sentinel(&self) -> u32 {
        self.sentinel
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        (row < self.height && col < self.width).then(|| self.values[row * self.width + col])
    }

    #[inline]
    pub fn is_reachable(&self, cell: Cell) -> bool {
        self[cell] != self.sentinel
    }

    /// Row-major values.
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// The field as a `height x width` nested array.
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.values.chunks(self.width).map(<[u32]>::to_vec).collect()
    }

    /// Largest finite distance, or `None` when nothing was reached.
    pub fn max_reachable(&self) -> Option<u32> {
        self.values.iter().copied().filter(|&v| v != self.sentinel).max()
    }
}

impl Index<Cell> for DistanceField {
    type Output = u32;

    /// # Panics
    ///
    /// If `cell` is outside the field. Use [`get`](DistanceField::get) for
    /// a checked lookup.
    #[inline]
    fn index(&self, cell: Cell) -> &u32 {
        assert!(
            cell.row < self.height && cell.col < self.width,
            "cell {cell} is outside the {}x{} distance field",
            self.height,
            self.width
        );
        &self.values[cell.row * self.width + cell.col]
    }
}

impl fmt::Display for DistanceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell_width = self.sentinel.to_string().len();
        for row in self.values.chunks(self.width) {
            for (i, &value) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                if value == self.sentinel {
                    write!(f, "{:>cell_width$}", "-")?;
                } else {
                    write!(f, "{value:>cell_width$}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
