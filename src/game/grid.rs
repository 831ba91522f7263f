use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A `(row, col)` location on the grid. Row 0 is the top edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Occupancy of a single grid square.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Empty,
    Full,
}

/// Errors raised by direct cell access.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the {height}x{width} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },
    #[error("grid must have between 1 and {MAX_CELLS} cells, got {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },
}

/// Unit moves on the grid.
///
/// Enumeration order is part of the movement contract: orthogonal moves come
/// first (up, down, left, right), then diagonals (up-left, up-right,
/// down-left, down-right). Movement ties are broken by this order.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    UpLeft = 4,
    UpRight = 5,
    DownLeft = 6,
    DownRight = 7,
}

impl Direction {
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// `(d_row, d_col)` for this move.
    #[inline]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (-1, 1),
            Direction::DownLeft => (1, -1),
            Direction::DownRight => (1, 1),
        }
    }

    #[inline]
    pub const fn is_diagonal(self) -> bool {
        (self as u8) >= 4
    }
}

/// Largest supported cell count. Distances are `u32` and the sentinel is
/// the cell count itself, so it has to fit.
pub const MAX_CELLS: usize = u32::MAX as usize;

/// Cell count of a `height x width` grid, or
/// [`GridError::InvalidDimensions`] when it is zero or above [`MAX_CELLS`].
pub fn checked_area(height: usize, width: usize) -> Result<usize, GridError> {
    height
        .checked_mul(width)
        .filter(|&area| area > 0 && area <= MAX_CELLS)
        .ok_or(GridError::InvalidDimensions { height, width })
}

/// Up to eight neighbors, kept on the stack.
pub type Neighbors = SmallVec<[Cell; 8]>;

/// Obstacle map for a fixed `height x width` rectangle.
///
/// Cells are stored row-major. Every direct accessor validates its
/// coordinates and reports [`GridError::OutOfBounds`] instead of clamping.
/// Neighbor enumeration only yields in-bounds cells and does not look at
/// occupancy; skipping obstacles is the flood fill's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// An all-empty grid.
    pub fn new(height: usize, width: usize) -> Result<Self, GridError> {
        let area = checked_area(height, width)?;
        Ok(Self {
            height,
            width,
            cells: vec![CellState::Empty; area],
        })
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of cells, also the "unreachable" distance sentinel. Never
    /// above [`MAX_CELLS`].
    #[inline]
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    /// Row-major index of an in-bounds cell.
    #[inline]
    pub fn index(&self, cell: Cell) -> usize {
        debug_assert!(self.contains(cell.row, cell.col), "cell {cell} outside the grid");
        cell.row * self.width + cell.col
    }

    pub fn check(&self, row: usize, col: usize) -> Result<Cell, GridError> {
        if self.contains(row, col) {
            Ok(Cell::new(row, col))
        } else {
            Err(GridError::OutOfBounds {
                row,
                col,
                height: self.height,
                width: self.width,
            })
        }
    }

    /// Reset every cell to empty. Dimensions are preserved.
    pub fn clear(&mut self) {
        self.cells.fill(CellState::Empty);
    }

    /// Mark a cell as an obstacle. Idempotent.
    pub fn set_full(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        let idx = self.index(self.check(row, col)?);
        self.cells[idx] = CellState::Full;
        Ok(())
    }

    pub fn set_empty(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        let idx = self.index(self.check(row, col)?);
        self.cells[idx] = CellState::Empty;
        Ok(())
    }

    pub fn cell_state(&self, row: usize, col: usize) -> Result<CellState, GridError> {
        let idx = self.index(self.check(row, col)?);
        Ok(self.cells[idx])
    }

    pub fn is_empty(&self, row: usize, col: usize) -> Result<bool, GridError> {
        Ok(self.cell_state(row, col)? == CellState::Empty)
    }

    /// Unchecked passability for cells already known to be in bounds.
    #[inline]
    pub(crate) fn is_passable(&self, cell: Cell) -> bool {
        self.cells[self.index(cell)] == CellState::Empty
    }

    /// Iterate over obstacle cells in row-major order.
    pub fn obstacles(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == CellState::Full)
            .map(move |(idx, _)| Cell::new(idx / width, idx % width))
    }

    /// The in-bounds cell one step from `cell` in `dir`, if any.
    #[inline]
    pub fn step(&self, cell: Cell, dir: Direction) -> Option<Cell> {
        let (d_row, d_col) = dir.offset();
        let row = cell.row.checked_add_signed(d_row)?;
        let col = cell.col.checked_add_signed(d_col)?;
        self.contains(row, col).then_some(Cell::new(row, col))
    }

    /// In-bounds orthogonal neighbors: up, down, left, right.
    pub fn four_neighbors(&self, row: usize, col: usize) -> Neighbors {
        self.neighbors_in(Cell::new(row, col), &Direction::ORTHOGONAL)
    }

    /// In-bounds orthogonal neighbors followed by in-bounds diagonals.
    pub fn eight_neighbors(&self, row: usize, col: usize) -> Neighbors {
        let cell = Cell::new(row, col);
        let mut out = self.neighbors_in(cell, &Direction::ORTHOGONAL);
        out.extend(Direction::DIAGONAL.iter().filter_map(|&dir| self.step(cell, dir)));
        out
    }

    fn neighbors_in(&self, cell: Cell, dirs: &[Direction]) -> Neighbors {
        dirs.iter().filter_map(|&dir| self.step(cell, dir)).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for state in row {
                let c = match state {
                    CellState::Empty => '.',
                    CellState::Full => '#',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
