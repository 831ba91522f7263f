use crate::game::distance_field::DistanceField;
use crate::game::grid::{Cell, Grid};
use smallvec::SmallVec;


/// Neighbors plus "stay".
pub type Candidates = SmallVec<[Cell; 9]>;

/// Which extremum of the opposing field a population steers toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Objective {
    /// Maximize distance to the other population.
    Flee,
    /// Minimize distance to the other population.
    Chase,
}

impl Objective {
    /// Whether `candidate` strictly beats `best`. Equal values never win,
    /// so the earliest candidate survives ties.
    #[inline]
    fn improves(self, candidate: u32, best: u32) -> bool {
        match self {
            Objective::Flee => candidate > best,
            Objective::Chase => candidate < best,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Neighborhood {
    Four,
    Eight,
}

/// Per-entity move selection against a frozen distance field.
///
/// The policy never checks whether the chosen destination is an obstacle.
/// It only compares field values, and obstacle cells carry the sentinel,
/// so a fleeing population can pick one when nothing else scores higher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MovementPolicy {
    pub objective: Objective,
    pub neighborhood: Neighborhood,
}

impl MovementPolicy {
    /// Humans flee zombies and may move diagonally.
    pub const HUMAN: Self = Self {
        objective: Objective::Flee,
        neighborhood: Neighborhood::Eight,
    };

    /// Zombies chase humans orthogonally.
    pub const ZOMBIE: Self = Self {
        objective: Objective::Chase,
        neighborhood: Neighborhood::Four,
    };

    /// Moves open to an entity at `cell`, in tie-break order: neighbors as
    /// enumerated by the grid, then the cell itself.
    pub fn candidates(&self, grid: &Grid, cell: Cell) -> Candidates {
        let neighbors = match self.neighborhood {
            Neighborhood::Four => grid.four_neighbors(cell.row, cell.col),
            Neighborhood::Eight => grid.eight_neighbors(cell.row, cell.col),
        };
        let mut candidates: Candidates = neighbors.into_iter().collect();
        candidates.push(cell);
        candidates
    }

    /// Arg-extremum over `candidates`, first candidate wins ties.
    ///
    /// Returns `None` only for an empty candidate list.
    pub fn select(&self, candidates: &[Cell], field: &DistanceField) -> Option<Cell> {
        let (&first, rest) = candidates.split_first()?;
        let mut best = first;
        let mut best_value = field[first];
        for &candidate in rest {
            let value = field[candidate];
            if self.objective.improves(value, best_value) {
                best = candidate;
                best_value = value;
            }
        }
        Some(best)
    }

    /// Next position for one entity.
    pub fn next_cell(&self, grid: &Grid, cell: Cell, field: &DistanceField) -> Cell {
        // Candidates always contain `cell` itself, so select cannot miss.
        self.select(&self.candidates(grid, cell), field).unwrap_or(cell)
    }

    /// Next positions for a whole population, index for index.
    pub fn advance(&self, grid: &Grid, population: &[Cell], field: &DistanceField) -> Vec<Cell> {
        population
            .iter()
            .map(|&cell| self.next_cell(grid, cell, field))
            .collect()
    }
}
