use bevy::prelude::*;
use std::fmt;

use crate::game::distance_field::{DistanceField, FloodScratch};
use crate::game::grid::{Cell, Grid, GridError};
use crate::game::movement::MovementPolicy;

/// Selects one of the two populations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PopulationKind {
    Humans,
    Zombies,
}

/// What changed during one [`Outbreak::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Humans whose cell differs from the previous tick.
    pub humans_moved: usize,
    /// Zombies whose cell differs from the previous tick.
    pub zombies_moved: usize,
}

impl TickSummary {
    /// Nobody moved; further ticks will not change anything either.
    pub fn is_settled(&self) -> bool {
        self.humans_moved == 0 && self.zombies_moved == 0
    }
}

/// Zombies chasing humans on a grid with obstacles.
///
/// Owns the obstacle map and both populations. Each population is an ordered
/// list of cells; insertion order is kept and is the order used when moves
/// tie. Several entities may share a cell.
///
/// # Tick
///
/// [`tick`](Self::tick) moves everyone once, simultaneously: both distance
/// fields are computed from the positions at the start of the tick, both
/// policies read only those fields, and both populations are replaced at
/// the end.
///
/// The two fields are kept after the tick only so they can be inspected
/// through [`last_fields`](Self::last_fields). They are stale diagnostics
/// describing the positions before the last move and play no part in the
/// next tick, which recomputes both from scratch.
#[derive(Resource, Clone, Debug)]
pub struct Outbreak {
    grid: Grid,
    humans: Vec<Cell>,
    zombies: Vec<Cell>,
    scratch: FloodScratch,
    human_field: DistanceField,
    zombie_field: DistanceField,
}

impl Outbreak {
    /// An empty `height x width` world.
    pub fn new(height: usize, width: usize) -> Result<Self, GridError> {
        let grid = Grid::new(height, width)?;
        Ok(Self {
            scratch: FloodScratch::with_capacity(grid.area()),
            human_field: DistanceField::unreached(&grid),
            zombie_field: DistanceField::unreached(&grid),
            grid,
            humans: Vec::new(),
            zombies: Vec::new(),
        })
    }

    /// A world with initial obstacles and populations. Any out-of-bounds
    /// cell fails the whole construction.
    pub fn with_entities(
        height: usize,
        width: usize,
        obstacles: &[Cell],
        zombies: &[Cell],
        humans: &[Cell],
    ) -> Result<Self, GridError> {
        let mut outbreak = Self::new(height, width)?;
        for cell in obstacles {
            outbreak.set_obstacle(cell.row, cell.col)?;
        }
        for cell in zombies {
            outbreak.add_zombie(cell.row, cell.col)?;
        }
        for cell in humans {
            outbreak.add_human(cell.row, cell.col)?;
        }
        Ok(outbreak)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn set_obstacle(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        self.grid.set_full(row, col)
    }

    /// Empty the obstacle map and both populations. Dimensions are kept.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.humans.clear();
        self.zombies.clear();
    }

    pub fn add_zombie(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        let cell = self.grid.check(row, col)?;
        self.zombies.push(cell);
        Ok(())
    }

    pub fn add_human(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        let cell = self.grid.check(row, col)?;
        self.humans.push(cell);
        Ok(())
    }

    pub fn num_zombies(&self) -> usize {
        self.zombies.len()
    }

    pub fn num_humans(&self) -> usize {
        self.humans.len()
    }

    /// Zombies in insertion order.
    pub fn zombies(&self) -> impl ExactSizeIterator<Item = Cell> + '_ {
        self.zombies.iter().copied()
    }

    /// Humans in insertion order.
    pub fn humans(&self) -> impl ExactSizeIterator<Item = Cell> + '_ {
        self.humans.iter().copied()
    }

    pub fn population(&self, kind: PopulationKind) -> &[Cell] {
        match kind {
            PopulationKind::Humans => &self.humans,
            PopulationKind::Zombies => &self.zombies,
        }
    }

    /// Distance from every cell to the nearest member of `kind`.
    pub fn compute_distance_field(&self, kind: PopulationKind) -> DistanceField {
        let mut field = DistanceField::unreached(&self.grid);
        let mut scratch = FloodScratch::with_capacity(self.grid.area());
        field.flood(&self.grid, self.population(kind), &mut scratch);
        field
    }

    /// Advance both populations by one step.
    pub fn tick(&mut self) -> TickSummary {
        // Both fields come from the pre-tick snapshot.
        // Populations are bounds-checked on insert.
        self.zombie_field.flood(&self.grid, &self.zombies, &mut self.scratch);
        self.human_field.flood(&self.grid, &self.humans, &mut self.scratch);

        let next_humans = MovementPolicy::HUMAN.advance(&self.grid, &self.humans, &self.zombie_field);
        let next_zombies = MovementPolicy::ZOMBIE.advance(&self.grid, &self.zombies, &self.human_field);

        let summary = TickSummary {
            humans_moved: count_moved(&self.humans, &next_humans),
            zombies_moved: count_moved(&self.zombies, &next_zombies),
        };
        trace!(
            "Outbreak tick: {} humans moved, {} zombies moved",
            summary.humans_moved, summary.zombies_moved
        );

        self.humans = next_humans;
        self.zombies = next_zombies;
        summary
    }

    /// Fields used by the most recent [`tick`](Self::tick), humans then zombies.
    ///
    /// Diagnostics only: they describe pre-move positions and are not read
    /// by the next tick. Both are all-sentinel before the first tick.
    pub fn last_fields(&self) -> (&DistanceField, &DistanceField) {
        (&self.human_field, &self.zombie_field)
    }
}

fn count_moved(before: &[Cell], after: &[Cell]) -> usize {
    before.iter().zip(after).filter(|(b, a)| b != a).count()
}

impl fmt::Display for Outbreak {
    /// `#` obstacle, `Z` zombie, `H` human, `X` both, `.` empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.grid.width();
        let mut canvas: Vec<char> = self
            .grid
            .to_string()
            .chars()
            .filter(|c| *c != '\n')
            .collect();
        for cell in &self.humans {
            canvas[self.grid.index(*cell)] = 'H';
        }
        for cell in &self.zombies {
            let slot = &mut canvas[self.grid.index(*cell)];
            *slot = if *slot == 'H' || *slot == 'X' { 'X' } else { 'Z' };
        }
        for row in canvas.chunks(width) {
            writeln!(f, "{}", row.iter().collect::<String>())?;
        }
        write!(f, "Humans: {:?}\nZombies: {:?}", self.humans, self.zombies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_outbreak_is_empty() {
        let outbreak = Outbreak::new(4, 5).unwrap();
        assert_eq!(outbreak.num_humans(), 0);
        assert_eq!(outbreak.num_zombies(), 0);
        assert_eq!(outbreak.grid().area(), 20);
    }

    #[test]
    fn test_add_preserves_insertion_order_and_duplicates() {
        let mut outbreak = Outbreak::new(3, 3).unwrap();
        outbreak.add_human(2, 2).unwrap();
        outbreak.add_human(0, 1).unwrap();
        outbreak.add_human(2, 2).unwrap();
        outbreak.add_zombie(1, 1).unwrap();

        assert_eq!(
            outbreak.humans().collect::<Vec<_>>(),
            vec![Cell::new(2, 2), Cell::new(0, 1), Cell::new(2, 2)]
        );
        assert_eq!(outbreak.num_humans(), 3);
        // Iteration is restartable.
        assert_eq!(outbreak.humans().count(), 3);
        assert_eq!(outbreak.zombies().collect::<Vec<_>>(), vec![Cell::new(1, 1)]);
    }

    #[test]
    fn test_add_out_of_bounds_is_rejected() {
        let mut outbreak = Outbreak::new(2, 2).unwrap();
        assert!(matches!(outbreak.add_zombie(2, 0), Err(GridError::OutOfBounds { .. })));
        assert!(outbreak.add_human(0, 5).is_err());
        assert!(outbreak.set_obstacle(9, 9).is_err());
        assert_eq!(outbreak.num_zombies(), 0);
        assert_eq!(outbreak.num_humans(), 0);
    }

    #[test]
    fn test_with_entities_rejects_bad_cells() {
        let result = Outbreak::with_entities(2, 2, &[], &[Cell::new(0, 0)], &[Cell::new(3, 3)]);
        assert_eq!(
            result.err(),
            Some(GridError::OutOfBounds { row: 3, col: 3, height: 2, width: 2 })
        );
    }

    #[test]
    fn test_clear_resets_everything_but_dimensions() {
        let mut outbreak = Outbreak::with_entities(
            3,
            4,
            &[Cell::new(1, 1)],
            &[Cell::new(0, 0)],
            &[Cell::new(2, 3)],
        )
        .unwrap();
        outbreak.clear();
        assert_eq!(outbreak.num_humans(), 0);
        assert_eq!(outbreak.num_zombies(), 0);
        assert_eq!(outbreak.grid().obstacles().count(), 0);
        assert_eq!((outbreak.grid().height(), outbreak.grid().width()), (3, 4));
    }

    #[test]
    fn test_compute_distance_field_by_kind() {
        let outbreak =
            Outbreak::with_entities(1, 4, &[], &[Cell::new(0, 0)], &[Cell::new(0, 3)]).unwrap();
        assert_eq!(outbreak.compute_distance_field(PopulationKind::Zombies).values(), &[0, 1, 2, 3]);
        assert_eq!(outbreak.compute_distance_field(PopulationKind::Humans).values(), &[3, 2, 1, 0]);
    }

    #[test]
    fn test_tick_moves_both_populations_simultaneously() {
        // 1x5 strip: zombie left, human right of centre.
        let mut outbreak =
            Outbreak::with_entities(1, 5, &[], &[Cell::new(0, 0)], &[Cell::new(0, 3)]).unwrap();
        let summary = outbreak.tick();

        // The human flees to the far end, the zombie steps toward where the
        // human was (not where it ends up).
        assert_eq!(outbreak.humans().collect::<Vec<_>>(), vec![Cell::new(0, 4)]);
        assert_eq!(outbreak.zombies().collect::<Vec<_>>(), vec![Cell::new(0, 1)]);
        assert_eq!(summary, TickSummary { humans_moved: 1, zombies_moved: 1 });
    }

    #[test]
    fn test_last_fields_reflect_pre_tick_positions() {
        let mut outbreak =
            Outbreak::with_entities(1, 5, &[], &[Cell::new(0, 0)], &[Cell::new(0, 3)]).unwrap();
        outbreak.tick();
        let (human_field, zombie_field) = outbreak.last_fields();
        assert_eq!(human_field[Cell::new(0, 3)], 0);
        assert_eq!(zombie_field[Cell::new(0, 0)], 0);

        // Stale: the human now stands on (0, 4), which the kept field does
        // not treat as a source.
        assert_eq!(outbreak.humans().next(), Some(Cell::new(0, 4)));
        assert_eq!(human_field[Cell::new(0, 4)], 1);
        assert_ne!(human_field, &outbreak.compute_distance_field(PopulationKind::Humans));
    }

    #[test]
    fn test_tick_with_no_entities_is_settled() {
        let mut outbreak = Outbreak::new(3, 3).unwrap();
        assert!(outbreak.tick().is_settled());
    }

    #[test]
    fn test_display_overlays_entities() {
        let outbreak = Outbreak::with_entities(
            2,
            3,
            &[Cell::new(0, 1)],
            &[Cell::new(1, 0), Cell::new(1, 2)],
            &[Cell::new(0, 0), Cell::new(1, 2)],
        )
        .unwrap();
        let rendered = outbreak.to_string();
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("H#."));
        assert_eq!(lines.next(), Some("Z.X"));
    }
}
