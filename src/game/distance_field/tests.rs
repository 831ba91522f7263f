/// Tests for the multi-source flood fill.
///
/// Grids are small and hand-built so expected distances can be read off the
/// layout directly.

use super::*;

/// Build a grid from rows of `.` (empty) and `#` (obstacle).
fn grid_from(rows: &[&str]) -> Grid {
    let mut grid = Grid::new(rows.len(), rows[0].len()).unwrap();
    for (row, line) in rows.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            if ch == '#' {
                grid.set_full(row, col).unwrap();
            }
        }
    }
    grid
}

#[test]
fn test_single_source_on_open_grid_is_manhattan() {
    let grid = Grid::new(3, 3).unwrap();
    let field = DistanceField::compute(&grid, &[Cell::new(0, 0)]).unwrap();

    assert_eq!(field.to_rows(), vec![vec![0, 1, 2], vec![1, 2, 3], vec![2, 3, 4]]);
    assert_eq!(field.sentinel(), 9);
    assert_eq!(field[Cell::new(2, 2)], 4);
}

#[test]
fn test_nearest_of_several_sources_wins() {
    let grid = Grid::new(1, 7).unwrap();
    let field = DistanceField::compute(&grid, &[Cell::new(0, 0), Cell::new(0, 6)]).unwrap();
    assert_eq!(field.values(), &[0, 1, 2, 3, 2, 1, 0]);
}

#[test]
fn test_duplicate_sources_are_harmless() {
    let grid = Grid::new(2, 2).unwrap();
    let once = DistanceField::compute(&grid, &[Cell::new(1, 1)]).unwrap();
    let thrice = DistanceField::compute(&grid, &[Cell::new(1, 1), Cell::new(1, 1), Cell::new(1, 1)]).unwrap();
    assert_eq!(once, thrice);
}

#[test]
fn test_empty_sources_yield_all_sentinel() {
    let grid = grid_from(&["..#", "...", "#.."]);
    let field = DistanceField::compute(&grid, &[]).unwrap();
    assert!(field.values().iter().all(|&v| v == field.sentinel()));
    assert_eq!(field.max_reachable(), None);
}

#[test]
fn test_obstacles_hold_sentinel_and_force_detours() {
    // Source top-left, wall forces the path around the right side.
    let grid = grid_from(&[
        "....",
        "###.",
        "....",
    ]);
    let field = DistanceField::compute(&grid, &[Cell::new(0, 0)]).unwrap();

    assert_eq!(field.to_rows(), vec![
        vec![0, 1, 2, 3],
        vec![12, 12, 12, 4],
        vec![8, 7, 6, 5],
    ]);
    assert!(!field.is_reachable(Cell::new(1, 0)));
    assert_eq!(field.max_reachable(), Some(8));
}

#[test]
fn test_full_row_wall_splits_regions() {
    let grid = grid_from(&[
        "....",
        "....",
        "####",
        "....",
        "....",
    ]);
    let field = DistanceField::compute(&grid, &[Cell::new(0, 1), Cell::new(1, 3)]).unwrap();

    let sentinel = field.sentinel();
    assert_eq!(sentinel, 20);
    for row in 2..5 {
        for col in 0..4 {
            assert_eq!(field.get(row, col), Some(sentinel), "({row}, {col}) should be unreachable");
        }
    }
    for row in 0..2 {
        for col in 0..4 {
            assert!(field.get(row, col).unwrap() < sentinel);
        }
    }
}

#[test]
fn test_enclosed_pocket_is_unreachable() {
    let grid = grid_from(&[
        ".....",
        ".###.",
        ".#.#.",
        ".###.",
        ".....",
    ]);
    let field = DistanceField::compute(&grid, &[Cell::new(0, 0)]).unwrap();
    assert_eq!(field[Cell::new(2, 2)], field.sentinel());
    assert_eq!(field[Cell::new(4, 4)], 8);
}

#[test]
fn test_source_inside_pocket_only_fills_pocket() {
    let grid = grid_from(&[
        ".....",
        ".###.",
        ".#.#.",
        ".###.",
        ".....",
    ]);
    let field = DistanceField::compute(&grid, &[Cell::new(2, 2)]).unwrap();
    assert_eq!(field[Cell::new(2, 2)], 0);
    assert_eq!(field.max_reachable(), Some(0));
    assert_eq!(field.values().iter().filter(|&&v| v != field.sentinel()).count(), 1);
}

#[test]
fn test_flood_never_moves_diagonally() {
    // The only opening is a diagonal gap, which 4-connected BFS cannot use.
    let grid = grid_from(&[
        ".#",
        "#.",
    ]);
    let field = DistanceField::compute(&grid, &[Cell::new(0, 0)]).unwrap();
    assert_eq!(field[Cell::new(1, 1)], field.sentinel());
}

#[test]
fn test_recompute_matches_fresh_compute_and_is_idempotent() {
    let grid = grid_from(&[
        "..#..",
        "..#..",
        ".....",
    ]);
    let sources = [Cell::new(0, 0), Cell::new(0, 4)];
    let fresh = DistanceField::compute(&grid, &sources).unwrap();

    let mut reused = DistanceField::unreached(&grid);
    let mut scratch = FloodScratch::default();
    reused.recompute(&grid, &sources, &mut scratch).unwrap();
    assert_eq!(reused, fresh);

    reused.recompute(&grid, &sources, &mut scratch).unwrap();
    assert_eq!(reused, fresh, "second pass over the same inputs must not change anything");
}

#[test]
fn test_recompute_adapts_to_new_grid_size() {
    let small = Grid::new(2, 2).unwrap();
    let large = Grid::new(3, 5).unwrap();
    let mut scratch = FloodScratch::default();

    let mut field = DistanceField::compute(&small, &[Cell::new(0, 0)]).unwrap();
    field.recompute(&large, &[Cell::new(2, 4)], &mut scratch).unwrap();

    assert_eq!((field.height(), field.width()), (3, 5));
    assert_eq!(field.sentinel(), 15);
    assert_eq!(field, DistanceField::compute(&large, &[Cell::new(2, 4)]).unwrap());
}

#[test]
fn test_get_out_of_bounds_is_none() {
    let grid = Grid::new(2, 3).unwrap();
    let field = DistanceField::compute(&grid, &[Cell::new(0, 0)]).unwrap();
    assert_eq!(field.get(2, 0), None);
    assert_eq!(field.get(0, 3), None);
    assert_eq!(field.get(1, 2), Some(3));
}

#[test]
fn test_display_marks_unreachable() {
    let grid = grid_from(&["..#"]);
    let field = DistanceField::compute(&grid, &[Cell::new(0, 0)]).unwrap();
    assert_eq!(field.to_string(), "0 1 -\n");
}

#[test]
fn test_out_of_bounds_source_is_rejected() {
    let grid = Grid::new(3, 3).unwrap();
    // (0, 5) would land on (1, 2) if it were indexed row-major.
    assert_eq!(
        DistanceField::compute(&grid, &[Cell::new(0, 0), Cell::new(0, 5)]),
        Err(GridError::OutOfBounds { row: 0, col: 5, height: 3, width: 3 })
    );
}

#[test]
fn test_failed_recompute_keeps_previous_values() {
    let grid = Grid::new(1, 4).unwrap();
    let mut scratch = FloodScratch::default();
    let mut field = DistanceField::compute(&grid, &[Cell::new(0, 0)]).unwrap();

    assert!(field.recompute(&grid, &[Cell::new(0, 3), Cell::new(1, 0)], &mut scratch).is_err());
    assert_eq!(field.values(), &[0, 1, 2, 3]);
}

#[test]
#[should_panic(expected = "outside the 3x3 distance field")]
fn test_index_out_of_bounds_panics_instead_of_wrapping() {
    let grid = Grid::new(3, 3).unwrap();
    let field = DistanceField::compute(&grid, &[Cell::new(0, 0)]).unwrap();
    let _ = field[Cell::new(0, 5)];
}
