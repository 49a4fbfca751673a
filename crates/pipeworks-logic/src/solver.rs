//! Connectivity solver: BFS from Start over mutually open arms.
//!
//! An edge between two neighbours exists only when both sides agree: the
//! current tile opens towards the neighbour and the neighbour opens back.

use std::collections::VecDeque;

use crate::grid::{Grid, GridPos};
use crate::tile::{Direction, PipeType};

/// Result of one connectivity pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connectivity {
    /// End was reached from Start.
    pub solved: bool,
    /// Every cell reached from Start, in BFS visit order (Start first).
    pub reached: Vec<GridPos>,
}

/// Whether `from` and its neighbour in `dir` are joined.
///
/// Symmetric: `can_connect(g, a, d)` equals `can_connect(g, b, d.opposite())`
/// where `b` is `a`'s neighbour in `d`.
pub fn can_connect(grid: &Grid, from: GridPos, dir: Direction) -> bool {
    let Some(to) = grid.neighbor(from, dir) else {
        return false;
    };
    let (Some(from_tile), Some(to_tile)) = (grid.tile(from), grid.tile(to)) else {
        return false;
    };
    if to_tile.pipe_type() == PipeType::Empty {
        return false;
    }
    from_tile.connects(dir) && to_tile.connects(dir.opposite())
}

/// Breadth-first reachability from Start for the grid's current rotations.
///
/// # Panics
///
/// If a visited tile's mask does not have its shape's arm count. That means
/// a tile was built without going through its mask table.
pub fn solve(grid: &Grid) -> Connectivity {
    let width = grid.width();
    let mut visited = vec![false; width * grid.height()];
    let mut reached = Vec::new();
    let mut queue = VecDeque::new();

    let start = grid.start();
    visited[start.y * width + start.x] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if let Some(tile) = grid.tile(current) {
            let open = tile.connections().iter().filter(|&&c| c).count();
            assert_eq!(
                open,
                tile.pipe_type().arm_count(),
                "malformed connection mask at {}: {:?} with {:?}",
                current,
                tile.pipe_type(),
                tile.connections()
            );
        }
        reached.push(current);

        for dir in Direction::ALL {
            let Some(next) = grid.neighbor(current, dir) else {
                continue;
            };
            let idx = next.y * width + next.x;
            if visited[idx] || !can_connect(grid, current, dir) {
                continue;
            }
            visited[idx] = true;
            queue.push_back(next);
        }
    }

    let end = grid.end();
    let solved = visited[end.y * width + end.x];
    log::debug!(
        "Connectivity pass: solved={}, reached={}",
        solved,
        reached.len()
    );

    Connectivity { solved, reached }
}

/// Set every tile's connected flag from a pass.
///
/// Marking is all-or-nothing: tiles are flagged only when End was reached,
/// so a partial route never lights up.
pub fn apply_marks(grid: &mut Grid, connectivity: &Connectivity) {
    for tile in grid.tiles_mut() {
        tile.set_connected(false);
    }
    if !connectivity.solved {
        return;
    }
    for &pos in &connectivity.reached {
        if let Some(tile) = grid.tile_mut(pos) {
            tile.set_connected(true);
        }
    }
}

/// Solve and mark in one step. Returns whether the board is solved.
pub fn check_solution(grid: &mut Grid) -> bool {
    let connectivity = solve(grid);
    apply_marks(grid, &connectivity);
    connectivity.solved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Rotation, Tile};

    fn grid(width: usize, height: usize, cells: &[(PipeType, Rotation)]) -> Grid {
        let tiles = cells.iter().map(|&(p, r)| Tile::new(p, r)).collect();
        Grid::from_tiles(width, height, tiles).unwrap()
    }

    use PipeType::*;
    use Rotation::*;

    #[test]
    fn trivial_pair_is_solved() {
        let mut g = grid(2, 1, &[(Start, R0), (End, R0)]);
        assert!(check_solution(&mut g));
        assert_eq!(g.connected_count(), 2);
    }

    #[test]
    fn straight_line() {
        let g = grid(4, 1, &[(Start, R0), (Straight, R0), (Straight, R180), (End, R0)]);
        let c = solve(&g);
        assert!(c.solved);
        assert_eq!(c.reached.len(), 4);
        assert_eq!(c.reached[0], g.start());
    }

    #[test]
    fn one_way_connection_does_not_count() {
        // Corner at R90 opens Left and Up; the End only opens Left, so the
        // corner's Left arm meets Start but nothing leads on to End.
        let g = grid(3, 1, &[(Start, R0), (Corner, R90), (End, R0)]);
        assert!(can_connect(&g, GridPos::new(0, 0), Direction::Right));
        assert!(!can_connect(&g, GridPos::new(1, 0), Direction::Right));
        assert!(!solve(&g).solved);
    }

    #[test]
    fn vertical_straight_blocks_horizontal_flow() {
        let g = grid(3, 1, &[(Start, R0), (Straight, R90), (End, R0)]);
        let c = solve(&g);
        assert!(!c.solved);
        assert_eq!(c.reached, vec![GridPos::new(0, 0)]);
    }

    #[test]
    fn empty_cells_are_never_entered() {
        let g = grid(3, 1, &[(Start, R0), (Empty, R0), (End, R0)]);
        assert!(!can_connect(&g, GridPos::new(0, 0), Direction::Right));
        assert!(!solve(&g).solved);
    }

    #[test]
    fn partial_route_leaves_every_flag_clear() {
        // Start → Cross → Cross reaches the middle row but End is cut off.
        let mut g = grid(
            4,
            1,
            &[(Start, R0), (Cross, R0), (Straight, R90), (End, R0)],
        );
        let c = solve(&g);
        assert!(!c.solved);
        assert_eq!(c.reached.len(), 2);
        apply_marks(&mut g, &c);
        assert_eq!(g.connected_count(), 0);
    }

    #[test]
    fn solved_board_marks_only_reached_tiles() {
        // Row 0: S ─ E ; row 1: a dangling straight that is not reached.
        let mut g = grid(
            3,
            2,
            &[
                (Start, R0),
                (Straight, R0),
                (End, R0),
                (Empty, R0),
                (Straight, R0),
                (Empty, R0),
            ],
        );
        assert!(check_solution(&mut g));
        assert_eq!(g.connected_count(), 3);
        assert!(!g.tile(GridPos::new(1, 1)).unwrap().is_connected());
    }

    #[test]
    fn branches_are_included_when_solved() {
        // Row 0: S ┬ E ; row 1: · │ ·; the T's Down arm feeds a vertical straight.
        let mut g = grid(
            3,
            2,
            &[
                (Start, R0),
                (TShape, R180),
                (End, R0),
                (Empty, R0),
                (Straight, R90),
                (Empty, R0),
            ],
        );
        assert!(check_solution(&mut g));
        assert_eq!(g.connected_count(), 4);
        assert!(g.tile(GridPos::new(1, 1)).unwrap().is_connected());
    }

    #[test]
    fn marks_clear_after_unsolving() {
        let mut g = grid(3, 1, &[(Start, R0), (Straight, R0), (End, R0)]);
        assert!(check_solution(&mut g));
        g.tile_mut(GridPos::new(1, 0)).unwrap().rotate_clockwise();
        assert!(!check_solution(&mut g));
        assert_eq!(g.connected_count(), 0);
    }

    #[test]
    fn repeated_solves_agree() {
        let g = grid(
            3,
            2,
            &[
                (Start, R0),
                (Corner, R0),
                (Empty, R0),
                (Empty, R0),
                (Corner, R180),
                (End, R0),
            ],
        );
        let first = solve(&g);
        for _ in 0..5 {
            assert_eq!(solve(&g), first);
        }
        assert!(first.solved);
    }
}
