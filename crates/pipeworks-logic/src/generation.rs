//! Level generation: solution path, path shapes, and grid population.
//!
//! # Pipeline
//!
//! 1. [`place_endpoints`] picks the Start row (column 0) and End row (last column).
//! 2. [`solution_path`] routes a 4-connected path between them with A*.
//! 3. [`derive_path_tiles`] assigns a Straight or Corner and its connecting rotation to each interior cell.
//! 4. [`populate`] scrambles path rotations and fills every other cell with decoys.
//!
//! Start only opens Right and End only opens Left, so the route runs from
//! the cell right of Start to the cell left of End and the endpoints are
//! joined on afterwards.
//!
//! All randomness comes from the caller's RNG, consumed in a fixed order:
//! Start row, End row, then one draw sequence per cell in row-major order.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::PuzzleConfig;
use crate::grid::{Grid, GridPos};
use crate::tile::{connection_mask, rotation_for_mask, PipeType, Rotation, Tile};

/// Start and End cells for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub start: GridPos,
    pub end: GridPos,
}

/// Shape and connecting orientation for one interior path cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTile {
    pub position: GridPos,
    pub pipe_type: PipeType,
    /// Rotation that joins the previous and next path cells.
    pub correct_rotation: Rotation,
}

/// A populated grid plus the skeleton it was built from.
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub grid: Grid,
    pub path: Vec<GridPos>,
    pub path_tiles: Vec<PathTile>,
}

// ============================================================================
// ENDPOINTS
// ============================================================================

/// Pick the Start row in column 0 and the End row in the last column.
///
/// Rows avoid the top and bottom border when the board has at least three
/// rows. A two-column board has nowhere to turn, so End shares Start's row.
pub fn place_endpoints(width: usize, height: usize, rng: &mut impl Rng) -> Endpoints {
    let start_row = pick_row(height, rng);
    let mut end_row = pick_row(height, rng);
    if width == 2 {
        end_row = start_row;
    }
    Endpoints {
        start: GridPos::new(0, start_row),
        end: GridPos::new(width - 1, end_row),
    }
}

fn pick_row(height: usize, rng: &mut impl Rng) -> usize {
    if height >= 3 {
        rng.gen_range(1..height - 1)
    } else {
        rng.gen_range(0..height)
    }
}

// ============================================================================
// PATHFINDING
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct FScore(f32);

impl PartialEq for FScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FScore {}

impl PartialOrd for FScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A* over 4-connected cells with unit cost and a Euclidean heuristic.
///
/// Cells for which `is_open` returns false are never entered. Ties on f-score
/// go to the entry pushed first, so results are stable for a given board.
pub fn find_path(
    width: usize,
    height: usize,
    from: GridPos,
    to: GridPos,
    is_open: impl Fn(GridPos) -> bool,
) -> Option<Vec<GridPos>> {
    use crate::tile::Direction::{Down, Left, Right, Up};

    if from.x >= width || from.y >= height || to.x >= width || to.y >= height {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }

    let mut frontier = BinaryHeap::new();
    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut cost_so_far: HashMap<GridPos, u32> = HashMap::new();
    let mut seq: u32 = 0;

    frontier.push(Reverse((FScore(from.euclidean(to)), seq, from)));
    cost_so_far.insert(from, 0);

    while let Some(Reverse((FScore(f), _, current))) = frontier.pop() {
        if current == to {
            let mut path = vec![current];
            let mut node = current;
            while let Some(&prev) = came_from.get(&node) {
                path.push(prev);
                node = prev;
            }
            path.reverse();
            return Some(path);
        }

        let g = cost_so_far[&current];
        // Stale heap entry: a cheaper route to `current` was found after this push.
        if f > g as f32 + current.euclidean(to) {
            continue;
        }

        for dir in [Up, Down, Left, Right] {
            let Some(next) = current.step(dir, width, height) else {
                continue;
            };
            if !is_open(next) {
                continue;
            }
            let new_cost = g + 1;
            if cost_so_far.get(&next).map_or(true, |&c| new_cost < c) {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, current);
                seq += 1;
                frontier.push(Reverse((
                    FScore(new_cost as f32 + next.euclidean(to)),
                    seq,
                    next,
                )));
            }
        }
    }

    None
}

/// L-shaped walk: along the row to `to`'s column, then along that column.
pub fn direct_path(from: GridPos, to: GridPos) -> Vec<GridPos> {
    let mut path = vec![from];
    let mut current = from;

    while current.x != to.x {
        current.x = if to.x > current.x { current.x + 1 } else { current.x - 1 };
        path.push(current);
    }
    while current.y != to.y {
        current.y = if to.y > current.y { current.y + 1 } else { current.y - 1 };
        path.push(current);
    }

    path
}

/// Full Start-to-End path. Always succeeds.
///
/// The route runs from the cell right of Start to the cell left of End,
/// avoiding both endpoints. If A* finds nothing, the inner route falls back
/// to [`direct_path`].
pub fn solution_path(width: usize, height: usize, endpoints: Endpoints) -> Vec<GridPos> {
    let Endpoints { start, end } = endpoints;

    if end.x <= start.x + 1 {
        return vec![start, end];
    }

    let entry = GridPos::new(start.x + 1, start.y);
    let exit = GridPos::new(end.x - 1, end.y);

    let route = find_path(width, height, entry, exit, |p| p != start && p != end)
        .unwrap_or_else(|| {
            log::warn!(
                "No route from {} to {}; using direct path",
                entry,
                exit
            );
            direct_path(entry, exit)
        });

    let mut path = Vec::with_capacity(route.len() + 2);
    path.push(start);
    path.extend(route);
    path.push(end);

    log::debug!("Solution path generated: {} tiles", path.len());
    path
}

// ============================================================================
// PATH SHAPES
// ============================================================================

/// Shape and connecting rotation for every interior path cell.
///
/// A cell whose neighbours on the path sit on opposite sides is a Straight,
/// otherwise a Corner. The rotation is the first one whose mask opens exactly
/// towards both neighbours.
pub fn derive_path_tiles(path: &[GridPos]) -> Vec<PathTile> {
    path.windows(3)
        .filter_map(|w| {
            let (prev, cell, next) = (w[0], w[1], w[2]);
            let to_prev = cell.direction_to(prev)?;
            let to_next = cell.direction_to(next)?;

            let mut wanted = [false; 4];
            wanted[to_prev.index()] = true;
            wanted[to_next.index()] = true;

            let pipe_type = if to_prev.opposite() == to_next {
                PipeType::Straight
            } else {
                PipeType::Corner
            };
            let correct_rotation = rotation_for_mask(pipe_type, wanted)?;
            debug_assert_eq!(connection_mask(pipe_type, correct_rotation), wanted);

            Some(PathTile {
                position: cell,
                pipe_type,
                correct_rotation,
            })
        })
        .collect()
}

// ============================================================================
// POPULATION
// ============================================================================

/// Fill a board around the path skeleton.
///
/// Path cells get their shape with the connecting rotation advanced by 1–3
/// quarter turns. Other cells are empty with probability `empty_chance`,
/// otherwise a uniformly random filler shape at a uniformly random rotation.
pub fn populate(
    width: usize,
    height: usize,
    endpoints: Endpoints,
    path_tiles: &[PathTile],
    empty_chance: f32,
    rng: &mut impl Rng,
) -> Grid {
    let on_path: HashMap<GridPos, &PathTile> =
        path_tiles.iter().map(|t| (t.position, t)).collect();
    let mut grid = Grid::with_endpoints(width, height, endpoints.start, endpoints.end);

    for y in 0..height {
        for x in 0..width {
            let pos = GridPos::new(x, y);
            if pos == endpoints.start || pos == endpoints.end {
                continue;
            }
            let tile = match on_path.get(&pos) {
                Some(path_tile) => {
                    let scramble = rng.gen_range(1..=3u8);
                    Tile::new(
                        path_tile.pipe_type,
                        path_tile.correct_rotation.turned(scramble),
                    )
                }
                None => random_filler(empty_chance, rng),
            };
            grid.place(pos, tile);
        }
    }

    grid
}

/// A decoy tile for a non-path cell.
pub fn random_filler(empty_chance: f32, rng: &mut impl Rng) -> Tile {
    if rng.gen::<f32>() < empty_chance {
        return Tile::empty();
    }
    let pipe_type = *PipeType::FILLERS
        .choose(rng)
        .unwrap_or(&PipeType::Straight);
    Tile::new(pipe_type, random_rotation(rng))
}

pub fn random_rotation(rng: &mut impl Rng) -> Rotation {
    Rotation::from_quarter_turns(rng.gen_range(0..4u8))
}

/// Run the whole pipeline for a validated config.
pub fn generate(config: &PuzzleConfig, rng: &mut impl Rng) -> GeneratedLevel {
    let endpoints = place_endpoints(config.width, config.height, rng);
    let path = solution_path(config.width, config.height, endpoints);
    let path_tiles = derive_path_tiles(&path);
    let grid = populate(
        config.width,
        config.height,
        endpoints,
        &path_tiles,
        config.empty_chance,
        rng,
    );
    GeneratedLevel {
        grid,
        path,
        path_tiles,
    }
}
