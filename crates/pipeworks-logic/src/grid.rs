//! The puzzle board: a row-major grid of tiles with one Start and one End.
//!
//! Also defines the read-only snapshot types handed to the UI collaborator.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;
use crate::tile::{Direction, PipeType, Rotation, Tile};

/// Cell coordinate. `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Neighbor in `dir`, or `None` if it falls outside a `width × height` board.
    pub fn step(self, dir: Direction, width: usize, height: usize) -> Option<GridPos> {
        let (dx, dy) = dir.offset();
        let nx = self.x as i64 + dx as i64;
        let ny = self.y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
            return None;
        }
        Some(GridPos::new(nx as usize, ny as usize))
    }

    /// Direction from `self` to an orthogonally adjacent `other`.
    pub fn direction_to(self, other: GridPos) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| {
            let (dx, dy) = d.offset();
            self.x as i64 + dx as i64 == other.x as i64
                && self.y as i64 + dy as i64 == other.y as i64
        })
    }

    pub fn euclidean(self, other: GridPos) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// What the UI needs to draw one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileVisual {
    pub position: GridPos,
    pub pipe_type: PipeType,
    pub rotation: Rotation,
    pub is_connected: bool,
    pub locked: bool,
}

/// Full board layout for rendering. Tiles are row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: usize,
    pub height: usize,
    pub start: GridPos,
    pub end: GridPos,
    pub tiles: Vec<TileVisual>,
}

impl GridSnapshot {
    pub fn tile(&self, x: usize, y: usize) -> Option<&TileVisual> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get(y * self.width + x)
    }
}

/// Puzzle board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    start: GridPos,
    end: GridPos,
}

impl Grid {
    /// Empty board with Start and End placed. Callers must pass in-bounds,
    /// distinct endpoints.
    pub(crate) fn with_endpoints(width: usize, height: usize, start: GridPos, end: GridPos) -> Self {
        let mut tiles = vec![Tile::empty(); width * height];
        tiles[start.y * width + start.x] = Tile::new(PipeType::Start, Rotation::R0);
        tiles[end.y * width + end.x] = Tile::new(PipeType::End, Rotation::R0);
        Self {
            width,
            height,
            tiles,
            start,
            end,
        }
    }

    /// Build a board from row-major tiles. Exactly one Start and one End are
    /// required.
    pub fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Result<Self, PuzzleError> {
        if tiles.len() != width * height || tiles.is_empty() {
            return Err(PuzzleError::TileCountMismatch {
                expected: width * height,
                found: tiles.len(),
            });
        }

        let find = |kind: PipeType| -> Result<GridPos, PuzzleError> {
            let mut found = tiles
                .iter()
                .enumerate()
                .filter(|(_, t)| t.pipe_type() == kind)
                .map(|(i, _)| GridPos::new(i % width, i / width));
            let first = found.next().ok_or(PuzzleError::MissingEndpoint(kind))?;
            if found.next().is_some() {
                return Err(PuzzleError::DuplicateEndpoint(kind));
            }
            Ok(first)
        };
        let start = find(PipeType::Start)?;
        let end = find(PipeType::End)?;

        Ok(Self {
            width,
            height,
            tiles,
            start,
            end,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> GridPos {
        self.start
    }

    pub fn end(&self) -> GridPos {
        self.end
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos).then(|| pos.y * self.width + pos.x)
    }

    pub fn tile(&self, pos: GridPos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    pub(crate) fn tile_mut(&mut self, pos: GridPos) -> Option<&mut Tile> {
        self.index(pos).map(move |i| &mut self.tiles[i])
    }

    /// Replace a non-endpoint cell. Endpoint cells are left untouched.
    pub(crate) fn place(&mut self, pos: GridPos, tile: Tile) {
        if pos == self.start || pos == self.end {
            return;
        }
        if let Some(slot) = self.tile_mut(pos) {
            *slot = tile;
        }
    }

    pub fn neighbor(&self, pos: GridPos, dir: Direction) -> Option<GridPos> {
        pos.step(dir, self.width, self.height)
    }

    /// Row-major `(position, tile)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &Tile)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, t)| (GridPos::new(i % width, i / width), t))
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> + '_ {
        self.tiles.iter_mut()
    }

    pub fn tile_visual(&self, pos: GridPos) -> Option<TileVisual> {
        self.tile(pos).map(|t| TileVisual {
            position: pos,
            pipe_type: t.pipe_type(),
            rotation: t.rotation(),
            is_connected: t.is_connected(),
            locked: t.is_locked(),
        })
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width,
            height: self.height,
            start: self.start,
            end: self.end,
            tiles: self
                .iter()
                .map(|(pos, t)| TileVisual {
                    position: pos,
                    pipe_type: t.pipe_type(),
                    rotation: t.rotation(),
                    is_connected: t.is_connected(),
                    locked: t.is_locked(),
                })
                .collect(),
        }
    }

    /// Number of tiles currently marked as part of the solved route.
    pub fn connected_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_connected()).count()
    }
}

fn glyph(tile: &Tile) -> char {
    match tile.pipe_type() {
        PipeType::Empty => '·',
        PipeType::Start => 'S',
        PipeType::End => 'E',
        _ => {
            let bits = tile
                .connections()
                .iter()
                .enumerate()
                .fold(0usize, |acc, (i, &open)| acc | ((open as usize) << i));
            // Bit order: Up=1, Right=2, Down=4, Left=8.
            const GLYPHS: [char; 16] = [
                ' ', '╵', '╶', '└', '╷', '│', '┌', '├', '╴', '┘', '─', '┴', '┐', '┤', '┬', '┼',
            ];
            GLYPHS[bits]
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let tile = &self.tiles[y * self.width + x];
                write!(f, "{}", glyph(tile))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tiles: &[(PipeType, Rotation)]) -> Vec<Tile> {
        tiles.iter().map(|&(p, r)| Tile::new(p, r)).collect()
    }

    #[test]
    fn step_respects_bounds() {
        let p = GridPos::new(0, 0);
        assert_eq!(p.step(Direction::Up, 3, 3), None);
        assert_eq!(p.step(Direction::Left, 3, 3), None);
        assert_eq!(p.step(Direction::Right, 3, 3), Some(GridPos::new(1, 0)));
        assert_eq!(p.step(Direction::Down, 3, 3), Some(GridPos::new(0, 1)));
        assert_eq!(GridPos::new(2, 2).step(Direction::Right, 3, 3), None);
    }

    #[test]
    fn direction_to_adjacent_only() {
        let a = GridPos::new(1, 1);
        assert_eq!(a.direction_to(GridPos::new(1, 0)), Some(Direction::Up));
        assert_eq!(a.direction_to(GridPos::new(2, 1)), Some(Direction::Right));
        assert_eq!(a.direction_to(GridPos::new(2, 2)), None);
        assert_eq!(a.direction_to(a), None);
    }

    #[test]
    fn from_tiles_finds_endpoints() {
        let tiles = row(&[
            (PipeType::Start, Rotation::R0),
            (PipeType::Straight, Rotation::R0),
            (PipeType::End, Rotation::R0),
        ]);
        let grid = Grid::from_tiles(3, 1, tiles).unwrap();
        assert_eq!(grid.start(), GridPos::new(0, 0));
        assert_eq!(grid.end(), GridPos::new(2, 0));
    }

    #[test]
    fn from_tiles_rejects_bad_layouts() {
        let no_end = row(&[
            (PipeType::Start, Rotation::R0),
            (PipeType::Empty, Rotation::R0),
        ]);
        assert!(matches!(
            Grid::from_tiles(2, 1, no_end),
            Err(PuzzleError::MissingEndpoint(PipeType::End))
        ));

        let two_starts = row(&[
            (PipeType::Start, Rotation::R0),
            (PipeType::Start, Rotation::R0),
            (PipeType::End, Rotation::R0),
        ]);
        assert!(matches!(
            Grid::from_tiles(3, 1, two_starts),
            Err(PuzzleError::DuplicateEndpoint(PipeType::Start))
        ));

        assert!(matches!(
            Grid::from_tiles(2, 2, Vec::new()),
            Err(PuzzleError::TileCountMismatch { expected: 4, found: 0 })
        ));
    }

    #[test]
    fn place_never_overwrites_endpoints() {
        let mut grid = Grid::with_endpoints(3, 1, GridPos::new(0, 0), GridPos::new(2, 0));
        grid.place(GridPos::new(0, 0), Tile::new(PipeType::Cross, Rotation::R0));
        grid.place(GridPos::new(1, 0), Tile::new(PipeType::Cross, Rotation::R0));
        assert_eq!(grid.tile(GridPos::new(0, 0)).unwrap().pipe_type(), PipeType::Start);
        assert_eq!(grid.tile(GridPos::new(1, 0)).unwrap().pipe_type(), PipeType::Cross);
    }

    #[test]
    fn snapshot_is_row_major() {
        let grid = Grid::with_endpoints(3, 2, GridPos::new(0, 1), GridPos::new(2, 0));
        let snap = grid.snapshot();
        assert_eq!(snap.tiles.len(), 6);
        assert_eq!(snap.tile(0, 1).unwrap().pipe_type, PipeType::Start);
        assert_eq!(snap.tile(2, 0).unwrap().pipe_type, PipeType::End);
        assert_eq!(snap.tile(3, 0), None);
    }

    #[test]
    fn display_draws_masks() {
        let tiles = row(&[
            (PipeType::Start, Rotation::R0),
            (PipeType::Straight, Rotation::R0),
            (PipeType::Corner, Rotation::R0),
            (PipeType::Empty, Rotation::R0),
            (PipeType::End, Rotation::R0),
        ]);
        let grid = Grid::from_tiles(5, 1, tiles).unwrap();
        assert_eq!(grid.to_string(), "S─┐·E\n");
    }
}
