//! Pipe tiles: shape, orientation, and the directional connection mask.
//!
//! A tile's mask is a pure function of `(PipeType, Rotation)`. It is stored
//! alongside the tile so the solver can read it without recomputation, and it
//! is refreshed by every operation that changes either input.

use serde::{Deserialize, Serialize};

// ============================================================================
// DIRECTIONS
// ============================================================================

/// Cardinal direction out of a cell. `Up` is the row above (`y - 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    /// Mask order: Up, Right, Down, Left.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 2) % 4]
    }

    /// `(dx, dy)` step for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }
}

// ============================================================================
// ROTATION
// ============================================================================

/// Clockwise rotation of a tile, restricted to the four cardinal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Normalise arbitrary degrees into `[0, 360)` and snap to the nearest
    /// cardinal value. 44° snaps to 0°, 45° to 90°, -90° to 270°.
    pub fn from_degrees(degrees: i32) -> Self {
        let normalized = degrees.rem_euclid(360);
        Self::from_quarter_turns(((normalized + 45) / 90) as u8)
    }

    /// Quarter turns are taken modulo 4.
    pub fn from_quarter_turns(turns: u8) -> Self {
        Self::ALL[(turns % 4) as usize]
    }

    pub fn quarter_turns(self) -> u8 {
        match self {
            Self::R0 => 0,
            Self::R90 => 1,
            Self::R180 => 2,
            Self::R270 => 3,
        }
    }

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    pub fn clockwise(self) -> Self {
        self.turned(1)
    }

    pub fn turned(self, quarter_turns: u8) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + quarter_turns % 4)
    }

    /// Clockwise quarter turns needed to get from `self` to `target` (0..=3).
    pub fn turns_to(self, target: Rotation) -> u8 {
        (target.quarter_turns() + 4 - self.quarter_turns()) % 4
    }
}

// ============================================================================
// PIPE TYPES
// ============================================================================

/// Pipe shape. Orientation lives in [`Rotation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PipeType {
    Empty = 0,
    Straight = 1,
    Corner = 2,
    TShape = 3,
    Cross = 4,
    Start = 5,
    End = 6,
}

impl PipeType {
    /// Shapes the populator may place on non-path cells.
    pub const FILLERS: [PipeType; 4] = [
        PipeType::Straight,
        PipeType::Corner,
        PipeType::TShape,
        PipeType::Cross,
    ];

    /// Number of open arms, independent of rotation.
    pub fn arm_count(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Start | Self::End => 1,
            Self::Straight | Self::Corner => 2,
            Self::TShape => 3,
            Self::Cross => 4,
        }
    }

    /// Start and End are pinned in place for the whole level.
    pub fn is_fixed(self) -> bool {
        matches!(self, Self::Start | Self::End)
    }

    /// Whether the player may ever rotate this shape.
    pub fn is_rotatable(self) -> bool {
        !matches!(self, Self::Empty | Self::Start | Self::End)
    }

    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(Self::Empty),
            1 => Some(Self::Straight),
            2 => Some(Self::Corner),
            3 => Some(Self::TShape),
            4 => Some(Self::Cross),
            5 => Some(Self::Start),
            6 => Some(Self::End),
            _ => None,
        }
    }
}

// ============================================================================
// CONNECTION MASKS
// ============================================================================

/// Open arms in `[Up, Right, Down, Left]` order.
pub type ConnectionMask = [bool; 4];

const U: usize = 0;
const R: usize = 1;
const D: usize = 2;
const L: usize = 3;

const fn mask(dirs: &[usize]) -> ConnectionMask {
    let mut m = [false; 4];
    let mut i = 0;
    while i < dirs.len() {
        m[dirs[i]] = true;
        i += 1;
    }
    m
}

const STRAIGHT_MASKS: [ConnectionMask; 4] = [
    mask(&[R, L]),
    mask(&[U, D]),
    mask(&[R, L]),
    mask(&[U, D]),
];

// ┐ ┘ └ ┌
const CORNER_MASKS: [ConnectionMask; 4] = [
    mask(&[D, L]),
    mask(&[L, U]),
    mask(&[U, R]),
    mask(&[R, D]),
];

// ┴ ├ ┬ ┤
const TSHAPE_MASKS: [ConnectionMask; 4] = [
    mask(&[U, R, L]),
    mask(&[U, R, D]),
    mask(&[R, D, L]),
    mask(&[U, D, L]),
];

/// Connection mask for a shape at a given rotation.
pub fn connection_mask(pipe_type: PipeType, rotation: Rotation) -> ConnectionMask {
    let r = rotation.quarter_turns() as usize;
    match pipe_type {
        PipeType::Empty => [false; 4],
        PipeType::Straight => STRAIGHT_MASKS[r],
        PipeType::Corner => CORNER_MASKS[r],
        PipeType::TShape => TSHAPE_MASKS[r],
        PipeType::Cross => [true; 4],
        PipeType::Start => mask(&[R]),
        PipeType::End => mask(&[L]),
    }
}

/// First rotation (in R0..R270 order) whose mask is exactly `wanted`.
pub fn rotation_for_mask(pipe_type: PipeType, wanted: ConnectionMask) -> Option<Rotation> {
    Rotation::ALL
        .into_iter()
        .find(|&r| connection_mask(pipe_type, r) == wanted)
}

// ============================================================================
// TILE
// ============================================================================

/// One grid cell's logical pipe state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pipe_type: PipeType,
    rotation: Rotation,
    connections: ConnectionMask,
    is_connected: bool,
    locked: bool,
}

impl Tile {
    /// Build a tile from raw degrees; see [`Rotation::from_degrees`].
    pub fn create(pipe_type: PipeType, degrees: i32) -> Self {
        Self::new(pipe_type, Rotation::from_degrees(degrees))
    }

    pub fn new(pipe_type: PipeType, rotation: Rotation) -> Self {
        // Start/End only ever sit at rotation 0.
        let rotation = if pipe_type.is_fixed() {
            Rotation::R0
        } else {
            rotation
        };
        Self {
            pipe_type,
            rotation,
            connections: connection_mask(pipe_type, rotation),
            is_connected: false,
            locked: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(PipeType::Empty, Rotation::R0)
    }

    /// Mark the tile as immovable for the player (authored levels).
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn pipe_type(&self) -> PipeType {
        self.pipe_type
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn connections(&self) -> ConnectionMask {
        self.connections
    }

    pub fn connects(&self, dir: Direction) -> bool {
        self.connections[dir.index()]
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Eligible for a player rotate request.
    pub fn is_rotatable(&self) -> bool {
        self.pipe_type.is_rotatable() && !self.locked
    }

    /// Unconditional quarter turn. Callers check [`Tile::is_rotatable`] first.
    pub fn rotate_clockwise(&mut self) {
        self.set_rotation(self.rotation.clockwise());
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.connections = connection_mask(self.pipe_type, rotation);
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.is_connected = connected;
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::empty()
    }
}
