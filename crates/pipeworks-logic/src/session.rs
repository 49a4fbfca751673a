//! Puzzle session controller: owns the board and runs the play loop.
//!
//! # State machine
//!
//! ```text
//! Idle ──generate/load──▶ Setup ──▶ Playing ──solved──▶ Solved
//!                                      ▲                  │
//!                                      └──── reset ───────┘
//! ```
//!
//! The session is the only writer of tile state. Collaborators are injected
//! at construction: the RNG used for generation and reset, and a
//! [`CompletionSink`] that hears about each solved level exactly once.
//!
//! ```
//! use pipeworks_logic::config::PuzzleConfig;
//! use pipeworks_logic::session::{CompletionReport, PuzzleSession};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut session = PuzzleSession::new(
//!     PuzzleConfig::default(),
//!     StdRng::seed_from_u64(0),
//!     Box::new(|report: &CompletionReport| println!("solved in {} moves", report.moves)),
//! );
//! let snapshot = session.generate_level(7, 7, 42).unwrap();
//! assert_eq!(snapshot.tiles.len(), 49);
//! assert_eq!(session.move_count(), 0);
//! ```

use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{validate_config, PuzzleConfig};
use crate::error::PuzzleError;
use crate::generation::{self, random_rotation};
use crate::grid::{Grid, GridPos, GridSnapshot, TileVisual};
use crate::preset::{build_preset_grid, LevelPreset};
use crate::solver;
use crate::tile::Rotation;

// ============================================================================
// COLLABORATOR INTERFACES
// ============================================================================

/// Summary handed to the completion sink when a level is solved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub level: u32,
    pub moves: u32,
    pub elapsed_secs: f32,
    pub target_moves: Option<u32>,
    pub target_time_secs: Option<f32>,
}

impl CompletionReport {
    /// True when every target that is set was met. No targets means met.
    pub fn met_targets(&self) -> bool {
        self.target_moves.map_or(true, |t| self.moves <= t)
            && self.target_time_secs.map_or(true, |t| self.elapsed_secs <= t)
    }

    pub fn formatted_time(&self) -> String {
        format_time(self.elapsed_secs)
    }
}

/// Receiver for level-complete events (mission progression, success panel).
pub trait CompletionSink {
    fn level_complete(&mut self, report: &CompletionReport);
}

impl<F> CompletionSink for F
where
    F: FnMut(&CompletionReport),
{
    fn level_complete(&mut self, report: &CompletionReport) {
        self(report)
    }
}

// ============================================================================
// SESSION STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No level loaded yet.
    Idle,
    /// Building the board; never observable between calls.
    Setup,
    Playing,
    Solved,
}

/// Why a rotate request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateRejection {
    NotPlaying,
    OutOfBounds,
    NotRotatable,
    Animating,
}

/// Result of a rotate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotateOutcome {
    pub accepted: bool,
    /// Rotation of the tile after the request (unchanged when rejected).
    pub rotation: Rotation,
    pub solved: bool,
    pub rejection: Option<RotateRejection>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Targets {
    moves: Option<u32>,
    time_secs: Option<f32>,
}

/// One puzzle attempt: board, counters, timer, and the animation lock.
pub struct PuzzleSession<R> {
    config: PuzzleConfig,
    rng: R,
    sink: Box<dyn CompletionSink>,
    grid: Option<Grid>,
    state: SessionState,
    level: u32,
    move_count: u32,
    elapsed_secs: f32,
    /// Seconds left on the in-flight rotation, if any.
    animating: Option<f32>,
    completion_reported: bool,
    targets: Targets,
}

impl<R: Rng> PuzzleSession<R> {
    pub fn new(config: PuzzleConfig, rng: R, sink: Box<dyn CompletionSink>) -> Self {
        Self {
            config,
            rng,
            sink,
            grid: None,
            state: SessionState::Idle,
            level: 1,
            move_count: 0,
            elapsed_secs: 0.0,
            animating: None,
            completion_reported: false,
            targets: Targets::default(),
        }
    }

    // ── Level setup ─────────────────────────────────────────────────────

    /// Generate a level from the session's current RNG stream using the
    /// configured dimensions.
    pub fn start_level(&mut self) -> Result<GridSnapshot, PuzzleError> {
        let config = checked(self.config.clone())?;
        Ok(self.start_checked(config))
    }

    /// Generate with a config that already passed validation, then adopt it.
    fn start_checked(&mut self, config: PuzzleConfig) -> GridSnapshot {
        self.config = config;
        self.state = SessionState::Setup;
        let level = generation::generate(&self.config, &mut self.rng);
        log::debug!(
            "Level {} generated: {}x{}, path {} tiles",
            self.level,
            self.config.width,
            self.config.height,
            level.path.len()
        );
        self.targets = Targets::default();
        self.begin(level.grid)
    }

    /// Start a session on a caller-built board.
    pub fn load_grid(&mut self, grid: Grid) -> GridSnapshot {
        self.state = SessionState::Setup;
        self.targets = Targets::default();
        self.begin(grid)
    }

    /// Start a session from an authored level.
    pub fn load_preset(&mut self, preset: &LevelPreset) -> Result<GridSnapshot, PuzzleError> {
        let grid = build_preset_grid(preset, &self.config, &mut self.rng)?;
        self.state = SessionState::Setup;
        self.level = preset.level_number;
        self.targets = Targets {
            moves: preset.target_moves,
            time_secs: preset.target_time_secs,
        };
        Ok(self.begin(grid))
    }

    /// Zero the counters, run the first connectivity pass, and enter play.
    fn begin(&mut self, grid: Grid) -> GridSnapshot {
        self.config.width = grid.width();
        self.config.height = grid.height();
        self.grid = Some(grid);
        self.move_count = 0;
        self.elapsed_secs = 0.0;
        self.animating = None;
        self.completion_reported = false;
        self.state = SessionState::Playing;
        self.refresh_solution();
        self.snapshot_or_empty()
    }

    // ── Play ────────────────────────────────────────────────────────────

    /// Rotate the tile at `(x, y)` a quarter turn clockwise.
    ///
    /// Rejected without effect when no level is in play, the coordinates are
    /// off the board, the tile cannot rotate, or a rotation is still animating.
    pub fn rotate_tile(&mut self, x: usize, y: usize) -> RotateOutcome {
        let pos = GridPos::new(x, y);
        let current = self
            .grid
            .as_ref()
            .and_then(|g| g.tile(pos))
            .map(|t| t.rotation())
            .unwrap_or_default();
        let rejected = |reason| RotateOutcome {
            accepted: false,
            rotation: current,
            solved: self.state == SessionState::Solved,
            rejection: Some(reason),
        };

        if self.state != SessionState::Playing {
            log::debug!("Rotate {} rejected: session is {:?}", pos, self.state);
            return rejected(RotateRejection::NotPlaying);
        }
        if self.animating.is_some() {
            log::debug!("Rotate {} rejected: rotation in flight", pos);
            return rejected(RotateRejection::Animating);
        }
        let Some(tile) = self.grid.as_mut().and_then(|g| g.tile_mut(pos)) else {
            log::debug!("Rotate {} rejected: off the board", pos);
            return rejected(RotateRejection::OutOfBounds);
        };
        if !tile.is_rotatable() {
            log::debug!("Rotate {} rejected: {:?} cannot rotate", pos, tile.pipe_type());
            return rejected(RotateRejection::NotRotatable);
        }

        tile.rotate_clockwise();
        let rotation = tile.rotation();
        self.move_count += 1;
        if self.config.rotation_anim_secs > 0.0 {
            self.animating = Some(self.config.rotation_anim_secs);
        }

        let solved = self.refresh_solution();
        RotateOutcome {
            accepted: true,
            rotation,
            solved,
            rejection: None,
        }
    }

    /// Advance the timer and the rotation animation by `delta_secs`.
    pub fn tick(&mut self, delta_secs: f32) {
        if !delta_secs.is_finite() || delta_secs < 0.0 {
            return;
        }
        if self.is_playing() {
            self.elapsed_secs += delta_secs;
        }
        if let Some(remaining) = self.animating {
            let left = remaining - delta_secs;
            self.animating = (left > 0.0).then_some(left);
        }
    }

    /// Release the rotation lock early (the UI finished its tween).
    pub fn finish_rotation(&mut self) {
        self.animating = None;
    }

    /// Re-randomise every rotatable tile and restart play on the same layout.
    ///
    /// Tile types, endpoints, and locked tiles never change.
    pub fn reset_level(&mut self) -> GridSnapshot {
        let Some(grid) = self.grid.as_mut() else {
            return self.snapshot_or_empty();
        };
        self.state = SessionState::Setup;
        for tile in grid.tiles_mut() {
            if tile.is_rotatable() {
                tile.set_rotation(random_rotation(&mut self.rng));
            }
        }
        log::info!("Level {} reset", self.level);

        self.move_count = 0;
        self.elapsed_secs = 0.0;
        self.animating = None;
        self.completion_reported = false;
        self.state = SessionState::Playing;
        self.refresh_solution();
        self.snapshot_or_empty()
    }

    /// Move on to the next level: same dimensions, fresh board.
    pub fn advance_level(&mut self) -> Result<GridSnapshot, PuzzleError> {
        let config = checked(self.config.clone())?;
        self.level += 1;
        log::info!("Advancing to level {}", self.level);
        Ok(self.start_checked(config))
    }

    /// Solve, mark tiles, and handle the transition into `Solved`.
    fn refresh_solution(&mut self) -> bool {
        let Some(grid) = self.grid.as_mut() else {
            return false;
        };
        let solved = solver::check_solution(grid);
        if solved && self.state == SessionState::Playing {
            self.state = SessionState::Solved;
            self.animating = None;
            self.report_completion();
        }
        solved
    }

    fn report_completion(&mut self) {
        if self.completion_reported {
            return;
        }
        self.completion_reported = true;
        let report = CompletionReport {
            level: self.level,
            moves: self.move_count,
            elapsed_secs: self.elapsed_secs,
            target_moves: self.targets.moves,
            target_time_secs: self.targets.time_secs,
        };
        log::info!(
            "Level {} complete: {} moves in {}",
            report.level,
            report.moves,
            report.formatted_time()
        );
        self.sink.level_complete(&report);
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn tile_visual_state(&self, x: usize, y: usize) -> Option<TileVisual> {
        self.grid.as_ref()?.tile_visual(GridPos::new(x, y))
    }

    pub fn snapshot(&self) -> Option<GridSnapshot> {
        self.grid.as_ref().map(Grid::snapshot)
    }

    fn snapshot_or_empty(&self) -> GridSnapshot {
        self.snapshot().unwrap_or(GridSnapshot {
            width: 0,
            height: 0,
            start: GridPos::new(0, 0),
            end: GridPos::new(0, 0),
            tiles: Vec::new(),
        })
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    pub fn is_solved(&self) -> bool {
        self.state == SessionState::Solved
    }

    pub fn is_animating(&self) -> bool {
        self.animating.is_some()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }

    pub fn formatted_time(&self) -> String {
        format_time(self.elapsed_secs)
    }
}

impl<R: Rng + SeedableRng> PuzzleSession<R> {
    /// Reseed from `seed` and generate a `width × height` level.
    pub fn generate_level(
        &mut self,
        width: usize,
        height: usize,
        seed: u64,
    ) -> Result<GridSnapshot, PuzzleError> {
        let config = checked(PuzzleConfig {
            width,
            height,
            ..self.config.clone()
        })?;
        self.rng = R::seed_from_u64(seed);
        Ok(self.start_checked(config))
    }
}

fn checked(config: PuzzleConfig) -> Result<PuzzleConfig, PuzzleError> {
    let errors = validate_config(&config);
    if errors.is_empty() {
        Ok(config)
    } else {
        Err(errors.into())
    }
}

/// `MM:SS` with both parts floored.
pub fn format_time(secs: f32) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
