//! Authored levels: fixed endpoints, hand-placed tiles, and par targets.
//!
//! Presets are plain JSON so level designers can edit them without touching
//! code:
//!
//! ```
//! use pipeworks_logic::preset::LevelPreset;
//!
//! let preset = LevelPreset::from_json(r#"{
//!     "level_number": 1,
//!     "width": 3,
//!     "height": 1,
//!     "start": { "x": 0, "y": 0 },
//!     "end": { "x": 2, "y": 0 },
//!     "tiles": [
//!         { "position": { "x": 1, "y": 0 }, "pipe_type": "Straight", "initial_rotation": 90 }
//!     ],
//!     "target_moves": 1
//! }"#).unwrap();
//! assert_eq!(preset.tiles.len(), 1);
//! assert!(!preset.tiles[0].locked);
//! ```

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{validate_config, PuzzleConfig};
use crate::error::PuzzleError;
use crate::generation::random_filler;
use crate::grid::{Grid, GridPos};
use crate::tile::{PipeType, Rotation, Tile};

/// One hand-placed tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetTile {
    pub position: GridPos,
    pub pipe_type: PipeType,
    /// Degrees; normalised and snapped like any other rotation.
    #[serde(default)]
    pub initial_rotation: i32,
    /// Locked tiles cannot be rotated by the player or by reset.
    #[serde(default)]
    pub locked: bool,
}

/// An authored level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelPreset {
    pub level_number: u32,
    pub width: usize,
    pub height: usize,
    pub start: GridPos,
    pub end: GridPos,
    #[serde(default)]
    pub tiles: Vec<PresetTile>,
    #[serde(default)]
    pub target_moves: Option<u32>,
    #[serde(default)]
    pub target_time_secs: Option<f32>,
    /// Fill unlisted cells with random decoys instead of leaving them empty.
    #[serde(default)]
    pub fill_random: bool,
}

impl LevelPreset {
    pub fn from_json(json: &str) -> Result<Self, PuzzleError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Parse a JSON array of presets.
pub fn parse_preset_list(json: &str) -> Result<Vec<LevelPreset>, PuzzleError> {
    Ok(serde_json::from_str(json)?)
}

/// Check a preset against the board rules without building it.
pub fn validate_preset(preset: &LevelPreset, config: &PuzzleConfig) -> Result<(), PuzzleError> {
    let sized = PuzzleConfig {
        width: preset.width,
        height: preset.height,
        ..config.clone()
    };
    let errors = validate_config(&sized);
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let in_bounds = |p: GridPos| p.x < preset.width && p.y < preset.height;
    for p in [preset.start, preset.end] {
        if !in_bounds(p) {
            return Err(PuzzleError::OutOfBounds(p));
        }
    }
    if preset.start == preset.end {
        return Err(PuzzleError::InvalidPreset(format!(
            "start and end share {}",
            preset.start
        )));
    }

    let mut seen = HashSet::new();
    for tile in &preset.tiles {
        let p = tile.position;
        if !in_bounds(p) {
            return Err(PuzzleError::OutOfBounds(p));
        }
        if p == preset.start || p == preset.end {
            return Err(PuzzleError::InvalidPreset(format!(
                "tile at {} overlaps an endpoint",
                p
            )));
        }
        if tile.pipe_type.is_fixed() {
            return Err(PuzzleError::DuplicateEndpoint(tile.pipe_type));
        }
        if !seen.insert(p) {
            return Err(PuzzleError::InvalidPreset(format!("{} listed twice", p)));
        }
    }

    Ok(())
}

/// Build the board for a preset.
///
/// The RNG is only drawn from when `fill_random` is set.
pub fn build_preset_grid(
    preset: &LevelPreset,
    config: &PuzzleConfig,
    rng: &mut impl Rng,
) -> Result<Grid, PuzzleError> {
    validate_preset(preset, config)?;

    let mut grid = Grid::with_endpoints(preset.width, preset.height, preset.start, preset.end);

    if preset.fill_random {
        for y in 0..preset.height {
            for x in 0..preset.width {
                grid.place(GridPos::new(x, y), random_filler(config.empty_chance, rng));
            }
        }
    }

    for pt in &preset.tiles {
        let mut tile = Tile::new(pt.pipe_type, Rotation::from_degrees(pt.initial_rotation));
        if pt.locked {
            tile = tile.locked();
        }
        grid.place(pt.position, tile);
    }

    log::debug!(
        "Preset level {} built: {}x{}, {} authored tiles",
        preset.level_number,
        preset.width,
        preset.height,
        preset.tiles.len()
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn preset() -> LevelPreset {
        LevelPreset {
            level_number: 3,
            width: 4,
            height: 2,
            start: GridPos::new(0, 0),
            end: GridPos::new(3, 1),
            tiles: vec![
                PresetTile {
                    position: GridPos::new(1, 0),
                    pipe_type: PipeType::Straight,
                    initial_rotation: 90,
                    locked: false,
                },
                PresetTile {
                    position: GridPos::new(2, 0),
                    pipe_type: PipeType::Corner,
                    initial_rotation: 0,
                    locked: true,
                },
                PresetTile {
                    position: GridPos::new(2, 1),
                    pipe_type: PipeType::Corner,
                    initial_rotation: 90,
                    locked: false,
                },
            ],
            target_moves: Some(2),
            target_time_secs: None,
            fill_random: false,
        }
    }

    #[test]
    fn builds_authored_tiles() {
        let mut rng = StdRng::seed_from_u64(0);
        let grid = build_preset_grid(&preset(), &PuzzleConfig::default(), &mut rng).unwrap();
        let straight = grid.tile(GridPos::new(1, 0)).unwrap();
        assert_eq!(straight.pipe_type(), PipeType::Straight);
        assert_eq!(straight.rotation(), Rotation::R90);
        assert!(grid.tile(GridPos::new(2, 0)).unwrap().is_locked());
        assert_eq!(grid.tile(GridPos::new(1, 1)).unwrap().pipe_type(), PipeType::Empty);
        assert_eq!(grid.start(), GridPos::new(0, 0));
        assert_eq!(grid.end(), GridPos::new(3, 1));
    }

    #[test]
    fn random_fill_keeps_authored_tiles() {
        let mut p = preset();
        p.fill_random = true;
        let mut rng = StdRng::seed_from_u64(8);
        let grid = build_preset_grid(&p, &PuzzleConfig::default(), &mut rng).unwrap();
        assert_eq!(grid.tile(GridPos::new(1, 0)).unwrap().pipe_type(), PipeType::Straight);
        assert_eq!(grid.tile(GridPos::new(0, 0)).unwrap().pipe_type(), PipeType::Start);
        assert_eq!(grid.tile(GridPos::new(3, 1)).unwrap().pipe_type(), PipeType::End);
    }

    #[test]
    fn rejects_out_of_bounds_tile() {
        let mut p = preset();
        p.tiles[0].position = GridPos::new(9, 0);
        assert!(matches!(
            validate_preset(&p, &PuzzleConfig::default()),
            Err(PuzzleError::OutOfBounds(_))
        ));
    }

    #[test]
    fn rejects_tiles_on_endpoints_and_extra_endpoints() {
        let mut p = preset();
        p.tiles[0].position = p.start;
        assert!(matches!(
            validate_preset(&p, &PuzzleConfig::default()),
            Err(PuzzleError::InvalidPreset(_))
        ));

        let mut p = preset();
        p.tiles[0].pipe_type = PipeType::End;
        assert!(matches!(
            validate_preset(&p, &PuzzleConfig::default()),
            Err(PuzzleError::DuplicateEndpoint(PipeType::End))
        ));
    }

    #[test]
    fn rejects_duplicate_positions_and_shared_endpoints() {
        let mut p = preset();
        p.tiles[1].position = p.tiles[0].position;
        assert!(matches!(
            validate_preset(&p, &PuzzleConfig::default()),
            Err(PuzzleError::InvalidPreset(_))
        ));

        let mut p = preset();
        p.end = p.start;
        assert!(validate_preset(&p, &PuzzleConfig::default()).is_err());
    }

    #[test]
    fn rejects_bad_dimensions() {
        let mut p = preset();
        p.width = 1;
        assert!(matches!(
            validate_preset(&p, &PuzzleConfig::default()),
            Err(PuzzleError::InvalidConfig(_))
        ));
    }

    #[test]
    fn json_defaults() {
        let p = LevelPreset::from_json(
            r#"{"level_number":1,"width":2,"height":1,"start":{"x":0,"y":0},"end":{"x":1,"y":0}}"#,
        )
        .unwrap();
        assert!(p.tiles.is_empty());
        assert_eq!(p.target_moves, None);
        assert!(!p.fill_random);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            LevelPreset::from_json("{\"level_number\": \"one\"}"),
            Err(PuzzleError::Json(_))
        ));
        assert!(parse_preset_list("[]").unwrap().is_empty());
    }
}
