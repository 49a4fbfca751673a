//! Puzzle configuration and validation.
//!
//! Level parameters arrive as plain data at generation time. Validation
//! collects every problem rather than stopping at the first.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest board side the generator accepts.
pub const MAX_GRID_SIDE: usize = 64;

/// Generation and play tuning for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    /// Columns. Start sits in column 0, End in the last column.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// Probability that a non-path cell is left empty.
    pub empty_chance: f32,
    /// Length of the rotate animation window in seconds. 0 disables the lock.
    pub rotation_anim_secs: f32,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            width: 7,
            height: 7,
            empty_chance: 0.3,
            rotation_anim_secs: 0.2,
        }
    }
}

impl PuzzleConfig {
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Fewer than two columns; Start and End need their own.
    GridTooNarrow(usize),
    /// No rows at all.
    GridTooShort(usize),
    /// Either side exceeds [`MAX_GRID_SIDE`].
    GridTooLarge(usize, usize),
    /// Empty chance outside `[0, 1]`.
    InvalidEmptyChance(f32),
    /// Negative or non-finite animation window.
    InvalidAnimationDuration(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::GridTooNarrow(w) => write!(f, "grid too narrow: width {} < 2", w),
            ConfigError::GridTooShort(h) => write!(f, "grid needs at least one row, height {}", h),
            ConfigError::GridTooLarge(w, h) => {
                write!(f, "grid {}x{} exceeds {} per side", w, h, MAX_GRID_SIDE)
            }
            ConfigError::InvalidEmptyChance(p) => write!(f, "empty chance {} not in [0, 1]", p),
            ConfigError::InvalidAnimationDuration(s) => {
                write!(f, "rotation animation {}s must be finite and >= 0", s)
            }
        }
    }
}

/// Validate a puzzle configuration, returning all errors found.
pub fn validate_config(config: &PuzzleConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.width < 2 {
        errors.push(ConfigError::GridTooNarrow(config.width));
    }
    if config.height < 1 {
        errors.push(ConfigError::GridTooShort(config.height));
    }
    if config.width > MAX_GRID_SIDE || config.height > MAX_GRID_SIDE {
        errors.push(ConfigError::GridTooLarge(config.width, config.height));
    }
    if !(0.0..=1.0).contains(&config.empty_chance) {
        errors.push(ConfigError::InvalidEmptyChance(config.empty_chance));
    }
    if !config.rotation_anim_secs.is_finite() || config.rotation_anim_secs < 0.0 {
        errors.push(ConfigError::InvalidAnimationDuration(config.rotation_anim_secs));
    }

    errors
}
