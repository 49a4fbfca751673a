//! Errors for building boards and levels from external data.
//!
//! Play itself never fails: rejected rotations come back as
//! [`RotateOutcome`](crate::session::RotateOutcome) values.

use std::fmt;

use crate::config::ConfigError;
use crate::grid::GridPos;
use crate::tile::PipeType;

#[derive(Debug)]
pub enum PuzzleError {
    /// Dimensions or tuning values rejected by `validate_config`.
    InvalidConfig(Vec<ConfigError>),
    TileCountMismatch { expected: usize, found: usize },
    MissingEndpoint(PipeType),
    DuplicateEndpoint(PipeType),
    OutOfBounds(GridPos),
    InvalidPreset(String),
    Json(serde_json::Error),
}

impl From<serde_json::Error> for PuzzleError {
    fn from(e: serde_json::Error) -> Self {
        PuzzleError::Json(e)
    }
}

impl From<Vec<ConfigError>> for PuzzleError {
    fn from(errors: Vec<ConfigError>) -> Self {
        PuzzleError::InvalidConfig(errors)
    }
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleError::InvalidConfig(errors) => {
                write!(f, "invalid puzzle config: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
            PuzzleError::TileCountMismatch { expected, found } => {
                write!(f, "expected {} tiles, found {}", expected, found)
            }
            PuzzleError::MissingEndpoint(kind) => write!(f, "board has no {:?} tile", kind),
            PuzzleError::DuplicateEndpoint(kind) => {
                write!(f, "board has more than one {:?} tile", kind)
            }
            PuzzleError::OutOfBounds(pos) => write!(f, "position {} is outside the board", pos),
            PuzzleError::InvalidPreset(msg) => write!(f, "invalid level preset: {}", msg),
            PuzzleError::Json(e) => write!(f, "preset JSON error: {}", e),
        }
    }
}

impl std::error::Error for PuzzleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PuzzleError::Json(e) => Some(e),
            _ => None,
        }
    }
}
