//! Pure pipe-puzzle logic for Pipeworks.
//!
//! This crate contains the whole puzzle engine independent of any renderer,
//! input system, or game engine. Functions take plain data and return
//! results; the UI adapter only reads snapshots and forwards rotate requests.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Board size and tuning, validation |
//! | [`error`] | Errors for building boards from external data |
//! | [`generation`] | Endpoint placement, A* solution path, path shapes, population |
//! | [`grid`] | Row-major board, coordinates, snapshots for rendering |
//! | [`preset`] | Authored JSON levels with locked tiles and par targets |
//! | [`session`] | Session state machine, rotate/reset/advance, timer, completion sink |
//! | [`solver`] | BFS connectivity from Start with mutual-arm edges |
//! | [`tile`] | Pipe types, rotations, connection masks |

pub mod config;
pub mod error;
pub mod generation;
pub mod grid;
pub mod preset;
pub mod session;
pub mod solver;
pub mod tile;
