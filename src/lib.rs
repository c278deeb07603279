//! BUZZBOARD - a terminal quiz show for a room full of buzzers
//!
//! Read the clue. Ring in first. Keep control of the board.
//!
//! The library holds everything the two binaries share: the buzzer arbiter,
//! the clue model and loaders, the game state machine, the host relay and the
//! terminal front end.

pub mod app;
pub mod clues;
pub mod config;
pub mod media;
pub mod network;
pub mod players;
pub mod render;
pub mod stats;
pub mod storage;
pub mod tui;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Qualifier-less project directories shared by config, logs and storage
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "buzzboard")
}

/// Directory where the database and log file live
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}
