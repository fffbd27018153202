//! Session configuration

use std::time::Duration;

use crate::error::MazeError;
use crate::grid::Position;
use crate::maze_generator::{default_exit, validate_layout};

/// Default number of rows and columns
pub const DEFAULT_SIZE: usize = 15;

/// Default pause after each animated change
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(30);

/// Options recognized by a maze session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Grid height, odd
    pub rows: usize,
    /// Grid width, odd
    pub cols: usize,
    /// Where generation and solving start
    pub start: Position,
    /// Exit location; `(rows-2, cols-2)` when not set
    pub exit: Option<Position>,
    /// Pause after each solver change, zero to disable
    pub frame_delay: Duration,
    /// Seed of the maze generator; drawn from entropy when not set
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_SIZE,
            cols: DEFAULT_SIZE,
            start: Position::new(1, 1),
            exit: None,
            frame_delay: DEFAULT_FRAME_DELAY,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }

    /// Configured exit, or the default one for the grid size
    pub fn exit(&self) -> Position {
        self.exit
            .unwrap_or_else(|| default_exit(self.rows, self.cols))
    }

    pub fn validate(&self) -> Result<(), MazeError> {
        validate_layout(self.rows, self.cols, self.start, self.exit())
    }
}
