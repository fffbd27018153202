//! Errors raised by the maze core

use thiserror::Error;

use crate::grid::Position;
use crate::session::Phase;

/// Structural errors
///
/// All of these are raised before the grid is touched, so a failed call
/// never leaves a half-carved or half-marked maze behind. An unsolvable maze
/// is not an error; see [crate::Phase::Unsolvable].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// Position lies outside `[0, rows) × [0, cols)`
    #[error("position {position} is outside the {rows}x{cols} grid")]
    OutOfRange {
        position: Position,
        rows: usize,
        cols: usize,
    },

    /// Generation needs odd dimensions of at least 3
    #[error("grid dimensions {rows}x{cols} are invalid, both must be odd and at least 3")]
    InvalidGridDimensions { rows: usize, cols: usize },

    /// Grid is too large to be allocated, or to be generated
    #[error("grid dimensions {rows}x{cols} are too large")]
    GridTooLarge { rows: usize, cols: usize },

    /// Start is not an interior cell on odd coordinates
    #[error("start {0} must be an interior cell with odd coordinates")]
    InvalidStart(Position),

    /// Exit is not an interior cell on odd coordinates, or equals the start
    #[error("exit {0} must be an interior cell with odd coordinates, distinct from the start")]
    InvalidExit(Position),

    /// A second exit was requested
    #[error("cannot place exit at {requested}, the exit is already at {existing}")]
    MultipleExits {
        requested: Position,
        existing: Position,
    },

    /// A loaded grid has no exit
    #[error("the grid has no exit")]
    MissingExit,

    /// Every cell cannot be the exit
    #[error("cannot fill the grid with exit cells")]
    ExitFill,

    /// The exit cell may only become part of the solution path
    #[error("exit cell {0} cannot be reclassified")]
    ExitReclassified(Position),

    /// Operation is not allowed in the current session phase
    #[error("`{operation}` is not allowed while the session is {phase:?}")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },
}
