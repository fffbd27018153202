//! Generate perfect mazes and watch a depth-first search solve them
//!
//! A [MazeGenerator] carves a maze into a [Grid] by randomized recursive
//! backtracking. A [MazeSolver] then walks it depth-first, reporting each
//! cell it marks so that a display can animate the search. The
//! [SessionController] chains the two and decides what may happen next; the
//! [worker] module runs a controller on a background thread.
//!
//! # Examples
//! ## Solve a generated maze
//! ```
//! use maze_runner::{CellState, Phase, SessionConfig, SessionController};
//!
//! let config = SessionConfig {
//!     seed: Some(7),
//!     ..SessionConfig::new(11, 11)
//! };
//! let mut controller = SessionController::new(&config).unwrap();
//!
//! let mut frames = 0;
//! let phase = controller.run(|_grid, _change| frames += 1).unwrap();
//! assert_eq!(phase, Phase::Solved);
//! assert!(frames >= controller.solution().len());
//! println!("{}", controller.grid());
//! ```
//!
//! ## Solve a hand-made maze
//! ```
//! use maze_runner::{Grid, MazeSolver};
//!
//! let maze_emojis = "
//! 🟫🟫🟫🟫🟫🟫🟫
//! 🟫🏃🟩🟩🟩🟩🟫
//! 🟫🟩🟫🟫🟫🟩🟫
//! 🟫🟩🟩🟩🟫🟩🟫
//! 🟫🟫🟫🟩🟫🟩🟫
//! 🟫❎🟩🟩🟫🟩🟫
//! 🟫🟫🟫🟫🟫🟫🟫";
//! let mut maze = Grid::parse_emojis(maze_emojis).unwrap();
//! assert!(MazeSolver::new().solve(&mut maze.grid, maze.start).unwrap());
//! println!("{}", maze.grid);
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod maze_generator;
pub mod maze_solver;
pub mod session;
pub mod terminal;
pub mod worker;

pub use config::SessionConfig;
pub use error::MazeError;
pub use grid::{CellState, Direction, Grid, ParsedMaze, Position};
pub use maze_generator::MazeGenerator;
pub use maze_solver::{CellChange, MazeSolver, SolveOutcome};
pub use session::{MazeSession, MoveOutcome, Phase, SessionController};
pub use worker::{start_session, SessionEvent, SessionHandle};
