//! Maze generation

use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::error::MazeError;
use crate::grid::{CellState, Direction, Grid, Position};

/// Perfect maze generator, randomized recursive backtracking.
///
/// The generator owns the only random source used for carving, so a seeded
/// generator always produces the same sequence of mazes.
pub struct MazeGenerator<R = StdRng> {
    random: R,
}

/// Carving state of one cell on the backtracking stack
struct Frame {
    pos: Position,
    directions: [Direction; 4],
    next: usize,
}

/// Largest number of rows or columns a maze may have
pub const MAX_SIZE: usize = 4095;

/// Conventional exit location, the interior corner opposite to (1, 1)
pub fn default_exit(rows: usize, cols: usize) -> Position {
    Position::new(rows.saturating_sub(2), cols.saturating_sub(2))
}

/// Check that a maze of `rows × cols` can be carved from `start` with the
/// exit at `exit`
///
/// Both dimensions must be odd, at least 3 and at most [MAX_SIZE]. Start and
/// exit must be distinct rooms, i.e. interior cells with odd coordinates.
pub fn validate_layout(
    rows: usize,
    cols: usize,
    start: Position,
    exit: Position,
) -> Result<(), MazeError> {
    if rows < 3 || cols < 3 || rows % 2 == 0 || cols % 2 == 0 {
        return Err(MazeError::InvalidGridDimensions { rows, cols });
    }
    if rows > MAX_SIZE || cols > MAX_SIZE {
        return Err(MazeError::GridTooLarge { rows, cols });
    }
    let is_room = |p: Position| is_carvable(rows, cols, p) && p.row % 2 == 1 && p.col % 2 == 1;
    if !is_room(start) {
        return Err(MazeError::InvalidStart(start));
    }
    if !is_room(exit) || exit == start {
        return Err(MazeError::InvalidExit(exit));
    }
    Ok(())
}

/// Inside the grid, leaving a one-cell wall border
fn is_carvable(rows: usize, cols: usize, p: Position) -> bool {
    (1..rows.saturating_sub(1)).contains(&p.row) && (1..cols.saturating_sub(1)).contains(&p.col)
}

impl MazeGenerator<StdRng> {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            random: if let Some(state) = seed {
                StdRng::seed_from_u64(state)
            } else {
                StdRng::from_entropy()
            },
        }
    }
}

impl<R: Rng> MazeGenerator<R> {
    /// Use an existing random source
    pub fn from_rng(random: R) -> Self {
        Self { random }
    }

    /// Generate a perfect maze into `grid`, with the exit at
    /// [default_exit]
    pub fn generate(&mut self, grid: &mut Grid, start: Position) -> Result<(), MazeError> {
        let exit = default_exit(grid.rows(), grid.cols());
        self.generate_with_exit(grid, start, exit)
    }

    /// Generate a perfect maze into `grid`
    ///
    /// The previous content of the grid is discarded. Every odd-coordinate
    /// interior cell ends up connected to `start` by exactly one path.
    ///
    /// Fails before touching the grid if the dimensions are not odd, or if
    /// `start` or `exit` are not interior cells with odd coordinates.
    pub fn generate_with_exit(
        &mut self,
        grid: &mut Grid,
        start: Position,
        exit: Position,
    ) -> Result<(), MazeError> {
        validate_layout(grid.rows(), grid.cols(), start, exit)?;

        grid.fill_all(CellState::Wall)?;
        let carved = self.build_maze(grid, start)?;

        grid.set_state(start, CellState::Open)?;
        grid.set_state(exit, CellState::Exit)?;

        debug!(
            "Generated {}x{} maze, {} rooms carved from {}",
            grid.rows(),
            grid.cols(),
            carved,
            start
        );
        Ok(())
    }

    fn frame(&mut self, pos: Position) -> Frame {
        let mut directions = Direction::ALL;
        directions.shuffle(&mut self.random);
        Frame {
            pos,
            directions,
            next: 0,
        }
    }

    /// Carve the maze from `start`
    ///
    /// From the current room, go into random directions two cells at a time.
    /// Carve out the wall in between if the room behind it is still solid,
    /// then continue from that room. Frames on an explicit stack stand in for
    /// the recursion, so the carving order is that of the recursive algorithm
    /// but maze size is not bounded by the call stack.
    ///
    /// Returns the number of rooms carved.
    fn build_maze(&mut self, grid: &mut Grid, start: Position) -> Result<usize, MazeError> {
        grid.set_state(start, CellState::Open)?;
        let mut carved = 1;
        let mut stack = vec![self.frame(start)];

        while let Some(frame) = stack.last_mut() {
            let Some(&direction) = frame.directions.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let pos = frame.pos;

            let Some(next) = pos
                .step(direction, 2)
                .filter(|&p| is_carvable(grid.rows(), grid.cols(), p))
            else {
                continue;
            };
            if grid.state_at(next)? != CellState::Wall {
                continue;
            }

            // Remove wall between current room and neighbor
            let between = Position::new((pos.row + next.row) / 2, (pos.col + next.col) / 2);
            grid.set_state(between, CellState::Open)?;
            grid.set_state(next, CellState::Open)?;
            carved += 1;

            stack.push(self.frame(next));
        }
        Ok(carved)
    }
}
