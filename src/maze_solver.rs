//! Depth-first maze solver with step-by-step change reporting

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::error::MazeError;
use crate::grid::{CellState, Direction, Grid, Position};

/// A single cell state change made by the solver
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct CellChange {
    pub position: Position,
    pub state: CellState,
}

/// How a solve ended
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum SolveOutcome {
    /// Exit reached; the route from start to exit, both included
    Solved(Vec<Position>),
    /// Every branch explored without reaching the exit
    Unsolvable,
    /// Stopped through the cancellation flag
    Cancelled,
}

impl SolveOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }
}

/// Result of stepping into a cell
enum Entry {
    Blocked,
    Entered,
    Found,
}

/// Depth-first search from the start cell to the exit
///
/// Neighbours are always tried up, down, left, right, so solving the same
/// maze twice marks the same cells.
#[derive(Clone, Default)]
pub struct MazeSolver {
    cancel: Option<Arc<AtomicBool>>,
}

impl MazeSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver that gives up as soon as `cancel` is raised
    pub fn with_cancel_flag(cancel: Arc<AtomicBool>) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Solve maze, returning whether the exit was reached
    ///
    /// # Examples
    /// ```
    /// use maze_runner::{CellState, Grid, MazeSolver};
    /// let mut maze = Grid::parse_emojis("
    /// 🟫🟫🟫🟫🟫
    /// 🟫🏃🟩🟩🟫
    /// 🟫🟫🟫🟩🟫
    /// 🟫❎🟩🟩🟫
    /// 🟫🟫🟫🟫🟫").unwrap();
    /// assert!(MazeSolver::new().solve(&mut maze.grid, maze.start).unwrap());
    /// assert_eq!(maze.grid.count(CellState::SolutionPath), 7);
    /// ```
    pub fn solve(&self, grid: &mut Grid, start: Position) -> Result<bool, MazeError> {
        Ok(self.solve_with(grid, start, |_, _| ())?.is_solved())
    }

    /// Solve maze, reporting every cell change to `on_change`
    ///
    /// A cell being explored is first marked [CellState::Frontier] and
    /// reported, then marked [CellState::Visited]. Once the exit is found, the
    /// exit and every cell on the route back to `start` are marked
    /// [CellState::SolutionPath] and reported, innermost first. Dead ends stay
    /// visited. The grid passed to `on_change` already contains the change.
    ///
    /// Fails with [MazeError::OutOfRange] before touching the grid if `start`
    /// is outside it.
    pub fn solve_with<F>(
        &self,
        grid: &mut Grid,
        start: Position,
        mut on_change: F,
    ) -> Result<SolveOutcome, MazeError>
    where
        F: FnMut(&Grid, CellChange),
    {
        grid.state_at(start)?;
        if self.is_cancelled() {
            return Ok(SolveOutcome::Cancelled);
        }

        // Each frame is a cell on the current route, and the index of the
        // next direction to try from it.
        let mut stack: Vec<(Position, usize)> = Vec::new();
        match Self::enter(grid, Some(start), &mut on_change)? {
            Entry::Blocked => return Ok(SolveOutcome::Unsolvable),
            Entry::Found => return Ok(SolveOutcome::Solved(vec![start])),
            Entry::Entered => stack.push((start, 0)),
        }

        while let Some((pos, next)) = stack.last_mut() {
            if self.is_cancelled() {
                debug!("Solve cancelled at {}", pos);
                return Ok(SolveOutcome::Cancelled);
            }
            let Some(&direction) = Direction::ALL.get(*next) else {
                // Dead end, stays visited
                stack.pop();
                continue;
            };
            *next += 1;
            let pos = *pos;
            let neighbour = pos.step(direction, 1);

            match Self::enter(grid, neighbour, &mut on_change)? {
                Entry::Blocked => (),
                Entry::Entered => stack.extend(neighbour.map(|n| (n, 0))),
                Entry::Found => {
                    let mut path: Vec<Position> = stack.iter().map(|&(p, _)| p).collect();
                    path.extend(neighbour);
                    for &(p, _) in stack.iter().rev() {
                        Self::mark(grid, p, CellState::SolutionPath, &mut on_change)?;
                    }
                    debug!(
                        "Solved from {}: {} cells on path, {} visited",
                        start,
                        path.len(),
                        grid.count(CellState::Visited)
                    );
                    return Ok(SolveOutcome::Solved(path));
                }
            }
        }

        debug!(
            "No route from {}, {} cells visited",
            start,
            grid.count(CellState::Visited)
        );
        Ok(SolveOutcome::Unsolvable)
    }

    fn mark<F>(
        grid: &mut Grid,
        position: Position,
        state: CellState,
        on_change: &mut F,
    ) -> Result<(), MazeError>
    where
        F: FnMut(&Grid, CellChange),
    {
        grid.set_state(position, state)?;
        on_change(grid, CellChange { position, state });
        Ok(())
    }

    /// Step into `pos`, marking it if it is open floor
    fn enter<F>(
        grid: &mut Grid,
        pos: Option<Position>,
        on_change: &mut F,
    ) -> Result<Entry, MazeError>
    where
        F: FnMut(&Grid, CellChange),
    {
        let Some(pos) = pos.filter(|&p| grid.in_bounds(p)) else {
            return Ok(Entry::Blocked);
        };
        match grid.state_at(pos)? {
            CellState::Wall | CellState::Visited => Ok(Entry::Blocked),
            _ if grid.exit() == Some(pos) => {
                Self::mark(grid, pos, CellState::SolutionPath, on_change)?;
                Ok(Entry::Found)
            }
            _ => {
                Self::mark(grid, pos, CellState::Frontier, on_change)?;
                grid.set_state(pos, CellState::Visited)?;
                Ok(Entry::Entered)
            }
        }
    }
}
