//! Cell grid shared by the generator, the solver and the session

use std::fmt;

use anyhow::{anyhow, bail, Context};
use itertools::Itertools;

use crate::error::MazeError;

/// Location in the maze
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Position `distance` cells away in `direction`
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    /// The upper bound is not checked here; see [Grid::in_bounds].
    pub fn step(self, direction: Direction, distance: usize) -> Option<Self> {
        let (dr, dc) = direction.delta();
        let distance = distance as isize;
        Some(Self {
            row: self.row.checked_add_signed(dr * distance)?,
            col: self.col.checked_add_signed(dc * distance)?,
        })
    }

    /// Manhattan distance to `other`
    pub fn distance(self, other: Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Axis direction on the grid
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in the order the solver tries them
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row and column delta of a single step
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// State of a single cell
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CellState {
    Wall,
    Open,
    /// Explored by the solver (or walked by the player) without success
    Visited,
    /// Current search head, or the player in manual play
    Frontier,
    Exit,
    /// Confirmed to lie on the route from start to exit
    SolutionPath,
}

impl CellState {
    pub const S_WALL: char = '🟫';
    pub const S_OPEN: char = '🟩';
    pub const S_VISITED: char = '🟪';
    pub const S_FRONTIER: char = '🏃';
    pub const S_EXIT: char = '❎';
    pub const S_SOLUTION: char = '🟨';

    /// Emoji used when printing the grid
    pub const fn symbol(self) -> char {
        match self {
            CellState::Wall => Self::S_WALL,
            CellState::Open => Self::S_OPEN,
            CellState::Visited => Self::S_VISITED,
            CellState::Frontier => Self::S_FRONTIER,
            CellState::Exit => Self::S_EXIT,
            CellState::SolutionPath => Self::S_SOLUTION,
        }
    }

    /// Marks left behind by the solver or the player
    fn is_search_mark(self) -> bool {
        matches!(
            self,
            CellState::Visited | CellState::Frontier | CellState::SolutionPath
        )
    }
}

/// Fixed-size maze grid
///
/// All reads and writes go through [Grid::state_at] and [Grid::set_state], so
/// bounds and the single-exit rule are checked in one place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Row-major cell states
    cells: Vec<CellState>,
    /// Location of the exit, if one has been placed
    exit: Option<Position>,
}

/// Grid read from its emoji form, with the marked start position
#[derive(Clone, Debug)]
pub struct ParsedMaze {
    pub grid: Grid,
    pub start: Position,
}

impl Grid {
    /// Create a wall-filled grid
    ///
    /// Fails with [MazeError::GridTooLarge] if the cell count does not fit in
    /// `usize`.
    pub fn new(rows: usize, cols: usize) -> Result<Self, MazeError> {
        let size = rows
            .checked_mul(cols)
            .ok_or(MazeError::GridTooLarge { rows, cols })?;
        Ok(Self {
            rows,
            cols,
            cells: vec![CellState::Wall; size],
            exit: None,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Location of the exit cell
    pub fn exit(&self) -> Option<Position> {
        self.exit
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Row-major index; `row * cols + col < rows * cols`, which fit when the
    /// grid was allocated
    fn index(&self, pos: Position) -> Result<usize, MazeError> {
        if self.in_bounds(pos) {
            Ok(pos.row * self.cols + pos.col)
        } else {
            Err(MazeError::OutOfRange {
                position: pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// State of the cell at `pos`
    pub fn state_at(&self, pos: Position) -> Result<CellState, MazeError> {
        Ok(self.cells[self.index(pos)?])
    }

    /// Change the state of the cell at `pos`
    ///
    /// Fails without touching the grid if `pos` is out of range, if a second
    /// exit would be created, or if the exit would become anything but
    /// [CellState::SolutionPath].
    pub fn set_state(&mut self, pos: Position, state: CellState) -> Result<(), MazeError> {
        let idx = self.index(pos)?;
        match (self.exit, state) {
            (Some(existing), CellState::Exit) if existing != pos => {
                return Err(MazeError::MultipleExits {
                    requested: pos,
                    existing,
                })
            }
            (Some(existing), CellState::Exit | CellState::SolutionPath) if existing == pos => (),
            (Some(existing), _) if existing == pos => {
                return Err(MazeError::ExitReclassified(pos));
            }
            (None, CellState::Exit) => self.exit = Some(pos),
            _ => (),
        }
        self.cells[idx] = state;
        Ok(())
    }

    /// Reset every cell to `state`, forgetting the exit
    pub fn fill_all(&mut self, state: CellState) -> Result<(), MazeError> {
        if state == CellState::Exit {
            return Err(MazeError::ExitFill);
        }
        self.cells.fill(state);
        self.exit = None;
        Ok(())
    }

    /// Turn solver and player marks back into open floor
    ///
    /// The exit cell is restored to [CellState::Exit] if a solution path ran
    /// through it.
    pub fn clear_search_marks(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| c.is_search_mark()) {
            *cell = CellState::Open;
        }
        if let Some(idx) = self.exit.and_then(|exit| self.index(exit).ok()) {
            self.cells[idx] = CellState::Exit;
        }
    }

    /// Number of cells in `state`
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Positions of all cells in `state`, row by row
    pub fn positions(&self, state: CellState) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == state)
            .map(|(i, _)| Position::new(i / self.cols, i % self.cols))
            .collect()
    }

    /// Cells of a single row, `None` past the last one
    pub fn row(&self, row: usize) -> Option<&[CellState]> {
        let start = row.checked_mul(self.cols)?;
        self.cells.get(start..start.checked_add(self.cols)?)
    }

    /// Emoji representation, with `marker` drawn as the runner
    pub fn to_emojis(&self, marker: Option<Position>) -> String {
        (0..self.rows)
            .filter_map(|r| Some((r, self.row(r)?)))
            .map(|(r, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(c, cell)| {
                        if marker == Some(Position::new(r, c)) {
                            CellState::S_FRONTIER
                        } else {
                            cell.symbol()
                        }
                    })
                    .join("")
            })
            .join("\n")
    }

    /// Parse maze from its emoji representation
    ///
    /// The runner symbol marks the start cell, which is stored as open floor.
    /// Returns error if the maze contains unknown characters, rows of uneven
    /// length, no start, or not exactly one exit.
    ///
    /// # Examples
    /// ```
    /// use maze_runner::{CellState, Grid, Position};
    /// let maze = Grid::parse_emojis("
    /// 🟫🟫🟫🟫🟫
    /// 🟫🏃🟩🟩🟫
    /// 🟫🟫🟫🟩🟫
    /// 🟫❎🟩🟩🟫
    /// 🟫🟫🟫🟫🟫").unwrap();
    /// assert_eq!(maze.start, Position::new(1, 1));
    /// assert_eq!(maze.grid.exit(), Some(Position::new(3, 1)));
    /// assert_eq!(maze.grid.state_at(maze.start).unwrap(), CellState::Open);
    /// ```
    pub fn parse_emojis(emojis: &str) -> anyhow::Result<ParsedMaze> {
        let squares: Vec<Vec<char>> = emojis
            .trim()
            .lines()
            .map(|row| row.trim().chars().collect())
            .collect();

        let cols = squares.first().map_or(0, Vec::len);
        if cols == 0 {
            bail!("Maze is empty");
        }
        let mut grid = Grid::new(squares.len(), cols)?;
        let mut start = None;

        for (y, row) in squares.iter().enumerate() {
            if row.len() != cols {
                bail!("Row {} has {} squares, expected {}", y, row.len(), cols);
            }
            for (x, c) in row.iter().enumerate() {
                let pos = Position::new(y, x);
                let state = match *c {
                    CellState::S_WALL => CellState::Wall,
                    CellState::S_OPEN => CellState::Open,
                    CellState::S_VISITED => CellState::Visited,
                    CellState::S_EXIT => CellState::Exit,
                    CellState::S_SOLUTION => CellState::SolutionPath,
                    CellState::S_FRONTIER => {
                        if let Some(previous) = start.replace(pos) {
                            bail!("Second start at {}, first one at {}", pos, previous);
                        }
                        CellState::Open
                    }
                    val => bail!("Unexpected character `{}` at y={}, x={}", val, y, x),
                };
                grid.set_state(pos, state)
                    .with_context(|| format!("Invalid square at y={}, x={}", y, x))?;
            }
        }

        if grid.exit.is_none() {
            bail!("Exit not found in maze");
        }
        let start = start.ok_or_else(|| anyhow!("Start is not found in maze"))?;
        Ok(ParsedMaze { grid, start })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_emojis(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_all_wall() {
        let grid = Grid::new(5, 7).unwrap();
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.cols(), 7);
        assert_eq!(grid.count(CellState::Wall), 35);
        assert_eq!(grid.exit(), None);
    }

    #[test]
    fn out_of_range_access_fails() {
        let mut grid = Grid::new(5, 5).unwrap();
        let outside = Position::new(5, 0);
        assert!(!grid.in_bounds(outside));
        assert_eq!(
            grid.state_at(outside),
            Err(MazeError::OutOfRange {
                position: outside,
                rows: 5,
                cols: 5
            })
        );
        assert!(grid.set_state(Position::new(0, 9), CellState::Open).is_err());
        assert_eq!(grid.count(CellState::Wall), 25);
    }

    #[test]
    fn single_exit_is_enforced() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set_state(Position::new(3, 3), CellState::Exit).unwrap();
        assert_eq!(
            grid.set_state(Position::new(1, 1), CellState::Exit),
            Err(MazeError::MultipleExits {
                requested: Position::new(1, 1),
                existing: Position::new(3, 3)
            })
        );
        assert_eq!(
            grid.set_state(Position::new(3, 3), CellState::Visited),
            Err(MazeError::ExitReclassified(Position::new(3, 3)))
        );
        grid.set_state(Position::new(3, 3), CellState::SolutionPath)
            .unwrap();
        assert_eq!(grid.exit(), Some(Position::new(3, 3)));
        assert_eq!(grid.count(CellState::Exit), 0);
    }

    #[test]
    fn fill_all_forgets_exit() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set_state(Position::new(1, 1), CellState::Exit).unwrap();
        grid.fill_all(CellState::Open).unwrap();
        assert_eq!(grid.exit(), None);
        assert_eq!(grid.count(CellState::Open), 9);
        assert_eq!(grid.fill_all(CellState::Exit), Err(MazeError::ExitFill));
    }

    #[test]
    fn clear_search_marks_restores_exit() {
        let mut grid = Grid::new(3, 5).unwrap();
        grid.set_state(Position::new(1, 1), CellState::Visited).unwrap();
        grid.set_state(Position::new(1, 2), CellState::Frontier).unwrap();
        grid.set_state(Position::new(1, 3), CellState::Exit).unwrap();
        grid.set_state(Position::new(1, 3), CellState::SolutionPath)
            .unwrap();

        grid.clear_search_marks();
        assert_eq!(
            grid.row(1),
            Some(
                &[
                    CellState::Wall,
                    CellState::Open,
                    CellState::Open,
                    CellState::Exit,
                    CellState::Wall,
                ][..]
            )
        );
        assert_eq!(grid.row(3), None);
    }

    #[test]
    fn oversized_grid_is_rejected() {
        assert_eq!(
            Grid::new(usize::MAX, 3),
            Err(MazeError::GridTooLarge {
                rows: usize::MAX,
                cols: 3
            })
        );
    }

    #[test]
    fn step_does_not_wrap() {
        let origin = Position::new(0, 1);
        assert_eq!(origin.step(Direction::Up, 1), None);
        assert_eq!(origin.step(Direction::Left, 2), None);
        assert_eq!(origin.step(Direction::Right, 2), Some(Position::new(0, 3)));
        assert_eq!(origin.step(Direction::Down, 1), Some(Position::new(1, 1)));
    }

    #[test]
    fn parse_and_print_emojis() {
        let emojis = "
🟫🟫🟫🟫🟫
🟫🏃🟩🟩🟫
🟫🟪🟫🟩🟫
🟫🟨🟩❎🟫
🟫🟫🟫🟫🟫"
            .trim();
        let maze = Grid::parse_emojis(emojis).unwrap();

        assert_eq!(maze.start, Position::new(1, 1));
        assert_eq!(maze.grid.exit(), Some(Position::new(3, 3)));
        assert_eq!(maze.grid.count(CellState::Wall), 17);
        assert_eq!(maze.grid.count(CellState::Visited), 1);
        assert_eq!(maze.grid.to_emojis(Some(maze.start)), emojis);
    }

    #[test]
    fn parse_rejects_bad_input() {
        // Unknown character
        assert!(Grid::parse_emojis("🟫🟫🟫\n🟫🏃x\n🟫❎🟫").is_err());
        // Ragged rows
        assert!(Grid::parse_emojis("🟫🟫🟫\n🟫🏃\n🟫❎🟫").is_err());
        // No start
        assert!(Grid::parse_emojis("🟫🟫🟫\n🟫🟩🟫\n🟫❎🟫").is_err());
        // No exit
        assert!(Grid::parse_emojis("🟫🟫🟫\n🟫🏃🟫\n🟫🟩🟫").is_err());
        // Two exits
        assert!(Grid::parse_emojis("🟫🟫🟫\n❎🏃❎\n🟫🟫🟫").is_err());
    }
}
