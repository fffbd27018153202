//! Session state machine: generate, solve, then regenerate or stop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng};

use crate::config::SessionConfig;
use crate::error::MazeError;
use crate::grid::{CellState, Direction, Grid, Position};
use crate::maze_generator::MazeGenerator;
use crate::maze_solver::{CellChange, MazeSolver, SolveOutcome};

/// Session phase
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Phase {
    Idle,
    Generating,
    Solving,
    /// Exit reached; a new maze may be requested
    Solved,
    /// Every route explored without reaching the exit
    Unsolvable,
    /// Stopped on request
    Stopped,
}

/// Result of a manual move
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MoveOutcome {
    /// Wall in the way, nothing changed
    Blocked,
    Moved(Position),
    ReachedExit,
}

/// Maze being played: grid, fixed start and exit, and phase
#[derive(Clone, Debug)]
pub struct MazeSession {
    grid: Grid,
    start: Position,
    exit: Position,
    phase: Phase,
}

impl MazeSession {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn exit(&self) -> Position {
        self.exit
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// Drives generation and solving of one maze after another
pub struct SessionController<R = StdRng> {
    session: MazeSession,
    generator: MazeGenerator<R>,
    solver: MazeSolver,
    cancel: Arc<AtomicBool>,
    /// Player position in manual play
    player: Option<Position>,
    /// Route found by the last successful solve
    solution: Vec<Position>,
}

impl SessionController<StdRng> {
    /// Create a controller whose generator is seeded from `config`
    pub fn new(config: &SessionConfig) -> Result<Self, MazeError> {
        Self::with_generator(config, MazeGenerator::new(config.seed))
    }

    /// Create a controller over a hand-made maze, ready to be solved
    ///
    /// The exit is taken from the grid. Mazes generated later have the same
    /// size, start and exit, carved from entropy.
    pub fn from_maze(grid: Grid, start: Position) -> Result<Self, MazeError> {
        let exit = check_maze(&grid, start)?;
        let session = MazeSession {
            grid,
            start,
            exit,
            phase: Phase::Solving,
        };
        Ok(Self::with_session(session, MazeGenerator::new(None)))
    }
}

/// Check that `start` lies on `grid` and return the grid's exit
fn check_maze(grid: &Grid, start: Position) -> Result<Position, MazeError> {
    grid.state_at(start)?;
    let exit = grid.exit().ok_or(MazeError::MissingExit)?;
    debug!(
        "Loaded {}x{} maze, start {}, exit {}",
        grid.rows(),
        grid.cols(),
        start,
        exit
    );
    Ok(exit)
}

impl<R: Rng> SessionController<R> {
    pub fn with_generator(
        config: &SessionConfig,
        generator: MazeGenerator<R>,
    ) -> Result<Self, MazeError> {
        config.validate()?;
        let session = MazeSession {
            grid: Grid::new(config.rows, config.cols)?,
            start: config.start,
            exit: config.exit(),
            phase: Phase::Idle,
        };
        Ok(Self::with_session(session, generator))
    }

    fn with_session(session: MazeSession, generator: MazeGenerator<R>) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        Self {
            session,
            generator,
            solver: MazeSolver::with_cancel_flag(cancel.clone()),
            cancel,
            player: None,
            solution: Vec::new(),
        }
    }

    pub fn session(&self) -> &MazeSession {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn grid(&self) -> &Grid {
        &self.session.grid
    }

    /// Route from start to exit found by the last solve
    pub fn solution(&self) -> &[Position] {
        &self.solution
    }

    /// Player position, while playing manually
    pub fn player(&self) -> Option<Position> {
        self.player
    }

    /// Flag that interrupts a running solve when raised
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    fn set_phase(&mut self, phase: Phase) {
        info!("Session {:?} -> {:?}", self.session.phase, phase);
        self.session.phase = phase;
    }

    fn require(&self, operation: &'static str, allowed: &[Phase]) -> Result<(), MazeError> {
        if allowed.contains(&self.session.phase) {
            Ok(())
        } else {
            Err(MazeError::InvalidPhase {
                operation,
                phase: self.session.phase,
            })
        }
    }

    /// Replace the grid with a newly generated maze, ready to be solved
    pub fn generate(&mut self) -> Result<(), MazeError> {
        self.require("generate", &[Phase::Idle, Phase::Solving, Phase::Solved])?;
        let previous = self.session.phase;
        self.set_phase(Phase::Generating);
        self.player = None;
        self.solution.clear();

        let MazeSession {
            grid, start, exit, ..
        } = &mut self.session;
        if let Err(err) = self.generator.generate_with_exit(grid, *start, *exit) {
            self.set_phase(previous);
            return Err(err);
        }
        self.set_phase(Phase::Solving);
        Ok(())
    }

    /// Use a hand-made grid instead of a generated one
    ///
    /// The exit is taken from the grid. The maze need not be perfect, nor
    /// even solvable.
    pub fn load(&mut self, grid: Grid, start: Position) -> Result<(), MazeError> {
        self.require("load", &[Phase::Idle, Phase::Solving, Phase::Solved])?;
        let exit = check_maze(&grid, start)?;

        self.session.grid = grid;
        self.session.start = start;
        self.session.exit = exit;
        self.player = None;
        self.solution.clear();
        self.set_phase(Phase::Solving);
        Ok(())
    }

    /// Clear previous search marks and solve from the start
    ///
    /// Every cell change is passed on to `on_change`. Returns the phase the
    /// session ended in: [Phase::Solved], [Phase::Unsolvable], or
    /// [Phase::Stopped] if the solve was cancelled.
    pub fn solve<F>(&mut self, on_change: F) -> Result<Phase, MazeError>
    where
        F: FnMut(&Grid, CellChange),
    {
        self.require("solve", &[Phase::Solving])?;
        self.player = None;
        self.session.grid.clear_search_marks();

        let outcome = self
            .solver
            .solve_with(&mut self.session.grid, self.session.start, on_change)?;
        let phase = match outcome {
            SolveOutcome::Solved(path) => {
                info!("Exit reached in {} steps", path.len().saturating_sub(1));
                self.solution = path;
                Phase::Solved
            }
            SolveOutcome::Unsolvable => {
                warn!(
                    "Exit {} cannot be reached from {}",
                    self.session.exit, self.session.start
                );
                Phase::Unsolvable
            }
            SolveOutcome::Cancelled => Phase::Stopped,
        };
        self.set_phase(phase);
        Ok(phase)
    }

    /// Generate and solve a maze
    pub fn run<F>(&mut self, on_change: F) -> Result<Phase, MazeError>
    where
        F: FnMut(&Grid, CellChange),
    {
        self.generate()?;
        self.solve(on_change)
    }

    /// Start over with a new maze after a successful solve
    pub fn regenerate<F>(&mut self, on_change: F) -> Result<Phase, MazeError>
    where
        F: FnMut(&Grid, CellChange),
    {
        self.require("regenerate", &[Phase::Solved])?;
        self.run(on_change)
    }

    /// End the session, interrupting a running solve
    pub fn stop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.player = None;
        self.set_phase(Phase::Stopped);
    }

    /// Place the player on the start cell for manual play
    pub fn begin_manual(&mut self) -> Result<(), MazeError> {
        self.require("begin_manual", &[Phase::Solving])?;
        self.session.grid.clear_search_marks();
        self.session
            .grid
            .set_state(self.session.start, CellState::Frontier)?;
        self.player = Some(self.session.start);
        Ok(())
    }

    /// Move the player one cell
    ///
    /// The cell left behind is marked visited. Reaching the exit solves the
    /// maze.
    pub fn move_player(&mut self, direction: Direction) -> Result<MoveOutcome, MazeError> {
        self.require("move_player", &[Phase::Solving])?;
        let Some(player) = self.player else {
            return Err(MazeError::InvalidPhase {
                operation: "move_player",
                phase: self.session.phase,
            });
        };

        let grid = &mut self.session.grid;
        let Some(target) = player.step(direction, 1).filter(|&p| grid.in_bounds(p)) else {
            return Ok(MoveOutcome::Blocked);
        };
        if grid.state_at(target)? == CellState::Wall {
            return Ok(MoveOutcome::Blocked);
        }

        grid.set_state(player, CellState::Visited)?;
        self.player = Some(target);
        if target == self.session.exit {
            grid.set_state(target, CellState::SolutionPath)?;
            self.set_phase(Phase::Solved);
            Ok(MoveOutcome::ReachedExit)
        } else {
            grid.set_state(target, CellState::Frontier)?;
            Ok(MoveOutcome::Moved(target))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(rows: usize, cols: usize, seed: u64) -> SessionController {
        let config = SessionConfig {
            seed: Some(seed),
            ..SessionConfig::new(rows, cols)
        };
        SessionController::new(&config).unwrap()
    }

    fn loaded(emojis: &str) -> SessionController {
        let maze = Grid::parse_emojis(emojis).unwrap();
        SessionController::from_maze(maze.grid, maze.start).unwrap()
    }

    #[test]
    fn generate_then_solve() {
        let mut controller = seeded(15, 15, 1);
        assert_eq!(controller.phase(), Phase::Idle);

        controller.generate().unwrap();
        assert_eq!(controller.phase(), Phase::Solving);
        assert_eq!(controller.grid().count(CellState::Exit), 1);

        let session = controller.session();
        assert_eq!(session.phase(), Phase::Solving);
        assert_eq!(session.start(), Position::new(1, 1));
        assert_eq!(session.exit(), Position::new(13, 13));
        assert_eq!(session.grid().exit(), Some(session.exit()));

        let mut changes = 0;
        let phase = controller.solve(|_, _| changes += 1).unwrap();
        assert_eq!(phase, Phase::Solved);
        assert_eq!(controller.phase(), Phase::Solved);
        assert!(changes > 0);

        let solution = controller.solution();
        assert_eq!(solution.first(), Some(&Position::new(1, 1)));
        assert_eq!(solution.last(), Some(&Position::new(13, 13)));
        assert_eq!(
            controller.grid().count(CellState::SolutionPath),
            solution.len()
        );
    }

    #[test]
    fn solve_requires_a_maze() {
        let mut controller = seeded(7, 7, 0);
        assert_eq!(
            controller.solve(|_, _| ()),
            Err(MazeError::InvalidPhase {
                operation: "solve",
                phase: Phase::Idle
            })
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert_eq!(
            SessionController::new(&SessionConfig::new(8, 9)).err(),
            Some(MazeError::InvalidGridDimensions { rows: 8, cols: 9 })
        );
        assert_eq!(
            SessionController::new(&SessionConfig::new(usize::MAX, usize::MAX)).err(),
            Some(MazeError::GridTooLarge {
                rows: usize::MAX,
                cols: usize::MAX
            })
        );
    }

    #[test]
    fn regenerate_after_solve() {
        let mut controller = seeded(21, 21, 2);
        assert_eq!(controller.run(|_, _| ()).unwrap(), Phase::Solved);
        let first = controller.grid().clone();

        let mut differs = false;
        for _ in 0..5 {
            assert_eq!(controller.regenerate(|_, _| ()).unwrap(), Phase::Solved);
            assert_eq!(controller.grid().count(CellState::Exit), 0);
            differs |= *controller.grid() != first;
        }
        assert!(differs);
    }

    #[test]
    fn regenerate_needs_solved_maze() {
        let mut controller = seeded(7, 7, 0);
        assert!(controller.regenerate(|_, _| ()).is_err());
        controller.generate().unwrap();
        assert_eq!(
            controller.regenerate(|_, _| ()),
            Err(MazeError::InvalidPhase {
                operation: "regenerate",
                phase: Phase::Solving
            })
        );
    }

    #[test]
    fn unsolvable_is_terminal() {
        let mut controller = loaded(
            "
🟫🟫🟫🟫🟫
🟫🏃🟩🟩🟫
🟫🟫🟫🟫🟫
🟫🟩🟩❎🟫
🟫🟫🟫🟫🟫",
        );
        assert_eq!(controller.solve(|_, _| ()).unwrap(), Phase::Unsolvable);
        assert!(controller.solution().is_empty());
        assert!(controller.regenerate(|_, _| ()).is_err());
        assert!(controller.generate().is_err());
        assert_eq!(controller.phase(), Phase::Unsolvable);
    }

    #[test]
    fn from_maze_is_ready_to_solve() {
        let maze = Grid::parse_emojis(
            "
🟫🟫🟫🟫🟫🟫🟫
🟫🟩🟩🟩🟩🏃🟫
🟫🟩🟫🟫🟫🟫🟫
🟫❎🟫🟫🟫🟫🟫
🟫🟫🟫🟫🟫🟫🟫",
        )
        .unwrap();
        let mut controller = SessionController::from_maze(maze.grid, maze.start).unwrap();
        assert_eq!(controller.phase(), Phase::Solving);
        assert_eq!(controller.session().start(), Position::new(1, 5));
        assert_eq!(controller.session().exit(), Position::new(3, 1));

        assert_eq!(controller.solve(|_, _| ()).unwrap(), Phase::Solved);
        assert_eq!(controller.solution().len(), 7);

        let no_exit = Grid::new(5, 5).unwrap();
        assert_eq!(
            SessionController::from_maze(no_exit, Position::new(1, 1)).err(),
            Some(MazeError::MissingExit)
        );
    }

    #[test]
    fn load_requires_exit() {
        let mut controller = seeded(5, 5, 0);
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set_state(Position::new(1, 1), CellState::Open).unwrap();
        assert_eq!(
            controller.load(grid.clone(), Position::new(1, 1)),
            Err(MazeError::MissingExit)
        );
        assert!(matches!(
            controller.load(grid, Position::new(9, 9)),
            Err(MazeError::OutOfRange { .. })
        ));
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn stop_is_terminal() {
        let mut controller = seeded(7, 7, 0);
        controller.run(|_, _| ()).unwrap();
        controller.stop();
        assert_eq!(controller.phase(), Phase::Stopped);
        assert!(controller.cancel_flag().load(Ordering::Relaxed));
        assert!(controller.generate().is_err());
    }

    #[test]
    fn cancelling_a_solve_stops_the_session() {
        let mut controller = seeded(31, 31, 3);
        controller.generate().unwrap();
        let cancel = controller.cancel_flag();

        let phase = controller
            .solve(|_, _| cancel.store(true, Ordering::Relaxed))
            .unwrap();
        assert_eq!(phase, Phase::Stopped);
        assert!(controller.solution().is_empty());
    }

    #[test]
    fn solve_starts_from_a_clean_grid() {
        let mut controller = loaded(
            "
🟫🟫🟫🟫🟫
🟫🏃🟪🟩🟫
🟫🟨🟫🟩🟫
🟫🟩🟩❎🟫
🟫🟫🟫🟫🟫",
        );
        assert_eq!(controller.solve(|_, _| ()).unwrap(), Phase::Solved);
        assert_eq!(controller.solution().len(), 5);
        assert_eq!(controller.grid().count(CellState::Visited), 0);
    }

    #[test]
    fn manual_play() {
        let mut controller = loaded(
            "
🟫🟫🟫🟫🟫
🟫🏃🟩🟩🟫
🟫🟫🟫🟩🟫
🟫🟩🟩❎🟫
🟫🟫🟫🟫🟫",
        );
        assert!(controller.move_player(Direction::Right).is_err());

        controller.begin_manual().unwrap();
        let start = Position::new(1, 1);
        assert_eq!(controller.player(), Some(start));
        assert_eq!(controller.grid().state_at(start).unwrap(), CellState::Frontier);

        assert_eq!(
            controller.move_player(Direction::Up).unwrap(),
            MoveOutcome::Blocked
        );
        assert_eq!(
            controller.move_player(Direction::Right).unwrap(),
            MoveOutcome::Moved(Position::new(1, 2))
        );
        assert_eq!(controller.grid().state_at(start).unwrap(), CellState::Visited);

        // Walking back over visited floor is allowed
        assert_eq!(
            controller.move_player(Direction::Left).unwrap(),
            MoveOutcome::Moved(start)
        );
        for direction in [Direction::Right, Direction::Right, Direction::Down] {
            assert!(matches!(
                controller.move_player(direction).unwrap(),
                MoveOutcome::Moved(_)
            ));
        }
        assert_eq!(
            controller.move_player(Direction::Down).unwrap(),
            MoveOutcome::ReachedExit
        );
        assert_eq!(controller.phase(), Phase::Solved);
        assert_eq!(
            controller.grid().state_at(Position::new(3, 3)).unwrap(),
            CellState::SolutionPath
        );
        assert!(controller.move_player(Direction::Left).is_err());
    }

    #[test]
    fn manual_play_on_generated_maze() {
        let mut controller = seeded(5, 5, 4);
        controller.generate().unwrap();

        // Walk the route the solver finds on a copy of the maze
        let mut copy = controller.grid().clone();
        MazeSolver::new()
            .solve_with(&mut copy, Position::new(1, 1), |_, _| ())
            .unwrap();
        let route = copy.positions(CellState::SolutionPath);
        assert_eq!(route.len(), 5);

        controller.begin_manual().unwrap();
        let mut outcome = MoveOutcome::Blocked;
        let mut pos = Position::new(1, 1);
        while outcome != MoveOutcome::ReachedExit {
            let direction = Direction::ALL
                .into_iter()
                .find(|&d| {
                    pos.step(d, 1).is_some_and(|p| {
                        route.contains(&p)
                            && controller.grid().state_at(p).unwrap() != CellState::Visited
                    })
                })
                .unwrap();
            outcome = controller.move_player(direction).unwrap();
            pos = controller.player().unwrap();
        }
        assert_eq!(pos, Position::new(3, 3));
        assert_eq!(controller.grid().count(CellState::Visited), 4);
    }
}
