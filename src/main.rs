//! Interactive maze game

use std::time::Duration;

use clap::Parser;
use log::debug;
use maze_runner::terminal::{self, ask_yes_no, direction_for_key, print_grid};
use maze_runner::{
    start_session, MoveOutcome, Phase, SessionConfig, SessionController, SessionEvent,
};

/// Generate a maze and watch it being solved, or solve it yourself
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze height, odd
    #[arg(long, default_value_t = 15)]
    rows: usize,

    /// Maze width, odd
    #[arg(long, default_value_t = 15)]
    cols: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Animation frame length in milliseconds, 0 to disable
    #[arg(short, long, default_value_t = 30)]
    frame_length: u64,

    /// Walk the maze yourself with w/a/s/d
    #[arg(short, long)]
    manual: bool,

    /// Quit after the first maze instead of offering a new one
    #[arg(long)]
    once: bool,

    /// Print debug messages
    #[arg(short, long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    terminal::init_logging(args.debug);

    let config = SessionConfig {
        seed: args.seed,
        frame_delay: Duration::from_millis(args.frame_length),
        ..SessionConfig::new(args.rows, args.cols)
    };
    if args.manual {
        play(config, args.once)
    } else {
        watch(config, args.once)
    }
}

/// Animate the solver on a worker thread
fn watch(config: SessionConfig, once: bool) -> anyhow::Result<()> {
    let handle = start_session(config)?;

    for event in handle.events().iter() {
        match event {
            SessionEvent::Redraw { grid, .. } => print_grid(&grid, None),
            SessionEvent::Finished {
                phase: Phase::Solved,
                solution,
            } => {
                println!(
                    "Exit found, the path is {} steps.",
                    solution.len().saturating_sub(1)
                );
                if !once && ask_yes_no("Generate a new maze?")? {
                    handle.request_regenerate();
                } else {
                    handle.request_stop();
                }
            }
            SessionEvent::Finished {
                phase: Phase::Unsolvable,
                ..
            } => println!("The exit cannot be reached."),
            SessionEvent::Finished { phase, .. } => debug!("Session ended in {:?}", phase),
            SessionEvent::Stopped => break,
        }
    }
    handle.join()
}

/// Let the player walk the maze, one line of moves at a time
fn play(config: SessionConfig, once: bool) -> anyhow::Result<()> {
    let mut controller = SessionController::new(&config)?;
    controller.generate()?;
    controller.begin_manual()?;
    let mut steps = 0;

    loop {
        print_grid(controller.grid(), None);
        println!("Steps: {}. Move with w/a/s/d, q to quit.", steps);
        let Some(line) = terminal::read_line()? else {
            controller.stop();
            return Ok(());
        };

        for key in line.trim().chars() {
            if key == 'q' {
                controller.stop();
                return Ok(());
            }
            let Some(direction) = direction_for_key(key) else {
                continue;
            };
            match controller.move_player(direction)? {
                MoveOutcome::Blocked => (),
                MoveOutcome::Moved(_) => steps += 1,
                MoveOutcome::ReachedExit => {
                    steps += 1;
                    print_grid(controller.grid(), None);
                    println!("You won in {} steps!", steps);
                    if once || !ask_yes_no("Play again?")? {
                        controller.stop();
                        return Ok(());
                    }
                    controller.generate()?;
                    controller.begin_manual()?;
                    steps = 0;
                    break;
                }
            }
        }
    }
}
