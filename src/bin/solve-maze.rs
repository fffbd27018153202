//! CLI for maze solving

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    thread,
    time::Duration,
};

use clap::Parser;
use maze_runner::terminal::{self, print_grid};
use maze_runner::{Grid, Phase, SessionController};

/// Find the way out of a maze
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Display the search on the terminal
    #[arg(short, long)]
    playback: bool,

    /// Playback frame length in milliseconds
    #[arg(short, long, default_value_t = 300)]
    frame_length: u64,

    /// Print debug messages
    #[arg(short, long)]
    debug: bool,

    /// File, where to read the maze. Use `-` for stdin.
    file: PathBuf,
}

/// Read maze from file, print output
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    terminal::init_logging(args.debug);

    let emojis = if args.file.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(args.file)?
    };
    let maze = Grid::parse_emojis(&emojis)?;

    let mut controller = SessionController::from_maze(maze.grid, maze.start)?;

    let frame = Duration::from_millis(args.frame_length);
    let phase = controller.solve(|grid, _| {
        if args.playback {
            print_grid(grid, None);
            thread::sleep(frame);
        }
    })?;

    if !args.playback {
        println!("{}", controller.grid());
    }
    match phase {
        Phase::Solved => println!(
            "The exit is {} steps away.",
            controller.solution().len().saturating_sub(1)
        ),
        _ => println!("The exit cannot be reached."),
    }
    Ok(())
}
