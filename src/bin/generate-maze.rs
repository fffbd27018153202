//! CLI for maze generation

use clap::Parser;
use maze_runner::maze_generator::{default_exit, validate_layout};
use maze_runner::{terminal, Grid, MazeGenerator, Position};

/// Print a perfect maze, readable by `solve-maze`
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Generated field height, odd
    #[arg(long, default_value_t = 19)]
    height: usize,

    /// Generated field width, odd
    #[arg(long, default_value_t = 15)]
    width: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

/// Generate maze, print output
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    terminal::init_logging(false);

    let start = Position::new(1, 1);
    let exit = default_exit(args.height, args.width);
    validate_layout(args.height, args.width, start, exit)?;

    let mut grid = Grid::new(args.height, args.width)?;
    MazeGenerator::new(args.seed).generate_with_exit(&mut grid, start, exit)?;
    println!("{}", grid.to_emojis(Some(start)));
    Ok(())
}
