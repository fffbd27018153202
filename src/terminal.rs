//! Terminal helpers shared by the binaries

use std::io::{self, Write};

use log::LevelFilter;

use crate::grid::{Direction, Grid, Position};

/// Initialize logging from `RUST_LOG`, or at debug level if `debug` is set
pub fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// Clear the screen and print the grid
pub fn print_grid(grid: &Grid, marker: Option<Position>) {
    print!("\x1B[2J\x1B[1;1H");
    println!("{}", grid.to_emojis(marker));
}

/// Read one line from stdin, `None` at end of input
pub fn read_line() -> io::Result<Option<String>> {
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf)? {
        0 => Ok(None),
        _ => Ok(Some(buf)),
    }
}

/// Ask a yes/no question; anything but a yes is a no
pub fn ask_yes_no(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    Ok(read_line()?.is_some_and(|answer| is_yes(&answer)))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Movement key, WASD or vi style
pub fn direction_for_key(key: char) -> Option<Direction> {
    match key.to_ascii_lowercase() {
        'w' | 'k' => Some(Direction::Up),
        's' | 'j' => Some(Direction::Down),
        'a' | 'h' => Some(Direction::Left),
        'd' | 'l' => Some(Direction::Right),
        _ => None,
    }
}
