//! Background worker running a session for a display thread
//!
//! The worker owns the [SessionController]. The display side only ever sees
//! grid snapshots sent over a channel, and talks back with [Command]s.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::anyhow;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

use crate::config::SessionConfig;
use crate::error::MazeError;
use crate::grid::{Grid, Position};
use crate::maze_solver::CellChange;
use crate::session::{Phase, SessionController};

/// Request from the display thread
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Command {
    Regenerate,
    Stop,
}

/// Notification to the display thread
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// Grid changed; `change` is `None` when the whole maze was replaced
    Redraw {
        grid: Grid,
        change: Option<CellChange>,
    },
    /// Solve ended. On [Phase::Solved] the worker waits for a [Command].
    Finished {
        phase: Phase,
        solution: Vec<Position>,
    },
    /// Worker is done, no more events follow
    Stopped,
}

/// Display-side end of a running session
pub struct SessionHandle {
    commands: Sender<Command>,
    events: Receiver<SessionEvent>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<(), MazeError>>>,
}

/// Validate `config` and start generating and solving mazes on a worker
/// thread
pub fn start_session(config: SessionConfig) -> Result<SessionHandle, MazeError> {
    let controller = SessionController::new(&config)?;
    let cancel = controller.cancel_flag();
    let (command_tx, command_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();

    let frame_delay = config.frame_delay;
    let worker = thread::spawn(move || run_worker(controller, frame_delay, command_rx, event_tx));

    Ok(SessionHandle {
        commands: command_tx,
        events: event_rx,
        cancel,
        worker: Some(worker),
    })
}

/// Worker loop
///
/// Event sends only fail once the display side has dropped its receiver. The
/// worker then keeps going until its command channel closes as well.
fn run_worker(
    mut controller: SessionController,
    frame_delay: Duration,
    commands: Receiver<Command>,
    events: Sender<SessionEvent>,
) -> Result<(), MazeError> {
    loop {
        controller.generate()?;
        let _ = events.send(SessionEvent::Redraw {
            grid: controller.grid().clone(),
            change: None,
        });

        let phase = controller.solve(|grid, change| {
            let _ = events.send(SessionEvent::Redraw {
                grid: grid.clone(),
                change: Some(change),
            });
            if !frame_delay.is_zero() {
                thread::sleep(frame_delay);
            }
        })?;
        let _ = events.send(SessionEvent::Finished {
            phase,
            solution: controller.solution().to_vec(),
        });

        if phase != Phase::Solved {
            break;
        }
        match commands.recv() {
            Ok(Command::Regenerate) => debug!("New maze requested"),
            Ok(Command::Stop) | Err(_) => {
                controller.stop();
                break;
            }
        }
    }
    let _ = events.send(SessionEvent::Stopped);
    Ok(())
}

impl SessionHandle {
    /// Events from the worker, in order
    pub fn events(&self) -> &Receiver<SessionEvent> {
        &self.events
    }

    /// Generate a new maze once the current one is solved
    pub fn request_regenerate(&self) {
        if self.commands.send(Command::Regenerate).is_err() {
            debug!("Session worker already gone");
        }
    }

    /// Stop the session, interrupting a running solve
    pub fn request_stop(&self) {
        self.cancel.store(true, Ordering::Relaxed);
        if self.commands.send(Command::Stop).is_err() {
            debug!("Session worker already gone");
        }
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> anyhow::Result<()> {
        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| anyhow!("Session worker panicked"))?
                .map_err(anyhow::Error::from),
            None => Ok(()),
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}
