use std::any::Any;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use solver::{CancelToken, Game, ParityGameSolver, Solution, SolveError};

/// Outcome of [`timed_solve`].
#[derive(Debug)]
pub enum Timing {
    Solved { solution: Solution, elapsed: Duration },
    Timeout,
    OutOfMemory,
    Failed(String),
}

impl Timing {
    /// Elapsed milliseconds for a solved game, otherwise `-1` for a timeout,
    /// `-2` for running out of memory and `-3` for any other failure.
    pub fn code(&self) -> i64 {
        match self {
            Timing::Solved { elapsed, .. } => {
                i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
            }
            Timing::Timeout => -1,
            Timing::OutOfMemory => -2,
            Timing::Failed(_) => -3,
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Timing::Solved { solution, .. } => Some(solution),
            _ => None,
        }
    }
}

/// Runs `solver` on a worker thread, cancelling it once `timeout` expires.
pub fn timed_solve<S>(solver: S, game: Game, timeout: Option<Duration>) -> Timing
where
    S: ParityGameSolver + Send + 'static,
{
    let name = solver.name();
    let cancel = CancelToken::new();
    let (tx, rx) = mpsc::channel();

    let worker = thread::Builder::new().name(format!("solve-{name}")).spawn({
        let cancel = cancel.clone();
        move || {
            let now = Instant::now();
            let result = solver.solve(&game, &cancel);
            // The receiver is gone only after a timeout.
            let _ = tx.send((result, now.elapsed()));
        }
    });
    let worker = match worker {
        Ok(worker) => worker,
        Err(e) => return Timing::Failed(format!("failed to spawn worker: {e}")),
    };

    let received = match timeout {
        Some(timeout) => rx.recv_timeout(timeout),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };

    match received {
        Ok((Ok(solution), elapsed)) => {
            debug!("{name}: solved in {elapsed:?}");
            let _ = worker.join();
            Timing::Solved { solution, elapsed }
        }
        Ok((Err(SolveError::Cancelled), _)) => Timing::Timeout,
        Ok((Err(e), _)) => Timing::Failed(e.to_string()),
        Err(RecvTimeoutError::Timeout) => {
            warn!("{name}: timed out, cancelling");
            cancel.cancel();
            let _ = worker.join();
            Timing::Timeout
        }
        Err(RecvTimeoutError::Disconnected) => match worker.join() {
            Ok(()) => Timing::Failed("worker exited without a result".to_owned()),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("{name}: worker panicked: {message}");
                match is_allocation_failure(&message) {
                    true => Timing::OutOfMemory,
                    false => Timing::Failed(message),
                }
            }
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

fn is_allocation_failure(message: &str) -> bool {
    message.contains("capacity overflow") || message.contains("memory allocation")
}
