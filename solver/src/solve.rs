use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::game::Game;
use crate::solution::Solution;

/// An algorithm computing the winning regions of a parity game.
pub trait ParityGameSolver {
    fn name(&self) -> &'static str;

    /// Solves the active part of `game`. The solver polls `cancel` between
    /// steps and gives up with [`SolveError::Cancelled`] once it is set.
    fn solve(&self, game: &Game, cancel: &CancelToken) -> Result<Solution, SolveError>;
}

impl<S: ParityGameSolver + ?Sized> ParityGameSolver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, game: &Game, cancel: &CancelToken) -> Result<Solution, SolveError> {
        (**self).solve(game, cancel)
    }
}

/// Shared flag used to stop a running solver from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<(), SolveError> {
        match self.is_cancelled() {
            true => Err(SolveError::Cancelled),
            false => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveError {
    Cancelled,
    /// Strategy improvement did not stabilise within the given number of
    /// iterations.
    IterationLimit(usize),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Cancelled => f.write_str("solving was cancelled"),
            SolveError::IterationLimit(n) => {
                write!(f, "strategy did not stabilise after {n} iterations")
            }
        }
    }
}

impl std::error::Error for SolveError {}
