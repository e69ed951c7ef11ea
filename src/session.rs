//! The outer round loop: relax, report, repeat while the last delta is above
//! the threshold.
//!
//! In threshold mode the engine already loops until the delta is small enough,
//! so a session normally ends after its first round. In fixed-iteration mode
//! every round is one burst of `k` passes and the session keeps going until a
//! burst ends within the threshold. Every round measures its first pass
//! against 0, so with `k == 1` the reported delta is the whole grid sum.

use crate::d2::{Neighbours, RelaxError, Relaxation, Sources};
use crate::input::Problem;
use crate::output::write_snapshot;
use ndarray::Array2;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{info, instrument};

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Relax(#[from] RelaxError),

    #[error("delta {delta} still above the threshold after {rounds} rounds")]
    RoundLimit { rounds: usize, delta: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub struct Session<F> {
    relaxation: Relaxation<F>,
    threshold: f64,
    max_rounds: Option<usize>,
}

impl<F> Session<F>
where
    F: Fn(f64, Neighbours) -> f64,
{
    pub fn new(relaxation: Relaxation<F>, threshold: f64) -> Self {
        Self {
            relaxation,
            threshold,
            max_rounds: None,
        }
    }

    /// A session with `update` under the settings read from `problem`.
    pub fn for_problem(update: F, problem: &Problem) -> Self {
        let relaxation = Relaxation::new(update, problem.boundary, problem.termination());
        Self::new(relaxation, problem.threshold)
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.relaxation = self.relaxation.with_max_passes(max_passes);
        self
    }

    /// Run rounds until one ends with `|delta| <= threshold`, handing every
    /// round's grid and delta to `on_round`. Returns the number of rounds.
    #[instrument(skip_all)]
    pub fn run<S>(&self, grid: &mut Array2<f64>, sources: &Sources, mut on_round: S) -> Result<usize>
    where
        S: FnMut(&Array2<f64>, f64) -> io::Result<()>,
    {
        let mut rounds = 0;

        loop {
            let delta = self.relaxation.run(grid, sources)?;
            rounds += 1;
            info!(round = rounds, delta, "round finished");

            on_round(grid, delta)?;

            if !(delta.abs() > self.threshold) {
                return Ok(rounds);
            }
            if let Some(max_rounds) = self.max_rounds {
                if rounds >= max_rounds {
                    return Err(SessionError::RoundLimit { rounds, delta });
                }
            }
        }
    }

    /// [`Session::run`] printing every round with [`write_snapshot`].
    pub fn write_to<W: Write>(
        &self,
        grid: &mut Array2<f64>,
        sources: &Sources,
        out: &mut W,
    ) -> Result<usize> {
        self.run(grid, sources, |grid, delta| write_snapshot(&mut *out, grid, delta))
    }
}
