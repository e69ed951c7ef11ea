use super::boundary::{neighbours, Boundary, Neighbours};
use super::sources::Sources;
use ndarray::Array2;
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing::{debug, trace};

/// When the convergence driver stops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Termination {
    /// Run exactly this many passes.
    FixedIterations(NonZeroUsize),
    /// Run until the per-pass change of the grid sum is at most this in magnitude.
    Threshold(f64),
}

impl Termination {
    /// `max_iterations == 0` means "use the threshold".
    pub fn new(threshold: f64, max_iterations: usize) -> Self {
        match NonZeroUsize::new(max_iterations) {
            Some(k) => Termination::FixedIterations(k),
            None => Termination::Threshold(threshold),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RelaxError {
    #[error("no convergence after {passes} passes (last delta {delta})")]
    NotConverged { passes: usize, delta: f64 },
}

/// One Gauss-Seidel pass over `grid`, returning the grid sum afterwards.
///
/// Columns `y` are the outer loop and rows `x` the inner one. Each non-source
/// cell is overwritten as soon as it is computed, so cells visited later in the
/// same pass see the new values of their already visited neighbours. The
/// result depends on this order.
pub fn pass<F>(update: F, grid: &mut Array2<f64>, sources: &Sources, boundary: Boundary) -> f64
where
    F: Fn(f64, Neighbours) -> f64,
{
    assert_eq!(grid.dim(), sources.dim());

    let (n, m) = grid.dim();
    let mut sum = 0.0;

    for y in 0..m {
        for x in 0..n {
            if !sources.is_source(x, y) {
                let nb = neighbours(grid, boundary, x, y);
                grid[[x, y]] = update(grid[[x, y]], nb);
            }
            sum += grid[[x, y]];
        }
    }

    sum
}

/// Consecutive passes over one grid, tracking the previous sum.
struct Sweep<'a, F> {
    update: F,
    grid: &'a mut Array2<f64>,
    sources: &'a Sources,
    boundary: Boundary,
    sum: f64,
    passes: usize,
}

impl<'a, F> Sweep<'a, F>
where
    F: Fn(f64, Neighbours) -> f64,
{
    fn new(update: F, grid: &'a mut Array2<f64>, sources: &'a Sources, boundary: Boundary) -> Self {
        Self {
            update,
            grid,
            sources,
            boundary,
            sum: 0.0,
            passes: 0,
        }
    }

    /// Run one pass and return its delta. The first pass is measured against 0.
    fn step(&mut self) -> f64 {
        let sum = pass(&self.update, self.grid, self.sources, self.boundary);
        let delta = sum - self.sum;

        self.sum = sum;
        self.passes += 1;
        trace!(pass = self.passes, sum, delta, "relaxation pass");

        delta
    }

    fn fixed(&mut self, k: NonZeroUsize) -> f64 {
        let mut delta = self.step();
        for _ in 1..k.get() {
            delta = self.step();
        }
        delta
    }
}

/// Relax `grid` in place and return the delta of the last pass.
///
/// With [`Termination::FixedIterations`] exactly `k` passes run. With
/// [`Termination::Threshold`] passes run until `|delta| <= threshold`, at least
/// once; an update rule that never settles keeps this looping forever, see
/// [`run_capped`] for a bounded variant.
pub fn run<F>(
    update: F,
    grid: &mut Array2<f64>,
    sources: &Sources,
    boundary: Boundary,
    termination: Termination,
) -> f64
where
    F: Fn(f64, Neighbours) -> f64,
{
    let mut sweep = Sweep::new(update, grid, sources, boundary);

    let delta = match termination {
        Termination::FixedIterations(k) => sweep.fixed(k),
        Termination::Threshold(threshold) => {
            let mut delta = sweep.step();
            while delta.abs() > threshold {
                delta = sweep.step();
            }
            delta
        }
    };

    debug!(passes = sweep.passes, delta, "relaxation finished");
    delta
}

/// Like [`run`], but threshold mode gives up after `max_passes` passes.
///
/// Fixed-iteration mode is not affected by the cap.
pub fn run_capped<F>(
    update: F,
    grid: &mut Array2<f64>,
    sources: &Sources,
    boundary: Boundary,
    termination: Termination,
    max_passes: usize,
) -> Result<f64, RelaxError>
where
    F: Fn(f64, Neighbours) -> f64,
{
    let mut sweep = Sweep::new(update, grid, sources, boundary);

    let delta = match termination {
        Termination::FixedIterations(k) => sweep.fixed(k),
        Termination::Threshold(threshold) => {
            let mut delta = sweep.step();
            while delta.abs() > threshold {
                if sweep.passes >= max_passes {
                    debug!(passes = sweep.passes, delta, "relaxation hit the pass cap");
                    return Err(RelaxError::NotConverged {
                        passes: sweep.passes,
                        delta,
                    });
                }
                delta = sweep.step();
            }
            delta
        }
    };

    debug!(passes = sweep.passes, delta, "relaxation finished");
    Ok(delta)
}

/// An update rule together with the settings it is run under.
#[derive(Clone, Debug)]
pub struct Relaxation<F> {
    update: F,
    boundary: Boundary,
    termination: Termination,
    max_passes: Option<usize>,
}

impl<F> Relaxation<F>
where
    F: Fn(f64, Neighbours) -> f64,
{
    pub fn new(update: F, boundary: Boundary, termination: Termination) -> Self {
        Self {
            update,
            boundary,
            termination,
            max_passes: None,
        }
    }

    /// Bound threshold mode to `max_passes` passes per invocation.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = Some(max_passes);
        self
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// One invocation of the convergence driver.
    pub fn run(&self, grid: &mut Array2<f64>, sources: &Sources) -> Result<f64, RelaxError> {
        match self.max_passes {
            Some(max_passes) => run_capped(
                &self.update,
                grid,
                sources,
                self.boundary,
                self.termination,
                max_passes,
            ),
            None => Ok(run(
                &self.update,
                grid,
                sources,
                self.boundary,
                self.termination,
            )),
        }
    }
}
