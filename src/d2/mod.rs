//! Relaxation of a dense 2D temperature grid.
//!
//! The grid is an `Array2<f64>` of shape `(n, m)`: `x` indexes rows and `y`
//! columns. Passes update it in place, see [`pass`] for the traversal order.

mod boundary;
mod relax;
mod sources;

pub use boundary::{neighbours, Boundary, Neighbours};
pub use relax::{pass, run, run_capped, RelaxError, Relaxation, Termination};
pub use sources::{try_filled, SourceOutOfRange, SourcePoint, Sources};

/// Discrete heat equation: moves a cell a quarter of the way towards each neighbour.
///
/// `this + 0.25 * (right + top + left + bottom - 4 * this)`, which is the
/// average of the four neighbours.
pub fn heat_eqn(this: f64, nb: Neighbours) -> f64 {
    this + 0.25 * (nb.sum() - 4.0 * this)
}
