//! Heat diffusion over a dense 2D grid by in-place relaxation.
//!
//! [`d2`] holds the engine. [`input`], [`output`] and [`session`] read a
//! problem description, print snapshots and drive the round loop around it.

pub mod d2;
pub mod input;
pub mod output;
pub mod session;
