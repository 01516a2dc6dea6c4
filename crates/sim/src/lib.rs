//! # Simulation Crate
//!
//! The `seqevo_sim` crate simulates multiple sequence alignments by running a
//! continuous-time Markov substitution process along a rooted tree. It
//! provides substitution and mixture models, discrete gamma rate
//! heterogeneity, and a parallel simulator whose output is reproducible from
//! a seed.

pub mod base;
pub mod errors;
pub mod model;
pub mod numerics;
pub mod prelude;
pub mod simulation;
pub mod tree;

pub use base::{Alignment, Alphabet};
pub use model::PhyloModel;
