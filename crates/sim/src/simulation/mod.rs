//! Simulation of alignments along a tree.
//!
//! - `Simulation`: a validated run that produces a [`SimulationOutput`].
//! - `SimulationBuilder`: fluent builder for `Simulation` with defaults.
//! - `TreeSampler`: the Markov process along a tree, for single-threaded use.
//! - `RunConfig`: serde form of a complete run.
//! - [`streams`]: seed handling and deterministic stream splitting.

pub mod builder;
pub mod config;
pub mod engine;
pub mod markov;
pub mod streams;

pub use builder::SimulationBuilder;
pub use config::{ComponentSpec, GammaSpec, ModelSpec, RunConfig};
pub use engine::{Simulation, SimulationOutput};
pub use markov::{simulate_alignment, SiteBlock, TreeSampler};
pub use streams::{chunk_sizes, run_parallel, split_streams, RootSeed, Stream};
