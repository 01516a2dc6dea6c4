//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use seqevo_sim::prelude::*;
//!
//! let model: PhyloModel = SubstitutionModel::jc().unwrap().into();
//! let expanded = model.expand_gamma(4, 0.5, DEFAULT_TOLERANCE).unwrap();
//! assert_eq!(expanded.weighted_components().len(), 4);
//! ```

pub use crate::base::{AlignedSequence, Alignment, Alphabet, State};
pub use crate::errors::{self, AlignmentError, ConfigError, ModelError, SimulationError, TreeError};
pub use crate::model::gamma::DEFAULT_TOLERANCE;
pub use crate::model::{MixtureComponent, MixtureModel, PhyloModel, SubstitutionModel};
pub use crate::simulation::{RunConfig, Simulation, SimulationBuilder, SimulationOutput};
pub use crate::tree::{Node, Tree};
