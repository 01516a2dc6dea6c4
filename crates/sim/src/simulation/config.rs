//! Run configuration.
//!
//! A [`RunConfig`] describes a complete simulation run and can be read from
//! JSON, so a run can be reproduced from a single file:
//!
//! ```json
//! {
//!   "tree": {"value": {"label": "root"}, "children": [
//!     {"value": {"label": "A", "branch_length": 0.1}},
//!     {"value": {"label": "B", "branch_length": 0.2}}
//!   ]},
//!   "model": {"type": "hky", "kappa": 2.0, "frequencies": [0.1, 0.2, 0.3, 0.4]},
//!   "gamma": {"categories": 4, "shape": 0.5},
//!   "sites": 1000,
//!   "seed": [1, 2, 3]
//! }
//! ```

use std::fs;
use std::path::Path;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::base::Alphabet;
use crate::errors::{ConfigError, ModelError};
use crate::model::gamma::DEFAULT_TOLERANCE;
use crate::model::{MixtureComponent, MixtureModel, PhyloModel, SubstitutionModel};
use crate::simulation::builder::{SimulationBuilder, DEFAULT_SITES};
use crate::tree::{Node, Tree};

/// Description of a model, resolved by [`ModelSpec::build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    Jc,
    F81 {
        frequencies: Vec<f64>,
    },
    Hky {
        kappa: f64,
        frequencies: Vec<f64>,
    },
    Gtr4 {
        /// A↔C, A↔G, A↔T, C↔G, C↔T, G↔T.
        rates: [f64; 6],
        frequencies: Vec<f64>,
    },
    Poisson,
    PoissonCustom {
        frequencies: Vec<f64>,
    },
    Custom {
        alphabet: Alphabet,
        name: String,
        #[serde(default)]
        params: Vec<f64>,
        /// Row-major `k×k` matrix.
        exchangeability: Vec<Vec<f64>>,
        frequencies: Vec<f64>,
        #[serde(default = "default_normalize")]
        normalize: bool,
    },
    Mixture {
        name: String,
        components: Vec<ComponentSpec>,
    },
}

/// One weighted component of a mixture specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub weight: f64,
    pub model: ModelSpec,
}

/// Discrete gamma rate heterogeneity settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaSpec {
    pub categories: usize,
    pub shape: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

/// A complete simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub tree: Tree<Node>,
    pub model: ModelSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<GammaSpec>,
    #[serde(default = "default_sites")]
    pub sites: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
}

fn default_normalize() -> bool {
    true
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_sites() -> usize {
    DEFAULT_SITES
}

impl GammaSpec {
    pub fn new(categories: usize, shape: f64) -> Self {
        Self {
            categories,
            shape,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ModelSpec {
    /// Resolve the specification into a model.
    pub fn build(&self) -> Result<PhyloModel, ModelError> {
        match self {
            Self::Mixture { name, components } => {
                let components = components
                    .iter()
                    .map(|c| Ok(MixtureComponent::new(c.weight, c.model.build_single()?)))
                    .collect::<Result<Vec<_>, ModelError>>()?;
                Ok(PhyloModel::Mixture(MixtureModel::new(name.clone(), components)?))
            }
            other => Ok(PhyloModel::Single(other.build_single()?)),
        }
    }

    fn build_single(&self) -> Result<SubstitutionModel, ModelError> {
        match self {
            Self::Jc => SubstitutionModel::jc(),
            Self::F81 { frequencies } => SubstitutionModel::f81(frequencies),
            Self::Hky { kappa, frequencies } => SubstitutionModel::hky(*kappa, frequencies),
            Self::Gtr4 { rates, frequencies } => SubstitutionModel::gtr4(*rates, frequencies),
            Self::Poisson => SubstitutionModel::poisson(),
            Self::PoissonCustom { frequencies } => SubstitutionModel::poisson_custom(frequencies),
            Self::Custom {
                alphabet,
                name,
                params,
                exchangeability,
                frequencies,
                normalize,
            } => {
                let k = frequencies.len();
                if let Some(row) = exchangeability.iter().find(|row| row.len() != k) {
                    return Err(ModelError::DimensionMismatch {
                        model: name.clone(),
                        expected: k,
                        found: row.len(),
                    });
                }
                let matrix = DMatrix::from_fn(exchangeability.len(), k, |i, j| exchangeability[i][j]);
                let stationary = DVector::from_row_slice(frequencies);
                if *normalize {
                    SubstitutionModel::new(*alphabet, name.clone(), params.clone(), stationary, matrix)
                } else {
                    SubstitutionModel::unnormalized(*alphabet, name.clone(), params.clone(), stationary, matrix)
                }
            }
            Self::Mixture { name, .. } => Err(ModelError::InvalidParameter(format!(
                "mixture '{name}' cannot be a component of another mixture"
            ))),
        }
    }
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The model of the run, gamma-expanded if requested.
    pub fn build_model(&self) -> Result<PhyloModel, ModelError> {
        let model = self.model.build()?;
        match &self.gamma {
            Some(gamma) => model.expand_gamma(gamma.categories, gamma.shape, gamma.tolerance),
            None => Ok(model),
        }
    }

    /// A builder with every setting of this configuration applied.
    pub fn into_builder(self) -> Result<SimulationBuilder, ConfigError> {
        let mut builder = SimulationBuilder::new()
            .model(self.build_model()?)
            .tree(self.tree)
            .sites(self.sites);
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(chunks) = self.chunks {
            builder = builder.chunks(chunks);
        }
        Ok(builder)
    }
}
