//! Substitution model algebra.
//!
//! - [`rate_matrix`]: generator matrices and transition probabilities.
//! - [`substitution`]: single named models.
//! - [`mixture`]: weighted collections of models.
//! - [`gamma`]: discrete gamma rate heterogeneity.
//!
//! [`PhyloModel`] is the value the simulator consumes: either one model or a
//! mixture.

pub mod gamma;
pub mod mixture;
pub mod rate_matrix;
pub mod substitution;

use serde::Serialize;

use crate::base::Alphabet;
use crate::errors::ModelError;

pub use mixture::{MixtureComponent, MixtureModel};
pub use substitution::SubstitutionModel;

/// A phylogenetic model: a single substitution model or a mixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhyloModel {
    Single(SubstitutionModel),
    Mixture(MixtureModel),
}

impl PhyloModel {
    pub fn name(&self) -> &str {
        match self {
            Self::Single(model) => model.name(),
            Self::Mixture(mixture) => mixture.name(),
        }
    }

    pub fn alphabet(&self) -> Result<Alphabet, ModelError> {
        match self {
            Self::Single(model) => Ok(model.alphabet()),
            Self::Mixture(mixture) => mixture.alphabet(),
        }
    }

    /// Check model invariants. Single models are validated on construction.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Self::Single(_) => Ok(()),
            Self::Mixture(mixture) => mixture.validate(),
        }
    }

    pub fn total_rate(&self) -> f64 {
        match self {
            Self::Single(model) => model.total_rate(),
            Self::Mixture(mixture) => mixture.total_rate(),
        }
    }

    pub fn normalize(&self) -> Result<Self, ModelError> {
        Ok(match self {
            Self::Single(model) => Self::Single(model.normalize()?),
            Self::Mixture(mixture) => Self::Mixture(mixture.normalize()?),
        })
    }

    /// Expand into `n` discrete gamma rate categories with shape `alpha`.
    ///
    /// The result is always a mixture.
    pub fn expand_gamma(&self, n: usize, alpha: f64, tolerance: f64) -> Result<Self, ModelError> {
        let expanded = match self {
            Self::Single(model) => gamma::expand_substitution_model(n, alpha, model, tolerance)?,
            Self::Mixture(mixture) => gamma::expand_mixture_model(n, alpha, mixture, tolerance)?,
        };
        Ok(Self::Mixture(expanded))
    }

    /// Components with their relative weights; a single model is one
    /// component of weight one.
    pub fn weighted_components(&self) -> Vec<(f64, &SubstitutionModel)> {
        match self {
            Self::Single(model) => vec![(1.0, model)],
            Self::Mixture(mixture) => mixture
                .components()
                .iter()
                .map(|c| (c.weight, &c.model))
                .collect(),
        }
    }

    pub fn summarize(&self) -> Vec<String> {
        match self {
            Self::Single(model) => model.summarize(),
            Self::Mixture(mixture) => mixture.summarize(),
        }
    }
}

impl From<SubstitutionModel> for PhyloModel {
    fn from(model: SubstitutionModel) -> Self {
        Self::Single(model)
    }
}

impl From<MixtureModel> for PhyloModel {
    fn from(mixture: MixtureModel) -> Self {
        Self::Mixture(mixture)
    }
}
