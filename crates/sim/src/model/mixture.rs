//! Mixture models: weighted collections of substitution models.
//!
//! A mixture represents site-to-site model heterogeneity. Each site of an
//! alignment evolves under one component, chosen with probability
//! proportional to the component's weight. Weights are relative and need not
//! sum to one.

use serde::Serialize;

use crate::base::Alphabet;
use crate::errors::ModelError;
use crate::model::substitution::{format_values, SubstitutionModel};

/// One weighted component of a mixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixtureComponent {
    pub weight: f64,
    pub model: SubstitutionModel,
}

impl MixtureComponent {
    pub fn new(weight: f64, model: SubstitutionModel) -> Self {
        Self { weight, model }
    }
}

/// A named, non-empty list of weighted substitution models over one alphabet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixtureModel {
    name: String,
    components: Vec<MixtureComponent>,
}

impl MixtureModel {
    /// Create a mixture from components.
    ///
    /// # Errors
    /// Fails if the list is empty, a weight is negative or not finite, all
    /// weights are zero, or components disagree on the alphabet.
    pub fn new(name: impl Into<String>, components: Vec<MixtureComponent>) -> Result<Self, ModelError> {
        let mixture = Self {
            name: name.into(),
            components,
        };
        mixture.validate()?;
        Ok(mixture)
    }

    /// Pair weights and models positionally.
    ///
    /// # Errors
    /// Returns [`ModelError::LengthMismatch`] if the lists differ in length,
    /// otherwise the errors of [`MixtureModel::new`].
    pub fn from_components(
        name: impl Into<String>,
        weights: &[f64],
        models: Vec<SubstitutionModel>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if weights.len() != models.len() {
            return Err(ModelError::LengthMismatch {
                name,
                left: weights.len(),
                right: models.len(),
            });
        }
        let components = weights
            .iter()
            .zip(models)
            .map(|(&weight, model)| MixtureComponent::new(weight, model))
            .collect();
        Self::new(name, components)
    }

    /// Flatten several mixtures into one.
    ///
    /// Every component keeps its weight and model; order is the order of
    /// `mixtures`, then the order within each mixture.
    pub fn concatenate(name: impl Into<String>, mixtures: Vec<MixtureModel>) -> Result<Self, ModelError> {
        let components = mixtures.into_iter().flat_map(|m| m.components).collect();
        Self::new(name, components)
    }

    /// Check the mixture invariants.
    ///
    /// The simulator calls this before every run and refuses to proceed on
    /// failure.
    pub fn validate(&self) -> Result<(), ModelError> {
        let first = self
            .components
            .first()
            .ok_or_else(|| ModelError::EmptyMixture(self.name.clone()))?;
        let expected = first.model.alphabet();

        for (i, component) in self.components.iter().enumerate() {
            if !component.weight.is_finite() || component.weight < 0.0 {
                return Err(ModelError::NegativeWeight {
                    mixture: self.name.clone(),
                    component: i,
                    weight: component.weight,
                });
            }
            let found = component.model.alphabet();
            if found != expected {
                return Err(ModelError::InconsistentAlphabet {
                    mixture: self.name.clone(),
                    component: i,
                    expected,
                    found,
                });
            }
        }

        if self.total_weight() <= 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "mixture '{}' has only zero weights",
                self.name
            )));
        }
        Ok(())
    }

    /// Whether [`MixtureModel::validate`] succeeds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn components(&self) -> &[MixtureComponent] {
        &self.components
    }

    pub fn weights(&self) -> Vec<f64> {
        self.components.iter().map(|c| c.weight).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Alphabet shared by all components.
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyMixture`] for a mixture without components.
    pub fn alphabet(&self) -> Result<Alphabet, ModelError> {
        self.components
            .first()
            .map(|c| c.model.alphabet())
            .ok_or_else(|| ModelError::EmptyMixture(self.name.clone()))
    }

    fn total_weight(&self) -> f64 {
        self.components.iter().map(|c| c.weight).sum()
    }

    /// Weight-averaged total rate of the components.
    pub fn total_rate(&self) -> f64 {
        let total_weight = self.total_weight();
        self.components
            .iter()
            .map(|c| c.weight * c.model.total_rate())
            .sum::<f64>()
            / total_weight
    }

    /// Scale every component by `factor`; weights are untouched.
    pub fn scale(&self, factor: f64) -> Result<Self, ModelError> {
        let components = self
            .components
            .iter()
            .map(|c| Ok(MixtureComponent::new(c.weight, c.model.scale(factor)?)))
            .collect::<Result<Vec<_>, ModelError>>()?;
        Ok(Self {
            name: self.name.clone(),
            components,
        })
    }

    /// Rescale all components by one common factor so that
    /// [`MixtureModel::total_rate`] is one.
    ///
    /// Relative rates between components are preserved.
    pub fn normalize(&self) -> Result<Self, ModelError> {
        let rate = self.total_rate();
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "mixture '{}' has total rate {rate} and cannot be normalized",
                self.name
            )));
        }
        self.scale(1.0 / rate)
    }

    /// Append `suffix` to the name of every component.
    pub fn append_name(&self, suffix: &str) -> Self {
        Self {
            name: self.name.clone(),
            components: self
                .components
                .iter()
                .map(|c| MixtureComponent::new(c.weight, c.model.append_name(suffix)))
                .collect(),
        }
    }

    /// Human-readable description, one line per entry.
    pub fn summarize(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Mixture model: {}", self.name),
            format!("Number of components: {}", self.components.len()),
            format!("Weights: {}", format_values(&self.weights())),
        ];
        for (i, component) in self.components.iter().enumerate() {
            lines.push(format!("Component {} (weight {:.6}):", i + 1, component.weight));
            lines.extend(component.model.summarize().into_iter().map(|l| format!("  {l}")));
        }
        lines.push(format!("Average total rate: {:.6}", self.total_rate()));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_component() -> MixtureModel {
        MixtureModel::from_components(
            "mix",
            &[1.0, 3.0],
            vec![
                SubstitutionModel::jc().unwrap(),
                SubstitutionModel::hky(4.0, &[0.1, 0.2, 0.3, 0.4]).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_components_pairs_positionally() {
        let mix = two_component();
        assert_eq!(mix.len(), 2);
        assert_eq!(mix.weights(), vec![1.0, 3.0]);
        assert_eq!(mix.components()[1].model.name(), "HKY");
        assert_eq!(mix.alphabet().unwrap(), Alphabet::Dna);
    }

    #[test]
    fn test_from_components_length_mismatch() {
        let err = MixtureModel::from_components("m", &[1.0], vec![]).unwrap_err();
        assert_eq!(
            err,
            ModelError::LengthMismatch {
                name: "m".to_string(),
                left: 1,
                right: 0
            }
        );
    }

    #[test]
    fn test_empty_mixture_rejected() {
        assert_eq!(
            MixtureModel::new("none", vec![]).unwrap_err(),
            ModelError::EmptyMixture("none".to_string())
        );
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = MixtureModel::from_components(
            "neg",
            &[1.0, -2.0],
            vec![SubstitutionModel::jc().unwrap(), SubstitutionModel::jc().unwrap()],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::NegativeWeight { component: 1, .. }));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let err = MixtureModel::from_components("zero", &[0.0], vec![SubstitutionModel::jc().unwrap()])
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter(_)));
    }

    #[test]
    fn test_inconsistent_alphabet_rejected() {
        let err = MixtureModel::from_components(
            "mixed",
            &[1.0, 1.0],
            vec![SubstitutionModel::jc().unwrap(), SubstitutionModel::poisson().unwrap()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::InconsistentAlphabet {
                component: 1,
                expected: Alphabet::Dna,
                found: Alphabet::Protein,
                ..
            }
        ));
    }

    #[test]
    fn test_concatenate_preserves_components() {
        let a = two_component();
        let b = MixtureModel::from_components("b", &[0.5], vec![SubstitutionModel::f81(&[0.4, 0.3, 0.2, 0.1]).unwrap()])
            .unwrap();
        let joined = MixtureModel::concatenate("joined", vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(joined.name(), "joined");
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.weights(), vec![1.0, 3.0, 0.5]);
        assert_eq!(joined.components()[..2], a.components()[..]);
        assert_eq!(joined.components()[2], b.components()[0]);
    }

    #[test]
    fn test_concatenate_checks_alphabets() {
        let dna = two_component();
        let protein = MixtureModel::from_components("p", &[1.0], vec![SubstitutionModel::poisson().unwrap()]).unwrap();
        assert!(MixtureModel::concatenate("bad", vec![dna, protein]).is_err());
    }

    #[test]
    fn test_scale_keeps_weights() {
        let mix = two_component().scale(2.0).unwrap();
        assert_eq!(mix.weights(), vec![1.0, 3.0]);
        for c in mix.components() {
            assert!((c.model.total_rate() - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_total_rate_and_normalize() {
        let mix = MixtureModel::from_components(
            "rates",
            &[1.0, 1.0],
            vec![
                SubstitutionModel::jc().unwrap().scale(0.5).unwrap(),
                SubstitutionModel::jc().unwrap().scale(2.5).unwrap(),
            ],
        )
        .unwrap();
        assert!((mix.total_rate() - 1.5).abs() < 1e-9);

        let normalized = mix.normalize().unwrap();
        assert!((normalized.total_rate() - 1.0).abs() < 1e-9);
        // Relative rates are preserved.
        let rates: Vec<f64> = normalized.components().iter().map(|c| c.model.total_rate()).collect();
        assert!((rates[1] / rates[0] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_append_name_applies_to_components() {
        let mix = two_component().append_name("; x");
        assert_eq!(mix.name(), "mix");
        assert_eq!(mix.components()[0].model.name(), "JC; x");
        assert_eq!(mix.components()[1].model.name(), "HKY; x");
    }

    #[test]
    fn test_summarize_lists_components() {
        let lines = two_component().summarize();
        assert_eq!(lines[0], "Mixture model: mix");
        assert!(lines.iter().any(|l| l == "Component 2 (weight 3.000000):"));
        assert!(lines.iter().any(|l| l == "  Model: HKY"));
    }
}
