//! Substitution models: named, parameterized generator matrices.
//!
//! A substitution model describes how a single site evolves as a
//! continuous-time Markov chain. It is stored as an exchangeability matrix
//! (the relative rate at which each pair of characters is swapped, independent
//! of their frequencies) together with the stationary distribution of the
//! chain. The generator matrix is derived from both (see
//! [`crate::model::rate_matrix`]).
//!
//! ## Normalization
//! Branch lengths are measured in expected substitutions per site, so models
//! handed to the simulator are normally *normalized*: their total rate
//! `-Σ_i π_i Q_ii` is one. [`SubstitutionModel::new`] and all named
//! constructors normalize. [`SubstitutionModel::unnormalized`] skips that step
//! for composition pipelines (mixtures, gamma expansion) that rescale their
//! components relative to each other and must not normalize them twice.
//!
//! Models are immutable values. [`SubstitutionModel::scale`],
//! [`SubstitutionModel::normalize`] and [`SubstitutionModel::append_name`]
//! return new models.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::base::Alphabet;
use crate::errors::ModelError;
use crate::model::rate_matrix::{
    self, ExchangeabilityMatrix, RateMatrix, StationaryDistribution, TransitionMatrix,
};

/// A substitution model over one alphabet.
///
/// Nucleotide states are indexed A=0, C=1, G=2, T=3; amino acids follow the
/// order of [`Alphabet::Protein`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstitutionModel {
    alphabet: Alphabet,
    name: String,
    params: Vec<f64>,
    stationary: StationaryDistribution,
    exchangeability: ExchangeabilityMatrix,
}

impl SubstitutionModel {
    /// Create a normalized substitution model.
    ///
    /// # Arguments
    /// * `alphabet` - Must be [`Alphabet::Dna`] or [`Alphabet::Protein`].
    /// * `name` - Model name used in summaries and error messages.
    /// * `params` - Model parameters, kept for reporting only.
    /// * `stationary` - Stationary distribution of length `k`.
    /// * `exchangeability` - Symmetric `k×k` matrix with zero diagonal.
    ///
    /// # Errors
    /// Returns an error if the alphabet is not supported, if sizes disagree,
    /// if the distribution is invalid, or if the model has a total rate of
    /// zero (it cannot be normalized).
    pub fn new(
        alphabet: Alphabet,
        name: impl Into<String>,
        params: Vec<f64>,
        stationary: StationaryDistribution,
        exchangeability: ExchangeabilityMatrix,
    ) -> Result<Self, ModelError> {
        Self::unnormalized(alphabet, name, params, stationary, exchangeability)?.normalize()
    }

    /// Create a substitution model without normalizing it.
    ///
    /// Performs the same validation as [`SubstitutionModel::new`] except that
    /// a total rate of zero is allowed.
    pub fn unnormalized(
        alphabet: Alphabet,
        name: impl Into<String>,
        params: Vec<f64>,
        stationary: StationaryDistribution,
        exchangeability: ExchangeabilityMatrix,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        rate_matrix::validate_parts(&name, alphabet, &exchangeability, &stationary)?;
        Ok(Self {
            alphabet,
            name,
            params,
            stationary,
            exchangeability,
        })
    }

    /// Jukes-Cantor (1969) model for nucleotides.
    ///
    /// All substitutions are equally likely and all bases equally frequent.
    pub fn jc() -> Result<Self, ModelError> {
        Self::new(
            Alphabet::Dna,
            "JC",
            Vec::new(),
            DVector::from_element(4, 0.25),
            uniform_exchangeability(4),
        )
    }

    /// Felsenstein (1981) model: equal exchangeabilities, arbitrary base frequencies.
    pub fn f81(frequencies: &[f64]) -> Result<Self, ModelError> {
        Self::new(
            Alphabet::Dna,
            "F81",
            Vec::new(),
            DVector::from_row_slice(frequencies),
            uniform_exchangeability(4),
        )
    }

    /// Hasegawa-Kishino-Yano (1985) model.
    ///
    /// Transitions (A↔G, C↔T) are `kappa` times more exchangeable than
    /// transversions.
    ///
    /// # Errors
    /// Returns an error if `kappa` is not positive and finite, or if the
    /// frequencies are not a distribution over four states.
    pub fn hky(kappa: f64, frequencies: &[f64]) -> Result<Self, ModelError> {
        if !kappa.is_finite() || kappa <= 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "HKY kappa must be positive, got {kappa}"
            )));
        }
        let mut exchangeability = uniform_exchangeability(4);
        for (i, j) in [(0, 2), (1, 3)] {
            exchangeability[(i, j)] = kappa;
            exchangeability[(j, i)] = kappa;
        }
        Self::new(
            Alphabet::Dna,
            "HKY",
            vec![kappa],
            DVector::from_row_slice(frequencies),
            exchangeability,
        )
    }

    /// General time-reversible nucleotide model.
    ///
    /// # Arguments
    /// * `rates` - Exchangeabilities in the order A↔C, A↔G, A↔T, C↔G, C↔T, G↔T.
    /// * `frequencies` - Stationary base frequencies.
    pub fn gtr4(rates: [f64; 6], frequencies: &[f64]) -> Result<Self, ModelError> {
        let mut exchangeability = DMatrix::zeros(4, 4);
        let pairs = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
        for (&(i, j), &rate) in pairs.iter().zip(rates.iter()) {
            exchangeability[(i, j)] = rate;
            exchangeability[(j, i)] = rate;
        }
        Self::new(
            Alphabet::Dna,
            "GTR",
            rates.to_vec(),
            DVector::from_row_slice(frequencies),
            exchangeability,
        )
    }

    /// Poisson model for amino acids: equal exchangeabilities and frequencies.
    pub fn poisson() -> Result<Self, ModelError> {
        let k = Alphabet::Protein.size();
        Self::new(
            Alphabet::Protein,
            "Poisson",
            Vec::new(),
            DVector::from_element(k, 1.0 / k as f64),
            uniform_exchangeability(k),
        )
    }

    /// Poisson model for amino acids with custom stationary frequencies.
    pub fn poisson_custom(frequencies: &[f64]) -> Result<Self, ModelError> {
        Self::new(
            Alphabet::Protein,
            "Poisson-Custom",
            Vec::new(),
            DVector::from_row_slice(frequencies),
            uniform_exchangeability(Alphabet::Protein.size()),
        )
    }

    #[inline]
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    #[inline]
    pub fn stationary_distribution(&self) -> &StationaryDistribution {
        &self.stationary
    }

    #[inline]
    pub fn exchangeability_matrix(&self) -> &ExchangeabilityMatrix {
        &self.exchangeability
    }

    /// Number of states.
    #[inline]
    pub fn n_states(&self) -> usize {
        self.stationary.len()
    }

    /// The generator matrix `Q`.
    pub fn rate_matrix(&self) -> RateMatrix {
        rate_matrix::generator_unchecked(&self.exchangeability, &self.stationary)
    }

    /// Expected number of substitutions per unit time at equilibrium.
    pub fn total_rate(&self) -> f64 {
        rate_matrix::total_rate(&self.rate_matrix(), &self.stationary)
    }

    /// Transition probabilities over a branch of length `t`.
    pub fn transition_probabilities(&self, t: f64) -> Result<TransitionMatrix, ModelError> {
        rate_matrix::transition_probabilities(&self.rate_matrix(), t)
    }

    /// Multiply every exchangeability by `factor`.
    ///
    /// The stationary distribution is unchanged, so the total rate is
    /// multiplied by `factor` as well.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] if `factor` is negative or not finite.
    pub fn scale(&self, factor: f64) -> Result<Self, ModelError> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "cannot scale model '{}' by {factor}",
                self.name
            )));
        }
        Ok(Self {
            exchangeability: &self.exchangeability * factor,
            ..self.clone()
        })
    }

    /// Rescale so that the total rate is one.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] if the total rate is zero.
    pub fn normalize(&self) -> Result<Self, ModelError> {
        let rate = self.total_rate();
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "model '{}' has total rate {rate} and cannot be normalized",
                self.name
            )));
        }
        self.scale(1.0 / rate)
    }

    /// Return a copy whose name has `suffix` appended.
    pub fn append_name(&self, suffix: &str) -> Self {
        Self {
            name: format!("{}{suffix}", self.name),
            ..self.clone()
        }
    }

    /// Human-readable description, one line per entry.
    pub fn summarize(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Model: {}", self.name),
            format!("Alphabet: {}", self.alphabet),
        ];
        if !self.params.is_empty() {
            lines.push(format!("Parameters: {}", format_values(&self.params)));
        }
        lines.push(format!(
            "Stationary distribution: {}",
            format_values(self.stationary.as_slice())
        ));
        // Amino acid matrices are too wide to be useful in a log.
        if self.alphabet == Alphabet::Dna {
            lines.push("Exchangeability matrix:".to_string());
            for row in self.exchangeability.row_iter() {
                let values: Vec<f64> = row.iter().copied().collect();
                lines.push(format!("  {}", format_values(&values)));
            }
        }
        lines.push(format!("Total rate: {:.6}", self.total_rate()));
        lines
    }
}

fn uniform_exchangeability(k: usize) -> ExchangeabilityMatrix {
    DMatrix::from_fn(k, k, |i, j| if i == j { 0.0 } else { 1.0 })
}

pub(crate) fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.6}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKEWED: [f64; 4] = [0.1, 0.2, 0.3, 0.4];

    #[test]
    fn test_jc_is_normalized() {
        let model = SubstitutionModel::jc().unwrap();
        assert_eq!(model.alphabet(), Alphabet::Dna);
        assert_eq!(model.name(), "JC");
        assert!((model.total_rate() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_named_models_are_normalized() {
        let models = vec![
            SubstitutionModel::f81(&SKEWED).unwrap(),
            SubstitutionModel::hky(4.0, &SKEWED).unwrap(),
            SubstitutionModel::gtr4([1.0, 2.0, 0.5, 0.7, 3.0, 1.0], &SKEWED).unwrap(),
            SubstitutionModel::poisson().unwrap(),
        ];
        for model in models {
            assert!(
                (model.total_rate() - 1.0).abs() < 1e-9,
                "{} has rate {}",
                model.name(),
                model.total_rate()
            );
        }
    }

    #[test]
    fn test_hky_transitions_exceed_transversions() {
        let model = SubstitutionModel::hky(5.0, &[0.25; 4]).unwrap();
        let q = model.rate_matrix();
        // A -> G is a transition, A -> C a transversion.
        assert!((q[(0, 2)] / q[(0, 1)] - 5.0).abs() < 1e-9);
        assert!((q[(1, 3)] / q[(1, 2)] - 5.0).abs() < 1e-9);
        assert_eq!(model.params(), &[5.0]);
    }

    #[test]
    fn test_hky_invalid_kappa() {
        assert!(SubstitutionModel::hky(0.0, &[0.25; 4]).is_err());
        assert!(SubstitutionModel::hky(-1.0, &[0.25; 4]).is_err());
        assert!(SubstitutionModel::hky(f64::INFINITY, &[0.25; 4]).is_err());
    }

    #[test]
    fn test_f81_wrong_frequency_count() {
        let err = SubstitutionModel::f81(&[0.5, 0.5]).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { expected: 4, found: 2, .. }));
    }

    #[test]
    fn test_unsupported_alphabet_rejected() {
        let k = Alphabet::ProteinX.size();
        let err = SubstitutionModel::new(
            Alphabet::ProteinX,
            "bad",
            Vec::new(),
            DVector::from_element(k, 1.0 / k as f64),
            uniform_exchangeability(k),
        )
        .unwrap_err();
        assert_eq!(err, ModelError::UnsupportedAlphabet(Alphabet::ProteinX));
    }

    #[test]
    fn test_scale_multiplies_rate() {
        let model = SubstitutionModel::hky(2.0, &SKEWED).unwrap();
        let scaled = model.scale(3.5).unwrap();
        assert!((scaled.total_rate() - 3.5).abs() < 1e-9);
        assert_eq!(scaled.stationary_distribution(), model.stationary_distribution());
        assert_eq!(scaled.name(), model.name());
        // The original is untouched.
        assert!((model.total_rate() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_rejects_invalid_factor() {
        let model = SubstitutionModel::jc().unwrap();
        assert!(model.scale(-1.0).is_err());
        assert!(model.scale(f64::NAN).is_err());
        assert!(model.scale(0.0).is_ok());
    }

    #[test]
    fn test_normalize_restores_unit_rate() {
        let model = SubstitutionModel::gtr4([1.0, 2.0, 0.5, 0.7, 3.0, 1.0], &SKEWED)
            .unwrap()
            .scale(0.123)
            .unwrap();
        let normalized = model.normalize().unwrap();
        assert!((normalized.total_rate() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unnormalized_keeps_rate() {
        let model = SubstitutionModel::unnormalized(
            Alphabet::Dna,
            "raw",
            Vec::new(),
            DVector::from_element(4, 0.25),
            uniform_exchangeability(4),
        )
        .unwrap();
        assert!((model.total_rate() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_zero_rate_cannot_be_normalized() {
        let zero = DMatrix::zeros(4, 4);
        let raw = SubstitutionModel::unnormalized(
            Alphabet::Dna,
            "invariant",
            Vec::new(),
            DVector::from_element(4, 0.25),
            zero.clone(),
        )
        .unwrap();
        assert!(raw.normalize().is_err());
        assert!(
            SubstitutionModel::new(Alphabet::Dna, "invariant", Vec::new(), DVector::from_element(4, 0.25), zero)
                .is_err()
        );
    }

    #[test]
    fn test_append_name() {
        let model = SubstitutionModel::jc().unwrap().append_name("; gamma rate category 1");
        assert_eq!(model.name(), "JC; gamma rate category 1");
    }

    #[test]
    fn test_transition_converges_to_stationary() {
        let model = SubstitutionModel::hky(3.0, &SKEWED).unwrap();
        let p = model.transition_probabilities(100.0).unwrap();
        for i in 0..4 {
            for (j, &pi) in SKEWED.iter().enumerate() {
                assert!((p[(i, j)] - pi).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_summarize_mentions_parameters() {
        let lines = SubstitutionModel::hky(2.0, &[0.25; 4]).unwrap().summarize();
        assert_eq!(lines[0], "Model: HKY");
        assert!(lines.iter().any(|l| l.starts_with("Parameters: 2.000000")));
        assert!(lines.iter().any(|l| l == "Exchangeability matrix:"));
        assert_eq!(lines.last().unwrap(), "Total rate: 1.000000");

        let protein = SubstitutionModel::poisson().unwrap().summarize();
        assert!(!protein.iter().any(|l| l == "Exchangeability matrix:"));
    }
}
