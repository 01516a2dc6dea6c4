//! Generator (rate) matrices of continuous-time Markov substitution processes.
//!
//! A generator `Q` is derived from a symmetric exchangeability matrix `S` and
//! a stationary distribution `π`:
//!
//! ```text
//! Q[i][j] = S[i][j] * π[j]          (i != j)
//! Q[i][i] = -Σ_{j != i} Q[i][j]
//! ```
//!
//! so off-diagonal entries are non-negative and every row sums to zero. The
//! transition probability matrix over a branch of length `t` is `expm(Q·t)`.
//!
//! Everything in this module is a pure function of its inputs.

use nalgebra::{DMatrix, DVector};

use crate::base::Alphabet;
use crate::errors::ModelError;

/// Symmetric matrix of relative exchange rates with zero diagonal.
pub type ExchangeabilityMatrix = DMatrix<f64>;

/// Equilibrium state frequencies; non-negative and summing to one.
pub type StationaryDistribution = DVector<f64>;

/// Generator matrix `Q`; rows sum to zero.
pub type RateMatrix = DMatrix<f64>;

/// Transition probability matrix `P(t) = expm(Q·t)`; rows sum to one.
pub type TransitionMatrix = DMatrix<f64>;

/// Absolute tolerance on the sum of a stationary distribution.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-8;

/// Absolute tolerance for symmetry of the exchangeability matrix.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Build the generator matrix from exchangeabilities and stationary frequencies.
///
/// # Errors
/// - [`ModelError::DimensionMismatch`] if the matrix is not square or its
///   size differs from the length of the distribution.
/// - [`ModelError::InvalidDistribution`] if the distribution has negative
///   entries or does not sum to one within [`DISTRIBUTION_TOLERANCE`].
/// - [`ModelError::InvalidParameter`] if the exchangeabilities are negative,
///   asymmetric or have a non-zero diagonal.
pub fn build_generator(
    exchangeability: &ExchangeabilityMatrix,
    stationary: &StationaryDistribution,
) -> Result<RateMatrix, ModelError> {
    check_shapes("rate matrix", stationary.len(), exchangeability, stationary)?;
    check_distribution("rate matrix", stationary)?;
    check_exchangeability("rate matrix", exchangeability)?;
    Ok(generator_unchecked(exchangeability, stationary))
}

/// Validate the parts of a model against its alphabet.
///
/// This is the full set of checks run when a substitution model is built; it
/// adds the alphabet checks to those of [`build_generator`].
pub(crate) fn validate_parts(
    name: &str,
    alphabet: Alphabet,
    exchangeability: &ExchangeabilityMatrix,
    stationary: &StationaryDistribution,
) -> Result<(), ModelError> {
    if !alphabet.is_standard() {
        return Err(ModelError::UnsupportedAlphabet(alphabet));
    }
    check_shapes(name, alphabet.size(), exchangeability, stationary)?;
    check_distribution(name, stationary)?;
    check_exchangeability(name, exchangeability)
}

/// Generator without validation; callers guarantee the invariants.
pub(crate) fn generator_unchecked(
    exchangeability: &ExchangeabilityMatrix,
    stationary: &StationaryDistribution,
) -> RateMatrix {
    let k = stationary.len();
    let mut q = DMatrix::zeros(k, k);
    for i in 0..k {
        let mut row_sum = 0.0;
        for j in 0..k {
            if i != j {
                let rate = exchangeability[(i, j)] * stationary[j];
                q[(i, j)] = rate;
                row_sum += rate;
            }
        }
        q[(i, i)] = -row_sum;
    }
    q
}

/// Expected number of substitutions per unit time at equilibrium:
/// `-Σ_i π_i Q_ii`.
pub fn total_rate(generator: &RateMatrix, stationary: &StationaryDistribution) -> f64 {
    -stationary
        .iter()
        .enumerate()
        .map(|(i, &p)| p * generator[(i, i)])
        .sum::<f64>()
}

/// Transition probabilities over a branch of length `t`: `expm(Q·t)`.
///
/// # Errors
/// Returns [`ModelError::InvalidParameter`] if `t` is negative or not finite.
pub fn transition_probabilities(generator: &RateMatrix, t: f64) -> Result<TransitionMatrix, ModelError> {
    if !t.is_finite() || t < 0.0 {
        return Err(ModelError::InvalidParameter(format!(
            "branch length must be finite and non-negative, got {t}"
        )));
    }
    if t == 0.0 {
        return Ok(DMatrix::identity(generator.nrows(), generator.ncols()));
    }
    Ok((generator * t).exp())
}

fn check_shapes(
    name: &str,
    k: usize,
    exchangeability: &ExchangeabilityMatrix,
    stationary: &StationaryDistribution,
) -> Result<(), ModelError> {
    let mismatch = |found: usize| ModelError::DimensionMismatch {
        model: name.to_string(),
        expected: k,
        found,
    };
    if stationary.len() != k {
        return Err(mismatch(stationary.len()));
    }
    if exchangeability.nrows() != k {
        return Err(mismatch(exchangeability.nrows()));
    }
    if exchangeability.ncols() != k {
        return Err(mismatch(exchangeability.ncols()));
    }
    Ok(())
}

fn check_distribution(name: &str, stationary: &StationaryDistribution) -> Result<(), ModelError> {
    let invalid = |reason: String| ModelError::InvalidDistribution {
        model: name.to_string(),
        reason,
    };
    if let Some((i, p)) = stationary
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(invalid(format!("entry {i} is {p}")));
    }
    let sum = stationary.sum();
    if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
        return Err(invalid(format!("frequencies sum to {sum}")));
    }
    Ok(())
}

fn check_exchangeability(name: &str, exchangeability: &ExchangeabilityMatrix) -> Result<(), ModelError> {
    let k = exchangeability.nrows();
    for i in 0..k {
        if exchangeability[(i, i)] != 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "model '{name}': exchangeability diagonal entry {i} is {} (must be zero)",
                exchangeability[(i, i)]
            )));
        }
        for j in (i + 1)..k {
            let (a, b) = (exchangeability[(i, j)], exchangeability[(j, i)]);
            if !a.is_finite() || !b.is_finite() || a < 0.0 {
                return Err(ModelError::InvalidParameter(format!(
                    "model '{name}': exchangeability ({i}, {j}) is {a}"
                )));
            }
            if (a - b).abs() > SYMMETRY_TOLERANCE * a.abs().max(1.0) {
                return Err(ModelError::InvalidParameter(format!(
                    "model '{name}': exchangeability matrix is not symmetric at ({i}, {j})"
                )));
            }
        }
    }
    Ok(())
}
