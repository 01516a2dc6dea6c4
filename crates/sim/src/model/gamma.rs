//! Discrete gamma rate heterogeneity.
//!
//! Among-site rate variation is modelled by a gamma distribution with shape
//! `α` and rate `α` (mean one), cut into `n` equally probable bins. Each bin
//! is represented by its mean rate, and each mean scales a copy of the input
//! model. The result is an `n`-component mixture with equal weights.
//!
//! The mean of bin `i` with quantile bounds `q_i` and `q_{i+1}` is
//! `n · ∫ x f(x) dx` over the bin. For the last bin the upper bound is
//! infinite; its integral is computed as the known mean of the whole
//! distribution (one) minus the finite integral from zero to `q_{n-1}`.

use log::{debug, warn};
use statrs::distribution::{Continuous, ContinuousCDF, Gamma};

use crate::errors::ModelError;
use crate::model::mixture::{MixtureComponent, MixtureModel};
use crate::model::substitution::SubstitutionModel;
use crate::numerics::quadrature;

/// Default absolute tolerance of the bin integrals.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Factor by which the tolerance is relaxed when the first attempt fails.
const RETRY_RELAXATION: f64 = 100.0;

/// Mean rates of `n` equally probable bins of a gamma distribution with
/// shape `alpha` and mean one.
///
/// # Errors
/// - [`ModelError::InvalidParameter`] if `n` is zero or `alpha` is not a
///   positive finite number.
/// - [`ModelError::QuadratureFailure`] if a bin integral does not converge,
///   even after one retry with a relaxed tolerance.
pub fn get_means(n: usize, alpha: f64, tolerance: f64) -> Result<Vec<f64>, ModelError> {
    with_relaxed_retry(tolerance, |tol| compute_means(n, alpha, tol))
}

/// Run `attempt` at `tolerance`; on [`ModelError::QuadratureFailure`] run it
/// once more at a tolerance relaxed by [`RETRY_RELAXATION`].
fn with_relaxed_retry<T, F>(tolerance: f64, mut attempt: F) -> Result<T, ModelError>
where
    F: FnMut(f64) -> Result<T, ModelError>,
{
    match attempt(tolerance) {
        Err(ModelError::QuadratureFailure { .. }) => {
            let relaxed = tolerance * RETRY_RELAXATION;
            warn!(
                "Gamma rate integration did not converge at tolerance {tolerance:e}; retrying at {relaxed:e}"
            );
            attempt(relaxed)
        }
        other => other,
    }
}

fn compute_means(n: usize, alpha: f64, tolerance: f64) -> Result<Vec<f64>, ModelError> {
    if n == 0 {
        return Err(ModelError::InvalidParameter(
            "number of gamma rate categories must be at least 1".to_string(),
        ));
    }
    if !alpha.is_finite() || alpha <= 0.0 {
        return Err(ModelError::InvalidParameter(format!(
            "gamma shape must be positive and finite, got {alpha}"
        )));
    }
    let gamma = Gamma::new(alpha, alpha)
        .map_err(|e| ModelError::InvalidParameter(format!("gamma shape {alpha}: {e}")))?;

    let weighted_density = |x: f64| if x <= 0.0 { 0.0 } else { x * gamma.pdf(x) };
    let bins = n as f64;

    // Finite quantile bounds q_0 = 0 .. q_{n-1}; q_n is infinite.
    let bounds = (0..n)
        .map(|i| if i == 0 { Ok(0.0) } else { quantile(&gamma, i as f64 / bins) })
        .collect::<Result<Vec<f64>, ModelError>>()?;

    let mut means = Vec::with_capacity(n);
    for window in bounds.windows(2) {
        let integral = quadrature::integrate(weighted_density, window[0], window[1], tolerance)?;
        means.push(bins * integral.value);
    }

    let head = quadrature::integrate(weighted_density, 0.0, bounds[n - 1], tolerance)?;
    means.push(bins * (1.0 - head.value));

    debug!("Gamma rate categories (n = {n}, shape = {alpha}): {means:?}");
    Ok(means)
}

/// Upper bound on the doublings and halvings of [`bisect_quantile`].
const MAX_BISECTIONS: usize = 2200;

/// Quantile of `gamma` at `p`.
///
/// statrs returns NaN for small lower-tail probabilities when the shape is
/// small; those quantiles are found by bisection instead.
fn quantile(gamma: &Gamma, p: f64) -> Result<f64, ModelError> {
    let q = gamma.inverse_cdf(p);
    if q.is_finite() && q >= 0.0 {
        Ok(q)
    } else {
        bisect_quantile(gamma, p)
    }
}

/// Bisection on the monotone `cdf(x) - p` over `[0, upper]`, where `upper`
/// is doubled from one until `cdf(upper) > p`.
fn bisect_quantile(gamma: &Gamma, p: f64) -> Result<f64, ModelError> {
    let mut upper = 1.0_f64;
    let mut bracketed = false;
    for _ in 0..MAX_BISECTIONS {
        if gamma.cdf(upper) > p {
            bracketed = true;
            break;
        }
        upper *= 2.0;
        if !upper.is_finite() {
            break;
        }
    }
    if !bracketed {
        return Err(ModelError::InvalidParameter(format!(
            "cannot bracket gamma quantile at probability {p}"
        )));
    }

    let mut lower = 0.0_f64;
    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lower + upper);
        if mid <= lower || mid >= upper {
            break;
        }
        if gamma.cdf(mid) < p {
            lower = mid;
        } else {
            upper = mid;
        }
    }
    Ok(upper)
}

/// Name suffix of gamma rate category `i`.
pub fn category_suffix(i: usize) -> String {
    format!("; gamma rate category {}", i + 1)
}

/// Expand a substitution model into `n` gamma rate categories.
///
/// Component `i` is the model scaled by the mean rate of bin `i`, renamed with
/// [`category_suffix`], with weight one.
pub fn expand_substitution_model(
    n: usize,
    alpha: f64,
    model: &SubstitutionModel,
    tolerance: f64,
) -> Result<MixtureModel, ModelError> {
    let means = get_means(n, alpha, tolerance)?;
    let components = scaled_copies(model, &means, 1.0)?;
    MixtureModel::new(model.name(), components)
}

/// Expand every component of a mixture into `n` gamma rate categories.
///
/// The `n` copies of a component inherit its weight, and the per-component
/// expansions are concatenated in component order, giving
/// `n × mixture.len()` components.
pub fn expand_mixture_model(
    n: usize,
    alpha: f64,
    mixture: &MixtureModel,
    tolerance: f64,
) -> Result<MixtureModel, ModelError> {
    mixture.validate()?;
    let means = get_means(n, alpha, tolerance)?;
    let expansions = mixture
        .components()
        .iter()
        .map(|c| {
            let components = scaled_copies(&c.model, &means, c.weight)?;
            MixtureModel::new(c.model.name(), components)
        })
        .collect::<Result<Vec<_>, ModelError>>()?;
    MixtureModel::concatenate(mixture.name(), expansions)
}

fn scaled_copies(
    model: &SubstitutionModel,
    means: &[f64],
    weight: f64,
) -> Result<Vec<MixtureComponent>, ModelError> {
    means
        .iter()
        .enumerate()
        .map(|(i, &mean)| {
            let scaled = model.scale(mean)?.append_name(&category_suffix(i));
            Ok(MixtureComponent::new(weight, scaled))
        })
        .collect()
}
