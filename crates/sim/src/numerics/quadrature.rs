//! Adaptive Gauss–Kronrod integration on finite intervals.
//!
//! Each interval is evaluated with the 7-point Gauss rule embedded in the
//! 15-point Kronrod rule; the difference between the two is the local error
//! estimate. The interval with the largest error is bisected until the total
//! error estimate falls below the requested absolute tolerance.

use crate::errors::ModelError;

/// Upper bound on the number of bisections performed by [`integrate`].
pub const MAX_SUBDIVISIONS: usize = 200;

/// Kronrod abscissae on `[-1, 1]`; symmetric, only the non-negative half is
/// stored. Odd indices are the Gauss points.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

const WGK: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

/// Gauss weights for `XGK[1]`, `XGK[3]`, `XGK[5]` and the centre.
const WG: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

/// Result of a converged integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integral {
    pub value: f64,
    pub error: f64,
    pub subdivisions: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    lower: f64,
    upper: f64,
    value: f64,
    error: f64,
}

/// Integrate `f` over `[lower, upper]` to absolute error `tolerance`.
///
/// # Errors
/// - [`ModelError::InvalidParameter`] if the bounds or tolerance are not
///   finite, or the tolerance is not positive.
/// - [`ModelError::QuadratureFailure`] if the error estimate is still above
///   `tolerance` after [`MAX_SUBDIVISIONS`] bisections, or if the integrand
///   produced a non-finite value.
pub fn integrate<F>(f: F, lower: f64, upper: f64, tolerance: f64) -> Result<Integral, ModelError>
where
    F: Fn(f64) -> f64,
{
    if !lower.is_finite() || !upper.is_finite() {
        return Err(ModelError::InvalidParameter(format!(
            "integration bounds must be finite, got [{lower}, {upper}]"
        )));
    }
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(ModelError::InvalidParameter(format!(
            "integration tolerance must be positive, got {tolerance}"
        )));
    }
    if lower == upper {
        return Ok(Integral {
            value: 0.0,
            error: 0.0,
            subdivisions: 0,
        });
    }
    if lower > upper {
        let flipped = integrate(f, upper, lower, tolerance)?;
        return Ok(Integral {
            value: -flipped.value,
            ..flipped
        });
    }

    let failure = |estimate: f64| ModelError::QuadratureFailure {
        lower,
        upper,
        estimate,
        tolerance,
    };

    let mut segments = vec![kronrod(&f, lower, upper)];
    let mut subdivisions = 0;
    loop {
        let value: f64 = segments.iter().map(|s| s.value).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();
        if !value.is_finite() || !error.is_finite() {
            return Err(failure(f64::INFINITY));
        }
        if error <= tolerance {
            return Ok(Integral {
                value,
                error,
                subdivisions,
            });
        }
        if subdivisions == MAX_SUBDIVISIONS {
            return Err(failure(error));
        }

        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.error.total_cmp(&b.error))
            .map_or(0, |(i, _)| i);
        let segment = segments.swap_remove(worst);
        let mid = 0.5 * (segment.lower + segment.upper);
        segments.push(kronrod(&f, segment.lower, mid));
        segments.push(kronrod(&f, mid, segment.upper));
        subdivisions += 1;
    }
}

/// Single G7/K15 evaluation over `[lower, upper]`.
fn kronrod<F>(f: &F, lower: f64, upper: f64) -> Segment
where
    F: Fn(f64) -> f64,
{
    let centre = 0.5 * (lower + upper);
    let half = 0.5 * (upper - lower);

    let f_centre = f(centre);
    let mut gauss = WG[3] * f_centre;
    let mut kronrod = WGK[7] * f_centre;

    for (j, (&x, &w)) in XGK.iter().zip(&WGK).take(7).enumerate() {
        let dx = half * x;
        let pair = f(centre - dx) + f(centre + dx);
        kronrod += w * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }

    Segment {
        lower,
        upper,
        value: kronrod * half,
        error: ((kronrod - gauss) * half).abs(),
    }
}
