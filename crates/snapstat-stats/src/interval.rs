//! Sample mean and Student-t confidence intervals.
//!
//! The t quantile is solved directly from the regularized incomplete beta
//! function, so no statistics library is needed. Results agree with reference
//! t tables to well below 1e-9.

use snapstat_core::{Result, SnapstatError};

/// Arithmetic mean of a sample.
///
/// # Errors
///
/// Returns [`SnapstatError::InsufficientSamples`] for an empty sample.
///
/// # Examples
///
/// ```
/// use snapstat_stats::interval::mean;
///
/// assert_eq!(mean(&[1.0, 3.0]).unwrap(), 2.0);
/// assert!(mean(&[]).is_err());
/// ```
pub fn mean(sample: &[f64]) -> Result<f64> {
    if sample.is_empty() {
        return Err(SnapstatError::InsufficientSamples {
            needed: 1,
            found: 0,
        });
    }
    Ok(sample.iter().sum::<f64>() / sample.len() as f64)
}

/// Standard error of the mean, using the `n - 1` sample variance.
///
/// # Errors
///
/// Returns [`SnapstatError::InsufficientSamples`] when `sample.len() < 2`.
pub fn standard_error(sample: &[f64]) -> Result<f64> {
    let n = sample.len();
    if n < 2 {
        return Err(SnapstatError::InsufficientSamples {
            needed: 2,
            found: n,
        });
    }
    let m = mean(sample)?;
    let variance = sample.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    Ok((variance / n as f64).sqrt())
}

/// Half-width of the two-sided Student-t confidence interval around the
/// sample mean.
///
/// `standard_error(sample) * t((1 + confidence) / 2, n - 1)`.
///
/// # Errors
///
/// Returns [`SnapstatError::InsufficientSamples`] when `sample.len() < 2` and
/// [`SnapstatError::InvalidConfidence`] unless `0 < confidence < 1`.
///
/// # Examples
///
/// ```
/// use snapstat_stats::interval::confidence_interval;
///
/// // Two points one unit from their mean: the half-width is t(0.975, 1).
/// let h = confidence_interval(&[1.0, 3.0], 0.95).unwrap();
/// assert!((h - 12.706204736174704).abs() < 1e-9);
/// ```
pub fn confidence_interval(sample: &[f64], confidence: f64) -> Result<f64> {
    if !in_open_unit_interval(confidence) {
        return Err(SnapstatError::InvalidConfidence(confidence));
    }
    let se = standard_error(sample)?;
    let df = (sample.len() - 1) as f64;
    Ok(se * student_t_quantile((1.0 + confidence) / 2.0, df))
}

/// Quantile function (inverse CDF) of Student's t distribution.
///
/// Solves `P(T > t) = 1 - p` by bisection on the upper tail, which keeps full
/// precision for `p` close to 1.
///
/// Returns NaN for `p` outside (0, 1) or a non-positive `df`.
///
/// # Examples
///
/// ```
/// use snapstat_stats::interval::student_t_quantile;
///
/// assert_eq!(student_t_quantile(0.5, 7.0), 0.0);
/// assert!((student_t_quantile(0.975, 30.0) - 2.042272456301238).abs() < 1e-9);
/// ```
pub fn student_t_quantile(p: f64, df: f64) -> f64 {
    if !in_open_unit_interval(p) || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if p == 0.5 {
        return 0.0;
    }
    if p < 0.5 {
        return -student_t_quantile(1.0 - p, df);
    }

    let tail = 1.0 - p;
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    while t_upper_tail(hi, df) > tail {
        lo = hi;
        hi *= 2.0;
        if !hi.is_finite() {
            return f64::INFINITY;
        }
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if t_upper_tail(mid, df) > tail {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

fn in_open_unit_interval(v: f64) -> bool {
    v > 0.0 && v < 1.0
}

/// `P(T > t)` for `t >= 0`.
fn t_upper_tail(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    0.5 * regularized_incomplete_beta(df / 2.0, 0.5, x)
}

/// Regularized incomplete beta function `I_x(a, b)`.
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (-x).ln_1p();
    let front = ln_front.exp();
    // The continued fraction converges quickly only below this point; use the
    // symmetry I_x(a, b) = 1 - I_{1-x}(b, a) above it.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Modified Lentz evaluation of the incomplete beta continued fraction.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPSILON: f64 = 1e-16;
    const TINY: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let even = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + even * d);
        c = guard(1.0 + even / c);
        h *= d * c;

        let odd = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + odd * d);
        c = guard(1.0 + odd / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

/// Natural log of the gamma function (Lanczos, g = 7, n = 9).
fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula.
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin().abs()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, c) in COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < TOLERANCE,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn quantile_matches_closed_form_for_one_degree_of_freedom() {
        // t with 1 df is Cauchy: Q(p) = tan(pi * (p - 1/2)).
        for p in [0.6, 0.9, 0.95, 0.975, 0.995] {
            let expected = (std::f64::consts::PI * (p - 0.5)).tan();
            let actual = student_t_quantile(p, 1.0);
            assert!(
                ((actual - expected) / expected).abs() < 1e-12,
                "p={p}: expected {expected}, got {actual}"
            );
        }
    }

    #[test]
    fn quantile_matches_closed_form_for_two_degrees_of_freedom() {
        // Q(p) = (2p - 1) / sqrt(2p(1 - p)).
        for p in [0.55_f64, 0.9, 0.975, 0.995] {
            let expected = (2.0 * p - 1.0) / (2.0 * p * (1.0 - p)).sqrt();
            assert_close(student_t_quantile(p, 2.0), expected);
        }
    }

    #[test]
    fn quantile_matches_reference_table() {
        let cases = [
            (0.975, 3.0, 3.182_446_305_283_709_6),
            (0.975, 4.0, 2.776_445_105_197_794_4),
            (0.975, 5.0, 2.570_581_835_636_315_5),
            (0.975, 7.0, 2.364_624_251_592_785_3),
            (0.975, 9.0, 2.262_157_162_798_205_5),
            (0.975, 29.0, 2.045_229_642_132_704_3),
            (0.975, 100.0, 1.983_971_518_523_552_3),
            (0.995, 5.0, 4.032_142_983_555_228),
            (0.95, 10.0, 1.812_461_122_811_676_4),
        ];
        for (p, df, expected) in cases {
            assert_close(student_t_quantile(p, df), expected);
        }
    }

    #[test]
    fn quantile_is_antisymmetric() {
        assert_close(
            student_t_quantile(0.025, 9.0),
            -student_t_quantile(0.975, 9.0),
        );
        assert_eq!(student_t_quantile(0.5, 3.0), 0.0);
    }

    #[test]
    fn quantile_rejects_out_of_range_input() {
        assert!(student_t_quantile(0.0, 3.0).is_nan());
        assert!(student_t_quantile(1.0, 3.0).is_nan());
        assert!(student_t_quantile(0.9, 0.0).is_nan());
    }

    #[test]
    fn confidence_interval_matches_reference() {
        // Reference: se * t.ppf(0.975, n - 1), computed at 40 digits.
        assert_close(
            confidence_interval(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 0.95).unwrap(),
            1.787_487_918_236_210_9,
        );
        assert_close(
            confidence_interval(&[12.5, 13.1, 12.9, 13.4, 12.7], 0.95).unwrap(),
            0.433_694_589_660_874_03,
        );
        assert_close(
            confidence_interval(&[12.5, 13.1, 12.9, 13.4, 12.7], 0.99).unwrap(),
            0.719_182_609_536_095_86,
        );
        assert_close(
            confidence_interval(&[10.0, 20.0, 30.0], 0.95).unwrap(),
            24.841_377_117_503_31,
        );
    }

    #[test]
    fn confidence_interval_of_constant_sample_is_zero() {
        assert_eq!(confidence_interval(&[4.0, 4.0, 4.0], 0.95).unwrap(), 0.0);
    }

    #[test]
    fn confidence_interval_needs_two_samples() {
        assert!(matches!(
            confidence_interval(&[1.0], 0.95),
            Err(SnapstatError::InsufficientSamples {
                needed: 2,
                found: 1
            })
        ));
        assert!(confidence_interval(&[], 0.95).is_err());
    }

    #[test]
    fn confidence_interval_rejects_bad_level() {
        assert!(matches!(
            confidence_interval(&[1.0, 2.0], 1.5),
            Err(SnapstatError::InvalidConfidence(_))
        ));
        assert!(confidence_interval(&[1.0, 2.0], 0.0).is_err());
    }

    #[test]
    fn standard_error_uses_sample_variance() {
        // Sample variance of [1, 3] is 2, so se = sqrt(2 / 2) = 1.
        assert_close(standard_error(&[1.0, 3.0]).unwrap(), 1.0);
    }

    #[test]
    fn ln_gamma_matches_factorials() {
        assert_close(ln_gamma(1.0), 0.0);
        assert_close(ln_gamma(5.0), 24.0_f64.ln());
        assert_close(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln());
    }
}
