//! Numerical helpers for trend detection.
//!
//! Ordinary least-squares regression with a two-sided slope p-value
//! (Student-t, `n - 2` degrees of freedom), z-score normalized
//! autocorrelation, and the special functions those need.

use std::f64::consts::PI;

/// Added to the standard deviation before z-scoring so flat series do not
/// divide by zero.
const STD_EPSILON: f64 = 1e-8;

/// Guards `1 ± r` against exact zero for perfectly linear data.
const TINY: f64 = 1e-20;

const BETACF_MAX_ITER: usize = 300;
const BETACF_EPS: f64 = 3e-14;
const BETACF_FPMIN: f64 = 1e-300;

const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Output of [`linear_regression`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r: f64,
    /// Two-sided p-value for the null hypothesis `slope == 0`.
    pub p_value: f64,
}

impl Regression {
    pub fn r_squared(&self) -> f64 {
        self.r * self.r
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Fit `y = slope * x + intercept`.
///
/// Returns `None` when fewer than three points are given or when every `x`
/// is identical (slope undefined). A flat `y` yields `r = 0` and `p = 1`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<Regression> {
    let n = x.len();
    if n != y.len() || n < 3 {
        return None;
    }

    let x_mean = mean(x);
    let y_mean = mean(y);

    let mut ss_x = 0.0;
    let mut ss_y = 0.0;
    let mut ss_xy = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ss_x += dx * dx;
        ss_y += dy * dy;
        ss_xy += dx * dy;
    }

    if ss_x <= f64::EPSILON {
        return None;
    }

    let slope = ss_xy / ss_x;
    let intercept = y_mean - slope * x_mean;

    let r_den = (ss_x * ss_y).sqrt();
    let r = if ss_y <= f64::EPSILON || r_den <= f64::EPSILON {
        0.0
    } else {
        (ss_xy / r_den).clamp(-1.0, 1.0)
    };

    let df = (n - 2) as f64;
    let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
    let p_value = student_t_two_sided_p(t, df);

    Some(Regression {
        slope,
        intercept,
        r,
        p_value,
    })
}

/// Two-sided tail probability `P(|T| >= |t|)` for Student's t with `df`
/// degrees of freedom.
pub fn student_t_two_sided_p(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    if df <= 0.0 {
        return 1.0;
    }
    let x = df / (df + t * t);
    regularized_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// Normalized autocorrelation of the z-scored series at lags `0..n`.
///
/// Element `k` is `Σ z[i]·z[i+k] / Σ z[i]²`. Returns `None` for an empty or
/// constant series, where every lag is undefined.
pub fn autocorrelation(values: &[f64]) -> Option<Vec<f64>> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let sd = std_dev(values);
    if sd <= STD_EPSILON {
        return None;
    }
    let m = mean(values);
    let s = sd + STD_EPSILON;
    let z: Vec<f64> = values.iter().map(|v| (v - m) / s).collect();

    let raw: Vec<f64> = (0..n)
        .map(|lag| (0..n - lag).map(|i| z[i] * z[i + lag]).sum())
        .collect();

    let zero = raw[0];
    if zero <= f64::EPSILON {
        return None;
    }
    Some(raw.into_iter().map(|v| v / zero).collect())
}

/// Natural log of the gamma function (Lanczos approximation).
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = LANCZOS[0];
    for (i, c) in LANCZOS.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

/// Regularized incomplete beta function `I_x(a, b)`.
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Continued fraction for the incomplete beta function (modified Lentz).
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < BETACF_FPMIN {
        d = BETACF_FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=BETACF_MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < BETACF_FPMIN {
            d = BETACF_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < BETACF_FPMIN {
            c = BETACF_FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < BETACF_FPMIN {
            d = BETACF_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < BETACF_FPMIN {
            c = BETACF_FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < BETACF_EPS {
            break;
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ln_gamma_known_values() {
        // Γ(1) = 1, Γ(5) = 24, Γ(0.5) = √π
        assert!(ln_gamma(1.0).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - PI.sqrt().ln()).abs() < 1e-10);
    }

    #[test]
    fn test_incomplete_beta_symmetry() {
        // I_x(a, b) = 1 - I_{1-x}(b, a)
        let lhs = regularized_incomplete_beta(2.5, 0.5, 0.3);
        let rhs = 1.0 - regularized_incomplete_beta(0.5, 2.5, 0.7);
        assert!((lhs - rhs).abs() < 1e-10);
    }

    #[test]
    fn test_incomplete_beta_uniform() {
        // I_x(1, 1) = x
        assert!((regularized_incomplete_beta(1.0, 1.0, 0.37) - 0.37).abs() < 1e-10);
    }

    #[test]
    fn test_t_p_value_reference_points() {
        // t = 0 → p = 1
        assert!((student_t_two_sided_p(0.0, 10.0) - 1.0).abs() < 1e-10);
        // t = 2.228, df = 10 is the 5% two-sided critical value
        assert!((student_t_two_sided_p(2.228, 10.0) - 0.05).abs() < 1e-3);
        // df = 1 is Cauchy: P(|T| >= 1) = 0.5
        assert!((student_t_two_sided_p(1.0, 1.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_regression_perfect_line() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let reg = linear_regression(&x, &y).unwrap();
        assert!((reg.slope - 2.0).abs() < 1e-12);
        assert!((reg.intercept - 1.0).abs() < 1e-12);
        assert!((reg.r_squared() - 1.0).abs() < 1e-12);
        assert!(reg.p_value < 1e-6);
    }

    #[test]
    fn test_regression_flat_series() {
        let x: Vec<f64> = (0..6).map(f64::from).collect();
        let y = vec![0.4; 6];
        let reg = linear_regression(&x, &y).unwrap();
        assert_eq!(reg.slope, 0.0);
        assert_eq!(reg.r, 0.0);
        assert!((reg.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_regression_identical_x_is_undefined() {
        let x = vec![3.0; 5];
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(linear_regression(&x, &y).is_none());
    }

    #[test]
    fn test_autocorrelation_lag_zero_is_one() {
        let ac = autocorrelation(&[1.0, 3.0, 2.0, 5.0, 4.0]).unwrap();
        assert_eq!(ac.len(), 5);
        assert!((ac[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_autocorrelation_constant_is_none() {
        assert!(autocorrelation(&[2.0; 8]).is_none());
        assert!(autocorrelation(&[]).is_none());
    }
}
