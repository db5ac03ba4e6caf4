// MIT License
// Copyright 2024--present pdfun developers

//! Special-function approximations used by the confidence-level rescaling.
//!
//! Both are classic Abramowitz & Stegun polynomial / rational
//! approximations. The propagator only ever uses them inside a ratio of
//! z-scores, where the approximation error largely cancels; bit-exact parity
//! with any particular libm is a non-goal.

/// Error function erf(x), A&S formula 7.1.28.
///
/// Maximum absolute error < 1.5e-7.
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();

    const P: f64 = 0.3275911;
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;

    let t = 1.0 / (1.0 + P * x);
    let poly = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// Inverse standard normal CDF, A&S formula 26.2.23.
///
/// Given `p` in (0, 1), returns `z` with `Phi(z) = p`. Maximum absolute
/// error < 4.5e-4. Returns +/- infinity at the endpoints and NaN outside
/// [0, 1].
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    // Symmetry: z(p) = -z(1-p)
    let (q, sign) = if p > 0.5 { (1.0 - p, 1.0) } else { (p, -1.0) };
    let t = (-2.0 * q.ln()).sqrt();

    const C0: f64 = 2.515517;
    const C1: f64 = 0.802853;
    const C2: f64 = 0.010328;
    const D1: f64 = 1.432788;
    const D2: f64 = 0.189269;
    const D3: f64 = 0.001308;

    let z = t - (C0 + C1 * t + C2 * t * t) / (1.0 + D1 * t + D2 * t * t + D3 * t * t * t);
    sign * z
}

/// Two-sided z-score: the half-width in sigma of a central interval
/// covering the fraction `p` of a standard normal.
pub(crate) fn two_sided_z(p: f64) -> f64 {
    inverse_normal_cdf(0.5 + 0.5 * p)
}
