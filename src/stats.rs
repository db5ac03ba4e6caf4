// MIT License
// Copyright 2024--present pdfun developers

//! Sample statistics for replica ensembles.
//!
//! Welford's online algorithm for mean and variance (avoids the
//! catastrophic cancellation of the naive `E[X^2] - E[X]^2` formula) and the
//! R-7 linear-interpolation quantile, the default method in R and NumPy.
//!
//! References: Welford (1962), *Technometrics* 4(3); Hyndman & Fan (1996),
//! *The American Statistician* 50(4).

/// Running mean and sum of squared deviations.
#[derive(Debug, Default)]
pub struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Welford {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample.
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Number of samples seen so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean; 0.0 before the first sample.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation (Bessel-corrected, denominator n-1).
    ///
    /// Returns 0.0 for fewer than two samples — callers treat a degenerate
    /// replica count as zero spread, not as an error.
    pub fn sample_std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / (self.count - 1) as f64).sqrt()
    }
}

/// Accumulate a whole slice.
pub fn welford(data: &[f64]) -> Welford {
    let mut acc = Welford::new();
    for &x in data {
        acc.update(x);
    }
    acc
}

/// The `p`-th quantile of **pre-sorted** data, R-7 linear interpolation.
///
/// The caller guarantees `sorted` is non-empty, in non-decreasing order,
/// and `p` is within [0, 1].
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&p));

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        sorted[n - 1]
    } else {
        (1.0 - g) * sorted[j] + g * sorted[j + 1]
    }
}
