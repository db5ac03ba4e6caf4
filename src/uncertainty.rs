// MIT License
// Copyright 2024--present pdfun developers

//! Uncertainty propagation across a member ensemble.
//!
//! Given a set's declared [`ErrorConvention`] and an ordered ensemble of
//! scalar predictions (member 0 = central, 1..N = error members, all at one
//! fixed evaluation point), [`compute`] combines the members into a
//! [`PdfUncertainty`]: central value, asymmetric and symmetric errors, the
//! confidence-level rescaling factor, and the PDF / nuisance-parameter
//! split where the convention declares one.
//!
//! ## Combination rules
//!
//! - **Hessian**: error members form eigenvector pairs. Each pair
//!   contributes its largest upward and downward excursion from the central
//!   value (clamped at zero) in quadrature. The symmetrized error is the
//!   arithmetic mean of the two sides, or their geometric mean under the
//!   `alternative` flag.
//! - **Symmetric Hessian**: one deviation per member, combined in
//!   quadrature; both sides equal the symmetrized error.
//! - **Replicas**: members are independent samples. The symmetric error is
//!   the sample standard deviation; the asymmetric errors are read from the
//!   R-7 percentile bounds of the central `cl`% interval. This is the one
//!   convention where `cl` selects which quantiles are read instead of
//!   rescaling a Gaussian-derived error, so `scale` is reported but not
//!   applied. Fewer than two replicas make the deviation estimator
//!   degenerate (it reports zero); that is a caveat, not an error.
//! - **None / unknown**: all errors are zero. Not a failure — sets with no
//!   declared uncertainty model are valid inputs.
//!
//! For the Hessian kinds, trailing nuisance-parameter pairs (declared by
//! `+`-qualifiers in the error type, e.g. `hessian+as`) contribute half
//! their spread in quadrature to `err_par`; the `*_pdf` fields are computed
//! from the eigenvector members alone and the unsuffixed fields combine
//! both parts in quadrature.
//!
//! `compute` is a pure function: no I/O, no shared state, bit-identical
//! results for identical inputs.

use crate::error::Error;
use crate::registry::PdfSetDescriptor;
use crate::special::two_sided_z;
use crate::stats::{quantile_sorted, welford};
use crate::types::{ConventionKind, ErrorConvention, PdfUncertainty};

/// The native reference confidence level, in percent: `100 * erf(1/sqrt(2))`.
///
/// Uncertainties requested at this level carry `scale == 1.0`.
pub const CL_1SIGMA: f64 = 68.268_949_213_708_58;

/// Ratio of the requested confidence level's z-score to the 1-sigma
/// reference. `cl` must already be validated to lie in (0, 100].
fn cl_scale(cl: f64) -> f64 {
    two_sided_z(cl / 100.0) / two_sided_z(CL_1SIGMA / 100.0)
}

/// Apply the CL factor to a 1-sigma error. A zero spread must stay zero:
/// `cl = 100` makes the factor infinite and `0.0 * inf` is NaN.
fn rescale(err: f64, scale: f64) -> f64 {
    if err == 0.0 {
        0.0
    } else {
        scale * err
    }
}

/// Combine a member ensemble into a structured uncertainty.
///
/// `values[0]` is the central prediction, `values[1..]` the error members,
/// in the order fixed by the set's construction. `cl` is a confidence level
/// in percent; `alternative` selects the convention's documented alternative
/// formula (geometric symmetrization for Hessian sets, sample-mean central
/// value for replica sets).
///
/// # Errors
///
/// [`Error::InvalidEnsembleLength`] for an empty ensemble, or when the
/// error members of a Hessian-kind set do not form whole pairs;
/// [`Error::InvalidConfidenceLevel`] when `cl` is outside (0, 100].
/// An unknown convention is not an error (see module docs).
///
/// ```
/// use pdfun_core::types::{ConventionKind, ErrorConvention};
/// use pdfun_core::uncertainty::{compute, CL_1SIGMA};
///
/// let conv = ErrorConvention::plain(ConventionKind::Hessian);
/// let unc = compute(&conv, &[10.0, 11.0, 9.5, 10.8, 9.2], CL_1SIGMA, false).unwrap();
/// assert!((unc.errplus - 1.2806).abs() < 1e-3);
/// assert!((unc.errminus - 0.9434).abs() < 1e-3);
/// ```
pub fn compute(
    convention: &ErrorConvention,
    values: &[f64],
    cl: f64,
    alternative: bool,
) -> Result<PdfUncertainty, Error> {
    if values.is_empty() {
        return Err(Error::InvalidEnsembleLength(0));
    }
    if !(cl > 0.0 && cl <= 100.0) {
        return Err(Error::InvalidConfidenceLevel(cl));
    }

    let central = values[0];
    let errors = &values[1..];

    match convention.kind {
        ConventionKind::None => Ok(PdfUncertainty::exact(central, 1.0)),
        ConventionKind::Replicas => Ok(replica_uncertainty(central, errors, cl, alternative)),
        ConventionKind::Hessian | ConventionKind::SymmHessian => {
            hessian_uncertainty(convention, central, errors, values.len(), cl, alternative)
        }
    }
}

impl PdfSetDescriptor {
    /// [`compute`] with this set's declared error convention.
    pub fn uncertainty(
        &self,
        values: &[f64],
        cl: f64,
        alternative: bool,
    ) -> Result<PdfUncertainty, Error> {
        compute(&self.convention(), values, cl, alternative)
    }
}

fn hessian_uncertainty(
    convention: &ErrorConvention,
    central: f64,
    errors: &[f64],
    ensemble_len: usize,
    cl: f64,
    alternative: bool,
) -> Result<PdfUncertainty, Error> {
    let scale = cl_scale(cl);

    // Nuisance-parameter pairs occupy the tail, two members per qualifier.
    let n_par_members = 2 * convention.par_pairs;
    if errors.len() < n_par_members {
        return Err(Error::InvalidEnsembleLength(ensemble_len));
    }
    let (eigen, par) = errors.split_at(errors.len() - n_par_members);

    // Unscaled 1-sigma errors first; the CL factor is applied at the end.
    let (plus1, minus1, symm1) = match convention.kind {
        ConventionKind::Hessian => {
            if eigen.len() % 2 != 0 {
                return Err(Error::InvalidEnsembleLength(ensemble_len));
            }
            let mut errplus2 = 0.0;
            let mut errminus2 = 0.0;
            for pair in eigen.chunks_exact(2) {
                let (up, down) = (pair[0], pair[1]);
                errplus2 += (up - central).max(down - central).max(0.0).powi(2);
                errminus2 += (central - up).max(central - down).max(0.0).powi(2);
            }
            let plus1 = errplus2.sqrt();
            let minus1 = errminus2.sqrt();
            let symm1 = if alternative {
                // Geometric combination: our chosen realisation of the
                // convention's documented alternative symmetrization.
                (plus1 * minus1).sqrt()
            } else {
                0.5 * (plus1 + minus1)
            };
            (plus1, minus1, symm1)
        }
        ConventionKind::SymmHessian => {
            let sum2: f64 = eigen.iter().map(|m| (m - central).powi(2)).sum();
            let symm1 = sum2.sqrt();
            (symm1, symm1, symm1)
        }
        _ => unreachable!("hessian_uncertainty only handles Hessian kinds"),
    };

    // Half the up/down spread of each variation pair, in quadrature.
    let par2: f64 = par
        .chunks_exact(2)
        .map(|pair| (0.5 * (pair[0] - pair[1])).powi(2))
        .sum();

    let errplus_pdf = rescale(plus1, scale);
    let errminus_pdf = rescale(minus1, scale);
    let errsymm_pdf = rescale(symm1, scale);
    let err_par = rescale(par2.sqrt(), scale);

    Ok(PdfUncertainty {
        central,
        errplus: (errplus_pdf * errplus_pdf + err_par * err_par).sqrt(),
        errminus: (errminus_pdf * errminus_pdf + err_par * err_par).sqrt(),
        errsymm: (errsymm_pdf * errsymm_pdf + err_par * err_par).sqrt(),
        scale,
        errplus_pdf,
        errminus_pdf,
        errsymm_pdf,
        err_par,
    })
}

fn replica_uncertainty(
    nominal: f64,
    replicas: &[f64],
    cl: f64,
    alternative: bool,
) -> PdfUncertainty {
    let scale = cl_scale(cl);
    if replicas.is_empty() {
        return PdfUncertainty::exact(nominal, scale);
    }

    let acc = welford(replicas);
    let central = if alternative { acc.mean() } else { nominal };
    let errsymm = acc.sample_std_dev();

    let mut sorted = replicas.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let alpha = 0.5 * (1.0 - cl / 100.0);
    let lo = quantile_sorted(&sorted, alpha);
    let hi = quantile_sorted(&sorted, 1.0 - alpha);

    // The central value can fall outside the percentile band when member 0
    // is far from the replica bulk; clamp rather than report a negative
    // one-sided error.
    let errplus = (hi - central).max(0.0);
    let errminus = (central - lo).max(0.0);

    PdfUncertainty {
        central,
        errplus,
        errminus,
        errsymm,
        scale,
        errplus_pdf: errplus,
        errminus_pdf: errminus,
        errsymm_pdf: errsymm,
        err_par: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hessian() -> ErrorConvention {
        ErrorConvention::plain(ConventionKind::Hessian)
    }

    fn symmhessian() -> ErrorConvention {
        ErrorConvention::plain(ConventionKind::SymmHessian)
    }

    fn replicas() -> ErrorConvention {
        ErrorConvention::plain(ConventionKind::Replicas)
    }

    #[test]
    fn empty_ensemble_is_rejected() {
        for conv in [hessian(), symmhessian(), replicas()] {
            assert_eq!(
                compute(&conv, &[], CL_1SIGMA, false),
                Err(Error::InvalidEnsembleLength(0))
            );
        }
    }

    #[test]
    fn confidence_level_bounds() {
        let values = [1.0, 2.0, 0.5];
        for cl in [0.0, -5.0, 150.0, f64::NAN] {
            let err = compute(&symmhessian(), &values, cl, false).unwrap_err();
            assert!(matches!(err, Error::InvalidConfidenceLevel(_)), "cl = {cl}");
        }
        assert!(compute(&symmhessian(), &values, 100.0, false).is_ok());
    }

    #[test]
    fn hessian_pairwise_example() {
        // Central + 2 eigenvector pairs; the max-of-zero rule applies per
        // pair before squaring.
        let values = [10.0, 11.0, 9.5, 10.8, 9.2];
        let unc = compute(&hessian(), &values, CL_1SIGMA, false).unwrap();
        assert_eq!(unc.central, 10.0);
        assert!((unc.errplus - (1.0f64 + 0.64).sqrt()).abs() < 1e-3);
        assert!((unc.errminus - (0.25f64 + 0.64).sqrt()).abs() < 1e-3);
        assert!((unc.errsymm - 0.5 * (unc.errplus + unc.errminus)).abs() < 1e-12);
        assert!((unc.scale - 1.0).abs() < 1e-9);
        // No declared split: the pdf fields mirror the totals.
        assert_eq!(unc.err_par, 0.0);
        assert_eq!(unc.errplus_pdf, unc.errplus);
        assert_eq!(unc.errminus_pdf, unc.errminus);
        assert_eq!(unc.errsymm_pdf, unc.errsymm);
    }

    #[test]
    fn hessian_flat_ensemble_has_zero_errors() {
        let values = [3.0; 7];
        let unc = compute(&hessian(), &values, CL_1SIGMA, false).unwrap();
        assert_eq!(unc.errplus, 0.0);
        assert_eq!(unc.errminus, 0.0);
        assert_eq!(unc.errsymm, 0.0);
    }

    #[test]
    fn hessian_one_sided_pair_counts_once() {
        // Both variations above central: the pair contributes only upward.
        let values = [1.0, 1.5, 1.2];
        let unc = compute(&hessian(), &values, CL_1SIGMA, false).unwrap();
        assert!((unc.errplus - 0.5).abs() < 1e-9);
        assert_eq!(unc.errminus, 0.0);
    }

    #[test]
    fn hessian_odd_members_are_rejected() {
        let values = [1.0, 1.1, 0.9, 1.2];
        assert_eq!(
            compute(&hessian(), &values, CL_1SIGMA, false),
            Err(Error::InvalidEnsembleLength(4))
        );
    }

    #[test]
    fn hessian_alternative_symmetrization_differs() {
        let values = [10.0, 11.0, 9.5, 10.8, 9.2];
        let arith = compute(&hessian(), &values, CL_1SIGMA, false).unwrap();
        let geom = compute(&hessian(), &values, CL_1SIGMA, true).unwrap();
        assert_eq!(arith.errplus, geom.errplus);
        assert_eq!(arith.errminus, geom.errminus);
        let expected_geom = (geom.errplus * geom.errminus).sqrt();
        assert!((geom.errsymm - expected_geom).abs() < 1e-12);
        // errplus != errminus here, so the two formulas measurably disagree.
        assert!((arith.errsymm - geom.errsymm).abs() > 1e-3);
    }

    #[test]
    fn hessian_scale_rescales_to_95_cl() {
        let values = [10.0, 11.0, 9.5, 10.8, 9.2];
        let one_sigma = compute(&hessian(), &values, CL_1SIGMA, false).unwrap();
        let two_sigma = compute(&hessian(), &values, 95.0, false).unwrap();
        assert!((two_sigma.scale - 1.96).abs() < 0.01);
        assert!((two_sigma.errplus - one_sigma.errplus * two_sigma.scale).abs() < 1e-9);
        assert!((two_sigma.errminus - one_sigma.errminus * two_sigma.scale).abs() < 1e-9);
    }

    #[test]
    fn full_confidence_level_keeps_zero_spread_zero() {
        // cl = 100 is valid input but makes the CL factor infinite; a flat
        // ensemble must still report zero errors, not NaN.
        for conv in [hessian(), symmhessian()] {
            let unc = compute(&conv, &[3.0, 3.0, 3.0], 100.0, false).unwrap();
            assert_eq!(unc.errplus, 0.0);
            assert_eq!(unc.errminus, 0.0);
            assert_eq!(unc.errsymm, 0.0);
            assert_eq!(unc.err_par, 0.0);
            assert!(unc.scale.is_infinite());
        }
    }

    #[test]
    fn full_confidence_level_nonzero_spread_is_unbounded() {
        let unc = compute(&hessian(), &[10.0, 11.0, 9.5, 10.8, 9.2], 100.0, false).unwrap();
        assert!(unc.errplus.is_infinite());
        assert!(unc.errminus.is_infinite());
        assert!(unc.errsymm.is_infinite());
    }

    #[test]
    fn full_confidence_level_one_sided_geometric_stays_finite() {
        // Both variations above central: the zero downward side pins the
        // geometric symmetrization at zero even with an infinite factor.
        let unc = compute(&hessian(), &[1.0, 1.5, 1.2], 100.0, true).unwrap();
        assert!(unc.errplus.is_infinite());
        assert_eq!(unc.errminus, 0.0);
        assert_eq!(unc.errsymm, 0.0);
    }

    #[test]
    fn symmhessian_quadrature() {
        let values = [10.0, 10.3, 9.6];
        let unc = compute(&symmhessian(), &values, CL_1SIGMA, false).unwrap();
        let expected = (0.09f64 + 0.16).sqrt();
        assert!((unc.errsymm - expected).abs() < 1e-3);
        assert_eq!(unc.errplus, unc.errsymm);
        assert_eq!(unc.errminus, unc.errsymm);
    }

    #[test]
    fn parameter_pairs_split_off_the_tail() {
        // hessian+as: one eigenvector pair, one alpha_s variation pair.
        let conv = ErrorConvention::parse("hessian+as");
        let values = [10.0, 11.0, 9.0, 10.4, 9.8];
        let unc = compute(&conv, &values, CL_1SIGMA, false).unwrap();

        assert!((unc.errplus_pdf - 1.0).abs() < 1e-9);
        assert!((unc.errminus_pdf - 1.0).abs() < 1e-9);
        assert!((unc.err_par - 0.3).abs() < 1e-9);
        let expected_total = (1.0f64 + 0.09).sqrt();
        assert!((unc.errplus - expected_total).abs() < 1e-9);
        assert!((unc.errminus - expected_total).abs() < 1e-9);
        assert!((unc.errsymm - expected_total).abs() < 1e-9);
    }

    #[test]
    fn parameter_pairs_need_enough_members() {
        let conv = ErrorConvention::parse("hessian+as");
        // Only one error member: cannot hold the declared variation pair.
        assert_eq!(
            compute(&conv, &[10.0, 11.0], CL_1SIGMA, false),
            Err(Error::InvalidEnsembleLength(2))
        );
    }

    #[test]
    fn replicas_symmetric_sample() {
        let values = [10.0, 9.0, 10.0, 11.0];
        let unc = compute(&replicas(), &values, CL_1SIGMA, false).unwrap();
        assert_eq!(unc.central, 10.0);
        assert!((unc.errsymm - 1.0).abs() < 1e-9);
        // R-7 bounds of the central 68.27% interval of [9, 10, 11]
        assert!((unc.errplus - 0.6827).abs() < 1e-2);
        assert!((unc.errminus - 0.6827).abs() < 1e-2);
        assert_eq!(unc.err_par, 0.0);
    }

    #[test]
    fn replicas_alternative_uses_sample_mean() {
        let values = [0.0, 9.0, 10.0, 11.0];
        let default = compute(&replicas(), &values, CL_1SIGMA, false).unwrap();
        let alt = compute(&replicas(), &values, CL_1SIGMA, true).unwrap();
        assert_eq!(default.central, 0.0);
        assert!((alt.central - 10.0).abs() < 1e-12);
        // Member 0 far below the bulk: the downward error clamps at zero.
        assert_eq!(default.errminus, 0.0);
        assert!(alt.errminus > 0.0);
    }

    #[test]
    fn replicas_widen_with_confidence_level() {
        let values: Vec<f64> = std::iter::once(50.0)
            .chain((0..101).map(|i| i as f64))
            .collect();
        let narrow = compute(&replicas(), &values, CL_1SIGMA, false).unwrap();
        let wide = compute(&replicas(), &values, 95.0, false).unwrap();
        assert!(wide.errplus > narrow.errplus);
        assert!(wide.errminus > narrow.errminus);
        // The symmetric error stays the 1-sigma sample estimator.
        assert_eq!(wide.errsymm, narrow.errsymm);
    }

    #[test]
    fn replicas_single_replica_degrades_gracefully() {
        let unc = compute(&replicas(), &[10.0, 10.5], CL_1SIGMA, false).unwrap();
        assert_eq!(unc.errsymm, 0.0);
        assert!((unc.errplus - 0.5).abs() < 1e-12);
        assert_eq!(unc.errminus, 0.0);
    }

    #[test]
    fn none_convention_reports_zero_uncertainty() {
        let conv = ErrorConvention::parse("none");
        let unc = compute(&conv, &[5.0], 68.27, false).unwrap();
        assert_eq!(unc.central, 5.0);
        assert_eq!(unc.errplus, 0.0);
        assert_eq!(unc.errminus, 0.0);
        assert_eq!(unc.errsymm, 0.0);
        assert_eq!(unc.errplus_pdf, 0.0);
        assert_eq!(unc.errminus_pdf, 0.0);
        assert_eq!(unc.errsymm_pdf, 0.0);
        assert_eq!(unc.err_par, 0.0);
        // scale stays positive even when no rescaling applies
        assert_eq!(unc.scale, 1.0);
    }

    #[test]
    fn unknown_convention_behaves_like_none() {
        let conv = ErrorConvention::parse("custom");
        let unc = compute(&conv, &[5.0, 99.0, -99.0], 68.27, false).unwrap();
        assert_eq!(unc.central, 5.0);
        assert_eq!(unc.errsymm, 0.0);
    }

    #[test]
    fn compute_is_deterministic() {
        let values = [10.0, 11.0, 9.5, 10.8, 9.2];
        let a = compute(&hessian(), &values, 90.0, true).unwrap();
        let b = compute(&hessian(), &values, 90.0, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn descriptor_uncertainty_uses_declared_convention() {
        use crate::registry::Registry;

        let mut reg = Registry::new();
        reg.add_set("SYMM", 70000, 3, "symmhessian").unwrap();
        let set = reg.descriptor("SYMM").unwrap();
        let unc = set.uncertainty(&[10.0, 10.3, 9.6], CL_1SIGMA, false).unwrap();
        assert_eq!(unc.errplus, unc.errminus);
        assert_eq!(unc.errplus, unc.errsymm);
    }
}
