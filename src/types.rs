// MIT License
// Copyright 2024--present pdfun developers

//! Core data types shared by the resolver and the uncertainty propagator.
//!
//! [`PdfUncertainty`] is `#[repr(C)]` — it is the one value type that crosses
//! the FFI boundary by copy, so C callers can allocate it on the stack and
//! read the fields directly. Everything else is plain Rust, converted at the
//! boundary by the `c_api` layer.
//!
//! ## Error conventions
//!
//! A PDF set declares how its members encode uncertainty through a free-form
//! error-type string (set metadata, supplied by the collaborator library).
//! The grammar is the standard one:
//!
//! | String | Meaning |
//! |--------|---------|
//! | `hessian` | eigenvector pairs (member 1,2 = pair 1 up/down, ...) |
//! | `symmhessian` | one-sided eigenvector deviations |
//! | `replicas` | Monte Carlo replica samples |
//! | anything else | no declared uncertainty model |
//!
//! Trailing `+`-separated qualifiers (e.g. `hessian+as`) each declare one
//! nuisance-parameter variation pair occupying the two trailing members of
//! the ensemble. These feed the `*_pdf` / `err_par` split of
//! [`PdfUncertainty`].

use std::fmt;

/// Identifies one concrete member within a named PDF set.
///
/// Immutable once constructed. Produced either directly from a
/// caller-supplied name + index, or by resolving an LHAID through
/// [`Registry::resolve_by_lhaid`](crate::registry::Registry::resolve_by_lhaid).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfSetIdentity {
    /// Name of the PDF set.
    pub name: String,
    /// Member index within the set (0 = central).
    pub member: i32,
}

impl PdfSetIdentity {
    /// Create an identity from a set name and member index.
    pub fn new(name: impl Into<String>, member: i32) -> Self {
        Self {
            name: name.into(),
            member,
        }
    }
}

impl fmt::Display for PdfSetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.member)
    }
}

/// How the error members of a set combine into an uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConventionKind {
    /// Eigenvector pairs: members (1,2), (3,4), ... are up/down variations.
    Hessian,
    /// One-sided eigenvector deviations, one member per direction.
    SymmHessian,
    /// Independent Monte Carlo replica samples.
    Replicas,
    /// No declared uncertainty model; all errors report as zero.
    None,
}

/// A parsed error-type declaration: the combination rule plus the number of
/// trailing nuisance-parameter variation pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorConvention {
    /// The combination rule for the leading error members.
    pub kind: ConventionKind,
    /// Number of nuisance-parameter pairs at the tail of the ensemble.
    /// Two members per pair. Only meaningful for the Hessian kinds.
    pub par_pairs: usize,
}

impl ErrorConvention {
    /// Parse an error-type string from set metadata.
    ///
    /// Unrecognized leading tokens degrade to [`ConventionKind::None`]
    /// rather than failing — sets with incomplete metadata are valid inputs
    /// whose uncertainty is reported as zero.
    ///
    /// ```
    /// use pdfun_core::types::{ConventionKind, ErrorConvention};
    ///
    /// let conv = ErrorConvention::parse("hessian+as");
    /// assert_eq!(conv.kind, ConventionKind::Hessian);
    /// assert_eq!(conv.par_pairs, 1);
    /// ```
    pub fn parse(error_type: &str) -> Self {
        let mut tokens = error_type.trim().split('+');
        let kind = match tokens.next().unwrap_or("") {
            "hessian" => ConventionKind::Hessian,
            "symmhessian" => ConventionKind::SymmHessian,
            "replicas" => ConventionKind::Replicas,
            _ => ConventionKind::None,
        };
        let par_pairs = match kind {
            // Qualifiers only describe extra member pairs for the Hessian
            // kinds; replica ensembles are treated as a whole.
            ConventionKind::Hessian | ConventionKind::SymmHessian => {
                tokens.filter(|t| !t.is_empty()).count()
            }
            _ => 0,
        };
        Self { kind, par_pairs }
    }

    /// Convention with no nuisance-parameter split.
    pub fn plain(kind: ConventionKind) -> Self {
        Self { kind, par_pairs: 0 }
    }
}

impl fmt::Display for ErrorConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ConventionKind::Hessian => "hessian",
            ConventionKind::SymmHessian => "symmhessian",
            ConventionKind::Replicas => "replicas",
            ConventionKind::None => "none",
        };
        write!(f, "{kind}")?;
        for _ in 0..self.par_pairs {
            write!(f, "+par")?;
        }
        Ok(())
    }
}

/// Structured result of combining a member ensemble into an uncertainty.
///
/// A pure value type, fully determined by its inputs and created fresh on
/// every call. The `*_pdf` fields and `err_par` carry the PDF /
/// nuisance-parameter split; when the convention declares no split,
/// `err_par` is zero and the `*_pdf` fields equal their unsuffixed
/// counterparts.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfUncertainty {
    /// Central (nominal) prediction.
    pub central: f64,
    /// Upward uncertainty, at the requested confidence level.
    pub errplus: f64,
    /// Downward uncertainty, at the requested confidence level.
    pub errminus: f64,
    /// Symmetrized uncertainty. Always non-negative.
    pub errsymm: f64,
    /// Multiplicative factor converting a 1-sigma error to the requested
    /// confidence level. Always positive; 1.0 at the native reference level.
    pub scale: f64,
    /// Upward uncertainty from the PDF eigenvectors alone.
    pub errplus_pdf: f64,
    /// Downward uncertainty from the PDF eigenvectors alone.
    pub errminus_pdf: f64,
    /// Symmetrized uncertainty from the PDF eigenvectors alone.
    pub errsymm_pdf: f64,
    /// Uncertainty from the nuisance-parameter variation pairs.
    pub err_par: f64,
}

impl PdfUncertainty {
    /// A zero-error result around `central` with the given `scale`.
    pub(crate) fn exact(central: f64, scale: f64) -> Self {
        Self {
            central,
            errplus: 0.0,
            errminus: 0.0,
            errsymm: 0.0,
            scale,
            errplus_pdf: 0.0,
            errminus_pdf: 0.0,
            errsymm_pdf: 0.0,
            err_par: 0.0,
        }
    }
}

/// C-side name of the uncertainty value struct.
#[allow(non_camel_case_types)]
pub type pdfun_uncertainty_t = PdfUncertainty;
