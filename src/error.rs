// MIT License
// Copyright 2024--present pdfun developers

//! Typed error taxonomy for the resolver and the uncertainty propagator.
//!
//! Every fallible core operation returns `Result<_, Error>`. All variants are
//! local validation failures: the inputs are wrong, and resubmitting the same
//! inputs fails identically. The C API converts an [`Error`] into a
//! [`pdfun_status_t`](crate::status::pdfun_status_t) code plus a thread-local
//! message retrievable via `pdfun_last_error()`.

use crate::status::pdfun_status_t;

/// Validation failures surfaced by `pdfun-core`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The LHAID is not covered by any registered set.
    #[error("unknown LHAID: {0}")]
    UnknownIdentifier(i32),

    /// The set name is not registered.
    #[error("unknown PDF set: {0}")]
    UnknownSet(String),

    /// The member index exceeds the set's declared member count.
    #[error("member {member} out of range for set {set} with {n_members} members")]
    MemberOutOfRange {
        /// Name of the set the lookup was made against.
        set: String,
        /// Requested member index.
        member: i32,
        /// The set's declared member count.
        n_members: i32,
    },

    /// A set name was registered twice.
    #[error("PDF set already registered: {0}")]
    DuplicateSet(String),

    /// The ensemble is empty, or its error members do not form the whole
    /// eigenvector pairs the convention requires.
    #[error("invalid ensemble length: {0}")]
    InvalidEnsembleLength(usize),

    /// The confidence level is outside the half-open interval (0, 100].
    #[error("invalid confidence level: {0} (expected 0 < cl <= 100)")]
    InvalidConfidenceLevel(f64),
}

impl Error {
    /// The status code reported for this error at the C boundary.
    pub fn status(&self) -> pdfun_status_t {
        match self {
            Error::UnknownIdentifier(_) => pdfun_status_t::PDFUN_UNKNOWN_ID,
            Error::UnknownSet(_) => pdfun_status_t::PDFUN_UNKNOWN_SET,
            Error::MemberOutOfRange { .. } => pdfun_status_t::PDFUN_MEMBER_RANGE,
            Error::DuplicateSet(_) => pdfun_status_t::PDFUN_DUPLICATE_SET,
            Error::InvalidEnsembleLength(_) => pdfun_status_t::PDFUN_INVALID_ENSEMBLE,
            Error::InvalidConfidenceLevel(_) => pdfun_status_t::PDFUN_INVALID_CL,
        }
    }
}
