// MIT License
// Copyright 2024--present pdfun developers

//! Core library for pdfun: PDF set identity resolution and uncertainty
//! propagation, exposed to C/C++ through an opaque-handle API.
//!
//! The crate has two components:
//!
//! - **Identity resolver** ([`registry`], [`pdf`]) — maps between the three
//!   ways of naming a PDF member: `(set name, member index)`, a global
//!   integer id (LHAID), and an in-memory set descriptor. Member handles
//!   wrap the collaborator library's evaluator behind a C callback, so the
//!   interpolation machinery itself stays outside this crate.
//! - **Uncertainty propagator** ([`uncertainty`]) — combines an ordered
//!   ensemble of per-member predictions into central value, asymmetric and
//!   symmetric errors, confidence-level rescaling, and the PDF /
//!   nuisance-parameter split, under the set's declared error convention
//!   (Hessian eigenvector pairs, symmetric Hessian, Monte Carlo replicas,
//!   or none).
//!
//! Both components are pure over immutable inputs: a populated [`Registry`]
//! and [`uncertainty::compute`] are safe to use from any number of threads
//! without coordination.
//!
//! The [`c_api`] module is the FFI surface; cbindgen collects it into
//! `include/pdfun.h` (build with the `gen-header` feature). Every
//! `extern "C"` function returns a [`pdfun_status_t`](status::pdfun_status_t)
//! and reports failure details through `pdfun_last_error()`.

#![allow(non_camel_case_types)]

pub mod c_api;
pub mod error;
pub mod pdf;
pub mod registry;
pub mod special;
pub mod stats;
pub mod status;
pub mod types;
pub mod uncertainty;

pub use error::Error;
pub use pdf::PdfImpl;
pub use registry::{PdfSetDescriptor, Registry};
pub use types::{ConventionKind, ErrorConvention, PdfSetIdentity, PdfUncertainty};
pub use uncertainty::{compute, CL_1SIGMA};
