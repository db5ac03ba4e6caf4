// MIT License
// Copyright 2024--present pdfun developers

//! C API for the uncertainty propagator.
//!
//! A single entry point: combine an ordered member ensemble into a
//! [`pdfun_uncertainty_t`] under a set's declared error convention.
//!
//! ```c
//! double values[] = {10.0, 11.0, 9.5, 10.8, 9.2};
//! pdfun_uncertainty_t unc;
//! pdfun_status_t s = pdfun_uncertainty("hessian", values, 5, 68.268949, false, &unc);
//! if (s != PDFUN_SUCCESS) {
//!     fprintf(stderr, "pdfun error: %s\n", pdfun_last_error());
//! }
//! printf("%g +%g -%g\n", unc.central, unc.errplus, unc.errminus);
//! ```

use std::os::raw::c_char;

use crate::status::{catch_unwind, fail, pdfun_status_t, set_last_error};
use crate::types::{pdfun_uncertainty_t, ErrorConvention};
use crate::uncertainty;

/// Combine a member ensemble into a structured uncertainty.
///
/// - `error_type`: the set's declared error-type string; unrecognized
///   values degrade to zero uncertainty rather than failing.
/// - `values` / `n_values`: the ensemble, member 0 first, in set order.
/// - `cl`: requested confidence level in percent, in (0, 100].
/// - `alternative`: select the convention's documented alternative formula.
/// - `out`: the result, written only on success.
///
/// Returns `PDFUN_INVALID_ENSEMBLE` for an empty or convention-mismatched
/// ensemble and `PDFUN_INVALID_CL` for an out-of-range confidence level.
#[no_mangle]
pub unsafe extern "C" fn pdfun_uncertainty(
    error_type: *const c_char,
    values: *const f64,
    n_values: usize,
    cl: f64,
    alternative: bool,
    out: *mut pdfun_uncertainty_t,
) -> pdfun_status_t {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        let error_type =
            match unsafe { super::str_arg("pdfun_uncertainty", "error_type", error_type) } {
                Ok(s) => s,
                Err(status) => return status,
            };
        if values.is_null() && n_values > 0 {
            set_last_error("pdfun_uncertainty: values is NULL");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }
        if out.is_null() {
            set_last_error("pdfun_uncertainty: out is NULL");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }

        let values: &[f64] = if n_values == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(values, n_values) }
        };
        let convention = ErrorConvention::parse(error_type);
        match uncertainty::compute(&convention, values, cl, alternative) {
            Ok(unc) => {
                unsafe { *out = unc };
                pdfun_status_t::PDFUN_SUCCESS
            }
            Err(e) => fail(&e),
        }
    }))
}
