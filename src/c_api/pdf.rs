// MIT License
// Copyright 2024--present pdfun developers

//! C API for the PDF member handle lifecycle: create, evaluate, inspect,
//! free.
//!
//! The typical usage pattern from C/C++ is:
//!
//! ```c
//! // 1. Create a handle (the callback closes over the native PDF object)
//! pdfun_pdf_t *pdf = pdfun_pdf_new(reg, "CT18NNLO", 0, my_xfx, my_alphas, native_pdf, NULL);
//!
//! // 2. Evaluate and inspect
//! double v;
//! pdfun_status_t s = pdfun_pdf_xfx_q2(pdf, 21, 1e-3, 1e4, &v);
//! if (s != PDFUN_SUCCESS) { /* handle error */ }
//!
//! char errtype[32];
//! pdfun_pdf_error_type(pdf, errtype, sizeof errtype);
//!
//! // 3. Clean up (runs the free_fn on the native object, if given)
//! pdfun_pdf_free(pdf);
//! ```
//!
//! `pdfun_pdf_new` / `pdfun_pdf_new_lhaid` return `NULL` on failure with
//! the reason available from `pdfun_last_error()`.

use std::os::raw::{c_char, c_void};

use crate::pdf::{pdfun_pdf_t, AlphasCallback, FreeFn, XfxCallback};
use crate::status::{catch_unwind, fail, pdfun_status_t, set_last_error};
use crate::types::PdfSetIdentity;

use super::registry::pdfun_registry_t;

/// Create a PDF member handle from a set name and member index.
///
/// - `reg`: a registry populated via `pdfun_registry_add_set`.
/// - `setname` / `member`: the identity to validate and own.
/// - `callback`: evaluator for this member (see `pdfun_pdf_xfx_q2`).
/// - `alphas`: optional evaluator for the set's strong coupling (see
///   `pdfun_pdf_alphas_q2`). Pass `NULL` if the collaborator does not
///   expose one.
/// - `user_data`: opaque pointer forwarded to every callback invocation
///   (typically the collaborator's member object).
/// - `free_fn`: optional destructor for `user_data`. Pass `NULL` if the
///   caller manages the lifetime externally.
///
/// Returns a heap-allocated `pdfun_pdf_t*`, or `NULL` on failure (unknown
/// set, member out of range, bad arguments) with the reason available from
/// `pdfun_last_error()`. The caller must eventually pass the returned
/// pointer to `pdfun_pdf_free`.
#[no_mangle]
pub unsafe extern "C" fn pdfun_pdf_new(
    reg: *const pdfun_registry_t,
    setname: *const c_char,
    member: i32,
    callback: XfxCallback,
    alphas: Option<AlphasCallback>,
    user_data: *mut c_void,
    free_fn: Option<FreeFn>,
) -> *mut pdfun_pdf_t {
    if reg.is_null() {
        set_last_error("pdfun_pdf_new: reg is NULL");
        return std::ptr::null_mut();
    }
    let setname = match unsafe { super::str_arg("pdfun_pdf_new", "setname", setname) } {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };

    let reg = unsafe { &*reg };
    match reg.construct(
        PdfSetIdentity::new(setname, member),
        callback,
        alphas,
        user_data,
        free_fn,
    ) {
        Ok(pdf) => Box::into_raw(Box::new(pdf)),
        Err(e) => {
            fail(&e);
            std::ptr::null_mut()
        }
    }
}

/// Create a PDF member handle from a global LHAID.
///
/// Resolves `lhaid` through the registry, then behaves exactly like
/// `pdfun_pdf_new`; same failure modes plus unknown-LHAID.
#[no_mangle]
pub unsafe extern "C" fn pdfun_pdf_new_lhaid(
    reg: *const pdfun_registry_t,
    lhaid: i32,
    callback: XfxCallback,
    alphas: Option<AlphasCallback>,
    user_data: *mut c_void,
    free_fn: Option<FreeFn>,
) -> *mut pdfun_pdf_t {
    if reg.is_null() {
        set_last_error("pdfun_pdf_new_lhaid: reg is NULL");
        return std::ptr::null_mut();
    }
    let reg = unsafe { &*reg };
    match reg.construct_from_lhaid(lhaid, callback, alphas, user_data, free_fn) {
        Ok(pdf) => Box::into_raw(Box::new(pdf)),
        Err(e) => {
            fail(&e);
            std::ptr::null_mut()
        }
    }
}

/// Evaluate the member's `x * f(x, Q2)` through its callback.
///
/// The result is written to `out`. Returns `PDFUN_INVALID_PARAMETER` for
/// NULL arguments.
#[no_mangle]
pub unsafe extern "C" fn pdfun_pdf_xfx_q2(
    pdf: *const pdfun_pdf_t,
    flavor: i32,
    x: f64,
    q2: f64,
    out: *mut f64,
) -> pdfun_status_t {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if pdf.is_null() {
            set_last_error("pdfun_pdf_xfx_q2: pdf is NULL");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }
        if out.is_null() {
            set_last_error("pdfun_pdf_xfx_q2: out is NULL");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }
        let pdf = unsafe { &*pdf };
        unsafe { *out = pdf.xfx_q2(flavor, x, q2) };
        pdfun_status_t::PDFUN_SUCCESS
    }))
}

/// Evaluate the set's strong coupling `alpha_s(Q2)` through the handle's
/// optional callback.
///
/// Returns `PDFUN_INVALID_PARAMETER` if the handle was created without an
/// alpha_s callback, or for NULL arguments.
#[no_mangle]
pub unsafe extern "C" fn pdfun_pdf_alphas_q2(
    pdf: *const pdfun_pdf_t,
    q2: f64,
    out: *mut f64,
) -> pdfun_status_t {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if pdf.is_null() || out.is_null() {
            set_last_error("pdfun_pdf_alphas_q2: NULL argument");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }
        let pdf = unsafe { &*pdf };
        match unsafe { pdf.alphas_q2(q2) } {
            Some(v) => {
                unsafe { *out = v };
                pdfun_status_t::PDFUN_SUCCESS
            }
            None => {
                set_last_error("pdfun_pdf_alphas_q2: no alpha_s callback registered");
                pdfun_status_t::PDFUN_INVALID_PARAMETER
            }
        }
    }))
}

/// Copy the handle's set name into `buf` (capacity `buflen`).
#[no_mangle]
pub unsafe extern "C" fn pdfun_pdf_setname(
    pdf: *const pdfun_pdf_t,
    buf: *mut c_char,
    buflen: usize,
) -> pdfun_status_t {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if pdf.is_null() {
            set_last_error("pdfun_pdf_setname: pdf is NULL");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }
        let pdf = unsafe { &*pdf };
        unsafe { super::copy_str("pdfun_pdf_setname", pdf.set().name(), buf, buflen) }
    }))
}

/// Write the handle's member index to `out`.
#[no_mangle]
pub unsafe extern "C" fn pdfun_pdf_member(
    pdf: *const pdfun_pdf_t,
    out: *mut i32,
) -> pdfun_status_t {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if pdf.is_null() || out.is_null() {
            set_last_error("pdfun_pdf_member: NULL argument");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }
        unsafe { *out = (*pdf).identity().member };
        pdfun_status_t::PDFUN_SUCCESS
    }))
}

/// Write the declared member count of the handle's set to `out`.
#[no_mangle]
pub unsafe extern "C" fn pdfun_pdf_n_members(
    pdf: *const pdfun_pdf_t,
    out: *mut i32,
) -> pdfun_status_t {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if pdf.is_null() || out.is_null() {
            set_last_error("pdfun_pdf_n_members: NULL argument");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }
        unsafe { *out = (*pdf).set().n_members() };
        pdfun_status_t::PDFUN_SUCCESS
    }))
}

/// Copy the declared error-type string of the handle's set into `buf`.
#[no_mangle]
pub unsafe extern "C" fn pdfun_pdf_error_type(
    pdf: *const pdfun_pdf_t,
    buf: *mut c_char,
    buflen: usize,
) -> pdfun_status_t {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if pdf.is_null() {
            set_last_error("pdfun_pdf_error_type: pdf is NULL");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }
        let pdf = unsafe { &*pdf };
        unsafe { super::copy_str("pdfun_pdf_error_type", pdf.set().error_type(), buf, buflen) }
    }))
}

/// Free a PDF handle previously obtained from `pdfun_pdf_new` or
/// `pdfun_pdf_new_lhaid`. Runs the handle's `free_fn` on its `user_data`
/// if one was given.
///
/// If `pdf` is `NULL`, this function is a no-op.
/// After this call, `pdf` must not be used again.
#[no_mangle]
pub unsafe extern "C" fn pdfun_pdf_free(pdf: *mut pdfun_pdf_t) {
    if !pdf.is_null() {
        drop(unsafe { Box::from_raw(pdf) });
    }
}
