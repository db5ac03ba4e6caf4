// MIT License
// Copyright 2024--present pdfun developers

//! Error handling following the
//! [metatensor](https://docs.metatensor.org/) pattern.
//!
//! This module provides three components that work together to give C/C++
//! callers safe, informative error reporting from Rust:
//!
//! 1. **[`pdfun_status_t`]** — An integer-valued enum returned from every
//!    `extern "C"` function. `PDFUN_SUCCESS` (0) means the call succeeded;
//!    any other value indicates a specific error category.
//!
//! 2. **Thread-local error message** — On failure, a human-readable
//!    description is stored in a thread-local `CString`. The C caller
//!    retrieves it with [`pdfun_last_error()`]. The pointer is valid until
//!    the next `pdfun_*` call on the same thread.
//!
//! 3. **[`catch_unwind`]** — A wrapper used inside every `extern "C"`
//!    function to catch Rust panics before they unwind across the FFI
//!    boundary (which is undefined behaviour). Caught panics become
//!    `PDFUN_INTERNAL_ERROR` with the panic message stored for retrieval.
//!
//! ## Usage from C
//!
//! ```c
//! pdfun_status_t s = pdfun_uncertainty(errtype, values, n, cl, false, &unc);
//! if (s != PDFUN_SUCCESS) {
//!     fprintf(stderr, "pdfun error: %s\n", pdfun_last_error());
//! }
//! ```

use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use crate::error::Error;

/// Status codes returned by all C API functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum pdfun_status_t {
    /// Operation completed successfully.
    PDFUN_SUCCESS = 0,
    /// An invalid parameter was passed (null pointer, bad string, etc.).
    PDFUN_INVALID_PARAMETER = 1,
    /// An internal error occurred (e.g. a Rust panic was caught).
    PDFUN_INTERNAL_ERROR = 2,
    /// An LHAID was not found in the registry.
    PDFUN_UNKNOWN_ID = 3,
    /// A set name was not found in the registry.
    PDFUN_UNKNOWN_SET = 4,
    /// A member index exceeded the set's declared member count.
    PDFUN_MEMBER_RANGE = 5,
    /// A set name was registered twice.
    PDFUN_DUPLICATE_SET = 6,
    /// An ensemble was empty or did not match the error convention.
    PDFUN_INVALID_ENSEMBLE = 7,
    /// A confidence level was outside (0, 100].
    PDFUN_INVALID_CL = 8,
    /// A buffer was too small for the requested operation.
    PDFUN_BUFFER_SIZE_ERROR = 9,
}

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

/// Store an error message in the thread-local slot.
pub(crate) fn set_last_error(msg: &str) {
    LAST_ERROR.with(|cell| {
        let c = CString::new(msg).unwrap_or_else(|_| {
            CString::new("(error message contained interior NUL)").unwrap()
        });
        *cell.borrow_mut() = c;
    });
}

/// Store a typed core error and return its status code.
pub(crate) fn fail(err: &Error) -> pdfun_status_t {
    set_last_error(&err.to_string());
    err.status()
}

/// Retrieve a pointer to the last error message for the current thread.
///
/// The pointer is valid until the next call to any `pdfun_*` function
/// on the same thread.
///
/// # Safety
/// This is intended to be called from C. The returned pointer must not
/// be freed by the caller.
#[no_mangle]
pub unsafe extern "C" fn pdfun_last_error() -> *const c_char {
    LAST_ERROR.with(|cell| cell.borrow().as_ptr())
}

/// Execute a closure, catching any panics and converting them to status codes.
///
/// On success, returns `PDFUN_SUCCESS`. On panic, stores the panic message
/// in the thread-local error slot and returns `PDFUN_INTERNAL_ERROR`.
pub(crate) fn catch_unwind<F>(f: F) -> pdfun_status_t
where
    F: FnOnce() -> pdfun_status_t + std::panic::UnwindSafe,
{
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(e) => {
            let msg = if let Some(s) = e.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = e.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            set_last_error(&msg);
            pdfun_status_t::PDFUN_INTERNAL_ERROR
        }
    }
}
