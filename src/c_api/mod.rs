// MIT License
// Copyright 2024--present pdfun developers

//! Public C API entry points.
//!
//! Each submodule exposes `extern "C"` functions that cbindgen collects into
//! `include/pdfun.h`. All functions in this module follow three invariants:
//!
//! 1. **Return [`pdfun_status_t`](crate::status::pdfun_status_t)** (or a
//!    pointer / void for constructors and destructors).
//! 2. **Wrap the body in [`catch_unwind`](crate::status::catch_unwind)** to
//!    prevent panics from crossing the FFI boundary.
//! 3. **Validate pointer arguments** and call
//!    [`set_last_error`](crate::status::set_last_error) before returning a
//!    non-success status.
//!
//! Strings returned to C are copied into caller-provided buffers;
//! `PDFUN_BUFFER_SIZE_ERROR` signals a buffer too small for the value plus
//! its NUL terminator.
//!
//! ## Submodules
//!
//! - [`registry`] — Registry lifecycle and LHAID resolution.
//! - [`pdf`] — PDF member handle lifecycle and descriptor accessors.
//! - [`uncertainty`] — The `pdfun_uncertainty` combination entry point.

use std::os::raw::c_char;

use crate::status::{pdfun_status_t, set_last_error};

pub mod pdf;
pub mod registry;
pub mod uncertainty;

/// Copy `value` into `buf` (capacity `buflen` bytes) as a NUL-terminated C
/// string.
///
/// # Safety
/// `buf` must point to at least `buflen` writable bytes.
pub(crate) unsafe fn copy_str(
    context: &str,
    value: &str,
    buf: *mut c_char,
    buflen: usize,
) -> pdfun_status_t {
    if buf.is_null() {
        set_last_error(&format!("{context}: buffer is NULL"));
        return pdfun_status_t::PDFUN_INVALID_PARAMETER;
    }
    let bytes = value.as_bytes();
    if bytes.len() + 1 > buflen {
        set_last_error(&format!(
            "{context}: buffer of {buflen} bytes too small for {} bytes + NUL",
            bytes.len()
        ));
        return pdfun_status_t::PDFUN_BUFFER_SIZE_ERROR;
    }
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf as *mut u8, bytes.len());
        *buf.add(bytes.len()) = 0;
    }
    pdfun_status_t::PDFUN_SUCCESS
}

/// Borrow a `*const c_char` as `&str`, reporting invalid input through the
/// thread-local error slot.
///
/// # Safety
/// `ptr` must be NULL or a valid NUL-terminated C string.
pub(crate) unsafe fn str_arg<'a>(
    context: &str,
    name: &str,
    ptr: *const c_char,
) -> Result<&'a str, pdfun_status_t> {
    if ptr.is_null() {
        set_last_error(&format!("{context}: {name} is NULL"));
        return Err(pdfun_status_t::PDFUN_INVALID_PARAMETER);
    }
    unsafe { std::ffi::CStr::from_ptr(ptr) }.to_str().map_err(|_| {
        set_last_error(&format!("{context}: {name} is not valid UTF-8"));
        pdfun_status_t::PDFUN_INVALID_PARAMETER
    })
}
