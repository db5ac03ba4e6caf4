// MIT License
// Copyright 2024--present pdfun developers

//! C API for the registry lifecycle: create, populate, resolve, free.
//!
//! The collaborator library feeds its global PDF index into a
//! `pdfun_registry_t` once at startup, then resolves LHAIDs and constructs
//! member handles against it. The typical usage pattern from C/C++ is:
//!
//! ```c
//! // 1. Build the registry from the native index
//! pdfun_registry_t *reg = pdfun_registry_new();
//! pdfun_registry_add_set(reg, "CT18NNLO", 14000, 59, "hessian");
//!
//! // 2. Resolve a global id
//! char setname[64];
//! int32_t member;
//! pdfun_status_t s = pdfun_lookup_pdf(reg, 14013, setname, sizeof setname, &member);
//! if (s != PDFUN_SUCCESS) { /* handle error */ }
//!
//! // 3. Clean up
//! pdfun_registry_free(reg);
//! ```

use std::os::raw::c_char;

use crate::registry::Registry;
use crate::status::{catch_unwind, fail, pdfun_status_t, set_last_error};

/// Opaque registry handle exposed to C as `pdfun_registry_t`.
#[allow(non_camel_case_types)]
pub type pdfun_registry_t = Registry;

/// Create a new, empty registry.
///
/// Returns a heap-allocated `pdfun_registry_t*`. The caller must eventually
/// pass the returned pointer to `pdfun_registry_free`.
#[no_mangle]
pub unsafe extern "C" fn pdfun_registry_new() -> *mut pdfun_registry_t {
    Box::into_raw(Box::new(Registry::new()))
}

/// Register one PDF set and its LHAID block.
///
/// - `name`: set name, NUL-terminated.
/// - `lhaid_base`: LHAID of member 0; member `m` gets `lhaid_base + m`.
/// - `n_members`: declared member count, central included.
/// - `error_type`: the set's declared error-type string (e.g. `"hessian"`,
///   `"replicas"`, `"hessian+as"`).
///
/// Returns `PDFUN_DUPLICATE_SET` if `name` was already registered.
#[no_mangle]
pub unsafe extern "C" fn pdfun_registry_add_set(
    reg: *mut pdfun_registry_t,
    name: *const c_char,
    lhaid_base: i32,
    n_members: i32,
    error_type: *const c_char,
) -> pdfun_status_t {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if reg.is_null() {
            set_last_error("pdfun_registry_add_set: reg is NULL");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }
        let name = match unsafe { super::str_arg("pdfun_registry_add_set", "name", name) } {
            Ok(s) => s,
            Err(status) => return status,
        };
        let error_type =
            match unsafe { super::str_arg("pdfun_registry_add_set", "error_type", error_type) } {
                Ok(s) => s,
                Err(status) => return status,
            };

        let reg = unsafe { &mut *reg };
        match reg.add_set(name, lhaid_base, n_members, error_type) {
            Ok(()) => pdfun_status_t::PDFUN_SUCCESS,
            Err(e) => fail(&e),
        }
    }))
}

/// Resolve an LHAID to its `(set name, member index)` pair.
///
/// On success the set name is copied into `setname` (capacity
/// `setname_len` bytes, NUL-terminated) and the member index is written to
/// `member`. Returns `PDFUN_UNKNOWN_ID` if no registered block covers
/// `lhaid`, or `PDFUN_BUFFER_SIZE_ERROR` if the name does not fit.
#[no_mangle]
pub unsafe extern "C" fn pdfun_lookup_pdf(
    reg: *const pdfun_registry_t,
    lhaid: i32,
    setname: *mut c_char,
    setname_len: usize,
    member: *mut i32,
) -> pdfun_status_t {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if reg.is_null() {
            set_last_error("pdfun_lookup_pdf: reg is NULL");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }
        if member.is_null() {
            set_last_error("pdfun_lookup_pdf: member is NULL");
            return pdfun_status_t::PDFUN_INVALID_PARAMETER;
        }

        let reg = unsafe { &*reg };
        let identity = match reg.resolve_by_lhaid(lhaid) {
            Ok(id) => id,
            Err(e) => return fail(&e),
        };

        let status =
            unsafe { super::copy_str("pdfun_lookup_pdf", &identity.name, setname, setname_len) };
        if status != pdfun_status_t::PDFUN_SUCCESS {
            return status;
        }
        unsafe { *member = identity.member };
        pdfun_status_t::PDFUN_SUCCESS
    }))
}

/// Free a registry previously obtained from `pdfun_registry_new`.
///
/// If `reg` is `NULL`, this function is a no-op.
/// After this call, `reg` must not be used again. Any PDF handles already
/// constructed from it stay valid: they own a copy of their descriptor.
#[no_mangle]
pub unsafe extern "C" fn pdfun_registry_free(reg: *mut pdfun_registry_t) {
    if !reg.is_null() {
        drop(unsafe { Box::from_raw(reg) });
    }
}
