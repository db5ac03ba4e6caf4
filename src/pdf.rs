// MIT License
// Copyright 2024--present pdfun developers

//! Callback-based PDF member handle.
//!
//! This module defines [`PdfImpl`], an opaque handle that wraps a C function
//! pointer callback together with a `void* user_data` and an optional
//! destructor. The collaborator library owns the interpolation grids; the
//! Rust core only needs a way to evaluate one member at a `(flavor, x, Q2)`
//! point without knowing the concrete type behind it.
//!
//! **How it Works**
//!
//! 1. The collaborator creates its native PDF object for one
//!    `(set, member)` pair.
//! 2. A trampoline function with the [`XfxCallback`] signature is
//!    registered, casting `user_data` back to the concrete type and calling
//!    its evaluator.
//! 3. The Rust core dispatches through the function pointer whenever a
//!    member value is needed.
//!
//! **Lifetime Contract**
//!
//! - The `user_data` pointer is borrowed by `PdfImpl`. The caller must keep
//!   the underlying object alive for the lifetime of the handle.
//! - If a `free_fn` is provided, it is called on drop when `user_data` is
//!   non-null, transferring ownership to `PdfImpl`. Release is deterministic
//!   and happens exactly once, on every exit path.
//! - The handle is exposed to C as `pdfun_pdf_t` -- an opaque pointer
//!   managed via `pdfun_pdf_new` / `pdfun_pdf_free`.

use std::os::raw::c_void;

use crate::registry::PdfSetDescriptor;
use crate::types::PdfSetIdentity;

/// Function pointer type for evaluating one PDF member.
///
/// The callback receives:
/// - `user_data`: opaque pointer to the collaborator's member object
/// - `flavor`: parton PDG id
/// - `x`: momentum fraction
/// - `q2`: squared energy scale
///
/// Returns the member's `x * f(x, Q2)` value.
pub type XfxCallback =
    unsafe extern "C" fn(user_data: *mut c_void, flavor: i32, x: f64, q2: f64) -> f64;

/// Function pointer type for evaluating the strong coupling `alpha_s(Q2)`
/// of the member's set. Optional; not every collaborator exposes it.
pub type AlphasCallback = unsafe extern "C" fn(user_data: *mut c_void, q2: f64) -> f64;

/// Destructor for the user_data pointer.
pub type FreeFn = unsafe extern "C" fn(*mut c_void);

/// Opaque PDF member handle wrapping a callback + user data.
///
/// Constructed through [`Registry::construct`](crate::registry::Registry::construct)
/// so the identity is always validated against the registry first.
#[derive(Debug)]
pub struct PdfImpl {
    identity: PdfSetIdentity,
    set: PdfSetDescriptor,
    callback: XfxCallback,
    alphas: Option<AlphasCallback>,
    user_data: *mut c_void,
    free_fn: Option<FreeFn>,
}

// PdfImpl stores a raw pointer but we guarantee exclusive access
// through the opaque handle pattern.
unsafe impl Send for PdfImpl {}

impl PdfImpl {
    pub(crate) fn new(
        identity: PdfSetIdentity,
        set: PdfSetDescriptor,
        callback: XfxCallback,
        alphas: Option<AlphasCallback>,
        user_data: *mut c_void,
        free_fn: Option<FreeFn>,
    ) -> Self {
        Self {
            identity,
            set,
            callback,
            alphas,
            user_data,
            free_fn,
        }
    }

    /// The validated `(set name, member index)` identity of this handle.
    pub fn identity(&self) -> &PdfSetIdentity {
        &self.identity
    }

    /// The immutable descriptor of the set owning this member.
    pub fn set(&self) -> &PdfSetDescriptor {
        &self.set
    }

    /// Evaluate the member's `x * f(x, Q2)` at one point.
    ///
    /// # Safety
    /// The caller must ensure `user_data` still refers to a live
    /// collaborator object, per the lifetime contract above.
    pub unsafe fn xfx_q2(&self, flavor: i32, x: f64, q2: f64) -> f64 {
        (self.callback)(self.user_data, flavor, x, q2)
    }

    /// Evaluate the set's strong coupling `alpha_s(Q2)`, if the handle was
    /// constructed with an alpha_s callback.
    ///
    /// # Safety
    /// Same contract as [`xfx_q2`](Self::xfx_q2).
    pub unsafe fn alphas_q2(&self, q2: f64) -> Option<f64> {
        self.alphas.map(|f| unsafe { f(self.user_data, q2) })
    }
}

impl Drop for PdfImpl {
    fn drop(&mut self) {
        if let Some(free) = self.free_fn {
            if !self.user_data.is_null() {
                unsafe { free(self.user_data) };
            }
        }
    }
}

/// Opaque handle exposed to C as `pdfun_pdf_t`.
///
/// This is a type alias used by cbindgen to generate a forward declaration.
#[allow(non_camel_case_types)]
pub type pdfun_pdf_t = PdfImpl;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    unsafe extern "C" fn linear_xfx(
        _user_data: *mut c_void,
        flavor: i32,
        x: f64,
        q2: f64,
    ) -> f64 {
        flavor as f64 * x + q2
    }

    fn handle_with(
        callback: XfxCallback,
        user_data: *mut c_void,
        free_fn: Option<FreeFn>,
    ) -> PdfImpl {
        let mut reg = Registry::new();
        reg.add_set("TESTSET", 90000, 3, "hessian").unwrap();
        reg.construct(
            PdfSetIdentity::new("TESTSET", 1),
            callback,
            None,
            user_data,
            free_fn,
        )
        .unwrap()
    }

    #[test]
    fn callback_receives_arguments() {
        let pdf = handle_with(linear_xfx, std::ptr::null_mut(), None);
        let v = unsafe { pdf.xfx_q2(21, 0.5, 100.0) };
        assert_eq!(v, 21.0 * 0.5 + 100.0);
    }

    #[test]
    fn handle_exposes_identity_and_descriptor() {
        let pdf = handle_with(linear_xfx, std::ptr::null_mut(), None);
        assert_eq!(pdf.identity(), &PdfSetIdentity::new("TESTSET", 1));
        assert_eq!(pdf.set().name(), "TESTSET");
        assert_eq!(pdf.set().n_members(), 3);
        assert_eq!(pdf.set().error_type(), "hessian");
    }

    unsafe extern "C" fn fixed_alphas(_ud: *mut c_void, _q2: f64) -> f64 {
        0.118
    }

    #[test]
    fn alphas_callback_dispatches() {
        let mut reg = Registry::new();
        reg.add_set("TESTSET", 90000, 3, "hessian").unwrap();
        let pdf = reg
            .construct(
                PdfSetIdentity::new("TESTSET", 0),
                linear_xfx,
                Some(fixed_alphas),
                std::ptr::null_mut(),
                None,
            )
            .unwrap();
        assert_eq!(unsafe { pdf.alphas_q2(8100.0) }, Some(0.118));
    }

    #[test]
    fn alphas_callback_is_optional() {
        let pdf = handle_with(linear_xfx, std::ptr::null_mut(), None);
        assert_eq!(unsafe { pdf.alphas_q2(100.0) }, None);
    }

    #[test]
    fn handle_is_debug_formattable() {
        let pdf = handle_with(linear_xfx, std::ptr::null_mut(), None);
        let repr = format!("{pdf:?}");
        assert!(repr.contains("TESTSET"));
    }

    #[test]
    fn user_data_is_passed_through() {
        static CALL_COUNT: AtomicU32 = AtomicU32::new(0);

        unsafe extern "C" fn count_xfx(
            ud: *mut c_void,
            _flavor: i32,
            _x: f64,
            _q2: f64,
        ) -> f64 {
            let ctr = unsafe { &*(ud as *const AtomicU32) };
            ctr.fetch_add(1, Ordering::SeqCst) as f64
        }

        CALL_COUNT.store(0, Ordering::SeqCst);
        let pdf = handle_with(count_xfx, &CALL_COUNT as *const _ as *mut c_void, None);

        assert_eq!(unsafe { pdf.xfx_q2(1, 0.1, 1.0) }, 0.0);
        assert_eq!(unsafe { pdf.xfx_q2(1, 0.1, 1.0) }, 1.0);
        assert_eq!(CALL_COUNT.load(Ordering::SeqCst), 2);
    }

    static DROP_CALLED: AtomicBool = AtomicBool::new(false);

    unsafe extern "C" fn track_drop(ptr: *mut c_void) {
        DROP_CALLED.store(true, Ordering::SeqCst);
        let val = unsafe { *(ptr as *const u64) };
        assert_eq!(val, 0xDEAD_BEEF);
    }

    #[test]
    fn drop_calls_free_fn_with_user_data() {
        DROP_CALLED.store(false, Ordering::SeqCst);
        let mut sentinel: u64 = 0xDEAD_BEEF;
        {
            let _pdf = handle_with(
                linear_xfx,
                &mut sentinel as *mut u64 as *mut c_void,
                Some(track_drop),
            );
            assert!(!DROP_CALLED.load(Ordering::SeqCst));
        }
        assert!(DROP_CALLED.load(Ordering::SeqCst));
    }

    #[test]
    fn drop_skips_free_fn_when_user_data_is_null() {
        let _pdf = handle_with(linear_xfx, std::ptr::null_mut(), Some(track_drop));
    }

    #[test]
    fn drop_without_free_fn_is_safe() {
        let _pdf = handle_with(linear_xfx, std::ptr::null_mut(), None);
    }

    #[test]
    fn pdf_impl_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<PdfImpl>();
    }
}
