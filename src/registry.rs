// MIT License
// Copyright 2024--present pdfun developers

//! LHAID registry and set-identity resolution.
//!
//! Three addressing schemes name the same PDF member: a `(set name, member
//! index)` pair, a single global integer (the LHAID), and an in-memory
//! [`PdfSetDescriptor`]. This module maps between them.
//!
//! The registry mirrors the collaborator library's global index: every set
//! occupies a contiguous LHAID block starting at its base id, so member `m`
//! of a set with base `b` has LHAID `b + m`.
//!
//! ## Lifecycle
//!
//! The collaborator populates the registry once at startup via
//! [`Registry::add_set`] (`&mut self`), then only read-only lookups remain
//! (`&self`). A populated registry is `Send + Sync` and safe to share across
//! worker threads without coordination.

use std::collections::HashMap;
use std::os::raw::c_void;

use tracing::debug;

use crate::error::Error;
use crate::pdf::{AlphasCallback, FreeFn, PdfImpl, XfxCallback};
use crate::types::{ErrorConvention, PdfSetIdentity};

/// Immutable description of one registered PDF set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSetDescriptor {
    name: String,
    lhaid_base: i32,
    n_members: i32,
    error_type: String,
}

impl PdfSetDescriptor {
    /// Name of the set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// LHAID of member 0.
    pub fn lhaid_base(&self) -> i32 {
        self.lhaid_base
    }

    /// Declared number of members, central included.
    pub fn n_members(&self) -> i32 {
        self.n_members
    }

    /// The raw error-type string from set metadata.
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// The parsed error convention.
    pub fn convention(&self) -> ErrorConvention {
        ErrorConvention::parse(&self.error_type)
    }
}

/// Read-only lookup table from LHAIDs and set names to descriptors.
#[derive(Debug, Default)]
pub struct Registry {
    sets: Vec<PdfSetDescriptor>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a set and its LHAID block.
    ///
    /// Build-phase only. Fails with [`Error::DuplicateSet`] if `name` is
    /// already registered.
    pub fn add_set(
        &mut self,
        name: impl Into<String>,
        lhaid_base: i32,
        n_members: i32,
        error_type: impl Into<String>,
    ) -> Result<(), Error> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(Error::DuplicateSet(name));
        }
        let error_type = error_type.into();
        debug!(set = %name, lhaid_base, n_members, error_type = %error_type, "registered PDF set");
        self.by_name.insert(name.clone(), self.sets.len());
        self.sets.push(PdfSetDescriptor {
            name,
            lhaid_base,
            n_members,
            error_type,
        });
        Ok(())
    }

    /// Number of registered sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no set has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Resolve a global LHAID to a `(set name, member index)` identity.
    ///
    /// Pure, deterministic lookup. Fails with [`Error::UnknownIdentifier`]
    /// when no registered block covers `lhaid`.
    pub fn resolve_by_lhaid(&self, lhaid: i32) -> Result<PdfSetIdentity, Error> {
        self.sets
            .iter()
            .find(|s| {
                // i64 so a block ending near i32::MAX cannot overflow
                lhaid >= s.lhaid_base
                    && (lhaid as i64) < s.lhaid_base as i64 + s.n_members as i64
            })
            .map(|s| PdfSetIdentity::new(s.name.clone(), lhaid - s.lhaid_base))
            .ok_or(Error::UnknownIdentifier(lhaid))
    }

    /// The descriptor of a registered set.
    pub fn descriptor(&self, name: &str) -> Result<&PdfSetDescriptor, Error> {
        self.by_name
            .get(name)
            .map(|&i| &self.sets[i])
            .ok_or_else(|| Error::UnknownSet(name.to_string()))
    }

    /// Construct an owned PDF member handle for `identity`.
    ///
    /// The `callback` / `user_data` / `free_fn` triple is the collaborator's
    /// evaluator for this member (see [`crate::pdf`]), with `alphas` as an
    /// optional second evaluator for the set's strong coupling; the registry
    /// only validates the identity. Fails with [`Error::UnknownSet`] or
    /// [`Error::MemberOutOfRange`].
    pub fn construct(
        &self,
        identity: PdfSetIdentity,
        callback: XfxCallback,
        alphas: Option<AlphasCallback>,
        user_data: *mut c_void,
        free_fn: Option<FreeFn>,
    ) -> Result<PdfImpl, Error> {
        let set = self.descriptor(&identity.name)?;
        if identity.member < 0 || identity.member >= set.n_members {
            return Err(Error::MemberOutOfRange {
                set: set.name.clone(),
                member: identity.member,
                n_members: set.n_members,
            });
        }
        Ok(PdfImpl::new(
            identity,
            set.clone(),
            callback,
            alphas,
            user_data,
            free_fn,
        ))
    }

    /// [`resolve_by_lhaid`](Self::resolve_by_lhaid) composed with
    /// [`construct`](Self::construct); same failure modes.
    pub fn construct_from_lhaid(
        &self,
        lhaid: i32,
        callback: XfxCallback,
        alphas: Option<AlphasCallback>,
        user_data: *mut c_void,
        free_fn: Option<FreeFn>,
    ) -> Result<PdfImpl, Error> {
        let identity = self.resolve_by_lhaid(lhaid)?;
        self.construct(identity, callback, alphas, user_data, free_fn)
    }
}
