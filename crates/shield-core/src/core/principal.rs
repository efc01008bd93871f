// crates/shield-core/src/core/principal.rs
// ============================================================================
// Module: Principal
// Description: Authenticated caller identity consumed per request.
// Purpose: Carry the caller explicitly into evaluators instead of ambient context.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Principal`] is produced by the transport layer after authentication and
//! passed by reference into every evaluator call. Resolved roles are computed
//! separately by a role resolver and are never cached on the principal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Serialize;

// ============================================================================
// SECTION: Principal
// ============================================================================

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// User name.
    pub name: String,
    /// Certificate distinguished name, when authenticated by client certificate.
    pub distinguished_name: Option<String>,
    /// Roles asserted by the authentication backend.
    pub backend_roles: BTreeSet<String>,
    /// Remote host the request originated from, when known.
    pub remote_host: Option<String>,
}

impl Principal {
    /// Creates a principal with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            distinguished_name: None,
            backend_roles: BTreeSet::new(),
            remote_host: None,
        }
    }

    /// Returns a copy with the distinguished name set.
    #[must_use]
    pub fn with_distinguished_name(mut self, dn: impl Into<String>) -> Self {
        self.distinguished_name = Some(dn.into());
        self
    }

    /// Returns a copy with the backend roles set.
    #[must_use]
    pub fn with_backend_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backend_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Returns a copy with the remote host set.
    #[must_use]
    pub fn with_remote_host(mut self, host: impl Into<String>) -> Self {
        self.remote_host = Some(host.into());
        self
    }
}
