// crates/shield-api/src/auth.rs
// ============================================================================
// Module: Request Authentication
// Description: Maps proxy-asserted identity headers to configured principals.
// Purpose: Provide strict, fail-closed caller identification for the API.
// Dependencies: shield-config, shield-core, thiserror
// ============================================================================

//! ## Overview
//! The server sits behind a TLS-terminating proxy that asserts the caller's
//! user name, certificate DN, and remote host in request headers. A caller is
//! authenticated only when the asserted user appears in the configured
//! principal table. Backend roles always come from configuration. When a
//! principal pins a DN, the asserted DN must match it. A principal carries a
//! DN only when it is pinned and asserted, so the administrative allowlist
//! never sees a header value the configuration did not bind to that user.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use shield_config::PrincipalConfig;
use shield_config::normalize_dn;
use shield_core::Principal;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the authenticated user name.
pub const USER_HEADER: &str = "x-shield-user";
/// Header carrying the client certificate distinguished name.
pub const DN_HEADER: &str = "x-shield-dn";
/// Header carrying the original remote host.
pub const REMOTE_HOST_HEADER: &str = "x-shield-remote-host";
/// Maximum accepted header value length.
const MAX_HEADER_VALUE_LENGTH: usize = 512;

// ============================================================================
// SECTION: Identity Headers
// ============================================================================

/// Identity assertions extracted from one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityHeaders {
    /// Asserted user name.
    pub user: Option<String>,
    /// Asserted certificate DN.
    pub distinguished_name: Option<String>,
    /// Asserted or observed remote host.
    pub remote_host: Option<String>,
}

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Missing or unacceptable identity.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
}

// ============================================================================
// SECTION: Directory
// ============================================================================

/// Configured principals keyed by user name.
#[derive(Debug, Clone, Default)]
pub struct PrincipalDirectory {
    /// Principal entries.
    principals: BTreeMap<String, PrincipalConfig>,
}

impl PrincipalDirectory {
    /// Builds a directory from configured principals.
    #[must_use]
    pub fn new(principals: &[PrincipalConfig]) -> Self {
        Self {
            principals: principals.iter().map(|entry| (entry.name.clone(), entry.clone())).collect(),
        }
    }

    /// Authenticates a request from its identity headers.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the caller cannot be identified.
    pub fn authenticate(&self, headers: &IdentityHeaders) -> Result<Principal, AuthError> {
        let user = non_empty(headers.user.as_deref(), USER_HEADER)?
            .ok_or_else(|| AuthError::Unauthenticated(format!("missing {USER_HEADER} header")))?;
        let entry = self
            .principals
            .get(user)
            .ok_or_else(|| AuthError::Unauthenticated("unknown principal".to_string()))?;
        let asserted_dn = non_empty(headers.distinguished_name.as_deref(), DN_HEADER)?;
        let mut principal = Principal::named(entry.name.as_str())
            .with_backend_roles(entry.backend_roles.iter().cloned());
        if let (Some(pinned), Some(asserted)) = (&entry.distinguished_name, asserted_dn) {
            if normalize_dn(pinned) != normalize_dn(asserted) {
                return Err(AuthError::Unauthenticated(
                    "distinguished name mismatch".to_string(),
                ));
            }
            principal = principal.with_distinguished_name(asserted);
        }
        if let Some(host) = non_empty(headers.remote_host.as_deref(), REMOTE_HOST_HEADER)? {
            principal = principal.with_remote_host(host);
        }
        Ok(principal)
    }
}

/// Returns a trimmed header value, rejecting oversized values.
fn non_empty<'a>(value: Option<&'a str>, header: &str) -> Result<Option<&'a str>, AuthError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if value.len() > MAX_HEADER_VALUE_LENGTH {
        return Err(AuthError::Unauthenticated(format!("{header} header too large")));
    }
    Ok(Some(value))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
