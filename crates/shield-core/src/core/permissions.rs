// crates/shield-core/src/core/permissions.rs
// ============================================================================
// Module: Role Permission Map
// Description: Static mapping from role names to permitted endpoint methods.
// Purpose: Provide the immutable permission table read by the privileges evaluator.
// Dependencies: crate::core::endpoint
// ============================================================================

//! ## Overview
//! The [`RolePermissionMap`] is assembled once at process start from static
//! configuration and shared read-only across requests. Lookups never mutate
//! it, so evaluators need no synchronization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::endpoint::Endpoint;
use crate::core::endpoint::HttpMethod;

// ============================================================================
// SECTION: Endpoint Grants
// ============================================================================

/// Methods permitted per endpoint for one role.
pub type EndpointGrants = BTreeMap<Endpoint, BTreeSet<HttpMethod>>;

/// Returns grants covering every method on every endpoint.
#[must_use]
pub fn full_grants() -> EndpointGrants {
    Endpoint::ALL
        .into_iter()
        .map(|endpoint| (endpoint, HttpMethod::ALL.into_iter().collect()))
        .collect()
}

// ============================================================================
// SECTION: Role Permission Map
// ============================================================================

/// Role name to permitted (endpoint, method) pairs.
///
/// # Invariants
/// - Immutable after construction.
/// - Endpoints with an empty method set are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePermissionMap {
    /// Grants keyed by role name.
    roles: BTreeMap<String, EndpointGrants>,
}

impl RolePermissionMap {
    /// Creates an empty map (no role has API access).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            roles: BTreeMap::new(),
        }
    }

    /// Returns a copy with `grants` recorded for `role`, replacing earlier grants.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>, grants: EndpointGrants) -> Self {
        let grants = grants.into_iter().filter(|(_, methods)| !methods.is_empty()).collect();
        self.roles.insert(role.into(), grants);
        self
    }

    /// Returns the grants of `role`, if the role is known.
    #[must_use]
    pub fn grants(&self, role: &str) -> Option<&EndpointGrants> {
        self.roles.get(role)
    }

    /// Returns true when `role` holds at least one endpoint permission.
    #[must_use]
    pub fn role_has_any_grant(&self, role: &str) -> bool {
        self.roles.get(role).is_some_and(|grants| !grants.is_empty())
    }

    /// Returns the union of grants across `roles`.
    #[must_use]
    pub fn union_of<'a, I>(&self, roles: I) -> EndpointGrants
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut union = EndpointGrants::new();
        for role in roles {
            let Some(grants) = self.roles.get(role) else {
                continue;
            };
            for (endpoint, methods) in grants {
                union.entry(*endpoint).or_default().extend(methods.iter().copied());
            }
        }
        union
    }

    /// Returns the configured role names.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }
}
