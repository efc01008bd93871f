// crates/shield-core/src/runtime/privileges.rs
// ============================================================================
// Module: REST API Privileges Evaluator
// Description: Role-based access evaluation for management endpoints.
// Purpose: Compute allowed and disabled endpoints for an authenticated principal.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`RestApiPrivilegesEvaluator`] answers three questions for a principal and
//! its resolved roles: whether it may use the management API at all, which
//! endpoint methods it may not call, and whether one specific call is allowed.
//! Administrative identities are checked first and bypass role evaluation.
//! Evaluation is a pure function of its inputs and the immutable permission map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::core::Endpoint;
use crate::core::HttpMethod;
use crate::core::Principal;
use crate::core::RolePermissionMap;
use crate::interfaces::AdminIdentity;

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Endpoint methods a principal may not call; fully permitted endpoints are omitted.
pub type DisabledEndpoints = BTreeMap<Endpoint, Vec<HttpMethod>>;

/// Why an access decision was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    /// Principal holds an administrative identity.
    AdminIdentity,
    /// A resolved role grants the endpoint method.
    RoleGrant,
    /// No resolved role grants the endpoint method.
    NotGranted,
}

impl AccessReason {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdminIdentity => "admin_identity",
            Self::RoleGrant => "role_grant",
            Self::NotGranted => "not_granted",
        }
    }
}

/// Access decision for one endpoint call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    /// Whether the call is allowed.
    pub allowed: bool,
    /// Decision reason.
    pub reason: AccessReason,
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Management API privileges evaluator.
#[derive(Clone)]
pub struct RestApiPrivilegesEvaluator {
    /// Static role permissions.
    permissions: Arc<RolePermissionMap>,
    /// Administrative identity check.
    admin: Arc<dyn AdminIdentity>,
}

impl RestApiPrivilegesEvaluator {
    /// Creates an evaluator.
    #[must_use]
    pub fn new(permissions: Arc<RolePermissionMap>, admin: Arc<dyn AdminIdentity>) -> Self {
        Self {
            permissions,
            admin,
        }
    }

    /// Returns true when `principal` holds an administrative identity.
    #[must_use]
    pub fn is_admin(&self, principal: &Principal) -> bool {
        principal.distinguished_name.as_deref().is_some_and(|dn| self.admin.is_admin(dn))
    }

    /// Returns true when the principal may use the management API at all.
    #[must_use]
    pub fn has_api_access(&self, principal: &Principal, roles: &BTreeSet<String>) -> bool {
        if self.is_admin(principal) {
            return true;
        }
        roles.iter().any(|role| self.permissions.role_has_any_grant(role))
    }

    /// Returns the endpoint methods the principal may not call.
    #[must_use]
    pub fn disabled_endpoints(
        &self,
        principal: &Principal,
        roles: &BTreeSet<String>,
    ) -> DisabledEndpoints {
        if self.is_admin(principal) {
            return DisabledEndpoints::new();
        }
        let granted = self.permissions.union_of(roles);
        let mut disabled = DisabledEndpoints::new();
        for endpoint in Endpoint::ALL {
            let allowed = granted.get(&endpoint);
            let denied: Vec<HttpMethod> = HttpMethod::ALL
                .into_iter()
                .filter(|method| !allowed.is_some_and(|methods| methods.contains(method)))
                .collect();
            if !denied.is_empty() {
                disabled.insert(endpoint, denied);
            }
        }
        disabled
    }

    /// Decides one endpoint call.
    #[must_use]
    pub fn check_access(
        &self,
        principal: &Principal,
        roles: &BTreeSet<String>,
        endpoint: Endpoint,
        method: HttpMethod,
    ) -> AccessDecision {
        if self.is_admin(principal) {
            return AccessDecision {
                allowed: true,
                reason: AccessReason::AdminIdentity,
            };
        }
        let granted = roles.iter().any(|role| {
            self.permissions
                .grants(role)
                .and_then(|grants| grants.get(&endpoint))
                .is_some_and(|methods| methods.contains(&method))
        });
        AccessDecision {
            allowed: granted,
            reason: if granted { AccessReason::RoleGrant } else { AccessReason::NotGranted },
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
