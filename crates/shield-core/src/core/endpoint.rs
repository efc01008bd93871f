// crates/shield-core/src/core/endpoint.rs
// ============================================================================
// Module: Management Endpoints
// Description: Closed enumerations of management API resources and methods.
// Purpose: Provide stable, serializable names for permission maps and responses.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Management API resources form a closed set. Permission maps, disabled
//! endpoint reports, and access checks are all keyed by [`Endpoint`] and
//! [`HttpMethod`], so unknown names are rejected at the configuration
//! boundary rather than silently ignored at evaluation time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Management API resource.
///
/// # Invariants
/// - Variants and their string forms are stable; they appear in config files
///   and in `disabled_endpoints` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Endpoint {
    /// Action group definitions.
    Actiongroups,
    /// Security cache maintenance.
    Cache,
    /// Raw configuration documents.
    Config,
    /// Role definitions.
    Roles,
    /// Role mappings.
    Rolesmapping,
    /// Internal user database.
    Internalusers,
    /// Node and plugin information.
    Systeminfo,
    /// Evaluated API permissions of the caller.
    Permissionsinfo,
    /// License upload and inspection.
    License,
}

impl Endpoint {
    /// All endpoints in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Actiongroups,
        Self::Cache,
        Self::Config,
        Self::Roles,
        Self::Rolesmapping,
        Self::Internalusers,
        Self::Systeminfo,
        Self::Permissionsinfo,
        Self::License,
    ];

    /// Returns the stable upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Actiongroups => "ACTIONGROUPS",
            Self::Cache => "CACHE",
            Self::Config => "CONFIG",
            Self::Roles => "ROLES",
            Self::Rolesmapping => "ROLESMAPPING",
            Self::Internalusers => "INTERNALUSERS",
            Self::Systeminfo => "SYSTEMINFO",
            Self::Permissionsinfo => "PERMISSIONSINFO",
            Self::License => "LICENSE",
        }
    }

    /// Parses an endpoint name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|endpoint| endpoint.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: HTTP Method
// ============================================================================

/// HTTP method relevant to management endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Read.
    Get,
    /// Create or replace.
    Put,
    /// Create or act.
    Post,
    /// Remove.
    Delete,
}

impl HttpMethod {
    /// All methods in declaration order.
    pub const ALL: [Self; 4] = [Self::Get, Self::Put, Self::Post, Self::Delete];

    /// Returns the stable upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Parses a method name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Returns true when the method carries a request body.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Put | Self::Post)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
