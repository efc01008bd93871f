// crates/shield-api/src/routes.rs
// ============================================================================
// Module: Management API Routes
// Description: Path parsing for management API resources.
// Purpose: Map request paths onto endpoints and configuration types.
// Dependencies: shield-core
// ============================================================================

//! ## Overview
//! Every management resource lives under [`API_PREFIX`]. Entry collections
//! accept their plural name and the singular alias used by older clients
//! (`actiongroup`, `user`).

use shield_core::ConfigType;
use shield_core::Endpoint;

/// Path prefix shared by every management resource.
pub const API_PREFIX: &str = "/_shield/api";
/// Maximum entry name length.
const MAX_ENTRY_NAME_LENGTH: usize = 256;

/// Parsed management API route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Caller's API permissions.
    PermissionsInfo,
    /// License inspection and upload.
    License,
    /// Cluster and store facts.
    SystemInfo,
    /// Security configuration cache.
    Cache,
    /// Whole configuration document.
    Configuration(ConfigType),
    /// Every entry of an entry collection.
    Entries(ConfigType),
    /// One entry of an entry collection.
    Entry(ConfigType, String),
}

impl Route {
    /// Parses a request path.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.strip_prefix(API_PREFIX)?;
        let segments: Vec<&str> = rest.split('/').filter(|segment| !segment.is_empty()).collect();
        match segments.as_slice() {
            ["permissionsinfo"] => Some(Self::PermissionsInfo),
            ["license"] => Some(Self::License),
            ["systeminfo"] => Some(Self::SystemInfo),
            ["cache"] => Some(Self::Cache),
            ["configuration", name] => ConfigType::parse(name).map(Self::Configuration),
            [collection] => entry_collection(collection).map(Self::Entries),
            [collection, name] if name.len() <= MAX_ENTRY_NAME_LENGTH => {
                entry_collection(collection).map(|config_type| Self::Entry(config_type, (*name).to_string()))
            }
            _ => None,
        }
    }

    /// Returns the endpoint guarding this route.
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::PermissionsInfo => Endpoint::Permissionsinfo,
            Self::License => Endpoint::License,
            Self::SystemInfo => Endpoint::Systeminfo,
            Self::Cache => Endpoint::Cache,
            Self::Configuration(_) => Endpoint::Config,
            Self::Entries(config_type) | Self::Entry(config_type, _) => match config_type {
                ConfigType::Roles => Endpoint::Roles,
                ConfigType::Rolesmapping => Endpoint::Rolesmapping,
                ConfigType::Actiongroups => Endpoint::Actiongroups,
                ConfigType::Internalusers => Endpoint::Internalusers,
                ConfigType::Config => Endpoint::Config,
            },
        }
    }
}

/// Maps a collection segment to its configuration type.
fn entry_collection(segment: &str) -> Option<ConfigType> {
    match segment {
        "roles" => Some(ConfigType::Roles),
        "rolesmapping" => Some(ConfigType::Rolesmapping),
        "actiongroups" | "actiongroup" => Some(ConfigType::Actiongroups),
        "internalusers" | "user" => Some(ConfigType::Internalusers),
        _ => None,
    }
}
