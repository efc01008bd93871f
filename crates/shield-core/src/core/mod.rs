// crates/shield-core/src/core/mod.rs
// ============================================================================
// Module: Shield Core Types
// Description: Canonical data model for security configuration management.
// Purpose: Provide stable, serializable types shared by engines and adapters.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Core types describe management endpoints, payload schemas, configuration
//! documents, licenses, principals, and the static role permission map. These
//! types are the source of truth for every derived API surface.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod document;
pub mod endpoint;
pub mod fingerprint;
pub mod license;
pub mod permissions;
pub mod principal;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::ConfigType;
pub use document::ConfigurationDocument;
pub use document::ConfigurationSeed;
pub use document::LICENSE_KEY;
pub use endpoint::Endpoint;
pub use endpoint::HttpMethod;
pub use fingerprint::fingerprint;
pub use license::License;
pub use license::LicenseEvaluation;
pub use license::LicenseSummary;
pub use license::LicenseType;
pub use license::LicenseViolation;
pub use license::NodeLimit;
pub use license::format_date;
pub use license::join_violations;
pub use license::parse_date;
pub use permissions::EndpointGrants;
pub use permissions::RolePermissionMap;
pub use permissions::full_grants;
pub use principal::Principal;
pub use schema::DataType;
pub use schema::DocumentSchema;
pub use schema::FieldRule;
pub use schema::ValidationErrorType;
pub use schema::ValidationResult;
