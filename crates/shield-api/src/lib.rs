// crates/shield-api/src/lib.rs
// ============================================================================
// Module: Shield API
// Description: Management API, audit sinks, and the HTTP server for Shield.
// Purpose: Expose configuration, license, and permission management over HTTP.
// Dependencies: shield-core, shield-config, shield-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! Shield API wires the core engines into a management surface. The
//! transport-independent [`ManagementApi`] gates every call through the
//! privileges evaluator and the configured role mappings, and
//! [`ShieldServer`] exposes it over HTTP behind a trusted proxy.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod audit;
pub mod auth;
pub mod passwords;
pub mod roles;
pub mod routes;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::ApiRequest;
pub use api::ApiResponse;
pub use api::ManagementApi;
pub use api::ManagementApiParams;
pub use api::ResponseBody;
pub use audit::AccessAuditEvent;
pub use audit::ApiAuditEvent;
pub use audit::AuditSink;
pub use audit::ConfigChangeAuditEvent;
pub use audit::ConfigChangeKind;
pub use audit::FileAuditSink;
pub use audit::LicenseAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use auth::AuthError;
pub use auth::IdentityHeaders;
pub use auth::PrincipalDirectory;
pub use passwords::hash_password;
pub use passwords::verify_password;
pub use roles::RolesMappingResolver;
pub use routes::API_PREFIX;
pub use routes::Route;
pub use server::ServerError;
pub use server::ServerOverrides;
pub use server::ShieldServer;
pub use server::build_store;
