// crates/shield-config/src/lib.rs
// ============================================================================
// Module: Shield Config Library
// Description: Process configuration model, validation, and runtime builders.
// Purpose: Single source of truth for shield.toml semantics.
// Dependencies: shield-core, shield-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `shield-config` defines the configuration model for the Shield server and
//! CLI. It validates strictly and fails closed, and it builds the immutable
//! runtime inputs: the role permission map, the admin DN allowlist, the
//! license decoder, cluster facts, and seed documents.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod admin;
pub mod config;
pub mod seed;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use admin::AdminDnAllowlist;
pub use admin::normalize_dn;
pub use config::*;
pub use seed::load_seed;
