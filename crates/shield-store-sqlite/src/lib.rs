// crates/shield-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Configuration Store
// Description: Durable ConfigurationStore backend using SQLite.
// Purpose: Provide production persistence for Shield security configuration.
// Dependencies: shield-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`ConfigurationStore`] implementation
//! that keeps one integrity-checked row per configuration type and applies
//! every update inside a single write transaction.
//! Security posture: storage inputs are untrusted.
//!
//! [`ConfigurationStore`]: shield_core::ConfigurationStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_DOCUMENT_BYTES;
pub use store::SqliteConfigurationStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
