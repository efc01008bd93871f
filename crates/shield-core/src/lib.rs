// crates/shield-core/src/lib.rs
// ============================================================================
// Module: Shield Core Library
// Description: Public API surface for the Shield management core.
// Purpose: Expose core types, interfaces, and runtime engines.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Shield core validates security configuration payloads, evaluates signed
//! licenses against cluster facts, and decides which management endpoints a
//! principal may call. It is storage-agnostic and integrates through explicit
//! interfaces; the only shared mutable state is the configuration store.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::*;

pub use interfaces::AdminIdentity;
pub use interfaces::Clock;
pub use interfaces::ClusterState;
pub use interfaces::ConfigurationStore;
pub use interfaces::DocumentMutator;
pub use interfaces::LicenseDecodeError;
pub use interfaces::LicenseDecoder;
pub use interfaces::NOT_INITIALIZED_MESSAGE;
pub use interfaces::RoleResolutionError;
pub use interfaces::RoleResolver;
pub use interfaces::StoreError;
pub use self::runtime::*;
