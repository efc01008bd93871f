// crates/shield-core/src/runtime/mod.rs
// ============================================================================
// Module: Shield Runtime
// Description: Validation, license, and privileges engines plus helpers.
// Purpose: Execute configuration management decisions against core types.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement schema validation, license evaluation and
//! update, and management API privilege evaluation. Every transport calls
//! into the same engines so behavior is identical across surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod facts;
pub mod license_codec;
pub mod license_eval;
pub mod license_update;
pub mod privileges;
pub mod schemas;
pub mod store;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use facts::FixedClock;
pub use facts::StaticClusterState;
pub use facts::SystemClock;
pub use license_codec::Ed25519LicenseDecoder;
pub use license_codec::KeyError;
pub use license_codec::LicensePayload;
pub use license_codec::LicenseSignError;
pub use license_codec::LicenseSigner;
pub use license_codec::encode_key;
pub use license_codec::parse_signing_key;
pub use license_codec::parse_verifying_key;
pub use license_eval::LicenseEvaluator;
pub use license_update::CurrentLicense;
pub use license_update::LicenseUpdateError;
pub use license_update::LicenseUpdateOutcome;
pub use license_update::LicenseUpdatePipeline;
pub use license_update::LicenseUpdateReport;
pub use privileges::AccessDecision;
pub use privileges::AccessReason;
pub use privileges::DisabledEndpoints;
pub use privileges::RestApiPrivilegesEvaluator;
pub use schemas::ConfigurationDocumentValidators;
pub use schemas::LICENSE_ENVELOPE_KEY;
pub use store::InMemoryConfigurationStore;
pub use validator::SchemaValidator;
