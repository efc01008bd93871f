// crates/shield-core/tests/common/mod.rs
// ============================================================================
// Module: Shield Core Test Helpers
// Description: Shared fixtures for license and store integration tests.
// Purpose: Build signed licenses and provisioned pipelines with fixed facts.
// Dependencies: shield-core, ed25519-dalek, time
// ============================================================================

//! ## Overview
//! Fixtures sign licenses with a deterministic key and wire a license update
//! pipeline over an in-memory store with a pinned clock.

#![allow(dead_code, reason = "Helpers are shared across integration test binaries.")]

use std::sync::Arc;

use ed25519_dalek::SigningKey;
use serde_json::json;
use shield_core::ConfigType;
use shield_core::ConfigurationDocument;
use shield_core::ConfigurationDocumentValidators;
use shield_core::ConfigurationSeed;
use shield_core::Ed25519LicenseDecoder;
use shield_core::FixedClock;
use shield_core::InMemoryConfigurationStore;
use shield_core::LicensePayload;
use shield_core::LicenseSigner;
use shield_core::LicenseUpdatePipeline;
use shield_core::NodeLimit;
use shield_core::StaticClusterState;
use time::Date;
use time::macros::date;

/// Result type used by integration tests.
pub type TestResult = Result<(), String>;

/// Day the tests run on.
pub const TODAY: Date = date!(2026 - 10 - 18);

/// Day the test cluster was created.
pub const CREATED_ON: Date = date!(2026 - 09 - 01);

/// Returns the deterministic test signer.
pub fn signer() -> LicenseSigner {
    LicenseSigner::new(SigningKey::from_bytes(&[11u8; 32]))
}

/// Returns a payload valid on [`TODAY`] for up to `nodes` nodes.
pub fn payload(nodes: NodeLimit) -> LicensePayload {
    LicensePayload {
        uid: "lic-42".to_string(),
        license_type: "FULL".to_string(),
        issued_to: "Acme Corp".to_string(),
        issuer: "shield".to_string(),
        start_date: "2026-01-01".to_string(),
        expiry_date: "2027-12-31".to_string(),
        allowed_node_count_per_cluster: nodes,
    }
}

/// Signs `payload` with the test signer.
pub fn sign(payload: &LicensePayload) -> String {
    signer().sign(payload).unwrap()
}

/// Returns a license request envelope.
pub fn envelope(artifact: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({ "sg_license": artifact })).unwrap()
}

/// Returns a `config` document with unrelated settings.
pub fn base_config() -> ConfigurationDocument {
    ConfigurationDocument::new()
        .with_field("searchguard.dynamic.authc.basic_internal.enabled", json!(true))
        .with_field("searchguard.dynamic.http.anonymous_auth_enabled", json!(false))
}

/// Returns a store provisioned with [`base_config`].
pub fn provisioned_store() -> Arc<InMemoryConfigurationStore> {
    let mut seed = ConfigurationSeed::new();
    seed.insert(ConfigType::Config, base_config());
    Arc::new(InMemoryConfigurationStore::with_seed(seed))
}

/// Builds a pipeline over `store` for a cluster of `node_count` nodes.
pub fn pipeline(store: Arc<InMemoryConfigurationStore>, node_count: u32) -> LicenseUpdatePipeline {
    LicenseUpdatePipeline::new(
        store,
        Arc::new(Ed25519LicenseDecoder::new(signer().verifying_key())),
        Arc::new(StaticClusterState::new(node_count, CREATED_ON)),
        Arc::new(FixedClock(TODAY)),
        Arc::new(ConfigurationDocumentValidators::new()),
        90,
    )
}
