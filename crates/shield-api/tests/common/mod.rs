// crates/shield-api/tests/common/mod.rs
// ============================================================================
// Module: Shield API Test Helpers
// Description: Shared fixtures for management API integration tests.
// Purpose: Assemble a management API over in-memory collaborators.
// Dependencies: shield-api, shield-config, shield-core, time
// ============================================================================

//! ## Overview
//! Fixtures wire a [`ManagementApi`] over an in-memory store with a pinned
//! clock, a deterministic license signer, and a recording audit sink.

#![allow(dead_code, reason = "Helpers are shared across integration test binaries.")]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;
use serde_json::json;
use shield_api::AccessAuditEvent;
use shield_api::ApiAuditEvent;
use shield_api::ApiRequest;
use shield_api::ApiResponse;
use shield_api::AuditSink;
use shield_api::ConfigChangeAuditEvent;
use shield_api::LicenseAuditEvent;
use shield_api::ManagementApi;
use shield_api::ManagementApiParams;
use shield_api::RolesMappingResolver;
use shield_config::AdminDnAllowlist;
use shield_core::ConfigType;
use shield_core::ConfigurationDocument;
use shield_core::ConfigurationDocumentValidators;
use shield_core::ConfigurationSeed;
use shield_core::Ed25519LicenseDecoder;
use shield_core::Endpoint;
use shield_core::EndpointGrants;
use shield_core::FixedClock;
use shield_core::HttpMethod;
use shield_core::InMemoryConfigurationStore;
use shield_core::LicensePayload;
use shield_core::LicenseSigner;
use shield_core::LicenseUpdatePipeline;
use shield_core::NodeLimit;
use shield_core::Principal;
use shield_core::RestApiPrivilegesEvaluator;
use shield_core::RolePermissionMap;
use shield_core::StaticClusterState;
use shield_core::full_grants;
use shield_core::parse_signing_key;
use time::Date;
use time::macros::date;

/// Result type used by integration tests.
pub type TestResult = Result<(), String>;

/// Day the tests run on.
pub const TODAY: Date = date!(2026 - 10 - 18);
/// Day the test cluster was created.
pub const CREATED_ON: Date = date!(2026 - 09 - 01);
/// Administrative certificate DN.
pub const ADMIN_DN: &str = "CN=kirk,OU=client,O=client,L=Test,C=DE";

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps every event as JSON.
#[derive(Default)]
pub struct RecordingSink {
    /// Recorded events.
    events: Mutex<Vec<Value>>,
}

impl RecordingSink {
    /// Returns the recorded events with `event` label.
    pub fn events(&self, event: &str) -> Vec<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry["event"] == event)
            .cloned()
            .collect()
    }

    fn push<T: serde::Serialize>(&self, event: &T) {
        self.events.lock().unwrap().push(serde_json::to_value(event).unwrap());
    }
}

impl AuditSink for RecordingSink {
    fn record_request(&self, event: &ApiAuditEvent) {
        self.push(event);
    }

    fn record_access(&self, event: &AccessAuditEvent) {
        self.push(event);
    }

    fn record_config_change(&self, event: &ConfigChangeAuditEvent) {
        self.push(event);
    }

    fn record_license(&self, event: &LicenseAuditEvent) {
        self.push(event);
    }
}

// ============================================================================
// SECTION: Licenses
// ============================================================================

/// Returns the deterministic test signer.
pub fn signer() -> LicenseSigner {
    LicenseSigner::new(parse_signing_key(&[11u8; 32]).unwrap())
}

/// Returns a payload valid on [`TODAY`] for up to `nodes` nodes.
pub fn payload(nodes: NodeLimit) -> LicensePayload {
    LicensePayload {
        uid: "lic-1701".to_string(),
        license_type: "FULL".to_string(),
        issued_to: "Starfleet".to_string(),
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

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// Returns seed documents for a provisioned store.
pub fn seed() -> ConfigurationSeed {
    let mut seed = ConfigurationSeed::new();
    seed.insert(
        ConfigType::Config,
        ConfigurationDocument::new()
            .with_field("searchguard.dynamic.http.anonymous_auth_enabled", json!(false)),
    );
    seed.insert(
        ConfigType::Rolesmapping,
        ConfigurationDocument::new()
            .with_field("sg_config_manager", json!({"users": ["spock"]}))
            .with_field("sg_license_reader", json!({"backendroles": ["auditors"]}))
            .with_field("sg_nothing", json!({"users": ["worf"]})),
    );
    seed.insert(
        ConfigType::Roles,
        ConfigurationDocument::new()
            .with_field("sg_readall", json!({"cluster": ["CLUSTER_COMPOSITE_OPS_RO"]})),
    );
    seed.insert(
        ConfigType::Actiongroups,
        ConfigurationDocument::new().with_field("READ", json!({"permissions": ["indices:data/read*"]})),
    );
    seed.insert(ConfigType::Internalusers, ConfigurationDocument::new());
    seed
}

/// Returns the static role permission map.
pub fn permissions() -> RolePermissionMap {
    let mut reader = EndpointGrants::new();
    reader.insert(Endpoint::License, BTreeSet::from([HttpMethod::Get]));
    RolePermissionMap::new()
        .with_role("sg_config_manager", full_grants())
        .with_role("sg_license_reader", reader)
}

/// Management API wired for tests.
pub struct Fixture {
    /// Management API under test.
    pub api: ManagementApi,
    /// Backing store.
    pub store: Arc<InMemoryConfigurationStore>,
    /// Recorded audit events.
    pub audit: Arc<RecordingSink>,
}

impl Fixture {
    /// Builds a fixture over a store seeded with [`seed`].
    pub fn provisioned() -> Self {
        Self::over(Arc::new(InMemoryConfigurationStore::with_seed(seed())), 3)
    }

    /// Builds a fixture over a store that was never provisioned.
    pub fn unprovisioned() -> Self {
        Self::over(Arc::new(InMemoryConfigurationStore::new()), 3)
    }

    /// Builds a fixture over `store` for a cluster of `node_count` nodes.
    pub fn over(store: Arc<InMemoryConfigurationStore>, node_count: u32) -> Self {
        let audit = Arc::new(RecordingSink::default());
        let cluster = Arc::new(StaticClusterState::new(node_count, CREATED_ON));
        let validators = Arc::new(ConfigurationDocumentValidators::new());
        let license = LicenseUpdatePipeline::new(
            store.clone(),
            Arc::new(Ed25519LicenseDecoder::new(signer().verifying_key())),
            cluster.clone(),
            Arc::new(FixedClock(TODAY)),
            Arc::clone(&validators),
            90,
        );
        let api = ManagementApi::new(ManagementApiParams {
            store: store.clone(),
            privileges: RestApiPrivilegesEvaluator::new(
                Arc::new(permissions()),
                Arc::new(AdminDnAllowlist::new(&[ADMIN_DN])),
            ),
            resolver: Arc::new(RolesMappingResolver::new(store.clone())),
            license,
            cluster,
            validators,
            audit: audit.clone(),
        });
        Self {
            api,
            store,
            audit,
        }
    }

    /// Sends one request as `principal`.
    pub fn call(
        &self,
        principal: &Principal,
        method: HttpMethod,
        path: &str,
        body: Option<&[u8]>,
    ) -> ApiResponse {
        self.api.handle(&ApiRequest {
            method,
            path,
            body,
            principal,
        })
    }
}

/// Returns the administrative principal.
pub fn admin() -> Principal {
    Principal::named("kirk").with_distinguished_name(ADMIN_DN)
}

/// Returns the JSON body of `response`.
pub fn body(response: &ApiResponse) -> Value {
    response.json_body().cloned().unwrap_or(Value::Null)
}

/// Checks the response status.
pub fn expect_status(response: &ApiResponse, status: u16) -> TestResult {
    if response.status == status {
        Ok(())
    } else {
        Err(format!("expected status {status}, got {}: {:?}", response.status, response.body))
    }
}
