// crates/shield-api/tests/http_e2e.rs
// ============================================================================
// Module: HTTP End-to-End Tests
// Description: Exercises the axum server over a real TCP listener.
// Purpose: Validate authentication headers, status mapping, and seeding.
// Dependencies: shield-api, shield-config, reqwest, tokio, tempfile
// ============================================================================

//! ## Overview
//! Boots [`shield_api::ShieldServer`] on `127.0.0.1:0` with a seeded
//! in-memory store and drives it with `reqwest`.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;
use shield_api::ServerOverrides;
use shield_api::ShieldServer;
use shield_config::ShieldConfig;
use shield_core::FixedClock;
use shield_core::NodeLimit;
use shield_core::encode_key;
use tokio::net::TcpListener;

use crate::common::ADMIN_DN;
use crate::common::RecordingSink;
use crate::common::TODAY;
use crate::common::TestResult;
use crate::common::envelope;
use crate::common::payload;
use crate::common::sign;
use crate::common::signer;

/// Running server handle.
struct TestServer {
    /// Base URL including the API prefix.
    base: String,
    /// Recorded audit events.
    audit: Arc<RecordingSink>,
    /// Seed directory kept alive for the server lifetime.
    _seed: tempfile::TempDir,
}

fn write_seed(dir: &Path) {
    std::fs::write(
        dir.join("rolesmapping.json"),
        r#"{"sg_config_manager": {"users": ["spock"]}}"#,
    )
    .unwrap();
    std::fs::write(dir.join("config.json"), r#"{"searchguard.dynamic.kibana.multitenancy_enabled": true}"#)
        .unwrap();
}

fn config_toml(seed_dir: &Path) -> String {
    format!(
        r#"
[server]
bind = "127.0.0.1:0"
max_body_bytes = 4096

[server.audit]
sink = "none"

[admin]
distinguished_names = ["{ADMIN_DN}"]

[rest_api.roles.sg_config_manager]
deny = {{ LICENSE = ["PUT", "POST"] }}

[license]
verifying_key = "{key}"

[cluster]
node_count = 3
created_on = "2026-09-01"

[store]
type = "memory"
seed_dir = "{seed}"

[[principals]]
name = "kirk"
distinguished_name = "{ADMIN_DN}"

[[principals]]
name = "spock"
backend_roles = ["science"]
"#,
        key = encode_key(&signer().verifying_key().to_bytes()),
        seed = seed_dir.display(),
    )
}

async fn start() -> TestServer {
    let seed = tempfile::tempdir().unwrap();
    write_seed(seed.path());
    let config = ShieldConfig::from_toml(&config_toml(seed.path())).unwrap();
    let audit = Arc::new(RecordingSink::default());
    let server = ShieldServer::from_config_with(config, ServerOverrides {
        clock: Some(Arc::new(FixedClock(TODAY))),
        audit: Some(audit.clone()),
    })
    .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(server.serve_on(listener));
    TestServer {
        base: format!("http://{addr}/_shield/api"),
        audit,
        _seed: seed,
    }
}

async fn json_of(response: reqwest::Response) -> Value {
    response.json().await.unwrap_or(Value::Null)
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_or_unknown_identity_is_unauthorized() -> TestResult {
    let server = start().await;
    let client = reqwest::Client::new();
    let anonymous = client.get(format!("{}/license", server.base)).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_of(anonymous).await["status"], "UNAUTHORIZED");

    let stranger = client
        .get(format!("{}/license", server.base))
        .header("x-shield-user", "q")
        .send()
        .await
        .unwrap();
    assert_eq!(stranger.status(), StatusCode::UNAUTHORIZED);

    let forged = client
        .get(format!("{}/permissionsinfo", server.base))
        .header("x-shield-user", "kirk")
        .header("x-shield-dn", "CN=khan")
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    let requests = server.audit.events("management_api_request");
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|event| event["principal"].is_null()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_uploads_license_over_http() -> TestResult {
    let server = start().await;
    let client = reqwest::Client::new();
    let artifact = sign(&payload(NodeLimit::Unlimited));
    let created = client
        .put(format!("{}/license", server.base))
        .header("x-shield-user", "kirk")
        .header("x-shield-dn", "cn=kirk, ou=client, o=client, l=Test, c=DE")
        .body(envelope(&artifact))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);

    let current = client
        .get(format!("{}/license", server.base))
        .header("x-shield-user", "kirk")
        .header("x-shield-dn", ADMIN_DN)
        .send()
        .await
        .unwrap();
    assert_eq!(current.status(), StatusCode::OK);
    let body = json_of(current).await;
    assert_eq!(body["sg_license"]["issued_to"], "Starfleet");
    assert_eq!(body["sg_license"]["is_valid"], true);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn configured_role_grants_are_enforced() -> TestResult {
    let server = start().await;
    let client = reqwest::Client::new();
    let info = client
        .get(format!("{}/permissionsinfo", server.base))
        .header("x-shield-user", "spock")
        .send()
        .await
        .unwrap();
    assert_eq!(info.status(), StatusCode::OK);
    let body = json_of(info).await;
    assert_eq!(body["has_api_access"], true);
    assert_eq!(body["disabled_endpoints"], json!({"LICENSE": ["PUT", "POST"]}));

    let denied = client
        .put(format!("{}/license", server.base))
        .header("x-shield-user", "spock")
        .body(envelope("anything"))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let config = client
        .get(format!("{}/configuration/config", server.base))
        .header("x-shield-user", "spock")
        .send()
        .await
        .unwrap();
    assert_eq!(config.status(), StatusCode::OK);
    assert_eq!(
        json_of(config).await,
        json!({"searchguard.dynamic.kibana.multitenancy_enabled": true})
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unsupported_methods_and_oversized_bodies_are_rejected() -> TestResult {
    let server = start().await;
    let client = reqwest::Client::new();
    let patch = client
        .patch(format!("{}/roles/sg_bridge", server.base))
        .header("x-shield-user", "spock")
        .send()
        .await
        .unwrap();
    assert_eq!(patch.status(), StatusCode::METHOD_NOT_ALLOWED);

    let oversized = vec![b' '; 8 * 1024];
    let large = client
        .put(format!("{}/roles/sg_bridge", server.base))
        .header("x-shield-user", "spock")
        .body(oversized)
        .send()
        .await
        .unwrap();
    assert_eq!(large.status(), StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn asserted_admin_dn_does_not_elevate_unpinned_principal() -> TestResult {
    let server = start().await;
    let client = reqwest::Client::new();
    let info = client
        .get(format!("{}/permissionsinfo", server.base))
        .header("x-shield-user", "spock")
        .header("x-shield-dn", ADMIN_DN)
        .send()
        .await
        .unwrap();
    assert_eq!(info.status(), StatusCode::OK);
    let body = json_of(info).await;
    assert_eq!(body["disabled_endpoints"], json!({"LICENSE": ["PUT", "POST"]}));

    let upload = client
        .put(format!("{}/license", server.base))
        .header("x-shield-user", "spock")
        .header("x-shield-dn", ADMIN_DN)
        .body(envelope(&sign(&payload(NodeLimit::Unlimited))))
        .send()
        .await
        .unwrap();
    assert_eq!(upload.status(), StatusCode::FORBIDDEN);

    let access = server.audit.events("api_access");
    assert_eq!(access.len(), 1);
    assert_eq!(access[0]["admin"], false);
    assert_eq!(access[0]["allowed"], false);
    Ok(())
}

#[test]
fn api_and_license_pipeline_share_one_schema_catalog() {
    let seed = tempfile::tempdir().unwrap();
    write_seed(seed.path());
    let config = ShieldConfig::from_toml(&config_toml(seed.path())).unwrap();
    let server = ShieldServer::from_config(config).unwrap();
    let api = server.api();
    assert!(Arc::ptr_eq(api.validators(), api.license().validators()));
}
