// crates/shield-api/tests/management_api.rs
// ============================================================================
// Module: Management API Tests
// Description: Transport-independent tests of management API behavior.
// Purpose: Validate gating, license flows, entry CRUD, and store diagnostics.
// Dependencies: shield-api, shield-core
// ============================================================================

//! ## Overview
//! Drives [`shield_api::ManagementApi`] directly with in-memory collaborators.

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

use serde_json::json;
use shield_api::ResponseBody;
use shield_api::verify_password;
use shield_core::ConfigType;
use shield_core::ConfigurationStore;
use shield_core::HttpMethod;
use shield_core::LICENSE_KEY;
use shield_core::NOT_INITIALIZED_MESSAGE;
use shield_core::NodeLimit;
use shield_core::Principal;

use crate::common::Fixture;
use crate::common::TestResult;
use crate::common::admin;
use crate::common::body;
use crate::common::envelope;
use crate::common::expect_status;
use crate::common::payload;
use crate::common::seed;
use crate::common::sign;

// ============================================================================
// SECTION: Store Provisioning
// ============================================================================

#[test]
fn unprovisioned_store_reports_fixed_diagnostic_then_recovers() -> TestResult {
    let fixture = Fixture::unprovisioned();
    let paths = [
        "/_shield/api/configuration/config",
        "/_shield/api/configuration/roles",
        "/_shield/api/configuration/rolesmapping",
        "/_shield/api/configuration/actiongroups",
        "/_shield/api/configuration/internalusers",
    ];
    for path in paths {
        let response = fixture.call(&admin(), HttpMethod::Get, path, None);
        expect_status(&response, 500)?;
        assert_eq!(response.body, ResponseBody::Text(NOT_INITIALIZED_MESSAGE.to_string()));
    }
    let spock = Principal::named("spock");
    let response = fixture.call(&spock, HttpMethod::Get, "/_shield/api/roles", None);
    expect_status(&response, 500)?;

    fixture.store.initialize(seed()).map_err(|err| err.to_string())?;
    for path in paths {
        expect_status(&fixture.call(&admin(), HttpMethod::Get, path, None), 200)?;
    }
    expect_status(&fixture.call(&spock, HttpMethod::Get, "/_shield/api/roles", None), 200)
}

#[test]
fn configuration_returns_raw_document() -> TestResult {
    let fixture = Fixture::provisioned();
    let response =
        fixture.call(&admin(), HttpMethod::Get, "/_shield/api/configuration/actiongroups", None);
    expect_status(&response, 200)?;
    assert_eq!(body(&response), json!({"READ": {"permissions": ["indices:data/read*"]}}));
    Ok(())
}

#[test]
fn system_info_reports_cluster_and_store() -> TestResult {
    let fixture = Fixture::provisioned();
    let response = fixture.call(&admin(), HttpMethod::Get, "/_shield/api/systeminfo", None);
    expect_status(&response, 200)?;
    assert_eq!(
        body(&response),
        json!({"cluster": {"node_count": 3, "created_on": "2026-09-01"}, "store": {"initialized": true}})
    );
    Ok(())
}

// ============================================================================
// SECTION: Permissions
// ============================================================================

#[test]
fn admin_has_no_disabled_endpoints() -> TestResult {
    let fixture = Fixture::provisioned();
    let response = fixture.call(&admin(), HttpMethod::Get, "/_shield/api/permissionsinfo", None);
    expect_status(&response, 200)?;
    let info = body(&response);
    assert_eq!(info["user_name"], "kirk");
    assert_eq!(info["has_api_access"], true);
    assert_eq!(info["disabled_endpoints"], json!({}));
    Ok(())
}

#[test]
fn partial_role_reports_disabled_methods() -> TestResult {
    let fixture = Fixture::provisioned();
    let mccoy = Principal::named("mccoy").with_backend_roles(["auditors"]);
    let response = fixture.call(&mccoy, HttpMethod::Get, "/_shield/api/permissionsinfo", None);
    expect_status(&response, 200)?;
    let info = body(&response);
    assert_eq!(info["user"], "User [name=mccoy, backend_roles=[auditors]]");
    assert_eq!(info["has_api_access"], true);
    assert_eq!(info["disabled_endpoints"]["LICENSE"], json!(["PUT", "POST", "DELETE"]));
    assert_eq!(info["disabled_endpoints"]["ROLES"], json!(["GET", "PUT", "POST", "DELETE"]));
    Ok(())
}

#[test]
fn role_without_grants_has_no_api_access() -> TestResult {
    let fixture = Fixture::provisioned();
    let worf = Principal::named("worf");
    let response = fixture.call(&worf, HttpMethod::Get, "/_shield/api/permissionsinfo", None);
    expect_status(&response, 200)?;
    assert_eq!(body(&response)["has_api_access"], false);

    let denied = fixture.call(&worf, HttpMethod::Get, "/_shield/api/license", None);
    expect_status(&denied, 403)?;
    assert_eq!(body(&denied)["status"], "FORBIDDEN");
    let access = fixture.audit.events("api_access");
    assert_eq!(access.len(), 1);
    assert_eq!(access[0]["allowed"], false);
    assert_eq!(access[0]["reason"], "not_granted");
    Ok(())
}

#[test]
fn reader_may_read_but_not_write_license() -> TestResult {
    let fixture = Fixture::provisioned();
    let mccoy = Principal::named("mccoy").with_backend_roles(["auditors"]);
    expect_status(&fixture.call(&mccoy, HttpMethod::Get, "/_shield/api/license", None), 200)?;
    let artifact = sign(&payload(NodeLimit::Unlimited));
    let response =
        fixture.call(&mccoy, HttpMethod::Put, "/_shield/api/license", Some(envelope(&artifact).as_slice()));
    expect_status(&response, 403)?;
    let config = fixture.store.read(ConfigType::Config).map_err(|err| err.to_string())?;
    assert!(!config.contains(LICENSE_KEY));
    Ok(())
}

#[test]
fn unknown_paths_and_methods_are_rejected() -> TestResult {
    let fixture = Fixture::provisioned();
    expect_status(&fixture.call(&admin(), HttpMethod::Get, "/_shield/api/tenants", None), 404)?;
    expect_status(&fixture.call(&admin(), HttpMethod::Delete, "/_shield/api/license", None), 405)?;
    let requests = fixture.audit.events("management_api_request");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["status"], 404);
    assert_eq!(requests[1]["endpoint"], "LICENSE");
    Ok(())
}

// ============================================================================
// SECTION: License
// ============================================================================

#[test]
fn license_defaults_to_trial() -> TestResult {
    let fixture = Fixture::provisioned();
    let response = fixture.call(&admin(), HttpMethod::Get, "/_shield/api/license", None);
    expect_status(&response, 200)?;
    let license = &body(&response)["sg_license"];
    assert_eq!(license["type"], "TRIAL");
    assert_eq!(license["start_date"], "2026-09-01");
    assert_eq!(license["expiry_date"], "2026-11-30");
    assert_eq!(license["allowed_node_count_per_cluster"], "unlimited");
    assert_eq!(license["is_valid"], true);
    Ok(())
}

#[test]
fn first_license_creates_then_updates() -> TestResult {
    let fixture = Fixture::provisioned();
    let first = sign(&payload(NodeLimit::Limited(5)));
    let response =
        fixture.call(&admin(), HttpMethod::Put, "/_shield/api/license", Some(envelope(&first).as_slice()));
    expect_status(&response, 201)?;
    assert_eq!(body(&response)["status"], "CREATED");

    let mut renewed = payload(NodeLimit::Unlimited);
    renewed.uid = "lic-1702".to_string();
    let second = sign(&renewed);
    let response =
        fixture.call(&admin(), HttpMethod::Post, "/_shield/api/license", Some(envelope(&second).as_slice()));
    expect_status(&response, 200)?;

    let current = fixture.call(&admin(), HttpMethod::Get, "/_shield/api/license", None);
    let license = &body(&current)["sg_license"];
    assert_eq!(license["uid"], "lic-1702");
    assert_eq!(license["type"], "FULL");
    assert_eq!(license["is_expired"], false);

    let outcomes: Vec<_> = fixture
        .audit
        .events("license_update")
        .iter()
        .map(|event| event["outcome"].clone())
        .collect();
    assert_eq!(outcomes, vec![json!("created"), json!("updated")]);
    Ok(())
}

#[test]
fn rejected_license_leaves_configuration_untouched() -> TestResult {
    let fixture = Fixture::provisioned();
    let valid = sign(&payload(NodeLimit::Unlimited));
    let stored =
        fixture.call(&admin(), HttpMethod::Put, "/_shield/api/license", Some(envelope(&valid).as_slice()));
    expect_status(&stored, 201)?;
    let before = fixture.store.read(ConfigType::Config).map_err(|err| err.to_string())?;

    let response =
        fixture.call(&admin(), HttpMethod::Put, "/_shield/api/license", Some(envelope("lalala").as_slice()));
    expect_status(&response, 400)?;
    let message = body(&response)["message"].as_str().unwrap_or_default().to_string();
    assert!(message.starts_with("License could not be decoded due to: "), "{message}");

    let mut stale = payload(NodeLimit::Limited(1));
    stale.start_date = "2020-01-01".to_string();
    stale.expiry_date = "2021-01-01".to_string();
    let response = fixture.call(
        &admin(),
        HttpMethod::Put,
        "/_shield/api/license",
        Some(envelope(&sign(&stale)).as_slice()),
    );
    expect_status(&response, 400)?;
    let message = body(&response)["message"].as_str().unwrap_or_default().to_string();
    assert!(message.contains("License is expired"), "{message}");
    assert!(message.contains("Only 1 node(s) allowed but you run 3 node(s)"), "{message}");

    let after = fixture.store.read(ConfigType::Config).map_err(|err| err.to_string())?;
    assert_eq!(before, after);
    let rejected = fixture.audit.events("license_update");
    assert_eq!(rejected[2]["outcome"], "rejected");
    assert_eq!(rejected[2]["violations"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn license_envelope_errors_have_stable_bodies() -> TestResult {
    let fixture = Fixture::provisioned();
    let missing = fixture.call(&admin(), HttpMethod::Put, "/_shield/api/license", None);
    expect_status(&missing, 400)?;
    assert_eq!(
        body(&missing),
        json!({"status": "error", "reason": "Request body required for this action."})
    );

    let blank = fixture.call(
        &admin(),
        HttpMethod::Put,
        "/_shield/api/license",
        Some(b"{\"sg_license\": \"  \"}".as_slice()),
    );
    expect_status(&blank, 400)?;
    assert_eq!(body(&blank), json!({"status": "BAD_REQUEST", "message": "License must not be null."}));

    let extra = fixture.call(
        &admin(),
        HttpMethod::Put,
        "/_shield/api/license",
        Some(b"{\"sg_license\": \"x\", \"other\": 1}".as_slice()),
    );
    expect_status(&extra, 400)?;
    assert_eq!(body(&extra)["reason"], "Invalid configuration");
    Ok(())
}

// ============================================================================
// SECTION: Entries
// ============================================================================

#[test]
fn entry_lifecycle_writes_only_the_entry() -> TestResult {
    let fixture = Fixture::provisioned();
    let spock = Principal::named("spock");
    let path = "/_shield/api/roles/sg_bridge";
    let role = br#"{"cluster": ["CLUSTER_MONITOR"], "indices": {"logs-*": {"*": ["READ"]}}}"#;

    expect_status(&fixture.call(&spock, HttpMethod::Put, path, Some(role.as_slice())), 201)?;
    expect_status(&fixture.call(&spock, HttpMethod::Put, path, Some(role.as_slice())), 200)?;
    let fetched = fixture.call(&spock, HttpMethod::Get, path, None);
    expect_status(&fetched, 200)?;
    assert_eq!(body(&fetched)["sg_bridge"]["cluster"], json!(["CLUSTER_MONITOR"]));

    let roles = fixture.store.read(ConfigType::Roles).map_err(|err| err.to_string())?;
    assert_eq!(roles.len(), 2);
    assert!(roles.contains("sg_readall"));

    expect_status(&fixture.call(&spock, HttpMethod::Delete, path, None), 200)?;
    expect_status(&fixture.call(&spock, HttpMethod::Get, path, None), 404)?;
    let changes: Vec<_> = fixture
        .audit
        .events("config_change")
        .iter()
        .map(|event| event["change"].clone())
        .collect();
    assert_eq!(changes, vec![json!("created"), json!("updated"), json!("deleted")]);
    Ok(())
}

#[test]
fn deleting_missing_entry_is_not_found_without_write() -> TestResult {
    let fixture = Fixture::provisioned();
    let before = fixture.store.read(ConfigType::Actiongroups).map_err(|err| err.to_string())?;
    let response =
        fixture.call(&admin(), HttpMethod::Delete, "/_shield/api/actiongroups/WRITE", None);
    expect_status(&response, 404)?;
    let after = fixture.store.read(ConfigType::Actiongroups).map_err(|err| err.to_string())?;
    assert_eq!(before, after);
    assert!(fixture.audit.events("config_change").is_empty());
    Ok(())
}

#[test]
fn invalid_entries_are_rejected_with_schema_bodies() -> TestResult {
    let fixture = Fixture::provisioned();
    let mapping = fixture.call(
        &admin(),
        HttpMethod::Put,
        "/_shield/api/rolesmapping/sg_bridge",
        Some(b"{}".as_slice()),
    );
    expect_status(&mapping, 400)?;
    assert_eq!(body(&mapping)["reason"], "Invalid configuration");

    let wrong_type = fixture.call(
        &admin(),
        HttpMethod::Put,
        "/_shield/api/actiongroup/WRITE",
        Some(br#"{"permissions": "indices:data/write*"}"#.as_slice()),
    );
    expect_status(&wrong_type, 400)?;
    assert_eq!(body(&wrong_type)["reason"], "Wrong datatype");
    assert_eq!(body(&wrong_type)["permissions"], "Array expected");

    let not_json = fixture.call(
        &admin(),
        HttpMethod::Put,
        "/_shield/api/roles/sg_bridge",
        Some(b"cluster: all".as_slice()),
    );
    expect_status(&not_json, 400)?;
    assert_eq!(body(&not_json)["reason"], "Could not parse content of request.");
    assert_eq!(
        fixture.store.read(ConfigType::Rolesmapping).map_err(|err| err.to_string())?.len(),
        3
    );
    Ok(())
}

#[test]
fn internal_user_passwords_are_hashed_and_redacted() -> TestResult {
    let fixture = Fixture::provisioned();
    let response = fixture.call(
        &admin(),
        HttpMethod::Put,
        "/_shield/api/user/picard",
        Some(br#"{"password": "engage", "roles": ["captains"]}"#.as_slice()),
    );
    expect_status(&response, 201)?;

    let users = fixture.store.read(ConfigType::Internalusers).map_err(|err| err.to_string())?;
    let stored = users.get("picard").cloned().unwrap_or_default();
    assert!(stored.get("password").is_none());
    let hash = stored["hash"].as_str().unwrap_or_default();
    assert!(verify_password("engage", hash));

    let listed = fixture.call(&admin(), HttpMethod::Get, "/_shield/api/internalusers", None);
    expect_status(&listed, 200)?;
    assert_eq!(body(&listed), json!({"picard": {"roles": ["captains"]}}));

    let empty = fixture.call(
        &admin(),
        HttpMethod::Put,
        "/_shield/api/user/riker",
        Some(br#"{"password": ""}"#.as_slice()),
    );
    expect_status(&empty, 400)?;
    let users = fixture.store.read(ConfigType::Internalusers).map_err(|err| err.to_string())?;
    assert!(!users.contains("riker"));
    Ok(())
}

#[test]
fn cache_flush_is_gated() -> TestResult {
    let fixture = Fixture::provisioned();
    expect_status(&fixture.call(&admin(), HttpMethod::Delete, "/_shield/api/cache", None), 200)?;
    let mccoy = Principal::named("mccoy").with_backend_roles(["auditors"]);
    expect_status(&fixture.call(&mccoy, HttpMethod::Delete, "/_shield/api/cache", None), 403)
}
