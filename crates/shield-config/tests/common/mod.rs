// crates/shield-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for shield-config.
// =============================================================================

//! ## Overview
//! Minimal config text and assertion helpers shared by the config suites.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use shield_config::ConfigError;
use shield_config::ShieldConfig;
use shield_core::LicenseSigner;
use shield_core::encode_key;
use shield_core::parse_signing_key;

/// Result type used by integration tests.
pub type TestResult = Result<(), String>;

/// Returns a base64 verifying key derived from a fixed seed.
pub fn verifying_key_b64() -> String {
    let signing = parse_signing_key(&[7u8; 32]).unwrap();
    encode_key(&LicenseSigner::new(signing).verifying_key().to_bytes())
}

/// Returns the smallest valid configuration text.
pub fn minimal_toml() -> String {
    format!(
        "[license]\nverifying_key = \"{}\"\n\n[cluster]\nnode_count = 3\ncreated_on = \"2026-09-01\"\n",
        verifying_key_b64()
    )
}

/// Parses `extra` appended to the minimal configuration.
pub fn config_with(extra: &str) -> Result<ShieldConfig, ConfigError> {
    ShieldConfig::from_toml(&format!("{}\n{extra}", minimal_toml()))
}

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
