// crates/shield-config/src/seed.rs
// ============================================================================
// Module: Seed Documents
// Description: Loads initial configuration documents from a directory.
// Purpose: Provision a configuration store with validated documents.
// Dependencies: shield-core, serde_json
// ============================================================================

//! ## Overview
//! A seed directory holds one `<config_type>.json` file per configuration
//! type. Missing files yield empty documents. Every file must be a JSON
//! object; entries of schema-backed types are validated as if they were
//! written through the management API, and internal users must carry a
//! password hash, never a plaintext password.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use serde_json::Value;
use shield_core::ConfigType;
use shield_core::ConfigurationDocument;
use shield_core::ConfigurationDocumentValidators;
use shield_core::ConfigurationSeed;
use shield_core::HttpMethod;

use crate::config::ConfigError;
use crate::config::MAX_CONFIG_FILE_SIZE;

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Loads and validates the seed documents under `dir`.
///
/// # Errors
///
/// Returns [`ConfigError`] when a file cannot be read or fails validation.
pub fn load_seed(dir: &Path) -> Result<ConfigurationSeed, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::Io(format!("seed directory not found: {}", dir.display())));
    }
    let validators = ConfigurationDocumentValidators::new();
    let mut seed = ConfigurationSeed::new();
    for config_type in ConfigType::ALL {
        let path = dir.join(format!("{}.json", config_type.as_str()));
        if !path.is_file() {
            continue;
        }
        let document = read_document(&path)?;
        validate_document(&validators, config_type, &document)?;
        seed.insert(config_type, document);
    }
    Ok(seed)
}

/// Reads one seed file as a JSON object.
fn read_document(path: &Path) -> Result<ConfigurationDocument, ConfigError> {
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid(format!(
            "seed file exceeds size limit: {}",
            path.display()
        )));
    }
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|err| ConfigError::Parse(format!("{}: {err}", path.display())))?;
    ConfigurationDocument::from_json(value).ok_or_else(|| {
        ConfigError::Invalid(format!("seed file must hold a JSON object: {}", path.display()))
    })
}

/// Validates every entry of a schema-backed document.
fn validate_document(
    validators: &ConfigurationDocumentValidators,
    config_type: ConfigType,
    document: &ConfigurationDocument,
) -> Result<(), ConfigError> {
    for (name, entry) in document.fields() {
        if config_type == ConfigType::Internalusers && entry.get("password").is_some() {
            return Err(ConfigError::Invalid(format!(
                "seed {config_type} entry {name} must carry a hash, not a password"
            )));
        }
        let raw = serde_json::to_vec(entry).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        let Some(result) = validators.validate_entry(config_type, Some(raw.as_slice()), HttpMethod::Put)
        else {
            return Ok(());
        };
        if !result.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "seed {config_type} entry {name}: {}",
                result.to_error_body()
            )));
        }
    }
    Ok(())
}
