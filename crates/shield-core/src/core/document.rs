// crates/shield-core/src/core/document.rs
// ============================================================================
// Module: Configuration Documents
// Description: Persisted security configuration documents and their types.
// Purpose: Model the flat key space stored per configuration type.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Security configuration is persisted as one logical document per
//! [`ConfigType`]. Each document is a flat, ordered key space of JSON values.
//! Updates replace individual keys and never touch keys they do not own, so a
//! document's serialized form is stable across unrelated writes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Key holding the raw signed license inside the `config` document.
pub const LICENSE_KEY: &str = "searchguard.dynamic.license";

// ============================================================================
// SECTION: Config Type
// ============================================================================

/// Configuration document type, addressed by a stable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    /// Dynamic cluster configuration (authc/authz domains, license).
    Config,
    /// Role definitions.
    Roles,
    /// Role mappings.
    Rolesmapping,
    /// Action groups.
    Actiongroups,
    /// Internal users.
    Internalusers,
}

impl ConfigType {
    /// All configuration types.
    pub const ALL: [Self; 5] =
        [Self::Config, Self::Roles, Self::Rolesmapping, Self::Actiongroups, Self::Internalusers];

    /// Returns the stable storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Roles => "roles",
            Self::Rolesmapping => "rolesmapping",
            Self::Actiongroups => "actiongroups",
            Self::Internalusers => "internalusers",
        }
    }

    /// Parses a storage key.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|config_type| config_type.as_str() == name)
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Configuration Document
// ============================================================================

/// Flat key/value configuration document.
///
/// # Invariants
/// - Keys are ordered, so serialization is deterministic.
/// - Writers replace only the keys they own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationDocument {
    /// Document fields keyed by flat name.
    fields: BTreeMap<String, Value>,
}

impl ConfigurationDocument {
    /// Creates an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns true when `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns a copy with `key` set to `value`; every other key is unchanged.
    #[must_use]
    pub fn with_field(&self, key: impl Into<String>, value: Value) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(key.into(), value);
        Self {
            fields,
        }
    }

    /// Returns a copy without `key`; every other key is unchanged.
    #[must_use]
    pub fn without_field(&self, key: &str) -> Self {
        let mut fields = self.fields.clone();
        fields.remove(key);
        Self {
            fields,
        }
    }

    /// Returns the document fields.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the document as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone().into_iter().collect())
    }

    /// Builds a document from a JSON object, or `None` for any other value.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                fields: map.into_iter().collect(),
            }),
            _ => None,
        }
    }
}

impl FromIterator<(String, Value)> for ConfigurationDocument {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Initial documents used to provision a configuration store.
pub type ConfigurationSeed = BTreeMap<ConfigType, ConfigurationDocument>;
