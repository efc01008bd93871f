// crates/shield-core/src/core/schema.rs
// ============================================================================
// Module: Document Schemas
// Description: Declarative field rules and validation results for config payloads.
// Purpose: Describe what a configuration payload may contain before domain logic runs.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`DocumentSchema`] lists the keys a payload may carry, the JSON type of
//! each, the keys that must all be present, and the keys of which at least one
//! must be present. Schemas are assembled once and never mutated; the
//! validator in [`crate::runtime::validator`] produces a fresh
//! [`ValidationResult`] per call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Field Rules
// ============================================================================

/// JSON type expected for a configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    /// JSON string.
    String,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// JSON boolean.
    Boolean,
}

impl DataType {
    /// Returns true when the runtime value has this type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Boolean => value.is_boolean(),
        }
    }

    /// Returns the diagnostic used when a value has the wrong type.
    #[must_use]
    pub const fn expected_label(self) -> &'static str {
        match self {
            Self::String => "String expected",
            Self::Array => "Array expected",
            Self::Object => "Object expected",
            Self::Boolean => "Boolean expected",
        }
    }
}

/// One allowed configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    /// Key name.
    pub name: String,
    /// Expected JSON type.
    pub data_type: DataType,
}

// ============================================================================
// SECTION: Document Schema
// ============================================================================

/// Declarative rule set for one configuration payload type.
///
/// # Invariants
/// - Immutable after [`DocumentSchemaBuilder::build`].
/// - Every mandatory and mandatory-or key is also an allowed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSchema {
    /// Schema label used in diagnostics.
    name: &'static str,
    /// Allowed keys and their rules.
    allowed_keys: BTreeMap<String, FieldRule>,
    /// Keys that must all be present.
    mandatory_keys: BTreeSet<String>,
    /// Keys of which at least one must be present.
    mandatory_or_keys: BTreeSet<String>,
    /// Whether body-bearing requests must carry a payload.
    payload_mandatory: bool,
}

impl DocumentSchema {
    /// Starts a schema definition.
    #[must_use]
    pub fn builder(name: &'static str) -> DocumentSchemaBuilder {
        DocumentSchemaBuilder {
            schema: Self {
                name,
                allowed_keys: BTreeMap::new(),
                mandatory_keys: BTreeSet::new(),
                mandatory_or_keys: BTreeSet::new(),
                payload_mandatory: false,
            },
        }
    }

    /// Returns the schema label.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the allowed keys.
    #[must_use]
    pub const fn allowed_keys(&self) -> &BTreeMap<String, FieldRule> {
        &self.allowed_keys
    }

    /// Returns the keys that must all be present.
    #[must_use]
    pub const fn mandatory_keys(&self) -> &BTreeSet<String> {
        &self.mandatory_keys
    }

    /// Returns the keys of which at least one must be present.
    #[must_use]
    pub const fn mandatory_or_keys(&self) -> &BTreeSet<String> {
        &self.mandatory_or_keys
    }

    /// Returns whether body-bearing requests must carry a payload.
    #[must_use]
    pub const fn payload_mandatory(&self) -> bool {
        self.payload_mandatory
    }
}

/// Builder for [`DocumentSchema`].
#[derive(Debug)]
pub struct DocumentSchemaBuilder {
    /// Schema under construction.
    schema: DocumentSchema,
}

impl DocumentSchemaBuilder {
    /// Adds an allowed key.
    #[must_use]
    pub fn field(mut self, name: &str, data_type: DataType) -> Self {
        self.schema.allowed_keys.insert(
            name.to_string(),
            FieldRule {
                name: name.to_string(),
                data_type,
            },
        );
        self
    }

    /// Adds an allowed key that must be present.
    #[must_use]
    pub fn mandatory(mut self, name: &str, data_type: DataType) -> Self {
        self.schema.mandatory_keys.insert(name.to_string());
        self.field(name, data_type)
    }

    /// Adds an allowed key to the mandatory-or group.
    #[must_use]
    pub fn mandatory_or(mut self, name: &str, data_type: DataType) -> Self {
        self.schema.mandatory_or_keys.insert(name.to_string());
        self.field(name, data_type)
    }

    /// Requires body-bearing requests to carry a payload.
    #[must_use]
    pub fn payload_mandatory(mut self) -> Self {
        self.schema.payload_mandatory = true;
        self
    }

    /// Finishes the schema.
    #[must_use]
    pub fn build(self) -> DocumentSchema {
        self.schema
    }
}

// ============================================================================
// SECTION: Validation Result
// ============================================================================

/// Outcome classification of a schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorType {
    /// Payload satisfies the schema.
    None,
    /// Body-bearing request without a payload.
    PayloadMandatory,
    /// Payload is not a JSON object.
    PayloadNotJson,
    /// Unknown keys or missing mandatory keys.
    InvalidConfiguration,
    /// A key carries a value of the wrong type.
    WrongDatatype,
}

impl ValidationErrorType {
    /// Returns the diagnostic reason for the error type.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::None => "ok",
            Self::PayloadMandatory => "Request body required for this action.",
            Self::PayloadNotJson => "Could not parse content of request.",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::WrongDatatype => "Wrong datatype",
        }
    }
}

impl fmt::Display for ValidationErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of validating one payload against a [`DocumentSchema`].
///
/// # Invariants
/// - Produced fresh per call and never mutated afterwards.
/// - `error_type == None` iff every diagnostic collection is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Outcome classification.
    pub error_type: ValidationErrorType,
    /// Present keys that the schema does not allow.
    pub invalid_keys: BTreeSet<String>,
    /// Present keys with wrong runtime type, mapped to the expected type.
    pub wrong_fields: BTreeMap<String, DataType>,
    /// Mandatory keys that are absent.
    pub missing_mandatory_keys: BTreeSet<String>,
    /// Mandatory-or group reported when none of its keys is present.
    pub missing_mandatory_or_keys: BTreeSet<String>,
}

impl ValidationResult {
    /// Builds a result carrying only an error type.
    #[must_use]
    pub const fn of(error_type: ValidationErrorType) -> Self {
        Self {
            error_type,
            invalid_keys: BTreeSet::new(),
            wrong_fields: BTreeMap::new(),
            missing_mandatory_keys: BTreeSet::new(),
            missing_mandatory_or_keys: BTreeSet::new(),
        }
    }

    /// Returns true when the payload satisfied the schema.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error_type == ValidationErrorType::None
    }

    /// Renders the diagnostic body returned to management API callers.
    #[must_use]
    pub fn to_error_body(&self) -> Value {
        let mut body = serde_json::Map::new();
        body.insert("status".to_string(), json!("error"));
        body.insert("reason".to_string(), json!(self.error_type.message()));
        match self.error_type {
            ValidationErrorType::InvalidConfiguration => {
                insert_key_list(&mut body, "invalid_keys", &self.invalid_keys);
                insert_key_list(&mut body, "missing_mandatory_keys", &self.missing_mandatory_keys);
                insert_key_list(
                    &mut body,
                    "missing_mandatory_or_keys",
                    &self.missing_mandatory_or_keys,
                );
            }
            ValidationErrorType::WrongDatatype => {
                for (name, data_type) in &self.wrong_fields {
                    body.insert(name.clone(), json!(data_type.expected_label()));
                }
            }
            ValidationErrorType::None
            | ValidationErrorType::PayloadMandatory
            | ValidationErrorType::PayloadNotJson => {}
        }
        Value::Object(body)
    }
}

/// Inserts a `{"keys": "a,b"}` entry when the key set is non-empty.
fn insert_key_list(body: &mut serde_json::Map<String, Value>, label: &str, keys: &BTreeSet<String>) {
    if keys.is_empty() {
        return;
    }
    let joined = keys.iter().map(String::as_str).collect::<Vec<_>>().join(",");
    body.insert(label.to_string(), json!({ "keys": joined }));
}
