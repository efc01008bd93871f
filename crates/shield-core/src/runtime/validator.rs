// crates/shield-core/src/runtime/validator.rs
// ============================================================================
// Module: Schema Validator
// Description: Pure rule checker for configuration payloads.
// Purpose: Classify a raw payload against a declarative document schema.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! [`SchemaValidator::validate`] checks one raw payload against one
//! [`DocumentSchema`]. It has no side effects and always returns a fresh
//! [`ValidationResult`]; identical inputs yield identical results.
//!
//! Classification order:
//! 1. Body-bearing request without a payload on a payload-mandatory schema.
//! 2. Payload that is not a JSON object.
//! 3. Keys with a wrong runtime type.
//! 4. Unknown keys and missing mandatory or mandatory-or keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::DocumentSchema;
use crate::core::HttpMethod;
use crate::core::ValidationErrorType;
use crate::core::ValidationResult;

// ============================================================================
// SECTION: Schema Validator
// ============================================================================

/// Stateless schema validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validates `raw` sent with `method` against `schema`.
    #[must_use]
    pub fn validate(
        raw: Option<&[u8]>,
        method: HttpMethod,
        schema: &DocumentSchema,
    ) -> ValidationResult {
        if is_blank(raw) {
            if method.has_body() && schema.payload_mandatory() {
                return ValidationResult::of(ValidationErrorType::PayloadMandatory);
            }
            return ValidationResult::of(ValidationErrorType::None);
        }
        let Some(fields) = raw.and_then(parse_object) else {
            return ValidationResult::of(ValidationErrorType::PayloadNotJson);
        };
        check_fields(&fields, schema)
    }

    /// Parses `raw` into a JSON object, or `None` when it is not one.
    #[must_use]
    pub fn parse_object(raw: &[u8]) -> Option<Map<String, Value>> {
        parse_object(raw)
    }
}

/// Returns true when the payload is absent or whitespace only.
fn is_blank(raw: Option<&[u8]>) -> bool {
    raw.is_none_or(|bytes| bytes.iter().all(u8::is_ascii_whitespace))
}

/// Parses a JSON object.
fn parse_object(raw: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Applies key-level rules to a parsed payload.
fn check_fields(fields: &Map<String, Value>, schema: &DocumentSchema) -> ValidationResult {
    let mut result = ValidationResult::of(ValidationErrorType::None);
    let allowed = schema.allowed_keys();

    for (name, value) in fields {
        match allowed.get(name) {
            None => {
                result.invalid_keys.insert(name.clone());
            }
            Some(rule) if !rule.data_type.matches(value) => {
                result.wrong_fields.insert(name.clone(), rule.data_type);
            }
            Some(_) => {}
        }
    }

    result.missing_mandatory_keys = schema
        .mandatory_keys()
        .iter()
        .filter(|key| !fields.contains_key(key.as_str()))
        .cloned()
        .collect();

    let or_keys = schema.mandatory_or_keys();
    if !or_keys.is_empty() && !or_keys.iter().any(|key| fields.contains_key(key.as_str())) {
        result.missing_mandatory_or_keys = or_keys.clone();
    }

    result.error_type = if !result.wrong_fields.is_empty() {
        ValidationErrorType::WrongDatatype
    } else if !result.invalid_keys.is_empty()
        || !result.missing_mandatory_keys.is_empty()
        || !result.missing_mandatory_or_keys.is_empty()
    {
        ValidationErrorType::InvalidConfiguration
    } else {
        ValidationErrorType::None
    };
    result
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::SchemaValidator;
    use crate::core::DataType;
    use crate::core::DocumentSchema;
    use crate::core::HttpMethod;
    use crate::core::ValidationErrorType;

    fn mapping_schema() -> DocumentSchema {
        DocumentSchema::builder("rolesmapping")
            .mandatory_or("backendroles", DataType::Array)
            .mandatory_or("hosts", DataType::Array)
            .mandatory_or("users", DataType::Array)
            .payload_mandatory()
            .build()
    }

    #[test]
    fn empty_body_on_put_is_payload_mandatory() {
        let result = SchemaValidator::validate(None, HttpMethod::Put, &mapping_schema());
        assert_eq!(result.error_type, ValidationErrorType::PayloadMandatory);
        let result = SchemaValidator::validate(Some(b"  \n".as_slice()), HttpMethod::Put, &mapping_schema());
        assert_eq!(result.error_type, ValidationErrorType::PayloadMandatory);
    }

    #[test]
    fn empty_body_on_get_is_accepted() {
        let result = SchemaValidator::validate(None, HttpMethod::Get, &mapping_schema());
        assert!(result.is_valid());
    }

    #[test]
    fn non_object_json_is_rejected() {
        let cases: [&[u8]; 4] = [b"[1,2]", b"\"x\"", b"{not json", &[0xff, 0xfe]];
        for raw in cases {
            let result = SchemaValidator::validate(Some(raw), HttpMethod::Put, &mapping_schema());
            assert_eq!(result.error_type, ValidationErrorType::PayloadNotJson);
        }
    }

    #[test]
    fn empty_object_misses_mandatory_or_group() {
        let result = SchemaValidator::validate(Some(b"{}".as_slice()), HttpMethod::Put, &mapping_schema());
        assert_eq!(result.error_type, ValidationErrorType::InvalidConfiguration);
        assert_eq!(result.missing_mandatory_or_keys.len(), 3);
    }

    #[test]
    fn wrong_type_takes_priority_over_unknown_keys() {
        let raw = br#"{"users": "bob", "extra": 1}"#.as_slice();
        let result = SchemaValidator::validate(Some(raw), HttpMethod::Put, &mapping_schema());
        assert_eq!(result.error_type, ValidationErrorType::WrongDatatype);
        assert_eq!(result.wrong_fields.get("users"), Some(&DataType::Array));
        assert!(result.invalid_keys.contains("extra"));
    }
}
