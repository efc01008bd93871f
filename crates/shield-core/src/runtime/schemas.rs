// crates/shield-core/src/runtime/schemas.rs
// ============================================================================
// Module: Configuration Document Validators
// Description: Declarative schema catalog for every configuration payload type.
// Purpose: Provide one immutable schema per configuration type and the license envelope.
// Dependencies: crate::core, crate::runtime::validator
// ============================================================================

//! ## Overview
//! Schemas are assembled once by [`ConfigurationDocumentValidators::new`] and
//! shared read-only. Every schema requires a payload on body-bearing requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ConfigType;
use crate::core::DataType;
use crate::core::DocumentSchema;
use crate::core::HttpMethod;
use crate::core::ValidationResult;
use crate::runtime::validator::SchemaValidator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Envelope key holding the signed license string.
pub const LICENSE_ENVELOPE_KEY: &str = "sg_license";

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Schema catalog keyed by payload type.
#[derive(Debug, Clone)]
pub struct ConfigurationDocumentValidators {
    /// Role mapping entry schema.
    rolesmapping: DocumentSchema,
    /// Action group entry schema.
    actiongroups: DocumentSchema,
    /// Internal user entry schema.
    internalusers: DocumentSchema,
    /// Role entry schema.
    roles: DocumentSchema,
    /// License envelope schema.
    license: DocumentSchema,
}

impl Default for ConfigurationDocumentValidators {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationDocumentValidators {
    /// Builds the catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rolesmapping: DocumentSchema::builder("rolesmapping")
                .mandatory_or("backendroles", DataType::Array)
                .mandatory_or("hosts", DataType::Array)
                .mandatory_or("users", DataType::Array)
                .payload_mandatory()
                .build(),
            actiongroups: DocumentSchema::builder("actiongroups")
                .mandatory("permissions", DataType::Array)
                .payload_mandatory()
                .build(),
            internalusers: DocumentSchema::builder("internalusers")
                .mandatory_or("hash", DataType::String)
                .mandatory_or("password", DataType::String)
                .field("roles", DataType::Array)
                .payload_mandatory()
                .build(),
            roles: DocumentSchema::builder("roles")
                .field("cluster", DataType::Array)
                .field("indices", DataType::Object)
                .field("tenants", DataType::Object)
                .payload_mandatory()
                .build(),
            license: DocumentSchema::builder("license")
                .mandatory(LICENSE_ENVELOPE_KEY, DataType::String)
                .payload_mandatory()
                .build(),
        }
    }

    /// Returns the entry schema for `config_type`, or `None` for types edited
    /// only as whole documents.
    #[must_use]
    pub const fn for_type(&self, config_type: ConfigType) -> Option<&DocumentSchema> {
        match config_type {
            ConfigType::Rolesmapping => Some(&self.rolesmapping),
            ConfigType::Actiongroups => Some(&self.actiongroups),
            ConfigType::Internalusers => Some(&self.internalusers),
            ConfigType::Roles => Some(&self.roles),
            ConfigType::Config => None,
        }
    }

    /// Returns the license envelope schema.
    #[must_use]
    pub const fn license_envelope(&self) -> &DocumentSchema {
        &self.license
    }

    /// Validates an entry payload for `config_type`.
    ///
    /// Returns `None` when the type has no entry schema.
    #[must_use]
    pub fn validate_entry(
        &self,
        config_type: ConfigType,
        raw: Option<&[u8]>,
        method: HttpMethod,
    ) -> Option<ValidationResult> {
        self.for_type(config_type).map(|schema| SchemaValidator::validate(raw, method, schema))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::ConfigurationDocumentValidators;
    use crate::core::ConfigType;
    use crate::core::HttpMethod;
    use crate::core::ValidationErrorType;

    #[test]
    fn rolesmapping_accepts_single_channel() {
        let validators = ConfigurationDocumentValidators::new();
        let result = validators.validate_entry(
            ConfigType::Rolesmapping,
            Some(br#"{"hosts": ["*.example.com"]}"#.as_slice()),
            HttpMethod::Put,
        );
        assert!(result.is_some_and(|result| result.is_valid()));
    }

    #[test]
    fn internal_user_requires_hash_or_password() {
        let validators = ConfigurationDocumentValidators::new();
        let result = validators.validate_entry(
            ConfigType::Internalusers,
            Some(br#"{"roles": ["admin"]}"#.as_slice()),
            HttpMethod::Put,
        );
        let result = result.unwrap();
        assert_eq!(result.error_type, ValidationErrorType::InvalidConfiguration);
        assert!(result.missing_mandatory_or_keys.contains("password"));
    }

    #[test]
    fn actiongroup_requires_permissions() {
        let validators = ConfigurationDocumentValidators::new();
        let result =
            validators.validate_entry(ConfigType::Actiongroups, Some(b"{}".as_slice()), HttpMethod::Put).unwrap();
        assert!(result.missing_mandatory_keys.contains("permissions"));
    }

    #[test]
    fn config_type_has_no_entry_schema() {
        let validators = ConfigurationDocumentValidators::new();
        assert!(validators.validate_entry(ConfigType::Config, None, HttpMethod::Put).is_none());
    }

    #[test]
    fn roles_reject_wrong_index_type() {
        let validators = ConfigurationDocumentValidators::new();
        let result = validators.validate_entry(
            ConfigType::Roles,
            Some(br#"{"indices": []}"#.as_slice()),
            HttpMethod::Put,
        );
        assert_eq!(result.unwrap().error_type, ValidationErrorType::WrongDatatype);
    }
}
