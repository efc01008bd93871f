// crates/shield-core/src/runtime/license_update.rs
// ============================================================================
// Module: License Update Pipeline
// Description: Validate, decode, evaluate, and persist submitted licenses.
// Purpose: Apply license updates so that rejected submissions never touch storage.
// Dependencies: crate::core, crate::interfaces, crate::runtime, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`LicenseUpdatePipeline::apply`] runs four stages in order: envelope
//! validation, decoding, evaluation, and a single atomic write that replaces
//! only the license key of the `config` document. Any failure before the write
//! returns an error and leaves the stored configuration untouched.
//!
//! [`LicenseUpdatePipeline::current_license`] reports the stored license, or
//! the implicit trial license when none was ever stored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::core::ConfigType;
use crate::core::HttpMethod;
use crate::core::LICENSE_KEY;
use crate::core::License;
use crate::core::LicenseEvaluation;
use crate::core::LicenseSummary;
use crate::core::LicenseViolation;
use crate::core::ValidationErrorType;
use crate::core::ValidationResult;
use crate::core::join_violations;
use crate::interfaces::Clock;
use crate::interfaces::ClusterState;
use crate::interfaces::ConfigurationStore;
use crate::interfaces::LicenseDecoder;
use crate::interfaces::StoreError;
use crate::runtime::license_eval::LicenseEvaluator;
use crate::runtime::schemas::ConfigurationDocumentValidators;
use crate::runtime::schemas::LICENSE_ENVELOPE_KEY;
use crate::runtime::validator::SchemaValidator;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Accepted license update kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseUpdateOutcome {
    /// First license ever stored.
    Created,
    /// An existing license was replaced.
    Updated,
}

/// Report of an accepted license update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseUpdateReport {
    /// Update kind.
    pub outcome: LicenseUpdateOutcome,
    /// Stored license terms.
    pub license: License,
}

/// License update rejections and failures.
///
/// # Invariants
/// - Every variant except [`LicenseUpdateError::Store`] is raised before any write.
#[derive(Debug, Error)]
pub enum LicenseUpdateError {
    /// No envelope was submitted.
    #[error("Request body required for this action.")]
    RequestBodyRequired,
    /// The envelope carries an empty license.
    #[error("License must not be null.")]
    LicenseMustNotBeNull,
    /// The envelope failed schema validation.
    #[error("{}", .0.error_type.message())]
    Schema(ValidationResult),
    /// The license could not be decoded.
    #[error("License could not be decoded due to: {0}")]
    Decode(String),
    /// The license decoded but violates its terms.
    #[error("License invalid due to: {}", join_violations(.0))]
    Invalid(Vec<LicenseViolation>),
    /// The configuration store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// License reported by the license API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentLicense {
    /// Whether the implicit trial license is in effect.
    pub implicit_trial: bool,
    /// Flattened license view.
    pub summary: LicenseSummary,
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// License update orchestration.
#[derive(Clone)]
pub struct LicenseUpdatePipeline {
    /// Configuration store holding the `config` document.
    store: Arc<dyn ConfigurationStore>,
    /// License artifact decoder.
    decoder: Arc<dyn LicenseDecoder>,
    /// Cluster facts.
    cluster: Arc<dyn ClusterState>,
    /// Calendar source.
    clock: Arc<dyn Clock>,
    /// Schema catalog.
    validators: Arc<ConfigurationDocumentValidators>,
    /// Trial length in days.
    trial_days: u16,
}

impl LicenseUpdatePipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(
        store: Arc<dyn ConfigurationStore>,
        decoder: Arc<dyn LicenseDecoder>,
        cluster: Arc<dyn ClusterState>,
        clock: Arc<dyn Clock>,
        validators: Arc<ConfigurationDocumentValidators>,
        trial_days: u16,
    ) -> Self {
        Self {
            store,
            decoder,
            cluster,
            clock,
            validators,
            trial_days,
        }
    }

    /// Returns the shared schema catalog.
    #[must_use]
    pub const fn validators(&self) -> &Arc<ConfigurationDocumentValidators> {
        &self.validators
    }

    /// Applies a submitted license envelope.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseUpdateError`] when the envelope is rejected or the
    /// store fails. Rejections leave the stored configuration unchanged.
    pub fn apply(&self, raw: Option<&[u8]>) -> Result<LicenseUpdateReport, LicenseUpdateError> {
        let artifact = self.extract_artifact(raw)?;
        let license =
            self.decoder.decode(&artifact).map_err(|err| LicenseUpdateError::Decode(err.to_string()))?;
        let evaluation = self.evaluate(&license);
        if !evaluation.is_valid {
            return Err(LicenseUpdateError::Invalid(evaluation.violations));
        }

        let mut previous_present = false;
        self.store.atomic_update(ConfigType::Config, &mut |current| {
            previous_present = current.get(LICENSE_KEY).is_some_and(has_license_text);
            Ok(current.with_field(LICENSE_KEY, Value::String(artifact.clone())))
        })?;
        let outcome = if previous_present {
            LicenseUpdateOutcome::Updated
        } else {
            LicenseUpdateOutcome::Created
        };
        Ok(LicenseUpdateReport {
            outcome,
            license,
        })
    }

    /// Returns the license currently in effect.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the `config` document cannot be read.
    pub fn current_license(&self) -> Result<CurrentLicense, StoreError> {
        let config = self.store.read(ConfigType::Config)?;
        let stored = config.get(LICENSE_KEY).and_then(Value::as_str).filter(|text| !text.trim().is_empty());
        let Some(artifact) = stored else {
            let trial = License::trial(self.cluster.created_on(), self.trial_days);
            let evaluation = self.evaluate(&trial);
            return Ok(CurrentLicense {
                implicit_trial: true,
                summary: LicenseSummary::new(&trial, &evaluation),
            });
        };
        let decoded = self.decoder.decode(artifact);
        let evaluation = LicenseEvaluator::evaluate_decoded(
            &decoded,
            self.cluster.node_count(),
            self.clock.today(),
        );
        let summary = match &decoded {
            Ok(license) => LicenseSummary::new(license, &evaluation),
            Err(_) => LicenseSummary::undecodable(&evaluation),
        };
        Ok(CurrentLicense {
            implicit_trial: false,
            summary,
        })
    }

    /// Evaluates `license` against current cluster facts.
    fn evaluate(&self, license: &License) -> LicenseEvaluation {
        LicenseEvaluator::evaluate(license, self.cluster.node_count(), self.clock.today())
    }

    /// Validates the envelope and returns the license text.
    fn extract_artifact(&self, raw: Option<&[u8]>) -> Result<String, LicenseUpdateError> {
        let schema = self.validators.license_envelope();
        let result = SchemaValidator::validate(raw, HttpMethod::Put, schema);
        match result.error_type {
            ValidationErrorType::PayloadMandatory => {
                return Err(LicenseUpdateError::RequestBodyRequired);
            }
            ValidationErrorType::PayloadNotJson => return Err(LicenseUpdateError::Schema(result)),
            ValidationErrorType::None
            | ValidationErrorType::InvalidConfiguration
            | ValidationErrorType::WrongDatatype => {}
        }
        if !result.invalid_keys.is_empty() {
            return Err(LicenseUpdateError::Schema(result));
        }
        let fields = raw
            .and_then(SchemaValidator::parse_object)
            .ok_or(LicenseUpdateError::RequestBodyRequired)?;
        match fields.get(LICENSE_ENVELOPE_KEY) {
            None => Err(LicenseUpdateError::RequestBodyRequired),
            Some(Value::Null) => Err(LicenseUpdateError::LicenseMustNotBeNull),
            Some(Value::String(text)) if text.trim().is_empty() => {
                Err(LicenseUpdateError::LicenseMustNotBeNull)
            }
            Some(Value::String(text)) => Ok(text.clone()),
            Some(_) => Err(LicenseUpdateError::Schema(result)),
        }
    }
}

/// Returns true when a stored value holds license text.
fn has_license_text(value: &Value) -> bool {
    value.as_str().is_some_and(|text| !text.trim().is_empty())
}
