// crates/shield-core/src/core/license.rs
// ============================================================================
// Module: License Model
// Description: Decoded license terms, violations, and evaluation summaries.
// Purpose: Provide typed license data for the evaluator and the license API.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! A [`License`] is produced by decoding a signed artifact. It is evaluated
//! against cluster facts to produce a [`LicenseEvaluation`]; only licenses
//! that evaluate valid are persisted. When no license is stored the cluster
//! runs under an implicit TRIAL license.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Calendar date format used in license payloads and responses.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Label used for an unlimited node allowance.
pub const UNLIMITED_LABEL: &str = "unlimited";

/// Separator used when joining violation descriptions.
pub const VIOLATION_SEPARATOR: &str = ", ";

// ============================================================================
// SECTION: License Terms
// ============================================================================

/// Commercial license type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LicenseType {
    /// Time-limited evaluation license (implicit default).
    Trial,
    /// Full commercial license.
    Full,
    /// Small and medium enterprise license.
    Sme,
    /// OEM redistribution license.
    Oem,
    /// Academic license.
    Academic,
}

impl LicenseType {
    /// Returns the stable upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "TRIAL",
            Self::Full => "FULL",
            Self::Sme => "SME",
            Self::Oem => "OEM",
            Self::Academic => "ACADEMIC",
        }
    }

    /// Parses a license type name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        [Self::Trial, Self::Full, Self::Sme, Self::Oem, Self::Academic]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node allowance per cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NodeLimitRepr", into = "NodeLimitRepr")]
pub enum NodeLimit {
    /// No ceiling.
    Unlimited,
    /// At most this many nodes.
    Limited(u32),
}

impl NodeLimit {
    /// Returns true when `node_count` exceeds the allowance.
    #[must_use]
    pub const fn is_exceeded_by(self, node_count: u32) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Limited(allowed) => node_count > allowed,
        }
    }
}

impl fmt::Display for NodeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => f.write_str(UNLIMITED_LABEL),
            Self::Limited(count) => write!(f, "{count}"),
        }
    }
}

/// Wire representation of [`NodeLimit`]: a number or `"unlimited"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum NodeLimitRepr {
    /// Finite allowance.
    Count(u32),
    /// Textual allowance (`"unlimited"` or a decimal count).
    Label(String),
}

impl TryFrom<NodeLimitRepr> for NodeLimit {
    type Error = String;

    fn try_from(value: NodeLimitRepr) -> Result<Self, Self::Error> {
        match value {
            NodeLimitRepr::Count(count) => Ok(Self::Limited(count)),
            NodeLimitRepr::Label(label) => {
                let trimmed = label.trim();
                if trimmed.eq_ignore_ascii_case(UNLIMITED_LABEL) {
                    return Ok(Self::Unlimited);
                }
                trimmed
                    .parse::<u32>()
                    .map(Self::Limited)
                    .map_err(|_| format!("invalid node allowance: {trimmed}"))
            }
        }
    }
}

impl From<NodeLimit> for NodeLimitRepr {
    fn from(value: NodeLimit) -> Self {
        match value {
            NodeLimit::Unlimited => Self::Label(UNLIMITED_LABEL.to_string()),
            NodeLimit::Limited(count) => Self::Count(count),
        }
    }
}

/// Decoded license terms.
///
/// # Invariants
/// - `start_date <= expiry_date`; both bounds are inclusive.
/// - `raw` is the exact artifact text that was decoded (empty for the implicit trial).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    /// License identifier.
    pub uid: String,
    /// License type.
    pub license_type: LicenseType,
    /// Licensee.
    pub issued_to: String,
    /// Issuer.
    pub issuer: String,
    /// First day of validity.
    pub start_date: Date,
    /// Last day of validity.
    pub expiry_date: Date,
    /// Node allowance per cluster.
    pub allowed_node_count: NodeLimit,
    /// Raw signed artifact.
    pub raw: String,
}

impl License {
    /// Builds the implicit trial license for a cluster created on `created_on`.
    #[must_use]
    pub fn trial(created_on: Date, trial_days: u16) -> Self {
        let expiry_date = created_on
            .checked_add(time::Duration::days(i64::from(trial_days)))
            .unwrap_or(Date::MAX);
        Self {
            uid: "trial".to_string(),
            license_type: LicenseType::Trial,
            issued_to: "The world".to_string(),
            issuer: "shield".to_string(),
            start_date: created_on,
            expiry_date,
            allowed_node_count: NodeLimit::Unlimited,
            raw: String::new(),
        }
    }

    /// Returns true when `today` is past the expiry date.
    #[must_use]
    pub fn is_expired_on(&self, today: Date) -> bool {
        today > self.expiry_date
    }
}

// ============================================================================
// SECTION: Violations
// ============================================================================

/// One violated license constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LicenseViolation {
    /// Artifact could not be decoded or verified.
    DecodeFailed {
        /// Decoder diagnostic.
        cause: String,
    },
    /// License validity window has ended.
    Expired,
    /// Cluster runs more nodes than the license allows.
    NodeCountExceeded {
        /// Allowed node count.
        allowed: u32,
        /// Actual node count.
        actual: u32,
    },
}

impl LicenseViolation {
    /// Returns the ordering rank used when reporting violations.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::DecodeFailed {
                ..
            } => 0,
            Self::Expired => 1,
            Self::NodeCountExceeded {
                ..
            } => 2,
        }
    }
}

impl fmt::Display for LicenseViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecodeFailed {
                cause,
            } => write!(f, "License could not be decoded due to: {cause}"),
            Self::Expired => f.write_str("License is expired"),
            Self::NodeCountExceeded {
                allowed,
                actual,
            } => write!(f, "Only {allowed} node(s) allowed but you run {actual} node(s)"),
        }
    }
}

/// Joins violation descriptions into one diagnostic.
#[must_use]
pub fn join_violations(violations: &[LicenseViolation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join(VIOLATION_SEPARATOR)
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Result of evaluating a license against cluster facts.
///
/// # Invariants
/// - `is_valid` iff `violations` is empty.
/// - Violations are ordered by [`LicenseViolation::rank`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseEvaluation {
    /// Whether the license is valid.
    pub is_valid: bool,
    /// Whether the license is past its expiry date.
    pub is_expired: bool,
    /// Violated constraints.
    pub violations: Vec<LicenseViolation>,
}

impl LicenseEvaluation {
    /// Returns the joined violation message.
    #[must_use]
    pub fn message(&self) -> String {
        join_violations(&self.violations)
    }
}

/// Flattened view of the current license returned by the license API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseSummary {
    /// License identifier.
    pub uid: String,
    /// License type name.
    #[serde(rename = "type")]
    pub license_type: String,
    /// Licensee.
    pub issued_to: String,
    /// Issuer.
    pub issuer: String,
    /// Start date (`yyyy-MM-dd`).
    pub start_date: String,
    /// Expiry date (`yyyy-MM-dd`).
    pub expiry_date: String,
    /// Node allowance (`"unlimited"` or a count).
    pub allowed_node_count_per_cluster: String,
    /// Whether the license is valid.
    pub is_valid: bool,
    /// Whether the license is expired.
    pub is_expired: bool,
    /// Violation descriptions.
    pub msgs: Vec<String>,
}

impl LicenseSummary {
    /// Builds a summary from a license and its evaluation.
    #[must_use]
    pub fn new(license: &License, evaluation: &LicenseEvaluation) -> Self {
        Self {
            uid: license.uid.clone(),
            license_type: license.license_type.as_str().to_string(),
            issued_to: license.issued_to.clone(),
            issuer: license.issuer.clone(),
            start_date: format_date(license.start_date),
            expiry_date: format_date(license.expiry_date),
            allowed_node_count_per_cluster: license.allowed_node_count.to_string(),
            is_valid: evaluation.is_valid,
            is_expired: evaluation.is_expired,
            msgs: evaluation.violations.iter().map(ToString::to_string).collect(),
        }
    }

    /// Builds a summary for a stored artifact that no longer decodes.
    #[must_use]
    pub fn undecodable(evaluation: &LicenseEvaluation) -> Self {
        Self {
            uid: String::new(),
            license_type: String::new(),
            issued_to: String::new(),
            issuer: String::new(),
            start_date: String::new(),
            expiry_date: String::new(),
            allowed_node_count_per_cluster: String::new(),
            is_valid: false,
            is_expired: evaluation.is_expired,
            msgs: evaluation.violations.iter().map(ToString::to_string).collect(),
        }
    }
}

// ============================================================================
// SECTION: Date Helpers
// ============================================================================

/// Formats a date as `yyyy-MM-dd`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Parses a `yyyy-MM-dd` date.
///
/// # Errors
///
/// Returns a diagnostic string when the input is not a calendar date.
pub fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value.trim(), DATE_FORMAT).map_err(|err| format!("invalid date '{value}': {err}"))
}
