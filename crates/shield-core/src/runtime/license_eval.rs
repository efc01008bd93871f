// crates/shield-core/src/runtime/license_eval.rs
// ============================================================================
// Module: License Evaluator
// Description: Pure evaluation of decoded license terms against cluster facts.
// Purpose: Compute license validity and collect every violated constraint.
// Dependencies: crate::core, crate::interfaces, time
// ============================================================================

//! ## Overview
//! [`LicenseEvaluator`] checks a decoded license against the node count and
//! the current date. Decode failures short-circuit with a single violation;
//! otherwise every applicable violation is collected in one pass. A license
//! whose start date lies in the future is valid.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Date;

use crate::core::License;
use crate::core::LicenseEvaluation;
use crate::core::LicenseViolation;
use crate::core::NodeLimit;
use crate::interfaces::LicenseDecodeError;

// ============================================================================
// SECTION: License Evaluator
// ============================================================================

/// Stateless license evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseEvaluator;

impl LicenseEvaluator {
    /// Evaluates `license` for a cluster of `node_count` nodes on `today`.
    #[must_use]
    pub fn evaluate(license: &License, node_count: u32, today: Date) -> LicenseEvaluation {
        let mut violations = Vec::new();
        let is_expired = license.is_expired_on(today);
        if is_expired {
            violations.push(LicenseViolation::Expired);
        }
        if let NodeLimit::Limited(allowed) = license.allowed_node_count
            && license.allowed_node_count.is_exceeded_by(node_count)
        {
            violations.push(LicenseViolation::NodeCountExceeded {
                allowed,
                actual: node_count,
            });
        }
        violations.sort_by_key(LicenseViolation::rank);
        LicenseEvaluation {
            is_valid: violations.is_empty(),
            is_expired,
            violations,
        }
    }

    /// Evaluates a decode outcome; a decode failure yields a single violation.
    #[must_use]
    pub fn evaluate_decoded(
        decoded: &Result<License, LicenseDecodeError>,
        node_count: u32,
        today: Date,
    ) -> LicenseEvaluation {
        match decoded {
            Ok(license) => Self::evaluate(license, node_count, today),
            Err(err) => LicenseEvaluation {
                is_valid: false,
                is_expired: false,
                violations: vec![LicenseViolation::DecodeFailed {
                    cause: err.to_string(),
                }],
            },
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::LicenseEvaluator;
    use crate::core::License;
    use crate::core::LicenseType;
    use crate::core::LicenseViolation;
    use crate::core::NodeLimit;
    use crate::interfaces::LicenseDecodeError;

    fn license(start: time::Date, expiry: time::Date, nodes: NodeLimit) -> License {
        License {
            uid: "uid-1".to_string(),
            license_type: LicenseType::Full,
            issued_to: "Acme".to_string(),
            issuer: "shield".to_string(),
            start_date: start,
            expiry_date: expiry,
            allowed_node_count: nodes,
            raw: String::new(),
        }
    }

    #[test]
    fn expiry_day_is_inclusive() {
        let terms = license(date!(2026 - 01 - 01), date!(2026 - 06 - 30), NodeLimit::Unlimited);
        assert!(LicenseEvaluator::evaluate(&terms, 5, date!(2026 - 06 - 30)).is_valid);
        assert!(!LicenseEvaluator::evaluate(&terms, 5, date!(2026 - 07 - 01)).is_valid);
    }

    #[test]
    fn expired_and_over_limit_reports_both_in_order() {
        let terms = license(date!(2020 - 01 - 01), date!(2021 - 01 - 01), NodeLimit::Limited(1));
        let evaluation = LicenseEvaluator::evaluate(&terms, 3, date!(2026 - 10 - 18));
        assert!(!evaluation.is_valid);
        assert!(evaluation.is_expired);
        assert_eq!(
            evaluation.message(),
            "License is expired, Only 1 node(s) allowed but you run 3 node(s)"
        );
    }

    #[test]
    fn node_count_at_limit_is_valid() {
        let terms = license(date!(2026 - 01 - 01), date!(2027 - 01 - 01), NodeLimit::Limited(3));
        assert!(LicenseEvaluator::evaluate(&terms, 3, date!(2026 - 10 - 18)).is_valid);
    }

    #[test]
    fn decode_failure_short_circuits() {
        let evaluation = LicenseEvaluator::evaluate_decoded(
            &Err(LicenseDecodeError::MissingSignature),
            100,
            date!(2026 - 10 - 18),
        );
        assert_eq!(
            evaluation.violations,
            vec![LicenseViolation::DecodeFailed {
                cause: "cannot find license signature".to_string(),
            }]
        );
    }
}
