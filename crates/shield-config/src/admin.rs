// crates/shield-config/src/admin.rs
// ============================================================================
// Module: Admin DN Allowlist
// Description: Administrative identity check over certificate DNs.
// Purpose: Decide whether a caller bypasses role-based API permissions.
// Dependencies: shield-core
// ============================================================================

//! ## Overview
//! Distinguished names are compared after normalization: RDNs are split on
//! unescaped commas, attribute types are lower-cased, and whitespace around
//! types and values is trimmed. Values keep their case.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use shield_core::AdminIdentity;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum distinguished name length.
pub const MAX_DN_LENGTH: usize = 512;

// ============================================================================
// SECTION: Allowlist
// ============================================================================

/// Set of normalized administrative distinguished names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminDnAllowlist {
    /// Normalized DNs.
    names: BTreeSet<String>,
}

impl AdminDnAllowlist {
    /// Builds an allowlist from configured DNs.
    #[must_use]
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            names: names.iter().map(|name| normalize_dn(name.as_ref())).collect(),
        }
    }

    /// Returns the number of allowlisted DNs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true when no DN is allowlisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl AdminIdentity for AdminDnAllowlist {
    fn is_admin(&self, distinguished_name: &str) -> bool {
        if distinguished_name.len() > MAX_DN_LENGTH {
            return false;
        }
        self.names.contains(&normalize_dn(distinguished_name))
    }
}

/// Normalizes a distinguished name for comparison.
#[must_use]
pub fn normalize_dn(dn: &str) -> String {
    split_rdns(dn)
        .iter()
        .filter(|rdn| !rdn.trim().is_empty())
        .map(|rdn| match rdn.split_once('=') {
            Some((attribute, value)) => {
                format!("{}={}", attribute.trim().to_ascii_lowercase(), value.trim())
            }
            None => rdn.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a DN on commas not preceded by a backslash.
fn split_rdns(dn: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in dn.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
        } else if ch == '\\' {
            current.push(ch);
            escaped = true;
        } else if ch == ',' {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    parts.push(current);
    parts
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use shield_core::AdminIdentity;

    use super::AdminDnAllowlist;
    use super::normalize_dn;

    #[test]
    fn normalization_ignores_spacing_and_attribute_case() {
        assert_eq!(normalize_dn(" CN=kirk , OU=client ,O=client"), "cn=kirk,ou=client,o=client");
    }

    #[test]
    fn escaped_commas_stay_inside_value() {
        assert_eq!(normalize_dn(r"CN=Doe\, John,O=acme"), r"cn=Doe\, John,o=acme");
    }

    #[test]
    fn allowlist_matches_normalized_names() {
        let allowlist = AdminDnAllowlist::new(&["CN=kirk,OU=client,O=client,L=test,C=de"]);
        assert!(allowlist.is_admin("cn=kirk, ou=client, o=client, l=test, c=de"));
        assert!(!allowlist.is_admin("cn=spock,ou=client,o=client,l=test,c=de"));
        assert!(!allowlist.is_admin("CN=KIRK,OU=client,O=client,L=test,C=de"));
    }
}
