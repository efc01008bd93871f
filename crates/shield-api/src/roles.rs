// crates/shield-api/src/roles.rs
// ============================================================================
// Module: Role Mapping Resolution
// Description: Resolves a principal's security roles from stored role mappings.
// Purpose: Implement role resolution over the `rolesmapping` document.
// Dependencies: shield-core, serde_json
// ============================================================================

//! ## Overview
//! A role is granted when the principal's name is listed in `users`, one of
//! its backend roles is listed in `backendroles`, or its remote host matches
//! one of `hosts`. Entries may use `*` as a wildcard. Malformed mapping
//! entries grant nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use shield_core::ConfigType;
use shield_core::ConfigurationStore;
use shield_core::Principal;
use shield_core::RoleResolutionError;
use shield_core::RoleResolver;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Role resolver backed by the stored `rolesmapping` document.
#[derive(Clone)]
pub struct RolesMappingResolver {
    /// Configuration store.
    store: Arc<dyn ConfigurationStore>,
}

impl RolesMappingResolver {
    /// Creates a resolver reading from `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ConfigurationStore>) -> Self {
        Self {
            store,
        }
    }
}

impl RoleResolver for RolesMappingResolver {
    fn resolve_roles(&self, principal: &Principal) -> Result<BTreeSet<String>, RoleResolutionError> {
        let mappings = self.store.read(ConfigType::Rolesmapping)?;
        let roles = mappings
            .fields()
            .iter()
            .filter(|(_, mapping)| mapping_matches(mapping, principal))
            .map(|(role, _)| role.clone())
            .collect();
        Ok(roles)
    }
}

/// Returns true when any channel of `mapping` matches `principal`.
fn mapping_matches(mapping: &Value, principal: &Principal) -> bool {
    let users = patterns(mapping, "users");
    if users.iter().any(|pattern| wildcard_match(pattern, &principal.name)) {
        return true;
    }
    let backend_roles = patterns(mapping, "backendroles");
    if principal
        .backend_roles
        .iter()
        .any(|role| backend_roles.iter().any(|pattern| wildcard_match(pattern, role)))
    {
        return true;
    }
    principal.remote_host.as_deref().is_some_and(|host| {
        patterns(mapping, "hosts").iter().any(|pattern| wildcard_match(pattern, host))
    })
}

/// Returns the string entries of `key`, ignoring non-string items.
fn patterns<'a>(mapping: &'a Value, key: &str) -> Vec<&'a str> {
    mapping
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Matches `text` against `pattern`, where `*` matches any run of characters.
#[must_use]
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let mut segments = pattern.split('*');
    let Some(first) = segments.next() else {
        return text.is_empty();
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let remaining: Vec<&str> = segments.collect();
    let Some((last, middle)) = remaining.split_last() else {
        return rest.is_empty();
    };
    for segment in middle {
        match rest.find(segment) {
            Some(index) => rest = &rest[index + segment.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use std::sync::Arc;

    use serde_json::json;
    use shield_core::ConfigType;
    use shield_core::ConfigurationDocument;
    use shield_core::ConfigurationSeed;
    use shield_core::InMemoryConfigurationStore;
    use shield_core::Principal;
    use shield_core::RoleResolutionError;
    use shield_core::RoleResolver;
    use shield_core::StoreError;

    use super::RolesMappingResolver;
    use super::wildcard_match;

    fn resolver() -> RolesMappingResolver {
        let mappings = ConfigurationDocument::new()
            .with_field("sg_all_access", json!({"users": ["admin", "ki*"]}))
            .with_field("sg_readall", json!({"backendroles": ["captains"]}))
            .with_field("sg_office", json!({"hosts": ["*.starfleet.org"]}))
            .with_field("sg_broken", json!({"users": "kirk"}));
        let mut seed = ConfigurationSeed::new();
        seed.insert(ConfigType::Rolesmapping, mappings);
        RolesMappingResolver::new(Arc::new(InMemoryConfigurationStore::with_seed(seed)))
    }

    #[test]
    fn wildcards_match_prefix_suffix_and_infix() {
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("ki*", "kirk"));
        assert!(wildcard_match("*.starfleet.org", "bridge.starfleet.org"));
        assert!(wildcard_match("a*c*e", "abcde"));
        assert!(!wildcard_match("a*c*e", "abcd"));
        assert!(wildcard_match("exact", "exact"));
        assert!(!wildcard_match("exact", "exactly"));
    }

    #[test]
    fn roles_are_resolved_through_every_channel() {
        let principal = Principal::named("kirk")
            .with_backend_roles(["captains"])
            .with_remote_host("bridge.starfleet.org");
        let roles = resolver().resolve_roles(&principal).unwrap();
        let expected: Vec<&str> = vec!["sg_all_access", "sg_office", "sg_readall"];
        assert_eq!(roles.iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn unmatched_principal_has_no_roles() {
        let roles = resolver().resolve_roles(&Principal::named("worf")).unwrap();
        assert!(roles.is_empty());
    }

    #[test]
    fn unprovisioned_store_propagates_not_initialized() {
        let resolver = RolesMappingResolver::new(Arc::new(InMemoryConfigurationStore::new()));
        let err = resolver.resolve_roles(&Principal::named("kirk")).unwrap_err();
        assert!(matches!(err, RoleResolutionError::Store(StoreError::NotInitialized)));
    }
}
