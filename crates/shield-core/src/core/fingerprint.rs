// crates/shield-core/src/core/fingerprint.rs
// ============================================================================
// Module: Fingerprints
// Description: SHA-256 fingerprints for secrets and opaque artifacts.
// Purpose: Let audit records reference license artifacts without their contents.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! Fingerprints are lowercase hex SHA-256 digests. They identify an artifact in
//! audit logs without disclosing it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Returns the lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_encode(&hasher.finalize())
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
