// crates/shield-core/src/runtime/license_codec.rs
// ============================================================================
// Module: License Codec
// Description: Ed25519-signed license artifacts: issuing, decoding, and key parsing.
// Purpose: Turn opaque license strings into verified license terms.
// Dependencies: base64, ed25519-dalek, serde, serde_json
// ============================================================================

//! ## Overview
//! A license artifact is `base64(payload) "." base64(signature)`, where the
//! signature is Ed25519 over the exact payload bytes and the payload is a JSON
//! object of license terms. [`Ed25519LicenseDecoder`] verifies before it
//! parses; nothing in an unverified payload is trusted.
//!
//! Security posture: artifacts arrive from API callers and are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ed25519_dalek::Signature;
use ed25519_dalek::Signer;
use ed25519_dalek::SigningKey;
use ed25519_dalek::VerifyingKey;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::License;
use crate::core::LicenseType;
use crate::core::NodeLimit;
use crate::core::format_date;
use crate::core::parse_date;
use crate::interfaces::LicenseDecodeError;
use crate::interfaces::LicenseDecoder;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between payload and signature.
const PART_SEPARATOR: char = '.';

/// Maximum accepted artifact length in bytes.
pub const MAX_LICENSE_BYTES: usize = 64 * 1024;

/// Ed25519 key length in bytes.
const KEY_BYTES: usize = 32;

// ============================================================================
// SECTION: Payload
// ============================================================================

/// Signed license payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicensePayload {
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
    /// Node allowance.
    pub allowed_node_count_per_cluster: NodeLimit,
}

impl LicensePayload {
    /// Builds a payload from license terms.
    #[must_use]
    pub fn from_license(license: &License) -> Self {
        Self {
            uid: license.uid.clone(),
            license_type: license.license_type.as_str().to_string(),
            issued_to: license.issued_to.clone(),
            issuer: license.issuer.clone(),
            start_date: format_date(license.start_date),
            expiry_date: format_date(license.expiry_date),
            allowed_node_count_per_cluster: license.allowed_node_count,
        }
    }

    /// Converts the payload into license terms carrying `raw`.
    fn into_license(self, raw: &str) -> Result<License, LicenseDecodeError> {
        let license_type = LicenseType::parse(&self.license_type).ok_or_else(|| {
            LicenseDecodeError::Malformed(format!("unknown license type {}", self.license_type))
        })?;
        let start_date = parse_date(&self.start_date).map_err(LicenseDecodeError::Malformed)?;
        let expiry_date = parse_date(&self.expiry_date).map_err(LicenseDecodeError::Malformed)?;
        if expiry_date < start_date {
            return Err(LicenseDecodeError::InvertedWindow {
                start: self.start_date,
                expiry: self.expiry_date,
            });
        }
        Ok(License {
            uid: self.uid,
            license_type,
            issued_to: self.issued_to,
            issuer: self.issuer,
            start_date,
            expiry_date,
            allowed_node_count: self.allowed_node_count_per_cluster,
            raw: raw.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Decoder
// ============================================================================

/// License decoder verifying Ed25519 signatures.
#[derive(Debug, Clone)]
pub struct Ed25519LicenseDecoder {
    /// Issuer public key.
    key: VerifyingKey,
}

impl Ed25519LicenseDecoder {
    /// Creates a decoder trusting `key`.
    #[must_use]
    pub const fn new(key: VerifyingKey) -> Self {
        Self {
            key,
        }
    }
}

impl LicenseDecoder for Ed25519LicenseDecoder {
    fn decode(&self, artifact: &str) -> Result<License, LicenseDecodeError> {
        let artifact = artifact.trim();
        if artifact.len() > MAX_LICENSE_BYTES {
            return Err(LicenseDecodeError::Malformed(format!(
                "license exceeds {MAX_LICENSE_BYTES} bytes"
            )));
        }
        let (payload_b64, signature_b64) =
            artifact.split_once(PART_SEPARATOR).ok_or(LicenseDecodeError::MissingSignature)?;
        let payload = BASE64
            .decode(payload_b64)
            .map_err(|_| LicenseDecodeError::Base64("payload".to_string()))?;
        let signature_bytes = BASE64
            .decode(signature_b64)
            .map_err(|_| LicenseDecodeError::Base64("signature".to_string()))?;
        let signature = Signature::try_from(signature_bytes.as_slice())
            .map_err(|_| LicenseDecodeError::SignatureLength(signature_bytes.len()))?;
        self.key
            .verify_strict(&payload, &signature)
            .map_err(|_| LicenseDecodeError::SignatureMismatch)?;
        let parsed: LicensePayload = serde_json::from_slice(&payload)
            .map_err(|err| LicenseDecodeError::Malformed(err.to_string()))?;
        parsed.into_license(artifact)
    }
}

// ============================================================================
// SECTION: Signer
// ============================================================================

/// License signing errors.
#[derive(Debug, Error)]
pub enum LicenseSignError {
    /// Payload serialization failed.
    #[error("license payload serialization failed: {0}")]
    Serialize(String),
}

/// Issues signed license artifacts.
#[derive(Debug, Clone)]
pub struct LicenseSigner {
    /// Issuer private key.
    key: SigningKey,
}

impl LicenseSigner {
    /// Creates a signer using `key`.
    #[must_use]
    pub const fn new(key: SigningKey) -> Self {
        Self {
            key,
        }
    }

    /// Returns the matching public key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Signs `payload` into an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseSignError`] when the payload cannot be serialized.
    pub fn sign(&self, payload: &LicensePayload) -> Result<String, LicenseSignError> {
        let bytes = serde_json::to_vec(payload)
            .map_err(|err| LicenseSignError::Serialize(err.to_string()))?;
        let signature = self.key.sign(&bytes);
        Ok(format!(
            "{}{PART_SEPARATOR}{}",
            BASE64.encode(&bytes),
            BASE64.encode(signature.to_bytes())
        ))
    }
}

// ============================================================================
// SECTION: Key Parsing
// ============================================================================

/// Key parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key material is not 32 raw bytes or base64 of 32 bytes.
    #[error("invalid ed25519 key encoding")]
    Encoding,
    /// Key bytes are not a valid public key.
    #[error("invalid ed25519 public key")]
    InvalidPublicKey,
}

/// Parses an Ed25519 public key from raw bytes or base64 text.
///
/// # Errors
///
/// Returns [`KeyError`] when the material is not a valid key.
pub fn parse_verifying_key(material: &[u8]) -> Result<VerifyingKey, KeyError> {
    let bytes = key_bytes(material)?;
    VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}

/// Parses an Ed25519 private key seed from raw bytes or base64 text.
///
/// # Errors
///
/// Returns [`KeyError`] when the material is not 32 bytes.
pub fn parse_signing_key(material: &[u8]) -> Result<SigningKey, KeyError> {
    key_bytes(material).map(|bytes| SigningKey::from_bytes(&bytes))
}

/// Encodes key bytes as base64 text.
#[must_use]
pub fn encode_key(bytes: &[u8; KEY_BYTES]) -> String {
    BASE64.encode(bytes)
}

/// Extracts 32 key bytes from raw or base64 material.
fn key_bytes(material: &[u8]) -> Result<[u8; KEY_BYTES], KeyError> {
    if material.len() == KEY_BYTES {
        return material.try_into().map_err(|_| KeyError::Encoding);
    }
    let text = std::str::from_utf8(material).map_err(|_| KeyError::Encoding)?;
    let decoded = BASE64.decode(text.trim().as_bytes()).map_err(|_| KeyError::Encoding)?;
    decoded.as_slice().try_into().map_err(|_| KeyError::Encoding)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use ed25519_dalek::SigningKey;

    use super::Ed25519LicenseDecoder;
    use super::LicensePayload;
    use super::LicenseSigner;
    use super::parse_verifying_key;
    use crate::core::NodeLimit;
    use crate::interfaces::LicenseDecodeError;
    use crate::interfaces::LicenseDecoder;

    fn payload() -> LicensePayload {
        LicensePayload {
            uid: "lic-1".to_string(),
            license_type: "FULL".to_string(),
            issued_to: "Acme".to_string(),
            issuer: "shield".to_string(),
            start_date: "2026-01-01".to_string(),
            expiry_date: "2027-01-01".to_string(),
            allowed_node_count_per_cluster: NodeLimit::Limited(5),
        }
    }

    fn signer() -> LicenseSigner {
        LicenseSigner::new(SigningKey::from_bytes(&[7u8; 32]))
    }

    #[test]
    fn signed_license_decodes() {
        let signer = signer();
        let artifact = signer.sign(&payload()).unwrap();
        let license = Ed25519LicenseDecoder::new(signer.verifying_key()).decode(&artifact).unwrap();
        assert_eq!(license.uid, "lic-1");
        assert_eq!(license.allowed_node_count, NodeLimit::Limited(5));
        assert_eq!(license.raw, artifact);
    }

    #[test]
    fn plain_text_has_no_signature() {
        let decoder = Ed25519LicenseDecoder::new(signer().verifying_key());
        assert_eq!(decoder.decode("lalala"), Err(LicenseDecodeError::MissingSignature));
    }

    #[test]
    fn foreign_key_fails_verification() {
        let artifact = signer().sign(&payload()).unwrap();
        let other = SigningKey::from_bytes(&[9u8; 32]).verifying_key();
        assert_eq!(
            Ed25519LicenseDecoder::new(other).decode(&artifact),
            Err(LicenseDecodeError::SignatureMismatch)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let signer = signer();
        let mut terms = payload();
        terms.expiry_date = "2025-01-01".to_string();
        let artifact = signer.sign(&terms).unwrap();
        let result = Ed25519LicenseDecoder::new(signer.verifying_key()).decode(&artifact);
        assert!(matches!(result, Err(LicenseDecodeError::InvertedWindow { .. })));
    }

    #[test]
    fn unlimited_allowance_round_trips_as_label() {
        let signer = signer();
        let mut terms = payload();
        terms.allowed_node_count_per_cluster = NodeLimit::Unlimited;
        let artifact = signer.sign(&terms).unwrap();
        let (encoded, _) = artifact.split_once('.').unwrap();
        let json = String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap();
        assert!(json.contains("\"allowed_node_count_per_cluster\":\"unlimited\""));
    }

    #[test]
    fn verifying_key_accepts_base64_text() {
        let key = signer().verifying_key();
        let text = BASE64.encode(key.to_bytes());
        assert_eq!(parse_verifying_key(text.as_bytes()).unwrap(), key);
    }
}
