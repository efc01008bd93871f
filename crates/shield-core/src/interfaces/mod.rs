// crates/shield-core/src/interfaces/mod.rs
// ============================================================================
// Module: Shield Interfaces
// Description: Backend-agnostic interfaces for storage, identity, and licensing.
// Purpose: Define the collaborator surfaces consumed by the Shield engines.
// Dependencies: crate::core, thiserror, time
// ============================================================================

//! ## Overview
//! Interfaces define how Shield integrates with storage backends, identity
//! providers, and license issuers without embedding backend-specific details.
//! Implementations must fail closed: an unprovisioned store reports
//! [`StoreError::NotInitialized`] for every read and write.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;
use time::Date;

use crate::core::ConfigType;
use crate::core::ConfigurationDocument;
use crate::core::ConfigurationSeed;
use crate::core::License;
use crate::core::Principal;

// ============================================================================
// SECTION: Configuration Store
// ============================================================================

/// Fixed diagnostic reported for every access to an unprovisioned store.
pub const NOT_INITIALIZED_MESSAGE: &str = "Search Guard index not initialized (SG11)";

/// Configuration store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - [`StoreError::NotInitialized`] always renders [`NOT_INITIALIZED_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store has never been provisioned.
    #[error("Search Guard index not initialized (SG11)")]
    NotInitialized,
    /// Provisioning was attempted on a store that already holds configuration.
    #[error("configuration store already initialized")]
    AlreadyInitialized,
    /// The update mutator rejected the current document; nothing was written.
    #[error("configuration update aborted: {0}")]
    Aborted(String),
    /// Store I/O error.
    #[error("configuration store io error: {0}")]
    Io(String),
    /// Stored data failed integrity checks.
    #[error("configuration store corruption: {0}")]
    Corrupt(String),
    /// Store reported an error.
    #[error("configuration store error: {0}")]
    Store(String),
}

/// Mutator applied inside an atomic update.
///
/// Receives the current document and returns its replacement. Returning an
/// error aborts the update without writing.
pub type DocumentMutator<'a> =
    dyn FnMut(&ConfigurationDocument) -> Result<ConfigurationDocument, StoreError> + 'a;

/// Persisted security configuration, one document per [`ConfigType`].
///
/// # Invariants
/// - Readers never observe a partially applied update.
/// - Concurrent updates of the same document are linearized.
pub trait ConfigurationStore: Send + Sync {
    /// Reads the current document for `config_type`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] when the store was never provisioned.
    fn read(&self, config_type: ConfigType) -> Result<ConfigurationDocument, StoreError>;

    /// Atomically replaces the document for `config_type` with `mutator`'s output.
    ///
    /// Returns the document that was written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] when the store was never
    /// provisioned, or the mutator's error when it aborts the update.
    fn atomic_update(
        &self,
        config_type: ConfigType,
        mutator: &mut DocumentMutator<'_>,
    ) -> Result<ConfigurationDocument, StoreError>;

    /// Provisions the store. Types absent from `seed` start empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyInitialized`] when the store was provisioned before.
    fn initialize(&self, seed: ConfigurationSeed) -> Result<(), StoreError>;

    /// Returns true once the store was provisioned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be queried.
    fn is_initialized(&self) -> Result<bool, StoreError>;
}

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Role resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleResolutionError {
    /// Role mappings could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Role mappings are malformed.
    #[error("invalid role mapping: {0}")]
    Invalid(String),
}

/// Resolves the internal roles held by a principal.
///
/// The output is treated as authoritative by the privileges evaluator.
pub trait RoleResolver: Send + Sync {
    /// Resolves roles for `principal`.
    ///
    /// # Errors
    ///
    /// Returns [`RoleResolutionError`] when role mappings are unavailable.
    fn resolve_roles(&self, principal: &Principal) -> Result<BTreeSet<String>, RoleResolutionError>;
}

/// Recognizes administrative identities by distinguished name.
pub trait AdminIdentity: Send + Sync {
    /// Returns true when `distinguished_name` is administrative.
    fn is_admin(&self, distinguished_name: &str) -> bool;
}

// ============================================================================
// SECTION: Licensing
// ============================================================================

/// License decoding errors.
///
/// # Invariants
/// - Display texts are the cause reported after
///   `"License could not be decoded due to: "`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LicenseDecodeError {
    /// The artifact has no signature part.
    #[error("cannot find license signature")]
    MissingSignature,
    /// A part is not valid base64.
    #[error("invalid base64 in license {0}")]
    Base64(String),
    /// The signature has the wrong length.
    #[error("invalid license signature length: {0}")]
    SignatureLength(usize),
    /// The signature does not verify against the payload.
    #[error("license signature verification failed")]
    SignatureMismatch,
    /// The payload is not a well-formed license.
    #[error("malformed license payload: {0}")]
    Malformed(String),
    /// The validity window is inverted.
    #[error("license expiry date {expiry} is before start date {start}")]
    InvertedWindow {
        /// Start date text.
        start: String,
        /// Expiry date text.
        expiry: String,
    },
}

/// Decodes and verifies signed license artifacts.
pub trait LicenseDecoder: Send + Sync {
    /// Decodes `artifact` into license terms.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseDecodeError`] when the artifact is unreadable or unverifiable.
    fn decode(&self, artifact: &str) -> Result<License, LicenseDecodeError>;
}

// ============================================================================
// SECTION: Cluster Facts
// ============================================================================

/// Cluster facts consulted during license evaluation.
pub trait ClusterState: Send + Sync {
    /// Returns the current node count.
    fn node_count(&self) -> u32;

    /// Returns the day the cluster was created.
    fn created_on(&self) -> Date;
}

/// Calendar source.
pub trait Clock: Send + Sync {
    /// Returns today's date (UTC).
    fn today(&self) -> Date;
}
