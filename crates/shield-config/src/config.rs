// crates/shield-config/src/config.rs
// ============================================================================
// Module: Shield Configuration
// Description: Configuration loading and validation for the Shield server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: shield-core, shield-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every table rejects unknown fields. Missing or invalid configuration fails
//! closed: a process never starts with a partially understood permission map,
//! admin allowlist, or license key.
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use shield_core::Ed25519LicenseDecoder;
use shield_core::Endpoint;
use shield_core::EndpointGrants;
use shield_core::HttpMethod;
use shield_core::Principal;
use shield_core::RolePermissionMap;
use shield_core::StaticClusterState;
use shield_core::full_grants;
use shield_core::parse_date;
use shield_core::parse_verifying_key;
use shield_store_sqlite::SqliteStoreConfig;
use shield_store_sqlite::SqliteStoreMode;
use shield_store_sqlite::SqliteSyncMode;
use thiserror::Error;

use crate::admin::AdminDnAllowlist;
use crate::admin::MAX_DN_LENGTH;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "shield.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "SHIELD_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address.
const DEFAULT_BIND: &str = "127.0.0.1:9280";
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Default store busy timeout in milliseconds.
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default trial length in days.
const DEFAULT_TRIAL_DAYS: u16 = 90;
/// Maximum trial length in days.
const MAX_TRIAL_DAYS: u16 = 3650;
/// Maximum length of a role or principal name.
const MAX_NAME_LENGTH: usize = 256;
/// Maximum size of a verifying key file in bytes.
const MAX_KEY_FILE_SIZE: u64 = 4096;
/// Length of a raw Ed25519 key.
const RAW_KEY_BYTES: usize = 32;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Shield process configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShieldConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Administrative identity configuration.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Management API role permissions.
    #[serde(default)]
    pub rest_api: RestApiConfig,
    /// License verification configuration.
    pub license: LicenseConfig,
    /// Cluster facts.
    pub cluster: ClusterConfig,
    /// Configuration store selection.
    #[serde(default)]
    pub store: StoreConfig,
    /// Static principal table used by request authentication.
    #[serde(default)]
    pub principals: Vec<PrincipalConfig>,
}

impl ShieldConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.admin.validate()?;
        self.rest_api.validate()?;
        self.license.validate()?;
        self.cluster.validate()?;
        self.store.validate()?;
        let mut names = BTreeSet::new();
        for principal in &self.principals {
            principal.validate()?;
            if !names.insert(principal.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate principal name: {}",
                    principal.name
                )));
            }
        }
        Ok(())
    }

    /// Builds the immutable role permission map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an endpoint or method name is unknown.
    pub fn permission_map(&self) -> Result<RolePermissionMap, ConfigError> {
        self.rest_api.permission_map()
    }

    /// Builds the administrative DN allowlist.
    #[must_use]
    pub fn admin_allowlist(&self) -> AdminDnAllowlist {
        AdminDnAllowlist::new(&self.admin.distinguished_names)
    }

    /// Builds the license decoder from the configured verifying key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the key cannot be read or parsed.
    pub fn license_decoder(&self) -> Result<Ed25519LicenseDecoder, ConfigError> {
        self.license.decoder()
    }

    /// Builds the static cluster facts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the creation date is malformed.
    pub fn cluster_state(&self) -> Result<StaticClusterState, ConfigError> {
        self.cluster.state()
    }

    /// Returns the configured principal with `name`.
    #[must_use]
    pub fn principal(&self, name: &str) -> Option<Principal> {
        self.principals.iter().find(|entry| entry.name == name).map(PrincipalConfig::to_principal)
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            audit: ServerAuditConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bind address is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        self.bind_addr()?;
        self.audit.validate()
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit disabled.
    None,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerAuditConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (file sink only).
    #[serde(default)]
    pub path: Option<String>,
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires audit.path".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Admin
// ============================================================================

/// Administrative identity configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Certificate distinguished names treated as administrators.
    #[serde(default)]
    pub distinguished_names: Vec<String>,
}

impl AdminConfig {
    /// Validates admin configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for dn in &self.distinguished_names {
            let trimmed = dn.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid(
                    "admin.distinguished_names entries must be non-empty".to_string(),
                ));
            }
            if trimmed.len() > MAX_DN_LENGTH {
                return Err(ConfigError::Invalid(
                    "admin.distinguished_names entry exceeds max length".to_string(),
                ));
            }
            if !trimmed.contains('=') {
                return Err(ConfigError::Invalid(format!(
                    "admin distinguished name is not an RDN sequence: {trimmed}"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: REST API Permissions
// ============================================================================

/// Management API permission configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RestApiConfig {
    /// Per-role endpoint permissions.
    #[serde(default)]
    pub roles: BTreeMap<String, RestApiRoleConfig>,
}

/// Endpoint/method permissions granted to one role.
///
/// # Invariants
/// - `allow` absent grants every method on every endpoint.
/// - `deny` is subtracted after `allow` is applied.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RestApiRoleConfig {
    /// Endpoint name to allowed method names.
    #[serde(default)]
    pub allow: Option<BTreeMap<String, Vec<String>>>,
    /// Endpoint name to denied method names.
    #[serde(default)]
    pub deny: BTreeMap<String, Vec<String>>,
}

impl RestApiConfig {
    /// Validates every role entry.
    fn validate(&self) -> Result<(), ConfigError> {
        self.permission_map().map(|_| ())
    }

    /// Builds the role permission map.
    fn permission_map(&self) -> Result<RolePermissionMap, ConfigError> {
        let mut map = RolePermissionMap::new();
        for (role, entry) in &self.roles {
            validate_name("rest_api role", role)?;
            map = map.with_role(role.as_str(), entry.grants(role)?);
        }
        Ok(map)
    }
}

impl RestApiRoleConfig {
    /// Resolves the effective grants for `role`.
    fn grants(&self, role: &str) -> Result<EndpointGrants, ConfigError> {
        let mut grants = match &self.allow {
            None => full_grants(),
            Some(allow) => parse_grants(role, "allow", allow)?,
        };
        for (endpoint, methods) in parse_grants(role, "deny", &self.deny)? {
            if let Some(allowed) = grants.get_mut(&endpoint) {
                allowed.retain(|method| !methods.contains(method));
            }
        }
        Ok(grants)
    }
}

/// Parses an endpoint/method table into grants.
fn parse_grants(
    role: &str,
    table: &str,
    entries: &BTreeMap<String, Vec<String>>,
) -> Result<EndpointGrants, ConfigError> {
    let mut grants = EndpointGrants::new();
    for (endpoint_name, method_names) in entries {
        let endpoint = Endpoint::parse(endpoint_name).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "rest_api.roles.{role}.{table}: unknown endpoint {endpoint_name}"
            ))
        })?;
        let methods = grants.entry(endpoint).or_default();
        for method_name in method_names {
            let method = HttpMethod::parse(method_name).ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "rest_api.roles.{role}.{table}: unknown method {method_name}"
                ))
            })?;
            methods.insert(method);
        }
    }
    Ok(grants)
}

// ============================================================================
// SECTION: License
// ============================================================================

/// License verification configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicenseConfig {
    /// Base64 Ed25519 public key.
    #[serde(default)]
    pub verifying_key: Option<String>,
    /// Path to a raw or base64 Ed25519 public key.
    #[serde(default)]
    pub verifying_key_path: Option<PathBuf>,
    /// Trial length in days applied when no license is stored.
    #[serde(default = "default_trial_days")]
    pub trial_days: u16,
}

impl LicenseConfig {
    /// Validates license configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.verifying_key, &self.verifying_key_path) {
            (Some(key), None) => {
                parse_verifying_key(key.trim().as_bytes())
                    .map_err(|err| ConfigError::Invalid(format!("license.verifying_key: {err}")))?;
            }
            (None, Some(path)) => {
                validate_path_string("license.verifying_key_path", &path.to_string_lossy())?;
            }
            _ => {
                return Err(ConfigError::Invalid(
                    "license requires exactly one of verifying_key or verifying_key_path"
                        .to_string(),
                ));
            }
        }
        if self.trial_days == 0 || self.trial_days > MAX_TRIAL_DAYS {
            return Err(ConfigError::Invalid(format!(
                "license.trial_days must be between 1 and {MAX_TRIAL_DAYS}"
            )));
        }
        Ok(())
    }

    /// Builds the license decoder.
    fn decoder(&self) -> Result<Ed25519LicenseDecoder, ConfigError> {
        let material = match (&self.verifying_key, &self.verifying_key_path) {
            (Some(key), _) => key.trim().as_bytes().to_vec(),
            (None, Some(path)) => read_key_file(path)?,
            (None, None) => {
                return Err(ConfigError::Invalid("license verifying key not configured".to_string()));
            }
        };
        let key = parse_verifying_key(&material)
            .map_err(|err| ConfigError::Invalid(format!("license verifying key: {err}")))?;
        Ok(Ed25519LicenseDecoder::new(key))
    }
}

/// Reads a bounded key file and trims text encodings.
fn read_key_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if metadata.len() > MAX_KEY_FILE_SIZE {
        return Err(ConfigError::Invalid("verifying key file exceeds size limit".to_string()));
    }
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() == RAW_KEY_BYTES {
        return Ok(bytes);
    }
    Ok(bytes.trim_ascii().to_vec())
}

// ============================================================================
// SECTION: Cluster
// ============================================================================

/// Cluster facts.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    /// Number of nodes in the cluster.
    pub node_count: u32,
    /// Cluster creation day (`yyyy-MM-dd`).
    pub created_on: String,
}

impl ClusterConfig {
    /// Validates cluster facts.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.node_count == 0 {
            return Err(ConfigError::Invalid("cluster.node_count must be at least 1".to_string()));
        }
        self.state().map(|_| ())
    }

    /// Builds static cluster facts.
    fn state(&self) -> Result<StaticClusterState, ConfigError> {
        let created_on = parse_date(&self.created_on)
            .map_err(|err| ConfigError::Invalid(format!("cluster.created_on: {err}")))?;
        Ok(StaticClusterState::new(self.node_count, created_on))
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Configuration store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use the `SQLite`-backed durable store.
    Sqlite,
}

impl StoreType {
    /// Returns the config name of the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Configuration store selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Directory of `<config_type>.json` seed documents.
    #[serde(default)]
    pub seed_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            seed_dir: None,
        }
    }
}

impl StoreConfig {
    /// Returns the `SQLite` store config, or `None` for the memory backend.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match (self.store_type, &self.path) {
            (StoreType::Sqlite, Some(path)) => Some(SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
            _ => None,
        }
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(seed_dir) = &self.seed_dir {
            validate_path_string("store.seed_dir", &seed_dir.to_string_lossy())?;
        }
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_path_string("store.path", &path.to_string_lossy())?;
                if self.busy_timeout_ms == 0 {
                    return Err(ConfigError::Invalid(
                        "store.busy_timeout_ms must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// SECTION: Principals
// ============================================================================

/// Static principal entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrincipalConfig {
    /// User name.
    pub name: String,
    /// Certificate distinguished name.
    #[serde(default)]
    pub distinguished_name: Option<String>,
    /// Backend roles asserted for the user.
    #[serde(default)]
    pub backend_roles: Vec<String>,
}

impl PrincipalConfig {
    /// Validates a principal entry.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_name("principal", &self.name)?;
        if let Some(dn) = &self.distinguished_name
            && (dn.trim().is_empty() || dn.len() > MAX_DN_LENGTH)
        {
            return Err(ConfigError::Invalid(format!(
                "principal {} has an invalid distinguished_name",
                self.name
            )));
        }
        for role in &self.backend_roles {
            validate_name("backend role", role)?;
        }
        Ok(())
    }

    /// Converts the entry into a principal.
    #[must_use]
    pub fn to_principal(&self) -> Principal {
        let principal =
            Principal::named(self.name.as_str()).with_backend_roles(self.backend_roles.iter().cloned());
        match &self.distinguished_name {
            Some(dn) => principal.with_distinguished_name(dn.as_str()),
            None => principal,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default maximum body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default store busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

/// Returns the default trial length.
const fn default_trial_days() -> u16 {
    DEFAULT_TRIAL_DAYS
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
pub(crate) fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a role or principal name.
fn validate_name(kind: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{kind} name must be non-empty")));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{kind} name exceeds max length")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
