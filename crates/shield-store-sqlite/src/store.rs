// crates/shield-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Configuration Store
// Description: Durable ConfigurationStore backed by SQLite.
// Purpose: Persist security configuration documents with atomic updates.
// Dependencies: shield-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`ConfigurationStore`] using `SQLite`. Each
//! configuration type is one row holding the document JSON and its SHA-256
//! fingerprint. Reads verify the fingerprint and fail closed on corruption.
//! An atomic update runs read, mutate, and write inside one `IMMEDIATE`
//! transaction, so concurrent writers (threads or processes) are serialized
//! and readers never observe a partial document.
//! Security posture: database contents are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use shield_core::ConfigType;
use shield_core::ConfigurationDocument;
use shield_core::ConfigurationSeed;
use shield_core::ConfigurationStore;
use shield_core::DocumentMutator;
use shield_core::StoreError;
use shield_core::fingerprint;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum stored document size in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` configuration store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default settings.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or fingerprint mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Document exceeded the size limit.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
    /// The store was never provisioned.
    #[error("Search Guard index not initialized (SG11)")]
    NotInitialized,
    /// The store was already provisioned.
    #[error("configuration store already initialized")]
    AlreadyInitialized,
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => {
                Self::Corrupt(format!("schema version mismatch: {message}"))
            }
            SqliteStoreError::Invalid(message) => Self::Store(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Store(format!(
                "document exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
            SqliteStoreError::NotInitialized => Self::NotInitialized,
            SqliteStoreError::AlreadyInitialized => Self::AlreadyInitialized,
        }
    }
}

/// Maps an engine error into a store error.
#[allow(clippy::needless_pass_by_value, reason = "Used as a map_err adapter.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed configuration store.
#[derive(Clone)]
pub struct SqliteConfigurationStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteConfigurationStore {
    /// Opens an `SQLite`-backed configuration store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// its schema is incompatible.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Runs `work` inside an `IMMEDIATE` transaction and commits on success.
    fn with_write_tx<T>(
        &self,
        work: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(db_error)?;
        let value = work(&tx)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(value)
    }
}

impl ConfigurationStore for SqliteConfigurationStore {
    fn read(&self, config_type: ConfigType) -> Result<ConfigurationDocument, StoreError> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let tx = guard.transaction().map_err(db_error)?;
        ensure_provisioned(&tx)?;
        let document = load_document(&tx, config_type)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(document)
    }

    fn atomic_update(
        &self,
        config_type: ConfigType,
        mutator: &mut DocumentMutator<'_>,
    ) -> Result<ConfigurationDocument, StoreError> {
        self.with_write_tx(|tx| {
            ensure_provisioned(tx)?;
            let current = load_document(tx, config_type)?;
            let next = mutator(&current)?;
            save_document(tx, config_type, &next)?;
            Ok(next)
        })
    }

    fn initialize(&self, seed: ConfigurationSeed) -> Result<(), StoreError> {
        self.with_write_tx(|tx| {
            if is_provisioned(tx)? {
                return Err(SqliteStoreError::AlreadyInitialized.into());
            }
            tx.execute("INSERT INTO provisioning (provisioned_at) VALUES (?1)", params![unix_millis()])
                .map_err(db_error)?;
            for config_type in ConfigType::ALL {
                let document = seed.get(&config_type).cloned().unwrap_or_default();
                save_document(tx, config_type, &document)?;
            }
            Ok(())
        })
    }

    fn is_initialized(&self) -> Result<bool, StoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let provisioned = is_provisioned(&guard)?;
        drop(guard);
        Ok(provisioned)
    }
}

// ============================================================================
// SECTION: Document Rows
// ============================================================================

/// Returns true when the provisioning marker exists.
fn is_provisioned(connection: &Connection) -> Result<bool, SqliteStoreError> {
    let marker: Option<i64> = connection
        .query_row("SELECT provisioned_at FROM provisioning LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    Ok(marker.is_some())
}

/// Fails with [`SqliteStoreError::NotInitialized`] when the store was never provisioned.
fn ensure_provisioned(connection: &Connection) -> Result<(), SqliteStoreError> {
    if is_provisioned(connection)? {
        Ok(())
    } else {
        Err(SqliteStoreError::NotInitialized)
    }
}

/// Loads and verifies one document row; a missing row is an empty document.
fn load_document(
    connection: &Connection,
    config_type: ConfigType,
) -> Result<ConfigurationDocument, SqliteStoreError> {
    let row: Option<(Vec<u8>, String)> = connection
        .query_row(
            "SELECT document_json, document_hash FROM documents WHERE config_type = ?1",
            params![config_type.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(db_error)?;
    let Some((bytes, hash)) = row else {
        return Ok(ConfigurationDocument::new());
    };
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_DOCUMENT_BYTES,
            actual_bytes: bytes.len(),
        });
    }
    if fingerprint(&bytes) != hash {
        return Err(SqliteStoreError::Corrupt(format!("hash mismatch for {config_type}")));
    }
    serde_json::from_slice(&bytes).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
}

/// Writes one document row with its fingerprint.
fn save_document(
    connection: &Connection,
    config_type: ConfigType,
    document: &ConfigurationDocument,
) -> Result<(), SqliteStoreError> {
    let bytes =
        serde_json::to_vec(document).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_DOCUMENT_BYTES,
            actual_bytes: bytes.len(),
        });
    }
    let hash = fingerprint(&bytes);
    connection
        .execute(
            "INSERT INTO documents (config_type, document_json, document_hash, updated_at) VALUES \
             (?1, ?2, ?3, ?4) ON CONFLICT(config_type) DO UPDATE SET document_json = \
             excluded.document_json, document_hash = excluded.document_hash, updated_at = \
             excluded.updated_at",
            params![config_type.as_str(), bytes, hash, unix_millis()],
        )
        .map_err(db_error)?;
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction_with_behavior(TransactionBehavior::Immediate).map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS provisioning (
                    provisioned_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS documents (
                    config_type TEXT PRIMARY KEY,
                    document_json BLOB NOT NULL,
                    document_hash TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                );",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
