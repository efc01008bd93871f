// crates/shield-api/src/audit.rs
// ============================================================================
// Module: Shield Audit Logging
// Description: Structured audit events for management API handling.
// Purpose: Emit JSON-line audit records without a global logger.
// Dependencies: shield-core, serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for management API
//! calls, access decisions, configuration changes, and license updates.
//! Events never carry request bodies, password material, or raw license text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use shield_core::AccessDecision;
use shield_core::ConfigType;
use shield_core::Endpoint;
use shield_core::HttpMethod;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Management API request audit event.
#[derive(Debug, Clone, Serialize)]
pub struct ApiAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request method.
    pub method: &'static str,
    /// Request path.
    pub path: String,
    /// Endpoint addressed by the path, when recognized.
    pub endpoint: Option<Endpoint>,
    /// Authenticated principal name.
    pub principal: Option<String>,
    /// Response status code.
    pub status: u16,
    /// Outcome label derived from the status.
    pub outcome: &'static str,
}

/// Configuration change kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigChangeKind {
    /// Entry created.
    Created,
    /// Entry replaced.
    Updated,
    /// Entry removed.
    Deleted,
}

/// Configuration change audit event.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigChangeAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Changed configuration type.
    pub config_type: ConfigType,
    /// Changed entry key.
    pub entry: String,
    /// Change kind.
    pub change: ConfigChangeKind,
    /// Principal that made the change.
    pub principal: String,
}

/// License update audit event.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Outcome label (`created`, `updated`, `rejected`, `failed`).
    pub outcome: &'static str,
    /// License type when the artifact decoded.
    pub license_type: Option<String>,
    /// Rejection diagnostics.
    pub violations: Vec<String>,
    /// Principal that submitted the license.
    pub principal: String,
}

/// Access decision audit event.
#[derive(Debug, Clone, Serialize)]
pub struct AccessAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Endpoint checked.
    pub endpoint: Endpoint,
    /// Method checked.
    pub method: HttpMethod,
    /// Whether access was granted.
    pub allowed: bool,
    /// Decision reason label.
    pub reason: &'static str,
    /// Principal checked.
    pub principal: String,
    /// Whether the principal holds an administrative identity.
    pub admin: bool,
}

/// Inputs required to construct a request audit event.
pub struct ApiAuditEventParams {
    /// Request method.
    pub method: &'static str,
    /// Request path.
    pub path: String,
    /// Endpoint addressed by the path.
    pub endpoint: Option<Endpoint>,
    /// Authenticated principal name.
    pub principal: Option<String>,
    /// Response status code.
    pub status: u16,
}

impl ApiAuditEvent {
    /// Creates a new request audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ApiAuditEventParams) -> Self {
        Self {
            event: "management_api_request",
            timestamp_ms: now_millis(),
            method: params.method,
            path: params.path,
            endpoint: params.endpoint,
            principal: params.principal,
            status: params.status,
            outcome: outcome_label(params.status),
        }
    }
}

impl ConfigChangeAuditEvent {
    /// Creates a new configuration change audit event.
    #[must_use]
    pub fn new(
        config_type: ConfigType,
        entry: impl Into<String>,
        change: ConfigChangeKind,
        principal: impl Into<String>,
    ) -> Self {
        Self {
            event: "config_change",
            timestamp_ms: now_millis(),
            config_type,
            entry: entry.into(),
            change,
            principal: principal.into(),
        }
    }
}

impl LicenseAuditEvent {
    /// Creates a new license update audit event.
    #[must_use]
    pub fn new(
        outcome: &'static str,
        license_type: Option<String>,
        violations: Vec<String>,
        principal: impl Into<String>,
    ) -> Self {
        Self {
            event: "license_update",
            timestamp_ms: now_millis(),
            outcome,
            license_type,
            violations,
            principal: principal.into(),
        }
    }
}

impl AccessAuditEvent {
    /// Creates a new access decision audit event.
    #[must_use]
    pub fn new(
        endpoint: Endpoint,
        method: HttpMethod,
        decision: AccessDecision,
        principal: impl Into<String>,
        admin: bool,
    ) -> Self {
        Self {
            event: "api_access",
            timestamp_ms: now_millis(),
            endpoint,
            method,
            allowed: decision.allowed,
            reason: decision.reason.as_str(),
            principal: principal.into(),
            admin,
        }
    }
}

/// Returns milliseconds since the unix epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Maps a status code to an outcome label.
const fn outcome_label(status: u16) -> &'static str {
    match status {
        0..=399 => "success",
        400..=499 => "client_error",
        _ => "server_error",
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for management API events.
pub trait AuditSink: Send + Sync {
    /// Record a request audit event.
    fn record_request(&self, event: &ApiAuditEvent);

    /// Record an access decision.
    fn record_access(&self, _event: &AccessAuditEvent) {}

    /// Record a configuration change.
    fn record_config_change(&self, _event: &ConfigChangeAuditEvent) {}

    /// Record a license update attempt.
    fn record_license(&self, _event: &LicenseAuditEvent) {}
}

/// Writes one event as a JSON line.
fn write_line<W: Write, T: Serialize>(writer: &mut W, event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(writer, "{payload}");
        let _ = writer.flush();
    }
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_request(&self, event: &ApiAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_access(&self, event: &AccessAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_config_change(&self, event: &ConfigChangeAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_license(&self, event: &LicenseAuditEvent) {
        write_line(&mut io::stderr(), event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one event under the file lock.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(mut file) = self.file.lock() {
            write_line(&mut *file, event);
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_request(&self, event: &ApiAuditEvent) {
        self.append(event);
    }

    fn record_access(&self, event: &AccessAuditEvent) {
        self.append(event);
    }

    fn record_config_change(&self, event: &ConfigChangeAuditEvent) {
        self.append(event);
    }

    fn record_license(&self, event: &LicenseAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_request(&self, _event: &ApiAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
