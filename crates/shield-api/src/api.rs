// crates/shield-api/src/api.rs
// ============================================================================
// Module: Management API
// Description: Transport-independent handling of management API requests.
// Purpose: Gate, validate, and apply management calls against the store.
// Dependencies: shield-core, serde_json
// ============================================================================

//! ## Overview
//! [`ManagementApi`] receives an already authenticated principal together
//! with the request method, path, and body, and returns a status code and
//! body. Transports only translate to and from their own request types.
//!
//! Security posture: every call except `permissionsinfo` is checked against
//! the caller's resolved roles before anything is read or written. Rejected
//! payloads never reach the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use shield_core::ClusterState;
use shield_core::ConfigType;
use shield_core::ConfigurationDocumentValidators;
use shield_core::ConfigurationStore;
use shield_core::HttpMethod;
use shield_core::LicenseUpdateError;
use shield_core::LicenseUpdateOutcome;
use shield_core::LicenseUpdatePipeline;
use shield_core::NOT_INITIALIZED_MESSAGE;
use shield_core::Principal;
use shield_core::RestApiPrivilegesEvaluator;
use shield_core::RoleResolutionError;
use shield_core::RoleResolver;
use shield_core::SchemaValidator;
use shield_core::StoreError;
use shield_core::format_date;

use crate::audit::AccessAuditEvent;
use crate::audit::ApiAuditEvent;
use crate::audit::ApiAuditEventParams;
use crate::audit::AuditSink;
use crate::audit::ConfigChangeAuditEvent;
use crate::audit::ConfigChangeKind;
use crate::audit::LicenseAuditEvent;
use crate::passwords::hash_password;
use crate::routes::Route;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Key under which internal users store their password hash.
const HASH_KEY: &str = "hash";
/// Key under which internal users submit a plaintext password.
const PASSWORD_KEY: &str = "password";

// ============================================================================
// SECTION: Request / Response
// ============================================================================

/// One management API request.
#[derive(Debug, Clone, Copy)]
pub struct ApiRequest<'a> {
    /// Request method.
    pub method: HttpMethod,
    /// Request path including the API prefix.
    pub path: &'a str,
    /// Raw request body.
    pub body: Option<&'a [u8]>,
    /// Authenticated caller.
    pub principal: &'a Principal,
}

/// Response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// JSON document.
    Json(Value),
    /// Plain-text diagnostic.
    Text(String),
}

/// Management API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response payload.
    pub body: ResponseBody,
}

impl ApiResponse {
    /// Builds a JSON response.
    #[must_use]
    pub const fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
        }
    }

    /// Returns the JSON payload, if any.
    #[must_use]
    pub const fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Builds a `{"status": .., "message": ..}` response.
    fn status_message(status: u16, label: &str, message: impl Into<String>) -> Self {
        Self::json(status, json!({"status": label, "message": message.into()}))
    }

    /// Builds a 405 response.
    fn method_not_allowed(method: HttpMethod) -> Self {
        Self::json(
            405,
            json!({
                "status": "METHOD_NOT_ALLOWED",
                "reason": format!("Method {method} not supported for this action."),
            }),
        )
    }

    /// Builds a 404 response for an unknown resource.
    fn not_found(message: impl Into<String>) -> Self {
        Self::status_message(404, "NOT_FOUND", message)
    }

    /// Maps a store failure to a 500 response.
    fn store_failure(err: &StoreError) -> Self {
        match err {
            StoreError::NotInitialized => Self {
                status: 500,
                body: ResponseBody::Text(NOT_INITIALIZED_MESSAGE.to_string()),
            },
            other => Self::json(
                500,
                json!({"status": "INTERNAL_SERVER_ERROR", "error": other.to_string()}),
            ),
        }
    }
}

// ============================================================================
// SECTION: Management API
// ============================================================================

/// Collaborators wired into a [`ManagementApi`].
pub struct ManagementApiParams {
    /// Configuration store.
    pub store: Arc<dyn ConfigurationStore>,
    /// Endpoint access evaluator.
    pub privileges: RestApiPrivilegesEvaluator,
    /// Role resolution for authenticated principals.
    pub resolver: Arc<dyn RoleResolver>,
    /// License update pipeline.
    pub license: LicenseUpdatePipeline,
    /// Cluster facts.
    pub cluster: Arc<dyn ClusterState>,
    /// Schema catalog shared with the license pipeline.
    pub validators: Arc<ConfigurationDocumentValidators>,
    /// Audit sink.
    pub audit: Arc<dyn AuditSink>,
}

/// Transport-independent management API.
#[derive(Clone)]
pub struct ManagementApi {
    /// Configuration store.
    store: Arc<dyn ConfigurationStore>,
    /// Endpoint access evaluator.
    privileges: RestApiPrivilegesEvaluator,
    /// Role resolution.
    resolver: Arc<dyn RoleResolver>,
    /// License update pipeline.
    license: LicenseUpdatePipeline,
    /// Cluster facts.
    cluster: Arc<dyn ClusterState>,
    /// Entry schemas.
    validators: Arc<ConfigurationDocumentValidators>,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
}

/// Caller context resolved once per request.
struct Caller<'a> {
    /// Authenticated principal.
    principal: &'a Principal,
    /// Whether the principal holds an administrative identity.
    admin: bool,
    /// Resolved roles; empty for administrators.
    roles: BTreeSet<String>,
}

impl ManagementApi {
    /// Creates the API from its collaborators.
    #[must_use]
    pub fn new(params: ManagementApiParams) -> Self {
        Self {
            store: params.store,
            privileges: params.privileges,
            resolver: params.resolver,
            license: params.license,
            cluster: params.cluster,
            validators: params.validators,
            audit: params.audit,
        }
    }

    /// Returns the entry schema catalog.
    #[must_use]
    pub const fn validators(&self) -> &Arc<ConfigurationDocumentValidators> {
        &self.validators
    }

    /// Returns the license update pipeline.
    #[must_use]
    pub const fn license(&self) -> &LicenseUpdatePipeline {
        &self.license
    }

    /// Returns the audit sink.
    #[must_use]
    pub fn audit(&self) -> &Arc<dyn AuditSink> {
        &self.audit
    }

    /// Handles one request and records its audit event.
    #[must_use]
    pub fn handle(&self, request: &ApiRequest<'_>) -> ApiResponse {
        let route = Route::parse(request.path);
        let response = match &route {
            Some(route) => self.dispatch(route, request),
            None => ApiResponse::not_found(format!("No handler found for {}", request.path)),
        };
        self.audit.record_request(&ApiAuditEvent::new(ApiAuditEventParams {
            method: request.method.as_str(),
            path: request.path.to_string(),
            endpoint: route.as_ref().map(Route::endpoint),
            principal: Some(request.principal.name.clone()),
            status: response.status,
        }));
        response
    }

    /// Resolves the caller and routes the request.
    fn dispatch(&self, route: &Route, request: &ApiRequest<'_>) -> ApiResponse {
        if !supports(route, request.method) {
            return ApiResponse::method_not_allowed(request.method);
        }
        let caller = match self.caller(request.principal) {
            Ok(caller) => caller,
            Err(err) => return ApiResponse::store_failure(&err),
        };
        if *route == Route::PermissionsInfo {
            return self.permissions_info(&caller);
        }
        let endpoint = route.endpoint();
        let decision =
            self.privileges.check_access(caller.principal, &caller.roles, endpoint, request.method);
        self.audit.record_access(&AccessAuditEvent::new(
            endpoint,
            request.method,
            decision,
            caller.principal.name.as_str(),
            caller.admin,
        ));
        if !decision.allowed {
            return ApiResponse::json(
                403,
                json!({
                    "status": "FORBIDDEN",
                    "reason": format!(
                        "No permission to access REST API: {} on {endpoint}",
                        request.method
                    ),
                }),
            );
        }
        let result = match route {
            Route::PermissionsInfo => Ok(self.permissions_info(&caller)),
            Route::License => Ok(self.license_endpoint(request)),
            Route::SystemInfo => self.system_info(),
            Route::Cache => Ok(ApiResponse::status_message(200, "OK", "Cache flushed successfully.")),
            Route::Configuration(config_type) => self
                .store
                .read(*config_type)
                .map(|document| ApiResponse::json(200, document.to_json())),
            Route::Entries(config_type) => self.list_entries(*config_type),
            Route::Entry(config_type, name) => match request.method {
                HttpMethod::Get => self.get_entry(*config_type, name),
                HttpMethod::Delete => self.delete_entry(*config_type, name, caller.principal),
                HttpMethod::Put | HttpMethod::Post => {
                    self.put_entry(*config_type, name, request.body, caller.principal)
                }
            },
        };
        result.unwrap_or_else(|err| ApiResponse::store_failure(&err))
    }

    /// Resolves the caller's admin status and roles.
    fn caller<'a>(&self, principal: &'a Principal) -> Result<Caller<'a>, StoreError> {
        if self.privileges.is_admin(principal) {
            return Ok(Caller {
                principal,
                admin: true,
                roles: BTreeSet::new(),
            });
        }
        let roles = self.resolver.resolve_roles(principal).map_err(|err| match err {
            RoleResolutionError::Store(store) => store,
            RoleResolutionError::Invalid(message) => StoreError::Store(message),
        })?;
        Ok(Caller {
            principal,
            admin: false,
            roles,
        })
    }

    // ------------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------------

    /// Reports the caller's management API permissions.
    fn permissions_info(&self, caller: &Caller<'_>) -> ApiResponse {
        let principal = caller.principal;
        let backend_roles: Vec<&str> = principal.backend_roles.iter().map(String::as_str).collect();
        let disabled = self.privileges.disabled_endpoints(principal, &caller.roles);
        ApiResponse::json(
            200,
            json!({
                "user": format!(
                    "User [name={}, backend_roles=[{}]]",
                    principal.name,
                    backend_roles.join(", ")
                ),
                "user_name": principal.name,
                "has_api_access": self.privileges.has_api_access(principal, &caller.roles),
                "disabled_endpoints": disabled,
            }),
        )
    }

    /// Reads or replaces the cluster license.
    fn license_endpoint(&self, request: &ApiRequest<'_>) -> ApiResponse {
        if request.method == HttpMethod::Get {
            return match self.license.current_license() {
                Ok(current) => ApiResponse::json(200, json!({"sg_license": current.summary})),
                Err(err) => ApiResponse::store_failure(&err),
            };
        }
        let principal = request.principal.name.as_str();
        match self.license.apply(request.body) {
            Ok(report) => {
                let (status, label, outcome) = match report.outcome {
                    LicenseUpdateOutcome::Created => (201, "CREATED", "created"),
                    LicenseUpdateOutcome::Updated => (200, "OK", "updated"),
                };
                self.audit.record_license(&LicenseAuditEvent::new(
                    outcome,
                    Some(report.license.license_type.as_str().to_string()),
                    Vec::new(),
                    principal,
                ));
                ApiResponse::status_message(status, label, "License updated.")
            }
            Err(LicenseUpdateError::Store(err)) => {
                self.audit.record_license(&LicenseAuditEvent::new(
                    "failed",
                    None,
                    vec![err.to_string()],
                    principal,
                ));
                ApiResponse::store_failure(&err)
            }
            Err(err) => {
                let violations = match &err {
                    LicenseUpdateError::Invalid(violations) => {
                        violations.iter().map(ToString::to_string).collect()
                    }
                    other => vec![other.to_string()],
                };
                self.audit.record_license(&LicenseAuditEvent::new(
                    "rejected",
                    None,
                    violations,
                    principal,
                ));
                license_rejection(&err)
            }
        }
    }

    /// Reports cluster facts and store provisioning state.
    fn system_info(&self) -> Result<ApiResponse, StoreError> {
        let initialized = self.store.is_initialized()?;
        Ok(ApiResponse::json(
            200,
            json!({
                "cluster": {
                    "node_count": self.cluster.node_count(),
                    "created_on": format_date(self.cluster.created_on()),
                },
                "store": {"initialized": initialized},
            }),
        ))
    }

    /// Returns every entry of a collection.
    fn list_entries(&self, config_type: ConfigType) -> Result<ApiResponse, StoreError> {
        let document = self.store.read(config_type)?;
        let entries: Map<String, Value> = document
            .fields()
            .iter()
            .map(|(name, value)| (name.clone(), redact(config_type, value)))
            .collect();
        Ok(ApiResponse::json(200, Value::Object(entries)))
    }

    /// Returns one entry of a collection.
    fn get_entry(&self, config_type: ConfigType, name: &str) -> Result<ApiResponse, StoreError> {
        let document = self.store.read(config_type)?;
        Ok(document.get(name).map_or_else(
            || ApiResponse::not_found(format!("Resource '{name}' not found.")),
            |value| {
                let mut body = Map::new();
                body.insert(name.to_string(), redact(config_type, value));
                ApiResponse::json(200, Value::Object(body))
            },
        ))
    }

    /// Creates or replaces one entry.
    fn put_entry(
        &self,
        config_type: ConfigType,
        name: &str,
        body: Option<&[u8]>,
        principal: &Principal,
    ) -> Result<ApiResponse, StoreError> {
        if let Some(result) = self.validators.validate_entry(config_type, body, HttpMethod::Put)
            && !result.is_valid()
        {
            return Ok(ApiResponse::json(400, result.to_error_body()));
        }
        let Some(mut entry) = body.and_then(SchemaValidator::parse_object) else {
            return Ok(ApiResponse::json(
                400,
                json!({"status": "error", "reason": "Could not parse content of request."}),
            ));
        };
        if config_type == ConfigType::Internalusers
            && let Some(password) = entry.remove(PASSWORD_KEY)
        {
            let Some(password) = password.as_str().filter(|text| !text.is_empty()) else {
                return Ok(ApiResponse::json(
                    400,
                    json!({"status": "error", "reason": "Password must not be empty."}),
                ));
            };
            let hash = hash_password(password).map_err(|err| StoreError::Store(err.to_string()))?;
            entry.insert(HASH_KEY.to_string(), Value::String(hash));
        }
        let value = Value::Object(entry);
        let mut existed = false;
        self.store.atomic_update(config_type, &mut |current| {
            existed = current.contains(name);
            Ok(current.with_field(name, value.clone()))
        })?;
        let (status, label, change, verb) = if existed {
            (200, "OK", ConfigChangeKind::Updated, "updated")
        } else {
            (201, "CREATED", ConfigChangeKind::Created, "created")
        };
        self.audit.record_config_change(&ConfigChangeAuditEvent::new(
            config_type,
            name,
            change,
            principal.name.as_str(),
        ));
        Ok(ApiResponse::status_message(status, label, format!("'{name}' {verb}.")))
    }

    /// Removes one entry; missing entries are reported without writing.
    fn delete_entry(
        &self,
        config_type: ConfigType,
        name: &str,
        principal: &Principal,
    ) -> Result<ApiResponse, StoreError> {
        let mut missing = false;
        let result = self.store.atomic_update(config_type, &mut |current| {
            if !current.contains(name) {
                missing = true;
                return Err(StoreError::Aborted(format!("entry {name} not found")));
            }
            Ok(current.without_field(name))
        });
        match result {
            Ok(_) => {}
            Err(StoreError::Aborted(_)) if missing => {
                return Ok(ApiResponse::not_found(format!("Resource '{name}' not found.")));
            }
            Err(err) => return Err(err),
        }
        self.audit.record_config_change(&ConfigChangeAuditEvent::new(
            config_type,
            name,
            ConfigChangeKind::Deleted,
            principal.name.as_str(),
        ));
        Ok(ApiResponse::status_message(200, "OK", format!("'{name}' deleted.")))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when `route` accepts `method`.
const fn supports(route: &Route, method: HttpMethod) -> bool {
    match route {
        Route::PermissionsInfo
        | Route::SystemInfo
        | Route::Configuration(_)
        | Route::Entries(_) => matches!(method, HttpMethod::Get),
        Route::License => matches!(method, HttpMethod::Get | HttpMethod::Put | HttpMethod::Post),
        Route::Cache => matches!(method, HttpMethod::Delete),
        Route::Entry(..) => {
            matches!(method, HttpMethod::Get | HttpMethod::Put | HttpMethod::Delete)
        }
    }
}

/// Maps a rejected license update to its 400 response.
fn license_rejection(err: &LicenseUpdateError) -> ApiResponse {
    match err {
        LicenseUpdateError::Schema(result) => ApiResponse::json(400, result.to_error_body()),
        LicenseUpdateError::RequestBodyRequired => {
            ApiResponse::json(400, json!({"status": "error", "reason": err.to_string()}))
        }
        other => ApiResponse::status_message(400, "BAD_REQUEST", other.to_string()),
    }
}

/// Strips password hashes from internal user entries.
fn redact(config_type: ConfigType, value: &Value) -> Value {
    match (config_type, value) {
        (ConfigType::Internalusers, Value::Object(fields)) => {
            let mut fields = fields.clone();
            fields.remove(HASH_KEY);
            Value::Object(fields)
        }
        _ => value.clone(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
