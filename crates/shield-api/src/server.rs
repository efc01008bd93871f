// crates/shield-api/src/server.rs
// ============================================================================
// Module: Shield HTTP Server
// Description: axum transport for the management API.
// Purpose: Authenticate HTTP callers and route requests to the management API.
// Dependencies: shield-config, shield-core, shield-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! The server binds one TCP listener and forwards every request under the
//! management prefix to [`ManagementApi`]. Callers are identified from
//! proxy-asserted headers; unknown callers receive 401 before any store
//! access. Security posture: the server must sit behind a TLS-terminating
//! proxy that strips client-supplied identity headers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::any;
use serde_json::Value;
use serde_json::json;
use shield_config::AuditSinkKind;
use shield_config::ServerAuditConfig;
use shield_config::ShieldConfig;
use shield_config::StoreConfig;
use shield_config::load_seed;
use shield_core::Clock;
use shield_core::ClusterState;
use shield_core::ConfigurationDocumentValidators;
use shield_core::ConfigurationStore;
use shield_core::HttpMethod;
use shield_core::InMemoryConfigurationStore;
use shield_core::LicenseUpdatePipeline;
use shield_core::RestApiPrivilegesEvaluator;
use shield_core::SystemClock;
use shield_store_sqlite::SqliteConfigurationStore;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::api::ApiRequest;
use crate::api::ApiResponse;
use crate::api::ManagementApi;
use crate::api::ManagementApiParams;
use crate::api::ResponseBody;
use crate::audit::ApiAuditEvent;
use crate::audit::ApiAuditEventParams;
use crate::audit::AuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::auth::DN_HEADER;
use crate::auth::IdentityHeaders;
use crate::auth::PrincipalDirectory;
use crate::auth::REMOTE_HOST_HEADER;
use crate::auth::USER_HEADER;
use crate::roles::RolesMappingResolver;
use crate::routes::API_PREFIX;
use crate::routes::Route;

// ============================================================================
// SECTION: Server
// ============================================================================

/// Optional collaborator overrides used when assembling a server.
#[derive(Default)]
pub struct ServerOverrides {
    /// Calendar source; defaults to the system clock.
    pub clock: Option<Arc<dyn Clock>>,
    /// Audit sink; defaults to the configured sink.
    pub audit: Option<Arc<dyn AuditSink>>,
}

/// Shield management HTTP server.
pub struct ShieldServer {
    /// Server configuration.
    config: ShieldConfig,
    /// Management API.
    api: ManagementApi,
    /// Configured principals.
    directory: PrincipalDirectory,
}

impl ShieldServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when initialization fails.
    pub fn from_config(config: ShieldConfig) -> Result<Self, ServerError> {
        Self::from_config_with(config, ServerOverrides::default())
    }

    /// Builds a server from configuration with collaborator overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when initialization fails.
    pub fn from_config_with(
        config: ShieldConfig,
        overrides: ServerOverrides,
    ) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = build_store(&config.store)?;
        let permissions =
            config.permission_map().map_err(|err| ServerError::Config(err.to_string()))?;
        let privileges = RestApiPrivilegesEvaluator::new(
            Arc::new(permissions),
            Arc::new(config.admin_allowlist()),
        );
        let cluster: Arc<dyn ClusterState> =
            Arc::new(config.cluster_state().map_err(|err| ServerError::Config(err.to_string()))?);
        let decoder =
            config.license_decoder().map_err(|err| ServerError::Config(err.to_string()))?;
        let clock = overrides.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let validators = Arc::new(ConfigurationDocumentValidators::new());
        let license = LicenseUpdatePipeline::new(
            Arc::clone(&store),
            Arc::new(decoder),
            Arc::clone(&cluster),
            clock,
            Arc::clone(&validators),
            config.license.trial_days,
        );
        let audit = match overrides.audit {
            Some(audit) => audit,
            None => build_audit_sink(&config.server.audit)?,
        };
        let api = ManagementApi::new(ManagementApiParams {
            store: Arc::clone(&store),
            privileges,
            resolver: Arc::new(RolesMappingResolver::new(store)),
            license,
            cluster,
            validators,
            audit,
        });
        let directory = PrincipalDirectory::new(&config.principals);
        Ok(Self {
            config,
            api,
            directory,
        })
    }

    /// Returns the management API.
    #[must_use]
    pub const fn api(&self) -> &ManagementApi {
        &self.api
    }

    /// Binds the configured address and serves requests.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr = self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_on(listener).await
    }

    /// Serves requests on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the server fails.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), ServerError> {
        let max_body_bytes = self.config.server.max_body_bytes;
        let state = Arc::new(ServerState {
            api: self.api,
            directory: self.directory,
            max_body_bytes,
        });
        let app = Router::new()
            .route(&format!("{API_PREFIX}/{{*rest}}"), any(handle_http))
            .layer(DefaultBodyLimit::max(max_body_bytes.saturating_add(1)))
            .with_state(state);
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Builds the configuration store, provisioning it from the seed directory when empty.
///
/// # Errors
///
/// Returns [`ServerError`] when the store cannot be opened or seeded.
pub fn build_store(config: &StoreConfig) -> Result<Arc<dyn ConfigurationStore>, ServerError> {
    let seed = config
        .seed_dir
        .as_deref()
        .map(load_seed)
        .transpose()
        .map_err(|err| ServerError::Init(err.to_string()))?;
    let Some(sqlite) = config.sqlite_config() else {
        let store = seed.map_or_else(InMemoryConfigurationStore::new, InMemoryConfigurationStore::with_seed);
        return Ok(Arc::new(store));
    };
    let store =
        SqliteConfigurationStore::new(&sqlite).map_err(|err| ServerError::Init(err.to_string()))?;
    if let Some(seed) = seed
        && !store.is_initialized().map_err(|err| ServerError::Init(err.to_string()))?
    {
        store.initialize(seed).map_err(|err| ServerError::Init(err.to_string()))?;
    }
    Ok(Arc::new(store))
}

/// Builds the configured audit sink.
fn build_audit_sink(config: &ServerAuditConfig) -> Result<Arc<dyn AuditSink>, ServerError> {
    match (config.sink, &config.path) {
        (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
        (AuditSinkKind::File, Some(path)) => FileAuditSink::new(std::path::Path::new(path))
            .map(|sink| Arc::new(sink) as Arc<dyn AuditSink>)
            .map_err(|err| ServerError::Init(format!("audit log open failed: {err}"))),
        (AuditSinkKind::File, None) => {
            Err(ServerError::Config("file audit sink requires audit.path".to_string()))
        }
    }
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Shared server state for HTTP handlers.
struct ServerState {
    /// Management API.
    api: ManagementApi,
    /// Configured principals.
    directory: PrincipalDirectory,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

/// Handles one management API request.
async fn handle_http(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let path = uri.path();
    if bytes.len() > state.max_body_bytes {
        return rejection(&state, path, "OTHER", StatusCode::PAYLOAD_TOO_LARGE, json!({
            "status": "PAYLOAD_TOO_LARGE",
            "reason": "request body too large",
        }));
    }
    let Some(method) = HttpMethod::parse(method.as_str()) else {
        return rejection(&state, path, "OTHER", StatusCode::METHOD_NOT_ALLOWED, json!({
            "status": "METHOD_NOT_ALLOWED",
            "reason": format!("Method {method} not supported for this action."),
        }));
    };
    let identity = identity_headers(peer, &headers);
    let principal = match state.directory.authenticate(&identity) {
        Ok(principal) => principal,
        Err(err) => {
            return rejection(&state, path, method.as_str(), StatusCode::UNAUTHORIZED, json!({
                "status": "UNAUTHORIZED",
                "reason": err.to_string(),
            }));
        }
    };
    let request = ApiRequest {
        method,
        path,
        body: if bytes.is_empty() { None } else { Some(bytes.as_ref()) },
        principal: &principal,
    };
    into_response(handle_with_blocking(&state.api, &request))
}

/// Records and renders a request rejected before reaching the management API.
fn rejection(
    state: &ServerState,
    path: &str,
    method: &'static str,
    status: StatusCode,
    body: Value,
) -> Response {
    state.api.audit().record_request(&ApiAuditEvent::new(ApiAuditEventParams {
        method,
        path: path.to_string(),
        endpoint: Route::parse(path).as_ref().map(Route::endpoint),
        principal: None,
        status: status.as_u16(),
    }));
    (status, axum::Json(body)).into_response()
}

/// Runs the management API, shifting to a blocking context when available.
fn handle_with_blocking(api: &ManagementApi, request: &ApiRequest<'_>) -> ApiResponse {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| api.handle(request))
        }
        _ => api.handle(request),
    }
}

/// Extracts identity assertions, falling back to the peer address for the host.
fn identity_headers(peer: SocketAddr, headers: &HeaderMap) -> IdentityHeaders {
    let header = |name: &str| {
        headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
    };
    IdentityHeaders {
        user: header(USER_HEADER),
        distinguished_name: header(DN_HEADER),
        remote_host: header(REMOTE_HOST_HEADER).or_else(|| Some(peer.ip().to_string())),
    }
}

/// Converts a management API response into an HTTP response.
fn into_response(response: ApiResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match response.body {
        ResponseBody::Json(value) => (status, axum::Json(value)).into_response(),
        ResponseBody::Text(text) => (status, text).into_response(),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization failures.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
