//! HTTP layer for the numerology report service.
//!
//! This crate wraps the pure calculation pipeline from `numerology-core` in
//! a single POST endpoint, an API-key gate, and a per-client rate limiter.
//! The core never sees HTTP status codes, headers, or limiter state; every
//! error-shaped outcome the service can produce is owned here, while the
//! calculation itself is a total function that cannot fail.

pub mod auth;
pub mod error;
pub mod rate_limit;

pub use auth::{ApiKeyEntry, ApiKeyStore, JsonFileKeyStore, KeyStatus, API_KEY_HEADER};
pub use error::{Result, ServerError};
pub use rate_limit::ClientRateLimiter;

// Re-export the wire types so embedders only need this crate.
pub use numerology_core::{
    build_report, NumerologyReport, NumerologyRequest, NumerologyResponse, ReportItem,
};

use axum::extract::Json as AxumJson;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::{middleware, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

/// Configuration for the numerology server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Enable CORS
    pub enable_cors: bool,
    /// CORS allowed origins (if None, allows any origin)
    pub cors_origins: Option<Vec<String>>,
    /// Enable request logging
    pub enable_logging: bool,
    /// Per-client request quota for the report endpoint
    pub rate_limit_per_minute: NonZeroU32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".parse().unwrap(),
            enable_cors: true,
            cors_origins: None, // Allow any origin
            enable_logging: true,
            rate_limit_per_minute: NonZeroU32::new(10).unwrap(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Parse and set the bind address from a string.
    pub fn with_bind_addr_str(mut self, addr: &str) -> Result<Self> {
        self.bind_addr = addr
            .parse()
            .map_err(|e| ServerError::config_error(format!("Invalid bind address: {}", e)))?;
        Ok(self)
    }

    /// Enable or disable CORS.
    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// Set allowed CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request logging.
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    /// Set the per-client request quota.
    pub fn with_rate_limit_per_minute(mut self, requests: NonZeroU32) -> Self {
        self.rate_limit_per_minute = requests;
        self
    }
}

/// Handler for the /numerology POST endpoint.
///
/// The `Json` extractor has already rejected malformed bodies and
/// unparseable dates by the time this runs; the only validation left is the
/// input contract's non-empty name requirement. Everything after that is the
/// pure pipeline, which cannot fail.
async fn numerology_handler(
    AxumJson(request): AxumJson<NumerologyRequest>,
) -> std::result::Result<Json<NumerologyResponse>, (StatusCode, Json<serde_json::Value>)> {
    if request.full_name.trim().is_empty() {
        log::warn!("Rejected numerology request with empty full_name");
        let err = ServerError::invalid_request("full_name must not be empty");
        return Err((err.status_code(), err.body()));
    }

    log::debug!(
        "Computing numerology report for birth date {}",
        request.birth_date
    );
    Ok(Json(build_report(request)))
}

/// The main numerology HTTP server.
pub struct NumerologyServer<S: ApiKeyStore> {
    key_store: S,
    config: ServerConfig,
}

impl<S: ApiKeyStore> NumerologyServer<S> {
    /// Create a new server with the given key store and default configuration.
    pub fn new(key_store: S) -> Self {
        Self {
            key_store,
            config: ServerConfig::default(),
        }
    }

    /// Create a new server with custom configuration.
    pub fn with_config(key_store: S, config: ServerConfig) -> Self {
        Self { key_store, config }
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Update the server configuration.
    pub fn set_config(&mut self, config: ServerConfig) {
        self.config = config;
    }

    /// Build the Axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let limiter = ClientRateLimiter::per_minute(self.config.rate_limit_per_minute);

        // The report endpoint sits behind the key gate and the limiter; the
        // gate runs first so unauthenticated probes never consume quota.
        let report = Router::new()
            .route("/numerology", post(numerology_handler))
            .layer(middleware::from_fn_with_state(
                limiter,
                rate_limit::rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.key_store.clone(),
                auth::api_key_middleware::<S>,
            ));

        let mut router = Router::new()
            // Liveness probe, outside the key gate
            .route("/health", get(|| async {
                Json(HealthResponse {
                    status: "healthy".to_string(),
                    timestamp: chrono::Utc::now(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                })
            }))
            .merge(report);

        // Add middleware layers
        if self.config.enable_logging {
            router =
                router.layer(middleware::from_fn(
                    |request: axum::http::Request<axum::body::Body>,
                     next: axum::middleware::Next| async {
                        let request_id = uuid::Uuid::new_v4().to_string();
                        let method = request.method().clone();
                        let uri = request.uri().clone();

                        log::info!("Request {} {} {}", request_id, method, uri);

                        let start = std::time::Instant::now();
                        let response = next.run(request).await;
                        let duration = start.elapsed();

                        log::info!(
                            "Response {} {} completed in {:?}",
                            request_id,
                            response.status(),
                            duration
                        );

                        response
                    },
                ));
        }

        router = router.layer(TraceLayer::new_for_http());

        // Add CORS layer if enabled
        if self.config.enable_cors {
            let cors_layer = if let Some(ref origins) = self.config.cors_origins {
                let origins: std::result::Result<Vec<_>, _> =
                    origins.iter().map(|s| s.parse()).collect();
                match origins {
                    Ok(origins) => CorsLayer::new()
                        .allow_origin(origins)
                        .allow_methods(Any)
                        .allow_headers(Any),
                    Err(_) => CorsLayer::permissive(),
                }
            } else {
                CorsLayer::permissive()
            };
            router = router.layer(cors_layer);
        }

        router
    }

    /// Start the server and listen for connections.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let router = self.build_router();
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(|e| {
                ServerError::config_error(format!(
                    "Failed to bind to {}: {}",
                    self.config.bind_addr, e
                ))
            })?;

        log::info!("numerology server starting on {}", self.config.bind_addr);
        log::info!("Health check: http://{}/health", self.config.bind_addr);
        log::info!("Report endpoint: http://{}/numerology", self.config.bind_addr);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ServerError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server will shut down when the provided shutdown signal is received.
    pub async fn serve_with_shutdown<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(|e| {
                ServerError::config_error(format!(
                    "Failed to bind to {}: {}",
                    self.config.bind_addr, e
                ))
            })?;

        log::info!(
            "numerology server starting on {} with graceful shutdown",
            self.config.bind_addr
        );

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServerError::internal(format!("Server error: {}", e)))?;

        log::info!("numerology server shut down gracefully");
        Ok(())
    }
}

/// Utility function to create a shutdown signal from Ctrl+C.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            log::info!("Received SIGTERM, shutting down...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;
    use std::io::Write;
    use tower::ServiceExt; // for `oneshot`

    const ACTIVE_KEY: &str = "test-key-123";
    const REVOKED_KEY: &str = "old-key-456";

    fn key_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let keys = json!({
            ACTIVE_KEY: {"status": "active"},
            REVOKED_KEY: {"status": "revoked"},
        });
        file.write_all(keys.to_string().as_bytes()).unwrap();
        file
    }

    fn test_router(key_path: &std::path::Path, config: ServerConfig) -> Router {
        let store = JsonFileKeyStore::new(key_path);
        NumerologyServer::with_config(store, config.with_logging(false)).build_router()
    }

    fn report_request(api_key: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/numerology")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn reference_body() -> serde_json::Value {
        json!({"full_name": "Melih Boyacı", "birth_date": "2003-11-26"})
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_needs_no_key() {
        let keys = key_file();
        let app = test_router(keys.path(), ServerConfig::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn missing_api_key_is_unauthorized() {
        let keys = key_file();
        let app = test_router(keys.path(), ServerConfig::default());

        let response = app.oneshot(report_request(None, reference_body())).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "missing_api_key");
    }

    #[tokio::test]
    async fn unknown_api_key_is_forbidden() {
        let keys = key_file();
        let app = test_router(keys.path(), ServerConfig::default());

        let response = app
            .oneshot(report_request(Some("no-such-key"), reference_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"], "forbidden_api_key");
    }

    #[tokio::test]
    async fn revoked_api_key_is_forbidden() {
        let keys = key_file();
        let app = test_router(keys.path(), ServerConfig::default());

        let response = app
            .oneshot(report_request(Some(REVOKED_KEY), reference_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn valid_request_returns_the_report() {
        let keys = key_file();
        let app = test_router(keys.path(), ServerConfig::default());

        let response = app
            .oneshot(report_request(Some(ACTIVE_KEY), reference_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["request_data"]["full_name"], "Melih Boyacı");
        assert_eq!(body["request_data"]["birth_date"], "2003-11-26");
        assert_eq!(body["numerology_report"]["life_path_number"]["number"], 6);
        assert_eq!(body["numerology_report"]["name_number"]["number"], 3);
        assert!(body["numerology_report"]["life_path_number"]["interpretation"]
            .as_str()
            .unwrap()
            .contains("Responsibility"));
    }

    #[tokio::test]
    async fn identical_requests_return_identical_bodies() {
        let keys = key_file();
        let app = test_router(keys.path(), ServerConfig::default());

        let first = app
            .clone()
            .oneshot(report_request(Some(ACTIVE_KEY), reference_body()))
            .await
            .unwrap();
        let second = app
            .oneshot(report_request(Some(ACTIVE_KEY), reference_body()))
            .await
            .unwrap();

        assert_eq!(body_json(first).await, body_json(second).await);
    }

    #[tokio::test]
    async fn unparseable_date_is_a_client_error() {
        let keys = key_file();
        let app = test_router(keys.path(), ServerConfig::default());

        let body = json!({"full_name": "Melih Boyacı", "birth_date": "26/11/2003"});
        let response = app
            .oneshot(report_request(Some(ACTIVE_KEY), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn empty_full_name_is_a_bad_request() {
        let keys = key_file();
        let app = test_router(keys.path(), ServerConfig::default());

        let body = json!({"full_name": "   ", "birth_date": "2003-11-26"});
        let response = app
            .oneshot(report_request(Some(ACTIVE_KEY), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_request");
    }

    #[tokio::test]
    async fn non_alphabetic_name_gets_the_fallback_report() {
        let keys = key_file();
        let app = test_router(keys.path(), ServerConfig::default());

        let body = json!({"full_name": "1234", "birth_date": "2003-11-26"});
        let response = app
            .oneshot(report_request(Some(ACTIVE_KEY), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["numerology_report"]["name_number"]["number"], 0);
        assert_eq!(
            body["numerology_report"]["name_number"]["interpretation"],
            numerology_core::DEFAULT_INTERPRETATION
        );
    }

    #[tokio::test]
    async fn quota_exhaustion_returns_too_many_requests() {
        let keys = key_file();
        let config = ServerConfig::default()
            .with_rate_limit_per_minute(NonZeroU32::new(2).unwrap());
        let app = test_router(keys.path(), config);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(report_request(Some(ACTIVE_KEY), reference_body()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(report_request(Some(ACTIVE_KEY), reference_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        let body = body_json(response).await;
        assert_eq!(body["error"], "rate_limit_exceeded");
    }

    #[tokio::test]
    async fn unauthenticated_probes_do_not_consume_quota() {
        let keys = key_file();
        let config = ServerConfig::default()
            .with_rate_limit_per_minute(NonZeroU32::new(1).unwrap());
        let app = test_router(keys.path(), config);

        // Gate rejections happen before the limiter sees the request.
        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(report_request(None, reference_body()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        let response = app
            .oneshot(report_request(Some(ACTIVE_KEY), reference_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
