//! # REST API
//!
//! Builds the axum router that exposes the oracle's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                   | Description                          |
//! |--------|------------------------|--------------------------------------|
//! | POST   | `/api/:source/verify`  | Fetch evidence and sign attestation  |
//! | GET    | `/health`              | Liveness probe with oracle address   |
//! | GET    | `/metrics`             | Prometheus text exposition           |
//!
//! Only the verify route sits behind the rate limiter.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRef, Path, State},
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use notabot_protocol::config::MAX_PAYLOAD_BYTES;
use notabot_protocol::{Address, Source};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::{ApiError, OracleError};
use crate::metrics::{metrics_handler, SharedMetrics};
use crate::rate_limit::{self, RateLimiter};
use crate::service::{OracleService, SignedVerification};

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OracleService>,
    pub metrics: SharedMetrics,
    pub limiter: Arc<RateLimiter>,
    /// Expose raw error causes in responses.
    pub dev_mode: bool,
}

impl FromRef<AppState> for SharedMetrics {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.metrics)
    }
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    if allowed_origins.is_empty() {
        return base.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

/// Builds the full axum [`Router`]. An empty `allowed_origins` allows any
/// origin.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let verify = Router::new()
        .route("/api/:source/verify", post(verify_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ));

    Router::new()
        .merge(verify)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default, alias = "userAddress")]
    pub subject: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub data: SignedVerification,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub oracle_address: Address,
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn parse_subject(body: Result<Json<VerifyRequest>, JsonRejection>) -> Result<Address, OracleError> {
    let Json(body) = body.map_err(|r| OracleError::InvalidInput(r.body_text()))?;
    let raw = body
        .subject
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| OracleError::InvalidInput("subject is required".into()))?;
    let subject: Address = raw
        .trim()
        .parse()
        .map_err(|e| OracleError::InvalidAddress(format!("{raw}: {e}")))?;
    if subject.is_zero() {
        return Err(OracleError::InvalidAddress("zero address".into()));
    }
    Ok(subject)
}

async fn verify_handler(
    State(state): State<AppState>,
    Path(source): Path<String>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let reject = |e: OracleError| {
        state
            .metrics
            .rejections_total
            .with_label_values(&[e.code().as_str()])
            .inc();
        warn!(%source, code = e.code().as_str(), error = %e, "verify request rejected");
        ApiError::new(e, state.dev_mode)
    };

    let source: Source = source
        .parse()
        .map_err(|_| reject(OracleError::UnknownSource(source.clone())))?;
    state
        .metrics
        .verify_requests_total
        .with_label_values(&[source.name()])
        .inc();

    let subject = parse_subject(body).map_err(reject)?;
    let data = state.service.verify(source, subject).await.map_err(reject)?;

    Ok(Json(VerifyResponse {
        success: true,
        data,
    }))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
            oracle_address: state.service.oracle_address(),
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}
