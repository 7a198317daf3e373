//! # parcel-api
//!
//! HTTP API for package tracking lookups and delivery evidence uploads.
//!
//! The router is built by [`router`] from an [`AppState`] and a
//! [`ServerConfig`]; the `parcel-api` binary wires it to a TCP listener.

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Router,
};
use parcel_core::TrackingRepository;
use parcel_store::EvidenceStore;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use uuid::Uuid;

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub tracking: Arc<dyn TrackingRepository>,
    pub evidence: Arc<EvidenceStore>,
}

impl AppState {
    pub fn new(tracking: impl TrackingRepository + 'static, evidence: EvidenceStore) -> Self {
        Self {
            tracking: Arc::new(tracking),
            evidence: Arc::new(evidence),
        }
    }
}

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router with all middleware attached.
///
/// Every API route is reachable with and without a trailing slash.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    use handlers::{evidence, health, tracking};

    let body_limit = config.request_body_limit();

    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/", get(health::health_check))
        .route(
            "/api/v1/tracking/:tracking_number",
            get(tracking::get_tracking_info),
        )
        .route(
            "/api/v1/tracking/:tracking_number/",
            get(tracking::get_tracking_info),
        )
        .route(
            "/api/v1/tracking/:tracking_number/evidence",
            get(evidence::list_evidence).post(evidence::upload_evidence),
        )
        .route(
            "/api/v1/tracking/:tracking_number/evidence/",
            get(evidence::list_evidence).post(evidence::upload_evidence),
        )
        .route(
            "/api/v1/tracking/:tracking_number/evidence/:evidence_id",
            delete(evidence::delete_evidence),
        )
        .route(
            "/api/v1/tracking/:tracking_number/evidence/:evidence_id/",
            delete(evidence::delete_evidence),
        )
        .fallback(route_not_found)
        .with_state(state);

    // Serve stored evidence files back at their advertised URLs
    if let Some(mount) = config.evidence_mount_path() {
        let evidence_root = config.media_root.join(parcel_core::defaults::EVIDENCE_DIR);
        app = app.nest_service(&mount, ServeDir::new(evidence_root));
    }

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(body_limit))
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

fn handle_panic(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    ApiError::Internal("Internal server error".to_string()).into_response()
}
