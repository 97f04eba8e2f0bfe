mod sierra;

use std::sync::Arc;

use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use sierra_core::{AppConfig, Clock, InventorySummary, NormalizedProduct, TtlCache};
use sierra_fetch::{DirectFetcher, PageFetcher};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// PDP HTML strategy (direct or rendering proxy).
    pub page_fetcher: Arc<PageFetcher>,
    /// The inventory API flow is always direct; it needs the origin's
    /// session cookies, which the rendering proxy does not expose.
    pub inventory_fetcher: Arc<DirectFetcher>,
    pub product_cache: Arc<TtlCache<NormalizedProduct>>,
    pub inventory_cache: Arc<TtlCache<InventorySummary>>,
    pub clock: Arc<dyn Clock>,
}

/// Error surface: always `{"error": "..."}`, status picked by the
/// constructor. No partial or ambiguous response shapes.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/sierra", get(sierra::lookup).options(preflight))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

/// Bare CORS preflight: 204, no body.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
