mod scraper;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use mlscrape_scraper::{Marketplace, ScraperError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

/// Settings for the self load-test streams.
#[derive(Debug, Clone)]
pub struct LoadTestSettings {
    /// Streams answer 404 unless enabled.
    pub enabled: bool,
    /// Origin the load-test requests are sent to, without trailing slash.
    pub base_url: String,
    pub requests: usize,
    /// Direct (unproxied) client for calling back into this server.
    pub client: reqwest::Client,
}

#[derive(Clone)]
pub struct AppState {
    pub marketplace: Arc<Marketplace>,
    pub load_test: LoadTestSettings,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct StatusData {
    status: &'static str,
    message: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Invalid input becomes `validation_error`; anything else is logged and
/// reported as `scrape_failed`.
pub(super) fn map_scrape_error(request_id: String, error: &ScraperError) -> ApiError {
    if error.is_validation() {
        return ApiError::new(request_id, "validation_error", error.to_string());
    }
    tracing::error!(error = %error, "scrape failed");
    ApiError::new(request_id, "scrape_failed", error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/scraper/offers", get(scraper::scrape_offers))
        .route("/api/scraper/search", get(scraper::scrape_search))
        .route("/api/scraper/product", post(scraper::scrape_product))
        .route(
            "/api/scraper/load-test-stream/offers",
            get(load_test::offers_stream),
        )
        .route(
            "/api/scraper/load-test-stream/search",
            get(load_test::search_stream),
        )
        .route(
            "/api/scraper/load-test-stream/product",
            post(load_test::product_stream),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn root(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse::new(
        req_id.0,
        StatusData {
            status: "ok",
            message: "API is running",
        },
    ))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
