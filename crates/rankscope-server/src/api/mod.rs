mod competitors;
mod locations;
mod reports;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use rankscope_pipeline::{Analyzer, LocationResolver};

use crate::middleware::{
    enforce_rate_limit, request_id, RateLimitState, RequestId, REQUEST_ID_HEADER,
};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub resolver: Arc<LocationResolver>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Error envelope: a short `error` summary, the underlying `details`, and
/// location suggestions when there are any.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: &'static str,
    pub error: String,
    pub details: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    version: &'static str,
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
    pub(super) fn new(data: T, req_id: RequestId) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(req_id.0),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: &'static str,
        error: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code,
            error: error.into(),
            details: details.into(),
            suggestions: Vec::new(),
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub fn validation(request_id: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(request_id, "validation_error", "Invalid request", details)
    }

    #[must_use]
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Unwraps a JSON body, turning a malformed one into a 400 envelope.
pub(super) fn json_body<T>(
    req_id: &RequestId,
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::validation(req_id.0.clone(), rejection.body_text()))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

fn analysis_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/reports", post(reports::create_report))
        .route("/api/v1/competitors", post(competitors::find_competitors))
        .route("/api/v1/locations/resolve", post(locations::resolve_location))
        .route("/api/v1/locations/states", get(locations::list_states))
        .route("/api/v1/locations/cities", get(locations::list_cities))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

#[allow(deprecated)]
fn timeout_layer(request_timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::new(request_timeout)
}

pub fn build_app(state: AppState, rate_limit: RateLimitState, request_timeout: Duration) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(analysis_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(timeout_layer(request_timeout)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    ApiResponse::new(
        HealthData {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
        req_id,
    )
}

#[cfg(test)]
mod tests {
    use super::test_support::{body_json, get_request, test_app};
    use super::*;
    use tower::ServiceExt;

    #[test]
    fn validation_error_maps_to_bad_request() {
        let response = ApiError::validation("req-1", "businessType is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_error_maps_to_bad_gateway() {
        let response =
            ApiError::new("req-1", "upstream_error", "Location lookup failed", "timeout").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn empty_suggestions_are_omitted() {
        let json = serde_json::to_value(ApiError::validation("req-1", "bad")).unwrap();
        assert!(json.get("suggestions").is_none());
        assert_eq!(json["error"], "Invalid request");
        assert_eq!(json["details"], "bad");
    }

    #[tokio::test]
    async fn health_reports_ok_and_echoes_request_id() {
        let response = test_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/v1/health")
                    .header(REQUEST_ID_HEADER, "req-abc")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-abc");
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["meta"]["request_id"], "req-abc");
    }

    #[tokio::test]
    async fn generated_request_id_is_returned() {
        let response = test_app().oneshot(get_request("/api/v1/health")).await.unwrap();
        let header = response.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
        assert!(uuid::Uuid::parse_str(&header).is_ok());
    }

    #[tokio::test]
    async fn analysis_routes_are_rate_limited() {
        let app = super::test_support::test_app_with_limit(1);

        let first = app
            .clone()
            .oneshot(get_request("/api/v1/locations/states"))
            .await
            .unwrap();
        let second = app
            .clone()
            .oneshot(get_request("/api/v1/locations/states"))
            .await
            .unwrap();
        let health = app.oneshot(get_request("/api/v1/health")).await.unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(health.status(), StatusCode::OK);
    }
}
