use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use rankscope_core::AnalysisRequest;
use rankscope_pipeline::{AnalysisOutcome, PipelineError};

use super::{json_body, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

/// Runs a full opportunity analysis.
///
/// Validation failures are rejected before any provider call.
pub(super) async fn create_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalysisOutcome>>, ApiError> {
    let request = json_body(&req_id, body)?;
    if let Err(e) = request.validate() {
        return Err(ApiError::validation(req_id.0, e.to_string()));
    }

    match state.analyzer.analyze(&request).await {
        Ok(outcome) => Ok(ApiResponse::new(outcome, req_id)),
        Err(e) => Err(map_pipeline_error(req_id.0, &e)),
    }
}

fn map_pipeline_error(request_id: String, error: &PipelineError) -> ApiError {
    if let PipelineError::Validation(inner) = error {
        return ApiError::validation(request_id, inner.to_string());
    }
    tracing::error!(error = %error, stage = error.summary(), "analysis failed");
    ApiError::new(request_id, "pipeline_error", error.summary(), error.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::super::test_support::{body_json, post_json, test_app};

    #[tokio::test]
    async fn missing_business_type_is_a_bad_request() {
        let response = test_app()
            .oneshot(post_json(
                "/api/v1/reports",
                &serde_json::json!({
                    "businessUrl": "https://acmeroofing.com",
                    "location": "Austin, Texas",
                    "locationCode": 1_026_201,
                    "customerValue": 800,
                    "analysisScope": "local"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid request");
        assert_eq!(json["details"], "businessType is required");
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let response = test_app()
            .oneshot(post_json("/api/v1/reports", &serde_json::json!({ "customerValue": "lots" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "validation_error");
        assert!(json["details"].is_string());
    }

    #[tokio::test]
    async fn pipeline_failure_is_a_server_error() {
        // The fake provider has no maps listings, so detection finds nobody.
        let response = test_app()
            .oneshot(post_json(
                "/api/v1/reports",
                &serde_json::json!({
                    "businessUrl": "https://acmeroofing.com",
                    "businessType": "Roofing",
                    "location": "Nowhere, Texas",
                    "locationCode": 1_026_201,
                    "customerValue": 800,
                    "analysisScope": "local"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to detect competitors");
        assert!(json["details"].as_str().unwrap().contains("no competitors found"));
    }
}
