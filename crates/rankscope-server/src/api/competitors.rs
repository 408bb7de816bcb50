use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use rankscope_core::{AnalysisRequest, AnalysisScope, Competitor, ValidationError};
use rankscope_pipeline::CompetitorError;

use super::{json_body, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

/// Detects competitors without running the rest of the analysis.
pub(super) async fn find_competitors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<Competitor>>>, ApiError> {
    let request = json_body(&req_id, body)?;
    if let Err(e) = check_lookup(&request) {
        return Err(ApiError::validation(req_id.0, e.to_string()));
    }

    match state.analyzer.competitors(&request).await {
        Ok(found) => Ok(ApiResponse::new(found, req_id)),
        Err(CompetitorError::NoneFound(target)) => Err(ApiError::new(
            req_id.0,
            "not_found",
            "No competitors found",
            format!("nothing to compare against for {target}"),
        )),
        Err(e @ CompetitorError::Provider(_)) => {
            tracing::error!(error = %e, "competitor lookup failed");
            Err(ApiError::new(
                req_id.0,
                "upstream_error",
                "Failed to detect competitors",
                e.to_string(),
            ))
        }
    }
}

/// Local detection searches maps for the business type in a location; national
/// detection needs the client's domain.
fn check_lookup(request: &AnalysisRequest) -> Result<(), ValidationError> {
    let has_competitors = request.competitors.iter().any(|c| !c.trim().is_empty());
    if has_competitors {
        return Ok(());
    }
    match request.analysis_scope {
        AnalysisScope::Local => {
            if request.business_type.trim().is_empty() {
                return Err(ValidationError::MissingField("businessType"));
            }
            if request.location.trim().is_empty() {
                return Err(ValidationError::MissingField("location"));
            }
        }
        AnalysisScope::National => {
            if request.business_url.trim().is_empty() {
                return Err(ValidationError::MissingField("businessUrl"));
            }
        }
    }
    Ok(())
}
