use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use rankscope_core::LocationEntry;
use rankscope_pipeline::{LocationError, LocationMatch};

use super::{json_body, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct ResolveLocationBody {
    #[serde(default)]
    state: String,
    #[serde(default)]
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CitiesQuery {
    state: Option<String>,
}

pub(super) async fn resolve_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ResolveLocationBody>, JsonRejection>,
) -> Result<Json<ApiResponse<LocationMatch>>, ApiError> {
    let body = json_body(&req_id, body)?;
    if body.state.trim().is_empty() {
        return Err(ApiError::validation(req_id.0, "state is required"));
    }
    let city = body.city.as_deref().map(str::trim).filter(|c| !c.is_empty());

    match state.resolver.resolve(&body.state, city).await {
        Ok(found) => Ok(ApiResponse::new(found, req_id)),
        Err(e) => Err(map_location_error(req_id.0, e)),
    }
}

pub(super) async fn list_states(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<LocationEntry>>>, ApiError> {
    match state.resolver.states().await {
        Ok(states) => Ok(ApiResponse::new(states, req_id)),
        Err(e) => Err(map_location_error(req_id.0, e)),
    }
}

/// Cities of a state by exact name; an unknown state yields an empty list.
pub(super) async fn list_cities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CitiesQuery>,
) -> Result<Json<ApiResponse<Vec<LocationEntry>>>, ApiError> {
    let Some(state_name) = query.state.filter(|s| !s.trim().is_empty()) else {
        return Err(ApiError::validation(req_id.0, "state is required"));
    };

    match state.resolver.cities(&state_name).await {
        Ok(cities) => Ok(ApiResponse::new(cities, req_id)),
        Err(e) => Err(map_location_error(req_id.0, e)),
    }
}

fn map_location_error(request_id: String, error: LocationError) -> ApiError {
    match error {
        LocationError::StateNotFound { query, suggestions } => ApiError::new(
            request_id,
            "not_found",
            "State not found",
            format!("no state matches \"{query}\""),
        )
        .with_suggestions(suggestions),
        other => {
            tracing::error!(error = %other, "location lookup failed");
            ApiError::new(
                request_id,
                "upstream_error",
                "Location lookup failed",
                other.to_string(),
            )
        }
    }
}
