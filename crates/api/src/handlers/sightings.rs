//! Handlers for the sighting endpoints.
//!
//! Store outages never surface as errors here: the service answers with
//! fallback data or an unpersisted acknowledgement, flagged `degraded`.
//! Query strings are taken as raw pairs so that a repeated or malformed
//! parameter is reported against its own name.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use platewatch_core::types::DbId;
use platewatch_db::models::sighting::CreateSightingRequest;

use crate::error::{AppError, AppResult};
use crate::query::SightingQueryParams;
use crate::response::{CreateResponse, DataResponse, SightingListResponse};
use crate::service::Created;
use crate::state::AppState;

type RawQuery = Result<Query<Vec<(String, String)>>, QueryRejection>;

fn query_params(params: RawQuery) -> AppResult<SightingQueryParams> {
    let Query(pairs) = params.map_err(|e| AppError::rejected("query", e.body_text()))?;
    Ok(SightingQueryParams::from_pairs(pairs)?)
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /sightings
///
/// Filtered, paginated sightings, most recent first, with the total match count.
pub async fn list_sightings(
    State(state): State<AppState>,
    params: RawQuery,
) -> AppResult<impl IntoResponse> {
    let query = query_params(params)?.into_query(Utc::now())?;

    let served = state.sightings.query(&query).await?;
    tracing::debug!(
        limit = query.page.limit,
        offset = query.page.offset,
        degraded = served.is_degraded(),
        "Sightings queried",
    );

    Ok(Json(SightingListResponse::from(served)))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /sightings
///
/// 201 with the stored sighting, or 202 with an unpersisted acknowledgement
/// while the store is unavailable.
pub async fn create_sighting(
    State(state): State<AppState>,
    body: Result<Json<CreateSightingRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = body.map_err(|e| AppError::rejected("body", e.body_text()))?;

    let response = match state.sightings.create(request).await? {
        Created::Persisted(sighting) => (
            StatusCode::CREATED,
            Json(CreateResponse {
                data: sighting,
                persisted: true,
                degraded: false,
            }),
        )
            .into_response(),
        Created::Acknowledged(input) => (
            StatusCode::ACCEPTED,
            Json(CreateResponse {
                data: input,
                persisted: false,
                degraded: true,
            }),
        )
            .into_response(),
    };

    Ok(response)
}

// ---------------------------------------------------------------------------
// Single sighting
// ---------------------------------------------------------------------------

/// GET /sightings/{id}
pub async fn get_sighting(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = id.map_err(|e| AppError::rejected("id", e.body_text()))?;

    let served = state.sightings.get(id).await?;
    Ok(Json(DataResponse::from(served)))
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// GET /sightings/top-plates
///
/// Most-sighted plates among sightings matching the filter.
pub async fn top_plates(
    State(state): State<AppState>,
    params: RawQuery,
) -> AppResult<impl IntoResponse> {
    let params = query_params(params)?;
    let filter = params.filter(Utc::now())?;
    let limit = params.top_plates_limit()?;

    let served = state.sightings.top_plates(&filter, limit).await?;
    Ok(Json(DataResponse::from(served)))
}

/// GET /sightings/tracks
///
/// Geocoded sightings matching the filter, grouped into per-plate paths.
pub async fn plate_tracks(
    State(state): State<AppState>,
    params: RawQuery,
) -> AppResult<impl IntoResponse> {
    let filter = query_params(params)?.filter(Utc::now())?;

    let served = state.sightings.tracks(&filter).await?;
    Ok(Json(DataResponse::from(served)))
}
