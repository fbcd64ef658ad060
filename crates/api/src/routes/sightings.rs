//! Route definitions for plate sightings.

use axum::routing::get;
use axum::Router;

use crate::handlers::sightings;
use crate::state::AppState;

/// Sighting routes mounted at `/sightings`.
///
/// ```text
/// GET  /              -> list_sightings
/// POST /              -> create_sighting
/// GET  /top-plates    -> top_plates
/// GET  /tracks        -> plate_tracks
/// GET  /{id}          -> get_sighting
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(sightings::list_sightings).post(sightings::create_sighting),
        )
        .route("/top-plates", get(sightings::top_plates))
        .route("/tracks", get(sightings::plate_tracks))
        .route("/{id}", get(sightings::get_sighting))
}
