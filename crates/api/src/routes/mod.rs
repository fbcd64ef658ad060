pub mod health;
pub mod sightings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sightings                 list (GET), create (POST)
/// /sightings/top-plates      per-plate counts (GET)
/// /sightings/tracks          geocoded per-plate paths (GET)
/// /sightings/{id}            single sighting (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/sightings", sightings::router())
}
