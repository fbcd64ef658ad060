use std::sync::Arc;

use platewatch_db::store::SightingStore;

use crate::service::SightingService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the store is behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Sighting operations over the process-wide store.
    pub sightings: SightingService,
}

impl AppState {
    pub fn new(store: Arc<dyn SightingStore>) -> Self {
        Self {
            sightings: SightingService::new(store),
        }
    }
}
