//! HTTP router construction.
//!
//! Used by `main` and by the integration tests to build the Axum app.

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::indexer::{IndexerRegistry, torznab};

/// Build the full Axum router: health, one Torznab route per registered
/// backend, and `/api` for the default backend.
pub fn build_app(registry: &IndexerRegistry) -> Router {
    Router::new()
        .merge(api::health::router())
        .merge(torznab::router(registry))
        .layer(TraceLayer::new_for_http())
}
