//! Torznab REST API
//!
//! Exposes every registered backend through the Torznab protocol so that
//! clients like Sonarr and Radarr can use it as an indexer source.
//!
//! # Endpoints
//!
//! - `GET /indexer/{id}/api?t=caps` - Get indexer capabilities
//! - `GET /indexer/{id}/api?t=tvsearch&q=...&season=...&episode=...` - TV search
//! - `GET /indexer/{id}/api?t=movie&q=...` - Movie search
//! - `GET /api?...` - Same as above for the default backend

pub mod request;
pub mod response;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};

use crate::indexer::{Indexer, IndexerRegistry};
use request::{Action, SearchKind, TorznabRequest};
use response::{TorznabError, TorznabResponse};

/// Handler state: the backend bound to the route
#[derive(Clone)]
pub struct TorznabState {
    pub indexer: Arc<dyn Indexer>,
}

/// Create the Torznab router
///
/// Only registered backends get a route. The default backend is also served
/// at `/api`.
pub fn router(registry: &IndexerRegistry) -> Router {
    let mut router = Router::new();

    for (id, indexer) in registry.iter() {
        router = router.merge(indexer_routes(&id.api_path(), indexer.clone()));
    }

    if let Some(indexer) = registry.default_indexer() {
        router = router.merge(indexer_routes("/api", indexer));
    }

    router
}

fn indexer_routes(path: &str, indexer: Arc<dyn Indexer>) -> Router {
    Router::new()
        .route(path, get(torznab_handler))
        .with_state(TorznabState { indexer })
}

/// Main Torznab endpoint handler
async fn torznab_handler(
    State(state): State<TorznabState>,
    Query(params): Query<TorznabRequest>,
) -> Result<TorznabResponse, TorznabError> {
    handle(state.indexer.as_ref(), &params).await
}

/// Answer one Torznab request against a backend
///
/// Request-shape failures are detected before the backend is contacted.
pub async fn handle(
    indexer: &dyn Indexer,
    params: &TorznabRequest,
) -> Result<TorznabResponse, TorznabError> {
    match params.action() {
        Action::Capabilities => {
            tracing::debug!(indexer_id = indexer.id(), "Torznab capabilities request");

            let caps = indexer.capabilities().await.map_err(|e| {
                // Capability failures are never surfaced as throttled/unauthorized
                TorznabError::Indexer(anyhow::Error::new(e).context("Failed to get capabilities"))
            })?;

            Ok(TorznabResponse::capabilities(indexer.name(), &caps)?)
        }
        Action::TvSearch => search(indexer, params, SearchKind::Tv).await,
        Action::MovieSearch => search(indexer, params, SearchKind::Movie).await,
        Action::Invalid(t) => Err(TorznabError::InvalidAction(t)),
        Action::Missing => Err(TorznabError::MissingAction),
    }
}

async fn search(
    indexer: &dyn Indexer,
    params: &TorznabRequest,
    kind: SearchKind,
) -> Result<TorznabResponse, TorznabError> {
    let request = params.to_search_request(kind)?;

    tracing::debug!(
        indexer_id = indexer.id(),
        kind = %kind,
        query = %request.query,
        offset = request.offset,
        limit = request.limit,
        categories = ?request.categories,
        "Torznab search request"
    );

    let releases = indexer.search(&request).await?;

    tracing::debug!(
        indexer_id = indexer.id(),
        count = releases.len(),
        "Torznab search completed"
    );

    Ok(TorznabResponse::search_results(
        indexer.name(),
        indexer.description(),
        indexer.site_link(),
        &releases,
    )?)
}
