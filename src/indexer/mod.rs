//! Torrent indexer module
//!
//! Every backend sits behind the [`Indexer`] trait so the Torznab surface can
//! serve any of them through the same request handling.
//!
//! # Architecture
//!
//! - `Indexer` trait: the capability set every backend implements
//! - `IndexerRegistry`: static mapping from route identifier to backend
//! - `types`: Torznab-compatible query and result types
//! - `definitions`: concrete backend implementations
//! - `torznab`: HTTP surface speaking the Torznab protocol

pub mod categories;
pub mod definitions;
pub mod registry;
pub mod torznab;
pub mod types;

pub use registry::{IndexerId, IndexerRegistry};
pub use types::{MovieSearchParam, ReleaseInfo, SearchRequest, TorznabCapabilities, TvSearchParam};

use async_trait::async_trait;
use thiserror::Error;

/// Failures a backend can report
///
/// `Throttled` and `Unauthorized` get dedicated responses; everything else
/// travels as `Other` and ends up as an internal server error.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// The upstream source is rate-limiting us
    #[error("indexer is throttling requests")]
    Throttled,
    /// The configured credentials were rejected
    #[error("indexer rejected the configured credentials")]
    Unauthorized,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Core trait for all indexer implementations
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Unique identifier for this indexer instance
    fn id(&self) -> &str;

    /// Display name for the indexer
    fn name(&self) -> &str;

    /// Description of the indexer
    fn description(&self) -> &str;

    /// The site URL
    fn site_link(&self) -> &str;

    /// Get the capabilities of this indexer
    async fn capabilities(&self) -> Result<TorznabCapabilities, IndexerError>;

    /// Perform a search query
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ReleaseInfo>, IndexerError>;
}
