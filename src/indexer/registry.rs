//! Indexer registry
//!
//! Backends are bound to fixed routes once at startup. The registry is
//! populated from configuration and never changes while the server runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;

use super::Indexer;
use super::definitions::newznab::NewznabIndexer;
use crate::config::Config;

/// Route identifier for a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexerId {
    Amule,
    Ddunlimitednet,
}

impl IndexerId {
    /// Backend served by the legacy `/api` route
    pub const DEFAULT: IndexerId = IndexerId::Amule;

    pub const ALL: [IndexerId; 2] = [IndexerId::Amule, IndexerId::Ddunlimitednet];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexerId::Amule => "amule",
            IndexerId::Ddunlimitednet => "ddunlimitednet",
        }
    }

    /// Path of the Torznab endpoint bound to this backend
    pub fn api_path(&self) -> String {
        format!("/indexer/{}/api", self.as_str())
    }
}

impl std::fmt::Display for IndexerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered backends by route identifier
#[derive(Clone, Default)]
pub struct IndexerRegistry {
    indexers: BTreeMap<IndexerId, Arc<dyn Indexer>>,
}

impl IndexerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from the configured upstream backends
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();

        for backend in &config.backends {
            let indexer = NewznabIndexer::new(
                backend.id,
                &backend.api_url,
                backend.api_key.as_deref(),
                config.upstream_timeout,
            )?;
            registry.register(backend.id, Arc::new(indexer));
        }

        Ok(registry)
    }

    /// Bind a backend to a route identifier, replacing any previous binding
    pub fn register(&mut self, id: IndexerId, indexer: Arc<dyn Indexer>) {
        tracing::info!(
            indexer_id = %id,
            indexer_name = %indexer.name(),
            path = %id.api_path(),
            "Registered indexer"
        );
        self.indexers.insert(id, indexer);
    }

    pub fn get(&self, id: IndexerId) -> Option<Arc<dyn Indexer>> {
        self.indexers.get(&id).cloned()
    }

    /// Backend answering the legacy `/api` route, if configured
    pub fn default_indexer(&self) -> Option<Arc<dyn Indexer>> {
        self.get(IndexerId::DEFAULT)
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndexerId, &Arc<dyn Indexer>)> {
        self.indexers.iter().map(|(id, indexer)| (*id, indexer))
    }

    pub fn is_empty(&self) -> bool {
        self.indexers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indexers.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::BackendConfig;

    #[test]
    fn test_api_paths() {
        assert_eq!(IndexerId::Amule.api_path(), "/indexer/amule/api");
        assert_eq!(
            IndexerId::Ddunlimitednet.api_path(),
            "/indexer/ddunlimitednet/api"
        );
    }

    #[test]
    fn test_from_config_registers_configured_backends_only() {
        let config = Config {
            backends: vec![BackendConfig {
                id: IndexerId::Ddunlimitednet,
                api_url: "https://upstream.example.com".to_string(),
                api_key: Some("secret".to_string()),
            }],
            upstream_timeout: Duration::from_secs(5),
            ..Config::default()
        };

        let registry = IndexerRegistry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(IndexerId::Ddunlimitednet).is_some());
        assert!(registry.default_indexer().is_none());
    }
}
