//! Application configuration management

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::indexer::IndexerId;

/// Upstream endpoint for one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub id: IndexerId,
    /// Base URL of the upstream Newznab-compatible API
    pub api_url: String,
    pub api_key: Option<String>,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind
    pub host: IpAddr,

    /// Server port
    pub port: u16,

    /// Timeout applied to every upstream request
    pub upstream_timeout: Duration,

    /// Backends with an upstream configured; the rest get no routes
    pub backends: Vec<BackendConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            upstream_timeout: Duration::from_secs(30),
            backends: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = match lookup("HOST") {
            Some(host) => host.parse().context("Invalid HOST")?,
            None => defaults.host,
        };

        let port = match lookup("PORT") {
            Some(port) => port.parse().context("Invalid PORT")?,
            None => defaults.port,
        };

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(secs.parse().context("Invalid UPSTREAM_TIMEOUT_SECS")?),
            None => defaults.upstream_timeout,
        };

        let backends = IndexerId::ALL
            .into_iter()
            .filter_map(|id| {
                let prefix = id.as_str().to_uppercase();
                let api_url = lookup(&format!("{prefix}_API_URL")).filter(|u| !u.is_empty())?;
                Some(BackendConfig {
                    id,
                    api_url,
                    api_key: lookup(&format!("{prefix}_API_KEY")).filter(|k| !k.is_empty()),
                })
            })
            .collect();

        Ok(Self {
            host,
            port,
            upstream_timeout,
            backends,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
