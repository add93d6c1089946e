//! amarr - Torznab adapter for non-Torznab sources
//!
//! Serves one Torznab endpoint per configured backend so that Sonarr, Radarr
//! and other Torznab clients can query sources that do not speak the protocol
//! themselves.

pub mod api;
pub mod app;
pub mod config;
pub mod indexer;
