//! API route definitions
//!
//! The Torznab surface lives with the indexers in `indexer::torznab`; this
//! module holds the service endpoints around it.

pub mod health;
