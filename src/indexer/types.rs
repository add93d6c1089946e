//! Core types shared by the Torznab surface and the indexer backends
//!
//! These types are modeled after the Torznab specification.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::categories::TorznabCategory;

/// TV search parameters supported by an indexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvSearchParam {
    Q,
    Season,
    Ep,
}

impl TvSearchParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            TvSearchParam::Q => "q",
            TvSearchParam::Season => "season",
            TvSearchParam::Ep => "ep",
        }
    }
}

/// Movie search parameters supported by an indexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieSearchParam {
    Q,
}

impl MovieSearchParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieSearchParam::Q => "q",
        }
    }
}

/// Capabilities advertised by an indexer backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TorznabCapabilities {
    /// Maximum results per page
    pub limits_max: Option<u32>,
    /// Default results per page
    pub limits_default: Option<u32>,

    /// Whether basic search is available
    pub search_available: bool,

    /// TV search parameters supported
    pub tv_search_params: Vec<TvSearchParam>,

    /// Movie search parameters supported
    pub movie_search_params: Vec<MovieSearchParam>,

    /// Advertised categories, parents and subcategories mixed
    pub categories: Vec<TorznabCategory>,
}

impl TorznabCapabilities {
    /// Create default capabilities (search only)
    pub fn new() -> Self {
        Self {
            search_available: true,
            limits_default: Some(SearchRequest::DEFAULT_LIMIT),
            limits_max: Some(SearchRequest::DEFAULT_LIMIT),
            ..Default::default()
        }
    }

    /// Whether TV search is available
    pub fn tv_search_available(&self) -> bool {
        !self.tv_search_params.is_empty()
    }

    /// Whether movie search is available
    pub fn movie_search_available(&self) -> bool {
        !self.movie_search_params.is_empty()
    }

    /// Top-level categories in advertised order
    pub fn parent_categories(&self) -> impl Iterator<Item = &TorznabCategory> {
        self.categories.iter().filter(|c| c.is_parent())
    }

    /// Advertised subcategories whose parent is not advertised
    pub fn orphan_subcategories(&self) -> impl Iterator<Item = &TorznabCategory> {
        self.categories.iter().filter(move |c| {
            c.parent_id
                .is_some_and(|parent| !self.categories.iter().any(|p| p.id == parent))
        })
    }

    /// Advertised subcategories of `parent_id`
    pub fn subcategories_of(&self, parent_id: i32) -> impl Iterator<Item = &TorznabCategory> {
        self.categories
            .iter()
            .filter(move |c| c.parent_id == Some(parent_id))
    }
}

/// A normalized search handed to a backend
///
/// Built fresh for every request and dropped once the backend returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Final query string, never absent but possibly empty
    pub query: String,
    pub offset: u32,
    pub limit: u32,
    /// Empty means unfiltered
    pub categories: BTreeSet<i32>,
}

impl SearchRequest {
    pub const DEFAULT_OFFSET: u32 = 0;
    pub const DEFAULT_LIMIT: u32 = 100;

    /// Comma-joined category list, or `None` when unfiltered
    pub fn categories_param(&self) -> Option<String> {
        if self.categories.is_empty() {
            return None;
        }

        Some(
            self.categories
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// Information about a torrent release (Torznab-compatible)
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseInfo {
    /// Release title
    pub title: String,

    /// Unique identifier (usually the details URL)
    pub guid: String,

    /// Download link (torrent file)
    pub link: Option<String>,

    /// Magnet URI
    pub magnet_uri: Option<String>,

    /// InfoHash
    pub info_hash: Option<String>,

    /// Details page URL
    pub details: Option<String>,

    /// Publication date
    pub publish_date: DateTime<Utc>,

    /// Torznab category IDs
    pub categories: Vec<i32>,

    /// File size in bytes
    pub size: Option<i64>,

    /// Number of files in the torrent
    pub files: Option<i32>,

    /// Number of times snatched/downloaded
    pub grabs: Option<i32>,

    pub description: Option<String>,

    /// Number of seeders
    pub seeders: Option<i32>,
    /// Number of peers (seeders + leechers)
    pub peers: Option<i32>,

    /// Download volume factor (0 = freeleech, 1 = normal)
    pub download_volume_factor: f64,
    /// Upload volume factor (usually 1, can be 2 for double upload)
    pub upload_volume_factor: f64,
}

impl ReleaseInfo {
    /// Create a new release with minimal info
    pub fn new(title: String, guid: String, publish_date: DateTime<Utc>) -> Self {
        Self {
            title,
            guid,
            publish_date,
            link: None,
            magnet_uri: None,
            info_hash: None,
            details: None,
            categories: vec![],
            size: None,
            files: None,
            grabs: None,
            description: None,
            seeders: None,
            peers: None,
            download_volume_factor: 1.0,
            upload_volume_factor: 1.0,
        }
    }

    /// Link to hand to the download client, preferring the torrent file
    pub fn download_link(&self) -> Option<&str> {
        [self.link.as_deref(), self.magnet_uri.as_deref()]
            .into_iter()
            .flatten()
            .find(|l| !l.is_empty())
    }
}
