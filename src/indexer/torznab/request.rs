//! Torznab request parsing
//!
//! Turns raw query parameters into an [`Action`] and, for searches, a
//! [`SearchRequest`].

use std::collections::BTreeSet;
use std::num::ParseIntError;

use serde::Deserialize;

use super::response::TorznabError;
use crate::indexer::SearchRequest;

/// Torznab API request parameters
///
/// Everything is kept as a raw string so that defaults and parse failures
/// are decided here rather than by the extractor.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct TorznabRequest {
    /// Action: caps, tvsearch, movie
    pub t: Option<String>,
    /// Search query
    pub q: Option<String>,
    /// Categories (comma-separated)
    pub cat: Option<String>,
    /// Result limit
    pub limit: Option<String>,
    /// Result offset
    pub offset: Option<String>,

    // TV-specific
    /// Season number
    pub season: Option<String>,
    /// Episode number
    pub episode: Option<String>,
    /// Episode number, as sent by most Torznab clients
    pub ep: Option<String>,
}

/// The operation requested through the `t` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Capabilities,
    TvSearch,
    MovieSearch,
    Invalid(String),
    Missing,
}

impl Action {
    pub fn from_param(t: Option<&str>) -> Self {
        match t {
            None => Action::Missing,
            Some("caps") => Action::Capabilities,
            Some("tvsearch") => Action::TvSearch,
            Some("movie") => Action::MovieSearch,
            Some(other) => Action::Invalid(other.to_string()),
        }
    }
}

/// Search flavour, deciding how the query string is assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Episodic: season and episode are folded into the query
    Tv,
    /// Non-episodic: the query is passed through verbatim
    Movie,
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchKind::Tv => write!(f, "tvsearch"),
            SearchKind::Movie => write!(f, "movie"),
        }
    }
}

/// Assemble the single query string handed to the backend
///
/// Episodic searches become `"{q} {season}x{episode}"` with the episode
/// left-padded with `0` to two characters. Absent values are empty strings.
pub fn normalize_query(
    kind: SearchKind,
    q: Option<&str>,
    season: Option<&str>,
    episode: Option<&str>,
) -> String {
    let query = q.unwrap_or_default();

    match kind {
        SearchKind::Movie => query.to_string(),
        SearchKind::Tv => {
            let season = season.unwrap_or_default();
            let episode = episode.unwrap_or_default();
            format!("{} {}x{:0>2}", query, season, episode)
        }
    }
}

/// Parse `offset`, falling back to 0 when absent or not a non-negative `i32`
pub fn parse_offset(offset: Option<&str>) -> u32 {
    parse_bounded(offset, 0).unwrap_or(SearchRequest::DEFAULT_OFFSET)
}

/// Parse `limit`, falling back to 100 when absent or not a positive `i32`
pub fn parse_limit(limit: Option<&str>) -> u32 {
    parse_bounded(limit, 1).unwrap_or(SearchRequest::DEFAULT_LIMIT)
}

/// Values outside `min..=i32::MAX` count as unparseable
fn parse_bounded(value: Option<&str>, min: i32) -> Option<u32> {
    value
        .and_then(|s| s.parse::<i32>().ok())
        .filter(|&v| v >= min)
        .and_then(|v| u32::try_from(v).ok())
}

/// Parse the comma-separated `cat` list
///
/// Absent means no filter. Any token that is not an integer fails the whole
/// list.
pub fn parse_categories(cat: Option<&str>) -> Result<BTreeSet<i32>, ParseIntError> {
    match cat {
        None => Ok(BTreeSet::new()),
        Some(list) => list.split(',').map(str::parse::<i32>).collect(),
    }
}

impl TorznabRequest {
    pub fn action(&self) -> Action {
        Action::from_param(self.t.as_deref())
    }

    /// Episode value, preferring `episode` over the `ep` shorthand
    fn episode(&self) -> Option<&str> {
        self.episode.as_deref().or(self.ep.as_deref())
    }

    /// Convert to the normalized request sent to a backend
    pub fn to_search_request(&self, kind: SearchKind) -> Result<SearchRequest, TorznabError> {
        let query = normalize_query(
            kind,
            self.q.as_deref(),
            self.season.as_deref(),
            self.episode(),
        );

        let categories = parse_categories(self.cat.as_deref()).map_err(|e| {
            TorznabError::InvalidCategory(format!(
                "{}: {}",
                self.cat.as_deref().unwrap_or_default(),
                e
            ))
        })?;

        Ok(SearchRequest {
            query,
            offset: parse_offset(self.offset.as_deref()),
            limit: parse_limit(self.limit.as_deref()),
            categories,
        })
    }
}
