//! Newznab upstream indexer
//!
//! Forwards normalized searches to an upstream Newznab/Torznab-compatible API
//! and turns its RSS feed back into [`ReleaseInfo`] values.
//!
//! # Failure classification
//!
//! - HTTP 401/403 or API error codes 100-102: [`IndexerError::Unauthorized`]
//! - HTTP 429 or API error codes 500/501: [`IndexerError::Throttled`]
//! - anything else: [`IndexerError::Other`]

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use super::{IndexerTypeInfo, get_indexer_info};
use crate::indexer::{
    Indexer, IndexerError, IndexerId, ReleaseInfo, SearchRequest, TorznabCapabilities,
};

/// Indexer backed by an upstream Newznab API
pub struct NewznabIndexer {
    id: IndexerId,
    info: &'static IndexerTypeInfo,
    /// API base URL (e.g., "http://localhost:4711")
    api_url: String,
    api_key: Option<String>,
    client: Client,
    capabilities: TorznabCapabilities,
}

impl NewznabIndexer {
    /// Create a new upstream indexer for the given route identifier
    pub fn new(
        id: IndexerId,
        api_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let info = get_indexer_info(id).ok_or_else(|| anyhow!("No definition for indexer {}", id))?;

        if api_url.trim().is_empty() {
            return Err(anyhow!("API URL is required for indexer {}", id));
        }

        let client = Client::builder()
            .gzip(true)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        info!(
            indexer_id = %id,
            indexer_name = info.name,
            api_url = %api_url,
            "Created Newznab indexer"
        );

        Ok(Self {
            id,
            info,
            api_url: api_url.to_string(),
            api_key: api_key.map(str::to_string),
            client,
            capabilities: info.capabilities(),
        })
    }

    /// Build the API URL with query parameters
    fn build_api_url(&self, params: &[(&str, &str)]) -> String {
        let base = self.api_url.trim_end_matches('/');
        let mut url = format!("{}/api", base);

        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        if let Some(ref key) = self.api_key {
            pairs.push(("apikey", key.as_str()));
        }
        pairs.extend_from_slice(params);

        for (i, (key, value)) in pairs.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&format!("{}={}", key, urlencoding::encode(value)));
        }

        url
    }

    /// Parse Newznab XML response into ReleaseInfo list
    fn parse_response(xml: &str) -> Result<Vec<ReleaseInfo>> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut releases = Vec::new();
        let mut current_item: Option<ReleaseInfoBuilder> = None;
        let mut current_tag = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                    if tag_name == "item" {
                        current_item = Some(ReleaseInfoBuilder::new());
                    } else if let Some(ref mut item) = current_item {
                        item.apply_element(&tag_name, e);
                    }
                    current_tag = tag_name;
                }
                Ok(Event::Empty(ref e)) => {
                    // Self-closing tags like <torznab:attr ... />
                    if let Some(ref mut item) = current_item {
                        let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                        item.apply_element(&tag_name, e);
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(ref mut item) = current_item {
                        let text = e.unescape().unwrap_or_default().to_string();
                        item.apply_text(&current_tag, text);
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(ref mut item) = current_item {
                        let text = String::from_utf8_lossy(e).to_string();
                        item.apply_text(&current_tag, text);
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.name().as_ref() == b"item" {
                        if let Some(release) = current_item.take().and_then(ReleaseInfoBuilder::build) {
                            releases.push(release);
                        }
                    }
                    current_tag.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(anyhow!("XML parse error: {}", e)),
                _ => {}
            }
        }

        Ok(releases)
    }
}

/// Extract `(code, description)` when the document is a Newznab `<error>`
fn parse_api_error(xml: &str) -> Option<(i32, String)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                if e.name().as_ref() != b"error" {
                    return None;
                }

                let mut code = 0;
                let mut description = String::new();
                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    match attr.key.as_ref() {
                        b"code" => code = value.parse().unwrap_or(0),
                        b"description" => description = value,
                        _ => {}
                    }
                }
                return Some((code, description));
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Map a Newznab API error code onto the indexer failure kinds
fn classify_api_error(code: i32, description: &str) -> IndexerError {
    match code {
        // Incorrect credentials, account suspended, insufficient privileges
        100..=102 => IndexerError::Unauthorized,
        // Request limit reached, download limit reached
        500 | 501 => IndexerError::Throttled,
        _ => IndexerError::Other(anyhow!("API error {}: {}", code, description)),
    }
}

/// Map a non-success upstream HTTP status onto the indexer failure kinds
fn classify_status(status: StatusCode) -> IndexerError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => IndexerError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => IndexerError::Throttled,
        _ => IndexerError::Other(anyhow!("Search failed: HTTP {}", status)),
    }
}

/// Helper to build ReleaseInfo from parsed XML
struct ReleaseInfoBuilder {
    title: Option<String>,
    guid: Option<String>,
    link: Option<String>,
    pub_date: Option<DateTime<Utc>>,
    description: Option<String>,
    details: Option<String>,
    size: Option<i64>,
    categories: Vec<i32>,
    files: Option<i32>,
    grabs: Option<i32>,
    seeders: Option<i32>,
    peers: Option<i32>,
    info_hash: Option<String>,
    magnet_uri: Option<String>,
    download_volume_factor: f64,
    upload_volume_factor: f64,
}

impl ReleaseInfoBuilder {
    fn new() -> Self {
        Self {
            title: None,
            guid: None,
            link: None,
            pub_date: None,
            description: None,
            details: None,
            size: None,
            categories: Vec::new(),
            files: None,
            grabs: None,
            seeders: None,
            peers: None,
            info_hash: None,
            magnet_uri: None,
            download_volume_factor: 1.0,
            upload_volume_factor: 1.0,
        }
    }

    /// Handle attribute-carrying elements inside an `<item>`
    fn apply_element(&mut self, tag_name: &str, e: &BytesStart<'_>) {
        match tag_name {
            "newznab:attr" | "torznab:attr" => {
                let mut attr_name = String::new();
                let mut attr_value = String::new();

                for attr in e.attributes().flatten() {
                    let val = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"name" => attr_name = val,
                        b"value" => attr_value = val,
                        _ => {}
                    }
                }

                self.set_newznab_attr(&attr_name, &attr_value);
            }
            "enclosure" => {
                for attr in e.attributes().flatten() {
                    let val = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"url" => {
                            if self.link.is_none() {
                                self.link = Some(val);
                            }
                        }
                        b"length" => {
                            if let Ok(size) = val.parse::<i64>() {
                                self.size.get_or_insert(size);
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn apply_text(&mut self, tag_name: &str, text: String) {
        if text.is_empty() {
            return;
        }

        match tag_name {
            "title" => self.title = Some(text),
            "guid" => {
                self.guid.get_or_insert(text);
            }
            "link" => {
                self.link.get_or_insert(text);
            }
            "pubDate" => self.pub_date = parse_rfc822_date(&text),
            "description" => self.description = Some(text),
            "comments" => self.details = Some(text),
            "size" => {
                if let Ok(size) = text.parse::<i64>() {
                    self.size = Some(size);
                }
            }
            "category" => {
                if let Ok(cat) = text.parse::<i32>() {
                    self.push_category(cat);
                }
            }
            _ => {}
        }
    }

    fn set_newznab_attr(&mut self, name: &str, value: &str) {
        match name {
            "size" => {
                if let Ok(size) = value.parse::<i64>() {
                    self.size = Some(size);
                }
            }
            "category" => {
                if let Ok(cat) = value.parse::<i32>() {
                    self.push_category(cat);
                }
            }
            "files" => self.files = value.parse().ok(),
            "grabs" => self.grabs = value.parse().ok(),
            "seeders" => self.seeders = value.parse().ok(),
            "peers" => self.peers = value.parse().ok(),
            "infohash" => self.info_hash = Some(value.to_string()),
            "magneturl" => self.magnet_uri = Some(value.to_string()),
            "downloadvolumefactor" => {
                if let Ok(f) = value.parse::<f64>() {
                    self.download_volume_factor = f;
                }
            }
            "uploadvolumefactor" => {
                if let Ok(f) = value.parse::<f64>() {
                    self.upload_volume_factor = f;
                }
            }
            _ => {
                debug!(attr_name = name, attr_value = value, "Unknown newznab attribute");
            }
        }
    }

    fn push_category(&mut self, cat: i32) {
        if !self.categories.contains(&cat) {
            self.categories.push(cat);
        }
    }

    fn build(self) -> Option<ReleaseInfo> {
        let title = self.title?;
        let guid = self.guid.unwrap_or_else(|| title.clone());
        let publish_date = self.pub_date.unwrap_or_else(Utc::now);

        Some(ReleaseInfo {
            link: self.link,
            magnet_uri: self.magnet_uri,
            info_hash: self.info_hash,
            details: self.details,
            categories: self.categories,
            size: self.size,
            files: self.files,
            grabs: self.grabs,
            description: self.description,
            seeders: self.seeders,
            peers: self.peers,
            download_volume_factor: self.download_volume_factor,
            upload_volume_factor: self.upload_volume_factor,
            ..ReleaseInfo::new(title, guid, publish_date)
        })
    }
}

/// Parse RFC 822 date format (common in RSS/Atom feeds)
fn parse_rfc822_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%a, %d %b %Y %H:%M:%S %z", // RFC 822
        "%Y-%m-%dT%H:%M:%S%z",      // ISO 8601
    ];

    for format in &formats {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    warn!(date_string = s, "Failed to parse date");
    None
}

#[async_trait]
impl Indexer for NewznabIndexer {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn name(&self) -> &str {
        self.info.name
    }

    fn description(&self) -> &str {
        self.info.description
    }

    fn site_link(&self) -> &str {
        self.info.site_link
    }

    async fn capabilities(&self) -> Result<TorznabCapabilities, IndexerError> {
        Ok(self.capabilities.clone())
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<ReleaseInfo>, IndexerError> {
        let offset = request.offset.to_string();
        let limit = request.limit.to_string();
        let cats = request.categories_param();

        let mut params: Vec<(&str, &str)> = vec![("t", "search")];
        if !request.query.is_empty() {
            params.push(("q", request.query.as_str()));
        }
        if let Some(ref cats) = cats {
            params.push(("cat", cats.as_str()));
        }
        params.push(("offset", offset.as_str()));
        params.push(("limit", limit.as_str()));

        let url = self.build_api_url(&params);

        debug!(
            indexer_id = %self.id,
            query = %request.query,
            offset = request.offset,
            limit = request.limit,
            "Searching upstream indexer"
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Upstream request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let body = response
            .text()
            .await
            .context("Failed to read upstream response")?;

        if let Some((code, description)) = parse_api_error(&body) {
            return Err(classify_api_error(code, &description));
        }

        let releases = Self::parse_response(&body)?;

        info!(
            indexer_id = %self.id,
            releases_found = releases.len(),
            "Upstream search complete"
        );

        Ok(releases)
    }
}
