//! Torznab XML response generation
//!
//! Capability documents and RSS 2.0 result feeds with Torznab extensions,
//! plus the mapping from failures to HTTP responses.

use std::io::Cursor;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use thiserror::Error;

use crate::indexer::categories::TorznabCategory;
use crate::indexer::{IndexerError, ReleaseInfo, TorznabCapabilities};

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Failure while rendering a Torznab document
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to write XML: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("rendered XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A rendered Torznab document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorznabResponse {
    xml: String,
}

impl TorznabResponse {
    /// Create a capabilities response
    pub fn capabilities(title: &str, caps: &TorznabCapabilities) -> Result<Self, EncodeError> {
        let mut writer = new_writer()?;

        writer.write_event(Event::Start(BytesStart::new("caps")))?;

        // <server title="..."/>
        let mut server = BytesStart::new("server");
        server.push_attribute(("title", title));
        writer.write_event(Event::Empty(server))?;

        // <limits default="..." max="..."/>
        if caps.limits_default.is_some() || caps.limits_max.is_some() {
            let mut limits = BytesStart::new("limits");
            if let Some(def) = caps.limits_default {
                limits.push_attribute(("default", def.to_string().as_str()));
            }
            if let Some(max) = caps.limits_max {
                limits.push_attribute(("max", max.to_string().as_str()));
            }
            writer.write_event(Event::Empty(limits))?;
        }

        writer.write_event(Event::Start(BytesStart::new("searching")))?;

        write_search_element(&mut writer, "search", caps.search_available, "q")?;

        let tv_params = join_params(caps.tv_search_params.iter().map(|p| p.as_str()));
        write_search_element(
            &mut writer,
            "tv-search",
            caps.tv_search_available(),
            &tv_params,
        )?;

        let movie_params = join_params(caps.movie_search_params.iter().map(|p| p.as_str()));
        write_search_element(
            &mut writer,
            "movie-search",
            caps.movie_search_available(),
            &movie_params,
        )?;

        writer.write_event(Event::End(BytesEnd::new("searching")))?;

        writer.write_event(Event::Start(BytesStart::new("categories")))?;

        for parent in caps.parent_categories() {
            write_category(&mut writer, parent, caps.subcategories_of(parent.id))?;
        }

        // Subcategories advertised without their parent stand alone
        for orphan in caps.orphan_subcategories() {
            write_category(&mut writer, orphan, std::iter::empty::<&TorznabCategory>())?;
        }

        writer.write_event(Event::End(BytesEnd::new("categories")))?;

        writer.write_event(Event::End(BytesEnd::new("caps")))?;

        finish(writer)
    }

    /// Create a search results response
    pub fn search_results(
        title: &str,
        description: &str,
        link: &str,
        releases: &[ReleaseInfo],
    ) -> Result<Self, EncodeError> {
        let mut writer = new_writer()?;

        // <rss version="2.0" xmlns:atom="..." xmlns:torznab="...">
        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        rss.push_attribute(("xmlns:atom", "http://www.w3.org/2005/Atom"));
        rss.push_attribute(("xmlns:torznab", "http://torznab.com/schemas/2015/feed"));
        writer.write_event(Event::Start(rss))?;

        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        write_text_element(&mut writer, "title", title)?;
        write_text_element(&mut writer, "description", description)?;
        write_text_element(&mut writer, "link", link)?;

        for release in releases {
            write_release_item(&mut writer, release)?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        finish(writer)
    }

    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn into_string(self) -> String {
        self.xml
    }
}

impl IntoResponse for TorznabResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
            self.xml,
        )
            .into_response()
    }
}

/// Everything that can stop a Torznab request from producing a document
#[derive(Debug, Error)]
pub enum TorznabError {
    #[error("Missing parameter (t)")]
    MissingAction,
    #[error("No such function ({0})")]
    InvalidAction(String),
    #[error("Incorrect parameter (cat={0})")]
    InvalidCategory(String),
    #[error("You are being throttled. Retry in a few minutes.")]
    Throttled,
    #[error("Unauthorized, check your credentials.")]
    Unauthorized,
    #[error("Indexer error: {0:#}")]
    Indexer(anyhow::Error),
    #[error("Failed to render torznab payload: {0}")]
    Encode(#[from] EncodeError),
}

impl From<IndexerError> for TorznabError {
    fn from(err: IndexerError) -> Self {
        match err {
            IndexerError::Throttled => TorznabError::Throttled,
            IndexerError::Unauthorized => TorznabError::Unauthorized,
            IndexerError::Other(e) => TorznabError::Indexer(e),
        }
    }
}

impl TorznabError {
    pub fn status(&self) -> StatusCode {
        match self {
            TorznabError::MissingAction
            | TorznabError::InvalidAction(_)
            | TorznabError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            TorznabError::Throttled => StatusCode::FORBIDDEN,
            TorznabError::Unauthorized => StatusCode::UNAUTHORIZED,
            TorznabError::Indexer(_) | TorznabError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Newznab error code used in the XML body
    fn code(&self) -> i32 {
        match self {
            TorznabError::MissingAction => 200,
            TorznabError::InvalidCategory(_) => 201,
            TorznabError::InvalidAction(_) => 202,
            TorznabError::Unauthorized => 100,
            TorznabError::Throttled => 500,
            TorznabError::Indexer(_) | TorznabError::Encode(_) => 900,
        }
    }

    fn to_xml(&self) -> Result<String, EncodeError> {
        let mut writer = new_writer()?;

        let mut error = BytesStart::new("error");
        error.push_attribute(("code", self.code().to_string().as_str()));
        error.push_attribute(("description", self.to_string().as_str()));
        writer.write_event(Event::Empty(error))?;

        Ok(finish(writer)?.into_string())
    }
}

impl IntoResponse for TorznabError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            // Fixed plain-text bodies that clients match on
            TorznabError::Throttled | TorznabError::Unauthorized => {
                tracing::warn!(status = status.as_u16(), "{}", self);
                (
                    status,
                    [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
                    self.to_string(),
                )
                    .into_response()
            }
            _ => {
                if status.is_server_error() {
                    tracing::error!(status = status.as_u16(), error = %self, "Torznab request failed");
                } else {
                    tracing::debug!(status = status.as_u16(), error = %self, "Rejected Torznab request");
                }

                match self.to_xml() {
                    Ok(xml) => (status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml).into_response(),
                    Err(_) => (
                        status,
                        [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
                        self.to_string(),
                    )
                        .into_response(),
                }
            }
        }
    }
}

// Helper functions for XML generation

/// Writer with the `<?xml version="1.0" encoding="UTF-8"?>` declaration already emitted
fn new_writer() -> Result<XmlWriter, EncodeError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

fn finish(writer: XmlWriter) -> Result<TorznabResponse, EncodeError> {
    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(TorznabResponse { xml })
}

fn join_params<'a>(params: impl Iterator<Item = &'a str>) -> String {
    params.collect::<Vec<_>>().join(",")
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), EncodeError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_search_element(
    writer: &mut XmlWriter,
    name: &str,
    available: bool,
    params: &str,
) -> Result<(), EncodeError> {
    let mut elem = BytesStart::new(name);
    elem.push_attribute(("available", if available { "yes" } else { "no" }));
    elem.push_attribute(("supportedParams", params));
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

/// `<category>` with its `<subcat>` children, self-closing when there are none
fn write_category<'a>(
    writer: &mut XmlWriter,
    cat: &TorznabCategory,
    subcats: impl Iterator<Item = &'a TorznabCategory>,
) -> Result<(), EncodeError> {
    let mut elem = BytesStart::new("category");
    elem.push_attribute(("id", cat.id.to_string().as_str()));
    elem.push_attribute(("name", cat.name));

    let mut subcats = subcats.peekable();
    if subcats.peek().is_none() {
        writer.write_event(Event::Empty(elem))?;
        return Ok(());
    }

    writer.write_event(Event::Start(elem))?;
    for sub in subcats {
        let mut subcat = BytesStart::new("subcat");
        subcat.push_attribute(("id", sub.id.to_string().as_str()));
        subcat.push_attribute(("name", sub.name));
        writer.write_event(Event::Empty(subcat))?;
    }
    writer.write_event(Event::End(BytesEnd::new("category")))?;
    Ok(())
}

fn write_torznab_attr(writer: &mut XmlWriter, name: &str, value: &str) -> Result<(), EncodeError> {
    let mut attr = BytesStart::new("torznab:attr");
    attr.push_attribute(("name", name));
    attr.push_attribute(("value", value));
    writer.write_event(Event::Empty(attr))?;
    Ok(())
}

fn write_release_item(writer: &mut XmlWriter, release: &ReleaseInfo) -> Result<(), EncodeError> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;

    write_text_element(writer, "title", &release.title)?;
    write_text_element(writer, "guid", &release.guid)?;

    if let Some(ref details) = release.details {
        write_text_element(writer, "comments", details)?;
    }

    write_text_element(writer, "pubDate", &format_rfc2822(&release.publish_date))?;

    if let Some(size) = release.size {
        write_text_element(writer, "size", &size.to_string())?;
    }

    if let Some(ref desc) = release.description {
        write_text_element(writer, "description", desc)?;
    }

    let link = release.download_link().unwrap_or("");
    write_text_element(writer, "link", link)?;

    for cat in &release.categories {
        write_text_element(writer, "category", &cat.to_string())?;
    }

    if !link.is_empty() {
        let mut enclosure = BytesStart::new("enclosure");
        enclosure.push_attribute(("url", link));
        if let Some(size) = release.size {
            enclosure.push_attribute(("length", size.to_string().as_str()));
        }
        enclosure.push_attribute(("type", "application/x-bittorrent"));
        writer.write_event(Event::Empty(enclosure))?;
    }

    for cat in &release.categories {
        write_torznab_attr(writer, "category", &cat.to_string())?;
    }

    if let Some(size) = release.size {
        write_torznab_attr(writer, "size", &size.to_string())?;
    }

    if let Some(files) = release.files {
        write_torznab_attr(writer, "files", &files.to_string())?;
    }

    if let Some(grabs) = release.grabs {
        write_torznab_attr(writer, "grabs", &grabs.to_string())?;
    }

    if let Some(seeders) = release.seeders {
        write_torznab_attr(writer, "seeders", &seeders.to_string())?;
    }

    if let Some(peers) = release.peers {
        write_torznab_attr(writer, "peers", &peers.to_string())?;
    }

    if let Some(ref info_hash) = release.info_hash {
        write_torznab_attr(writer, "infohash", info_hash)?;
    }

    if let Some(ref magnet) = release.magnet_uri {
        write_torznab_attr(writer, "magneturl", magnet)?;
    }

    write_torznab_attr(
        writer,
        "downloadvolumefactor",
        &release.download_volume_factor.to_string(),
    )?;
    write_torznab_attr(
        writer,
        "uploadvolumefactor",
        &release.upload_volume_factor.to_string(),
    )?;

    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn format_rfc2822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::indexer::categories::{self, cats};
    use crate::indexer::{MovieSearchParam, TvSearchParam};

    const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

    #[test]
    fn test_capabilities_document() {
        let caps = TorznabCapabilities {
            tv_search_params: vec![TvSearchParam::Q, TvSearchParam::Season, TvSearchParam::Ep],
            movie_search_params: vec![MovieSearchParam::Q],
            categories: categories::resolve(&[cats::TV, cats::TV_HD, cats::MOVIES, cats::AUDIO_MP3]),
            ..TorznabCapabilities::new()
        };

        let xml = TorznabResponse::capabilities("aMule", &caps).unwrap();
        let expected = concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<caps>"#,
            r#"<server title="aMule"/>"#,
            r#"<limits default="100" max="100"/>"#,
            r#"<searching>"#,
            r#"<search available="yes" supportedParams="q"/>"#,
            r#"<tv-search available="yes" supportedParams="q,season,ep"/>"#,
            r#"<movie-search available="yes" supportedParams="q"/>"#,
            r#"</searching>"#,
            r#"<categories>"#,
            r#"<category id="5000" name="TV"><subcat id="5040" name="TV/HD"/></category>"#,
            r#"<category id="2000" name="Movies"/>"#,
            r#"<category id="3010" name="Audio/MP3"/>"#,
            r#"</categories>"#,
            r#"</caps>"#,
        );
        assert_eq!(xml.as_str(), expected);
    }

    #[test]
    fn test_unavailable_search_modes() {
        let caps = TorznabCapabilities {
            search_available: false,
            ..Default::default()
        };

        let xml = TorznabResponse::capabilities("empty", &caps).unwrap().into_string();
        assert!(xml.starts_with(DECL));
        assert!(!xml.contains("<limits"));
        assert!(xml.contains(r#"<tv-search available="no" supportedParams=""/>"#));
        assert!(xml.contains("<categories></categories>"));
    }

    #[test]
    fn test_search_results_document() {
        let mut release = ReleaseInfo::new(
            "Show 3x05 <720p> & more".to_string(),
            "guid-1".to_string(),
            Utc.with_ymd_and_hms(2025, 1, 18, 14, 30, 0).unwrap(),
        );
        release.link = Some("https://example.com/1.torrent".to_string());
        release.size = Some(1024);
        release.categories = vec![5040];
        release.seeders = Some(3);

        let xml = TorznabResponse::search_results(
            "aMule",
            "desc",
            "https://www.amule.org/",
            &[release],
        )
        .unwrap()
        .into_string();

        assert!(xml.starts_with(DECL));
        assert!(xml.contains(
            r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:torznab="http://torznab.com/schemas/2015/feed"><channel><title>aMule</title>"#
        ));
        assert!(xml.contains("<title>Show 3x05 &lt;720p&gt; &amp; more</title>"));
        assert!(xml.contains("<pubDate>Sat, 18 Jan 2025 14:30:00 +0000</pubDate>"));
        assert!(xml.contains(
            r#"<enclosure url="https://example.com/1.torrent" length="1024" type="application/x-bittorrent"/>"#
        ));
        assert!(xml.contains(r#"<torznab:attr name="category" value="5040"/>"#));
        assert!(xml.contains(r#"<torznab:attr name="seeders" value="3"/>"#));
        assert!(xml.ends_with("</item></channel></rss>"));
    }

    #[test]
    fn test_empty_search_results() {
        let xml = TorznabResponse::search_results("t", "d", "l", &[]).unwrap().into_string();
        assert_eq!(
            xml,
            format!(
                "{}{}",
                DECL,
                r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:torznab="http://torznab.com/schemas/2015/feed"><channel><title>t</title><description>d</description><link>l</link></channel></rss>"#
            )
        );
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(TorznabError::MissingAction.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            TorznabError::InvalidAction("search".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TorznabError::InvalidCategory("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(TorznabError::Throttled.status(), StatusCode::FORBIDDEN);
        assert_eq!(TorznabError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            TorznabError::Indexer(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_indexer_error_conversion() {
        assert!(matches!(
            TorznabError::from(IndexerError::Throttled),
            TorznabError::Throttled
        ));
        assert!(matches!(
            TorznabError::from(IndexerError::Unauthorized),
            TorznabError::Unauthorized
        ));
        assert!(matches!(
            TorznabError::from(IndexerError::Other(anyhow::anyhow!("upstream down"))),
            TorznabError::Indexer(_)
        ));
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            TorznabError::Throttled.to_string(),
            "You are being throttled. Retry in a few minutes."
        );
        assert_eq!(
            TorznabError::Unauthorized.to_string(),
            "Unauthorized, check your credentials."
        );
    }

    #[test]
    fn test_error_xml() {
        let xml = TorznabError::InvalidAction("search".into()).to_xml().unwrap();
        assert_eq!(
            xml,
            format!(
                "{}{}",
                DECL, r#"<error code="202" description="No such function (search)"/>"#
            )
        );
    }
}
