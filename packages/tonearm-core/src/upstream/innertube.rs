//! InnerTube adapter for the music catalog web client.
//!
//! `initialize` loads the web app shell and scrapes the `ytcfg` bootstrap
//! values; the resulting session posts JSON to the `youtubei/v1` endpoints.
//! Search responses are flattened from shelf renderers into the generic
//! section/item shape so the normalizer never sees renderer names.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE, ORIGIN, USER_AGENT};
use reqwest::Client;
use serde_json::{json, Map, Value};

use super::fetch::fetch_ranged;
use super::traits::{CatalogProvider, CatalogSession, ClientHandle};
use super::types::{
    DownloadOptions, Playability, RawMediaInfo, RawResult, RawSection, SearchOptions,
    SessionOptions, UpstreamBody,
};
use super::{UpstreamError, UpstreamResult};
use crate::model::MediaRendition;
use crate::normalize::resolver::{lookup, runs_text, text_at};
use crate::protocol_constants::{BROWSER_USER_AGENT, DEFAULT_CONSENT_COOKIE, MUSIC_ORIGIN};

const CLIENT_NAME: &str = "WEB_REMIX";
const DEFAULT_LANGUAGE: &str = "en";

const PAGE_TYPE_ARTIST: &str = "MUSIC_PAGE_TYPE_ARTIST";
const PAGE_TYPE_USER_CHANNEL: &str = "MUSIC_PAGE_TYPE_USER_CHANNEL";
const PAGE_TYPE_ALBUM: &str = "MUSIC_PAGE_TYPE_ALBUM";

const PAGE_TYPE_PATH: [&str; 5] = [
    "navigationEndpoint",
    "browseEndpoint",
    "browseEndpointContextSupportedConfigs",
    "browseEndpointContextMusicConfig",
    "pageType",
];

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Creates InnerTube sessions against the music web client.
pub struct InnertubeProvider {
    http: Client,
    origin: String,
    request_timeout: Duration,
}

impl InnertubeProvider {
    /// Creates a provider using the shared HTTP client.
    ///
    /// `request_timeout` bounds bootstrap, search, and player calls. It is
    /// not applied to rendition downloads.
    pub fn new(http: Client, request_timeout: Duration) -> Self {
        Self {
            http,
            origin: MUSIC_ORIGIN.to_string(),
            request_timeout,
        }
    }
}

#[async_trait]
impl CatalogProvider for InnertubeProvider {
    async fn initialize(&self, options: &SessionOptions) -> UpstreamResult<ClientHandle> {
        let cookie = options
            .cookie
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONSENT_COOKIE.to_string());
        let language = DEFAULT_LANGUAGE;

        let response = self
            .http
            .get(&self.origin)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(COOKIE, &cookie)
            .header(ACCEPT_LANGUAGE, language)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown").to_string(),
            ));
        }

        let html = response.text().await?;
        let bootstrap = Bootstrap::scrape(&html)?;

        log::info!(
            "[Upstream] Session bootstrapped: client={} v{}, visitor_data={}, credential={}",
            CLIENT_NAME,
            bootstrap.client_version,
            bootstrap.visitor_data.is_some(),
            options.cookie.is_some()
        );

        let context = bootstrap.context(language);
        Ok(Arc::new(InnertubeSession {
            http: self.http.clone(),
            origin: self.origin.clone(),
            api_key: bootstrap.api_key,
            context,
            cookie,
            request_timeout: self.request_timeout,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bootstrap Scraping
// ─────────────────────────────────────────────────────────────────────────────

/// Values scraped from the `ytcfg.set({...})` blocks of the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Bootstrap {
    api_key: String,
    client_version: String,
    visitor_data: Option<String>,
}

fn ytcfg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""(INNERTUBE_API_KEY|INNERTUBE_CLIENT_VERSION|VISITOR_DATA)"\s*:\s*"([^"]*)""#)
            .expect("ytcfg pattern is a valid regex")
    })
}

impl Bootstrap {
    fn scrape(html: &str) -> UpstreamResult<Self> {
        let mut api_key = None;
        let mut client_version = None;
        let mut visitor_data = None;

        for captures in ytcfg_pattern().captures_iter(html) {
            let value = captures[2].to_string();
            let slot = match &captures[1] {
                "INNERTUBE_API_KEY" => &mut api_key,
                "INNERTUBE_CLIENT_VERSION" => &mut client_version,
                _ => &mut visitor_data,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value);
            }
        }

        Ok(Self {
            api_key: api_key
                .ok_or_else(|| UpstreamError::Bootstrap("INNERTUBE_API_KEY not found".into()))?,
            client_version: client_version.ok_or_else(|| {
                UpstreamError::Bootstrap("INNERTUBE_CLIENT_VERSION not found".into())
            })?,
            visitor_data,
        })
    }

    fn context(&self, language: &str) -> Value {
        let mut client = json!({
            "clientName": CLIENT_NAME,
            "clientVersion": self.client_version,
            "hl": language,
            "gl": "US",
            "utcOffsetMinutes": 0,
        });
        if let Some(visitor_data) = &self.visitor_data {
            client["visitorData"] = json!(visitor_data);
        }
        json!({ "client": client, "user": {} })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

struct InnertubeSession {
    http: Client,
    origin: String,
    api_key: String,
    context: Value,
    cookie: String,
    request_timeout: Duration,
}

impl InnertubeSession {
    async fn post(&self, endpoint: &str, mut body: Value) -> UpstreamResult<Value> {
        body["context"] = self.context.clone();
        let url = format!("{}/youtubei/v1/{}", self.origin, endpoint);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str()), ("prettyPrint", "false")])
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(COOKIE, &self.cookie)
            .header(ORIGIN, &self.origin)
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus(
                status.as_u16(),
                format!("{} returned {}", endpoint, status),
            ));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl CatalogSession for InnertubeSession {
    async fn search(&self, query: &str, options: &SearchOptions) -> UpstreamResult<RawResult> {
        let mut body = json!({ "query": query });
        if let Some(filter) = &options.filter {
            body["params"] = json!(filter);
        }
        let response = self.post("search", body).await?;
        Ok(parse_search(&response))
    }

    async fn get_info(&self, id: &str) -> UpstreamResult<RawMediaInfo> {
        let body = json!({
            "videoId": id,
            "contentCheckOk": true,
            "racyCheckOk": true,
        });
        let response = self.post("player", body).await?;
        Ok(parse_player(id, &response))
    }

    async fn download(
        &self,
        info: &RawMediaInfo,
        options: &DownloadOptions,
    ) -> UpstreamResult<UpstreamBody> {
        let url = options.rendition.fetch_url().ok_or_else(|| {
            UpstreamError::Parse(format!("selected rendition for {} has no URL", info.id))
        })?;
        fetch_ranged(&self.http, url, options.range.as_deref()).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Search Flattening
// ─────────────────────────────────────────────────────────────────────────────

/// Flattens the first search tab into sections.
///
/// A top-result card is folded into the front of the next item shelf, so
/// the card and the songs after it form one ordered result list. A card
/// with no shelf after it stays a section of its own.
fn parse_search(response: &Value) -> RawResult {
    let shelves = lookup(response, &["contents", "tabbedSearchResultsRenderer", "tabs"])
        .and_then(Value::as_array)
        .and_then(|tabs| tabs.first())
        .and_then(|tab| {
            lookup(
                tab,
                &["tabRenderer", "content", "sectionListRenderer", "contents"],
            )
        })
        .and_then(Value::as_array);

    let mut sections = Vec::new();
    let mut pending_card: Option<RawSection> = None;

    for shelf in shelves.into_iter().flatten() {
        if let Some(card) = shelf.get("musicCardShelfRenderer") {
            let section = pending_card.get_or_insert_with(|| RawSection {
                title: runs_text(card, &["header", "musicCardShelfHeaderBasicRenderer", "title"]),
                items: Some(Vec::new()),
            });
            section.items.get_or_insert_with(Vec::new).push(flatten_card(card));
            continue;
        }

        let mut section = parse_shelf(shelf);
        if let (Some(items), Some(card)) = (section.items.as_mut(), pending_card.take()) {
            let mut merged = card.items.unwrap_or_default();
            merged.append(items);
            *items = merged;
        }
        sections.push(section);
    }
    sections.extend(pending_card);

    RawResult { sections }
}

fn parse_shelf(shelf: &Value) -> RawSection {
    if let Some(music_shelf) = shelf.get("musicShelfRenderer") {
        let items = music_shelf
            .get("contents")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("musicResponsiveListItemRenderer"))
                    .map(flatten_list_item)
                    .collect()
            });
        return RawSection {
            title: runs_text(music_shelf, &["title"]),
            items,
        };
    }

    // Unknown shelf kinds (did-you-mean, chips, messages) carry no items.
    RawSection::default()
}

fn flatten_list_item(renderer: &Value) -> Value {
    let columns: Vec<&Value> = renderer
        .get("flexColumns")
        .and_then(Value::as_array)
        .map(|columns| {
            columns
                .iter()
                .filter_map(|c| lookup(c, &["musicResponsiveListItemFlexColumnRenderer", "text"]))
                .collect()
        })
        .unwrap_or_default();

    let title = columns.first().copied();
    let video_id = text_at(renderer, &["playlistItemData", "videoId"])
        .or_else(|| {
            text_at(
                renderer,
                &[
                    "overlay",
                    "musicItemThumbnailOverlayRenderer",
                    "content",
                    "musicPlayButtonRenderer",
                    "playNavigationEndpoint",
                    "watchEndpoint",
                    "videoId",
                ],
            )
        })
        .or_else(|| title.and_then(first_run_video_id));
    let browse_id = text_at(renderer, &["navigationEndpoint", "browseEndpoint", "browseId"]);

    let mut item = Map::new();
    insert_opt(&mut item, "videoId", video_id);
    insert_opt(&mut item, "browseId", browse_id);
    if let Some(title) = title {
        item.insert("title".into(), title.clone());
    }
    if let Some(subtitle) = columns.get(1) {
        describe_subtitle(&mut item, subtitle);
    }
    if let Some(thumbs) = lookup(
        renderer,
        &["thumbnail", "musicThumbnailRenderer", "thumbnail", "thumbnails"],
    ) {
        item.insert("thumbnails".into(), thumbs.clone());
    }
    Value::Object(item)
}

fn flatten_card(card: &Value) -> Value {
    let title = card.get("title");

    let mut item = Map::new();
    insert_opt(&mut item, "videoId", title.and_then(first_run_video_id));
    insert_opt(
        &mut item,
        "browseId",
        title.and_then(|t| {
            t.get("runs")
                .and_then(Value::as_array)
                .and_then(|runs| runs.first())
                .and_then(|run| text_at(run, &["navigationEndpoint", "browseEndpoint", "browseId"]))
        }),
    );
    if let Some(title) = title {
        item.insert("title".into(), title.clone());
    }
    if let Some(subtitle) = card.get("subtitle") {
        describe_subtitle(&mut item, subtitle);
    }
    if let Some(thumbs) = lookup(
        card,
        &["thumbnail", "musicThumbnailRenderer", "thumbnail", "thumbnails"],
    ) {
        item.insert("thumbnails".into(), thumbs.clone());
    }
    Value::Object(item)
}

/// Splits a subtitle run list into artists, album, and duration.
///
/// Runs are classified by the page type they link to; the duration is the
/// last plain run that looks like a clock value.
fn describe_subtitle(item: &mut Map<String, Value>, subtitle: &Value) {
    let Some(runs) = subtitle.get("runs").and_then(Value::as_array) else {
        return;
    };

    let mut artists = Vec::new();
    let mut album = None;
    let mut duration = None;

    for run in runs {
        let Some(text) = run.get("text").and_then(Value::as_str) else {
            continue;
        };
        match lookup(run, &PAGE_TYPE_PATH).and_then(Value::as_str) {
            Some(PAGE_TYPE_ARTIST | PAGE_TYPE_USER_CHANNEL) => {
                artists.push(json!({ "name": text }));
            }
            Some(PAGE_TYPE_ALBUM) => album = Some(json!({ "name": text })),
            _ if looks_like_clock(text) => duration = Some(json!({ "text": text })),
            _ => {}
        }
    }

    if !artists.is_empty() {
        item.insert("artists".into(), Value::Array(artists));
    }
    insert_opt(item, "album", album);
    insert_opt(item, "duration", duration);
}

fn first_run_video_id(text: &Value) -> Option<String> {
    text.get("runs")
        .and_then(Value::as_array)
        .and_then(|runs| runs.first())
        .and_then(|run| text_at(run, &["navigationEndpoint", "watchEndpoint", "videoId"]))
}

fn looks_like_clock(text: &str) -> bool {
    let text = text.trim();
    text.contains(':')
        && text
            .split(':')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

fn insert_opt(item: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        item.insert(key.to_string(), value.into());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Player Parsing
// ─────────────────────────────────────────────────────────────────────────────

fn parse_player(id: &str, response: &Value) -> RawMediaInfo {
    let playability = text_at(response, &["playabilityStatus", "status"]).map(|status| {
        Playability::new(status, text_at(response, &["playabilityStatus", "reason"]))
    });

    let renditions = ["adaptiveFormats", "formats"]
        .iter()
        .filter_map(|key| lookup(response, &["streamingData", *key]).and_then(Value::as_array))
        .flatten()
        .map(parse_format)
        .collect();

    RawMediaInfo {
        id: id.to_string(),
        title: text_at(response, &["videoDetails", "title"]),
        playability,
        renditions,
        direct_stream: false,
    }
}

/// Converts one streaming format entry.
///
/// Cipher-protected formats carry `signatureCipher` instead of `url`; they
/// are kept URL-less and therefore never selected.
fn parse_format(format: &Value) -> MediaRendition {
    let number = |key: &str| {
        format.get(key).and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        })
    };
    MediaRendition {
        mime_type: text_at(format, &["mimeType"]).unwrap_or_default(),
        bitrate_bps: number("averageBitrate").or_else(|| number("bitrate")),
        url: text_at(format, &["url"]),
        width_px: number("width").and_then(|v| u32::try_from(v).ok()),
        height_px: number("height").and_then(|v| u32::try_from(v).ok()),
        content_length: number("contentLength"),
    }
}
