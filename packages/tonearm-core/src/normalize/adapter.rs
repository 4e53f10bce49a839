//! Narrow capability view over raw catalog items.
//!
//! Upstream items come in song, album, artist, and playlist flavours with
//! inconsistent field names and nesting. [`CatalogItem`] is the only
//! surface the normalizer sees; [`RawItem`] implements it over the raw
//! JSON with ordered fallback chains.

use std::sync::OnceLock;

use serde_json::Value;

use super::resolver::{lookup, runs_text, simple_text, text_at, Resolver};
use crate::model::Thumbnail;

/// Identifier fields recognized on raw items, in precedence order.
pub const IDENTIFIER_FIELDS: [&str; 3] = ["videoId", "id", "browseId"];

/// What the normalizer needs to know about one catalog item.
///
/// Every accessor is optional; absence is never an error.
pub trait CatalogItem {
    fn identifier(&self) -> Option<String>;
    fn title(&self) -> Option<String>;
    fn artist_names(&self) -> Vec<String>;
    fn album(&self) -> Option<String>;
    fn duration_text(&self) -> Option<String>;
    fn thumbnails(&self) -> Vec<Thumbnail>;

    fn has_identifier(&self) -> bool {
        self.identifier().is_some()
    }

    fn has_title(&self) -> bool {
        self.title().is_some()
    }

    fn has_artists(&self) -> bool {
        !self.artist_names().is_empty()
    }

    fn has_thumbnails(&self) -> bool {
        !self.thumbnails().is_empty()
    }
}

/// Adapter over one raw JSON item.
#[derive(Debug, Clone, Copy)]
pub struct RawItem<'a> {
    value: &'a Value,
}

impl<'a> RawItem<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }
}

impl CatalogItem for RawItem<'_> {
    fn identifier(&self) -> Option<String> {
        identifier_resolver().resolve(self.value)
    }

    fn title(&self) -> Option<String> {
        title_resolver().resolve(self.value)
    }

    fn artist_names(&self) -> Vec<String> {
        let names: Vec<String> = match self.value.get("artists") {
            Some(Value::Array(entries)) => entries.iter().filter_map(artist_name).collect(),
            Some(single) => artist_name(single).into_iter().collect(),
            None => ["artist", "author"]
                .iter()
                .filter_map(|key| self.value.get(*key))
                .find_map(artist_name)
                .into_iter()
                .collect(),
        };
        names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }

    fn album(&self) -> Option<String> {
        album_resolver().resolve(self.value)
    }

    fn duration_text(&self) -> Option<String> {
        duration_resolver().resolve(self.value)
    }

    fn thumbnails(&self) -> Vec<Thumbnail> {
        const PATHS: [&[&str]; 3] = [
            &["thumbnails"],
            &["thumbnail", "thumbnails"],
            &["thumbnail", "musicThumbnailRenderer", "thumbnail", "thumbnails"],
        ];
        PATHS
            .iter()
            .filter_map(|path| lookup(self.value, path).and_then(Value::as_array))
            .find(|entries| !entries.is_empty())
            .map(|entries| entries.iter().filter_map(thumbnail).collect())
            .unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fallback Chains
// ─────────────────────────────────────────────────────────────────────────────

fn identifier_resolver() -> &'static Resolver {
    static RESOLVER: OnceLock<Resolver> = OnceLock::new();
    RESOLVER.get_or_init(|| {
        Resolver::new()
            .then(|v| text_at(v, &[IDENTIFIER_FIELDS[0]]))
            .then(|v| text_at(v, &[IDENTIFIER_FIELDS[1]]))
            .then(|v| text_at(v, &[IDENTIFIER_FIELDS[2]]))
    })
}

fn title_resolver() -> &'static Resolver {
    static RESOLVER: OnceLock<Resolver> = OnceLock::new();
    RESOLVER.get_or_init(|| {
        Resolver::new()
            .then(|v| text_at(v, &["title"]))
            .then(|v| text_at(v, &["title", "text"]))
            .then(|v| runs_text(v, &["title"]))
            .then(|v| simple_text(v, &["title"]))
            .then(|v| text_at(v, &["name"]))
    })
}

fn album_resolver() -> &'static Resolver {
    static RESOLVER: OnceLock<Resolver> = OnceLock::new();
    RESOLVER.get_or_init(|| {
        Resolver::new()
            .then(|v| text_at(v, &["album", "name"]))
            .then(|v| text_at(v, &["album", "text"]))
            .then(|v| text_at(v, &["album"]))
            .then(|v| runs_text(v, &["album"]))
    })
}

fn duration_resolver() -> &'static Resolver {
    static RESOLVER: OnceLock<Resolver> = OnceLock::new();
    RESOLVER.get_or_init(|| {
        Resolver::new()
            .then(|v| text_at(v, &["duration", "text"]))
            .then(|v| lookup(v, &["duration"]).and_then(Value::as_str).map(String::from))
            .then(|v| lookup(v, &["duration"]).and_then(Value::as_u64).map(clock_text))
            .then(|v| text_at(v, &["durationText"]))
            .then(|v| simple_text(v, &["lengthText"]))
            .then(|v| runs_text(v, &["lengthText"]))
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Leaf Extractors
// ─────────────────────────────────────────────────────────────────────────────

fn artist_name(entry: &Value) -> Option<String> {
    match entry {
        Value::String(name) => Some(name.clone()),
        Value::Object(_) => text_at(entry, &["name"])
            .or_else(|| text_at(entry, &["text"]))
            .or_else(|| runs_text(entry, &[])),
        _ => None,
    }
}

fn thumbnail(entry: &Value) -> Option<Thumbnail> {
    let url = entry.get("url")?.as_str()?.trim();
    if url.is_empty() {
        return None;
    }
    let dimension = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    };
    Some(Thumbnail {
        url: url.to_string(),
        width: dimension("width"),
        height: dimension("height"),
    })
}

/// Renders whole seconds as `m:ss` or `h:mm:ss`.
fn clock_text(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
