//! Raw search result → canonical [`Track`] list.
//!
//! Upstream relevance order is authoritative: the normalizer filters and
//! truncates but never re-sorts. It never fails; missing fields are
//! defaulted and items without a usable identifier are dropped.

pub mod adapter;
pub mod resolver;

use std::collections::HashSet;

use serde_json::Value;

pub use adapter::{CatalogItem, RawItem, IDENTIFIER_FIELDS};
pub use resolver::{Resolver, Strategy};

use crate::model::Track;
use crate::protocol_constants::{ARTIST_SEPARATOR, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use crate::select::best_thumbnail;
use crate::upstream::RawResult;

/// Normalizes the first usable section of `raw` into at most `max_results` tracks.
pub fn normalize(raw: &RawResult, max_results: usize) -> Vec<Track> {
    let Some(items) = candidate_items(raw) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    items
        .iter()
        .map(RawItem::new)
        .filter_map(|item| {
            let id = item.identifier()?;
            seen.insert(id.clone()).then(|| to_track(id, &item))
        })
        .take(max_results)
        .collect()
}

/// Returns the items of the first section that has identifiable items.
fn candidate_items(raw: &RawResult) -> Option<&[Value]> {
    raw.sections
        .iter()
        .filter_map(|section| section.items.as_deref())
        .find(|items| items.iter().any(|item| RawItem::new(item).has_identifier()))
}

fn to_track(id: String, item: &impl CatalogItem) -> Track {
    let artists = item.artist_names();
    Track {
        id,
        title: item.title().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        artist: if artists.is_empty() {
            UNKNOWN_ARTIST.to_string()
        } else {
            artists.join(ARTIST_SEPARATOR)
        },
        album: item.album(),
        duration_text: item.duration_text(),
        thumbnail_url: best_thumbnail(&item.thumbnails()).map(|thumb| thumb.url.clone()),
    }
}
