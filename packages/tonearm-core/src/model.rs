//! Canonical output types.
//!
//! These shapes are the gateway's stable contract. They never mirror the
//! upstream schema directly; the normalizer and the upstream adapters
//! translate into them.

use serde::{Deserialize, Serialize};

/// A normalized catalog track.
///
/// `id` is always non-empty: records without a usable identifier are
/// dropped during normalization rather than emitted with a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    /// Artist names joined with `", "`.
    pub artist: String,
    pub album: Option<String>,
    /// Human-readable duration exactly as the catalog presents it.
    pub duration_text: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// A thumbnail candidate offered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Thumbnail {
    /// Pixel area used for ranking; missing dimensions count as zero.
    pub fn area(&self) -> u64 {
        u64::from(self.width.unwrap_or(0)) * u64::from(self.height.unwrap_or(0))
    }
}

/// One concrete encoding of a media item.
///
/// A rendition without a `url` can be listed but never selected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRendition {
    pub mime_type: String,
    pub bitrate_bps: Option<u64>,
    pub url: Option<String>,
    pub width_px: Option<u32>,
    pub height_px: Option<u32>,
    /// Total byte length when the catalog advertises it.
    pub content_length: Option<u64>,
}

impl MediaRendition {
    /// Returns true if the rendition carries an audio track.
    pub fn is_audio(&self) -> bool {
        self.mime_type.contains("audio")
    }

    /// Returns the fetchable URL, treating blank strings as absent.
    pub fn fetch_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_serializes_camel_case_with_nulls() {
        let track = Track {
            id: "abc123".into(),
            title: "Song".into(),
            artist: "Artist".into(),
            album: None,
            duration_text: None,
            thumbnail_url: None,
        };
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["durationText"], serde_json::Value::Null);
        assert_eq!(json["thumbnailUrl"], serde_json::Value::Null);
        assert_eq!(json["album"], serde_json::Value::Null);
        assert_eq!(json["id"], "abc123");
    }

    #[test]
    fn thumbnail_area_treats_missing_dimensions_as_zero() {
        let thumb = Thumbnail {
            url: "u".into(),
            width: Some(120),
            height: None,
        };
        assert_eq!(thumb.area(), 0);
    }

    #[test]
    fn codec_parameters_do_not_hide_audio() {
        let rendition = MediaRendition {
            mime_type: "audio/webm; codecs=\"opus\"".into(),
            ..Default::default()
        };
        assert!(rendition.is_audio());
    }

    #[test]
    fn blank_url_is_not_fetchable() {
        let rendition = MediaRendition {
            mime_type: "audio/mp4".into(),
            url: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(rendition.fetch_url(), None);
    }
}
