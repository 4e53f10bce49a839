//! General utilities shared across the application.

use std::sync::OnceLock;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::Regex;

// ─────────────────────────────────────────────────────────────────────────────
// Download Naming
// ─────────────────────────────────────────────────────────────────────────────

fn disallowed_filename_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s-]").expect("filename pattern is a valid regex"))
}

fn whitespace_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"))
}

/// Reduces `title` to word characters, single spaces, and `-`.
///
/// Line breaks, tabs and other whitespace collapse to one space so the
/// result is always a valid header token. Falls back to `fallback` (the
/// media id) when nothing survives.
#[must_use]
pub fn sanitize_filename(title: Option<&str>, fallback: &str) -> String {
    let cleaned = title
        .map(|t| disallowed_filename_chars().replace_all(t, "").into_owned())
        .map(|t| whitespace_runs().replace_all(&t, " ").trim().to_string())
        .unwrap_or_default();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// File extension for a rendition mime type. Codec parameters are ignored.
#[must_use]
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    match essence.to_ascii_lowercase().as_str() {
        "audio/webm" => "webm",
        "audio/mp4" => "m4a",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        _ => "bin",
    }
}

/// Builds an `attachment` Content-Disposition value.
///
/// The quoted `filename` is restricted to ASCII so it is always a valid
/// header value; `filename*` carries the full UTF-8 name.
#[must_use]
pub fn content_disposition(stem: &str, extension: &str) -> String {
    let full = format!("{stem}.{extension}");
    let ascii: String = full
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect();
    if ascii == full {
        format!("attachment; filename=\"{full}\"")
    } else {
        format!(
            "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
            utf8_percent_encode(&full, NON_ALPHANUMERIC)
        )
    }
}
