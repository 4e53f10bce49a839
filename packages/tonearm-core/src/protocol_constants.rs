//! Fixed constants shared across the gateway.
//!
//! Values in the "Output contract" section are part of the public JSON
//! surface and must stay stable: clients and tests match on them.

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used in logs and the health payload.
pub const APP_NAME: &str = "Tonearm";

/// Service identifier reported by `/health`.
pub const SERVICE_ID: &str = "tonearm-gateway";

/// Default HTTP port when neither config nor `PORT` set one.
pub const DEFAULT_PORT: u16 = 3000;

// ─────────────────────────────────────────────────────────────────────────────
// Output contract
// ─────────────────────────────────────────────────────────────────────────────

/// Title emitted for tracks whose upstream record carries no usable title.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Artist emitted for tracks whose upstream record carries no artist names.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Separator used when joining multiple artist names.
pub const ARTIST_SEPARATOR: &str = ", ";

/// Default cap on tracks returned by one search.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Default number of lyrics hits when `limit` is omitted.
pub const DEFAULT_LYRICS_LIMIT: usize = 5;

/// Upper bound accepted for the lyrics `limit` parameter.
pub const MAX_LYRICS_LIMIT: usize = 50;

/// Longest memoization TTL accepted from configuration (one week).
pub const MAX_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Error message returned when the lyrics provider misses its deadline.
pub const LYRICS_TIMEOUT_MESSAGE: &str = "Lyrics timeout";

// ─────────────────────────────────────────────────────────────────────────────
// Resilience
// ─────────────────────────────────────────────────────────────────────────────

/// Attempts made by one initialization round before reporting failure.
pub const DEFAULT_INIT_ATTEMPTS: u32 = 3;

/// Base delay for linear init backoff (attempt N waits `N * base`).
pub const DEFAULT_INIT_BACKOFF_MS: u64 = 1000;

/// Deadline for one lyrics lookup against the secondary provider.
pub const DEFAULT_LYRICS_TIMEOUT_MS: u64 = 8000;

/// Timeout for upstream JSON calls (search, player, bootstrap page).
///
/// Not applied to rendition downloads, which are long-lived by nature.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;

/// Connect timeout applied to every outbound connection.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Streaming
// ─────────────────────────────────────────────────────────────────────────────

/// Chunks buffered between the upstream reader and the HTTP writer.
///
/// Upstream chunks are typically 8-16 KiB, so 16 chunks keep at most a
/// few hundred KiB in flight per listener.
pub const DEFAULT_RELAY_BUFFER_CHUNKS: usize = 16;

// ─────────────────────────────────────────────────────────────────────────────
// Upstream endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Origin of the music catalog web client.
pub const MUSIC_ORIGIN: &str = "https://music.youtube.com";

/// Base URL of the LRCLIB lyrics service.
pub const LRCLIB_BASE_URL: &str = "https://lrclib.net";

/// Desktop browser user agent presented to the catalog.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Consent cookie sent when no session credential is configured.
///
/// Without it the catalog serves a consent interstitial instead of the app shell.
pub const DEFAULT_CONSENT_COOKIE: &str = "SOCS=CAI";
