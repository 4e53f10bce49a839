//! Best-candidate selection for thumbnails and audio renditions.
//!
//! Both policies share one reducer: maximize a numeric score and keep the
//! first candidate on ties. Candidates for which the score function
//! returns `None` are ineligible and never selected.

use crate::model::{MediaRendition, Thumbnail};

/// Returns the highest-scoring eligible candidate, first-seen on ties.
///
/// `Iterator::max_by_key` keeps the *last* maximum, so the fold is explicit.
pub fn best_by<'a, T, I, F>(candidates: I, score: F) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Option<u64>,
{
    let mut best: Option<(&'a T, u64)> = None;
    for candidate in candidates {
        let Some(value) = score(candidate) else {
            continue;
        };
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((candidate, value)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Picks the thumbnail with the largest pixel area.
pub fn best_thumbnail(candidates: &[Thumbnail]) -> Option<&Thumbnail> {
    best_by(candidates, |thumb| {
        (!thumb.url.trim().is_empty()).then(|| thumb.area())
    })
}

/// Picks the audio rendition with the highest bitrate.
///
/// Only renditions whose mime type mentions `audio` and which carry a URL
/// qualify. Video-only and URL-less renditions are never returned.
pub fn best_audio(candidates: &[MediaRendition]) -> Option<&MediaRendition> {
    best_by(candidates, |rendition| {
        (rendition.is_audio() && rendition.fetch_url().is_some())
            .then(|| rendition.bitrate_bps.unwrap_or(0))
    })
}
