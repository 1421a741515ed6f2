//! Short-content filter.
//!
//! Runs once over the whole batch before any merge, and again on every
//! variant that is about to be attached to a canonical.

use crate::models::NewsRecord;
use tracing::{debug, info, instrument};

/// Whether a record's body is missing, not text, or shorter than `min_len`
/// characters once trimmed.
pub fn is_short(record: &NewsRecord, min_len: usize) -> bool {
    match record.content() {
        Some(text) => text.trim().chars().count() < min_len,
        None => true,
    }
}

/// Split off short records, returning the survivors and how many were dropped.
#[instrument(level = "info", skip_all, fields(input = records.len(), min_len = min_len))]
pub fn drop_shorts(records: Vec<NewsRecord>, min_len: usize) -> (Vec<NewsRecord>, usize) {
    let total = records.len();
    let kept: Vec<NewsRecord> = records
        .into_iter()
        .filter(|r| {
            let short = is_short(r, min_len);
            if short {
                debug!(url = r.url().unwrap_or("-"), "Dropping short record");
            }
            !short
        })
        .collect();
    let removed = total - kept.len();
    info!(kept = kept.len(), removed, "Filtered short content");
    (kept, removed)
}
