//! JSON output for the deduplicated batch.
//!
//! The output is a single pretty-printed array of canonical records, each
//! carrying its cluster id and its variant timeline:
//!
//! ```text
//! [
//!   {
//!     "url": "...",
//!     "title": "...",
//!     "variants": [ { ..., "canonical": false, "delta_facts": { ... } } ],
//!     "dedup_cluster_id": "cluster_000000",
//!     "canonical": true
//!   }
//! ]
//! ```

use crate::error::DedupError;
use crate::models::CanonicalRecord;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `records` to `path` as a pretty-printed JSON array.
///
/// Parent directories are created first. Non-ASCII text is written as-is.
///
/// # Errors
///
/// Returns [`DedupError::Encode`] if serialization fails and
/// [`DedupError::Io`] if the directory cannot be created or the file cannot
/// be written.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_records(path: &Path, records: &[CanonicalRecord]) -> Result<(), DedupError> {
    let json = serde_json::to_string_pretty(records).map_err(|source| DedupError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        info!(dir = %dir.display(), "Ensuring output directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(DedupError::io(dir, e));
        }
    }

    fs::write(path, json)
        .await
        .map_err(|e| DedupError::io(path, e))?;
    info!("Wrote deduplicated JSON");
    Ok(())
}
