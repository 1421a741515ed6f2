//! Loading the merged scrape document and resolving it to a record list.
//!
//! Upstream merge steps have emitted several document shapes over time, so
//! [`extract_items`] accepts all of them:
//!
//! - a top-level array of objects
//! - an object with an `items`, `articles` or `data` array
//! - an object whose values are all arrays (concatenated in key order), as
//!   long as they hold at least one object
//! - any other object, treated as a one-record batch
//!
//! Anything else resolves to zero records rather than an error.

use crate::error::DedupError;
use crate::models::NewsRecord;
use crate::utils::looks_truncated;
use itertools::Itertools;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::{Level, debug, enabled, info, instrument, warn};

/// Wrapper keys checked, in order, for an embedded record array.
const LIST_KEYS: &[&str] = &["items", "articles", "data"];

const UTF8_BOM: char = '\u{feff}';

/// Resolve a parsed document to its records. Non-object entries are skipped.
pub fn extract_items(doc: Value) -> Vec<NewsRecord> {
    let items = match doc {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let wrapped = LIST_KEYS
                .iter()
                .find(|k| matches!(map.get(**k), Some(Value::Array(_))))
                .and_then(|k| map.shift_remove(*k));
            if let Some(Value::Array(items)) = wrapped {
                items
            } else if all_arrays_with_objects(&map) {
                map.into_iter()
                    .flat_map(|(_, v)| match v {
                        Value::Array(items) => items,
                        _ => Vec::new(),
                    })
                    .collect()
            } else {
                vec![Value::Object(map)]
            }
        }
        _ => Vec::new(),
    };
    items.into_iter().filter_map(NewsRecord::from_value).collect()
}

/// Every value is an array and at least one of them holds an object.
fn all_arrays_with_objects(map: &serde_json::Map<String, Value>) -> bool {
    map.values().all(Value::is_array)
        && map
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .any(Value::is_object)
}

/// Read and parse the input document at `path`.
///
/// # Errors
///
/// [`DedupError::InputNotFound`] when the file is missing,
/// [`DedupError::Io`] when it cannot be read, and [`DedupError::Json`] when
/// it is not valid JSON.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_input(path: &Path) -> Result<Vec<NewsRecord>, DedupError> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(DedupError::InputNotFound(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| DedupError::io(path, e))?;
    let text = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw);

    let doc: Value = serde_json::from_str(text).map_err(|source| {
        if looks_truncated(&source) {
            warn!(error = %source, "Input ends mid-document; the file looks truncated");
        }
        DedupError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let records = extract_items(doc);
    info!(count = records.len(), "Loaded input records");
    if enabled!(Level::DEBUG) {
        log_source_counts(&records);
    }
    Ok(records)
}

fn log_source_counts(records: &[NewsRecord]) {
    let counts = records
        .iter()
        .map(|r| r.source().unwrap_or_else(|| "unknown".to_string()))
        .counts();
    for (source, count) in counts.into_iter().sorted() {
        debug!(%source, count, "Records per source");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn titles(records: &[NewsRecord]) -> Vec<String> {
        records.iter().map(NewsRecord::title_text).collect()
    }

    #[test]
    fn test_top_level_array() {
        let records = extract_items(json!([{"title": "a"}, {"title": "b"}, 3, "x"]));
        assert_eq!(titles(&records), vec!["a", "b"]);
    }

    #[test]
    fn test_wrapped_list_keys() {
        assert_eq!(extract_items(json!({"items": [{"title": "i"}]})).len(), 1);
        assert_eq!(
            titles(&extract_items(json!({"meta": 1, "articles": [{"title": "a"}]}))),
            vec!["a"]
        );
        assert_eq!(titles(&extract_items(json!({"data": [{"title": "d"}]}))), vec!["d"]);
    }

    #[test]
    fn test_items_takes_priority_over_data() {
        let records = extract_items(json!({"data": [{"title": "d"}], "items": [{"title": "i"}]}));
        assert_eq!(titles(&records), vec!["i"]);
    }

    #[test]
    fn test_object_of_arrays_is_concatenated() {
        let records = extract_items(json!({
            "cna": [{"title": "c1"}, {"title": "c2"}],
            "pts": [{"title": "p1"}],
        }));
        assert_eq!(titles(&records), vec!["c1", "c2", "p1"]);
    }

    #[test]
    fn test_object_of_arrays_without_objects_is_one_record() {
        let records = extract_items(json!({"cna": [], "pts": []}));
        assert_eq!(records.len(), 1);
        assert!(records[0].fields().contains_key("cna"));

        let records = extract_items(json!({"a": [1, 2]}));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields()["a"], json!([1, 2]));
    }

    #[test]
    fn test_object_of_arrays_counts_as_short_record() {
        let (out, stats) = crate::deduplicate(extract_items(json!({"cna": [], "pts": []})), 40);
        assert!(out.is_empty());
        assert_eq!(stats.before, 1);
        assert_eq!(stats.removed_short, 1);
    }

    #[test]
    fn test_single_object_is_one_record() {
        let records = extract_items(json!({"title": "solo", "content": "body"}));
        assert_eq!(titles(&records), vec!["solo"]);
    }

    #[test]
    fn test_unresolvable_shapes_are_empty() {
        assert!(extract_items(json!("text")).is_empty());
        assert!(extract_items(json!(42)).is_empty());
        assert!(extract_items(Value::Null).is_empty());
    }

    #[tokio::test]
    async fn test_read_input_missing_file() {
        let path = std::env::temp_dir().join("news_dedup_definitely_missing.json");
        let err = read_input(&path).await.unwrap_err();
        assert!(matches!(err, DedupError::InputNotFound(_)));
    }

    #[tokio::test]
    async fn test_read_input_tolerates_bom() {
        let path = std::env::temp_dir().join(format!("news_dedup_bom_{}.json", std::process::id()));
        tokio::fs::write(&path, "\u{feff}[{\"title\": \"台股\"}]").await.unwrap();
        let records = read_input(&path).await.unwrap();
        assert_eq!(titles(&records), vec!["台股"]);
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_read_input_invalid_json() {
        let path = std::env::temp_dir().join(format!("news_dedup_bad_{}.json", std::process::id()));
        tokio::fs::write(&path, "[{\"title\": ").await.unwrap();
        let err = read_input(&path).await.unwrap_err();
        assert!(matches!(err, DedupError::Json { .. }));
        let _ = tokio::fs::remove_file(&path).await;
    }
}
