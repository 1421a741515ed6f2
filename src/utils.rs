//! Utility functions for title normalization, log formatting, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Title normalization used as a grouping key and tie-break
//! - String truncation for logging long titles
//! - JSON error detection for truncated input files
//! - File system validation and staleness checks for the output file

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, info, instrument};

/// Punctuation and whitespace runs (ASCII and common CJK) collapsed by [`normalize_title`].
static PUNCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\s.,!?:;\-_()\[\]{}"'/\\|+=*&^%$#@~`，。！？：；、（）【】《》〈〉…]+"#)
        .expect("punctuation pattern is valid")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalize a title for equality grouping.
///
/// Lowercases, replaces runs of punctuation and whitespace with a single
/// space, then collapses and trims whitespace. Two titles are the same
/// story title iff their normalized forms are equal.
///
/// # Examples
///
/// ```
/// use news_dedup::utils::normalize_title;
/// assert_eq!(normalize_title("台股今日上漲！"), "台股今日上漲");
/// assert_eq!(normalize_title("  Hello,   World!! "), "hello world");
/// ```
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let spaced = PUNCT.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&spaced, " ").trim().to_string()
}

/// Whether `c` counts as a word character when delimiting numbers.
///
/// Letters and digits of any script plus underscore, so a number glued to
/// CJK text (`2025年`) is not treated as a standalone number.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended. Cuts always land on a char boundary, so
/// CJK titles are safe to pass in.
///
/// # Examples
///
/// ```
/// use news_dedup::utils::truncate_for_log;
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// A scraper that died mid-write leaves an input file that fails with an EOF
/// error; the caller uses this to log a more helpful message.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Whether `output` exists and was modified after `input`.
///
/// Any metadata error (missing file, unsupported mtime) counts as stale so
/// the caller re-runs.
#[instrument(level = "debug", skip_all, fields(input = %input.display(), output = %output.display()))]
pub async fn is_up_to_date(input: &Path, output: &Path) -> bool {
    match (modified(input).await, modified(output).await) {
        (Some(in_m), Some(out_m)) => {
            let fresh = out_m > in_m;
            debug!(fresh, "Compared modification times");
            fresh
        }
        _ => false,
    }
}

async fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).await.and_then(|m| m.modified()).ok()
}
