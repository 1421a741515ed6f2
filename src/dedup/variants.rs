//! Variant attachment, delta facts, and timeline ordering.
//!
//! A variant records what a later (or earlier) republish of a story added
//! relative to the canonical text: dates and numbers the canonical never
//! mentions. The extraction is deliberately lexical and cheap; it is a hint
//! for downstream readers, not a diff.

use super::canonical::Cluster;
use super::filter::is_short;
use crate::models::{DeltaFacts, NewsRecord, Variant};
use crate::utils::is_word_char;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

static DATE_PAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|\d{4}年\d{1,2}月\d{1,2}日|\d{4}/\d{1,2}/\d{1,2}")
        .expect("date pattern is valid")
});

/// Layout used for every parsed publish date, so parsed keys compare lexically.
const SORT_KEY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M",
    "%Y年%m月%d日 %H:%M",
    "%Y年%m月%d日 %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];

/// Date-like substrings such as `2025-10-19`, `2025/10/19`, `2025年10月19日`.
pub fn extract_dates(text: &str) -> BTreeSet<String> {
    DATE_PAT
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Standalone numbers, optionally grouped with thousands separators.
///
/// A number only counts when it is not glued to a word character on either
/// side, so `1,234` and `42` are found in `"1,234 and 42."` while `2025年`
/// and `v2` yield nothing.
pub fn extract_numbers(text: &str) -> BTreeSet<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut found = BTreeSet::new();
    let mut i = 0;
    while i < chars.len() {
        let starts_number = is_digit(chars[i]) && (i == 0 || !is_word_char(chars[i - 1]));
        if !starts_number {
            i += 1;
            continue;
        }
        match number_end(&chars, i) {
            Some(end) => {
                found.insert(chars[i..end].iter().collect());
                i = end;
            }
            None => i += 1,
        }
    }
    found
}

/// End of the longest number starting at `start` that is followed by a
/// non-word character or the end of text.
fn number_end(chars: &[char], start: usize) -> Option<usize> {
    let run_end = start + chars[start..].iter().take_while(|c| is_digit(**c)).count();
    let at_boundary = |end: usize| chars.get(end).is_none_or(|c| !is_word_char(*c));

    if run_end - start > 3 {
        return at_boundary(run_end).then_some(run_end);
    }

    // Up to three leading digits, then any number of `,ddd` groups. Prefer
    // the most groups that still end on a boundary.
    let mut ends = vec![run_end];
    let mut pos = run_end;
    while chars.get(pos) == Some(&',')
        && chars.len() >= pos + 4
        && chars[pos + 1..pos + 4].iter().all(|c| is_digit(*c))
    {
        pos += 4;
        ends.push(pos);
    }
    ends.into_iter().rev().find(|&end| at_boundary(end))
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('０'..='９').contains(&c)
}

/// Dates and numbers present in `variant_text` but not in `canonical_text`.
pub fn delta_facts(canonical_text: &str, variant_text: &str) -> DeltaFacts {
    let added = |extract: fn(&str) -> BTreeSet<String>| -> Vec<String> {
        let known = extract(canonical_text);
        extract(variant_text)
            .into_iter()
            .filter(|item| !known.contains(item))
            .collect()
    };
    DeltaFacts {
        added_dates: added(extract_dates),
        added_numbers: added(extract_numbers),
    }
}

/// Attach `absorbed` records under `cluster`'s canonical.
///
/// Short records are dropped. Each survivor gets fresh delta facts against
/// the canonical text and is appended after the variants already present.
pub fn attach_variants(cluster: &mut Cluster, absorbed: Vec<NewsRecord>, min_len: usize) {
    if absorbed.is_empty() {
        return;
    }
    let canonical_text = cluster.canonical.content_text();
    let before = cluster.variants.len();
    for record in absorbed {
        if is_short(&record, min_len) {
            continue;
        }
        let delta_facts = delta_facts(&canonical_text, &record.content_text());
        cluster.variants.push(Variant {
            record,
            delta_facts,
        });
    }
    debug!(
        attached = cluster.variants.len() - before,
        total = cluster.variants.len(),
        "Attached variants"
    );
}

/// Re-apply the length filter and order the timeline oldest first.
pub fn finalize_variants(variants: &mut Vec<Variant>, min_len: usize) {
    variants.retain(|v| !is_short(&v.record, min_len));
    variants.sort_by_cached_key(|v| date_sort_key(&v.record.published_at()));
}

/// Sort key for a raw publish date.
///
/// Dates that parse are rendered as `YYYY-MM-DDTHH:MM:SS` in the wall-clock
/// time they were written in with any offset dropped, so offset-bearing and
/// naive stamps from the same newsroom compare on one clock. Anything else
/// sorts by its raw text.
pub fn date_sort_key(raw: &str) -> String {
    parse_publish_date(raw.trim())
        .map(|dt| dt.format(SORT_KEY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_publish_date(raw: &str) -> Option<NaiveDateTime> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
