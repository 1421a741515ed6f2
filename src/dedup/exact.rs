//! Exact-key merging by URL and by normalized title.
//!
//! Both stages share one shape: group by key in first-seen order, collapse
//! each group of two or more through the canonical selector, then append the
//! records whose key is absent untouched.

use super::canonical::{Cluster, merge_group};
use crate::models::NewsRecord;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Merge clusters whose canonicals share the same key.
///
/// Records for which `key` returns `None` never merge here and are emitted
/// after all keyed groups, in input order.
pub fn merge_by_key<F>(clusters: Vec<Cluster>, min_len: usize, key: F) -> Vec<Cluster>
where
    F: Fn(&NewsRecord) -> Option<String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<Cluster>> = Vec::new();
    let mut keyless: Vec<Cluster> = Vec::new();

    for cluster in clusters {
        match key(&cluster.canonical) {
            Some(k) => {
                let slot = *index.entry(k).or_insert_with(|| {
                    groups.push(Vec::new());
                    groups.len() - 1
                });
                groups[slot].push(cluster);
            }
            None => keyless.push(cluster),
        }
    }

    let merged_groups = groups.iter().filter(|g| g.len() > 1).count();
    let mut out: Vec<Cluster> = Vec::with_capacity(groups.len() + keyless.len());
    for group in groups {
        if group.len() == 1 {
            out.extend(group);
        } else {
            out.push(merge_group(group, min_len));
        }
    }
    info!(
        merged_groups,
        keyless = keyless.len(),
        output = out.len() + keyless.len(),
        "Exact-key merge complete"
    );
    out.extend(keyless);
    out
}

/// Merge records that share an identical (trimmed) URL.
#[instrument(level = "info", skip_all, fields(stage = "url", input = clusters.len()))]
pub fn merge_by_url(clusters: Vec<Cluster>, min_len: usize) -> Vec<Cluster> {
    merge_by_key(clusters, min_len, |r| r.url().map(str::to_string))
}

/// Merge records whose normalized titles are identical.
#[instrument(level = "info", skip_all, fields(stage = "title", input = clusters.len()))]
pub fn merge_by_title(clusters: Vec<Cluster>, min_len: usize) -> Vec<Cluster> {
    merge_by_key(clusters, min_len, |r| {
        Some(r.normalized_title()).filter(|t| !t.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn clusters(values: Vec<Value>) -> Vec<Cluster> {
        values
            .into_iter()
            .map(|v| Cluster::from_record(NewsRecord::from_value(v).unwrap()))
            .collect()
    }

    #[test]
    fn test_url_merge_picks_longer_content() {
        let out = merge_by_url(
            clusters(vec![
                json!({"url": "https://a/1", "title": "first", "content": "a".repeat(50)}),
                json!({"url": "https://a/1", "title": "second", "content": "b".repeat(80)}),
            ]),
            40,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].canonical.content_len(), 80);
        assert_eq!(out[0].variants.len(), 1);
        assert_eq!(out[0].variants[0].record.content_len(), 50);
    }

    #[test]
    fn test_url_merge_trims_whitespace() {
        let out = merge_by_url(
            clusters(vec![
                json!({"url": " https://a/1", "content": "a".repeat(50)}),
                json!({"link": "https://a/1 ", "content": "b".repeat(50)}),
            ]),
            40,
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_records_without_url_pass_through_last() {
        let out = merge_by_url(
            clusters(vec![
                json!({"title": "no url 1", "content": "a".repeat(50)}),
                json!({"url": "https://a/1", "title": "keyed", "content": "b".repeat(50)}),
                json!({"title": "no url 2", "content": "c".repeat(50)}),
            ]),
            40,
        );
        let titles: Vec<String> = out.iter().map(|c| c.canonical.title_text()).collect();
        assert_eq!(titles, vec!["keyed", "no url 1", "no url 2"]);
    }

    #[test]
    fn test_title_merge_ignores_punctuation() {
        let out = merge_by_title(
            clusters(vec![
                json!({"url": "https://a/1", "title": "台股今日上漲", "content": "漲".repeat(60)}),
                json!({"url": "https://b/2", "title": "台股今日上漲！", "content": "跌".repeat(45)}),
            ]),
            40,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].canonical.content_len(), 60);
        assert_eq!(out[0].variants.len(), 1);
    }

    #[test]
    fn test_title_merge_flattens_carried_variants() {
        let carried = json!({
            "title": "Same Story",
            "content": "b".repeat(50),
            "variants": [{"title": "old copy", "content": "c".repeat(45)}]
        });
        let out = merge_by_title(
            clusters(vec![json!({"title": "Same Story", "content": "a".repeat(90)}), carried]),
            40,
        );
        assert_eq!(out.len(), 1);
        let titles: Vec<String> = out[0].variants.iter().map(|v| v.record.title_text()).collect();
        assert_eq!(titles, vec!["Same Story", "old copy"]);
    }

    #[test]
    fn test_empty_titles_never_merge() {
        let out = merge_by_title(
            clusters(vec![
                json!({"title": "!!!", "content": "a".repeat(50)}),
                json!({"title": "", "content": "b".repeat(50)}),
                json!({"content": "c".repeat(50)}),
            ]),
            40,
        );
        assert_eq!(out.len(), 3);
    }
}
