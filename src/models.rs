//! Data models for scraped news records and their deduplicated representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`NewsRecord`]: A loosely-keyed attribute bag as scraped from a news source
//! - [`Variant`]: A record merged away under a canonical, with its [`DeltaFacts`]
//! - [`CanonicalRecord`]: One output cluster, ready to serialize
//! - [`DedupStats`]: Before/after counts for a run
//!
//! Scrapers do not agree on key names, so every semantic attribute is looked
//! up through a priority-ordered alias list (see [`URL_FIELDS`] and friends).

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Keys that may hold the article URL, in priority order.
pub const URL_FIELDS: &[&str] = &["url", "link", "source_url"];
/// Keys that may hold the headline.
pub const TITLE_FIELDS: &[&str] = &["title", "headline"];
/// Keys that may hold the body text.
pub const CONTENT_FIELDS: &[&str] = &["content", "body", "text", "article"];
/// Keys that may hold the publish date.
pub const DATE_FIELDS: &[&str] = &[
    "published_at",
    "pubDate",
    "date",
    "time",
    "publish_time",
    "publishedAt",
    "created_at",
    "updated_at",
];
/// Keys that may hold the publisher name.
pub const SOURCE_FIELDS: &[&str] = &["source", "publisher", "site"];

/// A raw news record as produced by a scraper.
///
/// The record is an ordered map of arbitrary JSON attributes. Unknown fields
/// are carried through verbatim; the accessors below only read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewsRecord {
    fields: Map<String, Value>,
}

impl NewsRecord {
    /// Wrap a JSON value, or `None` if it is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Remove and return a raw attribute.
    pub(crate) fn take(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// First present, non-empty value among `keys`.
    ///
    /// `null`, `false`, `0`, `""`, `[]` and `{}` all count as absent.
    pub fn get_first(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k))
            .find(|v| is_present(v))
    }

    /// The trimmed URL, if it resolves to a non-empty string.
    pub fn url(&self) -> Option<&str> {
        self.get_first(URL_FIELDS)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// The headline rendered as text, or empty when absent.
    pub fn title_text(&self) -> String {
        self.get_first(TITLE_FIELDS).map(render).unwrap_or_default()
    }

    /// Normalized headline; empty when absent or not a string.
    pub fn normalized_title(&self) -> String {
        self.get_first(TITLE_FIELDS)
            .and_then(Value::as_str)
            .map(crate::utils::normalize_title)
            .unwrap_or_default()
    }

    /// The body text, only if it resolves to a string.
    pub fn content(&self) -> Option<&str> {
        self.get_first(CONTENT_FIELDS).and_then(Value::as_str)
    }

    /// The body rendered as text, or empty when absent.
    pub fn content_text(&self) -> String {
        self.get_first(CONTENT_FIELDS).map(render).unwrap_or_default()
    }

    /// Character count of the untrimmed body.
    pub fn content_len(&self) -> usize {
        match self.get_first(CONTENT_FIELDS) {
            Some(Value::String(s)) => s.chars().count(),
            Some(other) => render(other).chars().count(),
            None => 0,
        }
    }

    /// The raw publish date rendered as text, or empty when absent.
    pub fn published_at(&self) -> String {
        self.get_first(DATE_FIELDS).map(render).unwrap_or_default()
    }

    /// Publisher name, falling back to the URL's domain.
    ///
    /// For example `https://www.cna.com.tw/news/1.aspx` yields `"cna"`.
    pub fn source(&self) -> Option<String> {
        if let Some(name) = self.get_first(SOURCE_FIELDS).and_then(Value::as_str) {
            return Some(name.trim().to_string());
        }
        self.url().and_then(|url| {
            let parsed = url::Url::parse(url).ok()?;
            let host = parsed.host_str()?;
            let parts: Vec<&str> = host.split('.').collect();
            let domain = match parts.as_slice() {
                [.., name, "com" | "org" | "gov" | "net" | "edu", cc] if cc.len() == 2 => name,
                [.., name, _tld] => name,
                _ => return None,
            };
            Some(domain.to_string())
        })
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Dates and numbers a variant mentions that its canonical does not.
///
/// Computed when the variant is attached; both lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaFacts {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_numbers: Vec<String>,
}

impl DeltaFacts {
    pub fn is_empty(&self) -> bool {
        self.added_dates.is_empty() && self.added_numbers.is_empty()
    }
}

/// A record merged away in favour of a canonical, kept for the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub record: NewsRecord,
    pub delta_facts: DeltaFacts,
}

impl Variant {
    /// Parse a serialized variant list entry.
    ///
    /// Any `variants` nested inside the entry are flattened into the returned
    /// list after the entry itself; a stored `delta_facts` is kept.
    pub fn flatten_from_value(value: Value) -> Vec<Variant> {
        let Some(mut record) = NewsRecord::from_value(value) else {
            return Vec::new();
        };
        let nested = record.take("variants");
        let delta_facts = record
            .take("delta_facts")
            .and_then(|d| serde_json::from_value(d).ok())
            .unwrap_or_default();

        let mut out = vec![Variant {
            record,
            delta_facts,
        }];
        if let Some(Value::Array(items)) = nested {
            out.extend(items.into_iter().flat_map(Variant::flatten_from_value));
        }
        out
    }

    pub fn to_value(&self) -> Value {
        let mut fields = self.record.fields().clone();
        fields.insert("canonical".to_string(), Value::Bool(false));
        if !self.delta_facts.is_empty() {
            if let Ok(delta) = serde_json::to_value(&self.delta_facts) {
                fields.insert("delta_facts".to_string(), delta);
            }
        }
        Value::Object(fields)
    }
}

/// One finalized cluster: the canonical record plus its timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub dedup_cluster_id: String,
    pub record: NewsRecord,
    pub variants: Vec<Variant>,
}

impl CanonicalRecord {
    /// Flatten into the output object: the original fields plus `variants`,
    /// `dedup_cluster_id` and `canonical: true`.
    pub fn to_value(&self) -> Value {
        let mut fields = self.record.fields().clone();
        if !self.variants.is_empty() {
            let variants = self.variants.iter().map(Variant::to_value).collect();
            fields.insert("variants".to_string(), Value::Array(variants));
        }
        fields.insert(
            "dedup_cluster_id".to_string(),
            Value::String(self.dedup_cluster_id.clone()),
        );
        fields.insert("canonical".to_string(), Value::Bool(true));
        Value::Object(fields)
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Counts for one deduplication run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupStats {
    /// Records handed to the engine.
    pub before: usize,
    /// Canonical records emitted.
    pub after: usize,
    /// `before - after`.
    pub removed: usize,
    /// Records dropped up front for short content.
    pub removed_short: usize,
}
