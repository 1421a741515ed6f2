//! # News Dedup
//!
//! A deduplication and canonicalization engine for scraped news articles.
//!
//! Records arrive as loosely-keyed JSON objects from several scrapers. The
//! engine drops records with too little body text, merges exact duplicates
//! by URL and then by normalized title, and finally clusters near-duplicates
//! by SimHash fingerprint. Each surviving canonical record keeps the records
//! it absorbed as a date-ordered list of variants, annotated with the dates
//! and numbers each variant mentions that the canonical does not.
//!
//! ## Example
//!
//! ```
//! use news_dedup::{NewsRecord, deduplicate};
//! use serde_json::json;
//!
//! let body = "The council approved the transit budget after a long debate.";
//! let records = vec![
//!     NewsRecord::from_value(json!({"url": "https://a/1", "content": body})).unwrap(),
//!     NewsRecord::from_value(json!({"url": "https://a/1", "content": format!("{body} More.")})).unwrap(),
//! ];
//! let (canonicals, stats) = deduplicate(records, 40);
//! assert_eq!(canonicals.len(), 1);
//! assert_eq!(canonicals[0].variants.len(), 1);
//! assert_eq!(stats.removed, 1);
//! ```

pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod inputs;
pub mod models;
pub mod outputs;
pub mod utils;

pub use config::DedupConfig;
pub use dedup::{Deduplicator, deduplicate};
pub use error::DedupError;
pub use models::{CanonicalRecord, DedupStats, DeltaFacts, NewsRecord, Variant};
