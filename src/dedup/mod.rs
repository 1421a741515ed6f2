//! The deduplication and canonicalization engine.
//!
//! # Stages
//!
//! | Stage | Module | Effect |
//! |-------|--------|--------|
//! | Content filter | [`filter`] | Drop records with a short or missing body |
//! | URL merge | [`exact`] | Collapse records sharing a URL |
//! | Title merge | [`exact`] | Collapse records sharing a normalized title |
//! | Near-duplicate clustering | [`cluster`] | Collapse close SimHash fingerprints |
//! | Serialization | [`serialize`] | Sort timelines, assign cluster ids |
//!
//! Every merge picks its representative through [`canonical`] and attaches
//! the rest through [`variants`]. Data only moves forward; each invocation
//! owns its working clusters, so concurrent runs need no coordination.

pub mod canonical;
pub mod cluster;
pub mod exact;
pub mod filter;
pub mod serialize;
pub mod simhash;
pub mod variants;

use crate::config::DedupConfig;
use crate::error::DedupError;
use crate::models::{CanonicalRecord, DedupStats, NewsRecord};
use canonical::Cluster;
use cluster::NearDuplicateClusterer;
use serialize::{ClusterIdAllocator, serialize_clusters};
use tracing::{info, instrument};

/// Runs the full pipeline with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    config: DedupConfig,
}

impl Deduplicator {
    /// Build a deduplicator, rejecting parameters the engine cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::InvalidSetting`] if `config` fails
    /// [`DedupConfig::validate`].
    pub fn new(config: DedupConfig) -> Result<Self, DedupError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Deduplicate a batch, drawing cluster ids from `ids`.
    #[instrument(level = "info", skip_all, fields(records = records.len()))]
    pub fn run(
        &self,
        records: Vec<NewsRecord>,
        ids: &mut ClusterIdAllocator,
    ) -> (Vec<CanonicalRecord>, DedupStats) {
        let min_len = self.config.min_content_length;
        let before = records.len();

        let (kept, removed_short) = filter::drop_shorts(records, min_len);
        let clusters: Vec<Cluster> = kept.into_iter().map(Cluster::from_record).collect();
        let clusters = exact::merge_by_url(clusters, min_len);
        let clusters = exact::merge_by_title(clusters, min_len);
        let clusters = NearDuplicateClusterer::new(&self.config).cluster(clusters);
        let out = serialize_clusters(clusters, min_len, ids);

        let stats = DedupStats {
            before,
            after: out.len(),
            removed: before - out.len(),
            removed_short,
        };
        info!(?stats, "Deduplication complete");
        (out, stats)
    }
}

/// Deduplicate `records` with default parameters and the given minimum
/// body length. Cluster ids start at `cluster_000000` on every call.
pub fn deduplicate(
    records: Vec<NewsRecord>,
    min_content_length: usize,
) -> (Vec<CanonicalRecord>, DedupStats) {
    let config = DedupConfig {
        min_content_length,
        ..DedupConfig::default()
    };
    // Only the length threshold differs from the defaults, and it has no range.
    Deduplicator { config }.run(records, &mut ClusterIdAllocator::new())
}
