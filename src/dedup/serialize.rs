//! Flatten finalized clusters into output records with cluster ids.

use super::canonical::Cluster;
use super::variants::finalize_variants;
use crate::models::CanonicalRecord;
use tracing::{info, instrument};

/// Hands out `cluster_000000`, `cluster_000001`, ... in order.
///
/// Owned by the caller so repeated runs (and tests) never share a counter.
#[derive(Debug, Default)]
pub struct ClusterIdAllocator {
    next: usize,
}

impl ClusterIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("cluster_{:06}", self.next);
        self.next += 1;
        id
    }
}

/// Finalize every cluster's timeline and assign it an id.
#[instrument(level = "info", skip_all, fields(clusters = clusters.len()))]
pub fn serialize_clusters(
    clusters: Vec<Cluster>,
    min_len: usize,
    ids: &mut ClusterIdAllocator,
) -> Vec<CanonicalRecord> {
    let out: Vec<CanonicalRecord> = clusters
        .into_iter()
        .map(|mut cluster| {
            finalize_variants(&mut cluster.variants, min_len);
            CanonicalRecord {
                dedup_cluster_id: ids.next_id(),
                record: cluster.canonical,
                variants: cluster.variants,
            }
        })
        .collect();
    let variants: usize = out.iter().map(|r| r.variants.len()).sum();
    info!(records = out.len(), variants, "Serialized clusters");
    out
}
