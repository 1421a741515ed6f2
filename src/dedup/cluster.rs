//! Near-duplicate clustering over SimHash fingerprints.
//!
//! Records are bucketed by the top bits of their fingerprint. Inside a
//! bucket each record merges into the first representative within the
//! Hamming threshold, in input order; it is not a transitive closure and
//! never compares across buckets. Pairs that are close but land in
//! different buckets are counted as near misses for diagnostics.

use super::canonical::{Cluster, merge_group, outranks};
use super::simhash::{bucket_of, fingerprint, hamming_distance};
use crate::config::DedupConfig;
use std::collections::HashMap;
use tracing::{Level, debug, enabled, info, instrument};

/// Greedy bucketed SimHash clusterer.
#[derive(Debug, Clone)]
pub struct NearDuplicateClusterer {
    hamming_threshold: u32,
    bucket_bits: u32,
    content_prefix: usize,
    min_len: usize,
}

impl NearDuplicateClusterer {
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            hamming_threshold: config.hamming_threshold,
            bucket_bits: config.bucket_bits,
            content_prefix: config.content_prefix,
            min_len: config.min_content_length,
        }
    }

    /// Fingerprint every cluster's canonical and merge near-duplicates.
    #[instrument(level = "info", skip_all, fields(input = clusters.len()))]
    pub fn cluster(&self, clusters: Vec<Cluster>) -> Vec<Cluster> {
        let fingerprinted = clusters
            .into_iter()
            .map(|c| {
                let fp = fingerprint(&c.canonical, self.content_prefix);
                (c, fp)
            })
            .collect();
        let merged = self.cluster_fingerprinted(fingerprinted);

        if enabled!(Level::DEBUG) {
            let fps: Vec<u64> = merged.iter().map(|(_, fp)| *fp).collect();
            let near_misses =
                cross_bucket_near_misses(&fps, self.hamming_threshold, self.bucket_bits);
            debug!(near_misses, "Close fingerprints split across buckets");
        }

        info!(output = merged.len(), "Near-duplicate clustering complete");
        merged.into_iter().map(|(c, _)| c).collect()
    }

    /// Cluster records whose fingerprints are already known.
    ///
    /// Returns representatives with their fingerprints, buckets in first-seen
    /// order and representatives in insertion order within each bucket.
    pub fn cluster_fingerprinted(&self, items: Vec<(Cluster, u64)>) -> Vec<(Cluster, u64)> {
        let mut order: Vec<u64> = Vec::new();
        let mut buckets: HashMap<u64, Vec<(Cluster, u64)>> = HashMap::new();

        for (incoming, fp) in items {
            let key = bucket_of(fp, self.bucket_bits);
            let reps = buckets.entry(key).or_insert_with(|| {
                order.push(key);
                Vec::new()
            });

            let slot = reps
                .iter_mut()
                .find(|(_, rep_fp)| hamming_distance(fp, *rep_fp) <= self.hamming_threshold);
            match slot {
                Some(slot) => {
                    let (rep, rep_fp) = std::mem::take(slot);
                    let winner_fp = if outranks(&incoming.canonical, &rep.canonical) {
                        fp
                    } else {
                        rep_fp
                    };
                    debug!(
                        bucket = key,
                        distance = hamming_distance(fp, rep_fp),
                        "Near-duplicate found"
                    );
                    *slot = (merge_group(vec![rep, incoming], self.min_len), winner_fp);
                }
                None => reps.push((incoming, fp)),
            }
        }

        order
            .into_iter()
            .filter_map(|key| buckets.remove(&key))
            .flatten()
            .collect()
    }
}

/// Pairs of fingerprints within `threshold` bits of each other that sit in
/// different buckets, and so were never compared.
pub fn cross_bucket_near_misses(fingerprints: &[u64], threshold: u32, bucket_bits: u32) -> usize {
    let mut count = 0;
    for (i, &a) in fingerprints.iter().enumerate() {
        for &b in &fingerprints[i + 1..] {
            if bucket_of(a, bucket_bits) != bucket_of(b, bucket_bits)
                && hamming_distance(a, b) <= threshold
            {
                count += 1;
            }
        }
    }
    count
}
