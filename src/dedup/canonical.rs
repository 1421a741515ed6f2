//! Canonical selection and the transient [`Cluster`] working group.
//!
//! Every merge stage reduces a group of equivalent clusters to one by the
//! same total order: longer body wins, then the lexicographically smaller
//! normalized title. Publish time is deliberately not a criterion, so the
//! earliest report survives as a timeline entry rather than deciding the
//! representative.

use super::variants::attach_variants;
use crate::models::{NewsRecord, Variant};
use crate::utils::truncate_for_log;
use tracing::debug;

/// A canonical record and the variants folded into it so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cluster {
    pub canonical: NewsRecord,
    pub variants: Vec<Variant>,
}

impl Cluster {
    /// Start a cluster from an input record.
    ///
    /// A record that already carries a `variants` list (for example a
    /// previous run's output) keeps it, flattened one level.
    pub fn from_record(mut record: NewsRecord) -> Self {
        let variants = match record.take("variants") {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .flat_map(Variant::flatten_from_value)
                .collect(),
            _ => Vec::new(),
        };
        Self {
            canonical: record,
            variants,
        }
    }

    /// Detach everything: the canonical becomes one more record to absorb.
    fn into_absorbed(self) -> impl Iterator<Item = NewsRecord> {
        std::iter::once(self.canonical).chain(self.variants.into_iter().map(|v| v.record))
    }
}

/// Whether `candidate` should replace `incumbent` as the canonical.
///
/// Strict: on a full tie the incumbent stays.
pub fn outranks(candidate: &NewsRecord, incumbent: &NewsRecord) -> bool {
    let (cand_len, inc_len) = (candidate.content_len(), incumbent.content_len());
    if cand_len != inc_len {
        return cand_len > inc_len;
    }
    candidate.normalized_title() < incumbent.normalized_title()
}

/// Index of the canonical among `members`, folding left to right.
pub fn select_canonical(members: &[Cluster]) -> Option<usize> {
    members
        .iter()
        .enumerate()
        .reduce(|best, cand| {
            if outranks(&cand.1.canonical, &best.1.canonical) {
                cand
            } else {
                best
            }
        })
        .map(|(i, _)| i)
}

/// Collapse a group of equivalent clusters into one.
///
/// The winner keeps its own variants; every other member and all of its
/// variants are re-attached under the winner, so variant lists never nest.
///
/// # Panics
///
/// Panics if `members` is empty. Every caller builds groups from at least
/// one cluster.
pub fn merge_group(mut members: Vec<Cluster>, min_len: usize) -> Cluster {
    let winner_idx = select_canonical(&members).expect("duplicate group has at least one member");
    let mut winner = members.remove(winner_idx);
    let absorbed: Vec<NewsRecord> = members
        .into_iter()
        .flat_map(Cluster::into_absorbed)
        .collect();

    debug!(
        canonical = %truncate_for_log(&winner.canonical.title_text(), 60),
        absorbed = absorbed.len(),
        "Merging duplicate group"
    );
    attach_variants(&mut winner, absorbed, min_len);
    winner
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cluster(title: &str, content: &str) -> Cluster {
        Cluster::from_record(
            NewsRecord::from_value(json!({"title": title, "content": content})).unwrap(),
        )
    }

    #[test]
    fn test_longer_content_wins() {
        let short = cluster("b", &"x".repeat(50));
        let long = cluster("a", &"y".repeat(80));
        assert!(outranks(&long.canonical, &short.canonical));
        assert!(!outranks(&short.canonical, &long.canonical));
    }

    #[test]
    fn test_title_breaks_length_tie() {
        let a = cluster("Alpha", &"x".repeat(50));
        let b = cluster("beta", &"y".repeat(50));
        assert!(outranks(&a.canonical, &b.canonical));
        assert!(!outranks(&b.canonical, &a.canonical));
    }

    #[test]
    fn test_full_tie_keeps_incumbent() {
        let a = cluster("same", &"x".repeat(50));
        let b = cluster("same", &"y".repeat(50));
        assert!(!outranks(&b.canonical, &a.canonical));
        assert!(!outranks(&a.canonical, &b.canonical));
    }

    #[test]
    fn test_select_canonical_is_order_independent() {
        let members = vec![
            cluster("c", &"x".repeat(60)),
            cluster("b", &"x".repeat(90)),
            cluster("a", &"x".repeat(90)),
        ];
        assert_eq!(select_canonical(&members), Some(2));

        let reversed: Vec<Cluster> = members.into_iter().rev().collect();
        assert_eq!(select_canonical(&reversed), Some(0));
        assert_eq!(reversed[0].canonical.title_text(), "a");
    }

    #[test]
    fn test_select_canonical_empty() {
        assert_eq!(select_canonical(&[]), None);
    }

    #[test]
    fn test_merge_group_flattens_variants() {
        let mut loser = cluster("loser", &"l".repeat(50));
        loser.variants.push(Variant {
            record: NewsRecord::from_value(json!({"title": "old", "content": "o".repeat(45)}))
                .unwrap(),
            delta_facts: Default::default(),
        });
        let winner = cluster("winner", &"w".repeat(70));

        let merged = merge_group(vec![loser, winner], 40);
        assert_eq!(merged.canonical.title_text(), "winner");
        let titles: Vec<String> = merged.variants.iter().map(|v| v.record.title_text()).collect();
        assert_eq!(titles, vec!["loser", "old"]);
    }

    #[test]
    fn test_merge_group_drops_short_members() {
        let merged = merge_group(
            vec![cluster("keep", &"k".repeat(60)), cluster("tiny", "too short")],
            40,
        );
        assert_eq!(merged.canonical.title_text(), "keep");
        assert!(merged.variants.is_empty());
    }

    #[test]
    #[should_panic(expected = "at least one member")]
    fn test_merge_group_rejects_empty_group() {
        merge_group(Vec::new(), 40);
    }

    #[test]
    fn test_merge_group_keeps_member_order_for_variants() {
        let merged = merge_group(
            vec![
                cluster("first", &"a".repeat(50)),
                cluster("winner", &"w".repeat(90)),
                cluster("third", &"c".repeat(60)),
            ],
            40,
        );
        let titles: Vec<String> = merged.variants.iter().map(|v| v.record.title_text()).collect();
        assert_eq!(titles, vec!["first", "third"]);
    }

    #[test]
    fn test_from_record_reads_existing_variants() {
        let record = NewsRecord::from_value(json!({
            "title": "t",
            "content": "c".repeat(50),
            "variants": [{"title": "v1"}, {"title": "v2"}]
        }))
        .unwrap();
        let cluster = Cluster::from_record(record);
        assert_eq!(cluster.variants.len(), 2);
        assert!(!cluster.canonical.fields().contains_key("variants"));
    }
}
