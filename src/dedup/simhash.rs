//! SimHash-64 fingerprints over headline plus a bounded body prefix.
//!
//! Tokens are lowercase Latin/digit runs and CJK character bigrams (plus one
//! leading trigram). Each token is hashed to 64 bits with MD5 (first eight
//! digest bytes, big-endian) so fingerprints are stable across runs and
//! platforms, then every bit position takes a majority vote.

use crate::models::NewsRecord;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fingerprint width in bits.
pub const SIMHASH_BITS: u32 = 64;

static LATIN_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").expect("latin pattern is valid"));

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Split headline and body prefix into SimHash tokens.
///
/// Only the first `content_prefix` characters of the trimmed body take part,
/// which keeps cost bounded and weights the headline heavily. The result is
/// never empty: with nothing to tokenize, the lowercased text is the token.
pub fn tokenize(title: &str, content: &str, content_prefix: usize) -> Vec<String> {
    let prefix: String = content.trim().chars().take(content_prefix).collect();
    let text = format!("{} || {}", title.trim(), prefix);

    let mut tokens: Vec<String> = LATIN_RUN
        .find_iter(&text)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    let cjk: Vec<char> = text.chars().filter(|c| is_cjk(*c)).collect();
    tokens.extend(cjk.windows(2).map(|pair| pair.iter().collect::<String>()));
    if cjk.len() >= 3 {
        tokens.push(cjk[..3].iter().collect());
    }

    if tokens.is_empty() {
        tokens.push(text.to_lowercase());
    }
    tokens
}

/// Stable 64-bit token hash: the leading eight bytes of the MD5 digest.
pub fn md5_64(token: &str) -> u64 {
    let digest = md5::compute(token.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.0[..8]);
    u64::from_be_bytes(head)
}

/// Majority-vote fingerprint over the token hashes. Ties set the bit.
pub fn simhash64<I, S>(tokens: I) -> u64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut votes = [0i64; SIMHASH_BITS as usize];
    for token in tokens {
        let hash = md5_64(token.as_ref());
        for (bit, vote) in votes.iter_mut().enumerate() {
            *vote += if (hash >> bit) & 1 == 1 { 1 } else { -1 };
        }
    }
    votes
        .iter()
        .enumerate()
        .filter(|(_, vote)| **vote >= 0)
        .fold(0u64, |fp, (bit, _)| fp | (1u64 << bit))
}

pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Fingerprint of a record's headline and body prefix.
pub fn fingerprint(record: &NewsRecord, content_prefix: usize) -> u64 {
    simhash64(tokenize(
        &record.title_text(),
        &record.content_text(),
        content_prefix,
    ))
}

/// Coarse bucket: the top `bits` bits of the fingerprint.
pub fn bucket_of(fingerprint: u64, bits: u32) -> u64 {
    debug_assert!((1..=SIMHASH_BITS).contains(&bits));
    fingerprint >> (SIMHASH_BITS - bits)
}
