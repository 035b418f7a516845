//! Near-duplicate removal for extracted place names
//!
//! Extraction over several search results produces noisy, overlapping name
//! lists ("Paris", "paris ", "PARIS!"). Candidates are canonicalized, broad
//! region names and stopword-only entries are dropped, then near-duplicates
//! are removed with fuzzy token-sort similarity. First occurrence wins, so
//! the surviving form of each cluster is the one seen earliest.

use std::collections::HashSet;
use tracing::debug;

const BUILT_IN_REGIONS: &str = include_str!("../../assets/regions.txt");

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "by", "for", "in", "near", "of", "on", "or", "the", "to", "with",
];

#[derive(Debug, Clone)]
pub struct DedupeConfig {
    /// Similarity at or above which two candidates count as the same place.
    pub threshold: f64,
    pub stopwords: HashSet<String>,
    /// Canonicalized names too broad to investigate (countries, states).
    pub excluded_regions: HashSet<String>,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            stopwords: STOPWORDS.iter().map(|s| s.to_string()).collect(),
            excluded_regions: BUILT_IN_REGIONS
                .lines()
                .map(canonical)
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }
}

impl DedupeConfig {
    /// Extend the built-in exclusion list, canonicalizing as it goes.
    pub fn with_extra_regions<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for region in extra {
            let region = canonical(region.as_ref());
            if !region.is_empty() {
                self.excluded_regions.insert(region);
            }
        }
        self
    }
}

/// Lowercase, strip punctuation, and collapse whitespace, preserving token
/// order.
fn canonical(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Like [`canonical`] but with tokens sorted, so word order stops mattering.
fn token_sort_key(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split(' ').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Fuzzy similarity between two phrases, insensitive to case, punctuation,
/// and word order. Returns a score in `[0, 1]`.
pub fn token_sort_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&token_sort_key(&canonical(a)), &token_sort_key(&canonical(b)))
}

/// Collapse a candidate list to one representative per similarity cluster.
///
/// Greedy and order-dependent: each candidate is compared against every
/// already-accepted one, and the first form seen for a cluster is the one
/// kept. No two returned entries score at or above `config.threshold`
/// against each other.
pub fn filter_similar_phrases(candidates: &[String], config: &DedupeConfig) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    let mut kept_keys: Vec<String> = Vec::new();

    for candidate in candidates {
        let canon = canonical(candidate);
        if canon.is_empty() {
            continue;
        }
        if canon.split(' ').all(|t| config.stopwords.contains(t)) {
            debug!("filter_similar_phrases: dropping stopword entry '{candidate}'");
            continue;
        }
        if config.excluded_regions.contains(&canon) {
            debug!("filter_similar_phrases: dropping broad region '{candidate}'");
            continue;
        }

        let key = token_sort_key(&canon);
        let duplicate = kept_keys
            .iter()
            .any(|seen| strsim::normalized_levenshtein(seen, &key) >= config.threshold);
        if duplicate {
            continue;
        }

        kept.push(candidate.trim().to_string());
        kept_keys.push(key);
    }

    kept
}
