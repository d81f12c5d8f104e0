//! Fuzzy name scoring against the reference index
//!
//! Two independent strategies: token-set overlap (order-independent, catches
//! reordered words) and whole-string edit-distance similarity (catches typos
//! and abbreviations). A candidate keeps the better of its weighted scores,
//! so a name only has to do well under one metric.

use std::cmp::Ordering;

use crate::normalize::token_set;
use crate::reference::{IndexedEntry, ReferenceIndex};
use mailsort_types::MatchCandidate;

/// A single similarity metric over normalized names
pub trait ScoringStrategy: Send + Sync {
    /// Similarity in [0, 1]
    fn score(&self, query: &str, candidate: &str) -> f64;
}

/// Jaccard overlap of normalized token sets
pub struct TokenSetOverlap;

impl ScoringStrategy for TokenSetOverlap {
    fn score(&self, query: &str, candidate: &str) -> f64 {
        let a = token_set(query);
        let b = token_set(candidate);
        if a.is_empty() && b.is_empty() {
            return if query == candidate { 1.0 } else { 0.0 };
        }
        let intersection = a.intersection(&b).count();
        let union = a.union(&b).count();
        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }
}

/// Normalized Levenshtein similarity over the whole string
pub struct EditSimilarity;

impl ScoringStrategy for EditSimilarity {
    fn score(&self, query: &str, candidate: &str) -> f64 {
        strsim::normalized_levenshtein(query, candidate)
    }
}

/// Combines the scoring strategies as a weighted maximum
pub struct Matcher {
    strategies: Vec<(Box<dyn ScoringStrategy>, f64)>,
}

impl Matcher {
    pub fn new(token_weight: f64, edit_weight: f64) -> Self {
        Self {
            strategies: vec![
                (Box::new(TokenSetOverlap) as Box<dyn ScoringStrategy>, token_weight),
                (Box::new(EditSimilarity) as Box<dyn ScoringStrategy>, edit_weight),
            ],
        }
    }

    /// Best weighted score across strategies, clamped to [0, 1]
    fn combined(&self, query: &str, candidate: &str) -> f64 {
        self.strategies
            .iter()
            .map(|(strategy, weight)| weight * strategy.score(query, candidate))
            .fold(0.0, f64::max)
            .clamp(0.0, 1.0)
    }

    /// Score one entry: the best over its canonical name and aliases
    fn score_entry(&self, query: &str, indexed: &IndexedEntry) -> f64 {
        indexed
            .normalized_names
            .iter()
            .map(|name| self.combined(query, name))
            .fold(0.0, f64::max)
    }

    /// Rank every reference entry against a normalized query
    ///
    /// Descending by score; ties broken by canonical name so repeated calls
    /// with the same inputs produce identical output.
    pub fn rank(&self, normalized_query: &str, index: &ReferenceIndex) -> Vec<MatchCandidate> {
        let mut ranked: Vec<MatchCandidate> = index
            .entries()
            .iter()
            .map(|indexed| MatchCandidate {
                entry: indexed.entry.clone(),
                score: self.score_entry(normalized_query, indexed),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.entry.canonical_name.cmp(&b.entry.canonical_name))
        });
        ranked
    }
}
