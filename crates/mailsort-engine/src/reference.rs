//! Job-scoped reference index
//!
//! Built once per job from the curated company list. The base list is never
//! mutated; review decisions that introduce a new company insert into the
//! job's own copy, so concurrent jobs cannot see each other's additions.

use std::collections::HashMap;

use crate::error::EngineError;
use crate::normalize::normalize;
use mailsort_types::ReferenceEntry;

/// A reference entry with its precomputed normalized name forms
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub entry: ReferenceEntry,
    /// Normalized canonical name first, then normalized aliases, deduped
    pub normalized_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    entries: Vec<IndexedEntry>,
    /// Normalized name -> entry position, first writer wins
    exact: HashMap<String, usize>,
}

impl ReferenceIndex {
    /// Build from the supplied list; an empty list is a configuration error
    pub fn build(list: Vec<ReferenceEntry>) -> Result<Self, EngineError> {
        if list.is_empty() {
            return Err(EngineError::Configuration(
                "reference list must not be empty".to_string(),
            ));
        }
        let mut index = Self {
            entries: Vec::with_capacity(list.len()),
            exact: HashMap::new(),
        };
        for entry in list {
            index.insert(entry);
        }
        Ok(index)
    }

    /// Add an entry; used for job-scoped additions during review
    pub fn insert(&mut self, entry: ReferenceEntry) {
        let mut normalized_names = vec![normalize(&entry.canonical_name)];
        for alias in &entry.aliases {
            let name = normalize(alias);
            if !name.is_empty() && !normalized_names.contains(&name) {
                normalized_names.push(name);
            }
        }

        let position = self.entries.len();
        for name in &normalized_names {
            if !name.is_empty() {
                self.exact.entry(name.clone()).or_insert(position);
            }
        }
        self.entries.push(IndexedEntry {
            entry,
            normalized_names,
        });
    }

    /// Every entry is a scoring candidate; no overlap pruning is applied
    /// because edit-distance matches can share zero tokens with the query
    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    /// Fast path for an exact normalized-name or alias hit
    pub fn exact_match(&self, normalized: &str) -> Option<&IndexedEntry> {
        self.exact.get(normalized).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
