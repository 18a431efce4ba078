//! An in-memory reference index.
//!
//! [`UsageIndex`] is a [`UsageSink`] that groups usage locations by the canonical reference of
//! the used symbol (`s:`, `m:` or `f:` form). It is safe to share between threads: the sink
//! contract is also implemented for `&UsageIndex`, so several indexing pipelines can append to
//! one index concurrently.
//!
//! Whether repeated usages of a symbol at the same location are kept is a property of the
//! index, not of the extractor: see [`DedupPolicy`].
//!
//! # Examples
//!
//! ```rust
//! use classref::{UsageIndex, UsageSink};
//!
//! let index = UsageIndex::new();
//! (&index).add_method_usage("B:n:()V", "m:A:m:()V");
//! (&index).add_method_usage("B:n:()V", "m:A:m:()V");
//! assert_eq!(index.count("m:B:n:()V"), 2);
//! assert_eq!(index.get("m:B:n:()V"), ["m:A:m:()V", "m:A:m:()V"]);
//! ```

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use dashmap::DashMap;

use crate::usage::UsageSink;

/// How repeated (symbol, location) pairs are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DedupPolicy {
    /// Keep every usage; two calls of the same method in one body count twice
    #[default]
    Preserve,
    /// Keep each (symbol, location) pair once
    PerLocation,
}

/// Thread-safe map from canonical symbol references to usage locations.
#[derive(Debug, Default)]
pub struct UsageIndex {
    policy: DedupPolicy,
    /// reference -> location -> multiplicity
    references: DashMap<String, HashMap<String, usize>>,
    total: AtomicUsize,
}

impl UsageIndex {
    /// Create an empty index preserving multiplicity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index with the given policy.
    #[must_use]
    pub fn with_policy(policy: DedupPolicy) -> Self {
        UsageIndex {
            policy,
            ..Self::default()
        }
    }

    /// The policy this index was created with.
    #[must_use]
    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Usage locations of `reference`, sorted, each repeated as often as it was recorded.
    ///
    /// Returns an empty list for unknown references.
    #[must_use]
    pub fn get(&self, reference: &str) -> Vec<String> {
        let Some(locations) = self.references.get(reference) else {
            return Vec::new();
        };

        let mut sorted: Vec<(&String, &usize)> = locations.iter().collect();
        sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut result = Vec::with_capacity(sorted.iter().map(|(_, count)| **count).sum());
        for (location, count) in sorted {
            for _ in 0..*count {
                result.push(location.clone());
            }
        }
        result
    }

    /// Number of recorded usages of `reference`.
    #[must_use]
    pub fn count(&self, reference: &str) -> usize {
        self.references
            .get(reference)
            .map_or(0, |locations| locations.values().sum())
    }

    /// Total number of recorded usages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Number of distinct references.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.references.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// All references with at least one usage, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .references
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Drop every recorded usage.
    pub fn clear(&self) {
        self.references.clear();
        self.total.store(0, Ordering::Relaxed);
    }

    fn record(&self, reference: String, location: &str) {
        let mut locations = self.references.entry(reference).or_default();
        match locations.get_mut(location) {
            Some(_) if self.policy == DedupPolicy::PerLocation => {}
            Some(count) => {
                *count += 1;
                self.total.fetch_add(1, Ordering::Relaxed);
            }
            None => {
                locations.insert(location.to_string(), 1);
                self.total.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl UsageSink for &UsageIndex {
    fn add_class_usage(&mut self, class: &str, location: &str) {
        self.record(format!("s:{}", class), location);
    }

    fn add_method_usage(&mut self, method: &str, location: &str) {
        self.record(format!("m:{}", method), location);
    }

    fn add_field_usage(&mut self, field: &str, location: &str) {
        self.record(format!("f:{}", field), location);
    }
}

impl UsageSink for UsageIndex {
    fn add_class_usage(&mut self, class: &str, location: &str) {
        (&*self).add_class_usage(class, location);
    }

    fn add_method_usage(&mut self, method: &str, location: &str) {
        (&*self).add_method_usage(method, location);
    }

    fn add_field_usage(&mut self, field: &str, location: &str) {
        (&*self).add_field_usage(field, location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(index: &UsageIndex) {
        let mut sink = index;
        sink.add_class_usage("B", "m:A:m:()V");
        sink.add_class_usage("B", "c:A");
        sink.add_class_usage("B", "m:A:m:()V");
        sink.add_field_usage("B:f:I", "m:A:m:()V");
    }

    #[test]
    fn preserves_multiplicity() {
        let index = UsageIndex::new();
        fill(&index);

        assert_eq!(index.policy(), DedupPolicy::Preserve);
        assert_eq!(index.len(), 4);
        assert_eq!(index.key_count(), 2);
        assert_eq!(index.count("s:B"), 3);
        assert_eq!(index.get("s:B"), ["c:A", "m:A:m:()V", "m:A:m:()V"]);
        assert_eq!(index.get("f:B:f:I"), ["m:A:m:()V"]);
        assert_eq!(index.keys(), ["f:B:f:I", "s:B"]);
    }

    #[test]
    fn per_location_collapses_repeats() {
        let index = UsageIndex::with_policy(DedupPolicy::PerLocation);
        fill(&index);

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("s:B"), ["c:A", "m:A:m:()V"]);
    }

    #[test]
    fn unknown_and_clear() {
        let mut index = UsageIndex::new();
        assert!(index.is_empty());
        assert!(index.get("s:Nope").is_empty());
        assert_eq!(index.count("s:Nope"), 0);

        index.add_method_usage("B:n:()V", "m:A:m:()V");
        assert!(!index.is_empty());
        assert_eq!(index.get("m:B:n:()V"), ["m:A:m:()V"]);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }
}
