//! Stability cache: an immutable snapshot of previously approved bodies.
//!
//! Built once before a run and only read during it. Producing the next
//! baseline is a separate step (`next_baseline`) owned by the caller.

use std::collections::BTreeMap;

use crate::model::{CacheEntry, InlineFunctionUnit, TranslationResult};

/// Result of looking a unit up in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCheck<'a> {
    /// Same name and same body hash: the approved body must be reused verbatim.
    Hit(&'a CacheEntry),
    /// Name known but the body changed since approval; the entry is ignored.
    Stale(&'a CacheEntry),
    Miss,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StabilityCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl StabilityCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot; when a name repeats, the later entry wins.
    pub fn from_entries(entries: impl IntoIterator<Item = CacheEntry>) -> Self {
        let mut map = BTreeMap::new();
        for entry in entries {
            map.insert(entry.name.clone(), entry);
        }
        Self { entries: map }
    }

    pub fn lookup(&self, name: &str) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    pub fn check(&self, unit: &InlineFunctionUnit) -> CacheCheck<'_> {
        match self.lookup(unit.name()) {
            Some(entry) if entry.body_hash == unit.body_hash => CacheCheck::Hit(entry),
            Some(entry) => CacheCheck::Stale(entry),
            None => CacheCheck::Miss,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by function name.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }
}

/// Baseline rows to persist after a run: one per unit that ended `Translated`
/// or `Reused`, keyed by the unit's current body hash. Failed units are left
/// out so they are retried next time.
pub fn next_baseline(
    units: &[InlineFunctionUnit],
    results: &[TranslationResult],
) -> Vec<CacheEntry> {
    units
        .iter()
        .zip(results)
        .filter_map(|(unit, result)| {
            result.approved_body().map(|body| {
                CacheEntry::new(unit.name(), unit.body_hash.clone(), body)
                    .with_fingerprint(Some(unit.signature.fingerprint()))
            })
        })
        .collect()
}
