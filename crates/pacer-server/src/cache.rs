//! Snap result cache shared across requests.

use dashmap::DashMap;
use pacer_core::GeoPoint;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub trait CacheEntry {
    fn fetched_at(&self) -> Instant;
}

/// Drop expired entries, then the oldest ones until at most `max_entries` remain.
pub fn prune_cache<K, V>(cache: &DashMap<K, V>, max_entries: usize, max_age: Duration)
where
    K: Clone + Eq + Hash,
    V: CacheEntry,
{
    let now = Instant::now();
    let mut entries: Vec<(K, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().fetched_at()))
        .collect();

    entries.retain(|(key, fetched_at)| {
        let expired = now.duration_since(*fetched_at) > max_age;
        if expired {
            cache.remove(key);
        }
        !expired
    });

    if cache.len() <= max_entries {
        return;
    }

    entries.sort_by_key(|(_, fetched_at)| *fetched_at);
    for (key, _) in entries {
        if cache.len() <= max_entries {
            break;
        }
        cache.remove(&key);
    }
}

/// Key at micro-degree resolution (~0.1 m).
type SnapKey = (i64, i64);

#[derive(Debug, Clone)]
struct SnapEntry {
    fetched_at: Instant,
    snapped: Option<GeoPoint>,
}

impl CacheEntry for SnapEntry {
    fn fetched_at(&self) -> Instant {
        self.fetched_at
    }
}

/// Caches snap lookups, including "nothing walkable nearby" answers.
#[derive(Debug)]
pub struct SnapCache {
    entries: DashMap<SnapKey, SnapEntry>,
    max_entries: usize,
    ttl: Duration,
}

impl SnapCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
            ttl,
        }
    }

    fn key(point: GeoPoint) -> SnapKey {
        (
            (point.lat * 1e6).round() as i64,
            (point.lng * 1e6).round() as i64,
        )
    }

    /// `Some(answer)` on a fresh hit.
    pub fn get(&self, point: GeoPoint) -> Option<Option<GeoPoint>> {
        let entry = self.entries.get(&Self::key(point))?;
        (entry.fetched_at.elapsed() <= self.ttl).then_some(entry.snapped)
    }

    pub fn insert(&self, point: GeoPoint, snapped: Option<GeoPoint>) {
        if self.max_entries == 0 {
            return;
        }
        self.entries.insert(
            Self::key(point),
            SnapEntry {
                fetched_at: Instant::now(),
                snapped,
            },
        );
        if self.entries.len() > self.max_entries {
            prune_cache(&self.entries, self.max_entries, self.ttl);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
