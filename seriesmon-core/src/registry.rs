//! Registry of live datasets, keyed by series.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use seriesmon_types::{SeriesKey, SeriesSnapshot};
use tracing::debug;

use crate::dataset::{SeriesDataset, DEFAULT_CAPACITY};
use crate::source::Observation;

/// Default number of consecutive silent ticks a dataset survives.
pub const DEFAULT_EVICTION_THRESHOLD: u32 = 3;

#[derive(Debug)]
struct Entry {
    dataset: Arc<SeriesDataset>,
    /// Set by any observation, cleared when a tick ages the entry.
    seen: AtomicBool,
    /// Consecutive ticks without an observation for this key.
    misses: u32,
}

impl Entry {
    fn touch(&self) -> Arc<SeriesDataset> {
        self.seen.store(true, Ordering::Release);
        self.dataset.clone()
    }
}

/// Outcome of one collection tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Observations ingested.
    pub observed: usize,
    /// Datasets created for previously unseen keys.
    pub created: usize,
    /// Datasets dropped after going silent.
    pub evicted: usize,
}

/// A bulk request for the datasets of several series.
///
/// With no instance filter every instance of each series matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesQuery {
    pub series: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<String>>,
}

impl SeriesQuery {
    /// Query the given series across all instances.
    pub fn series<I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            series: series.into_iter().map(Into::into).collect(),
            instances: None,
        }
    }

    /// Restrict the query to the given instances.
    pub fn instances<I, S>(mut self, instances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instances = Some(instances.into_iter().map(Into::into).collect());
        self
    }
}

/// Owns every [`SeriesDataset`] and decides when they are created and dropped.
///
/// Structural changes (insert, evict) take the map's write lock briefly;
/// observations themselves run under each dataset's own lock, so unrelated
/// series never contend. Handing out `Arc`s means a reader that looked up a
/// dataset keeps a valid object even if it is evicted meanwhile.
#[derive(Debug)]
pub struct DatasetRegistry {
    sets: RwLock<HashMap<SeriesKey, Entry>>,
    capacity: usize,
    eviction_threshold: u32,
}

impl DatasetRegistry {
    /// Create an empty registry.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Points retained per dataset
    /// * `eviction_threshold` - Consecutive silent ticks tolerated before a
    ///   dataset is dropped
    pub fn new(capacity: usize, eviction_threshold: u32) -> Self {
        Self {
            sets: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            eviction_threshold,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn eviction_threshold(&self) -> u32 {
        self.eviction_threshold
    }

    /// Route one observation to its dataset, creating the dataset on first sight.
    ///
    /// Returns `true` if a new dataset was created.
    pub fn observe(&self, key: &SeriesKey, timestamp: i64, value: i64) -> bool {
        // Fast path: dataset already exists
        let existing = self.sets.read().get(key).map(Entry::touch);
        if let Some(dataset) = existing {
            dataset.observe(timestamp, value);
            return false;
        }

        // Slow path: double-check under the write lock so exactly one creator wins
        let mut sets = self.sets.write();
        if let Some(entry) = sets.get(key) {
            let dataset = entry.touch();
            drop(sets);
            dataset.observe(timestamp, value);
            return false;
        }

        let dataset = SeriesDataset::new(key.clone(), self.capacity, timestamp, value);
        sets.insert(
            key.clone(),
            Entry {
                dataset: Arc::new(dataset),
                seen: AtomicBool::new(true),
                misses: 0,
            },
        );
        debug!(series = %key, "created dataset");
        true
    }

    /// Ingest one collection tick worth of observations and age silent keys.
    ///
    /// Keys that received no observation since the previous tick, neither in
    /// `observations` nor through [`observe`](Self::observe), accumulate a
    /// miss; a key that has missed more than the eviction threshold of
    /// consecutive ticks is removed.
    pub fn tick<I>(&self, observations: I) -> TickSummary
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut summary = TickSummary::default();

        for obs in observations {
            if self.observe(&obs.key, obs.timestamp, obs.value) {
                summary.created += 1;
            }
            summary.observed += 1;
        }

        let threshold = self.eviction_threshold;
        self.sets.write().retain(|key, entry| {
            if entry.seen.swap(false, Ordering::AcqRel) {
                entry.misses = 0;
                return true;
            }
            entry.misses += 1;
            if entry.misses > threshold {
                debug!(series = %key, misses = entry.misses, "evicted dataset");
                summary.evicted += 1;
                return false;
            }
            true
        });

        summary
    }

    /// Look up the dataset for a key.
    pub fn get(&self, key: &SeriesKey) -> Option<Arc<SeriesDataset>> {
        self.sets.read().get(key).map(|e| e.dataset.clone())
    }

    /// All datasets whose key satisfies the predicate, in no particular order.
    pub fn all_matching<F>(&self, predicate: F) -> Vec<Arc<SeriesDataset>>
    where
        F: Fn(&SeriesKey) -> bool,
    {
        self.sets
            .read()
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(_, e)| e.dataset.clone())
            .collect()
    }

    /// Distinct series names currently tracked, sorted.
    pub fn series_names(&self) -> Vec<String> {
        let names: BTreeSet<String> = self.sets.read().keys().map(|k| k.series.clone()).collect();
        names.into_iter().collect()
    }

    /// Distinct instance names currently tracked, sorted.
    pub fn instances(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .sets
            .read()
            .keys()
            .map(|k| k.instance.clone())
            .collect();
        names.into_iter().collect()
    }

    /// Snapshots for each requested series, grouped by series name.
    ///
    /// Every requested series appears in the result; series with no matching
    /// dataset map to an empty list. Snapshots within a series are sorted by
    /// instance name.
    pub fn query(&self, query: &SeriesQuery) -> BTreeMap<String, Vec<SeriesSnapshot>> {
        let instances: Option<HashSet<&str>> = query
            .instances
            .as_ref()
            .map(|list| list.iter().map(String::as_str).collect());

        query
            .series
            .iter()
            .map(|series| {
                let mut snapshots: Vec<SeriesSnapshot> = self
                    .all_matching(|key| {
                        key.series == *series
                            && instances
                                .as_ref()
                                .map_or(true, |set| set.contains(key.instance.as_str()))
                    })
                    .iter()
                    .map(|dataset| dataset.snapshot())
                    .collect();
                snapshots.sort_by(|a, b| a.instance.cmp(&b.instance));
                (series.clone(), snapshots)
            })
            .collect()
    }

    /// Snapshots of every dataset, sorted by key.
    pub fn snapshot_all(&self) -> Vec<SeriesSnapshot> {
        let mut datasets = self.all_matching(|_| true);
        datasets.sort_by(|a, b| a.key().cmp(b.key()));
        datasets.iter().map(|dataset| dataset.snapshot()).collect()
    }

    /// Drop the dataset for a key.
    ///
    /// Returns `true` if the key was present.
    pub fn remove(&self, key: &SeriesKey) -> bool {
        let removed = self.sets.write().remove(key).is_some();
        if removed {
            debug!(series = %key, "removed dataset");
        }
        removed
    }

    /// Drop every dataset, returning how many were removed.
    pub fn reset(&self) -> usize {
        let mut sets = self.sets.write();
        let count = sets.len();
        sets.clear();
        count
    }

    /// Number of datasets held.
    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.read().is_empty()
    }
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_EVICTION_THRESHOLD)
    }
}
