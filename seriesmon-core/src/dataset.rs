//! The per-series aggregation unit.

use num_bigint::BigInt;
use parking_lot::RwLock;
use seriesmon_types::{Point, SeriesKey, SeriesSnapshot};

use crate::ring::PointRing;
use crate::stability::Stability;

/// Default number of raw points retained per dataset.
pub const DEFAULT_CAPACITY: usize = 30;

/// Running statistics and recent points for one series of one instance.
///
/// A dataset only ever comes into existence holding its first observation,
/// so every accessor has a meaningful value. All mutation goes through
/// [`observe`](Self::observe), which updates every field under one lock:
/// readers see either the state before an observation or the state after
/// it, never a mix.
#[derive(Debug)]
pub struct SeriesDataset {
    key: SeriesKey,
    state: RwLock<DatasetState>,
}

#[derive(Debug, Clone)]
struct DatasetState {
    points: PointRing,
    observed_min: i64,
    observed_max: i64,
    observed_sum: BigInt,
    observed_values: u64,
    observed_value_changes: u64,
    observed_since: i64,
    /// Kept apart from `points` since the ring may have evicted it.
    last_value: i64,
    stability: Stability,
}

impl DatasetState {
    fn first(capacity: usize, timestamp: i64, value: i64) -> Self {
        let mut points = PointRing::new(capacity);
        points.append(Point::new(timestamp, value));
        Self {
            points,
            observed_min: value,
            observed_max: value,
            observed_sum: BigInt::from(value),
            observed_values: 1,
            // Going from no value to a first value counts as a change.
            observed_value_changes: 1,
            observed_since: timestamp,
            last_value: value,
            stability: Stability::start(timestamp),
        }
    }

    fn observe(&mut self, timestamp: i64, value: i64) {
        self.points.append(Point::new(timestamp, value));
        self.observed_min = self.observed_min.min(value);
        self.observed_max = self.observed_max.max(value);
        self.observed_sum += value;
        self.observed_values += 1;
        if value != self.last_value {
            self.observed_value_changes += 1;
        }
        self.stability = self
            .stability
            .next(Some(self.last_value), value, timestamp);
        self.last_value = value;
    }
}

impl SeriesDataset {
    /// Create a dataset from its first observation.
    pub fn new(key: SeriesKey, capacity: usize, timestamp: i64, value: i64) -> Self {
        Self {
            key,
            state: RwLock::new(DatasetState::first(capacity, timestamp, value)),
        }
    }

    /// Ingest one observation.
    pub fn observe(&self, timestamp: i64, value: i64) {
        self.state.write().observe(timestamp, value);
    }

    /// The series this dataset tracks.
    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    /// Retained points, oldest first.
    pub fn points(&self) -> Vec<Point> {
        self.state.read().points.snapshot()
    }

    /// Retained values without timestamps, oldest first.
    pub fn values(&self) -> Vec<i64> {
        self.state.read().points.iter().map(|p| p.value).collect()
    }

    /// Maximum number of retained points.
    pub fn capacity(&self) -> usize {
        self.state.read().points.capacity()
    }

    pub fn observed_min(&self) -> i64 {
        self.state.read().observed_min
    }

    pub fn observed_max(&self) -> i64 {
        self.state.read().observed_max
    }

    pub fn observed_sum(&self) -> BigInt {
        self.state.read().observed_sum.clone()
    }

    pub fn observed_values(&self) -> u64 {
        self.state.read().observed_values
    }

    pub fn observed_value_changes(&self) -> u64 {
        self.state.read().observed_value_changes
    }

    pub fn observed_since(&self) -> i64 {
        self.state.read().observed_since
    }

    pub fn stable_count(&self) -> u64 {
        self.state.read().stability.count
    }

    pub fn stable_since(&self) -> i64 {
        self.state.read().stability.since
    }

    /// The most recent observation.
    pub fn last_value(&self) -> i64 {
        self.state.read().last_value
    }

    /// Take a consistent point-in-time copy of the whole dataset.
    pub fn snapshot(&self) -> SeriesSnapshot {
        let state = self.state.read();
        SeriesSnapshot {
            series: self.key.series.clone(),
            instance: self.key.instance.clone(),
            points: state.points.snapshot(),
            observed_max: state.observed_max,
            observed_min: state.observed_min,
            observed_sum: state.observed_sum.clone(),
            observed_values: state.observed_values,
            observed_value_changes: state.observed_value_changes,
            observed_since: state.observed_since,
            stable_count: state.stability.count,
            stable_since: state.stability.since,
        }
    }
}
