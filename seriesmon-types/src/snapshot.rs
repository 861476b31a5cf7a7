//! SeriesSnapshot - a point-in-time copy of one series dataset.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::{Point, SeriesKey};

/// A consistent, immutable copy of a series dataset.
///
/// Snapshots are what the response layer serializes. They never share state
/// with the dataset they were taken from, so a snapshot can be held and
/// serialized while collection keeps mutating the source.
///
/// # Example
///
/// ```rust
/// use seriesmon_types::{Point, SeriesKey, SeriesSnapshot};
///
/// let snapshot = SeriesSnapshot::builder(SeriesKey::new("server", "ThreadCount"))
///     .point(Point::new(0, 12))
///     .point(Point::new(5_000, 12))
///     .stable(2, 0)
///     .build();
///
/// assert!(snapshot.is_stable(2));
/// // Serialize with serde (requires "serde" feature)
/// // let json = serde_json::to_string(&snapshot)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SeriesSnapshot {
    /// Full series name.
    pub series: String,

    /// Instance the series belongs to.
    pub instance: String,

    /// Retained samples, oldest first.
    ///
    /// Serialized as a flat `[t0, v0, t1, v1, ...]` array.
    #[cfg_attr(feature = "serde", serde(with = "flat_points"))]
    pub points: Vec<Point>,

    /// Largest value ever observed.
    pub observed_max: i64,

    /// Smallest value ever observed.
    pub observed_min: i64,

    /// Exact sum of every value ever observed, serialized as a decimal string.
    #[cfg_attr(feature = "serde", serde(with = "decimal"))]
    pub observed_sum: BigInt,

    /// Number of observations.
    pub observed_values: u64,

    /// Number of observations that differed from their predecessor, counting
    /// the first observation as a change.
    pub observed_value_changes: u64,

    /// Timestamp of the first observation.
    pub observed_since: i64,

    /// Length of the current run of equal values.
    pub stable_count: u64,

    /// Timestamp of the first observation in the current run.
    pub stable_since: i64,
}

impl SeriesSnapshot {
    /// Create a builder for a snapshot of the given series.
    pub fn builder(key: SeriesKey) -> SeriesSnapshotBuilder {
        SeriesSnapshotBuilder::new(key)
    }

    /// The key this snapshot was taken for.
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(self.instance.clone(), self.series.clone())
    }

    /// Retained sample values without their timestamps, oldest first.
    pub fn values(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Mean of all observed values.
    ///
    /// Returns `None` when nothing has been observed.
    pub fn average(&self) -> Option<f64> {
        if self.observed_values == 0 {
            return None;
        }
        Some(self.observed_sum.to_f64()? / self.observed_values as f64)
    }

    /// Per-second rate of change between adjacent retained points.
    ///
    /// Each rate is stamped with the later point's timestamp. Pairs whose
    /// timestamps do not increase are skipped.
    pub fn per_second(&self) -> Vec<Point> {
        self.points
            .windows(2)
            .filter_map(|pair| {
                let (p0, p1) = (pair[0], pair[1]);
                let dt = i128::from(p1.timestamp) - i128::from(p0.timestamp);
                if dt <= 0 {
                    return None;
                }
                let dy = i128::from(p1.value) - i128::from(p0.value);
                let rate = (dy * 1000 / dt).clamp(i128::from(i64::MIN), i128::from(i64::MAX));
                Some(Point::new(p1.timestamp, rate as i64))
            })
            .collect()
    }

    /// Whether the last `min_run` observations (at least) held the same value.
    pub fn is_stable(&self, min_run: u64) -> bool {
        self.observed_values > 0 && self.stable_count >= min_run
    }
}

/// Builder for `SeriesSnapshot` instances.
#[derive(Debug)]
pub struct SeriesSnapshotBuilder {
    key: SeriesKey,
    points: Vec<Point>,
    observed: Option<(i64, i64)>,
    observed_sum: Option<BigInt>,
    observed_values: Option<u64>,
    observed_value_changes: Option<u64>,
    observed_since: Option<i64>,
    stable: Option<(u64, i64)>,
}

impl SeriesSnapshotBuilder {
    /// Create a new builder.
    pub fn new(key: SeriesKey) -> Self {
        Self {
            key,
            points: Vec::new(),
            observed: None,
            observed_sum: None,
            observed_values: None,
            observed_value_changes: None,
            observed_since: None,
            stable: None,
        }
    }

    /// Append a retained point.
    pub fn point(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }

    /// Append several retained points.
    pub fn points(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.points.extend(points);
        self
    }

    /// Set the observed extrema.
    pub fn observed_range(mut self, min: i64, max: i64) -> Self {
        self.observed = Some((min, max));
        self
    }

    /// Set the observed sum.
    pub fn observed_sum(mut self, sum: impl Into<BigInt>) -> Self {
        self.observed_sum = Some(sum.into());
        self
    }

    /// Set the number of observations.
    pub fn observed_values(mut self, count: u64) -> Self {
        self.observed_values = Some(count);
        self
    }

    /// Set the number of value changes.
    pub fn observed_value_changes(mut self, count: u64) -> Self {
        self.observed_value_changes = Some(count);
        self
    }

    /// Set the timestamp of the first observation.
    pub fn observed_since(mut self, timestamp: i64) -> Self {
        self.observed_since = Some(timestamp);
        self
    }

    /// Set the current stable run.
    pub fn stable(mut self, count: u64, since: i64) -> Self {
        self.stable = Some((count, since));
        self
    }

    /// Build the snapshot.
    ///
    /// Aggregates that were not set explicitly are derived from the points.
    pub fn build(self) -> SeriesSnapshot {
        let values = self.points.iter().map(|p| p.value);
        let (observed_min, observed_max) = self.observed.unwrap_or_else(|| {
            let min = values.clone().min().unwrap_or(0);
            let max = values.clone().max().unwrap_or(0);
            (min, max)
        });
        let observed_sum = self
            .observed_sum
            .unwrap_or_else(|| values.fold(BigInt::zero(), |acc, v| acc + v));
        let first = self.points.first().map(|p| p.timestamp).unwrap_or(0);
        let observed_value_changes = self.observed_value_changes.unwrap_or_else(|| {
            match self.points.first() {
                // The first point counts as a change from no value.
                Some(_) => {
                    let changed = self.points.windows(2).filter(|w| w[0].value != w[1].value);
                    1 + changed.count() as u64
                }
                None => 0,
            }
        });
        let (stable_count, stable_since) = self.stable.unwrap_or_else(|| match self.points.last() {
            Some(last) => {
                let run: Vec<&Point> = self
                    .points
                    .iter()
                    .rev()
                    .take_while(|p| p.value == last.value)
                    .collect();
                let since = run.last().map_or(last.timestamp, |p| p.timestamp);
                (run.len() as u64, since)
            }
            None => (0, first),
        });

        SeriesSnapshot {
            series: self.key.series,
            instance: self.key.instance,
            observed_values: self.observed_values.unwrap_or(self.points.len() as u64),
            points: self.points,
            observed_max,
            observed_min,
            observed_sum,
            observed_value_changes,
            observed_since: self.observed_since.unwrap_or(first),
            stable_count,
            stable_since,
        }
    }
}

#[cfg(feature = "serde")]
mod flat_points {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::Point;

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(points.iter().flat_map(|p| [p.timestamp, p.value]))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let flat = Vec::<i64>::deserialize(deserializer)?;
        if flat.len() % 2 != 0 {
            return Err(D::Error::custom("points must hold timestamp/value pairs"));
        }
        Ok(flat
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect())
    }
}

#[cfg(feature = "serde")]
mod decimal {
    use num_bigint::BigInt;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> SeriesSnapshot {
        SeriesSnapshot::builder(SeriesKey::new("server", "ns:web RequestCount"))
            .point(Point::new(1_000, 10))
            .point(Point::new(2_000, 30))
            .point(Point::new(4_000, 70))
            .build()
    }

    #[test]
    fn builder_derives_aggregates_from_points() {
        let snapshot = ramp();

        assert_eq!(snapshot.observed_min, 10);
        assert_eq!(snapshot.observed_max, 70);
        assert_eq!(snapshot.observed_sum, BigInt::from(110));
        assert_eq!(snapshot.observed_values, 3);
        assert_eq!(snapshot.observed_since, 1_000);
        assert_eq!(snapshot.key(), SeriesKey::new("server", "ns:web RequestCount"));
    }

    #[test]
    fn builder_derives_changes_and_stable_run_from_points() {
        let snapshot = SeriesSnapshot::builder(SeriesKey::new("i", "s"))
            .points(
                [(0, 5), (1, 5), (2, 7), (3, 7), (4, 7)]
                    .into_iter()
                    .map(|(t, v)| Point::new(t, v)),
            )
            .build();

        assert_eq!(snapshot.observed_value_changes, 2);
        assert_eq!(snapshot.stable_count, 3);
        assert_eq!(snapshot.stable_since, 2);
    }

    #[test]
    fn builder_single_point_matches_first_observation() {
        let snapshot = SeriesSnapshot::builder(SeriesKey::new("i", "s"))
            .point(Point::new(1_000, 42))
            .build();

        assert_eq!(snapshot.observed_values, 1);
        assert_eq!(snapshot.observed_value_changes, 1);
        assert_eq!(snapshot.stable_count, 1);
        assert_eq!(snapshot.stable_since, 1_000);
        assert!(snapshot.is_stable(1));
    }

    #[test]
    fn empty_builder_has_no_changes_or_run() {
        let snapshot = SeriesSnapshot::builder(SeriesKey::new("i", "s")).build();

        assert_eq!(snapshot.observed_value_changes, 0);
        assert_eq!(snapshot.stable_count, 0);
    }

    #[test]
    fn values_drop_timestamps() {
        assert_eq!(ramp().values(), vec![10, 30, 70]);
    }

    #[test]
    fn average_uses_full_history() {
        let snapshot = SeriesSnapshot::builder(SeriesKey::new("i", "s"))
            .point(Point::new(0, 4))
            .observed_sum(100)
            .observed_values(10)
            .build();

        assert_eq!(snapshot.average(), Some(10.0));
    }

    #[test]
    fn average_none_without_observations() {
        let snapshot = SeriesSnapshot::builder(SeriesKey::new("i", "s")).build();
        assert_eq!(snapshot.average(), None);
        assert!(!snapshot.is_stable(0));
    }

    #[test]
    fn per_second_rates_between_neighbours() {
        let rates = ramp().per_second();

        assert_eq!(rates, vec![Point::new(2_000, 20), Point::new(4_000, 20)]);
    }

    #[test]
    fn per_second_skips_non_increasing_timestamps() {
        let snapshot = SeriesSnapshot::builder(SeriesKey::new("i", "s"))
            .point(Point::new(1_000, 1))
            .point(Point::new(1_000, 5))
            .point(Point::new(1_500, 10))
            .build();

        assert_eq!(snapshot.per_second(), vec![Point::new(1_500, 10)]);
    }

    #[test]
    fn per_second_saturates_on_extreme_jumps() {
        let snapshot = SeriesSnapshot::builder(SeriesKey::new("i", "s"))
            .point(Point::new(0, i64::MIN))
            .point(Point::new(1, i64::MAX))
            .build();

        assert_eq!(snapshot.per_second(), vec![Point::new(1, i64::MAX)]);
    }

    #[test]
    fn stability_threshold() {
        let snapshot = SeriesSnapshot::builder(SeriesKey::new("i", "s"))
            .point(Point::new(0, 3))
            .point(Point::new(1, 3))
            .point(Point::new(2, 3))
            .stable(3, 0)
            .build();

        assert!(snapshot.is_stable(3));
        assert!(!snapshot.is_stable(4));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_layout_matches_console_contract() {
        let snapshot = SeriesSnapshot::builder(SeriesKey::new("server", "HeapUsage"))
            .point(Point::new(1_000, 5))
            .point(Point::new(2_000, 7))
            .observed_sum(BigInt::from(i64::MAX) * 4)
            .observed_values(2)
            .observed_value_changes(1)
            .stable(1, 2_000)
            .build();

        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["series"], "HeapUsage");
        assert_eq!(json["instance"], "server");
        assert_eq!(json["points"], serde_json::json!([1000, 5, 2000, 7]));
        assert_eq!(json["observedSum"], "36893488147419103228");
        assert_eq!(json["observedValueChanges"], 1);
        assert_eq!(json["stableSince"], 2000);

        let parsed: SeriesSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn odd_point_array_is_rejected() {
        let json = serde_json::json!({
            "series": "s",
            "instance": "i",
            "points": [1, 2, 3],
            "observedMax": 0,
            "observedMin": 0,
            "observedSum": "0",
            "observedValues": 0,
            "observedValueChanges": 0,
            "observedSince": 0,
            "stableCount": 0,
            "stableSince": 0
        });

        assert!(serde_json::from_value::<SeriesSnapshot>(json).is_err());
    }
}
