//! Raw samples.

/// A single observation: epoch-millisecond timestamp and integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,

    /// Observed value.
    pub value: i64,
}

impl Point {
    /// Create a new point.
    pub const fn new(timestamp: i64, value: i64) -> Self {
        Self { timestamp, value }
    }
}

impl From<(i64, i64)> for Point {
    fn from((timestamp, value): (i64, i64)) -> Self {
        Self { timestamp, value }
    }
}
