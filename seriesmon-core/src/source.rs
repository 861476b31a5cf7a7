//! The seam between metric producers and the collector.

use std::fmt;

use seriesmon_types::SeriesKey;

use crate::error::SourceError;

/// One sampled value for one series, as delivered to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub key: SeriesKey,
    pub timestamp: i64,
    pub value: i64,
}

impl Observation {
    pub fn new(key: SeriesKey, timestamp: i64, value: i64) -> Self {
        Self {
            key,
            timestamp,
            value,
        }
    }
}

/// A named producer of current metric values.
///
/// The collector calls [`sample`](Self::sample) once per tick for every
/// enabled source. The name doubles as the service name used to enable or
/// disable the source at runtime.
///
/// Values are expected to be finite and in range by the time they leave the
/// source; the datasets accept any `i64`.
pub trait MetricSource: Send + fmt::Debug {
    /// The service name of this source.
    fn name(&self) -> &str;

    /// Produce the current value of every series this source reports.
    ///
    /// `now_ms` is the tick time in epoch milliseconds.
    fn sample(&mut self, now_ms: i64) -> Result<Vec<Observation>, SourceError>;
}

/// A source backed by a closure.
///
/// # Example
///
/// ```rust
/// use seriesmon_core::{FnSource, MetricSource, Observation, SeriesKey};
///
/// let mut source = FnSource::new("threads", |now| {
///     Ok(vec![Observation::new(SeriesKey::new("server", "ThreadCount"), now, 42)])
/// });
///
/// let sampled = source.sample(1_000).unwrap();
/// assert_eq!(sampled[0].value, 42);
/// ```
pub struct FnSource<F> {
    name: String,
    sample: F,
}

impl<F> FnSource<F>
where
    F: FnMut(i64) -> Result<Vec<Observation>, SourceError> + Send,
{
    pub fn new(name: impl Into<String>, sample: F) -> Self {
        Self {
            name: name.into(),
            sample,
        }
    }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource").field("name", &self.name).finish()
    }
}

impl<F> MetricSource for FnSource<F>
where
    F: FnMut(i64) -> Result<Vec<Observation>, SourceError> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&mut self, now_ms: i64) -> Result<Vec<Observation>, SourceError> {
        (self.sample)(now_ms)
    }
}
