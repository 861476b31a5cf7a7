//! Push-style source for values set from application code.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use seriesmon_types::SeriesKey;

use crate::error::SourceError;
use crate::source::{MetricSource, Observation};

#[derive(Debug, Default)]
struct GaugeState {
    /// Current value per series name.
    values: RwLock<BTreeMap<String, i64>>,
}

/// A source whose values are set through [`GaugeHandle`]s.
///
/// Every tick reports the latest value of each gauge, whether or not it was
/// updated since the previous tick. A gauge that is cleared stops being
/// reported, which lets its dataset age out of the registry.
#[derive(Debug)]
pub struct GaugeSource {
    name: String,
    instance: String,
    state: Arc<GaugeState>,
}

impl GaugeSource {
    /// Create a source and the handle used to feed it.
    ///
    /// # Arguments
    ///
    /// * `name` - The service name of the source
    /// * `instance` - The instance every gauge is reported for
    pub fn new(name: impl Into<String>, instance: impl Into<String>) -> (Self, GaugeHandle) {
        let state = Arc::new(GaugeState::default());
        let instance = instance.into();
        let source = Self {
            name: name.into(),
            instance: instance.clone(),
            state: state.clone(),
        };
        (source, GaugeHandle { state, instance })
    }
}

impl MetricSource for GaugeSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&mut self, now_ms: i64) -> Result<Vec<Observation>, SourceError> {
        Ok(self
            .state
            .values
            .read()
            .iter()
            .map(|(series, value)| {
                Observation::new(SeriesKey::new(self.instance.clone(), series.clone()), now_ms, *value)
            })
            .collect())
    }
}

/// A handle for setting gauge values.
///
/// Cheap to clone; all clones feed the same source.
///
/// # Example
///
/// ```rust
/// use seriesmon_core::GaugeSource;
///
/// let (source, handle) = GaugeSource::new("jvm", "server");
/// handle.set("ns:jvm HeapUsage", 512);
/// handle.set("ns:jvm ThreadCount", 40);
/// handle.clear("ns:jvm ThreadCount");
/// ```
#[derive(Clone)]
pub struct GaugeHandle {
    state: Arc<GaugeState>,
    instance: String,
}

impl GaugeHandle {
    /// Set the current value of a series.
    pub fn set(&self, series: &str, value: i64) {
        let mut values = self.state.values.write();
        match values.get_mut(series) {
            Some(current) => *current = value,
            None => {
                values.insert(series.to_string(), value);
            }
        }
    }

    /// Stop reporting a series.
    ///
    /// Returns `true` if the series had a value.
    pub fn clear(&self, series: &str) -> bool {
        self.state.values.write().remove(series).is_some()
    }

    /// The current value of a series, if set.
    pub fn get(&self, series: &str) -> Option<i64> {
        self.state.values.read().get(series).copied()
    }

    /// The instance this handle reports for.
    pub fn instance(&self) -> &str {
        &self.instance
    }
}

impl std::fmt::Debug for GaugeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaugeHandle")
            .field("instance", &self.instance)
            .finish()
    }
}
