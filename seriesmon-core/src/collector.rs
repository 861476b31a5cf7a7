//! The periodic collector that feeds the registry from metric sources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::admin::{ServiceControl, ServicesConfig};
use crate::dataset::DEFAULT_CAPACITY;
use crate::output::Output;
use crate::registry::{DatasetRegistry, TickSummary, DEFAULT_EVICTION_THRESHOLD};
use crate::source::MetricSource;

/// Default time between collection ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct RegisteredSource {
    source: Box<dyn MetricSource>,
    enabled: Arc<AtomicBool>,
}

/// Samples metric sources on a fixed interval and routes the values into a
/// [`DatasetRegistry`].
///
/// The collector is the only writer of its registry. Ticks never overlap:
/// the source list is locked for the duration of a tick, and the background
/// task skips ticks it missed rather than bunching them up.
///
/// # Example
///
/// ```rust,no_run
/// use seriesmon_core::{Collector, GaugeSource, Output};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let (source, gauges) = GaugeSource::new("jvm", "server");
///
///     let collector = Collector::builder()
///         .source(source)
///         .output(Output::file("series.json"))
///         .interval(Duration::from_secs(2))
///         .build();
///
///     let handle = collector.start();
///     gauges.set("ns:jvm HeapUsage", 512);
///
///     tokio::time::sleep(Duration::from_secs(10)).await;
///     handle.stop();
/// }
/// ```
#[derive(Debug)]
pub struct Collector {
    registry: Arc<DatasetRegistry>,
    services: Arc<ServiceControl>,
    sources: Arc<Mutex<Vec<RegisteredSource>>>,
    outputs: Arc<Vec<Output>>,
    interval: Duration,
}

impl Collector {
    /// Create a builder for configuring the collector.
    pub fn builder() -> CollectorBuilder {
        CollectorBuilder::new()
    }

    /// The registry this collector writes to.
    pub fn registry(&self) -> Arc<DatasetRegistry> {
        self.registry.clone()
    }

    /// The enable/disable surface for this collector's sources.
    pub fn services(&self) -> Arc<ServiceControl> {
        self.services.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one collection pass using the current wall-clock time.
    pub fn tick(&self) -> TickSummary {
        self.tick_at(now_ms())
    }

    /// Run one collection pass stamped with the given time.
    pub fn tick_at(&self, now_ms: i64) -> TickSummary {
        collect_once(&self.sources, &self.registry, now_ms)
    }

    /// Start periodic collection in a background tokio task.
    ///
    /// After every tick the registry's snapshots are sent to all configured
    /// outputs. Returns a handle that can be used to stop collection.
    #[cfg(feature = "tokio")]
    pub fn start(&self) -> CollectorHandle {
        use tokio::sync::watch;
        use tokio::time::MissedTickBehavior;

        let (stop_tx, stop_rx) = watch::channel(false);
        let registry = self.registry.clone();
        let sources = self.sources.clone();
        let outputs = self.outputs.clone();
        let interval = self.interval;

        info!(?interval, sources = sources.lock().len(), "starting collector");

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut stop_rx = stop_rx;

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        collect_once(&sources, &registry, now_ms());
                        if outputs.is_empty() {
                            continue;
                        }
                        let snapshots = registry.snapshot_all();
                        for output in outputs.iter() {
                            if let Err(e) = output.emit(&snapshots).await {
                                warn!(error = %e, "failed to emit snapshots");
                            }
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("collector stopped");
        });

        CollectorHandle { stop_tx }
    }
}

fn collect_once(
    sources: &Mutex<Vec<RegisteredSource>>,
    registry: &DatasetRegistry,
    now_ms: i64,
) -> TickSummary {
    let mut sources = sources.lock();
    let mut observations = Vec::new();

    for entry in sources.iter_mut() {
        if !entry.enabled.load(Ordering::Acquire) {
            continue;
        }
        match entry.source.sample(now_ms) {
            Ok(sampled) => observations.extend(sampled),
            Err(e) => warn!(source = entry.source.name(), error = %e, "source failed to sample"),
        }
    }

    let summary = registry.tick(observations);
    debug!(
        observed = summary.observed,
        created = summary.created,
        evicted = summary.evicted,
        "collection tick"
    );
    summary
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Builder for configuring a Collector.
#[derive(Debug, Default)]
pub struct CollectorBuilder {
    sources: Vec<Box<dyn MetricSource>>,
    outputs: Vec<Output>,
    services: ServicesConfig,
    interval: Option<Duration>,
    capacity: Option<usize>,
    eviction_threshold: Option<u32>,
}

impl CollectorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a metric source.
    pub fn source(mut self, source: impl MetricSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Add an already boxed metric source.
    pub fn boxed_source(mut self, source: Box<dyn MetricSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Add an output destination for per-tick snapshots.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Persisted service settings deciding which sources start enabled.
    pub fn services(mut self, services: ServicesConfig) -> Self {
        self.services = services;
        self
    }

    /// Set the collection interval.
    ///
    /// Defaults to 5 seconds if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the number of points retained per dataset.
    ///
    /// Defaults to 30 if not specified.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set how many consecutive silent ticks a dataset survives.
    ///
    /// Defaults to 3 if not specified.
    pub fn eviction_threshold(mut self, ticks: u32) -> Self {
        self.eviction_threshold = Some(ticks);
        self
    }

    /// Build the collector.
    pub fn build(self) -> Collector {
        let services = Arc::new(ServiceControl::new(self.services));
        let sources = self
            .sources
            .into_iter()
            .map(|source| RegisteredSource {
                enabled: services.register(source.name()),
                source,
            })
            .collect();

        Collector {
            registry: Arc::new(DatasetRegistry::new(
                self.capacity.unwrap_or(DEFAULT_CAPACITY),
                self.eviction_threshold.unwrap_or(DEFAULT_EVICTION_THRESHOLD),
            )),
            services,
            sources: Arc::new(Mutex::new(sources)),
            outputs: Arc::new(self.outputs),
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
        }
    }
}

/// Handle for controlling background collection.
///
/// Call `stop()` to end collection; dropping the handle stops it as well.
#[cfg(feature = "tokio")]
pub struct CollectorHandle {
    stop_tx: tokio::sync::watch::Sender<bool>,
}

#[cfg(feature = "tokio")]
impl CollectorHandle {
    /// Stop background collection.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }
}
