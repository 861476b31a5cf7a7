//! # seriesmon-core
//!
//! Bounded, per-series history with running statistics, fed by a periodic
//! collector.
//!
//! Every distinct `(instance, series)` pair gets its own dataset: a ring of
//! the most recent points plus totals (min, max, sum, counts, stability run)
//! that cover every value ever observed. Datasets are created on first
//! observation and evicted after staying silent for a few ticks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seriesmon_core::{Collector, GaugeSource, Output};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (source, gauges) = GaugeSource::new("jvm", "server");
//!
//!     let collector = Collector::builder()
//!         .source(source)
//!         .output(Output::file("series.json"))
//!         .interval(Duration::from_secs(1))
//!         .build();
//!
//!     // Start background collection (non-blocking)
//!     let handle = collector.start();
//!
//!     gauges.set("ns:jvm HeapUsage", 512);
//!
//!     // ... your application runs ...
//!     handle.stop();
//! }
//! ```
//!
//! ## Reading datasets
//!
//! ```rust
//! use seriesmon_core::{DatasetRegistry, SeriesKey};
//!
//! let registry = DatasetRegistry::new(3, 2);
//! let key = SeriesKey::new("server", "ThreadCount");
//! for (t, v) in [(0, 5), (1, 5), (2, 7), (3, 7), (4, 7)] {
//!     registry.observe(&key, t, v);
//! }
//!
//! let snapshot = registry.get(&key).unwrap().snapshot();
//! assert_eq!(snapshot.values(), vec![7, 7, 7]);
//! assert_eq!(snapshot.observed_min, 5);
//! assert_eq!(snapshot.stable_count, 3);
//! ```

mod admin;
mod collector;
mod dataset;
mod error;
mod handle;
mod output;
mod registry;
mod ring;
mod source;
mod stability;

pub use admin::{ConfigureReport, ConfigureService, ServiceControl, ServiceSettings, ServicesConfig};
#[cfg(feature = "tokio")]
pub use collector::CollectorHandle;
pub use collector::{Collector, CollectorBuilder, DEFAULT_INTERVAL};
pub use dataset::{SeriesDataset, DEFAULT_CAPACITY};
pub use error::{AdminError, SourceError};
pub use handle::{GaugeHandle, GaugeSource};
pub use output::Output;
pub use registry::{DatasetRegistry, SeriesQuery, TickSummary, DEFAULT_EVICTION_THRESHOLD};
pub use ring::PointRing;
pub use source::{FnSource, MetricSource, Observation};
pub use stability::Stability;

// Re-export types for convenience
pub use seriesmon_types::{BigInt, Point, SeriesKey, SeriesSnapshot};
