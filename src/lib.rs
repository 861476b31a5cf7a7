//! # seriesmon
//!
//! Command-line collector built on [`seriesmon_core`].
//!
//! The binary reads its settings through [`AppConfig`], samples the configured
//! [`FileSource`]s every interval and writes the current state of every series
//! to a JSON file.
//!
//! ## Usage
//!
//! ```bash
//! # Collect until Ctrl-C
//! seriesmon run --config seriesmon.json
//!
//! # One tick, then exit
//! seriesmon run --config seriesmon.json --once
//!
//! # Disable a source in the persisted config
//! seriesmon configure-service --config seriesmon.json --name jvm --enabled false
//! ```
//!
//! ## Config file
//!
//! ```json
//! {
//!   "interval_secs": 5,
//!   "capacity": 30,
//!   "eviction_threshold": 3,
//!   "output": "series.json",
//!   "sources": [ { "name": "jvm", "path": "/var/run/jvm-metrics.json" } ],
//!   "services": { "jvm": { "enabled": true } }
//! }
//! ```

pub mod commands;
pub mod config;
pub mod source;

pub use config::{AppConfig, SourceConfig};
pub use source::{FileSample, FileSource};
