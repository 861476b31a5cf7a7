//! Application configuration.
//!
//! Settings are layered: built-in defaults, then an optional JSON file, then
//! environment variables prefixed with `SERIESMON_` (nested keys separated by
//! `__`, e.g. `SERIESMON_INTERVAL_SECS=10`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use seriesmon_core::{CollectorBuilder, ServicesConfig};

use crate::source::FileSource;

/// A file-backed metric source as it appears in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Service name used to enable or disable the source.
    pub name: String,
    /// JSON document read on every tick.
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub interval_secs: u64,
    pub capacity: usize,
    pub eviction_threshold: u32,
    /// Where each tick's snapshots are written.
    pub output: PathBuf,
    pub sources: Vec<SourceConfig>,
    pub services: ServicesConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval_secs: seriesmon_core::DEFAULT_INTERVAL.as_secs(),
            capacity: seriesmon_core::DEFAULT_CAPACITY,
            eviction_threshold: seriesmon_core::DEFAULT_EVICTION_THRESHOLD,
            output: PathBuf::from("series.json"),
            sources: Vec::new(),
            services: ServicesConfig::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional JSON file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Json));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("SERIESMON")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to load configuration")?;

        config
            .try_deserialize()
            .context("invalid configuration")
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// A collector builder carrying every setting and file source in this config.
    pub fn collector(&self) -> CollectorBuilder {
        self.sources.iter().fold(
            CollectorBuilder::new()
                .interval(self.interval())
                .capacity(self.capacity)
                .eviction_threshold(self.eviction_threshold)
                .services(self.services.clone()),
            |builder, source| builder.source(FileSource::new(&source.name, &source.path)),
        )
    }
}

/// Rewrite the `services` section of a JSON config file, leaving the rest intact.
pub fn save_services(path: &Path, services: &ServicesConfig) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let Some(root) = document.as_object_mut() else {
        anyhow::bail!("{} does not contain a JSON object", path.display());
    };
    root.insert("services".to_string(), serde_json::to_value(services)?);

    std::fs::write(path, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("failed to write {}", path.display()))
}
