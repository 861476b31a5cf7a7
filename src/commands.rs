//! The operations behind each subcommand.

use std::path::Path;

use anyhow::{Context, Result};
use seriesmon_core::{
    Collector, ConfigureReport, ConfigureService, Output, SeriesSnapshot, ServiceControl,
};
use tracing::info;

use crate::config::{save_services, AppConfig};

/// Run a single collection tick and write the resulting snapshots.
pub fn run_once(config: &AppConfig) -> Result<Vec<SeriesSnapshot>> {
    let collector = config.collector().build();
    let summary = collector.tick();
    let snapshots = collector.registry().snapshot_all();

    write_snapshots(&config.output, &snapshots)?;
    info!(
        observed = summary.observed,
        output = %config.output.display(),
        "wrote snapshots"
    );
    Ok(snapshots)
}

/// Collect until Ctrl-C, writing every tick's snapshots to the output file.
pub async fn run_until_interrupted(config: &AppConfig) -> Result<()> {
    let collector: Collector = config
        .collector()
        .output(Output::file(&config.output))
        .build();
    let handle = collector.start();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    info!("interrupted, shutting down");
    handle.stop();
    Ok(())
}

/// Change the persisted enabled flag of one of the configured sources.
///
/// Only services named in the config's `sources` are known; anything else
/// fails with [`seriesmon_core::AdminError::UnknownService`].
pub fn configure_service(config_path: &Path, request: &ConfigureService) -> Result<ConfigureReport> {
    let config = AppConfig::load(Some(config_path))?;
    let control = ServiceControl::new(config.services.clone());
    for source in &config.sources {
        control.register(&source.name);
    }

    let report = control.configure(request)?;
    save_services(config_path, &control.persisted())?;
    Ok(report)
}

fn write_snapshots(path: &Path, snapshots: &[SeriesSnapshot]) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshots)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
