use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use seriesmon::commands;
use seriesmon::AppConfig;
use seriesmon_core::ConfigureService;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "seriesmon")]
#[command(about = "Collect bounded per-series history with running statistics")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect from the configured sources
    Run {
        /// Path to a JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to write snapshots (overrides the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run a single tick and exit
        #[arg(long)]
        once: bool,
    },

    /// Enable or disable a source in the persisted config
    ConfigureService {
        /// Path to the JSON config file to edit
        #[arg(short, long)]
        config: PathBuf,

        /// Service (source) name
        #[arg(short, long)]
        name: String,

        /// New enabled state
        #[arg(short, long, action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Run {
            config,
            output,
            once,
        } => {
            let mut config = AppConfig::load(config.as_deref())?;
            if let Some(output) = output {
                config.output = output;
            }

            if once {
                commands::run_once(&config)?;
                return Ok(());
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::run_until_interrupted(&config))
        }
        Command::ConfigureService {
            config,
            name,
            enabled,
        } => {
            let report = commands::configure_service(&config, &ConfigureService::new(name, enabled))?;
            println!(
                "Service {} is now {} in {}",
                report.service_name,
                if report.enabled { "enabled" } else { "disabled" },
                config.display()
            );
            Ok(())
        }
    }
}
