//! Codelift CLI - package local training code and submit remote training jobs.
//!
//! `codelift submit` archives a trainer directory (honoring the config's
//! exclude patterns), uploads it to the configured storage location, and
//! hands the job to the training platform gateway.

mod platform;

use anyhow::Context;
use clap::{Parser, Subcommand};
use codelift_core::{submit_training_job, AppConfig};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "codelift",
    version,
    about = "Package local training code and submit remote training jobs"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Package a trainer directory and submit it as a training job
    Submit {
        /// Trainer directory
        #[arg(default_value = ".")]
        trainer_dir: PathBuf,

        /// Config file name
        #[arg(long, default_value = "./config.yaml")]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing()?;

    match args.command {
        Command::Submit { trainer_dir, config } => {
            let app_config = AppConfig::from_yaml(&config)
                .with_context(|| format!("failed to load {}", config.display()))?;
            let client = platform::PlatformClient::new(&app_config.platform.endpoint)?;
            let handle = submit_training_job(&app_config, &trainer_dir, &client, &client)?;
            println!("Submitted training job: {}", handle.job_name);
        }
    }

    Ok(())
}

/// Log level comes from `CODELIFT_LOG` (trace/debug/info/warn/error),
/// defaulting to info.
fn init_tracing() -> anyhow::Result<()> {
    let level = match std::env::var("CODELIFT_LOG").as_deref() {
        Ok("trace") => Level::TRACE,
        Ok("debug") => Level::DEBUG,
        Ok("warn") => Level::WARN,
        Ok("error") => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
