//! Netsec CLI - runs the network-security training pipeline.
//!
//! `netsec-cli` with no subcommand behaves like `netsec-cli run`.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, run, runs};

/// Netsec CLI - network-security model training pipeline
#[derive(Parser, Debug)]
#[command(
    name = "netsec-cli",
    author,
    version,
    about = "Ingest, validate, transform and train the network-security classifier"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Settings file (defaults to ./netsec.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every pipeline stage into a new artifact directory
    Run {
        /// Fixed seed for the train/test split
        #[arg(long)]
        seed: Option<u64>,

        /// Do not print stage artifacts
        #[arg(short, long)]
        quiet: bool,
    },

    /// List completed runs under the artifact root
    Runs {
        /// Print manifests as JSON
        #[arg(long)]
        json: bool,

        /// Print the model path of one run
        #[arg(long, value_name = "RUN_ID")]
        model: Option<String>,
    },

    /// Print the resolved settings as TOML
    Config,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = args.config.as_deref();
    match args.command.unwrap_or(Command::Run { seed: None, quiet: false }) {
        Command::Run { seed, quiet } => run::execute(config_path, seed, quiet),
        Command::Runs { json, model } => runs::execute(config_path, json, model.as_deref()),
        Command::Config => config::execute(config_path),
    }
}
