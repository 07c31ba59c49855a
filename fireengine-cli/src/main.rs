//! FireEngine configuration tool
//!
//! Checks admin panel configurations before they reach a running server and
//! records the local installation.
//!
//! Usage:
//!   fireengine check --config fireengine.json
//!   fireengine resolve --config fireengine.toml --pretty
//!   fireengine init --dir .

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fireengine_cli::install::{GETTING_STARTED, ensure_installation, record_path};
use fireengine_cli::{load, schemas_json, summary_line};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "fireengine")]
#[command(about = "Validate and resolve FireEngine admin panel configurations")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, validate and resolve a configuration, then summarize it
    Check {
        /// Path to a JSON or TOML configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the resolved collection schemas as JSON
    Resolve {
        /// Path to a JSON or TOML configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Record this installation in the project directory
    Init {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Check { config } => {
            let resolved = load(&config)?;
            for schema in resolved.collections.values() {
                println!("{}", summary_line(schema));
            }
            info!(
                collections = resolved.collections.len(),
                custom_types = resolved.registry.custom_names().count(),
                "configuration OK"
            );
        }
        Command::Resolve { config, pretty } => {
            let resolved = load(&config)?;
            println!("{}", schemas_json(&resolved, pretty)?);
        }
        Command::Init { dir } => {
            let (record, created) = ensure_installation(&dir)?;
            if created {
                println!("{GETTING_STARTED}");
            } else {
                info!(
                    id = %record.id,
                    path = %record_path(&dir).display(),
                    "already initialized"
                );
            }
        }
    }
    Ok(())
}
