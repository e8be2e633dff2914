//! camrec CLI
//!
//! Record several cameras at once with a live preview.
//!
//! # Usage
//!
//! ```bash
//! # List cameras
//! camrec list
//!
//! # Record every camera found among /dev/video0..3
//! camrec record --max-cam 4 --output-dir ./output
//!
//! # Same as `camrec record`; record flags work without the subcommand
//! camrec -n 2
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// camrec - multi-camera recorder with live preview
#[derive(Parser)]
#[command(name = "camrec")]
#[command(version)]
#[command(about = "Record several cameras at once with a live preview", long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Record flags, used when no subcommand is given
    #[command(flatten)]
    record: commands::RecordArgs,

    /// Subcommand to run (defaults to `record`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record every detected camera and show the preview
    Record(commands::RecordArgs),

    /// List capture devices
    #[command(alias = "ls")]
    List(commands::ListArgs),

    /// Manage the configuration file
    Config(commands::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("camrec={}", level).parse()?)
                .add_directive(format!("camrec_core={}", level).parse()?),
        )
        .with_target(false)
        .init();

    match cli.command {
        Some(Commands::Record(args)) => commands::record(args)?,
        Some(Commands::List(args)) => commands::list(args)?,
        Some(Commands::Config(args)) => commands::config(args)?,
        None => commands::record(cli.record)?,
    }

    Ok(())
}
