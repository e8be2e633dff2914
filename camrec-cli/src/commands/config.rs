//! Config command - inspect and create the configuration file

use anyhow::{Context, Result};
use camrec_core::config::{sample_config, ConfigFile};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print where the config file is read from
    Path,

    /// Print the settings `camrec record` would use
    Show {
        /// Read this file instead of the default one
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Write the sample config file to the default path
    Init {
        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the sample config file
    Sample,
}

/// Run config subcommand
pub fn config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Path => {
            let path = ConfigFile::default_path();
            let state = if path.exists() { "exists" } else { "not created yet" };
            println!("{} ({})", path.display(), state);
        }
        ConfigCommand::Show { file } => {
            let path = file.unwrap_or_else(ConfigFile::default_path);
            let loaded = ConfigFile::load_from(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let run = loaded.to_run_config();

            if path.exists() {
                println!("Settings from {}\n", path.display());
            } else {
                println!("No file at {}, showing defaults\n", path.display());
            }
            println!("[recording]");
            println!("  max_cameras = {}", run.max_cameras);
            println!("  output_dir  = {}", run.output_dir.display());
            println!("  size        = {}x{}", run.frame_width(), run.frame_height());
            println!("  fps         = {}", run.fps);
            println!("  overlay     = {}", run.overlay);
            println!("[preview]");
            println!("  title       = {}", run.window_title);
            println!("  poll        = {:?}", run.poll_timeout);
            println!("[snapshots]");
            println!("  dir         = {}", run.snapshot_dir.display());

            let warnings = run.validate();
            if !warnings.is_empty() {
                println!("\nWarnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            if let Err(e) = run.validate_strict() {
                println!("\nError: {}", e);
            }
        }
        ConfigCommand::Init { force } => {
            let path = ConfigFile::default_path();
            if path.exists() && !force {
                println!("{} already exists; pass --force to replace it.", path.display());
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, sample_config())
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!("Wrote {}", path.display());
            println!("Edit it to change the defaults used by 'camrec record'.");
        }
        ConfigCommand::Sample => print!("{}", sample_config()),
    }

    Ok(())
}
