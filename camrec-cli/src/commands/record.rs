//! Record command - capture every camera with a live preview

use anyhow::{Context, Result};
use clap::Args;
use camrec_core::capture::V4l2Backend;
use camrec_core::config::{ConfigFile, RunConfig};
use camrec_core::controller::KEY_LEGEND;
use camrec_core::display::MinifbDisplay;
use camrec_core::output::{FfmpegWriterFactory, JpegSnapshotWriter};
use camrec_core::recorder::{start_capture, RunOutcome};
use std::path::PathBuf;
use tracing::{error, warn};

/// Arguments for the record command
///
/// Flags left out keep the value from the config file (or the default).
#[derive(Args)]
pub struct RecordArgs {
    /// Number of device ids to probe, starting at 0
    #[arg(short = 'n', long = "max-cam", value_parser = clap::value_parser!(u32).range(1..))]
    max_cam: Option<u32>,

    /// Directory for recordings
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Capture width in pixels
    #[arg(short, long, value_parser = positive_f64)]
    width: Option<f64>,

    /// Capture height in pixels
    #[arg(short = 'H', long, value_parser = positive_f64)]
    height: Option<f64>,

    /// Target framerate
    #[arg(long, value_parser = positive_f64)]
    fps: Option<f64>,

    /// Burn camera id, time and fps into frames (true/false)
    #[arg(
        long = "enable-overlay",
        visible_alias = "ovl",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    enable_overlay: Option<bool>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Config file to use instead of ~/.config/camrec/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RecordArgs {
    /// Override `config` with every flag that was given
    pub(crate) fn apply(&self, mut config: RunConfig) -> RunConfig {
        if let Some(n) = self.max_cam {
            config.max_cameras = n;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(overlay) = self.enable_overlay {
            config.overlay = overlay;
        }
        if let Some(dir) = &self.snapshot_dir {
            config.snapshot_dir = dir.clone();
        }
        config
    }
}

fn positive_f64(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("must be greater than zero, got {}", s))
    }
}

/// Run the recorder until ESC
pub fn record(args: RecordArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => ConfigFile::load_from(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => ConfigFile::load_or_default(),
    };
    let config = args.apply(file.to_run_config());

    for warning in config.validate() {
        warn!("{}", warning);
    }
    config.validate_strict().context("Invalid configuration")?;

    println!("camrec - Starting Recording\n");
    println!("Configuration:");
    println!("  Max cameras:  {}", config.max_cameras);
    println!("  Output:       {}", config.output_dir.display());
    println!("  Snapshots:    {}", config.snapshot_dir.display());
    println!("  Resolution:   {}x{}", config.frame_width(), config.frame_height());
    println!("  Framerate:    {} fps", config.fps);
    println!("  Overlay:      {}", config.overlay);
    println!();
    println!("Keys:");
    for line in KEY_LEGEND {
        println!("  {}", line);
    }
    println!();

    let display = MinifbDisplay::new(&config.window_title);
    let snapshots = JpegSnapshotWriter::new(&config.snapshot_dir);

    let outcome = match start_capture(
        config,
        &V4l2Backend::new(),
        &FfmpegWriterFactory,
        Box::new(display),
        Box::new(snapshots),
    ) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Recording failed: {}", e);
            if let Some(hint) = e.user_hint() {
                eprintln!("Hint: {}", hint);
            }
            return Err(e).context("Recording failed");
        }
    };

    match outcome {
        RunOutcome::NoCameras => {
            println!("No cameras could be opened.");
            println!("Run 'camrec list' to see which devices are available.");
        }
        RunOutcome::Completed(summary) => {
            println!("Recording stopped.");
            println!(
                "  {} camera(s), {} frames each, {:.1}s",
                summary.sessions, summary.iterations, summary.elapsed_secs
            );
            for path in &summary.recordings {
                println!("  Recording: {}", path.display());
            }
            for snapshot in &summary.snapshots {
                println!("  Snapshot:  {}", snapshot.path.display());
            }
        }
    }

    Ok(())
}
