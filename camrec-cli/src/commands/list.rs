//! List command - probe capture devices

use anyhow::Result;
use camrec_core::capture::{detect_devices, V4l2Backend};
use camrec_core::config::{ConfigFile, DEFAULT_MAX_CAMERAS};
use clap::Args;

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// Number of device ids to probe (defaults to the config file value)
    #[arg(short = 'n', long = "max-cam", value_parser = clap::value_parser!(u32).range(1..))]
    max_cam: Option<u32>,
}

/// List cameras that open as capture devices
pub fn list(args: ListArgs) -> Result<()> {
    let max = args
        .max_cam
        .unwrap_or_else(|| ConfigFile::load_or_default().recording.max_cameras.max(1));

    println!("camrec - Available Cameras\n");

    let devices = detect_devices(&V4l2Backend::new(), max);

    if devices.is_empty() {
        println!("No cameras found among /dev/video0../dev/video{}.", max - 1);
        if max < DEFAULT_MAX_CAMERAS {
            println!("Try a larger --max-cam.");
        }
        return Ok(());
    }

    println!("{:<6} {:<16}", "ID", "Device");
    println!("{}", "-".repeat(22));
    for id in devices {
        println!("{:<6} /dev/video{}", id, id);
    }

    println!("\nRecord them all with 'camrec record --max-cam {}'.", max);

    Ok(())
}
