// SPDX-License-Identifier: MIT OR Apache-2.0
//! Marquee player - headless playback of cue sheets
//!
//! Loads a RON cue sheet, builds a director over its targets and plays it
//! to the end, either frame-stepped as fast as possible or following the
//! wall clock. The final target values are logged when playback ends.

mod cue_sheet;
mod runner;

use clap::Parser;
use cue_sheet::{CueSheet, CueSheetError};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Play a Marquee cue sheet
#[derive(Parser, Debug)]
#[command(name = "marquee-player")]
#[command(about = "Headless player for Marquee cue sheets")]
#[command(version)]
struct Args {
    /// Cue sheet to play
    cue_sheet: PathBuf,

    /// Follow the wall clock instead of stepping frames
    #[arg(long)]
    realtime: bool,

    /// Frames per second (overrides the cue sheet)
    #[arg(long)]
    fps: Option<f64>,

    /// Stop after this many seconds
    #[arg(long)]
    until: Option<f64>,
}

fn run(args: Args) -> Result<(), CueSheetError> {
    let sheet = CueSheet::load(&args.cue_sheet)?;
    tracing::info!("Loaded `{}` from {}", sheet.name, args.cue_sheet.display());

    let mut settings = sheet.settings.clone();
    settings.realtime |= args.realtime;
    if let Some(fps) = args.fps {
        settings.fps = fps;
    }
    if args.until.is_some() {
        settings.until = args.until;
    }
    settings.validate()?;

    let report = runner::play(&sheet, &settings)?;
    tracing::info!(
        "Played {} frames, stopped at {:.3}s",
        report.frames,
        report.position
    );
    for (name, values) in &report.targets {
        tracing::info!("{name}: {values:?}");
    }

    Ok(())
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("marquee_player=info,marquee_director=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Marquee player v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(Args::parse()) {
        tracing::error!("Playback failed: {e}");
        std::process::exit(1);
    }
}
