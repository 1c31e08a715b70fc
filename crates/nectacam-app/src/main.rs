// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// NectaCam — capture and enhance photos.
//
// Entry point. Initialises logging, backend services, and dispatches the
// command-line subcommands.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use nectacam_core::error::Result;
use nectacam_core::human_errors::humanize_error;
use nectacam_core::types::EnhancementSelection;

use services::app_services::{AppServices, Report};

#[derive(Parser)]
#[command(name = "nectacam")]
#[command(version, about = "Capture photos with histogram equalization or contrast stretching", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance an existing image file
    Enhance {
        /// Image to enhance (JPEG, PNG, ...)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Enhancement to apply (default: configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,

        /// Output file, .jpg or .png (default: save to the gallery)
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// JPEG quality 0-100 (default: configured quality)
        #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u8).range(0..=100))]
        quality: Option<u8>,
    },

    /// Take one photo with the device camera and save it to the gallery
    Capture {
        /// Enhancement to apply (default: configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,
    },

    /// List saved photos
    Gallery,

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings as JSON
    Show,

    /// Set the enhancement applied when no --mode is given
    SetMode {
        #[arg(value_enum)]
        mode: Mode,
    },

    /// Set the JPEG quality of saved photos
    SetQuality {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        quality: u8,
    },
}

/// Enhancement names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Per-channel histogram equalization
    Histogram,
    /// Luminance-range contrast stretching
    Contrast,
    /// Leave the image unchanged
    None,
}

impl From<Mode> for EnhancementSelection {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Histogram => EnhancementSelection::HistogramEqualization,
            Mode::Contrast => EnhancementSelection::ContrastStretching,
            Mode::None => EnhancementSelection::None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            eprintln!("{}", humanize_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    let svc = AppServices::init()?;

    match command {
        Commands::Enhance {
            input,
            mode,
            out,
            quality,
        } => {
            let report = svc
                .enhance_file(&input, mode.map(Into::into), out.as_deref(), quality)
                .await?;
            print_report(&report);
        }
        Commands::Capture { mode } => {
            let report = svc.capture_once(mode.map(Into::into)).await?;
            print_report(&report);
        }
        Commands::Gallery => {
            let images = svc.list_gallery()?;
            if images.is_empty() {
                println!("No photos in {}", svc.gallery_dir().display());
            }
            for image in images {
                println!("{image}");
            }
        }
        Commands::Config { action } => {
            let config = match action {
                ConfigAction::Show => svc.config(),
                ConfigAction::SetMode { mode } => svc.set_default_enhancement(mode.into())?,
                ConfigAction::SetQuality { quality } => svc.set_jpeg_quality(quality)?,
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn print_report(report: &Report) {
    println!("{} ({:?})", report.location, report.outcome);
    println!("{}", report.stats);
}
