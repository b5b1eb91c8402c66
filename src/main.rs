mod config;
mod geocode;
mod identity;
mod keys;
mod media;
mod metadata;
mod pipeline;
mod plan;
mod prompt;
mod resolve;
mod transfer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::geocode::{GeoLookup, NoGeoLookup, NominatimLookup};
use crate::identity::IdentityNormalizer;
use crate::keys::KeyBuilder;
use crate::metadata::ExiftoolAdapter;
use crate::pipeline::MediaRoots;
use crate::prompt::StdinPrompt;
use crate::resolve::{EventResolver, ResolveOptions};
use crate::transfer::{Mover, TransferMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GpsMode {
    /// Ignore GPS data entirely
    Off,
    /// Split same-day events by location
    Group,
    /// Also name new events after the looked-up location
    Name,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source pool directory (defaults to SourcePath from the config)
    source: Option<PathBuf>,
    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
    /// Move files instead of copying them
    #[arg(long = "move")]
    move_files: bool,
    /// Print actions without copying files
    #[arg(long)]
    dry_run: bool,
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
    /// Name new events by bare date, skipping the title prompt
    #[arg(long)]
    date_only: bool,
    /// Skip every event that already has a matching directory
    #[arg(long)]
    ignore_all: bool,
    /// Pick the Nth matching directory instead of prompting
    #[arg(long)]
    match_index: Option<usize>,
    /// How GPS data participates in grouping and naming
    #[arg(long, value_enum, default_value_t = GpsMode::Off)]
    gps: GpsMode,
    /// Camera maker used when metadata has none
    #[arg(long)]
    maker: Option<String>,
    /// Camera model used when metadata has none
    #[arg(long)]
    model: Option<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config_path = args.config.clone().unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load(&config_path, args.config.is_some())?;

    let source = args
        .source
        .clone()
        .or_else(|| settings.source_path.clone())
        .context("no source directory given and no SourcePath configured")?;
    settings.ensure_ready(&source)?;

    let default_make = args
        .maker
        .clone()
        .or_else(|| settings.camera_maker.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let default_model = args
        .model
        .clone()
        .or_else(|| settings.camera_model.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let key_builder = KeyBuilder::new(
        IdentityNormalizer::new(),
        default_make,
        default_model,
        args.gps != GpsMode::Off,
    );

    let geo: Box<dyn GeoLookup> = match args.gps {
        GpsMode::Name => Box::new(NominatimLookup::new()),
        GpsMode::Off | GpsMode::Group => Box::new(NoGeoLookup),
    };
    let options = ResolveOptions {
        match_index: args.match_index,
        ignore_all: args.ignore_all,
        gps_naming: args.gps == GpsMode::Name,
        date_only: args.date_only,
    };
    let mut prompt = StdinPrompt;
    let mut resolver = EventResolver::new(options, &mut prompt, geo.as_ref());

    let files = pipeline::enumerate_pool(&source)?;
    info!("{} media files in {}", files.len(), source.display());

    let roots = MediaRoots {
        image: settings.image_root(),
        video: settings.video_root(),
    };
    let outcome =
        pipeline::scan_pool(&files, &ExiftoolAdapter, &key_builder, &mut resolver, &roots)?;

    let mode = if args.move_files { TransferMode::Move } else { TransferMode::Copy };
    let mover = Mover::new(mode, args.dry_run);
    let summary = pipeline::transfer_pool(&outcome, &mover)?;

    println!(
        "{} transferred, {} already present, {} ignored",
        summary.transferred, summary.skipped_existing, summary.ignored
    );
    Ok(())
}
