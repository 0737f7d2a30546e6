// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

use std::fs;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use log::{error, info};
use serde_json::json;
use tracing_appender::non_blocking::NonBlockingBuilder;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry, EnvFilter};

use gaiamaps::file_catalog::FileCatalog;
use gaiamaps::overhead_engine::{OverheadEngine, OverheadRequest};
use gaiamaps_elements::astro_util::MeanSiderealOrientation;
use gaiamaps_elements::catalog_trait::BrightnessMode;
use gaiamaps_elements::star_info::StarInfo;

#[derive(Parser, Debug)]
#[command(author, version, about = "Finds the catalog stars overhead at a \
                                    given place and time.", long_about=None)]
struct Args {
    /// Observer latitude, degrees (-90..90).
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Observer longitude, degrees (-180..180, positive east).
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// ISO 8601 date-time; UTC unless an offset is given. Defaults to now.
    #[arg(long)]
    datetime: Option<String>,

    /// naked-eye, bright, faint or all.
    #[arg(long, value_parser = parse_brightness_mode, default_value = "all")]
    brightness_mode: BrightnessMode,

    /// JSON array of catalog rows (e.g. a Gaia archive export).
    #[arg(long)]
    catalog: PathBuf,

    /// Row limit override (naked-eye mode only).
    #[arg(long)]
    limit: Option<usize>,

    /// Only return stars with proper motion.
    #[arg(long)]
    include_velocity: bool,

    /// Also return stars without parallax.
    #[arg(long)]
    no_distance: bool,

    /// Add derived facts (distance, spectral type, ...) for the star
    /// nearest the zenith.
    #[arg(long)]
    star_info: bool,

    /// Write the result here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    log_dir: String,

    #[arg(long, default_value = "gaiamaps_log.txt")]
    log_file: String,
}

fn parse_brightness_mode(arg: &str) -> Result<BrightnessMode, String> {
    arg.parse::<BrightnessMode>().map_err(|e| e.message)
}

fn main() {
    let args = Args::parse();

    // Set up logging.
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&args.log_file)
        .max_log_files(10)
        .build(&args.log_dir).unwrap();
    let (non_blocking_file, _guard1) = NonBlockingBuilder::default()
        .lossy(false)
        .finish(file_appender);
    // Results go to stdout, so log to stderr.
    let (non_blocking_stderr, _guard2) = NonBlockingBuilder::default()
        .lossy(false)
        .finish(std::io::stderr());
    registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(non_blocking_stderr))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking_file))
        .init();

    let catalog = match FileCatalog::load(&args.catalog) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("{:?}", e);
            std::process::exit(1);
        }
    };
    let request = OverheadRequest {
        lat: args.lat,
        lon: args.lon,
        datetime_iso: args.datetime.clone().unwrap_or_else(
            || Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        brightness_mode: args.brightness_mode,
        include_velocity: args.include_velocity,
        include_distance: !args.no_distance,
        limit: args.limit,
    };
    let engine = OverheadEngine::new(&catalog, &MeanSiderealOrientation);
    let response = match engine.process(&request) {
        Ok(response) => response,
        Err(e) => {
            error!("{:?}", e);
            std::process::exit(1);
        }
    };

    let mut result = json!(response);
    if args.star_info {
        if let Some(nearest) = response.stars.first() {
            result["star_info"] = json!(StarInfo::from_record(nearest));
        }
    }
    // Serializing plain data cannot fail.
    let text = serde_json::to_string_pretty(&result).unwrap();
    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, text + "\n") {
                error!("Could not write {:?}: {:?}", path, e);
                std::process::exit(1);
            }
            info!("Wrote {} stars to {:?}", response.stars.len(), path);
        }
        None => println!("{}", text),
    }
}
