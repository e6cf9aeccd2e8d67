//! Tile fetcher for WMS and JPL TileService endpoints.
//!
//! Resolves a source from key/value options (a YAML file plus `--option`
//! overrides), then fetches the requested tiles of one level concurrently
//! and writes them as `level_x_y.<ext>` images or height field summaries.

mod tiles;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use wms_common::ProfileRegistry;
use wms_tile_source::{
    options_from_yaml, HttpConfig, HttpImageFetcher, ProfileResolver, SourceConfig, TileSource,
    WmsTileSource,
};

use tiles::{FetchPlan, OutputKind};

#[derive(Parser, Debug)]
#[command(name = "wms-fetch")]
#[command(about = "Fetch tiles from a WMS or JPL TileService endpoint")]
struct Args {
    /// YAML file of source options (url, layers, format, srs, ...)
    #[arg(short, long, env = "WMS_SOURCE_CONFIG")]
    config: Option<PathBuf>,

    /// Source option as key=value, overriding the config file
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Canonical map profile to negotiate against (global-geodetic, spherical-mercator)
    #[arg(long)]
    map_profile: Option<String>,

    /// Tile level to fetch
    #[arg(short, long, default_value = "0")]
    level: u32,

    /// Tile to fetch as x/y; repeatable. Default: every tile of the level
    #[arg(short, long = "tile", value_parser = tiles::parse_tile)]
    tiles: Vec<(u32, u32)>,

    /// Refuse to fetch a whole level with more tiles than this
    #[arg(long, default_value = "64")]
    max_tiles: usize,

    /// Write height field summaries instead of images
    #[arg(long)]
    heightfield: bool,

    /// Directory for fetched tiles
    #[arg(long, default_value = "tiles")]
    output_dir: PathBuf,

    /// Maximum concurrent tile fetches
    #[arg(long, default_value = "4")]
    max_concurrent: usize,

    /// HTTP request timeout in seconds
    #[arg(long, env = "WMS_TIMEOUT_SECS", default_value = "60")]
    timeout_secs: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log as JSON
    #[arg(long)]
    log_json: bool,
}

fn parse_option(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty option key in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let mut options = match &args.config {
        Some(path) => {
            let yaml = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            options_from_yaml(&yaml)?
        }
        None => HashMap::new(),
    };
    options.extend(args.options.iter().cloned());

    let config = SourceConfig::from_options(&options)?;
    config.validate().map_err(|e| anyhow!(e))?;

    let http = HttpConfig {
        timeout: Duration::from_secs(args.timeout_secs),
        ..Default::default()
    };

    let registry = ProfileRegistry::new();
    let map_profile = args
        .map_profile
        .as_deref()
        .map(|name| {
            registry
                .named(name)
                .ok_or_else(|| anyhow!("Unknown map profile '{}'", name))
        })
        .transpose()?;

    info!(url = %config.url, layers = %config.layers, "Opening WMS source");

    let resolver = ProfileResolver::http(&http, registry)?;
    let fetcher = Arc::new(HttpImageFetcher::new(&http)?);
    let source = WmsTileSource::open(config, &resolver, map_profile.as_ref(), fetcher)
        .await
        .context("Failed to open WMS source")?;

    let plan = FetchPlan {
        keys: tiles::select_keys(source.profile(), args.level, &args.tiles, args.max_tiles)?,
        output_dir: args.output_dir.clone(),
        kind: if args.heightfield {
            OutputKind::HeightField
        } else {
            OutputKind::Image
        },
        max_concurrent: args.max_concurrent,
    };

    info!(
        tiles = plan.keys.len(),
        level = args.level,
        output = %plan.output_dir.display(),
        "Fetching tiles"
    );

    let summary = tiles::run(&source, &plan).await?;
    if summary.written == 0 && summary.failed > 0 {
        return Err(anyhow!("All {} tiles failed", summary.failed));
    }

    Ok(())
}
