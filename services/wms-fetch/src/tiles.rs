//! Tile selection and concurrent fetch-and-write.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use futures::stream::{self, StreamExt};
use image::ImageFormat;
use serde::Serialize;
use tracing::{debug, info, warn};

use wms_common::tile::level_keys;
use wms_common::{Profile, TileKey};
use wms_tile_source::TileSource;

/// What to write for each tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// The image as fetched, re-encoded in the source's format.
    Image,
    /// A JSON summary of the tile's height field.
    HeightField,
}

/// Tiles to fetch and where to put them.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub keys: Vec<TileKey>,
    pub output_dir: PathBuf,
    pub kind: OutputKind,
    pub max_concurrent: usize,
}

/// Counts of tiles written and failed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub written: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
struct HeightFieldSummary {
    level: u32,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    min: Option<f32>,
    max: Option<f32>,
}

/// Parse a tile column/row pair written as `x/y` or `x,y`.
pub fn parse_tile(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s
        .split_once(['/', ','])
        .ok_or_else(|| format!("expected x/y, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid tile index '{}': {}", v, e))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Keys to fetch at `level`: the listed tiles, or every tile up to `max_tiles`.
pub fn select_keys(
    profile: &Arc<Profile>,
    level: u32,
    tiles: &[(u32, u32)],
    max_tiles: usize,
) -> Result<Vec<TileKey>> {
    let (wide, high) = profile.num_tiles(level);

    if tiles.is_empty() {
        let total = wide.saturating_mul(high);
        if total > max_tiles as u64 {
            bail!(
                "level {} has {} tiles, more than the limit of {}; list tiles explicitly",
                level,
                total,
                max_tiles
            );
        }
        return Ok(level_keys(profile, level).collect());
    }

    tiles
        .iter()
        .map(|&(x, y)| {
            if x as u64 >= wide || y as u64 >= high {
                return Err(anyhow!(
                    "tile {}/{} is outside level {} ({}x{} tiles)",
                    x,
                    y,
                    level,
                    wide,
                    high
                ));
            }
            Ok(TileKey::new(level, x, y, profile.clone()))
        })
        .collect()
}

/// File name for a tile: `level_x_y.ext`.
pub fn tile_file_name(key: &TileKey, extension: &str) -> String {
    format!("{}_{}_{}.{}", key.level(), key.x(), key.y(), extension)
}

/// Fetch every planned tile, at most `max_concurrent` at a time, writing each to disk.
///
/// A failed tile is logged and counted; it does not stop the others.
pub async fn run<S>(source: &S, plan: &FetchPlan) -> Result<FetchSummary>
where
    S: TileSource + ?Sized,
{
    tokio::fs::create_dir_all(&plan.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", plan.output_dir.display()))?;

    let results: Vec<(TileKey, Result<PathBuf>)> = stream::iter(plan.keys.iter().cloned())
        .map(|key| async move {
            let result = fetch_one(source, &key, plan).await;
            (key, result)
        })
        .buffer_unordered(plan.max_concurrent.max(1))
        .collect()
        .await;

    let mut summary = FetchSummary::default();
    for (key, result) in results {
        match result {
            Ok(path) => {
                debug!(tile = %key, path = %path.display(), "Wrote tile");
                summary.written += 1;
            }
            Err(e) => {
                warn!(tile = %key, error = %e, "Tile failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        written = summary.written,
        failed = summary.failed,
        "Fetch complete"
    );
    Ok(summary)
}

async fn fetch_one<S>(source: &S, key: &TileKey, plan: &FetchPlan) -> Result<PathBuf>
where
    S: TileSource + ?Sized,
{
    match plan.kind {
        OutputKind::Image => {
            let image = source.fetch_image(key).await?;
            let extension = source.extension();
            let format = ImageFormat::from_extension(extension)
                .ok_or_else(|| anyhow!("cannot encode images as '{}'", extension))?;

            let mut bytes = Cursor::new(Vec::new());
            image
                .write_to(&mut bytes, format)
                .with_context(|| format!("Failed to encode tile {}", key))?;

            let path = plan.output_dir.join(tile_file_name(key, extension));
            write(&path, bytes.into_inner()).await
        }
        OutputKind::HeightField => {
            let field = source.fetch_height_field(key).await;
            let range = field.min_max();
            let summary = HeightFieldSummary {
                level: key.level(),
                x: key.x(),
                y: key.y(),
                width: field.width(),
                height: field.height(),
                min: range.map(|(lo, _)| lo),
                max: range.map(|(_, hi)| hi),
            };

            let path = plan.output_dir.join(tile_file_name(key, "json"));
            write(&path, serde_json::to_vec_pretty(&summary)?).await
        }
    }
}

async fn write(path: &Path, contents: Vec<u8>) -> Result<PathBuf> {
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}
