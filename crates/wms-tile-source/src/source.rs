//! The tile source exposed to imagery and elevation pipelines.

use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;
use tracing::{info, instrument, warn};

use wms_common::{Profile, TileKey, WmsResult};

use crate::config::SourceConfig;
use crate::fetch::{FetchError, ImageFetcher};
use crate::heightfield::{HeightField, ImageToHeightFieldConverter};
use crate::resolver::{ProfileResolver, Resolution};

/// A source of tile images and height fields addressed by tile key.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Fetch the image for a tile. Failures are reported as-is.
    async fn fetch_image(&self, key: &TileKey) -> Result<DynamicImage, FetchError>;

    /// Fetch the elevation grid for a tile, in meters.
    ///
    /// Never fails: a tile whose image cannot be fetched yields a flat field.
    async fn fetch_height_field(&self, key: &TileKey) -> HeightField;

    /// Tile edge in pixels.
    fn pixels_per_tile(&self) -> u32;

    /// Image extension of fetched tiles.
    fn extension(&self) -> &str;

    fn profile(&self) -> &Arc<Profile>;
}

/// Tile source backed by a WMS (or JPL TileService) endpoint.
pub struct WmsTileSource {
    config: SourceConfig,
    resolution: Resolution,
    fetcher: Arc<dyn ImageFetcher>,
    converter: ImageToHeightFieldConverter,
}

impl WmsTileSource {
    /// Resolve the endpoint and build the source.
    ///
    /// No source is created when resolution fails.
    #[instrument(skip_all, fields(url = %config.url))]
    pub async fn open(
        config: SourceConfig,
        resolver: &ProfileResolver,
        map_profile: Option<&Arc<Profile>>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> WmsResult<Self> {
        let resolution = resolver.resolve(&config, map_profile).await?;
        info!(
            extension = %resolution.format,
            tile_size = config.tile_size,
            "Opened WMS tile source"
        );
        Ok(Self::from_resolution(config, resolution, fetcher))
    }

    /// Build a source from an existing resolution.
    pub fn from_resolution(
        config: SourceConfig,
        resolution: Resolution,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        let converter = ImageToHeightFieldConverter::new(config.tile_size);
        Self {
            config,
            resolution,
            fetcher,
            converter,
        }
    }

    /// Request URI for a tile.
    pub fn create_uri(&self, key: &TileKey) -> String {
        self.resolution.template.render_tile(key)
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }
}

#[async_trait]
impl TileSource for WmsTileSource {
    async fn fetch_image(&self, key: &TileKey) -> Result<DynamicImage, FetchError> {
        let uri = self.create_uri(key);
        self.fetcher.fetch_image(&uri).await
    }

    async fn fetch_height_field(&self, key: &TileKey) -> HeightField {
        let image = match self.fetch_image(key).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(tile = %key, error = %e, "Failed to fetch elevation tile, using flat field");
                None
            }
        };

        let mut field = self.converter.convert(image.as_ref());
        field.scale(self.config.elevation_unit.scale_factor());
        field
    }

    fn pixels_per_tile(&self) -> u32 {
        self.config.tile_size
    }

    fn extension(&self) -> &str {
        &self.resolution.format
    }

    fn profile(&self) -> &Arc<Profile> {
        &self.resolution.profile
    }
}
