//! Tile source over a WMS server or a JPL TileService endpoint.
//!
//! A source is opened once: its capabilities (and, when published, its
//! TileService document) are read to settle the tiling profile and build a
//! request template. Tiles are then fetched concurrently by rendering each
//! tile's extent into the template.
//!
//! # Example
//!
//! ```ignore
//! let config = SourceConfig::from_options(&options)?;
//! let resolver = ProfileResolver::http(&HttpConfig::default(), ProfileRegistry::new())?;
//! let fetcher = Arc::new(HttpImageFetcher::new(&HttpConfig::default())?);
//! let source = WmsTileSource::open(config, &resolver, None, fetcher).await?;
//! let image = source.fetch_image(&key).await?;
//! ```

pub mod config;
pub mod fetch;
pub mod heightfield;
pub mod readers;
pub mod resolver;
pub mod source;

pub use config::{options_from_yaml, ElevationUnit, HttpConfig, SourceConfig};
pub use fetch::{FetchError, HttpImageFetcher, ImageFetcher};
pub use heightfield::{HeightField, ImageToHeightFieldConverter};
pub use readers::{CapabilitiesReader, HttpDocumentReader, TileServiceReader};
pub use resolver::{ProfileContext, ProfileResolver, ProfileStrategy, Resolution};
pub use source::{TileSource, WmsTileSource};
