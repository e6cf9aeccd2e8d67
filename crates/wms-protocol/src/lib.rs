//! OGC WMS client-side protocol support for tile sources.
//!
//! Supports:
//! - WMS 1.1.1 GetMap request templates and service URL derivation
//! - WMS 1.1.1 / 1.3.0 GetCapabilities documents
//! - JPL TileService documents and their tile patterns

pub mod capabilities;
pub mod getmap;
pub mod template;
pub mod tileservice;
pub mod url;
mod xml;

pub use capabilities::{Capabilities, CapabilitiesError, CapabilitiesLayer};
pub use getmap::{mime_type, GetMapRequest};
pub use template::RequestTemplate;
pub use tileservice::{TilePattern, TileService, TileServiceError, TiledGroup};
pub use url::{capabilities_url, query_separator, tile_service_url};
