//! Common geo types shared by the WMS tile-source crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod profile;
pub mod tile;

pub use bbox::BoundingBox;
pub use crs::{CrsCode, SpatialReference};
pub use error::{WmsError, WmsResult};
pub use profile::{Profile, ProfileRegistry, ProfileType};
pub use tile::TileKey;
