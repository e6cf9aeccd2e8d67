//! Tiling profiles: an extent plus a spatial reference, split into a
//! quadtree of tiles below a fixed level-0 grid.

use std::sync::Arc;

use serde::Serialize;

use crate::{BoundingBox, CrsCode, SpatialReference, WmsError, WmsResult};

/// Broad classification of a profile by its reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProfileType {
    /// Geographic (lat/lon) reference.
    Geodetic,
    /// Spherical mercator.
    Mercator,
    /// Any other projected reference; only meaningful for a local area.
    Local,
}

/// The addressable extent and reference system of a tile source.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    srs: SpatialReference,
    extent: BoundingBox,
    tiles_wide: u32,
    tiles_high: u32,
}

impl Profile {
    /// Create a profile whose level-0 grid is derived from the extent's aspect ratio.
    ///
    /// A 2:1 extent yields two tiles across and one down, a 1:3 extent one
    /// across and three down.
    pub fn create(srs: &str, extent: BoundingBox) -> WmsResult<Self> {
        let (wide, high) = level_zero_grid(&extent);
        Self::with_tile_counts(srs, extent, wide, high)
    }

    /// Create a profile with an explicit level-0 grid.
    pub fn with_tile_counts(
        srs: &str,
        extent: BoundingBox,
        tiles_wide: u32,
        tiles_high: u32,
    ) -> WmsResult<Self> {
        let srs = SpatialReference::create(srs)
            .ok_or_else(|| WmsError::InvalidCrs(srs.to_string()))?;

        if !extent.is_valid() {
            return Err(WmsError::InvalidBbox(format!(
                "{},{},{},{}",
                extent.min_x, extent.min_y, extent.max_x, extent.max_y
            )));
        }

        if tiles_wide == 0 || tiles_high == 0 {
            return Err(WmsError::InvalidParameter {
                param: "tiles".to_string(),
                message: format!("level-0 grid {}x{} is empty", tiles_wide, tiles_high),
            });
        }

        Ok(Self {
            srs,
            extent,
            tiles_wide,
            tiles_high,
        })
    }

    pub fn srs(&self) -> &SpatialReference {
        &self.srs
    }

    pub fn extent(&self) -> &BoundingBox {
        &self.extent
    }

    /// Level-0 tile counts as (wide, high).
    pub fn level_zero_tiles(&self) -> (u32, u32) {
        (self.tiles_wide, self.tiles_high)
    }

    pub fn profile_type(&self) -> ProfileType {
        if self.srs.is_geographic() {
            ProfileType::Geodetic
        } else if self.srs.is_mercator() {
            ProfileType::Mercator
        } else {
            ProfileType::Local
        }
    }

    /// Number of tiles (wide, high) at a level.
    pub fn num_tiles(&self, level: u32) -> (u64, u64) {
        let factor = 1u64.checked_shl(level).unwrap_or(u64::MAX);
        (
            (self.tiles_wide as u64).saturating_mul(factor),
            (self.tiles_high as u64).saturating_mul(factor),
        )
    }

    /// Extent of tile (x, y) at a level. Rows count down from the top edge.
    pub fn tile_extent(&self, level: u32, x: u32, y: u32) -> BoundingBox {
        let scale = 2f64.powi(level as i32);
        let tile_width = self.extent.width() / (self.tiles_wide as f64 * scale);
        let tile_height = self.extent.height() / (self.tiles_high as f64 * scale);

        let min_x = self.extent.min_x + x as f64 * tile_width;
        let max_y = self.extent.max_y - y as f64 * tile_height;

        BoundingBox::new(min_x, max_y - tile_height, min_x + tile_width, max_y)
    }

    /// Same reference, bounds and level-0 grid.
    pub fn is_equivalent_to(&self, other: &Profile) -> bool {
        self.srs.is_equivalent_to(&other.srs)
            && self.extent == other.extent
            && self.tiles_wide == other.tiles_wide
            && self.tiles_high == other.tiles_high
    }
}

fn level_zero_grid(extent: &BoundingBox) -> (u32, u32) {
    let aspect = extent.width() / extent.height();
    if !aspect.is_finite() || aspect <= 0.0 {
        return (1, 1);
    }
    if aspect >= 1.0 {
        ((aspect as u32).max(1), 1)
    } else {
        (1, ((extent.height() / extent.width()) as u32).max(1))
    }
}

/// Read-only source of the canonical profiles.
///
/// Passed to whatever needs the canonical global profiles so that callers
/// (and tests) decide which instances count as canonical.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    global_geodetic: Arc<Profile>,
    spherical_mercator: Arc<Profile>,
}

impl ProfileRegistry {
    /// Registry holding the standard whole-earth profiles.
    pub fn new() -> Self {
        Self {
            global_geodetic: Arc::new(Profile {
                srs: SpatialReference::from_code(CrsCode::Epsg4326),
                extent: CrsCode::Epsg4326.valid_bounds(),
                tiles_wide: 2,
                tiles_high: 1,
            }),
            spherical_mercator: Arc::new(Profile {
                srs: SpatialReference::from_code(CrsCode::Epsg3857),
                extent: CrsCode::Epsg3857.valid_bounds(),
                tiles_wide: 1,
                tiles_high: 1,
            }),
        }
    }

    /// Replace the canonical global-geodetic profile.
    pub fn with_global_geodetic(mut self, profile: Arc<Profile>) -> Self {
        self.global_geodetic = profile;
        self
    }

    pub fn global_geodetic(&self) -> &Arc<Profile> {
        &self.global_geodetic
    }

    pub fn spherical_mercator(&self) -> &Arc<Profile> {
        &self.spherical_mercator
    }

    /// Look up a canonical profile by name ("global-geodetic", "spherical-mercator").
    pub fn named(&self, name: &str) -> Option<Arc<Profile>> {
        match name.to_lowercase().as_str() {
            "global-geodetic" | "geodetic" => Some(self.global_geodetic.clone()),
            "spherical-mercator" | "mercator" => Some(self.spherical_mercator.clone()),
            _ => None,
        }
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_zero_grid_from_aspect() {
        let global = Profile::create("EPSG:4326", BoundingBox::new(-180.0, -90.0, 180.0, 90.0))
            .unwrap();
        assert_eq!(global.level_zero_tiles(), (2, 1));

        let tall = Profile::create("EPSG:32633", BoundingBox::new(0.0, 0.0, 100.0, 300.0)).unwrap();
        assert_eq!(tall.level_zero_tiles(), (1, 3));

        let square = Profile::create("EPSG:3857", BoundingBox::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(square.level_zero_tiles(), (1, 1));
    }

    #[test]
    fn test_create_rejects_bad_input() {
        assert!(Profile::create("", BoundingBox::new(0.0, 0.0, 1.0, 1.0)).is_err());
        assert!(Profile::create("EPSG:4326", BoundingBox::new(1.0, 0.0, 0.0, 1.0)).is_err());
        assert!(Profile::with_tile_counts(
            "EPSG:4326",
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            0,
            1
        )
        .is_err());
    }

    #[test]
    fn test_profile_type() {
        let registry = ProfileRegistry::new();
        assert_eq!(registry.global_geodetic().profile_type(), ProfileType::Geodetic);
        assert_eq!(registry.spherical_mercator().profile_type(), ProfileType::Mercator);

        let utm = Profile::create("EPSG:32633", BoundingBox::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(utm.profile_type(), ProfileType::Local);
    }

    #[test]
    fn test_tile_extent() {
        let registry = ProfileRegistry::new();
        let global = registry.global_geodetic();

        assert_eq!(
            global.tile_extent(0, 0, 0),
            BoundingBox::new(-180.0, -90.0, 0.0, 90.0)
        );
        assert_eq!(
            global.tile_extent(0, 1, 0),
            BoundingBox::new(0.0, -90.0, 180.0, 90.0)
        );
        assert_eq!(
            global.tile_extent(1, 1, 1),
            BoundingBox::new(-90.0, -90.0, 0.0, 0.0)
        );
        assert_eq!(global.num_tiles(3), (16, 8));
    }

    #[test]
    fn test_registry_override_and_names() {
        let custom = Arc::new(
            Profile::create("EPSG:4326", BoundingBox::new(-180.0, -90.0, 180.0, 90.0)).unwrap(),
        );
        let registry = ProfileRegistry::new().with_global_geodetic(custom.clone());

        assert!(Arc::ptr_eq(registry.global_geodetic(), &custom));
        assert!(Arc::ptr_eq(&registry.named("global-geodetic").unwrap(), &custom));
        assert!(registry.named("mercator").is_some());
        assert!(registry.named("nowhere").is_none());
    }
}
