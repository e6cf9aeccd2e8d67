//! Tile keys addressing a profile's quadtree.

use std::fmt;
use std::sync::Arc;

use crate::{BoundingBox, Profile};

/// A tile address (level/x/y) within a profile.
///
/// `x` counts columns from the profile's west edge, `y` counts rows from its
/// north edge.
#[derive(Debug, Clone)]
pub struct TileKey {
    level: u32,
    x: u32,
    y: u32,
    profile: Arc<Profile>,
}

impl TileKey {
    pub fn new(level: u32, x: u32, y: u32, profile: Arc<Profile>) -> Self {
        Self {
            level,
            x,
            y,
            profile,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    /// The tile's bounds in the profile's reference system.
    pub fn extent(&self) -> BoundingBox {
        self.profile.tile_extent(self.level, self.x, self.y)
    }

    /// Generate a cache key string.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.level, self.x, self.y)
    }

    /// Get the parent tile (level - 1).
    pub fn parent(&self) -> Option<TileKey> {
        if self.level == 0 {
            return None;
        }
        Some(TileKey::new(
            self.level - 1,
            self.x / 2,
            self.y / 2,
            self.profile.clone(),
        ))
    }

    /// Get the four children tiles (level + 1).
    pub fn children(&self) -> [TileKey; 4] {
        let x = self.x * 2;
        let y = self.y * 2;
        let level = self.level + 1;
        [
            TileKey::new(level, x, y, self.profile.clone()),
            TileKey::new(level, x + 1, y, self.profile.clone()),
            TileKey::new(level, x, y + 1, self.profile.clone()),
            TileKey::new(level, x + 1, y + 1, self.profile.clone()),
        ]
    }
}

impl PartialEq for TileKey {
    fn eq(&self, other: &Self) -> bool {
        self.level == other.level
            && self.x == other.x
            && self.y == other.y
            && (Arc::ptr_eq(&self.profile, &other.profile)
                || self.profile.is_equivalent_to(&other.profile))
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

/// Every key of a level, row by row.
pub fn level_keys(profile: &Arc<Profile>, level: u32) -> impl Iterator<Item = TileKey> + '_ {
    let (wide, high) = profile.num_tiles(level);
    let wide = wide.min(u32::MAX as u64) as u32;
    let high = high.min(u32::MAX as u64) as u32;
    (0..high).flat_map(move |y| (0..wide).map(move |x| TileKey::new(level, x, y, profile.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProfileRegistry;

    #[test]
    fn test_parent_children() {
        let registry = ProfileRegistry::new();
        let profile = registry.global_geodetic().clone();

        let tile = TileKey::new(5, 10, 15, profile.clone());
        let parent = tile.parent().unwrap();
        assert_eq!(parent, TileKey::new(4, 5, 7, profile.clone()));

        let children = parent.children();
        assert!(children.contains(&tile));
        assert!(TileKey::new(0, 0, 0, profile).parent().is_none());
    }

    #[test]
    fn test_extent_nests_in_parent() {
        let registry = ProfileRegistry::new();
        let tile = TileKey::new(3, 5, 2, registry.global_geodetic().clone());
        let extent = tile.extent();
        let parent_extent = tile.parent().unwrap().extent();

        assert!(parent_extent.contains_point(extent.min_x, extent.min_y));
        assert!(parent_extent.contains_point(extent.max_x, extent.max_y));
    }

    #[test]
    fn test_level_keys() {
        let registry = ProfileRegistry::new();
        let keys: Vec<TileKey> = level_keys(registry.global_geodetic(), 1).collect();

        assert_eq!(keys.len(), 8);
        assert_eq!(keys[0].cache_key(), "1/0/0");
        assert_eq!(keys[4].cache_key(), "1/0/1");
    }
}
