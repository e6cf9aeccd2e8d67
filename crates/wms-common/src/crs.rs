//! Spatial reference types and equivalence rules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BoundingBox;

/// Half the circumference of the spherical mercator world, in meters.
pub const MERCATOR_MAX_EXTENT: f64 = 20037508.342789244;

/// Well-known reference codes with built-in knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
    /// NAD83 Geographic
    Epsg4269,
    /// Spherical (Web) Mercator (meters)
    Epsg3857,
    /// Albers Equal Area (CONUS)
    Epsg5070,
    /// Polar Stereographic North
    Epsg3413,
    /// Polar Stereographic South
    Epsg3031,
}

impl CrsCode {
    /// Parse a WMS SRS/CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:4326"
    /// - "CRS:84" and "WGS84" (both EPSG:4326)
    /// - "EPSG:900913", "EPSG:3785", "EPSG:102113" (all spherical mercator)
    pub fn from_wms_string(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" | "WGS84" => Some(CrsCode::Epsg4326),
            "EPSG:4269" => Some(CrsCode::Epsg4269),
            "EPSG:3857" | "EPSG:900913" | "EPSG:3785" | "EPSG:102113" => Some(CrsCode::Epsg3857),
            "EPSG:5070" => Some(CrsCode::Epsg5070),
            "EPSG:3413" => Some(CrsCode::Epsg3413),
            "EPSG:3031" => Some(CrsCode::Epsg3031),
            _ => None,
        }
    }

    /// Check if this is a geographic (lat/lon) reference.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }

    /// Get the valid bounds for this reference.
    pub fn valid_bounds(&self) -> BoundingBox {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4269 => BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
            CrsCode::Epsg3857 => BoundingBox::new(
                -MERCATOR_MAX_EXTENT,
                -MERCATOR_MAX_EXTENT,
                MERCATOR_MAX_EXTENT,
                MERCATOR_MAX_EXTENT,
            ),
            CrsCode::Epsg5070 => {
                // approximate bounds in meters
                BoundingBox::new(-2500000.0, -2500000.0, 2500000.0, 2500000.0)
            }
            CrsCode::Epsg3413 | CrsCode::Epsg3031 => {
                BoundingBox::new(-4000000.0, -4000000.0, 4000000.0, 4000000.0)
            }
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg4269 => "EPSG:4269",
            CrsCode::Epsg3857 => "EPSG:3857",
            CrsCode::Epsg5070 => "EPSG:5070",
            CrsCode::Epsg3413 => "EPSG:3413",
            CrsCode::Epsg3031 => "EPSG:3031",
        };
        write!(f, "{}", code)
    }
}

/// A spatial reference identified by its init string (e.g. "EPSG:4326").
///
/// Codes outside [`CrsCode`] are still accepted; they are treated as
/// projected references and only compare equivalent to the same identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialReference {
    init: String,
    code: Option<CrsCode>,
}

impl SpatialReference {
    /// Build a reference from an SRS identifier. Returns `None` for a blank string.
    pub fn create(init: &str) -> Option<Self> {
        let init = init.trim();
        if init.is_empty() {
            return None;
        }
        Some(Self {
            init: init.to_string(),
            code: CrsCode::from_wms_string(init),
        })
    }

    /// Reference for a known code, identified by its canonical name.
    pub fn from_code(code: CrsCode) -> Self {
        Self {
            init: code.to_string(),
            code: Some(code),
        }
    }

    /// The identifier this reference was created from.
    pub fn init_string(&self) -> &str {
        &self.init
    }

    pub fn code(&self) -> Option<CrsCode> {
        self.code
    }

    pub fn is_geographic(&self) -> bool {
        self.code.map(|c| c.is_geographic()).unwrap_or(false)
    }

    pub fn is_mercator(&self) -> bool {
        self.code == Some(CrsCode::Epsg3857)
    }

    /// True when both references describe the same coordinate system.
    ///
    /// Aliases of a known code ("CRS:84" and "EPSG:4326") are equivalent;
    /// unknown identifiers are compared case-insensitively.
    pub fn is_equivalent_to(&self, other: &SpatialReference) -> bool {
        match (self.code, other.code) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.init.eq_ignore_ascii_case(&other.init),
            _ => false,
        }
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(CrsCode::from_wms_string("EPSG:4326"), Some(CrsCode::Epsg4326));
        assert_eq!(CrsCode::from_wms_string("epsg:3857"), Some(CrsCode::Epsg3857));
        assert_eq!(CrsCode::from_wms_string("CRS:84"), Some(CrsCode::Epsg4326));
        assert_eq!(CrsCode::from_wms_string("EPSG:900913"), Some(CrsCode::Epsg3857));
        assert!(CrsCode::from_wms_string("EPSG:99999").is_none());
    }

    #[test]
    fn test_blank_reference() {
        assert!(SpatialReference::create("").is_none());
        assert!(SpatialReference::create("   ").is_none());
    }

    #[test]
    fn test_equivalence() {
        let wgs84 = SpatialReference::create("EPSG:4326").unwrap();
        let crs84 = SpatialReference::create("CRS:84").unwrap();
        let nad83 = SpatialReference::create("EPSG:4269").unwrap();
        let google = SpatialReference::create("EPSG:900913").unwrap();
        let mercator = SpatialReference::create("EPSG:3857").unwrap();

        assert!(wgs84.is_equivalent_to(&crs84));
        assert!(!wgs84.is_equivalent_to(&nad83));
        assert!(google.is_equivalent_to(&mercator));
        assert!(!mercator.is_equivalent_to(&wgs84));
    }

    #[test]
    fn test_unknown_codes() {
        let utm = SpatialReference::create("EPSG:32633").unwrap();
        let utm_lower = SpatialReference::create("epsg:32633").unwrap();
        let wgs84 = SpatialReference::create("EPSG:4326").unwrap();

        assert!(!utm.is_geographic());
        assert!(!utm.is_mercator());
        assert!(utm.is_equivalent_to(&utm_lower));
        assert!(!utm.is_equivalent_to(&wgs84));
    }

    #[test]
    fn test_geographic() {
        assert!(SpatialReference::create("EPSG:4326").unwrap().is_geographic());
        assert!(SpatialReference::create("EPSG:4269").unwrap().is_geographic());
        assert!(!SpatialReference::create("EPSG:3857").unwrap().is_geographic());
    }
}
