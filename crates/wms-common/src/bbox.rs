//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic or projected bounding box.
///
/// For geographic references (EPSG:4326), coordinates are in degrees.
/// For projected references (EPSG:3857, etc.), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a WMS BBOX parameter string: "minx,miny,maxx,maxy"
    pub fn from_wms_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let number = |part: &str| {
            part.parse::<f64>()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))
        };

        Ok(Self {
            min_x: number(parts[0])?,
            min_y: number(parts[1])?,
            max_x: number(parts[2])?,
            max_y: number(parts[3])?,
        })
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when all corners are finite and the box has a positive area.
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.max_x > self.min_x
            && self.max_y > self.min_y
    }

    /// Exact comparison of the four bounds, bit for bit.
    ///
    /// Unlike `==` this distinguishes `0.0` from `-0.0`, so it only holds for
    /// boxes that were produced from identical values.
    pub fn bitwise_eq(&self, other: &BoundingBox) -> bool {
        self.min_x.to_bits() == other.min_x.to_bits()
            && self.min_y.to_bits() == other.min_y.to_bits()
            && self.max_x.to_bits() == other.max_x.to_bits()
            && self.max_y.to_bits() == other.max_y.to_bits()
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wms_bbox() {
        let bbox = BoundingBox::from_wms_string("-125.0,24.0,-66.0,50.0").unwrap();
        assert_eq!(bbox.min_x, -125.0);
        assert_eq!(bbox.min_y, 24.0);
        assert_eq!(bbox.max_x, -66.0);
        assert_eq!(bbox.max_y, 50.0);
    }

    #[test]
    fn test_bitwise_eq() {
        let a = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
        let b = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
        let c = BoundingBox::new(-180.0, -90.0, 180.0, 89.999999);

        assert!(a.bitwise_eq(&b));
        assert!(!a.bitwise_eq(&c));

        let zero = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let neg_zero = BoundingBox::new(-0.0, 0.0, 1.0, 1.0);
        assert_eq!(zero, neg_zero);
        assert!(!zero.bitwise_eq(&neg_zero));
    }

    #[test]
    fn test_is_valid() {
        assert!(BoundingBox::new(0.0, 0.0, 10.0, 10.0).is_valid());
        assert!(!BoundingBox::new(10.0, 0.0, 5.0, 10.0).is_valid());
        assert!(!BoundingBox::new(0.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_valid());
    }
}
