//! Request templates with four bounding-box slots.

use std::fmt;

use wms_common::{BoundingBox, TileKey};

/// A request URL with a `minx,miny,maxx,maxy` slot between a fixed head and tail.
///
/// Built once per source and rendered for every tile; coordinates are written
/// fixed-point with six decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    head: String,
    tail: String,
}

impl RequestTemplate {
    pub fn new(head: impl Into<String>, tail: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            tail: tail.into(),
        }
    }

    /// Text before the coordinate slot.
    pub fn head(&self) -> &str {
        &self.head
    }

    /// Text after the coordinate slot.
    pub fn tail(&self) -> &str {
        &self.tail
    }

    /// Prepend text to the head.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.head.insert_str(0, prefix);
        self
    }

    /// Append text to the tail.
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.tail.push_str(suffix);
        self
    }

    /// Fill the slot with `bbox`, in minx,miny,maxx,maxy order.
    pub fn render(&self, bbox: &BoundingBox) -> String {
        format!(
            "{}{:.6},{:.6},{:.6},{:.6}{}",
            self.head, bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y, self.tail
        )
    }

    /// Fill the slot with a tile's extent.
    pub fn render_tile(&self, key: &TileKey) -> String {
        self.render(&key.extent())
    }
}

impl fmt::Display for RequestTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{minx}},{{miny}},{{maxx}},{{maxy}}{}", self.head, self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_order_and_precision() {
        let template = RequestTemplate::new("http://x/wms?BBOX=", "&.png");
        let uri = template.render(&BoundingBox::new(-180.0, -90.0, 0.5, 90.125));
        assert_eq!(
            uri,
            "http://x/wms?BBOX=-180.000000,-90.000000,0.500000,90.125000&.png"
        );
    }

    #[test]
    fn test_render_keeps_tail_after_slot() {
        let template = RequestTemplate::new("q?bbox=", "&width=512");
        assert_eq!(
            template.render(&BoundingBox::new(1.0, 2.0, 3.0, 4.0)),
            "q?bbox=1.000000,2.000000,3.000000,4.000000&width=512"
        );
    }

    #[test]
    fn test_prefix_suffix_and_display() {
        let template = RequestTemplate::new("request=GetMap&bbox=", "")
            .with_prefix("http://x/wms?")
            .with_suffix("&.jpg");
        assert_eq!(template.head(), "http://x/wms?request=GetMap&bbox=");
        assert_eq!(template.tail(), "&.jpg");
        assert_eq!(
            template.to_string(),
            "http://x/wms?request=GetMap&bbox={minx},{miny},{maxx},{maxy}&.jpg"
        );
    }

    #[test]
    fn test_large_values_are_not_truncated() {
        let template = RequestTemplate::new("", "");
        let max = 20037508.342789244;
        let uri = template.render(&BoundingBox::new(-max, -max, max, max));
        assert_eq!(
            uri,
            "-20037508.342789,-20037508.342789,20037508.342789,20037508.342789"
        );
    }
}
