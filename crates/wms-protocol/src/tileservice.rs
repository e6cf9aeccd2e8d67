//! JPL TileService ("WMS_Tile_Service") documents.
//!
//! A TileService lists pre-computed GetMap requests ("tile patterns") that
//! the server answers from a tile cache. Each pattern fixes layers, style,
//! format, SRS and image size, and carries the bbox of the top-left tile of
//! one resolution level.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use tracing::warn;

use wms_common::{BoundingBox, CrsCode, Profile};

use crate::template::RequestTemplate;
use crate::xml::{bbox_attributes, element_name};

#[derive(Debug, thiserror::Error)]
pub enum TileServiceError {
    #[error("XML parsing error at position {position}: {message}")]
    Xml { position: usize, message: String },

    #[error("Not a TileService document (root element '{0}')")]
    NotTileService(String),

    #[error("Invalid tile pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// One pre-tiled request pattern.
#[derive(Debug, Clone, Serialize)]
pub struct TilePattern {
    pub pattern: String,
    pub layers: String,
    pub styles: String,
    pub srs: String,
    /// Format extension, without the `image/` prefix.
    pub format: String,
    pub image_width: u32,
    pub image_height: u32,
    /// Bounds of the top-left tile at this pattern's resolution.
    pub top_left: BoundingBox,
    #[serde(skip)]
    prototype: RequestTemplate,
}

impl TilePattern {
    /// Decompose a pattern such as
    /// `request=GetMap&layers=global_mosaic&srs=EPSG:4326&format=image/jpeg&styles=visual&width=512&height=512&bbox=-180,-166,76,90`.
    ///
    /// Keys are case-insensitive. The prototype keeps the pattern text and
    /// replaces the bbox value with the coordinate slot.
    pub fn parse(pattern: &str) -> Result<Self, TileServiceError> {
        let pattern = pattern.trim();
        let invalid = |message: &str| TileServiceError::InvalidPattern {
            pattern: pattern.to_string(),
            message: message.to_string(),
        };

        let query = pattern.split_once('?').map(|(_, q)| q).unwrap_or(pattern);
        let mut layers = String::new();
        let mut styles = String::new();
        let mut srs = String::new();
        let mut format = String::new();
        let mut image_width = 0;
        let mut image_height = 0;
        let mut top_left = None;

        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key.trim().to_ascii_lowercase().as_str() {
                "layers" => layers = value.to_string(),
                "styles" | "style" => styles = value.to_string(),
                "srs" | "crs" => srs = value.to_string(),
                "format" => {
                    format = match value.get(..6) {
                        Some(kind) if kind.eq_ignore_ascii_case("image/") => &value[6..],
                        _ => value,
                    }
                    .to_string()
                }
                "width" => image_width = value.trim().parse().unwrap_or(0),
                "height" => image_height = value.trim().parse().unwrap_or(0),
                "bbox" => {
                    top_left = Some(
                        BoundingBox::from_wms_string(value)
                            .map_err(|e| invalid(&e.to_string()))?,
                    )
                }
                _ => {}
            }
        }

        let top_left = top_left.ok_or_else(|| invalid("missing bbox"))?;
        if !top_left.is_valid() {
            return Err(invalid("empty top-left tile"));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            layers,
            styles,
            srs,
            format,
            image_width,
            image_height,
            top_left,
            prototype: prototype(pattern).ok_or_else(|| invalid("missing bbox"))?,
        })
    }

    /// Template rendering this pattern for any tile.
    pub fn prototype(&self) -> &RequestTemplate {
        &self.prototype
    }

    /// Width of one tile in SRS units.
    pub fn tile_width(&self) -> f64 {
        self.top_left.width()
    }

    /// Height of one tile in SRS units.
    pub fn tile_height(&self) -> f64 {
        self.top_left.height()
    }

    /// Case-insensitive match on layers/format/style/srs, exact match on size.
    pub fn matches(
        &self,
        layers: &str,
        format: &str,
        style: &str,
        srs: &str,
        image_width: u32,
        image_height: u32,
    ) -> bool {
        self.layers.eq_ignore_ascii_case(layers)
            && self.format.eq_ignore_ascii_case(format)
            && self.styles.eq_ignore_ascii_case(style)
            && self.srs.eq_ignore_ascii_case(srs)
            && self.image_width == image_width
            && self.image_height == image_height
    }
}

fn prototype(pattern: &str) -> Option<RequestTemplate> {
    let lower = pattern.to_ascii_lowercase();
    let start = lower
        .match_indices("bbox=")
        .map(|(i, _)| i)
        .find(|&i| i == 0 || matches!(lower.as_bytes()[i - 1], b'&' | b'?'))?
        + "bbox=".len();
    let end = pattern[start..]
        .find('&')
        .map(|i| start + i)
        .unwrap_or(pattern.len());
    Some(RequestTemplate::new(&pattern[..start], &pattern[end..]))
}

/// A group of patterns for one dataset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TiledGroup {
    pub name: Option<String>,
    pub title: Option<String>,
    pub extent: Option<BoundingBox>,
    pub patterns: Vec<TilePattern>,
}

/// A parsed TileService document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TileService {
    pub name: Option<String>,
    pub title: Option<String>,
    /// Extent covered by the service's data, from the `TiledPatterns` element.
    pub data_extent: Option<BoundingBox>,
    pub groups: Vec<TiledGroup>,
}

impl TileService {
    /// Parse a `WMS_Tile_Service` document. Patterns that cannot be decomposed are skipped.
    pub fn parse(xml: &str) -> Result<Self, TileServiceError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut service = TileService::default();
        let mut path: Vec<String> = Vec::new();
        let mut group_stack: Vec<TiledGroup> = Vec::new();
        let mut text = String::new();
        let mut saw_root = false;

        loop {
            let event = reader.read_event().map_err(|e| TileServiceError::Xml {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;
            let xml_error = |message: String| TileServiceError::Xml {
                position: reader.buffer_position(),
                message,
            };

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let name = element_name(e);
                    let is_empty = matches!(event, Event::Empty(_));
                    if !saw_root {
                        saw_root = true;
                        if name != "WMS_Tile_Service" {
                            return Err(TileServiceError::NotTileService(name));
                        }
                    }

                    if name == "LatLonBoundingBox" {
                        let bbox = bbox_attributes(e).map_err(xml_error)?;
                        match group_stack.last_mut() {
                            Some(group) => group.extent = bbox.or(group.extent),
                            None if path.last().map(String::as_str) == Some("TiledPatterns") => {
                                service.data_extent = bbox
                            }
                            None => {}
                        }
                    }

                    if !is_empty {
                        if name == "TiledGroup" {
                            group_stack.push(TiledGroup::default());
                        }
                        path.push(name);
                        text.clear();
                    }
                }
                Event::Text(t) => {
                    let value = t.unescape().map_err(|e| xml_error(e.to_string()))?;
                    text.push_str(&value);
                }
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
                Event::End(_) => {
                    let Some(name) = path.pop() else { continue };
                    let parent = path.last().map(String::as_str);
                    let value = text.trim().to_string();
                    text.clear();

                    match (name.as_str(), parent) {
                        ("TiledGroup", _) => {
                            if let Some(group) = group_stack.pop() {
                                service.groups.push(group);
                            }
                        }
                        ("Name", Some("TiledGroup")) => {
                            if let Some(group) = group_stack.last_mut() {
                                group.name = Some(value);
                            }
                        }
                        ("Title", Some("TiledGroup")) => {
                            if let Some(group) = group_stack.last_mut() {
                                group.title = Some(value);
                            }
                        }
                        ("Name", Some("Service")) => service.name = Some(value),
                        ("Title", Some("Service")) => service.title = Some(value),
                        ("TilePattern", _) => {
                            if let Some(group) = group_stack.last_mut() {
                                for raw in value.split_whitespace() {
                                    match TilePattern::parse(raw) {
                                        Ok(pattern) => group.patterns.push(pattern),
                                        Err(e) => warn!(error = %e, "Skipping tile pattern"),
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(TileServiceError::NotTileService(String::new()));
        }

        Ok(service)
    }

    /// All patterns, across groups, matching the requested access parameters.
    pub fn matching_patterns(
        &self,
        layers: &str,
        format: &str,
        style: &str,
        srs: &str,
        image_width: u32,
        image_height: u32,
    ) -> Vec<TilePattern> {
        self.groups
            .iter()
            .flat_map(|group| group.patterns.iter())
            .filter(|p| p.matches(layers, format, style, srs, image_width, image_height))
            .cloned()
            .collect()
    }

    /// Build the profile covering the data extent with the coarsest pattern's tiles.
    ///
    /// The profile starts at the top-left tile of the coarsest pattern and
    /// spans as many whole tiles as needed to cover the data extent, which
    /// defaults to the whole earth when the document does not declare one.
    pub fn create_profile(&self, patterns: &[TilePattern]) -> Option<Profile> {
        let first = patterns.first()?;

        let mut coarsest = first;
        for pattern in patterns {
            if pattern.tile_width() > coarsest.tile_width()
                && pattern.tile_height() > coarsest.tile_height()
            {
                coarsest = pattern;
            }
        }

        let data = self
            .data_extent
            .unwrap_or_else(|| CrsCode::Epsg4326.valid_bounds());
        let top_left = coarsest.top_left;
        let width = coarsest.tile_width();
        let height = coarsest.tile_height();

        let tiles_wide = ((data.max_x - top_left.min_x) / width).ceil().max(1.0) as u32;
        let tiles_high = ((top_left.max_y - data.min_y) / height).ceil().max(1.0) as u32;

        let extent = BoundingBox::new(
            top_left.min_x,
            top_left.max_y - tiles_high as f64 * height,
            top_left.min_x + tiles_wide as f64 * width,
            top_left.max_y,
        );

        match Profile::with_tile_counts(&first.srs, extent, tiles_wide, tiles_high) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "TileService patterns do not describe a usable profile");
                None
            }
        }
    }
}
