//! WMS GetCapabilities document parsing (1.1.1 and 1.3.0).
//!
//! Only the parts a tile source needs are kept: the layer tree with names,
//! reference systems and geographic extents, and the GetMap output formats.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use wms_common::BoundingBox;

use crate::xml::{attribute, bbox_attributes, element_name};

/// Image extensions the imagery pipeline can decode, in no particular order.
pub const DECODABLE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "gif", "tiff", "tif", "bmp", "webp"];

#[derive(Debug, thiserror::Error)]
pub enum CapabilitiesError {
    #[error("XML parsing error at position {position}: {message}")]
    Xml { position: usize, message: String },

    #[error("Not a WMS capabilities document (root element '{0}')")]
    NotCapabilities(String),

    #[error("Empty capabilities document")]
    Empty,
}

/// A layer of the capabilities layer tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapabilitiesLayer {
    pub name: Option<String>,
    pub title: Option<String>,
    pub srs: Vec<String>,
    /// Geographic extent, inherited from the parent layer when not declared.
    pub extent: Option<BoundingBox>,
    pub layers: Vec<CapabilitiesLayer>,
}

impl CapabilitiesLayer {
    fn find(&self, name: &str) -> Option<&CapabilitiesLayer> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.layers.iter().find_map(|child| child.find(name))
    }
}

/// A parsed capabilities document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Capabilities {
    pub version: Option<String>,
    pub title: Option<String>,
    /// GetMap output formats, in document order.
    pub formats: Vec<String>,
    pub layers: Vec<CapabilitiesLayer>,
}

impl Capabilities {
    /// Parse a WMS capabilities XML document.
    pub fn parse(xml: &str) -> Result<Self, CapabilitiesError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut caps = Capabilities::default();
        let mut path: Vec<String> = Vec::new();
        let mut layer_stack: Vec<CapabilitiesLayer> = Vec::new();
        let mut geographic = GeographicBox::default();
        let mut text = String::new();
        let mut saw_root = false;

        loop {
            let event = reader.read_event().map_err(|e| CapabilitiesError::Xml {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;
            let xml_error = |message: String| CapabilitiesError::Xml {
                position: reader.buffer_position(),
                message,
            };

            match event {
                Event::Start(e) => {
                    let name = element_name(&e);
                    if !saw_root {
                        saw_root = true;
                        check_root(&name)?;
                        caps.version = attribute(&e, "version").map_err(xml_error)?;
                    }
                    match name.as_str() {
                        "Layer" => {
                            let inherited = layer_stack.last().and_then(|l| l.extent);
                            layer_stack.push(CapabilitiesLayer {
                                extent: inherited,
                                ..Default::default()
                            });
                        }
                        "EX_GeographicBoundingBox" => geographic = GeographicBox::default(),
                        _ => apply_bbox(&e, &name, &mut layer_stack).map_err(xml_error)?,
                    }
                    path.push(name);
                    text.clear();
                }
                Event::Empty(e) => {
                    let name = element_name(&e);
                    if !saw_root {
                        saw_root = true;
                        check_root(&name)?;
                        continue;
                    }
                    apply_bbox(&e, &name, &mut layer_stack).map_err(xml_error)?;
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
                        ("Layer", _) => {
                            if let Some(layer) = layer_stack.pop() {
                                match layer_stack.last_mut() {
                                    Some(parent_layer) => parent_layer.layers.push(layer),
                                    None => caps.layers.push(layer),
                                }
                            }
                        }
                        ("Name", Some("Layer")) => {
                            if let Some(layer) = layer_stack.last_mut() {
                                layer.name = Some(value);
                            }
                        }
                        ("Title", Some("Layer")) => {
                            if let Some(layer) = layer_stack.last_mut() {
                                layer.title = Some(value);
                            }
                        }
                        ("Title", Some("Service")) => caps.title = Some(value),
                        ("SRS" | "CRS", Some("Layer")) => {
                            if let Some(layer) = layer_stack.last_mut() {
                                layer
                                    .srs
                                    .extend(value.split_whitespace().map(str::to_string));
                            }
                        }
                        ("Format", Some("GetMap")) => caps.formats.push(value),
                        ("westBoundLongitude", _) => geographic.west = value.parse().ok(),
                        ("eastBoundLongitude", _) => geographic.east = value.parse().ok(),
                        ("southBoundLatitude", _) => geographic.south = value.parse().ok(),
                        ("northBoundLatitude", _) => geographic.north = value.parse().ok(),
                        ("EX_GeographicBoundingBox", _) => {
                            if let (Some(bbox), Some(layer)) =
                                (geographic.to_bbox(), layer_stack.last_mut())
                            {
                                layer.extent = Some(bbox);
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
            return Err(CapabilitiesError::Empty);
        }

        Ok(caps)
    }

    /// Find a named layer anywhere in the layer tree.
    ///
    /// The name is matched as one string; a comma-separated list is not split.
    pub fn layer_by_name(&self, name: &str) -> Option<&CapabilitiesLayer> {
        self.layers.iter().find_map(|layer| layer.find(name))
    }

    /// Extension of the first `image/*` GetMap format the imagery pipeline can decode.
    pub fn suggest_extension(&self) -> Option<String> {
        self.formats.iter().find_map(|format| {
            let format = format.split(';').next().unwrap_or_default().trim();
            let (kind, ext) = format.split_once('/')?;
            let ext = ext.to_ascii_lowercase();
            (kind.eq_ignore_ascii_case("image") && DECODABLE_EXTENSIONS.contains(&ext.as_str()))
                .then_some(ext)
        })
    }
}

fn check_root(name: &str) -> Result<(), CapabilitiesError> {
    match name {
        "WMT_MS_Capabilities" | "WMS_Capabilities" => Ok(()),
        other => Err(CapabilitiesError::NotCapabilities(other.to_string())),
    }
}

fn apply_bbox(
    e: &BytesStart<'_>,
    name: &str,
    layer_stack: &mut [CapabilitiesLayer],
) -> Result<(), String> {
    if name != "LatLonBoundingBox" {
        return Ok(());
    }
    if let (Some(bbox), Some(layer)) = (bbox_attributes(e)?, layer_stack.last_mut()) {
        layer.extent = Some(bbox);
    }
    Ok(())
}

/// WMS 1.3.0 geographic bounding box, filled element by element.
#[derive(Debug, Default)]
struct GeographicBox {
    west: Option<f64>,
    east: Option<f64>,
    south: Option<f64>,
    north: Option<f64>,
}

impl GeographicBox {
    fn to_bbox(&self) -> Option<BoundingBox> {
        Some(BoundingBox::new(
            self.west?,
            self.south?,
            self.east?,
            self.north?,
        ))
    }
}
