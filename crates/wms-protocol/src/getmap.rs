//! WMS 1.1.1 GetMap request construction.

use crate::template::RequestTemplate;
use crate::url::query_separator;

/// Parameters of a GetMap request, minus the bounding box.
#[derive(Debug, Clone)]
pub struct GetMapRequest<'a> {
    pub layers: &'a str,
    /// MIME type sent as FORMAT, e.g. "image/png".
    pub format: &'a str,
    pub styles: &'a str,
    pub srs: &'a str,
    pub width: u32,
    pub height: u32,
}

impl GetMapRequest<'_> {
    /// Template for this request against `prefix`, with the BBOX value as the slot.
    ///
    /// Values are inserted verbatim; the query ends with `BBOX=`.
    pub fn template(&self, prefix: &str) -> RequestTemplate {
        let head = format!(
            "{}{}SERVICE=WMS&VERSION=1.1.1&REQUEST=GetMap&LAYERS={}&FORMAT={}&STYLES={}&SRS={}&WIDTH={}&HEIGHT={}&BBOX=",
            prefix,
            query_separator(prefix),
            self.layers,
            self.format,
            self.styles,
            self.srs,
            self.width,
            self.height,
        );
        RequestTemplate::new(head, "")
    }
}

/// FORMAT value for a GetMap request: the explicit override, else `image/<format>`.
pub fn mime_type(format: &str, wms_format: Option<&str>) -> String {
    match wms_format {
        Some(wms_format) if !wms_format.is_empty() => wms_format.to_string(),
        _ => format!("image/{}", format),
    }
}
