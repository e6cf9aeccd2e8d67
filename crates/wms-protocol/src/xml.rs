//! Small helpers over quick-xml events shared by the document parsers.

use quick_xml::events::BytesStart;

use wms_common::BoundingBox;

/// Element name without namespace prefix.
pub(crate) fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Unescaped value of an attribute, matched on its local name, case-insensitively.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if attr
            .key
            .local_name()
            .as_ref()
            .eq_ignore_ascii_case(name.as_bytes())
        {
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Bounding box from `minx`/`miny`/`maxx`/`maxy` attributes, if all four parse.
pub(crate) fn bbox_attributes(e: &BytesStart<'_>) -> Result<Option<BoundingBox>, String> {
    let mut corners = [0.0f64; 4];
    for (slot, name) in corners.iter_mut().zip(["minx", "miny", "maxx", "maxy"]) {
        match attribute(e, name)?.and_then(|v| v.trim().parse::<f64>().ok()) {
            Some(value) => *slot = value,
            None => return Ok(None),
        }
    }
    Ok(Some(BoundingBox::new(
        corners[0], corners[1], corners[2], corners[3],
    )))
}
