//! Derivation of service request URLs from a base prefix.

/// Query for a WMS 1.1.1 GetCapabilities request.
pub const CAPABILITIES_QUERY: &str = "SERVICE=WMS&VERSION=1.1.1&REQUEST=GetCapabilities";

/// Query probing for a JPL TileService document.
pub const TILE_SERVICE_QUERY: &str = "request=GetTileService";

/// Separator to use when appending a query to `prefix`.
///
/// `&` if the prefix already carries a query string, `?` otherwise.
pub fn query_separator(prefix: &str) -> char {
    if prefix.contains('?') {
        '&'
    } else {
        '?'
    }
}

/// Append `query` to `prefix` with the right separator.
pub fn service_request(prefix: &str, query: &str) -> String {
    format!("{}{}{}", prefix, query_separator(prefix), query)
}

pub fn capabilities_url(prefix: &str) -> String {
    service_request(prefix, CAPABILITIES_QUERY)
}

pub fn tile_service_url(prefix: &str) -> String {
    service_request(prefix, TILE_SERVICE_QUERY)
}
