//! Error types shared by the tile-source crates.

use thiserror::Error;

use crate::bbox::BboxParseError;

/// Result type alias using WmsError.
pub type WmsResult<T> = Result<T, WmsError>;

/// Primary error type for configuring and resolving a WMS tile source.
#[derive(Debug, Error)]
pub enum WmsError {
    // === Configuration Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    // === Service Document Errors ===
    #[error("Unable to read WMS capabilities from {url}: {message}")]
    CapabilitiesUnavailable { url: String, message: String },

    #[error("Unable to read TileService document from {url}: {message}")]
    TileServiceUnavailable { url: String, message: String },

    // === Resolution Errors ===
    #[error("No profile could be derived for layers '{layers}' in {srs}")]
    NoProfile { layers: String, srs: String },
}

impl WmsError {
    /// True for failures that make the source unusable.
    ///
    /// A missing TileService document is expected for plain WMS servers.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WmsError::TileServiceUnavailable { .. })
    }
}

impl From<BboxParseError> for WmsError {
    fn from(err: BboxParseError) -> Self {
        WmsError::InvalidBbox(err.to_string())
    }
}
