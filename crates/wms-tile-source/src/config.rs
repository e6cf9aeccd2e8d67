//! Source configuration.
//!
//! A tile source is configured from a flat key/value table, the shape used
//! by map files and plugin options. Recognised keys:
//!
//! | key | meaning |
//! |---|---|
//! | `url` | base service prefix (required) |
//! | `capabilities_url` | capabilities document URL, derived from `url` when absent |
//! | `tileservice_url` | TileService document URL, derived from `url` when absent |
//! | `layers`, `style` | GetMap `LAYERS` / `STYLES` |
//! | `format` | image extension, e.g. `png` |
//! | `wms_format` | verbatim GetMap `FORMAT` value, overriding `image/<format>` |
//! | `srs` | target reference system, `EPSG:4326` when absent |
//! | `tile_size`, `default_tile_size` | tile edge in pixels |
//! | `elevation_unit` | `m` or `ft` |

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_yaml::Value;

use wms_common::{WmsError, WmsResult};

/// Tile edge in pixels when neither `tile_size` nor `default_tile_size` is usable.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Reference system used when the configuration names none.
pub const DEFAULT_SRS: &str = "EPSG:4326";

/// Image extension used when neither the configuration nor the server suggests one.
pub const DEFAULT_FORMAT: &str = "png";

/// Unit of the elevation values served by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationUnit {
    #[default]
    Meters,
    Feet,
}

impl ElevationUnit {
    /// `"ft"` selects feet; anything else, including nothing, is meters.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("ft") => ElevationUnit::Feet,
            _ => ElevationUnit::Meters,
        }
    }

    /// Multiplier converting a sample in this unit to meters.
    pub fn scale_factor(&self) -> f32 {
        match self {
            ElevationUnit::Meters => 1.0,
            ElevationUnit::Feet => 0.3048,
        }
    }
}

/// Immutable configuration of one WMS tile source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceConfig {
    pub url: String,
    pub capabilities_url: Option<String>,
    pub tile_service_url: Option<String>,
    pub layers: String,
    pub style: String,
    pub format: Option<String>,
    pub wms_format: Option<String>,
    pub srs: Option<String>,
    pub tile_size: u32,
    pub elevation_unit: ElevationUnit,
}

impl SourceConfig {
    /// Configuration with only the base URL set.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            capabilities_url: None,
            tile_service_url: None,
            layers: String::new(),
            style: String::new(),
            format: None,
            wms_format: None,
            srs: None,
            tile_size: DEFAULT_TILE_SIZE,
            elevation_unit: ElevationUnit::Meters,
        }
    }

    /// Read the configuration from a key/value table.
    ///
    /// Empty values count as absent. Only `url` is required.
    pub fn from_options(options: &HashMap<String, String>) -> WmsResult<Self> {
        let get = |key: &str| {
            options
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let url = get("url").ok_or_else(|| WmsError::MissingParameter("url".to_string()))?;

        let tile_size = ["tile_size", "default_tile_size"]
            .iter()
            .find_map(|key| get(key).and_then(|v| v.parse::<u32>().ok()).filter(|&v| v > 0))
            .unwrap_or(DEFAULT_TILE_SIZE);

        Ok(Self {
            url,
            capabilities_url: get("capabilities_url"),
            tile_service_url: get("tileservice_url"),
            layers: get("layers").unwrap_or_default(),
            style: get("style").unwrap_or_default(),
            format: get("format"),
            wms_format: get("wms_format"),
            srs: get("srs"),
            tile_size,
            elevation_unit: ElevationUnit::parse(get("elevation_unit").as_deref()),
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("url must not be empty".to_string());
        }

        if self.tile_size == 0 {
            return Err("tile_size must be > 0".to_string());
        }

        Ok(())
    }
}

/// Load a key/value option table from a YAML mapping.
///
/// Scalar values are stringified; nulls are dropped.
pub fn options_from_yaml(yaml: &str) -> WmsResult<HashMap<String, String>> {
    let invalid = |message: String| WmsError::InvalidParameter {
        param: "options".to_string(),
        message,
    };

    let value: Value = serde_yaml::from_str(yaml).map_err(|e| invalid(e.to_string()))?;
    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(HashMap::new()),
        _ => return Err(invalid("expected a mapping of options".to_string())),
    };

    let mut options = HashMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Some(key) = scalar_string(&key) else {
            return Err(invalid(format!("option keys must be scalars, got {:?}", key)));
        };
        if value.is_null() {
            continue;
        }
        let value = scalar_string(&value)
            .ok_or_else(|| invalid(format!("option '{}' must be a scalar", key)))?;
        options.insert(key, value);
    }

    Ok(options)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// HTTP client settings shared by the document readers and the image fetcher.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("wms-tile-source/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn build_client(&self) -> WmsResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| WmsError::InvalidParameter {
                param: "http".to_string(),
                message: e.to_string(),
            })
    }
}
