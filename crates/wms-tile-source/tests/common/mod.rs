//! Mock collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::DynamicImage;

use wms_common::{ProfileRegistry, WmsError, WmsResult};
use wms_protocol::{Capabilities, TileService};
use wms_tile_source::{
    CapabilitiesReader, FetchError, ImageFetcher, ProfileResolver, SourceConfig, TileServiceReader,
};

/// Serves one canned document, or fails like an unreachable server.
#[derive(Default)]
pub struct MockDocuments {
    body: Option<&'static str>,
    requests: Mutex<Vec<String>>,
}

impl MockDocuments {
    pub fn serving(body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            body: Some(body),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, url: &str) -> Result<&'static str, String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.body.ok_or_else(|| "connection refused".to_string())
    }
}

#[async_trait]
impl CapabilitiesReader for MockDocuments {
    async fn read_capabilities(&self, url: &str) -> WmsResult<Capabilities> {
        let unavailable = |message: String| WmsError::CapabilitiesUnavailable {
            url: url.to_string(),
            message,
        };
        let body = self.record(url).map_err(unavailable)?;
        Capabilities::parse(body).map_err(|e| unavailable(e.to_string()))
    }
}

#[async_trait]
impl TileServiceReader for MockDocuments {
    async fn read_tile_service(&self, url: &str) -> WmsResult<TileService> {
        let unavailable = |message: String| WmsError::TileServiceUnavailable {
            url: url.to_string(),
            message,
        };
        let body = self.record(url).map_err(unavailable)?;
        TileService::parse(body).map_err(|e| unavailable(e.to_string()))
    }
}

/// Returns images keyed by request URI; anything else is not found.
#[derive(Default)]
pub struct MockFetcher {
    images: HashMap<String, DynamicImage>,
    fallback: Option<DynamicImage>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    /// Answers every request with `image`.
    pub fn always(image: DynamicImage) -> Arc<Self> {
        Arc::new(Self {
            fallback: Some(image),
            ..Default::default()
        })
    }

    /// Answers only the given URIs.
    pub fn with_images(images: HashMap<String, DynamicImage>) -> Arc<Self> {
        Arc::new(Self {
            images,
            ..Default::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for MockFetcher {
    async fn fetch_image(&self, uri: &str) -> Result<DynamicImage, FetchError> {
        self.requests.lock().unwrap().push(uri.to_string());
        self.images
            .get(uri)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| FetchError::NotFound(uri.to_string()))
    }
}

/// Resolver over mock documents with the standard registry.
pub fn resolver(
    capabilities: &Arc<MockDocuments>,
    tile_service: &Arc<MockDocuments>,
) -> ProfileResolver {
    ProfileResolver::new(
        capabilities.clone(),
        tile_service.clone(),
        ProfileRegistry::new(),
    )
}

/// Configuration for `layers` on the `http://x/wms` test server.
pub fn config(layers: &str) -> SourceConfig {
    SourceConfig {
        layers: layers.to_string(),
        ..SourceConfig::new(test_utils::urls::PLAIN)
    }
}

/// Value of a query parameter, matched case-insensitively.
pub fn query_param<'a>(uri: &'a str, name: &str) -> Option<&'a str> {
    let query = uri.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        key.eq_ignore_ascii_case(name).then_some(value)
    })
}
