//! Readers turning service URLs into parsed capabilities and TileService documents.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use wms_common::{WmsError, WmsResult};
use wms_protocol::{Capabilities, TileService};

use crate::config::HttpConfig;

/// Fetches and parses a WMS capabilities document.
#[async_trait]
pub trait CapabilitiesReader: Send + Sync {
    /// Read the document at `url`. Any failure is `WmsError::CapabilitiesUnavailable`.
    async fn read_capabilities(&self, url: &str) -> WmsResult<Capabilities>;
}

/// Fetches and parses a JPL TileService document.
#[async_trait]
pub trait TileServiceReader: Send + Sync {
    /// Read the document at `url`. Any failure is `WmsError::TileServiceUnavailable`.
    async fn read_tile_service(&self, url: &str) -> WmsResult<TileService>;
}

/// Reads service documents over HTTP, or from disk for `file://` URLs.
#[derive(Debug, Clone)]
pub struct HttpDocumentReader {
    client: Client,
}

impl HttpDocumentReader {
    pub fn new(config: &HttpConfig) -> WmsResult<Self> {
        Ok(Self {
            client: config.build_client()?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_text(&self, url: &str) -> Result<String, String> {
        if let Some(path) = url.strip_prefix("file://") {
            return tokio::fs::read_to_string(path)
                .await
                .map_err(|e| e.to_string());
        }

        debug!(url = %url, "Requesting service document");

        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        response.text().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl CapabilitiesReader for HttpDocumentReader {
    #[instrument(skip(self))]
    async fn read_capabilities(&self, url: &str) -> WmsResult<Capabilities> {
        let unavailable = |message: String| WmsError::CapabilitiesUnavailable {
            url: url.to_string(),
            message,
        };

        let body = self.fetch_text(url).await.map_err(unavailable)?;
        let capabilities = Capabilities::parse(&body).map_err(|e| unavailable(e.to_string()))?;

        debug!(
            layers = capabilities.layers.len(),
            formats = capabilities.formats.len(),
            "Parsed capabilities"
        );
        Ok(capabilities)
    }
}

#[async_trait]
impl TileServiceReader for HttpDocumentReader {
    #[instrument(skip(self))]
    async fn read_tile_service(&self, url: &str) -> WmsResult<TileService> {
        let unavailable = |message: String| WmsError::TileServiceUnavailable {
            url: url.to_string(),
            message,
        };

        let body = self.fetch_text(url).await.map_err(unavailable)?;
        let service = TileService::parse(&body).map_err(|e| unavailable(e.to_string()))?;

        debug!(groups = service.groups.len(), "Parsed TileService");
        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_capabilities_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(test_utils::fixtures::capabilities::BASIC_GLOBAL.as_bytes())
            .unwrap();

        let reader = HttpDocumentReader::with_client(Client::new());
        let url = format!("file://{}", file.path().display());
        let caps = reader.read_capabilities(&url).await.unwrap();
        assert!(caps.layer_by_name("basic").is_some());
    }

    #[tokio::test]
    async fn test_wrong_document_is_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(test_utils::fixtures::capabilities::BASIC_GLOBAL.as_bytes())
            .unwrap();

        let reader = HttpDocumentReader::with_client(Client::new());
        let url = format!("file://{}", file.path().display());
        let err = reader.read_tile_service(&url).await.unwrap_err();
        assert!(matches!(err, WmsError::TileServiceUnavailable { .. }));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let reader = HttpDocumentReader::with_client(Client::new());
        let err = reader
            .read_capabilities("file:///nonexistent/capabilities.xml")
            .await
            .unwrap_err();
        assert!(matches!(err, WmsError::CapabilitiesUnavailable { .. }));
        assert!(err.is_fatal());
    }
}
