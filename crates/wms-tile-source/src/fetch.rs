//! Per-tile image fetching.

use async_trait::async_trait;
use image::DynamicImage;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, instrument};

use wms_common::WmsResult;

use crate::config::HttpConfig;

/// Longest service exception text kept in an error.
const MAX_EXCEPTION_LEN: usize = 512;

/// Errors fetching one tile image.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("no image at {0}")]
    NotFound(String),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned a service exception: {message}")]
    ServiceException { url: String, message: String },

    #[error("failed to decode image from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Fetches and decodes the image behind a request URI.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, uri: &str) -> Result<DynamicImage, FetchError>;
}

/// Image fetcher over HTTP.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(config: &HttpConfig) -> WmsResult<Self> {
        Ok(Self {
            client: config.build_client()?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    #[instrument(skip(self))]
    async fn fetch_image(&self, uri: &str) -> Result<DynamicImage, FetchError> {
        let network = |e: reqwest::Error| FetchError::Network {
            url: uri.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(uri).send().await.map_err(network)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(uri.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: uri.to_string(),
                status: status.as_u16(),
            });
        }

        // WMS servers report request errors as XML with a 200 status
        let is_xml = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("xml"))
            .unwrap_or(false);
        if is_xml {
            let body = response.text().await.map_err(network)?;
            return Err(FetchError::ServiceException {
                url: uri.to_string(),
                message: truncate(body.trim(), MAX_EXCEPTION_LEN).to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(network)?;
        debug!(size = bytes.len(), "Fetched tile image");

        image::load_from_memory(&bytes).map_err(|e| FetchError::Decode {
            url: uri.to_string(),
            message: e.to_string(),
        })
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("aé", 2), "a");
    }

    #[test]
    fn test_error_messages() {
        let err = FetchError::Status {
            url: "http://x/wms?BBOX=0,0,1,1".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "http://x/wms?BBOX=0,0,1,1 returned HTTP 503");
    }
}
