//! Image downloads for new emoji
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Enforce the size bound while streaming the body

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;

use crate::features::emoji::platform::{FetchedImage, ImageFetcher};

/// Default timeout for image downloads in seconds
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 15;

/// Default size bound for image downloads (1 MiB)
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 1024 * 1024;

pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// reqwest-backed [`ImageFetcher`] with a timeout and a size bound
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
    max_bytes: u64,
}

impl HttpImageFetcher {
    pub fn new(timeout_secs: u64, max_bytes: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("EmojiLookupBot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            timeout_secs,
            max_bytes,
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        let mut response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                anyhow!("Request timed out after {} seconds", self.timeout_secs)
            } else if e.is_connect() {
                anyhow!("Could not connect to the server")
            } else {
                anyhow!("HTTP request failed: {e}")
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if !response.status().is_success() {
            debug!("Image download from {url} returned HTTP {status}");
            return Ok(FetchedImage {
                status,
                content_type,
                bytes: Vec::new(),
            });
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_bytes {
                return Err(too_large(content_length, self.max_bytes));
            }
        }

        // Content-Length may be missing or wrong, so the bound is enforced while reading
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            append_bounded(&mut bytes, &chunk, self.max_bytes)?;
        }
        let size = bytes.len() as u64;
        if size == 0 {
            warn!("Downloaded image from {url} is empty");
        }
        debug!("Downloaded {} from {url}", format_file_size(size));

        Ok(FetchedImage {
            status,
            content_type,
            bytes,
        })
    }
}

/// Append `chunk` unless the total would pass `limit`
fn append_bounded(buffer: &mut Vec<u8>, chunk: &[u8], limit: u64) -> Result<()> {
    let total = (buffer.len() + chunk.len()) as u64;
    if total > limit {
        return Err(too_large(total, limit));
    }
    buffer.extend_from_slice(chunk);
    Ok(())
}

fn too_large(size: u64, limit: u64) -> anyhow::Error {
    anyhow!(
        "Image is too large ({}, limit {})",
        format_file_size(size),
        format_file_size(limit)
    )
}
