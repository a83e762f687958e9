//! Feed download and gzip decompression.
//!
//! Retries and backoff are left to the caller; a failed download fails the
//! run. A proxy is used only when one is configured explicitly, so
//! `HTTP_PROXY`-style environment variables have no effect.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::error::{DecompressError, Error, FetchError};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Transport settings for [`fetch`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Duration::from_secs(300),
        }
    }
}

/// Download `url` and return the response body.
///
/// Any non-2xx status is a [`FetchError::Status`].
pub async fn fetch(url: &str, options: &FetchOptions) -> Result<Vec<u8>, FetchError> {
    let mut builder = reqwest::Client::builder()
        .timeout(options.timeout)
        .user_agent(concat!("cpedict/", env!("CARGO_PKG_VERSION")));

    match options.proxy.as_deref().filter(|p| !p.is_empty()) {
        Some(proxy) => {
            let proxy_cfg = reqwest::Proxy::all(proxy).map_err(|source| FetchError::Proxy {
                proxy: proxy.to_string(),
                source,
            })?;
            debug!(proxy, "using HTTP proxy");
            builder = builder.proxy(proxy_cfg);
        }
        None => builder = builder.no_proxy(),
    }

    let client = builder.build().map_err(FetchError::Client)?;
    let transport = |source| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    info!(url, "downloading feed");
    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(transport)?;
    info!(url, bytes = body.len(), "feed downloaded");
    Ok(body.to_vec())
}

pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Inflate a gzip payload.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, DecompressError> {
    if !is_gzip(bytes) {
        return Err(DecompressError::NotGzip);
    }
    let mut out = Vec::with_capacity(bytes.len() * 8);
    GzDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(DecompressError::Corrupt)?;
    debug!(compressed = bytes.len(), inflated = out.len(), "feed decompressed");
    Ok(out)
}

/// Read a feed from disk, inflating it when it is gzip-compressed.
pub async fn read_feed_file(path: &Path) -> Result<Vec<u8>, Error> {
    let bytes = tokio::fs::read(path).await.map_err(|source| FetchError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "read feed file");
    if is_gzip(&bytes) {
        Ok(decompress(&bytes)?)
    } else {
        Ok(bytes)
    }
}
