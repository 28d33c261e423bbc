//! Streaming artifact download
//!
//! The response body is written to disk in fixed-size chunks while a SHA256
//! digest is computed alongside. After every chunk the cancellation predicate
//! is checked and the progress callback invoked. A cancelled download leaves
//! its partial file in place; the caller owns cleanup.

use futures_util::StreamExt;
use reqwest::header::CONTENT_LENGTH;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use xenia_manager_core::types::NetworkConfig;

use crate::error::{Error, FsContext, Result};
use crate::progress::DownloadProgress;

/// Result of a download operation
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// Path to the downloaded file
    pub file_path: PathBuf,

    /// Bytes written to the file
    pub bytes_written: u64,

    /// SHA256 checksum of the downloaded file, lowercase hex
    pub checksum: String,
}

/// Artifact downloader
pub struct Downloader {
    client: reqwest::Client,
    chunk_size: usize,
}

impl Downloader {
    /// Create a downloader with connect and read timeouts from configuration
    pub fn from_config(network: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&network.user_agent)
            .connect_timeout(Duration::from_secs(network.connect_timeout_secs))
            .read_timeout(Duration::from_secs(network.read_timeout_secs))
            .build()
            .map_err(|e| Error::download("client", e))?;

        Ok(Self {
            client,
            chunk_size: network.download_chunk_size.max(1),
        })
    }

    /// Override the chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Stream `url` to `dest`
    ///
    /// Fails with [`Error::Download`] on a non-success status, a transport
    /// failure or a body shorter than its announced length, and with
    /// [`Error::Cancelled`] once `is_cancelled` returns true.
    pub async fn download<P, C>(
        &self,
        url: &str,
        dest: &Path,
        on_progress: P,
        is_cancelled: C,
    ) -> Result<DownloadResult>
    where
        P: Fn(&DownloadProgress),
        C: Fn() -> bool,
    {
        debug!("Downloading {} -> {:?}", url, dest);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::download(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::download(url, format!("server returned {}", status)));
        }

        let total = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .fs_context("create download directory", parent)?;
        }
        let mut file = File::create(dest)
            .await
            .fs_context("create download file", dest)?;

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| Error::download(url, e))?;

            for piece in chunk.chunks(self.chunk_size) {
                file.write_all(piece)
                    .await
                    .fs_context("write download file", dest)?;
                hasher.update(piece);
                downloaded += piece.len() as u64;

                if is_cancelled() {
                    file.flush().await.fs_context("flush download file", dest)?;
                    info!("Download of {} cancelled after {} bytes", url, downloaded);
                    return Err(Error::Cancelled { bytes: downloaded });
                }

                on_progress(&DownloadProgress::new(downloaded, total));
            }
        }

        file.flush().await.fs_context("flush download file", dest)?;

        if let Some(expected) = total {
            if downloaded != expected {
                return Err(Error::download(
                    url,
                    format!("body ended after {} of {} bytes", downloaded, expected),
                ));
            }
        }

        info!("Downloaded {} ({})", url, human_readable_size(downloaded));

        Ok(DownloadResult {
            file_path: dest.to_path_buf(),
            bytes_written: downloaded,
            checksum: format!("{:x}", hasher.finalize()),
        })
    }
}

/// Compare a checksum against a feed digest such as `sha256:<hex>`
///
/// Digests for other algorithms are not checked and count as a match.
pub fn digest_matches(digest: &str, checksum: &str) -> bool {
    match digest.split_once(':') {
        Some((algorithm, hex)) if algorithm.eq_ignore_ascii_case("sha256") => {
            hex.eq_ignore_ascii_case(checksum)
        }
        Some(_) => true,
        None => digest.eq_ignore_ascii_case(checksum),
    }
}

/// Convert bytes to human-readable size
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_readable_size(0), "0.00 B");
        assert_eq!(human_readable_size(1023), "1023.00 B");
        assert_eq!(human_readable_size(1024), "1.00 KB");
        assert_eq!(human_readable_size(1024 * 1024), "1.00 MB");
    }

    #[test]
    fn test_digest_matches() {
        let hex = "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f";
        assert!(digest_matches(&format!("sha256:{}", hex), hex));
        assert!(digest_matches(&format!("SHA256:{}", hex.to_uppercase()), hex));
        assert!(!digest_matches("sha256:0000", hex));
        assert!(digest_matches("md5:abc", hex));
        assert!(digest_matches(hex, hex));
    }

    #[test]
    fn test_chunk_size_never_zero() {
        let downloader = Downloader::from_config(&NetworkConfig::default())
            .unwrap()
            .with_chunk_size(0);
        assert_eq!(downloader.chunk_size(), 1);
    }
}
