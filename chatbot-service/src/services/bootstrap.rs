//! One-time setup of the linguistic resource bundle the classifier stack expects.
//!
//! [`ResourceBootstrap::ensure_ready`] is safe to call repeatedly: once the
//! bundle is on disk it returns [`BootstrapOutcome::AlreadyPresent`] without
//! touching the network.

use crate::config::ResourceConfig;
use reqwest::Client;
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyPresent,
    Downloaded { bytes: usize },
    /// No source configured.
    Skipped,
}

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to download resource bundle from {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write resource bundle to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<BootstrapError> for AppError {
    fn from(err: BootstrapError) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

pub struct ResourceBootstrap {
    client: Client,
    source_url: Option<String>,
    target: PathBuf,
}

impl ResourceBootstrap {
    pub fn new(config: &ResourceConfig) -> Self {
        Self {
            client: Client::new(),
            source_url: config.bundle_url.clone(),
            target: config.bundle_path(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub async fn ensure_ready(&self) -> Result<BootstrapOutcome, BootstrapError> {
        if fs::try_exists(&self.target).await.unwrap_or(false) {
            tracing::debug!(path = %self.target.display(), "Resource bundle already present");
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        let Some(url) = &self.source_url else {
            tracing::info!("No resource bundle URL configured, skipping download");
            return Ok(BootstrapOutcome::Skipped);
        };

        let download_err = |source: reqwest::Error| BootstrapError::Download {
            url: url.clone(),
            source,
        };
        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(download_err)?
            .bytes()
            .await
            .map_err(download_err)?;

        self.write_atomically(&bytes).await?;

        tracing::info!(
            url = %url,
            path = %self.target.display(),
            bytes = bytes.len(),
            "Downloaded resource bundle"
        );

        Ok(BootstrapOutcome::Downloaded { bytes: bytes.len() })
    }

    /// Stage into a sibling `.part` file and rename; the target only ever
    /// holds a complete bundle.
    async fn write_atomically(&self, bytes: &[u8]) -> Result<(), BootstrapError> {
        let io_err = |source: std::io::Error| BootstrapError::Io {
            path: self.target.clone(),
            source,
        };

        if let Some(parent) = self.target.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let mut staging = self.target.clone().into_os_string();
        staging.push(".part");
        let staging = PathBuf::from(staging);

        fs::write(&staging, bytes).await.map_err(io_err)?;
        fs::rename(&staging, &self.target).await.map_err(io_err)?;

        Ok(())
    }
}
