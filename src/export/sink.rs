//! Terminal consumers of a rendered report.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::PdfArtifact;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request to submission endpoint failed: {0}")]
    Transmit(#[from] reqwest::Error),
}

/// Local save.
#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Store the artifact and return where it ended up.
    async fn save(&self, artifact: &PdfArtifact) -> Result<PathBuf, SinkError>;
}

/// JSON body posted to the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub base64: String,
    pub filename: String,
}

impl SubmissionPayload {
    pub fn from_artifact(artifact: &PdfArtifact) -> Self {
        Self {
            base64: STANDARD.encode(&artifact.bytes),
            filename: artifact.filename.clone(),
        }
    }
}

/// Remote submission.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Send the payload. Only a transport failure is an error.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SinkError>;
}

/// Writes PDFs into the export directory, where they are served for download.
///
/// Files are kept until removed by hand. The name is derived from the week and
/// date, so exporting the same day again replaces the earlier file.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SaveSink for DirectorySink {
    async fn save(&self, artifact: &PdfArtifact) -> Result<PathBuf, SinkError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SinkError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.dir.join(&artifact.filename);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            log::debug!("Replacing earlier export {}", path.display());
        }
        tokio::fs::write(&path, &artifact.bytes)
            .await
            .map_err(|source| SinkError::Write {
                path: path.clone(),
                source,
            })?;

        log::info!("Saved {} ({} bytes)", path.display(), artifact.bytes.len());
        Ok(path)
    }
}

/// Posts the payload to a fixed webhook URL.
pub struct WebhookSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookSubmitter {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .timeout(Duration::from_secs(120))
            .user_agent("laporan-guru-bertugas/1.0")
            .build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SubmissionSink for WebhookSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await?;

        // The endpoint's answer is not part of the contract; the request went out.
        let status = response.status();
        if status.is_success() {
            log::info!("Submitted {} (HTTP {})", payload.filename, status);
        } else {
            log::warn!(
                "Submission endpoint answered HTTP {} for {}, treating as sent",
                status,
                payload.filename
            );
        }
        Ok(())
    }
}
