//! Export pipeline: lay the report out, render it to PDF and hand the
//! artifact to exactly one sink (local save or remote submission).

pub mod engine;
pub mod filename;
pub mod pipeline;
pub mod routes;
pub mod sink;
pub mod status;
pub mod template;

pub use engine::{RenderBackend, RenderError, TypstRenderEngine};
pub use filename::export_filename;
pub use pipeline::ExportPipeline;
pub use sink::{DirectorySink, SaveSink, SinkError, SubmissionPayload, SubmissionSink, WebhookSubmitter};
pub use status::{ExportStatus, StatusSnapshot, StatusTracker};
pub use template::{RenderSource, ReportTemplate};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Terminal action of an export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportAction {
    /// Keep the PDF on the server and offer it for download.
    #[serde(alias = "download")]
    Save,
    /// Send the PDF to the submission endpoint, then clear the form.
    Upload,
}

impl ExportAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Upload => "upload",
        }
    }
}

impl fmt::Display for ExportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered report.
#[derive(Debug, Clone)]
pub struct PdfArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Failures after the run has gone Busy. All of them end in the Error status.
#[derive(Debug, Error)]
pub enum PipelineFailure {
    #[error("capture failed: {0}")]
    Capture(#[source] RenderError),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("local save failed: {0}")]
    Save(#[source] SinkError),
    #[error("transmit failed: {0}")]
    Transmit(#[source] SinkError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    /// Prerequisites missing; the status machine was not touched.
    #[error("export is not ready: {0}")]
    NotReady(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineFailure),
}

/// Result of a completed export run.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub id: Uuid,
    pub action: ExportAction,
    #[schema(example = "LAPORAN_SKBE_M7_2024-01-05.pdf")]
    pub filename: String,
    /// Set for saved exports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    pub message: String,
}
