//! One export run: lay out, render, check, dispatch, report status.

use std::sync::Arc;
use uuid::Uuid;

use super::engine::RenderBackend;
use super::filename::export_filename;
use super::sink::{SaveSink, SubmissionPayload, SubmissionSink};
use super::status::{ExportStatus, StatusTracker};
use super::template::ReportTemplate;
use super::{ExportAction, ExportError, ExportOutcome, PdfArtifact, PipelineFailure};
use crate::config::ExportTimings;
use crate::metrics;
use crate::report::{Report, ReportStore};

pub const MSG_NOT_READY: &str =
    "Sistem penjanaan PDF belum sedia sepenuhnya. Sila cuba sebentar lagi.";
pub const MSG_BUSY: &str = "Sedang menjana PDF...";
pub const MSG_SAVED: &str = "PDF berjaya dijana dan disimpan.";
pub const MSG_SUBMITTED: &str = "Laporan berjaya dihantar.";
pub const MSG_FAILED: &str = "Ralat semasa menjana atau menghantar laporan. Sila cuba lagi.";
pub const MSG_SUBMITTED_AND_CLEARED: &str = "Laporan telah dihantar ke Cloud Drive dan borang telah dikosongkan untuk kegunaan guru seterusnya.";

/// Sink selected for a run.
enum Target<'a> {
    Save(&'a dyn SaveSink),
    Submit(&'a dyn SubmissionSink),
}

pub struct ExportPipeline {
    template: Option<ReportTemplate>,
    backend: Arc<dyn RenderBackend>,
    save_sink: Arc<dyn SaveSink>,
    submission: Option<Arc<dyn SubmissionSink>>,
    report: Arc<ReportStore>,
    status: StatusTracker,
    filename_prefix: String,
    timings: ExportTimings,
}

impl ExportPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        template: Option<ReportTemplate>,
        backend: Arc<dyn RenderBackend>,
        save_sink: Arc<dyn SaveSink>,
        submission: Option<Arc<dyn SubmissionSink>>,
        report: Arc<ReportStore>,
        status: StatusTracker,
        filename_prefix: impl Into<String>,
        timings: ExportTimings,
    ) -> Self {
        Self {
            template,
            backend,
            save_sink,
            submission,
            report,
            status,
            filename_prefix: filename_prefix.into(),
            timings,
        }
    }

    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    pub fn filename_for(&self, report: &Report) -> String {
        export_filename(&self.filename_prefix, report)
    }

    /// Render `report` and hand it to the sink chosen by `action`.
    ///
    /// Callers must not start a second run while the status is Busy.
    pub async fn export(
        &self,
        action: ExportAction,
        report: &Report,
    ) -> Result<ExportOutcome, ExportError> {
        let (template, target) = match self.check_ready(action) {
            Ok(ready) => ready,
            Err(e) => {
                log::warn!("Export ({}) refused: {}", action, e);
                metrics::record_export(action, "not_ready");
                return Err(e);
            }
        };

        let id = Uuid::new_v4();
        let filename = self.filename_for(report);
        self.status.begin(&filename, MSG_BUSY);
        log::info!("Export {} ({}) started for {}", id, action, filename);

        match self.run(template, target, report, &filename).await {
            Ok(download_url) => {
                metrics::record_export(action, "success");
                let message = match action {
                    ExportAction::Save => MSG_SAVED,
                    ExportAction::Upload => MSG_SUBMITTED,
                };
                let generation = self.status.finish(ExportStatus::Success, message);
                match action {
                    ExportAction::Save => {
                        self.status.revert_after(generation, self.timings.success_hold)
                    }
                    ExportAction::Upload => self.schedule_reset(generation),
                }
                log::info!("Export {} ({}) finished: {}", id, action, filename);

                Ok(ExportOutcome {
                    id,
                    action,
                    filename,
                    download_url,
                    message: message.to_string(),
                })
            }
            Err(failure) => {
                metrics::record_export(action, "error");
                log::error!("Export {} ({}) failed: {}", id, action, failure);
                let generation = self.status.finish(ExportStatus::Error, MSG_FAILED);
                self.status.revert_after(generation, self.timings.error_hold);
                Err(ExportError::Pipeline(failure))
            }
        }
    }

    /// Render `report` without touching the status or any sink.
    pub async fn preview(&self, report: &Report) -> Result<PdfArtifact, ExportError> {
        let template = self.template.as_ref().ok_or_else(not_ready_template)?;
        if !self.backend.is_ready() {
            return Err(not_ready_backend());
        }

        let bytes = self
            .backend
            .render(&template.source_for(report))
            .await
            .map_err(PipelineFailure::Capture)?;
        check_artifact(&bytes)?;

        Ok(PdfArtifact {
            filename: self.filename_for(report),
            bytes,
        })
    }

    fn check_ready(&self, action: ExportAction) -> Result<(&ReportTemplate, Target<'_>), ExportError> {
        let template = self.template.as_ref().ok_or_else(not_ready_template)?;
        if !self.backend.is_ready() {
            return Err(not_ready_backend());
        }
        let target = match action {
            ExportAction::Save => Target::Save(self.save_sink.as_ref()),
            ExportAction::Upload => match &self.submission {
                Some(submission) => Target::Submit(submission.as_ref()),
                None => {
                    return Err(ExportError::NotReady(
                        "submission endpoint is not configured".to_string(),
                    ))
                }
            },
        };
        Ok((template, target))
    }

    /// Busy-phase steps. Returns the download URL for saved exports.
    async fn run(
        &self,
        template: &ReportTemplate,
        target: Target<'_>,
        report: &Report,
        filename: &str,
    ) -> Result<Option<String>, PipelineFailure> {
        if !self.timings.settle_delay.is_zero() {
            tokio::time::sleep(self.timings.settle_delay).await;
        }

        let bytes = self
            .backend
            .render(&template.source_for(report))
            .await
            .map_err(PipelineFailure::Capture)?;
        check_artifact(&bytes)?;

        let artifact = PdfArtifact {
            filename: filename.to_string(),
            bytes,
        };

        match target {
            Target::Save(sink) => {
                sink.save(&artifact).await.map_err(PipelineFailure::Save)?;
                Ok(Some(format!("/api/exports/{}", artifact.filename)))
            }
            Target::Submit(sink) => {
                let payload = SubmissionPayload::from_artifact(&artifact);
                sink.submit(&payload)
                    .await
                    .map_err(PipelineFailure::Transmit)?;
                Ok(None)
            }
        }
    }

    /// After a submission: wait, clear the form, then go Idle with a notice.
    fn schedule_reset(&self, generation: u64) {
        let report = Arc::clone(&self.report);
        let status = self.status.clone();
        let delay = self.timings.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            report.reset();
            status.settle_idle(generation, Some(MSG_SUBMITTED_AND_CLEARED));
        });
    }
}

fn not_ready_template() -> ExportError {
    ExportError::NotReady("report layout is not loaded".to_string())
}

fn not_ready_backend() -> ExportError {
    ExportError::NotReady("PDF renderer is not available".to_string())
}

fn check_artifact(bytes: &[u8]) -> Result<(), PipelineFailure> {
    if bytes.is_empty() {
        return Err(PipelineFailure::Encode("renderer produced no output".to_string()));
    }
    if !bytes.starts_with(b"%PDF") {
        return Err(PipelineFailure::Encode(
            "renderer output is not a PDF document".to_string(),
        ));
    }
    Ok(())
}
