use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::export::{
    DirectorySink, ExportPipeline, RenderBackend, ReportTemplate, SaveSink, SinkError,
    StatusTracker, SubmissionSink, TypstRenderEngine, WebhookSubmitter,
};
use crate::report::ReportStore;
use crate::roster::{load_defaults, Roster, RosterStore};
use crate::storage::{FileKeyValueStore, KeyValueStore, StorageError};

pub const DEFAULT_ROSTER_FILE: &str = "senarai_guru_rasmi.txt";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open data store: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to set up submission client: {0}")]
    Submission(#[from] SinkError),
}

/// Collaborators of the export pipeline.
pub struct ExportParts {
    pub template: Option<ReportTemplate>,
    pub backend: Arc<dyn RenderBackend>,
    pub save_sink: Arc<dyn SaveSink>,
    pub submission: Option<Arc<dyn SubmissionSink>>,
}

pub struct AppState {
    pub config: AppConfig,
    pub roster: Arc<RosterStore>,
    pub report: Arc<ReportStore>,
    pub pipeline: Arc<ExportPipeline>,
    /// Held for the duration of an export run.
    pub export_gate: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new_with_config(config: AppConfig) -> Result<Self, StateError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::open(&config.data_dir)?);

        let defaults_path = config
            .roster_defaults_path
            .clone()
            .unwrap_or_else(|| config.static_dir.join(DEFAULT_ROSTER_FILE));
        let defaults = load_defaults(&defaults_path);

        let template = match ReportTemplate::load(
            &config.static_dir,
            config.school.clone(),
            config.logo_path.clone(),
        ) {
            Ok(template) => Some(template),
            Err(e) => {
                log::error!("Report layout unavailable, exports are disabled: {}", e);
                None
            }
        };

        let submission = match &config.submission_endpoint {
            Some(endpoint) => {
                let submitter: Arc<dyn SubmissionSink> = Arc::new(WebhookSubmitter::new(endpoint)?);
                Some(submitter)
            }
            None => None,
        };

        let parts = ExportParts {
            template,
            backend: Arc::new(TypstRenderEngine::new(config.typst_bin.clone())),
            save_sink: Arc::new(DirectorySink::new(config.export_dir.clone())),
            submission,
        };

        Ok(Self::new_with_parts(config, storage, defaults, parts))
    }

    pub fn new_with_parts(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
        defaults: Roster,
        parts: ExportParts,
    ) -> Self {
        let roster = Arc::new(RosterStore::initialize(
            storage.clone(),
            config.keys.clone(),
            defaults,
        ));
        let report = Arc::new(ReportStore::initialize(storage, config.keys.clone()));

        let pipeline = Arc::new(ExportPipeline::new(
            parts.template,
            parts.backend,
            parts.save_sink,
            parts.submission,
            report.clone(),
            StatusTracker::new(),
            config.filename_prefix.clone(),
            config.timings,
        ));

        AppState {
            config,
            roster,
            report,
            pipeline,
            export_gate: Arc::new(Mutex::new(())),
        }
    }
}
