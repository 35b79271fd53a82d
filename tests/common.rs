#![allow(dead_code)]

use async_trait::async_trait;
use laporan_guru_bertugas::config::{AppConfig, ExportTimings, SchoolInfo};
use laporan_guru_bertugas::export::{
    PdfArtifact, RenderBackend, RenderError, RenderSource, ReportTemplate, SaveSink, SinkError,
    SubmissionPayload, SubmissionSink,
};
use laporan_guru_bertugas::roster::Roster;
use laporan_guru_bertugas::state::{AppState, ExportParts};
use laporan_guru_bertugas::storage::MemoryKeyValueStore;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const FAKE_PDF: &[u8] = b"%PDF-1.7\n% laporan\n%%EOF\n";

/// What the mock renderer does when called.
#[derive(Clone)]
pub enum RenderMode {
    Pdf,
    /// Compiler exits non-zero.
    Fail,
    /// Produces bytes that are not a PDF.
    Garbage,
}

pub struct MockRenderBackend {
    ready: bool,
    mode: RenderMode,
    delay: Duration,
    calls: AtomicUsize,
    sources: Mutex<Vec<String>>,
}

impl MockRenderBackend {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            ready: true,
            mode,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            sources: Mutex::new(Vec::new()),
        }
    }

    pub fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::new(RenderMode::Pdf)
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(RenderMode::Pdf)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_source(&self) -> Option<String> {
        self.sources.lock().last().cloned()
    }
}

#[async_trait]
impl RenderBackend for MockRenderBackend {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn render(&self, source: &RenderSource) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sources.lock().push(source.typst.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.mode {
            RenderMode::Pdf => Ok(FAKE_PDF.to_vec()),
            RenderMode::Fail => Err(RenderError::TypstExit {
                code: 1,
                stderr: "error: unexpected argument".to_string(),
            }),
            RenderMode::Garbage => Ok(b"<html>not a pdf</html>".to_vec()),
        }
    }
}

/// In-memory save sink.
#[derive(Default)]
pub struct MockSaveSink {
    fail: bool,
    saved: Mutex<Vec<PdfArtifact>>,
}

impl MockSaveSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Vec<PdfArtifact> {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl SaveSink for MockSaveSink {
    async fn save(&self, artifact: &PdfArtifact) -> Result<PathBuf, SinkError> {
        let path = PathBuf::from("/mock/exports").join(&artifact.filename);
        if self.fail {
            return Err(SinkError::Write {
                path,
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.saved.lock().push(artifact.clone());
        Ok(path)
    }
}

/// Records submitted payloads.
#[derive(Default)]
pub struct MockSubmissionSink {
    submitted: Mutex<Vec<SubmissionPayload>>,
}

impl MockSubmissionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<SubmissionPayload> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl SubmissionSink for MockSubmissionSink {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SinkError> {
        self.submitted.lock().push(payload.clone());
        Ok(())
    }
}

/// Short delays so terminal states are observable without slowing the suite.
pub fn fast_timings() -> ExportTimings {
    ExportTimings {
        settle_delay: Duration::ZERO,
        success_hold: Duration::from_millis(60),
        error_hold: Duration::from_millis(80),
        reset_delay: Duration::from_millis(60),
    }
}

/// Long enough to settle every delay from [`fast_timings`].
pub async fn wait_for_timers() {
    tokio::time::sleep(Duration::from_millis(300)).await;
}

pub fn test_template() -> ReportTemplate {
    ReportTemplate::from_layout("// test layout\n", SchoolInfo::default(), None)
}

pub fn test_config(export_dir: PathBuf) -> AppConfig {
    AppConfig {
        export_dir,
        timings: fast_timings(),
        ..AppConfig::default()
    }
}

pub fn default_roster() -> Roster {
    Roster::from_names(["AHMAD BIN ALI", "SITI BINTI ABU"])
}

/// State over in-memory storage with the given export collaborators.
pub fn test_state(
    export_dir: PathBuf,
    backend: Arc<dyn RenderBackend>,
    save_sink: Arc<dyn SaveSink>,
    submission: Option<Arc<dyn SubmissionSink>>,
) -> AppState {
    AppState::new_with_parts(
        test_config(export_dir),
        Arc::new(MemoryKeyValueStore::new()),
        default_roster(),
        ExportParts {
            template: Some(test_template()),
            backend,
            save_sink,
            submission,
        },
    )
}
