//! Observable export status: `Idle → Busy → {Success, Error} → Idle`.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportStatus {
    Idle,
    Busy,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub status: ExportStatus,
    /// Notice for the user, if any.
    pub message: Option<String>,
    /// File name of the current or last run.
    pub filename: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StatusSnapshot {
    fn idle() -> Self {
        Self {
            status: ExportStatus::Idle,
            message: None,
            filename: None,
            updated_at: Utc::now(),
        }
    }
}

struct Inner {
    snapshot: StatusSnapshot,
    /// Bumped on every transition; a delayed revert only fires if it still matches.
    generation: u64,
}

/// Shared handle on the export status.
#[derive(Clone)]
pub struct StatusTracker {
    inner: Arc<Mutex<Inner>>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                snapshot: StatusSnapshot::idle(),
                generation: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.lock().snapshot.clone()
    }

    pub fn status(&self) -> ExportStatus {
        self.inner.lock().snapshot.status
    }

    pub fn is_busy(&self) -> bool {
        self.status() == ExportStatus::Busy
    }

    /// Enter Busy for a run producing `filename`.
    pub fn begin(&self, filename: &str, message: &str) -> u64 {
        self.transition(ExportStatus::Busy, Some(message), Some(filename))
    }

    /// Enter a terminal state. Returns the generation to pass to [`Self::revert_after`].
    pub fn finish(&self, status: ExportStatus, message: &str) -> u64 {
        let filename = self.inner.lock().snapshot.filename.clone();
        self.transition(status, Some(message), filename.as_deref())
    }

    /// Return to Idle if nothing else happened since `generation`.
    pub fn settle_idle(&self, generation: u64, message: Option<&str>) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            log::debug!(
                "Skipping stale status revert (generation {} != {})",
                generation,
                inner.generation
            );
            return false;
        }
        inner.generation += 1;
        inner.snapshot = StatusSnapshot {
            status: ExportStatus::Idle,
            message: message.map(str::to_string),
            filename: inner.snapshot.filename.take(),
            updated_at: Utc::now(),
        };
        true
    }

    /// Schedule the automatic return to Idle.
    pub fn revert_after(&self, generation: u64, delay: Duration) {
        let tracker = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracker.settle_idle(generation, None);
        });
    }

    fn transition(
        &self,
        status: ExportStatus,
        message: Option<&str>,
        filename: Option<&str>,
    ) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.snapshot = StatusSnapshot {
            status,
            message: message.map(str::to_string),
            filename: filename.map(str::to_string),
            updated_at: Utc::now(),
        };
        log::info!("Export status -> {:?}", status);
        inner.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let tracker = StatusTracker::new();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.status, ExportStatus::Idle);
        assert!(snapshot.message.is_none());
        assert!(snapshot.filename.is_none());
    }

    #[test]
    fn test_terminal_state_keeps_filename() {
        let tracker = StatusTracker::new();
        tracker.begin("A.pdf", "busy");
        assert!(tracker.is_busy());

        tracker.finish(ExportStatus::Success, "done");
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.status, ExportStatus::Success);
        assert_eq!(snapshot.filename.as_deref(), Some("A.pdf"));
        assert_eq!(snapshot.message.as_deref(), Some("done"));
    }

    #[test]
    fn test_stale_revert_is_ignored() {
        let tracker = StatusTracker::new();
        tracker.begin("A.pdf", "busy");
        let first = tracker.finish(ExportStatus::Error, "failed");

        tracker.begin("B.pdf", "busy");
        assert!(!tracker.settle_idle(first, None));
        assert_eq!(tracker.status(), ExportStatus::Busy);
    }

    #[tokio::test]
    async fn test_revert_after_delay() {
        let tracker = StatusTracker::new();
        tracker.begin("A.pdf", "busy");
        let generation = tracker.finish(ExportStatus::Success, "done");
        tracker.revert_after(generation, Duration::from_millis(20));

        assert_eq!(tracker.status(), ExportStatus::Success);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(tracker.status(), ExportStatus::Idle);
    }
}
