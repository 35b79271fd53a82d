//! In-memory report mirrored to durable storage on every change.

use parking_lot::RwLock;
use std::sync::Arc;

use super::model::Report;
use super::update::{ReportError, ReportUpdate};
use crate::config::StorageKeys;
use crate::roster::Roster;
use crate::storage::{load_json, save_json, KeyValueStore, LoadError};

pub struct ReportStore {
    storage: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    report: RwLock<Report>,
}

impl ReportStore {
    /// Load the persisted report body, falling back to a blank report.
    pub fn initialize(storage: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        let report = load_report(storage.as_ref(), &keys).unwrap_or_default();
        Self {
            storage,
            keys,
            report: RwLock::new(report),
        }
    }

    pub fn snapshot(&self) -> Report {
        self.report.read().clone()
    }

    /// Apply a batch of updates atomically: either all apply or none do.
    pub fn apply_all(
        &self,
        updates: Vec<ReportUpdate>,
        roster: &Roster,
    ) -> Result<Report, ReportError> {
        let mut report = self.report.write();
        let mut draft = report.clone();
        for update in updates {
            draft.apply(update, roster)?;
        }

        if *report != draft {
            *report = draft;
            self.persist(&report);
        }
        Ok(report.clone())
    }

    pub fn apply(&self, update: ReportUpdate, roster: &Roster) -> Result<Report, ReportError> {
        self.apply_all(vec![update], roster)
    }

    /// Restore every field to its default and drop the persisted body.
    ///
    /// The roster is stored separately and is not touched.
    pub fn reset(&self) -> Report {
        let mut report = self.report.write();
        *report = Report::default();
        report.nama_guru.clear_all();
        report.kehadiran_guru.senarai_tidak_hadir.clear_all();
        report.pelawat.clear_all();

        for key in [&self.keys.report, &self.keys.legacy_report] {
            if let Err(e) = self.storage.remove(key) {
                log::error!("Failed to remove persisted report '{}': {}", key, e);
            }
        }
        log::info!("Report form cleared");
        report.clone()
    }

    fn persist(&self, report: &Report) {
        if let Err(e) = save_json(self.storage.as_ref(), &self.keys.report, report) {
            log::error!("Failed to persist report: {}", e);
        }
    }
}

fn load_report(storage: &dyn KeyValueStore, keys: &StorageKeys) -> Option<Report> {
    for key in [&keys.report, &keys.legacy_report] {
        match load_json::<Report>(storage, key) {
            Ok(Some(report)) => {
                log::info!("Restored in-progress report from '{}'", key);
                if *key != keys.report {
                    migrate_legacy(storage, keys, &report);
                }
                return Some(report);
            }
            Ok(None) => log::debug!("No persisted report under '{}'", key),
            Err(e @ LoadError::Corrupt { .. }) => {
                log::warn!("Ignoring corrupt report body, starting blank: {}", e);
                return None;
            }
            Err(e) => {
                log::error!("Could not read report body, starting blank: {}", e);
                return None;
            }
        }
    }
    None
}

/// Move a legacy body under the stable key so a later reset cannot bring it back.
fn migrate_legacy(storage: &dyn KeyValueStore, keys: &StorageKeys, report: &Report) {
    if let Err(e) = save_json(storage, &keys.report, report) {
        log::error!("Failed to migrate legacy report body: {}", e);
        return;
    }
    if let Err(e) = storage.remove(&keys.legacy_report) {
        log::error!("Failed to remove legacy report key '{}': {}", keys.legacy_report, e);
    }
}
