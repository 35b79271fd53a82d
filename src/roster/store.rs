//! Roster persistence.
//!
//! The working roster is the union of a baked-in default list and the names
//! users added. Only the user additions (roster minus defaults) are read back
//! on startup, so a changed default list is picked up without stale entries
//! masking it. The full roster is written as well for other readers.

use parking_lot::RwLock;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::model::{normalize_name, Roster, RosterResponse};
use crate::config::StorageKeys;
use crate::storage::{load_json, save_json, KeyValueStore, LoadError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("clearing the roster requires explicit confirmation")]
    ConfirmationRequired,
}

pub struct RosterStore {
    storage: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    defaults: Roster,
    roster: RwLock<Roster>,
}

impl RosterStore {
    /// Merge the defaults with the persisted custom names.
    ///
    /// Never fails: absent or unreadable data falls back to defaults only.
    pub fn initialize(
        storage: Arc<dyn KeyValueStore>,
        keys: StorageKeys,
        defaults: Roster,
    ) -> Self {
        let custom = load_custom(storage.as_ref(), &keys, &defaults);
        let roster = defaults.union(&custom);
        log::info!(
            "Roster initialized with {} names ({} default, {} custom)",
            roster.len(),
            defaults.len(),
            custom.len()
        );

        Self {
            storage,
            keys,
            defaults,
            roster: RwLock::new(roster),
        }
    }

    pub fn snapshot(&self) -> Roster {
        self.roster.read().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.roster.read().to_vec()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.roster.read().contains(name)
    }

    pub fn defaults(&self) -> &Roster {
        &self.defaults
    }

    /// Names the user added on top of the defaults.
    pub fn custom(&self) -> Roster {
        self.roster.read().difference(&self.defaults)
    }

    pub fn response(&self) -> RosterResponse {
        let roster = self.roster.read();
        RosterResponse {
            names: roster.to_vec(),
            count: roster.len(),
            custom: roster.difference(&self.defaults).to_vec(),
        }
    }

    /// Add one name. Blank or already registered names are a no-op.
    pub fn add_name(&self, raw: &str) -> Option<String> {
        let mut roster = self.roster.write();
        let added = roster.insert(raw);
        if let Some(name) = &added {
            log::info!("Teacher registered: {}", name);
            self.persist(&roster);
        }
        added
    }

    /// Add newline-separated names and return how many were new.
    pub fn add_names_bulk(&self, raw: &str) -> usize {
        let mut roster = self.roster.write();
        let added = raw
            .lines()
            .filter_map(normalize_name)
            .filter(|name| roster.insert(name).is_some())
            .count();

        if added > 0 {
            log::info!("Bulk registration added {} teachers", added);
            self.persist(&roster);
        } else {
            log::debug!("Bulk registration added no new teachers");
        }
        added
    }

    /// Remove an exactly matching name. Returns whether anything was removed.
    pub fn remove_name(&self, name: &str) -> bool {
        let mut roster = self.roster.write();
        let removed = roster.remove(name);
        if removed {
            log::info!("Teacher removed from roster: {}", name);
            self.persist(&roster);
        }
        removed
    }

    /// Empty the roster. The caller must have obtained the user's confirmation.
    pub fn clear_all(&self, confirmed: bool) -> Result<(), RosterError> {
        if !confirmed {
            return Err(RosterError::ConfirmationRequired);
        }
        let mut roster = self.roster.write();
        let previous = roster.len();
        roster.clear();
        log::warn!("Roster cleared ({} names removed)", previous);
        self.persist(&roster);
        Ok(())
    }

    /// Write the full roster and the custom delta.
    pub fn persist_now(&self) {
        let roster = self.roster.read();
        self.persist(&roster);
    }

    fn persist(&self, roster: &Roster) {
        let storage = self.storage.as_ref();
        if let Err(e) = save_json(storage, &self.keys.roster, roster) {
            log::error!("Failed to persist roster: {}", e);
        }
        let custom = roster.difference(&self.defaults);
        if let Err(e) = save_json(storage, &self.keys.roster_custom, &custom) {
            log::error!("Failed to persist custom roster names: {}", e);
        }
    }
}

/// Read the baked-in roster: one name per line, `#` starts a comment line.
///
/// A missing or unreadable file yields an empty default list.
pub fn load_defaults(path: &Path) -> Roster {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let defaults = Roster::from_names(
                raw.lines()
                    .map(str::trim)
                    .filter(|line| !line.starts_with('#')),
            );
            log::info!("Loaded {} default names from {}", defaults.len(), path.display());
            defaults
        }
        Err(e) => {
            log::warn!(
                "Default roster {} not readable, starting without defaults: {}",
                path.display(),
                e
            );
            Roster::new()
        }
    }
}

fn load_custom(storage: &dyn KeyValueStore, keys: &StorageKeys, defaults: &Roster) -> Roster {
    match load_json::<Roster>(storage, &keys.roster_custom) {
        Ok(Some(custom)) => return custom.difference(defaults),
        Ok(None) => log::debug!("No custom roster names under '{}'", keys.roster_custom),
        Err(e) => {
            log_load_failure(&e);
            return Roster::new();
        }
    }

    // A legacy full roster becomes custom names once the defaults are taken out.
    match load_json::<Roster>(storage, &keys.legacy_roster) {
        Ok(Some(legacy)) => {
            let custom = legacy.difference(defaults);
            log::info!(
                "Migrated {} custom names from legacy key '{}'",
                custom.len(),
                keys.legacy_roster
            );
            custom
        }
        Ok(None) => Roster::new(),
        Err(e) => {
            log_load_failure(&e);
            Roster::new()
        }
    }
}

fn log_load_failure(error: &LoadError) {
    match error {
        LoadError::Corrupt { .. } => {
            log::warn!("Ignoring corrupt roster data, using defaults: {}", error)
        }
        LoadError::Storage(_) => {
            log::error!("Could not read roster data, using defaults: {}", error)
        }
    }
}
