//! Runtime configuration loaded from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {var} must be a number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

/// Storage key names. Legacy keys are only read, never written.
#[derive(Debug, Clone)]
pub struct StorageKeys {
    pub roster: String,
    pub roster_custom: String,
    pub report: String,
    pub legacy_roster: String,
    pub legacy_report: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            roster: "laporan_guru.roster".to_string(),
            roster_custom: "laporan_guru.roster_custom".to_string(),
            report: "laporan_guru.report".to_string(),
            legacy_roster: "skbe_v5_master_guru".to_string(),
            legacy_report: "skbe_v5_current_report".to_string(),
        }
    }
}

/// Delays of the export status machine.
#[derive(Debug, Clone, Copy)]
pub struct ExportTimings {
    /// Wait before capture. The Typst backend signals completion itself, so 0 is fine.
    pub settle_delay: Duration,
    /// How long `Success` stays visible after a local save.
    pub success_hold: Duration,
    /// How long `Error` stays visible.
    pub error_hold: Duration,
    /// Delay between a successful upload and the automatic form reset.
    pub reset_delay: Duration,
}

impl Default for ExportTimings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            success_hold: Duration::from_millis(3000),
            error_hold: Duration::from_millis(4000),
            reset_delay: Duration::from_millis(2000),
        }
    }
}

/// Labels printed on the report header.
#[derive(Debug, Clone)]
pub struct SchoolInfo {
    pub name: String,
    pub report_title: String,
}

impl Default for SchoolInfo {
    fn default() -> Self {
        Self {
            name: "Sekolah Kebangsaan Bandar Endau".to_string(),
            report_title: "Laporan Guru Bertugas Harian".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub static_dir: PathBuf,
    pub typst_bin: String,
    pub submission_endpoint: Option<String>,
    pub filename_prefix: String,
    pub school: SchoolInfo,
    pub logo_path: Option<PathBuf>,
    pub roster_defaults_path: Option<PathBuf>,
    pub allowed_origins: Vec<String>,
    pub timings: ExportTimings,
    pub keys: StorageKeys,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            export_dir: PathBuf::from("./exports"),
            static_dir: default_static_dir(),
            typst_bin: "typst".to_string(),
            submission_endpoint: None,
            filename_prefix: "LAPORAN_SKBE".to_string(),
            school: SchoolInfo::default(),
            logo_path: None,
            roster_defaults_path: None,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            timings: ExportTimings::default(),
            keys: StorageKeys::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let timings = ExportTimings {
            settle_delay: env_millis("EXPORT_SETTLE_DELAY_MS", defaults.timings.settle_delay)?,
            success_hold: env_millis("EXPORT_SUCCESS_HOLD_MS", defaults.timings.success_hold)?,
            error_hold: env_millis("EXPORT_ERROR_HOLD_MS", defaults.timings.error_hold)?,
            reset_delay: env_millis("EXPORT_RESET_DELAY_MS", defaults.timings.reset_delay)?,
        };

        let keys = StorageKeys {
            roster: env_or("ROSTER_KEY", defaults.keys.roster),
            roster_custom: env_or("ROSTER_CUSTOM_KEY", defaults.keys.roster_custom),
            report: env_or("REPORT_KEY", defaults.keys.report),
            legacy_roster: env_or("LEGACY_ROSTER_KEY", defaults.keys.legacy_roster),
            legacy_report: env_or("LEGACY_REPORT_KEY", defaults.keys.legacy_report),
        };

        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => defaults.allowed_origins,
        };

        let submission_endpoint = env_opt("SUBMISSION_ENDPOINT");
        if submission_endpoint.is_none() {
            log::warn!("SUBMISSION_ENDPOINT not set, report upload is disabled");
        }

        Ok(Self {
            host: env_or("HOST", defaults.host),
            port: env_number("PORT", defaults.port)?,
            data_dir: env_opt("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            export_dir: env_opt("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            static_dir: env_opt("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            typst_bin: env_or("TYPST_BIN", defaults.typst_bin),
            submission_endpoint,
            filename_prefix: env_or("FILENAME_PREFIX", defaults.filename_prefix),
            school: SchoolInfo {
                name: env_or("SCHOOL_NAME", defaults.school.name),
                report_title: env_or("REPORT_TITLE", defaults.school.report_title),
            },
            logo_path: env_opt("REPORT_LOGO_PATH").map(PathBuf::from),
            roster_defaults_path: env_opt("ROSTER_DEFAULTS_PATH").map(PathBuf::from),
            allowed_origins,
            timings,
            keys,
        })
    }
}

/// Directory holding the Typst template and the baked-in roster.
pub fn default_static_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

fn env_opt(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(var: &str, default: String) -> String {
    env_opt(var).unwrap_or(default)
}

fn env_number<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env_opt(var) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        None => Ok(default),
    }
}

fn env_millis(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let millis = env_number(var, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings_hold_each_state() {
        let timings = ExportTimings::default();
        assert_eq!(timings.success_hold, Duration::from_millis(3000));
        assert_eq!(timings.error_hold, Duration::from_millis(4000));
        assert_eq!(timings.reset_delay, Duration::from_millis(2000));
        assert!(!timings.success_hold.is_zero());
    }

    #[test]
    fn test_env_number_rejects_garbage() {
        env::set_var("LAPORAN_TEST_PORT", "eighty");
        let result = env_number::<u16>("LAPORAN_TEST_PORT", 8080);
        assert!(matches!(result, Err(ConfigError::InvalidNumber { .. })));
        env::remove_var("LAPORAN_TEST_PORT");
    }

    #[test]
    fn test_env_opt_treats_blank_as_unset() {
        env::set_var("LAPORAN_TEST_BLANK", "   ");
        assert_eq!(env_opt("LAPORAN_TEST_BLANK"), None);
        env::remove_var("LAPORAN_TEST_BLANK");
    }
}
