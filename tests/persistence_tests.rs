mod common;

use common::*;
use laporan_guru_bertugas::report::update::SlotValue;
use laporan_guru_bertugas::report::ReportUpdate;
use laporan_guru_bertugas::roster::Roster;
use laporan_guru_bertugas::state::{AppState, ExportParts};
use laporan_guru_bertugas::storage::{FileKeyValueStore, KeyValueStore};
use std::path::Path;
use std::sync::Arc;

fn open_state(data_dir: &Path, defaults: Roster) -> AppState {
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::open(data_dir).unwrap());
    AppState::new_with_parts(
        test_config(data_dir.join("exports")),
        storage,
        defaults,
        ExportParts {
            template: Some(test_template()),
            backend: Arc::new(MockRenderBackend::new(RenderMode::Pdf)),
            save_sink: Arc::new(MockSaveSink::new()),
            submission: None,
        },
    )
}

#[test]
fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = open_state(dir.path(), Roster::from_names(["A", "B"]));
    first.roster.add_name("c");
    let roster = first.roster.snapshot();
    first
        .report
        .apply_all(
            vec![
                ReportUpdate::Minggu("12".to_string()),
                ReportUpdate::NamaGuru(SlotValue {
                    slot: 3,
                    value: "C".to_string(),
                }),
                ReportUpdate::DisiplinKesSerius("Tiada".to_string()),
            ],
            &roster,
        )
        .unwrap();
    let report = first.report.snapshot();
    drop(first);

    let second = open_state(dir.path(), Roster::from_names(["A", "B"]));
    assert_eq!(second.roster.snapshot(), roster);
    assert_eq!(second.roster.custom().to_vec(), vec!["C"]);
    assert_eq!(second.report.snapshot(), report);
}

#[test]
fn test_changed_defaults_keep_custom_names() {
    let dir = tempfile::tempdir().unwrap();

    let first = open_state(dir.path(), Roster::from_names(["A", "B"]));
    first.roster.add_name("C");
    drop(first);

    let second = open_state(dir.path(), Roster::from_names(["A", "B", "D"]));
    assert_eq!(second.roster.names(), vec!["A", "B", "C", "D"]);
    assert_eq!(second.roster.custom().to_vec(), vec!["C"]);
}

#[test]
fn test_reset_survives_restart_without_touching_roster() {
    let dir = tempfile::tempdir().unwrap();

    let first = open_state(dir.path(), default_roster());
    first.roster.add_name("cikgu baharu");
    first
        .report
        .apply(ReportUpdate::UlasanCatatan("catatan".to_string()), &first.roster.snapshot())
        .unwrap();
    first.report.reset();
    drop(first);

    let second = open_state(dir.path(), default_roster());
    assert_eq!(second.report.snapshot().ulasan_catatan, "");
    assert!(second.roster.contains("CIKGU BAHARU"));
}

#[test]
fn test_legacy_files_are_migrated() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("skbe_v5_master_guru.json"),
        r#"["AHMAD BIN ALI", "cikgu lama"]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("skbe_v5_current_report.json"),
        r#"{"minggu": "4", "hari": "", "senaraiGuruMaster": ["AHMAD BIN ALI"]}"#,
    )
    .unwrap();

    let state = open_state(dir.path(), default_roster());
    assert!(state.roster.contains("CIKGU LAMA"));
    assert_eq!(state.roster.custom().to_vec(), vec!["CIKGU LAMA"]);
    assert_eq!(state.report.snapshot().minggu, "4");

    state.report.reset();
    drop(state);

    let reopened = open_state(dir.path(), default_roster());
    assert_eq!(reopened.report.snapshot().minggu, "");
    assert!(reopened.roster.contains("CIKGU LAMA"));
    assert!(!dir.path().join("skbe_v5_current_report.json").exists());
}

#[test]
fn test_corrupt_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("laporan_guru.roster_custom.json"), "{not json").unwrap();
    std::fs::write(dir.path().join("laporan_guru.report.json"), "[1, 2").unwrap();

    let state = open_state(dir.path(), default_roster());
    assert_eq!(state.roster.snapshot(), default_roster());
    assert_eq!(state.report.snapshot().minggu, "");
}
