//! Lays a report into the Typst page template.
//!
//! The layout lives in `static/laporan_guru_bertugas.typ` and defines a
//! `laporan` function; the generated source is the layout followed by one
//! call carrying the report as a Typst dictionary.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use super::engine::RenderError;
use crate::config::SchoolInfo;
use crate::report::Report;

pub const TEMPLATE_FILE: &str = "laporan_guru_bertugas.typ";

/// Typst source ready for the compiler, plus files it references.
#[derive(Debug, Clone)]
pub struct RenderSource {
    pub typst: String,
    pub assets: Vec<RenderAsset>,
}

/// A file copied next to the source under `name`.
#[derive(Debug, Clone)]
pub struct RenderAsset {
    pub name: String,
    pub path: PathBuf,
}

pub struct ReportTemplate {
    layout: String,
    school: SchoolInfo,
    logo: Option<RenderAsset>,
}

impl ReportTemplate {
    /// Load the layout from `static_dir`.
    pub fn load(
        static_dir: &Path,
        school: SchoolInfo,
        logo_path: Option<PathBuf>,
    ) -> Result<Self, RenderError> {
        let template_path = static_dir.join(TEMPLATE_FILE);
        let layout = fs::read_to_string(&template_path).map_err(RenderError::TemplateIo)?;
        log::info!("Loaded report layout from {}", template_path.display());
        Ok(Self::from_layout(layout, school, logo_path))
    }

    pub fn from_layout(
        layout: impl Into<String>,
        school: SchoolInfo,
        logo_path: Option<PathBuf>,
    ) -> Self {
        let logo = logo_path.and_then(|path| {
            if !path.is_file() {
                log::warn!("Report logo {} not found, rendering without it", path.display());
                return None;
            }
            let extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("png")
                .to_ascii_lowercase();
            Some(RenderAsset {
                name: format!("logo.{}", extension),
                path,
            })
        });

        Self {
            layout: layout.into(),
            school,
            logo,
        }
    }

    pub fn source_for(&self, report: &Report) -> RenderSource {
        let logo = match &self.logo {
            Some(asset) => string(&asset.name),
            None => "none".to_string(),
        };

        let mut typst = self.layout.clone();
        let _ = write!(
            typst,
            "\n#laporan(\n  sekolah: {},\n  data: {},\n  logo: {},\n)\n",
            dict(&[
                ("nama", string(&self.school.name)),
                ("tajuk", string(&self.school.report_title)),
            ]),
            report_dict(report),
            logo,
        );

        RenderSource {
            typst,
            assets: self.logo.iter().cloned().collect(),
        }
    }
}

fn report_dict(report: &Report) -> String {
    let hari = report.hari.map(|hari| hari.to_string()).unwrap_or_default();
    let tiga_k = &report.tiga_k;

    dict(&[
        ("minggu", string(&report.minggu)),
        ("tarikh", string(&report.tarikh)),
        ("hari", string(&hari)),
        ("nama_guru", strings(report.nama_guru.iter())),
        (
            "perhimpunan",
            dict(&[
                ("isi_utama", string(&report.perhimpunan.isi_utama)),
                ("komen", string(&report.perhimpunan.komen)),
            ]),
        ),
        (
            "kantin",
            dict(&[
                ("kebersihan", string(&report.kantin.kebersihan.to_string())),
                ("komen_kebersihan", string(&report.kantin.komen_kebersihan)),
                ("kualiti", string(&report.kantin.kualiti.to_string())),
                ("komen_kualiti", string(&report.kantin.komen_kualiti)),
            ]),
        ),
        (
            "tandas",
            rating(&report.tandas.tahap.to_string(), &report.tandas.komen),
        ),
        (
            "persekitaran",
            rating(
                &report.persekitaran.tahap.to_string(),
                &report.persekitaran.komen,
            ),
        ),
        (
            "statistik",
            dict(&[
                ("lewat", string(&report.statistik_murid.lewat)),
                ("klinik", string(&report.statistik_murid.klinik)),
            ]),
        ),
        (
            "tiga_k",
            dict(&[
                (
                    "keselamatan",
                    rating(&tiga_k.keselamatan.tahap.to_string(), &tiga_k.keselamatan.komen),
                ),
                (
                    "kesihatan",
                    rating(&tiga_k.kesihatan.tahap.to_string(), &tiga_k.kesihatan.komen),
                ),
                (
                    "kebersihan",
                    rating(&tiga_k.kebersihan.tahap.to_string(), &tiga_k.kebersihan.komen),
                ),
            ]),
        ),
        (
            "disiplin",
            dict(&[
                ("tahap", string(&report.disiplin.tahap.to_string())),
                ("komen", string(&report.disiplin.komen)),
                ("kes_serius", string(&report.disiplin.kes_serius)),
            ]),
        ),
        (
            "kehadiran",
            dict(&[
                ("hadir", string(&report.kehadiran_guru.hadir)),
                ("tidak_hadir", string(&report.kehadiran_guru.tidak_hadir)),
                (
                    "senarai",
                    strings(report.kehadiran_guru.senarai_tidak_hadir.iter()),
                ),
            ]),
        ),
        (
            "pelawat",
            array(report.pelawat.iter().map(|pelawat| {
                dict(&[
                    ("nama", string(&pelawat.nama)),
                    ("urusan", string(&pelawat.urusan)),
                ])
            })),
        ),
        ("ulasan", string(&report.ulasan_catatan)),
        ("pelapor", string(&report.nama_guru_pelapor)),
        ("tarikh_laporan", string(&report.tarikh_laporan)),
    ])
}

fn rating(tahap: &str, komen: &str) -> String {
    dict(&[("tahap", string(tahap)), ("komen", string(komen))])
}

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\r', "")
        .replace('\n', r"\n")
        .replace('\t', r"\t")
}

fn string(value: &str) -> String {
    format!("\"{}\"", escape_typst_string(value))
}

fn strings<'a>(values: impl Iterator<Item = &'a String>) -> String {
    array(values.map(|value| string(value)))
}

/// Trailing comma keeps one-element arrays arrays.
fn array(items: impl Iterator<Item = String>) -> String {
    let mut out = String::from("(");
    for item in items {
        out.push_str(&item);
        out.push_str(", ");
    }
    out.push(')');
    out
}

fn dict(entries: &[(&str, String)]) -> String {
    let mut out = String::from("(");
    for (key, value) in entries {
        let _ = write!(out, "{}: {}, ", key, value);
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_static_dir;
    use crate::report::model::{Hari, Pelawat};

    fn template() -> ReportTemplate {
        ReportTemplate::from_layout("// layout\n", SchoolInfo::default(), None)
    }

    #[test]
    fn test_escape_typst_string() {
        assert_eq!(escape_typst_string(r#"a "b" \c"#), r#"a \"b\" \\c"#);
        assert_eq!(escape_typst_string("baris 1\r\nbaris 2"), r"baris 1\nbaris 2");
    }

    #[test]
    fn test_array_keeps_single_element_arrays() {
        assert_eq!(array(std::iter::once("1".to_string())), "(1, )");
        assert_eq!(array(std::iter::empty()), "()");
    }

    #[test]
    fn test_source_contains_report_values() {
        let mut report = Report::default();
        report.minggu = "7".to_string();
        report.hari = Some(Hari::Jumaat);
        report.nama_guru.set(0, "AHMAD BIN ALI".to_string()).unwrap();
        report
            .pelawat
            .set(
                1,
                Pelawat {
                    nama: "PPD".to_string(),
                    urusan: "Lawatan \"pemantauan\"".to_string(),
                },
            )
            .unwrap();

        let source = template().source_for(&report);
        assert!(source.typst.starts_with("// layout\n"));
        assert!(source.typst.contains("#laporan("));
        assert!(source.typst.contains(r#"minggu: "7""#));
        assert!(source.typst.contains(r#"hari: "Jumaat""#));
        assert!(source.typst.contains(r#""AHMAD BIN ALI""#));
        assert!(source.typst.contains(r#"urusan: "Lawatan \"pemantauan\"""#));
        assert!(source.typst.contains(r#"nama: "Sekolah Kebangsaan Bandar Endau""#));
        assert!(source.typst.contains("logo: none"));
        assert!(source.assets.is_empty());
    }

    #[test]
    fn test_every_slot_is_laid_out() {
        let source = template().source_for(&Report::default());
        let nama_guru = source
            .typst
            .split("nama_guru: ")
            .nth(1)
            .and_then(|rest| rest.split(')').next())
            .unwrap();
        assert_eq!(nama_guru.matches("\"\"").count(), 8);
    }

    #[test]
    fn test_logo_is_attached_as_asset() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("Logo.PNG");
        std::fs::write(&logo, b"png").unwrap();

        let template = ReportTemplate::from_layout("", SchoolInfo::default(), Some(logo.clone()));
        let source = template.source_for(&Report::default());
        assert!(source.typst.contains(r#"logo: "logo.png""#));
        assert_eq!(source.assets.len(), 1);
        assert_eq!(source.assets[0].path, logo);
    }

    #[test]
    fn test_missing_logo_is_dropped() {
        let template = ReportTemplate::from_layout(
            "",
            SchoolInfo::default(),
            Some(PathBuf::from("/nonexistent/logo.png")),
        );
        assert!(template.source_for(&Report::default()).assets.is_empty());
    }

    #[test]
    fn test_bundled_layout_loads() {
        let template =
            ReportTemplate::load(&default_static_dir(), SchoolInfo::default(), None).unwrap();
        let source = template.source_for(&Report::default());
        assert!(source.typst.contains("#let laporan("));
    }
}
