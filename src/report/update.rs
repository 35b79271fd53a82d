//! Typed field updates for the report.
//!
//! Each variant names exactly one field, so an invalid path cannot be
//! expressed. Serialized as `{"<field>": <value>}`; slot updates carry an index.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use super::model::{Hari, KualitiMakanan, Report, Tahap, TahapTandas, MAX_WEEK};
use super::slots::SlotOutOfRange;
use crate::roster::Roster;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlotValue {
    pub slot: usize,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KategoriTigaK {
    Keselamatan,
    Kesihatan,
    Kebersihan,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportUpdate {
    Minggu(String),
    Tarikh(String),
    Hari(Option<Hari>),
    NamaGuru(SlotValue),

    PerhimpunanIsiUtama(String),
    PerhimpunanKomen(String),

    KantinKebersihan(Tahap),
    KantinKomenKebersihan(String),
    KantinKualiti(KualitiMakanan),
    KantinKomenKualiti(String),

    TandasTahap(TahapTandas),
    TandasKomen(String),
    PersekitaranTahap(Tahap),
    PersekitaranKomen(String),

    StatistikLewat(String),
    StatistikKlinik(String),

    TigaKTahap { kategori: KategoriTigaK, tahap: Tahap },
    TigaKKomen { kategori: KategoriTigaK, komen: String },

    DisiplinTahap(Tahap),
    DisiplinKomen(String),
    DisiplinKesSerius(String),

    KehadiranHadir(String),
    KehadiranTidakHadir(String),
    GuruTidakHadir(SlotValue),

    PelawatNama(SlotValue),
    PelawatUrusan(SlotValue),

    UlasanCatatan(String),
    NamaGuruPelapor(String),
    TarikhLaporan(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("{list}: {source}")]
    SlotOutOfRange {
        list: &'static str,
        #[source]
        source: SlotOutOfRange,
    },
    #[error("minggu must be between 1 and 45, got '{0}'")]
    InvalidWeek(String),
    #[error("{field} must be a date in YYYY-MM-DD form, got '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("{field} must be a whole number, got '{value}'")]
    InvalidCount { field: &'static str, value: String },
    #[error("'{0}' is not a registered teacher")]
    UnknownTeacher(String),
}

impl Report {
    /// Apply a single update, validating it against the roster.
    pub fn apply(&mut self, update: ReportUpdate, roster: &Roster) -> Result<(), ReportError> {
        match update {
            ReportUpdate::Minggu(value) => self.minggu = validate_week(value)?,
            ReportUpdate::Tarikh(value) => self.tarikh = validate_date("tarikh", value)?,
            ReportUpdate::Hari(value) => self.hari = value,
            ReportUpdate::NamaGuru(SlotValue { slot, value }) => {
                let name = validate_teacher(value, roster)?;
                self.nama_guru
                    .set(slot, name)
                    .map_err(|source| slot_error("namaGuru", source))?;
            }

            ReportUpdate::PerhimpunanIsiUtama(value) => self.perhimpunan.isi_utama = value,
            ReportUpdate::PerhimpunanKomen(value) => self.perhimpunan.komen = value,

            ReportUpdate::KantinKebersihan(tahap) => self.kantin.kebersihan = tahap,
            ReportUpdate::KantinKomenKebersihan(value) => self.kantin.komen_kebersihan = value,
            ReportUpdate::KantinKualiti(kualiti) => self.kantin.kualiti = kualiti,
            ReportUpdate::KantinKomenKualiti(value) => self.kantin.komen_kualiti = value,

            ReportUpdate::TandasTahap(tahap) => self.tandas.tahap = tahap,
            ReportUpdate::TandasKomen(value) => self.tandas.komen = value,
            ReportUpdate::PersekitaranTahap(tahap) => self.persekitaran.tahap = tahap,
            ReportUpdate::PersekitaranKomen(value) => self.persekitaran.komen = value,

            ReportUpdate::StatistikLewat(value) => {
                self.statistik_murid.lewat = validate_count("statistikMurid.lewat", value)?
            }
            ReportUpdate::StatistikKlinik(value) => {
                self.statistik_murid.klinik = validate_count("statistikMurid.klinik", value)?
            }

            ReportUpdate::TigaKTahap { kategori, tahap } => self.tiga_k_mut(kategori).tahap = tahap,
            ReportUpdate::TigaKKomen { kategori, komen } => self.tiga_k_mut(kategori).komen = komen,

            ReportUpdate::DisiplinTahap(tahap) => self.disiplin.tahap = tahap,
            ReportUpdate::DisiplinKomen(value) => self.disiplin.komen = value,
            ReportUpdate::DisiplinKesSerius(value) => self.disiplin.kes_serius = value,

            ReportUpdate::KehadiranHadir(value) => {
                self.kehadiran_guru.hadir = validate_count("kehadiranGuru.hadir", value)?
            }
            ReportUpdate::KehadiranTidakHadir(value) => {
                self.kehadiran_guru.tidak_hadir = validate_count("kehadiranGuru.tidakHadir", value)?
            }
            ReportUpdate::GuruTidakHadir(SlotValue { slot, value }) => {
                let name = validate_teacher(value, roster)?;
                self.kehadiran_guru
                    .senarai_tidak_hadir
                    .set(slot, name)
                    .map_err(|source| slot_error("kehadiranGuru.senaraiTidakHadir", source))?;
            }

            ReportUpdate::PelawatNama(SlotValue { slot, value }) => {
                self.pelawat
                    .get_mut(slot)
                    .map_err(|source| slot_error("pelawat", source))?
                    .nama = value.to_uppercase();
            }
            ReportUpdate::PelawatUrusan(SlotValue { slot, value }) => {
                self.pelawat
                    .get_mut(slot)
                    .map_err(|source| slot_error("pelawat", source))?
                    .urusan = value;
            }

            ReportUpdate::UlasanCatatan(value) => self.ulasan_catatan = value,
            ReportUpdate::NamaGuruPelapor(value) => {
                self.nama_guru_pelapor = validate_teacher(value, roster)?
            }
            ReportUpdate::TarikhLaporan(value) => {
                self.tarikh_laporan = validate_date("tarikhLaporan", value)?
            }
        }
        Ok(())
    }

    fn tiga_k_mut(&mut self, kategori: KategoriTigaK) -> &mut super::model::Penilaian {
        match kategori {
            KategoriTigaK::Keselamatan => &mut self.tiga_k.keselamatan,
            KategoriTigaK::Kesihatan => &mut self.tiga_k.kesihatan,
            KategoriTigaK::Kebersihan => &mut self.tiga_k.kebersihan,
        }
    }
}

fn slot_error(list: &'static str, source: SlotOutOfRange) -> ReportError {
    ReportError::SlotOutOfRange { list, source }
}

fn validate_week(value: String) -> Result<String, ReportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    match trimmed.parse::<u32>() {
        Ok(week) if (1..=MAX_WEEK).contains(&week) => Ok(week.to_string()),
        _ => Err(ReportError::InvalidWeek(value)),
    }
}

fn validate_date(field: &'static str, value: String) -> Result<String, ReportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| ReportError::InvalidDate { field, value })
}

fn validate_count(field: &'static str, value: String) -> Result<String, ReportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    trimmed
        .parse::<u32>()
        .map(|count| count.to_string())
        .map_err(|_| ReportError::InvalidCount { field, value })
}

/// Empty clears the pick; anything else must already be on the roster.
fn validate_teacher(value: String, roster: &Roster) -> Result<String, ReportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if roster.contains(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ReportError::UnknownTeacher(value))
    }
}
