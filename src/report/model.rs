//! The daily duty-teacher report.
//!
//! Field names follow the JSON the form has always persisted, so older
//! report bodies still decode.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::slots::SlotList;
use crate::roster::model::RosterResponse;

pub const TEACHER_SLOTS: usize = 8;
pub const ABSENT_SLOTS: usize = 8;
pub const VISITOR_SLOTS: usize = 4;
/// Highest selectable school week.
pub const MAX_WEEK: u32 = 45;

/// General four-step rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum Tahap {
    Cemerlang,
    #[default]
    Baik,
    Sederhana,
    Lemah,
}

/// Canteen food quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum KualitiMakanan {
    #[serde(rename = "Bermutu Tinggi")]
    BermutuTinggi,
    #[default]
    Sederhana,
    Rendah,
}

/// Toilet cleanliness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum TahapTandas {
    Cemerlang,
    #[default]
    Memuaskan,
    #[serde(alias = "Tidak Memuaskan")]
    Lemah,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Hari {
    Ahad,
    Isnin,
    Selasa,
    Rabu,
    Khamis,
    Jumaat,
    Sabtu,
}

impl fmt::Display for Tahap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cemerlang => "Cemerlang",
            Self::Baik => "Baik",
            Self::Sederhana => "Sederhana",
            Self::Lemah => "Lemah",
        };
        f.write_str(label)
    }
}

impl fmt::Display for KualitiMakanan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BermutuTinggi => "Bermutu Tinggi",
            Self::Sederhana => "Sederhana",
            Self::Rendah => "Rendah",
        };
        f.write_str(label)
    }
}

impl fmt::Display for TahapTandas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cemerlang => "Cemerlang",
            Self::Memuaskan => "Memuaskan",
            Self::Lemah => "Lemah",
        };
        f.write_str(label)
    }
}

impl fmt::Display for Hari {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Perhimpunan {
    /// Speaker and main points of the assembly speech.
    pub isi_utama: String,
    pub komen: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Kantin {
    pub kebersihan: Tahap,
    pub komen_kebersihan: String,
    pub kualiti: KualitiMakanan,
    pub komen_kualiti: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Tandas {
    pub tahap: TahapTandas,
    pub komen: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Penilaian {
    pub tahap: Tahap,
    pub komen: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StatistikMurid {
    /// Number of latecomers.
    pub lewat: String,
    /// Students sent to the clinic or home early.
    pub klinik: String,
}

/// The "3K" block: safety, health, cleanliness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TigaK {
    pub keselamatan: Penilaian,
    pub kesihatan: Penilaian,
    pub kebersihan: Penilaian,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Disiplin {
    pub tahap: Tahap,
    pub komen: String,
    /// Serious cases; empty when there were none.
    pub kes_serius: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct KehadiranGuru {
    pub hadir: String,
    pub tidak_hadir: String,
    #[schema(value_type = Vec<String>)]
    pub senarai_tidak_hadir: SlotList<String, ABSENT_SLOTS>,
}

/// Visiting officer and the purpose of the visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Pelawat {
    pub nama: String,
    pub urusan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Report {
    /// School week, "1" to "45", or empty.
    #[schema(example = "7")]
    pub minggu: String,
    /// ISO date, or empty.
    #[schema(example = "2024-01-05")]
    pub tarikh: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub hari: Option<Hari>,
    /// On-duty teachers.
    #[schema(value_type = Vec<String>)]
    pub nama_guru: SlotList<String, TEACHER_SLOTS>,
    pub perhimpunan: Perhimpunan,
    pub kantin: Kantin,
    pub tandas: Tandas,
    pub persekitaran: Penilaian,
    pub statistik_murid: StatistikMurid,
    pub tiga_k: TigaK,
    pub disiplin: Disiplin,
    pub kehadiran_guru: KehadiranGuru,
    #[schema(value_type = Vec<Pelawat>)]
    pub pelawat: SlotList<Pelawat, VISITOR_SLOTS>,
    pub ulasan_catatan: String,
    /// Reporting teacher.
    pub nama_guru_pelapor: String,
    pub tarikh_laporan: String,
}

/// Older bodies store an unset day as `""`.
fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Hari>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Hari(Hari),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Hari(hari)) => Ok(Some(hari)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => Err(serde::de::Error::custom(format!(
            "unknown day '{}'",
            text
        ))),
        None => Ok(None),
    }
}

/// Everything the form needs on load.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormStateResponse {
    pub report: Report,
    pub roster: RosterResponse,
}
