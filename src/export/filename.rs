use crate::report::Report;

/// Placeholder when the week is not set.
pub const WEEK_PLACEHOLDER: &str = "X";
/// Placeholder when the date is not set.
pub const DATE_PLACEHOLDER: &str = "HARIAN";

/// `<prefix>_M<minggu>_<tarikh>.pdf`, with placeholders for empty fields.
pub fn export_filename(prefix: &str, report: &Report) -> String {
    let prefix = token(prefix, "LAPORAN");
    let week = token(&report.minggu, WEEK_PLACEHOLDER);
    let date = token(&report.tarikh, DATE_PLACEHOLDER);
    format!("{}_M{}_{}.pdf", prefix, week, date)
}

/// Keep only characters that are safe in a file name.
fn token(value: &str, fallback: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
        .collect();

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(minggu: &str, tarikh: &str) -> Report {
        Report {
            minggu: minggu.to_string(),
            tarikh: tarikh.to_string(),
            ..Report::default()
        }
    }

    #[test]
    fn test_filename_from_week_and_date() {
        assert_eq!(
            export_filename("LAPORAN_SKBE", &report("7", "2024-01-05")),
            "LAPORAN_SKBE_M7_2024-01-05.pdf"
        );
    }

    #[test]
    fn test_filename_placeholders() {
        assert_eq!(
            export_filename("LAPORAN_SKBE", &report("", "")),
            "LAPORAN_SKBE_MX_HARIAN.pdf"
        );
        assert_eq!(
            export_filename("LAPORAN_SKBE", &report("12", "")),
            "LAPORAN_SKBE_M12_HARIAN.pdf"
        );
    }

    #[test]
    fn test_filename_is_reproducible() {
        let r = report("3", "2024-02-01");
        assert_eq!(export_filename("P", &r), export_filename("P", &r));
    }

    #[test]
    fn test_filename_strips_unsafe_characters() {
        assert_eq!(
            export_filename("../LAPORAN SKBE", &report("7", "2024/01/05")),
            "LAPORANSKBE_M7_20240105.pdf"
        );
        assert_eq!(export_filename("  ", &report("", "")), "LAPORAN_MX_HARIAN.pdf");
    }
}
