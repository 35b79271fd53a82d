//! Export counters, kept in the default Prometheus registry.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

use crate::export::ExportAction;

lazy_static! {
    pub static ref EXPORTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "laporan_exports_total",
        "Export runs by action and outcome",
        &["action", "outcome"]
    )
    .expect("Failed to register laporan_exports_total");
}

pub fn record_export(action: ExportAction, outcome: &str) {
    EXPORTS_TOTAL
        .with_label_values(&[action.as_str(), outcome])
        .inc();
}

pub fn export_count(action: ExportAction, outcome: &str) -> u64 {
    EXPORTS_TOTAL
        .with_label_values(&[action.as_str(), outcome])
        .get()
}

/// Text exposition of the default registry.
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_export_increments() {
        let before = export_count(ExportAction::Save, "not_ready");
        record_export(ExportAction::Save, "not_ready");
        assert!(export_count(ExportAction::Save, "not_ready") > before);
        assert!(render().unwrap().contains("laporan_exports_total"));
    }
}
