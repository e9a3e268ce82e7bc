use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use solar_report::loader::load_diagnosis;
use solar_report::output::render_table;
use solar_report::types::Payback;
use solar_report::{reports, Diagnosis, EngineConfig};

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample_diagnosis.json")
}

fn sample_diagnosis() -> Diagnosis {
    let file = load_diagnosis(sample_path()).expect("sample should load");
    Diagnosis::from_file(file, &EngineConfig::default()).expect("sample should analyze")
}

#[test]
fn sample_diagnosis_end_to_end() {
    let diagnosis = sample_diagnosis();

    assert_eq!(diagnosis.client.short_name, "Adolfo Reza");
    assert_eq!(diagnosis.consumption.len(), 9);
    assert_eq!(diagnosis.analysis.current_period, "Nov 25");
    assert_eq!(diagnosis.recommended_capacity, 14.0);
    assert_eq!(diagnosis.capacity(), 14.0);
    assert_eq!(diagnosis.specs().panels, 26);
    assert_eq!(diagnosis.financials().projection.len(), 26);
    assert!(matches!(diagnosis.financials().payback, Payback::Years(_)));
    assert_eq!(diagnosis.bill.total, 22_201.0);
}

#[test]
fn report_tables_render() {
    let diagnosis = sample_diagnosis();

    let consumption = reports::consumption_rows(&diagnosis.consumption);
    assert_eq!(consumption.len(), 9);
    assert_eq!(consumption[0].period, "Nov 25 (current)");
    assert_eq!(consumption[0].kwh, "4,251");
    assert_eq!(consumption[0].amount, "$22,201");

    let first_ten = reports::projection_rows(diagnosis.financials(), Some(10));
    assert_eq!(first_ten.len(), 11);
    assert_eq!(first_ten.last().map(|r| r.year), Some(10));

    let table = render_table(&reports::system_rows(diagnosis.specs()), 20);
    assert!(table.contains("26 × 550 W"));
    assert!(table.contains("1 × 15 kW Trifásico"));
}

#[test]
fn summary_serializes() {
    let diagnosis = sample_diagnosis();
    let at = Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).single().expect("valid time");

    let summary = reports::generate_summary(&diagnosis, &at);
    let json = serde_json::to_value(&summary).expect("should serialize");

    assert_eq!(json["client"], "REZA SANMARTIN ISIDRO ADOLFO");
    assert_eq!(json["generated_at"], "2025-11-20T12:00:00+00:00");
    assert_eq!(json["panels"], 26);
    assert_eq!(json["payback_years"], diagnosis.financials().payback.to_string());
}

#[test]
fn csv_history_matches_json_sample() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample_history.csv");
    let (periods, report) =
        solar_report::loader::load_history_csv(path).expect("sample csv should load");

    assert_eq!(report.total_rows, 9);
    assert_eq!(report.parse_errors, 0);
    assert_eq!(periods, sample_diagnosis().consumption);
}
