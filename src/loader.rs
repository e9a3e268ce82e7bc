use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{ConsumptionPeriod, DiagnosisFile, Season};
use crate::util::{parse_bool_safe, parse_f64_safe, parse_i32_safe};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// One CSV row before validation. Every cell is optional text so a single
/// bad cell skips the row instead of failing the whole file.
#[derive(Debug, Deserialize)]
struct RawRow {
    period: Option<String>,
    month: Option<String>,
    year: Option<String>,
    kwh: Option<String>,
    amount: Option<String>,
    days: Option<String>,
    season: Option<String>,
    current: Option<String>,
    estimated: Option<String>,
}

/// Reads a diagnosis JSON file and checks that every billing record is
/// usable by the analyzer.
pub fn load_diagnosis(path: impl AsRef<Path>) -> Result<DiagnosisFile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let diagnosis = parse_diagnosis(&content)?;
    info!(
        path = %path.display(),
        client = %diagnosis.client.name,
        periods = diagnosis.consumption.len(),
        "loaded diagnosis"
    );
    Ok(diagnosis)
}

pub fn parse_diagnosis(json: &str) -> Result<DiagnosisFile> {
    let diagnosis: DiagnosisFile = serde_json::from_str(json)?;
    for (index, period) in diagnosis.consumption.iter().enumerate() {
        validate_period(period).map_err(|reason| Error::InvalidRecord { index, reason })?;
    }
    Ok(diagnosis)
}

fn validate_period(period: &ConsumptionPeriod) -> std::result::Result<(), &'static str> {
    if period.days == 0 {
        return Err("billing period has zero days");
    }
    if !(period.kwh.is_finite() && period.kwh >= 0.0) {
        return Err("kWh must be finite and non-negative");
    }
    if !(period.amount.is_finite() && period.amount >= 0.0) {
        return Err("amount must be finite and non-negative");
    }
    Ok(())
}

/// Reads a billing history from CSV with the header
/// `period,month,year,kwh,amount,days,season,current,estimated`.
///
/// Rows that cannot be parsed or fail validation are skipped and counted
/// in the returned [`LoadReport`].
pub fn load_history_csv(path: impl AsRef<Path>) -> Result<(Vec<ConsumptionPeriod>, LoadReport)> {
    let path = path.as_ref();
    let rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    read_history(rdr)
}

pub fn parse_history_csv(data: &str) -> Result<(Vec<ConsumptionPeriod>, LoadReport)> {
    let rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());
    read_history(rdr)
}

fn read_history<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
) -> Result<(Vec<ConsumptionPeriod>, LoadReport)> {
    let mut report = LoadReport::default();
    let mut periods = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, row = report.total_rows, "skipping unreadable row");
                report.parse_errors += 1;
                continue;
            }
        };
        match clean_row(row) {
            Some(period) => periods.push(period),
            None => report.parse_errors += 1,
        }
    }

    report.loaded_rows = periods.len();
    Ok((periods, report))
}

fn clean_row(row: RawRow) -> Option<ConsumptionPeriod> {
    let month = row.month?.trim().to_string();
    let year = parse_i32_safe(row.year.as_deref())?;
    let kwh = parse_f64_safe(row.kwh.as_deref())?;
    let amount = parse_f64_safe(row.amount.as_deref())?;
    let days = parse_i32_safe(row.days.as_deref())?;
    let season = Season::parse(row.season.as_deref()?)?;

    let period = ConsumptionPeriod {
        period: row
            .period
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| format!("{} {:02}", month, year.rem_euclid(100))),
        month,
        year,
        kwh,
        amount,
        days: u32::try_from(days).ok()?,
        season,
        current: parse_bool_safe(row.current.as_deref()),
        estimated: parse_bool_safe(row.estimated.as_deref()),
    };
    validate_period(&period).ok()?;
    Some(period)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "client": { "name": "REZA SANMARTIN ISIDRO ADOLFO", "shortName": "Adolfo Reza", "tariff": "PDBT" },
        "consumption": [
            { "period": "Nov 25", "month": "Nov", "year": 2025, "kwh": 4251, "amount": 22201, "days": 59, "season": "mild", "current": true },
            { "period": "Sep 25", "month": "Sep", "year": 2025, "kwh": 4154, "amount": 21842, "days": 60, "season": "hot" }
        ],
        "systemDefaults": { "inflationRate": 6 }
    }"#;

    #[test]
    fn parses_diagnosis_json() {
        let diagnosis = parse_diagnosis(SAMPLE).expect("should parse");

        assert_eq!(diagnosis.client.short_name, "Adolfo Reza");
        assert_eq!(diagnosis.client.city, "");
        assert_eq!(diagnosis.consumption.len(), 2);
        assert!(diagnosis.consumption[0].current);
        assert!(!diagnosis.consumption[1].current);
        assert_eq!(diagnosis.consumption[1].season, Season::Hot);

        let defaults = diagnosis.system_defaults.expect("has defaults");
        assert_eq!(defaults.system_size, None);
        assert_eq!(defaults.inflation_rate, Some(6.0));
    }

    #[test]
    fn rejects_zero_day_record() {
        let json = SAMPLE.replace("\"days\": 60", "\"days\": 0");
        let result = parse_diagnosis(&json);
        assert!(matches!(result, Err(Error::InvalidRecord { index: 1, .. })));
    }

    #[test]
    fn rejects_unknown_season() {
        let json = SAMPLE.replace("\"hot\"", "\"rainy\"");
        assert!(matches!(parse_diagnosis(&json), Err(Error::Json(_))));
    }

    #[test]
    fn reads_csv_history_and_counts_bad_rows() {
        let csv = "\
period,month,year,kwh,amount,days,season,current,estimated
Nov 25,Nov,2025,\"4,251\",\"22,201\",59,mild,true,
,Sep,2025,4154,21842,60,hot,,
Jul 25,Jul,2025,10261,41766,0,hot,,
Mar 25,Mar,2025,abc,12019,29,mild,,
Feb 25,Feb,2025,1867,9647,33,winter,,
";
        let (periods, report) = parse_history_csv(csv).expect("should read");

        assert_eq!(report.total_rows, 5);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.parse_errors, 3);

        assert_eq!(periods[0].kwh, 4251.0);
        assert!(periods[0].current);
        assert_eq!(periods[1].period, "Sep 25");
        assert!(!periods[1].current);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_diagnosis("no/such/diagnosis.json");
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
