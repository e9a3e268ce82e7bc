use std::path::Path;

use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::error::{Error, Result};

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|e| Error::io(path.as_ref(), e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path.as_ref(), s).map_err(|e| Error::io(path.as_ref(), e))?;
    Ok(())
}

/// Renders up to `max_rows` rows as a markdown table.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::FieldRow;

    fn rows() -> Vec<FieldRow> {
        vec![
            FieldRow {
                field: "Capacity (kWp)".to_string(),
                value: "17.6".to_string(),
            },
            FieldRow {
                field: "Panels".to_string(),
                value: "32 × 550 W".to_string(),
            },
        ]
    }

    #[test]
    fn renders_markdown_with_headers() {
        let table = render_table(&rows(), 10);
        assert!(table.contains("| Field"));
        assert!(table.contains("Capacity (kWp)"));
        assert!(table.contains("32 × 550 W"));
    }

    #[test]
    fn truncates_to_max_rows() {
        let table = render_table(&rows(), 1);
        assert!(table.contains("Capacity (kWp)"));
        assert!(!table.contains("Panels"));
        assert_eq!(render_table::<FieldRow>(&[], 5), "(no rows)");
    }

    #[test]
    fn writes_csv_and_json() {
        let dir = std::env::temp_dir().join(format!("solar_report_output_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");

        let csv_path = dir.join("fields.csv");
        write_csv(&csv_path, &rows()).expect("should write csv");
        let csv = std::fs::read_to_string(&csv_path).expect("should read csv");
        assert!(csv.starts_with("Field,Value\n"));
        assert!(csv.contains("Panels,32 × 550 W"));

        let json_path = dir.join("fields.json");
        write_json(&json_path, &rows()).expect("should write json");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).expect("should read json"))
                .expect("valid json");
        assert_eq!(json[1]["Field"], "Panels");

        std::fs::remove_dir_all(&dir).ok();
    }
}
