// Entry point and interactive menu.
//
// - Option [1] loads a diagnosis (JSON) or a bare billing history (CSV).
// - Option [2] writes the report tables and a JSON summary.
// - Options [3] and [4] change the system size or tariff inflation and
//   recompute everything.
//
// Usage: solar_report [diagnosis.json|history.csv] [engine_config.json]
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;
use once_cell::sync::Lazy;
use tracing::error;
use tracing_subscriber::EnvFilter;

use solar_report::loader::{load_diagnosis, load_history_csv};
use solar_report::types::{ClientData, DiagnosisFile};
use solar_report::util::{format_int, format_number, parse_f64_safe};
use solar_report::{output, reports, Diagnosis, EngineConfig};

const DEFAULT_DIAGNOSIS: &str = "data/sample_diagnosis.json";

// In-memory session so the file is loaded once but reports can be
// regenerated after each adjustment.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        config: EngineConfig::default(),
        diagnosis: None,
    })
});

struct AppState {
    config: EngineConfig,
    diagnosis: Option<Diagnosis>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Prints `label` and reads one trimmed line. Returns `None` once the input
/// is closed or unreadable.
fn prompt(input: &mut impl BufRead, label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_choice(input: &mut impl BufRead) -> Option<String> {
    prompt(input, "Enter choice: ")
}

/// Ask whether to return to the menu after generating reports. Closed input
/// counts as "N".
fn prompt_back_to_menu(input: &mut impl BufRead) -> bool {
    loop {
        let Some(answer) = prompt(input, "Back to menu (Y/N): ") else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn read_diagnosis_file(path: &str) -> solar_report::Result<DiagnosisFile> {
    let is_csv = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return load_diagnosis(path);
    }

    let (consumption, report) = load_history_csv(path)?;
    println!(
        "Read {} billing rows ({} loaded, {} skipped).",
        format_int(report.total_rows),
        format_int(report.loaded_rows),
        format_int(report.parse_errors)
    );
    let name = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(DiagnosisFile {
        client: ClientData {
            name: name.clone(),
            short_name: name,
            ..ClientData::default()
        },
        consumption,
        system_defaults: None,
    })
}

/// Handle option [1]: load and analyze the diagnosis.
fn handle_load(path: &str) {
    let mut state = state();
    let loaded = read_diagnosis_file(path)
        .and_then(|file| Diagnosis::from_file(file, &state.config));
    match loaded {
        Ok(diagnosis) => {
            let a = &diagnosis.analysis;
            println!(
                "Loaded {} ({} periods, {} kWh/year, average ${}/kWh)",
                diagnosis.client.name,
                a.period_count,
                format_number(a.total_kwh_year, 0),
                format_number(a.avg_cost_per_kwh, 2)
            );
            println!(
                "Recommended system: {} kWp (selected {} kWp, inflation {}%)\n",
                format_number(diagnosis.recommended_capacity, 1),
                format_number(diagnosis.capacity(), 1),
                format_number(diagnosis.inflation_rate_pct(), 1)
            );
            state.diagnosis = Some(diagnosis);
        }
        Err(e) => {
            error!(error = %e, path, "failed to load diagnosis");
            eprintln!("Failed to load {}: {}\n", path, e);
        }
    }
}

fn export<T: serde::Serialize>(path: &str, rows: &[T]) {
    if let Err(e) = output::write_csv(path, rows) {
        error!(error = %e, path, "failed to write report");
        eprintln!("Write error: {}", e);
    }
}

/// Handle option [2]: print previews and write every report file.
fn handle_generate_reports() {
    let state = state();
    let Some(diagnosis) = state.diagnosis.as_ref() else {
        println!("Error: No diagnosis loaded. Please load a file first (option 1).\n");
        return;
    };

    println!("Generating reports for {}...\n", diagnosis.client.name);

    let consumption = reports::consumption_rows(&diagnosis.consumption);
    export("report1_consumption_history.csv", &consumption);
    output::preview_table("Report 1: Consumption History", None, &consumption, consumption.len());
    let analysis = reports::analysis_rows(&diagnosis.analysis);
    output::preview_table("Normalized Yearly Profile", None, &analysis, analysis.len());

    let bill = reports::bill_rows(&diagnosis.bill);
    export("report2_bill_breakdown.csv", &bill);
    output::preview_table(
        "Report 2: Current Bill Breakdown",
        Some(diagnosis.analysis.current_period.as_str()),
        &bill,
        bill.len(),
    );

    let system = reports::system_rows(diagnosis.specs());
    export("report3_system.csv", &system);
    output::preview_table("Report 3: Recommended System", None, &system, system.len());

    let f = diagnosis.financials();
    let investment = reports::investment_rows(f);
    export("report4_investment.csv", &investment);
    output::preview_table("Report 4: Investment and Returns", None, &investment, investment.len());

    let projection = reports::projection_rows(f, None);
    let file = "report5_projection.csv";
    export(file, &projection);
    output::preview_table(
        "Report 5: Cash-Flow Projection",
        Some("First 10 years"),
        &projection,
        11,
    );
    println!("(Full {}-year table exported to {})\n", projection.len() - 1, file);

    let summary = reports::generate_summary(diagnosis, &Local::now());
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"payback_years\": \"{}\", \"irr_pct\": {}, \"total_savings\": {}}}\n",
        summary.payback_years,
        format_number(summary.irr_pct, 1),
        format_number(summary.total_savings, 0)
    );
}

/// Handle options [3] and [4]: read a number and recompute.
fn handle_adjust(
    input: &mut impl BufRead,
    label: &str,
    apply: fn(&mut Diagnosis, f64, &EngineConfig),
) {
    let mut state = state();
    let AppState { config, diagnosis } = &mut *state;
    let Some(diagnosis) = diagnosis.as_mut() else {
        println!("Error: No diagnosis loaded. Please load a file first (option 1).\n");
        return;
    };
    let Some(line) = prompt(input, label) else {
        return;
    };
    let Some(value) = parse_f64_safe(Some(line.as_str())) else {
        println!("Invalid number.\n");
        return;
    };
    apply(diagnosis, value, config);
    println!(
        "System {} kWp at {}% inflation: payback {} years, IRR {}%\n",
        format_number(diagnosis.capacity(), 1),
        format_number(diagnosis.inflation_rate_pct(), 1),
        diagnosis.financials().payback,
        format_number(diagnosis.financials().irr, 1)
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let diagnosis_path = args.next().unwrap_or_else(|| DEFAULT_DIAGNOSIS.to_string());
    if let Some(config_path) = args.next() {
        match EngineConfig::load(&config_path) {
            Ok(config) => state().config = config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", config_path, e);
                return;
            }
        }
    }

    run_menu(&mut io::stdin().lock(), &diagnosis_path);
}

/// Runs the menu until the user exits or `input` is closed.
fn run_menu(input: &mut impl BufRead, diagnosis_path: &str) {
    loop {
        println!("Solar Diagnostic Report");
        println!("[1] Load diagnosis ({})", diagnosis_path);
        println!("[2] Generate reports");
        println!("[3] Change system size (kWp)");
        println!("[4] Change tariff inflation (%)");
        println!("[5] Exit\n");
        let Some(choice) = read_choice(input) else {
            println!("Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(diagnosis_path),
            "2" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu(input) {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => handle_adjust(input, "System size (kWp): ", Diagnosis::set_capacity),
            "4" => handle_adjust(input, "Inflation (%): ", Diagnosis::set_inflation),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-5.\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    #[test]
    fn prompt_returns_none_at_end_of_input() {
        let mut input = Cursor::new("  7 \n");
        assert_eq!(prompt(&mut input, "").as_deref(), Some("7"));
        assert_eq!(prompt(&mut input, ""), None);
        assert_eq!(prompt(&mut input, ""), None);
    }

    #[test]
    fn back_to_menu_is_no_when_input_closes() {
        assert!(!prompt_back_to_menu(&mut Cursor::new("")));
        assert!(!prompt_back_to_menu(&mut Cursor::new("maybe\n")));
        assert!(prompt_back_to_menu(&mut Cursor::new("y\n")));
    }

    #[test]
    fn menu_exits_when_input_closes() {
        run_menu(&mut Cursor::new(""), DEFAULT_DIAGNOSIS);
        // Invalid choices and an unanswered size prompt, then end of input.
        run_menu(&mut Cursor::new("9\n\n3\n"), DEFAULT_DIAGNOSIS);
    }
}
