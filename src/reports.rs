// Display rows for the report tables.
//
// This is the only place numbers become strings; the engine hands over
// plain numeric values.
use chrono::{DateTime, TimeZone};

use crate::billing;
use crate::diagnosis::Diagnosis;
use crate::types::{
    BillBreakdown, ConsumptionAnalysis, ConsumptionPeriod, ConsumptionRow, FieldRow,
    FinancialAnalysis, ProjectionRow, Season, SolarSystemSpecs, SummaryStats,
};
use crate::util::{format_currency, format_int, format_number, ratio_or_zero};

fn field(name: &str, value: String) -> FieldRow {
    FieldRow {
        field: name.to_string(),
        value,
    }
}

pub fn consumption_rows(periods: &[ConsumptionPeriod]) -> Vec<ConsumptionRow> {
    periods
        .iter()
        .map(|p| {
            let mut period = p.period.clone();
            if p.current {
                period.push_str(" (current)");
            }
            if p.estimated {
                period.push_str(" (est.)");
            }
            ConsumptionRow {
                period,
                season: p.season.to_string(),
                days: p.days,
                kwh: format_number(p.kwh, 0),
                amount: format_currency(p.amount),
                daily_kwh: format_number(ratio_or_zero(p.kwh, f64::from(p.days)), 1),
                cost_per_kwh: format_number(ratio_or_zero(p.amount, p.kwh), 2),
            }
        })
        .collect()
}

pub fn analysis_rows(a: &ConsumptionAnalysis) -> Vec<FieldRow> {
    let mut rows = vec![
        field("Periods analyzed", format!("{} ({} days)", a.period_count, format_int(a.total_days))),
        field("Yearly consumption (kWh)", format_number(a.total_kwh_year, 0)),
        field("Yearly billing", format_currency(a.total_amount_year)),
        field("Average monthly (kWh)", format_number(a.avg_monthly_kwh, 0)),
        field("Average cost per kWh", format_number(a.avg_cost_per_kwh, 2)),
        field("Savable cost per kWh", format_number(a.savable_cost_per_kwh, 2)),
        field("Savable yearly billing", format_currency(a.savable_amount_year)),
        field("Fixed fees per year", format_currency(a.fixed_fee_year)),
    ];
    for season in [Season::Cold, Season::Mild, Season::Hot] {
        rows.push(field(
            &format!("Monthly kWh ({season})"),
            format_number(a.seasonal_avg.get(season), 0),
        ));
    }
    rows.push(field("Consumption growth", format!("{}%", format_number(a.growth_rate, 1))));
    rows.push(field(
        "Range per period (kWh)",
        format!("{} – {}", format_number(a.min_kwh, 0), format_number(a.max_kwh, 0)),
    ));
    rows
}

pub fn system_rows(s: &SolarSystemSpecs) -> Vec<FieldRow> {
    vec![
        field("Capacity (kWp)", format_number(s.capacity, 1)),
        field("Panels", format!("{} × {} W", s.panels, format_number(s.panel_wattage, 0))),
        field("Inverter", s.inverter_config.clone()),
        field("Yearly generation (kWh)", format_number(s.annual_generation, 0)),
        field("Coverage", format!("{}%", format_number(s.coverage, 1))),
        field("Roof area (m²)", format_int(s.area)),
        field("CO₂ avoided (t/yr)", format_number(s.co2_avoided, 1)),
        field("Trees equivalent", format_int(s.trees_equivalent)),
    ]
}

pub fn investment_rows(f: &FinancialAnalysis) -> Vec<FieldRow> {
    vec![
        field("Base cost", format_currency(f.base_cost)),
        field("IVA", format_currency(f.iva)),
        field("Total cost", format_currency(f.total_cost)),
        field("ISR deduction", format_currency(f.isr_deduction)),
        field("Net cost", format_currency(f.net_cost)),
        field("Year-1 savings", format_currency(f.annual_savings)),
        field("Payback (years)", f.payback.to_string()),
        field("IRR", format!("{}%", format_number(f.irr, 1))),
        field("NPV", format_currency(f.npv)),
        field("25-year ROI", format!("{}%", format_number(f.roi25, 0))),
        field("Total savings", format_currency(f.total_savings)),
        field("Total cost without solar", format_currency(f.total_cfe_cost)),
    ]
}

pub fn bill_rows(b: &BillBreakdown) -> Vec<FieldRow> {
    let mut rows: Vec<FieldRow> = b
        .components
        .iter()
        .map(|c| {
            field(
                &c.name,
                format!("{} ({}%)", format_currency(c.value), format_number(c.percentage, 1)),
            )
        })
        .collect();
    rows.push(field("Subtotal", format_currency(b.subtotal_energy)));
    rows.push(field("IVA", format_currency(b.iva)));
    rows.push(field("DAP (not offsettable)", format_currency(b.dap)));
    rows.push(field("Fixed fee (not offsettable)", format_currency(b.fixed_fee)));
    rows.push(field("Total", format_currency(b.total)));
    rows.push(field("Offsettable by solar", format_currency(billing::savable_current_amount(b))));
    rows
}

/// Projection rows for years `0..=years`, or the whole horizon when `years`
/// is `None`.
pub fn projection_rows(f: &FinancialAnalysis, years: Option<usize>) -> Vec<ProjectionRow> {
    let end = years.map_or(f.projection.len(), |y| (y + 1).min(f.projection.len()));
    f.projection[..end]
        .iter()
        .map(|row| ProjectionRow {
            year: row.year,
            generation: format_number(row.generation, 0),
            savings: format_currency(row.savings),
            cfe_without_solar: format_currency(row.cfe_without_solar),
            cumulative: format_currency(row.cumulative),
            cfe_cumulative: format_currency(row.cfe_cumulative),
            roi: format!("{}%", format_number(row.roi, 0)),
        })
        .collect()
}

pub fn generate_summary<Tz>(diagnosis: &Diagnosis, generated_at: &DateTime<Tz>) -> SummaryStats
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let specs = diagnosis.specs();
    let f = diagnosis.financials();
    SummaryStats {
        client: diagnosis.client.name.clone(),
        generated_at: generated_at.to_rfc3339(),
        capacity_kwp: specs.capacity,
        panels: specs.panels,
        inverter: specs.inverter_config.clone(),
        annual_generation_kwh: specs.annual_generation.round(),
        coverage_pct: round_to(specs.coverage, 1),
        total_cost: f.total_cost.round(),
        net_cost: f.net_cost.round(),
        annual_savings: f.annual_savings.round(),
        payback_years: f.payback.to_string(),
        irr_pct: round_to(f.irr, 1),
        npv: f.npv.round(),
        roi_25_pct: f.roi25.round(),
        total_savings: f.total_savings.round(),
        total_cfe_cost: f.total_cfe_cost.round(),
        co2_avoided_tons: round_to(specs.co2_avoided, 1),
        trees_equivalent: specs.trees_equivalent,
    }
}

fn round_to(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round() / scale
}
