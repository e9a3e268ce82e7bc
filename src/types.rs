use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Cold,
    Mild,
    Hot,
}

impl Season {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cold" => Some(Self::Cold),
            "mild" => Some(Self::Mild),
            "hot" => Some(Self::Hot),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cold => "cold",
            Self::Mild => "mild",
            Self::Hot => "hot",
        };
        f.write_str(s)
    }
}

/// One billing record as printed on the utility bill.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionPeriod {
    pub period: String,
    /// Abbreviated month name, e.g. `"Ene"` or `"Nov"`.
    pub month: String,
    pub year: i32,
    pub kwh: f64,
    /// Billed amount, tax included.
    pub amount: f64,
    pub days: u32,
    pub season: Season,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub estimated: bool,
}

/// Monthly kWh per season, normalized to a 30-day month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalAverages {
    pub cold: f64,
    pub mild: f64,
    pub hot: f64,
}

impl SeasonalAverages {
    pub fn get(&self, season: Season) -> f64 {
        match season {
            Season::Cold => self.cold,
            Season::Mild => self.mild,
            Season::Hot => self.hot,
        }
    }
}

/// Normalized yearly profile of a billing history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionAnalysis {
    pub period_count: usize,
    pub total_days: u32,
    pub avg_days_per_period: f64,
    pub total_kwh_year: f64,
    pub total_amount_year: f64,
    pub avg_monthly_kwh: f64,
    pub avg_daily_kwh: f64,
    pub avg_cost_per_kwh: f64,
    pub savable_cost_per_kwh: f64,
    pub savable_amount_year: f64,
    pub fixed_fee_year: f64,
    pub seasonal_avg: SeasonalAverages,
    /// Percent change of daily consumption between the oldest and newest record.
    pub growth_rate: f64,
    pub min_kwh: f64,
    pub max_kwh: f64,
    pub current_period: String,
    pub current_period_kwh: f64,
    pub current_period_amount: f64,
    pub current_period_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarSystemSpecs {
    /// Nominal capacity in kWp.
    pub capacity: f64,
    pub panels: u32,
    pub panel_wattage: f64,
    pub inverter_config: String,
    /// kWh per year.
    pub annual_generation: f64,
    /// Percent of yearly consumption covered; may exceed 100.
    pub coverage: f64,
    /// Roof area in m².
    pub area: u32,
    /// Tons of CO₂ per year.
    pub co2_avoided: f64,
    pub trees_equivalent: u32,
}

/// When the investment is recovered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Payback {
    Years(f64),
    /// Not recovered within the projection horizon.
    BeyondHorizon { horizon: usize },
}

impl Payback {
    pub fn years(&self) -> Option<f64> {
        match self {
            Self::Years(y) => Some(*y),
            Self::BeyondHorizon { .. } => None,
        }
    }
}

impl fmt::Display for Payback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Years(y) => write!(f, "{y:.1}"),
            Self::BeyondHorizon { horizon } => write!(f, "> {horizon}"),
        }
    }
}

/// Outcome of the IRR root search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IrrStatus {
    Converged,
    /// Iteration budget exhausted; the last midpoint is reported.
    MaxIters,
    /// The discounted sum has the same sign at both ends of the bracket;
    /// the rate is clamped to the nearer end.
    NoSignChange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProjectionYear {
    pub year: usize,
    pub generation: f64,
    pub savings: f64,
    pub cfe_without_solar: f64,
    pub cumulative: f64,
    pub cfe_cumulative: f64,
    /// Cumulative position as a percent of the total cost.
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAnalysis {
    pub base_cost: f64,
    pub iva: f64,
    pub total_cost: f64,
    pub isr_deduction: f64,
    pub net_cost: f64,
    pub annual_savings: f64,
    pub payback: Payback,
    /// Rows for years `0..=horizon`, indexed by year.
    pub projection: Vec<FinancialProjectionYear>,
    pub total_savings: f64,
    pub total_cfe_cost: f64,
    /// Internal rate of return, percent.
    pub irr: f64,
    pub irr_status: IrrStatus,
    pub npv: f64,
    /// Undiscounted total return over the horizon, percent.
    pub roi25: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub colony: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub service_number: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub tariff: String,
    #[serde(default)]
    pub tariff_name: String,
    #[serde(default)]
    pub meter_number: String,
    #[serde(default)]
    pub current_period: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub cutoff_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemDefaults {
    pub system_size: Option<f64>,
    pub inflation_rate: Option<f64>,
}

/// A diagnosis file as produced by the upstream intake tooling.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisFile {
    pub client: ClientData,
    pub consumption: Vec<ConsumptionPeriod>,
    #[serde(default)]
    pub system_defaults: Option<SystemDefaults>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillComponent {
    pub name: String,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillBreakdown {
    pub subtotal_energy: f64,
    pub iva: f64,
    pub dap: f64,
    pub fixed_fee: f64,
    pub total: f64,
    pub components: Vec<BillComponent>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ConsumptionRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Season")]
    #[tabled(rename = "Season")]
    pub season: String,
    #[serde(rename = "Days")]
    #[tabled(rename = "Days")]
    pub days: u32,
    #[serde(rename = "kWh")]
    #[tabled(rename = "kWh")]
    pub kwh: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "DailyKwh")]
    #[tabled(rename = "DailyKwh")]
    pub daily_kwh: String,
    #[serde(rename = "CostPerKwh")]
    #[tabled(rename = "CostPerKwh")]
    pub cost_per_kwh: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct FieldRow {
    #[serde(rename = "Field")]
    #[tabled(rename = "Field")]
    pub field: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProjectionRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: usize,
    #[serde(rename = "Generation")]
    #[tabled(rename = "Generation")]
    pub generation: String,
    #[serde(rename = "Savings")]
    #[tabled(rename = "Savings")]
    pub savings: String,
    #[serde(rename = "CfeWithoutSolar")]
    #[tabled(rename = "CfeWithoutSolar")]
    pub cfe_without_solar: String,
    #[serde(rename = "Cumulative")]
    #[tabled(rename = "Cumulative")]
    pub cumulative: String,
    #[serde(rename = "CfeCumulative")]
    #[tabled(rename = "CfeCumulative")]
    pub cfe_cumulative: String,
    #[serde(rename = "ROI")]
    #[tabled(rename = "ROI")]
    pub roi: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub client: String,
    pub generated_at: String,
    pub capacity_kwp: f64,
    pub panels: u32,
    pub inverter: String,
    pub annual_generation_kwh: f64,
    pub coverage_pct: f64,
    pub total_cost: f64,
    pub net_cost: f64,
    pub annual_savings: f64,
    pub payback_years: String,
    pub irr_pct: f64,
    pub npv: f64,
    pub roi_25_pct: f64,
    pub total_savings: f64,
    pub total_cfe_cost: f64,
    pub co2_avoided_tons: f64,
    pub trees_equivalent: u32,
}
