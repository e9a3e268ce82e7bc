// A client's diagnosis: billing history, its analysis, and the system and
// finances for the currently selected capacity and inflation.
//
// Changing either input recomputes specs and finances from scratch.
use tracing::debug;

use crate::analyzer::analyze;
use crate::billing;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::projector::project;
use crate::sizer::{describe_system, recommend_capacity};
use crate::types::{
    BillBreakdown, ClientData, ConsumptionAnalysis, ConsumptionPeriod, DiagnosisFile,
    FinancialAnalysis, SolarSystemSpecs,
};

#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub client: ClientData,
    pub consumption: Vec<ConsumptionPeriod>,
    pub analysis: ConsumptionAnalysis,
    pub bill: BillBreakdown,
    pub recommended_capacity: f64,
    capacity: f64,
    inflation_rate_pct: f64,
    specs: SolarSystemSpecs,
    financials: FinancialAnalysis,
}

impl Diagnosis {
    /// Builds a diagnosis from a loaded file. A missing or zero system size
    /// falls back to the recommended capacity; a missing or zero inflation
    /// rate falls back to the config default.
    pub fn from_file(file: DiagnosisFile, config: &EngineConfig) -> Result<Self> {
        let defaults = file.system_defaults.unwrap_or_default();
        let analysis = analyze(&file.consumption, config)?;
        let recommended_capacity = recommend_capacity(&analysis, config);

        let capacity = defaults
            .system_size
            .filter(|size| size.is_finite() && *size > 0.0)
            .unwrap_or(recommended_capacity);
        let inflation_rate_pct = defaults
            .inflation_rate
            .filter(|rate| rate.is_finite() && *rate != 0.0)
            .unwrap_or(config.default_inflation_rate_pct);

        let bill = billing::breakdown(&analysis, config);
        let specs = describe_system(capacity, Some(&analysis), config);
        let financials = project(capacity, &specs, inflation_rate_pct, Some(&analysis), config);

        debug!(
            client = %file.client.name,
            recommended_capacity,
            capacity,
            inflation_rate_pct,
            "built diagnosis"
        );

        Ok(Self {
            client: file.client,
            consumption: file.consumption,
            analysis,
            bill,
            recommended_capacity,
            capacity,
            inflation_rate_pct,
            specs,
            financials,
        })
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn inflation_rate_pct(&self) -> f64 {
        self.inflation_rate_pct
    }

    pub fn specs(&self) -> &SolarSystemSpecs {
        &self.specs
    }

    pub fn financials(&self) -> &FinancialAnalysis {
        &self.financials
    }

    /// Selects a new capacity in kWp. Negative or non-finite values become 0.
    pub fn set_capacity(&mut self, capacity: f64, config: &EngineConfig) {
        self.capacity = if capacity.is_finite() { capacity.max(0.0) } else { 0.0 };
        self.recompute(config);
    }

    /// Selects a new yearly tariff inflation in percent. Non-finite values
    /// are ignored.
    pub fn set_inflation(&mut self, inflation_rate_pct: f64, config: &EngineConfig) {
        if inflation_rate_pct.is_finite() {
            self.inflation_rate_pct = inflation_rate_pct;
            self.recompute(config);
        }
    }

    fn recompute(&mut self, config: &EngineConfig) {
        self.specs = describe_system(self.capacity, Some(&self.analysis), config);
        self.financials = project(
            self.capacity,
            &self.specs,
            self.inflation_rate_pct,
            Some(&self.analysis),
            config,
        );
    }
}
