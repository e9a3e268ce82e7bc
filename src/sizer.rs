// Photovoltaic array sizing.
use tracing::debug;

use crate::config::EngineConfig;
use crate::types::{ConsumptionAnalysis, SolarSystemSpecs};
use crate::util::{ratio_or_zero, round_half_up};

/// Capacity in kWp that covers the yearly consumption, rounded to the
/// nearest 0.5 kWp (halves round up).
pub fn recommend_capacity(analysis: &ConsumptionAnalysis, config: &EngineConfig) -> f64 {
    let optimal = ratio_or_zero(analysis.total_kwh_year, config.kwh_per_kwp_year());
    round_half_up(optimal * 2.0) / 2.0
}

/// Describes an array of `capacity` kWp.
///
/// Coverage is measured against the yearly consumption of `analysis`. With
/// no analysis the array is assumed to cover exactly what it produces, so
/// coverage is 100% for any non-zero capacity.
pub fn describe_system(
    capacity: f64,
    analysis: Option<&ConsumptionAnalysis>,
    config: &EngineConfig,
) -> SolarSystemSpecs {
    let capacity = capacity.max(0.0);
    // Panel count rounds up; the installed nameplate may exceed `capacity`.
    let panels = (capacity * 1000.0 / config.panel_wattage).ceil() as u32;
    let annual_generation = capacity * config.kwh_per_kwp_year();

    let reference = analysis.map_or(annual_generation, |a| a.total_kwh_year);
    let coverage = ratio_or_zero(annual_generation, reference) * 100.0;

    let co2_kg = annual_generation * config.co2_kg_per_kwh;

    let specs = SolarSystemSpecs {
        capacity,
        panels,
        panel_wattage: config.panel_wattage,
        inverter_config: inverter_for(capacity, config).to_string(),
        annual_generation,
        coverage,
        area: (f64::from(panels) * config.panel_area_m2).round() as u32,
        co2_avoided: co2_kg / 1000.0,
        trees_equivalent: ratio_or_zero(co2_kg, config.co2_kg_per_tree_year).round() as u32,
    };

    debug!(
        capacity,
        panels = specs.panels,
        annual_generation = specs.annual_generation,
        coverage = specs.coverage,
        "described system"
    );
    specs
}

/// Inverter arrangement for `capacity`, from the config's bucket table.
pub fn inverter_for(capacity: f64, config: &EngineConfig) -> &str {
    config
        .inverters
        .iter()
        .find(|bucket| bucket.max_capacity.map_or(true, |max| capacity <= max))
        .or_else(|| config.inverters.last())
        .map_or("", |bucket| bucket.config.as_str())
}
