// Tariff, tax and product constants consumed by the calculation engine.
//
// Every core function takes an `&EngineConfig` so a different tariff
// regime can be swapped in without touching the formulas. A JSON file may
// override any subset of fields; the rest keep their defaults.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One row of the inverter lookup table.
///
/// A capacity selects the first bucket whose `max_capacity` is greater than
/// or equal to it. A bucket without `max_capacity` catches everything above.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InverterBucket {
    pub max_capacity: Option<f64>,
    pub config: String,
}

impl InverterBucket {
    fn upto(max_capacity: f64, config: &str) -> Self {
        Self {
            max_capacity: Some(max_capacity),
            config: config.to_string(),
        }
    }

    fn above(config: &str) -> Self {
        Self {
            max_capacity: None,
            config: config.to_string(),
        }
    }
}

/// Settings for the IRR bisection.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct IrrConfig {
    /// Lowest effective annual rate searched, as a fraction.
    pub lower_rate: f64,
    /// Highest effective annual rate searched, as a fraction.
    pub upper_rate: f64,
    pub max_iters: usize,
    /// Stop once the discounted sum is within this many currency units of zero.
    pub npv_tolerance: f64,
}

impl Default for IrrConfig {
    fn default() -> Self {
        Self {
            lower_rate: -0.5,
            upper_rate: 2.0,
            max_iters: 50,
            npv_tolerance: 1.0,
        }
    }
}

/// Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Installed cost before tax, per kWp.
    #[serde(alias = "costPerKWp")]
    pub cost_per_kwp: f64,
    pub iva_rate: f64,
    /// Share of the pre-tax cost recovered through the income-tax deduction.
    pub isr_rate: f64,
    pub panel_wattage: f64,
    pub panel_area_m2: f64,
    pub peak_sun_hours: f64,
    pub performance_ratio: f64,
    pub annual_degradation_rate: f64,
    pub discount_rate: f64,
    /// Public-lighting surcharge (DAP) as a share of the billed amount.
    pub dap_surcharge_pct: f64,
    /// Fixed connection fee charged per 60-day billing period.
    pub fixed_fee_per_bimonthly_period: f64,
    pub co2_kg_per_kwh: f64,
    #[serde(alias = "kWhPerTreeYear")]
    pub co2_kg_per_tree_year: f64,
    /// Savable price per kWh used when no billing history is available.
    pub default_savable_cost_per_kwh: f64,
    /// Savable yearly bill used when no billing history is available.
    pub default_savable_annual_bill: f64,
    pub default_inflation_rate_pct: f64,
    pub horizon_years: usize,
    pub irr: IrrConfig,
    pub inverters: Vec<InverterBucket>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cost_per_kwp: 17_600.0,
            iva_rate: 0.16,
            isr_rate: 0.30,
            panel_wattage: 550.0,
            panel_area_m2: 2.4,
            peak_sun_hours: 5.8,
            performance_ratio: 0.77,
            annual_degradation_rate: 0.01,
            discount_rate: 0.10,
            dap_surcharge_pct: 0.103,
            fixed_fee_per_bimonthly_period: 300.0,
            co2_kg_per_kwh: 0.505,
            co2_kg_per_tree_year: 22.0,
            default_savable_cost_per_kwh: 5.22 * 0.90,
            default_savable_annual_bill: 133_000.0,
            default_inflation_rate_pct: 5.0,
            horizon_years: 25,
            irr: IrrConfig::default(),
            inverters: vec![
                InverterBucket::upto(6.0, "1 × 6 kW Monofásico"),
                InverterBucket::upto(10.0, "1 × 10 kW Trifásico"),
                InverterBucket::upto(16.0, "1 × 15 kW Trifásico"),
                InverterBucket::upto(22.0, "1 × 20 kW Trifásico"),
                InverterBucket::above("2 × 15 kW Trifásicos"),
            ],
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file and validates it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Yearly yield of one installed kWp.
    pub fn kwh_per_kwp_year(&self) -> f64 {
        self.peak_sun_hours * 365.0 * self.performance_ratio
    }

    /// Checks that rates are finite and non-negative and that the lookup
    /// tables are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            (self.cost_per_kwp, "costPerKwp must be finite and non-negative"),
            (self.iva_rate, "ivaRate must be finite and non-negative"),
            (self.isr_rate, "isrRate must be finite and non-negative"),
            (self.panel_area_m2, "panelAreaM2 must be finite and non-negative"),
            (self.peak_sun_hours, "peakSunHours must be finite and non-negative"),
            (self.performance_ratio, "performanceRatio must be finite and non-negative"),
            (self.discount_rate, "discountRate must be finite and non-negative"),
            (self.fixed_fee_per_bimonthly_period, "fixedFeePerBimonthlyPeriod must be finite and non-negative"),
            (self.co2_kg_per_kwh, "co2KgPerKwh must be finite and non-negative"),
            (self.default_savable_cost_per_kwh, "defaultSavableCostPerKwh must be finite and non-negative"),
            (self.default_savable_annual_bill, "defaultSavableAnnualBill must be finite and non-negative"),
        ];
        for (value, reason) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig { reason });
            }
        }

        if !(self.panel_wattage.is_finite() && self.panel_wattage > 0.0) {
            return Err(Error::InvalidConfig {
                reason: "panelWattage must be positive",
            });
        }
        if !(self.co2_kg_per_tree_year.is_finite() && self.co2_kg_per_tree_year > 0.0) {
            return Err(Error::InvalidConfig {
                reason: "co2KgPerTreeYear must be positive",
            });
        }
        if !(0.0..1.0).contains(&self.annual_degradation_rate) {
            return Err(Error::InvalidConfig {
                reason: "annualDegradationRate must be in [0, 1)",
            });
        }
        if !(0.0..1.0).contains(&self.dap_surcharge_pct) {
            return Err(Error::InvalidConfig {
                reason: "dapSurchargePct must be in [0, 1)",
            });
        }
        if !self.default_inflation_rate_pct.is_finite() {
            return Err(Error::InvalidConfig {
                reason: "defaultInflationRatePct must be finite",
            });
        }
        if self.horizon_years == 0 {
            return Err(Error::InvalidConfig {
                reason: "horizonYears must be at least 1",
            });
        }

        let irr = &self.irr;
        if !(irr.lower_rate.is_finite() && irr.upper_rate.is_finite()) {
            return Err(Error::InvalidConfig {
                reason: "irr bracket must be finite",
            });
        }
        if irr.lower_rate <= -1.0 || irr.lower_rate >= irr.upper_rate {
            return Err(Error::InvalidConfig {
                reason: "irr bracket must satisfy -1 < lowerRate < upperRate",
            });
        }
        if !(irr.npv_tolerance.is_finite() && irr.npv_tolerance >= 0.0) {
            return Err(Error::InvalidConfig {
                reason: "irr npvTolerance must be finite and non-negative",
            });
        }

        self.validate_inverters()
    }

    fn validate_inverters(&self) -> Result<()> {
        let Some((last, bounded)) = self.inverters.split_last() else {
            return Err(Error::InvalidConfig {
                reason: "inverter table is empty",
            });
        };
        if last.max_capacity.is_some() {
            return Err(Error::InvalidConfig {
                reason: "last inverter bucket must be open-ended",
            });
        }
        let mut previous = f64::NEG_INFINITY;
        for bucket in bounded {
            match bucket.max_capacity {
                Some(max) if max.is_finite() && max > previous => previous = max,
                _ => {
                    return Err(Error::InvalidConfig {
                        reason: "inverter thresholds must be finite and strictly ascending",
                    })
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.kwh_per_kwp_year(), 1630.09, epsilon = 1e-9);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "costPerKwp": 20000, "irr": { "maxIters": 80 } }"#)
                .expect("should parse");

        assert_relative_eq!(config.cost_per_kwp, 20_000.0);
        assert_eq!(config.irr.max_iters, 80);
        assert_relative_eq!(config.irr.upper_rate, 2.0);
        assert_relative_eq!(config.iva_rate, 0.16);
        assert_eq!(config.inverters.len(), 5);
    }

    #[test]
    fn accepts_tree_alias() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "kWhPerTreeYear": 20 }"#).expect("should parse");
        assert_relative_eq!(config.co2_kg_per_tree_year, 20.0);
    }

    #[test]
    fn accepts_cost_alias() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "costPerKWp": 30000, "kWhPerTreeYear": 20 }"#)
                .expect("should parse");
        assert_relative_eq!(config.cost_per_kwp, 30_000.0);
        assert_relative_eq!(config.co2_kg_per_tree_year, 20.0);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(serde_json::from_str::<EngineConfig>(r#"{ "costPerKwh": 30000 }"#).is_err());
        assert!(serde_json::from_str::<EngineConfig>(r#"{ "irr": { "maxIter": 80 } }"#).is_err());
        assert!(serde_json::from_str::<EngineConfig>(
            r#"{ "inverters": [ { "maxCap": 6, "config": "1 × 6 kW" } ] }"#
        )
        .is_err());
    }

    #[test]
    fn rejects_zero_panel_wattage() {
        let config = EngineConfig {
            panel_wattage: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_inverted_irr_bracket() {
        let config = EngineConfig {
            irr: IrrConfig {
                lower_rate: 0.5,
                upper_rate: 0.1,
                ..IrrConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_unordered_inverter_table() {
        let mut config = EngineConfig::default();
        config.inverters.swap(0, 1);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

        config.inverters.clear();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = EngineConfig::load("does/not/exist.json");
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
