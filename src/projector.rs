// Investment summary and year-by-year cash-flow projection.
use tracing::debug;

use crate::config::EngineConfig;
use crate::irr;
use crate::types::{
    ConsumptionAnalysis, FinancialAnalysis, FinancialProjectionYear, Payback, SolarSystemSpecs,
};
use crate::util::ratio_or_zero;

/// Projects the finances of an array of `capacity` kWp over the configured
/// horizon.
///
/// Savings in any year never exceed the bill the client would have paid
/// without solar. The income-tax deduction reduces the displayed net cost
/// from year 0 and enters the IRR/payback cash flows as a single inflow in
/// year 1. Without an `analysis` the savable price and yearly bill fall back
/// to the config defaults.
pub fn project(
    capacity: f64,
    specs: &SolarSystemSpecs,
    inflation_rate_pct: f64,
    analysis: Option<&ConsumptionAnalysis>,
    config: &EngineConfig,
) -> FinancialAnalysis {
    let capacity = capacity.max(0.0);
    let base_cost = capacity * config.cost_per_kwp;
    let iva = base_cost * config.iva_rate;
    let total_cost = base_cost + iva;
    let isr_deduction = base_cost * config.isr_rate;
    let net_cost = total_cost - isr_deduction;

    let (savable_cost_per_kwh, savable_annual_bill) = match analysis {
        Some(a) => (a.savable_cost_per_kwh, a.savable_amount_year),
        None => (
            config.default_savable_cost_per_kwh,
            config.default_savable_annual_bill,
        ),
    };

    let annual_savings = (specs.annual_generation * savable_cost_per_kwh).min(savable_annual_bill);

    let horizon = config.horizon_years;
    let mut projection = Vec::with_capacity(horizon + 1);
    projection.push(FinancialProjectionYear {
        year: 0,
        generation: 0.0,
        savings: 0.0,
        cfe_without_solar: 0.0,
        cumulative: -net_cost,
        cfe_cumulative: 0.0,
        roi: 0.0,
    });

    let mut cumulative = -net_cost;
    let mut cfe_cumulative = 0.0;
    let mut npv = -total_cost;
    let mut running_cashflow = -total_cost;
    let mut cash_flows = Vec::with_capacity(horizon + 1);
    cash_flows.push(-total_cost);
    let mut payback = None;

    for year in 1..=horizon {
        let exponent = (year - 1) as i32;
        let degradation = (1.0 - config.annual_degradation_rate).powi(exponent);
        let inflation_factor = (1.0 + inflation_rate_pct / 100.0).powi(exponent);

        let generation = specs.annual_generation * degradation;
        let potential_savings = generation * savable_cost_per_kwh * inflation_factor;
        let cfe_without_solar = savable_annual_bill * inflation_factor;
        let savings = potential_savings.min(cfe_without_solar);

        cumulative += savings;
        cfe_cumulative += cfe_without_solar;
        npv += savings / (1.0 + config.discount_rate).powi(year as i32);

        let inflow = savings + if year == 1 { isr_deduction } else { 0.0 };
        let before = running_cashflow;
        running_cashflow += inflow;
        cash_flows.push(inflow);

        if payback.is_none() && inflow > 0.0 && running_cashflow >= 0.0 {
            let fraction = ratio_or_zero(before.abs(), inflow);
            payback = Some((year - 1) as f64 + fraction);
        }

        projection.push(FinancialProjectionYear {
            year,
            generation,
            savings,
            cfe_without_solar,
            cumulative,
            cfe_cumulative,
            roi: ratio_or_zero(cumulative, total_cost) * 100.0,
        });
    }

    let total_savings: f64 = projection.iter().map(|row| row.savings).sum();
    let total_cfe_cost: f64 = projection.iter().map(|row| row.cfe_without_solar).sum();

    let irr = irr::solve(&cash_flows, &config.irr);
    // Nothing to recover when the system costs nothing.
    let payback = match payback {
        Some(years) if years > 0.0 => Payback::Years(years),
        _ => Payback::BeyondHorizon { horizon },
    };

    debug!(
        capacity,
        total_cost,
        annual_savings,
        payback = %payback,
        irr = irr.percent(),
        "projected finances"
    );

    FinancialAnalysis {
        base_cost,
        iva,
        total_cost,
        isr_deduction,
        net_cost,
        annual_savings,
        payback,
        projection,
        total_savings,
        total_cfe_cost,
        irr: irr.percent(),
        irr_status: irr.status,
        npv,
        roi25: ratio_or_zero(total_savings - total_cost, total_cost) * 100.0,
    }
}
