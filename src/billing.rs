// Breakdown of the current bill into the charges printed on a PDBT invoice.
use crate::analyzer::prorated_fixed_fee;
use crate::config::EngineConfig;
use crate::types::{BillBreakdown, BillComponent, ConsumptionAnalysis};

/// Typical share of each tariff component in the pre-tax subtotal.
const COMPONENT_SHARES: [(&str, f64); 5] = [
    ("Energía", 43.5),
    ("Capacidad", 28.1),
    ("Distribución", 23.3),
    ("Transmisión", 4.3),
    ("Otros", 0.8),
];

/// Splits the current period's amount into subtotal, IVA, the public-lighting
/// surcharge and the tariff components of the subtotal. Values are rounded to
/// whole currency units.
pub fn breakdown(analysis: &ConsumptionAnalysis, config: &EngineConfig) -> BillBreakdown {
    let total = analysis.current_period_amount;
    let subtotal_energy = total / (1.0 + config.iva_rate);
    let iva = subtotal_energy * config.iva_rate;
    let dap = total * config.dap_surcharge_pct;

    let components = COMPONENT_SHARES
        .iter()
        .map(|(name, percentage)| BillComponent {
            name: name.to_string(),
            value: (subtotal_energy * percentage / 100.0).round(),
            percentage: *percentage,
        })
        .collect();

    BillBreakdown {
        subtotal_energy: subtotal_energy.round(),
        iva: iva.round(),
        dap: dap.round(),
        fixed_fee: prorated_fixed_fee(analysis.current_period_days, config).round(),
        total: total.round(),
        components,
    }
}

/// Part of the current bill that solar generation can offset.
pub fn savable_current_amount(breakdown: &BillBreakdown) -> f64 {
    (breakdown.total - breakdown.dap - breakdown.fixed_fee).max(0.0)
}
