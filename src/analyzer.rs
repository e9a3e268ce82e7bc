// Consumption analysis: turns an irregular billing history into a single
// yearly profile used for sizing and for the financial model.
use std::cmp::Reverse;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::types::{ConsumptionAnalysis, ConsumptionPeriod, Season, SeasonalAverages};
use crate::util::{month_index, ratio_or_zero};

const DAYS_PER_YEAR: f64 = 365.0;
const DAYS_PER_MONTH: f64 = 30.0;
/// Billing-period length the fixed connection fee is quoted against.
const REFERENCE_PERIOD_DAYS: f64 = 60.0;

/// Analyzes a billing history.
///
/// Raw kWh and amount sums are scaled by `365 / total_days` to get yearly
/// totals. The savable part of the yearly bill excludes the public-lighting
/// surcharge and the fixed connection fee, neither of which solar can
/// offset.
///
/// # Errors
///
/// Returns [`Error::NoData`] if `periods` is empty.
pub fn analyze(periods: &[ConsumptionPeriod], config: &EngineConfig) -> Result<ConsumptionAnalysis> {
    if periods.is_empty() {
        return Err(Error::NoData);
    }

    // Newest first. Unknown month names sort after every known month of
    // the same year.
    let mut sorted: Vec<&ConsumptionPeriod> = periods.iter().collect();
    sorted.sort_by_key(|p| Reverse((p.year, month_index(&p.month))));

    let newest = sorted[0];
    let oldest = sorted[sorted.len() - 1];
    let current = periods.iter().find(|p| p.current).unwrap_or(newest);

    let total_kwh: f64 = periods.iter().map(|p| p.kwh).sum();
    let total_amount: f64 = periods.iter().map(|p| p.amount).sum();
    let total_days: u32 = periods.iter().map(|p| p.days).sum();

    let year_factor = ratio_or_zero(DAYS_PER_YEAR, f64::from(total_days));
    let total_kwh_year = total_kwh * year_factor;
    let total_amount_year = total_amount * year_factor;

    // The ratio is invariant under normalization, so raw sums are used.
    let avg_cost_per_kwh = ratio_or_zero(total_amount, total_kwh);

    let avg_days_per_period = f64::from(total_days) / periods.len() as f64;
    let periods_per_year = ratio_or_zero(DAYS_PER_YEAR, avg_days_per_period);
    let fixed_fee_year = config.fixed_fee_per_bimonthly_period * periods_per_year;
    let savable_amount_year =
        (total_amount_year * (1.0 - config.dap_surcharge_pct) - fixed_fee_year).max(0.0);
    let savable_cost_per_kwh = ratio_or_zero(savable_amount_year, total_kwh_year);

    let seasonal_avg = SeasonalAverages {
        cold: seasonal_monthly_kwh(periods, Season::Cold),
        mild: seasonal_monthly_kwh(periods, Season::Mild),
        hot: seasonal_monthly_kwh(periods, Season::Hot),
    };

    let oldest_daily = ratio_or_zero(oldest.kwh, f64::from(oldest.days));
    let newest_daily = ratio_or_zero(newest.kwh, f64::from(newest.days));
    let growth_rate = ratio_or_zero(newest_daily - oldest_daily, oldest_daily) * 100.0;

    let min_kwh = periods.iter().map(|p| p.kwh).fold(f64::INFINITY, f64::min);
    let max_kwh = periods.iter().map(|p| p.kwh).fold(f64::NEG_INFINITY, f64::max);

    let analysis = ConsumptionAnalysis {
        period_count: periods.len(),
        total_days,
        avg_days_per_period,
        total_kwh_year,
        total_amount_year,
        avg_monthly_kwh: total_kwh_year / 12.0,
        avg_daily_kwh: total_kwh_year / DAYS_PER_YEAR,
        avg_cost_per_kwh,
        savable_cost_per_kwh,
        savable_amount_year,
        fixed_fee_year,
        seasonal_avg,
        growth_rate,
        min_kwh,
        max_kwh,
        current_period: current.period.clone(),
        current_period_kwh: current.kwh,
        current_period_amount: current.amount,
        current_period_days: current.days,
    };

    debug!(
        periods = analysis.period_count,
        total_kwh_year = analysis.total_kwh_year,
        savable_cost_per_kwh = analysis.savable_cost_per_kwh,
        "analyzed consumption history"
    );
    Ok(analysis)
}

/// Monthly kWh for one season, normalized to a 30-day month and rounded.
/// A season without periods yields 0.
fn seasonal_monthly_kwh(periods: &[ConsumptionPeriod], season: Season) -> f64 {
    let (kwh, days) = periods
        .iter()
        .filter(|p| p.season == season)
        .fold((0.0, 0u32), |(kwh, days), p| (kwh + p.kwh, days + p.days));
    (ratio_or_zero(kwh, f64::from(days)) * DAYS_PER_MONTH).round()
}

/// Fixed connection fee prorated to a billing period of `days`.
pub fn prorated_fixed_fee(days: u32, config: &EngineConfig) -> f64 {
    config.fixed_fee_per_bimonthly_period * f64::from(days) / REFERENCE_PERIOD_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn period(month: &str, year: i32, kwh: f64, amount: f64, days: u32, season: Season) -> ConsumptionPeriod {
        ConsumptionPeriod {
            period: format!("{month} {}", year % 100),
            month: month.to_string(),
            year,
            kwh,
            amount,
            days,
            season,
            current: false,
            estimated: false,
        }
    }

    #[test]
    fn errors_on_empty_history() {
        let result = analyze(&[], &EngineConfig::default());
        assert!(matches!(result, Err(Error::NoData)));
    }

    #[test]
    fn single_bimonthly_period() {
        let mut p = period("Nov", 2025, 4000.0, 21_000.0, 59, Season::Mild);
        p.current = true;
        let config = EngineConfig::default();

        let a = analyze(&[p], &config).expect("should analyze");

        assert_relative_eq!(a.total_kwh_year, 4000.0 * 365.0 / 59.0, epsilon = 1e-9);
        assert_relative_eq!(a.total_amount_year, 21_000.0 * 365.0 / 59.0, epsilon = 1e-9);
        assert_relative_eq!(a.avg_cost_per_kwh, 5.25, epsilon = 1e-12);
        assert_eq!(a.current_period, "Nov 25");
        assert_relative_eq!(a.current_period_kwh, 4000.0);
        assert_relative_eq!(a.growth_rate, 0.0);

        let fee_year = 300.0 * 365.0 / 59.0;
        assert_relative_eq!(a.fixed_fee_year, fee_year, epsilon = 1e-9);
        assert_relative_eq!(
            a.savable_amount_year,
            a.total_amount_year * (1.0 - 0.103) - fee_year,
            epsilon = 1e-6
        );
        assert!(a.savable_cost_per_kwh < a.avg_cost_per_kwh);
    }

    #[test]
    fn sorts_by_calendar_month() {
        // Lexically "Ene" < "Dic" would be wrong; January 2025 is newer.
        let history = [
            period("Dic", 2024, 300.0, 1500.0, 30, Season::Cold),
            period("Ene", 2025, 600.0, 3000.0, 30, Season::Cold),
            period("Oct", 2024, 150.0, 800.0, 30, Season::Mild),
        ];

        let a = analyze(&history, &EngineConfig::default()).expect("should analyze");

        // Newest = Ene 25 (600 kWh), oldest = Oct 24 (150 kWh).
        assert_eq!(a.current_period, "Ene 25");
        assert_relative_eq!(a.growth_rate, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn flagged_current_period_wins() {
        let mut older = period("Sep", 2025, 4154.0, 21_842.0, 60, Season::Hot);
        older.current = true;
        let newer = period("Nov", 2025, 4251.0, 22_201.0, 59, Season::Mild);

        let a = analyze(&[newer, older], &EngineConfig::default()).expect("should analyze");
        assert_eq!(a.current_period, "Sep 25");
        assert_relative_eq!(a.current_period_amount, 21_842.0);
    }

    #[test]
    fn seasonal_buckets_normalize_to_thirty_days() {
        let history = [
            period("Ene", 2025, 1616.0, 8449.0, 29, Season::Cold),
            period("Feb", 2025, 1867.0, 9647.0, 33, Season::Cold),
            period("Mar", 2025, 2370.0, 12_019.0, 29, Season::Mild),
        ];

        let a = analyze(&history, &EngineConfig::default()).expect("should analyze");

        assert_relative_eq!(a.seasonal_avg.cold, ((1616.0 + 1867.0) / 62.0 * 30.0_f64).round());
        assert_relative_eq!(a.seasonal_avg.mild, (2370.0 / 29.0 * 30.0_f64).round());
        assert_relative_eq!(a.seasonal_avg.hot, 0.0);
        assert_relative_eq!(a.min_kwh, 1616.0);
        assert_relative_eq!(a.max_kwh, 2370.0);
    }

    #[test]
    fn zero_consumption_stays_finite() {
        let history = [period("Nov", 2025, 0.0, 0.0, 30, Season::Mild)];

        let a = analyze(&history, &EngineConfig::default()).expect("should analyze");

        for value in [
            a.total_kwh_year,
            a.total_amount_year,
            a.avg_cost_per_kwh,
            a.savable_cost_per_kwh,
            a.savable_amount_year,
            a.growth_rate,
            a.seasonal_avg.mild,
        ] {
            assert!(value.is_finite());
        }
        assert_relative_eq!(a.savable_amount_year, 0.0);
        assert_relative_eq!(a.savable_cost_per_kwh, 0.0);
    }

    #[test]
    fn zero_day_record_does_not_poison_totals() {
        let history = [
            period("Oct", 2025, 0.0, 0.0, 0, Season::Mild),
            period("Nov", 2025, 900.0, 4700.0, 30, Season::Mild),
        ];

        let a = analyze(&history, &EngineConfig::default()).expect("should analyze");
        assert!(a.growth_rate.is_finite());
        assert_relative_eq!(a.growth_rate, 0.0);
        assert_relative_eq!(a.total_kwh_year, 900.0 * 365.0 / 30.0, epsilon = 1e-9);
    }

    #[test]
    fn prorates_fee_against_sixty_days() {
        let config = EngineConfig::default();
        assert_relative_eq!(prorated_fixed_fee(60, &config), 300.0);
        assert_relative_eq!(prorated_fixed_fee(30, &config), 150.0);
    }
}
