use super::brackets::resolve_recommendation;
use super::types::{SimulationParameters, SimulationPoint, SimulationResult};

const MONTHS_PER_YEAR: u32 = 12;

/// Monthly compounding where each month's contribution is deposited before
/// that month's growth is applied.
pub fn simulate(params: &SimulationParameters) -> SimulationResult {
    let months = params.years * MONTHS_PER_YEAR;
    let monthly_rate = params.annual_rate_percent / 100.0 / f64::from(MONTHS_PER_YEAR);
    let growth = 1.0 + monthly_rate;

    let mut total = params.initial_capital;
    let mut series = Vec::with_capacity(months as usize + 1);
    series.push(SimulationPoint {
        period_index: 0,
        cumulative_total: params.initial_capital,
        cumulative_contributed: params.initial_capital,
    });

    for month in 1..=months {
        total = (total + params.monthly_contribution) * growth;
        series.push(SimulationPoint {
            period_index: month,
            cumulative_total: round_cents(total),
            cumulative_contributed: contributed_after(params, month),
        });
    }

    let final_total = round_cents(total);
    let total_contributed = contributed_after(params, months);
    let resolution = resolve_recommendation(&params.income_bracket_id);

    tracing::debug!(
        months,
        final_total,
        total_contributed,
        bracket_id = %params.income_bracket_id,
        "simulation complete"
    );

    SimulationResult {
        final_total,
        total_contributed,
        total_gain: final_total - total_contributed,
        series,
        recommendation: resolution.recommendation,
        bracket_notice: resolution.notice,
    }
}

fn contributed_after(params: &SimulationParameters, months: u32) -> f64 {
    params.initial_capital + params.monthly_contribution * f64::from(months)
}

/// Two-decimal rounding, ties away from zero.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
