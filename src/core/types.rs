use serde::Serialize;

use super::brackets::UnresolvedBracket;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    pub annual_rate_percent: f64,
    pub years: u32,
    pub income_bracket_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationPoint {
    pub period_index: u32,
    pub cumulative_total: f64,
    pub cumulative_contributed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_monthly_amount: f64,
    pub percentage_of_income: f64,
}

impl Recommendation {
    pub const ZERO: Recommendation = Recommendation {
        recommended_monthly_amount: 0.0,
        percentage_of_income: 0.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub final_total: f64,
    pub total_contributed: f64,
    pub total_gain: f64,
    pub series: Vec<SimulationPoint>,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_notice: Option<UnresolvedBracket>,
}

impl SimulationResult {
    /// Snapshots at period 0 and at every twelfth month.
    pub fn yearly_points(&self) -> impl Iterator<Item = &SimulationPoint> {
        self.series.iter().step_by(12)
    }
}
