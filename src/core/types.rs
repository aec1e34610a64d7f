use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Inputs {
    pub initial_investment: f64,
    pub monthly_investment: f64,
    pub expected_return: f64,
    pub duration: u32,
    pub target_amount: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySnapshot {
    pub year: u32,
    pub interest_for_year: f64,
    pub contribution_for_year: f64,
    pub value_end_of_year: f64,
    pub cumulative_invested: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub final_value: f64,
    pub total_invested: f64,
    pub profit: f64,
    pub roi_percentage: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub avg_monthly_growth: f64,
    pub avg_annual_growth: f64,
    pub contribution_percentage: f64,
    pub interest_percentage: f64,
}

impl SummaryMetrics {
    pub fn neutral() -> Self {
        Self {
            final_value: 0.0,
            total_invested: 0.0,
            profit: 0.0,
            roi_percentage: 0.0,
            total_contributions: 0.0,
            total_interest: 0.0,
            avg_monthly_growth: 0.0,
            avg_annual_growth: 0.0,
            contribution_percentage: 0.0,
            interest_percentage: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProjection {
    pub target_reached: bool,
    pub goal_progress_percent: f64,
    pub estimated_years_to_goal: Option<f64>,
}
