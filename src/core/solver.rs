use super::engine::{MONTHS_PER_YEAR, round_to_tenth};
use super::types::{GoalProjection, Inputs, YearlySnapshot};

pub const MAX_MONTHS_TO_GOAL: u32 = 1_000;

pub fn estimate_time_to_goal(
    final_value: f64,
    target_amount: f64,
    expected_return: f64,
    monthly_investment: f64,
) -> Option<f64> {
    if target_amount <= final_value {
        return None;
    }

    let monthly_rate = expected_return / 100.0 / f64::from(MONTHS_PER_YEAR);
    let mut current_value = final_value;
    let mut months = 0u32;

    // Same compounding step as the projection loop. The month cap bounds the
    // search even when the balance can never grow.
    while current_value < target_amount && months < MAX_MONTHS_TO_GOAL {
        current_value += current_value * monthly_rate;
        current_value += monthly_investment;
        months += 1;
    }

    if current_value >= target_amount {
        Some(round_to_tenth(f64::from(months) / f64::from(MONTHS_PER_YEAR)))
    } else {
        None
    }
}

pub fn goal_projection(inputs: &Inputs, snapshots: &[YearlySnapshot]) -> Option<GoalProjection> {
    let target_amount = inputs.target_amount?;
    let last = snapshots.last()?;
    if target_amount <= 0.0 {
        return None;
    }

    let final_value = last.value_end_of_year;
    let target_reached = final_value >= target_amount;
    let goal_progress_percent = (final_value / target_amount * 100.0).clamp(0.0, 100.0);
    let estimated_years_to_goal = if target_reached {
        None
    } else {
        estimate_time_to_goal(
            final_value,
            target_amount,
            inputs.expected_return,
            inputs.monthly_investment,
        )
    };

    Some(GoalProjection {
        target_reached,
        goal_progress_percent,
        estimated_years_to_goal,
    })
}
