use super::types::{Inputs, SummaryMetrics, YearlySnapshot};

pub const MONTHS_PER_YEAR: u32 = 12;

pub fn project(inputs: &Inputs) -> Vec<YearlySnapshot> {
    if inputs.duration == 0
        || !inputs.initial_investment.is_finite()
        || !inputs.monthly_investment.is_finite()
        || !inputs.expected_return.is_finite()
    {
        return Vec::new();
    }

    let monthly_rate = inputs.expected_return / 100.0 / f64::from(MONTHS_PER_YEAR);
    let total_months = inputs.duration.saturating_mul(MONTHS_PER_YEAR);

    let mut value = inputs.initial_investment;
    let mut cumulative_invested = inputs.initial_investment;
    let mut interest_for_year = 0.0;
    let mut contribution_for_year = 0.0;
    let mut snapshots = Vec::with_capacity(inputs.duration as usize);

    for month in 1..=total_months {
        // Interest accrues on the opening balance; the month's contribution is
        // added afterwards and only starts compounding the following month.
        let interest = value * monthly_rate;
        value += interest;
        value += inputs.monthly_investment;
        cumulative_invested += inputs.monthly_investment;

        interest_for_year += interest;
        contribution_for_year += inputs.monthly_investment;

        if month % MONTHS_PER_YEAR == 0 {
            snapshots.push(YearlySnapshot {
                year: month / MONTHS_PER_YEAR,
                interest_for_year,
                contribution_for_year,
                value_end_of_year: value,
                cumulative_invested,
            });
            interest_for_year = 0.0;
            contribution_for_year = 0.0;
        }
    }

    snapshots
}

pub fn derive_metrics(inputs: &Inputs, snapshots: &[YearlySnapshot]) -> SummaryMetrics {
    let Some(last) = snapshots.last() else {
        return SummaryMetrics::neutral();
    };

    let final_value = last.value_end_of_year;
    let total_invested = last.cumulative_invested;
    let profit = final_value - total_invested;
    let roi_percentage = if total_invested > 0.0 {
        round_to_tenth(profit / total_invested * 100.0)
    } else {
        0.0
    };

    let months = f64::from(inputs.duration) * f64::from(MONTHS_PER_YEAR);
    let total_contributions = inputs.initial_investment
        + inputs.monthly_investment * f64::from(MONTHS_PER_YEAR) * f64::from(inputs.duration);
    let total_interest = snapshots.iter().map(|s| s.interest_for_year).sum::<f64>();

    let avg_monthly_growth = (final_value - inputs.initial_investment) / months;
    let avg_annual_growth = if inputs.initial_investment > 0.0 {
        ((final_value / inputs.initial_investment).powf(1.0 / f64::from(inputs.duration)) - 1.0)
            * 100.0
    } else {
        0.0
    };

    // The two shares round to one decimal place independently, so they do not
    // always sum to exactly 100.
    let contribution_percentage = if final_value > 0.0 {
        round_to_tenth(total_contributions / final_value * 100.0)
    } else {
        0.0
    };
    let interest_percentage = if final_value > 0.0 {
        round_to_tenth(total_interest / final_value * 100.0)
    } else {
        0.0
    };

    SummaryMetrics {
        final_value,
        total_invested,
        profit,
        roi_percentage,
        total_contributions,
        total_interest,
        avg_monthly_growth,
        avg_annual_growth,
        contribution_percentage,
        interest_percentage,
    }
}

pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
