use super::components::{ComponentInput, ComponentState, InvalidComponentError, normalize};
use super::types::{Assumptions, HorizonRun, YearRow};

/// Slack on the funding constraints so borderline candidates are not
/// rejected on floating-point noise.
pub(crate) const FUNDING_TOLERANCE: f64 = 1e-9;

/// Advances the fund and every component one year and returns that year's
/// row. `year_index` is 0-based from `start_year`. Mutates `states` in
/// place; each full-horizon run must get its own fresh clone.
pub(crate) fn simulate_year(
    states: &mut [ComponentState],
    assumptions: &Assumptions,
    year_index: u32,
    starting_balance: f64,
    contribution: f64,
) -> YearRow {
    let inflation_factor = (1.0 + assumptions.inflation_rate).powi(year_index as i32);

    // FFB uses each component's age at year-start, before any replacement
    // resets: a component due this year counts at full deterioration.
    let mut fully_funded_balance = 0.0;
    for state in states.iter() {
        let deterioration = (f64::from(state.age) / f64::from(state.cycle)).clamp(0.0, 1.0);
        fully_funded_balance +=
            f64::from(state.qty) * state.cost_today * inflation_factor * deterioration;
    }

    // Interest accrues on the year-start balance only; contributions are
    // treated as received at year-end.
    let interest_earned = starting_balance * assumptions.interest_rate;

    let mut expenses = 0.0;
    for state in states.iter_mut() {
        if state.age >= state.cycle {
            expenses += f64::from(state.qty) * state.cost_today * inflation_factor;
            state.age = 0;
        }
    }

    let ending_balance = starting_balance + contribution + interest_earned - expenses;

    let percent_funded = if fully_funded_balance > 0.0 {
        (ending_balance / fully_funded_balance).max(0.0)
    } else {
        0.0
    };

    // Universal age advance happens after the reset, so a component replaced
    // this year enters next year at age 1.
    for state in states.iter_mut() {
        state.age = state.age.saturating_add(1);
    }

    YearRow {
        year: assumptions.start_year + year_index as i32,
        starting_balance,
        recommended_contribution: contribution,
        contributions: contribution,
        expenses,
        interest_earned,
        ending_balance,
        fully_funded_balance,
        percent_funded,
    }
}

/// Runs the yearly step for the whole horizon at one fixed ("levelized")
/// annual contribution, on a fresh clone of `states`. Fails as soon as an
/// ending balance drops below the minimum balance or that year's fully
/// funded balance; years past the first violation are not projected.
pub(crate) fn simulate_horizon(
    states: &[ComponentState],
    assumptions: &Assumptions,
    contribution: f64,
) -> HorizonRun {
    let mut states = states.to_vec();
    let mut years = Vec::with_capacity(assumptions.horizon_years as usize);
    let mut balance = assumptions.starting_balance;

    for year_index in 0..assumptions.horizon_years {
        let row = simulate_year(&mut states, assumptions, year_index, balance, contribution);
        balance = row.ending_balance;

        let below_minimum = row.ending_balance < assumptions.min_balance - FUNDING_TOLERANCE;
        let below_fully_funded =
            row.ending_balance < row.fully_funded_balance - FUNDING_TOLERANCE;
        years.push(row);

        if below_minimum || below_fully_funded {
            return HorizonRun {
                years,
                funded: false,
            };
        }
    }

    HorizonRun {
        years,
        funded: true,
    }
}

/// Full-horizon projection at a caller-chosen fixed annual contribution.
pub fn simulate_plan(
    assumptions: &Assumptions,
    components: &[ComponentInput],
    annual_contribution: f64,
) -> Result<HorizonRun, InvalidComponentError> {
    let states = normalize(components)?;
    Ok(simulate_horizon(&states, assumptions, annual_contribution))
}
