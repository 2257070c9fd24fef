use super::components::{ComponentInput, InvalidComponentError, normalize};
use super::engine::simulate_horizon;
use super::types::{Assumptions, Recommendation};

/// Starting ceiling when components carry no replacement cost, so the
/// bracket never starts at zero.
const MIN_SEARCH_CEILING: f64 = 5_000.0;

/// Doubling attempts before the solver gives up on finding a feasible
/// ceiling and returns the largest contribution it tried.
const BRACKET_ATTEMPTS: u32 = 20;

/// Enough halvings for sub-cent precision on realistic cost magnitudes.
const BISECTION_ITERATIONS: u32 = 50;

/// Finds the minimal constant annual contribution for which the full
/// horizon stays at or above both the minimum balance and each year's
/// fully funded balance.
///
/// Bracket expansion then bisection. The search depends on monotonicity:
/// the contribution enters the balance recurrence additively and both
/// constraints are monotone in the balance, so raising a passing candidate
/// can never make it fail. Variable-rate contribution schedules would
/// break that assumption and need a different solver.
///
/// Never errors past input validation: an exhausted bracket yields the
/// largest contribution tried with `converged = false`, and an empty
/// component list yields a zero recommendation with no rows.
pub fn recommend(
    assumptions: &Assumptions,
    components: &[ComponentInput],
) -> Result<Recommendation, InvalidComponentError> {
    let states = normalize(components)?;
    if states.is_empty() {
        return Ok(Recommendation {
            annual_contribution: 0.0,
            converged: true,
            years: Vec::new(),
        });
    }

    let total_replacement_cost: f64 = states
        .iter()
        .map(|s| f64::from(s.qty) * s.cost_today)
        .sum();

    let mut lo = 0.0_f64;
    let mut hi = (2.0 * total_replacement_cost).max(MIN_SEARCH_CEILING);

    let mut run = simulate_horizon(&states, assumptions, hi);
    let mut attempts = 0;
    while !run.funded && attempts < BRACKET_ATTEMPTS {
        hi *= 2.0;
        run = simulate_horizon(&states, assumptions, hi);
        attempts += 1;
    }

    let converged = run.funded;
    let mut best_contribution = hi;
    let mut best_run = run;

    if converged {
        for _ in 0..BISECTION_ITERATIONS {
            let mid = (lo + hi) / 2.0;
            let trial = simulate_horizon(&states, assumptions, mid);
            if trial.funded {
                hi = mid;
                best_contribution = mid;
                best_run = trial;
            } else {
                lo = mid;
            }
        }
    }

    // Every retained row reports one consistent levelized figure, even
    // though the last improving bisection candidate may differ by sub-cent
    // amounts.
    let annual_contribution = round_to_cent(best_contribution);
    let mut years = best_run.years;
    for row in &mut years {
        row.recommended_contribution = annual_contribution;
    }

    Ok(Recommendation {
        annual_contribution,
        converged,
        years,
    })
}

fn round_to_cent(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
