use serde::Serialize;

/// Financial assumptions for one projection run. Callers enforce
/// `horizon_years >= 1`.
#[derive(Debug, Clone, Copy)]
pub struct Assumptions {
    pub start_year: i32,
    pub horizon_years: u32,
    pub inflation_rate: f64,
    pub interest_rate: f64,
    pub starting_balance: f64,
    pub min_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRow {
    pub year: i32,
    pub starting_balance: f64,
    pub recommended_contribution: f64,
    pub contributions: f64,
    pub expenses: f64,
    pub interest_earned: f64,
    pub ending_balance: f64,
    pub fully_funded_balance: f64,
    pub percent_funded: f64,
}

/// On a failing run `years` stops at the first violating year.
#[derive(Debug, Clone)]
pub struct HorizonRun {
    pub years: Vec<YearRow>,
    pub funded: bool,
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub annual_contribution: f64,
    /// False when bracket expansion ran out of attempts and the
    /// contribution is a best-effort ceiling, not a verified minimum.
    pub converged: bool,
    pub years: Vec<YearRow>,
}
