use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireType {
    Lean,
    Coast,
    Barista,
    #[default]
    Regular,
    Fat,
}

impl FireType {
    pub const ALL: [FireType; 5] = [
        FireType::Lean,
        FireType::Coast,
        FireType::Barista,
        FireType::Regular,
        FireType::Fat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FireType::Lean => "lean",
            FireType::Coast => "coast",
            FireType::Barista => "barista",
            FireType::Regular => "regular",
            FireType::Fat => "fat",
        }
    }
}

impl std::str::FromStr for FireType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FireType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown fire_type '{s}'"))
    }
}

/// One-time inflow added to the portfolio in the year the person reaches `age`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Windfall {
    pub age: u32,
    pub amount: f64,
}

/// One-time outflow at `target_age`; contributions are cut by
/// `contribution_reduction` (a fraction) from that year on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LargeExpense {
    pub target_age: u32,
    pub amount: f64,
    pub contribution_reduction: f64,
}

/// Part-time work preceding full retirement. Both ages are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartTimeWindow {
    pub start_age: u32,
    pub end_age: u32,
    pub income: f64,
    pub reduced_spending: f64,
}

impl PartTimeWindow {
    pub fn contains(&self, age: u32) -> bool {
        (self.start_age..=self.end_age).contains(&age)
    }
}

/// Validated engine input. Monetary amounts are in today's dollars, rates are
/// decimal fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub current_age: u32,
    pub current_portfolio_taxable: f64,
    pub current_portfolio_tax_deferred: f64,
    pub annual_contribution: f64,
    pub expected_annual_spending: f64,
    pub growth_rate: f64,
    pub inflation_rate: f64,
    pub withdrawal_rate: f64,
    pub desired_retirement_age: Option<u32>,
    pub social_security_income: f64,
    pub social_security_age: u32,
    pub life_expectancy: u32,
    #[serde(default)]
    pub fire_type: FireType,
    #[serde(default)]
    pub windfalls: Vec<Windfall>,
    #[serde(default)]
    pub large_expense: Option<LargeExpense>,
    #[serde(default)]
    pub part_time: Option<PartTimeWindow>,
}

impl FinancialProfile {
    pub fn current_total_portfolio(&self) -> f64 {
        self.current_portfolio_taxable + self.current_portfolio_tax_deferred
    }

    /// Number of simulated years after year 0.
    pub fn horizon_years(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.current_age)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FireTarget {
    pub fire_type: FireType,
    pub name: &'static str,
    pub spending_multiplier: f64,
    pub annual_spending: f64,
    pub withdrawal_rate_used: f64,
    pub target_portfolio: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Accumulation,
    PartTime,
    Withdrawal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionYear {
    pub year: u32,
    pub age: u32,
    pub phase: Phase,
    pub portfolio_value: f64,
    pub annual_contribution: f64,
    pub target_portfolio: f64,
    pub sustainable_withdrawal: f64,
    pub inflation_adjusted_spending: f64,
    pub social_security_income: f64,
    pub part_time_income: f64,
    pub windfall: f64,
    pub large_expense: f64,
    pub net_spending_need: f64,
    pub surplus_deficit: f64,
    pub fire_achieved: bool,
    pub is_part_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub years_to_fire: Option<u32>,
    pub target_portfolio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetirementReadiness {
    pub on_track: Option<bool>,
    pub message: String,
    pub years_to_desired_retirement: Option<u32>,
    pub portfolio_at_retirement: Option<f64>,
    pub target_portfolio: Option<f64>,
    pub shortfall: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloParams {
    pub num_simulations: u32,
    pub years: u32,
    /// Standard deviation of the annual return distribution.
    pub volatility: f64,
    /// Base seed. `None` draws one from the OS, so runs differ.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalValueStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

/// Per-year cross-sectional percentiles; each vector has `years + 1` points,
/// starting with the initial portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileBands {
    pub p10: Vec<f64>,
    pub p25: Vec<f64>,
    pub p50: Vec<f64>,
    pub p75: Vec<f64>,
    pub p90: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloResult {
    pub num_simulations: u32,
    pub years: u32,
    pub target_portfolio: f64,
    pub success_rate: f64,
    pub final_values: FinalValueStats,
    pub percentiles: PercentileBands,
}
