use super::{EngineError, FinancialProfile, Phase, ProjectionYear};

impl Phase {
    /// Phase for a year, given whether the target has been reached by then.
    /// A part-time window takes priority; once it ends, full retirement follows.
    pub fn for_year(profile: &FinancialProfile, age: u32, fire_achieved: bool) -> Self {
        if let Some(window) = &profile.part_time {
            if window.contains(age) {
                return Phase::PartTime;
            }
            if age > window.end_age {
                return Phase::Withdrawal;
            }
        }

        let past_desired_retirement = profile
            .desired_retirement_age
            .is_some_and(|retirement_age| age >= retirement_age);
        if fire_achieved || past_desired_retirement {
            Phase::Withdrawal
        } else {
            Phase::Accumulation
        }
    }

    pub fn draws_down(self) -> bool {
        !matches!(self, Phase::Accumulation)
    }
}

/// Deterministic projection from current age to life expectancy, one record
/// per year (`life_expectancy - current_age + 1` records).
pub fn project(
    profile: &FinancialProfile,
    target_portfolio: f64,
) -> Result<Vec<ProjectionYear>, EngineError> {
    project_path(profile, target_portfolio, profile.horizon_years(), |_| {
        profile.growth_rate
    })
}

/// Year 0 through `years` inclusive. `growth_for_year(y)` supplies the return
/// applied to the value recorded in year `y` when rolling into `y + 1`.
///
/// Per-year ordering:
/// 1. windfalls and the large expense for this age hit the running value;
/// 2. the value is recorded and checked against the target (sticky flag);
/// 3. phase, contribution, income offsets and net need are derived;
/// 4. the value compounds, gains the contribution and, outside accumulation,
///    loses the net spending need.
///
/// Values are never floored; a negative portfolio marks depletion.
pub(crate) fn project_path<F>(
    profile: &FinancialProfile,
    target_portfolio: f64,
    years: u32,
    mut growth_for_year: F,
) -> Result<Vec<ProjectionYear>, EngineError>
where
    F: FnMut(u32) -> f64,
{
    let mut rows = Vec::with_capacity(years as usize + 1);
    let mut portfolio_value = profile.current_total_portfolio();
    let mut fire_reached = false;

    for year in 0..=years {
        let age = profile.current_age + year;
        let price_index = (1.0 + profile.inflation_rate).powi(year as i32);

        let windfall: f64 = profile
            .windfalls
            .iter()
            .filter(|w| w.age == age)
            .map(|w| w.amount)
            .sum();
        let large_expense = profile
            .large_expense
            .filter(|e| e.target_age == age)
            .map_or(0.0, |e| e.amount);
        portfolio_value += windfall - large_expense;

        fire_reached = fire_reached || portfolio_value >= target_portfolio;
        let phase = Phase::for_year(profile, age, fire_reached);

        let (base_spending, part_time_income) = match (&profile.part_time, phase) {
            (Some(window), Phase::PartTime) => (window.reduced_spending, window.income),
            _ => (profile.expected_annual_spending, 0.0),
        };
        let inflation_adjusted_spending = base_spending * price_index;
        let part_time_income = part_time_income * price_index;
        let social_security_income = if age >= profile.social_security_age {
            profile.social_security_income * price_index
        } else {
            0.0
        };
        let net_spending_need =
            (inflation_adjusted_spending - social_security_income - part_time_income).max(0.0);

        let annual_contribution = match phase {
            Phase::Accumulation => contribution_for_age(profile, age),
            Phase::PartTime | Phase::Withdrawal => 0.0,
        };
        let sustainable_withdrawal = portfolio_value * profile.withdrawal_rate;
        let surplus_deficit = if phase.draws_down() {
            sustainable_withdrawal - net_spending_need
        } else {
            annual_contribution - net_spending_need
        };

        rows.push(ProjectionYear {
            year,
            age,
            phase,
            portfolio_value,
            annual_contribution,
            target_portfolio,
            sustainable_withdrawal,
            inflation_adjusted_spending,
            social_security_income,
            part_time_income,
            windfall,
            large_expense,
            net_spending_need,
            surplus_deficit,
            fire_achieved: fire_reached,
            is_part_time: phase == Phase::PartTime,
        });

        if year < years {
            let growth = growth_for_year(year);
            let withdrawal = if phase.draws_down() {
                net_spending_need
            } else {
                0.0
            };
            portfolio_value = portfolio_value * (1.0 + growth) + annual_contribution - withdrawal;
            if !portfolio_value.is_finite() {
                return Err(EngineError::simulation(format!(
                    "portfolio value became non-finite at age {}",
                    age + 1
                )));
            }
        }
    }

    Ok(rows)
}

/// First year index whose record has reached the target.
pub fn years_to_fire(projections: &[ProjectionYear]) -> Option<u32> {
    projections
        .iter()
        .find(|row| row.fire_achieved)
        .map(|row| row.year)
}

fn contribution_for_age(profile: &FinancialProfile, age: u32) -> f64 {
    let reduction = profile
        .large_expense
        .filter(|e| age >= e.target_age)
        .map_or(0.0, |e| e.contribution_reduction);
    profile.annual_contribution * (1.0 - reduction)
}
