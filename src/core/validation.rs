use tracing::warn;

use super::{EngineError, FinancialProfile, MonteCarloParams};

pub const MAX_SIMULATIONS: u32 = 10_000;
pub const MAX_MONTE_CARLO_YEARS: u32 = 100;
/// Upper bound for every age on a profile. Keeps horizons small and age
/// arithmetic far from overflow.
pub const MAX_AGE: u32 = 150;

pub fn validate_profile(profile: &FinancialProfile) -> Result<(), EngineError> {
    for (label, age) in [
        ("current_age", Some(profile.current_age)),
        ("life_expectancy", Some(profile.life_expectancy)),
        ("social_security_age", Some(profile.social_security_age)),
        ("desired_retirement_age", profile.desired_retirement_age),
    ] {
        if age.is_some_and(|age| age > MAX_AGE) {
            return Err(EngineError::validation(format!(
                "{label} must be <= {MAX_AGE}"
            )));
        }
    }
    if profile.current_age >= profile.life_expectancy {
        return Err(EngineError::validation(
            "current_age must be < life_expectancy",
        ));
    }

    for (label, value) in [
        ("current_portfolio_taxable", profile.current_portfolio_taxable),
        (
            "current_portfolio_tax_deferred",
            profile.current_portfolio_tax_deferred,
        ),
        ("annual_contribution", profile.annual_contribution),
        ("expected_annual_spending", profile.expected_annual_spending),
        ("social_security_income", profile.social_security_income),
    ] {
        require_non_negative(label, value)?;
    }

    if !profile.withdrawal_rate.is_finite() || profile.withdrawal_rate <= 0.0 {
        return Err(EngineError::validation("withdrawal_rate must be > 0"));
    }
    for (label, value) in [
        ("growth_rate", profile.growth_rate),
        ("inflation_rate", profile.inflation_rate),
    ] {
        if !value.is_finite() || value <= -1.0 {
            return Err(EngineError::validation(format!("{label} must be > -100%")));
        }
    }

    for windfall in &profile.windfalls {
        require_non_negative("windfall amount", windfall.amount)?;
    }

    if let Some(expense) = &profile.large_expense {
        require_non_negative("large_expense amount", expense.amount)?;
        if !(0.0..=1.0).contains(&expense.contribution_reduction) {
            return Err(EngineError::validation(
                "large_expense contribution_reduction must be between 0 and 1",
            ));
        }
        if expense.amount > profile.current_total_portfolio() * 2.0 {
            warn!(
                amount = expense.amount,
                portfolio = profile.current_total_portfolio(),
                "large expense exceeds twice the current portfolio"
            );
        }
    }

    if let Some(window) = &profile.part_time {
        if window.start_age > window.end_age {
            return Err(EngineError::validation(
                "part_time_start_age must be <= part_time_end_age",
            ));
        }
        require_non_negative("part_time_income", window.income)?;
        require_non_negative("reduced_spending", window.reduced_spending)?;
        if window.end_age < profile.current_age || window.start_age > profile.life_expectancy {
            warn!(
                start_age = window.start_age,
                end_age = window.end_age,
                "part-time window lies outside the projection horizon"
            );
        }
    }

    Ok(())
}

/// Parameter bounds plus the requirement that the simulated ages stay within
/// [`MAX_AGE`].
pub fn validate_monte_carlo(
    profile: &FinancialProfile,
    params: &MonteCarloParams,
) -> Result<(), EngineError> {
    if params.num_simulations == 0 || params.num_simulations > MAX_SIMULATIONS {
        return Err(EngineError::validation(format!(
            "num_simulations must be between 1 and {MAX_SIMULATIONS}"
        )));
    }
    if params.years == 0 || params.years > MAX_MONTE_CARLO_YEARS {
        return Err(EngineError::validation(format!(
            "years must be between 1 and {MAX_MONTE_CARLO_YEARS}"
        )));
    }
    if !params.volatility.is_finite() || params.volatility < 0.0 {
        return Err(EngineError::validation("volatility must be >= 0"));
    }
    let final_age = profile.current_age.checked_add(params.years);
    if final_age.is_none_or(|age| age > MAX_AGE) {
        return Err(EngineError::validation(format!(
            "current_age + years must be <= {MAX_AGE}"
        )));
    }
    Ok(())
}

fn require_non_negative(label: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::validation(format!("{label} must be >= 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::sample_profile;
    use crate::core::{LargeExpense, PartTimeWindow};

    fn assert_rejects(profile: &FinancialProfile, needle: &str) {
        let err = validate_profile(profile).expect_err("profile must be rejected");
        assert!(err.is_validation());
        assert!(err.to_string().contains(needle), "unexpected error: {err}");
    }

    #[test]
    fn accepts_sample_profile() {
        assert!(validate_profile(&sample_profile()).is_ok());
    }

    #[test]
    fn rejects_current_age_at_life_expectancy() {
        let mut profile = sample_profile();
        profile.current_age = 85;
        assert_rejects(&profile, "life_expectancy");
    }

    #[test]
    fn rejects_non_positive_withdrawal_rate() {
        let mut profile = sample_profile();
        profile.withdrawal_rate = 0.0;
        assert_rejects(&profile, "withdrawal_rate");
    }

    #[test]
    fn rejects_inverted_part_time_window() {
        let mut profile = sample_profile();
        profile.part_time = Some(PartTimeWindow {
            start_age: 60,
            end_age: 55,
            income: 20_000.0,
            reduced_spending: 40_000.0,
        });
        assert_rejects(&profile, "part_time_start_age");
    }

    #[test]
    fn rejects_contribution_reduction_above_one() {
        let mut profile = sample_profile();
        profile.large_expense = Some(LargeExpense {
            target_age: 40,
            amount: 10_000.0,
            contribution_reduction: 1.5,
        });
        assert_rejects(&profile, "contribution_reduction");
    }

    #[test]
    fn rejects_nan_spending() {
        let mut profile = sample_profile();
        profile.expected_annual_spending = f64::NAN;
        assert_rejects(&profile, "expected_annual_spending");
    }

    #[test]
    fn rejects_life_expectancy_beyond_max_age() {
        let mut profile = sample_profile();
        profile.current_age = 0;
        profile.life_expectancy = u32::MAX;
        assert_rejects(&profile, "life_expectancy");
    }

    #[test]
    fn rejects_ages_beyond_max_age() {
        let mut profile = sample_profile();
        profile.current_age = u32::MAX - 5;
        profile.life_expectancy = u32::MAX;
        assert_rejects(&profile, "current_age");

        let mut profile = sample_profile();
        profile.desired_retirement_age = Some(MAX_AGE + 1);
        assert_rejects(&profile, "desired_retirement_age");

        let mut profile = sample_profile();
        profile.life_expectancy = MAX_AGE;
        assert!(validate_profile(&profile).is_ok());
    }

    #[test]
    fn monte_carlo_horizon_must_end_by_max_age() {
        let mut profile = sample_profile();
        profile.current_age = 100;
        profile.life_expectancy = 120;
        let params = MonteCarloParams {
            num_simulations: 10,
            years: 51,
            volatility: 0.15,
            seed: Some(1),
        };
        let err = validate_monte_carlo(&profile, &params).expect_err("must reject");
        assert!(err.to_string().contains("current_age + years"));

        let within = MonteCarloParams { years: 50, ..params };
        assert!(validate_monte_carlo(&profile, &within).is_ok());
    }

    #[test]
    fn monte_carlo_bounds_are_enforced() {
        let profile = sample_profile();
        let base = MonteCarloParams {
            num_simulations: 100,
            years: 30,
            volatility: 0.15,
            seed: Some(1),
        };
        assert!(validate_monte_carlo(&profile, &base).is_ok());

        let too_many = MonteCarloParams {
            num_simulations: MAX_SIMULATIONS + 1,
            ..base
        };
        assert!(validate_monte_carlo(&profile, &too_many).is_err());

        let no_years = MonteCarloParams { years: 0, ..base };
        assert!(validate_monte_carlo(&profile, &no_years).is_err());

        let negative_vol = MonteCarloParams {
            volatility: -0.1,
            ..base
        };
        assert!(validate_monte_carlo(&profile, &negative_vol).is_err());
    }
}
