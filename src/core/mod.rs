mod config;
mod error;
mod monte_carlo;
mod projector;
mod readiness;
mod report;
mod scenarios;
mod targets;
mod types;
mod validation;

pub use config::{
    DEFAULT_BARISTA_PART_TIME_OFFSET, DEFAULT_MARKET_VOLATILITY, DEFAULT_RETIREMENT_AGE,
    EngineConfig, TargetPolicy,
};
pub use error::EngineError;
pub use monte_carlo::{TrialOutcome, run_monte_carlo, run_trial, trial_succeeded};
pub use projector::{project, years_to_fire};
pub use readiness::evaluate_readiness;
pub use report::{CalculationReport, calculate};
pub use scenarios::{
    Scenario, ScenarioComparison, ScenarioKind, ScenarioRun, compare_scenarios, run_scenario,
};
pub use targets::{
    calculate_fire_target, calculate_fire_targets, social_security_adjusted_target,
};
pub use types::{
    FinalValueStats, FinancialProfile, FireTarget, FireType, LargeExpense, MonteCarloParams,
    MonteCarloResult, PartTimeWindow, PercentileBands, Phase, ProjectionYear, RetirementReadiness,
    ScenarioSummary, Windfall,
};
pub use validation::{
    MAX_AGE, MAX_MONTE_CARLO_YEARS, MAX_SIMULATIONS, validate_monte_carlo, validate_profile,
};

#[cfg(test)]
pub(crate) mod test_support {
    use super::{FinancialProfile, FireType};

    const EPS: f64 = 1e-6;

    pub fn assert_approx(actual: f64, expected: f64) {
        assert_approx_tol(actual, expected, EPS);
    }

    pub fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    pub fn sample_profile() -> FinancialProfile {
        FinancialProfile {
            current_age: 30,
            current_portfolio_taxable: 50_000.0,
            current_portfolio_tax_deferred: 75_000.0,
            annual_contribution: 25_000.0,
            expected_annual_spending: 60_000.0,
            growth_rate: 0.07,
            inflation_rate: 0.03,
            withdrawal_rate: 0.04,
            desired_retirement_age: None,
            social_security_income: 0.0,
            social_security_age: 67,
            life_expectancy: 85,
            fire_type: FireType::Regular,
            windfalls: Vec::new(),
            large_expense: None,
            part_time: None,
        }
    }
}
