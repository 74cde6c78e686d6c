use serde::{Deserialize, Serialize};
use tracing::debug;

use super::projector::{project, years_to_fire};
use super::targets::calculate_fire_target;
use super::validation::validate_profile;
use super::{
    EngineError, FinancialProfile, PartTimeWindow, ProjectionYear, ScenarioSummary, TargetPolicy,
};

pub const CONSERVATIVE_GROWTH_RATE: f64 = 0.05;
pub const CONSERVATIVE_INFLATION_RATE: f64 = 0.04;
pub const OPTIMISTIC_GROWTH_RATE: f64 = 0.09;
pub const OPTIMISTIC_INFLATION_RATE: f64 = 0.02;
pub const HIGHER_CONTRIBUTION_MULTIPLIER: f64 = 1.5;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Conservative,
    Optimistic,
    HigherContributions,
    PartTime,
    NoContributions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scenario {
    Conservative,
    Optimistic,
    HigherContributions,
    PartTime(PartTimeWindow),
    NoContributions,
}

impl Scenario {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            Scenario::Conservative => ScenarioKind::Conservative,
            Scenario::Optimistic => ScenarioKind::Optimistic,
            Scenario::HigherContributions => ScenarioKind::HigherContributions,
            Scenario::PartTime(_) => ScenarioKind::PartTime,
            Scenario::NoContributions => ScenarioKind::NoContributions,
        }
    }

    /// The base profile with this scenario's overrides applied.
    pub fn apply(&self, base: &FinancialProfile) -> FinancialProfile {
        let mut profile = base.clone();
        match self {
            Scenario::Conservative => {
                profile.growth_rate = CONSERVATIVE_GROWTH_RATE;
                profile.inflation_rate = CONSERVATIVE_INFLATION_RATE;
            }
            Scenario::Optimistic => {
                profile.growth_rate = OPTIMISTIC_GROWTH_RATE;
                profile.inflation_rate = OPTIMISTIC_INFLATION_RATE;
            }
            Scenario::HigherContributions => {
                profile.annual_contribution *= HIGHER_CONTRIBUTION_MULTIPLIER;
            }
            Scenario::PartTime(window) => {
                profile.part_time = Some(*window);
            }
            Scenario::NoContributions => {
                profile.annual_contribution = 0.0;
            }
        }
        profile
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioRun {
    pub scenario: ScenarioKind,
    pub projections: Vec<ProjectionYear>,
    pub summary: ScenarioSummary,
}

/// Projects one scenario against the target of the profile's FIRE variant,
/// recomputed under the scenario's own assumptions.
pub fn run_scenario(
    base: &FinancialProfile,
    scenario: &Scenario,
    policy: &TargetPolicy,
) -> Result<ScenarioRun, EngineError> {
    let profile = scenario.apply(base);
    validate_profile(&profile)?;

    let target = calculate_fire_target(&profile, policy, profile.fire_type);
    let projections = project(&profile, target.target_portfolio)?;
    let summary = ScenarioSummary {
        years_to_fire: years_to_fire(&projections),
        target_portfolio: target.target_portfolio,
    };
    debug!(
        scenario = ?scenario.kind(),
        years_to_fire = ?summary.years_to_fire,
        "scenario projected"
    );

    Ok(ScenarioRun {
        scenario: scenario.kind(),
        projections,
        summary,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub conservative: ScenarioSummary,
    pub optimistic: ScenarioSummary,
    pub higher_contributions: ScenarioSummary,
}

pub fn compare_scenarios(
    base: &FinancialProfile,
    policy: &TargetPolicy,
) -> Result<ScenarioComparison, EngineError> {
    Ok(ScenarioComparison {
        conservative: run_scenario(base, &Scenario::Conservative, policy)?.summary,
        optimistic: run_scenario(base, &Scenario::Optimistic, policy)?.summary,
        higher_contributions: run_scenario(base, &Scenario::HigherContributions, policy)?
            .summary,
    })
}
