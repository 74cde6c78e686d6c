use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::projector::{project, years_to_fire};
use super::readiness::evaluate_readiness;
use super::scenarios::{ScenarioComparison, compare_scenarios};
use super::targets::{
    calculate_fire_target, calculate_fire_targets, social_security_adjusted_target,
};
use super::validation::validate_profile;
use super::{
    EngineConfig, EngineError, FinancialProfile, FireTarget, FireType, ProjectionYear,
    RetirementReadiness,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationReport {
    pub target_portfolio: f64,
    pub years_to_fire: Option<u32>,
    pub fire_age: Option<u32>,
    pub retirement_readiness: RetirementReadiness,
    pub projections: Vec<ProjectionYear>,
    pub fire_targets: BTreeMap<FireType, FireTarget>,
    pub current_fire_type: FireType,
    pub scenarios: ScenarioComparison,
}

/// Full analysis for one profile: targets for every variant, the projection
/// against the selected variant, readiness and the comparison scenarios.
pub fn calculate(
    profile: &FinancialProfile,
    config: &EngineConfig,
) -> Result<CalculationReport, EngineError> {
    validate_profile(profile)?;
    let policy = &config.target_policy;

    let fire_targets = calculate_fire_targets(profile, policy);
    let target_portfolio =
        calculate_fire_target(profile, policy, profile.fire_type).target_portfolio;

    let projections = project(profile, target_portfolio)?;
    let years_to_fire = years_to_fire(&projections);

    let retires_on_social_security = profile
        .desired_retirement_age
        .is_some_and(|age| age >= profile.social_security_age)
        && profile.social_security_income > 0.0;
    let readiness_target = if retires_on_social_security {
        social_security_adjusted_target(profile, policy, profile.fire_type)
    } else {
        target_portfolio
    };
    let retirement_readiness = evaluate_readiness(
        &projections,
        readiness_target,
        profile.desired_retirement_age,
    );

    let scenarios = compare_scenarios(profile, policy)?;
    debug!(
        fire_type = profile.fire_type.as_str(),
        target_portfolio,
        years_to_fire = ?years_to_fire,
        "calculation complete"
    );

    Ok(CalculationReport {
        target_portfolio,
        years_to_fire,
        fire_age: years_to_fire.map(|years| profile.current_age + years),
        retirement_readiness,
        projections,
        fire_targets,
        current_fire_type: profile.fire_type,
        scenarios,
    })
}
