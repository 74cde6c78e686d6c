use super::{ProjectionYear, RetirementReadiness};

/// Compares the projected portfolio at the desired retirement age with the
/// target. Ages outside the projection are clamped to its first or last year.
pub fn evaluate_readiness(
    projections: &[ProjectionYear],
    target_portfolio: f64,
    desired_retirement_age: Option<u32>,
) -> RetirementReadiness {
    let Some(retirement_age) = desired_retirement_age else {
        return not_applicable("No desired retirement age specified");
    };
    let (Some(first), Some(last)) = (projections.first(), projections.last()) else {
        return not_applicable("No projections to evaluate");
    };

    let clamped_age = retirement_age.clamp(first.age, last.age);
    let at_retirement = projections
        .iter()
        .find(|row| row.age == clamped_age)
        .unwrap_or(last);

    let portfolio_at_retirement = at_retirement.portfolio_value;
    let on_track = portfolio_at_retirement >= target_portfolio;
    let shortfall = (target_portfolio - portfolio_at_retirement).max(0.0);
    let message = format!(
        "{} for retirement at age {retirement_age}",
        if on_track { "On track" } else { "Not on track" }
    );

    RetirementReadiness {
        on_track: Some(on_track),
        message,
        years_to_desired_retirement: Some(at_retirement.age - first.age),
        portfolio_at_retirement: Some(portfolio_at_retirement),
        target_portfolio: Some(target_portfolio),
        shortfall: Some(shortfall),
    }
}

fn not_applicable(message: &str) -> RetirementReadiness {
    RetirementReadiness {
        on_track: None,
        message: message.to_string(),
        years_to_desired_retirement: None,
        portfolio_at_retirement: None,
        target_portfolio: None,
        shortfall: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project;
    use crate::core::test_support::{assert_approx, sample_profile};

    fn projections() -> Vec<ProjectionYear> {
        project(&sample_profile(), 1_500_000.0).expect("projection")
    }

    #[test]
    fn missing_age_is_not_applicable() {
        let result = evaluate_readiness(&projections(), 1_500_000.0, None);
        assert_eq!(result.on_track, None);
        assert_eq!(result.shortfall, None);
        assert!(result.message.contains("No desired retirement age"));
    }

    #[test]
    fn short_horizon_reports_shortfall() {
        let rows = projections();
        let result = evaluate_readiness(&rows, 1_500_000.0, Some(32));
        assert_eq!(result.on_track, Some(false));
        assert_eq!(result.years_to_desired_retirement, Some(2));
        assert_approx(result.portfolio_at_retirement.expect("value"), 194_862.5);
        assert_approx(result.shortfall.expect("shortfall"), 1_500_000.0 - 194_862.5);
        assert_eq!(result.message, "Not on track for retirement at age 32");
    }

    #[test]
    fn reached_target_has_no_shortfall() {
        let rows = projections();
        let result = evaluate_readiness(&rows, 100_000.0, Some(40));
        assert_eq!(result.on_track, Some(true));
        assert_approx(result.shortfall.expect("shortfall"), 0.0);
        assert_approx(result.target_portfolio.expect("target"), 100_000.0);
    }

    #[test]
    fn ages_outside_the_projection_are_clamped() {
        let rows = projections();
        let late = evaluate_readiness(&rows, 1_500_000.0, Some(120));
        assert_eq!(late.years_to_desired_retirement, Some(55));
        assert_approx(
            late.portfolio_at_retirement.expect("value"),
            rows[55].portfolio_value,
        );

        let early = evaluate_readiness(&rows, 1_500_000.0, Some(20));
        assert_eq!(early.years_to_desired_retirement, Some(0));
        assert_approx(early.portfolio_at_retirement.expect("value"), 125_000.0);
    }

    #[test]
    fn empty_projection_is_not_applicable() {
        let result = evaluate_readiness(&[], 1_500_000.0, Some(60));
        assert_eq!(result.on_track, None);
    }
}
