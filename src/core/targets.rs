use std::collections::BTreeMap;

use super::{FinancialProfile, FireTarget, FireType, TargetPolicy};

/// How a variant turns its adjusted spending into a portfolio target.
#[derive(Clone, Copy)]
enum TargetRule {
    /// adjusted spending / withdrawal rate.
    Perpetual,
    /// Present value of the regular target, compounded at the growth rate until
    /// retirement with no further contributions.
    Coast,
}

struct VariantRule {
    fire_type: FireType,
    name: &'static str,
    spending_multiplier: fn(&TargetPolicy) -> f64,
    rule: TargetRule,
}

static VARIANTS: [VariantRule; 5] = [
    VariantRule {
        fire_type: FireType::Lean,
        name: "Lean FIRE",
        spending_multiplier: |_| 0.7,
        rule: TargetRule::Perpetual,
    },
    VariantRule {
        fire_type: FireType::Coast,
        name: "Coast FIRE",
        spending_multiplier: |_| 1.0,
        rule: TargetRule::Coast,
    },
    VariantRule {
        fire_type: FireType::Barista,
        name: "Barista FIRE",
        spending_multiplier: |policy| 1.0 - policy.barista_part_time_offset,
        rule: TargetRule::Perpetual,
    },
    VariantRule {
        fire_type: FireType::Regular,
        name: "Regular FIRE",
        spending_multiplier: |_| 1.0,
        rule: TargetRule::Perpetual,
    },
    VariantRule {
        fire_type: FireType::Fat,
        name: "Fat FIRE",
        spending_multiplier: |_| 1.5,
        rule: TargetRule::Perpetual,
    },
];

pub fn calculate_fire_targets(
    profile: &FinancialProfile,
    policy: &TargetPolicy,
) -> BTreeMap<FireType, FireTarget> {
    VARIANTS
        .iter()
        .map(|variant| (variant.fire_type, build_target(profile, policy, variant)))
        .collect()
}

pub fn calculate_fire_target(
    profile: &FinancialProfile,
    policy: &TargetPolicy,
    fire_type: FireType,
) -> FireTarget {
    build_target(profile, policy, variant_rule(fire_type))
}

fn variant_rule(fire_type: FireType) -> &'static VariantRule {
    let index = match fire_type {
        FireType::Lean => 0,
        FireType::Coast => 1,
        FireType::Barista => 2,
        FireType::Regular => 3,
        FireType::Fat => 4,
    };
    &VARIANTS[index]
}

/// Target once Social Security is flowing: only the spending it leaves
/// uncovered has to come from the portfolio.
pub fn social_security_adjusted_target(
    profile: &FinancialProfile,
    policy: &TargetPolicy,
    fire_type: FireType,
) -> f64 {
    let target = calculate_fire_target(profile, policy, fire_type);
    let uncovered = target.annual_spending - profile.social_security_income;
    (uncovered / profile.withdrawal_rate).max(0.0)
}

fn build_target(
    profile: &FinancialProfile,
    policy: &TargetPolicy,
    variant: &VariantRule,
) -> FireTarget {
    let multiplier = (variant.spending_multiplier)(policy);
    let annual_spending = profile.expected_annual_spending * multiplier;
    let perpetual = annual_spending / profile.withdrawal_rate;

    let target_portfolio = match variant.rule {
        TargetRule::Perpetual => perpetual,
        TargetRule::Coast => {
            let retirement_age = profile
                .desired_retirement_age
                .unwrap_or(policy.default_retirement_age);
            let years = retirement_age.saturating_sub(profile.current_age);
            perpetual / (1.0 + profile.growth_rate).powi(years as i32)
        }
    };

    FireTarget {
        fire_type: variant.fire_type,
        name: variant.name,
        spending_multiplier: multiplier,
        annual_spending,
        withdrawal_rate_used: profile.withdrawal_rate,
        target_portfolio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{assert_approx, sample_profile};
    use proptest::prelude::{prop_assert, proptest};

    #[test]
    fn every_fire_type_resolves_to_its_own_rule() {
        let profile = sample_profile();
        let policy = TargetPolicy::default();
        for fire_type in FireType::ALL {
            assert_eq!(variant_rule(fire_type).fire_type, fire_type);
            let target = calculate_fire_target(&profile, &policy, fire_type);
            assert_eq!(target.fire_type, fire_type);
        }
    }

    #[test]
    fn regular_target_is_spending_over_rate() {
        let targets = calculate_fire_targets(&sample_profile(), &TargetPolicy::default());
        assert_approx(targets[&FireType::Regular].target_portfolio, 1_500_000.0);
        assert_approx(targets[&FireType::Lean].target_portfolio, 1_050_000.0);
        assert_approx(targets[&FireType::Fat].target_portfolio, 2_250_000.0);
        assert_eq!(targets.len(), 5);
    }

    #[test]
    fn barista_uses_policy_offset() {
        let profile = sample_profile();
        let default_target =
            calculate_fire_target(&profile, &TargetPolicy::default(), FireType::Barista);
        assert_approx(default_target.target_portfolio, 48_000.0 / 0.04);

        let policy = TargetPolicy {
            barista_part_time_offset: 0.5,
            ..TargetPolicy::default()
        };
        let half = calculate_fire_target(&profile, &policy, FireType::Barista);
        assert_approx(half.annual_spending, 30_000.0);
        assert_approx(half.target_portfolio, 750_000.0);
    }

    #[test]
    fn coast_target_discounts_regular_target_to_today() {
        let mut profile = sample_profile();
        profile.desired_retirement_age = Some(60);
        let coast = calculate_fire_target(&profile, &TargetPolicy::default(), FireType::Coast);
        assert_approx(coast.target_portfolio, 1_500_000.0 / 1.07_f64.powi(30));

        // Compounding the coast target alone reaches the regular target at 60.
        let grown = coast.target_portfolio * 1.07_f64.powi(30);
        assert_approx(grown, 1_500_000.0);
    }

    #[test]
    fn coast_target_falls_back_to_default_retirement_age() {
        let profile = sample_profile();
        let policy = TargetPolicy {
            default_retirement_age: 50,
            ..TargetPolicy::default()
        };
        let coast = calculate_fire_target(&profile, &policy, FireType::Coast);
        assert_approx(coast.target_portfolio, 1_500_000.0 / 1.07_f64.powi(20));
    }

    #[test]
    fn coast_target_equals_regular_when_already_at_retirement_age() {
        let mut profile = sample_profile();
        profile.desired_retirement_age = Some(25);
        let coast = calculate_fire_target(&profile, &TargetPolicy::default(), FireType::Coast);
        assert_approx(coast.target_portfolio, 1_500_000.0);
    }

    #[test]
    fn social_security_reduces_target_and_never_goes_negative() {
        let mut profile = sample_profile();
        profile.social_security_income = 20_000.0;
        let policy = TargetPolicy::default();
        assert_approx(
            social_security_adjusted_target(&profile, &policy, FireType::Regular),
            1_000_000.0,
        );

        profile.social_security_income = 100_000.0;
        assert_approx(
            social_security_adjusted_target(&profile, &policy, FireType::Regular),
            0.0,
        );
    }

    proptest! {
        #[test]
        fn fat_exceeds_regular_exceeds_lean(
            spending in 1.0_f64..1_000_000.0,
            rate_bps in 1_u32..2_000,
        ) {
            let mut profile = sample_profile();
            profile.expected_annual_spending = spending;
            profile.withdrawal_rate = rate_bps as f64 / 10_000.0;
            let targets = calculate_fire_targets(&profile, &TargetPolicy::default());
            let fat = targets[&FireType::Fat].target_portfolio;
            let regular = targets[&FireType::Regular].target_portfolio;
            let lean = targets[&FireType::Lean].target_portfolio;
            prop_assert!(fat > regular);
            prop_assert!(regular > lean);
        }
    }
}
