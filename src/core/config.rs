use super::EngineError;

pub const DEFAULT_BARISTA_PART_TIME_OFFSET: f64 = 0.20;
pub const DEFAULT_RETIREMENT_AGE: u32 = 65;
pub const DEFAULT_MARKET_VOLATILITY: f64 = 0.15;

/// Policy knobs used by the target calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPolicy {
    /// Fraction of annual spending assumed covered by part-time work under
    /// barista FIRE.
    pub barista_part_time_offset: f64,
    /// Retirement age assumed for coast FIRE when the profile has none.
    pub default_retirement_age: u32,
}

impl Default for TargetPolicy {
    fn default() -> Self {
        Self {
            barista_part_time_offset: DEFAULT_BARISTA_PART_TIME_OFFSET,
            default_retirement_age: DEFAULT_RETIREMENT_AGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub target_policy: TargetPolicy,
    /// Standard deviation of annual returns used by Monte Carlo when the
    /// caller does not supply one.
    pub market_volatility: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_policy: TargetPolicy::default(),
            market_volatility: DEFAULT_MARKET_VOLATILITY,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let offset = self.target_policy.barista_part_time_offset;
        if !(0.0..1.0).contains(&offset) {
            return Err(EngineError::validation(
                "barista part-time offset must be in [0, 1)",
            ));
        }
        if !self.market_volatility.is_finite() || self.market_volatility < 0.0 {
            return Err(EngineError::validation("market volatility must be >= 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn full_barista_offset_is_rejected() {
        let mut config = EngineConfig::default();
        config.target_policy.barista_part_time_offset = 1.0;
        let err = config.validate().expect_err("must reject");
        assert!(err.is_validation());
        assert!(err.to_string().contains("barista"));
    }

    #[test]
    fn nan_volatility_is_rejected() {
        let config = EngineConfig {
            market_volatility: f64::NAN,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(EngineError::validation("market volatility must be >= 0"))
        );
    }
}
