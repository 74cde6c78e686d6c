use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use tracing::debug;

use super::projector::project_path;
use super::validation::{validate_monte_carlo, validate_profile};
use super::{
    EngineError, FinalValueStats, FinancialProfile, MonteCarloParams, MonteCarloResult,
    PercentileBands,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    /// Portfolio value for years 0..=horizon.
    pub values: Vec<f64>,
    pub succeeded: bool,
}

/// Runs `num_simulations` independent trials of the projector with each
/// year's growth drawn from Normal(growth_rate, volatility), then aggregates
/// the trial-by-year value matrix column by column.
pub fn run_monte_carlo(
    profile: &FinancialProfile,
    params: &MonteCarloParams,
    target_portfolio: f64,
) -> Result<MonteCarloResult, EngineError> {
    validate_profile(profile)?;
    validate_monte_carlo(profile, params)?;

    let base_seed = params.seed.unwrap_or_else(rand::random);
    debug!(
        num_simulations = params.num_simulations,
        years = params.years,
        volatility = params.volatility,
        base_seed,
        "running monte carlo"
    );

    let trials = (0..params.num_simulations)
        .into_par_iter()
        .map(|trial| {
            run_trial(
                profile,
                target_portfolio,
                params.years,
                params.volatility,
                trial_seed(base_seed, trial),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let result = aggregate(&trials, params, target_portfolio);
    debug!(success_rate = result.success_rate, "monte carlo finished");
    Ok(result)
}

/// One trial as a pure function of its inputs and seed.
pub fn run_trial(
    profile: &FinancialProfile,
    target_portfolio: f64,
    years: u32,
    volatility: f64,
    seed: u64,
) -> Result<TrialOutcome, EngineError> {
    let returns = Normal::new(profile.growth_rate, volatility)
        .map_err(|e| EngineError::simulation(format!("return distribution error: {e}")))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let rows = project_path(profile, target_portfolio, years, |_| {
        returns.sample(&mut rng)
    })?;
    let reached_target = rows.last().is_some_and(|row| row.fire_achieved);
    let values: Vec<f64> = rows.into_iter().map(|row| row.portfolio_value).collect();

    Ok(TrialOutcome {
        succeeded: trial_succeeded(&values, reached_target),
        values,
    })
}

/// A trial succeeds when its value never drops below zero over the horizon
/// and it reached the target at some year up to and including the last.
pub fn trial_succeeded(values: &[f64], reached_target: bool) -> bool {
    reached_target && values.iter().all(|v| *v >= 0.0)
}

fn aggregate(
    trials: &[TrialOutcome],
    params: &MonteCarloParams,
    target_portfolio: f64,
) -> MonteCarloResult {
    let columns = params.years as usize + 1;
    let mut bands = PercentileBands {
        p10: Vec::with_capacity(columns),
        p25: Vec::with_capacity(columns),
        p50: Vec::with_capacity(columns),
        p75: Vec::with_capacity(columns),
        p90: Vec::with_capacity(columns),
    };

    let mut column = Vec::with_capacity(trials.len());
    for year in 0..columns {
        column.clear();
        column.extend(trials.iter().map(|t| t.values[year]));
        column.sort_by(f64::total_cmp);
        bands.p10.push(sorted_percentile(&column, 10.0));
        bands.p25.push(sorted_percentile(&column, 25.0));
        bands.p50.push(sorted_percentile(&column, 50.0));
        bands.p75.push(sorted_percentile(&column, 75.0));
        bands.p90.push(sorted_percentile(&column, 90.0));
    }

    // The last sorted column holds the final values.
    let finals = &column;
    let n = finals.len().max(1) as f64;
    let mean = finals.iter().sum::<f64>() / n;
    let variance = finals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let successes = trials.iter().filter(|t| t.succeeded).count();

    MonteCarloResult {
        num_simulations: params.num_simulations,
        years: params.years,
        target_portfolio,
        success_rate: successes as f64 / n,
        final_values: FinalValueStats {
            mean,
            median: sorted_percentile(finals, 50.0),
            std: variance.sqrt(),
        },
        percentiles: bands,
    }
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed for trial `trial`: the (trial + 1)-th output of a SplitMix64 stream
/// started at `base_seed`, so seeds do not depend on which thread runs a trial.
fn trial_seed(base_seed: u64, trial: u32) -> u64 {
    let mut z = base_seed.wrapping_add(GOLDEN_GAMMA.wrapping_mul(u64::from(trial) + 1));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Value at `p` percent of an ascending slice, interpolated between the two
/// closest ranks. Empty input yields 0.
fn sorted_percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    match sorted.get(below + 1) {
        Some(above) => sorted[below] + (above - sorted[below]) * (rank - below as f64),
        None => sorted[below],
    }
}
