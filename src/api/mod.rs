use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    CalculationReport, EngineConfig, EngineError, FinancialProfile, FireType, LargeExpense,
    MonteCarloParams, MonteCarloResult, PartTimeWindow, Scenario, ScenarioKind, ScenarioRun,
    Windfall, calculate, calculate_fire_target, run_monte_carlo, run_scenario,
};

const DEFAULT_WITHDRAWAL_RATE_PCT: f64 = 4.0;
const DEFAULT_SOCIAL_SECURITY_AGE: u32 = 67;
const DEFAULT_LIFE_EXPECTANCY: u32 = 85;
const DEFAULT_NUM_SIMULATIONS: u32 = 1_000;
const DEFAULT_MONTE_CARLO_YEARS: u32 = 30;
const SCENARIO_DEFAULT_GROWTH_PCT: f64 = 7.0;
const SCENARIO_DEFAULT_INFLATION_PCT: f64 = 3.0;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid JSON payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(EngineError::Simulation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Profile fields as the form posts them. Rates are percentages.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfilePayload {
    current_age: Option<u32>,
    current_portfolio_taxable: Option<f64>,
    current_portfolio_tax_deferred: Option<f64>,
    annual_contribution: Option<f64>,
    expected_annual_spending: Option<f64>,
    growth_rate: Option<f64>,
    inflation_rate: Option<f64>,
    withdrawal_rate: Option<f64>,
    social_security_income: Option<f64>,
    social_security_age: Option<u32>,
    desired_retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    fire_type: Option<FireType>,
    windfalls: Vec<Windfall>,
    large_expense: Option<LargeExpensePayload>,
}

#[derive(Debug, Deserialize)]
struct LargeExpensePayload {
    target_age: u32,
    amount: f64,
    #[serde(default)]
    contribution_reduction: f64,
}

#[derive(Debug, Deserialize)]
struct ScenarioPayload {
    #[serde(flatten)]
    profile: ProfilePayload,
    scenario_type: ScenarioKind,
    part_time_income: Option<f64>,
    part_time_start_age: Option<u32>,
    part_time_end_age: Option<u32>,
    reduced_spending: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MonteCarloPayload {
    #[serde(flatten)]
    profile: ProfilePayload,
    num_simulations: Option<u32>,
    years: Option<u32>,
    volatility: Option<f64>,
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ApiError> {
    value.ok_or(ApiError::MissingField(field))
}

fn build_profile(payload: ProfilePayload) -> Result<FinancialProfile, ApiError> {
    let large_expense = payload.large_expense.map(|e| LargeExpense {
        target_age: e.target_age,
        amount: e.amount,
        contribution_reduction: e.contribution_reduction,
    });

    Ok(FinancialProfile {
        current_age: required(payload.current_age, "current_age")?,
        current_portfolio_taxable: required(
            payload.current_portfolio_taxable,
            "current_portfolio_taxable",
        )?,
        current_portfolio_tax_deferred: required(
            payload.current_portfolio_tax_deferred,
            "current_portfolio_tax_deferred",
        )?,
        annual_contribution: required(payload.annual_contribution, "annual_contribution")?,
        expected_annual_spending: required(
            payload.expected_annual_spending,
            "expected_annual_spending",
        )?,
        growth_rate: required(payload.growth_rate, "growth_rate")? / 100.0,
        inflation_rate: required(payload.inflation_rate, "inflation_rate")? / 100.0,
        withdrawal_rate: payload
            .withdrawal_rate
            .unwrap_or(DEFAULT_WITHDRAWAL_RATE_PCT)
            / 100.0,
        desired_retirement_age: payload.desired_retirement_age,
        social_security_income: payload.social_security_income.unwrap_or(0.0),
        social_security_age: payload
            .social_security_age
            .unwrap_or(DEFAULT_SOCIAL_SECURITY_AGE),
        life_expectancy: payload.life_expectancy.unwrap_or(DEFAULT_LIFE_EXPECTANCY),
        fire_type: payload.fire_type.unwrap_or_default(),
        windfalls: payload.windfalls,
        large_expense,
        part_time: None,
    })
}

pub fn calculate_from_json(
    json: &str,
    config: &EngineConfig,
) -> Result<CalculationReport, ApiError> {
    let payload = serde_json::from_str::<ProfilePayload>(json)?;
    let profile = build_profile(payload)?;
    Ok(calculate(&profile, config)?)
}

pub fn scenario_from_json(json: &str, config: &EngineConfig) -> Result<ScenarioRun, ApiError> {
    let mut payload = serde_json::from_str::<ScenarioPayload>(json)?;
    let fields = &mut payload.profile;
    fields.annual_contribution.get_or_insert(0.0);
    fields.growth_rate.get_or_insert(SCENARIO_DEFAULT_GROWTH_PCT);
    fields
        .inflation_rate
        .get_or_insert(SCENARIO_DEFAULT_INFLATION_PCT);

    let scenario = match payload.scenario_type {
        ScenarioKind::NoContributions => Scenario::NoContributions,
        ScenarioKind::PartTime => Scenario::PartTime(PartTimeWindow {
            start_age: required(payload.part_time_start_age, "part_time_start_age")?,
            end_age: required(payload.part_time_end_age, "part_time_end_age")?,
            income: required(payload.part_time_income, "part_time_income")?,
            reduced_spending: required(payload.reduced_spending, "reduced_spending")?,
        }),
        other => {
            return Err(EngineError::validation(format!(
                "scenario_type {other:?} is not available here; use no_contributions or part_time"
            ))
            .into());
        }
    };

    let profile = build_profile(payload.profile)?;
    Ok(run_scenario(&profile, &scenario, &config.target_policy)?)
}

pub fn monte_carlo_from_json(
    json: &str,
    config: &EngineConfig,
) -> Result<MonteCarloResult, ApiError> {
    let payload = serde_json::from_str::<MonteCarloPayload>(json)?;
    let profile = build_profile(payload.profile)?;

    let params = MonteCarloParams {
        num_simulations: payload.num_simulations.unwrap_or(DEFAULT_NUM_SIMULATIONS),
        years: payload
            .years
            .unwrap_or_else(|| DEFAULT_MONTE_CARLO_YEARS.min(profile.horizon_years())),
        volatility: payload
            .volatility
            .map_or(config.market_volatility, |pct| pct / 100.0),
        seed: payload.seed,
    };
    let target = calculate_fire_target(&profile, &config.target_policy, profile.fire_type);
    Ok(run_monte_carlo(&profile, &params, target.target_portfolio)?)
}

pub fn router(config: EngineConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/calculate", post(calculate_handler))
        .route("/scenario", post(scenario_handler))
        .route("/monte_carlo", post(monte_carlo_handler))
        .fallback(not_found_handler)
        .with_state(config)
}

pub async fn run_http_server(port: u16, config: EngineConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "FIRE projection API listening");

    axum::serve(listener, router(config)).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_handler(State(config): State<EngineConfig>, body: String) -> Response {
    debug!(bytes = body.len(), "calculate request");
    respond(calculate_from_json(&body, &config))
}

async fn scenario_handler(State(config): State<EngineConfig>, body: String) -> Response {
    debug!(bytes = body.len(), "scenario request");
    respond(scenario_from_json(&body, &config))
}

async fn monte_carlo_handler(State(config): State<EngineConfig>, body: String) -> Response {
    debug!(bytes = body.len(), "monte carlo request");
    match tokio::task::spawn_blocking(move || monte_carlo_from_json(&body, &config)).await {
        Ok(outcome) => respond(outcome),
        Err(e) => {
            warn!(error = %e, "monte carlo task aborted");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Simulation aborted")
        }
    }
}

fn respond<T: Serialize>(outcome: Result<T, ApiError>) -> Response {
    match outcome {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => {
            warn!(error = %e, "request rejected");
            error_response(e.status(), &e.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
