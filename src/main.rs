use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fire_engine::api::{
    ApiError, calculate_from_json, monte_carlo_from_json, run_http_server, scenario_from_json,
};
use fire_engine::core::{
    DEFAULT_BARISTA_PART_TIME_OFFSET, DEFAULT_MARKET_VOLATILITY, DEFAULT_RETIREMENT_AGE,
    EngineConfig, TargetPolicy,
};

#[derive(Parser, Debug)]
#[command(
    name = "fire-engine",
    about = "FIRE retirement projections: targets, scenarios, readiness and Monte Carlo"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_BARISTA_PART_TIME_OFFSET * 100.0,
        help = "Share of spending covered by part-time work under barista FIRE, in percent"
    )]
    barista_offset: f64,
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_RETIREMENT_AGE,
        help = "Retirement age assumed for coast FIRE when the profile has none"
    )]
    default_retirement_age: u32,
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_MARKET_VOLATILITY * 100.0,
        help = "Annual return volatility in percent when a request omits it"
    )]
    volatility: f64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API over HTTP.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run one operation on a JSON request file and print the response.
    Run {
        #[arg(value_enum)]
        operation: Operation,
        #[arg(long, help = "Path to a JSON request body, same shape as the HTTP API")]
        input: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Operation {
    Calculate,
    Scenario,
    MonteCarlo,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            target_policy: TargetPolicy {
                barista_part_time_offset: self.barista_offset / 100.0,
                default_retirement_age: self.default_retirement_age,
            },
            market_volatility: self.volatility / 100.0,
        }
    }
}

fn run_operation(
    operation: Operation,
    json: &str,
    config: &EngineConfig,
) -> Result<String, ApiError> {
    let rendered = match operation {
        Operation::Calculate => serde_json::to_string_pretty(&calculate_from_json(json, config)?),
        Operation::Scenario => serde_json::to_string_pretty(&scenario_from_json(json, config)?),
        Operation::MonteCarlo => {
            serde_json::to_string_pretty(&monte_carlo_from_json(json, config)?)
        }
    };
    Ok(rendered?)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "fire_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.engine_config();
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(2);
    }

    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = run_http_server(port, config).await {
                error!(error = %e, "server stopped");
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Run { operation, input } => {
            let json = match std::fs::read_to_string(&input) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Failed to read {}: {e}", input.display());
                    std::process::exit(1);
                }
            };
            match run_operation(operation, &json, &config) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
