use crate::infra::AdvisorState;
use crate::server;
use clap::{Args, Parser, Subcommand, ValueEnum};
use crop_advisor::config::AppConfig;
use crop_advisor::error::AppError;
use crop_advisor::forecast::ForecastRequest;
use crop_advisor::suitability::{ObservationInput, SuitabilityError};
use crop_advisor::telemetry;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "crop-advisor",
    about = "Suggest crops for a site and forecast market prices",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank the best-suited crops for a site observation
    Suggest(SuggestArgs),
    /// Forecast prices for every crop in the price history
    Forecast(ForecastArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct SuggestArgs {
    /// Observation JSON, e.g. '{"phLevel": 6.5, "soilType": "Loamy"}'
    pub(crate) input: Option<String>,
}

/// How `forecast` projects prices.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum ForecastMethod {
    /// Fit the trend forest and average the horizon
    #[default]
    Model,
    /// Extend each crop's oldest-to-newest price move
    History,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ForecastArgs {
    /// Forecasting method
    #[arg(long, value_enum, default_value_t = ForecastMethod::Model)]
    pub(crate) method: ForecastMethod,
    /// Months to forecast ahead (model method only)
    #[arg(long)]
    pub(crate) horizon: Option<u32>,
    /// Seed for the price model and the demo history
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// CSV export with crop_name,month,year,rainfall,wpi,price columns
    #[arg(long)]
    pub(crate) history_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Suggest(args) => emit(run_suggest(args)),
        Command::Forecast(args) => emit(run_forecast(args).await),
    }
}

fn run_suggest(args: SuggestArgs) -> Result<serde_json::Value, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let input = parse_observation(args.input.as_deref())?;
    let report = AdvisorState::from_config(&config.advisor)?.suggest(&input)?;
    Ok(serde_json::to_value(report)?)
}

async fn run_forecast(args: ForecastArgs) -> Result<serde_json::Value, AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    if let Some(seed) = args.seed {
        config.advisor.forecast_seed = seed;
    }
    if let Some(path) = args.history_csv {
        config.advisor.history_csv = Some(path);
    }
    let request = ForecastRequest {
        horizon_months: args.horizon,
        seed: args.seed,
    };

    let advisor = AdvisorState::from_config(&config.advisor)?;
    let view = match args.method {
        ForecastMethod::Model => {
            tokio::task::spawn_blocking(move || advisor.forecast(request)).await??
        }
        ForecastMethod::History => advisor.extrapolate()?,
    };
    Ok(serde_json::to_value(view)?)
}

/// No argument, a blank argument or a JSON `null` all mean no observation.
fn parse_observation(raw: Option<&str>) -> Result<ObservationInput, AppError> {
    let input: Option<ObservationInput> = match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => serde_json::from_str(raw)?,
        None => None,
    };
    input.ok_or_else(|| SuitabilityError::MissingRequiredField("phLevel").into())
}

/// Print the result document, or an error document, as a single JSON value on stdout.
fn emit<T: Serialize>(result: Result<T, AppError>) -> Result<(), AppError> {
    match result {
        Ok(document) => {
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", json!({ "error": err.to_string() }));
            Err(err)
        }
    }
}
