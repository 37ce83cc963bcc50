//! Dualcast CLI: serve, one-shot forecast, feature export and advice commands.
//!
//! Commands:
//! - `serve`: start the HTTP server
//! - `forecast`: run the forecast pipeline once on a JSON request
//! - `features`: build a request's feature frame and write it as Parquet
//! - `analyze`: classify news sentiment and generate advice

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dualcast_core::advice::AdviceService;
use dualcast_core::data::{read_bars_csv, WireBar};
use dualcast_core::features::export::write_parquet;
use dualcast_core::forecast::ForecastModels;
use dualcast_core::{ForecastRequest, ForecastService, ServiceConfig};
use dualcast_server::AppState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dualcast",
    about = "Dualcast: macro-aware dual-model price forecasting"
)]
struct Cli {
    /// TOML config file. Defaults plus environment overrides when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Run the forecast pipeline once and print the wire response.
    Forecast {
        /// JSON request body (`symbol`, `current_data`, `fred_key`).
        #[arg(long)]
        request: PathBuf,

        /// Reference date for the economic context (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Build the feature frame for a request and write it as Parquet.
    Features {
        /// JSON request body, or a CSV of bars (`date,open,high,low,close,volume`).
        #[arg(long)]
        request: PathBuf,

        /// Symbol for CSV input. JSON requests carry their own.
        #[arg(long)]
        symbol: Option<String>,

        /// Reference date for the economic context (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Output Parquet file.
        #[arg(long)]
        output: PathBuf,
    },
    /// Classify news sentiment and generate investment advice.
    Analyze {
        #[arg(long)]
        symbol: String,

        #[arg(long)]
        news: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::load(cli.config.as_deref())
        .with_context(|| "failed to load configuration")?;

    match cli.command {
        Commands::Serve => run_serve(&config),
        Commands::Forecast { request, as_of } => run_forecast(&config, &request, as_of.as_deref()),
        Commands::Features {
            request,
            symbol,
            as_of,
            output,
        } => run_features(&config, &request, symbol, as_of.as_deref(), &output),
        Commands::Analyze { symbol, news } => run_analyze(&config, &symbol, &news),
    }
}

/// Blocking HTTP clients are built here, before any async runtime exists.
fn build_forecast_service(config: &ServiceConfig) -> Result<ForecastService> {
    let models = Arc::new(ForecastModels::load(&config.models));
    info!(
        context = models.context.is_available(),
        univariate = models.univariate.is_available(),
        "forecast models loaded"
    );
    Ok(ForecastService::from_config(config, models)?)
}

fn run_serve(config: &ServiceConfig) -> Result<()> {
    let forecast = build_forecast_service(config)?;
    let advice = AdviceService::from_config(&config.advice)?;
    let state = AppState::new(forecast, advice);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(dualcast_server::serve(state, &config.server))?;
    Ok(())
}

fn run_forecast(config: &ServiceConfig, request_path: &Path, as_of: Option<&str>) -> Result<()> {
    let request = read_json_request(request_path)?;
    let service = build_forecast_service(config)?;
    let response = service.forecast(&request, parse_as_of(as_of)?)?;

    for (label, outcome) in [("tft", &response.context), ("nbeats", &response.univariate)] {
        if let Some(reason) = outcome.fallback_reason() {
            eprintln!("{label}: zero fallback ({reason})");
        }
    }
    println!("{}", serde_json::to_string(&response.to_wire()?)?);
    Ok(())
}

fn run_features(
    config: &ServiceConfig,
    request_path: &Path,
    symbol: Option<String>,
    as_of: Option<&str>,
    output: &Path,
) -> Result<()> {
    let is_csv = request_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let request = if is_csv {
        let file = std::fs::File::open(request_path)
            .with_context(|| format!("failed to open {}", request_path.display()))?;
        let bars = read_bars_csv(file)?;
        ForecastRequest {
            symbol,
            current_data: bars.iter().map(WireBar::from).collect(),
            fred_key: None,
        }
    } else {
        let mut request = read_json_request(request_path)?;
        if symbol.is_some() {
            request.symbol = symbol;
        }
        request
    };

    let service = build_forecast_service(config)?;
    let prepared = service.prepare(&request, parse_as_of(as_of)?)?;
    write_parquet(&prepared.frame, output)?;

    println!(
        "{}: {} rows, columns [{}] written to {}",
        prepared.symbol,
        prepared.frame.len(),
        prepared
            .frame
            .columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        output.display()
    );
    Ok(())
}

fn run_analyze(config: &ServiceConfig, symbol: &str, news: &str) -> Result<()> {
    if symbol.trim().is_empty() {
        bail!("--symbol must not be empty");
    }
    let service = AdviceService::from_config(&config.advice)?;
    let advice = service.analyze(&symbol.trim().to_uppercase(), news)?;
    println!("{}", serde_json::to_string_pretty(&advice)?);
    Ok(())
}

fn read_json_request(path: &Path) -> Result<ForecastRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid request JSON in {}", path.display()))
}

fn parse_as_of(as_of: Option<&str>) -> Result<NaiveDate> {
    match as_of {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --as-of date '{s}'")),
        None => Ok(chrono::Utc::now().date_naive()),
    }
}
