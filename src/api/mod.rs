use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    Catalogue, EngineError, Instrument, LIVE_RETURN_WEIGHT, MarketRates, PRESETS, Preset,
    Projection, ProjectionRequest, RateFetchError, RateSource, ResolvedRates, RetirementScenario,
    StaticRates, preset, project, resolve_rates,
};

const MAX_HORIZON_YEARS: u32 = 40;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPreset {
    Conservative,
    Moderate,
    Aggressive,
    DividendKings,
    AllWeather,
    Agribusiness,
    Endowment,
    RetirementIncome,
    CryptoSpice,
}

impl CliPreset {
    fn key(self) -> &'static str {
        match self {
            CliPreset::Conservative => "conservative",
            CliPreset::Moderate => "moderate",
            CliPreset::Aggressive => "aggressive",
            CliPreset::DividendKings => "dividend-kings",
            CliPreset::AllWeather => "all-weather",
            CliPreset::Agribusiness => "agribusiness",
            CliPreset::Endowment => "endowment",
            CliPreset::RetirementIncome => "retirement-income",
            CliPreset::CryptoSpice => "crypto-spice",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPreset {
    Conservative,
    Moderate,
    Aggressive,
    #[serde(alias = "dividendKings", alias = "dividend_kings")]
    DividendKings,
    #[serde(alias = "allWeather", alias = "all_weather")]
    AllWeather,
    Agribusiness,
    Endowment,
    #[serde(alias = "retirementIncome", alias = "retirement_income")]
    RetirementIncome,
    #[serde(alias = "cryptoSpice", alias = "crypto_spice")]
    CryptoSpice,
}

impl From<ApiPreset> for CliPreset {
    fn from(value: ApiPreset) -> Self {
        match value {
            ApiPreset::Conservative => CliPreset::Conservative,
            ApiPreset::Moderate => CliPreset::Moderate,
            ApiPreset::Aggressive => CliPreset::Aggressive,
            ApiPreset::DividendKings => CliPreset::DividendKings,
            ApiPreset::AllWeather => CliPreset::AllWeather,
            ApiPreset::Agribusiness => CliPreset::Agribusiness,
            ApiPreset::Endowment => CliPreset::Endowment,
            ApiPreset::RetirementIncome => CliPreset::RetirementIncome,
            ApiPreset::CryptoSpice => CliPreset::CryptoSpice,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    initial_amount: Option<f64>,
    monthly_contribution: Option<f64>,
    horizon_years: Option<u32>,

    inflation_rate: Option<f64>,
    benchmark_index_rate: Option<f64>,
    low_yield_rate: Option<f64>,

    preset: Option<ApiPreset>,
    weights: Option<BTreeMap<String, f64>>,
    market_returns: Option<BTreeMap<String, f64>>,
    live_return_weight: Option<f64>,

    retirement: Option<bool>,
    monthly_withdrawal: Option<f64>,
    withdrawal_start_year: Option<u32>,
}

fn parse_named_value(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing instrument name in '{raw}'"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid number in '{raw}': {e}"))?;
    Ok((name.to_string(), value))
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Monthly portfolio projection against a benchmark index and a low-yield reference"
)]
struct Cli {
    #[arg(long, default_value_t = 10_000.0, help = "Lump sum invested at month 0")]
    initial_amount: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_contribution: f64,
    #[arg(long, default_value_t = 10, help = "Projection horizon in years (1-40)")]
    horizon_years: u32,
    #[arg(
        long,
        default_value_t = 4.5,
        help = "Expected annual inflation in percent"
    )]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 10.75,
        help = "Annual benchmark interest-rate index in percent"
    )]
    benchmark_index_rate: f64,
    #[arg(
        long,
        default_value_t = 6.17,
        help = "Annual low-yield savings reference in percent; also the idle-cash rate"
    )]
    low_yield_rate: f64,
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with_all = ["inflation_rate", "benchmark_index_rate", "low_yield_rate"],
        help = "JSON rate bundle (inflation, benchmarkIndex, lowYield); defaults apply if unusable"
    )]
    rates_file: Option<PathBuf>,
    #[arg(long, value_enum, help = "Start from a named allocation")]
    preset: Option<CliPreset>,
    #[arg(
        long = "weight",
        value_name = "NAME=WEIGHT",
        value_parser = parse_named_value,
        help = "Instrument weight; repeatable, overrides --preset"
    )]
    weights: Vec<(String, f64)>,
    #[arg(
        long = "market-return",
        value_name = "NAME=PCT",
        value_parser = parse_named_value,
        help = "Live annual return blended into an instrument's baseline; repeatable"
    )]
    market_returns: Vec<(String, f64)>,
    #[arg(
        long,
        default_value_t = LIVE_RETURN_WEIGHT,
        help = "Share of the live return in the blended figure, 0-1"
    )]
    live_return_weight: f64,
    #[arg(long, help = "Enable the retirement withdrawal scenario")]
    retirement: bool,
    #[arg(long, default_value_t = 100.0, help = "Desired monthly income")]
    monthly_withdrawal: f64,
    #[arg(
        long,
        default_value_t = 5,
        help = "Years from now when withdrawals begin"
    )]
    withdrawal_start_year: u32,
}

#[derive(Debug)]
struct ApiRequest {
    projection: ProjectionRequest,
    rates_file: Option<PathBuf>,
    market_returns: Vec<(String, f64)>,
    live_return_weight: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    rates: ResolvedRates,
    horizon_years: u32,
    retirement: RetirementScenario,
    #[serde(flatten)]
    projection: Projection,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<ApiRequest, String> {
    for (name, amount) in [
        ("--initial-amount", cli.initial_amount),
        ("--monthly-contribution", cli.monthly_contribution),
        ("--monthly-withdrawal", cli.monthly_withdrawal),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    if !(1..=MAX_HORIZON_YEARS).contains(&cli.horizon_years) {
        return Err(format!(
            "--horizon-years must be between 1 and {MAX_HORIZON_YEARS}"
        ));
    }

    for (name, rate) in [
        ("--inflation-rate", cli.inflation_rate),
        ("--benchmark-index-rate", cli.benchmark_index_rate),
        ("--low-yield-rate", cli.low_yield_rate),
    ] {
        if !rate.is_finite() || rate <= -100.0 {
            return Err(format!("{name} must be > -100"));
        }
    }

    if cli.retirement && cli.withdrawal_start_year > cli.horizon_years {
        return Err("--withdrawal-start-year must be <= --horizon-years".to_string());
    }

    if !(0.0..=1.0).contains(&cli.live_return_weight) {
        return Err("--live-return-weight must be between 0 and 1".to_string());
    }

    for (name, weight) in &cli.weights {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(format!("--weight {name} must be >= 0"));
        }
    }

    for (name, live) in &cli.market_returns {
        if !live.is_finite() || *live <= -100.0 {
            return Err(format!("--market-return {name} must be > -100"));
        }
    }

    let allocation = if !cli.weights.is_empty() {
        cli.weights.into_iter().collect()
    } else {
        cli.preset
            .and_then(|p| preset(p.key()))
            .map(Preset::allocation)
            .unwrap_or_default()
    };

    Ok(ApiRequest {
        projection: ProjectionRequest {
            allocation,
            rates: MarketRates {
                inflation: cli.inflation_rate,
                benchmark_index: cli.benchmark_index_rate,
                low_yield: cli.low_yield_rate,
            },
            initial_amount: cli.initial_amount,
            monthly_contribution: cli.monthly_contribution,
            horizon_years: cli.horizon_years,
            retirement: RetirementScenario {
                enabled: cli.retirement,
                monthly_withdrawal: cli.monthly_withdrawal,
                start_year: cli.withdrawal_start_year,
            },
        },
        rates_file: cli.rates_file,
        market_returns: cli.market_returns,
        live_return_weight: cli.live_return_weight,
    })
}

struct RatesFile<'a> {
    path: &'a Path,
}

impl RateSource for RatesFile<'_> {
    fn name(&self) -> &str {
        "rates-file"
    }

    fn fetch(&self) -> Result<MarketRates, RateFetchError> {
        let unavailable =
            |e: String| RateFetchError::Unavailable(format!("{}: {e}", self.path.display()));
        let raw = fs::read_to_string(self.path).map_err(|e| unavailable(e.to_string()))?;
        let rates: MarketRates =
            serde_json::from_str(&raw).map_err(|e| unavailable(e.to_string()))?;
        if [rates.inflation, rates.benchmark_index, rates.low_yield]
            .iter()
            .any(|r| *r <= -100.0)
        {
            return Err(unavailable("rates must be > -100".to_string()));
        }
        Ok(rates)
    }
}

fn run_request(request: ApiRequest) -> Result<SimulateResponse, EngineError> {
    let catalogue = Catalogue::default_catalogue().with_market_returns(
        request
            .market_returns
            .iter()
            .map(|(name, live)| (name.as_str(), *live)),
        request.live_return_weight,
    )?;

    let mut projection_request = request.projection;
    let fallback = MarketRates::default();
    let rates = match &request.rates_file {
        Some(path) => resolve_rates(&RatesFile { path }, fallback),
        None => resolve_rates(&StaticRates(projection_request.rates), fallback),
    };
    projection_request.rates = rates.rates;

    let projection = project(&projection_request, &catalogue)?;
    Ok(SimulateResponse {
        rates,
        horizon_years: projection_request.horizon_years,
        retirement: projection_request.retirement,
        projection,
    })
}

pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let request = build_inputs(cli)?;
    let response = run_request(request).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&response).map_err(|e| format!("failed to render result: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/catalogue", get(catalogue_handler))
        .route("/api/presets", get(presets_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("projection HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn catalogue_handler() -> Response {
    let catalogue = Catalogue::default_catalogue();
    let instruments: Vec<&Instrument> = catalogue.iter().collect();
    json_response(StatusCode::OK, instruments)
}

async fn presets_handler() -> Response {
    json_response(StatusCode::OK, &PRESETS[..])
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(
    Query(mut payload): Query<SimulatePayload>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    if let Err(msg) = apply_query_pairs(&mut payload, &pairs) {
        debug!(error = %msg, "rejected simulate query");
        return error_response(StatusCode::BAD_REQUEST, &msg);
    }
    simulate_handler_impl(payload).await
}

// Query strings cannot carry nested maps, so GET takes repeated `weight=NAME=VALUE` and
// `marketReturn=NAME=VALUE` pairs instead.
fn apply_query_pairs(
    payload: &mut SimulatePayload,
    pairs: &[(String, String)],
) -> Result<(), String> {
    for (key, value) in pairs {
        let target = match key.as_str() {
            "weight" => &mut payload.weights,
            "marketReturn" => &mut payload.market_returns,
            k if k.starts_with("weights") || k.starts_with("marketReturns") => {
                return Err(format!(
                    "unsupported query key '{k}'; use repeated weight=NAME=VALUE pairs"
                ));
            }
            _ => continue,
        };
        let (name, number) = parse_named_value(value).map_err(|e| format!("{key}: {e}"))?;
        target.get_or_insert_with(BTreeMap::new).insert(name, number);
    }
    Ok(())
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            debug!(error = %msg, "rejected simulate payload");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match run_request(request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(e) => {
            warn!(error = %e, "projection failed on catalogue lookup");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
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

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_amount {
        cli.initial_amount = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.horizon_years {
        cli.horizon_years = v;
    }

    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.benchmark_index_rate {
        cli.benchmark_index_rate = v;
    }
    if let Some(v) = payload.low_yield_rate {
        cli.low_yield_rate = v;
    }

    if let Some(v) = payload.preset {
        cli.preset = Some(v.into());
    }
    if let Some(v) = payload.weights {
        cli.weights = v.into_iter().collect();
    }
    if let Some(v) = payload.market_returns {
        cli.market_returns = v.into_iter().collect();
    }
    if let Some(v) = payload.live_return_weight {
        cli.live_return_weight = v;
    }

    if let Some(v) = payload.retirement {
        cli.retirement = v;
    }
    if let Some(v) = payload.monthly_withdrawal {
        cli.monthly_withdrawal = v;
    }
    if let Some(v) = payload.withdrawal_start_year {
        cli.withdrawal_start_year = v;
    }

    build_inputs(cli)
}

fn default_cli_for_api() -> Cli {
    let rates = MarketRates::default();
    Cli {
        initial_amount: 10_000.0,
        monthly_contribution: 0.0,
        horizon_years: 10,
        inflation_rate: rates.inflation,
        benchmark_index_rate: rates.benchmark_index,
        low_yield_rate: rates.low_yield,
        rates_file: None,
        preset: None,
        weights: Vec::new(),
        market_returns: Vec::new(),
        live_return_weight: LIVE_RETURN_WEIGHT,
        retirement: false,
        monthly_withdrawal: 100.0,
        withdrawal_start_year: 5,
    }
}
