mod aggregate;
mod catalogue;
mod engine;
mod error;
mod projection;
mod rates;
mod summary;
mod types;
mod viability;

pub use aggregate::{
    IDLE_CASH_NAME, IDLE_CASH_RISK, IdleCashPolicy, aggregate, aggregate_with_policy,
};
pub use catalogue::{
    Catalogue, LIVE_RETURN_WEIGHT, PRESETS, Preset, PresetKind, blend_return, preset,
};
pub use engine::{scheduled_cashflow, simulate};
pub use error::{EngineError, Result};
pub use projection::{Projection, ProjectionRequest, project};
pub use rates::{
    MarketRates, REAL_RATE_EPSILON, RateFetchError, RateOrigin, RateSource, ResolvedRates,
    StaticRates, monthly_rate, real_growth_factor, resolve_rates, safe_ratio,
};
pub use summary::{BenchmarkVerdict, RiskBand, Summary, percent_of, summarize};
pub use types::{
    Allocation, AssetClass, BlendedProfile, ContributingAsset, Instrument, RetirementScenario,
    Series, Severity, SimulationInputs, Trajectory, ViabilityReport, WithdrawalPlan,
};
pub use viability::{classify_viability, required_capital};
