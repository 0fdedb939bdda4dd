use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Real monthly rate used when the portfolio does not beat inflation.
pub const REAL_RATE_EPSILON: f64 = 0.0001;

pub const DEFAULT_INFLATION_RATE: f64 = 4.50;
pub const DEFAULT_BENCHMARK_INDEX_RATE: f64 = 10.75;
pub const DEFAULT_LOW_YIELD_RATE: f64 = 6.17;

/// Effective monthly rate equivalent to an annual percentage, compounded twelve times.
pub fn monthly_rate(annual_pct: f64) -> f64 {
    (1.0 + annual_pct / 100.0).powf(1.0 / 12.0) - 1.0
}

/// Monthly growth factor of a balance measured in constant purchasing power.
pub fn real_growth_factor(monthly: f64, monthly_inflation: f64) -> f64 {
    (1.0 + monthly) / (1.0 + monthly_inflation)
}

pub fn safe_ratio(numer: f64, denom: f64) -> f64 {
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    numer / denom
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRates {
    pub inflation: f64,
    pub benchmark_index: f64,
    pub low_yield: f64,
}

impl Default for MarketRates {
    fn default() -> Self {
        Self {
            inflation: DEFAULT_INFLATION_RATE,
            benchmark_index: DEFAULT_BENCHMARK_INDEX_RATE,
            low_yield: DEFAULT_LOW_YIELD_RATE,
        }
    }
}

impl MarketRates {
    fn is_finite(&self) -> bool {
        self.inflation.is_finite() && self.benchmark_index.is_finite() && self.low_yield.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateFetchError {
    #[error("rate source unavailable: {0}")]
    Unavailable(String),
    #[error("rate source returned non-finite figures")]
    NonFinite,
}

pub trait RateSource {
    fn name(&self) -> &str;
    fn fetch(&self) -> Result<MarketRates, RateFetchError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRates(pub MarketRates);

impl RateSource for StaticRates {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self) -> Result<MarketRates, RateFetchError> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RateOrigin {
    Source { name: String },
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRates {
    pub rates: MarketRates,
    pub origin: RateOrigin,
}

impl ResolvedRates {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, RateOrigin::Fallback { .. })
    }
}

pub fn resolve_rates(source: &dyn RateSource, fallback: MarketRates) -> ResolvedRates {
    let outcome = source.fetch().and_then(|rates| {
        if rates.is_finite() {
            Ok(rates)
        } else {
            Err(RateFetchError::NonFinite)
        }
    });

    match outcome {
        Ok(rates) => ResolvedRates {
            rates,
            origin: RateOrigin::Source {
                name: source.name().to_string(),
            },
        },
        Err(e) => {
            warn!(source = source.name(), error = %e, "falling back to default market rates");
            ResolvedRates {
                rates: fallback,
                origin: RateOrigin::Fallback {
                    reason: e.to_string(),
                },
            }
        }
    }
}
