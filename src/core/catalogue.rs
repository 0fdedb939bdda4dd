use std::collections::HashMap;

use serde::Serialize;

use super::error::{EngineError, Result};
use super::types::{Allocation, AssetClass, Instrument};

/// Share of a live market return blended into an instrument's historical baseline.
pub const LIVE_RETURN_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    instruments: Vec<Instrument>,
    index: HashMap<String, usize>,
}

impl Catalogue {
    pub fn new(instruments: impl IntoIterator<Item = Instrument>) -> Self {
        let mut catalogue = Catalogue::default();
        for instrument in instruments {
            match catalogue.index.get(&instrument.name) {
                Some(&idx) => catalogue.instruments[idx] = instrument,
                None => {
                    catalogue
                        .index
                        .insert(instrument.name.clone(), catalogue.instruments.len());
                    catalogue.instruments.push(instrument);
                }
            }
        }
        catalogue
    }

    pub fn default_catalogue() -> Self {
        Self::new(DEFAULT_INSTRUMENTS.iter().map(InstrumentSeed::to_instrument))
    }

    pub fn get(&self, name: &str) -> Option<&Instrument> {
        self.index.get(name).map(|&idx| &self.instruments[idx])
    }

    pub fn lookup(&self, name: &str) -> Result<&Instrument> {
        self.get(name)
            .ok_or_else(|| EngineError::UnknownInstrument(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    // Unquoted instruments keep their baseline.
    pub fn with_market_returns<'a>(
        &self,
        live_returns: impl IntoIterator<Item = (&'a str, f64)>,
        live_weight: f64,
    ) -> Result<Self> {
        let mut blended = self.clone();
        for (name, live) in live_returns {
            let idx = *self
                .index
                .get(name)
                .ok_or_else(|| EngineError::UnknownInstrument(name.to_string()))?;
            let instrument = &mut blended.instruments[idx];
            instrument.annual_return = blend_return(instrument.annual_return, live, live_weight);
        }
        Ok(blended)
    }
}

pub fn blend_return(historical: f64, live: f64, live_weight: f64) -> f64 {
    let w = live_weight.clamp(0.0, 1.0);
    historical * (1.0 - w) + live * w
}

struct InstrumentSeed {
    name: &'static str,
    annual_return: f64,
    risk: f64,
    annual_cost: f64,
    class: AssetClass,
    market: &'static str,
    color: &'static str,
    description: &'static str,
}

impl InstrumentSeed {
    fn to_instrument(&self) -> Instrument {
        Instrument {
            name: self.name.to_string(),
            annual_return: self.annual_return,
            annual_cost: self.annual_cost,
            risk: self.risk,
            class: self.class,
            market: self.market.to_string(),
            description: self.description.to_string(),
            color: self.color.to_string(),
        }
    }
}

macro_rules! seed {
    (
        $name:literal, $ret:literal, $risk:literal, $cost:literal,
        $class:ident, $market:expr, $color:literal, $desc:literal
    ) => {
        InstrumentSeed {
            name: $name,
            annual_return: $ret,
            risk: $risk,
            annual_cost: $cost,
            class: AssetClass::$class,
            market: $market,
            color: $color,
            description: $desc,
        }
    };
}

const MONEY_MARKET: &str = "Money Market";
const GOVERNMENT: &str = "Government Bonds";
const CREDIT: &str = "Credit Market";
const FUNDS: &str = "Funds";
const CAPITAL: &str = "Capital Markets";
const REAL_ESTATE: &str = "Real Estate & Agro";
const INTERNATIONAL: &str = "International";
const ALTERNATIVES: &str = "Alternatives";

#[rustfmt::skip]
static DEFAULT_INSTRUMENTS: [InstrumentSeed; 23] = [
    seed!("treasury-selic", 10.75, 1.0, 1.65, FixedIncome, MONEY_MARKET, "#4CAF50", "Sovereign. Immediate liquidity."),
    seed!("cdb-daily-liquidity", 10.65, 1.0, 1.60, FixedIncome, MONEY_MARKET, "#03A9F4", "Bank-backed cash reserve."),
    seed!("treasury-prefixed", 12.50, 4.0, 1.70, FixedIncome, GOVERNMENT, "#CDDC39", "Rate locked at purchase."),
    seed!("treasury-ipca-short", 10.50, 2.0, 1.60, FixedIncome, GOVERNMENT, "#FFEB3B", "Inflation protection."),
    seed!("treasury-ipca-long", 10.80, 5.0, 1.65, FixedIncome, GOVERNMENT, "#FF9800", "Retirement horizon, volatile."),
    seed!("treasury-renda-plus", 11.00, 3.0, 0.50, FixedIncome, GOVERNMENT, "#FF5722", "Future income stream."),
    seed!("lci-lca", 9.60, 2.0, 0.00, FixedIncome, CREDIT, "#0288D1", "Income-tax exempt."),
    seed!("cdb-mid-bank", 12.80, 3.0, 1.90, FixedIncome, CREDIT, "#01579B", "High return, fully taxed."),
    seed!("incentivized-debentures", 11.50, 5.0, 0.30, FixedIncome, CREDIT, "#E91E63", "Tax-exempt private credit."),
    seed!("cri-cra-high-yield", 14.50, 8.0, 2.00, FixedIncome, CREDIT, "#C2185B", "High risk, high return."),
    seed!("multimarket-fund", 12.50, 5.0, 3.50, FixedIncome, FUNDS, "#9C27B0", "Active management with high costs."),
    seed!("dividend-stocks", 14.50, 6.0, 0.10, Variable, CAPITAL, "#00BCD4", "Steady dividend payers."),
    seed!("small-caps", 18.00, 9.0, 2.50, Variable, CAPITAL, "#0097A7", "Aggressive growth."),
    seed!("ibovespa-etf", 14.00, 7.0, 2.10, Variable, CAPITAL, "#006064", "Domestic equity index."),
    seed!("reit-brick", 12.50, 4.0, 0.00, Variable, REAL_ESTATE, "#BA68C8", "Tax-exempt rental income."),
    seed!("reit-paper", 13.50, 5.0, 0.20, Variable, REAL_ESTATE, "#8E24AA", "Monthly compounding mortgage paper."),
    seed!("fiagro", 14.20, 6.0, 0.50, Variable, REAL_ESTATE, "#4A148C", "Agribusiness dividends."),
    seed!("us-stocks-sp500", 16.00, 6.0, 2.75, Variable, INTERNATIONAL, "#3F51B5", "US large caps."),
    seed!("tech-stocks-nasdaq", 18.00, 8.0, 2.80, Variable, INTERNATIONAL, "#304FFE", "Global technology."),
    seed!("us-reits", 15.00, 6.0, 3.30, Variable, INTERNATIONAL, "#1A237E", "Dollar real estate."),
    seed!("gold-dollar", 8.50, 4.0, 1.00, Variable, ALTERNATIVES, "#FFD700", "Currency and crisis hedge."),
    seed!("bitcoin", 30.00, 9.0, 4.50, Variable, ALTERNATIVES, "#F44336", "Digital store of value."),
    seed!("ethereum-altcoins", 35.00, 10.0, 5.00, Variable, ALTERNATIVES, "#B71C1C", "Extreme risk."),
];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    Profile,
    Thesis,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub key: &'static str,
    pub kind: PresetKind,
    pub description: &'static str,
    pub weights: &'static [(&'static str, f64)],
}

impl Preset {
    pub fn allocation(&self) -> Allocation {
        self.weights.iter().map(|&(name, w)| (name, w)).collect()
    }
}

pub static PRESETS: [Preset; 9] = [
    Preset {
        key: "conservative",
        kind: PresetKind::Profile,
        description: "Capital preservation through tax-exempt fixed income and sovereign bonds.",
        weights: &[
            ("lci-lca", 40.0),
            ("treasury-selic", 30.0),
            ("incentivized-debentures", 15.0),
            ("treasury-ipca-short", 15.0),
        ],
    },
    Preset {
        key: "moderate",
        kind: PresetKind::Profile,
        description: "Balance of safety and return with some real estate and private credit.",
        weights: &[
            ("incentivized-debentures", 25.0),
            ("reit-paper", 20.0),
            ("fiagro", 15.0),
            ("multimarket-fund", 10.0),
            ("dividend-stocks", 15.0),
            ("treasury-ipca-long", 15.0),
        ],
    },
    Preset {
        key: "aggressive",
        kind: PresetKind::Profile,
        description: "Accepts high volatility for long-run growth via equities and crypto.",
        weights: &[
            ("small-caps", 20.0),
            ("bitcoin", 15.0),
            ("tech-stocks-nasdaq", 20.0),
            ("reit-brick", 15.0),
            ("cri-cra-high-yield", 15.0),
            ("treasury-ipca-long", 15.0),
        ],
    },
    Preset {
        key: "dividend-kings",
        kind: PresetKind::Thesis,
        description: "Recurring, tax-exempt passive income.",
        weights: &[
            ("dividend-stocks", 40.0),
            ("reit-brick", 25.0),
            ("reit-paper", 15.0),
            ("incentivized-debentures", 20.0),
        ],
    },
    Preset {
        key: "all-weather",
        kind: PresetKind::Thesis,
        description: "Built to hold up in any macro regime.",
        weights: &[
            ("us-stocks-sp500", 30.0),
            ("treasury-ipca-long", 40.0),
            ("treasury-selic", 15.0),
            ("gold-dollar", 7.5),
            ("cdb-daily-liquidity", 7.5),
        ],
    },
    Preset {
        key: "agribusiness",
        kind: PresetKind::Thesis,
        description: "Concentrated on agribusiness credit and funds.",
        weights: &[
            ("fiagro", 40.0),
            ("lci-lca", 30.0),
            ("cri-cra-high-yield", 30.0),
        ],
    },
    Preset {
        key: "endowment",
        kind: PresetKind::Thesis,
        description: "Global diversification across equities, real estate and inflation bonds.",
        weights: &[
            ("us-stocks-sp500", 30.0),
            ("dividend-stocks", 15.0),
            ("reit-brick", 20.0),
            ("treasury-ipca-short", 15.0),
            ("treasury-ipca-long", 20.0),
        ],
    },
    Preset {
        key: "retirement-income",
        kind: PresetKind::Thesis,
        description: "Long-horizon accumulation for retirement income.",
        weights: &[
            ("treasury-renda-plus", 40.0),
            ("reit-brick", 20.0),
            ("dividend-stocks", 20.0),
            ("treasury-ipca-long", 20.0),
        ],
    },
    Preset {
        key: "crypto-spice",
        kind: PresetKind::Thesis,
        description: "High-risk digital assets with a bank-deposit cushion.",
        weights: &[
            ("bitcoin", 40.0),
            ("ethereum-altcoins", 20.0),
            ("tech-stocks-nasdaq", 20.0),
            ("cdb-mid-bank", 20.0),
        ],
    },
];

pub fn preset(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.key == key)
}
