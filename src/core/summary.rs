use serde::Serialize;

use super::types::{BlendedProfile, Trajectory};

/// Smallest denominator used when expressing one profit as a percentage of another.
const PERCENT_FLOOR: f64 = 0.01;

const LOW_RISK_BELOW: f64 = 4.0;
const MEDIUM_RISK_BELOW: f64 = 7.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_score(risk: f64) -> Self {
        if risk < LOW_RISK_BELOW {
            RiskBand::Low
        } else if risk < MEDIUM_RISK_BELOW {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BenchmarkVerdict {
    Loss,
    Below { percent: f64 },
    AtOrAbove { percent: f64 },
}

impl BenchmarkVerdict {
    fn compare(profit: f64, reference_profit: f64) -> Self {
        if profit < 0.0 {
            BenchmarkVerdict::Loss
        } else if profit < reference_profit {
            BenchmarkVerdict::Below {
                percent: percent_of(profit, reference_profit),
            }
        } else {
            BenchmarkVerdict::AtOrAbove {
                percent: percent_of(profit, reference_profit),
            }
        }
    }
}

pub fn percent_of(numer: f64, denom: f64) -> f64 {
    if numer > 0.0 && denom <= 0.0 {
        return numer / PERCENT_FLOOR * 100.0;
    }
    numer / denom.max(PERCENT_FLOOR) * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub invested_capital: f64,
    pub final_nominal: f64,
    pub final_real: f64,
    pub nominal_profit: f64,
    pub real_profit: f64,
    pub benchmark_index_profit: f64,
    pub low_yield_profit: f64,
    pub versus_benchmark_index: BenchmarkVerdict,
    pub versus_low_yield: BenchmarkVerdict,
    pub net_annual_return: f64,
    pub risk: f64,
    pub risk_band: RiskBand,
    pub sustainable_withdrawal: f64,
}

pub fn summarize(profile: &BlendedProfile, trajectory: &Trajectory) -> Summary {
    let invested = trajectory.invested_capital;
    let nominal_profit = trajectory.final_nominal - invested;
    let benchmark_index_profit = trajectory.benchmark_index.final_nominal() - invested;
    let low_yield_profit = trajectory.low_yield.final_nominal() - invested;

    Summary {
        invested_capital: invested,
        final_nominal: trajectory.final_nominal,
        final_real: trajectory.final_real,
        nominal_profit,
        real_profit: trajectory.final_real - invested,
        benchmark_index_profit,
        low_yield_profit,
        versus_benchmark_index: BenchmarkVerdict::compare(nominal_profit, benchmark_index_profit),
        versus_low_yield: BenchmarkVerdict::compare(nominal_profit, low_yield_profit),
        net_annual_return: profile.net_return,
        risk: profile.risk,
        risk_band: RiskBand::from_score(profile.risk),
        sustainable_withdrawal: trajectory.sustainable_withdrawal,
    }
}
