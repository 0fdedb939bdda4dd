use serde::Serialize;
use tracing::{debug, warn};

use super::aggregate::aggregate;
use super::catalogue::Catalogue;
use super::engine::simulate;
use super::error::Result;
use super::rates::MarketRates;
use super::summary::{Summary, summarize};
use super::types::{
    Allocation, BlendedProfile, RetirementScenario, SimulationInputs, Trajectory, ViabilityReport,
};
use super::viability::classify_viability;

#[derive(Debug, Clone)]
pub struct ProjectionRequest {
    pub allocation: Allocation,
    pub rates: MarketRates,
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    pub horizon_years: u32,
    pub retirement: RetirementScenario,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub profile: BlendedProfile,
    pub trajectory: Trajectory,
    pub summary: Summary,
    pub viability: Option<ViabilityReport>,
}

pub fn project(request: &ProjectionRequest, catalogue: &Catalogue) -> Result<Projection> {
    let profile = aggregate(&request.allocation, catalogue, request.rates.low_yield)?;
    if profile.idle_cash_fallback {
        warn!(
            low_yield_rate = request.rates.low_yield,
            "empty allocation, projecting idle cash"
        );
    }

    let inputs = SimulationInputs {
        net_annual_return: profile.net_return,
        benchmark_index_rate: request.rates.benchmark_index,
        low_yield_rate: request.rates.low_yield,
        inflation_rate: request.rates.inflation,
        initial_amount: request.initial_amount,
        monthly_contribution: request.monthly_contribution,
        total_months: request.horizon_years.saturating_mul(12),
        withdrawal: request.retirement.plan(),
    };
    debug!(
        net_return = inputs.net_annual_return,
        months = inputs.total_months,
        withdrawal = inputs.withdrawal.is_some(),
        "running projection"
    );
    let trajectory = simulate(&inputs);
    let summary = summarize(&profile, &trajectory);

    let viability = request.retirement.enabled.then(|| {
        classify_viability(
            trajectory.final_real,
            trajectory.invested_capital,
            request.retirement.monthly_withdrawal,
            trajectory.real_monthly_rate,
        )
    });

    Ok(Projection {
        profile,
        trajectory,
        summary,
        viability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;
    use crate::core::types::{AssetClass, Instrument, Severity};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn catalogue() -> Catalogue {
        Catalogue::new([Instrument {
            name: "instrument-x".to_string(),
            annual_return: 10.0,
            annual_cost: 0.0,
            risk: 1.0,
            class: AssetClass::FixedIncome,
            market: "Test".to_string(),
            description: String::new(),
            color: "#FFFFFF".to_string(),
        }])
    }

    fn request(allocation: Allocation) -> ProjectionRequest {
        ProjectionRequest {
            allocation,
            rates: MarketRates {
                inflation: 0.0,
                benchmark_index: 10.75,
                low_yield: 6.0,
            },
            initial_amount: 10_000.0,
            monthly_contribution: 0.0,
            horizon_years: 1,
            retirement: RetirementScenario::default(),
        }
    }

    #[test]
    fn single_instrument_grows_at_its_annual_rate() {
        let allocation = [("instrument-x", 100.0)].into_iter().collect();
        let projection = project(&request(allocation), &catalogue()).expect("valid");
        assert!(!projection.profile.idle_cash_fallback);
        assert_approx(projection.trajectory.final_nominal, 11_000.0);
        assert!(projection.viability.is_none());
    }

    #[test]
    fn empty_allocation_projects_idle_cash() {
        let mut req = request(Allocation::new());
        req.initial_amount = 5_000.0;
        let projection = project(&req, &catalogue()).expect("fallback");
        assert!(projection.profile.idle_cash_fallback);
        assert_approx(projection.trajectory.final_nominal, 5_300.0);
    }

    #[test]
    fn unknown_instrument_propagates() {
        let allocation = [("missing", 10.0)].into_iter().collect();
        let err = project(&request(allocation), &catalogue()).expect_err("lookup error");
        assert_eq!(err, EngineError::UnknownInstrument("missing".to_string()));
    }

    #[test]
    fn retirement_scenario_adds_viability_report() {
        let allocation = [("instrument-x", 100.0)].into_iter().collect();
        let mut req = request(allocation);
        req.rates.inflation = 4.0;
        req.monthly_contribution = 1_000.0;
        req.horizon_years = 20;
        req.retirement = RetirementScenario {
            enabled: true,
            monthly_withdrawal: 3_000.0,
            start_year: 15,
        };
        let projection = project(&req, &catalogue()).expect("valid");
        let t = &projection.trajectory;
        assert_approx(t.invested_capital, 10_000.0 + 1_000.0 * 180.0);
        assert_approx(t.cashflows[179], 1_000.0);
        assert_approx(t.cashflows[180], -2_000.0);

        let report = projection.viability.expect("viability computed");
        assert_approx(report.required_capital, 3_000.0 / t.real_monthly_rate);
        assert_eq!(report.achieved, t.final_real >= report.required_capital);
        if !report.achieved {
            let expected = if t.final_real < t.invested_capital {
                Severity::Critical
            } else {
                Severity::Caution
            };
            assert_eq!(report.severity, expected);
        }
    }

    #[test]
    fn distant_start_year_never_reaches_withdrawals() {
        let allocation: Allocation = [("instrument-x", 100.0)].into_iter().collect();
        let mut req = request(allocation.clone());
        req.monthly_contribution = 100.0;
        req.retirement = RetirementScenario {
            enabled: true,
            monthly_withdrawal: 10.0,
            start_year: 400_000_000,
        };
        let distant = project(&req, &catalogue()).expect("valid");
        let mut plain_req = request(allocation);
        plain_req.monthly_contribution = 100.0;
        let plain = project(&plain_req, &catalogue()).expect("valid");
        assert_eq!(distant.trajectory, plain.trajectory);
        assert!(distant.viability.is_some());
    }

    #[test]
    fn disabled_retirement_ignores_withdrawal_amount() {
        let allocation: Allocation = [("instrument-x", 100.0)].into_iter().collect();
        let mut req = request(allocation.clone());
        req.retirement = RetirementScenario {
            enabled: false,
            monthly_withdrawal: 5_000.0,
            start_year: 0,
        };
        let with_amount = project(&req, &catalogue()).expect("valid");
        let plain = project(&request(allocation), &catalogue()).expect("valid");
        assert_eq!(with_amount.trajectory, plain.trajectory);
        assert!(with_amount.viability.is_none());
    }
}
