use super::rates::{REAL_RATE_EPSILON, monthly_rate, real_growth_factor};
use super::types::{Series, SimulationInputs, Trajectory, WithdrawalPlan};

pub fn scheduled_cashflow(month: u32, contribution: f64, plan: Option<&WithdrawalPlan>) -> f64 {
    match plan {
        Some(plan) if plan.is_active(month) => contribution - plan.monthly_amount,
        _ => contribution,
    }
}

#[derive(Debug)]
struct SeriesBuilder {
    nominal: Vec<f64>,
    real: Vec<f64>,
    growth: f64,
    real_growth: f64,
}

impl SeriesBuilder {
    fn new(initial: f64, annual_rate: f64, monthly_inflation: f64, months: usize) -> Self {
        let monthly = monthly_rate(annual_rate);
        let mut nominal = Vec::with_capacity(months + 1);
        let mut real = Vec::with_capacity(months + 1);
        nominal.push(initial);
        real.push(initial);
        Self {
            nominal,
            real,
            growth: 1.0 + monthly,
            real_growth: real_growth_factor(monthly, monthly_inflation),
        }
    }

    fn step(&mut self, cashflow: f64) {
        let last_nominal = self.nominal[self.nominal.len() - 1];
        let last_real = self.real[self.real.len() - 1];
        self.nominal.push(last_nominal * self.growth + cashflow);
        self.real.push(last_real * self.real_growth + cashflow);
    }

    fn finish(self) -> Series {
        Series {
            nominal: self.nominal,
            real: self.real,
        }
    }
}

/// Runs the portfolio and both benchmarks month by month with identical cash flows.
/// The real series deflate the growth factor every month instead of the final balance.
pub fn simulate(inputs: &SimulationInputs) -> Trajectory {
    let months = inputs.total_months as usize;
    let monthly_inflation = monthly_rate(inputs.inflation_rate);
    let plan = inputs.withdrawal.as_ref();

    let mut portfolio = SeriesBuilder::new(
        inputs.initial_amount,
        inputs.net_annual_return,
        monthly_inflation,
        months,
    );
    let mut benchmark_index = SeriesBuilder::new(
        inputs.initial_amount,
        inputs.benchmark_index_rate,
        monthly_inflation,
        months,
    );
    let mut low_yield = SeriesBuilder::new(
        inputs.initial_amount,
        inputs.low_yield_rate,
        monthly_inflation,
        months,
    );

    let mut cashflows = Vec::with_capacity(months);
    let mut invested_capital = inputs.initial_amount;

    for month in 0..inputs.total_months {
        let flow = scheduled_cashflow(month, inputs.monthly_contribution, plan);
        portfolio.step(flow);
        benchmark_index.step(flow);
        low_yield.step(flow);
        cashflows.push(flow);

        if !plan.is_some_and(|p| p.is_active(month)) {
            invested_capital += inputs.monthly_contribution;
        }
    }

    let mut real_monthly_rate = portfolio.real_growth - 1.0;
    if real_monthly_rate <= 0.0 {
        real_monthly_rate = REAL_RATE_EPSILON;
    }

    let portfolio = portfolio.finish();
    let final_nominal = portfolio.final_nominal();
    let final_real = portfolio.final_real();

    Trajectory {
        months: inputs.total_months,
        portfolio,
        benchmark_index: benchmark_index.finish(),
        low_yield: low_yield.finish(),
        cashflows,
        invested_capital,
        final_nominal,
        final_real,
        real_monthly_rate,
        sustainable_withdrawal: final_real * real_monthly_rate,
    }
}
