use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetClass {
    FixedIncome,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub name: String,
    pub annual_return: f64,
    pub annual_cost: f64,
    pub risk: f64,
    pub class: AssetClass,
    pub market: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    entries: Vec<(String, f64)>,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, weight: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((name, weight)),
        }
    }

    pub fn weight(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, w)| (n.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Allocation {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut allocation = Allocation::new();
        for (name, weight) in iter {
            allocation.insert(name, weight);
        }
        allocation
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributingAsset {
    pub name: String,
    pub share_pct: f64,
    pub market: String,
    pub color: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendedProfile {
    pub gross_return: f64,
    pub cost: f64,
    pub net_return: f64,
    pub risk: f64,
    pub idle_cash_fallback: bool,
    pub assets: Vec<ContributingAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub nominal: Vec<f64>,
    pub real: Vec<f64>,
}

impl Series {
    pub fn final_nominal(&self) -> f64 {
        self.nominal.last().copied().unwrap_or(0.0)
    }

    pub fn final_real(&self) -> f64 {
        self.real.last().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalPlan {
    pub monthly_amount: f64,
    pub start_month: u32,
}

impl WithdrawalPlan {
    pub fn starting_in_year(monthly_amount: f64, start_year: u32) -> Self {
        Self {
            monthly_amount,
            start_month: start_year.saturating_mul(12),
        }
    }

    pub fn is_active(&self, month: u32) -> bool {
        month >= self.start_month
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationInputs {
    pub net_annual_return: f64,
    pub benchmark_index_rate: f64,
    pub low_yield_rate: f64,
    pub inflation_rate: f64,
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    pub total_months: u32,
    pub withdrawal: Option<WithdrawalPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trajectory {
    pub months: u32,
    pub portfolio: Series,
    pub benchmark_index: Series,
    pub low_yield: Series,
    // cashflows[m] produced balance m + 1
    pub cashflows: Vec<f64>,
    pub invested_capital: f64,
    pub final_nominal: f64,
    pub final_real: f64,
    pub real_monthly_rate: f64,
    pub sustainable_withdrawal: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementScenario {
    pub enabled: bool,
    pub monthly_withdrawal: f64,
    pub start_year: u32,
}

impl RetirementScenario {
    pub fn plan(&self) -> Option<WithdrawalPlan> {
        self.enabled
            .then(|| WithdrawalPlan::starting_in_year(self.monthly_withdrawal, self.start_year))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Achieved,
    Caution,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViabilityReport {
    pub required_capital: f64,
    pub achieved: bool,
    pub progress_fraction: f64,
    pub severity: Severity,
}
