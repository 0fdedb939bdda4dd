use super::catalogue::Catalogue;
use super::error::{EngineError, Result};
use super::types::{Allocation, BlendedProfile, ContributingAsset};

/// Risk score assigned to uninvested cash.
pub const IDLE_CASH_RISK: f64 = 0.5;

pub const IDLE_CASH_NAME: &str = "idle-cash";
const IDLE_CASH_MARKET: &str = "Warning";
const IDLE_CASH_COLOR: &str = "#757575";
const IDLE_CASH_DESCRIPTION: &str = "Uninvested money losing value to inflation.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleCashPolicy {
    pub annual_return: f64,
    pub risk: f64,
}

impl IdleCashPolicy {
    pub fn at_rate(low_yield_rate: f64) -> Self {
        Self {
            annual_return: low_yield_rate,
            risk: IDLE_CASH_RISK,
        }
    }

    fn profile(self) -> BlendedProfile {
        BlendedProfile {
            gross_return: self.annual_return,
            cost: 0.0,
            net_return: self.annual_return,
            risk: self.risk,
            idle_cash_fallback: true,
            assets: vec![ContributingAsset {
                name: IDLE_CASH_NAME.to_string(),
                share_pct: 100.0,
                market: IDLE_CASH_MARKET.to_string(),
                color: IDLE_CASH_COLOR.to_string(),
                description: IDLE_CASH_DESCRIPTION.to_string(),
            }],
        }
    }
}

pub fn aggregate(
    allocation: &Allocation,
    catalogue: &Catalogue,
    low_yield_rate: f64,
) -> Result<BlendedProfile> {
    aggregate_with_policy(allocation, catalogue, IdleCashPolicy::at_rate(low_yield_rate))
}

pub fn aggregate_with_policy(
    allocation: &Allocation,
    catalogue: &Catalogue,
    idle_cash: IdleCashPolicy,
) -> Result<BlendedProfile> {
    let mut total = 0.0;
    for (name, weight) in allocation.iter() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(EngineError::InvalidWeight {
                name: name.to_string(),
                weight,
            });
        }
        total += weight;
    }

    if total <= 0.0 {
        return Ok(idle_cash.profile());
    }

    let mut gross_return = 0.0;
    let mut cost = 0.0;
    let mut risk = 0.0;
    let mut assets = Vec::with_capacity(allocation.len());

    for (name, weight) in allocation.iter().filter(|(_, w)| *w > 0.0) {
        let instrument = catalogue.lookup(name)?;
        let share = weight / total;
        gross_return += instrument.annual_return * share;
        cost += instrument.annual_cost * share;
        risk += instrument.risk * share;
        assets.push(ContributingAsset {
            name: instrument.name.clone(),
            share_pct: share * 100.0,
            market: instrument.market.clone(),
            color: instrument.color.clone(),
            description: instrument.description.clone(),
        });
    }

    Ok(BlendedProfile {
        gross_return,
        cost,
        net_return: gross_return - cost,
        risk,
        idle_cash_fallback: false,
        assets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AssetClass, Instrument};
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn instrument(name: &str, annual_return: f64, annual_cost: f64, risk: f64) -> Instrument {
        Instrument {
            name: name.to_string(),
            annual_return,
            annual_cost,
            risk,
            class: AssetClass::Variable,
            market: "Test".to_string(),
            description: format!("{name} description"),
            color: "#123456".to_string(),
        }
    }

    fn sample_catalogue() -> Catalogue {
        Catalogue::new([
            instrument("x", 10.0, 0.0, 1.0),
            instrument("y", 20.0, 2.0, 9.0),
            instrument("z", -5.0, 1.0, 4.0),
        ])
    }

    #[test]
    fn single_instrument_takes_its_own_figures() {
        let allocation: Allocation = [("x", 100.0)].into_iter().collect();
        let profile = aggregate(&allocation, &sample_catalogue(), 6.0).expect("valid");
        assert!(!profile.idle_cash_fallback);
        assert_approx(profile.gross_return, 10.0);
        assert_approx(profile.cost, 0.0);
        assert_approx(profile.net_return, 10.0);
        assert_approx(profile.risk, 1.0);
        assert_eq!(profile.assets.len(), 1);
        assert_approx(profile.assets[0].share_pct, 100.0);
    }

    #[test]
    fn blends_by_normalized_share() {
        let allocation: Allocation = [("x", 30.0), ("y", 10.0)].into_iter().collect();
        let profile = aggregate(&allocation, &sample_catalogue(), 6.0).expect("valid");
        assert_approx(profile.gross_return, 0.75 * 10.0 + 0.25 * 20.0);
        assert_approx(profile.cost, 0.25 * 2.0);
        assert_approx(profile.net_return, 12.5 - 0.5);
        assert_approx(profile.risk, 0.75 + 0.25 * 9.0);
        assert_approx(profile.assets[0].share_pct, 75.0);
        assert_approx(profile.assets[1].share_pct, 25.0);
    }

    #[test]
    fn contributing_list_keeps_allocation_order_and_skips_zeros() {
        let allocation: Allocation = [("z", 1.0), ("y", 0.0), ("x", 1.0)]
            .into_iter()
            .collect();
        let profile = aggregate(&allocation, &sample_catalogue(), 6.0).expect("valid");
        let names: Vec<_> = profile.assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["z", "x"]);
        assert_eq!(profile.assets[0].description, "z description");
    }

    #[test]
    fn empty_allocation_falls_back_to_idle_cash() {
        let profile = aggregate(&Allocation::new(), &sample_catalogue(), 6.0).expect("fallback");
        assert!(profile.idle_cash_fallback);
        assert_eq!(profile.assets.len(), 1);
        assert_eq!(profile.assets[0].name, IDLE_CASH_NAME);
        assert_approx(profile.assets[0].share_pct, 100.0);
        assert_approx(profile.net_return, 6.0);
        assert_approx(profile.cost, 0.0);
        assert_approx(profile.risk, IDLE_CASH_RISK);
    }

    #[test]
    fn zero_weights_fall_back_even_for_unknown_names() {
        let allocation: Allocation = [("not-in-catalogue", 0.0), ("x", 0.0)]
            .into_iter()
            .collect();
        let profile = aggregate(&allocation, &sample_catalogue(), 6.17).expect("fallback");
        assert!(profile.idle_cash_fallback);
        assert_approx(profile.net_return, 6.17);
    }

    #[test]
    fn idle_cash_policy_can_be_overridden() {
        let policy = IdleCashPolicy {
            annual_return: 2.0,
            risk: 0.0,
        };
        let profile =
            aggregate_with_policy(&Allocation::new(), &sample_catalogue(), policy).expect("ok");
        assert_approx(profile.net_return, 2.0);
        assert_approx(profile.risk, 0.0);
    }

    #[test]
    fn unknown_positive_weight_is_a_lookup_error() {
        let allocation: Allocation = [("x", 50.0), ("ghost", 50.0)].into_iter().collect();
        let err = aggregate(&allocation, &sample_catalogue(), 6.0).expect_err("must fail");
        assert_eq!(err, EngineError::UnknownInstrument("ghost".to_string()));
    }

    #[test]
    fn negative_and_nan_weights_are_rejected() {
        let negative: Allocation = [("x", -1.0)].into_iter().collect();
        assert!(matches!(
            aggregate(&negative, &sample_catalogue(), 6.0),
            Err(EngineError::InvalidWeight { .. })
        ));
        let nan: Allocation = [("x", f64::NAN)].into_iter().collect();
        assert!(matches!(
            aggregate(&nan, &sample_catalogue(), 6.0),
            Err(EngineError::InvalidWeight { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_shares_sum_to_one_and_scale_is_irrelevant(
            wx in 0u32..1000,
            wy in 0u32..1000,
            wz in 1u32..1000,
            scale in 1u32..500,
        ) {
            let catalogue = sample_catalogue();
            let base: Allocation = [("x", wx as f64), ("y", wy as f64), ("z", wz as f64)]
                .into_iter()
                .collect();
            let factor = scale as f64 / 37.0;
            let scaled: Allocation = base.iter().map(|(n, w)| (n, w * factor)).collect();

            let a = aggregate(&base, &catalogue, 6.0).expect("valid");
            let b = aggregate(&scaled, &catalogue, 6.0).expect("valid");

            let share_sum: f64 = a.assets.iter().map(|s| s.share_pct).sum();
            prop_assert!((share_sum - 100.0).abs() < 1e-9);
            prop_assert!((a.gross_return - b.gross_return).abs() < 1e-9);
            prop_assert!((a.cost - b.cost).abs() < 1e-9);
            prop_assert!((a.risk - b.risk).abs() < 1e-9);
            prop_assert!((a.net_return - (a.gross_return - a.cost)).abs() < 1e-12);
        }
    }
}
