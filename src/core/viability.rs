use super::rates::safe_ratio;
use super::types::{Severity, ViabilityReport};

/// Capital that would pay `desired_monthly_income` forever at `real_monthly_rate`.
/// Zero means no requirement is defined (no goal, or no positive real return).
pub fn required_capital(desired_monthly_income: f64, real_monthly_rate: f64) -> f64 {
    if real_monthly_rate > 0.0 && desired_monthly_income > 0.0 {
        desired_monthly_income / real_monthly_rate
    } else {
        0.0
    }
}

pub fn classify_viability(
    final_real_balance: f64,
    total_invested: f64,
    desired_monthly_income: f64,
    real_monthly_rate: f64,
) -> ViabilityReport {
    let required_capital = required_capital(desired_monthly_income, real_monthly_rate);
    let achieved = required_capital > 0.0 && final_real_balance >= required_capital;

    let progress_fraction = safe_ratio(final_real_balance, required_capital).clamp(0.0, 1.0);

    let severity = if achieved {
        Severity::Achieved
    } else if final_real_balance < total_invested {
        Severity::Critical
    } else {
        Severity::Caution
    };

    ViabilityReport {
        required_capital,
        achieved,
        progress_fraction,
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn shortfall_with_balance_above_invested_is_caution() {
        let report = classify_viability(100_000.0, 60_000.0, 1_000.0, 0.003);
        assert_approx(report.required_capital, 1_000.0 / 0.003);
        assert!(!report.achieved);
        assert_approx(report.progress_fraction, 0.3);
        assert_eq!(report.severity, Severity::Caution);
    }

    #[test]
    fn shortfall_below_invested_is_critical() {
        let report = classify_viability(100_000.0, 150_000.0, 1_000.0, 0.003);
        assert!(!report.achieved);
        assert_approx(report.progress_fraction, 0.3);
        assert_eq!(report.severity, Severity::Critical);
    }

    #[test]
    fn meeting_requirement_is_achieved() {
        let report = classify_viability(400_000.0, 500_000.0, 1_000.0, 0.003);
        assert!(report.achieved);
        assert_approx(report.progress_fraction, 1.0);
        assert_eq!(report.severity, Severity::Achieved);
    }

    #[test]
    fn exact_requirement_counts_as_achieved() {
        let report = classify_viability(16_000.0, 0.0, 1_000.0, 0.0625);
        assert_eq!(report.required_capital, 16_000.0);
        assert!(report.achieved);
    }

    #[test]
    fn zero_goal_is_never_achieved() {
        let report = classify_viability(1_000_000.0, 10_000.0, 0.0, 0.004);
        assert_eq!(report.required_capital, 0.0);
        assert!(!report.achieved);
        assert_eq!(report.progress_fraction, 0.0);
        assert_eq!(report.severity, Severity::Caution);
    }

    #[test]
    fn non_positive_real_rate_defines_no_requirement() {
        let report = classify_viability(50_000.0, 80_000.0, 1_000.0, 0.0);
        assert_eq!(report.required_capital, 0.0);
        assert!(!report.achieved);
        assert_eq!(report.severity, Severity::Critical);

        let report = classify_viability(50_000.0, 80_000.0, 1_000.0, -0.01);
        assert_eq!(report.required_capital, 0.0);
    }

    #[test]
    fn negative_balance_clamps_progress_to_zero() {
        let report = classify_viability(-5_000.0, 10_000.0, 500.0, 0.002);
        assert_eq!(report.progress_fraction, 0.0);
        assert_eq!(report.severity, Severity::Critical);
    }

    proptest! {
        #[test]
        fn prop_progress_is_a_fraction_and_achieved_implies_full_progress(
            balance in -1_000_000i64..10_000_000,
            invested in 0u32..5_000_000,
            income in 0u32..50_000,
            rate_bp in -50i32..200,
        ) {
            let report = classify_viability(
                balance as f64,
                invested as f64,
                income as f64,
                rate_bp as f64 / 10_000.0,
            );
            prop_assert!((0.0..=1.0).contains(&report.progress_fraction));
            prop_assert!(report.required_capital >= 0.0);
            if report.achieved {
                prop_assert!(report.progress_fraction == 1.0);
                prop_assert!(report.severity == Severity::Achieved);
            } else {
                prop_assert!(report.severity != Severity::Achieved);
            }
        }
    }
}
