//! Property tests for the calculation pipeline.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::OnceLock;

use ij_engine::calculation::{LIFETIME_CAP_DAYS, calculate, merge_prolongations, round_money};
use ij_engine::config::{ConfigLoader, SchemeConfig};
use ij_engine::models::{CalculationInput, ContributionClass, ProfessionalStatus, StoppagePeriod};

fn config() -> &'static SchemeConfig {
    static CONFIG: OnceLock<SchemeConfig> = OnceLock::new();
    CONFIG.get_or_init(|| {
        ConfigLoader::load("./config/carmf")
            .expect("Failed to load config")
            .config()
            .clone()
    })
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
}

/// Periods within 2022-2024, each described by a start offset and a length.
fn periods_strategy() -> impl Strategy<Value = Vec<StoppagePeriod>> {
    prop::collection::vec((0i64..900, 0i64..200), 1..6).prop_map(|spans| {
        spans
            .into_iter()
            .map(|(offset, length)| {
                let from = base_date() + Duration::days(offset);
                StoppagePeriod::new(from, from + Duration::days(length))
            })
            .collect()
    })
}

fn input(periods: Vec<StoppagePeriod>) -> CalculationInput {
    let birth = NaiveDate::from_ymd_opt(1975, 6, 15).unwrap();
    let mut input = CalculationInput::new(periods, ProfessionalStatus::Medecin, birth);
    input.contribution_class = Some(ContributionClass::B);
    input
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn merge_never_adds_periods(periods in periods_strategy()) {
        let result = merge_prolongations(&periods, 1);

        prop_assert!(result.periods.len() <= periods.len());
        let merged: u32 = result.periods.iter().map(|p| p.merged_count).sum();
        prop_assert_eq!(merged as usize, periods.len());
        for pair in result.periods.windows(2) {
            prop_assert!(pair[0].to < pair[1].from);
        }
    }

    #[test]
    fn payable_days_respect_lifetime_cap(
        periods in periods_strategy(),
        prior in 0i64..1200,
    ) {
        let mut input = input(periods);
        input.prior_cumulative_days = prior;

        let result = calculate(&input, config()).unwrap();

        prop_assert!(result.total_payable_days >= 0);
        prop_assert!(result.total_payable_days <= (LIFETIME_CAP_DAYS - prior).max(0));
    }

    #[test]
    fn date_effet_never_precedes_period_start(periods in periods_strategy()) {
        let result = calculate(&input(periods), config()).unwrap();

        for period in &result.periods {
            if let Some(date) = period.period.date_effet.date() {
                prop_assert!(date >= period.period.from);
            }
            prop_assert!(period.window.payable_days >= 0);
        }
    }

    #[test]
    fn prorata_scales_total(periods in periods_strategy(), percent in 0u32..=100) {
        let full = calculate(&input(periods.clone()), config()).unwrap();
        let prorata = Decimal::from(percent) / Decimal::from(100);
        let mut scaled_input = input(periods);
        scaled_input.prorata = Some(prorata);

        let scaled = calculate(&scaled_input, config()).unwrap();

        let expected = round_money(full.total_amount * prorata);
        prop_assert!((scaled.total_amount - expected).abs() <= Decimal::new(1, 2));
    }
}
