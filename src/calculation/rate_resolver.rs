//! Daily rate resolution.
//!
//! Turns a tier code into a daily amount, either from the date-indexed rate
//! table or, for stoppages opening on or after the reform date, from the
//! yearly PASS ceiling.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::config::{ClassThresholds, RateTier, SchemeConfig};
use crate::models::{
    AuditWarning, ContributionClass, OptionRate, ProfessionalStatus, RateSource, TauxCode,
};

use super::taux::SENIOR_AGE;

/// Number of days the PASS is spread over in the reform formula.
pub const PASS_DIVISOR: i64 = 730;

/// Everything needed to price one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRequest {
    /// Professional status of the member.
    pub status: ProfessionalStatus,
    /// Contribution class.
    pub class: ContributionClass,
    /// Option percentage, applied only for statuses that use one.
    pub option: OptionRate,
    /// Tier code for the day.
    pub taux_code: TauxCode,
    /// Year used when no table period covers `date`.
    pub year: i32,
    /// The day being priced.
    pub date: NaiveDate,
    /// Date-effet of the stoppage the day belongs to.
    pub date_effet: NaiveDate,
    /// Member age on `date`.
    pub age: u32,
    /// Third period of a stoppage long enough to have a second one.
    pub use_period2: bool,
}

/// A resolved daily rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRate {
    /// Daily rate rounded to 2 decimals; zero on a lookup miss.
    pub daily_rate: Decimal,
    /// Where the rate came from.
    pub rate_source: RateSource,
    /// Set when the lookup missed.
    pub warning: Option<AuditWarning>,
}

/// Returns the rate table column for a tier code.
///
/// Codes 1-3 read column 1 and codes 7-9 column 3. Codes 4-6 read column 2
/// for members aged 70 or over and for the third period of a long
/// stoppage, column 3 otherwise.
pub fn tier_for_code(code: TauxCode, age: u32, use_period2: bool) -> RateTier {
    match code.value() {
        1..=3 => RateTier::One,
        4..=6 if age >= SENIOR_AGE || use_period2 => RateTier::Two,
        _ => RateTier::Three,
    }
}

/// Fraction of the PASS base paid for a tier code.
pub fn pass_fraction(code: TauxCode) -> Decimal {
    let (numerator, denominator) = match code.value() {
        1 => (1, 1),
        2 => (2, 3),
        3 => (1, 3),
        4 => (1, 2),
        5 => (1, 3),
        6 => (1, 6),
        7 => (3, 4),
        8 => (1, 2),
        _ => (1, 4),
    };
    Decimal::from(numerator) / Decimal::from(denominator)
}

/// Rounds a monetary amount half-up to 2 decimals.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Resolves the daily rate for one day.
///
/// Stoppages whose date-effet is on or after the scheme's reform date are
/// priced from the PASS of the priced day's year:
/// `class multiplier * PASS / 730 * fraction(code)`. Others read the rate
/// table period covering the priced day, falling back to the period for
/// `year`. Statuses requiring an option multiply the rate by it.
///
/// A lookup miss does not fail: the rate is zero and a warning is returned
/// and logged.
///
/// # Example
///
/// ```no_run
/// use ij_engine::calculation::{RateRequest, get_daily_rate};
/// use ij_engine::config::ConfigLoader;
/// use ij_engine::models::{ContributionClass, OptionRate, ProfessionalStatus, TauxCode};
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/carmf").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
/// let request = RateRequest {
///     status: ProfessionalStatus::Medecin,
///     class: ContributionClass::A,
///     option: OptionRate::FULL,
///     taux_code: TauxCode::new(1).unwrap(),
///     year: 2024,
///     date,
///     date_effet: date,
///     age: 45,
///     use_period2: false,
/// };
/// let rate = get_daily_rate(loader.config(), &request);
/// println!("{}", rate.daily_rate);
/// ```
pub fn get_daily_rate(config: &SchemeConfig, request: &RateRequest) -> ResolvedRate {
    let (base, rate_source, warning) = if request.date_effet >= config.scheme().reform_date {
        match config.pass().for_year(request.year) {
            Some(pass) => {
                let base = request.class.multiplier() * pass / Decimal::from(PASS_DIVISOR);
                (base * pass_fraction(request.taux_code), RateSource::Pass, None)
            }
            None => {
                warn!(year = request.year, "No PASS ceiling configured");
                let warning = AuditWarning::new(
                    "PASS_NOT_FOUND",
                    format!("No PASS ceiling for {}; daily rate set to 0", request.year),
                    "high",
                );
                (Decimal::ZERO, RateSource::Pass, Some(warning))
            }
        }
    } else {
        let tier = tier_for_code(request.taux_code, request.age, request.use_period2);
        let table = config.rate_table();
        match table
            .find_by_date(request.date)
            .or_else(|| table.find_by_year(request.year))
        {
            Some(period) => (period.rate(request.class, tier), RateSource::Table, None),
            None => {
                warn!(date = %request.date, class = %request.class, "No rate period covers date");
                let warning = AuditWarning::new(
                    "RATE_NOT_FOUND",
                    format!(
                        "No rate period covers {} (class {}, tier {}); daily rate set to 0",
                        request.date,
                        request.class,
                        tier.number()
                    ),
                    "high",
                );
                (Decimal::ZERO, RateSource::Table, Some(warning))
            }
        }
    };

    let rate = if request.status.requires_option() {
        base * request.option.fraction()
    } else {
        base
    };

    ResolvedRate {
        daily_rate: round_money(rate),
        rate_source,
        warning,
    }
}

/// Derives the contribution class from revenue of year N-2.
///
/// Revenue up to `class_a_max` PASS is class A, up to `class_b_max` PASS
/// class B, anything above class C.
///
/// # Example
///
/// ```
/// use ij_engine::calculation::determine_contribution_class;
/// use ij_engine::config::ClassThresholds;
/// use ij_engine::models::ContributionClass;
/// use rust_decimal::Decimal;
///
/// let pass = Decimal::from(46368);
/// let thresholds = ClassThresholds::default();
/// assert_eq!(
///     determine_contribution_class(Decimal::from(90000), pass, &thresholds),
///     ContributionClass::B
/// );
/// ```
pub fn determine_contribution_class(
    revenue: Decimal,
    pass: Decimal,
    thresholds: &ClassThresholds,
) -> ContributionClass {
    if revenue <= thresholds.class_a_max * pass {
        ContributionClass::A
    } else if revenue <= thresholds.class_b_max * pass {
        ContributionClass::B
    } else {
        ContributionClass::C
    }
}
