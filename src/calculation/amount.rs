//! Amount calculation.
//!
//! Splits every payable window into segments that share a single age, rate
//! table period, month and sub-period, prices each segment, and aggregates
//! the results into per-period and whole-claim amounts with a day-by-day
//! breakdown.
//!
//! # Sub-periods for ages 62 to 69
//!
//! Each merged stoppage keeps its own day counter, starting at 1 on its
//! date-effet:
//!
//! | Stoppage length | Days       | Band          | Sub-period |
//! |-----------------|------------|---------------|------------|
//! | any             | 1-365      | full (1-3)    | 1          |
//! | >= 730 days     | 366-730    | intermediate  | 2          |
//! | >= 730 days     | 731-1095   | reduced       | 3          |
//! | < 730 days      | 366-1095   | reduced       | 3          |

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::config::SchemeConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, ContributionClass, DailyEntry, OptionRate, PaymentWindow,
    ProfessionalStatus, RateSegment, RateSource, StoppagePeriod, TauxBand, TauxCode, TierPeriod,
};

use super::calendar::{calculate_age, days_inclusive, end_of_month, next_birthday, quarter_of};
use super::payable_days::LIFETIME_CAP_DAYS;
use super::rate_resolver::{RateRequest, get_daily_rate, round_money};
use super::taux::{
    FULL_RIGHTS_TRIMESTERS, INTERMEDIATE_AGE, SENIOR_AGE, determine_taux_number, optin_fraction,
    reduction_for,
};

/// Last day position of sub-period 1.
pub const PERIOD_1_DAYS: i64 = 365;

/// Last day position of sub-period 2.
pub const PERIOD_2_DAYS: i64 = 730;

/// Inputs shared by every period of a claim.
#[derive(Debug, Clone, Copy)]
pub struct AmountParams<'a> {
    /// Scheme configuration (rate table, PASS, reform date).
    pub config: &'a SchemeConfig,
    /// Professional status of the member.
    pub status: ProfessionalStatus,
    /// Contribution class.
    pub class: ContributionClass,
    /// Option percentage.
    pub option: OptionRate,
    /// Member birth date.
    pub birth_date: NaiveDate,
    /// The pathology predates affiliation.
    pub prior_pathology: bool,
    /// Code pinned by an earlier decision on the same pathology.
    pub historical_override: Option<TauxCode>,
    /// Daily rate overriding every computed rate.
    pub forced_daily_rate: Option<Decimal>,
    /// Fraction of the total actually due.
    pub prorata: Option<Decimal>,
}

/// Priced result of one period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodAmount {
    /// Amount for the period, rounded to 2 decimals, before prorata.
    pub amount: Decimal,
    /// Priced segments.
    pub rate_breakdown: Vec<RateSegment>,
    /// One row per paid day.
    pub daily_breakdown: Vec<DailyEntry>,
    /// Rate lookup misses.
    pub warnings: Vec<AuditWarning>,
}

/// The result of the amount stage, including the audit step.
#[derive(Debug, Clone)]
pub struct AmountResult {
    /// One entry per period, in the same order as the windows.
    pub periods: Vec<PeriodAmount>,
    /// Whole-claim amount after prorata or forced rate, rounded.
    pub total_amount: Decimal,
    /// Rate lookup misses across all periods.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording the aggregation.
    pub audit_step: AuditStep,
}

/// How a single day position is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DayClass {
    tier_period: TierPeriod,
    band: TauxBand,
    use_period2: bool,
    /// Last day position sharing this classification.
    last_position: i64,
}

/// Classifies a day from the member's age and the day position within its
/// stoppage.
fn classify_day(age: u32, position: i64, long_stoppage: bool) -> DayClass {
    if age < INTERMEDIATE_AGE {
        return DayClass {
            tier_period: TierPeriod::One,
            band: TauxBand::Full,
            use_period2: false,
            last_position: LIFETIME_CAP_DAYS,
        };
    }
    if age >= SENIOR_AGE {
        return DayClass {
            tier_period: TierPeriod::Senior,
            band: TauxBand::Reduced,
            use_period2: false,
            last_position: LIFETIME_CAP_DAYS,
        };
    }

    if position <= PERIOD_1_DAYS {
        DayClass {
            tier_period: TierPeriod::One,
            band: TauxBand::Full,
            use_period2: false,
            last_position: PERIOD_1_DAYS,
        }
    } else if long_stoppage && position <= PERIOD_2_DAYS {
        DayClass {
            tier_period: TierPeriod::Two,
            band: TauxBand::Intermediate,
            use_period2: false,
            last_position: PERIOD_2_DAYS,
        }
    } else {
        DayClass {
            tier_period: TierPeriod::Three,
            band: TauxBand::Reduced,
            use_period2: long_stoppage,
            last_position: LIFETIME_CAP_DAYS,
        }
    }
}

/// Prices the payable window of a single period.
///
/// `trimesters` is the affiliation count at the start of the originating
/// stoppage; it stays fixed across the period so the reduction level does
/// not drift. The ⅓ / ⅔ reduction is applied once to the summed
/// table-priced amount; PASS-priced amounts already include it.
///
/// Segments end at the earliest of: month end, rate-table period end, the
/// day before a birthday, a sub-period boundary and the window end.
pub fn calculate_period_amount(
    period: &StoppagePeriod,
    window: &PaymentWindow,
    trimesters: Option<u32>,
    params: &AmountParams<'_>,
) -> PeriodAmount {
    let (Some(start), Some(date_effet)) = (window.start, period.date_effet.date()) else {
        return PeriodAmount::default();
    };
    if window.payable_days <= 0 {
        return PeriodAmount::default();
    }

    let end = start + Duration::days(window.payable_days - 1);
    let long_stoppage = period.inclusive_days() >= PERIOD_2_DAYS;
    let trimesters = trimesters.unwrap_or(FULL_RIGHTS_TRIMESTERS);
    let reduction = match params.historical_override {
        Some(code) => code.reduction(),
        None => reduction_for(trimesters, params.prior_pathology),
    };
    let fraction = optin_fraction(reduction);

    let mut result = PeriodAmount::default();
    let mut table_total = Decimal::ZERO;
    let mut pass_total = Decimal::ZERO;
    let mut cursor = start;

    while cursor <= end {
        let position = (cursor - date_effet).num_days() + 1;
        if position > LIFETIME_CAP_DAYS {
            break;
        }

        let age = calculate_age(cursor, params.birth_date);
        let day_class = classify_day(age, position, long_stoppage);
        // Only the 62-69 sub-periods depend on the day position.
        let taux_code = if params.historical_override.is_none()
            && (INTERMEDIATE_AGE..SENIOR_AGE).contains(&age)
        {
            TauxCode::from_parts(day_class.band, reduction)
        } else {
            determine_taux_number(
                age,
                trimesters,
                params.prior_pathology,
                params.historical_override,
            )
        };

        let mut segment_end = end
            .min(end_of_month(cursor))
            .min(next_birthday(cursor, params.birth_date) - Duration::days(1))
            .min(date_effet + Duration::days(day_class.last_position - 1));
        if let Some(rate_period) = params.config.rate_table().find_by_date(cursor) {
            segment_end = segment_end.min(rate_period.date_end);
        }

        let resolved = get_daily_rate(
            params.config,
            &RateRequest {
                status: params.status,
                class: params.class,
                option: params.option,
                taux_code,
                year: cursor.year(),
                date: cursor,
                date_effet,
                age,
                use_period2: day_class.use_period2,
            },
        );
        if let Some(warning) = resolved.warning {
            if !result.warnings.contains(&warning) {
                result.warnings.push(warning);
            }
        }

        let days = days_inclusive(cursor, segment_end);
        let raw_amount = resolved.daily_rate * Decimal::from(days);
        let day_fraction = match resolved.rate_source {
            RateSource::Table => {
                table_total += raw_amount;
                fraction
            }
            RateSource::Pass | RateSource::Forced => {
                pass_total += raw_amount;
                Decimal::ONE
            }
        };
        let amount = round_money(raw_amount * day_fraction);

        result.rate_breakdown.push(RateSegment {
            year: cursor.year(),
            month: cursor.month(),
            trimester: quarter_of(cursor),
            tier_period: day_class.tier_period,
            start: cursor,
            end: segment_end,
            days,
            daily_rate: resolved.daily_rate,
            taux_code,
            age,
            class: params.class,
            rate_source: resolved.rate_source,
            amount,
        });

        let mut day = cursor;
        while day <= segment_end {
            result.daily_breakdown.push(DailyEntry {
                date: day,
                weekday: day.weekday(),
                year: day.year(),
                month: day.month(),
                trimester: quarter_of(day),
                tier_period: day_class.tier_period,
                taux_code,
                daily_rate: resolved.daily_rate,
                amount: round_money(resolved.daily_rate * day_fraction),
            });
            day += Duration::days(1);
        }

        cursor = segment_end + Duration::days(1);
    }

    result.amount = round_money(table_total * fraction + pass_total);
    absorb_rounding(
        result.rate_breakdown.iter_mut().map(|s| &mut s.amount),
        result.amount,
    );
    absorb_rounding(
        result.daily_breakdown.iter_mut().map(|d| &mut d.amount),
        result.amount,
    );
    result
}

/// Moves the rounding difference onto the last part so the parts add up to
/// `total`.
fn absorb_rounding<'a>(parts: impl Iterator<Item = &'a mut Decimal>, total: Decimal) {
    let mut sum = Decimal::ZERO;
    let mut last = None;
    for part in parts {
        sum += *part;
        last = Some(part);
    }
    if let Some(last) = last {
        *last += total - sum;
    }
}

/// Rewrites a priced period to a caller-supplied daily rate.
fn apply_forced_rate(priced: &mut PeriodAmount, forced: Decimal) {
    let mut days = 0;
    for segment in &mut priced.rate_breakdown {
        segment.daily_rate = forced;
        segment.tier_period = TierPeriod::Forced;
        segment.rate_source = RateSource::Forced;
        segment.amount = forced * Decimal::from(segment.days);
        days += segment.days;
    }
    for entry in &mut priced.daily_breakdown {
        entry.daily_rate = forced;
        entry.tier_period = TierPeriod::Forced;
        entry.amount = forced;
    }
    priced.warnings.clear();
    priced.amount = round_money(forced * Decimal::from(days));
}

/// Prices every period and aggregates the whole-claim total.
///
/// `windows` and `trimesters` are parallel to `periods`. The total is the
/// sum of period amounts multiplied by the prorata, or the forced daily rate
/// times the total payable days when one is supplied (no prorata then).
///
/// # Errors
///
/// Returns `CalculationError` when the prorata lies outside `[0, 1]`.
pub fn calculate_amounts(
    periods: &[StoppagePeriod],
    windows: &[PaymentWindow],
    trimesters: &[Option<u32>],
    params: &AmountParams<'_>,
    step_number: u32,
) -> EngineResult<AmountResult> {
    if let Some(prorata) = params.prorata {
        if prorata < Decimal::ZERO || prorata > Decimal::ONE {
            return Err(EngineError::CalculationError {
                message: format!("prorata must be between 0 and 1, got {}", prorata),
            });
        }
    }

    let mut priced: Vec<PeriodAmount> = periods
        .iter()
        .zip(windows)
        .enumerate()
        .map(|(index, (period, window))| {
            let trimester_count = trimesters.get(index).copied().flatten();
            calculate_period_amount(period, window, trimester_count, params)
        })
        .collect();

    let total_payable_days: i64 = windows.iter().map(|w| w.payable_days).sum();

    let (total_amount, basis) = match params.forced_daily_rate {
        Some(forced) => {
            for period in &mut priced {
                apply_forced_rate(period, forced);
            }
            (
                round_money(forced * Decimal::from(total_payable_days)),
                format!("forced rate {} x {} day(s)", forced, total_payable_days),
            )
        }
        None => {
            let sum: Decimal = priced.iter().map(|p| p.amount).sum();
            let prorata = params.prorata.unwrap_or(Decimal::ONE);
            (
                round_money(sum * prorata),
                format!("sum {} x prorata {}", sum, prorata),
            )
        }
    };

    let mut warnings: Vec<AuditWarning> = Vec::new();
    for warning in priced.iter().flat_map(|p| p.warnings.iter()) {
        if !warnings.contains(warning) {
            warnings.push(warning.clone());
        }
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "amount".to_string(),
        rule_name: "Amount Aggregation".to_string(),
        rule_ref: "amount".to_string(),
        input: serde_json::json!({
            "class": params.class,
            "status": params.status,
            "option": params.option,
            "prior_pathology": params.prior_pathology,
            "historical_override": params.historical_override,
            "forced_daily_rate": params.forced_daily_rate.map(|r| r.to_string()),
            "prorata": params.prorata.map(|p| p.to_string()),
        }),
        output: serde_json::json!({
            "period_amounts": priced.iter().map(|p| p.amount.to_string()).collect::<Vec<_>>(),
            "segments": priced.iter().map(|p| p.rate_breakdown.len()).sum::<usize>(),
            "total_amount": total_amount.to_string(),
        }),
        reasoning: format!("Total {} EUR from {}", total_amount, basis),
    };

    Ok(AmountResult {
        periods: priced,
        total_amount,
        warnings,
        audit_step,
    })
}
