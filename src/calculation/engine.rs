//! Calculation pipeline.
//!
//! [`calculate`] runs every stage in order on a single claim:
//! prolongation merge, date-effet, eligibility, payable days, amounts and
//! end-of-payment dates. Each stage appends its audit step to the trace.

use std::time::Instant;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::config::SchemeConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, CalculationInput, CalculationResult, ContributionClass,
    PeriodResult, StoppagePeriod,
};

use super::amount::{AmountParams, calculate_amounts};
use super::calendar::count_trimesters;
use super::date_effet::calculate_date_effet;
use super::end_payment::calculate_end_payment_dates;
use super::payable_days::{PayableDaysParams, calculate_payable_days};
use super::prolongation::merge_prolongations;
use super::rate_resolver::determine_contribution_class;
use super::taux::MIN_TRIMESTERS;

/// Rejects inputs that cannot be priced at all.
fn validate(input: &CalculationInput) -> EngineResult<NaiveDate> {
    if input.periods.is_empty() {
        return Err(EngineError::MissingField {
            field: "periods".to_string(),
        });
    }
    let birth_date = input.birth_date.ok_or_else(|| EngineError::MissingField {
        field: "birth_date".to_string(),
    })?;
    if input.prior_cumulative_days < 0 {
        return Err(EngineError::CalculationError {
            message: format!(
                "prior_cumulative_days must not be negative, got {}",
                input.prior_cumulative_days
            ),
        });
    }
    for (index, period) in input.periods.iter().enumerate() {
        if period.from > period.to {
            return Err(EngineError::InvalidPeriod {
                index,
                message: format!("starts {} after it ends {}", period.from, period.to),
            });
        }
    }
    Ok(birth_date)
}

/// Resolves the contribution class, deriving it from revenue when the
/// caller did not supply one.
fn resolve_class(
    input: &CalculationInput,
    periods: &[StoppagePeriod],
    config: &SchemeConfig,
) -> EngineResult<ContributionClass> {
    if let Some(class) = input.contribution_class {
        return Ok(class);
    }
    let revenue = input.revenue_n_minus_2.ok_or_else(|| EngineError::MissingField {
        field: "contribution_class".to_string(),
    })?;
    let Some(first) = periods.first() else {
        return Err(EngineError::MissingField {
            field: "periods".to_string(),
        });
    };
    let year = first.from.year();
    let pass = config
        .pass()
        .for_year(year)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("no PASS ceiling configured for {}", year),
        })?;
    Ok(determine_contribution_class(
        revenue,
        pass,
        &config.scheme().class_thresholds,
    ))
}

/// Returns the affiliation trimesters for each period.
///
/// Trimesters are counted up to the first day of the originating stoppage:
/// `first_pathology_stop_date` when given, otherwise the start of the
/// period itself, or for a confirmed relapse the start of the latest
/// non-relapse period before it. A caller-supplied count is used when the
/// affiliation date is unknown.
fn resolve_trimesters(
    input: &CalculationInput,
    periods: &[StoppagePeriod],
) -> EngineResult<Vec<Option<u32>>> {
    let mut origin: Option<NaiveDate> = None;
    let mut trimesters: Vec<Option<u32>> = Vec::with_capacity(periods.len());
    for period in periods {
        if origin.is_none() || !period.is_confirmed_relapse() {
            origin = Some(period.from);
        }
        let count = match input.affiliation_date {
            Some(affiliation) => {
                let reference = input
                    .first_pathology_stop_date
                    .or(origin)
                    .unwrap_or(period.from);
                Some(count_trimesters(affiliation, reference))
            }
            None => input.affiliation_trimesters,
        };
        trimesters.push(count);
    }

    if input.prior_pathology && trimesters.iter().any(Option::is_none) {
        return Err(EngineError::MissingField {
            field: "affiliation_date".to_string(),
        });
    }
    Ok(trimesters)
}

/// Runs the complete calculation for one claim.
///
/// Input errors (no period, no birth date, inverted period, unknown class,
/// unknown trimesters with a prior pathology, prorata out of range) abort
/// before any result is produced. Business rules that deny payment yield a
/// full result with zero days; rate lookup misses yield zero rates with a
/// warning in the audit trace.
///
/// The caller's periods are not modified: the result carries merged copies
/// with their computed date-effet.
///
/// # Example
///
/// ```no_run
/// use ij_engine::calculation::calculate;
/// use ij_engine::config::ConfigLoader;
/// use ij_engine::models::{CalculationInput, ContributionClass, ProfessionalStatus, StoppagePeriod};
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/carmf").unwrap();
/// let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
///
/// let mut input = CalculationInput::new(
///     vec![StoppagePeriod::new(d(2024, 1, 1), d(2024, 6, 30))],
///     ProfessionalStatus::Medecin,
///     d(1980, 1, 10),
/// );
/// input.contribution_class = Some(ContributionClass::A);
///
/// let result = calculate(&input, loader.config()).unwrap();
/// println!("{} days, {} EUR", result.total_payable_days, result.total_amount);
/// ```
pub fn calculate(
    input: &CalculationInput,
    config: &SchemeConfig,
) -> EngineResult<CalculationResult> {
    let started = Instant::now();
    let birth_date = validate(input)?;
    let mut trace = AuditTrace::default();

    let merged = merge_prolongations(&input.periods, trace.next_step_number());
    trace.steps.push(merged.audit_step);
    let mut periods = merged.periods;

    let dated = calculate_date_effet(
        &mut periods,
        input.prior_cumulative_days,
        trace.next_step_number(),
    );
    trace.steps.push(dated.audit_step);

    let class = resolve_class(input, &periods, config)?;
    let trimesters = resolve_trimesters(input, &periods)?;
    let originating_trimesters = trimesters.first().copied().flatten();
    let insufficient_affiliation = input.prior_pathology
        && originating_trimesters.is_some_and(|count| count < MIN_TRIMESTERS);

    let step_number = trace.next_step_number();
    trace.steps.push(AuditStep {
        step_number,
        rule_id: "eligibility".to_string(),
        rule_name: "Class and Affiliation".to_string(),
        rule_ref: "eligibility".to_string(),
        input: serde_json::json!({
            "contribution_class": input.contribution_class,
            "revenue_n_minus_2": input.revenue_n_minus_2.map(|r| r.to_string()),
            "affiliation_date": input.affiliation_date.map(|d| d.to_string()),
            "affiliation_trimesters": input.affiliation_trimesters,
            "prior_pathology": input.prior_pathology,
        }),
        output: serde_json::json!({
            "contribution_class": class,
            "trimesters": trimesters,
            "insufficient_affiliation": insufficient_affiliation,
        }),
        reasoning: match originating_trimesters {
            Some(count) => format!("Class {}, {} affiliation trimester(s)", class, count),
            None => format!("Class {}, affiliation unknown", class),
        },
    });

    let payable = calculate_payable_days(
        &periods,
        &PayableDaysParams {
            attestation_date: input.attestation_date,
            last_payment_date: input.last_payment_date,
            evaluation_date: input.evaluation_date,
            prior_cumulative_days: input.prior_cumulative_days,
            insufficient_affiliation,
        },
        trace.next_step_number(),
    );
    trace.steps.push(payable.audit_step);
    trace.warnings.extend(payable.warnings);

    let amounts = calculate_amounts(
        &periods,
        &payable.windows,
        &trimesters,
        &AmountParams {
            config,
            status: input.professional_status,
            class,
            option: input.option,
            birth_date,
            prior_pathology: input.prior_pathology,
            historical_override: input.historical_reduced_rate_code,
            forced_daily_rate: input.forced_daily_rate,
            prorata: input.prorata,
        },
        trace.next_step_number(),
    )?;
    trace.steps.push(amounts.audit_step);
    trace.warnings.extend(amounts.warnings);

    let end_payment = calculate_end_payment_dates(
        &periods,
        birth_date,
        input.evaluation_date,
        input.prior_cumulative_days,
        trace.next_step_number(),
    );
    trace.steps.push(end_payment.audit_step);

    let period_results: Vec<PeriodResult> = periods
        .into_iter()
        .zip(payable.windows)
        .zip(amounts.periods)
        .zip(trimesters)
        .map(|(((period, window), priced), trimesters)| PeriodResult {
            period,
            window,
            trimesters,
            amount: priced.amount,
            rate_breakdown: priced.rate_breakdown,
            daily_breakdown: priced.daily_breakdown,
        })
        .collect();

    trace.duration_us = started.elapsed().as_micros() as u64;

    info!(
        total_amount = %amounts.total_amount,
        total_payable_days = payable.total_payable_days,
        periods = period_results.len(),
        warnings = trace.warnings.len(),
        duration_us = trace.duration_us,
        "Calculation completed"
    );

    Ok(CalculationResult {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        total_payable_days: payable.total_payable_days,
        total_amount: amounts.total_amount,
        periods: period_results,
        age: end_payment.age_now,
        affiliation_trimesters: originating_trimesters,
        cumulative_days: dated.state.cumulative_days,
        contribution_class: class,
        end_payment_dates: end_payment.dates,
        audit_trace: trace,
    })
}
