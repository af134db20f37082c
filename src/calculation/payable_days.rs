//! Payable-days calculation.
//!
//! Intersects each dated stoppage with the attestation and prior-payment
//! cutoffs, then enforces the lifetime day ceiling across the whole claim.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::warn;

use crate::models::{
    AuditStep, AuditWarning, DateEffet, ExclusionReason, PaymentWindow, StoppagePeriod,
};

use super::calendar::{days_inclusive, end_of_month};

/// Maximum number of days payable over a member's lifetime, and the last
/// payable day position within a single stoppage.
pub const LIFETIME_CAP_DAYS: i64 = 1095;

/// Attestations dated on or after this day of the month cover the whole
/// month.
pub const ATTESTATION_MONTH_END_DAY: u32 = 27;

/// Cutoff dates applied to every period of a claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayableDaysParams {
    /// Date of the latest attestation.
    pub attestation_date: Option<NaiveDate>,
    /// Last day already paid.
    pub last_payment_date: Option<NaiveDate>,
    /// Evaluation date, used as cutoff when no attestation was supplied.
    pub evaluation_date: Option<NaiveDate>,
    /// Days already paid before these periods.
    pub prior_cumulative_days: i64,
    /// The claim is zeroed for insufficient affiliation.
    pub insufficient_affiliation: bool,
}

/// The result of the payable-days stage, including the audit step.
#[derive(Debug, Clone)]
pub struct PayableDaysResult {
    /// One window per period, in the same order.
    pub windows: Vec<PaymentWindow>,
    /// Sum of payable days over every window.
    pub total_payable_days: i64,
    /// Warnings raised while capping or zeroing.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording the windows.
    pub audit_step: AuditStep,
}

/// Returns the attestation cutoff, rolled to month end when the attestation
/// is dated late in the month.
pub fn attestation_cutoff(attestation: NaiveDate) -> NaiveDate {
    if attestation.day() >= ATTESTATION_MONTH_END_DAY {
        end_of_month(attestation)
    } else {
        attestation
    }
}

/// Computes the payment window of a single period, before the lifetime cap.
///
/// # Example
///
/// ```
/// use ij_engine::calculation::{PayableDaysParams, calculate_payment_window};
/// use ij_engine::models::{DateEffet, StoppagePeriod};
/// use chrono::NaiveDate;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let mut period = StoppagePeriod::new(d(1, 1), d(6, 30));
/// period.date_effet = DateEffet::Opens(d(3, 31));
///
/// let params = PayableDaysParams {
///     attestation_date: Some(d(4, 28)),
///     ..PayableDaysParams::default()
/// };
/// let window = calculate_payment_window(&period, &params);
/// assert_eq!(window.end, Some(d(4, 30)));
/// assert_eq!(window.payable_days, 31);
/// ```
pub fn calculate_payment_window(
    period: &StoppagePeriod,
    params: &PayableDaysParams,
) -> PaymentWindow {
    if !period.medical_controller_validated {
        return PaymentWindow::excluded(ExclusionReason::MedicalValidationFailed);
    }

    let date_effet = match period.date_effet {
        DateEffet::Opens(date) => date,
        DateEffet::Pending => return PaymentWindow::excluded(ExclusionReason::ThresholdPending),
        DateEffet::Unset => return PaymentWindow::excluded(ExclusionReason::NoDateEffet),
    };

    let start = match params.last_payment_date {
        Some(paid) if period.from < paid && paid < period.to => date_effet.max(paid),
        _ => date_effet,
    };

    let cutoff = match (params.attestation_date, params.evaluation_date) {
        (Some(attestation), _) => attestation_cutoff(attestation),
        (None, Some(evaluation)) => evaluation,
        (None, None) => period.to,
    };
    let end = period.to.min(cutoff);

    let (payable_days, reason) = if start > end {
        (0, Some(ExclusionReason::EmptyWindow))
    } else if start == end {
        (0, Some(ExclusionReason::SingleDayBoundary))
    } else {
        (days_inclusive(start, end), None)
    };

    PaymentWindow {
        start: Some(start),
        end: Some(end),
        payable_days,
        excluded_days_reason: reason,
    }
}

/// Clips a window to the lifetime ceiling.
///
/// `consumed` is the number of days already paid, including prior days.
/// Returns true when days were cut.
fn apply_lifetime_cap(window: &mut PaymentWindow, date_effet: NaiveDate, consumed: i64) -> bool {
    let (Some(start), Some(end)) = (window.start, window.end) else {
        return false;
    };
    if window.payable_days == 0 {
        return false;
    }

    let last_position = date_effet + Duration::days(LIFETIME_CAP_DAYS - 1);
    let by_position = if start > last_position {
        0
    } else {
        days_inclusive(start, end.min(last_position))
    };
    let remaining = (LIFETIME_CAP_DAYS - consumed).max(0);
    let allowed = by_position.min(remaining);

    if allowed >= window.payable_days {
        return false;
    }

    if allowed == 0 {
        *window = PaymentWindow::excluded(ExclusionReason::LifetimeCapReached);
    } else {
        window.end = Some(start + Duration::days(allowed - 1));
        window.payable_days = allowed;
        window.excluded_days_reason = Some(ExclusionReason::LifetimeCapReached);
    }
    true
}

/// Computes payment windows for every period and enforces the lifetime
/// ceiling.
///
/// Periods failing medical validation, or without an opened date-effet,
/// contribute zero days with a reason code. The ceiling counter starts at
/// `prior_cumulative_days`, so a member who already used 1095 days gets
/// nothing more. When the claim is zeroed for insufficient affiliation,
/// every window is excluded.
pub fn calculate_payable_days(
    periods: &[StoppagePeriod],
    params: &PayableDaysParams,
    step_number: u32,
) -> PayableDaysResult {
    let mut warnings = Vec::new();

    let windows: Vec<PaymentWindow> = if params.insufficient_affiliation {
        warnings.push(AuditWarning::new(
            "INSUFFICIENT_AFFILIATION",
            "Prior pathology with fewer than 8 affiliation trimesters: claim zeroed",
            "high",
        ));
        periods
            .iter()
            .map(|_| PaymentWindow::excluded(ExclusionReason::InsufficientAffiliation))
            .collect()
    } else {
        let mut consumed = params.prior_cumulative_days;
        let mut capped = false;
        let windows = periods
            .iter()
            .map(|period| {
                let mut window = calculate_payment_window(period, params);
                if let Some(date_effet) = period.date_effet.date() {
                    if apply_lifetime_cap(&mut window, date_effet, consumed) {
                        capped = true;
                        warn!(from = %period.from, consumed, "Lifetime day ceiling reached");
                    }
                }
                consumed = consumed.saturating_add(window.payable_days);
                window
            })
            .collect();

        if capped {
            warnings.push(AuditWarning::new(
                "LIFETIME_CAP_REACHED",
                format!("Payable days truncated at the {}-day ceiling", LIFETIME_CAP_DAYS),
                "medium",
            ));
        }
        windows
    };

    let total_payable_days = windows.iter().map(|w| w.payable_days).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "payable_days".to_string(),
        rule_name: "Payable Days".to_string(),
        rule_ref: "payable_days".to_string(),
        input: serde_json::json!({
            "attestation_date": params.attestation_date.map(|d| d.to_string()),
            "last_payment_date": params.last_payment_date.map(|d| d.to_string()),
            "evaluation_date": params.evaluation_date.map(|d| d.to_string()),
            "prior_cumulative_days": params.prior_cumulative_days,
        }),
        output: serde_json::json!({
            "windows": windows,
            "total_payable_days": total_payable_days,
        }),
        reasoning: format!(
            "{} payable day(s) over {} period(s)",
            total_payable_days,
            windows.len()
        ),
    };

    PayableDaysResult {
        windows,
        total_payable_days,
        warnings,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dated(from: NaiveDate, to: NaiveDate, effet: NaiveDate) -> StoppagePeriod {
        let mut period = StoppagePeriod::new(from, to);
        period.date_effet = DateEffet::Opens(effet);
        period
    }

    #[test]
    fn test_window_runs_to_period_end_without_cutoffs() {
        let period = dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 3, 31));

        let window = calculate_payment_window(&period, &PayableDaysParams::default());

        assert_eq!(window.start, Some(date(2024, 3, 31)));
        assert_eq!(window.end, Some(date(2024, 6, 30)));
        assert_eq!(window.payable_days, 92);
        assert_eq!(window.excluded_days_reason, None);
    }

    #[test]
    fn test_early_attestation_is_not_rolled() {
        let period = dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 3, 31));
        let params = PayableDaysParams {
            attestation_date: Some(date(2024, 4, 26)),
            ..PayableDaysParams::default()
        };

        let window = calculate_payment_window(&period, &params);

        assert_eq!(window.end, Some(date(2024, 4, 26)));
        assert_eq!(window.payable_days, 27);
    }

    #[test]
    fn test_late_attestation_rolls_to_month_end() {
        assert_eq!(attestation_cutoff(date(2024, 2, 27)), date(2024, 2, 29));
        assert_eq!(attestation_cutoff(date(2024, 2, 26)), date(2024, 2, 26));
    }

    #[test]
    fn test_evaluation_date_is_cutoff_without_attestation() {
        let period = dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 3, 31));
        let params = PayableDaysParams {
            evaluation_date: Some(date(2024, 4, 9)),
            ..PayableDaysParams::default()
        };

        let window = calculate_payment_window(&period, &params);

        assert_eq!(window.payable_days, 10);
    }

    #[test]
    fn test_last_payment_inside_period_moves_start() {
        let period = dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 3, 31));
        let params = PayableDaysParams {
            last_payment_date: Some(date(2024, 5, 31)),
            ..PayableDaysParams::default()
        };

        let window = calculate_payment_window(&period, &params);

        assert_eq!(window.start, Some(date(2024, 5, 31)));
        assert_eq!(window.payable_days, 31);
    }

    #[test]
    fn test_last_payment_outside_period_is_ignored() {
        let period = dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 3, 31));
        let params = PayableDaysParams {
            last_payment_date: Some(date(2024, 6, 30)),
            ..PayableDaysParams::default()
        };

        let window = calculate_payment_window(&period, &params);

        assert_eq!(window.start, Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_single_day_window_pays_nothing() {
        let period = dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 6, 30));

        let window = calculate_payment_window(&period, &PayableDaysParams::default());

        assert_eq!(window.payable_days, 0);
        assert_eq!(
            window.excluded_days_reason,
            Some(ExclusionReason::SingleDayBoundary)
        );
    }

    #[test]
    fn test_inverted_window_pays_nothing() {
        let period = dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 3, 31));
        let params = PayableDaysParams {
            attestation_date: Some(date(2024, 3, 1)),
            ..PayableDaysParams::default()
        };

        let window = calculate_payment_window(&period, &params);

        assert_eq!(window.payable_days, 0);
        assert_eq!(window.excluded_days_reason, Some(ExclusionReason::EmptyWindow));
    }

    #[test]
    fn test_reasons_for_periods_without_rights() {
        let mut rejected = dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 3, 31));
        rejected.medical_controller_validated = false;
        let mut pending = StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 31));
        pending.date_effet = DateEffet::Pending;
        let unset = StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 5));

        let params = PayableDaysParams::default();
        assert_eq!(
            calculate_payment_window(&rejected, &params).excluded_days_reason,
            Some(ExclusionReason::MedicalValidationFailed)
        );
        assert_eq!(
            calculate_payment_window(&pending, &params).excluded_days_reason,
            Some(ExclusionReason::ThresholdPending)
        );
        assert_eq!(
            calculate_payment_window(&unset, &params).excluded_days_reason,
            Some(ExclusionReason::NoDateEffet)
        );
    }

    #[test]
    fn test_totals_over_periods() {
        let periods = vec![
            dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 3, 31)),
            dated(date(2024, 9, 1), date(2024, 9, 30), date(2024, 9, 15)),
        ];

        let result = calculate_payable_days(&periods, &PayableDaysParams::default(), 3);

        assert_eq!(result.windows.len(), 2);
        assert_eq!(result.total_payable_days, 92 + 16);
        assert!(result.warnings.is_empty());
        assert_eq!(result.audit_step.step_number, 3);
    }

    #[test]
    fn test_prior_days_above_ceiling_pay_nothing() {
        let periods = vec![dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 1, 1))];
        let params = PayableDaysParams {
            prior_cumulative_days: 1100,
            ..PayableDaysParams::default()
        };

        let result = calculate_payable_days(&periods, &params, 1);

        assert_eq!(result.total_payable_days, 0);
        assert_eq!(
            result.windows[0].excluded_days_reason,
            Some(ExclusionReason::LifetimeCapReached)
        );
        assert_eq!(result.warnings[0].code, "LIFETIME_CAP_REACHED");
    }

    #[test]
    fn test_ceiling_truncates_window() {
        let periods = vec![dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 1, 1))];
        let params = PayableDaysParams {
            prior_cumulative_days: 1085,
            ..PayableDaysParams::default()
        };

        let result = calculate_payable_days(&periods, &params, 1);

        assert_eq!(result.total_payable_days, 10);
        assert_eq!(result.windows[0].end, Some(date(2024, 1, 10)));
    }

    #[test]
    fn test_position_ceiling_within_one_stoppage() {
        let periods = vec![dated(date(2020, 1, 1), date(2024, 12, 31), date(2020, 1, 1))];

        let result = calculate_payable_days(&periods, &PayableDaysParams::default(), 1);

        assert_eq!(result.total_payable_days, LIFETIME_CAP_DAYS);
        assert_eq!(result.windows[0].end, Some(date(2022, 12, 30)));
    }

    #[test]
    fn test_insufficient_affiliation_zeroes_every_window() {
        let periods = vec![
            dated(date(2024, 1, 1), date(2024, 6, 30), date(2024, 3, 31)),
            dated(date(2024, 9, 1), date(2024, 9, 30), date(2024, 9, 15)),
        ];
        let params = PayableDaysParams {
            insufficient_affiliation: true,
            ..PayableDaysParams::default()
        };

        let result = calculate_payable_days(&periods, &params, 1);

        assert_eq!(result.total_payable_days, 0);
        assert!(result.windows.iter().all(|w| w.excluded_days_reason
            == Some(ExclusionReason::InsufficientAffiliation)));
        assert_eq!(result.warnings[0].code, "INSUFFICIENT_AFFILIATION");
    }
}
