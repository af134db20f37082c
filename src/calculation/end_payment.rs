//! End-of-payment dates.
//!
//! Derives the calendar dates at which the 365, 730 and 1095 day caps are
//! reached, depending on the member's age when rights opened and at the
//! evaluation date.

use chrono::{Duration, NaiveDate};

use crate::models::{AuditStep, EndPaymentDates, StoppagePeriod};

use super::calendar::calculate_age;
use super::taux::{INTERMEDIATE_AGE, SENIOR_AGE};

/// Day caps of the three sub-periods.
pub const CAP_DAYS: [i64; 3] = [365, 730, 1095];

/// The result of the end-payment stage, including the audit step.
#[derive(Debug, Clone)]
pub struct EndPaymentResult {
    /// The computed cap dates.
    pub dates: EndPaymentDates,
    /// Age when rights opened, if they did.
    pub age_start: Option<u32>,
    /// Age at the evaluation date.
    pub age_now: u32,
    /// The audit step recording the decision.
    pub audit_step: AuditStep,
}

/// Returns the date a cap is reached.
///
/// `date_effet + (cap - prior_cumulative_days) - 1` days. `None` when the
/// prior days already exhaust the cap.
pub fn cap_date(
    date_effet: NaiveDate,
    cap_days: i64,
    prior_cumulative_days: i64,
) -> Option<NaiveDate> {
    let remaining = cap_days.checked_sub(prior_cumulative_days)?;
    if remaining <= 0 {
        return None;
    }
    date_effet.checked_add_signed(Duration::days(remaining - 1))
}

/// Computes the cap dates from the ages at start and now.
///
/// - 70 or over at start: first cap only.
/// - Under 70 at start, 70 or over now: first and second caps.
/// - 62 or over now otherwise: all three caps.
/// - Under 62 throughout: none.
///
/// # Example
///
/// ```
/// use ij_engine::calculation::end_payment_dates;
/// use chrono::NaiveDate;
///
/// let effet = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let dates = end_payment_dates(effet, 65, 66, 0);
/// assert_eq!(dates.end_period_1, NaiveDate::from_ymd_opt(2024, 12, 30));
/// assert!(dates.end_period_3.is_some());
///
/// assert!(end_payment_dates(effet, 45, 46, 0).is_empty());
/// ```
pub fn end_payment_dates(
    date_effet: NaiveDate,
    age_start: u32,
    age_now: u32,
    prior_cumulative_days: i64,
) -> EndPaymentDates {
    let caps = if age_start >= SENIOR_AGE {
        1
    } else if age_now >= SENIOR_AGE {
        2
    } else if age_now >= INTERMEDIATE_AGE {
        3
    } else {
        0
    };

    let date = |index: usize| {
        if index < caps {
            cap_date(date_effet, CAP_DAYS[index], prior_cumulative_days)
        } else {
            None
        }
    };

    EndPaymentDates {
        end_period_1: date(0),
        end_period_2: date(1),
        end_period_3: date(2),
    }
}

/// Computes the cap dates for a claim.
///
/// The reference date-effet is the first opened one. The current age is
/// taken at `evaluation_date`, or at the end of the last period when none
/// is given. Without any opened date-effet no cap date is produced.
pub fn calculate_end_payment_dates(
    periods: &[StoppagePeriod],
    birth_date: NaiveDate,
    evaluation_date: Option<NaiveDate>,
    prior_cumulative_days: i64,
    step_number: u32,
) -> EndPaymentResult {
    let reference = periods.iter().find_map(|p| p.date_effet.date());
    let now = evaluation_date
        .or_else(|| periods.iter().map(|p| p.to).max())
        .unwrap_or(birth_date);
    let age_now = calculate_age(now, birth_date);
    let age_start = reference.map(|date| calculate_age(date, birth_date));

    let dates = match (reference, age_start) {
        (Some(date_effet), Some(age)) => {
            end_payment_dates(date_effet, age, age_now, prior_cumulative_days)
        }
        _ => EndPaymentDates::default(),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "end_payment_dates".to_string(),
        rule_name: "End Payment Dates".to_string(),
        rule_ref: "end_payment".to_string(),
        input: serde_json::json!({
            "date_effet": reference.map(|d| d.to_string()),
            "age_start": age_start,
            "age_now": age_now,
            "prior_cumulative_days": prior_cumulative_days,
        }),
        output: serde_json::to_value(&dates).unwrap_or_default(),
        reasoning: match (reference, age_start) {
            (Some(date_effet), Some(age)) => format!(
                "Rights opened {} at age {}; age {} at evaluation",
                date_effet, age, age_now
            ),
            _ => "No opened date-effet; no cap dates".to_string(),
        },
    };

    EndPaymentResult {
        dates,
        age_start,
        age_now,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateEffet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_senior_at_start_has_single_cap() {
        let dates = end_payment_dates(date(2024, 1, 1), 71, 72, 0);

        assert_eq!(dates.end_period_1, Some(date(2024, 12, 30)));
        assert_eq!(dates.end_period_2, None);
        assert_eq!(dates.end_period_3, None);
    }

    #[test]
    fn test_turning_seventy_gives_two_caps() {
        let dates = end_payment_dates(date(2024, 1, 1), 69, 70, 0);

        assert!(dates.end_period_1.is_some());
        assert_eq!(dates.end_period_2, Some(date(2025, 12, 30)));
        assert_eq!(dates.end_period_3, None);
    }

    #[test]
    fn test_intermediate_ages_give_three_caps() {
        let dates = end_payment_dates(date(2024, 1, 1), 63, 64, 0);

        assert_eq!(dates.end_period_1, Some(date(2024, 12, 30)));
        assert_eq!(dates.end_period_2, Some(date(2025, 12, 30)));
        assert_eq!(dates.end_period_3, Some(date(2026, 12, 30)));
    }

    #[test]
    fn test_young_member_has_no_caps() {
        assert!(end_payment_dates(date(2024, 1, 1), 40, 41, 0).is_empty());
    }

    #[test]
    fn test_prior_days_bring_caps_forward() {
        let dates = end_payment_dates(date(2024, 1, 1), 71, 71, 100);

        assert_eq!(dates.end_period_1, Some(date(2024, 9, 21)));
    }

    #[test]
    fn test_exhausted_caps_are_omitted() {
        let dates = end_payment_dates(date(2024, 1, 1), 65, 65, 800);

        assert_eq!(dates.end_period_1, None);
        assert_eq!(dates.end_period_2, None);
        assert_eq!(dates.end_period_3, Some(date(2024, 10, 21)));

        assert!(end_payment_dates(date(2024, 1, 1), 65, 65, 100_000_000).is_empty());
    }

    #[test]
    fn test_claim_uses_first_opened_date_effet() {
        let mut pending = StoppagePeriod::new(date(2023, 1, 1), date(2023, 1, 31));
        pending.date_effet = DateEffet::Pending;
        let mut opened = StoppagePeriod::new(date(2024, 1, 1), date(2024, 6, 30));
        opened.date_effet = DateEffet::Opens(date(2024, 3, 1));

        let result = calculate_end_payment_dates(
            &[pending, opened],
            date(1955, 6, 1),
            Some(date(2024, 7, 1)),
            0,
            6,
        );

        assert_eq!(result.age_start, Some(68));
        assert_eq!(result.age_now, 69);
        assert_eq!(result.dates.end_period_1, Some(date(2025, 2, 28)));
        assert!(result.dates.end_period_3.is_some());
        assert_eq!(result.audit_step.step_number, 6);
    }

    #[test]
    fn test_age_now_defaults_to_last_period_end() {
        let mut opened = StoppagePeriod::new(date(2024, 1, 1), date(2024, 6, 30));
        opened.date_effet = DateEffet::Opens(date(2024, 3, 31));

        let result = calculate_end_payment_dates(&[opened], date(1954, 6, 15), None, 0, 1);

        assert_eq!(result.age_start, Some(69));
        assert_eq!(result.age_now, 70);
        assert!(result.dates.end_period_2.is_some());
        assert!(result.dates.end_period_3.is_none());
    }

    #[test]
    fn test_no_opened_date_effet_gives_no_caps() {
        let result = calculate_end_payment_dates(
            &[StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 31))],
            date(1950, 1, 1),
            None,
            0,
            1,
        );

        assert!(result.dates.is_empty());
        assert_eq!(result.age_start, None);
    }
}
