//! Prolongation merging.
//!
//! A prolongation is a stoppage that resumes on the next business day after
//! the previous one ended. Prolongations are the same arrêt and are merged
//! into one continuous span before any rights rule runs.

use crate::models::{AuditStep, StoppagePeriod};

use super::calendar::next_weekday;

/// The result of merging prolongations, including the audit step.
#[derive(Debug, Clone)]
pub struct ProlongationMergeResult {
    /// Merged periods in chronological order.
    pub periods: Vec<StoppagePeriod>,
    /// The audit step recording the merge.
    pub audit_step: AuditStep,
}

/// Sorts periods by start date and merges prolongations.
///
/// A period is merged into the previous one when it starts no later than
/// the first business day after the previous end, so only a weekend may
/// separate them. Overlapping periods merge too. The merged span keeps the
/// declaration data of its first period and extends `to` to the latest end.
/// The output never holds more periods than the input.
///
/// # Example
///
/// ```
/// use ij_engine::calculation::merge_prolongations;
/// use ij_engine::models::StoppagePeriod;
/// use chrono::NaiveDate;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let periods = vec![
///     StoppagePeriod::new(d(1, 11), d(1, 20)),
///     StoppagePeriod::new(d(1, 1), d(1, 10)),
/// ];
///
/// let result = merge_prolongations(&periods, 1);
/// assert_eq!(result.periods.len(), 1);
/// assert_eq!(result.periods[0].from, d(1, 1));
/// assert_eq!(result.periods[0].to, d(1, 20));
/// assert_eq!(result.periods[0].merged_count, 2);
/// ```
pub fn merge_prolongations(periods: &[StoppagePeriod], step_number: u32) -> ProlongationMergeResult {
    let mut sorted = periods.to_vec();
    sorted.sort_by(|a, b| a.from.cmp(&b.from));

    let mut merged: Vec<StoppagePeriod> = Vec::with_capacity(sorted.len());
    for period in sorted {
        match merged.last_mut() {
            Some(previous) if period.from <= next_weekday(previous.to) => {
                previous.to = previous.to.max(period.to);
                previous.merged_count += period.merged_count;
            }
            _ => merged.push(period),
        }
    }

    let absorbed = periods.len() - merged.len();
    let audit_step = AuditStep {
        step_number,
        rule_id: "prolongation_merge".to_string(),
        rule_name: "Prolongation Merge".to_string(),
        rule_ref: "prolongation".to_string(),
        input: serde_json::json!({
            "periods": periods
                .iter()
                .map(|p| serde_json::json!({"from": p.from.to_string(), "to": p.to.to_string()}))
                .collect::<Vec<_>>()
        }),
        output: serde_json::json!({
            "periods": merged
                .iter()
                .map(|p| serde_json::json!({
                    "from": p.from.to_string(),
                    "to": p.to.to_string(),
                    "merged_count": p.merged_count
                }))
                .collect::<Vec<_>>()
        }),
        reasoning: format!(
            "{} period(s) in, {} span(s) out; {} prolongation(s) merged",
            periods.len(),
            merged.len(),
            absorbed
        ),
    };

    ProlongationMergeResult {
        periods: merged,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_adjacent_periods_merge() {
        let periods = vec![
            StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 10)),
            StoppagePeriod::new(date(2024, 1, 11), date(2024, 1, 20)),
        ];

        let result = merge_prolongations(&periods, 1);

        assert_eq!(result.periods.len(), 1);
        assert_eq!(result.periods[0].from, date(2024, 1, 1));
        assert_eq!(result.periods[0].to, date(2024, 1, 20));
    }

    #[test]
    fn test_gap_prevents_merge() {
        let periods = vec![
            StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 10)),
            StoppagePeriod::new(date(2024, 1, 15), date(2024, 1, 20)),
        ];

        let result = merge_prolongations(&periods, 1);

        assert_eq!(result.periods.len(), 2);
        assert_eq!(result.periods[0].to, date(2024, 1, 10));
        assert_eq!(result.periods[1].from, date(2024, 1, 15));
    }

    #[test]
    fn test_weekend_gap_merges() {
        // Friday 2024-01-05 to Monday 2024-01-08
        let periods = vec![
            StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 5)),
            StoppagePeriod::new(date(2024, 1, 8), date(2024, 1, 19)),
        ];

        let result = merge_prolongations(&periods, 1);

        assert_eq!(result.periods.len(), 1);
        assert_eq!(result.periods[0].to, date(2024, 1, 19));
    }

    #[test]
    fn test_resuming_on_saturday_merges() {
        let periods = vec![
            StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 5)),
            StoppagePeriod::new(date(2024, 1, 6), date(2024, 1, 12)),
        ];

        let result = merge_prolongations(&periods, 1);
        assert_eq!(result.periods.len(), 1);
    }

    #[test]
    fn test_weekday_gap_does_not_merge() {
        // Wednesday end, Friday start
        let periods = vec![
            StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 10)),
            StoppagePeriod::new(date(2024, 1, 12), date(2024, 1, 20)),
        ];

        let result = merge_prolongations(&periods, 1);
        assert_eq!(result.periods.len(), 2);
    }

    #[test]
    fn test_overlapping_period_extends_to_latest_end() {
        let periods = vec![
            StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 31)),
            StoppagePeriod::new(date(2024, 1, 10), date(2024, 1, 20)),
        ];

        let result = merge_prolongations(&periods, 1);

        assert_eq!(result.periods.len(), 1);
        assert_eq!(result.periods[0].to, date(2024, 1, 31));
    }

    #[test]
    fn test_unordered_input_is_sorted() {
        let periods = vec![
            StoppagePeriod::new(date(2024, 3, 1), date(2024, 3, 10)),
            StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 10)),
        ];

        let result = merge_prolongations(&periods, 1);

        assert_eq!(result.periods[0].from, date(2024, 1, 1));
        assert_eq!(result.periods[1].from, date(2024, 3, 1));
    }

    #[test]
    fn test_merged_span_keeps_first_declaration() {
        let mut first = StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 10));
        first.declaration_date = Some(date(2024, 1, 2));
        let mut second = StoppagePeriod::new(date(2024, 1, 11), date(2024, 1, 20));
        second.declaration_date = Some(date(2024, 1, 15));

        let result = merge_prolongations(&[first, second], 1);

        assert_eq!(result.periods[0].declaration_date, Some(date(2024, 1, 2)));
    }

    #[test]
    fn test_merging_is_idempotent() {
        let periods = vec![
            StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 10)),
            StoppagePeriod::new(date(2024, 1, 11), date(2024, 1, 20)),
            StoppagePeriod::new(date(2024, 3, 1), date(2024, 3, 20)),
        ];

        let once = merge_prolongations(&periods, 1).periods;
        let twice = merge_prolongations(&once, 1).periods;

        assert_eq!(once, twice);
        assert_eq!(twice[0].merged_count, 2);
    }

    #[test]
    fn test_empty_input() {
        let result = merge_prolongations(&[], 1);
        assert!(result.periods.is_empty());
        assert_eq!(result.audit_step.rule_id, "prolongation_merge");
    }

    #[test]
    fn test_audit_step_reasoning_counts_merges() {
        let periods = vec![
            StoppagePeriod::new(date(2024, 1, 1), date(2024, 1, 10)),
            StoppagePeriod::new(date(2024, 1, 11), date(2024, 1, 20)),
        ];

        let result = merge_prolongations(&periods, 4);

        assert_eq!(result.audit_step.step_number, 4);
        assert!(result.audit_step.reasoning.contains("1 prolongation(s) merged"));
    }
}
