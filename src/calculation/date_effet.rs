//! Date-effet calculation.
//!
//! Walks the merged stoppages in order and decides, for each one, the date
//! at which benefit rights open. The walk is a state machine: the running
//! cumulative day count and any pending penalty dates are carried in an
//! explicit [`DateEffetState`] that is threaded from one period to the next.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::{AuditStep, DateEffet, StoppagePeriod};

/// Cumulative stoppage days after which rights open on a new pathology.
pub const THRESHOLD_DAYS: i64 = 90;

/// Penalty applied after a late declaration or account update.
pub const PENALTY_DAYS: i64 = 30;

/// Minimum length of a non-relapse stoppage to reopen rights.
pub const SUBSEQUENT_MIN_DAYS: i64 = 15;

/// State carried from one period to the next during the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateEffetState {
    /// Stoppage days accumulated so far, including prior days.
    pub cumulative_days: i64,
    /// Latest date-effet candidate produced by a declaration.
    pub declaration_penalty: Option<NaiveDate>,
    /// Latest date-effet candidate produced by an account update.
    pub account_penalty: Option<NaiveDate>,
    /// Rights have opened for the pathology.
    pub rights_opened: bool,
}

impl DateEffetState {
    /// Creates the initial state, seeded with days consumed before the
    /// current periods.
    pub fn new(prior_cumulative_days: i64) -> Self {
        Self {
            cumulative_days: prior_cumulative_days,
            ..Self::default()
        }
    }
}

/// The result of the date-effet scan, including the audit step.
#[derive(Debug, Clone)]
pub struct DateEffetResult {
    /// State after the last period.
    pub state: DateEffetState,
    /// The audit step recording every decision.
    pub audit_step: AuditStep,
}

/// Records the penalty candidates of a period into the state.
fn record_penalties(state: &mut DateEffetState, period: &StoppagePeriod) {
    if let Some(declared) = period.late_declaration() {
        let candidate = if period.dt_excused {
            declared
        } else {
            declared + Duration::days(PENALTY_DAYS)
        };
        state.declaration_penalty = Some(candidate);
    }
    if let Some(updated) = period.late_account_update() {
        state.account_penalty = Some(updated + Duration::days(PENALTY_DAYS));
    }
}

/// Applies the rights-opening rules to one period.
///
/// Sets `date_effet`, `length_days` and `arret_diff` on the period and
/// returns the state to carry to the next one. The function has no hidden
/// state: the same period and state always give the same outcome.
///
/// # Rules
///
/// - A period the medical controller rejected gets no date-effet, but its
///   length still counts towards the cumulative total.
/// - A forced date is used verbatim and opens rights.
/// - Until rights open, a period crossing the 90-day cumulative threshold
///   opens on `from + (90 - cumulative_before)`, pushed back by any
///   declaration or account-update penalty seen so far. A period that stays
///   under the threshold is `Pending`.
/// - Once rights are open, a confirmed relapse opens on its first day and
///   any other period of at least 15 days opens on its 15th day.
///
/// # Example
///
/// ```
/// use ij_engine::calculation::{DateEffetState, apply_date_effet};
/// use ij_engine::models::{DateEffet, StoppagePeriod};
/// use chrono::NaiveDate;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let mut period = StoppagePeriod::new(d(1, 1), d(6, 30));
///
/// let state = apply_date_effet(DateEffetState::new(0), &mut period);
/// assert_eq!(period.date_effet, DateEffet::Opens(d(3, 31)));
/// assert_eq!(period.arret_diff, 182);
/// assert!(state.rights_opened);
/// ```
pub fn apply_date_effet(mut state: DateEffetState, period: &mut StoppagePeriod) -> DateEffetState {
    let length = period.inclusive_days();
    let cumulative_before = state.cumulative_days;
    state.cumulative_days = state.cumulative_days.saturating_add(length);
    period.length_days = length;
    period.arret_diff = state.cumulative_days;

    if !period.medical_controller_validated {
        period.date_effet = DateEffet::Unset;
        debug!(from = %period.from, to = %period.to, "Period not validated, no date-effet");
        return state;
    }

    if let Some(forced) = period.forced_date() {
        period.date_effet = DateEffet::Opens(forced);
        state.rights_opened = true;
        debug!(from = %period.from, date_effet = %forced, "Forced date-effet");
        return state;
    }

    if !state.rights_opened {
        record_penalties(&mut state, period);

        if state.cumulative_days <= THRESHOLD_DAYS {
            period.date_effet = DateEffet::Pending;
            debug!(
                from = %period.from,
                cumulative_days = state.cumulative_days,
                "Threshold not reached"
            );
            return state;
        }

        let base = period.from + Duration::days((THRESHOLD_DAYS - cumulative_before).max(0));
        let opens = [Some(base), state.declaration_penalty, state.account_penalty]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(base);

        period.date_effet = DateEffet::Opens(opens);
        state.rights_opened = true;
        debug!(from = %period.from, date_effet = %opens, base = %base, "Rights opened");
        return state;
    }

    period.date_effet = if period.is_confirmed_relapse() {
        DateEffet::Opens(period.from)
    } else if length >= SUBSEQUENT_MIN_DAYS {
        DateEffet::Opens(period.from + Duration::days(SUBSEQUENT_MIN_DAYS - 1))
    } else {
        DateEffet::Unset
    };
    debug!(from = %period.from, date_effet = ?period.date_effet, "Subsequent period");

    state
}

/// Runs the date-effet state machine over merged periods, in place.
///
/// Periods must already be merged and sorted. Computed fields present on
/// the input are overwritten, so running the scan on its own output gives
/// the same dates.
pub fn calculate_date_effet(
    periods: &mut [StoppagePeriod],
    prior_cumulative_days: i64,
    step_number: u32,
) -> DateEffetResult {
    let state = periods
        .iter_mut()
        .fold(DateEffetState::new(prior_cumulative_days), |state, period| {
            apply_date_effet(state, period)
        });

    let opened = periods
        .iter()
        .filter(|p| matches!(p.date_effet, DateEffet::Opens(_)))
        .count();

    let audit_step = AuditStep {
        step_number,
        rule_id: "date_effet".to_string(),
        rule_name: "Date-Effet Determination".to_string(),
        rule_ref: "date_effet".to_string(),
        input: serde_json::json!({
            "prior_cumulative_days": prior_cumulative_days,
            "periods": periods.len(),
        }),
        output: serde_json::json!({
            "periods": periods
                .iter()
                .map(|p| serde_json::json!({
                    "from": p.from.to_string(),
                    "to": p.to.to_string(),
                    "date_effet": p.date_effet,
                    "length_days": p.length_days,
                    "arret_diff": p.arret_diff,
                }))
                .collect::<Vec<_>>(),
            "cumulative_days": state.cumulative_days,
        }),
        reasoning: format!(
            "Rights open on {} of {} period(s); {} cumulative day(s)",
            opened,
            periods.len(),
            state.cumulative_days
        ),
    };

    DateEffetResult { state, audit_step }
}
