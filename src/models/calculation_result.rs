//! Calculation result models for the daily benefit engine.
//!
//! This module contains the [`CalculationResult`] type and its associated
//! structures: per-period payment windows, rate and daily breakdowns, the
//! end-of-payment caps and the audit trace.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContributionClass, StoppagePeriod, TauxCode};

/// Which sub-period of a stoppage a priced day belongs to.
///
/// Serialized as `"1"`, `"2"`, `"3"`, `"senior"` or `"forced"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierPeriod {
    /// Days 1-365 (and every day for members under 62).
    #[serde(rename = "1")]
    One,
    /// Days 366-730 of a long stoppage, ages 62 to 69.
    #[serde(rename = "2")]
    Two,
    /// Remaining days up to 1095, ages 62 to 69.
    #[serde(rename = "3")]
    Three,
    /// Members aged 70 or over.
    #[serde(rename = "senior")]
    Senior,
    /// A caller-supplied daily rate replaced the computed one.
    #[serde(rename = "forced")]
    Forced,
}

/// Where a daily rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// The date-indexed rate table.
    Table,
    /// The post-reform PASS formula.
    Pass,
    /// A caller-supplied forced rate.
    Forced,
}

/// Machine-readable reason for days not being paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The medical controller did not validate the stoppage.
    MedicalValidationFailed,
    /// No date-effet was assigned to the period.
    NoDateEffet,
    /// The cumulative 90-day threshold has not been crossed yet.
    ThresholdPending,
    /// The payment window closes before it opens.
    EmptyWindow,
    /// The payment window opens and closes on the same day.
    SingleDayBoundary,
    /// The 1095-day ceiling was reached.
    LifetimeCapReached,
    /// Fewer than 8 affiliation trimesters with a prior pathology.
    InsufficientAffiliation,
}

/// Payable window of a single stoppage period.
///
/// `payable_days` is zero whenever `start > end`, the window is a single
/// boundary day, or the period failed medical validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentWindow {
    /// First payable day, if the period has a date-effet.
    pub start: Option<NaiveDate>,
    /// Last payable day, if the period has a date-effet.
    pub end: Option<NaiveDate>,
    /// Number of payable days in the window.
    pub payable_days: i64,
    /// Why some or all days are not payable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_days_reason: Option<ExclusionReason>,
}

impl PaymentWindow {
    /// Creates an empty window with the given reason.
    pub fn excluded(reason: ExclusionReason) -> Self {
        Self {
            start: None,
            end: None,
            payable_days: 0,
            excluded_days_reason: Some(reason),
        }
    }
}

/// A run of consecutive days sharing the same age, rate period, tier and rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSegment {
    /// Calendar year of the segment.
    pub year: i32,
    /// Calendar month of the segment.
    pub month: u32,
    /// Calendar quarter (1-4) of the segment.
    pub trimester: u32,
    /// Sub-period of the stoppage.
    pub tier_period: TierPeriod,
    /// First day of the segment.
    pub start: NaiveDate,
    /// Last day of the segment.
    pub end: NaiveDate,
    /// Number of days in the segment.
    pub days: i64,
    /// Daily rate applied to every day of the segment.
    pub daily_rate: Decimal,
    /// Tier code used to resolve the rate.
    pub taux_code: TauxCode,
    /// Member age during the segment.
    pub age: u32,
    /// Contribution class used to resolve the rate.
    pub class: ContributionClass,
    /// Where the daily rate came from.
    pub rate_source: RateSource,
    /// `daily_rate * days`, after the reduction fraction for table rates.
    ///
    /// Segment amounts add up to the period amount; the last segment
    /// absorbs the rounding difference.
    pub amount: Decimal,
}

/// A single paid calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// The paid day.
    pub date: NaiveDate,
    /// Day of the week.
    pub weekday: Weekday,
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Calendar quarter (1-4).
    pub trimester: u32,
    /// Sub-period of the stoppage.
    pub tier_period: TierPeriod,
    /// Tier code used for the day.
    pub taux_code: TauxCode,
    /// Daily rate for the day.
    pub daily_rate: Decimal,
    /// Amount paid for the day after the reduction fraction.
    ///
    /// The last day of a period absorbs the rounding difference.
    pub amount: Decimal,
}

/// Result for one merged stoppage period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodResult {
    /// The merged period with its computed date-effet and lengths.
    pub period: StoppagePeriod,
    /// The payable window.
    pub window: PaymentWindow,
    /// Affiliation trimesters at the start of the originating stoppage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trimesters: Option<u32>,
    /// Amount for the period before prorata, rounded to 2 decimals.
    pub amount: Decimal,
    /// Segments priced for the period.
    pub rate_breakdown: Vec<RateSegment>,
    /// One row per paid calendar day.
    pub daily_breakdown: Vec<DailyEntry>,
}

/// Dates at which the statutory day caps are reached.
///
/// Absent fields are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndPaymentDates {
    /// Date the 365-day cap is reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_period_1: Option<NaiveDate>,
    /// Date the 730-day cap is reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_period_2: Option<NaiveDate>,
    /// Date the 1095-day cap is reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_period_3: Option<NaiveDate>,
}

impl EndPaymentDates {
    /// Returns true when no cap date was produced.
    pub fn is_empty(&self) -> bool {
        self.end_period_1.is_none() && self.end_period_2.is_none() && self.end_period_3.is_none()
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the regulation behind this rule.
    pub rule_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag conditions that zeroed part of the result or that point at
/// a configuration gap, without aborting the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Returns the number the next step should carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Returns true if a warning with the given code was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// The complete result of a benefit calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Total payable days across all periods.
    pub total_payable_days: i64,
    /// Total amount, rounded half-up to 2 decimals.
    pub total_amount: Decimal,
    /// Per-period results in chronological order.
    pub periods: Vec<PeriodResult>,
    /// Member age at the evaluation date.
    pub age: u32,
    /// Affiliation trimesters at the first stoppage, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation_trimesters: Option<u32>,
    /// Cumulative stoppage days including the caller's prior days.
    pub cumulative_days: i64,
    /// Contribution class used for pricing.
    pub contribution_class: ContributionClass,
    /// Dates the statutory day caps are reached.
    pub end_payment_dates: EndPaymentDates,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
