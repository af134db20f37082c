//! Calculation logic for the daily benefit engine.
//!
//! This module contains the pipeline stages, leaf-first: calendar helpers,
//! tier selection, rate resolution, prolongation merging, date-effet
//! determination, payable-day windows, amount aggregation and end-of-payment
//! dates. [`calculate`] runs them in order on one claim.

mod amount;
mod calendar;
mod date_effet;
mod end_payment;
mod engine;
mod payable_days;
mod prolongation;
mod rate_resolver;
mod taux;

pub use amount::{
    AmountParams, AmountResult, PERIOD_1_DAYS, PERIOD_2_DAYS, PeriodAmount, calculate_amounts,
    calculate_period_amount,
};
pub use calendar::{
    calculate_age, count_trimesters, days_inclusive, end_of_month, next_birthday, next_weekday,
    quarter_of,
};
pub use date_effet::{
    DateEffetResult, DateEffetState, PENALTY_DAYS, SUBSEQUENT_MIN_DAYS, THRESHOLD_DAYS,
    apply_date_effet, calculate_date_effet,
};
pub use end_payment::{
    CAP_DAYS, EndPaymentResult, cap_date, calculate_end_payment_dates, end_payment_dates,
};
pub use engine::calculate;
pub use payable_days::{
    ATTESTATION_MONTH_END_DAY, LIFETIME_CAP_DAYS, PayableDaysParams, PayableDaysResult,
    attestation_cutoff, calculate_payable_days, calculate_payment_window,
};
pub use prolongation::{ProlongationMergeResult, merge_prolongations};
pub use rate_resolver::{
    PASS_DIVISOR, RateRequest, ResolvedRate, determine_contribution_class, get_daily_rate,
    pass_fraction, round_money, tier_for_code,
};
pub use taux::{
    FULL_RIGHTS_TRIMESTERS, INTERMEDIATE_AGE, MIN_TRIMESTERS, SENIOR_AGE, band_for_age,
    determine_taux_number, optin_fraction, reduction_for,
};
