//! Request types for the daily benefit API.
//!
//! This module defines the JSON request structures for the `/calculate` endpoint.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    CalculationInput, ContributionClass, OptionRate, ProfessionalStatus, StoppagePeriod, TauxCode,
};

fn default_validated() -> bool {
    true
}

/// Request body for the `/calculate` endpoint.
///
/// Mirrors [`CalculationInput`], but only accepts the caller-owned fields of
/// each stoppage period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The stoppage periods to price.
    pub periods: Vec<StoppagePeriodRequest>,
    /// Professional status code (`M`, `RSPM` or `CCPL`).
    pub professional_status: ProfessionalStatus,
    /// Contribution class, when known.
    #[serde(default)]
    pub contribution_class: Option<ContributionClass>,
    /// Revenue of year N-2.
    #[serde(default)]
    pub revenue_n_minus_2: Option<Decimal>,
    /// Option percentage.
    #[serde(default)]
    pub option: OptionRate,
    /// Member birth date.
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Evaluation date; today (UTC) when omitted.
    #[serde(default)]
    pub evaluation_date: Option<NaiveDate>,
    /// Days already consumed.
    #[serde(default)]
    pub prior_cumulative_days: i64,
    /// Affiliation start date.
    #[serde(default)]
    pub affiliation_date: Option<NaiveDate>,
    /// Affiliation trimesters.
    #[serde(default)]
    pub affiliation_trimesters: Option<u32>,
    /// The pathology predates affiliation.
    #[serde(default)]
    pub prior_pathology: bool,
    /// Latest attestation date.
    #[serde(default)]
    pub attestation_date: Option<NaiveDate>,
    /// Last day already paid.
    #[serde(default)]
    pub last_payment_date: Option<NaiveDate>,
    /// Fraction of the total due.
    #[serde(default)]
    pub prorata: Option<Decimal>,
    /// Daily rate overriding every computed rate.
    #[serde(default)]
    pub forced_daily_rate: Option<Decimal>,
    /// First day of the originating stoppage.
    #[serde(default)]
    pub first_pathology_stop_date: Option<NaiveDate>,
    /// Reduced tier code previously granted.
    #[serde(default)]
    pub historical_reduced_rate_code: Option<TauxCode>,
}

/// A stoppage period in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoppagePeriodRequest {
    /// First day (inclusive).
    pub from: NaiveDate,
    /// Last day (inclusive).
    pub to: NaiveDate,
    /// Declaration date.
    #[serde(default)]
    pub declaration_date: Option<NaiveDate>,
    /// Relapse flag (1 = confirmed relapse).
    #[serde(default)]
    pub rechute_flag: Option<i32>,
    /// Late declaration excused.
    #[serde(default)]
    pub dt_excused: bool,
    /// Account update date.
    #[serde(default)]
    pub account_update_date: Option<NaiveDate>,
    /// Medical controller validation.
    #[serde(default = "default_validated")]
    pub medical_controller_validated: bool,
    /// Imposed date-effet.
    #[serde(default)]
    pub forced_date_effet: Option<NaiveDate>,
    /// Imposed rights-opening date.
    #[serde(default)]
    pub forced_rights_opening_date: Option<NaiveDate>,
}

impl From<StoppagePeriodRequest> for StoppagePeriod {
    fn from(req: StoppagePeriodRequest) -> Self {
        let mut period = StoppagePeriod::new(req.from, req.to);
        period.declaration_date = req.declaration_date;
        period.rechute_flag = req.rechute_flag;
        period.dt_excused = req.dt_excused;
        period.account_update_date = req.account_update_date;
        period.medical_controller_validated = req.medical_controller_validated;
        period.forced_date_effet = req.forced_date_effet;
        period.forced_rights_opening_date = req.forced_rights_opening_date;
        period
    }
}

impl CalculationRequest {
    /// Converts the request into a [`CalculationInput`].
    ///
    /// `today` fills the evaluation date when the caller did not supply one.
    pub fn into_input(self, today: NaiveDate) -> CalculationInput {
        CalculationInput {
            periods: self.periods.into_iter().map(StoppagePeriod::from).collect(),
            professional_status: self.professional_status,
            contribution_class: self.contribution_class,
            revenue_n_minus_2: self.revenue_n_minus_2,
            option: self.option,
            birth_date: self.birth_date,
            evaluation_date: Some(self.evaluation_date.unwrap_or(today)),
            prior_cumulative_days: self.prior_cumulative_days,
            affiliation_date: self.affiliation_date,
            affiliation_trimesters: self.affiliation_trimesters,
            prior_pathology: self.prior_pathology,
            attestation_date: self.attestation_date,
            last_payment_date: self.last_payment_date,
            prorata: self.prorata,
            forced_daily_rate: self.forced_daily_rate,
            first_pathology_stop_date: self.first_pathology_stop_date,
            historical_reduced_rate_code: self.historical_reduced_rate_code,
        }
    }
}
