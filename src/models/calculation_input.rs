//! Calculation input model.
//!
//! [`CalculationInput`] is the normalized record callers hand to the
//! pipeline: the stoppage periods plus everything known about the member.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ContributionClass, OptionRate, ProfessionalStatus, StoppagePeriod, TauxCode};

/// Everything the pipeline needs to price a claim.
///
/// # Example
///
/// ```
/// use ij_engine::models::{CalculationInput, ProfessionalStatus, StoppagePeriod};
/// use chrono::NaiveDate;
///
/// let period = StoppagePeriod::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
/// );
/// let input = CalculationInput::new(
///     vec![period],
///     ProfessionalStatus::Medecin,
///     NaiveDate::from_ymd_opt(1980, 5, 12).unwrap(),
/// );
/// assert_eq!(input.prior_cumulative_days, 0);
/// assert!(!input.prior_pathology);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Stoppage periods, in any order.
    pub periods: Vec<StoppagePeriod>,
    /// Professional status of the member.
    pub professional_status: ProfessionalStatus,
    /// Contribution class; derived from revenue when absent.
    #[serde(default)]
    pub contribution_class: Option<ContributionClass>,
    /// Revenue of year N-2, used when the class is not supplied.
    #[serde(default)]
    pub revenue_n_minus_2: Option<Decimal>,
    /// Option percentage for statuses that use one.
    #[serde(default)]
    pub option: OptionRate,
    /// Member birth date.
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Date the calculation is evaluated at.
    #[serde(default)]
    pub evaluation_date: Option<NaiveDate>,
    /// Days already consumed before these periods.
    #[serde(default)]
    pub prior_cumulative_days: i64,
    /// Affiliation start date.
    #[serde(default)]
    pub affiliation_date: Option<NaiveDate>,
    /// Affiliation trimesters, when the affiliation date is unknown.
    #[serde(default)]
    pub affiliation_trimesters: Option<u32>,
    /// The pathology predates affiliation.
    #[serde(default)]
    pub prior_pathology: bool,
    /// Date of the latest attestation received.
    #[serde(default)]
    pub attestation_date: Option<NaiveDate>,
    /// Last day already paid.
    #[serde(default)]
    pub last_payment_date: Option<NaiveDate>,
    /// Fraction of the total actually due (0-1).
    #[serde(default)]
    pub prorata: Option<Decimal>,
    /// Daily rate overriding every computed rate.
    #[serde(default)]
    pub forced_daily_rate: Option<Decimal>,
    /// First day of the stoppage that started the pathology.
    #[serde(default)]
    pub first_pathology_stop_date: Option<NaiveDate>,
    /// Reduced tier code previously granted for the same pathology.
    #[serde(default)]
    pub historical_reduced_rate_code: Option<TauxCode>,
}

impl CalculationInput {
    /// Creates an input with the mandatory fields and neutral defaults.
    pub fn new(
        periods: Vec<StoppagePeriod>,
        professional_status: ProfessionalStatus,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            periods,
            professional_status,
            contribution_class: None,
            revenue_n_minus_2: None,
            option: OptionRate::FULL,
            birth_date: Some(birth_date),
            evaluation_date: None,
            prior_cumulative_days: 0,
            affiliation_date: None,
            affiliation_trimesters: None,
            prior_pathology: false,
            attestation_date: None,
            last_payment_date: None,
            prorata: None,
            forced_daily_rate: None,
            first_pathology_stop_date: None,
            historical_reduced_rate_code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_input() {
        let json = r#"{
            "periods": [{ "from": "2024-01-01", "to": "2024-06-30" }],
            "professional_status": "M",
            "contribution_class": "B",
            "birth_date": "1975-04-02"
        }"#;

        let input: CalculationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.periods.len(), 1);
        assert_eq!(input.contribution_class, Some(ContributionClass::B));
        assert_eq!(input.option, OptionRate::FULL);
        assert_eq!(input.prior_cumulative_days, 0);
        assert_eq!(input.historical_reduced_rate_code, None);
    }

    #[test]
    fn test_deserialize_full_input() {
        let json = r#"{
            "periods": [{ "from": "2024-01-01", "to": "2024-06-30", "rechute_flag": 1 }],
            "professional_status": "CCPL",
            "option": "0,5",
            "revenue_n_minus_2": "52000",
            "birth_date": "1960-02-29",
            "evaluation_date": "2024-07-01",
            "prior_cumulative_days": 12,
            "affiliation_date": "2019-10-01",
            "prior_pathology": true,
            "attestation_date": "2024-06-27",
            "prorata": "0.5",
            "forced_daily_rate": "25.02",
            "historical_reduced_rate_code": 5
        }"#;

        let input: CalculationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.professional_status, ProfessionalStatus::ConjointCollaborateur);
        assert_eq!(input.option.fraction(), Decimal::new(5, 1));
        assert_eq!(input.prior_cumulative_days, 12);
        assert!(input.prior_pathology);
        assert_eq!(input.forced_daily_rate, Some(Decimal::new(2502, 2)));
        assert_eq!(input.historical_reduced_rate_code.map(|c| c.value()), Some(5));
        assert_eq!(input.periods[0].rechute_flag, Some(1));
    }

    #[test]
    fn test_missing_birth_date_deserializes_to_none() {
        let json = r#"{ "periods": [], "professional_status": "M" }"#;

        let input: CalculationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.birth_date, None);
    }
}
