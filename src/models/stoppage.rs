//! Stoppage period ("arrêt") model.
//!
//! This module defines the [`StoppagePeriod`] struct for representing a
//! work stoppage and the [`DateEffet`] tri-state that the pipeline attaches
//! to it once the rights-opening rules have run.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of days after the start of a stoppage within which the declaration
/// is considered on time.
pub const DECLARATION_GRACE_DAYS: i64 = 2;

/// The date at which benefit rights open for a stoppage.
///
/// The three states serialize differently so downstream consumers can tell
/// a skipped period from one still waiting for the 90-day threshold:
///
/// | State          | JSON            |
/// |----------------|-----------------|
/// | `Unset`        | `null`          |
/// | `Pending`      | `""`            |
/// | `Opens(date)`  | `"YYYY-MM-DD"`  |
///
/// # Example
///
/// ```
/// use ij_engine::models::DateEffet;
/// use chrono::NaiveDate;
///
/// let opens = DateEffet::Opens(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
/// assert_eq!(serde_json::to_string(&opens).unwrap(), "\"2024-04-01\"");
/// assert_eq!(serde_json::to_string(&DateEffet::Pending).unwrap(), "\"\"");
/// assert_eq!(serde_json::to_string(&DateEffet::Unset).unwrap(), "null");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateEffet {
    /// No rights for this period (failed validation, or a short non-relapse).
    #[default]
    Unset,
    /// The cumulative 90-day threshold has not been crossed yet.
    Pending,
    /// Rights open on the given date.
    Opens(NaiveDate),
}

impl DateEffet {
    /// Returns the opening date, if rights open.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateEffet::Opens(date) => Some(*date),
            DateEffet::Unset | DateEffet::Pending => None,
        }
    }
}

impl Serialize for DateEffet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DateEffet::Unset => serializer.serialize_none(),
            DateEffet::Pending => serializer.serialize_str(""),
            DateEffet::Opens(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for DateEffet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref() {
            None => Ok(DateEffet::Unset),
            Some("") => Ok(DateEffet::Pending),
            Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(DateEffet::Opens)
                .map_err(serde::de::Error::custom),
        }
    }
}

fn default_validated() -> bool {
    true
}

fn default_merged_count() -> u32 {
    1
}

/// A work-stoppage period as supplied by the caller.
///
/// The first block of fields is caller input. `date_effet`, `length_days`
/// and `arret_diff` are attached by the pipeline and are ignored on input
/// (only the `forced_*` fields can pin a date-effet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoppagePeriod {
    /// First day of the stoppage (inclusive).
    pub from: NaiveDate,
    /// Last day of the stoppage (inclusive).
    pub to: NaiveDate,
    /// When the stoppage was declared to the fund.
    #[serde(default)]
    pub declaration_date: Option<NaiveDate>,
    /// 0 = new pathology, 1 = confirmed relapse, anything else = unset.
    #[serde(default)]
    pub rechute_flag: Option<i32>,
    /// Late declaration has been excused.
    #[serde(default)]
    pub dt_excused: bool,
    /// When the member's account was last brought up to date.
    #[serde(default)]
    pub account_update_date: Option<NaiveDate>,
    /// Whether the medical controller validated the stoppage.
    #[serde(default = "default_validated")]
    pub medical_controller_validated: bool,
    /// Date-effet imposed by a case handler.
    #[serde(default)]
    pub forced_date_effet: Option<NaiveDate>,
    /// Rights-opening date imposed by a case handler.
    #[serde(default)]
    pub forced_rights_opening_date: Option<NaiveDate>,
    /// Computed date at which rights open.
    #[serde(default)]
    pub date_effet: DateEffet,
    /// Computed inclusive length in days.
    #[serde(default)]
    pub length_days: i64,
    /// Computed cumulative stoppage days up to and including this period.
    #[serde(default)]
    pub arret_diff: i64,
    /// Number of caller periods merged into this one.
    #[serde(default = "default_merged_count")]
    pub merged_count: u32,
}

impl StoppagePeriod {
    /// Creates a validated, undeclared stoppage between two dates.
    ///
    /// # Examples
    ///
    /// ```
    /// use ij_engine::models::StoppagePeriod;
    /// use chrono::NaiveDate;
    ///
    /// let period = StoppagePeriod::new(
    ///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
    /// );
    /// assert_eq!(period.inclusive_days(), 10);
    /// assert!(period.medical_controller_validated);
    /// ```
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from,
            to,
            declaration_date: None,
            rechute_flag: None,
            dt_excused: false,
            account_update_date: None,
            medical_controller_validated: true,
            forced_date_effet: None,
            forced_rights_opening_date: None,
            date_effet: DateEffet::Unset,
            length_days: 0,
            arret_diff: 0,
            merged_count: 1,
        }
    }

    /// Returns the inclusive number of calendar days in the period.
    pub fn inclusive_days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// Returns true if the caller flagged this period as a confirmed relapse.
    pub fn is_confirmed_relapse(&self) -> bool {
        self.rechute_flag == Some(1)
    }

    /// Returns the forced date, if any. The rights-opening date wins over
    /// the forced date-effet when both are present.
    pub fn forced_date(&self) -> Option<NaiveDate> {
        self.forced_rights_opening_date.or(self.forced_date_effet)
    }

    /// Returns the declaration date when it falls after the grace window.
    pub fn late_declaration(&self) -> Option<NaiveDate> {
        self.declaration_date
            .filter(|declared| *declared > self.from + Duration::days(DECLARATION_GRACE_DAYS))
    }

    /// Returns the account update date when it postdates the stoppage start.
    pub fn late_account_update(&self) -> Option<NaiveDate> {
        self.account_update_date.filter(|updated| *updated > self.from)
    }
}
