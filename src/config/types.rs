//! Configuration types for benefit calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files: the scheme metadata,
//! the date-indexed rate table and the yearly PASS ceilings.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::models::ContributionClass;

/// Metadata about the benefit scheme.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemeMetadata {
    /// Short code of the scheme (e.g., "CARMF-IJ").
    pub code: String,
    /// The human-readable name of the scheme.
    pub name: String,
    /// The version of the configuration.
    pub version: String,
    /// URL to the official scheme documentation.
    pub source_url: String,
    /// Stoppages whose date-effet is on or after this date are priced from
    /// the PASS instead of the rate table.
    pub reform_date: NaiveDate,
    /// Revenue thresholds for contribution classes.
    #[serde(default)]
    pub class_thresholds: ClassThresholds,
}

/// Revenue thresholds, expressed as multiples of the PASS.
///
/// Revenue up to `class_a_max` PASS is class A, up to `class_b_max` PASS is
/// class B, anything above is class C.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassThresholds {
    /// Upper bound of class A in PASS multiples.
    pub class_a_max: Decimal,
    /// Upper bound of class B in PASS multiples.
    pub class_b_max: Decimal,
}

impl Default for ClassThresholds {
    fn default() -> Self {
        Self {
            class_a_max: Decimal::ONE,
            class_b_max: Decimal::from(3),
        }
    }
}

/// A column of the rate table within a contribution class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateTier {
    /// Full rate.
    One,
    /// Senior rate (70 and over, or third period after a second one).
    Two,
    /// Intermediate rate (62 to 69 after the first year).
    Three,
}

impl RateTier {
    /// Returns the column number (1-3).
    pub fn number(&self) -> u8 {
        match self {
            RateTier::One => 1,
            RateTier::Two => 2,
            RateTier::Three => 3,
        }
    }
}

/// One row of the rate table: nine daily rates valid over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RatePeriod {
    /// First day the rates apply (inclusive).
    pub date_start: NaiveDate,
    /// Last day the rates apply (inclusive).
    pub date_end: NaiveDate,
    /// Class A, tier 1.
    pub rate_a1: Decimal,
    /// Class A, tier 2.
    pub rate_a2: Decimal,
    /// Class A, tier 3.
    pub rate_a3: Decimal,
    /// Class B, tier 1.
    pub rate_b1: Decimal,
    /// Class B, tier 2.
    pub rate_b2: Decimal,
    /// Class B, tier 3.
    pub rate_b3: Decimal,
    /// Class C, tier 1.
    pub rate_c1: Decimal,
    /// Class C, tier 2.
    pub rate_c2: Decimal,
    /// Class C, tier 3.
    pub rate_c3: Decimal,
}

impl RatePeriod {
    /// Returns the daily rate for a class and tier.
    pub fn rate(&self, class: ContributionClass, tier: RateTier) -> Decimal {
        match (class, tier) {
            (ContributionClass::A, RateTier::One) => self.rate_a1,
            (ContributionClass::A, RateTier::Two) => self.rate_a2,
            (ContributionClass::A, RateTier::Three) => self.rate_a3,
            (ContributionClass::B, RateTier::One) => self.rate_b1,
            (ContributionClass::B, RateTier::Two) => self.rate_b2,
            (ContributionClass::B, RateTier::Three) => self.rate_b3,
            (ContributionClass::C, RateTier::One) => self.rate_c1,
            (ContributionClass::C, RateTier::Two) => self.rate_c2,
            (ContributionClass::C, RateTier::Three) => self.rate_c3,
        }
    }

    /// Returns true if the date falls inside the period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_start <= date && date <= self.date_end
    }
}

/// Immutable, chronologically ordered collection of rate periods.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    periods: Vec<RatePeriod>,
}

impl RateTable {
    /// Builds a table, sorting the periods and rejecting inverted or
    /// overlapping ranges.
    pub fn new(periods: Vec<RatePeriod>) -> EngineResult<Self> {
        let mut sorted = periods;
        sorted.sort_by(|a, b| a.date_start.cmp(&b.date_start));

        for period in &sorted {
            if period.date_start > period.date_end {
                return Err(EngineError::InvalidConfig {
                    message: format!(
                        "rate period {} ends before it starts ({})",
                        period.date_start, period.date_end
                    ),
                });
            }
        }
        for pair in sorted.windows(2) {
            if pair[1].date_start <= pair[0].date_end {
                return Err(EngineError::InvalidConfig {
                    message: format!(
                        "rate periods starting {} and {} overlap",
                        pair[0].date_start, pair[1].date_start
                    ),
                });
            }
        }

        Ok(Self { periods: sorted })
    }

    /// Returns all periods, oldest first.
    pub fn periods(&self) -> &[RatePeriod] {
        &self.periods
    }

    /// Finds the period covering a date.
    pub fn find_by_date(&self, date: NaiveDate) -> Option<&RatePeriod> {
        self.periods.iter().find(|p| p.contains(date))
    }

    /// Finds a period for a year: the one covering January 1st, else the
    /// first one starting during that year.
    pub fn find_by_year(&self, year: i32) -> Option<&RatePeriod> {
        NaiveDate::from_ymd_opt(year, 1, 1)
            .and_then(|jan_first| self.find_by_date(jan_first))
            .or_else(|| self.periods.iter().find(|p| p.date_start.year() == year))
    }
}

/// Yearly social-security ceilings (PASS).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassCeilings {
    /// Ceiling by calendar year.
    pub ceilings: BTreeMap<i32, Decimal>,
}

impl PassCeilings {
    /// Returns the ceiling for a year.
    pub fn for_year(&self, year: i32) -> Option<Decimal> {
        self.ceilings.get(&year).copied()
    }
}

/// The complete scheme configuration.
///
/// Loaded once and shared read-only between calculations.
#[derive(Debug, Clone)]
pub struct SchemeConfig {
    metadata: SchemeMetadata,
    rate_table: RateTable,
    pass: PassCeilings,
}

impl SchemeConfig {
    /// Creates a new SchemeConfig from its component parts.
    pub fn new(metadata: SchemeMetadata, rate_table: RateTable, pass: PassCeilings) -> Self {
        Self {
            metadata,
            rate_table,
            pass,
        }
    }

    /// Returns the scheme metadata.
    pub fn scheme(&self) -> &SchemeMetadata {
        &self.metadata
    }

    /// Returns the rate table.
    pub fn rate_table(&self) -> &RateTable {
        &self.rate_table
    }

    /// Returns the PASS ceilings.
    pub fn pass(&self) -> &PassCeilings {
        &self.pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: NaiveDate, end: NaiveDate, base: &str) -> RatePeriod {
        let base = dec(base);
        RatePeriod {
            date_start: start,
            date_end: end,
            rate_a1: base,
            rate_a2: base / Decimal::TWO,
            rate_a3: base * dec("0.75"),
            rate_b1: base * Decimal::TWO,
            rate_b2: base,
            rate_b3: base * dec("1.5"),
            rate_c1: base * Decimal::from(3),
            rate_c2: base * dec("1.5"),
            rate_c3: base * dec("2.25"),
        }
    }

    #[test]
    fn test_rate_lookup_by_class_and_tier() {
        let p = period(date(2024, 1, 1), date(2024, 12, 31), "100");
        assert_eq!(p.rate(ContributionClass::A, RateTier::One), dec("100"));
        assert_eq!(p.rate(ContributionClass::A, RateTier::Two), dec("50"));
        assert_eq!(p.rate(ContributionClass::B, RateTier::Three), dec("150"));
        assert_eq!(p.rate(ContributionClass::C, RateTier::Two), dec("150"));
    }

    #[test]
    fn test_table_sorts_periods() {
        let table = RateTable::new(vec![
            period(date(2024, 1, 1), date(2024, 12, 31), "100"),
            period(date(2023, 1, 1), date(2023, 12, 31), "90"),
        ])
        .unwrap();
        assert_eq!(table.periods()[0].date_start, date(2023, 1, 1));
    }

    #[test]
    fn test_table_rejects_overlap() {
        let result = RateTable::new(vec![
            period(date(2023, 1, 1), date(2024, 1, 31), "90"),
            period(date(2024, 1, 1), date(2024, 12, 31), "100"),
        ]);
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_table_rejects_inverted_period() {
        let result = RateTable::new(vec![period(date(2024, 12, 31), date(2024, 1, 1), "90")]);
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_find_by_date_and_miss() {
        let table = RateTable::new(vec![
            period(date(2023, 1, 1), date(2023, 12, 31), "90"),
            period(date(2024, 1, 1), date(2024, 12, 31), "100"),
        ])
        .unwrap();

        let found = table.find_by_date(date(2024, 2, 29)).unwrap();
        assert_eq!(found.rate_a1, dec("100"));
        assert!(table.find_by_date(date(2022, 12, 31)).is_none());
    }

    #[test]
    fn test_find_by_year_falls_back_to_first_period_of_year() {
        let table = RateTable::new(vec![period(date(2024, 4, 1), date(2024, 12, 31), "100")])
            .unwrap();
        assert_eq!(
            table.find_by_year(2024).unwrap().date_start,
            date(2024, 4, 1)
        );
        assert!(table.find_by_year(2023).is_none());
    }

    #[test]
    fn test_pass_for_year() {
        let mut pass = PassCeilings::default();
        pass.ceilings.insert(2025, dec("47100"));
        assert_eq!(pass.for_year(2025), Some(dec("47100")));
        assert_eq!(pass.for_year(2026), None);
    }

    #[test]
    fn test_default_class_thresholds() {
        let thresholds = ClassThresholds::default();
        assert_eq!(thresholds.class_a_max, dec("1"));
        assert_eq!(thresholds.class_b_max, dec("3"));
    }
}
