//! Member attributes that drive rate selection.
//!
//! This module defines the professional status, contribution class and
//! option percentage of the insured professional.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{EngineError, EngineResult};

/// Professional status of the member.
///
/// Two of the three statuses receive a fraction of the table rate chosen at
/// affiliation (the "option"); doctors receive the full rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfessionalStatus {
    /// Practising doctor, full table rate.
    #[serde(rename = "M")]
    Medecin,
    /// Retired doctor still practising (cumul emploi-retraite).
    #[serde(rename = "RSPM")]
    Rspm,
    /// Collaborating spouse.
    #[serde(rename = "CCPL")]
    ConjointCollaborateur,
}

impl ProfessionalStatus {
    /// Returns true if the option percentage multiplies the base rate.
    ///
    /// # Examples
    ///
    /// ```
    /// use ij_engine::models::ProfessionalStatus;
    ///
    /// assert!(!ProfessionalStatus::Medecin.requires_option());
    /// assert!(ProfessionalStatus::ConjointCollaborateur.requires_option());
    /// ```
    pub fn requires_option(&self) -> bool {
        matches!(
            self,
            ProfessionalStatus::Rspm | ProfessionalStatus::ConjointCollaborateur
        )
    }

    /// Returns the short code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            ProfessionalStatus::Medecin => "M",
            ProfessionalStatus::Rspm => "RSPM",
            ProfessionalStatus::ConjointCollaborateur => "CCPL",
        }
    }
}

/// Contribution class, generally determined from revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContributionClass {
    /// Lowest class.
    A,
    /// Middle class.
    B,
    /// Highest class.
    C,
}

impl ContributionClass {
    /// Multiplier applied to the PASS-based daily rate (A=1, B=2, C=3).
    pub fn multiplier(&self) -> Decimal {
        match self {
            ContributionClass::A => Decimal::ONE,
            ContributionClass::B => Decimal::TWO,
            ContributionClass::C => Decimal::from(3),
        }
    }
}

impl std::fmt::Display for ContributionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContributionClass::A => write!(f, "A"),
            ContributionClass::B => write!(f, "B"),
            ContributionClass::C => write!(f, "C"),
        }
    }
}

/// Raw option value as it arrives from callers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawOption {
    Text(String),
    Number(Decimal),
}

/// The option percentage, normalized to a fraction in `[0, 1]`.
///
/// Callers send it as a locale string (`"0,25"`), an integer percentage
/// (`25`) or a float fraction (`0.25`). Values strictly above 1 are read as
/// percentages; values up to 1 are read as fractions.
///
/// # Examples
///
/// ```
/// use ij_engine::models::OptionRate;
/// use rust_decimal::Decimal;
///
/// assert_eq!(OptionRate::parse("0,25").unwrap().fraction(), Decimal::new(25, 2));
/// assert_eq!(OptionRate::parse("25").unwrap().fraction(), Decimal::new(25, 2));
/// assert_eq!(OptionRate::parse("100%").unwrap().fraction(), Decimal::ONE);
/// assert!(OptionRate::parse("abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "Decimal")]
pub struct OptionRate(Decimal);

impl OptionRate {
    /// The full rate (100%).
    pub const FULL: OptionRate = OptionRate(Decimal::ONE);

    /// Parses a caller-supplied option string.
    pub fn parse(raw: &str) -> EngineResult<Self> {
        let cleaned = raw.trim().trim_end_matches('%').trim().replace(',', ".");
        let value = Decimal::from_str(&cleaned).map_err(|_| EngineError::InvalidOption {
            value: raw.to_string(),
        })?;
        Self::from_decimal(value).ok_or_else(|| EngineError::InvalidOption {
            value: raw.to_string(),
        })
    }

    /// Normalizes a numeric option; returns `None` outside `[0, 100]`.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() || value > Decimal::ONE_HUNDRED {
            return None;
        }
        if value > Decimal::ONE {
            Some(Self(value / Decimal::ONE_HUNDRED))
        } else {
            Some(Self(value))
        }
    }

    /// Returns the option as a fraction between 0 and 1.
    pub fn fraction(&self) -> Decimal {
        self.0
    }
}

impl Default for OptionRate {
    fn default() -> Self {
        Self::FULL
    }
}

impl<'de> Deserialize<'de> for OptionRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match RawOption::deserialize(deserializer)? {
            RawOption::Text(text) => OptionRate::parse(&text),
            RawOption::Number(value) => {
                OptionRate::from_decimal(value).ok_or_else(|| EngineError::InvalidOption {
                    value: value.to_string(),
                })
            }
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

impl From<OptionRate> for Decimal {
    fn from(option: OptionRate) -> Self {
        option.0
    }
}
