//! Rate tier codes.
//!
//! A [`TauxCode`] is one of nine integers combining an age band with a
//! pathology reduction level.

use serde::{Deserialize, Serialize};

/// Age band encoded by a [`TauxCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TauxBand {
    /// Codes 1-3: full rate.
    Full,
    /// Codes 4-6: reduced/senior rate.
    Reduced,
    /// Codes 7-9: after one year, ages 62 to 69.
    Intermediate,
}

/// Pathology reduction level encoded by a [`TauxCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// No reduction.
    None,
    /// One third reduction.
    OneThird,
    /// Two thirds reduction.
    TwoThirds,
}

/// One of the nine rate tier codes.
///
/// | Reduction | Full | Reduced | Intermediate |
/// |-----------|------|---------|--------------|
/// | none      | 1    | 4       | 7            |
/// | ⅓         | 2    | 5       | 8            |
/// | ⅔         | 3    | 6       | 9            |
///
/// # Example
///
/// ```
/// use ij_engine::models::{Reduction, TauxBand, TauxCode};
///
/// let code = TauxCode::from_parts(TauxBand::Intermediate, Reduction::TwoThirds);
/// assert_eq!(code.value(), 9);
/// assert_eq!(TauxCode::new(10), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TauxCode(u8);

impl TauxCode {
    /// Creates a code, returning `None` outside 1..=9.
    pub fn new(value: u8) -> Option<Self> {
        (1..=9).contains(&value).then_some(Self(value))
    }

    /// Builds a code from its band and reduction level.
    pub fn from_parts(band: TauxBand, reduction: Reduction) -> Self {
        let base = match band {
            TauxBand::Full => 1,
            TauxBand::Reduced => 4,
            TauxBand::Intermediate => 7,
        };
        let offset = match reduction {
            Reduction::None => 0,
            Reduction::OneThird => 1,
            Reduction::TwoThirds => 2,
        };
        Self(base + offset)
    }

    /// Returns the numeric code.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the age band of the code.
    pub fn band(&self) -> TauxBand {
        match self.0 {
            1..=3 => TauxBand::Full,
            4..=6 => TauxBand::Reduced,
            _ => TauxBand::Intermediate,
        }
    }

    /// Returns the reduction level of the code.
    pub fn reduction(&self) -> Reduction {
        match (self.0 - 1) % 3 {
            0 => Reduction::None,
            1 => Reduction::OneThird,
            _ => Reduction::TwoThirds,
        }
    }

    /// Returns the same reduction level in another band.
    pub fn with_band(&self, band: TauxBand) -> Self {
        Self::from_parts(band, self.reduction())
    }
}

impl TryFrom<u8> for TauxCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TauxCode::new(value).ok_or_else(|| format!("taux code must be 1..=9, got {}", value))
    }
}

impl From<TauxCode> for u8 {
    fn from(code: TauxCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for TauxCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_and_reductions_cover_all_codes() {
        let expected = [
            (1, TauxBand::Full, Reduction::None),
            (2, TauxBand::Full, Reduction::OneThird),
            (3, TauxBand::Full, Reduction::TwoThirds),
            (4, TauxBand::Reduced, Reduction::None),
            (5, TauxBand::Reduced, Reduction::OneThird),
            (6, TauxBand::Reduced, Reduction::TwoThirds),
            (7, TauxBand::Intermediate, Reduction::None),
            (8, TauxBand::Intermediate, Reduction::OneThird),
            (9, TauxBand::Intermediate, Reduction::TwoThirds),
        ];

        for (value, band, reduction) in expected {
            let code = TauxCode::new(value).unwrap();
            assert_eq!(code.band(), band, "band of {}", value);
            assert_eq!(code.reduction(), reduction, "reduction of {}", value);
            assert_eq!(TauxCode::from_parts(band, reduction), code);
        }
    }

    #[test]
    fn test_with_band_keeps_reduction() {
        let code = TauxCode::new(8).unwrap();
        assert_eq!(code.with_band(TauxBand::Full).value(), 2);
        assert_eq!(code.with_band(TauxBand::Reduced).value(), 5);
    }

    #[test]
    fn test_zero_is_not_a_code() {
        assert_eq!(TauxCode::new(0), None);
    }

    #[test]
    fn test_serializes_as_integer() {
        let code = TauxCode::new(7).unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "7");
        let parsed: TauxCode = serde_json::from_str("3").unwrap();
        assert_eq!(parsed.value(), 3);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let result: Result<TauxCode, _> = serde_json::from_str("12");
        assert!(result.is_err());
    }
}
