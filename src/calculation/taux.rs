//! Rate tier selection.
//!
//! Maps a member's age, affiliation trimesters and pathology history to one
//! of the nine [`TauxCode`]s.

use rust_decimal::Decimal;

use crate::models::{Reduction, TauxBand, TauxCode};

/// Age from which the intermediate band applies.
pub const INTERMEDIATE_AGE: u32 = 62;

/// Age from which the senior (reduced) band applies.
pub const SENIOR_AGE: u32 = 70;

/// Trimesters below which a prior pathology zeroes the claim.
pub const MIN_TRIMESTERS: u32 = 8;

/// Trimesters from which a prior pathology no longer reduces the rate.
pub const FULL_RIGHTS_TRIMESTERS: u32 = 24;

/// Returns the age band for an age, ignoring day position.
pub fn band_for_age(age: u32) -> TauxBand {
    if age < INTERMEDIATE_AGE {
        TauxBand::Full
    } else if age < SENIOR_AGE {
        TauxBand::Intermediate
    } else {
        TauxBand::Reduced
    }
}

/// Returns the pathology reduction for a trimester count.
///
/// Below 8 trimesters the claim is zeroed before any rate is selected, so
/// no reduction is returned here.
pub fn reduction_for(trimesters: u32, prior_pathology: bool) -> Reduction {
    if !prior_pathology || trimesters >= FULL_RIGHTS_TRIMESTERS {
        return Reduction::None;
    }
    match trimesters {
        8..=15 => Reduction::OneThird,
        16..=23 => Reduction::TwoThirds,
        _ => Reduction::None,
    }
}

/// Selects the rate tier code.
///
/// A historical override, kept from an earlier decision on the same
/// pathology, is returned unchanged.
///
/// # Example
///
/// ```
/// use ij_engine::calculation::determine_taux_number;
/// use ij_engine::models::TauxCode;
///
/// assert_eq!(determine_taux_number(50, 10, true, None).value(), 2);
/// assert_eq!(determine_taux_number(65, 20, true, None).value(), 9);
/// assert_eq!(determine_taux_number(70, 30, false, None).value(), 4);
///
/// let pinned = TauxCode::new(6).unwrap();
/// assert_eq!(determine_taux_number(40, 30, false, Some(pinned)), pinned);
/// ```
pub fn determine_taux_number(
    age: u32,
    trimesters: u32,
    prior_pathology: bool,
    historical_override: Option<TauxCode>,
) -> TauxCode {
    if let Some(code) = historical_override {
        return code;
    }
    TauxCode::from_parts(band_for_age(age), reduction_for(trimesters, prior_pathology))
}

/// Fraction of the table amount paid under a pathology reduction.
pub fn optin_fraction(reduction: Reduction) -> Decimal {
    match reduction {
        Reduction::None => Decimal::ONE,
        Reduction::OneThird => Decimal::ONE / Decimal::from(3),
        Reduction::TwoThirds => Decimal::TWO / Decimal::from(3),
    }
}
