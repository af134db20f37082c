//! Calendar helpers shared by the pipeline stages.
//!
//! Ages, affiliation trimesters, business-day adjacency and the boundaries
//! used to split payment windows into segments.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Returns the age in completed years on `date`.
///
/// The age increments exactly on the birthday. A 29 February birthday is
/// reached on 1 March in non-leap years.
///
/// # Example
///
/// ```
/// use ij_engine::calculation::calculate_age;
/// use chrono::NaiveDate;
///
/// let birth = NaiveDate::from_ymd_opt(1989, 9, 26).unwrap();
/// assert_eq!(calculate_age(NaiveDate::from_ymd_opt(2024, 9, 25).unwrap(), birth), 34);
/// assert_eq!(calculate_age(NaiveDate::from_ymd_opt(2024, 9, 26).unwrap(), birth), 35);
/// ```
pub fn calculate_age(date: NaiveDate, birth: NaiveDate) -> u32 {
    let mut age = date.year() - birth.year();
    if (date.month(), date.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Returns the calendar quarter (1-4) of a date.
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Counts the affiliation trimesters completed before `reference`.
///
/// Every calendar quarter from the one containing the affiliation date up
/// to, but excluding, the quarter containing `reference` counts as one.
///
/// # Example
///
/// ```
/// use ij_engine::calculation::count_trimesters;
/// use chrono::NaiveDate;
///
/// let affiliation = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
/// let stop = NaiveDate::from_ymd_opt(2022, 1, 10).unwrap();
/// assert_eq!(count_trimesters(affiliation, stop), 8);
/// ```
pub fn count_trimesters(affiliation: NaiveDate, reference: NaiveDate) -> u32 {
    let index = |d: NaiveDate| d.year() * 4 + quarter_of(d) as i32;
    (index(reference) - index(affiliation)).max(0) as u32
}

/// Returns the first business day strictly after `date`.
pub fn next_weekday(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
        next += Duration::days(1);
    }
    next
}

/// Returns the last day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first - Duration::days(1))
        .unwrap_or(date)
}

/// Returns the birthday falling in `year`.
fn birthday_in_year(birth: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, birth.month(), birth.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(birth)
}

/// Returns the first birthday strictly after `date`.
pub fn next_birthday(date: NaiveDate, birth: NaiveDate) -> NaiveDate {
    let this_year = birthday_in_year(birth, date.year());
    if this_year > date {
        this_year
    } else {
        birthday_in_year(birth, date.year() + 1)
    }
}

/// Inclusive number of days between two dates.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}
