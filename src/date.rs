//! APOD date parsing and validation.
//!
//! The archive starts on 1995-06-16 and ends today; anything outside that
//! range is rejected before the cache is touched.

use chrono::{Local, NaiveDate};

/// Date format accepted on the command line and by the API.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The first APOD ever published.
pub const FIRST_APOD_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1995, 6, 16) {
    Some(date) => date,
    None => panic!("first APOD date is valid"),
};

/// Errors for rejected date arguments.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Not a `YYYY-MM-DD` calendar date.
    #[error("'{0}' is not a date in YYYY-MM-DD format")]
    Unparsable(String),

    /// A valid date outside the APOD archive.
    #[error("{date} is outside the APOD archive ({first} to {last})")]
    OutOfRange {
        /// The rejected date
        date: NaiveDate,
        /// First archive date
        first: NaiveDate,
        /// Last archive date (today)
        last: NaiveDate,
    },
}

/// Today's date in local time.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse and validate an APOD date against the archive range ending `today`.
///
/// # Example
///
/// ```
/// use apod_desktop::date::parse_apod_date;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// assert!(parse_apod_date("2022-12-25", today).is_ok());
/// assert!(parse_apod_date("1995-06-15", today).is_err());
/// assert!(parse_apod_date("25/12/2022", today).is_err());
/// ```
///
/// # Errors
///
/// Returns [`DateError::Unparsable`] or [`DateError::OutOfRange`].
pub fn parse_apod_date(input: &str, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let trimmed = input.trim();
    let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| DateError::Unparsable(trimmed.to_string()))?;
    validate_apod_date(date, today)
}

/// Check that `date` lies within the APOD archive.
///
/// # Errors
///
/// Returns [`DateError::OutOfRange`] for dates before the first APOD or
/// after `today`.
pub fn validate_apod_date(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, DateError> {
    if date < FIRST_APOD_DATE || date > today {
        return Err(DateError::OutOfRange {
            date,
            first: FIRST_APOD_DATE,
            last: today,
        });
    }
    Ok(date)
}
