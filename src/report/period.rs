//! Calendar month boundaries in the configured local timezone.

use time::{Date, Month, OffsetDateTime, UtcOffset};
use time_tz::{Offset, PrimitiveDateTimeExt, TimeZone, Tz};

use crate::Error;

/// Look up a timezone by its canonical name, e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known timezone.
pub fn local_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    time_tz::timezones::get_by_name(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        Error::InvalidTimezone(canonical_timezone.to_owned())
    })
}

/// The current UTC offset of the timezone named `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known timezone.
pub fn local_offset(canonical_timezone: &str) -> Result<UtcOffset, Error> {
    local_timezone(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// A calendar month as the half-open range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPeriod {
    /// The month number, 1 to 12.
    pub month: u8,
    /// The calendar year.
    pub year: i32,
    /// Midnight at the start of the first day of the month.
    pub start: OffsetDateTime,
    /// Midnight at the start of the first day of the next month.
    pub end: OffsetDateTime,
}

impl MonthPeriod {
    /// The month `month` of `year`, with both bounds at local midnight in `timezone`.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `month` is not 1 to 12 or `year` is
    /// outside the supported calendar range.
    pub fn new(month: u8, year: i32, timezone: &Tz) -> Result<Self, Error> {
        let calendar_month = Month::try_from(month)
            .map_err(|_| Error::Validation("Month must be between 1 and 12.".to_owned()))?;
        let first_day = Date::from_calendar_date(year, calendar_month, 1)
            .map_err(|_| Error::Validation(format!("Year {year} is out of range.")))?;

        let (next_year, next_month) = match calendar_month {
            Month::December => (year + 1, Month::January),
            other => (year, other.next()),
        };
        let next_first_day = Date::from_calendar_date(next_year, next_month, 1)
            .map_err(|_| Error::Validation(format!("Year {year} is out of range.")))?;

        Ok(Self {
            month,
            year,
            start: local_midnight(first_day, timezone),
            end: local_midnight(next_first_day, timezone),
        })
    }
}

/// The instant of midnight at the start of `date` in `timezone`.
///
/// A midnight repeated by a DST change resolves to the earlier instant, and
/// one skipped by a DST change uses the offset in effect at midnight UTC.
fn local_midnight(date: Date, timezone: &Tz) -> OffsetDateTime {
    let midnight = date.midnight();

    midnight
        .assume_timezone(timezone)
        .take_first()
        .unwrap_or_else(|| midnight.assume_timezone_utc(timezone))
}

#[cfg(test)]
mod tests {
    use time::{UtcOffset, macros::datetime};

    use crate::Error;

    use super::{MonthPeriod, local_offset, local_timezone};

    #[test]
    fn utc_month_bounds() {
        let utc = local_timezone("Etc/UTC").unwrap();

        let got = MonthPeriod::new(3, 2022, utc).unwrap();

        assert_eq!(got.start, datetime!(2022-03-01 00:00 UTC));
        assert_eq!(got.end, datetime!(2022-04-01 00:00 UTC));
    }

    #[test]
    fn december_ends_in_next_year() {
        let utc = local_timezone("Etc/UTC").unwrap();

        let got = MonthPeriod::new(12, 2021, utc).unwrap();

        assert_eq!(got.end, datetime!(2022-01-01 00:00 UTC));
    }

    #[test]
    fn bounds_use_offset_at_local_midnight() {
        // Sydney moved to daylight time at 2am on Sunday 2023-10-01.
        let sydney = local_timezone("Australia/Sydney").unwrap();

        let september = MonthPeriod::new(9, 2023, sydney).unwrap();
        let october = MonthPeriod::new(10, 2023, sydney).unwrap();

        assert_eq!(september.end, datetime!(2023-10-01 00:00 +10:00));
        assert_eq!(october.start, datetime!(2023-09-30 14:00 UTC));
        assert_eq!(october.end, datetime!(2023-11-01 00:00 +11:00));
    }

    #[test]
    fn bounds_use_local_midnight() {
        let kolkata = local_timezone("Asia/Kolkata").unwrap();

        let got = MonthPeriod::new(1, 2022, kolkata).unwrap();

        assert_eq!(got.start, datetime!(2022-01-01 00:00 +05:30));
        assert_eq!(got.start.to_offset(UtcOffset::UTC), datetime!(2021-12-31 18:30 UTC));
    }

    #[test]
    fn rejects_invalid_month() {
        let utc = local_timezone("Etc/UTC").unwrap();

        assert!(matches!(
            MonthPeriod::new(13, 2022, utc),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            MonthPeriod::new(0, 2022, utc),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert!(matches!(
            local_offset("Not/A_Timezone"),
            Err(Error::InvalidTimezone(_))
        ));
    }
}
