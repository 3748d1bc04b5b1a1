//! Resolves the configured canonical timezone and converts instants into local dates.

use time::{Date, OffsetDateTime};
use time_tz::{Offset, TimeZone, Tz};

use crate::Error;

/// Look up a canonical timezone name, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_timezone(canonical_timezone: &str) -> Option<&'static Tz> {
    time_tz::timezones::get_by_name(canonical_timezone)
}

/// Resolve the configured timezone for a request.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `canonical_timezone` is not a known timezone.
pub(crate) fn local_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    get_timezone(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })
}

/// The calendar date of `date_time` in `timezone`.
///
/// The offset in effect at `date_time` itself is used, so instants on either
/// side of a daylight saving change land on the right day. Returns `None` if
/// the local date cannot be represented.
pub(crate) fn local_date(date_time: OffsetDateTime, timezone: &Tz) -> Option<Date> {
    let offset = timezone.get_offset_utc(&date_time).to_utc();

    date_time
        .checked_to_offset(offset)
        .map(|local_date_time| local_date_time.date())
}

/// Today's date in `timezone` as of the instant `now`.
pub(crate) fn local_today(now: OffsetDateTime, timezone: &Tz) -> Date {
    local_date(now, timezone).unwrap_or_else(|| now.date())
}

/// The instant of local midnight at the start of `date` in `timezone`.
pub(crate) fn local_midnight(date: Date, timezone: &Tz) -> OffsetDateTime {
    let midnight = date.midnight();
    let offset = timezone.get_offset_utc(&midnight.assume_utc()).to_utc();

    midnight.assume_offset(offset)
}
