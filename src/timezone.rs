//! Resolves the server's configured timezone for displaying statement dates.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, timezones};

use crate::Error;

/// Get the current UTC offset of `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// # Errors
///
/// Returns [Error::InvalidTimezoneError] if the name is not a known canonical timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Result<UtcOffset, Error> {
    timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
}
