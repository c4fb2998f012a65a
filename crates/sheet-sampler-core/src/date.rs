//! Excel date serial conversion
//!
//! Excel stores dates as a day count since an epoch with the time of day as
//! the fractional part. The 1900 system counts 1900-02-29 as a real day (a
//! Lotus 1-2-3 compatibility quirk), so serials below 60 are one day off
//! compared to a proleptic calendar. The 1904 system starts 1462 days later.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Days between the 1900 and 1904 epochs
const EPOCH_1904_OFFSET_DAYS: i64 = 1462;

/// Largest serial Excel can represent (9999-12-31)
const MAX_SERIAL: f64 = 2_958_466.0;

/// Convert an Excel date serial into a calendar instant
///
/// Returns `None` for negative, non-finite or out-of-range serials. The time
/// of day is rounded to the nearest millisecond.
pub fn serial_to_datetime(serial: f64, date_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial >= MAX_SERIAL {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;

    let mut days = serial.trunc() as i64;
    if date_1904 {
        days += EPOCH_1904_OFFSET_DAYS;
    } else if days < 60 {
        days += 1;
    }

    let millis = (serial.fract() * MILLIS_PER_DAY).round() as i64;

    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Convert a calendar instant into an Excel date serial (1900 system)
///
/// Inverse of [`serial_to_datetime`] for instants on or after 1900-03-01.
pub fn datetime_to_serial(datetime: NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let elapsed = datetime.signed_duration_since(epoch);
    elapsed.num_milliseconds() as f64 / MILLIS_PER_DAY
}
