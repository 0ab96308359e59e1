//! Display-zone formatting for stored UTC timestamps.
//!
//! Timestamps are persisted in UTC and converted only at the edge, using a
//! fixed offset from config (defaults to IST, +05:30).

use time::{format_description::FormatItem, macros::format_description, OffsetDateTime, UtcOffset};

use crate::error::AppError;

const DISPLAY_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Parse a "+HH:MM" / "-HH:MM" offset string.
pub fn parse_offset(s: &str) -> Result<UtcOffset, AppError> {
    let err = || AppError::Validation(format!("invalid display offset: {s}"));
    let (sign, rest) = if let Some(rest) = s.strip_prefix('+') {
        (1i8, rest)
    } else if let Some(rest) = s.strip_prefix('-') {
        (-1i8, rest)
    } else {
        return Err(err());
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(err)?;
    let hours: i8 = hours.parse().map_err(|_| err())?;
    let minutes: i8 = minutes.parse().map_err(|_| err())?;
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).map_err(|_| err())
}

/// Shift a stored UTC timestamp into the display zone.
pub fn in_display_zone(ts: OffsetDateTime, offset: UtcOffset) -> OffsetDateTime {
    ts.to_offset(offset)
}

/// Human-readable local timestamp, e.g. "2026-08-06 14:30:00".
pub fn format_local(ts: OffsetDateTime, offset: UtcOffset) -> String {
    in_display_zone(ts, offset)
        .format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_ist_offset() {
        let offset = parse_offset("+05:30").expect("valid offset");
        assert_eq!(offset.whole_minutes(), 330);
    }

    #[test]
    fn parses_negative_offset() {
        let offset = parse_offset("-03:00").expect("valid offset");
        assert_eq!(offset.whole_hours(), -3);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_offset("05:30").is_err());
        assert!(parse_offset("+0530").is_err());
        assert!(parse_offset("").is_err());
    }

    #[test]
    fn shifts_utc_into_ist() {
        let offset = parse_offset("+05:30").unwrap();
        let utc = datetime!(2026-01-15 12:00:00 UTC);
        assert_eq!(format_local(utc, offset), "2026-01-15 17:30:00");
    }

    #[test]
    fn midnight_rolls_over_the_date() {
        let offset = parse_offset("+05:30").unwrap();
        let utc = datetime!(2026-01-15 20:00:00 UTC);
        assert_eq!(format_local(utc, offset), "2026-01-16 01:30:00");
    }
}
