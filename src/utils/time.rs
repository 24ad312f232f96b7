//! Timestamp formatting for the media engine's calling convention

use crate::domain::errors::DomainError;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Format milliseconds as `HH:MM:SS.mmm`
///
/// Hours keep counting past 24, the engine accepts any hour value.
pub fn to_timestamp(ms: i64) -> Result<String, DomainError> {
    if ms < 0 {
        return Err(DomainError::InvalidDuration(format!(
            "{} ms is negative",
            ms
        )));
    }

    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let millis = ms % MS_PER_SECOND;

    Ok(format!(
        "{:02}:{:02}:{:02}.{:03}",
        hours, minutes, seconds, millis
    ))
}

/// [`to_timestamp`] for unsigned millisecond values used throughout the planner
pub fn format_ms(ms: u64) -> Result<String, DomainError> {
    let ms = i64::try_from(ms)
        .map_err(|_| DomainError::InvalidDuration(format!("{} ms is out of range", ms)))?;
    to_timestamp(ms)
}

/// Convert fractional seconds (as printed by ffprobe) to whole milliseconds
pub fn millis_from_seconds(seconds: f64) -> Result<u64, DomainError> {
    if !seconds.is_finite() {
        return Err(DomainError::InvalidDuration(format!(
            "{} is not a finite number of seconds",
            seconds
        )));
    }
    if seconds < 0.0 {
        return Err(DomainError::InvalidDuration(format!(
            "{} seconds is negative",
            seconds
        )));
    }

    Ok((seconds * 1000.0).round() as u64)
}

/// Format milliseconds as seconds with millisecond precision, e.g. `1.250`
pub fn seconds_arg(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timestamp() {
        assert_eq!(to_timestamp(0).unwrap(), "00:00:00.000");
    }

    #[test]
    fn test_hour_minute_second_millis() {
        assert_eq!(to_timestamp(3_661_500).unwrap(), "01:01:01.500");
        assert_eq!(to_timestamp(9_000).unwrap(), "00:00:09.000");
        assert_eq!(to_timestamp(59_999).unwrap(), "00:00:59.999");
        assert_eq!(to_timestamp(7).unwrap(), "00:00:00.007");
    }

    #[test]
    fn test_hours_do_not_wrap() {
        assert_eq!(to_timestamp(25 * 3_600_000).unwrap(), "25:00:00.000");
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            to_timestamp(-1),
            Err(DomainError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_format_ms_out_of_range() {
        assert!(format_ms(u64::MAX).is_err());
        assert_eq!(format_ms(1_000).unwrap(), "00:00:01.000");
    }

    #[test]
    fn test_millis_from_seconds() {
        assert_eq!(millis_from_seconds(10.0).unwrap(), 10_000);
        assert_eq!(millis_from_seconds(12.3456).unwrap(), 12_346);
        assert!(millis_from_seconds(f64::NAN).is_err());
        assert!(millis_from_seconds(f64::INFINITY).is_err());
        assert!(millis_from_seconds(-0.5).is_err());
    }

    #[test]
    fn test_seconds_arg() {
        assert_eq!(seconds_arg(1_250), "1.250");
        assert_eq!(seconds_arg(40), "0.040");
    }
}
