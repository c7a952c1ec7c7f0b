//! Conversions between `Duration` and the UPnP time strings used by
//! AVTransport (`RelTime`, `TrackDuration`, the `REL_TIME` seek target).

use crate::errors::ControlPointError;
use std::time::Duration;

/// Formats a duration as `H:MM:SS`, dropping sub-second precision.
///
/// # Examples
/// ```
/// # use avccontrol::time_utils::format_hhmmss;
/// # use std::time::Duration;
/// assert_eq!(format_hhmmss(Duration::from_secs(65)), "0:01:05");
/// assert_eq!(format_hhmmss(Duration::from_secs(3723)), "1:02:03");
/// ```
pub fn format_hhmmss(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{}:{:02}:{:02}", hours, minutes, secs)
}

/// Parses a UPnP duration.
///
/// Accepts `H:MM:SS`, `HH:MM:SS` and `MM:SS`, each with an optional
/// fractional part that is dropped. `NOT_IMPLEMENTED` and the empty string
/// are what renderers send when they do not know, both map to zero.
///
/// # Examples
/// ```
/// # use avccontrol::time_utils::parse_upnp_duration;
/// # use std::time::Duration;
/// assert_eq!(parse_upnp_duration("0:03:25.500").unwrap(), Duration::from_secs(205));
/// assert_eq!(parse_upnp_duration("NOT_IMPLEMENTED").unwrap(), Duration::ZERO);
/// ```
pub fn parse_upnp_duration(input: &str) -> Result<Duration, ControlPointError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("NOT_IMPLEMENTED") {
        return Ok(Duration::ZERO);
    }

    let whole = trimmed.split('.').next().unwrap_or_default();
    let parts: Vec<&str> = whole.split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (if h.is_empty() { "0" } else { *h }, *m, *s),
        _ => {
            return Err(ControlPointError::InvalidTimeFormat(format!(
                "Invalid time format '{}': expected H:MM:SS or MM:SS",
                input
            )));
        }
    };

    let parse = |part: &str, what: &str| {
        part.parse::<u64>().map_err(|_| {
            ControlPointError::InvalidTimeFormat(format!(
                "Invalid {} component in '{}'",
                what, input
            ))
        })
    };

    let hours = parse(hours, "hour")?;
    let minutes = parse(minutes, "minute")?;
    let seconds = parse(seconds, "second")?;
    let total = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(|| {
            ControlPointError::InvalidTimeFormat(format!("Time '{}' is out of range", input))
        })?;
    Ok(Duration::from_secs(total))
}
