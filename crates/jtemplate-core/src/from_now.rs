/*
 * from_now.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Relative-date expressions for `$fromNow`.
//!
//! Grammar (case-sensitive, every component optional, fixed order):
//!
//! ```text
//! expr    := [days] ' '* [hours] ' '* [minutes]
//! days    := INTEGER ' '* 'd' | 'day' | 'days'
//! hours   := INTEGER ' '* 'h' | 'hour' | 'hours'
//! minutes := INTEGER ' '* 'm' | 'min' | 'minute' | 'minutes'
//! ```
//!
//! The pattern is searched, not anchored, and can match the empty string at
//! the very start of any input. So `""`, `"soon"` and `"in 2 days"` all
//! resolve to the current instant with no offset.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{RenderError, RenderResult};

static DATE_EXPR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:(?P<days>[0-9]+) *d(?:ays?)?)?",
        r" *(?:(?P<hours>[0-9]+) *h(?:ours?)?)?",
        r" *(?:(?P<minutes>[0-9]+) *m(?:in(?:utes?)?)?)?",
    ))
    .expect("relative date pattern is valid")
});

/// The components of a relative-date expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelativeOffset {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl RelativeOffset {
    /// Parse `expression`; absent components are zero.
    pub fn parse(expression: &str) -> RenderResult<Self> {
        let invalid = || RenderError::DateExpression {
            expression: expression.to_string(),
        };
        let captures = DATE_EXPR.captures(expression).ok_or_else(invalid)?;
        let component = |caps: &Captures, name: &str| -> RenderResult<i64> {
            caps.name(name)
                .map_or(Ok(0), |m| m.as_str().parse::<i64>().map_err(|_| invalid()))
        };

        Ok(Self {
            days: component(&captures, "days")?,
            hours: component(&captures, "hours")?,
            minutes: component(&captures, "minutes")?,
        })
    }

    /// Total offset, or `None` if it does not fit in a duration.
    pub fn duration(&self) -> Option<TimeDelta> {
        TimeDelta::try_days(self.days)?
            .checked_add(&TimeDelta::try_hours(self.hours)?)?
            .checked_add(&TimeDelta::try_minutes(self.minutes)?)
    }
}

/// Resolve `expression` against `now` into an ISO-8601 UTC timestamp with
/// millisecond precision (`2025-01-02T03:04:05.000Z`).
pub fn resolve(expression: &str, now: DateTime<Utc>) -> RenderResult<String> {
    let offset = RelativeOffset::parse(expression)?;
    let instant = offset
        .duration()
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| RenderError::DateExpression {
            expression: expression.to_string(),
        })?;
    Ok(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    fn offset(days: i64, hours: i64, minutes: i64) -> RelativeOffset {
        RelativeOffset {
            days,
            hours,
            minutes,
        }
    }

    #[test]
    fn test_full_forms() {
        assert_eq!(
            RelativeOffset::parse("2 days 3 hours 4 minutes").unwrap(),
            offset(2, 3, 4)
        );
        assert_eq!(
            RelativeOffset::parse("1 day 1 hour 1 minute").unwrap(),
            offset(1, 1, 1)
        );
    }

    #[test]
    fn test_short_forms() {
        assert_eq!(RelativeOffset::parse("1d 2h 3m").unwrap(), offset(1, 2, 3));
        assert_eq!(RelativeOffset::parse("1d2h3m").unwrap(), offset(1, 2, 3));
        assert_eq!(RelativeOffset::parse("90 min").unwrap(), offset(0, 0, 90));
        assert_eq!(RelativeOffset::parse("5h").unwrap(), offset(0, 5, 0));
    }

    #[test]
    fn test_unmatched_input_resolves_to_zero() {
        assert_eq!(RelativeOffset::parse("").unwrap(), offset(0, 0, 0));
        assert_eq!(RelativeOffset::parse("soon").unwrap(), offset(0, 0, 0));
        // The match is found at the start, before "2 days"
        assert_eq!(RelativeOffset::parse("in 2 days").unwrap(), offset(0, 0, 0));
    }

    #[test]
    fn test_order_is_fixed() {
        // Hours before days: the days component is never reached
        assert_eq!(RelativeOffset::parse("3 hours 2 days").unwrap(), offset(0, 3, 0));
    }

    #[test]
    fn test_units_are_case_sensitive() {
        assert_eq!(RelativeOffset::parse("2 Days").unwrap(), offset(0, 0, 0));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(
            resolve("2 days 3 hours", now()).unwrap(),
            "2025-03-16T12:26:53.000Z"
        );
        assert_eq!(resolve("", now()).unwrap(), "2025-03-14T09:26:53.000Z");
        assert_eq!(resolve("90 minutes", now()).unwrap(), "2025-03-14T10:56:53.000Z");
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(matches!(
            resolve("99999999999999999999 days", now()).unwrap_err(),
            RenderError::DateExpression { .. }
        ));
        assert!(matches!(
            resolve("999999999999 days", now()).unwrap_err(),
            RenderError::DateExpression { .. }
        ));
    }
}
