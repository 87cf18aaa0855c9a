// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Parsing of the time strings accepted by `--start`/`--end` style flags.
//!
//! Supported forms:
//!
//! - `now`
//! - relative durations such as `1h`, `-2d` or `1h30m`; these always point
//!   into the past
//! - partial dates `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYY-MM-DDTHH`,
//!   `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS`, interpreted as UTC
//! - unix timestamps in (fractional) seconds, or milliseconds when the value
//!   does not fit in 32 bits
//! - RFC3339

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use thiserror::Error;

const MSECS_PER_SECOND: f64 = 1e3;
const MSECS_PER_MINUTE: f64 = 60.0 * MSECS_PER_SECOND;
const MSECS_PER_HOUR: f64 = 60.0 * MSECS_PER_MINUTE;
const MSECS_PER_DAY: f64 = 24.0 * MSECS_PER_HOUR;

/// Numeric timestamps at or above this value are treated as milliseconds.
const MSECS_THRESHOLD: f64 = 4_294_967_296.0;

#[derive(Error, Debug, PartialEq)]
pub enum TimeError {
    #[error("empty time string")]
    Empty,

    #[error("cannot parse {input:?}: {reason}")]
    Invalid { input: String, reason: String },

    #[error("cannot parse duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("{input:?} resolves to a time before the unix epoch")]
    BeforeEpoch { input: String },
}

/// Parses `s` relative to the current time.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, TimeError> {
    parse_time_at(s, Utc::now())
}

/// Parses `s`, resolving `now` and relative durations against `now`.
pub fn parse_time_at(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, TimeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TimeError::Empty);
    }

    let t = if s == "now" {
        now
    } else if is_relative(s) {
        let d = parse_duration(s)?;
        let d = if d > TimeDelta::zero() { -d } else { d };
        now.checked_add_signed(d).ok_or_else(|| invalid(s, "duration out of range"))?
    } else if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        parse_naive(s, &format!("{s}-01-01T00:00:00"))?
    } else if !s.contains('-') {
        parse_unix(s)?
    } else {
        match s.len() {
            7 => parse_naive(s, &format!("{s}-01T00:00:00"))?,
            10 => parse_naive(s, &format!("{s}T00:00:00"))?,
            13 => parse_naive(s, &format!("{s}:00:00"))?,
            16 => parse_naive(s, &format!("{s}:00"))?,
            19 => parse_naive(s, s)?,
            _ => DateTime::parse_from_rfc3339(s)
                .map_err(|e| invalid(s, &e.to_string()))?
                .with_timezone(&Utc),
        }
    };

    if t < DateTime::<Utc>::UNIX_EPOCH {
        return Err(TimeError::BeforeEpoch {
            input: s.to_string(),
        });
    }
    Ok(t)
}

/// Parses a Prometheus-style duration such as `1h30m`, `90s` or `-1.5d`.
pub fn parse_duration(s: &str) -> Result<TimeDelta, TimeError> {
    let duration_err = |reason: &str| TimeError::InvalidDuration {
        input: s.to_string(),
        reason: reason.to_string(),
    };

    let (negative, mut rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if rest.is_empty() {
        return Err(duration_err("missing value"));
    }

    let mut total_ms = 0.0;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(duration_err("expected a number"));
        }
        let (num, tail) = rest.split_at(num_len);
        let value: f64 = num.parse().map_err(|_| duration_err("invalid number"))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let unit_ms = match unit {
            "ms" => 1.0,
            "s" => MSECS_PER_SECOND,
            "m" => MSECS_PER_MINUTE,
            "h" => MSECS_PER_HOUR,
            "d" => MSECS_PER_DAY,
            "w" => 7.0 * MSECS_PER_DAY,
            "y" => 365.0 * MSECS_PER_DAY,
            "" => return Err(duration_err("missing unit")),
            other => return Err(duration_err(&format!("unknown unit {other:?}"))),
        };
        total_ms += value * unit_ms;
        rest = tail;
    }

    if !total_ms.is_finite() || total_ms.abs() > i64::MAX as f64 {
        return Err(duration_err("out of range"));
    }
    let total_ms = if negative { -total_ms } else { total_ms };
    TimeDelta::try_milliseconds(total_ms.round() as i64).ok_or_else(|| duration_err("out of range"))
}

fn is_relative(s: &str) -> bool {
    let last_is_unit = s
        .chars()
        .last()
        .is_some_and(|c| c != 'Z' && c.is_ascii_alphabetic());
    last_is_unit || s.starts_with('-')
}

fn parse_naive(input: &str, normalized: &str) -> Result<DateTime<Utc>, TimeError> {
    NaiveDateTime::parse_from_str(normalized, "%Y-%m-%dT%H:%M:%S")
        .map(|t| t.and_utc())
        .map_err(|e| invalid(input, &e.to_string()))
}

fn parse_unix(s: &str) -> Result<DateTime<Utc>, TimeError> {
    let n: f64 = s.parse().map_err(|_| invalid(s, "not a unix timestamp"))?;
    if !n.is_finite() {
        return Err(invalid(s, "not a unix timestamp"));
    }
    let msecs = if n >= MSECS_THRESHOLD {
        n
    } else {
        n * MSECS_PER_SECOND
    };
    DateTime::from_timestamp_millis(msecs.round() as i64)
        .ok_or_else(|| invalid(s, "timestamp out of range"))
}

fn invalid(input: &str, reason: &str) -> TimeError {
    TimeError::Invalid {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
