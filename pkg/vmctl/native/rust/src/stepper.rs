// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Splitting of a time interval into consecutive date ranges.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Granularity used to partition a time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Minute,
        Step::Hour,
        Step::Day,
        Step::Week,
        Step::Month,
        Step::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Minute => "minute",
            Step::Hour => "hour",
            Step::Day => "day",
            Step::Week => "week",
            Step::Month => "month",
            Step::Year => "year",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| SplitError::UnknownStep(s.to_string()))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SplitError {
    #[error("start time {start} should come before end time {end}")]
    StartAfterEnd { start: String, end: String },

    #[error(
        "failed to parse step value, valid values are: 'minute', 'hour', 'day', 'week', 'month', 'year'. provided: '{0}'"
    )]
    UnknownStep(String),

    #[error("date range step from {0} is out of the supported time range")]
    OutOfRange(String),
}

/// A `[start, end]` pair produced by [`split_date_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start_rfc3339(&self) -> String {
        rfc3339(self.start)
    }

    pub fn end_rfc3339(&self) -> String {
        rfc3339(self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start_rfc3339(), self.end_rfc3339())
    }
}

/// Formats `t` as RFC3339 with second precision and a `Z` suffix.
pub fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Splits `[start, end]` into consecutive ranges of `step` width.
///
/// Fixed-width steps (minute to week) advance by exactly that width. Month and
/// year steps end at the last nanosecond of the calendar period; a cursor that
/// sits exactly on such a boundary moves to the first instant of the next
/// period. The final range is clamped to `end`, and an empty interval yields
/// no ranges. With `reverse` the newest range comes first.
pub fn split_date_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Step,
    reverse: bool,
) -> Result<Vec<DateRange>, SplitError> {
    if start > end {
        return Err(SplitError::StartAfterEnd {
            start: rfc3339(start),
            end: rfc3339(end),
        });
    }

    let mut ranges = Vec::new();
    let mut cursor = start;
    while end > cursor {
        let (range_start, range_end) = next_step(cursor, step)?;
        let range_end = range_end.min(end);
        ranges.push(DateRange::new(range_start, range_end));
        cursor = range_end;
    }

    if reverse {
        ranges.reverse();
    }
    Ok(ranges)
}

fn next_step(
    t: DateTime<Utc>,
    step: Step,
) -> Result<(DateTime<Utc>, DateTime<Utc>), SplitError> {
    let out_of_range = || SplitError::OutOfRange(rfc3339(t));
    let fixed = |delta: TimeDelta| {
        t.checked_add_signed(delta)
            .map(|end| (t, end))
            .ok_or_else(out_of_range)
    };

    match step {
        Step::Minute => fixed(TimeDelta::minutes(1)),
        Step::Hour => fixed(TimeDelta::hours(1)),
        Step::Day => fixed(TimeDelta::days(1)),
        Step::Week => fixed(TimeDelta::days(7)),
        Step::Month => {
            let months = i64::from(t.year()) * 12 + i64::from(t.month0());
            let end_of_month = period_start(months + 1).map(last_instant_before);
            match end_of_month {
                Some(eom) if eom == t => {
                    let start = period_start(months + 1).ok_or_else(out_of_range)?;
                    let end = period_start(months + 2)
                        .map(last_instant_before)
                        .ok_or_else(out_of_range)?;
                    Ok((start, end))
                }
                Some(eom) => Ok((t, eom)),
                None => Err(out_of_range()),
            }
        }
        Step::Year => {
            let months = i64::from(t.year()) * 12;
            let end_of_year = period_start(months + 12).map(last_instant_before);
            match end_of_year {
                Some(eoy) if eoy == t => {
                    let start = period_start(months + 12).ok_or_else(out_of_range)?;
                    let end = period_start(months + 24)
                        .map(last_instant_before)
                        .ok_or_else(out_of_range)?;
                    Ok((start, end))
                }
                Some(eoy) => Ok((t, eoy)),
                None => Err(out_of_range()),
            }
        }
    }
}

/// First instant of the month identified by `months` since year 0.
fn period_start(months: i64) -> Option<DateTime<Utc>> {
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;
    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc())
}

fn last_instant_before(t: DateTime<Utc>) -> DateTime<Utc> {
    t - TimeDelta::nanoseconds(1)
}
