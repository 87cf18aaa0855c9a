// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::Error;
use crate::stepper::Step;
use crate::timeutil::parse_time_at;

/// Series selection for explore and export requests.
///
/// `time_start` and `time_end` are kept as the caller wrote them; explore
/// parses them, while export and tenant discovery forward them verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Filter {
    #[serde(rename = "match")]
    pub selector: String,
    #[serde(default)]
    pub time_start: Option<String>,
    #[serde(default)]
    pub time_end: Option<String>,
    #[serde(default)]
    pub chunk: Option<Step>,
    #[serde(default)]
    pub time_reverse: bool,
}

impl Filter {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Default::default()
        }
    }

    pub fn with_time_start(mut self, start: impl Into<String>) -> Self {
        self.time_start = non_empty(start.into());
        self
    }

    pub fn with_time_end(mut self, end: impl Into<String>) -> Self {
        self.time_end = non_empty(end.into());
        self
    }

    pub fn with_chunk(mut self, chunk: Option<Step>) -> Self {
        self.chunk = chunk;
        self
    }

    pub fn with_time_reverse(mut self, reverse: bool) -> Self {
        self.time_reverse = reverse;
        self
    }

    /// Start bound as written; an empty string counts as unset.
    pub fn start(&self) -> Option<&str> {
        self.time_start.as_deref().filter(|s| !s.is_empty())
    }

    /// End bound as written; an empty string counts as unset.
    pub fn end(&self) -> Option<&str> {
        self.time_end.as_deref().filter(|s| !s.is_empty())
    }

    /// Parses the time bounds; a missing end resolves to `now`.
    pub(crate) fn resolve_bounds(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Option<DateTime<Utc>>, DateTime<Utc>), Error> {
        let parse = |bound: &'static str, value: Option<&str>| {
            value
                .map(|s| parse_time_at(s, now).map_err(|source| Error::TimeParse { bound, source }))
                .transpose()
        };

        let start = parse("start", self.start())?;
        let end = parse("end", self.end())?.unwrap_or(now);
        Ok((start, end))
    }

    /// `match[]`, `start` and `end` query parameters, time bounds verbatim.
    pub(crate) fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("match[]", self.selector.clone())];
        params.extend(self.time_params());
        params
    }

    /// `start` and `end` query parameters, only for the bounds that are set.
    pub(crate) fn time_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(start) = self.start() {
            params.push(("start", start.to_string()));
        }
        if let Some(end) = self.end() {
            params.push(("end", end.to_string()));
        }
        params
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n\tfilter: match[]={}", self.selector)?;
        if let Some(start) = self.start() {
            write!(f, "\n\tstart: {start}")?;
        }
        if let Some(end) = self.end() {
            write!(f, "\n\tend: {end}")?;
        }
        Ok(())
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
