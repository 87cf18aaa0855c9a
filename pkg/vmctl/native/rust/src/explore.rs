// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Metric name discovery over a partitioned time interval.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::errors::Error;
use crate::executor::{Executor, decode_json};
use crate::filter::Filter;
use crate::stepper::{DateRange, Step, split_date_range};

#[derive(Deserialize)]
struct MetricNamesResponse {
    #[serde(default)]
    status: String,
    #[serde(default, rename = "data")]
    metric_names: Vec<String>,
}

/// Result of [`Client::explore_with_report`].
#[derive(Debug, Default)]
pub struct ExploreReport {
    /// Names from every range that succeeded, in completion order, not deduplicated.
    pub metric_names: Vec<String>,
    pub failures: Vec<RangeFailure>,
    /// Number of ranges the interval was split into.
    pub ranges: usize,
}

impl ExploreReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct RangeFailure {
    pub range: DateRange,
    pub error: Error,
}

impl Client {
    /// Finds metric names matching `filter` via the label-values API.
    ///
    /// The interval is split into ranges of at least a week and every range is
    /// queried concurrently. A range that fails is logged and skipped: the call
    /// returns whatever the other ranges produced, an empty list if all of them
    /// failed. Only an unparsable time bound or an inverted interval is an
    /// error. Use [`Client::explore_with_report`] to see the skipped ranges.
    pub async fn explore(
        &self,
        filter: &Filter,
        tenant_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, Error> {
        let report = self.explore_with_report(filter, tenant_id, cancel).await?;
        Ok(report.metric_names)
    }

    /// Same as [`Client::explore`], also returning the ranges that failed.
    pub async fn explore_with_report(
        &self,
        filter: &Filter,
        tenant_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ExploreReport, Error> {
        let ranges = explore_ranges(filter, explore_step(filter.chunk))?;
        let url = self.metric_names_url(tenant_id);
        let limiter = self
            .explore_concurrency()
            .map(|limit| Arc::new(Semaphore::new(limit.get())));
        let group = cancel.child_token();

        let mut tasks = JoinSet::new();
        for &range in &ranges {
            let mut params = vec![("match[]", filter.selector.clone())];
            if filter.start().is_some() {
                params.push(("start", range.start_rfc3339()));
            }
            if filter.end().is_some() {
                params.push(("end", range.end_rfc3339()));
            }

            let executor = self.executor.clone();
            let url = url.clone();
            let limiter = limiter.clone();
            let group = group.clone();
            tasks.spawn(async move {
                let outcome = tokio::select! {
                    _ = group.cancelled() => Err(Error::Cancelled),
                    result = fetch_metric_names(&executor, &url, &params, limiter) => result,
                };
                (range, outcome)
            });
        }

        let mut report = ExploreReport {
            ranges: ranges.len(),
            ..Default::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(names))) => report.metric_names.extend(names),
                Ok((range, Err(error))) => {
                    warn!("error explore metrics for range {range}: {error}");
                    report.failures.push(RangeFailure { range, error });
                }
                Err(e) => warn!("explore task did not complete: {e}"),
            }
        }

        debug!(
            "explored {} range(s) at {} step: {} metric name(s), {} failure(s)",
            report.ranges,
            explore_step(filter.chunk),
            report.metric_names.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

async fn fetch_metric_names(
    executor: &Executor,
    url: &str,
    params: &[(&str, String)],
    limiter: Option<Arc<Semaphore>>,
) -> Result<Vec<String>, Error> {
    let _permit = match limiter {
        Some(limiter) => Some(
            limiter
                .acquire_owned()
                .await
                .map_err(|_| Error::Cancelled)?,
        ),
        None => None,
    };

    let builder = executor.http().get(url).query(params);
    let response = executor.execute(builder, StatusCode::OK).await?;
    let response: MetricNamesResponse = decode_json(response, "series").await?;
    debug!(
        "{url}: status {:?}, {} metric name(s)",
        response.status,
        response.metric_names.len()
    );
    Ok(response.metric_names)
}

/// Chunks finer than a week are not worth a request each when listing names.
fn explore_step(chunk: Option<Step>) -> Step {
    match chunk {
        None | Some(Step::Minute | Step::Hour | Step::Day) => Step::Week,
        Some(step) => step,
    }
}

/// Ranges to query for `filter`. Without a start bound the whole interval up
/// to `end` (or now) is a single range.
fn explore_ranges(filter: &Filter, step: Step) -> Result<Vec<DateRange>, Error> {
    match filter.resolve_bounds(Utc::now())? {
        (Some(start), end) => Ok(split_date_range(start, end, step, false)?),
        (None, end) => Ok(vec![DateRange::new(DateTime::<Utc>::UNIX_EPOCH, end)]),
    }
}
