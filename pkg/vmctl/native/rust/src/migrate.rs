// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Source to destination migration built on export and import pipes.
//!
//! Work is split into jobs, one per tenant, selector and time range. Each job
//! streams an export response straight into an import request through an
//! in-memory pipe, so no job holds more than [`PIPE_BUFFER_SIZE`] bytes.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::errors::Error;
use crate::filter::Filter;
use crate::stepper::{DateRange, split_date_range};

pub const PIPE_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub filter: Filter,
    /// Jobs in flight at once; 0 is treated as 1.
    pub concurrency: usize,
    /// Explore metric names first and migrate each name as its own job.
    pub per_metric: bool,
    /// Discover tenants on the source and migrate each one separately.
    pub multitenant: bool,
}

impl MigrationPlan {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            concurrency: 1,
            per_metric: false,
            multitenant: false,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationStats {
    pub tenants: usize,
    pub metrics: usize,
    pub jobs: usize,
    /// Bytes read from export responses.
    pub bytes: u64,
}

#[derive(Debug)]
struct Job {
    tenant: String,
    filter: Filter,
}

/// Streams one export response from `src` into one import request on `dst`.
///
/// Returns the number of bytes piped. When both sides fail the import error
/// is reported.
pub async fn transfer(
    src: &Client,
    export_url: &str,
    filter: &Filter,
    dst: &Client,
    import_url: &str,
) -> Result<u64, Error> {
    let stream = src.export_pipe(export_url, filter).await?;
    let (mut writer, reader) = tokio::io::duplex(PIPE_BUFFER_SIZE);

    let producer = async move {
        let mut source = StreamReader::new(stream);
        let copied = tokio::io::copy(&mut source, &mut writer).await?;
        writer.shutdown().await?;
        Ok::<_, std::io::Error>(copied)
    };

    let (copied, imported) = tokio::join!(producer, dst.import_pipe(import_url, reader));
    imported?;
    copied.map_err(Error::Pipe)
}

/// Copies everything `plan` selects from `src` to `dst`.
///
/// Unlike explore, migration is not best effort: the first failed job
/// aborts the others and is returned.
pub async fn migrate(
    src: &Client,
    dst: &Client,
    plan: &MigrationPlan,
    cancel: &CancellationToken,
) -> Result<MigrationStats, Error> {
    let tenants = if plan.multitenant {
        let tenants = src.get_source_tenants(&plan.filter).await?;
        info!("discovered {} tenant(s): {tenants:?}", tenants.len());
        tenants
    } else {
        vec![String::new()]
    };

    let mut stats = MigrationStats {
        tenants: tenants.len(),
        ..Default::default()
    };
    let ranges = job_ranges(&plan.filter)?;

    let mut jobs = Vec::new();
    for tenant in tenants {
        let selectors = if plan.per_metric {
            let names: BTreeSet<String> = src
                .explore(&plan.filter, &tenant, cancel)
                .await?
                .into_iter()
                .collect();
            info!("found {} metric(s) for tenant {tenant:?}", names.len());
            stats.metrics += names.len();
            names
                .iter()
                .map(|name| metric_selector(&plan.filter.selector, name))
                .collect()
        } else {
            vec![plan.filter.selector.clone()]
        };

        for selector in selectors {
            let base = Filter {
                selector,
                ..plan.filter.clone()
            };
            match &ranges {
                Some(ranges) => jobs.extend(ranges.iter().map(|range| Job {
                    tenant: tenant.clone(),
                    filter: Filter {
                        time_start: Some(range.start_rfc3339()),
                        time_end: Some(range.end_rfc3339()),
                        ..base.clone()
                    },
                })),
                None => jobs.push(Job {
                    tenant: tenant.clone(),
                    filter: base,
                }),
            }
        }
    }

    stats.jobs = jobs.len();
    info!("starting {} migration job(s)", stats.jobs);
    stats.bytes = run_jobs(src, dst, jobs, plan.concurrency, cancel).await?;
    Ok(stats)
}

async fn run_jobs(
    src: &Client,
    dst: &Client,
    jobs: Vec<Job>,
    concurrency: usize,
    cancel: &CancellationToken,
) -> Result<u64, Error> {
    let limiter = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for job in jobs {
        let src = src.clone();
        let dst = dst.clone();
        let limiter = limiter.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => Err(Error::Cancelled),
                result = run_job(&src, &dst, &job, limiter) => result,
            }
        });
    }

    let mut total = 0;
    while let Some(joined) = tasks.join_next().await {
        // Returning drops the set, which aborts the remaining jobs.
        total += joined??;
    }
    Ok(total)
}

async fn run_job(
    src: &Client,
    dst: &Client,
    job: &Job,
    limiter: Arc<Semaphore>,
) -> Result<u64, Error> {
    let _permit = limiter.acquire_owned().await.map_err(|_| Error::Cancelled)?;

    let export_url = src.export_url(&job.tenant);
    let import_url = dst.import_url(&job.tenant)?;
    info!("migrating tenant {:?}{}", job.tenant, job.filter);

    let bytes = transfer(src, &export_url, &job.filter, dst, &import_url).await?;
    debug!("{export_url} -> {import_url}: {bytes} byte(s)");
    Ok(bytes)
}

/// Time ranges to migrate separately, or `None` when the filter is not
/// chunked and goes out as a single job.
fn job_ranges(filter: &Filter) -> Result<Option<Vec<DateRange>>, Error> {
    let Some(step) = filter.chunk else {
        return Ok(None);
    };
    match filter.resolve_bounds(Utc::now())? {
        (Some(start), end) => Ok(Some(split_date_range(
            start,
            end,
            step,
            filter.time_reverse,
        )?)),
        (None, _) => Ok(None),
    }
}

/// Narrows `base` to the single metric `name`.
///
/// Any name matcher or bare metric name in `base` is replaced. Label values
/// containing commas are not supported.
fn metric_selector(base: &str, name: &str) -> String {
    let base = base.trim();
    let matchers = match base.find('{') {
        Some(open) if base.ends_with('}') => {
            base.get(open + 1..base.len() - 1).unwrap_or_default()
        }
        _ => "",
    };

    let mut terms = vec![format!("__name__=\"{}\"", quote_label_value(name))];
    terms.extend(
        matchers
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty() && !term.starts_with("__name__"))
            .map(str::to_string),
    );
    format!("{{{}}}", terms.join(","))
}

/// Escapes `\` and `"` for use inside a double-quoted label value.
fn quote_label_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted
}
