// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

use vmctl_native::Client;
use vmctl_native::cli::{Args, Command};
use vmctl_native::config::{Config, config_path, load_config};
use vmctl_native::migrate::migrate;

/// Cancels `cancel` on the first SIGINT or SIGTERM.
fn cancel_on_signal(cancel: CancellationToken) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, cancelling"),
            _ = sigint.recv() => info!("Received SIGINT, cancelling"),
        }
        cancel.cancel();
    });
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn run(config: &Config, command: Command, cancel: &CancellationToken) -> Result<()> {
    let src = config
        .source
        .build_client()
        .context("Failed to configure source")?;

    match command {
        Command::Explore {
            filter,
            tenant,
            report,
        } => {
            let filter = filter.into_filter();
            let explored = src.explore_with_report(&filter, &tenant, cancel).await?;
            let names: BTreeSet<_> = explored.metric_names.iter().collect();
            for name in names {
                println!("{name}");
            }
            if report {
                for failure in &explored.failures {
                    println!("# failed range {}: {}", failure.range, failure.error);
                }
                println!(
                    "# {}/{} range(s) explored",
                    explored.ranges.saturating_sub(explored.failures.len()),
                    explored.ranges
                );
            }
        }
        Command::Tenants { filter } => {
            for tenant in src.get_source_tenants(&filter.into_filter()).await? {
                println!("{tenant}");
            }
        }
        command @ Command::Migrate { .. } => {
            let dst = destination(config)?;
            let Some(plan) = command.migration_plan() else {
                return Ok(());
            };
            info!("Migrating from {} to {}{}", src.addr(), dst.addr(), plan.filter);
            let stats = migrate(&src, &dst, &plan, cancel).await?;
            println!(
                "migrated {} byte(s) in {} job(s) across {} tenant(s)",
                stats.bytes, stats.jobs, stats.tenants
            );
        }
    }
    Ok(())
}

fn destination(config: &Config) -> Result<Client> {
    config
        .destination
        .as_ref()
        .context("migrate requires a destination in the configuration file")?
        .build_client()
        .context("Failed to configure destination")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let path = config_path(args.config);
    let mut config = load_config(&path)?;
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    let log_level = config.log_level();
    simple_logger::SimpleLogger::new()
        .with_level(log_level)
        .init()?;
    if let Some(unknown) = config.unknown_log_level() {
        warn!("Unknown log level {unknown:?}, using info");
    }
    info!("Log level set to: {:?}", log_level);
    info!("Loaded configuration from {}", path.display());

    let cancel = CancellationToken::new();
    cancel_on_signal(cancel.clone())?;

    let result = run(&config, args.command, &cancel).await;
    if cancel.is_cancelled() {
        warn!("Interrupted, output may be incomplete");
    }
    result
}
