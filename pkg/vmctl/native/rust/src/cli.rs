// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CONFIG_PATH_ENV;
use crate::filter::Filter;
use crate::migrate::MigrationPlan;
use crate::stepper::Step;

const MATCH_ALL: &str = r#"{__name__!=""}"#;

#[derive(Parser, Debug)]
#[command(name = "vmctl-native")]
#[command(about = "Explore, list tenants and migrate series between VictoriaMetrics instances", long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,

    /// Overrides `log_level` from the configuration file
    #[arg(long, value_parser = ["off", "error", "warn", "info", "debug", "trace"])]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print metric names matching the filter on the source
    Explore {
        #[command(flatten)]
        filter: FilterArgs,

        /// Tenant to explore, e.g. `1:0`; empty for single-node instances
        #[arg(long, default_value = "")]
        tenant: String,

        /// Also print the time ranges that could not be explored
        #[arg(long)]
        report: bool,
    },

    /// Print tenants present on the source
    Tenants {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Copy series matching the filter from source to destination
    Migrate {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of export/import pipes running at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        /// Migrate each metric name separately
        #[arg(long)]
        per_metric: bool,

        /// Discover tenants on the source and migrate each of them
        #[arg(long)]
        multitenant: bool,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct FilterArgs {
    /// Series selector
    #[arg(long = "match", default_value = MATCH_ALL)]
    pub selector: String,

    /// Start of the time range: RFC3339, partial date, unix timestamp or a duration ago
    #[arg(long)]
    pub start: Option<String>,

    /// End of the time range, same formats as --start; defaults to now
    #[arg(long)]
    pub end: Option<String>,

    /// Split the time range into chunks of this size (minute, hour, day, week, month, year)
    #[arg(long)]
    pub chunk: Option<Step>,

    /// Process chunks from newest to oldest
    #[arg(long)]
    pub time_reverse: bool,
}

impl FilterArgs {
    pub fn into_filter(self) -> Filter {
        Filter::new(self.selector)
            .with_time_start(self.start.unwrap_or_default())
            .with_time_end(self.end.unwrap_or_default())
            .with_chunk(self.chunk)
            .with_time_reverse(self.time_reverse)
    }
}

impl Command {
    /// Migration plan for the `migrate` subcommand.
    pub fn migration_plan(&self) -> Option<MigrationPlan> {
        match self {
            Command::Migrate {
                filter,
                concurrency,
                per_metric,
                multitenant,
            } => Some(MigrationPlan {
                filter: filter.clone().into_filter(),
                concurrency: *concurrency,
                per_metric: *per_metric,
                multitenant: *multitenant,
            }),
            _ => None,
        }
    }
}
