// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Client for the VictoriaMetrics native export/import protocol.
//!
//! The [`Client`] discovers metric names ([`Client::explore`]) and tenants
//! ([`Client::get_source_tenants`]) on a source, and streams series between a
//! source and a destination ([`Client::export_pipe`], [`Client::import_pipe`]).
//! [`migrate`] wires those operations into a full migration.

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

pub mod auth;
pub mod cli;
mod client;
pub mod config;
mod errors;
mod executor;
mod explore;
mod filter;
pub mod migrate;
pub mod stepper;
pub mod timeutil;

// Re-export the public API
pub use auth::{AuthConfig, HeaderInjector};
pub use client::{ByteStream, Client, ClientBuilder};
pub use errors::Error;
pub use explore::{ExploreReport, RangeFailure};
pub use filter::Filter;
pub use stepper::{DateRange, Step};
