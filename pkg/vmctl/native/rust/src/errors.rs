// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use reqwest::StatusCode;
use thiserror::Error;

use crate::stepper::SplitError;
use crate::timeutil::TimeError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot create request to {url:?}: {source}")]
    InvalidRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unexpected error when performing request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected response code {}: {body}", status.as_u16())]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("failed to read response body for status code {}: {source}", status.as_u16())]
    ReadBody {
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot decode {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse time {bound} for explore metrics: {source}")]
    TimeParse {
        bound: &'static str,
        #[source]
        source: TimeError,
    },

    #[error("failed to create date ranges for explore metrics: {0}")]
    RangeSplit(#[from] SplitError),

    #[error("cannot close {what} response body: {source}")]
    Close {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("cannot pipe exported data into import request: {0}")]
    Pipe(#[source] std::io::Error),

    #[error("migration task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Status code observed on the response, if the request got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::UnexpectedStatus { status, .. } | Error::ReadBody { status, .. } => Some(*status),
            _ => None,
        }
    }
}
