// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::sync::Arc;

use log::debug;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::auth::HeaderInjector;
use crate::errors::Error;

/// Single-attempt request execution shared by every client operation.
#[derive(Clone)]
pub(crate) struct Executor {
    http: reqwest::Client,
    auth: Option<Arc<dyn HeaderInjector>>,
}

impl Executor {
    pub(crate) fn new(http: reqwest::Client, auth: Option<Arc<dyn HeaderInjector>>) -> Self {
        Self { http, auth }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Sends the request and returns the response when its status is `expected`.
    ///
    /// Any other status drains the body into [`Error::UnexpectedStatus`].
    pub(crate) async fn execute(
        &self,
        builder: RequestBuilder,
        expected: StatusCode,
    ) -> Result<Response, Error> {
        let mut request = builder.build().map_err(|source| Error::InvalidRequest {
            url: source.url().map(|u| u.to_string()).unwrap_or_default(),
            source,
        })?;

        if let Some(auth) = &self.auth {
            auth.set_headers(request.headers_mut(), true);
        }

        debug!("{} {}", request.method(), request.url());
        let response = self.http.execute(request).await.map_err(Error::Transport)?;

        let status = response.status();
        if status != expected {
            let body = response
                .text()
                .await
                .map_err(|source| Error::ReadBody { status, source })?;
            return Err(Error::UnexpectedStatus { status, body });
        }
        Ok(response)
    }
}

/// Reads the whole body and decodes it as JSON.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: Response,
    what: &'static str,
) -> Result<T, Error> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|source| Error::ReadBody { status, source })?;
    serde_json::from_slice(&body).map_err(|source| Error::Decode { what, source })
}
