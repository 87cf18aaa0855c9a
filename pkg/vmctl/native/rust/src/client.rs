// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::io;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::header::ACCEPT_ENCODING;
use reqwest::{Body, StatusCode, Url};
use serde::Deserialize;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::auth::HeaderInjector;
use crate::errors::Error;
use crate::executor::{Executor, decode_json};
use crate::filter::Filter;

const TENANTS_PATH: &str = "admin/tenants";
pub(crate) const METRIC_NAMES_PATH: &str = "api/v1/label/__name__/values";
const EXPORT_PATH: &str = "api/v1/export/native";
const IMPORT_PATH: &str = "api/v1/import/native";

/// Live body of an export response.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// HTTP client for exporting and importing time series via the native protocol.
///
/// Cloning is cheap; clones share the underlying connection pool and
/// authentication configuration.
#[derive(Clone)]
pub struct Client {
    addr: String,
    extra_labels: Vec<String>,
    explore_concurrency: Option<NonZeroUsize>,
    pub(crate) executor: Executor,
}

#[derive(Deserialize)]
struct TenantsResponse {
    #[serde(default)]
    data: Vec<String>,
}

impl Client {
    pub fn builder(addr: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(addr)
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn extra_labels(&self) -> &[String] {
        &self.extra_labels
    }

    pub(crate) fn explore_concurrency(&self) -> Option<NonZeroUsize> {
        self.explore_concurrency
    }

    /// Label-values endpoint listing metric names, scoped to `tenant_id` when set.
    pub(crate) fn metric_names_url(&self, tenant_id: &str) -> String {
        if tenant_id.is_empty() {
            format!("{}/{}", self.addr, METRIC_NAMES_PATH)
        } else {
            format!(
                "{}/select/{}/prometheus/{}",
                self.addr, tenant_id, METRIC_NAMES_PATH
            )
        }
    }

    /// Native export endpoint of this client's address.
    pub fn export_url(&self, tenant_id: &str) -> String {
        if tenant_id.is_empty() {
            format!("{}/{}", self.addr, EXPORT_PATH)
        } else {
            format!("{}/select/{}/prometheus/{}", self.addr, tenant_id, EXPORT_PATH)
        }
    }

    /// Native import endpoint of this client's address, carrying one
    /// `extra_label` parameter per configured extra label.
    pub fn import_url(&self, tenant_id: &str) -> Result<String, Error> {
        let raw = if tenant_id.is_empty() {
            format!("{}/{}", self.addr, IMPORT_PATH)
        } else {
            format!("{}/insert/{}/prometheus/{}", self.addr, tenant_id, IMPORT_PATH)
        };
        let mut url = Url::parse(&raw).map_err(|e| Error::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !self.extra_labels.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for label in &self.extra_labels {
                pairs.append_pair("extra_label", label);
            }
        }
        Ok(url.into())
    }

    /// Discovers tenants on the source, optionally limited to the filter's time window.
    pub async fn get_source_tenants(&self, filter: &Filter) -> Result<Vec<String>, Error> {
        let url = format!("{}/{}", self.addr, TENANTS_PATH);
        let builder = self
            .executor
            .http()
            .get(&url)
            .query(&filter.time_params());

        let response = self.executor.execute(builder, StatusCode::OK).await?;
        let tenants: TenantsResponse = decode_json(response, "tenants").await?;
        Ok(tenants.data)
    }

    /// Requests series matching `filter` from `url` and returns the open body.
    ///
    /// Compression is disabled: the native format gains nothing from it.
    pub async fn export_pipe(&self, url: &str, filter: &Filter) -> Result<ByteStream, Error> {
        let builder = self
            .executor
            .http()
            .get(url)
            .query(&filter.query_params())
            .header(ACCEPT_ENCODING, "identity");

        let response = self.executor.execute(builder, StatusCode::OK).await?;
        Ok(Box::pin(response.bytes_stream().map_err(io::Error::other)))
    }

    /// Streams everything `reader` yields to `dst_url`.
    ///
    /// The response body is drained before returning; a failure there is
    /// reported as [`Error::Close`] even though the destination accepted the
    /// upload.
    pub async fn import_pipe<R>(&self, dst_url: &str, reader: R) -> Result<(), Error>
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        let body = Body::wrap_stream(ReaderStream::new(reader));
        let builder = self.executor.http().post(dst_url).body(body);

        let response = self.executor.execute(builder, StatusCode::NO_CONTENT).await?;
        response.bytes().await.map_err(|source| Error::Close {
            what: "import",
            source,
        })?;
        Ok(())
    }
}

pub struct ClientBuilder {
    addr: String,
    auth: Option<Arc<dyn HeaderInjector>>,
    extra_labels: Vec<String>,
    explore_concurrency: Option<NonZeroUsize>,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into().trim_end_matches('/').to_string(),
            auth: None,
            extra_labels: Vec::new(),
            explore_concurrency: None,
            timeout: None,
            accept_invalid_certs: false,
            http: None,
        }
    }

    pub fn auth(mut self, auth: Arc<dyn HeaderInjector>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn extra_labels(mut self, labels: Vec<String>) -> Self {
        self.extra_labels = labels;
        self
    }

    /// Maximum number of explore requests in flight; 0 means unbounded.
    pub fn explore_concurrency(mut self, limit: usize) -> Self {
        self.explore_concurrency = NonZeroUsize::new(limit);
        self
    }

    /// Total per-request timeout, including streaming the body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Uses a preconfigured transport; `timeout` and `accept_invalid_certs`
    /// are ignored when set.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder =
                    reqwest::Client::builder().danger_accept_invalid_certs(self.accept_invalid_certs);
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(Error::Transport)?
            }
        };

        Ok(Client {
            addr: self.addr,
            extra_labels: self.extra_labels,
            explore_concurrency: self.explore_concurrency,
            executor: Executor::new(http, self.auth),
        })
    }
}
