// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::Deserialize;

use crate::auth::AuthConfig;
use crate::client::Client;

pub const CONFIG_PATH_ENV: &str = "VMCTL_NATIVE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "/etc/vmctl/native.yaml";

fn default_log_level() -> String {
    "info".to_string()
}

/// Top-level configuration file.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub source: EndpointConfig,
    pub destination: Option<EndpointConfig>,
}

/// Connection settings for one VictoriaMetrics endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct EndpointConfig {
    pub addr: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub bearer_token: Option<String>,
    /// Extra headers in `"Key: value^^Key2: value2"` format.
    pub headers: Option<String>,
    #[serde(default)]
    pub extra_labels: Vec<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    /// Maximum explore requests in flight; unset or 0 means one per range.
    #[serde(default)]
    pub explore_concurrency: usize,
}

impl EndpointConfig {
    pub fn build_client(&self) -> Result<Client> {
        if self.addr.is_empty() {
            anyhow::bail!("endpoint addr must not be empty");
        }

        let auth = AuthConfig::new(
            self.user.as_deref(),
            self.password.as_deref(),
            self.bearer_token.as_deref(),
            self.headers.as_deref(),
        )
        .with_context(|| format!("invalid auth settings for {}", self.addr))?;

        let mut builder = Client::builder(&self.addr)
            .extra_labels(self.extra_labels.clone())
            .explore_concurrency(self.explore_concurrency)
            .accept_invalid_certs(self.insecure_skip_verify);
        if !auth.is_empty() {
            builder = builder.auth(Arc::new(auth));
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .with_context(|| format!("failed to create HTTP client for {}", self.addr))
    }
}

impl Config {
    /// Configured level, `Info` when it does not parse.
    pub fn log_level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    /// The configured level when [`Config::log_level`] had to fall back.
    pub fn unknown_log_level(&self) -> Option<&str> {
        match self.log_level.parse::<LevelFilter>() {
            Ok(_) => None,
            Err(_) => Some(&self.log_level),
        }
    }
}

/// Explicit path, then `VMCTL_NATIVE_CONFIG`, then the default location.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn load_config(path: &Path) -> Result<Config> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}
