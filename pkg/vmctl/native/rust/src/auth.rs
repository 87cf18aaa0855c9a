// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Request authentication.
//!
//! Every outbound request goes through a [`HeaderInjector`] when the client
//! has one configured. [`AuthConfig`] covers basic auth, bearer tokens and
//! arbitrary extra headers.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;

/// Separator between entries of a custom header list.
const HEADERS_SEPARATOR: &str = "^^";

/// Mutates request headers before a request is sent.
///
/// `primary` is true for requests to the endpoint the credentials belong to;
/// the `Authorization` header must only be set for those.
pub trait HeaderInjector: Send + Sync {
    fn set_headers(&self, headers: &mut HeaderMap, primary: bool);
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("only one of basic auth or bearer token can be set")]
    ConflictingCredentials,

    #[error("missing ':' in header {0:?}; expecting \"key: value\" format")]
    MalformedHeader(String),

    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),

    #[error("invalid value for header {0:?}")]
    InvalidHeaderValue(String),
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    authorization: Option<HeaderValue>,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl AuthConfig {
    /// Builds the configuration from the individual credential settings.
    ///
    /// `headers` uses the `"Key: value^^Key2: value2"` format.
    pub fn new(
        username: Option<&str>,
        password: Option<&str>,
        bearer_token: Option<&str>,
        headers: Option<&str>,
    ) -> Result<Self, AuthError> {
        let basic = match (username, password) {
            (None, None) => None,
            (user, pass) => Some(basic_auth(user.unwrap_or_default(), pass.unwrap_or_default())),
        };
        let bearer = bearer_token
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {t}"));

        let authorization = match (basic, bearer) {
            (Some(_), Some(_)) => return Err(AuthError::ConflictingCredentials),
            (Some(value), None) | (None, Some(value)) => Some(
                HeaderValue::from_str(&value)
                    .map_err(|_| AuthError::InvalidHeaderValue(AUTHORIZATION.to_string()))?,
            ),
            (None, None) => None,
        };

        let headers = match headers {
            Some(h) => parse_headers(h)?,
            None => Vec::new(),
        };

        Ok(Self {
            authorization,
            headers,
        })
    }

    /// True when the configuration would not change any request.
    pub fn is_empty(&self) -> bool {
        self.authorization.is_none() && self.headers.is_empty()
    }
}

impl HeaderInjector for AuthConfig {
    fn set_headers(&self, headers: &mut HeaderMap, primary: bool) {
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
        if primary && let Some(authorization) = &self.authorization {
            headers.insert(AUTHORIZATION, authorization.clone());
        }
    }
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn parse_headers(raw: &str) -> Result<Vec<(HeaderName, HeaderValue)>, AuthError> {
    raw.split(HEADERS_SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, value) = entry
                .split_once(':')
                .ok_or_else(|| AuthError::MalformedHeader(entry.to_string()))?;
            let name = name.trim();
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| AuthError::InvalidHeaderName(name.to_string()))?;
            let header_value = HeaderValue::from_str(value.trim())
                .map_err(|_| AuthError::InvalidHeaderValue(name.to_string()))?;
            Ok((header_name, header_value))
        })
        .collect()
}
