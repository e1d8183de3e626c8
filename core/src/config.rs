//! Client defaults and per-call options.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

use crate::http::HttpMethod;

/// Instance-wide defaults, fixed when the client is built.
///
/// Deserializes from configuration files with every field optional;
/// `timeout` is written as integer milliseconds.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix concatenated in front of every call URL, verbatim.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Headers sent with every request unless a call overrides the same key.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Stored for callers to read back; calls only honor `RequestConfig::timeout`.
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Options for a single call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    /// Overlaid on the client's default headers, key by key.
    pub headers: BTreeMap<String, String>,
    /// Query parameters in insertion order. Keys may repeat.
    pub params: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Append a query parameter; the value is stringified with `Display`.
    pub fn param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Everything `HttpClient::request` needs for one call.
///
/// `data` of `None` means no body is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub url: String,
    pub method: HttpMethod,
    pub data: Option<serde_json::Value>,
    pub config: RequestConfig,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            data: None,
            config: RequestConfig::default(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.config = config;
        self
    }
}
