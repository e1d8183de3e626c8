//! Verb shorthands, URL composition and response normalization.
//!
//! # Design
//! `HttpClient` holds immutable defaults and a shared transport, so clones and
//! concurrent calls never contend. Every verb funnels into `request`, which
//! owns the one cancellation timer a call may have. The timer lives in a guard
//! that aborts it when dropped, so it is disarmed on every exit path.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{ClientConfig, RequestConfig, RequestSpec};
use crate::error::{FetchError, TransportError};
use crate::http::{HttpMethod, HttpRequest, ResponseEnvelope};
use crate::transport::Transport;

/// Convenience HTTP client over a [`Transport`].
#[derive(Clone)]
pub struct HttpClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Client on the default reqwest transport.
    #[cfg(feature = "reqwest")]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(crate::transport::ReqwestTransport::new()))
    }

    /// Client on a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// The defaults this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        config: Option<RequestConfig>,
    ) -> Result<ResponseEnvelope<T>, FetchError> {
        let spec = RequestSpec::new(HttpMethod::Get, url).with_config(config.unwrap_or_default());
        self.request(spec).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        config: Option<RequestConfig>,
    ) -> Result<ResponseEnvelope<T>, FetchError> {
        let spec =
            RequestSpec::new(HttpMethod::Delete, url).with_config(config.unwrap_or_default());
        self.request(spec).await
    }

    /// POST `data` as JSON. Data serializing to `null` (`()`, `None`) sends no body.
    pub async fn post<B, T>(
        &self,
        url: &str,
        data: &B,
        config: Option<RequestConfig>,
    ) -> Result<ResponseEnvelope<T>, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_with_body(HttpMethod::Post, url, data, config).await
    }

    pub async fn put<B, T>(
        &self,
        url: &str,
        data: &B,
        config: Option<RequestConfig>,
    ) -> Result<ResponseEnvelope<T>, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_with_body(HttpMethod::Put, url, data, config).await
    }

    pub async fn patch<B, T>(
        &self,
        url: &str,
        data: &B,
        config: Option<RequestConfig>,
    ) -> Result<ResponseEnvelope<T>, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_with_body(HttpMethod::Patch, url, data, config).await
    }

    async fn send_with_body<B, T>(
        &self,
        method: HttpMethod,
        url: &str,
        data: &B,
        config: Option<RequestConfig>,
    ) -> Result<ResponseEnvelope<T>, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let data = serde_json::to_value(data)?;
        let mut spec = RequestSpec::new(method, url).with_config(config.unwrap_or_default());
        if !data.is_null() {
            spec = spec.with_data(data);
        }
        self.request(spec).await
    }

    /// Run one request end to end.
    ///
    /// Non-2xx statuses resolve normally; only transport failures, timeouts
    /// and body encoding/decoding failures are errors.
    pub async fn request<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
    ) -> Result<ResponseEnvelope<T>, FetchError> {
        let RequestSpec {
            url,
            method,
            data,
            config,
        } = spec;

        let url = self.build_url(&url, &config.params);
        let body = data.map(|value| serde_json::to_string(&value)).transpose()?;
        let mut headers = self.merge_headers(config.headers);
        if body.is_some() && !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }

        // Per-call only; the client-level timeout is never merged in.
        let timeout = config.timeout.filter(|timeout| !timeout.is_zero());

        debug!(%method, %url, ?timeout, "dispatching request");

        let request = HttpRequest {
            method,
            url: url.clone(),
            headers: headers.into_iter().collect(),
            body,
        };

        let timer = timeout.map(CancelTimer::arm);
        let outcome = match &timer {
            Some(timer) => {
                let signal = &timer.signal;
                // Racing the signal here covers transports that ignore it.
                tokio::select! {
                    biased;
                    result = self.transport.perform(request, Some(signal.clone())) => result,
                    _ = signal.cancelled() => Err(TransportError::Aborted),
                }
            }
            None => self.transport.perform(request, None).await,
        };
        drop(timer);

        let response = outcome.map_err(|err| {
            match &err {
                TransportError::Aborted => warn!(%method, %url, ?timeout, "request timed out"),
                other => debug!(%method, %url, error = %other, "request failed"),
            }
            FetchError::from(err)
        })?;

        debug!(%method, %url, status = response.status, "request settled");

        let data = response.decode()?;
        Ok(ResponseEnvelope {
            data,
            status: response.status,
            headers: response.header_map(),
            status_text: response.status_text,
        })
    }

    /// Compose the final URL from the base URL, `url` and query `params`.
    ///
    /// The base is concatenated verbatim. Params are form-urlencoded in
    /// order and joined with `?`, or `&` when the URL already has a query.
    pub fn build_url(&self, url: &str, params: &[(String, String)]) -> String {
        let mut full = match &self.config.base_url {
            Some(base) => format!("{base}{url}"),
            None => url.to_string(),
        };
        if params.is_empty() {
            return full;
        }

        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        full.push(if full.contains('?') { '&' } else { '?' });
        full.push_str(&query);
        full
    }

    // Case-sensitive overlay; a per-call key replaces the identical default key.
    fn merge_headers(&self, overrides: BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut merged = self.config.headers.clone();
        merged.extend(overrides);
        merged
    }
}

/// Cancels `signal` once the timeout elapses, unless dropped first.
struct CancelTimer {
    signal: CancellationToken,
    task: JoinHandle<()>,
}

impl CancelTimer {
    fn arm(timeout: Duration) -> Self {
        let signal = CancellationToken::new();
        let trigger = signal.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            trigger.cancel();
        });
        Self { signal, task }
    }
}

impl Drop for CancelTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
