//! The fetch-like primitive the client runs on.
//!
//! # Design
//! `Transport` is the only I/O seam. It receives a fully composed
//! `HttpRequest` plus an optional cancellation signal and answers with a
//! buffered `HttpResponse`. When the signal fires mid-flight an
//! implementation should stop and report `TransportError::Aborted`; the
//! client maps that to a timeout.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request`. `signal` is `Some` only when the call carries a
    /// timeout.
    async fn perform(
        &self,
        request: HttpRequest,
        signal: Option<CancellationToken>,
    ) -> Result<HttpResponse, TransportError>;
}

#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use super::Transport;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Transport backed by a `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        inner: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Wrap a preconfigured client (proxy, TLS, pool settings).
        pub fn from_client(client: reqwest::Client) -> Self {
            Self { inner: client }
        }

        async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let mut builder = self.inner.request(request.method.into(), &request.url);
            for (key, value) in &request.headers {
                builder = builder.header(key, value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(TransportError::from)?;
            let status = response.status();
            let headers = response
                .headers()
                .iter()
                .map(|(key, value)| {
                    (
                        key.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response.bytes().await.map_err(TransportError::from)?;

            Ok(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body: body.to_vec(),
            })
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn perform(
            &self,
            request: HttpRequest,
            signal: Option<CancellationToken>,
        ) -> Result<HttpResponse, TransportError> {
            match signal {
                Some(signal) => tokio::select! {
                    biased;
                    _ = signal.cancelled() => Err(TransportError::Aborted),
                    result = self.exchange(request) => result,
                },
                None => self.exchange(request).await,
            }
        }
    }

    impl From<HttpMethod> for reqwest::Method {
        fn from(method: HttpMethod) -> Self {
            match method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Put => reqwest::Method::PUT,
                HttpMethod::Delete => reqwest::Method::DELETE,
                HttpMethod::Patch => reqwest::Method::PATCH,
            }
        }
    }

    impl From<reqwest::Error> for TransportError {
        fn from(err: reqwest::Error) -> Self {
            TransportError::Failed(err.to_string())
        }
    }

}
