//! Async HTTP convenience client over a pluggable fetch-like transport.
//!
//! # Overview
//! `HttpClient` offers `get`/`post`/`put`/`patch`/`delete` shorthands with a
//! base URL, default headers, query parameters, JSON bodies and per-request
//! timeouts. Every call resolves to a `ResponseEnvelope` or a `FetchError`.
//!
//! # Design
//! - The network exchange is delegated to a `Transport`; a reqwest-backed one
//!   ships behind the default `reqwest` feature.
//! - Non-2xx statuses are returned as envelopes, not errors.
//! - Response data is decoded by content type: JSON when the header says so,
//!   raw text otherwise.
//! - A timeout arms one cancellation timer per call, disarmed on every exit.
//!
//! # Example
//!
//! ```no_run
//! use swiftfetch::{ClientConfig, HttpClient, RequestConfig, ResponseEnvelope};
//!
//! async fn example() -> Result<(), swiftfetch::FetchError> {
//!     let client = HttpClient::new(
//!         ClientConfig::new().with_base_url("https://jsonplaceholder.typicode.com"),
//!     );
//!     let todos: ResponseEnvelope = client
//!         .get("/todos", Some(RequestConfig::new().param("userId", 1)))
//!         .await?;
//!     println!("{} {}", todos.status, todos.data);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;

pub use client::HttpClient;
pub use config::{ClientConfig, RequestConfig, RequestSpec};
pub use error::{FetchError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ResponseEnvelope};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;

/// Re-exported so custom transports can name the signal type.
pub use tokio_util::sync::CancellationToken;
