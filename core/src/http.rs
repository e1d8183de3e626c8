//! HTTP data types exchanged with the transport and returned to callers.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`,
//! the transport turns it into an `HttpResponse` with a fully buffered body,
//! and the client decodes that into a `ResponseEnvelope`. Keeping the
//! transport boundary data-only makes stub transports trivial to write.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FetchError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request handed to a [`Transport`](crate::Transport).
///
/// `url` is fully composed (base URL and query string applied) and `headers`
/// already holds the merged default and per-call headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A settled response as reported by the transport.
///
/// Headers keep the transport's order and casing; a name may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn content_type(&self) -> Option<&str> {
        find_header(&self.headers, "content-type")
    }

    /// Body as UTF-8 text; invalid sequences become U+FFFD.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(FetchError::from)
    }

    /// Decode the body according to its content type.
    ///
    /// A `content-type` containing `application/json` parses the body as
    /// JSON. Anything else, including a missing header, reads the body as
    /// text and hands it to `T` as a JSON string, so `String` and
    /// `serde_json::Value` always accept it.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        match self.content_type() {
            Some(content_type) if content_type.contains("application/json") => self.json(),
            _ => {
                serde_json::from_value(Value::String(self.text())).map_err(FetchError::from)
            }
        }
    }

    /// Flatten the header list into a map. Later duplicates overwrite earlier ones.
    pub fn header_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for (key, value) in &self.headers {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

/// The normalized response returned by every `HttpClient` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope<T = Value> {
    pub data: T,
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
}

impl<T> ResponseEnvelope<T> {
    /// Whether `status` is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
