//! Request descriptor and terminal outcome types

use super::HttpError;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP method supported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A single HTTP request, fully described before it is issued
///
/// Built with the `get`/`post` constructors and the consuming `header` and
/// `timeout` setters. Once handed to [`super::HttpClient`] it is moved into
/// the request task and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequestDescriptor {
    method: Method,
    url: String,
    headers: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
    timeout: Duration,
}

impl HttpRequestDescriptor {
    /// GET request without a body
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// POST request with a raw body
    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: BTreeMap::new(),
            body: Some(body.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// POST request with a JSON body and matching content type
    pub fn post_json(url: impl Into<String>, json_body: impl Into<String>) -> Self {
        Self::post(url, json_body.into().into_bytes()).header("Content-Type", "application/json")
    }

    /// Add or replace a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Override the default timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    pub(super) fn into_parts(
        self,
    ) -> (Method, String, BTreeMap<String, String>, Option<Vec<u8>>, Duration) {
        (self.method, self.url, self.headers, self.body, self.timeout)
    }
}

/// Terminal result of one request
///
/// Exactly one outcome is produced per issued request.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpOutcome {
    /// 2xx response with its body
    Success(String),
    /// Non-2xx response, transport failure or timeout
    Failure(HttpError),
}

impl HttpOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, HttpOutcome::Success(_))
    }

    /// Status code of the failure, if the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HttpOutcome::Success(_) => None,
            HttpOutcome::Failure(e) => e.status_code(),
        }
    }

    pub fn into_result(self) -> Result<String, HttpError> {
        match self {
            HttpOutcome::Success(body) => Ok(body),
            HttpOutcome::Failure(e) => Err(e),
        }
    }
}
