//! Generic async HTTP client
//!
//! Each request runs on its own tokio task and delivers exactly one
//! [`HttpOutcome`]. Two completion styles are offered:
//!
//! - callback: `send_with` / `get_with` / `post_with` take an `FnOnce` that
//!   receives the outcome
//! - future: `send` / `get` / `post` are built on the callback path and
//!   resolve to `Result<String, HttpError>`
//!
//! The client holds no per-request state, so one instance (or any clone of
//! it) can serve any number of concurrent requests.

mod error;
mod request;

pub use error::HttpError;
pub use request::{HttpOutcome, HttpRequestDescriptor, Method, DEFAULT_TIMEOUT};

use std::time::Duration;
use tokio::sync::oneshot;

const USER_AGENT: &str = concat!("facetag/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, HttpError> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HttpError::Transport {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { inner })
    }

    /// Issue a request and hand its outcome to `on_complete`
    ///
    /// Returns immediately. `on_complete` runs exactly once on the request
    /// task, whether the request succeeds, fails or times out.
    pub fn send_with<F>(&self, request: HttpRequestDescriptor, on_complete: F)
    where
        F: FnOnce(HttpOutcome) + Send + 'static,
    {
        let client = self.inner.clone();
        tokio::spawn(async move {
            let outcome = execute(&client, request).await;
            on_complete(outcome);
        });
    }

    /// Callback-style GET
    pub fn get_with<F>(&self, url: &str, timeout: Duration, on_complete: F)
    where
        F: FnOnce(HttpOutcome) + Send + 'static,
    {
        self.send_with(HttpRequestDescriptor::get(url).timeout(timeout), on_complete);
    }

    /// Callback-style POST with a JSON body
    pub fn post_with<F>(&self, url: &str, json_body: &str, timeout: Duration, on_complete: F)
    where
        F: FnOnce(HttpOutcome) + Send + 'static,
    {
        self.send_with(
            HttpRequestDescriptor::post_json(url, json_body).timeout(timeout),
            on_complete,
        );
    }

    /// Issue a request and await its outcome
    pub async fn send(&self, request: HttpRequestDescriptor) -> Result<String, HttpError> {
        let (tx, rx) = oneshot::channel();

        self.send_with(request, move |outcome| {
            // Receiver is only gone if the awaiting future was dropped
            let _ = tx.send(outcome);
        });

        match rx.await {
            Ok(outcome) => outcome.into_result(),
            Err(_) => Err(HttpError::Transport {
                message: "request task ended without an outcome".to_string(),
            }),
        }
    }

    /// Future-style GET
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<String, HttpError> {
        self.send(HttpRequestDescriptor::get(url).timeout(timeout))
            .await
    }

    /// Future-style POST with a JSON body
    pub async fn post(
        &self,
        url: &str,
        json_body: &str,
        timeout: Duration,
    ) -> Result<String, HttpError> {
        self.send(HttpRequestDescriptor::post_json(url, json_body).timeout(timeout))
            .await
    }
}

/// Run one request to its terminal outcome
async fn execute(client: &reqwest::Client, request: HttpRequestDescriptor) -> HttpOutcome {
    let method = request.method();
    let url = request.url().to_string();
    let timeout = request.timeout_duration();

    tracing::debug!(%method, url = %url, ?timeout, "Sending request");

    let outcome = match tokio::time::timeout(timeout, exchange(client, request)).await {
        Ok(Ok(body)) => HttpOutcome::Success(body),
        Ok(Err(e)) => HttpOutcome::Failure(e),
        Err(_) => HttpOutcome::Failure(HttpError::Timeout { after: timeout }),
    };

    match &outcome {
        HttpOutcome::Success(body) => {
            tracing::debug!(%method, url = %url, bytes = body.len(), "Request succeeded");
        }
        HttpOutcome::Failure(e) => {
            tracing::warn!(%method, url = %url, "{}", e);
        }
    }

    outcome
}

async fn exchange(
    client: &reqwest::Client,
    request: HttpRequestDescriptor,
) -> Result<String, HttpError> {
    let (method, url, headers, body, timeout) = request.into_parts();

    let mut builder = match method {
        Method::Get => client.get(&url),
        Method::Post => client.post(&url),
    };
    for (name, value) in &headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = body {
        builder = builder.body(body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| HttpError::from_reqwest(e, timeout))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| HttpError::from_reqwest(e, timeout))?;

    if !status.is_success() {
        return Err(HttpError::Status {
            code: status.as_u16(),
            body: text,
        });
    }

    Ok(text)
}
