//! HTTP failure type with uniform message formatting
//!
//! Every variant renders as
//! `Request failed: <detail> (Result: <kind>, Code: <status or 0>)`.

use std::time::Duration;
use thiserror::Error;

/// Why a request did not succeed
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HttpError {
    /// Server answered with a non-2xx status
    #[error("Request failed: HTTP {code}: {body} (Result: ProtocolError, Code: {code})")]
    Status { code: u16, body: String },

    /// No complete response within the request timeout
    #[error("Request failed: no response within {after:?} (Result: TimedOut, Code: 0)")]
    Timeout { after: Duration },

    /// Connection, DNS, TLS or body read failure
    #[error("Request failed: {message} (Result: ConnectionError, Code: 0)")]
    Transport { message: String },
}

impl HttpError {
    /// HTTP status of the response, when there was one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HttpError::Status { code, .. } => Some(*code),
            HttpError::Timeout { .. } | HttpError::Transport { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout { .. })
    }

    pub(super) fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            return HttpError::Timeout { after: timeout };
        }
        if let Some(status) = e.status() {
            return HttpError::Status {
                code: status.as_u16(),
                body: e.to_string(),
            };
        }
        HttpError::Transport {
            message: e.to_string(),
        }
    }
}
