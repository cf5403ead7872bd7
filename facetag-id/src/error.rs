//! Error types for facetag-id
//!
//! Failures at the detect and identify stages abort a run; failures at the
//! person lookup stage only drop that face. `NoEligibleCandidate` is not a
//! failure of the run, it just means the face produces no display update.

use crate::http::HttpError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Identification error kinds
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IdentifyError {
    /// Non-2xx response or transport failure
    #[error("Network error: {message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Request exceeded its configured duration
    #[error("Timeout error: no response within {after:?}")]
    Timeout { after: Duration },

    /// Response body does not match the expected schema
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Image bytes could not be obtained from the source
    #[error("Image unavailable: {0}")]
    ImageUnavailable(String),

    /// Identifier cannot be used as a URL path segment, or the base URL is unusable
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// Face has no candidate at or above the confidence threshold
    #[error("No eligible candidate for face {face_id}")]
    NoEligibleCandidate { face_id: String },
}

impl IdentifyError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            IdentifyError::Network { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<HttpError> for IdentifyError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Timeout { after } => IdentifyError::Timeout { after },
            other => IdentifyError::Network {
                status: other.status_code(),
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for IdentifyError {
    fn from(e: serde_json::Error) -> Self {
        IdentifyError::Deserialization(e.to_string())
    }
}

/// Pipeline stage, used to attribute failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Capture,
    Detect,
    Identify,
    Lookup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Capture => write!(f, "capture"),
            Stage::Detect => write!(f, "detect"),
            Stage::Identify => write!(f, "identify"),
            Stage::Lookup => write!(f, "lookup"),
        }
    }
}

/// A run aborted at `stage`
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: IdentifyError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: IdentifyError) -> Self {
        Self { stage, source }
    }
}
