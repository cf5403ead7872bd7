//! facetag-id library interface
//!
//! Face identification over a remote Face API:
//! detect faces → identify candidates → resolve person names → sink.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod face_api;
pub mod http;
pub mod pipeline;
pub mod rate_limiter;
pub mod schemas;

pub use crate::collaborators::{ImageSource, ResultSink};
pub use crate::error::{IdentifyError, PipelineError, Stage};
pub use crate::face_api::{FaceApiClient, FaceApiConfig, FaceService};
pub use crate::http::{HttpClient, HttpError, HttpOutcome, HttpRequestDescriptor};
pub use crate::pipeline::{IdentificationPipeline, RunSummary};
