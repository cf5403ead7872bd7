//! Face API client
//!
//! The three identification calls (detect, identify, person lookup) plus the
//! person group lookup, expressed over the shared [`HttpClient`]. Every
//! request carries the `Ocp-Apim-Subscription-Key` header.

use crate::error::IdentifyError;
use crate::http::{HttpClient, HttpRequestDescriptor};
use crate::schemas::{FaceDetection, IdentifiedPerson, IdentifyQuery, IdentifyResult, PersonGroup};
use async_trait::async_trait;
use facetag_common::config::CompiledDefaults;
use serde::de::DeserializeOwned;
use std::time::Duration;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Remote face identification operations
///
/// Implemented by [`FaceApiClient`]; the pipeline only depends on this trait.
#[async_trait]
pub trait FaceService: Send + Sync {
    /// Detect faces in raw image bytes, in the order the service returns them
    async fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceDetection>, IdentifyError>;

    /// Identify all `face_ids` with one batched request
    async fn identify_faces(
        &self,
        face_ids: &[String],
    ) -> Result<Vec<IdentifyResult>, IdentifyError>;

    /// Look up a person in the configured person group
    async fn get_person(&self, person_id: &str) -> Result<IdentifiedPerson, IdentifyError>;

    /// Minimum candidate confidence the pipeline should accept
    fn confidence_threshold(&self) -> f64;
}

/// Face API connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct FaceApiConfig {
    /// Base endpoint, with or without trailing slash
    pub base_url: String,
    pub subscription_key: String,
    pub person_group_id: String,
    pub request_timeout: Duration,
    pub max_candidates: u32,
    pub confidence_threshold: f64,
}

impl FaceApiConfig {
    /// Settings with compiled defaults for everything but endpoint and key
    pub fn new(base_url: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            subscription_key: subscription_key.into(),
            person_group_id: CompiledDefaults::PERSON_GROUP_ID.to_string(),
            request_timeout: Duration::from_secs(CompiledDefaults::REQUEST_TIMEOUT_SECS),
            max_candidates: CompiledDefaults::MAX_CANDIDATES,
            confidence_threshold: CompiledDefaults::CONFIDENCE_THRESHOLD,
        }
    }

    /// Join `path` onto the base URL with exactly one slash between them
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Append `segments` to the base URL, percent-encoding each one
    ///
    /// Identifiers come from the service, so `/`, `?` and `%` inside them are
    /// escaped. Empty, `.` and `..` segments are rejected.
    pub fn resource_url(&self, segments: &[&str]) -> Result<String, IdentifyError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(IdentifyError::InvalidUrl(format!(
                "'{}' is not a usable path segment",
                bad
            )));
        }

        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| IdentifyError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| IdentifyError::InvalidUrl(format!("{} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        Ok(url.into())
    }
}

/// Face API client over a shared [`HttpClient`]
#[derive(Debug, Clone)]
pub struct FaceApiClient {
    http: HttpClient,
    config: FaceApiConfig,
}

impl FaceApiClient {
    pub fn new(http: HttpClient, config: FaceApiConfig) -> Self {
        Self { http, config }
    }

    /// Fetch the configured person group
    pub async fn get_person_group(&self) -> Result<PersonGroup, IdentifyError> {
        let url = self
            .config
            .resource_url(&["persongroups", self.config.person_group_id.as_str()])?;

        tracing::debug!(url = %url, "Fetching person group");

        let body = self.http.send(self.authorized(HttpRequestDescriptor::get(url))).await?;
        parse(&body)
    }

    fn authorized(&self, request: HttpRequestDescriptor) -> HttpRequestDescriptor {
        request
            .header(SUBSCRIPTION_KEY_HEADER, self.config.subscription_key.as_str())
            .timeout(self.config.request_timeout)
    }
}

#[async_trait]
impl FaceService for FaceApiClient {
    async fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceDetection>, IdentifyError> {
        let url = self.config.endpoint("detect");

        tracing::debug!(url = %url, bytes = image.len(), "Submitting image for face detection");

        let request = HttpRequestDescriptor::post(url, image.to_vec())
            .header("Content-Type", "application/octet-stream");
        let body = self.http.send(self.authorized(request)).await?;

        let faces: Vec<FaceDetection> = parse(&body)?;
        for face in &faces {
            tracing::debug!(face_id = %face.face_id, "Detected face");
        }
        Ok(faces)
    }

    async fn identify_faces(
        &self,
        face_ids: &[String],
    ) -> Result<Vec<IdentifyResult>, IdentifyError> {
        let url = self.config.endpoint("identify");
        let query = IdentifyQuery::new(
            self.config.person_group_id.as_str(),
            face_ids.to_vec(),
            self.config.max_candidates,
            self.config.confidence_threshold,
        );
        let json = serde_json::to_string(&query)
            .map_err(|e| IdentifyError::Deserialization(format!("Encode identify query: {}", e)))?;

        tracing::debug!(url = %url, faces = face_ids.len(), "Identifying faces");

        let body = self
            .http
            .send(self.authorized(HttpRequestDescriptor::post_json(url, json)))
            .await?;

        tracing::debug!(response = %body, "Identify response");
        parse(&body)
    }

    async fn get_person(&self, person_id: &str) -> Result<IdentifiedPerson, IdentifyError> {
        let url = self.config.resource_url(&[
            "persongroups",
            self.config.person_group_id.as_str(),
            "persons",
            person_id,
        ])?;

        tracing::debug!(person_id = %person_id, url = %url, "Looking up person");

        let body = self.http.send(self.authorized(HttpRequestDescriptor::get(url))).await?;
        parse(&body)
    }

    fn confidence_threshold(&self) -> f64 {
        self.config.confidence_threshold
    }
}

#[async_trait]
impl<T: FaceService + ?Sized> FaceService for std::sync::Arc<T> {
    async fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceDetection>, IdentifyError> {
        (**self).detect_faces(image).await
    }

    async fn identify_faces(
        &self,
        face_ids: &[String],
    ) -> Result<Vec<IdentifyResult>, IdentifyError> {
        (**self).identify_faces(face_ids).await
    }

    async fn get_person(&self, person_id: &str) -> Result<IdentifiedPerson, IdentifyError> {
        (**self).get_person(person_id).await
    }

    fn confidence_threshold(&self) -> f64 {
        (**self).confidence_threshold()
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, IdentifyError> {
    Ok(serde_json::from_str(body)?)
}
