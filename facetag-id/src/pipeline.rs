//! Identification pipeline
//!
//! # Stage Progression
//! DETECT → IDENTIFY → LOOKUP (one per identified face) → sink
//!
//! - **DETECT**: submit image bytes, collect face ids in service order.
//!   Failure aborts the run. Zero faces ends the run cleanly.
//! - **IDENTIFY**: one batched call for every detected face id. Failure
//!   aborts the run. Results are re-keyed into detect order.
//! - **LOOKUP**: for each face whose best candidate meets the confidence
//!   threshold, in order, wait on the interval limiter and resolve the
//!   person. Failure drops only that face.
//!
//! All run state lives in `run`; nothing is kept between runs except the
//! limiter's last permit time.

use crate::collaborators::{ImageSource, ResultSink};
use crate::error::{IdentifyError, PipelineError, Stage};
use crate::face_api::FaceService;
use crate::rate_limiter::IntervalLimiter;
use crate::schemas::{
    order_by_face_ids, FaceDetection, IdentificationCandidate, IdentifiedPerson, IdentifyResult,
};
use std::time::Duration;

/// What one run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Number of faces returned by detection
    pub faces_detected: usize,
    /// Persons resolved and presented, in presentation order
    pub identified: Vec<IdentifiedPerson>,
    /// Face ids with no eligible candidate
    pub unmatched: Vec<String>,
    /// Person ids whose lookup failed
    pub failed_lookups: Vec<String>,
}

/// Detect → identify → lookup orchestration
pub struct IdentificationPipeline<S, K> {
    service: S,
    sink: K,
    limiter: IntervalLimiter,
}

impl<S: FaceService, K: ResultSink> IdentificationPipeline<S, K> {
    /// `lookup_interval` is the minimum spacing between person lookups
    pub fn new(service: S, sink: K, lookup_interval: Duration) -> Self {
        Self {
            service,
            sink,
            limiter: IntervalLimiter::new(lookup_interval),
        }
    }

    /// Read an image from `source` and run the pipeline on it
    pub async fn run_from_source(
        &self,
        source: &dyn ImageSource,
    ) -> Result<RunSummary, PipelineError> {
        let image = source.read_image().await.map_err(|e| {
            tracing::error!(stage = %Stage::Capture, "Image capture failed: {}", e);
            PipelineError::new(Stage::Capture, IdentifyError::ImageUnavailable(e.to_string()))
        })?;

        self.run(&image).await
    }

    /// Run all stages for one image
    pub async fn run(&self, image: &[u8]) -> Result<RunSummary, PipelineError> {
        let faces = self.detect_faces(image).await?;

        let mut summary = RunSummary {
            faces_detected: faces.len(),
            ..RunSummary::default()
        };

        if faces.is_empty() {
            tracing::info!("No faces detected, nothing to identify");
            return Ok(summary);
        }

        let face_ids: Vec<String> = faces.into_iter().map(|f| f.face_id).collect();
        let results = self.identify_faces(&face_ids).await?;
        let threshold = self.service.confidence_threshold();

        for result in &results {
            let candidate = match select_candidate(result, threshold) {
                Ok(candidate) => candidate,
                Err(e) => {
                    tracing::debug!(face_id = %result.face_id, "{}", e);
                    summary.unmatched.push(result.face_id.clone());
                    continue;
                }
            };

            let waited = self.limiter.wait().await;
            if !waited.is_zero() {
                tracing::debug!(face_id = %result.face_id, ?waited, "Lookup held back for spacing");
            }

            match self.resolve_person(&candidate.person_id).await {
                Ok(person) => {
                    tracing::info!(
                        face_id = %result.face_id,
                        person_id = %person.person_id,
                        confidence = candidate.confidence,
                        "Identified {}",
                        person.name
                    );
                    self.sink.present(&person.name);
                    summary.identified.push(person);
                }
                Err(e) => {
                    tracing::error!(
                        stage = %Stage::Lookup,
                        face_id = %result.face_id,
                        person_id = %candidate.person_id,
                        "Get person failed: {}",
                        e
                    );
                    summary.failed_lookups.push(candidate.person_id.clone());
                }
            }
        }

        tracing::info!(
            faces = summary.faces_detected,
            identified = summary.identified.len(),
            unmatched = summary.unmatched.len(),
            failed_lookups = summary.failed_lookups.len(),
            "Identification run complete"
        );

        Ok(summary)
    }

    /// Stage 1: detect faces
    pub async fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceDetection>, PipelineError> {
        let faces = self.service.detect_faces(image).await.map_err(|e| {
            tracing::error!(stage = %Stage::Detect, "Face detection failed: {}", e);
            PipelineError::new(Stage::Detect, e)
        })?;

        tracing::info!(faces = faces.len(), "Face detection complete");
        Ok(faces)
    }

    /// Stage 2: identify all detected faces in one call
    ///
    /// Returns exactly one result per entry of `face_ids`, in the same order.
    pub async fn identify_faces(
        &self,
        face_ids: &[String],
    ) -> Result<Vec<IdentifyResult>, PipelineError> {
        let results = self.service.identify_faces(face_ids).await.map_err(|e| {
            tracing::error!(stage = %Stage::Identify, "Face identification failed: {}", e);
            PipelineError::new(Stage::Identify, e)
        })?;

        let (ordered, unknown) = order_by_face_ids(face_ids, results);
        for face_id in unknown {
            tracing::warn!(face_id = %face_id, "Identify response contains unrequested face, ignoring");
        }

        Ok(ordered)
    }

    /// Stage 3: resolve one person id to a person
    pub async fn resolve_person(&self, person_id: &str) -> Result<IdentifiedPerson, IdentifyError> {
        self.service.get_person(person_id).await
    }
}

/// Pick the candidate to resolve for one face
pub fn select_candidate(
    result: &IdentifyResult,
    threshold: f64,
) -> Result<&IdentificationCandidate, IdentifyError> {
    result
        .best_candidate(threshold)
        .ok_or_else(|| IdentifyError::NoEligibleCandidate {
            face_id: result.face_id.clone(),
        })
}
