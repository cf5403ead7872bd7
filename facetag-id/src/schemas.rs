//! Face API request/response shapes
//!
//! Field names follow the service's camelCase JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One face returned by `POST /detect`
///
/// The service may send additional fields (rectangles, attributes); only the
/// face id is needed downstream.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetection {
    /// Opaque id, valid only for the identify call that follows detection
    pub face_id: String,
}

/// Body of `POST /identify`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyQuery {
    pub person_group_id: String,
    pub face_ids: Vec<String>,
    pub max_num_of_candidates_returned: u32,
    pub confidence_threshold: f64,
}

impl IdentifyQuery {
    pub fn new(
        person_group_id: impl Into<String>,
        face_ids: Vec<String>,
        max_candidates: u32,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            person_group_id: person_group_id.into(),
            face_ids,
            max_num_of_candidates_returned: max_candidates,
            confidence_threshold,
        }
    }
}

/// A possible identity for one face
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationCandidate {
    pub person_id: String,
    /// Match confidence (0.0 to 1.0)
    pub confidence: f64,
}

/// Candidates for one face from `POST /identify`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyResult {
    pub face_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub candidates: Vec<IdentificationCandidate>,
}

impl IdentifyResult {
    pub fn unmatched(face_id: impl Into<String>) -> Self {
        Self {
            face_id: face_id.into(),
            candidates: Vec::new(),
        }
    }

    /// Highest-confidence candidate at or above `threshold`
    ///
    /// Ties keep the candidate the service listed first.
    pub fn best_candidate(&self, threshold: f64) -> Option<&IdentificationCandidate> {
        self.candidates
            .iter()
            .filter(|c| c.confidence >= threshold)
            .fold(None, |best: Option<&IdentificationCandidate>, c| match best {
                Some(b) if b.confidence >= c.confidence => Some(b),
                _ => Some(c),
            })
    }
}

/// Re-key identify results into the order of `face_ids`
///
/// Faces the service left out come back with no candidates. Results for face
/// ids that were never submitted are returned separately so the caller can
/// log them.
pub fn order_by_face_ids(
    face_ids: &[String],
    results: Vec<IdentifyResult>,
) -> (Vec<IdentifyResult>, Vec<String>) {
    let mut by_id: HashMap<String, IdentifyResult> = HashMap::with_capacity(results.len());
    let mut unknown = Vec::new();

    for result in results {
        if face_ids.contains(&result.face_id) {
            by_id.entry(result.face_id.clone()).or_insert(result);
        } else {
            unknown.push(result.face_id);
        }
    }

    let ordered = face_ids
        .iter()
        .map(|id| by_id.remove(id).unwrap_or_else(|| IdentifyResult::unmatched(id.clone())))
        .collect();

    (ordered, unknown)
}

/// Response of `GET /persongroups/{groupId}/persons/{personId}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiedPerson {
    pub person_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

/// Response of `GET /persongroups/{groupId}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonGroup {
    pub person_group_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
