use crate::models::domain::{ClassificationResult, MatchResult, QuotaStatus};
use serde::{Deserialize, Serialize};

/// Response for the find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<MatchResult>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Response for the classify endpoint
///
/// `classification` is null when the listing was already classified, the
/// backend failed with nothing to fall back to, or classification was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub classification: Option<ClassificationResult>,
    pub quota: QuotaStatus,
}

/// Response for the decision endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDecisionResponse {
    pub success: bool,
    #[serde(rename = "eventId")]
    pub event_id: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
