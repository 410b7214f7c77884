use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find matches for a material request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "request_id", rename = "requestId")]
    pub request_id: String,
    /// Optional per-call weight override; must be supplied in full
    #[serde(default)]
    pub weights: Option<WeightsPayload>,
    #[serde(alias = "min_score", rename = "minScore")]
    pub min_score: Option<f64>,
}

/// Full weight tuple as supplied on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct WeightsPayload {
    #[validate(range(min = 0.0))]
    pub material: f64,
    #[validate(range(min = 0.0))]
    pub quantity: f64,
    #[validate(range(min = 0.0))]
    pub distance: f64,
    #[validate(range(min = 0.0))]
    pub condition: f64,
    #[validate(range(min = 0.0))]
    pub urgency: f64,
}

/// Request to record an accept/reject decision on a proposed match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordDecisionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "request_id", rename = "requestId")]
    pub request_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "listing_id", rename = "listingId")]
    pub listing_id: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub score: f64,
    pub decision: String,
}

/// Request to classify a listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClassifyRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "listing_id", rename = "listingId")]
    pub listing_id: String,
    /// Re-run classification even if the listing already carries a result
    #[serde(default)]
    pub force: bool,
}
