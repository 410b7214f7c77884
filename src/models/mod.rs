// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ClassificationResult, Condition, DecisionEvent, DecisionType, FactorBreakdown, GeoPoint,
    Listing, ListingStatus, MatchResult, MaterialCategory, MaterialRequest, Quantity,
    QuantityUnit, QuotaStatus, RequestStatus, ScoringWeights, Urgency, WeightsError,
};
pub use requests::{ClassifyRequest, FindMatchesRequest, RecordDecisionRequest, WeightsPayload};
pub use responses::{
    ClassifyResponse, ErrorResponse, FindMatchesResponse, HealthResponse, RecordDecisionResponse,
};
