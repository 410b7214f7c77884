use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geographic point attached to listings and requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            address: None,
        }
    }
}

/// Fixed material taxonomy used across listings, requests and classification.
///
/// Declaration order doubles as the priority order for heuristic classifier
/// tie-breaks, so the position of each variant is part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    SteelBeam,
    Rebar,
    Concrete,
    Brick,
    Timber,
    Insulation,
    Glass,
    Piping,
    Tiles,
    Aggregate,
}

impl MaterialCategory {
    /// All categories, in tie-break priority order
    pub const ALL: [MaterialCategory; 10] = [
        MaterialCategory::SteelBeam,
        MaterialCategory::Rebar,
        MaterialCategory::Concrete,
        MaterialCategory::Brick,
        MaterialCategory::Timber,
        MaterialCategory::Insulation,
        MaterialCategory::Glass,
        MaterialCategory::Piping,
        MaterialCategory::Tiles,
        MaterialCategory::Aggregate,
    ];

    /// Human-readable label used in normalized descriptions and reasoning
    pub fn label(&self) -> &'static str {
        match self {
            MaterialCategory::SteelBeam => "Structural steel beams",
            MaterialCategory::Rebar => "Reinforcement bar",
            MaterialCategory::Concrete => "Concrete",
            MaterialCategory::Brick => "Bricks and masonry",
            MaterialCategory::Timber => "Timber",
            MaterialCategory::Insulation => "Insulation",
            MaterialCategory::Glass => "Glass",
            MaterialCategory::Piping => "Pipes and conduit",
            MaterialCategory::Tiles => "Tiles and slabs",
            MaterialCategory::Aggregate => "Aggregates",
        }
    }

    /// Wire name, identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialCategory::SteelBeam => "steel_beam",
            MaterialCategory::Rebar => "rebar",
            MaterialCategory::Concrete => "concrete",
            MaterialCategory::Brick => "brick",
            MaterialCategory::Timber => "timber",
            MaterialCategory::Insulation => "insulation",
            MaterialCategory::Glass => "glass",
            MaterialCategory::Piping => "piping",
            MaterialCategory::Tiles => "tiles",
            MaterialCategory::Aggregate => "aggregate",
        }
    }
}

/// Unit a listing or request quantity is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityUnit {
    Tonnes,
    CubicMeters,
    LinearMeters,
    Bags,
}

/// Declared amount of material
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: QuantityUnit,
}

impl Quantity {
    pub fn new(value: f64, unit: QuantityUnit) -> Self {
        Self { value, unit }
    }
}

/// Physical condition of the offered material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Unused,
    SlightlyUsed,
    Used,
}

impl Condition {
    /// Fixed factor score for this condition
    pub fn factor(&self) -> f64 {
        match self {
            Condition::Unused => 1.0,
            Condition::SlightlyUsed => 0.8,
            Condition::Used => 0.5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::Unused => "unused",
            Condition::SlightlyUsed => "slightly used",
            Condition::Used => "used",
        }
    }
}

/// Urgency declared on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    /// Fixed factor score for this urgency
    pub fn factor(&self) -> f64 {
        match self {
            Urgency::Low => 0.2,
            Urgency::Medium => 0.6,
            Urgency::High => 1.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

/// Lifecycle status of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Reserved,
    Completed,
    Cancelled,
}

fn default_listing_status() -> ListingStatus {
    ListingStatus::Active
}

/// Lifecycle status of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    Matched,
    Closed,
}

fn default_request_status() -> RequestStatus {
    RequestStatus::Open
}

/// Surplus material offered by one organisation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "listingId")]
    pub listing_id: String,
    #[serde(rename = "organisationId")]
    pub organisation_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: MaterialCategory,
    #[serde(default)]
    pub classification: Option<ClassificationResult>,
    pub quantity: Quantity,
    pub condition: Condition,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default = "default_listing_status")]
    pub status: ListingStatus,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Listing {
    /// Classifier-assigned category when present, else the declared one
    pub fn effective_category(&self) -> MaterialCategory {
        self.classification
            .as_ref()
            .map(|c| c.category)
            .unwrap_or(self.category)
    }

    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

/// Material demand raised by one organisation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRequest {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "organisationId")]
    pub organisation_id: String,
    pub category: MaterialCategory,
    pub quantity: Quantity,
    pub location: GeoPoint,
    pub urgency: Urgency,
    #[serde(default = "default_request_status")]
    pub status: RequestStatus,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Result of one classification run, attached to a listing at most once per run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: MaterialCategory,
    pub confidence: f64,
    pub description: String,
    pub version: String,
}

/// Scoring weights
///
/// Always supplied in full; negative or non-finite weights are rejected at
/// construction time rather than surfacing mid-scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub material: f64,
    pub quantity: f64,
    pub distance: f64,
    pub condition: f64,
    pub urgency: f64,
}

/// Invalid scoring weight supplied at construction
#[derive(Debug, Error)]
#[error("weight `{name}` must be a finite non-negative number, got {value}")]
pub struct WeightsError {
    pub name: &'static str,
    pub value: f64,
}

impl ScoringWeights {
    pub fn new(
        material: f64,
        quantity: f64,
        distance: f64,
        condition: f64,
        urgency: f64,
    ) -> Result<Self, WeightsError> {
        for (name, value) in [
            ("material", material),
            ("quantity", quantity),
            ("distance", distance),
            ("condition", condition),
            ("urgency", urgency),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError { name, value });
            }
        }

        Ok(Self {
            material,
            quantity,
            distance,
            condition,
            urgency,
        })
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            material: 0.40,
            quantity: 0.25,
            distance: 0.20,
            condition: 0.10,
            urgency: 0.05,
        }
    }
}

/// Per-factor score breakdown, each factor in [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub material: f64,
    #[serde(rename = "quantityFit")]
    pub quantity_fit: f64,
    pub distance: f64,
    pub condition: f64,
    pub urgency: f64,
}

/// Ranked pairing of one listing against one request
///
/// Recomputed on every query, never cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "listingId")]
    pub listing_id: String,
    pub score: f64,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "co2SavedKg")]
    pub co2_saved_kg: u64,
    pub reasons: Vec<String>,
    pub breakdown: FactorBreakdown,
}

/// Read-only view of the global classification quota
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub used: u32,
    pub max: u32,
    pub remaining: u32,
    pub exhausted: bool,
}

/// Accept/reject decision recorded against a proposed match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionEvent {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "listingId")]
    pub listing_id: String,
    pub score: f64,
    pub decision: DecisionType,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionType {
    Accepted,
    Rejected,
}
