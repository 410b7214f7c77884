use crate::core::{MatchEngine, MaterialClassifier};
use crate::models::{
    DecisionEvent, DecisionType, ErrorResponse, FindMatchesRequest, FindMatchesResponse,
    HealthResponse, RecordDecisionRequest, RecordDecisionResponse, ScoringWeights,
};
use crate::services::{AppwriteClient, AppwriteError};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub appwrite: Arc<AppwriteClient>,
    pub engine: MatchEngine,
    pub classifier: Arc<MaterialClassifier>,
    pub default_weights: ScoringWeights,
    pub default_min_score: f64,
}

/// Configure match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/decision", web::post().to(record_decision));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "requestId": "string",
///   "weights": {"material": 0.4, "quantity": 0.25, "distance": 0.2, "condition": 0.1, "urgency": 0.05},
///   "minScore": 0.3
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    // Resolve the weight tuple; overrides must be supplied in full and valid
    let weights = match &req.weights {
        Some(payload) => {
            match ScoringWeights::new(
                payload.material,
                payload.quantity,
                payload.distance,
                payload.condition,
                payload.urgency,
            ) {
                Ok(weights) => weights,
                Err(e) => {
                    return HttpResponse::BadRequest().json(ErrorResponse {
                        error: "Invalid weights".to_string(),
                        message: e.to_string(),
                        status_code: 400,
                    });
                }
            }
        }
        None => state.default_weights,
    };

    let min_score = req.min_score.unwrap_or(state.default_min_score);

    tracing::info!(
        "Finding matches for request: {}, min score: {}",
        req.request_id,
        min_score
    );

    // Fetch the material request
    let request = match state.appwrite.get_request(&req.request_id).await {
        Ok(request) => request,
        Err(AppwriteError::NotFound(message)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Request not found".to_string(),
                message,
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch request {}: {}", req.request_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch request".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    // Fetch the full active-listing candidate pool
    let candidates = match state.appwrite.query_active_listings().await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to query listings for {}: {}", req.request_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to query listings".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    tracing::debug!(
        "Scoring {} candidates for request {}",
        candidates.len(),
        req.request_id
    );

    // Run matching algorithm
    let outcome = state
        .engine
        .find_matches(&request, candidates, &weights, min_score);

    let response = FindMatchesResponse {
        total_candidates: outcome.total_candidates,
        matches: outcome.matches,
    };

    tracing::info!(
        "Returning {} matches for request {} (from {} candidates)",
        response.matches.len(),
        req.request_id,
        response.total_candidates
    );

    HttpResponse::Ok().json(response)
}

/// Record match decision endpoint
///
/// POST /api/v1/matches/decision
///
/// Request body:
/// ```json
/// {
///   "requestId": "string",
///   "listingId": "string",
///   "score": 0.87,
///   "decision": "accepted|rejected"
/// }
/// ```
async fn record_decision(
    state: web::Data<AppState>,
    req: web::Json<RecordDecisionRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    // Parse decision type
    let decision = match req.decision.to_lowercase().as_str() {
        "accepted" => DecisionType::Accepted,
        "rejected" => DecisionType::Rejected,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid decision".to_string(),
                message: "Decision must be one of: accepted, rejected".to_string(),
                status_code: 400,
            });
        }
    };

    let event = DecisionEvent {
        request_id: req.request_id.clone(),
        listing_id: req.listing_id.clone(),
        score: req.score,
        decision,
        created_at: chrono::Utc::now(),
    };

    match state.appwrite.record_decision(&event).await {
        Ok(_) => HttpResponse::Ok().json(RecordDecisionResponse {
            success: true,
            event_id: uuid::Uuid::new_v4().to_string(),
        }),
        Err(e) => {
            tracing::error!("Failed to record decision: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to record decision".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
