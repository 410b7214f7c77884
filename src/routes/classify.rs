use crate::models::{ClassifyRequest, ClassifyResponse, ErrorResponse};
use crate::routes::matches::AppState;
use crate::services::AppwriteError;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure classification routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/classify", web::post().to(classify_listing))
        .route("/classify/quota", web::get().to(quota_status));
}

/// Classify a listing endpoint
///
/// POST /api/v1/classify
///
/// Request body:
/// ```json
/// {
///   "listingId": "string",
///   "force": false
/// }
/// ```
///
/// The response carries a null classification when the listing was already
/// classified and `force` was not set; the caller never fails on that.
async fn classify_listing(
    state: web::Data<AppState>,
    req: web::Json<ClassifyRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let listing = match state.appwrite.get_listing(&req.listing_id).await {
        Ok(listing) => listing,
        Err(AppwriteError::NotFound(message)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Listing not found".to_string(),
                message,
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch listing {}: {}", req.listing_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch listing".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let classification = state.classifier.classify(&listing, req.force).await;

    // Persist classification fields best-effort; a storage hiccup must not
    // fail the ingestion flow
    if let Some(result) = &classification {
        if let Err(e) = state
            .appwrite
            .update_listing_classification(&req.listing_id, result)
            .await
        {
            tracing::warn!(
                "Classified listing {} but failed to persist result: {}",
                req.listing_id,
                e
            );
        }
    }

    HttpResponse::Ok().json(ClassifyResponse {
        classification,
        quota: state.classifier.quota_status(),
    })
}

/// Quota inspection endpoint
///
/// GET /api/v1/classify/quota
async fn quota_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.classifier.quota_status())
}
