mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::core::classify::ClassifierBackend;
use crate::core::{
    CarbonEstimator, DistanceResolver, MatchEngine, MaterialClassifier, WeightedScoreStrategy,
};
use crate::routes::matches::AppState;
use crate::services::{
    AppwriteClient, AppwriteCollections, ClassificationQuota, RoutingClient, VisionClient,
};
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Reloop matching service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize Appwrite client
    let collections = AppwriteCollections {
        listings: settings.collection.listings,
        requests: settings.collection.requests,
        decision_events: settings.collection.decision_events,
    };

    let appwrite = Arc::new(AppwriteClient::new(
        settings.appwrite.endpoint,
        settings.appwrite.api_key,
        settings.appwrite.project_id,
        settings.appwrite.database_id,
        collections,
    ));

    info!("Appwrite client initialized");

    // Authoritative routing lookup is optional; without it every distance is analytic
    let routing = match settings.routing.endpoint.clone() {
        Some(endpoint) => {
            info!("Routing lookup enabled: {}", endpoint);
            Some(Arc::new(RoutingClient::new(
                endpoint,
                settings.routing.api_key.clone(),
                settings.routing.timeout_secs,
            )))
        }
        None => {
            info!("No routing endpoint configured, using haversine estimates only");
            None
        }
    };

    let resolver = Arc::new(DistanceResolver::new(
        routing,
        settings.cache.distance_capacity,
        settings.cache.distance_ttl_secs,
        settings.routing.average_speed_kmh,
    ));

    info!(
        "Distance resolver initialized (cache: {} entries, TTL: {}s)",
        settings.cache.distance_capacity, settings.cache.distance_ttl_secs
    );

    let carbon = Arc::new(CarbonEstimator::new(settings.carbon));

    // External classifier backend is optional; the heuristic always remains
    let quota = Arc::new(ClassificationQuota::new(settings.classifier.quota_max));
    let backend: Option<Arc<dyn ClassifierBackend>> =
        match (settings.classifier.endpoint.clone(), settings.classifier.api_key.clone()) {
            (Some(endpoint), Some(api_key)) => {
                info!("External classifier enabled: {}", endpoint);
                Some(Arc::new(VisionClient::new(
                    endpoint,
                    api_key,
                    settings.classifier.timeout_secs,
                )))
            }
            (Some(_), None) => {
                error!("Classifier endpoint configured without an API key, using heuristic only");
                None
            }
            _ => {
                info!("No classifier endpoint configured, using heuristic only");
                None
            }
        };

    let classifier = Arc::new(MaterialClassifier::new(backend, Arc::clone(&quota)));

    info!(
        "Material classifier initialized (quota: {} external calls)",
        settings.classifier.quota_max
    );

    // Initialize matching engine with configured weights and radii
    let weights = settings.scoring.weights.to_weights().unwrap_or_else(|e| {
        error!("Invalid scoring weights: {}", e);
        panic!("Configuration error: {}", e);
    });

    let strategy = Arc::new(WeightedScoreStrategy::new(
        settings.matching.optimal_radius_km,
        settings.matching.max_radius_km,
    ));

    let engine = MatchEngine::new(
        Arc::clone(&resolver),
        Arc::clone(&carbon),
        strategy,
        settings.matching.max_radius_km,
        settings.matching.max_results,
    );

    info!("Match engine initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        appwrite,
        engine,
        classifier,
        default_weights: weights,
        default_min_score: settings.matching.min_score,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
