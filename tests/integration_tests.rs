// Integration tests for Reloop Algo

use reloop_algo::core::carbon::CarbonEstimator;
use reloop_algo::core::classify::{ClassifierBackend, MaterialClassifier};
use reloop_algo::core::distance::DistanceResolver;
use reloop_algo::core::matcher::{MatchEngine, DEFAULT_MIN_SCORE};
use reloop_algo::core::scoring::WeightedScoreStrategy;
use reloop_algo::models::{
    Condition, GeoPoint, Listing, ListingStatus, MaterialCategory, MaterialRequest, Quantity,
    QuantityUnit, RequestStatus, ScoringWeights, Urgency,
};
use reloop_algo::services::quota::ClassificationQuota;
use reloop_algo::services::routing::RoutingClient;
use reloop_algo::services::vision::{VisionClient, VISION_VERSION};
use std::sync::Arc;

fn create_listing(id: &str, org: &str, category: MaterialCategory, lat: f64, lon: f64) -> Listing {
    Listing {
        listing_id: id.to_string(),
        organisation_id: org.to_string(),
        title: format!("Listing {}", id),
        description: None,
        category,
        classification: None,
        quantity: Quantity::new(20.0, QuantityUnit::Tonnes),
        condition: Condition::SlightlyUsed,
        location: Some(GeoPoint::new(lat, lon)),
        image_url: None,
        status: ListingStatus::Active,
        created_at: None,
    }
}

fn create_request() -> MaterialRequest {
    MaterialRequest {
        request_id: "req-1".to_string(),
        organisation_id: "org-demand".to_string(),
        category: MaterialCategory::Concrete,
        quantity: Quantity::new(12.0, QuantityUnit::Tonnes),
        location: GeoPoint::new(24.71, 46.67), // Riyadh
        urgency: Urgency::Medium,
        status: RequestStatus::Open,
        created_at: None,
    }
}

fn create_engine() -> MatchEngine {
    MatchEngine::new(
        Arc::new(DistanceResolver::haversine_only(50.0)),
        Arc::new(CarbonEstimator::with_default_factors()),
        Arc::new(WeightedScoreStrategy::default()),
        200.0,
        10,
    )
}

#[test]
fn test_integration_end_to_end_matching() {
    let engine = create_engine();
    let request = create_request();

    let mut wrong_category =
        create_listing("4", "org-b", MaterialCategory::Brick, 24.75, 46.70);
    wrong_category.title = "Brick pallets".to_string();

    let candidates = vec![
        create_listing("1", "org-a", MaterialCategory::Concrete, 24.73, 46.69), // close
        create_listing("2", "org-b", MaterialCategory::Concrete, 25.10, 46.80), // further out
        create_listing("3", "org-demand", MaterialCategory::Concrete, 24.73, 46.69), // own org
        wrong_category,
        create_listing("5", "org-c", MaterialCategory::Concrete, 28.50, 46.67), // beyond radius
    ];

    let outcome = engine.find_matches(
        &request,
        candidates,
        &ScoringWeights::default(),
        DEFAULT_MIN_SCORE,
    );

    assert_eq!(outcome.total_candidates, 5);
    assert_eq!(outcome.matches.len(), 2);
    assert_eq!(outcome.matches[0].listing_id, "1");

    for m in &outcome.matches {
        assert_eq!(m.request_id, "req-1");
        assert!(m.score >= DEFAULT_MIN_SCORE);
        assert!(m.co2_saved_kg > 0);
        assert!(!m.reasons.is_empty());
        assert!(m.reasons[0].contains("Concrete"));
    }

    for pair in outcome.matches.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_routing_lookup_used_when_available() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/route")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"distanceMeters": 52340.0, "durationSeconds": 3720.0}"#)
        .create_async()
        .await;

    let routing = Arc::new(RoutingClient::new(server.url(), None, 5));
    let resolver = DistanceResolver::new(Some(routing), 100, 60, 50.0);

    let origin = GeoPoint::new(24.71, 46.67);
    let destination = GeoPoint::new(24.90, 46.80);
    let estimate = resolver.resolve(&origin, &destination).await;

    assert_eq!(estimate.distance_km, 52.3);
    assert_eq!(estimate.eta_minutes, 62);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_routing_failure_falls_back_to_haversine() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/route")
        .match_query(mockito::Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let routing = Arc::new(RoutingClient::new(server.url(), None, 5));
    let resolver = DistanceResolver::new(Some(routing), 100, 60, 50.0);

    let origin = GeoPoint::new(24.71, 46.67);
    let destination = GeoPoint::new(25.10, 46.80);

    let resolved = resolver.resolve(&origin, &destination).await;
    let analytic = resolver.resolve_batch(&origin, &[destination.clone()])[0];

    assert_eq!(resolved, analytic);
}

#[tokio::test]
async fn test_routing_malformed_payload_falls_back_to_haversine() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/route")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unexpected": true}"#)
        .create_async()
        .await;

    let routing = Arc::new(RoutingClient::new(server.url(), None, 5));
    let resolver = DistanceResolver::new(Some(routing), 100, 60, 50.0);

    let origin = GeoPoint::new(24.71, 46.67);
    let destination = GeoPoint::new(24.85, 46.75);

    let resolved = resolver.resolve(&origin, &destination).await;
    let analytic = resolver.resolve_batch(&origin, &[destination.clone()])[0];

    assert_eq!(resolved, analytic);
}

#[tokio::test]
async fn test_vision_backend_classifies_listing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/classify")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"category": "steel_beam", "confidence": 1.3, "description": "Hot-rolled steel I-beams"}"#,
        )
        .create_async()
        .await;

    let backend: Arc<dyn ClassifierBackend> =
        Arc::new(VisionClient::new(server.url(), "test-key".to_string(), 5));
    let quota = Arc::new(ClassificationQuota::new(5));
    let classifier = MaterialClassifier::new(Some(backend), Arc::clone(&quota));

    let listing = create_listing("l-1", "org-a", MaterialCategory::Rebar, 24.71, 46.67);
    let result = classifier.classify(&listing, false).await.unwrap();

    assert_eq!(result.category, MaterialCategory::SteelBeam);
    // Out-of-range confidence is clamped
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.description, "Hot-rolled steel I-beams");
    assert_eq!(result.version, VISION_VERSION);
    assert_eq!(quota.status().used, 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_vision_unknown_category_degrades_to_heuristic() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/classify")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"category": "unobtainium", "confidence": 0.9}"#)
        .create_async()
        .await;

    let backend: Arc<dyn ClassifierBackend> =
        Arc::new(VisionClient::new(server.url(), "test-key".to_string(), 5));
    let quota = Arc::new(ClassificationQuota::new(5));
    let classifier = MaterialClassifier::new(Some(backend), quota);

    let mut listing = create_listing("l-1", "org-a", MaterialCategory::Concrete, 24.71, 46.67);
    listing.title = "Precast concrete planks".to_string();

    let result = classifier.classify(&listing, false).await.unwrap();

    assert_eq!(result.category, MaterialCategory::Concrete);
    assert_eq!(result.version, "heuristic-v1");
}

#[tokio::test]
async fn test_quota_stops_external_calls_at_maximum() {
    let mut server = mockito::Server::new_async().await;
    // The backend must be hit exactly twice no matter how often we classify
    let mock = server
        .mock("POST", "/classify")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"category": "concrete", "confidence": 0.95, "description": "Concrete"}"#)
        .expect(2)
        .create_async()
        .await;

    let backend: Arc<dyn ClassifierBackend> =
        Arc::new(VisionClient::new(server.url(), "test-key".to_string(), 5));
    let quota = Arc::new(ClassificationQuota::new(2));
    let classifier = MaterialClassifier::new(Some(backend), Arc::clone(&quota));

    let listing = create_listing("l-1", "org-a", MaterialCategory::Concrete, 24.71, 46.67);

    for _ in 0..2 {
        let result = classifier.classify(&listing, false).await.unwrap();
        assert_eq!(result.version, VISION_VERSION);
    }

    // Quota exhausted: heuristic takes over, the backend is never called again
    for _ in 0..3 {
        let result = classifier.classify(&listing, false).await.unwrap();
        assert_eq!(result.version, "heuristic-v1");
    }

    let status = quota.status();
    assert!(status.exhausted);
    assert_eq!(status.used, 2);
    mock.assert_async().await;
}
