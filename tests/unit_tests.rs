// Unit tests for Reloop Algo

use reloop_algo::core::carbon::CarbonEstimator;
use reloop_algo::core::classify::HeuristicClassifier;
use reloop_algo::core::distance::{haversine_distance, DistanceResolver};
use reloop_algo::core::matcher::{MatchEngine, DEFAULT_MIN_SCORE};
use reloop_algo::core::scoring::WeightedScoreStrategy;
use reloop_algo::models::{
    Condition, GeoPoint, Listing, ListingStatus, MaterialCategory, MaterialRequest, Quantity,
    QuantityUnit, RequestStatus, ScoringWeights, Urgency,
};
use std::sync::Arc;

// ~50 km of latitude at any longitude
const LAT_DEGREES_50_KM: f64 = 0.449_66;

fn create_listing(id: &str, org: &str, category: MaterialCategory, lat: f64, lon: f64) -> Listing {
    Listing {
        listing_id: id.to_string(),
        organisation_id: org.to_string(),
        title: format!("Listing {}", id),
        description: None,
        category,
        classification: None,
        quantity: Quantity::new(15.0, QuantityUnit::Tonnes),
        condition: Condition::Unused,
        location: Some(GeoPoint::new(lat, lon)),
        image_url: None,
        status: ListingStatus::Active,
        created_at: None,
    }
}

fn create_request(category: MaterialCategory, urgency: Urgency) -> MaterialRequest {
    MaterialRequest {
        request_id: "r1".to_string(),
        organisation_id: "org-demand".to_string(),
        category,
        quantity: Quantity::new(10.0, QuantityUnit::Tonnes),
        location: GeoPoint::new(24.71, 46.67), // Riyadh
        urgency,
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
fn test_haversine_distance_zero_for_same_point() {
    let distance = haversine_distance(24.71, 46.67, 24.71, 46.67);
    assert!(distance.abs() < 1e-9);
}

#[test]
fn test_haversine_distance_symmetric() {
    // Riyadh to Jeddah and back
    let ab = haversine_distance(24.71, 46.67, 21.49, 39.19);
    let ba = haversine_distance(21.49, 39.19, 24.71, 46.67);
    assert!((ab - ba).abs() < 1e-9);
    assert!(ab > 700.0 && ab < 900.0, "Expected ~800km, got {}", ab);
}

#[tokio::test]
async fn test_resolver_same_point_resolves_to_zero() {
    let resolver = DistanceResolver::haversine_only(50.0);
    let point = GeoPoint::new(24.71, 46.67);

    let estimate = resolver.resolve(&point, &point).await;
    assert_eq!(estimate.distance_km, 0.0);
    assert_eq!(estimate.eta_minutes, 0);
}

#[test]
fn test_composite_scores_within_unit_range() {
    let engine = create_engine();
    let request = create_request(MaterialCategory::Concrete, Urgency::High);

    let candidates: Vec<Listing> = (0..30)
        .map(|i| {
            let mut listing = create_listing(
                &i.to_string(),
                "org-supply",
                MaterialCategory::Concrete,
                24.71 + (i as f64) * 0.03,
                46.67,
            );
            listing.quantity = Quantity::new(1.0 + i as f64, QuantityUnit::Tonnes);
            listing.condition = match i % 3 {
                0 => Condition::Unused,
                1 => Condition::SlightlyUsed,
                _ => Condition::Used,
            };
            listing
        })
        .collect();

    let outcome = engine.find_matches(&request, candidates, &ScoringWeights::default(), 0.0);

    assert!(!outcome.matches.is_empty());
    for m in &outcome.matches {
        assert!(
            m.score >= 0.0 && m.score <= 1.0,
            "score {} out of range",
            m.score
        );
        for factor in [
            m.breakdown.material,
            m.breakdown.quantity_fit,
            m.breakdown.distance,
            m.breakdown.condition,
            m.breakdown.urgency,
        ] {
            assert!(factor >= 0.0 && factor <= 1.0, "factor {} out of range", factor);
        }
    }
}

#[test]
fn test_category_mismatch_never_matched() {
    let engine = create_engine();
    let request = create_request(MaterialCategory::SteelBeam, Urgency::High);

    let candidates = vec![
        create_listing("1", "org-a", MaterialCategory::Concrete, 24.72, 46.68),
        create_listing("2", "org-a", MaterialCategory::SteelBeam, 24.72, 46.68),
        create_listing("3", "org-a", MaterialCategory::Rebar, 24.72, 46.68),
    ];

    let outcome = engine.find_matches(
        &request,
        candidates,
        &ScoringWeights::default(),
        DEFAULT_MIN_SCORE,
    );

    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].listing_id, "2");
}

#[test]
fn test_matches_sorted_descending_and_capped_at_ten() {
    let engine = create_engine();
    let request = create_request(MaterialCategory::Concrete, Urgency::High);

    let candidates: Vec<Listing> = (0..40)
        .map(|i| {
            create_listing(
                &i.to_string(),
                "org-supply",
                MaterialCategory::Concrete,
                24.71 + (i as f64) * 0.01,
                46.67,
            )
        })
        .collect();

    let outcome = engine.find_matches(
        &request,
        candidates,
        &ScoringWeights::default(),
        DEFAULT_MIN_SCORE,
    );

    assert!(outcome.matches.len() <= 10);
    for pair in outcome.matches.windows(2) {
        assert!(pair[0].score >= pair[1].score, "matches not sorted by score");
    }
}

#[test]
fn test_carbon_estimate_never_negative() {
    let estimator = CarbonEstimator::with_default_factors();

    let categories = [
        MaterialCategory::SteelBeam,
        MaterialCategory::Concrete,
        MaterialCategory::Timber,
        MaterialCategory::Aggregate,
    ];
    let units = [
        QuantityUnit::Tonnes,
        QuantityUnit::CubicMeters,
        QuantityUnit::LinearMeters,
        QuantityUnit::Bags,
    ];

    for category in categories {
        for unit in units {
            let mut listing = create_listing("l", "org", category, 24.71, 46.67);
            listing.quantity = Quantity::new(7.5, unit);

            // Savings shrink with transport distance and bottom out at zero
            let mut previous = u64::MAX;
            for distance in [0.0, 50.0, 200.0, 5_000.0] {
                let saved = estimator.estimate(&listing, distance);
                assert!(saved <= previous, "savings increased with distance");
                previous = saved;
            }
        }
    }
}

#[test]
fn test_heuristic_steel_keywords_override_declared_rebar() {
    let classifier = HeuristicClassifier;
    let mut listing = create_listing("l", "org", MaterialCategory::Rebar, 24.71, 46.67);
    listing.title = "I-beam pallet".to_string();
    listing.description = Some("structural steel offcuts and one steel column".to_string());

    let result = classifier.classify(&listing);

    assert_eq!(result.category, MaterialCategory::SteelBeam);
    assert_eq!(result.confidence, 0.85);
}

#[test]
fn test_heuristic_zero_matches_returns_declared_category() {
    let classifier = HeuristicClassifier;
    let mut listing = create_listing("l", "org", MaterialCategory::Rebar, 24.71, 46.67);
    listing.title = "Assorted leftover stock".to_string();
    listing.description = Some("miscellaneous surplus from project closeout".to_string());

    let result = classifier.classify(&listing);

    assert_eq!(result.category, MaterialCategory::Rebar);
    assert_eq!(result.confidence, 0.3);
}

#[test]
fn test_reference_scenario_matches_at_point_87() {
    let engine = create_engine();
    let request = create_request(MaterialCategory::Concrete, Urgency::High);

    // 15 t of unused concrete 50 km due north of the request
    let listing = create_listing(
        "supply-1",
        "org-supply",
        MaterialCategory::Concrete,
        24.71 + LAT_DEGREES_50_KM,
        46.67,
    );

    let outcome = engine.find_matches(
        &request,
        vec![listing],
        &ScoringWeights::default(),
        DEFAULT_MIN_SCORE,
    );

    assert_eq!(outcome.matches.len(), 1);
    let top = &outcome.matches[0];
    assert_eq!(top.distance_km, 50.0);
    assert!((top.breakdown.quantity_fit - 0.6667).abs() < 0.001);
    assert!((top.breakdown.distance - 0.75).abs() < 1e-9);
    assert_eq!(top.breakdown.condition, 1.0);
    assert_eq!(top.breakdown.urgency, 1.0);
    assert_eq!(top.score, 0.87);
}

#[test]
fn test_candidate_beyond_max_radius_excluded() {
    let engine = create_engine();
    let request = create_request(MaterialCategory::Concrete, Urgency::High);

    // ~210 km north; everything else about this listing is ideal
    let listing = create_listing(
        "far",
        "org-supply",
        MaterialCategory::Concrete,
        24.71 + 1.889,
        46.67,
    );

    let outcome = engine.find_matches(
        &request,
        vec![listing],
        &ScoringWeights::default(),
        DEFAULT_MIN_SCORE,
    );

    assert!(outcome.matches.is_empty());
}

#[test]
fn test_weights_constructor_rejects_negative() {
    assert!(ScoringWeights::new(0.4, 0.25, -0.2, 0.1, 0.05).is_err());
    assert!(ScoringWeights::new(0.4, 0.25, 0.2, 0.1, 0.05).is_ok());
}
