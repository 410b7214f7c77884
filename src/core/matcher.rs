use crate::core::carbon::CarbonEstimator;
use crate::core::distance::DistanceResolver;
use crate::core::scoring::{build_reasons, ScoreStrategy};
use crate::models::{GeoPoint, Listing, MatchResult, MaterialRequest, ScoringWeights};
use std::sync::Arc;

/// Default score threshold below which candidates are discarded
pub const DEFAULT_MIN_SCORE: f64 = 0.3;

/// Result of one match query
#[derive(Debug)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Eligibility gate (status, organisation, effective category, usable
///    location and quantity)
/// 2. Batch distance resolution (analytic only) and radius cut
/// 3. Strategy scoring and minimum-score filter
/// 4. Carbon estimate + reasoning, ranking, result cap
#[derive(Clone)]
pub struct MatchEngine {
    resolver: Arc<DistanceResolver>,
    carbon: Arc<CarbonEstimator>,
    strategy: Arc<dyn ScoreStrategy>,
    max_radius_km: f64,
    max_results: usize,
}

impl MatchEngine {
    pub fn new(
        resolver: Arc<DistanceResolver>,
        carbon: Arc<CarbonEstimator>,
        strategy: Arc<dyn ScoreStrategy>,
        max_radius_km: f64,
        max_results: usize,
    ) -> Self {
        Self {
            resolver,
            carbon,
            strategy,
            max_radius_km,
            max_results,
        }
    }

    /// Find the best listings for a request from the active candidate pool.
    ///
    /// Material category is the only binary gate; everything else is
    /// weighted. Malformed candidates are excluded, never a query failure,
    /// and an empty pool yields an empty result.
    pub fn find_matches(
        &self,
        request: &MaterialRequest,
        candidates: Vec<Listing>,
        weights: &ScoringWeights,
        min_score: f64,
    ) -> MatchOutcome {
        let total_candidates = candidates.len();

        let eligible: Vec<(Listing, GeoPoint)> = candidates
            .into_iter()
            .filter(|listing| listing.is_active())
            .filter(|listing| listing.organisation_id != request.organisation_id)
            .filter(|listing| listing.effective_category() == request.category)
            .filter(|listing| {
                listing.quantity.value.is_finite() && listing.quantity.value > 0.0
            })
            .filter_map(|listing| match listing.location.clone() {
                Some(location) => Some((listing, location)),
                None => {
                    tracing::debug!(
                        "Excluding listing {} without a location",
                        listing.listing_id
                    );
                    None
                }
            })
            .collect();

        let destinations: Vec<GeoPoint> =
            eligible.iter().map(|(_, location)| location.clone()).collect();
        let estimates = self.resolver.resolve_batch(&request.location, &destinations);

        let mut matches: Vec<MatchResult> = eligible
            .into_iter()
            .zip(estimates)
            .filter_map(|((listing, _), estimate)| {
                if estimate.distance_km > self.max_radius_km {
                    return None;
                }

                let scored =
                    self.strategy
                        .score(request, &listing, estimate.distance_km, weights);
                if scored.composite < min_score {
                    return None;
                }

                let co2_saved_kg = self.carbon.estimate(&listing, estimate.distance_km);
                let reasons = build_reasons(request, &listing, &estimate, &scored.breakdown);

                Some(MatchResult {
                    request_id: request.request_id.clone(),
                    listing_id: listing.listing_id,
                    score: scored.composite,
                    distance_km: estimate.distance_km,
                    co2_saved_kg,
                    reasons,
                    breakdown: scored.breakdown,
                })
            })
            .collect();

        // Sort by score (descending) and then by distance (ascending)
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        matches.truncate(self.max_results);

        MatchOutcome {
            matches,
            total_candidates,
        }
    }
}
