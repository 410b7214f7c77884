use crate::core::distance::DistanceEstimate;
use crate::models::{FactorBreakdown, Listing, MaterialRequest, ScoringWeights};

/// Composite score plus the per-factor breakdown behind it
#[derive(Debug, Clone, Copy)]
pub struct ScoredFactors {
    /// Weighted composite in [0, 1], rounded to 2 decimals
    pub composite: f64,
    pub breakdown: FactorBreakdown,
}

/// Pluggable ranking model.
///
/// The engine injects a strategy at construction; swapping the ranking model
/// never changes the engine's filtering and sorting contract.
pub trait ScoreStrategy: Send + Sync {
    fn score(
        &self,
        request: &MaterialRequest,
        listing: &Listing,
        distance_km: f64,
        weights: &ScoringWeights,
    ) -> ScoredFactors;
}

/// Default five-factor weighted strategy
#[derive(Debug, Clone, Copy)]
pub struct WeightedScoreStrategy {
    optimal_distance_km: f64,
    max_distance_km: f64,
}

impl WeightedScoreStrategy {
    pub fn new(optimal_distance_km: f64, max_distance_km: f64) -> Self {
        Self {
            optimal_distance_km,
            max_distance_km,
        }
    }
}

impl Default for WeightedScoreStrategy {
    fn default() -> Self {
        Self::new(100.0, 200.0)
    }
}

impl ScoreStrategy for WeightedScoreStrategy {
    fn score(
        &self,
        request: &MaterialRequest,
        listing: &Listing,
        distance_km: f64,
        weights: &ScoringWeights,
    ) -> ScoredFactors {
        // The category gate already guarantees a match; the factor stays in
        // the breakdown for transparency and future fuzzy matching.
        let material = if listing.effective_category() == request.category {
            1.0
        } else {
            0.0
        };

        let quantity_fit = quantity_fit_score(request.quantity.value, listing.quantity.value);
        let distance = distance_score(distance_km, self.optimal_distance_km, self.max_distance_km);
        let condition = listing.condition.factor();
        let urgency = request.urgency.factor();

        let weighted = material * weights.material
            + quantity_fit * weights.quantity
            + distance * weights.distance
            + condition * weights.condition
            + urgency * weights.urgency;

        let composite = round_score(weighted.min(1.0));

        ScoredFactors {
            composite,
            breakdown: FactorBreakdown {
                material,
                quantity_fit,
                distance,
                condition,
                urgency,
            },
        }
    }
}

/// Quantity fit (0-1)
///
/// Abundant supply is floored at 0.5 so over-supply is not over-penalized;
/// under-supply scores its coverage fraction.
#[inline]
pub fn quantity_fit_score(requested: f64, offered: f64) -> f64 {
    if !(requested > 0.0) || !(offered > 0.0) {
        return 0.0;
    }

    if offered >= requested {
        (requested / offered).max(0.5)
    } else {
        offered / requested
    }
}

/// Distance score (0-1), piecewise-linear decay
///
/// 1.0 at 0 km, 0.5 at the optimal threshold, 0.0 at the maximum radius.
#[inline]
pub fn distance_score(distance_km: f64, optimal_km: f64, max_km: f64) -> f64 {
    if distance_km <= 0.0 {
        return 1.0;
    }
    if distance_km >= max_km {
        return 0.0;
    }

    if distance_km <= optimal_km {
        1.0 - 0.5 * distance_km / optimal_km
    } else {
        0.5 * (1.0 - (distance_km - optimal_km) / (max_km - optimal_km))
    }
}

/// Round a composite score to 2 decimals
#[inline]
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Assemble the human-readable rationale for one retained candidate
pub fn build_reasons(
    request: &MaterialRequest,
    listing: &Listing,
    estimate: &DistanceEstimate,
    breakdown: &FactorBreakdown,
) -> Vec<String> {
    let mut reasons = Vec::with_capacity(6);

    reasons.push(format!(
        "Material matches the requested category ({})",
        request.category.label()
    ));

    if listing.quantity.value >= request.quantity.value {
        reasons.push("Supply covers the full requested quantity".to_string());
    } else {
        reasons.push(format!(
            "Supply covers about {:.0}% of the requested quantity",
            breakdown.quantity_fit * 100.0
        ));
    }

    reasons.push(format!(
        "{} km away, roughly {} min by road",
        estimate.distance_km, estimate.eta_minutes
    ));

    reasons.push(format!("Condition: {}", listing.condition.label()));
    reasons.push(format!("Request urgency is {}", request.urgency.label()));

    if let Some(classification) = &listing.classification {
        reasons.push(format!(
            "Auto-classified as {} (confidence {:.2})",
            classification.description, classification.confidence
        ));
    }

    reasons
}
