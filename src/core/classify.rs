use crate::models::{ClassificationResult, Listing, MaterialCategory, QuotaStatus};
use crate::services::quota::ClassificationQuota;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Version tag attached to heuristic results
pub const HEURISTIC_VERSION: &str = "heuristic-v1";

/// Errors surfaced by a classification backend
///
/// All of these degrade to the heuristic path; none propagate to callers.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("backend request failed: {0}")]
    Backend(String),

    #[error("backend returned unknown category label: {0}")]
    UnknownCategory(String),

    #[error("backend returned malformed payload: {0}")]
    InvalidResponse(String),
}

/// Listing fields handed to a classification backend
#[derive(Debug, Clone)]
pub struct ClassifierInput {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<&Listing> for ClassifierInput {
    fn from(listing: &Listing) -> Self {
        Self {
            title: listing.title.clone(),
            description: listing.description.clone(),
            image_url: listing.image_url.clone(),
        }
    }
}

/// Pluggable classification backend.
///
/// Implementations must return one of the fixed category labels and a
/// confidence already clamped to [0, 1].
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    async fn classify(&self, input: &ClassifierInput)
        -> Result<ClassificationResult, ClassifierError>;

    /// Version tag recorded on results this backend produces
    fn version(&self) -> &str;
}

/// Keywords per category; phrase weight is its word count, rewarding
/// specificity when phrases overlap across categories.
fn keywords(category: MaterialCategory) -> &'static [&'static str] {
    match category {
        MaterialCategory::SteelBeam => &[
            "structural steel",
            "steel beam",
            "steel column",
            "i-beam",
            "h-beam",
            "girder",
            "universal beam",
        ],
        MaterialCategory::Rebar => &[
            "rebar",
            "reinforcement bar",
            "reinforcing bar",
            "deformed bar",
            "steel mesh",
        ],
        MaterialCategory::Concrete => &["concrete", "cement", "ready mix", "precast", "screed"],
        MaterialCategory::Brick => &[
            "brick",
            "masonry",
            "cinder block",
            "clay block",
            "breeze block",
        ],
        MaterialCategory::Timber => &[
            "timber",
            "plywood",
            "lumber",
            "joist",
            "chipboard",
            "wooden",
        ],
        MaterialCategory::Insulation => &[
            "insulation",
            "rock wool",
            "mineral wool",
            "glass wool",
            "foam board",
        ],
        MaterialCategory::Glass => &[
            "glass",
            "glazing",
            "window pane",
            "double glazed",
            "float glass",
        ],
        MaterialCategory::Piping => &["pipe", "piping", "pvc", "conduit", "ducting"],
        MaterialCategory::Tiles => &["tile", "ceramic", "porcelain", "marble slab", "granite slab"],
        MaterialCategory::Aggregate => &[
            "aggregate",
            "gravel",
            "crushed stone",
            "ballast",
            "coarse sand",
        ],
    }
}

/// Offline keyword classifier, always available.
///
/// Scores each category by the summed word counts of its keywords found in
/// the lower-cased title+description; ties resolve to the category declared
/// first in `MaterialCategory::ALL`. Confidence is banded by the number of
/// distinct matched keywords and never reaches 1.0, which is reserved for
/// premium backend results.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn classify(&self, listing: &Listing) -> ClassificationResult {
        let text = match &listing.description {
            Some(description) => format!("{} {}", listing.title, description),
            None => listing.title.clone(),
        }
        .to_lowercase();

        let mut winner: Option<(MaterialCategory, usize, usize)> = None;

        for category in MaterialCategory::ALL {
            let mut score = 0usize;
            let mut distinct = 0usize;
            for keyword in keywords(category) {
                if text.contains(keyword) {
                    score += keyword.split_whitespace().count();
                    distinct += 1;
                }
            }

            // Strictly greater keeps the earlier category on equal scores
            if score > 0 && winner.map_or(true, |(_, best, _)| score > best) {
                winner = Some((category, score, distinct));
            }
        }

        match winner {
            Some((category, _, distinct)) => {
                let mut confidence: f64 = match distinct {
                    1 => 0.5,
                    2 => 0.7,
                    _ => 0.85,
                };
                if category == listing.category {
                    confidence = (confidence + 0.1).min(0.9);
                }

                ClassificationResult {
                    category,
                    confidence,
                    description: category.label().to_string(),
                    version: HEURISTIC_VERSION.to_string(),
                }
            }
            // No keyword evidence; fall back to the declared category
            None => ClassificationResult {
                category: listing.category,
                confidence: 0.3,
                description: listing.category.label().to_string(),
                version: HEURISTIC_VERSION.to_string(),
            },
        }
    }
}

/// Classification orchestrator.
///
/// Prefers the external backend while quota remains, degrades to the
/// heuristic on exhaustion or backend failure, and is a no-op for listings
/// that already carry a classification unless re-classification is forced.
pub struct MaterialClassifier {
    heuristic: HeuristicClassifier,
    backend: Option<Arc<dyn ClassifierBackend>>,
    quota: Arc<ClassificationQuota>,
}

impl MaterialClassifier {
    pub fn new(
        backend: Option<Arc<dyn ClassifierBackend>>,
        quota: Arc<ClassificationQuota>,
    ) -> Self {
        Self {
            heuristic: HeuristicClassifier,
            backend,
            quota,
        }
    }

    /// Classify a listing, returning `None` when there is nothing to do.
    ///
    /// A failed external call still consumes quota: the budget bounds calls
    /// made to the premium backend, and a failed attempt is still a call.
    pub async fn classify(&self, listing: &Listing, force: bool) -> Option<ClassificationResult> {
        if listing.classification.is_some() && !force {
            tracing::debug!(
                "Listing {} already classified, skipping",
                listing.listing_id
            );
            return None;
        }

        if let Some(backend) = &self.backend {
            if self.quota.try_acquire() {
                match backend.classify(&ClassifierInput::from(listing)).await {
                    Ok(result) => {
                        tracing::debug!(
                            "Listing {} classified as {} by {}",
                            listing.listing_id,
                            result.category.as_str(),
                            result.version
                        );
                        return Some(result);
                    }
                    Err(e) => {
                        tracing::warn!(
                            "External classification failed for listing {}, using heuristic: {}",
                            listing.listing_id,
                            e
                        );
                    }
                }
            } else {
                tracing::debug!("Classification quota exhausted, using heuristic");
            }
        }

        Some(self.heuristic.classify(listing))
    }

    pub fn quota_status(&self) -> QuotaStatus {
        self.quota.status()
    }
}
