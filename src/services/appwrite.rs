use crate::models::{ClassificationResult, DecisionEvent, Listing, MaterialRequest};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Appwrite API client
///
/// Thin CRUD façade over the marketplace document store:
/// - Fetching requests and listings
/// - Querying the active-listing candidate pool
/// - Persisting classification fields onto listings
/// - Recording match decisions for the analytics pipeline
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub listings: String,
    pub requests: String,
    pub decision_events: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        }
    }

    fn document_url(&self, collection: &str, document_id: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents/{}",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection,
            document_id
        )
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    /// Fetch a material request by document ID
    pub async fn get_request(&self, request_id: &str) -> Result<MaterialRequest, AppwriteError> {
        let url = self.document_url(&self.collections.requests, request_id);

        tracing::debug!("Fetching request from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppwriteError::NotFound(format!(
                "Request {} not found",
                request_id
            )));
        }
        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to fetch request: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let data = json.get("data").unwrap_or(&json);

        serde_json::from_value(data.clone()).map_err(|e| {
            AppwriteError::InvalidResponse(format!("Failed to parse request: {}", e))
        })
    }

    /// Fetch a listing by document ID
    pub async fn get_listing(&self, listing_id: &str) -> Result<Listing, AppwriteError> {
        let url = self.document_url(&self.collections.listings, listing_id);

        tracing::debug!("Fetching listing from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppwriteError::NotFound(format!(
                "Listing {} not found",
                listing_id
            )));
        }
        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to fetch listing: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let data = json.get("data").unwrap_or(&json);

        serde_json::from_value(data.clone()).map_err(|e| {
            AppwriteError::InvalidResponse(format!("Failed to parse listing: {}", e))
        })
    }

    /// Query the full active-listing candidate pool
    ///
    /// Malformed documents are skipped so one bad record never takes down a
    /// match query.
    pub async fn query_active_listings(&self) -> Result<Vec<Listing>, AppwriteError> {
        let queries = vec![r#"equal("status", "active")"#.to_string()];
        let queries_json = serde_json::to_string(&queries)
            .map_err(|e| AppwriteError::InvalidResponse(e.to_string()))?;
        let encoded_queries = urlencoding::encode(&queries_json);

        let url = format!(
            "{}?query={}",
            self.collection_url(&self.collections.listings),
            encoded_queries
        );

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to query listings: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        let listings: Vec<Listing> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value(data.clone()).ok()
            })
            .collect();

        tracing::debug!("Queried {} active listings (total: {})", listings.len(), total);

        Ok(listings)
    }

    /// Persist classification fields onto a listing document
    pub async fn update_listing_classification(
        &self,
        listing_id: &str,
        classification: &ClassificationResult,
    ) -> Result<(), AppwriteError> {
        let url = self.document_url(&self.collections.listings, listing_id);

        let payload = serde_json::json!({
            "data": {
                "classification": classification,
            }
        });

        let response = self
            .client
            .patch(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to update listing classification: {}",
                response.status()
            )));
        }

        tracing::debug!(
            "Stored {} classification on listing {}",
            classification.version,
            listing_id
        );

        Ok(())
    }

    /// Record an accept/reject decision for the analytics pipeline
    pub async fn record_decision(&self, event: &DecisionEvent) -> Result<(), AppwriteError> {
        let url = self.collection_url(&self.collections.decision_events);

        let mut payload = serde_json::to_value(event)
            .map_err(|e| AppwriteError::InvalidResponse(e.to_string()))?;
        // Add Appwrite-specific fields
        if let Some(obj) = payload.as_object_mut() {
            obj.insert(
                "$id".to_string(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }

        let response = self
            .client
            .post(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to record decision: {}",
                response.status()
            )));
        }

        tracing::debug!(
            "Recorded decision: {} -> {} ({:?})",
            event.request_id,
            event.listing_id,
            event.decision
        );

        Ok(())
    }
}
