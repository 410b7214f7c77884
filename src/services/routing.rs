use crate::models::GeoPoint;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors from the authoritative routing lookup
///
/// The distance resolver converts all of these into a haversine fallback.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Route summary in the resolver's units
#[derive(Debug, Clone, Copy)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub eta_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct RoutePayload {
    #[serde(rename = "distanceMeters")]
    distance_meters: f64,
    #[serde(rename = "durationSeconds")]
    duration_seconds: f64,
}

/// Client for the external routing provider
///
/// Used only for single-pair lookups; batch scoring stays analytic.
pub struct RoutingClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl RoutingClient {
    pub fn new(base_url: String, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Look up the driving route between two points
    pub async fn route(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
    ) -> Result<RouteSummary, RoutingError> {
        let url = format!(
            "{}/route?origin={},{}&destination={},{}",
            self.base_url.trim_end_matches('/'),
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude
        );

        tracing::debug!("Routing lookup: {}", url);

        let mut request = self.client.get(&url);
        if let Some(api_key) = &self.api_key {
            request = request.header("X-Api-Key", api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(RoutingError::ApiError(format!(
                "Route lookup failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let payload: RoutePayload = serde_json::from_value(json)
            .map_err(|e| RoutingError::InvalidResponse(format!("Failed to parse route: {}", e)))?;

        if !payload.distance_meters.is_finite()
            || payload.distance_meters < 0.0
            || !payload.duration_seconds.is_finite()
            || payload.duration_seconds < 0.0
        {
            return Err(RoutingError::InvalidResponse(format!(
                "Route values out of range: {} m, {} s",
                payload.distance_meters, payload.duration_seconds
            )));
        }

        Ok(RouteSummary {
            distance_km: payload.distance_meters / 1000.0,
            eta_minutes: (payload.duration_seconds / 60.0).round() as u32,
        })
    }
}
