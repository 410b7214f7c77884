use crate::core::classify::{ClassifierBackend, ClassifierError, ClassifierInput};
use crate::models::{ClassificationResult, MaterialCategory};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Version tag attached to results from the vision backend
pub const VISION_VERSION: &str = "vision-v1";

#[derive(Debug, Serialize)]
struct VisionRequest<'a> {
    title: &'a str,
    description: Option<&'a str>,
    #[serde(rename = "imageUrl")]
    image_url: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct VisionPayload {
    category: String,
    confidence: f64,
    #[serde(default)]
    description: Option<String>,
}

/// Client for the premium multimodal classifier.
///
/// All calls to the external classifier go through this client; the result
/// must name one of the fixed category labels or it is rejected.
pub struct VisionClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl VisionClient {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Self {
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
}

#[async_trait]
impl ClassifierBackend for VisionClient {
    async fn classify(
        &self,
        input: &ClassifierInput,
    ) -> Result<ClassificationResult, ClassifierError> {
        let url = format!("{}/classify", self.base_url.trim_end_matches('/'));

        let body = VisionRequest {
            title: &input.title,
            description: input.description.as_deref(),
            image_url: input.image_url.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifierError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifierError::Backend(format!(
                "Classifier returned {}",
                response.status()
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ClassifierError::Backend(e.to_string()))?;
        let payload: VisionPayload = serde_json::from_value(json)
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        let category: MaterialCategory =
            serde_json::from_value(Value::String(payload.category.clone()))
                .map_err(|_| ClassifierError::UnknownCategory(payload.category.clone()))?;

        let confidence = if payload.confidence.is_finite() {
            payload.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Ok(ClassificationResult {
            category,
            confidence,
            description: payload
                .description
                .unwrap_or_else(|| category.label().to_string()),
            version: VISION_VERSION.to_string(),
        })
    }

    fn version(&self) -> &str {
        VISION_VERSION
    }
}
