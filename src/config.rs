use crate::core::carbon::CarbonFactors;
use crate::models::{ScoringWeights, WeightsError};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub appwrite: AppwriteSettings,
    pub collection: CollectionSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub routing: RoutingSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub carbon: CarbonFactors,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub listings: String,
    pub requests: String,
    pub decision_events: String,
}

/// Bounds for the single-pair distance cache
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_distance_cache_capacity")]
    pub distance_capacity: u64,
    #[serde(default = "default_distance_cache_ttl_secs")]
    pub distance_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            distance_capacity: default_distance_cache_capacity(),
            distance_ttl_secs: default_distance_cache_ttl_secs(),
        }
    }
}

fn default_distance_cache_capacity() -> u64 {
    10_000
}

fn default_distance_cache_ttl_secs() -> u64 {
    3_600
}

/// Authoritative routing lookup; disabled unless an endpoint is configured
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_routing_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_average_speed_kmh")]
    pub average_speed_kmh: f64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_routing_timeout_secs(),
            average_speed_kmh: default_average_speed_kmh(),
        }
    }
}

fn default_routing_timeout_secs() -> u64 {
    5
}

fn default_average_speed_kmh() -> f64 {
    50.0
}

/// External classifier backend; disabled unless an endpoint is configured
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_quota_max")]
    pub quota_max: u32,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_classifier_timeout_secs(),
            quota_max: default_quota_max(),
        }
    }
}

fn default_classifier_timeout_secs() -> u64 {
    10
}

fn default_quota_max() -> u32 {
    25
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
    #[serde(default = "default_optimal_radius_km")]
    pub optimal_radius_km: f64,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_radius_km: default_max_radius_km(),
            optimal_radius_km: default_optimal_radius_km(),
            min_score: default_min_score(),
            max_results: default_max_results(),
        }
    }
}

fn default_max_radius_km() -> f64 {
    200.0
}

fn default_optimal_radius_km() -> f64 {
    100.0
}

fn default_min_score() -> f64 {
    0.3
}

fn default_max_results() -> usize {
    10
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_material_weight")]
    pub material: f64,
    #[serde(default = "default_quantity_weight")]
    pub quantity: f64,
    #[serde(default = "default_distance_weight")]
    pub distance: f64,
    #[serde(default = "default_condition_weight")]
    pub condition: f64,
    #[serde(default = "default_urgency_weight")]
    pub urgency: f64,
}

impl WeightsConfig {
    /// Build validated weights; fails fast on negative or non-finite values
    pub fn to_weights(&self) -> Result<ScoringWeights, WeightsError> {
        ScoringWeights::new(
            self.material,
            self.quantity,
            self.distance,
            self.condition,
            self.urgency,
        )
    }
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            material: default_material_weight(),
            quantity: default_quantity_weight(),
            distance: default_distance_weight(),
            condition: default_condition_weight(),
            urgency: default_urgency_weight(),
        }
    }
}

fn default_material_weight() -> f64 {
    0.40
}
fn default_quantity_weight() -> f64 {
    0.25
}
fn default_distance_weight() -> f64 {
    0.20
}
fn default_condition_weight() -> f64 {
    0.10
}
fn default_urgency_weight() -> f64 {
    0.05
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with RELOOP_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with RELOOP_)
            // e.g., RELOOP_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RELOOP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("RELOOP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply credential overrides from the environment
///
/// Secrets are commonly injected as plain variables rather than through the
/// RELOOP__ hierarchy, so the common ones are mapped explicitly.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("appwrite.endpoint", env::var("RELOOP_APPWRITE__ENDPOINT").ok()),
        ("appwrite.api_key", env::var("RELOOP_APPWRITE__API_KEY").ok()),
        (
            "appwrite.project_id",
            env::var("RELOOP_APPWRITE__PROJECT_ID").ok(),
        ),
        (
            "appwrite.database_id",
            env::var("RELOOP_APPWRITE__DATABASE_ID").ok(),
        ),
        ("routing.api_key", env::var("RELOOP_ROUTING__API_KEY").ok()),
        (
            "classifier.api_key",
            env::var("RELOOP_CLASSIFIER__API_KEY").ok(),
        ),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (key, value) in overrides {
        if let Some(value) = value {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
