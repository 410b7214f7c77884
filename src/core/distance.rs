use crate::models::GeoPoint;
use crate::services::routing::RoutingClient;
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Cache keys use coordinates rounded to 4 decimal places (~11 m precision)
const CACHE_KEY_SCALE: f64 = 10_000.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Best-effort distance and travel time between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEstimate {
    /// Path distance in kilometers, rounded to one decimal place
    pub distance_km: f64,
    /// Travel time in minutes, rounded to the nearest minute
    pub eta_minutes: u32,
}

type PairKey = (i64, i64, i64, i64);

/// Distance resolver with a cheap analytic formula and an optional
/// authoritative routing lookup for single pairs.
///
/// Single-pair results are cached keyed by the coordinate pair rounded to
/// 4 decimal places; the cache is bounded by capacity and TTL. The resolver
/// never fails: any routing error degrades to the haversine estimate.
pub struct DistanceResolver {
    routing: Option<Arc<RoutingClient>>,
    cache: Cache<PairKey, DistanceEstimate>,
    average_speed_kmh: f64,
}

impl DistanceResolver {
    pub fn new(
        routing: Option<Arc<RoutingClient>>,
        cache_capacity: u64,
        cache_ttl_secs: u64,
        average_speed_kmh: f64,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(cache_capacity)
            .time_to_live(Duration::from_secs(cache_ttl_secs))
            .build();

        Self {
            routing,
            cache,
            average_speed_kmh,
        }
    }

    /// Resolver without a routing backend; every lookup is analytic
    pub fn haversine_only(average_speed_kmh: f64) -> Self {
        Self::new(None, 10_000, 3_600, average_speed_kmh)
    }

    /// Resolve a single origin/destination pair.
    ///
    /// Uses the authoritative routing lookup when configured, falling back to
    /// the haversine estimate on any failure. Results are cached.
    pub async fn resolve(&self, origin: &GeoPoint, destination: &GeoPoint) -> DistanceEstimate {
        let key = pair_key(origin, destination);
        if let Some(hit) = self.cache.get(&key) {
            tracing::trace!("distance cache hit");
            return hit;
        }

        let estimate = match &self.routing {
            Some(client) => match client.route(origin, destination).await {
                Ok(route) => DistanceEstimate {
                    distance_km: round_km(route.distance_km),
                    eta_minutes: route.eta_minutes,
                },
                Err(e) => {
                    tracing::warn!("Routing lookup failed, using haversine estimate: {}", e);
                    self.estimate(origin, destination)
                }
            },
            None => self.estimate(origin, destination),
        };

        self.cache.insert(key, estimate);
        estimate
    }

    /// Resolve one origin against many destinations.
    ///
    /// Always analytic: the routing backend is never consulted here so that
    /// scoring a large candidate pool stays cheap and bounded.
    pub fn resolve_batch(
        &self,
        origin: &GeoPoint,
        destinations: &[GeoPoint],
    ) -> Vec<DistanceEstimate> {
        destinations
            .iter()
            .map(|destination| self.estimate(origin, destination))
            .collect()
    }

    fn estimate(&self, origin: &GeoPoint, destination: &GeoPoint) -> DistanceEstimate {
        let raw = haversine_distance(
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude,
        );
        let distance_km = round_km(raw);
        let eta_minutes = (distance_km / self.average_speed_kmh * 60.0).round() as u32;

        DistanceEstimate {
            distance_km,
            eta_minutes,
        }
    }
}

#[inline]
fn round_km(distance_km: f64) -> f64 {
    (distance_km * 10.0).round() / 10.0
}

#[inline]
fn pair_key(origin: &GeoPoint, destination: &GeoPoint) -> PairKey {
    (
        (origin.latitude * CACHE_KEY_SCALE).round() as i64,
        (origin.longitude * CACHE_KEY_SCALE).round() as i64,
        (destination.latitude * CACHE_KEY_SCALE).round() as i64,
        (destination.longitude * CACHE_KEY_SCALE).round() as i64,
    )
}
