use crate::models::{Listing, MaterialCategory, Quantity, QuantityUnit};
use serde::Deserialize;
use std::collections::HashMap;

/// Calibration constants for the carbon impact estimate.
///
/// Everything here is configuration so the figures can be recalibrated
/// without a code change. Values are indicative, not audited.
#[derive(Debug, Clone, Deserialize)]
pub struct CarbonFactors {
    /// Fraction of new-production carbon avoided by reuse
    #[serde(default = "default_reuse_savings_factor")]
    pub reuse_savings_factor: f64,
    /// Transport emissions in kg CO2 per tonne-kilometer
    #[serde(default = "default_transport_kg_per_tonne_km")]
    pub transport_kg_per_tonne_km: f64,
    /// Embodied carbon per tonne of new material, kg CO2 per tonne.
    /// Negative values mark carbon-sequestering materials; the savings
    /// calculation uses the absolute value.
    #[serde(default = "default_embodied_kg_per_tonne")]
    pub embodied_kg_per_tonne: HashMap<MaterialCategory, f64>,
    /// Density for volumetric quantities, tonnes per cubic meter
    #[serde(default = "default_density_tonnes_per_m3")]
    pub density_tonnes_per_m3: HashMap<MaterialCategory, f64>,
    /// Average linear mass for linear quantities, tonnes per meter
    #[serde(default = "default_linear_mass_tonnes_per_m")]
    pub linear_mass_tonnes_per_m: HashMap<MaterialCategory, f64>,
    /// Fixed bag mass, tonnes per bag
    #[serde(default = "default_bag_mass_tonnes")]
    pub bag_mass_tonnes: HashMap<MaterialCategory, f64>,
}

impl Default for CarbonFactors {
    fn default() -> Self {
        Self {
            reuse_savings_factor: default_reuse_savings_factor(),
            transport_kg_per_tonne_km: default_transport_kg_per_tonne_km(),
            embodied_kg_per_tonne: default_embodied_kg_per_tonne(),
            density_tonnes_per_m3: default_density_tonnes_per_m3(),
            linear_mass_tonnes_per_m: default_linear_mass_tonnes_per_m(),
            bag_mass_tonnes: default_bag_mass_tonnes(),
        }
    }
}

fn default_reuse_savings_factor() -> f64 {
    0.85
}

fn default_transport_kg_per_tonne_km() -> f64 {
    0.12
}

fn table(entries: &[(MaterialCategory, f64)]) -> HashMap<MaterialCategory, f64> {
    entries.iter().copied().collect()
}

fn default_embodied_kg_per_tonne() -> HashMap<MaterialCategory, f64> {
    table(&[
        (MaterialCategory::SteelBeam, 1730.0),
        (MaterialCategory::Rebar, 1990.0),
        (MaterialCategory::Concrete, 150.0),
        (MaterialCategory::Brick, 240.0),
        // Timber sequesters carbon over its growth; stored as negative
        (MaterialCategory::Timber, -1600.0),
        (MaterialCategory::Insulation, 1860.0),
        (MaterialCategory::Glass, 1440.0),
        (MaterialCategory::Piping, 2500.0),
        (MaterialCategory::Tiles, 780.0),
        (MaterialCategory::Aggregate, 8.0),
    ])
}

fn default_density_tonnes_per_m3() -> HashMap<MaterialCategory, f64> {
    table(&[
        (MaterialCategory::SteelBeam, 7.85),
        (MaterialCategory::Rebar, 7.85),
        (MaterialCategory::Concrete, 2.4),
        (MaterialCategory::Brick, 1.9),
        (MaterialCategory::Timber, 0.55),
        (MaterialCategory::Insulation, 0.05),
        (MaterialCategory::Glass, 2.5),
        (MaterialCategory::Piping, 1.4),
        (MaterialCategory::Tiles, 2.0),
        (MaterialCategory::Aggregate, 1.6),
    ])
}

fn default_linear_mass_tonnes_per_m() -> HashMap<MaterialCategory, f64> {
    table(&[
        (MaterialCategory::SteelBeam, 0.045),
        (MaterialCategory::Rebar, 0.002),
        (MaterialCategory::Concrete, 0.25),
        (MaterialCategory::Brick, 0.05),
        (MaterialCategory::Timber, 0.004),
        (MaterialCategory::Insulation, 0.001),
        (MaterialCategory::Glass, 0.02),
        (MaterialCategory::Piping, 0.006),
        (MaterialCategory::Tiles, 0.01),
        (MaterialCategory::Aggregate, 0.1),
    ])
}

fn default_bag_mass_tonnes() -> HashMap<MaterialCategory, f64> {
    table(&[
        (MaterialCategory::SteelBeam, 0.025),
        (MaterialCategory::Rebar, 0.025),
        (MaterialCategory::Concrete, 0.05),
        (MaterialCategory::Brick, 0.025),
        (MaterialCategory::Timber, 0.02),
        (MaterialCategory::Insulation, 0.01),
        (MaterialCategory::Glass, 0.025),
        (MaterialCategory::Piping, 0.02),
        (MaterialCategory::Tiles, 0.03),
        (MaterialCategory::Aggregate, 0.025),
    ])
}

/// Converts a listing's quantity and transport distance into a net
/// CO2-savings figure in whole kilograms.
///
/// The result is a presentation estimate, never negative. Missing table
/// entries contribute zero rather than failing the query.
#[derive(Debug, Clone)]
pub struct CarbonEstimator {
    factors: CarbonFactors,
}

impl CarbonEstimator {
    pub fn new(factors: CarbonFactors) -> Self {
        Self { factors }
    }

    pub fn with_default_factors() -> Self {
        Self::new(CarbonFactors::default())
    }

    /// Estimate net CO2 saved by reusing the listed material, in kg.
    ///
    /// Embodied-carbon savings scaled by the reuse factor, minus transport
    /// emissions over `distance_km`, floored at zero and rounded to the
    /// nearest integer kilogram.
    pub fn estimate(&self, listing: &Listing, distance_km: f64) -> u64 {
        let category = listing.effective_category();
        let tonnes = self.tonnes(listing.quantity, category);
        if tonnes <= 0.0 {
            return 0;
        }

        let embodied = self
            .factors
            .embodied_kg_per_tonne
            .get(&category)
            .copied()
            .unwrap_or(0.0)
            .abs();

        let gross = tonnes * embodied * self.factors.reuse_savings_factor;
        let transport = tonnes * distance_km.max(0.0) * self.factors.transport_kg_per_tonne_km;

        (gross - transport).max(0.0).round() as u64
    }

    /// Convert a declared quantity to tonnes using the material tables
    fn tonnes(&self, quantity: Quantity, category: MaterialCategory) -> f64 {
        if !quantity.value.is_finite() || quantity.value <= 0.0 {
            return 0.0;
        }

        let per_unit = match quantity.unit {
            QuantityUnit::Tonnes => 1.0,
            QuantityUnit::CubicMeters => self
                .factors
                .density_tonnes_per_m3
                .get(&category)
                .copied()
                .unwrap_or(0.0),
            QuantityUnit::LinearMeters => self
                .factors
                .linear_mass_tonnes_per_m
                .get(&category)
                .copied()
                .unwrap_or(0.0),
            QuantityUnit::Bags => self
                .factors
                .bag_mass_tonnes
                .get(&category)
                .copied()
                .unwrap_or(0.0),
        };

        quantity.value * per_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, GeoPoint, ListingStatus};

    fn listing(category: MaterialCategory, value: f64, unit: QuantityUnit) -> Listing {
        Listing {
            listing_id: "l1".to_string(),
            organisation_id: "org1".to_string(),
            title: "Surplus material".to_string(),
            description: None,
            category,
            classification: None,
            quantity: Quantity::new(value, unit),
            condition: Condition::Unused,
            location: Some(GeoPoint::new(24.71, 46.67)),
            image_url: None,
            status: ListingStatus::Active,
            created_at: None,
        }
    }

    #[test]
    fn test_estimate_concrete_tonnes() {
        let estimator = CarbonEstimator::with_default_factors();
        let listing = listing(MaterialCategory::Concrete, 10.0, QuantityUnit::Tonnes);

        // 10 t * 150 kg/t * 0.85 = 1275 kg gross, minus 10 t * 50 km * 0.12 = 60 kg
        let saved = estimator.estimate(&listing, 50.0);
        assert_eq!(saved, 1215);
    }

    #[test]
    fn test_estimate_never_negative() {
        let estimator = CarbonEstimator::with_default_factors();
        // Aggregate carries almost no embodied carbon; a long haul would
        // otherwise push the figure below zero.
        let listing = listing(MaterialCategory::Aggregate, 10.0, QuantityUnit::Tonnes);

        let saved = estimator.estimate(&listing, 500.0);
        assert_eq!(saved, 0);
    }

    #[test]
    fn test_sequestering_material_uses_absolute_value() {
        let estimator = CarbonEstimator::with_default_factors();
        let listing = listing(MaterialCategory::Timber, 10.0, QuantityUnit::Tonnes);

        // |−1600| * 10 * 0.85 = 13600 kg at zero distance
        let saved = estimator.estimate(&listing, 0.0);
        assert_eq!(saved, 13_600);
    }

    #[test]
    fn test_volumetric_conversion() {
        let estimator = CarbonEstimator::with_default_factors();
        let listing = listing(MaterialCategory::Concrete, 5.0, QuantityUnit::CubicMeters);

        // 5 m3 * 2.4 t/m3 = 12 t; 12 * 150 * 0.85 = 1530 kg
        let saved = estimator.estimate(&listing, 0.0);
        assert_eq!(saved, 1530);
    }

    #[test]
    fn test_bag_conversion() {
        let estimator = CarbonEstimator::with_default_factors();
        let listing = listing(MaterialCategory::Concrete, 40.0, QuantityUnit::Bags);

        // 40 bags * 0.05 t = 2 t; 2 * 150 * 0.85 = 255 kg
        let saved = estimator.estimate(&listing, 0.0);
        assert_eq!(saved, 255);
    }

    #[test]
    fn test_invalid_quantity_yields_zero() {
        let estimator = CarbonEstimator::with_default_factors();
        let listing = listing(MaterialCategory::Concrete, -3.0, QuantityUnit::Tonnes);

        assert_eq!(estimator.estimate(&listing, 10.0), 0);
    }

    #[test]
    fn test_classified_category_drives_conversion() {
        let estimator = CarbonEstimator::with_default_factors();
        let mut listing = listing(MaterialCategory::Aggregate, 10.0, QuantityUnit::Tonnes);
        listing.classification = Some(crate::models::ClassificationResult {
            category: MaterialCategory::SteelBeam,
            confidence: 0.85,
            description: MaterialCategory::SteelBeam.label().to_string(),
            version: "heuristic-v1".to_string(),
        });

        // Effective category is steel_beam: 10 * 1730 * 0.85 = 14705 kg
        let saved = estimator.estimate(&listing, 0.0);
        assert_eq!(saved, 14_705);
    }
}
