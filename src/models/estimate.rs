//! Reconciled estimate model
//!
//! The only externally visible artifact of a reconciliation request.

use serde::{Deserialize, Serialize};

use super::Macros;

/// Hard per-serving calorie ceiling
pub const KCAL_CEILING: i64 = 2000;

/// Final reconciled calorie/macro estimate for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledEstimate {
    /// Finite positive integer, never above [`KCAL_CEILING`]
    pub calories: i64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    /// Human-readable qualifier, e.g. "±10%" or "±10% (typical scoop)"
    pub confidence_range: String,
    /// Which source won: natural_language_api, product_database, model_fallback
    pub source: String,
    /// RFC 3339 timestamp of when the estimate was produced
    pub estimated_at: String,
}

impl ReconciledEstimate {
    /// Assemble a final estimate, enforcing the output invariants:
    /// calories in [1, ceiling], macros finite, non-negative, one decimal.
    pub fn assemble(
        calories: i64,
        macros: Macros,
        confidence_range: String,
        source: &'static str,
    ) -> Self {
        let macros = macros.sanitized().rounded();
        Self {
            calories: calories.clamp(1, KCAL_CEILING),
            protein_g: macros.protein_g,
            carbs_g: macros.carbs_g,
            fat_g: macros.fat_g,
            confidence_range,
            source: source.to_string(),
            estimated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
