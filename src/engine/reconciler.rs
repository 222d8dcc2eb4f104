//! Reconciler
//!
//! Orchestrates the source adapters by priority, scales results to the
//! requested serving weight, applies sanitizer, overrides, and category
//! clamp in a fixed order, and attaches a confidence qualifier.

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::engine::categories::clamp_to_category;
use crate::engine::overrides::apply_overrides;
use crate::engine::sanitize::sanitize_kcal;
use crate::engine::EngineError;
use crate::models::{FoodQuery, Macros, ReconciledEstimate, Source, SourceResult};
use crate::sources::{ModelFallback, NaturalLanguageClient, ProductDatabaseClient};

/// One-stop entry point: `reconcile(query)` -> estimate
pub struct Reconciler {
    natural_language: NaturalLanguageClient,
    product_db: ProductDatabaseClient,
    fallback: ModelFallback,
}

impl Reconciler {
    pub fn new(config: &EngineConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mealmetric/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            natural_language: NaturalLanguageClient::new(
                client.clone(),
                config.nutrition_api_key.clone(),
            ),
            product_db: ProductDatabaseClient::new(
                client.clone(),
                config.product_db_url.clone(),
                !config.product_db_disabled,
            ),
            fallback: ModelFallback::new(
                client,
                config.fallback.clone(),
                config.profile_defaults.clone(),
            ),
        }
    }

    /// Which sources this instance can actually reach
    pub fn configured_sources(&self) -> Vec<&'static str> {
        let mut sources = Vec::new();
        if self.natural_language.is_configured() {
            sources.push(Source::NaturalLanguageApi.as_str());
        }
        if self.product_db.is_configured() {
            sources.push(Source::ProductDatabase.as_str());
        }
        if self.fallback.is_configured() {
            sources.push(Source::ModelFallback.as_str());
        }
        sources
    }

    /// Produce one reconciled estimate for a query.
    ///
    /// Expected source failures (missing keys, network errors, empty
    /// payloads) degrade to the next source and never surface; only a
    /// failing model fallback is an error, because by then nothing else
    /// produced data.
    pub async fn reconcile(&self, query: &FoodQuery) -> Result<ReconciledEstimate, EngineError> {
        // Both adapters run concurrently; added latency is bounded by
        // the slower of the two, not their sum.
        let (nl, product) = tokio::join!(
            self.natural_language.lookup(query),
            self.product_db.lookup(query),
        );

        // The natural-language API already resolves quantity words into
        // absolute totals, so it wins and is never re-scaled.
        if let Some(result) = nl {
            debug!("using natural-language result: {} kcal", result.calories);
            if let Some(estimate) = self.finish_external(query, &result, 1.0) {
                return Ok(estimate);
            }
        }

        // Product-database figures are per 100 g and scale by the
        // declared weight (default 100 g).
        if let Some(result) = product {
            let scale = query.effective_grams() / 100.0;
            debug!(
                "using product-database result: {} kcal/100g, scale {}",
                result.calories, scale
            );
            if let Some(estimate) = self.finish_external(query, &result, scale) {
                return Ok(estimate);
            }
        }

        info!("no external source returned data, using model fallback");
        let raw = self.fallback.estimate(query, None).await?;
        let calories = sanitize_kcal(raw.calories).ok_or_else(|| {
            EngineError::FallbackParse(format!("unusable calorie value: {}", raw.calories))
        })?;
        let macros = Macros::new(raw.protein_g, raw.carbs_g, raw.fat_g);

        Ok(finish(
            query,
            calories,
            macros,
            raw.confidence_range,
            Source::ModelFallback,
        ))
    }

    /// Scale an external result to the serving and run the correction
    /// pipeline. None when the scaled value does not survive the
    /// sanitizer, so the caller can fall through to the next source.
    fn finish_external(
        &self,
        query: &FoodQuery,
        result: &SourceResult,
        scale: f64,
    ) -> Option<ReconciledEstimate> {
        let calories = sanitize_kcal(result.calories * scale)?;
        let macros = result.macros.scale(scale);
        Some(finish(
            query,
            calories,
            macros,
            result.confidence.clone(),
            result.source,
        ))
    }
}

/// Shared tail of every path: overrides, category clamp, ceiling,
/// confidence annotation.
fn finish(
    query: &FoodQuery,
    calories: i64,
    macros: Macros,
    confidence: String,
    source: Source,
) -> ReconciledEstimate {
    let outcome = apply_overrides(query, calories);
    let macros = outcome.macros.unwrap_or(macros);

    let clamped = clamp_to_category(
        &query.description,
        outcome.calories as f64,
        query.declared_grams,
    );

    let confidence = match outcome.annotation {
        Some(annotation) => format!("{confidence} {annotation}"),
        None => confidence,
    };

    ReconciledEstimate::assemble(clamped as i64, macros, confidence, source.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Basis, KCAL_CEILING};

    fn external(source: Source, calories: f64, basis: Basis) -> SourceResult {
        SourceResult::new(source, calories, Macros::new(10.0, 20.0, 5.0), basis)
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(&EngineConfig::default())
    }

    #[test]
    fn test_finish_applies_override_then_clamp() {
        let query = FoodQuery::new("2 eggs", None);
        let estimate = finish(
            &query,
            644,
            Macros::new(12.0, 1.0, 10.0),
            "±10%".into(),
            Source::NaturalLanguageApi,
        );
        // egg cap lowers 644 to 180; egg density range keeps it there
        assert_eq!(estimate.calories, 180);
        assert!(estimate.calories >= 140);
        assert_eq!(estimate.source, "natural_language_api");
        assert_eq!(estimate.confidence_range, "±10%");
    }

    #[test]
    fn test_finish_whey_replace_annotates_confidence() {
        let query = FoodQuery::new("1 scoop whey protein", None);
        let estimate = finish(
            &query,
            29,
            Macros::new(3.0, 2.0, 1.0),
            "±10%".into(),
            Source::NaturalLanguageApi,
        );
        assert_eq!(estimate.calories, 120);
        assert_eq!(estimate.protein_g, 24.0);
        assert_eq!(estimate.carbs_g, 2.0);
        assert_eq!(estimate.fat_g, 1.5);
        assert_eq!(estimate.confidence_range, "±10% (typical scoop)");
    }

    #[test]
    fn test_finish_butter_floor() {
        let query = FoodQuery::new("5g butter", None);
        let estimate = finish(
            &query,
            1,
            Macros::zero(),
            "±10%".into(),
            Source::ModelFallback,
        );
        assert!(estimate.calories >= 29);
        assert!((estimate.fat_g - 5.0).abs() < 0.1);
    }

    #[test]
    fn test_finish_enforces_ceiling() {
        // "mystery casserole" hits the default 30-500 density range; with
        // 500g declared the cap is 2500, above the hard ceiling
        let query = FoodQuery::new("mystery casserole", Some(500.0));
        let estimate = finish(
            &query,
            1999,
            Macros::zero(),
            "±10%".into(),
            Source::ProductDatabase,
        );
        assert!(estimate.calories <= KCAL_CEILING);
        assert!(estimate.calories > 0);
    }

    #[test]
    fn test_external_scaling_product_db() {
        let r = reconciler();
        let query = FoodQuery::new("granola", Some(50.0));
        let result = external(Source::ProductDatabase, 450.0, Basis::Per100Grams);
        let estimate = r.finish_external(&query, &result, 0.5).unwrap();
        assert_eq!(estimate.calories, 225);
        assert_eq!(estimate.protein_g, 5.0);
        assert_eq!(estimate.source, "product_database");
    }

    #[test]
    fn test_external_totals_not_rescaled() {
        let r = reconciler();
        // declared grams must NOT re-scale the natural-language total
        let query = FoodQuery::new("granola", Some(50.0));
        let result = external(Source::NaturalLanguageApi, 450.0, Basis::TotalForQuery);
        let estimate = r.finish_external(&query, &result, 1.0).unwrap();
        // density 450/50g*100 = 900 exceeds the default max 500 for 50g:
        // clamp to 500 * 50/100 = 250
        assert_eq!(estimate.calories, 250);
        assert_eq!(estimate.source, "natural_language_api");
    }

    #[test]
    fn test_external_insane_value_falls_out() {
        let r = reconciler();
        let query = FoodQuery::new("granola", None);
        let result = external(Source::NaturalLanguageApi, -10.0, Basis::TotalForQuery);
        assert!(r.finish_external(&query, &result, 1.0).is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_everything_is_fallback_unavailable() {
        // no NL key, product db disabled, no LLM key
        let r = Reconciler::new(&EngineConfig {
            product_db_disabled: true,
            ..EngineConfig::default()
        });
        let query = FoodQuery::new("2 eggs", None);
        assert!(matches!(
            r.reconcile(&query).await,
            Err(EngineError::FallbackUnavailable)
        ));
    }

    #[test]
    fn test_configured_sources_reporting() {
        let r = Reconciler::new(&EngineConfig {
            nutrition_api_key: Some("key".into()),
            ..EngineConfig::default()
        });
        let sources = r.configured_sources();
        assert!(sources.contains(&"natural_language_api"));
        assert!(sources.contains(&"product_database"));
        assert!(!sources.contains(&"model_fallback"));
    }
}
