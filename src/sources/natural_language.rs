//! Natural-language nutrition API adapter
//!
//! Wraps a CalorieNinjas-style endpoint: free text in (quantity words
//! included), absolute calorie/macro totals out. Fails closed: missing
//! key, transport error, non-2xx status, or an empty item list all
//! normalize to "no data".

use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{Basis, FoodQuery, Macros, Source, SourceResult};

const DEFAULT_BASE_URL: &str = "https://api.calorieninjas.com/v1";

/// Overlong free text is truncated before sending
const MAX_QUERY_CHARS: usize = 1500;

#[derive(Debug, Deserialize)]
struct NutritionResponse {
    items: Vec<NutritionItem>,
}

/// One line item in the provider's answer ("2 eggs" and "1 toast" come
/// back as separate items)
#[derive(Debug, Deserialize)]
struct NutritionItem {
    #[serde(default)]
    calories: f64,
    #[serde(default)]
    protein_g: f64,
    #[serde(default)]
    carbohydrates_total_g: f64,
    #[serde(default)]
    fat_total_g: f64,
}

/// Client for the natural-language nutrition API
pub struct NaturalLanguageClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl NaturalLanguageClient {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Whether a credential is configured
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Look up totals for a free-text query. The query may embed quantity
    /// words; no grams parameter exists because the provider resolves
    /// quantities from the text itself.
    pub async fn lookup(&self, query: &FoodQuery) -> Option<SourceResult> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                debug!("natural-language adapter skipped: no API key configured");
                return None;
            }
        };

        let truncated: String = query.description.chars().take(MAX_QUERY_CHARS).collect();

        let response = self
            .client
            .get(format!("{}/nutrition", self.base_url))
            .header("X-Api-Key", api_key)
            .query(&[("query", truncated.as_str())])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!("natural-language adapter transport error: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                "natural-language adapter got HTTP {} for query",
                response.status()
            );
            return None;
        }

        let parsed: NutritionResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!("natural-language adapter returned malformed payload: {}", e);
                return None;
            }
        };

        normalize(&parsed.items)
    }
}

/// Sum the provider's line items into one TotalForQuery result
fn normalize(items: &[NutritionItem]) -> Option<SourceResult> {
    if items.is_empty() {
        return None;
    }

    let calories: f64 = items.iter().map(|i| i.calories).sum();
    if !calories.is_finite() || calories <= 0.0 {
        return None;
    }

    let macros = items
        .iter()
        .map(|i| Macros::new(i.protein_g, i.carbohydrates_total_g, i.fat_total_g))
        .sum();

    Some(SourceResult::new(
        Source::NaturalLanguageApi,
        calories,
        macros,
        Basis::TotalForQuery,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(calories: f64, protein: f64, carbs: f64, fat: f64) -> NutritionItem {
        NutritionItem {
            calories,
            protein_g: protein,
            carbohydrates_total_g: carbs,
            fat_total_g: fat,
        }
    }

    #[test]
    fn test_normalize_sums_all_items() {
        let items = vec![item(140.0, 12.0, 1.0, 10.0), item(80.0, 3.0, 14.0, 1.0)];
        let result = normalize(&items).unwrap();
        assert_eq!(result.source, Source::NaturalLanguageApi);
        assert_eq!(result.basis, Basis::TotalForQuery);
        assert!((result.calories - 220.0).abs() < 1e-9);
        assert!((result.macros.protein_g - 15.0).abs() < 1e-9);
        assert!((result.macros.carbs_g - 15.0).abs() < 1e-9);
        assert!((result.macros.fat_g - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_rejects_empty_and_zero() {
        assert!(normalize(&[]).is_none());
        assert!(normalize(&[item(0.0, 0.0, 0.0, 0.0)]).is_none());
        assert!(normalize(&[item(f64::NAN, 0.0, 0.0, 0.0)]).is_none());
    }

    #[test]
    fn test_payload_shape_parses() {
        let json = r#"{"items":[{"calories":155.1,"protein_g":12.6,
            "carbohydrates_total_g":1.1,"fat_total_g":10.6,
            "serving_size_g":100.0}]}"#;
        let parsed: NutritionResponse = serde_json::from_str(json).unwrap();
        let result = normalize(&parsed.items).unwrap();
        assert!((result.calories - 155.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let json = r#"{"items":[{"calories":90.0}]}"#;
        let parsed: NutritionResponse = serde_json::from_str(json).unwrap();
        let result = normalize(&parsed.items).unwrap();
        assert_eq!(result.macros.protein_g, 0.0);
    }

    #[tokio::test]
    async fn test_lookup_without_key_fails_closed() {
        let client = NaturalLanguageClient::new(reqwest::Client::new(), None)
            .with_base_url("http://127.0.0.1:9");
        let query = FoodQuery::new("2 eggs", None);
        assert!(client.lookup(&query).await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_transport_error_fails_closed() {
        // Port 9 (discard) refuses connections; the adapter must degrade
        // to None, not error
        let client =
            NaturalLanguageClient::new(reqwest::Client::new(), Some("test-key".to_string()))
                .with_base_url("http://127.0.0.1:9");
        let query = FoodQuery::new("2 eggs", None);
        assert!(client.lookup(&query).await.is_none());
    }
}
