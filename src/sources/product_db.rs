//! Product-database adapter
//!
//! Wraps an Open Food Facts-style search API. Results report nutrition
//! per 100 g, so the reconciler still scales them by the declared
//! serving weight. Fails closed on every expected failure mode.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{Basis, FoodQuery, Macros, Source, SourceResult};

const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

/// How many search hits to scan for a usable energy field
const SEARCH_PAGE_SIZE: u32 = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i32,
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    nutriments: Nutriments,
}

/// Per-100g nutriment fields; the energy field is the one we require
#[derive(Debug, Default, Deserialize)]
struct Nutriments {
    #[serde(rename = "energy-kcal_100g")]
    energy_kcal_100g: Option<f64>,
    #[serde(rename = "proteins_100g", default)]
    proteins_100g: Option<f64>,
    #[serde(rename = "carbohydrates_100g", default)]
    carbohydrates_100g: Option<f64>,
    #[serde(rename = "fat_100g", default)]
    fat_100g: Option<f64>,
}

/// Client for the product database
pub struct ProductDatabaseClient {
    client: reqwest::Client,
    base_url: String,
    enabled: bool,
}

impl ProductDatabaseClient {
    pub fn new(client: reqwest::Client, base_url: Option<String>, enabled: bool) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            enabled,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.enabled
    }

    /// Search by free text and take the first product reporting energy
    /// per 100 g.
    pub async fn lookup(&self, query: &FoodQuery) -> Option<SourceResult> {
        if !self.enabled {
            debug!("product-database adapter disabled by configuration");
            return None;
        }

        let page_size = SEARCH_PAGE_SIZE.to_string();
        let response = self
            .client
            .get(format!("{}/cgi/search.pl", self.base_url))
            .query(&[
                ("search_terms", query.description.as_str()),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!("product-database adapter transport error: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                "product-database adapter got HTTP {} for search",
                response.status()
            );
            return None;
        }

        let parsed: SearchResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!("product-database adapter returned malformed payload: {}", e);
                return None;
            }
        };

        first_usable(&parsed.products)
    }

    /// Direct lookup by product identifier (barcode). Same normalization
    /// and fail-closed contract as search.
    pub async fn lookup_by_code(&self, code: &str) -> Option<SourceResult> {
        if !self.enabled {
            return None;
        }

        let response = self
            .client
            .get(format!("{}/api/v0/product/{}.json", self.base_url, code))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!("product-database adapter transport error: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                "product-database adapter got HTTP {} for code {}",
                response.status(),
                code
            );
            return None;
        }

        let parsed: ProductResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!("product-database adapter returned malformed payload: {}", e);
                return None;
            }
        };

        if parsed.status != 1 {
            return None;
        }

        parsed.product.as_ref().and_then(normalize)
    }
}

/// First product with a per-100g energy figure wins
fn first_usable(products: &[Product]) -> Option<SourceResult> {
    products.iter().find_map(normalize)
}

fn normalize(product: &Product) -> Option<SourceResult> {
    let energy = product.nutriments.energy_kcal_100g?;
    if !energy.is_finite() || energy <= 0.0 {
        return None;
    }

    if let Some(name) = &product.product_name {
        debug!("product-database matched product: {}", name);
    }

    let macros = Macros::new(
        product.nutriments.proteins_100g.unwrap_or(0.0),
        product.nutriments.carbohydrates_100g.unwrap_or(0.0),
        product.nutriments.fat_100g.unwrap_or(0.0),
    );

    Some(SourceResult::new(
        Source::ProductDatabase,
        energy,
        macros,
        Basis::Per100Grams,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_usable_skips_products_without_energy() {
        let json = r#"{"products":[
            {"product_name":"No data bar","nutriments":{}},
            {"product_name":"Granola bar","nutriments":{
                "energy-kcal_100g":450.0,"proteins_100g":9.0,
                "carbohydrates_100g":60.0,"fat_100g":18.0}},
            {"product_name":"Another","nutriments":{"energy-kcal_100g":500.0}}
        ]}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        let result = first_usable(&parsed.products).unwrap();
        assert_eq!(result.source, Source::ProductDatabase);
        assert_eq!(result.basis, Basis::Per100Grams);
        assert!((result.calories - 450.0).abs() < 1e-9);
        assert!((result.macros.protein_g - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_usable_rejects_bad_energy() {
        let json = r#"{"products":[
            {"nutriments":{"energy-kcal_100g":0.0}},
            {"nutriments":{"energy-kcal_100g":-20.0}}
        ]}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(first_usable(&parsed.products).is_none());
    }

    #[test]
    fn test_empty_products_is_no_data() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"products":[]}"#).unwrap();
        assert!(first_usable(&parsed.products).is_none());
        let parsed: SearchResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(first_usable(&parsed.products).is_none());
    }

    #[test]
    fn test_product_response_status_gate() {
        let json = r#"{"status":0,"status_verbose":"product not found"}"#;
        let parsed: ProductResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, 0);
        assert!(parsed.product.is_none());
    }

    #[tokio::test]
    async fn test_disabled_adapter_fails_closed() {
        let client = ProductDatabaseClient::new(reqwest::Client::new(), None, false);
        let query = FoodQuery::new("granola", None);
        assert!(client.lookup(&query).await.is_none());
        assert!(client.lookup_by_code("123").await.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_fails_closed() {
        let client = ProductDatabaseClient::new(
            reqwest::Client::new(),
            Some("http://127.0.0.1:9".to_string()),
            true,
        );
        let query = FoodQuery::new("granola", None);
        assert!(client.lookup(&query).await.is_none());
    }
}
