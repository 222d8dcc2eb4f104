//! Normalized output of one source adapter call

use serde::{Deserialize, Serialize};

use super::Macros;

/// Which external provider produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    NaturalLanguageApi,
    ProductDatabase,
    ModelFallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::NaturalLanguageApi => "natural_language_api",
            Source::ProductDatabase => "product_database",
            Source::ModelFallback => "model_fallback",
        }
    }
}

/// What the calorie/macro numbers in a result are measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// Absolute totals for the whole query, quantity words already resolved
    TotalForQuery,
    /// Density figures per 100 grams, still needing serving-weight scaling
    Per100Grams,
}

/// One adapter's normalized answer. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResult {
    pub source: Source,
    pub calories: f64,
    pub macros: Macros,
    pub basis: Basis,
    pub confidence: String,
}

impl SourceResult {
    pub fn new(source: Source, calories: f64, macros: Macros, basis: Basis) -> Self {
        Self {
            source,
            calories,
            macros,
            basis,
            confidence: "±10%".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_names() {
        assert_eq!(Source::NaturalLanguageApi.as_str(), "natural_language_api");
        assert_eq!(Source::ProductDatabase.as_str(), "product_database");
        assert_eq!(Source::ModelFallback.as_str(), "model_fallback");
    }
}
