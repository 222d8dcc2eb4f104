//! Food query model
//!
//! The immutable input to one reconciliation request.

use serde::{Deserialize, Serialize};

/// A free-text food description with an optional declared weight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodQuery {
    /// Free-text description, may embed quantity words ("3 eggs", "1lb chicken")
    pub description: String,
    /// Declared serving weight in grams, when the caller knows it
    pub declared_grams: Option<f64>,
}

impl FoodQuery {
    /// Build a query, discarding a non-positive or non-finite declared weight
    pub fn new(description: impl Into<String>, declared_grams: Option<f64>) -> Self {
        let declared_grams = declared_grams.filter(|g| g.is_finite() && *g > 0.0);
        Self {
            description: description.into(),
            declared_grams,
        }
    }

    /// Declared grams, falling back to a 100 g reference serving
    pub fn effective_grams(&self) -> f64 {
        self.declared_grams.unwrap_or(100.0)
    }

    /// Lowercased description for pattern matching
    pub fn normalized(&self) -> String {
        self.description.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_grams() {
        assert_eq!(FoodQuery::new("rice", Some(-5.0)).declared_grams, None);
        assert_eq!(FoodQuery::new("rice", Some(f64::NAN)).declared_grams, None);
        assert_eq!(FoodQuery::new("rice", Some(150.0)).declared_grams, Some(150.0));
    }

    #[test]
    fn test_effective_grams_default() {
        assert_eq!(FoodQuery::new("dal", None).effective_grams(), 100.0);
        assert_eq!(FoodQuery::new("dal", Some(250.0)).effective_grams(), 250.0);
    }
}
