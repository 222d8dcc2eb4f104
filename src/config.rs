//! Engine configuration
//!
//! All settings are read from the environment once at startup and passed
//! down as values. Profile defaults used by the fallback prompt live here
//! too, rather than in module-level state.

/// Defaults substituted into the fallback prompt when no user profile exists
#[derive(Debug, Clone)]
pub struct ProfileDefaults {
    pub age: u32,
    pub weight_kg: f64,
    pub goal: String,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            age: 30,
            weight_kg: 70.0,
            goal: "maintain weight".to_string(),
        }
    }
}

/// Settings for the model-fallback provider (OpenAI-compatible endpoint)
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl FallbackConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.groq.com/openai/v1";
    pub const DEFAULT_MODEL: &'static str = "llama-3.3-70b-versatile";
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Key for the natural-language nutrition API; adapter is inert without it
    pub nutrition_api_key: Option<String>,
    /// Base URL override for the product database
    pub product_db_url: Option<String>,
    /// Disable the product database adapter entirely
    pub product_db_disabled: bool,
    pub fallback: FallbackConfig,
    pub profile_defaults: ProfileDefaults,
}

impl EngineConfig {
    /// Read configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = ProfileDefaults::default();
        let profile_defaults = ProfileDefaults {
            age: env_parse("MEALMETRIC_DEFAULT_AGE").unwrap_or(defaults.age),
            weight_kg: env_parse("MEALMETRIC_DEFAULT_WEIGHT_KG").unwrap_or(defaults.weight_kg),
            goal: std::env::var("MEALMETRIC_DEFAULT_GOAL").unwrap_or(defaults.goal),
        };

        Self {
            nutrition_api_key: env_non_empty("MEALMETRIC_NUTRITION_API_KEY"),
            product_db_url: env_non_empty("MEALMETRIC_PRODUCT_DB_URL"),
            product_db_disabled: std::env::var("MEALMETRIC_PRODUCT_DB_DISABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            fallback: FallbackConfig {
                api_key: env_non_empty("MEALMETRIC_LLM_API_KEY"),
                base_url: std::env::var("MEALMETRIC_LLM_BASE_URL")
                    .unwrap_or_else(|_| FallbackConfig::DEFAULT_BASE_URL.to_string()),
                model: std::env::var("MEALMETRIC_LLM_MODEL")
                    .unwrap_or_else(|_| FallbackConfig::DEFAULT_MODEL.to_string()),
            },
            profile_defaults,
        }
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.nutrition_api_key.is_none());
        assert!(!config.product_db_disabled);
        assert_eq!(config.fallback.base_url, FallbackConfig::DEFAULT_BASE_URL);
        assert_eq!(config.profile_defaults.age, 30);
    }
}
