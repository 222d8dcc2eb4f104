//! Model fallback
//!
//! Last-resort estimator: a chat completion against an OpenAI-compatible
//! endpoint with a fixed system instruction demanding a single JSON
//! object. Unlike the source adapters this does NOT fail closed; when it
//! runs, every other source has already come up empty, so its failures
//! surface as errors.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::{FallbackConfig, ProfileDefaults};
use crate::engine::EngineError;
use crate::models::FoodQuery;

const SYSTEM_PROMPT: &str = "You are a nutrition estimator. Given a food \
description, reply with a single JSON object and nothing else: \
{\"calories\": number, \"protein_g\": number, \"carbs_g\": number, \
\"fat_g\": number, \"confidence_range\": string}. Calories are \
kilocalories for the whole described serving. confidence_range is a \
short qualifier like \"±20%\". Do not add commentary.";

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// The JSON object the model is instructed to return
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackEstimate {
    pub calories: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
    #[serde(default = "default_confidence")]
    pub confidence_range: String,
}

fn default_confidence() -> String {
    "±25%".to_string()
}

// ============================================================================
// Client
// ============================================================================

/// Chat-completion client for the fallback estimator
pub struct ModelFallback {
    client: reqwest::Client,
    config: FallbackConfig,
    defaults: ProfileDefaults,
}

impl ModelFallback {
    pub fn new(client: reqwest::Client, config: FallbackConfig, defaults: ProfileDefaults) -> Self {
        Self {
            client,
            config,
            defaults,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Ask the model for an estimate. `hint` carries any authoritative
    /// nutrition figure already found upstream so the model can anchor
    /// on it.
    pub async fn estimate(
        &self,
        query: &FoodQuery,
        hint: Option<&str>,
    ) -> Result<FallbackEstimate, EngineError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(EngineError::FallbackUnavailable)?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_user_content(query, hint, &self.defaults),
                },
            ],
            temperature: 0.2,
            max_tokens: 256,
        };

        debug!("sending fallback chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("fallback request failed to send: {}", e);
                EngineError::Fallback(format!("failed to connect: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EngineError::Fallback(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            error!("fallback request got HTTP {}", status);
            return Err(EngineError::Fallback(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| EngineError::Fallback(format!("malformed completion envelope: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        parse_fallback_content(&content)
    }
}

/// Build the user message: the query, the declared weight, any upstream
/// hint, and the profile defaults.
fn build_user_content(query: &FoodQuery, hint: Option<&str>, defaults: &ProfileDefaults) -> String {
    let mut content = format!("Food: {}", query.description);

    if let Some(grams) = query.declared_grams {
        content.push_str(&format!("\nDeclared weight: {grams} g"));
    }
    if let Some(hint) = hint {
        content.push_str(&format!("\nKnown nutrition data: {hint}"));
    }
    content.push_str(&format!(
        "\nUser profile: age {}, weight {} kg, goal: {}",
        defaults.age, defaults.weight_kg, defaults.goal
    ));

    content
}

/// Parse the model's reply into an estimate. Strips a markdown code
/// fence if present. Anything unparsable, empty, or without positive
/// calories is a hard error; no other source succeeded at this point.
pub fn parse_fallback_content(content: &str) -> Result<FallbackEstimate, EngineError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(EngineError::FallbackParse("empty content".to_string()));
    }

    let inner = strip_code_fence(trimmed);

    let estimate: FallbackEstimate = serde_json::from_str(inner).map_err(|e| {
        EngineError::FallbackParse(format!(
            "{e}: {}",
            inner.chars().take(120).collect::<String>()
        ))
    })?;

    if !estimate.calories.is_finite() || estimate.calories <= 0.0 {
        return Err(EngineError::FallbackParse(format!(
            "non-positive calories: {}",
            estimate.calories
        )));
    }

    Ok(estimate)
}

/// Remove a surrounding ```json ... ``` fence, if any
fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // Drop the info string ("json") up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").map_or(body, str::trim).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let est = parse_fallback_content(
            r#"{"calories": 320, "protein_g": 12, "carbs_g": 40, "fat_g": 11,
               "confidence_range": "±20%"}"#,
        )
        .unwrap();
        assert_eq!(est.calories, 320.0);
        assert_eq!(est.confidence_range, "±20%");
    }

    #[test]
    fn test_parse_fenced_json() {
        let content = "```json\n{\"calories\": 180, \"protein_g\": 6}\n```";
        let est = parse_fallback_content(content).unwrap();
        assert_eq!(est.calories, 180.0);
        assert_eq!(est.protein_g, 6.0);
        // omitted confidence gets the default
        assert_eq!(est.confidence_range, "±25%");
    }

    #[test]
    fn test_parse_fence_without_info_string() {
        let content = "```\n{\"calories\": 95}\n```";
        let est = parse_fallback_content(content).unwrap();
        assert_eq!(est.calories, 95.0);
    }

    #[test]
    fn test_parse_failures_are_errors() {
        assert!(matches!(
            parse_fallback_content(""),
            Err(EngineError::FallbackParse(_))
        ));
        assert!(matches!(
            parse_fallback_content("I'd estimate around 300 calories."),
            Err(EngineError::FallbackParse(_))
        ));
        assert!(matches!(
            parse_fallback_content(r#"{"calories": 0}"#),
            Err(EngineError::FallbackParse(_))
        ));
        assert!(matches!(
            parse_fallback_content(r#"{"calories": -50}"#),
            Err(EngineError::FallbackParse(_))
        ));
    }

    #[test]
    fn test_user_content_includes_context() {
        let query = FoodQuery::new("dal tadka", Some(250.0));
        let defaults = ProfileDefaults::default();
        let content = build_user_content(&query, Some("180 kcal per 100g"), &defaults);
        assert!(content.contains("dal tadka"));
        assert!(content.contains("250 g"));
        assert!(content.contains("180 kcal per 100g"));
        assert!(content.contains("goal: maintain weight"));
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let fallback = ModelFallback::new(
            reqwest::Client::new(),
            FallbackConfig::default(),
            ProfileDefaults::default(),
        );
        let query = FoodQuery::new("toast", None);
        assert!(matches!(
            fallback.estimate(&query, None).await,
            Err(EngineError::FallbackUnavailable)
        ));
    }
}
