//! Mealmetric MCP Server Implementation
//!
//! Implements the MCP server exposing the reconciliation engine.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::engine::Reconciler;
use crate::models::FoodQuery;
use crate::status::{StatusTracker, ESTIMATE_INSTRUCTIONS};

/// Mealmetric MCP Service
#[derive(Clone)]
pub struct MealmetricService {
    reconciler: Arc<Reconciler>,
    status_tracker: Arc<StatusTracker>,
    tool_router: ToolRouter<MealmetricService>,
}

impl MealmetricService {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            reconciler: Arc::new(Reconciler::new(config)),
            status_tracker: Arc::new(StatusTracker::new()),
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateFoodParams {
    /// Free-text food description, quantity words included
    /// (e.g. "2 eggs", "1 scoop whey", "5g butter")
    pub description: String,
    /// Serving weight in grams, when the user declared one
    pub grams: Option<f64>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MealmetricService {
    #[tool(description = "Get the current status of the Mealmetric service including build info, configured nutrition sources, and process information")]
    fn service_status(&self) -> Result<CallToolResult, McpError> {
        let status = self
            .status_tracker
            .get_status(self.reconciler.configured_sources());
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for estimating food nutrition. Call this when starting an estimation session or when unsure how to use estimate_food.")]
    fn estimate_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            ESTIMATE_INSTRUCTIONS,
        )]))
    }

    #[tool(description = "Produce one reconciled calorie/macro estimate for a free-text food description. Queries the configured nutrition sources concurrently, corrects units and known mis-estimates, and attaches a confidence range.")]
    async fn estimate_food(
        &self,
        Parameters(p): Parameters<EstimateFoodParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = FoodQuery::new(p.description, p.grams);
        let estimate = self
            .reconciler
            .reconcile(&query)
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let json = serde_json::to_string_pretty(&estimate)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MealmetricService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mealmetric".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Mealmetric".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Mealmetric - nutrition estimate reconciliation. \
                 IMPORTANT: Call estimate_instructions before your first estimate. \
                 Estimation: estimate_food(description, grams?). \
                 The returned estimate is already sanity-bounded and unit-corrected; \
                 present it verbatim with its confidence range. \
                 Status: service_status."
                    .into(),
            ),
        }
    }
}
