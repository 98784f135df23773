//! Tools the agent can call, and the product-search tool in particular.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::catalog::{Brand, Category};
use crate::error::{Error, Result};
use crate::search::{
    ProductFilters, SearchRequest, SearchService, DEFAULT_SCORE_THRESHOLD, DEFAULT_TOP_K,
};

/// Name the search tool is declared under.
pub const SEARCH_TOOL_NAME: &str = "search_products";

/// Declared tool contract: name, description, and a JSON Schema for the
/// arguments the model may pass.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
}

/// A callable capability exposed to the chat model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The declared contract for this tool.
    fn spec(&self) -> ToolSpec;

    /// Execute the tool with model-supplied JSON arguments.
    ///
    /// Errors propagate to the agent loop untranslated.
    async fn invoke(&self, arguments: JsonValue) -> Result<JsonValue>;
}

/// Exposes [`SearchService`] as a tool the chat model can call.
pub struct ProductSearchTool {
    service: Arc<SearchService>,
}

impl ProductSearchTool {
    /// Wrap a search service.
    pub fn new(service: Arc<SearchService>) -> Self {
        Self { service }
    }
}

/// Arguments as the model sends them. Absent and `null` are both "unset";
/// only genuinely-set filter fields become active constraints.
#[derive(Debug, Deserialize)]
struct SearchArguments {
    query: String,
    #[serde(default)]
    filters: Option<ProductFilters>,
    #[serde(default)]
    top_k: Option<u64>,
    #[serde(default)]
    score_threshold: Option<f32>,
}

#[async_trait]
impl Tool for ProductSearchTool {
    fn spec(&self) -> ToolSpec {
        let brands: Vec<&str> = Brand::ALL.iter().map(|b| b.as_str()).collect();
        let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

        ToolSpec {
            name: SEARCH_TOOL_NAME.to_string(),
            description: "Search the clothing catalog for products matching a natural \
                language description, optionally constrained by brand, category, and \
                price range. Returns ranked matches with price, brand, material, color, \
                and sizes."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What the user is looking for, in plain language"
                    },
                    "filters": {
                        "type": "object",
                        "description": "Structured constraints; omit any field that \
                            the user did not specify",
                        "properties": {
                            "brand": { "type": "string", "enum": brands },
                            "category": { "type": "string", "enum": categories },
                            "price_min": { "type": "number", "minimum": 0 },
                            "price_max": { "type": "number", "minimum": 0 }
                        }
                    },
                    "top_k": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Maximum number of results",
                        "default": DEFAULT_TOP_K
                    },
                    "score_threshold": {
                        "type": "number",
                        "minimum": 0,
                        "maximum": 1,
                        "description": "Minimum similarity score",
                        "default": DEFAULT_SCORE_THRESHOLD
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn invoke(&self, arguments: JsonValue) -> Result<JsonValue> {
        let args: SearchArguments = serde_json::from_value(arguments)
            .map_err(|e| Error::InvalidRequest(format!("bad search arguments: {}", e)))?;

        let mut request = SearchRequest::new(args.query);
        if let Some(top_k) = args.top_k {
            request = request.with_top_k(top_k);
        }
        if let Some(score_threshold) = args.score_threshold {
            request = request.with_score_threshold(score_threshold);
        }
        if let Some(filters) = args.filters {
            request = request.with_filters(filters);
        }

        let matches = self.service.search(&request).await?;
        Ok(serde_json::to_value(matches)?)
    }
}
