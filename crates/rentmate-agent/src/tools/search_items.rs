use std::sync::Arc;

use async_trait::async_trait;
use rentmate_catalog::{CatalogClient, RentalWindow};
use rentmate_protocol::names;
use tracing::warn;

use super::{Tool, ToolOutcome};

/// Search the catalog for items available over a date range.
pub struct SearchItemsTool {
    catalog: Arc<CatalogClient>,
}

impl SearchItemsTool {
    pub fn new(catalog: Arc<CatalogClient>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for SearchItemsTool {
    fn name(&self) -> &str {
        names::TOOL_SEARCH_ITEMS
    }

    fn description(&self) -> &str {
        "Tool that searches for products based on user input."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Postgres full text search compatible search query, from the user's natural language input."
                },
                "start_date": {
                    "type": "string",
                    "description": "Start date for the rental period, YYYY-MM-DD."
                },
                "end_date": {
                    "type": "string",
                    "description": "End date for the rental period, YYYY-MM-DD."
                }
            },
            "required": ["query", "start_date", "end_date"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> ToolOutcome {
        let query = match args.get("query").and_then(|v| v.as_str()) {
            Some(q) if !q.trim().is_empty() => q.trim().to_string(),
            _ => return ToolOutcome::error("missing required parameter: query"),
        };
        let start = args.get("start_date").and_then(|v| v.as_str()).unwrap_or("");
        let end = args.get("end_date").and_then(|v| v.as_str()).unwrap_or("");

        let window = match RentalWindow::parse(start, end) {
            Ok(w) => w,
            Err(e) => return ToolOutcome::error(format!("invalid rental period: {e}")),
        };

        // a store failure is not the same as zero matches; the model gets
        // told the search broke instead of "nothing available"
        match self.catalog.available_items(&window, Some(&query)).await {
            Ok(items) => ToolOutcome::success(items),
            Err(e) => {
                warn!(error = %e, query = %query, "searchItems store failure");
                ToolOutcome::error(format!("item search failed, try again later: {e}"))
            }
        }
    }
}
