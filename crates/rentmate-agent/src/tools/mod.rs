//! Tool system for the assistant's function calling.
//!
//! Defines the `Tool` trait both catalog tools implement, plus the
//! conversion to the model API's declaration format.

pub mod payment_link;
pub mod search_items;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::ToolDefinition;

/// Result of executing a tool.
///
/// The payload is structured JSON rather than prose: the chat UI renders it
/// directly (item cards, payment card) and the model reads it back as the
/// function response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub payload: serde_json::Value,
    pub is_error: bool,
}

impl ToolOutcome {
    pub fn success(payload: impl Serialize) -> Self {
        Self {
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            payload: serde_json::json!({ "error": message.into() }),
            is_error: true,
        }
    }
}

/// Trait that all tools must implement.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Wire name the model calls this tool by (e.g. "searchItems").
    fn name(&self) -> &str;
    /// Description shown to the model.
    fn description(&self) -> &str;
    /// JSON Schema for the tool's arguments.
    fn input_schema(&self) -> serde_json::Value;
    /// Execute the tool with the given arguments.
    async fn execute(&self, args: serde_json::Value) -> ToolOutcome;
}

/// Convert a slice of tools to API-level declarations.
pub fn to_definitions(tools: &[Box<dyn Tool>]) -> Vec<ToolDefinition> {
    tools
        .iter()
        .map(|t| ToolDefinition {
            name: t.name().to_string(),
            description: t.description().to_string(),
            parameters: t.input_schema(),
        })
        .collect()
}
