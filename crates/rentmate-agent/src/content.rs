//! Conversation content in the model's wire format.
//!
//! The hosted model API speaks `user`/`model` roles; tool results travel
//! back inside `user` turns as `functionResponse` parts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One conversation turn.
/// Wire: `{ "role": "model", "parts": [{"text": "…"}, {"functionCall": {...}}] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    /// A model turn that requested one or more function calls, optionally
    /// preceded by text the model emitted in the same turn.
    pub fn model_turn(text: Option<String>, calls: Vec<FunctionCall>) -> Self {
        let mut parts = Vec::new();
        if let Some(text) = text {
            if !text.is_empty() {
                parts.push(Part::Text { text });
            }
        }
        for call in calls {
            parts.push(Part::FunctionCall {
                function_call: call,
            });
        }
        Self {
            role: "model".to_string(),
            parts,
        }
    }

    /// A user turn carrying function results back to the model.
    pub fn function_results(responses: Vec<FunctionResponse>) -> Self {
        Self {
            role: "user".to_string(),
            parts: responses
                .into_iter()
                .map(|function_response| Part::FunctionResponse { function_response })
                .collect(),
        }
    }
}

impl FunctionResponse {
    /// The API requires `response` to be a JSON object; bare values and
    /// arrays are wrapped as `{"result": …}`.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        let response = match payload {
            Value::Object(_) => payload,
            other => serde_json::json!({ "result": other }),
        };
        Self {
            name: name.into(),
            response,
        }
    }
}
