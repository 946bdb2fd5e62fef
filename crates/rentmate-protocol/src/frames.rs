use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server → Client stream frame, one per SSE `data:` line.
/// Wire: `{ "type": "text-delta", "delta": "Sure" }`
///       `{ "type": "tool-call", "toolCallId": "…", "toolName": "searchItems", "args": {...} }`
///       `{ "type": "tool-result", "toolCallId": "…", "toolName": "…", "result": …, "isError": false }`
///       `{ "type": "error", "code": "MODEL_PROVIDER_ERROR", "message": "…" }`
///       `{ "type": "done" }`
///
/// Every stream ends with exactly one `done` frame, including streams that
/// carried an `error` frame first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamFrame {
    TextDelta {
        delta: String,
    },
    ToolCall {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        #[serde(rename = "toolName")]
        tool_name: String,
        args: Value,
    },
    ToolResult {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        #[serde(rename = "toolName")]
        tool_name: String,
        result: Value,
        #[serde(rename = "isError", default)]
        is_error: bool,
    },
    Error {
        code: String,
        message: String,
    },
    Done {
        #[serde(
            rename = "finishReason",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        finish_reason: Option<String>,
    },
}

impl StreamFrame {
    pub fn text_delta(delta: impl Into<String>) -> Self {
        Self::TextDelta {
            delta: delta.into(),
        }
    }

    pub fn tool_call(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        args: impl Serialize,
    ) -> Self {
        Self::ToolCall {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args: serde_json::to_value(args).unwrap_or(Value::Null),
        }
    }

    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        result: impl Serialize,
        is_error: bool,
    ) -> Self {
        Self::ToolResult {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            result: serde_json::to_value(result).unwrap_or(Value::Null),
            is_error,
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn done() -> Self {
        Self::Done {
            finish_reason: None,
        }
    }

    pub fn done_with_reason(reason: impl Into<String>) -> Self {
        Self::Done {
            finish_reason: Some(reason.into()),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}
