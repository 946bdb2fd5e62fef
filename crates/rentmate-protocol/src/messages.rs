use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client → Server chat request body.
/// Wire: `{ "id": "chat-1", "messages": [...], "data": {"intent":"RESERVE","id":"a0eebc99-…"} }`
///
/// The backend is stateless: `messages` carries the entire conversation on
/// every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<IntentData>,
}

/// One turn of the conversation as the UI stores it.
/// Wire: `{ "role": "assistant", "content": "…", "toolInvocations": [...] }`
///
/// Unknown fields (client-side ids, timestamps) are ignored on parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(
        rename = "toolInvocations",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tool_invocations: Vec<ToolInvocation>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            tool_invocations: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            tool_invocations: Vec::new(),
        }
    }
}

/// A tool call recorded inside a replayed assistant message.
/// Wire: `{ "state": "result", "toolCallId": "…", "toolName": "searchItems",
///          "args": {...}, "result": [...] }`
///
/// `state` is `partial-call`, `call`, or `result`. Replayed invocations are
/// shown to the model as prior context and are never executed again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub state: String,
    #[serde(rename = "toolCallId")]
    pub tool_call_id: String,
    #[serde(rename = "toolName")]
    pub tool_name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ToolInvocation {
    pub fn is_result(&self) -> bool {
        self.state == "result"
    }
}

/// Side-channel metadata the UI attaches when a message came from a button
/// press rather than free typing (e.g. Reserve Now on an item card).
/// Wire: `{ "intent": "RESERVE", "id": "a0eebc99-…" }` — item cards forward
/// the catalog row's uuid, but a bare JSON number is also accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentData {
    pub intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl IntentData {
    /// Canonical string form of the item id, whatever JSON type it arrived as.
    pub fn id_as_string(&self) -> Option<String> {
        match &self.id {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}
