//! Gemini REST provider (`generateContent` / `streamGenerateContent`).
//!
//! The base URL is configurable so requests can go through an AI gateway
//! that mirrors the Google API path layout.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::provider::{ChatRequest, ModelProvider, ModelResponse, ProviderError, ToolCall};
use crate::stream::{parse_sse_line, take_utf8_prefix, SseParsed, StreamEvent};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn send(&self, req: &ChatRequest) -> Result<ModelResponse, ProviderError> {
        let body = build_request_body(req);
        let url = format!("{}/models/{}:generateContent", self.base_url, req.model);

        debug!(model = %req.model, "sending request to Gemini");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            let retry = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| s * 1000) // convert seconds to ms
                .unwrap_or(5000);
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry,
            });
        }

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Gemini API error");
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(parse_response(api_resp, req.model.clone()))
    }

    async fn send_stream(
        &self,
        req: &ChatRequest,
        tx: mpsc::Sender<StreamEvent>,
    ) -> Result<(), ProviderError> {
        let body = build_request_body(req);
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, req.model
        );

        debug!(model = %req.model, "sending streaming request to Gemini");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            let retry = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| s * 1000)
                .unwrap_or(5000);
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry,
            });
        }

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Gemini streaming API error");
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        process_gemini_stream(resp, req.model.clone(), tx).await;
        Ok(())
    }
}

fn build_request_body(req: &ChatRequest) -> serde_json::Value {
    let mut body = serde_json::json!({
        "systemInstruction": { "parts": [{ "text": req.system }] },
        "contents": req.contents,
        "generationConfig": { "maxOutputTokens": req.max_tokens },
    });

    // Inject tool declarations when the caller has provided any.
    if !req.tools.is_empty() {
        let declarations: Vec<serde_json::Value> = req
            .tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                })
            })
            .collect();
        body["tools"] = serde_json::json!([{ "functionDeclarations": declarations }]);
    }

    body
}

fn parse_response(resp: ApiResponse, model: String) -> ModelResponse {
    let mut text_parts: Vec<String> = Vec::new();
    let mut tool_calls: Vec<ToolCall> = Vec::new();
    let mut finish_reason = String::new();

    if let Some(candidate) = resp.candidates.into_iter().next() {
        if let Some(reason) = candidate.finish_reason {
            finish_reason = reason;
        }
        if let Some(content) = candidate.content {
            for part in content.parts {
                if let Some(text) = part.text {
                    text_parts.push(text);
                }
                if let Some(call) = part.function_call {
                    // the API carries no call ids; mint one per call
                    tool_calls.push(ToolCall {
                        id: Uuid::new_v4().to_string(),
                        name: call.name,
                        args: call.args,
                    });
                }
            }
        }
    }

    ModelResponse {
        content: text_parts.join(""),
        model,
        tokens_in: resp
            .usage_metadata
            .as_ref()
            .map(|u| u.prompt_token_count)
            .unwrap_or(0),
        tokens_out: resp
            .usage_metadata
            .as_ref()
            .map(|u| u.candidates_token_count)
            .unwrap_or(0),
        finish_reason,
        tool_calls,
    }
}

/// Parse the Gemini SSE response and emit StreamEvents.
/// Each `data:` line holds a complete response chunk; there is no `[DONE]`
/// sentinel — the stream simply ends.
async fn process_gemini_stream(
    resp: reqwest::Response,
    model: String,
    tx: mpsc::Sender<StreamEvent>,
) {
    use futures_util::StreamExt;

    let mut tokens_in: u32 = 0;
    let mut tokens_out: u32 = 0;
    let mut finish_reason = String::new();
    let mut line_buf = String::new();
    // raw bytes held back when a chunk ends inside a multibyte character
    let mut byte_buf: Vec<u8> = Vec::new();

    let mut byte_stream = resp.bytes_stream();

    while let Some(chunk) = byte_stream.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                let _ = tx
                    .send(StreamEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
                return;
            }
        };

        byte_buf.extend_from_slice(&chunk);
        line_buf.push_str(&take_utf8_prefix(&mut byte_buf));
        let lines: Vec<&str> = line_buf.split('\n').collect();
        let (complete, remainder) = lines.split_at(lines.len() - 1);
        let remainder = remainder.first().unwrap_or(&"").to_string();

        for line in complete {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(SseParsed::Data(data)) = parse_sse_line(line) {
                if let Ok(chunk_resp) = serde_json::from_str::<ApiResponse>(&data) {
                    // usage is cumulative; keep the latest values seen
                    if let Some(usage) = &chunk_resp.usage_metadata {
                        tokens_in = usage.prompt_token_count;
                        tokens_out = usage.candidates_token_count;
                    }

                    for candidate in &chunk_resp.candidates {
                        if let Some(reason) = &candidate.finish_reason {
                            if !reason.is_empty() {
                                finish_reason = reason.clone();
                            }
                        }
                        let Some(content) = &candidate.content else {
                            continue;
                        };
                        for part in &content.parts {
                            if let Some(text) = &part.text {
                                if !text.is_empty() {
                                    debug!(len = text.len(), "gemini stream text delta");
                                    if tx
                                        .send(StreamEvent::TextDelta { text: text.clone() })
                                        .await
                                        .is_err()
                                    {
                                        return; // receiver dropped
                                    }
                                }
                            }
                            if let Some(call) = &part.function_call {
                                if tx
                                    .send(StreamEvent::ToolUse {
                                        id: Uuid::new_v4().to_string(),
                                        name: call.name.clone(),
                                        args: call.args.clone(),
                                    })
                                    .await
                                    .is_err()
                                {
                                    return;
                                }
                            }
                        }
                    }
                }
            }
        }

        line_buf = remainder;
    }

    let _ = tx
        .send(StreamEvent::Done {
            model,
            tokens_in,
            tokens_out,
            finish_reason,
        })
        .await;
}

// Gemini API response types (private — deserialization only)

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<ApiFunctionCall>,
}

#[derive(Deserialize)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::provider::ToolDefinition;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_request() -> ChatRequest {
        ChatRequest {
            model: "gemini-2.0-flash-lite".to_string(),
            system: "you help users find products they want to rent!".to_string(),
            contents: vec![Content::user_text("I need a PS5 on rent")],
            max_tokens: 1024,
            tools: vec![ToolDefinition {
                name: "searchItems".to_string(),
                description: "Tool that searches for products based on user input.".to_string(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": { "query": { "type": "string" } },
                    "required": ["query"]
                }),
            }],
        }
    }

    #[tokio::test]
    async fn send_parses_text_and_usage() {
        let server = MockServer::start().await;

        let response = serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "When do you need it?" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 20, "candidatesTokenCount": 6 }
        });

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash-lite:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "systemInstruction": { "parts": [{ "text": "you help users find products they want to rent!" }] },
                "generationConfig": { "maxOutputTokens": 1024 },
                "tools": [{ "functionDeclarations": [{ "name": "searchItems" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key".to_string(), Some(server.uri()));
        let resp = provider.send(&test_request()).await.unwrap();

        assert_eq!(resp.content, "When do you need it?");
        assert_eq!(resp.finish_reason, "STOP");
        assert_eq!(resp.tokens_in, 20);
        assert_eq!(resp.tokens_out, 6);
        assert!(resp.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn send_parses_function_calls_with_minted_ids() {
        let server = MockServer::start().await;

        let response = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{
                        "functionCall": {
                            "name": "searchItems",
                            "args": { "query": "gaming console", "start_date": "2026-01-10", "end_date": "2026-01-13" }
                        }
                    }]
                },
                "finishReason": "STOP"
            }]
        });

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash-lite:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key".to_string(), Some(server.uri()));
        let resp = provider.send(&test_request()).await.unwrap();

        assert_eq!(resp.tool_calls.len(), 1);
        let call = &resp.tool_calls[0];
        assert_eq!(call.name, "searchItems");
        assert_eq!(call.args["query"], "gaming console");
        assert!(!call.id.is_empty(), "provider must mint a call id");
    }

    #[tokio::test]
    async fn send_maps_429_to_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "12")
                    .set_body_string("quota exceeded"),
            )
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key".to_string(), Some(server.uri()));
        let err = provider.send(&test_request()).await.unwrap_err();

        match err {
            ProviderError::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, 12_000),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_surfaces_api_errors_with_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key".to_string(), Some(server.uri()));
        let err = provider.send(&test_request()).await.unwrap_err();

        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("internal error"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn streaming_emits_deltas_tool_use_and_done() {
        let server = MockServer::start().await;

        let sse_body = concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Looking\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\" now, ₹500/day\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"functionCall\":{\"name\":\"searchItems\",\"args\":{\"query\":\"drone\"}}}]},\"finishReason\":\"STOP\"}],\"usageMetadata\":{\"promptTokenCount\":15,\"candidatesTokenCount\":9}}\n\n",
        );

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash-lite:streamGenerateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"),
            )
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key".to_string(), Some(server.uri()));
        let (tx, mut rx) = mpsc::channel(16);

        provider.send_stream(&test_request(), tx).await.unwrap();

        let mut text = String::new();
        let mut tool_uses = 0;
        let mut done = None;
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::TextDelta { text: t } => text.push_str(&t),
                StreamEvent::ToolUse { name, args, id } => {
                    tool_uses += 1;
                    assert_eq!(name, "searchItems");
                    assert_eq!(args["query"], "drone");
                    assert!(!id.is_empty());
                }
                StreamEvent::Done {
                    finish_reason,
                    tokens_in,
                    tokens_out,
                    ..
                } => {
                    done = Some((finish_reason, tokens_in, tokens_out));
                }
                other => panic!("unexpected event {other:?}"),
            }
        }

        assert_eq!(text, "Looking now, ₹500/day");
        assert_eq!(tool_uses, 1);
        assert_eq!(done, Some(("STOP".to_string(), 15, 9)));
    }

    #[tokio::test]
    async fn streaming_http_error_returns_before_any_event() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key".to_string(), Some(server.uri()));
        let (tx, mut rx) = mpsc::channel(16);

        let err = provider.send_stream(&test_request(), tx).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 503, .. }));
        assert!(rx.recv().await.is_none(), "no events on setup failure");
    }
}
