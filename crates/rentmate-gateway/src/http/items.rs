//! POST /items — the conversational chat endpoint.
//!
//! Replays the UI's message history to the model, executes tool calls
//! against the catalog, and streams typed frames back over SSE. The
//! backend holds no conversation state; every request carries the full
//! history.

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use chrono::Local;
use rentmate_agent::tools::payment_link::PaymentLinkTool;
use rentmate_agent::tools::search_items::SearchItemsTool;
use rentmate_agent::tools::{to_definitions, Tool};
use rentmate_agent::{history, prompt, run_chat_loop, ChatRequest, StreamEvent};
use rentmate_protocol::{ChatPayload, IntentData, StreamFrame};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::AppState;

pub async fn items_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatPayload>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    if payload.messages.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": "INVALID_REQUEST",
                    "message": "messages must not be empty",
                }
            })),
        ));
    }

    info!(
        chat_id = payload.id.as_deref().unwrap_or("-"),
        messages = payload.messages.len(),
        intent = payload
            .data
            .as_ref()
            .map(|d| d.intent.as_str())
            .unwrap_or("-"),
        "chat request"
    );

    Ok(stream_chat(state, payload))
}

fn stream_chat(
    state: Arc<AppState>,
    payload: ChatPayload,
) -> Sse<impl futures_util::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let (tx, mut rx) = mpsc::channel::<StreamEvent>(64);

    let mut request = ChatRequest {
        model: state.config.model.name.clone(),
        system: prompt::system_prompt(Local::now().date_naive()),
        contents: history::contents_from_messages(&payload.messages),
        max_tokens: state.config.model.max_tokens,
        tools: vec![],
    };
    let intent = payload.data.clone();

    // the loop task owns a state clone; the response stream owns rx
    tokio::spawn(async move {
        let tools = build_tools(&state, intent);
        request.tools = to_definitions(&tools);

        match run_chat_loop(state.provider.as_ref(), &tools, request, tx.clone()).await {
            Ok(outcome) => {
                info!(
                    steps = outcome.steps,
                    tokens_in = outcome.tokens_in,
                    tokens_out = outcome.tokens_out,
                    finish_reason = %outcome.finish_reason,
                    "chat loop finished"
                );
                let _ = tx
                    .send(StreamEvent::Done {
                        model: state.config.model.name.clone(),
                        tokens_in: outcome.tokens_in,
                        tokens_out: outcome.tokens_out,
                        finish_reason: outcome.finish_reason,
                    })
                    .await;
            }
            Err(e) => {
                warn!(error = %e, "chat loop failed");
                let _ = tx
                    .send(StreamEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
                let _ = tx
                    .send(StreamEvent::Done {
                        model: state.config.model.name.clone(),
                        tokens_in: 0,
                        tokens_out: 0,
                        finish_reason: "error".to_string(),
                    })
                    .await;
            }
        }
    });

    let stream = async_stream::stream! {
        let mut finish_reason: Option<String> = None;
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::TextDelta { text } => {
                    yield Ok(frame_event(&StreamFrame::text_delta(text)));
                }
                StreamEvent::ToolUse { id, name, args } => {
                    yield Ok(frame_event(&StreamFrame::tool_call(id, name, args)));
                }
                StreamEvent::ToolResult { id, name, payload, is_error } => {
                    yield Ok(frame_event(&StreamFrame::tool_result(id, name, payload, is_error)));
                }
                StreamEvent::Error { message } => {
                    yield Ok(frame_event(&StreamFrame::error("MODEL_PROVIDER_ERROR", &message)));
                }
                StreamEvent::Done { finish_reason: reason, .. } => {
                    finish_reason = (!reason.is_empty()).then_some(reason);
                    break;
                }
            }
        }
        // every stream closes with exactly one done frame, whatever happened
        let done = match finish_reason {
            Some(reason) => StreamFrame::done_with_reason(reason),
            None => StreamFrame::done(),
        };
        yield Ok(frame_event(&done));
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Per-request tool registry. Both tools share the process-wide catalog
/// client; the payment tool also carries the request's Reserve intent so
/// it can pin the item id to what the user actually picked.
fn build_tools(state: &AppState, intent: Option<IntentData>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(SearchItemsTool::new(Arc::clone(&state.catalog))),
        Box::new(PaymentLinkTool::new(
            Arc::clone(&state.catalog),
            state.config.payment.checkout_base_url.clone(),
            intent,
        )),
    ]
}

fn frame_event(frame: &StreamFrame) -> Event {
    Event::default().data(serde_json::to_string(frame).unwrap_or_default())
}
