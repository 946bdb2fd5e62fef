//! Streaming model⇄tool loop — the core agentic behavior.
//!
//! Flow: contents → model → if function calls → execute tools → inject
//! results → model again. Stops when the model answers without calls, the
//! step bound is hit, or the provider fails. Text deltas, tool calls and
//! tool results are forwarded on the event channel as they happen; the
//! caller owns stream termination.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::content::{Content, FunctionCall, FunctionResponse};
use crate::provider::{ChatRequest, ModelProvider, ProviderError, ToolCall};
use crate::stream::StreamEvent;
use crate::tools::{Tool, ToolOutcome};

/// Maximum model round trips per request. Tool calls requested by the final
/// round trip are still executed and streamed; there is just no further
/// model call after them.
pub const MAX_STEPS: usize = 5;

/// Summary of a finished loop, for logging and the closing frame.
#[derive(Debug, Clone, Default)]
pub struct ChatOutcome {
    pub finish_reason: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub steps: usize,
}

struct StepOutcome {
    text: String,
    calls: Vec<ToolCall>,
    finish_reason: String,
    tokens_in: u32,
    tokens_out: u32,
    stream_error: bool,
    client_gone: bool,
}

pub async fn run_chat_loop(
    provider: &dyn ModelProvider,
    tools: &[Box<dyn Tool>],
    mut request: ChatRequest,
    events: mpsc::Sender<StreamEvent>,
) -> Result<ChatOutcome, ProviderError> {
    let mut outcome = ChatOutcome::default();

    for step in 1..=MAX_STEPS {
        outcome.steps = step;
        debug!(step, contents = request.contents.len(), "model round trip");

        let (step_tx, step_rx) = mpsc::channel::<StreamEvent>(64);
        let (send_result, step_out) = tokio::join!(
            provider.send_stream(&request, step_tx),
            drain_step(step_rx, &events),
        );
        send_result?;

        outcome.tokens_in += step_out.tokens_in;
        outcome.tokens_out += step_out.tokens_out;
        if !step_out.finish_reason.is_empty() {
            outcome.finish_reason = step_out.finish_reason.clone();
        }

        if step_out.client_gone {
            info!(step, "client disconnected, stopping loop");
            return Ok(outcome);
        }
        if step_out.stream_error {
            outcome.finish_reason = "error".to_string();
            return Ok(outcome);
        }
        if step_out.calls.is_empty() {
            info!(step, finish_reason = %outcome.finish_reason, "chat loop complete");
            return Ok(outcome);
        }

        request.contents.push(Content::model_turn(
            (!step_out.text.is_empty()).then(|| step_out.text.clone()),
            step_out
                .calls
                .iter()
                .map(|c| FunctionCall {
                    name: c.name.clone(),
                    args: c.args.clone(),
                })
                .collect(),
        ));

        let mut responses = Vec::with_capacity(step_out.calls.len());
        for call in &step_out.calls {
            let result = execute_tool(tools, call).await;
            let _ = events
                .send(StreamEvent::ToolResult {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    payload: result.payload.clone(),
                    is_error: result.is_error,
                })
                .await;
            responses.push(FunctionResponse::new(call.name.as_str(), result.payload));
        }
        request.contents.push(Content::function_results(responses));

        if step == MAX_STEPS {
            warn!(max_steps = MAX_STEPS, "chat loop hit step bound");
        }
    }

    Ok(outcome)
}

/// Consume one model round trip's events: forward text deltas and tool
/// calls to the caller immediately, collect everything the loop needs to
/// decide the next step. The per-step Done event is captured here and never
/// forwarded — the request stream has exactly one terminator, owned by the
/// HTTP handler.
async fn drain_step(
    mut step_rx: mpsc::Receiver<StreamEvent>,
    events: &mpsc::Sender<StreamEvent>,
) -> StepOutcome {
    let mut out = StepOutcome {
        text: String::new(),
        calls: Vec::new(),
        finish_reason: String::new(),
        tokens_in: 0,
        tokens_out: 0,
        stream_error: false,
        client_gone: false,
    };

    while let Some(event) = step_rx.recv().await {
        match event {
            StreamEvent::TextDelta { text } => {
                out.text.push_str(&text);
                if events.send(StreamEvent::TextDelta { text }).await.is_err() {
                    out.client_gone = true;
                    return out;
                }
            }
            StreamEvent::ToolUse { id, name, args } => {
                out.calls.push(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    args: args.clone(),
                });
                if events
                    .send(StreamEvent::ToolUse { id, name, args })
                    .await
                    .is_err()
                {
                    out.client_gone = true;
                    return out;
                }
            }
            StreamEvent::Done {
                tokens_in,
                tokens_out,
                finish_reason,
                ..
            } => {
                out.tokens_in = tokens_in;
                out.tokens_out = tokens_out;
                out.finish_reason = finish_reason;
            }
            StreamEvent::Error { message } => {
                warn!(error = %message, "model stream error");
                let _ = events.send(StreamEvent::Error { message }).await;
                out.stream_error = true;
                return out;
            }
            StreamEvent::ToolResult { .. } => {
                // providers never emit results; ignore if one does
            }
        }
    }

    out
}

/// Find and execute the named tool. Unknown names become an error outcome.
async fn execute_tool(tools: &[Box<dyn Tool>], call: &ToolCall) -> ToolOutcome {
    match tools.iter().find(|t| t.name() == call.name) {
        Some(tool) => {
            debug!(tool = %call.name, "executing tool");
            tool.execute(call.args.clone()).await
        }
        None => ToolOutcome::error(format!("unknown tool: {}", call.name)),
    }
}
