//! Replay of client-held chat history into model contents.
//!
//! The backend is stateless: every request carries the whole conversation.
//! Completed tool invocations are converted into functionCall/functionResponse
//! part pairs so the model sees its earlier calls as context. Nothing here
//! executes a tool — replay is read-only.

use rentmate_protocol::ChatMessage;
use serde_json::Value;
use tracing::debug;

use crate::content::{Content, FunctionCall, FunctionResponse};

pub fn contents_from_messages(messages: &[ChatMessage]) -> Vec<Content> {
    let mut contents = Vec::new();

    for msg in messages {
        match msg.role.as_str() {
            "user" => {
                if !msg.content.is_empty() {
                    contents.push(Content::user_text(msg.content.as_str()));
                }
            }
            "assistant" => {
                // invocations still in `call`/`partial-call` state never
                // completed; replaying the call without its response would
                // leave the model turn dangling, so they are dropped
                let completed: Vec<_> = msg
                    .tool_invocations
                    .iter()
                    .filter(|inv| inv.is_result())
                    .collect();

                let calls: Vec<FunctionCall> = completed
                    .iter()
                    .map(|inv| FunctionCall {
                        name: inv.tool_name.clone(),
                        args: inv.args.clone(),
                    })
                    .collect();

                let text = (!msg.content.is_empty()).then(|| msg.content.clone());
                if text.is_none() && calls.is_empty() {
                    continue;
                }
                contents.push(Content::model_turn(text, calls));

                if !completed.is_empty() {
                    let responses = completed
                        .iter()
                        .map(|inv| {
                            FunctionResponse::new(
                                inv.tool_name.as_str(),
                                inv.result.clone().unwrap_or(Value::Null),
                            )
                        })
                        .collect();
                    contents.push(Content::function_results(responses));
                }
            }
            other => {
                debug!(role = %other, "dropping history message with unsupported role");
            }
        }
    }

    contents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Part;
    use rentmate_protocol::ToolInvocation;

    fn assistant_with_invocation(state: &str, result: Option<Value>) -> ChatMessage {
        let mut msg = ChatMessage::assistant("Here's what I found.");
        msg.tool_invocations.push(ToolInvocation {
            state: state.to_string(),
            tool_call_id: "call-1".to_string(),
            tool_name: "searchItems".to_string(),
            args: serde_json::json!({
                "query": "ps5",
                "start_date": "2026-01-10",
                "end_date": "2026-01-13"
            }),
            result,
        });
        msg
    }

    #[test]
    fn plain_turns_map_to_user_and_model_roles() {
        let contents = contents_from_messages(&[
            ChatMessage::user("I need a PS5 on rent"),
            ChatMessage::assistant("When do you need it?"),
        ]);

        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
    }

    #[test]
    fn completed_invocation_becomes_call_and_response_pair() {
        let rows = serde_json::json!([
            {"id": "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11", "name": "PS5"}
        ]);
        let contents = contents_from_messages(&[
            ChatMessage::user("any ps5 this weekend?"),
            assistant_with_invocation("result", Some(rows)),
        ]);

        // user turn, model turn (text + call), user turn carrying the response
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1].role, "model");
        assert!(matches!(contents[1].parts[0], Part::Text { .. }));
        match &contents[1].parts[1] {
            Part::FunctionCall { function_call } => {
                assert_eq!(function_call.name, "searchItems");
                assert_eq!(function_call.args["query"], "ps5");
            }
            other => panic!("expected functionCall part, got {other:?}"),
        }

        assert_eq!(contents[2].role, "user");
        match &contents[2].parts[0] {
            Part::FunctionResponse { function_response } => {
                assert_eq!(function_response.name, "searchItems");
                // array payloads are wrapped for the wire
                assert_eq!(
                    function_response.response["result"][0]["id"],
                    "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"
                );
            }
            other => panic!("expected functionResponse part, got {other:?}"),
        }
    }

    #[test]
    fn incomplete_invocations_are_dropped() {
        let contents = contents_from_messages(&[
            ChatMessage::user("any ps5?"),
            assistant_with_invocation("call", None),
        ]);

        // the model turn keeps its text but loses the dangling call
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[1].parts.len(), 1);
        assert!(matches!(contents[1].parts[0], Part::Text { .. }));
    }

    #[test]
    fn empty_and_system_messages_are_skipped() {
        let contents = contents_from_messages(&[
            ChatMessage {
                role: "system".to_string(),
                content: "ignore me".to_string(),
                tool_invocations: vec![],
            },
            ChatMessage::user(""),
            ChatMessage::user("hello"),
        ]);

        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
    }
}
