/// Events emitted while a model response streams.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Incremental text content from the model.
    TextDelta { text: String },

    /// Model wants to call a tool.
    ToolUse {
        id: String,
        name: String,
        args: serde_json::Value,
    },

    /// A tool finished; the payload goes back into the model loop and out
    /// to the client. Errors ride the same event with `is_error` set.
    ToolResult {
        id: String,
        name: String,
        payload: serde_json::Value,
        is_error: bool,
    },

    /// One model round trip completed.
    Done {
        model: String,
        tokens_in: u32,
        tokens_out: u32,
        finish_reason: String,
    },

    /// Error during streaming.
    Error { message: String },
}

/// Parse a single SSE line from a streaming model API.
/// SSE format: `event: <type>\ndata: <json>\n\n`
pub fn parse_sse_line(line: &str) -> Option<SseParsed> {
    if let Some(event_type) = line.strip_prefix("event: ") {
        Some(SseParsed::Event(event_type.to_string()))
    } else {
        line.strip_prefix("data: ")
            .map(|data| SseParsed::Data(data.to_string()))
    }
}

/// Drain the longest valid UTF-8 prefix of `buf` as owned text.
///
/// Network chunks can split a multibyte character; its leading bytes stay
/// in the buffer until the rest arrives. Genuinely invalid bytes are
/// dropped rather than stalling the stream.
pub fn take_utf8_prefix(buf: &mut Vec<u8>) -> String {
    match std::str::from_utf8(buf) {
        Ok(text) => {
            let text = text.to_string();
            buf.clear();
            text
        }
        // buffer ends mid-character: emit up to it, keep the tail
        Err(e) if e.error_len().is_none() => {
            let valid = e.valid_up_to();
            let text = String::from_utf8_lossy(&buf[..valid]).into_owned();
            buf.drain(..valid);
            text
        }
        Err(e) => {
            let valid = e.valid_up_to();
            let text = String::from_utf8_lossy(&buf[..valid]).into_owned();
            buf.clear();
            text
        }
    }
}

#[derive(Debug)]
pub enum SseParsed {
    Event(String),
    Data(String),
}
