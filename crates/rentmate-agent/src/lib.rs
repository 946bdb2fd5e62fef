pub mod chat;
pub mod content;
pub mod gemini;
pub mod history;
pub mod prompt;
pub mod provider;
pub mod stream;
pub mod tools;

pub use chat::{run_chat_loop, ChatOutcome, MAX_STEPS};
pub use content::Content;
pub use gemini::GeminiProvider;
pub use provider::{
    ChatRequest, ModelProvider, ModelResponse, ProviderError, ToolCall, ToolDefinition,
};
pub use stream::StreamEvent;
