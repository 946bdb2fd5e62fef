pub mod frames;
pub mod messages;
pub mod names;

pub use frames::StreamFrame;
pub use messages::{ChatMessage, ChatPayload, IntentData, ToolInvocation};
