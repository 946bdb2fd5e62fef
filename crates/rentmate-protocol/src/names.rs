// Well-known wire names shared by the backend, the model and the UI.

// tools
pub const TOOL_SEARCH_ITEMS: &str = "searchItems";
pub const TOOL_GENERATE_PAYMENT_LINK: &str = "generatePaymentLink";

// intents attached by UI actions
pub const INTENT_RESERVE: &str = "RESERVE";
pub const INTENT_GENERATE_PAYMENT_LINK: &str = "GENERATE_PAYMENT_LINK";

// tool invocation states (useChat message format)
pub const STATE_PARTIAL_CALL: &str = "partial-call";
pub const STATE_CALL: &str = "call";
pub const STATE_RESULT: &str = "result";
