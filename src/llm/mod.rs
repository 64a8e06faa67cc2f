mod client;
mod providers;
mod retry;

pub use client::LlmClient;
pub use providers::{ChatProvider, ChatResponse, Message, OpenAIProvider, Role};
pub use retry::{is_retryable_error, with_retry, RetryConfig, RetryDecision};
