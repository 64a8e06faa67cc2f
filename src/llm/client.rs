use std::sync::Arc;

use anyhow::Result;

use super::providers::{ChatProvider, Message, OpenAIProvider};
use super::retry::{with_retry, RetryConfig};
use crate::config::OpenAiConfig;

/// Chat-completion client with retry around the provider call
pub struct LlmClient {
    provider: Arc<dyn ChatProvider>,
    retry_config: RetryConfig,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn ChatProvider>, retry_config: RetryConfig) -> Self {
        Self {
            provider,
            retry_config,
        }
    }

    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        let provider = OpenAIProvider::from_config(config)?;
        let retry_config = RetryConfig {
            max_retries: config.max_retries,
            ..Default::default()
        };
        Ok(Self::new(Arc::new(provider), retry_config))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn chat(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let messages = vec![Message::system(system_prompt), Message::user(user_message)];

        let provider = self.provider.clone();
        let response = with_retry(&self.retry_config, || {
            let p = provider.clone();
            let m = messages.clone();
            async move { p.chat(m).await }
        })
        .await?;

        if let Some(reason) = &response.stop_reason {
            tracing::debug!("Chat completion finished: {}", reason);
        }
        Ok(response.content)
    }
}
