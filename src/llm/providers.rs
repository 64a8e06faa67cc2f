use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub stop_reason: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn chat(&self, messages: Vec<Message>) -> Result<ChatResponse>;
    fn name(&self) -> &str;
}

// ============================================================================
// OPENAI CHAT COMPLETIONS
// ============================================================================

pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    organization: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            organization: None,
            model,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        }
    }

    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .resolve_api_key()
            .context("OpenAI API key not found. Set OPENAI_API_KEY env var.")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            organization: config.resolve_organization(),
            model: config.chat_model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request_body(&self, messages: &[Message]) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": messages
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    async fn chat(&self, messages: Vec<Message>) -> Result<ChatResponse> {
        let body = self.request_body(&messages);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(org) = &self.organization {
            builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder
            .json(&body)
            .send()
            .await
            .context("Failed to send chat completion request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat API error ({}): {}", status, text);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        parse_chat_response(&json)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn parse_chat_response(json: &serde_json::Value) -> Result<ChatResponse> {
    let choice = &json["choices"][0];
    let content = choice["message"]["content"]
        .as_str()
        .context("Chat completion response has no message content")?
        .to_string();

    let stop_reason = choice["finish_reason"].as_str().map(String::from);

    Ok(ChatResponse {
        content,
        stop_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_roles_serialize_lowercase() {
        let json = serde_json::to_value(Message::system("be helpful")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be helpful");

        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_request_body() {
        let provider = OpenAIProvider::new("sk-test".to_string(), "gpt-3.5-turbo".to_string(), None);
        let body = provider.request_body(&[Message::system("sys"), Message::user("hi")]);

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_parse_chat_response() {
        let json = serde_json::json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Try Pete's Tavern."},
                "finish_reason": "stop"
            }]
        });
        let response = parse_chat_response(&json).unwrap();

        assert_eq!(response.content, "Try Pete's Tavern.");
        assert_eq!(response.stop_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_chat_response_without_choices() {
        let json = serde_json::json!({"choices": []});
        assert!(parse_chat_response(&json).is_err());
    }
}
