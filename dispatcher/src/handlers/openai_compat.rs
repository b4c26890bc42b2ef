//! AI provider proxy handler for OpenAI-compatible chat APIs.
//!
//! One canonical handler is registered per provider id; whether it is
//! usable comes from the active ConfigProvider at dispatch time (key
//! present, capability enabled), never from competing registrations.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use dispatch_common::{HandlerDescriptor, HandlerSource};

use crate::config::ProviderConfig;
use crate::engine::{ExecuteContext, Handler, HandlerError, HandlerResult};
use crate::provider::ConfigProvider;

/// Proxies a capability to an OpenAI-compatible chat-completions
/// endpoint.
pub struct OpenAiCompatHandler {
    descriptor: HandlerDescriptor,
    http_client: Client,
    base_url: String,
    model: String,
    system_prompt: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateInput {
    prompt: String,
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatHandler {
    /// Text generation backed by the `openai` provider.
    pub fn text_generation(config: &ProviderConfig) -> Self {
        Self::new(
            "openai-text-generator",
            "OpenAI text generator",
            "openai",
            "text:generate",
            config,
            "You are a writing assistant. Produce clear, well-structured prose.",
        )
    }

    /// Deep research backed by the `perplexity` provider.
    pub fn research(config: &ProviderConfig) -> Self {
        Self::new(
            "perplexity-researcher",
            "Perplexity researcher",
            "perplexity",
            "research:deep",
            config,
            "You are a research assistant. Answer with sourced, factual findings.",
        )
    }

    fn new(
        id: &str,
        name: &str,
        provider_id: &str,
        capability: &str,
        config: &ProviderConfig,
        system_prompt: &'static str,
    ) -> Self {
        Self {
            descriptor: HandlerDescriptor {
                id: id.to_string(),
                name: name.to_string(),
                source: HandlerSource::AiProvider,
                provider_id: Some(provider_id.to_string()),
                capabilities: vec![capability.to_string()],
                priority: 100,
            },
            http_client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            system_prompt,
        }
    }

    fn provider_id(&self) -> &str {
        self.descriptor
            .provider_id
            .as_deref()
            .expect("provider handlers always carry a provider id")
    }
}

#[async_trait]
impl Handler for OpenAiCompatHandler {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    fn check_availability(&self, config: &dyn ConfigProvider) -> bool {
        let capability_enabled = self
            .descriptor
            .capabilities
            .iter()
            .all(|c| config.capability_settings(c).enabled);
        capability_enabled && config.stored_key(self.provider_id()).is_some()
    }

    async fn execute(&self, input: &Value, ctx: &ExecuteContext<'_>) -> HandlerResult {
        let input: GenerateInput = serde_json::from_value(input.clone())
            .map_err(|e| HandlerError::InvalidInput(e.to_string()))?;
        if input.prompt.trim().is_empty() {
            return Err(HandlerError::InvalidInput("prompt must not be empty".into()));
        }

        let key = ctx.config.stored_key(self.provider_id()).ok_or_else(|| {
            HandlerError::Provider(format!(
                "no credential configured for provider '{}'",
                self.provider_id()
            ))
        })?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: input.prompt,
                },
            ],
            max_tokens: input.max_tokens,
            temperature: input.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&key.key)
            .timeout(ctx.deadline)
            .json(&request)
            .send()
            .await
            .map_err(|e| HandlerError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HandlerError::Provider(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| HandlerError::Provider(e.to_string()))?;
        let text = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| HandlerError::Provider("response contained no content".into()))?;

        Ok(json!({
            "text": text,
            "model": parsed.model.unwrap_or_else(|| self.model.clone()),
            "usage": parsed.usage,
        }))
    }
}
