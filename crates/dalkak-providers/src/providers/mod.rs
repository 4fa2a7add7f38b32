//! AI chat providers for `ai_chat` nodes.
//!
//! Single-turn, non-streaming calls. `ModelRouter` picks the provider from
//! the model name.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use futures::future::BoxFuture;
use reqwest::Response;
use tracing::debug;

use dalkak_core::config::{configured, ProvidersConfig};
use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{ChatClient, ChatReply, ChatRequest};

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Which backend serves a model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
}

impl Provider {
    pub fn for_model(model: &str) -> Self {
        if model.contains("claude") || model.contains("anthropic") {
            Provider::Anthropic
        } else if model.contains("gemini") {
            Provider::Gemini
        } else {
            Provider::OpenAi
        }
    }
}

/// Routes each request to the provider its model belongs to.
///
/// A provider without an API key fails only the nodes that need it.
pub struct ModelRouter {
    openai: Option<OpenAiClient>,
    anthropic: Option<AnthropicClient>,
    gemini: Option<GeminiClient>,
}

impl ModelRouter {
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self {
            openai: configured(&config.openai_api_key)
                .map(|key| OpenAiClient::new(key, configured(&config.openai_base_url))),
            anthropic: configured(&config.anthropic_api_key)
                .map(|key| AnthropicClient::new(key, configured(&config.anthropic_base_url))),
            gemini: configured(&config.gemini_api_key)
                .map(|key| GeminiClient::new(key, configured(&config.gemini_base_url))),
        }
    }
}

fn not_configured(provider: &str) -> FlowError {
    FlowError::node("ai_chat", format!("{provider} API key not configured"))
}

impl ChatClient for ModelRouter {
    fn complete(&self, request: ChatRequest) -> BoxFuture<'_, Result<ChatReply>> {
        Box::pin(async move {
            let provider = Provider::for_model(&request.model);
            debug!(model = %request.model, ?provider, "Routing ai_chat request");
            match provider {
                Provider::Anthropic => {
                    let client = self.anthropic.as_ref().ok_or_else(|| not_configured("Anthropic"))?;
                    client.complete(&request).await
                }
                Provider::Gemini => {
                    let client = self.gemini.as_ref().ok_or_else(|| not_configured("Gemini"))?;
                    client.complete(&request).await
                }
                Provider::OpenAi => {
                    let client = self.openai.as_ref().ok_or_else(|| not_configured("OpenAI"))?;
                    client.complete(&request).await
                }
            }
        })
    }
}

/// Read a provider response body as JSON, turning non-2xx statuses into a
/// provider error carrying the API's own message when it sends one.
pub(crate) async fn read_json(provider: &str, response: Response) -> Result<serde_json::Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| FlowError::Http(e.to_string()))?;
    let body: serde_json::Value = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);

    if !status.is_success() {
        let message = body
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        return Err(FlowError::provider(provider, format!("HTTP {}: {message}", status.as_u16())));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_model_name() {
        assert_eq!(Provider::for_model("gpt-4o-mini"), Provider::OpenAi);
        assert_eq!(Provider::for_model("claude-3-5-haiku-20241022"), Provider::Anthropic);
        assert_eq!(Provider::for_model("anthropic"), Provider::Anthropic);
        assert_eq!(Provider::for_model("gemini-1.5-flash"), Provider::Gemini);
        assert_eq!(Provider::for_model("llama3"), Provider::OpenAi);
    }

    #[tokio::test]
    async fn test_missing_key_fails_the_node() {
        let router = ModelRouter::from_config(&ProvidersConfig::default());
        let err = router
            .complete(ChatRequest {
                model: "claude-3-5-haiku-20241022".into(),
                prompt: "hi".into(),
                max_tokens: 16,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ai_chat: Anthropic API key not configured");
    }

    #[test]
    fn test_placeholder_keys_count_as_missing() {
        let config = ProvidersConfig {
            openai_api_key: Some("${OPENAI_API_KEY}".into()),
            gemini_api_key: Some("g-key".into()),
            ..ProvidersConfig::default()
        };
        let router = ModelRouter::from_config(&config);
        assert!(router.openai.is_none());
        assert!(router.gemini.is_some());
    }
}
