use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{ChatReply, ChatRequest};

use super::read_json;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Used when the node names the provider rather than a concrete Claude model.
const FALLBACK_MODEL: &str = "claude-3-5-haiku-20241022";

pub struct AnthropicClient {
    http: Client,
    api_key: String,
    url: String,
}

impl AnthropicClient {
    pub fn new(api_key: &str, base_url: Option<&str>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.to_string(),
            url: base_url.unwrap_or(ANTHROPIC_API_URL).to_string(),
        }
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatReply> {
        let body = request_body(request);
        let response = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| FlowError::Http(e.to_string()))?;

        let data = read_json("Anthropic", response).await?;
        Ok(parse_reply(&request.model, &data))
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ApiMessage<'a>; 1],
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

fn request_body(request: &ChatRequest) -> AnthropicRequest<'_> {
    let model = if request.model.contains("claude") {
        request.model.as_str()
    } else {
        FALLBACK_MODEL
    };
    AnthropicRequest {
        model,
        max_tokens: request.max_tokens,
        messages: [ApiMessage {
            role: "user",
            content: &request.prompt,
        }],
    }
}

fn parse_reply(model: &str, data: &Value) -> ChatReply {
    ChatReply {
        text: data
            .pointer("/content/0/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        model: model.to_string(),
        usage: data.get("usage").cloned(),
    }
}
