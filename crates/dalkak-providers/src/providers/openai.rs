use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{ChatReply, ChatRequest};

use super::read_json;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible chat completions client. Works with any endpoint that
/// speaks the same API via `base_url`.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    url: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, base_url: Option<&str>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.to_string(),
            url: base_url.unwrap_or(OPENAI_API_URL).to_string(),
        }
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatReply> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| FlowError::Http(e.to_string()))?;

        let data = read_json("OpenAI", response).await?;
        Ok(parse_reply(&request.model, &data))
    }
}

#[derive(Serialize)]
struct OaiRequest<'a> {
    model: &'a str,
    messages: [OaiMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct OaiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

fn request_body(request: &ChatRequest) -> OaiRequest<'_> {
    OaiRequest {
        model: &request.model,
        messages: [OaiMessage {
            role: "user",
            content: &request.prompt,
        }],
        max_tokens: request.max_tokens,
    }
}

fn parse_reply(model: &str, data: &Value) -> ChatReply {
    ChatReply {
        text: data
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        model: model.to_string(),
        usage: data.get("usage").cloned(),
    }
}
