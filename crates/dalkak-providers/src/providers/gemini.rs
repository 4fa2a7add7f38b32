use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{ChatReply, ChatRequest};

use super::read_json;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, base_url: Option<&str>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.to_string(),
            base: base_url
                .unwrap_or(GEMINI_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{}:generateContent", self.base, model)
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatReply> {
        let body = GeminiRequest {
            contents: [GeminiContent {
                parts: [GeminiPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
            },
        };

        let response = self
            .http
            .post(self.endpoint(&request.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| FlowError::Http(e.to_string()))?;

        let data = read_json("Gemini", response).await?;
        Ok(parse_reply(&request.model, &data))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: [GeminiContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: [GeminiPart<'a>; 1],
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

fn parse_reply(model: &str, data: &Value) -> ChatReply {
    ChatReply {
        text: data
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        model: model.to_string(),
        usage: data.get("usageMetadata").cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_includes_model() {
        let client = GeminiClient::new("k", Some("http://localhost:9000/models/"));
        assert_eq!(
            client.endpoint("gemini-1.5-flash"),
            "http://localhost:9000/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_parse_reply() {
        let data = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Bonjour" }] } }],
            "usageMetadata": { "totalTokenCount": 4 }
        });
        let reply = parse_reply("gemini-1.5-flash", &data);
        assert_eq!(reply.text, "Bonjour");
        assert_eq!(reply.usage, Some(json!({ "totalTokenCount": 4 })));
    }

    #[test]
    fn test_request_body_shape() {
        let body = GeminiRequest {
            contents: [GeminiContent {
                parts: [GeminiPart { text: "hi" }],
            }],
            generation_config: GenerationConfig { max_output_tokens: 8 },
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({
                "contents": [{ "parts": [{ "text": "hi" }] }],
                "generationConfig": { "maxOutputTokens": 8 }
            })
        );
    }
}
