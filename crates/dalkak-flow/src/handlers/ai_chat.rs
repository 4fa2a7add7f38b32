use serde_json::{json, Map, Value};

use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{ChatClient, ChatRequest};

use crate::context::NodeContext;
use crate::template::render_template;

use super::{config_str, config_u64};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Single-turn prompt to an AI model. The provider is picked from the model name
/// by the injected `ChatClient`.
pub async fn run(config: &Map<String, Value>, ctx: &NodeContext, chat: &dyn ChatClient) -> Result<Value> {
    let raw_prompt = config_str(config, "prompt").unwrap_or_default();
    if raw_prompt.is_empty() {
        return Err(FlowError::node("ai_chat", "prompt is required"));
    }

    let model = config_str(config, "model")
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let max_tokens = config_u64(config, "maxTokens")
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_MAX_TOKENS);

    let reply = chat
        .complete(ChatRequest {
            model,
            prompt: render_template(&raw_prompt, ctx),
            max_tokens,
        })
        .await?;

    Ok(json!({
        "text": reply.text,
        "model": reply.model,
        "usage": reply.usage,
    }))
}
