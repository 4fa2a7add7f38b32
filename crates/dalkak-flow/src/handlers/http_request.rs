use reqwest::Url;
use serde_json::{json, Map, Value};
use tracing::debug;

use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{HttpCall, HttpFetcher};

use crate::context::NodeContext;
use crate::template::{display_value, render_template};

use super::config_str;

const BODY_METHODS: &[&str] = &["POST", "PUT", "PATCH"];

/// Call an external HTTP endpoint.
///
/// `url`, header values and string bodies are templates. Only `http` and
/// `https` URLs are allowed. Non-2xx responses are returned as output, not
/// treated as failures.
pub async fn run(config: &Map<String, Value>, ctx: &NodeContext, fetcher: &dyn HttpFetcher) -> Result<Value> {
    let raw_url = config_str(config, "url").unwrap_or_default();
    if raw_url.trim().is_empty() {
        return Err(FlowError::node("http_request", "url is required"));
    }
    let url = render_template(&raw_url, ctx);
    let parsed =
        Url::parse(url.trim()).map_err(|_| FlowError::node("http_request", format!("invalid URL \"{url}\"")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FlowError::node(
            "http_request",
            format!("protocol \"{}:\" not allowed", parsed.scheme()),
        ));
    }

    let method = config_str(config, "method")
        .map(|m| m.trim().to_uppercase())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "GET".to_string());

    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    if let Some(Value::Object(extra)) = config.get("headers") {
        for (name, value) in extra {
            let value = render_template(&display_value(value), ctx);
            match headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
                Some(existing) => existing.1 = value,
                None => headers.push((name.clone(), value)),
            }
        }
    }

    let body = if BODY_METHODS.contains(&method.as_str()) {
        match config.get("body") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(render_template(s, ctx)),
            Some(other) => Some(other.to_string()),
        }
    } else {
        None
    };

    debug!(method = %method, url = %parsed, "Issuing http_request");
    let reply = fetcher
        .fetch(HttpCall {
            method,
            url: parsed.to_string(),
            headers,
            body,
        })
        .await?;

    let data = if reply.content_type.contains("application/json") {
        serde_json::from_str(&reply.body).unwrap_or(Value::String(reply.body))
    } else {
        Value::String(reply.body)
    };

    Ok(json!({
        "status": reply.status,
        "statusText": reply.status_text,
        "data": data,
    }))
}
