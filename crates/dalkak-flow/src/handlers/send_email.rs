use serde_json::{json, Map, Value};
use tracing::info;

use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{EmailMessage, EmailSender};

use crate::context::NodeContext;
use crate::template::render_template;

use super::config_str;

fn rendered(config: &Map<String, Value>, key: &str, ctx: &NodeContext) -> String {
    config_str(config, key)
        .map(|raw| render_template(&raw, ctx))
        .unwrap_or_default()
}

/// Send `config.body` to `config.to`. All three fields are templates.
///
/// Without a configured provider the node succeeds with a mock result so
/// flows can be tested without live credentials.
pub async fn run(
    config: &Map<String, Value>,
    ctx: &NodeContext,
    sender: Option<&dyn EmailSender>,
) -> Result<Value> {
    let to = rendered(config, "to", ctx);
    let to = to.trim();
    if to.is_empty() {
        return Err(FlowError::node("send_email", "\"to\" address is required"));
    }
    let subject = rendered(config, "subject", ctx);
    let html = rendered(config, "body", ctx);

    let Some(sender) = sender else {
        info!(to = %to, subject = %subject, "Email provider not configured, returning mock result");
        return Ok(json!({
            "sent": false,
            "mock": true,
            "to": to,
            "subject": subject,
            "message": "Email provider not configured; message was not sent",
        }));
    };

    let receipt = sender
        .send(EmailMessage {
            to: to.to_string(),
            subject: subject.clone(),
            html,
        })
        .await?;
    info!(provider = sender.name(), to = %to, id = ?receipt.id, "Email sent");

    Ok(json!({
        "sent": true,
        "to": to,
        "subject": subject,
        "id": receipt.id,
    }))
}
