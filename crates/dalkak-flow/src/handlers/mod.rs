//! Per-type node evaluators.
//!
//! Each handler maps `(config, context)` to an output value or a
//! `FlowError`. Handlers never see other nodes; the executor hands them the
//! outputs they depend on through `NodeContext`.

pub mod ai_chat;
pub mod condition;
pub mod http_request;
pub mod send_email;
pub mod transform;
pub mod trigger;

use std::sync::Arc;

use serde_json::{Map, Value};

use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{ChatClient, EmailSender, HttpFetcher};
use dalkak_core::types::{FlowNode, NodeKind};

use crate::context::NodeContext;
use crate::template::display_value;

/// Collaborators available to node handlers, injected once at startup.
///
/// `email` is `None` when no provider credentials are configured; `send_email`
/// nodes then answer with a mock result instead of failing.
#[derive(Clone)]
pub struct FlowServices {
    pub email: Option<Arc<dyn EmailSender>>,
    pub chat: Arc<dyn ChatClient>,
    pub http: Arc<dyn HttpFetcher>,
}

impl FlowServices {
    pub fn new(chat: Arc<dyn ChatClient>, http: Arc<dyn HttpFetcher>) -> Self {
        Self {
            email: None,
            chat,
            http,
        }
    }

    /// Attach a live email provider.
    pub fn with_email(mut self, email: Arc<dyn EmailSender>) -> Self {
        self.email = Some(email);
        self
    }
}

/// Run one node's handler.
pub async fn run_node(node: &FlowNode, ctx: &NodeContext, services: &FlowServices) -> Result<Value> {
    match &node.kind {
        NodeKind::Trigger => Ok(trigger::run(&node.config)),
        NodeKind::Condition => condition::run(&node.config, ctx),
        NodeKind::Transform => Ok(transform::run(&node.config, ctx)),
        NodeKind::SendEmail => send_email::run(&node.config, ctx, services.email.as_deref()).await,
        NodeKind::HttpRequest => http_request::run(&node.config, ctx, services.http.as_ref()).await,
        NodeKind::AiChat => ai_chat::run(&node.config, ctx, services.chat.as_ref()).await,
        NodeKind::Unknown(tag) => Err(FlowError::UnknownNodeType(tag.clone())),
    }
}

/// String form of a config field; `None` when absent or null.
pub(crate) fn config_str(config: &Map<String, Value>, key: &str) -> Option<String> {
    match config.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(display_value(v)),
    }
}

/// Positive integer config field, accepting numbers or numeric strings.
pub(crate) fn config_u64(config: &Map<String, Value>, key: &str) -> Option<u64> {
    match config.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
