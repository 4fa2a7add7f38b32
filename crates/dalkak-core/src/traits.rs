use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Outbound email, already template-rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement for a sent email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailReceipt {
    pub id: Option<String>,
}

/// Email provider. Absent from `FlowServices` when no credentials are configured.
pub trait EmailSender: Send + Sync + 'static {
    /// Provider name for logs.
    fn name(&self) -> &str;

    fn send(&self, message: EmailMessage) -> BoxFuture<'_, Result<EmailReceipt>>;
}

/// A single-turn prompt for an AI model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub model: String,
    #[serde(default)]
    pub usage: Option<serde_json::Value>,
}

/// AI model access. Provider routing happens behind this trait.
pub trait ChatClient: Send + Sync + 'static {
    fn complete(&self, request: ChatRequest) -> BoxFuture<'_, Result<ChatReply>>;
}

/// Outbound HTTP call issued by an `http_request` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpCall {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpReply {
    pub status: u16,
    pub status_text: String,
    pub content_type: String,
    pub body: String,
}

/// HTTP transport.
pub trait HttpFetcher: Send + Sync + 'static {
    fn fetch(&self, call: HttpCall) -> BoxFuture<'_, Result<HttpReply>>;
}

/// Identity returned by a session lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// External session backend. `Ok(None)` means the token is not a live session.
pub trait SessionLookup: Send + Sync + 'static {
    fn lookup<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Option<SessionUser>>>;
}
