//! In-memory stand-ins for the collaborators behind `dalkak_core::traits`.
//!
//! Each one records what it was asked to do so tests can assert on it.

use std::collections::HashMap;
use std::sync::Mutex;

use futures::future::BoxFuture;

use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{
    ChatClient, ChatReply, ChatRequest, EmailMessage, EmailReceipt, EmailSender, HttpCall, HttpFetcher,
    HttpReply, SessionLookup, SessionUser,
};

/// Accepts every message and hands back `msg_<n>` ids.
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmailSender for RecordingEmailSender {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(&self, message: EmailMessage) -> BoxFuture<'_, Result<EmailReceipt>> {
        Box::pin(async move {
            let mut sent = self.sent.lock().unwrap();
            sent.push(message);
            Ok(EmailReceipt {
                id: Some(format!("msg_{}", sent.len())),
            })
        })
    }
}

/// Replies with the prompt it was given, under the requested model.
#[derive(Default)]
pub struct EchoChatClient {
    requests: Mutex<Vec<ChatRequest>>,
    failure: Option<String>,
}

impl EchoChatClient {
    /// A client whose every call fails with a provider error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            requests: Mutex::default(),
            failure: Some(message.into()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChatClient for EchoChatClient {
    fn complete(&self, request: ChatRequest) -> BoxFuture<'_, Result<ChatReply>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(message) = &self.failure {
                return Err(FlowError::provider("Echo", message.clone()));
            }
            Ok(ChatReply {
                text: request.prompt,
                model: request.model,
                usage: Some(serde_json::json!({ "total_tokens": 0 })),
            })
        })
    }
}

/// Returns one canned reply for every call.
pub struct StubHttpFetcher {
    reply: HttpReply,
    calls: Mutex<Vec<HttpCall>>,
}

impl StubHttpFetcher {
    pub fn with_reply(reply: HttpReply) -> Self {
        Self {
            reply,
            calls: Mutex::default(),
        }
    }

    pub fn json(status: u16, body: &str) -> Self {
        Self::with_reply(HttpReply {
            status,
            status_text: "OK".into(),
            content_type: "application/json; charset=utf-8".into(),
            body: body.into(),
        })
    }

    pub fn calls(&self) -> Vec<HttpCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for StubHttpFetcher {
    fn default() -> Self {
        Self::json(200, "{}")
    }
}

impl HttpFetcher for StubHttpFetcher {
    fn fetch(&self, call: HttpCall) -> BoxFuture<'_, Result<HttpReply>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(call);
            Ok(self.reply.clone())
        })
    }
}

/// Fixed token → user table.
#[derive(Default)]
pub struct StaticSessions {
    users: HashMap<String, SessionUser>,
    failure: Option<String>,
}

impl StaticSessions {
    /// A backend whose every lookup fails.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            users: HashMap::new(),
            failure: Some(message.into()),
        }
    }

    pub fn with_user(mut self, token: impl Into<String>, id: impl Into<String>) -> Self {
        self.users.insert(
            token.into(),
            SessionUser {
                id: id.into(),
                email: None,
            },
        );
        self
    }
}

impl SessionLookup for StaticSessions {
    fn lookup<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Option<SessionUser>>> {
        Box::pin(async move {
            if let Some(message) = &self.failure {
                return Err(FlowError::Session(message.clone()));
            }
            Ok(self.users.get(token).cloned())
        })
    }
}
