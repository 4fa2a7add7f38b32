use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::warn;

use dalkak_core::config::SessionConfig;
use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{SessionLookup, SessionUser};

/// Resolves bearer tokens against a Supabase Auth server (`GET /auth/v1/user`).
pub struct SupabaseSessions {
    http: Client,
    user_url: String,
    anon_key: String,
}

impl SupabaseSessions {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            http: Client::new(),
            user_url: format!("{}/auth/v1/user", config.url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
        }
    }
}

#[derive(Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl SessionLookup for SupabaseSessions {
    fn lookup<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Option<SessionUser>>> {
        Box::pin(async move {
            let response = self
                .http
                .get(&self.user_url)
                .header("apikey", &self.anon_key)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| FlowError::Session(e.to_string()))?;

            match response.status() {
                s if s.is_success() => {
                    let user: UserPayload = response
                        .json()
                        .await
                        .map_err(|e| FlowError::Session(e.to_string()))?;
                    Ok(Some(SessionUser {
                        id: user.id,
                        email: user.email,
                    }))
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
                other => {
                    warn!(status = %other, "Session lookup returned unexpected status");
                    Err(FlowError::Session(format!("auth server answered {other}")))
                }
            }
        })
    }
}
