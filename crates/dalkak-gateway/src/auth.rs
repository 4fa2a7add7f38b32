use std::fmt;

use tracing::warn;

use dalkak_core::config::{configured, GatewayConfig};
use dalkak_core::traits::{SessionLookup, SessionUser};

/// Who is calling, once authenticated.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    /// Matched a named entry in `gateway.api_keys`.
    ApiKey(String),
    /// Matched the shared `gateway.token`.
    Token,
    /// Resolved through the session backend.
    Session(SessionUser),
    /// No credential source is configured.
    Anonymous,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::ApiKey(name) => write!(f, "api-key:{name}"),
            Identity::Token => f.write_str("token"),
            Identity::Session(user) => write!(f, "user:{}", user.id),
            Identity::Anonymous => f.write_str("anonymous"),
        }
    }
}

/// Match a bearer against configured API keys, then the shared token.
pub fn validate_static(config: &GatewayConfig, bearer: &str) -> Option<Identity> {
    if let Some(key) = config.api_keys.iter().find(|k| k.key == bearer) {
        return Some(Identity::ApiKey(key.name.clone()));
    }
    if configured(&config.token) == Some(bearer) {
        return Some(Identity::Token);
    }
    None
}

/// Full check: static credentials -> session lookup -> anonymous when nothing
/// is configured.
///
/// API keys are only read from the `Authorization` header. The shared token
/// and session tokens are also accepted as `?token=`, tried after the bearer.
/// `None` means the request must be rejected. Session backend failures are
/// logged and treated as "no session".
pub async fn authenticate(
    config: &GatewayConfig,
    sessions: Option<&dyn SessionLookup>,
    bearer: Option<&str>,
    query_token: Option<&str>,
) -> Option<Identity> {
    if let Some(identity) = bearer.and_then(|b| validate_static(config, b)) {
        return Some(identity);
    }
    if let Some(expected) = configured(&config.token) {
        if query_token == Some(expected) {
            return Some(Identity::Token);
        }
    }

    if let Some(sessions) = sessions {
        let mut candidates: Vec<&str> = Vec::with_capacity(2);
        for token in [bearer, query_token].into_iter().flatten() {
            if !token.is_empty() && !candidates.contains(&token) {
                candidates.push(token);
            }
        }
        for token in candidates {
            match sessions.lookup(token).await {
                Ok(Some(user)) => return Some(Identity::Session(user)),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Session lookup failed"),
            }
        }
        return None;
    }

    if config.is_open() {
        Some(Identity::Anonymous)
    } else {
        None
    }
}

/// Bearer value from an `Authorization` header.
pub fn extract_bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extract token from the query string (?token=...).
pub fn extract_token_from_query(query: &str) -> Option<&str> {
    query.split('&').find_map(|pair| pair.strip_prefix("token="))
}
