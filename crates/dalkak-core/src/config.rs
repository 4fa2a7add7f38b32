use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Top-level Dalkak configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Shared bearer token.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub api_keys: Vec<ApiKeyConfig>,
    /// External session backend (Supabase-compatible `/auth/v1/user`).
    #[serde(default)]
    pub session: Option<SessionConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            token: None,
            api_keys: vec![],
            session: None,
        }
    }
}

impl GatewayConfig {
    /// True when no credential source at all is configured.
    pub fn is_open(&self) -> bool {
        configured(&self.token).is_none() && self.api_keys.is_empty() && self.active_session().is_none()
    }

    /// The session backend, unless its URL is blank or an unexpanded `${VAR}`.
    pub fn active_session(&self) -> Option<&SessionConfig> {
        self.session
            .as_ref()
            .filter(|s| configured_str(&s.url).is_some())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public (anon) key sent as the `apikey` header.
    pub anon_key: String,
}

fn default_bind() -> String { "127.0.0.1:3100".to_string() }

/// Execution limits and graph policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    #[serde(default = "default_max_edges")]
    pub max_edges: usize,
    /// Reject graphs with a cycle instead of running the leftover nodes in input order.
    #[serde(default)]
    pub reject_cycles: bool,
    /// Timeout for `http_request` nodes.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_edges: default_max_edges(),
            reject_cycles: false,
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_max_nodes() -> usize { 50 }
fn default_max_edges() -> usize { 200 }
fn default_http_timeout() -> u64 { 30 }

/// Email provider settings. Without an API key `send_email` nodes run in mock mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub resend_api_key: Option<String>,
    #[serde(default = "default_email_from")]
    pub from: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            from: default_email_from(),
            base_url: None,
        }
    }
}

impl EmailConfig {
    pub fn api_key(&self) -> Option<&str> {
        configured(&self.resend_api_key)
    }
}

fn default_email_from() -> String { "Dalkak <noreply@fieldnine.io>".to_string() }

/// AI model provider credentials for `ai_chat` nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub openai_base_url: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_base_url: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub gemini_base_url: Option<String>,
}

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| FlowError::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(FlowError::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Parse TOML text after expanding `${ENV_VAR}` references.
    pub fn parse(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content);

        toml::from_str(&expanded)
            .map_err(|e| FlowError::Config(e.to_string()))
    }
}

/// Treat empty values and unexpanded `${VAR}` references as unset.
pub fn configured(value: &Option<String>) -> Option<&str> {
    value.as_deref().and_then(configured_str)
}

/// Same as [`configured`] for a required string field.
pub fn configured_str(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty() && !(v.starts_with("${") && v.ends_with('}')))
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                Err(_) => {
                    // Leave the reference as written if the var is unset
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}
