use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    // Node errors
    #[error("{node_type}: {message}")]
    Node {
        node_type: &'static str,
        message: String,
    },

    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    // Graph errors
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Flow graph contains a cycle through: {}", .nodes.join(", "))]
    Cycle { nodes: Vec<String> },

    // Collaborator errors
    #[error("{provider} API error: {message}")]
    Provider { provider: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Session lookup failed: {0}")]
    Session(String),

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlowError {
    /// A configuration or runtime failure attributed to one node type.
    pub fn node(node_type: &'static str, message: impl Into<String>) -> Self {
        Self::Node {
            node_type,
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
