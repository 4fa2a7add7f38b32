use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node type tag.
///
/// The set is closed; any tag outside it is kept verbatim in `Unknown` so the
/// executor can report it per node instead of rejecting the whole request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Trigger,
    Condition,
    Transform,
    SendEmail,
    HttpRequest,
    AiChat,
    Unknown(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Trigger => "trigger",
            NodeKind::Condition => "condition",
            NodeKind::Transform => "transform",
            NodeKind::SendEmail => "send_email",
            NodeKind::HttpRequest => "http_request",
            NodeKind::AiChat => "ai_chat",
            NodeKind::Unknown(tag) => tag,
        }
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "trigger" => NodeKind::Trigger,
            "condition" => NodeKind::Condition,
            "transform" => NodeKind::Transform,
            "send_email" => NodeKind::SendEmail,
            "http_request" => NodeKind::HttpRequest,
            "ai_chat" => NodeKind::AiChat,
            _ => NodeKind::Unknown(tag),
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas coordinate of a node. Never consulted during execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single step in a flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub position: Position,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: String::new(),
            config: Map::new(),
            position: Position::default(),
        }
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replace the config with the fields of a JSON object.
    ///
    /// Non-object values leave the config empty.
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = match config {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self
    }

    /// Label for log lines, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

/// A directed dependency from `source` to `target`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FlowEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }
}

/// Body of an execution request: the whole graph, every time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRequest {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// Terminal state of a node within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Success,
    Error,
    Skipped,
}

/// Outcome of one node.
///
/// `output` is present only for `Success`, `error` only for `Error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub node_id: String,
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Milliseconds spent in the node's handler.
    #[serde(default)]
    pub duration: u64,
}

impl ExecutionResult {
    pub fn success(node_id: impl Into<String>, output: Value, duration: u64) -> Self {
        Self {
            node_id: node_id.into(),
            status: NodeStatus::Success,
            output: Some(output),
            error: None,
            duration,
        }
    }

    pub fn error(node_id: impl Into<String>, error: impl Into<String>, duration: u64) -> Self {
        Self {
            node_id: node_id.into(),
            status: NodeStatus::Error,
            output: None,
            error: Some(error.into()),
            duration,
        }
    }

    pub fn skipped(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            status: NodeStatus::Skipped,
            output: None,
            error: None,
            duration: 0,
        }
    }
}

/// Result of a whole run, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub success: bool,
    pub results: Vec<ExecutionResult>,
    pub total_duration: u64,
}

impl RunResult {
    /// Look up the result for a node id.
    pub fn result_for(&self, node_id: &str) -> Option<&ExecutionResult> {
        self.results.iter().find(|r| r.node_id == node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_kind_keeps_tag() {
        let node: FlowNode = serde_json::from_value(json!({
            "id": "n1",
            "type": "webhook_reply",
            "label": "Reply",
            "config": {},
            "position": { "x": 0, "y": 0 }
        }))
        .unwrap();
        assert_eq!(node.kind, NodeKind::Unknown("webhook_reply".into()));
        assert_eq!(node.kind.to_string(), "webhook_reply");
    }

    #[test]
    fn test_node_defaults_for_optional_fields() {
        let node: FlowNode =
            serde_json::from_value(json!({ "id": "t", "type": "trigger" })).unwrap();
        assert_eq!(node.kind, NodeKind::Trigger);
        assert!(node.label.is_empty());
        assert!(node.config.is_empty());
        assert_eq!(node.display_name(), "t");
    }

    #[test]
    fn test_result_serialization_omits_absent_fields() {
        let ok = serde_json::to_value(ExecutionResult::success("a", json!({"x": 1}), 3)).unwrap();
        assert_eq!(ok["nodeId"], "a");
        assert_eq!(ok["status"], "success");
        assert!(ok.get("error").is_none());

        let failed = serde_json::to_value(ExecutionResult::error("b", "boom", 1)).unwrap();
        assert_eq!(failed["status"], "error");
        assert_eq!(failed["error"], "boom");
        assert!(failed.get("output").is_none());

        let skipped = serde_json::to_value(ExecutionResult::skipped("c")).unwrap();
        assert_eq!(skipped["status"], "skipped");
        assert!(skipped.get("output").is_none());
        assert!(skipped.get("error").is_none());
    }

    #[test]
    fn test_request_requires_nodes_and_edges() {
        let missing_edges = serde_json::from_value::<FlowRequest>(json!({ "nodes": [] }));
        assert!(missing_edges.is_err());
    }
}
