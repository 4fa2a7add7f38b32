use std::collections::HashSet;

use dalkak_core::config::FlowConfig;
use dalkak_core::error::{FlowError, Result};
use dalkak_core::types::FlowRequest;

pub const MAX_ID_LEN: usize = 64;
pub const MAX_LABEL_LEN: usize = 120;

/// Structural checks run before any node executes.
///
/// Collects every problem rather than stopping at the first, so the caller
/// can report them together. Unknown node types are deliberately not checked
/// here; they fail per node at run time.
pub fn validate_request(request: &FlowRequest, limits: &FlowConfig) -> Result<()> {
    let mut problems = Vec::new();

    if request.nodes.is_empty() {
        problems.push("nodes: at least one node is required".to_string());
    }
    if request.nodes.len() > limits.max_nodes {
        problems.push(format!(
            "nodes: {} nodes exceeds the limit of {}",
            request.nodes.len(),
            limits.max_nodes
        ));
    }
    if request.edges.len() > limits.max_edges {
        problems.push(format!(
            "edges: {} edges exceeds the limit of {}",
            request.edges.len(),
            limits.max_edges
        ));
    }

    let mut ids = HashSet::with_capacity(request.nodes.len());
    for (i, node) in request.nodes.iter().enumerate() {
        check_id(&mut problems, &format!("nodes[{i}].id"), &node.id);
        if node.label.chars().count() > MAX_LABEL_LEN {
            problems.push(format!("nodes[{i}].label: longer than {MAX_LABEL_LEN} characters"));
        }
        if !ids.insert(node.id.as_str()) {
            problems.push(format!("nodes[{i}].id: duplicate id \"{}\"", node.id));
        }
    }

    for (i, edge) in request.edges.iter().enumerate() {
        check_id(&mut problems, &format!("edges[{i}].id"), &edge.id);
        check_id(&mut problems, &format!("edges[{i}].source"), &edge.source);
        check_id(&mut problems, &format!("edges[{i}].target"), &edge.target);
        if edge
            .label
            .as_deref()
            .is_some_and(|l| l.chars().count() > MAX_LABEL_LEN)
        {
            problems.push(format!("edges[{i}].label: longer than {MAX_LABEL_LEN} characters"));
        }
        if !edge.source.is_empty() && !ids.contains(edge.source.as_str()) {
            problems.push(format!("edges[{i}].source: unknown node \"{}\"", edge.source));
        }
        if !edge.target.is_empty() && !ids.contains(edge.target.as_str()) {
            problems.push(format!("edges[{i}].target: unknown node \"{}\"", edge.target));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(FlowError::Validation(problems))
    }
}

fn check_id(problems: &mut Vec<String>, field: &str, value: &str) {
    if value.is_empty() {
        problems.push(format!("{field}: must not be empty"));
    } else if value.chars().count() > MAX_ID_LEN {
        problems.push(format!("{field}: longer than {MAX_ID_LEN} characters"));
    }
}
