use std::collections::{HashMap, HashSet};
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use dalkak_core::config::FlowConfig;
use dalkak_core::error::{FlowError, Result};
use dalkak_core::types::{ExecutionResult, FlowEdge, FlowNode, FlowRequest, RunResult};

use crate::context::NodeContext;
use crate::graph::{order_nodes, validate_request, Ordering};
use crate::handlers::{run_node, FlowServices};

/// Runs flow graphs one node at a time in dependency order.
///
/// Holds no per-run state: each call to [`FlowExecutor::execute`] builds its
/// own output map, so one executor can serve concurrent requests.
#[derive(Clone)]
pub struct FlowExecutor {
    services: FlowServices,
    config: FlowConfig,
}

impl FlowExecutor {
    pub fn new(services: FlowServices, config: FlowConfig) -> Self {
        Self { services, config }
    }

    /// Validate a request and run it.
    ///
    /// Returns `Err` only for structural problems (`Validation`, or `Cycle`
    /// when `reject_cycles` is set). Node failures are reported inside the
    /// `RunResult`.
    pub async fn execute(&self, request: &FlowRequest) -> Result<RunResult> {
        validate_request(request, &self.config)?;

        let ordering = order_nodes(&request.nodes, &request.edges);
        if self.config.reject_cycles && !ordering.is_acyclic() {
            return Err(FlowError::Cycle {
                nodes: ordering.cycle_breaks,
            });
        }

        Ok(self.run_ordered(ordering, &request.edges).await)
    }

    /// Run every node exactly once and report a result for each.
    ///
    /// A node is skipped, without invoking its handler, when any of its
    /// upstream nodes errored or was skipped. Everything else runs, so one
    /// failure never stops independent branches.
    pub async fn run(&self, nodes: &[FlowNode], edges: &[FlowEdge]) -> RunResult {
        self.run_ordered(order_nodes(nodes, edges), edges).await
    }

    async fn run_ordered(&self, ordering: Ordering<'_>, edges: &[FlowEdge]) -> RunResult {
        let start = Instant::now();
        if !ordering.is_acyclic() {
            warn!(nodes = ?ordering.cycle_breaks, "Flow graph has a cycle, forcing execution order");
        }

        let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in edges {
            incoming
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.source.as_str());
        }

        let mut outputs: HashMap<&str, Value> = HashMap::new();
        let mut blocked: HashSet<&str> = HashSet::new();
        let mut results = Vec::with_capacity(ordering.nodes.len());

        for node in ordering.nodes {
            let sources = incoming.get(node.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);

            if let Some(failed) = sources.iter().find(|s| blocked.contains(**s)) {
                debug!(node_id = %node.id, upstream = %failed, "Skipping node, upstream did not succeed");
                blocked.insert(node.id.as_str());
                results.push(ExecutionResult::skipped(node.id.clone()));
                continue;
            }

            let ctx = context_for(sources, &outputs);

            info!(node_id = %node.id, node_type = %node.kind, label = %node.display_name(), "Executing flow node");
            let node_start = Instant::now();
            let outcome = run_node(node, &ctx, &self.services).await;
            let elapsed_ms = node_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(output) => {
                    debug!(node_id = %node.id, elapsed_ms, "Flow node succeeded");
                    outputs.insert(node.id.as_str(), output.clone());
                    results.push(ExecutionResult::success(node.id.clone(), output, elapsed_ms));
                }
                Err(e) => {
                    error!(node_id = %node.id, error = %e, "Flow node failed");
                    blocked.insert(node.id.as_str());
                    results.push(ExecutionResult::error(node.id.clone(), e.to_string(), elapsed_ms));
                }
            }
        }

        let success = results.iter().all(|r| r.error.is_none());
        let total_duration = start.elapsed().as_millis() as u64;
        info!(success, nodes = results.len(), total_duration, "Flow run complete");

        RunResult {
            success,
            results,
            total_duration,
        }
    }
}

/// Build a node's context from the outputs of its upstream nodes.
///
/// `prev` is the output of the first incoming edge's source that has run.
/// Sources not run yet (only possible on a forced cycle break) are left out.
fn context_for(sources: &[&str], outputs: &HashMap<&str, Value>) -> NodeContext {
    let mut parents: Vec<(String, Value)> = Vec::with_capacity(sources.len());
    for source in sources {
        if parents.iter().any(|(id, _)| id == source) {
            continue;
        }
        if let Some(output) = outputs.get(source) {
            parents.push((source.to_string(), output.clone()));
        }
    }
    let prev = parents.first().map(|(_, output)| output.clone());
    NodeContext::new(prev, parents)
}
