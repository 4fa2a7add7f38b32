use std::collections::{HashMap, VecDeque};

use dalkak_core::types::{FlowEdge, FlowNode};

/// Execution order for one run.
#[derive(Debug, Clone)]
pub struct Ordering<'a> {
    /// Every input node exactly once.
    pub nodes: Vec<&'a FlowNode>,
    /// Nodes emitted before all of their upstream nodes had run, because they
    /// sit on a cycle. Empty for acyclic graphs.
    pub cycle_breaks: Vec<String>,
}

impl Ordering<'_> {
    pub fn is_acyclic(&self) -> bool {
        self.cycle_breaks.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

/// Order nodes so that each runs after all of its direct upstream nodes.
///
/// Kahn's algorithm seeded with the entry nodes (no incoming edge) in input
/// order. When the queue drains with nodes left over, the graph has a cycle.
/// Starting at the first leftover node in input order, we climb through
/// parents that have not run yet until a node repeats; that node lies on the
/// cycle, so it is forced into the order and the walk continues from it.
/// Edges whose endpoints are not in `nodes` are ignored.
pub fn order_nodes<'a>(nodes: &'a [FlowNode], edges: &[FlowEdge]) -> Ordering<'a> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        index.entry(node.id.as_str()).or_insert(i);
    }

    let mut in_degree = vec![0usize; nodes.len()];
    let mut downstream: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut upstream: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for edge in edges {
        let (Some(&from), Some(&to)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
        else {
            continue;
        };
        in_degree[to] += 1;
        downstream[from].push(to);
        upstream[to].push(from);
    }

    let mut visited = vec![false; nodes.len()];
    let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());
    let mut cycle_breaks = Vec::new();

    loop {
        while let Some(current) = queue.pop_front() {
            if visited[current] {
                continue;
            }
            visited[current] = true;
            order.push(&nodes[current]);

            for &next in &downstream[current] {
                in_degree[next] = in_degree[next].saturating_sub(1);
                if in_degree[next] == 0 && !visited[next] {
                    queue.push_back(next);
                }
            }
        }

        match (0..nodes.len()).find(|&i| !visited[i]) {
            Some(leftover) => {
                let stuck = cycle_member(leftover, &upstream, &visited);
                cycle_breaks.push(nodes[stuck].id.clone());
                queue.push_back(stuck);
            }
            None => break,
        }
    }

    Ordering {
        nodes: order,
        cycle_breaks,
    }
}

/// Follow not-yet-run parents from `start` until a node repeats.
fn cycle_member(start: usize, upstream: &[Vec<usize>], visited: &[bool]) -> usize {
    let mut seen = vec![false; upstream.len()];
    let mut current = start;
    loop {
        if seen[current] {
            return current;
        }
        seen[current] = true;
        match upstream[current].iter().find(|&&p| !visited[p]) {
            Some(&parent) => current = parent,
            None => return current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalkak_core::types::NodeKind;

    fn nodes(ids: &[&str]) -> Vec<FlowNode> {
        ids.iter().map(|id| FlowNode::new(*id, NodeKind::Transform)).collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<FlowEdge> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (s, t))| FlowEdge::new(format!("e{i}"), *s, *t))
            .collect()
    }

    fn position(order: &Ordering<'_>, id: &str) -> usize {
        order.ids().iter().position(|n| *n == id).unwrap()
    }

    #[test]
    fn test_linear_chain_in_reverse_input_order() {
        let ns = nodes(&["c", "b", "a"]);
        let es = edges(&[("a", "b"), ("b", "c")]);
        let order = order_nodes(&ns, &es);
        assert_eq!(order.ids(), vec!["a", "b", "c"]);
        assert!(order.is_acyclic());
    }

    #[test]
    fn test_diamond_waits_for_both_parents() {
        let ns = nodes(&["join", "left", "right", "start"]);
        let es = edges(&[
            ("start", "left"),
            ("start", "right"),
            ("left", "join"),
            ("right", "join"),
        ]);
        let order = order_nodes(&ns, &es);
        assert_eq!(order.nodes.len(), 4);
        for (s, t) in [("start", "left"), ("start", "right"), ("left", "join"), ("right", "join")] {
            assert!(position(&order, s) < position(&order, t), "{s} must precede {t}");
        }
    }

    #[test]
    fn test_entry_points_keep_input_order() {
        let ns = nodes(&["x", "y", "z"]);
        let order = order_nodes(&ns, &[]);
        assert_eq!(order.ids(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_parallel_duplicate_edges_emit_once() {
        let ns = nodes(&["a", "b"]);
        let es = edges(&[("a", "b"), ("a", "b"), ("a", "b")]);
        let order = order_nodes(&ns, &es);
        assert_eq!(order.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_pure_cycle_falls_back_to_input_order() {
        let ns = nodes(&["b", "a"]);
        let es = edges(&[("a", "b"), ("b", "a")]);
        let order = order_nodes(&ns, &es);
        assert_eq!(order.ids(), vec!["b", "a"]);
        assert_eq!(order.cycle_breaks, vec!["b".to_string()]);
    }

    #[test]
    fn test_cycle_downstream_still_follows_its_parent() {
        // c hangs off the a<->b loop and appears first in the input.
        let ns = nodes(&["c", "a", "b", "solo"]);
        let es = edges(&[("a", "b"), ("b", "a"), ("b", "c")]);
        let order = order_nodes(&ns, &es);

        assert_eq!(order.ids(), vec!["solo", "b", "a", "c"]);
        assert!(position(&order, "b") < position(&order, "c"));
        assert_eq!(order.cycle_breaks, vec!["b".to_string()]);
    }

    #[test]
    fn test_self_loop_runs_once() {
        let ns = nodes(&["loop"]);
        let es = edges(&[("loop", "loop")]);
        let order = order_nodes(&ns, &es);
        assert_eq!(order.ids(), vec!["loop"]);
        assert!(!order.is_acyclic());
    }

    #[test]
    fn test_dangling_edges_are_ignored() {
        let ns = nodes(&["a"]);
        let es = edges(&[("ghost", "a"), ("a", "phantom")]);
        let order = order_nodes(&ns, &es);
        assert_eq!(order.ids(), vec!["a"]);
        assert!(order.is_acyclic());
    }
}
