//! Flow graph analysis: ordering and structural validation.
//!
//! A flow is a directed graph of `FlowNode`s connected by `FlowEdge`s.
//! Nothing here executes nodes; `order_nodes` decides when each node runs and
//! `validate_request` rejects graphs that are malformed before any node runs.

pub mod order;
pub mod validate;

pub use order::{order_nodes, Ordering};
pub use validate::validate_request;
