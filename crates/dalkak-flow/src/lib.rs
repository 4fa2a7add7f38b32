pub mod context;
pub mod executor;
pub mod graph;
pub mod handlers;
pub mod template;

pub use context::{resolve_path, NodeContext, Resolved};
pub use executor::FlowExecutor;
pub use graph::{order_nodes, validate_request, Ordering};
pub use handlers::FlowServices;
pub use template::render_template;
