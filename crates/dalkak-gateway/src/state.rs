use std::sync::Arc;

use dalkak_core::config::GatewayConfig;
use dalkak_core::traits::SessionLookup;
use dalkak_flow::FlowExecutor;

/// Shared application state for axum handlers.
pub struct AppState {
    pub config: GatewayConfig,
    pub executor: FlowExecutor,
    pub sessions: Option<Arc<dyn SessionLookup>>,
}

impl AppState {
    pub fn new(config: GatewayConfig, executor: FlowExecutor) -> Self {
        Self {
            config,
            executor,
            sessions: None,
        }
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionLookup>) -> Self {
        self.sessions = Some(sessions);
        self
    }
}
