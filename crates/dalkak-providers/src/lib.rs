//! Live implementations of the collaborator traits in `dalkak_core::traits`.

pub mod email;
pub mod http;
pub mod providers;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use dalkak_core::config::AppConfig;
use dalkak_core::error::Result;
use dalkak_core::traits::SessionLookup;
use dalkak_flow::FlowServices;

pub use email::ResendEmailSender;
pub use http::ReqwestFetcher;
pub use providers::{AnthropicClient, GeminiClient, ModelRouter, OpenAiClient, Provider};
pub use session::SupabaseSessions;

/// Wire node-handler collaborators from config.
pub fn build_services(config: &AppConfig) -> Result<FlowServices> {
    let http = ReqwestFetcher::new(Duration::from_secs(config.flow.http_timeout_secs))?;
    let chat = ModelRouter::from_config(&config.providers);
    let services = FlowServices::new(Arc::new(chat), Arc::new(http));

    Ok(match ResendEmailSender::from_config(&config.email) {
        Some(sender) => {
            info!("Email provider configured: resend");
            services.with_email(Arc::new(sender))
        }
        None => {
            info!("No email provider configured, send_email nodes will run in mock mode");
            services
        }
    })
}

/// Session backend, if one is configured.
pub fn build_sessions(config: &AppConfig) -> Option<Arc<dyn SessionLookup>> {
    let session = config.gateway.active_session()?;
    Some(Arc::new(SupabaseSessions::new(session)))
}
