use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dalkak_core::config::AppConfig;
use dalkak_core::types::FlowRequest;
use dalkak_flow::FlowExecutor;
use dalkak_gateway::{AppState, GatewayServer};

#[derive(Parser)]
#[command(name = "dalkak", version, about = "Flow execution engine for visual automations")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "dalkak.toml", env = "DALKAK_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway (default)
    Serve,
    /// Execute a flow file once and print the results as JSON
    Run {
        /// Path to a `{ nodes, edges }` JSON file, or `-` for stdin
        flow: PathBuf,
    },
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dalkak=info,warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle completions before config loading
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "dalkak", &mut std::io::stdout());
        return Ok(());
    }

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if !cli.config.exists() {
        warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.command {
        Some(Commands::Config) => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Some(Commands::Run { flow }) => {
            let request = read_flow(&flow)?;
            let services = dalkak_providers::build_services(&config)?;
            let executor = FlowExecutor::new(services, config.flow.clone());

            let run = executor.execute(&request).await?;
            println!("{}", serde_json::to_string_pretty(&run)?);
            if !run.success {
                std::process::exit(1);
            }
        }
        Some(Commands::Serve) | None => {
            let services = dalkak_providers::build_services(&config)?;
            let executor = FlowExecutor::new(services, config.flow.clone());
            let mut state = AppState::new(config.gateway.clone(), executor);
            if let Some(sessions) = dalkak_providers::build_sessions(&config) {
                state = state.with_sessions(sessions);
            }
            if config.gateway.is_open() {
                warn!("No token, API keys or session backend configured; gateway accepts anonymous requests");
            }

            info!(bind = %config.gateway.bind, "Starting flow gateway");
            let server = GatewayServer::new(state);
            let cancel = tokio_util::sync::CancellationToken::new();
            let cancel_clone = cancel.clone();

            // Graceful shutdown on Ctrl-C
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                info!("Shutting down gateway...");
                cancel_clone.cancel();
            });

            server.run(cancel).await?;
        }
        // Handled before config loading
        Some(Commands::Completions { .. }) => {}
    }

    Ok(())
}

fn read_flow(path: &Path) -> anyhow::Result<FlowRequest> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("parsing flow {}", path.display()))
}
