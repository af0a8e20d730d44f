//! Valuation MCP Server — entry point.

use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use valuation_mcp::config::{resolve_listen_addr, TransportConfig};
use valuation_mcp::protocol::Dispatcher;
use valuation_mcp::registry::HandlerDescriptor;
use valuation_mcp::transport::{StdioTransport, TcpTransport};
use valuation_mcp::default_registry;

#[derive(Parser)]
#[command(
    name = "valuation-mcp",
    about = "MCP server for valuation analytics — DCF, PEG, trend, and industry comparison over JSON-RPC",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over TCP (default).
    Serve {
        /// Listen address (host:port).
        /// Also reads from VALUATION_MCP_ADDR env var.
        #[arg(long)]
        addr: Option<String>,
    },

    /// Start MCP server over stdio.
    Stdio,

    /// Start MCP server over HTTP.
    #[cfg(feature = "sse")]
    ServeHttp {
        /// Listen address (host:port).
        #[arg(long, default_value = "127.0.0.1:3100")]
        addr: String,

        /// Bearer token for authentication.
        /// Also reads from VALUATION_MCP_TOKEN env var.
        #[arg(long)]
        token: Option<String>,
    },

    /// Print server capabilities and the handler catalog as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   valuation-mcp completions bash > ~/.local/share/bash-completion/completions/valuation-mcp
    ///   valuation-mcp completions zsh > ~/.zfunc/_valuation-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Serve { addr } => {
            let dispatcher = build_dispatcher()?;
            let addr = resolve_listen_addr(addr.as_deref());
            let config = TransportConfig::from_env();

            let transport = TcpTransport::bind(&addr, dispatcher, config)
                .await
                .with_context(|| format!("cannot listen on {addr}"))?;
            tracing::info!("Valuation MCP server");

            transport
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl-C: {e}");
                        std::future::pending::<()>().await;
                    }
                })
                .await?;
            tracing::info!("Server stopped");
        }

        Commands::Stdio => {
            let dispatcher = build_dispatcher()?;
            let transport = StdioTransport::new(dispatcher, TransportConfig::from_env());
            transport.run().await?;
        }

        #[cfg(feature = "sse")]
        Commands::ServeHttp { addr, token } => {
            use valuation_mcp::config::resolve_token;
            use valuation_mcp::transport::SseTransport;

            let dispatcher = build_dispatcher()?;
            let effective_token = resolve_token(token);
            if effective_token.is_some() {
                tracing::info!("Auth: bearer token required");
            }

            let config = TransportConfig::from_env();
            let transport = SseTransport::new(dispatcher, effective_token, config.max_frame_bytes);
            transport.run(&addr).await?;
        }

        Commands::Info => {
            let capabilities = valuation_mcp::types::InitializeResult::default_result();
            let registry = default_registry()?;
            let handlers: Vec<_> = registry
                .list()
                .map(|d: &HandlerDescriptor| serde_json::json!({ "name": d.name, "kind": d.kind }))
                .collect();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "handlers": handlers,
                "tool_count": registry.tools().count(),
                "resource_count": registry.resources().count(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "valuation-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn build_dispatcher() -> anyhow::Result<Dispatcher> {
    let registry = default_registry().context("failed to build handler registry")?;
    tracing::info!("Registered {} handler(s)", registry.len());
    Ok(Dispatcher::new(Arc::new(registry)))
}
