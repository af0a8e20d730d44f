//! Stdio transport — reads JSON-RPC from stdin, writes to stdout.

use crate::config::TransportConfig;
use crate::protocol::Dispatcher;
use crate::session::Session;
use crate::types::McpResult;

use super::connection::serve_connection;

/// Stdio transport for desktop MCP clients. The process is one session.
pub struct StdioTransport {
    dispatcher: Dispatcher,
    config: TransportConfig,
}

impl StdioTransport {
    pub fn new(dispatcher: Dispatcher, config: TransportConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Serve until stdin reaches EOF.
    pub async fn run(self) -> McpResult<()> {
        tracing::info!("Stdio transport started");
        let session = Session::open("stdio");
        serve_connection(
            tokio::io::stdin(),
            tokio::io::stdout(),
            self.dispatcher,
            session,
            self.config,
        )
        .await?;
        tracing::info!("EOF on stdin, shutting down");
        Ok(())
    }
}
