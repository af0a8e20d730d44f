//! TCP listener: one session per accepted connection.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::config::TransportConfig;
use crate::protocol::Dispatcher;
use crate::session::{ActiveSessions, Session, SessionInfo};
use crate::types::{McpError, McpResult};

use super::connection::serve_connection;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Newline-delimited JSON-RPC over TCP.
#[derive(Debug)]
pub struct TcpTransport {
    listener: TcpListener,
    dispatcher: Dispatcher,
    config: TransportConfig,
}

impl TcpTransport {
    /// Bind the listen socket. Fails immediately if the address is taken.
    pub async fn bind(addr: &str, dispatcher: Dispatcher, config: TransportConfig) -> McpResult<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            McpError::Transport(format!("Failed to bind {addr}: {e}"))
        })?;
        Ok(Self {
            listener,
            dispatcher,
            config,
        })
    }

    pub fn local_addr(&self) -> McpResult<SocketAddr> {
        self.listener.local_addr().map_err(McpError::Io)
    }

    /// Accept connections forever.
    pub async fn run(self) -> McpResult<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves. Sessions already open
    /// keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> McpResult<()>
    where
        F: Future<Output = ()>,
    {
        let local = self.local_addr()?;
        tracing::info!("TCP transport listening on {local}");

        let mut sessions = ActiveSessions::new();
        let (closed_tx, mut closed_rx) = mpsc::unbounded_channel::<String>();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(
                        "Shutting down listener ({} session(s) active)",
                        sessions.count()
                    );
                    break;
                }
                Some(session_id) = closed_rx.recv() => {
                    sessions.remove(&session_id);
                    tracing::debug!("{} session(s) active", sessions.count());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            tracing::debug!("set_nodelay failed for {peer}: {e}");
                        }
                        let session = Session::open(&peer.to_string());
                        let session_id = session.id().to_string();
                        sessions.insert(&session_id, SessionInfo::new(&peer.to_string()));

                        let span = tracing::info_span!("session", id = %session_id, %peer);
                        let dispatcher = self.dispatcher.clone();
                        let config = self.config;
                        let closed_tx = closed_tx.clone();
                        tokio::spawn(
                            async move {
                                let (reader, writer) = stream.into_split();
                                match serve_connection(reader, writer, dispatcher, session, config).await {
                                    Ok(()) => tracing::debug!("Connection closed"),
                                    Err(McpError::TransportClosed) => {
                                        tracing::debug!("Peer went away before all responses were written")
                                    }
                                    Err(e) => tracing::warn!("Connection ended: {e}"),
                                }
                                let _ = closed_tx.send(session_id);
                            }
                            .instrument(span),
                        );
                    }
                    Err(e) => {
                        tracing::warn!("Accept failed: {e}");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }

        Ok(())
    }
}
