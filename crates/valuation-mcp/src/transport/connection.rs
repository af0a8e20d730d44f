//! Per-connection driver shared by every stream transport.
//!
//! One reader task turns the byte stream into frames. Each request runs on
//! its own task and reports back over a completion channel, so a slow
//! handler never blocks later requests on the same connection. All writes
//! happen from the driver loop, one frame at a time.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::config::TransportConfig;
use crate::protocol::Dispatcher;
use crate::registry::HandlerContext;
use crate::session::Session;
use crate::types::*;

use super::framing::{FrameReader, FrameWriter};

const FRAME_QUEUE: usize = 32;

/// A finished request waiting to be written.
#[derive(Debug)]
struct Completion {
    id: RequestId,
    response: ResponseEnvelope,
}

/// Serve one connection until the peer disconnects or the stream breaks.
///
/// On EOF, requests still running get up to `config.drain_timeout` to
/// finish; whatever remains after that is cancelled with the session.
pub async fn serve_connection<R, W>(
    reader: R,
    writer: W,
    dispatcher: Dispatcher,
    session: Session,
    config: TransportConfig,
) -> McpResult<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (frame_tx, mut frame_rx) = mpsc::channel(FRAME_QUEUE);
    let reader_task = tokio::spawn(
        read_frames(FrameReader::new(reader, config.max_frame_bytes), frame_tx).in_current_span(),
    );

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut driver = Driver {
        dispatcher,
        session,
        writer: FrameWriter::new(writer),
        done_tx,
    };

    let outcome = loop {
        tokio::select! {
            frame = frame_rx.recv() => match frame {
                Some(Ok(bytes)) => {
                    if let Err(e) = driver.on_frame(&bytes).await {
                        break Err(e);
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!("Closing connection: {e}");
                    break Err(e);
                }
                None => break driver.drain(&mut done_rx, config.drain_timeout).await,
            },
            Some(done) = done_rx.recv() => {
                if let Err(e) = driver.on_completion(done).await {
                    break Err(e);
                }
            }
        }
    };

    reader_task.abort();
    driver.session.close();
    driver.writer.shutdown().await;
    outcome
}

async fn read_frames<R: AsyncRead + Unpin>(
    mut reader: FrameReader<R>,
    tx: mpsc::Sender<McpResult<Vec<u8>>>,
) {
    loop {
        match reader.next_frame().await {
            Ok(Some(frame)) => {
                if tx.send(Ok(frame)).await.is_err() {
                    break;
                }
            }
            Ok(None) => {
                tracing::debug!("Peer closed its side of the connection");
                break;
            }
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                break;
            }
        }
    }
}

struct Driver<W> {
    dispatcher: Dispatcher,
    session: Session,
    writer: FrameWriter<W>,
    done_tx: mpsc::UnboundedSender<Completion>,
}

impl<W: AsyncWrite + Unpin> Driver<W> {
    async fn on_frame(&mut self, bytes: &[u8]) -> McpResult<()> {
        match self.dispatcher.decode(bytes) {
            Err(response) => self.writer.send(&response).await,
            Ok(InboundMessage::Notification(notification)) => {
                self.on_notification(notification);
                Ok(())
            }
            Ok(InboundMessage::Request(request)) => self.on_request(request).await,
        }
    }

    async fn on_request(&mut self, request: JsonRpcRequest) -> McpResult<()> {
        if request.method == "initialize" {
            let response = self
                .dispatcher
                .initialize(self.session.capabilities_mut(), &request);
            return self.writer.send(&response).await;
        }

        let token = match self.session.begin(&request.id, &request.method) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("{e}");
                let response = ResponseEnvelope::failure(request.id.clone(), &e);
                return self.writer.send(&response).await;
            }
        };

        let ctx = HandlerContext::new(request.id.clone(), self.session.id(), token);
        let dispatcher = self.dispatcher.clone();
        let done_tx = self.done_tx.clone();
        tokio::spawn(
            async move {
                let id = request.id.clone();
                let response = dispatcher.dispatch(request, ctx).await;
                // the receiver is gone only after the connection has closed
                let _ = done_tx.send(Completion { id, response });
            }
            .in_current_span(),
        );
        Ok(())
    }

    fn on_notification(&mut self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            NOTIFY_INITIALIZED | NOTIFY_INITIALIZED_LEGACY => {
                self.session.capabilities_mut().mark_initialized();
                tracing::debug!("Client initialized");
            }
            NOTIFY_CANCELLED | NOTIFY_CANCEL_REQUEST => {
                let params = notification
                    .params
                    .map(serde_json::from_value::<CancelledParams>)
                    .transpose();
                match params {
                    Ok(Some(params)) => {
                        if !self.session.cancel(&params.request_id) {
                            tracing::debug!(
                                "Cancel for request {} ignored: not in flight",
                                params.request_id
                            );
                        }
                    }
                    Ok(None) => tracing::debug!("Cancel notification without params ignored"),
                    Err(e) => tracing::debug!("Cancel notification with bad params ignored: {e}"),
                }
            }
            other => tracing::debug!("Ignoring notification: {other}"),
        }
    }

    async fn on_completion(&mut self, done: Completion) -> McpResult<()> {
        let Some(entry) = self.session.complete(&done.id) else {
            tracing::debug!("Dropping response for untracked request {}", done.id);
            return Ok(());
        };

        // a cancelled request never reports success, even if the handler
        // finished before it noticed
        let response = if entry.cancelled {
            ResponseEnvelope::failure(done.id, &McpError::RequestCancelled)
        } else {
            done.response
        };
        self.writer.send(&response).await
    }

    async fn drain(
        &mut self,
        done_rx: &mut mpsc::UnboundedReceiver<Completion>,
        timeout: Duration,
    ) -> McpResult<()> {
        if self.session.in_flight_count() == 0 {
            return Ok(());
        }

        tracing::debug!(
            "Draining {} in-flight request(s)",
            self.session.in_flight_count()
        );
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        while self.session.in_flight_count() > 0 {
            tokio::select! {
                Some(done) = done_rx.recv() => match self.on_completion(done).await {
                    Ok(()) => {}
                    // the peer only half-closed if writes still work; stop once it is gone
                    Err(McpError::TransportClosed) => return Ok(()),
                    Err(e) => return Err(e),
                },
                _ = &mut deadline => {
                    tracing::warn!(
                        "Drain timed out with {} request(s) still running",
                        self.session.in_flight_count()
                    );
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    use super::*;
    use crate::registry::{handler_fn, HandlerDescriptor, HandlerRegistry};

    fn dispatcher() -> Dispatcher {
        let mut registry = HandlerRegistry::new();
        registry
            .register(HandlerDescriptor::tool(
                "ping",
                "Liveness check",
                json!({"type": "object"}),
                handler_fn(|_params: Value, _ctx| async { Ok::<_, McpError>(json!({"pong": true})) }),
            ))
            .unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_responses_follow_requests() {
        let (client, server) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server);
        let task = tokio::spawn(serve_connection(
            server_read,
            server_write,
            dispatcher(),
            Session::open("duplex"),
            TransportConfig::default(),
        ));

        let (client_read, mut client_write) = tokio::io::split(client);
        client_write
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":\"1\",\"method\":\"ping\"}\nnot json\n")
            .await
            .unwrap();
        client_write.shutdown().await.unwrap();

        let mut lines = BufReader::new(client_read).lines();
        let mut responses = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            responses.push(serde_json::from_str::<Value>(&line).unwrap());
        }

        assert_eq!(responses.len(), 2);
        let ping = responses.iter().find(|r| r["id"] == json!("1")).unwrap();
        assert_eq!(ping["result"], json!({"pong": true}));
        let malformed = responses.iter().find(|r| r["id"].is_null()).unwrap();
        assert_eq!(malformed["error"]["kind"], json!("MalformedRequest"));

        task.await.unwrap().unwrap();
    }
}
