//! Message framing for newline-delimited JSON.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::types::{McpError, McpResult, ResponseEnvelope};

/// Serialize a value to a JSON line (with trailing newline).
pub fn frame_message(value: &Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

/// Reads one newline-terminated frame at a time, bounded in size.
pub struct FrameReader<R> {
    reader: BufReader<R>,
    max_frame_bytes: usize,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R, max_frame_bytes: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            max_frame_bytes,
            buf: Vec::new(),
        }
    }

    /// Next non-blank frame with its line terminator stripped, or `None` at
    /// EOF. A final unterminated line still counts as a frame.
    ///
    /// A line longer than the limit means message boundaries can no longer
    /// be trusted; the caller must drop the connection.
    pub async fn next_frame(&mut self) -> McpResult<Option<Vec<u8>>> {
        loop {
            self.buf.clear();
            // Room for the content plus a CRLF terminator.
            let limit = (self.max_frame_bytes as u64).saturating_add(2);
            let read = (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut self.buf)
                .await
                .map_err(McpError::Io)?;

            if read == 0 {
                return Ok(None);
            }

            let terminated = self.buf.last() == Some(&b'\n');
            let content = strip_terminator(&self.buf).len();
            if (!terminated && self.buf.len() as u64 >= limit) || content > self.max_frame_bytes {
                return Err(McpError::FrameTooLarge {
                    size: content,
                    max: self.max_frame_bytes,
                });
            }

            let frame = trim_line(&self.buf);
            if frame.is_empty() {
                continue;
            }
            return Ok(Some(frame.to_vec()));
        }
    }
}

/// Drop a trailing `\n` or `\r\n`.
fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn trim_line(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &line[start..end]
}

/// Writes frames and remembers when the peer has gone away.
pub struct FrameWriter<W> {
    writer: W,
    closed: bool,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            closed: false,
        }
    }

    pub async fn send(&mut self, response: &ResponseEnvelope) -> McpResult<()> {
        self.send_value(&response.to_value()).await
    }

    /// Write one frame. Fails with `TransportClosed` once the peer has
    /// disconnected.
    pub async fn send_value(&mut self, value: &Value) -> McpResult<()> {
        if self.closed {
            return Err(McpError::TransportClosed);
        }

        let framed = frame_message(value)?;
        let written = async {
            self.writer.write_all(framed.as_bytes()).await?;
            self.writer.flush().await
        }
        .await;

        match written {
            Ok(()) => Ok(()),
            Err(e) if McpError::is_disconnect(&e) => {
                self.closed = true;
                Err(McpError::TransportClosed)
            }
            Err(e) => Err(McpError::Io(e)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub async fn shutdown(&mut self) {
        if !self.closed {
            if let Err(e) = self.writer.shutdown().await {
                tracing::debug!("Writer shutdown failed: {e}");
            }
            self.closed = true;
        }
    }
}
