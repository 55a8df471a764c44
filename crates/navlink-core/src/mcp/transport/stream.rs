//! Transport over an arbitrary async reader/writer pair

use super::{McpTransport, ReadOutcome};
use crate::mcp::error::McpError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

const READ_CHUNK: usize = 4096;

/// Transport for peers that are not child processes, such as an in-process
/// server on the other end of a [`tokio::io::duplex`] pipe.
pub struct StreamTransport<R, W> {
    reader: R,
    writer: Option<W>,
    connected: bool,
}

impl<R, W> StreamTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Wrap a reader (peer output) and writer (peer input)
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer: Some(writer),
            connected: true,
        }
    }
}

#[async_trait]
impl<R, W> McpTransport for StreamTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), McpError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| McpError::connection("writer already closed"))?;
        writer.write_all(bytes).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn read_available(&mut self, wait: Duration) -> Result<ReadOutcome, McpError> {
        let mut buf = [0u8; READ_CHUNK];
        match timeout(wait, self.reader.read(&mut buf)).await {
            Err(_) => Ok(ReadOutcome::Idle),
            Ok(Ok(0)) => {
                self.connected = false;
                Ok(ReadOutcome::Closed)
            }
            Ok(Ok(n)) => Ok(ReadOutcome::Data(buf[..n].to_vec())),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    async fn error_hint(&mut self) -> Option<String> {
        None
    }

    async fn close(&mut self) {
        self.connected = false;
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.shutdown().await;
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
