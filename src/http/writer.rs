use anyhow::Context;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

/// A response rendered to bytes, waiting to go out on the socket.
#[derive(Debug)]
pub struct ResponseWriter {
    wire: Vec<u8>,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            wire: response.to_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.wire.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wire.is_empty()
    }

    /// Writes the whole response and flushes. A peer that stops accepting
    /// bytes midway surfaces as a `WriteZero` error.
    pub async fn write_to_stream<W>(&self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        stream
            .write_all(&self.wire)
            .await
            .with_context(|| format!("wrote partial response of {} bytes", self.wire.len()))?;
        stream.flush().await.context("flush after response")?;
        Ok(())
    }
}
