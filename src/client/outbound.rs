use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::protocol::OutboundMessage;

pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Whether a message is pushed to the socket while the lock is still held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    Now,
    /// Left in the buffer; the receive loop flushes after each dispatch.
    Deferred,
}

/// The single outbound stream shared by the receive loop and the keepalive
/// timer. One lock acquisition covers exactly one logical message.
pub struct Outbound {
    inner: Mutex<BufWriter<BoxedWriter>>,
}

impl Outbound {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            inner: Mutex::new(BufWriter::new(Box::new(writer) as BoxedWriter)),
        }
    }

    pub async fn send<M: OutboundMessage + ?Sized>(&self, message: &M, flush: Flush) -> Result<()> {
        let frame = message.encode()?;
        self.write_frame(&frame, flush).await
    }

    /// Write pre-encoded bytes as one message. The guard is dropped on every
    /// path out of this function, including failed writes.
    pub async fn write_frame(&self, frame: &[u8], flush: Flush) -> Result<()> {
        let mut out = self.inner.lock().await;
        out.write_all(frame).await?;
        if flush == Flush::Now {
            out.flush().await?;
        }
        Ok(())
    }

    pub async fn flush(&self) -> Result<()> {
        self.inner.lock().await.flush().await?;
        Ok(())
    }

    /// Flush, then close the write side of the stream.
    pub async fn shutdown(&self) -> Result<()> {
        self.inner.lock().await.shutdown().await?;
        Ok(())
    }
}
