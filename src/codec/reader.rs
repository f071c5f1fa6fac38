use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};

/// Async big-endian reader over an unframed protocol stream.
///
/// Every method consumes exactly the bytes of the value it reads. There is no
/// look-ahead and no internal buffering beyond what `R` provides.
pub struct PacketReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin> PacketReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub async fn read_u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8().await?)
    }

    pub async fn read_i8(&mut self) -> Result<i8> {
        Ok(self.inner.read_i8().await?)
    }

    pub async fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8().await? != 0)
    }

    pub async fn read_i16(&mut self) -> Result<i16> {
        Ok(self.inner.read_i16().await?)
    }

    pub async fn read_u16(&mut self) -> Result<u16> {
        Ok(self.inner.read_u16().await?)
    }

    pub async fn read_i32(&mut self) -> Result<i32> {
        Ok(self.inner.read_i32().await?)
    }

    pub async fn read_i64(&mut self) -> Result<i64> {
        Ok(self.inner.read_i64().await?)
    }

    pub async fn read_f32(&mut self) -> Result<f32> {
        Ok(self.inner.read_f32().await?)
    }

    pub async fn read_f64(&mut self) -> Result<f64> {
        Ok(self.inner.read_f64().await?)
    }

    /// Discard exactly `n` bytes.
    pub async fn skip(&mut self, n: usize) -> Result<()> {
        let mut limited = (&mut self.inner).take(n as u64);
        let copied = tokio::io::copy(&mut limited, &mut tokio::io::sink()).await?;
        if copied < n as u64 {
            return Err(Error::UnexpectedEof);
        }
        Ok(())
    }

    /// Discard `count` elements of `element_size` bytes each.
    ///
    /// Counts come straight off the wire as signed integers; a negative count
    /// means the stream is already out of step.
    pub async fn skip_counted(&mut self, what: &'static str, count: i64, element_size: usize) -> Result<()> {
        if count < 0 {
            return Err(Error::InvalidLength { what, len: count });
        }
        self.skip(count as usize * element_size).await
    }

    /// Read a length-prefixed UTF-16 string.
    ///
    /// The prefix is a big-endian count of UTF-16 code units, followed by the
    /// units themselves in big-endian order. No byte-order mark is present on
    /// the wire; units are always decoded as big-endian regardless of host.
    pub async fn read_string(&mut self) -> Result<String> {
        let len = self.read_i16().await?;
        if len < 0 {
            return Err(Error::InvalidLength { what: "string", len: len as i64 });
        }
        let mut bytes = vec![0u8; len as usize * 2];
        self.inner.read_exact(&mut bytes).await?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&units))
    }

    /// Discard a modified-UTF-8 string (unsigned 16-bit byte length + bytes).
    /// Only the window-open packet uses this encoding.
    pub async fn skip_modified_utf8(&mut self) -> Result<()> {
        let len = self.read_u16().await?;
        self.skip(len as usize).await
    }
}
