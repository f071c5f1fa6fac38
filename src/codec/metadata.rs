use tokio::io::AsyncRead;

use super::reader::PacketReader;
use crate::error::{Error, Result};

/// Tag value that terminates a metadata record.
pub const METADATA_END: u8 = 0x7f;

/// Field type selector carried in the top three bits of a metadata tag.
///
/// The payloads of `ItemStack` and `Coordinates` are consumed but never
/// interpreted; only their sizes matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MetadataType {
    Byte = 0,
    Short = 1,
    Int = 2,
    Float = 3,
    String = 4,
    /// short, byte, short
    ItemStack = 5,
    /// three ints
    Coordinates = 6,
}

impl MetadataType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match (tag & 0xE0) >> 5 {
            0 => Some(Self::Byte),
            1 => Some(Self::Short),
            2 => Some(Self::Int),
            3 => Some(Self::Float),
            4 => Some(Self::String),
            5 => Some(Self::ItemStack),
            6 => Some(Self::Coordinates),
            _ => None,
        }
    }

    /// Payload size in bytes, or `None` for the length-prefixed string.
    pub fn payload_len(self) -> Option<usize> {
        match self {
            Self::Byte => Some(1),
            Self::Short => Some(2),
            Self::Int | Self::Float => Some(4),
            Self::String => None,
            Self::ItemStack => Some(5),
            Self::Coordinates => Some(12),
        }
    }
}

impl<R: AsyncRead + Unpin> PacketReader<R> {
    /// Consume a metadata record up to and including its terminator.
    pub async fn skip_metadata(&mut self) -> Result<()> {
        let mut tag = self.read_u8().await?;
        while tag != METADATA_END {
            let kind = MetadataType::from_tag(tag).ok_or(Error::InvalidMetadataType { tag })?;
            match kind.payload_len() {
                Some(n) => self.skip(n).await?,
                None => {
                    self.read_string().await?;
                }
            }
            tag = self.read_u8().await?;
        }
        Ok(())
    }
}
