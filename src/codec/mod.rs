pub mod reader;
pub mod writer;
pub mod metadata;

pub use reader::PacketReader;
pub use writer::{PacketWriter, MAX_STRING_UNITS};
pub use metadata::{MetadataType, METADATA_END};
