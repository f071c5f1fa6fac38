#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error("unable to handle packet {opcode:#04x} after {last:#04x}")]
    UnknownOpcode { opcode: u8, last: u8 },

    #[error("invalid metadata tag: {tag:#04x}")]
    InvalidMetadataType { tag: u8 },

    #[error("invalid {what} length: {len}")]
    InvalidLength { what: &'static str, len: i64 },

    #[error("string too long: {len} code units (max {max})")]
    StringTooLong { len: usize, max: usize },

    #[error("disconnected: {reason}")]
    Disconnected { reason: String },

    #[error("keepalive failed: {0}")]
    KeepAliveFailed(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::UnexpectedEof,
            _ => Error::Io(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
